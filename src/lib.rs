pub mod builder;
pub mod claims;
pub mod grants;
pub mod signer;

pub use builder::{AccessToken, EncodeError};
pub use claims::AccessTokenClaims;
pub use grants::{VideoGrant, VideoGrantSet};
pub use signer::{Hs256Signer, TokenSigner};
