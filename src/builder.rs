use crate::{
    claims::AccessTokenClaims,
    grants::{VideoGrant, VideoGrantSet},
    signer::{Hs256Signer, SigningError, TokenSigner},
};
use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::{fmt, time::Duration};

const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// A room access token builder.
///
/// Accumulates grants and identity, timing, and metadata fields, then encodes
/// them into a signed compact token. Encoding borrows the builder: it can be
/// called repeatedly, and each call computes a fresh expiration from the
/// current clock.
///
/// The builder is plain mutable state with no internal locking. Sharing one
/// instance across threads requires external synchronization.
#[derive(Clone)]
pub struct AccessToken {
    api_key: String,
    api_secret: String,
    grants: VideoGrantSet,
    ttl: Duration,
    not_before: Option<DateTime<Utc>>,
    name: Option<String>,
    identity: Option<String>,
    metadata: Option<String>,
    sha256: Option<String>,
}

impl AccessToken {
    /// Construct a new builder for the given API key and secret.
    ///
    /// The key becomes the token issuer. The secret is retained only for the
    /// signing step and is never exposed.
    pub fn new<K, S>(api_key: K, api_secret: S) -> Self
    where
        K: Into<String>,
        S: Into<String>,
    {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            grants: VideoGrantSet::new(),
            ttl: DEFAULT_TTL,
            not_before: Default::default(),
            name: Default::default(),
            identity: Default::default(),
            metadata: Default::default(),
            sha256: Default::default(),
        }
    }

    /// Set the time to live for tokens encoded from this builder.
    ///
    /// Defaults to 6 hours. The expiration is computed as `now + ttl` at
    /// encode time.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the timestamp before which the token is invalid.
    pub fn not_before(mut self, timestamp: DateTime<Utc>) -> Self {
        self.not_before = Some(timestamp);
        self
    }

    /// Set the participant's display name.
    pub fn name<T: Into<String>>(mut self, name: T) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the holder's unique identity. Required for room join tokens.
    pub fn identity<T: Into<String>>(mut self, identity: T) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Set custom metadata to be passed through to participants.
    pub fn metadata<T: Into<String>>(mut self, metadata: T) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Set a digest for verifying the integrity of an attached message body.
    pub fn sha256<T: Into<String>>(mut self, sha256: T) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    /// Add a grant, replacing any existing grant of the same kind and scope.
    pub fn add_grant(mut self, grant: VideoGrant) -> Self {
        self.grants.add(grant);
        self
    }

    /// Add every grant in the given sequence, in order.
    pub fn add_grants<I>(mut self, grants: I) -> Self
    where
        I: IntoIterator<Item = VideoGrant>,
    {
        self.grants.add_all(grants);
        self
    }

    /// Remove all grants.
    pub fn clear_grants(mut self) -> Self {
        self.grants.clear();
        self
    }

    /// Assemble the claim set this builder would sign, validating it.
    ///
    /// Fails when the grants include a true valued room join grant but no
    /// identity is set. The builder is left untouched on failure; setting the
    /// identity and retrying is valid.
    pub fn to_claims(&self) -> Result<AccessTokenClaims, EncodeError> {
        let ttl = TimeDelta::from_std(self.ttl).map_err(|_| EncodeError::TtlOutOfRange)?;
        let expires_at = Utc::now().checked_add_signed(ttl).ok_or(EncodeError::TtlOutOfRange)?;

        // An empty identity counts as unset.
        let identity = self.identity.as_deref().filter(|id| !id.is_empty());
        if identity.is_none() && self.grants.allows_room_join() {
            return Err(EncodeError::IdentityRequired);
        }

        Ok(AccessTokenClaims {
            issuer: self.api_key.clone(),
            expires_at,
            not_before: self.not_before,
            subject: identity.map(Into::into),
            jwt_id: identity.map(Into::into),
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            sha256: self.sha256.clone(),
            video: self.grants.to_claim(),
        })
    }

    /// Encode a signed compact token using HMAC-SHA256 over the API secret.
    pub fn encode(&self) -> Result<String, EncodeError> {
        self.encode_with(&Hs256Signer::new(self.api_secret.as_bytes()))
    }

    /// Encode a signed compact token using the given signing primitive.
    pub fn encode_with(&self, signer: &impl TokenSigner) -> Result<String, EncodeError> {
        let claims = self.to_claims()?;

        let header_b64 =
            to_base64_json(&signer.header()).map_err(|e| EncodeError::EncodingHeader(e.to_string()))?;
        let payload_b64 = to_base64_json(&claims).map_err(|e| EncodeError::EncodingClaims(e.to_string()))?;

        let message = format!("{header_b64}.{payload_b64}");
        let signature = signer.sign(message.as_bytes())?;
        let signature_b64 = to_base64(signature);

        Ok(format!("{message}.{signature_b64}"))
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("api_key", &self.api_key)
            .field("grants", &self.grants)
            .field("ttl", &self.ttl)
            .field("not_before", &self.not_before)
            .field("name", &self.name)
            .field("identity", &self.identity)
            .field("metadata", &self.metadata)
            .field("sha256", &self.sha256)
            .finish_non_exhaustive()
    }
}

/// An error when encoding a token.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("identity is required for join, but is not set.")]
    IdentityRequired,

    #[error("ttl cannot be represented as a future timestamp")]
    TtlOutOfRange,

    #[error("encoding header: {0}")]
    EncodingHeader(String),

    #[error("encoding claims: {0}")]
    EncodingClaims(String),

    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),
}

pub(crate) fn to_base64<T: AsRef<[u8]>>(input: T) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(input)
}

pub(crate) fn to_base64_json<T: Serialize>(input: &T) -> Result<String, serde_json::Error> {
    let input = serde_json::to_vec(input)?;
    Ok(to_base64(&input))
}
