use crate::grants::JsonObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The claim set carried in a room access token payload.
///
/// This is the canonical structure handed to the signing primitive. Optional
/// fields that were never set on the builder are omitted from the output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AccessTokenClaims {
    /// The API key the token was issued under.
    #[serde(rename = "iss")]
    pub issuer: String,

    /// The timestamp at which this token expires.
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,

    /// The first timestamp at which this token is valid.
    #[serde(
        rename = "nbf",
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub not_before: Option<DateTime<Utc>>,

    /// The holder's identity. Mirrored in [`Self::jwt_id`].
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// The token id, set to the holder's identity.
    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    pub jwt_id: Option<String>,

    /// The holder's display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Caller supplied metadata passed through to participants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,

    /// A digest for verifying the integrity of an attached message body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// The serialized grant set, mapping grant keys to grant values.
    pub video: JsonObject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_claims_omit_unset_fields() {
        let claims = AccessTokenClaims {
            issuer: "api-key".into(),
            expires_at: DateTime::from_timestamp(1740495955, 0).unwrap(),
            not_before: None,
            subject: None,
            jwt_id: None,
            name: None,
            metadata: None,
            sha256: None,
            video: JsonObject::new(),
        };
        let serialized = serde_json::to_value(&claims).expect("serialize failed");
        assert_eq!(serialized, json!({ "iss": "api-key", "exp": 1740495955, "video": {} }));
    }

    #[test]
    fn full_claims_serialize() {
        let mut video = JsonObject::new();
        video.insert("roomJoin".into(), json!(true));

        let claims = AccessTokenClaims {
            issuer: "api-key".into(),
            expires_at: DateTime::from_timestamp(1740495955, 0).unwrap(),
            not_before: Some(DateTime::from_timestamp(1740494955, 0).unwrap()),
            subject: Some("alice".into()),
            jwt_id: Some("alice".into()),
            name: Some("Alice".into()),
            metadata: Some("{\"team\":\"red\"}".into()),
            sha256: Some("abc123".into()),
            video,
        };
        let serialized = serde_json::to_value(&claims).expect("serialize failed");
        let expected = json!({
            "iss": "api-key",
            "exp": 1740495955,
            "nbf": 1740494955,
            "sub": "alice",
            "jti": "alice",
            "name": "Alice",
            "metadata": "{\"team\":\"red\"}",
            "sha256": "abc123",
            "video": { "roomJoin": true },
        });
        assert_eq!(serialized, expected);

        // Ensure `claims -> string -> claims` gives us back the original claims
        let reparsed: AccessTokenClaims =
            serde_json::from_value(serialized).expect("deserialize failed");
        assert_eq!(reparsed, claims);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let input = json!({ "iss": "api-key", "exp": 1740495955, "video": {}, "extra": 1 });
        serde_json::from_value::<AccessTokenClaims>(input).expect_err("parsing succeeded");
    }
}
