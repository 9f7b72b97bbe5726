//! The token cached in the identity cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::identity::UserId;

mod rfc3339 {
    //! Serializes the expiry as RFC 3339 text, e.g. "2025-12-21T03:54:00Z".
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn serialize<S>(date_time: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = date_time
            .format(&Rfc3339)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&text, &Rfc3339).map_err(serde::de::Error::custom)
    }
}

/// A cached identity: who the user is and until when the cache may be trusted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Token {
    /// The identity resolved for the user.
    pub user_id: UserId,

    /// After this point in time the token no longer identifies the user.
    #[serde(with = "rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Whether the token is still valid at `now`.
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::datetime};

    use crate::identity::{UserId, token::Token};

    #[test]
    fn token_serializes_expiry_as_rfc3339() {
        let token = Token {
            user_id: UserId::new_unchecked("user_1"),
            expires_at: datetime!(2025-12-21 03:54:00 UTC),
        };

        let json = serde_json::to_string(&token).unwrap();

        assert_eq!(
            json,
            r#"{"user_id":"user_1","expires_at":"2025-12-21T03:54:00Z"}"#
        );
    }

    #[test]
    fn token_survives_cookie_round_trip_with_subseconds() {
        let token = Token {
            user_id: UserId::new_unchecked("user_1"),
            expires_at: datetime!(2025-12-21 00:00:00.123456 UTC),
        };

        let json = serde_json::to_string(&token).unwrap();

        assert_eq!(serde_json::from_str::<Token>(&json).unwrap(), token);
    }

    #[test]
    fn token_expires_at_expiry_time() {
        let expires_at = datetime!(2025-12-21 12:00:00 UTC);
        let token = Token {
            user_id: UserId::new_unchecked("user_1"),
            expires_at,
        };

        assert!(token.is_valid_at(expires_at - Duration::seconds(1)));
        assert!(!token.is_valid_at(expires_at));
        assert!(!token.is_valid_at(expires_at + Duration::seconds(1)));
    }
}
