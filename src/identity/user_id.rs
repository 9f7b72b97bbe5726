//! The identifier of a signed-in user.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An opaque user identifier issued by the identity provider, e.g. "user_2abc".
///
/// The application never interprets the contents of the ID, it only compares IDs and uses
/// them to scope database queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID, returning `None` if `id` is empty or only whitespace.
    pub fn new(id: &str) -> Option<Self> {
        let id = id.trim();

        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_owned()))
        }
    }

    /// Create a user ID without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// The user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::UserId;

    #[test]
    fn new_trims_id() {
        assert_eq!(UserId::new("  user_1 "), Some(UserId::new_unchecked("user_1")));
    }

    #[test]
    fn new_rejects_blank_id() {
        assert_eq!(UserId::new(""), None);
        assert_eq!(UserId::new("   "), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&UserId::new_unchecked("user_1")).unwrap();

        assert_eq!(json, r#""user_1""#);
    }
}
