//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Identifier of a chat user, as assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a UserId from the transport's numeric id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner numeric id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a chat (private or group) the user talks in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(i64);

impl ChatId {
    /// Creates a ChatId from the transport's numeric id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner numeric id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a persisted session: one session per (user, chat) pair.
///
/// Rendered as `"<userId>:<chatId>"`, which is the only identifier
/// exposed in the backing collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey {
    pub user_id: UserId,
    pub chat_id: ChatId,
}

impl SessionKey {
    /// Creates a key from raw transport ids.
    pub fn new(user_id: i64, chat_id: i64) -> Self {
        Self {
            user_id: UserId::new(user_id),
            chat_id: ChatId::new(chat_id),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user_id, self.chat_id)
    }
}

impl FromStr for SessionKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (user, chat) = s
            .split_once(':')
            .ok_or_else(|| ValidationError::invalid_format("session_key", "missing ':' separator"))?;

        let user_id = user
            .parse::<i64>()
            .map_err(|e| ValidationError::invalid_format("session_key.user_id", e.to_string()))?;
        let chat_id = chat
            .parse::<i64>()
            .map_err(|e| ValidationError::invalid_format("session_key.chat_id", e.to_string()))?;

        Ok(Self::new(user_id, chat_id))
    }
}

impl Serialize for SessionKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SessionKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifier of a city in the external catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub i64);

/// Identifier of a branch (restaurant/terminal) in the external catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(pub i64);

/// Identifier of a product category in the external catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

/// Identifier of a product in the external catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

macro_rules! display_catalog_id {
    ($($ty:ident),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

display_catalog_id!(CityId, BranchId, CategoryId, ProductId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_displays_as_user_colon_chat() {
        let key = SessionKey::new(111, 222);
        assert_eq!(key.to_string(), "111:222");
    }

    #[test]
    fn session_key_parses_from_string() {
        let key: SessionKey = "111:222".parse().unwrap();
        assert_eq!(key.user_id, UserId::new(111));
        assert_eq!(key.chat_id, ChatId::new(222));
    }

    #[test]
    fn session_key_accepts_negative_group_chat_ids() {
        let key: SessionKey = "42:-100123".parse().unwrap();
        assert_eq!(key.chat_id.as_i64(), -100123);
        assert_eq!(key.to_string(), "42:-100123");
    }

    #[test]
    fn session_key_rejects_missing_separator() {
        let result = "111222".parse::<SessionKey>();
        assert!(matches!(result, Err(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn session_key_rejects_non_numeric_parts() {
        assert!("abc:222".parse::<SessionKey>().is_err());
        assert!("111:xyz".parse::<SessionKey>().is_err());
    }

    #[test]
    fn session_key_serializes_as_string() {
        let key = SessionKey::new(1, 2);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"1:2\"");

        let back: SessionKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn catalog_ids_are_transparent() {
        let json = serde_json::to_string(&ProductId(5)).unwrap();
        assert_eq!(json, "5");
    }
}
