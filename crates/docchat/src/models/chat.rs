use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_CHAT_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A chat session owning an ordered sequence of turns
pub struct Chat {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Chat {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Whether a name fits the stored column
    pub fn is_valid_name(name: &str) -> bool {
        !name.trim().is_empty() && name.chars().count() <= MAX_CHAT_NAME_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_name_validation() {
        assert!(Chat::is_valid_name("docs"));
        assert!(!Chat::is_valid_name("   "));
        assert!(Chat::is_valid_name(&"a".repeat(MAX_CHAT_NAME_LEN)));
        assert!(!Chat::is_valid_name(&"a".repeat(MAX_CHAT_NAME_LEN + 1)));
    }
}
