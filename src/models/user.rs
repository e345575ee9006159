use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::deserialize_id;

/// The signed-in user as returned by `/auth/login` and `/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Profile fields this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_id_accepted() {
        let user: User = serde_json::from_value(json!({"id": 7, "username": "ada"})).unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.username, "ada");
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let user: User =
            serde_json::from_value(json!({"id": "u1", "username": "ada", "avatar": "a.png"}))
                .unwrap();
        assert_eq!(user.extra.get("avatar"), Some(&json!("a.png")));
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["avatar"], "a.png");
        assert!(value.get("email").is_none());
    }
}
