use serde::{Deserialize, Serialize};

/// A user directory entry as returned by `GET /api/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl User {
    /// Display label used in member pickers: "Name (email)"
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.email)
    }
}

/// The signed-in identity, as returned by the auth endpoints and as
/// reconstructed from a stored token's claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_display_label() {
        let user = User {
            id: 1,
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
        };
        assert_eq!(user.display_label(), "Asha (asha@example.com)");
    }

    #[test]
    fn test_user_profile_parses_without_role() {
        let json = r#"{"id": 3, "name": "Ravi", "email": "ravi@example.com"}"#;
        let profile: UserProfile = serde_json::from_str(json)
            .expect("Failed to parse user profile without role");
        assert_eq!(profile.id, 3);
        assert_eq!(profile.role, "");
    }

    #[test]
    fn test_user_profile_parses_with_role() {
        let json = r#"{"id": 1, "name": "A", "email": "a@b.com", "role": "admin"}"#;
        let profile: UserProfile = serde_json::from_str(json)
            .expect("Failed to parse user profile with role");
        assert_eq!(profile.role, "admin");
    }
}
