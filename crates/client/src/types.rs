//! Types shared by the session and the API client

use serde::{Deserialize, Serialize};

/// Staff role granted to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Cashier,
    Manager,
    Admin,
    Auditor,
}

/// Currently signed-in staff member, as returned by `/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

/// Successful response of the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub role: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Page of results returned by list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_response_defaults_token_type() {
        let token: TokenResponse =
            serde_json::from_value(json!({"access_token": "abc123", "role": "ADMIN"})).unwrap();
        assert_eq!(token.access_token, "abc123");
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.role, "ADMIN");
    }

    #[test]
    fn user_role_uses_uppercase_names() {
        let user: User = serde_json::from_value(json!({
            "id": "u-1",
            "email": "ana@example.com",
            "full_name": "Ana Lima",
            "role": "AUDITOR"
        }))
        .unwrap();
        assert_eq!(user.role, Role::Auditor);
        assert_eq!(serde_json::to_value(Role::Cashier).unwrap(), json!("CASHIER"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = serde_json::from_value::<Role>(json!("OWNER"));
        assert!(result.is_err());
    }
}
