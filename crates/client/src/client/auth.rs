//! Authentication endpoints

use super::{ApiClient, error::ClientError, query::Query};
use crate::types::{TokenResponse, User};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Exchange credentials for a token, then load the user record
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let token: TokenResponse = self
            .post("/auth/login", &LoginRequest { email, password })
            .await?;
        self.session.set_auth(&token);
        info!(email, "Logged in");

        self.current_user().await
    }

    /// Fetch the signed-in user and cache it on the session
    pub async fn current_user(&self) -> Result<User, ClientError> {
        let user: User = self.get("/me", Query::new()).await?;
        self.session.set_user(user.clone());
        Ok(user)
    }
}
