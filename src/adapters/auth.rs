use crate::core::{CredentialProvider, PortfolioApi};
use crate::domain::model::{LoginRequest, Session};
use crate::utils::error::{PortfolioError, Result};
use async_trait::async_trait;

/// Username and password checked by the API's own login endpoint.
#[derive(Clone)]
pub struct PasswordCredentials {
    pub username: String,
    pub password: String,
}

impl PasswordCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for PasswordCredentials {
    async fn authenticate(&self, api: &dyn PortfolioApi) -> Result<Session> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(PortfolioError::validation(
                "credentials",
                "username and password are required",
            ));
        }

        let response = api
            .login(&LoginRequest {
                username: self.username.clone(),
                password: self.password.clone(),
            })
            .await?;

        tracing::info!("Logged in as user {}", response.user_id);
        Ok(Session::new(response.user_id, response.access_token))
    }
}

/// A bearer token already issued by an external identity provider.
#[derive(Clone)]
pub struct TokenCredentials {
    pub user_id: i64,
    pub token: String,
}

impl TokenCredentials {
    pub fn new(user_id: i64, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for TokenCredentials {
    async fn authenticate(&self, _api: &dyn PortfolioApi) -> Result<Session> {
        if self.token.trim().is_empty() {
            return Err(PortfolioError::validation("credentials", "token is empty"));
        }
        Ok(Session::new(self.user_id, Some(self.token.clone())))
    }
}
