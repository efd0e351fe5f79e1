use crate::core::{ConfigProvider, PortfolioApi};
use crate::domain::model::{
    CreatedPortfolio, CryptoInfo, LoginRequest, LoginResponse, PerformanceReport, Portfolio,
    PortfolioDraft, Session, SignupRequest, SignupResponse,
};
use crate::utils::error::{PortfolioError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Upper bound on GET retries, whatever the configuration asks for.
pub const MAX_RETRY_ATTEMPTS: u32 = 10;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// FastAPI error body.
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Client for the portfolio-management API.
#[derive(Debug, Clone)]
pub struct HttpPortfolioApi {
    client: Client,
    base_url: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl HttpPortfolioApi {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            retry_attempts: config.retry_attempts().min(MAX_RETRY_ATTEMPTS),
            retry_delay: config.retry_delay(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);

        let builder = self.client.request(method, url);
        match session.and_then(|s| s.bearer.as_deref()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GETs are idempotent, so gateway errors and dropped connections are
    /// retried with exponential backoff.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, session: &Session) -> Result<T> {
        let mut attempt = 0;
        loop {
            let outcome = match self.request(Method::GET, path, Some(session)).send().await {
                Ok(response) => parse_response(response).await,
                Err(e) => Err(PortfolioError::HttpError(e)),
            };

            match outcome {
                Err(e) if e.is_retryable() && attempt < self.retry_attempts => {
                    let delay = backoff_delay(self.retry_delay, attempt);
                    attempt += 1;
                    tracing::warn!(
                        "GET {} failed ({}), retry {}/{} in {:?}",
                        path,
                        e,
                        attempt,
                        self.retry_attempts,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        session: Option<&Session>,
        body: &B,
    ) -> Result<T>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, path, session).json(body).send().await?;
        parse_response(response).await
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt)).min(MAX_RETRY_DELAY)
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    tracing::debug!("API response status: {}", status);

    if status.is_success() {
        // Endpoints that only acknowledge may answer with an empty body.
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        return Ok(serde_json::from_str(body)?);
    }

    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => text,
    };

    match status.as_u16() {
        401 | 403 => Err(PortfolioError::Unauthorized { message }),
        code => Err(PortfolioError::Api {
            status: code,
            message,
        }),
    }
}

#[async_trait]
impl PortfolioApi for HttpPortfolioApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        tracing::debug!("Logging in as {}", request.username);
        self.send_json(Method::POST, "/login", None, request).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<SignupResponse> {
        self.send_json(Method::POST, "/signup", None, request).await
    }

    async fn list_cryptos(&self, session: &Session) -> Result<Vec<CryptoInfo>> {
        self.get_json("/cryptos", session).await
    }

    async fn list_portfolios(&self, session: &Session) -> Result<Vec<Portfolio>> {
        self.get_json(&format!("/portfolios/{}", session.user_id), session)
            .await
    }

    async fn create_portfolio(
        &self,
        session: &Session,
        draft: &PortfolioDraft,
    ) -> Result<CreatedPortfolio> {
        let path = format!("/portfolios/{}", session.user_id);
        self.send_json(Method::POST, &path, Some(session), draft).await
    }

    async fn update_portfolio(
        &self,
        session: &Session,
        portfolio_id: i64,
        draft: &PortfolioDraft,
    ) -> Result<()> {
        let path = format!("/portfolios/{}", portfolio_id);
        let _: serde_json::Value = self
            .send_json(Method::PUT, &path, Some(session), draft)
            .await?;
        Ok(())
    }

    async fn delete_portfolio(&self, session: &Session, portfolio_id: i64) -> Result<()> {
        let path = format!("/portfolios/{}/{}", session.user_id, portfolio_id);
        let response = self
            .request(Method::DELETE, &path, Some(session))
            .send()
            .await?;
        let _: serde_json::Value = parse_response(response).await?;
        Ok(())
    }

    async fn performance(
        &self,
        session: &Session,
        portfolio_id: i64,
    ) -> Result<PerformanceReport> {
        self.get_json(&format!("/portfolios/{}/performance", portfolio_id), session)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(800));
        assert_eq!(backoff_delay(base, 40), MAX_RETRY_DELAY);
        assert_eq!(backoff_delay(Duration::ZERO, u32::MAX), Duration::ZERO);
    }
}
