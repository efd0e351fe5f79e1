use crate::domain::model::{
    CreatedPortfolio, CryptoInfo, LoginRequest, LoginResponse, PerformanceReport, Portfolio,
    PortfolioDraft, Session, SignupRequest, SignupResponse,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
}

/// The remote portfolio-management API. Calls that act on behalf of a user
/// take the session so the bearer and user id travel together.
#[async_trait]
pub trait PortfolioApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;
    async fn signup(&self, request: &SignupRequest) -> Result<SignupResponse>;
    async fn list_cryptos(&self, session: &Session) -> Result<Vec<CryptoInfo>>;
    async fn list_portfolios(&self, session: &Session) -> Result<Vec<Portfolio>>;
    async fn create_portfolio(
        &self,
        session: &Session,
        draft: &PortfolioDraft,
    ) -> Result<CreatedPortfolio>;
    async fn update_portfolio(
        &self,
        session: &Session,
        portfolio_id: i64,
        draft: &PortfolioDraft,
    ) -> Result<()>;
    async fn delete_portfolio(&self, session: &Session, portfolio_id: i64) -> Result<()>;
    async fn performance(&self, session: &Session, portfolio_id: i64)
        -> Result<PerformanceReport>;
}

/// Produces a session from whatever the user supplied.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn authenticate(&self, api: &dyn PortfolioApi) -> Result<Session>;
}
