use crate::adapters::PasswordCredentials;
use crate::core::chart::PerformanceChart;
use crate::core::form::PortfolioForm;
use crate::core::{CredentialProvider, PortfolioApi};
use crate::domain::model::{CryptoInfo, Portfolio, Session, SignupRequest, SignupResponse};
use crate::utils::error::{PortfolioError, Result};

/// Portfolio operations for one authenticated user.
pub struct PortfolioService<A: PortfolioApi> {
    api: A,
    session: Session,
}

impl<A: PortfolioApi> PortfolioService<A> {
    pub fn new(api: A, session: Session) -> Self {
        Self { api, session }
    }

    pub async fn connect(api: A, credentials: &dyn CredentialProvider) -> Result<Self> {
        let session = credentials.authenticate(&api).await?;
        Ok(Self::new(api, session))
    }

    /// Creates an account and logs in with the credentials the server generated,
    /// so a broken account surfaces immediately.
    pub async fn register(api: A, request: &SignupRequest) -> Result<(SignupResponse, Self)> {
        let account = api.signup(request).await?;
        tracing::info!("Signed up user {}", account.user_id);

        let credentials = PasswordCredentials::new(&account.username, &account.password);
        let service = Self::connect(api, &credentials).await?;
        Ok((account, service))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn cryptos(&self) -> Result<Vec<CryptoInfo>> {
        self.api.list_cryptos(&self.session).await
    }

    pub async fn portfolios(&self) -> Result<Vec<Portfolio>> {
        let portfolios = self.api.list_portfolios(&self.session).await?;
        tracing::debug!(
            "User {} has {} portfolios",
            self.session.user_id,
            portfolios.len()
        );
        Ok(portfolios)
    }

    pub async fn portfolio(&self, portfolio_id: i64) -> Result<Portfolio> {
        self.portfolios()
            .await?
            .into_iter()
            .find(|p| p.id == portfolio_id)
            .ok_or_else(|| PortfolioError::NotFound {
                what: format!("Portfolio {}", portfolio_id),
            })
    }

    /// Returns the id assigned by the server.
    pub async fn create(&self, form: &PortfolioForm) -> Result<i64> {
        let draft = form.to_draft()?;
        let created = self.api.create_portfolio(&self.session, &draft).await?;
        tracing::info!(
            "Created portfolio '{}' ({}) with {} assets",
            draft.name,
            created.portfolio_id,
            draft.assets.len()
        );
        Ok(created.portfolio_id)
    }

    pub async fn update(&self, portfolio_id: i64, form: &PortfolioForm) -> Result<()> {
        let draft = form.to_draft()?;
        self.api
            .update_portfolio(&self.session, portfolio_id, &draft)
            .await?;
        tracing::info!("Updated portfolio {}", portfolio_id);
        Ok(())
    }

    pub async fn delete(&self, portfolio_id: i64) -> Result<()> {
        self.api
            .delete_portfolio(&self.session, portfolio_id)
            .await?;
        tracing::info!("Deleted portfolio {}", portfolio_id);
        Ok(())
    }

    pub async fn performance_chart(&self, portfolio_id: i64) -> Result<PerformanceChart> {
        let report = self.api.performance(&self.session, portfolio_id).await?;
        Ok(PerformanceChart::from_report(&report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::TokenCredentials;
    use crate::domain::model::{
        CreatedPortfolio, LoginRequest, LoginResponse, PerformanceReport, PortfolioDraft,
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockApi {
        drafts: Arc<Mutex<Vec<PortfolioDraft>>>,
        deleted: Arc<Mutex<Vec<i64>>>,
    }

    #[async_trait]
    impl PortfolioApi for MockApi {
        async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
            if request.password != "pass" {
                return Err(PortfolioError::Unauthorized {
                    message: "invalid credentials".to_string(),
                });
            }
            Ok(LoginResponse {
                user_id: 42,
                message: None,
                access_token: Some("tok".to_string()),
            })
        }

        async fn signup(&self, request: &SignupRequest) -> Result<SignupResponse> {
            Ok(SignupResponse {
                user_id: 42,
                username: request.email.clone(),
                password: "pass".to_string(),
            })
        }

        async fn list_cryptos(&self, _session: &Session) -> Result<Vec<CryptoInfo>> {
            Ok(vec![])
        }

        async fn list_portfolios(&self, session: &Session) -> Result<Vec<Portfolio>> {
            Ok(vec![Portfolio {
                id: 1,
                name: format!("user {}", session.user_id),
                total_amount: 100.0,
                exchange: "Bybit".to_string(),
                api_key: String::new(),
                api_secret: String::new(),
                assets: vec![],
                status: None,
            }])
        }

        async fn create_portfolio(
            &self,
            _session: &Session,
            draft: &PortfolioDraft,
        ) -> Result<CreatedPortfolio> {
            self.drafts.lock().await.push(draft.clone());
            Ok(CreatedPortfolio {
                portfolio_id: 9,
                message: None,
            })
        }

        async fn update_portfolio(
            &self,
            _session: &Session,
            _portfolio_id: i64,
            draft: &PortfolioDraft,
        ) -> Result<()> {
            self.drafts.lock().await.push(draft.clone());
            Ok(())
        }

        async fn delete_portfolio(&self, _session: &Session, portfolio_id: i64) -> Result<()> {
            self.deleted.lock().await.push(portfolio_id);
            Ok(())
        }

        async fn performance(
            &self,
            _session: &Session,
            _portfolio_id: i64,
        ) -> Result<PerformanceReport> {
            Ok(PerformanceReport::default())
        }
    }

    #[tokio::test]
    async fn test_connect_with_password() {
        let api = MockApi::default();
        let service = PortfolioService::connect(api, &PasswordCredentials::new("user", "pass"))
            .await
            .unwrap();
        assert_eq!(service.session().user_id, 42);
        assert_eq!(service.session().bearer.as_deref(), Some("tok"));

        let err = PortfolioService::connect(
            MockApi::default(),
            &PasswordCredentials::new("user", "wrong"),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, PortfolioError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_register_logs_in_with_generated_credentials() {
        let request = SignupRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: "555".to_string(),
        };
        let (account, service) = PortfolioService::register(MockApi::default(), &request)
            .await
            .unwrap();

        assert_eq!(account.username, "ana@example.com");
        assert_eq!(service.session().user_id, account.user_id);
        assert_eq!(service.session().bearer.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_api() {
        let api = MockApi::default();
        let drafts = api.drafts.clone();
        let service = PortfolioService::new(api, Session::new(1, None));

        let form = PortfolioForm::new();
        assert!(service.create(&form).await.is_err());
        assert!(service.update(1, &form).await.is_err());
        assert!(drafts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_sends_allocations() {
        let api = MockApi::default();
        let drafts = api.drafts.clone();
        let service = PortfolioService::connect(api, &TokenCredentials::new(5, "idp-token"))
            .await
            .unwrap();

        let mut form = PortfolioForm::new();
        form.name = "Main".to_string();
        form.total_amount = Some(30.0);
        form.api_key = "k".to_string();
        form.api_secret = "s".to_string();
        form.add_asset();
        form.set_leverage(1, 2).unwrap();

        assert_eq!(service.create(&form).await.unwrap(), 9);
        let sent = drafts.lock().await;
        assert_eq!(sent[0].assets[0].amount_in_usd, 10.0);
        assert_eq!(sent[0].assets[1].amount_in_usd, 20.0);
    }

    #[tokio::test]
    async fn test_portfolio_lookup() {
        let service = PortfolioService::new(MockApi::default(), Session::new(3, None));
        assert_eq!(service.portfolio(1).await.unwrap().name, "user 3");
        assert!(matches!(
            service.portfolio(2).await,
            Err(PortfolioError::NotFound { .. })
        ));

        service.delete(1).await.unwrap();
        assert_eq!(*service.api.deleted.lock().await, vec![1]);
    }
}
