use anyhow::Result;
use httpmock::prelude::*;
use portfolio_client::core::form::AssetRow;
use portfolio_client::{ClientConfig, HttpPortfolioApi, PortfolioForm, PortfolioService};
use serde_json::json;
use tempfile::TempDir;

/// Full flow against a mock API:
/// 1. load config from a TOML file
/// 2. log in with username and password
/// 3. create a portfolio from a form
/// 4. fetch the performance chart and export it as CSV
#[tokio::test]
async fn test_login_create_and_chart() -> Result<()> {
    let server = MockServer::start();
    let temp_dir = TempDir::new()?;

    std::env::set_var("PORTFOLIO_FLOW_TEST_PASSWORD", "pass");
    let config_path = temp_dir.path().join("portfolio-client.toml");
    tokio::fs::write(
        &config_path,
        format!(
            r#"
[api]
base_url = "{}"
retry_attempts = 0

[auth]
mode = "password"
username = "user"
password = "${{PORTFOLIO_FLOW_TEST_PASSWORD}}"
"#,
            server.base_url()
        ),
    )
    .await?;
    let config = ClientConfig::from_file(&config_path)?;
    std::env::remove_var("PORTFOLIO_FLOW_TEST_PASSWORD");

    let login_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/login")
            .json_body(json!({"username": "user", "password": "pass"}));
        then.status(200)
            .json_body(json!({"user_id": 5, "access_token": "session-token"}));
    });

    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/portfolios/5")
            .header("authorization", "Bearer session-token")
            .json_body(json!({
                "name": "Trend",
                "total_amount": 1000.0,
                "exchange": "Bybit",
                "api_key": "key",
                "api_secret": "secret",
                "assets": [
                    {"symbol": "BTCUSDT", "amount_in_usd": 500.0, "leverage": 2},
                    {"symbol": "ETHUSDT", "amount_in_usd": 250.0, "leverage": 1},
                    {"symbol": "GALAUSDT", "amount_in_usd": 250.0, "leverage": 1}
                ]
            }));
        then.status(200).json_body(json!({"portfolio_id": 77}));
    });

    let performance_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/portfolios/77/performance")
            .header("authorization", "Bearer session-token");
        then.status(200).json_body(json!({
            "cumulative_profitability": {"2025-03-24": 1.25, "2025-03-23": 0.0},
            "assets": [
                {
                    "symbol": "BTCUSDT",
                    "historical_values": {"2025-03-23": 500.0, "2025-03-24": 510.0}
                },
                {"symbol": "ETHUSDT", "historical_values": {"2025-03-24": 252.5}}
            ]
        }));
    });

    let api = HttpPortfolioApi::new(&config)?;
    let credentials = config.credentials()?;
    let service = PortfolioService::connect(api, credentials.as_ref()).await?;
    login_mock.assert();

    let mut form = PortfolioForm::new().with_assets(vec![
        AssetRow::new("btcusdt", 2),
        AssetRow::new("ETHUSDT", 1),
    ]);
    form.add_asset();
    form.name = "Trend".to_string();
    form.total_amount = Some(1000.0);
    form.api_key = "key".to_string();
    form.api_secret = "secret".to_string();

    let id = service.create(&form).await?;
    create_mock.assert();
    assert_eq!(id, 77);

    let chart = service.performance_chart(id).await?;
    performance_mock.assert();
    assert_eq!(chart.labels, vec!["2025-03-23", "2025-03-24"]);
    assert_eq!(chart.series.len(), 3);
    assert_eq!(chart.series[1].points, vec![None, Some(252.5)]);

    let csv_path = temp_dir.path().join("chart.csv");
    tokio::fs::write(&csv_path, chart.to_csv()?).await?;
    let written = tokio::fs::read_to_string(&csv_path).await?;
    assert!(written.starts_with("date,BTCUSDT,ETHUSDT,Cumulative profitability (%)"));
    assert!(written.contains("2025-03-23,500,,0"));

    Ok(())
}

#[tokio::test]
async fn test_token_session_skips_login() -> Result<()> {
    let server = MockServer::start();
    let login_mock = server.mock(|when, then| {
        when.method(POST).path("/login");
        then.status(500);
    });
    let list_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/portfolios/9")
            .header("authorization", "Bearer external-idp");
        then.status(200).json_body(json!([]));
    });

    let config = ClientConfig::from_toml_str(&format!(
        r#"
[api]
base_url = "{}"

[auth]
mode = "token"
user_id = 9
token = "external-idp"
"#,
        server.base_url()
    ))?;

    let api = HttpPortfolioApi::new(&config)?;
    let credentials = config.credentials()?;
    let service = PortfolioService::connect(api, credentials.as_ref()).await?;

    assert!(service.portfolios().await?.is_empty());
    login_mock.assert_hits(0);
    list_mock.assert();
    Ok(())
}
