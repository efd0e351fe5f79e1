use crate::config::toml_config::{AuthMode, ClientConfig, DEFAULT_CONFIG_FILE};
use crate::core::form::{AssetRow, PortfolioForm};
use crate::domain::model::AllocationItem;
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "portfolio-client")]
#[command(about = "Manage leveraged crypto portfolios against the portfolio API")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    #[arg(long, help = "Override api.base_url")]
    pub base_url: Option<String>,

    #[arg(long, env = "PORTFOLIO_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "PORTFOLIO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, env = "PORTFOLIO_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long)]
    pub user_id: Option<i64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON on stderr")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Split a total amount across weighted items without contacting the API
    Allocate {
        #[arg(long)]
        total: f64,
        /// SYMBOL:WEIGHT, repeatable
        #[arg(long = "item", value_parser = parse_allocation_item, required = true)]
        items: Vec<AllocationItem>,
    },
    /// Create an account; the server returns generated credentials
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
    },
    Login,
    /// List the symbols available for portfolios
    Cryptos,
    List,
    Show {
        id: i64,
    },
    Create(CreateArgs),
    /// Edit an existing portfolio; omitted flags keep their current values
    Update {
        id: i64,
        #[command(flatten)]
        args: UpdateArgs,
    },
    Delete {
        id: i64,
    },
    Performance {
        id: i64,
        #[arg(long, help = "Also write the chart data to this CSV file")]
        csv: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub total: f64,
    #[arg(long)]
    pub api_key: String,
    #[arg(long)]
    pub api_secret: String,
    /// SYMBOL:LEVERAGE, repeatable; leverage defaults to 1
    #[arg(long = "asset", value_parser = parse_asset_row)]
    pub assets: Vec<AssetRow>,
}

#[derive(Debug, Clone, Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub total: Option<f64>,
    #[arg(long)]
    pub api_key: Option<String>,
    #[arg(long)]
    pub api_secret: Option<String>,
    #[arg(long = "asset", value_parser = parse_asset_row)]
    pub assets: Vec<AssetRow>,
}

impl CreateArgs {
    pub fn to_form(&self) -> PortfolioForm {
        let mut form = PortfolioForm::new().with_assets(self.assets.clone());
        form.name = self.name.clone();
        form.total_amount = Some(self.total);
        form.api_key = self.api_key.clone();
        form.api_secret = self.api_secret.clone();
        form
    }
}

impl UpdateArgs {
    pub fn apply(&self, mut form: PortfolioForm) -> PortfolioForm {
        if let Some(name) = &self.name {
            form.name = name.clone();
        }
        if let Some(total) = self.total {
            form.total_amount = Some(total);
        }
        if let Some(key) = &self.api_key {
            form.api_key = key.clone();
        }
        if let Some(secret) = &self.api_secret {
            form.api_secret = secret.clone();
        }
        if !self.assets.is_empty() {
            form = form.with_assets(self.assets.clone());
        }
        form
    }
}

fn split_pair(value: &str) -> std::result::Result<(&str, Option<u32>), String> {
    let (symbol, number) = match value.split_once(':') {
        Some((symbol, number)) => (symbol, Some(number)),
        None => (value, None),
    };
    if symbol.trim().is_empty() {
        return Err(format!("missing symbol in '{}'", value));
    }
    let number = number
        .map(|n| {
            n.trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid number in '{}': {}", value, e))
        })
        .transpose()?;
    Ok((symbol.trim(), number))
}

pub fn parse_allocation_item(value: &str) -> std::result::Result<AllocationItem, String> {
    match split_pair(value)? {
        (symbol, Some(weight)) => Ok(AllocationItem::new(symbol, weight)),
        (_, None) => Err(format!("expected SYMBOL:WEIGHT, got '{}'", value)),
    }
}

pub fn parse_asset_row(value: &str) -> std::result::Result<AssetRow, String> {
    let (symbol, leverage) = split_pair(value)?;
    Ok(AssetRow::new(symbol, leverage.unwrap_or(1)))
}

impl CliConfig {
    /// File configuration with command-line overrides applied on top.
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::load(&self.config)?;

        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }

        if let Some(token) = &self.token {
            let auth = config.auth_mut();
            auth.mode = AuthMode::Token;
            auth.token = Some(token.clone());
            if let Some(user_id) = self.user_id {
                auth.user_id = Some(user_id);
            }
        } else if self.username.is_some() || self.password.is_some() {
            let auth = config.auth_mut();
            auth.mode = AuthMode::Password;
            if let Some(username) = &self.username {
                auth.username = Some(username.clone());
            }
            if let Some(password) = &self.password {
                auth.password = Some(password.clone());
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allocation_item() {
        assert_eq!(
            parse_allocation_item("BTCUSDT:2").unwrap(),
            AllocationItem::new("BTCUSDT", 2)
        );
        assert!(parse_allocation_item("BTCUSDT").is_err());
        assert!(parse_allocation_item(":2").is_err());
        assert!(parse_allocation_item("BTC:-1").is_err());
    }

    #[test]
    fn test_parse_asset_row_defaults_leverage() {
        assert_eq!(parse_asset_row("ethusdt").unwrap(), AssetRow::new("ETHUSDT", 1));
        assert_eq!(parse_asset_row("SOLUSDT:2").unwrap().leverage, 2);
    }

    #[test]
    fn test_cli_parses_create() {
        let cli = CliConfig::try_parse_from([
            "portfolio-client",
            "--config",
            "/nonexistent.toml",
            "--username",
            "user",
            "--password",
            "pass",
            "create",
            "--name",
            "Main",
            "--total",
            "1000",
            "--api-key",
            "k",
            "--api-secret",
            "s",
            "--asset",
            "BTCUSDT:2",
            "--asset",
            "GALAUSDT",
        ])
        .unwrap();

        let Command::Create(args) = &cli.command else {
            panic!("expected create, got {:?}", cli.command);
        };
        let draft = args.to_form().to_draft().unwrap();
        assert_eq!(draft.assets.len(), 2);
        assert!((draft.assets[0].amount_in_usd - 2000.0 / 3.0).abs() < 1e-9);

        let config = cli.resolve().unwrap();
        let auth = config.auth.unwrap();
        assert_eq!(auth.mode, AuthMode::Password);
        assert_eq!(auth.username.as_deref(), Some("user"));
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let mut form = PortfolioForm::new();
        form.name = "Old".to_string();
        form.total_amount = Some(10.0);

        let args = UpdateArgs {
            name: None,
            total: Some(20.0),
            api_key: None,
            api_secret: None,
            assets: vec![],
        };
        let form = args.apply(form);
        assert_eq!(form.name, "Old");
        assert_eq!(form.total_amount, Some(20.0));
        assert_eq!(form.assets().len(), 1);
    }
}
