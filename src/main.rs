use clap::Parser;
use portfolio_client::config::Command;
use portfolio_client::core::chart::PerformanceChart;
use portfolio_client::domain::model::{Portfolio, SignupRequest};
use portfolio_client::utils::error::ErrorSeverity;
use portfolio_client::utils::{logger, validation::Validate};
use portfolio_client::{
    allocate, format_amount, CliConfig, ClientConfig, HttpPortfolioApi, PortfolioError,
    PortfolioForm, PortfolioService, Result,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("Using config file {}", cli.config);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: CliConfig) -> Result<()> {
    let config = cli.resolve()?;
    config.validate()?;
    let decimals = config.decimals();
    let currency = config.currency().to_string();

    match cli.command {
        Command::Allocate { total, items } => {
            let result = allocate(total, &items)?;
            for (item, allocation) in items.iter().zip(result.iter()) {
                println!(
                    "{:<12} {}x  {} {}",
                    allocation.identifier,
                    item.weight,
                    format_amount(allocation.allocated_amount, decimals),
                    currency
                );
            }
            println!(
                "{:<12}     {} {}",
                "total",
                format_amount(result.total(), decimals),
                currency
            );
        }
        Command::Signup { name, email, phone } => {
            let api = HttpPortfolioApi::new(&config)?;
            let request = SignupRequest { name, email, phone };
            let (account, _) = PortfolioService::register(api, &request).await?;
            println!("✅ Account created and logged in (user id {})", account.user_id);
            println!("   username: {}", account.username);
            println!("   password: {}", account.password);
        }
        Command::Login => {
            let service = connect(&config).await?;
            println!("✅ Logged in as user {}", service.session().user_id);
        }
        Command::Cryptos => {
            let service = connect(&config).await?;
            for crypto in service.cryptos().await? {
                println!("{}", crypto);
            }
        }
        Command::List => {
            let service = connect(&config).await?;
            let portfolios = service.portfolios().await?;
            if portfolios.is_empty() {
                println!("No portfolios found.");
            }
            for p in portfolios {
                let symbols: Vec<&str> = p.assets.iter().map(|a| a.symbol.as_str()).collect();
                println!(
                    "{:>5}  {:<24} {:>12} {}  [{}]",
                    p.id,
                    p.name,
                    format_amount(p.total_amount, decimals),
                    currency,
                    symbols.join(", ")
                );
            }
        }
        Command::Show { id } => {
            let service = connect(&config).await?;
            print_portfolio(&service.portfolio(id).await?, decimals, &currency);
        }
        Command::Create(args) => {
            let service = connect(&config).await?;
            let form = args.to_form();
            print_calculated_values(&form, decimals, &currency)?;
            let id = service.create(&form).await?;
            println!("✅ Portfolio created with id {}", id);
        }
        Command::Update { id, args } => {
            let service = connect(&config).await?;
            let current = service.portfolio(id).await?;
            let form = args.apply(PortfolioForm::from_portfolio(&current));
            print_calculated_values(&form, decimals, &currency)?;
            service.update(id, &form).await?;
            println!("✅ Portfolio {} updated", id);
        }
        Command::Delete { id } => {
            let service = connect(&config).await?;
            service.delete(id).await?;
            println!("✅ Portfolio {} deleted", id);
        }
        Command::Performance { id, csv } => {
            let service = connect(&config).await?;
            let chart = service.performance_chart(id).await?;
            print_chart(&chart, decimals);
            if let Some(path) = csv {
                portfolio_client::utils::validation::validate_path("--csv", &path)?;
                std::fs::write(&path, chart.to_csv()?)?;
                println!("📁 Chart data saved to: {}", path);
            }
        }
    }

    Ok(())
}

async fn connect(config: &ClientConfig) -> Result<PortfolioService<HttpPortfolioApi>> {
    let api = HttpPortfolioApi::new(config)?;
    let credentials = config.credentials()?;
    PortfolioService::connect(api, credentials.as_ref()).await
}

fn print_calculated_values(form: &PortfolioForm, decimals: usize, currency: &str) -> Result<()> {
    let values = form.calculated_values()?.ok_or_else(|| {
        PortfolioError::validation("total_amount", "total amount must be greater than zero")
    })?;
    for (row, allocation) in form.assets().iter().zip(values.iter()) {
        println!(
            "  {:<12} {}x  {} {}",
            row.symbol,
            row.leverage,
            format_amount(allocation.allocated_amount, decimals),
            currency
        );
    }
    Ok(())
}

fn print_portfolio(portfolio: &Portfolio, decimals: usize, currency: &str) {
    println!("{}", portfolio.name);
    println!("  Total:    {} {}", format_amount(portfolio.total_amount, decimals), currency);
    println!("  Exchange: {}", portfolio.exchange);
    if let Some(status) = &portfolio.status {
        println!("  Status:   {}", status);
    }
    println!("  Assets:");
    for asset in &portfolio.assets {
        println!(
            "    {:<12} {} {} (leverage {}x)",
            asset.symbol,
            format_amount(asset.amount_in_usd, decimals),
            currency,
            asset.leverage
        );
    }
}

fn print_chart(chart: &PerformanceChart, decimals: usize) {
    if chart.is_empty() {
        println!("No performance data yet.");
        return;
    }
    println!("{}", chart.render_table(decimals));
}
