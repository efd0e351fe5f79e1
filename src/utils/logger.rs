use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins; otherwise only this crate logs, at debug when verbose.
fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        "portfolio_client=debug,info"
    } else {
        "portfolio_client=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Logs go to stderr so stdout stays clean for tables and CSV.
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(env_filter(false))
        .with(fmt::layer().with_writer(std::io::stderr).json())
        .init();
}
