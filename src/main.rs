/// Command-line entry point
/// Shows an account's balance valued in the quote currency, once or on a fixed refresh interval
use clap::Parser;
use ethereum_balance_client::{
    validation::Validator,
    BalanceQuery, BalanceService, BalanceServiceTrait, Config, ConvertedBalance, FetchError,
    ProviderFactory,
};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ethereum-balance-client", version, about)]
pub struct Cli {
    /// Account address, passed to the node unchanged
    pub address: String,

    /// Asset the balance is held in
    #[arg(long)]
    pub base: Option<String>,

    /// Currency to value the balance in
    #[arg(long)]
    pub quote: Option<String>,

    /// Keep refreshing until interrupted
    #[arg(long)]
    pub watch: bool,

    /// Seconds between refreshes in watch mode
    #[arg(long)]
    pub interval: Option<u64>,

    /// Request balance and rate at the same time
    #[arg(long)]
    pub concurrent: bool,

    /// Print each result as a JSON object
    #[arg(long)]
    pub json: bool,
}

/// Validated request derived from the command line and configuration
#[derive(Debug, Clone)]
pub struct Request {
    pub query: BalanceQuery,
    pub base_symbol: String,
    pub quote_symbol: String,
}

/// Used when the configured level is blank or not a valid filter
const FALLBACK_LOG_LEVEL: &str = "info";

/// Filter built from the configured `RUST_LOG` value
pub fn log_filter(level: &str) -> EnvFilter {
    let level = level.trim();
    if level.is_empty() {
        return EnvFilter::new(FALLBACK_LOG_LEVEL);
    }
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LOG_LEVEL))
}

/// Initialize logging subsystem. Logs go to stderr so stdout carries only results.
pub fn initialize_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(level))
        .with_writer(std::io::stderr)
        .json()
        .init();
}

/// Load configuration, apply command-line overrides, and validate
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(base) = &cli.base {
        config.base_symbol = base.clone();
    }
    if let Some(quote) = &cli.quote {
        config.quote_symbol = quote.clone();
    }
    if let Some(interval) = cli.interval {
        config.refresh_interval_seconds = interval;
    }
    if cli.concurrent {
        config.concurrent_fetch = true;
    }
    config.validate()?;
    Ok(config)
}

pub fn build_request(cli: &Cli, config: &Config) -> anyhow::Result<Request> {
    Ok(Request {
        query: BalanceQuery::new(Validator::validate_address_input(&cli.address)?),
        base_symbol: Validator::validate_symbol("base", &config.base_symbol)?,
        quote_symbol: Validator::validate_symbol("quote", &config.quote_symbol)?,
    })
}

/// Initialize providers and the conversion service
pub fn initialize_service(config: &Config) -> anyhow::Result<BalanceService> {
    let (balance_provider, rate_provider) = ProviderFactory::create_providers(config)?;
    info!("Providers initialized");
    Ok(BalanceService::new(balance_provider, rate_provider).with_strategy(config.fetch_strategy()))
}

/// Text shown for one refresh. A failure is shown as unavailable, never as a number.
pub fn render(
    result: &Result<ConvertedBalance, FetchError>,
    request: &Request,
    json: bool,
) -> String {
    match (result, json) {
        (Ok(converted), true) => {
            serde_json::to_string(converted).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
        }
        (Ok(converted), false) => format!(
            "{} {} | 1 {} = {} {} | {} {}",
            converted.balance.display_rounded(),
            converted.base_symbol,
            converted.base_symbol,
            converted.rate.display_rounded(),
            converted.quote_symbol,
            converted.display_value(),
            converted.quote_symbol,
        ),
        (Err(e), true) => serde_json::json!({
            "address": request.query.address,
            "available": false,
            "error": e.to_string(),
        })
        .to_string(),
        (Err(e), false) => format!("Balance in {} unavailable: {}", request.quote_symbol, e),
    }
}

async fn refresh(
    service: &BalanceService,
    request: &Request,
) -> Result<ConvertedBalance, FetchError> {
    service
        .get_converted_balance(&request.query, &request.base_symbol, &request.quote_symbol)
        .await
}

/// Refresh on a fixed interval until Ctrl-C. An in-flight refresh is abandoned on shutdown.
pub async fn watch(
    service: &BalanceService,
    request: &Request,
    period: Duration,
    json: bool,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        // Both legs are fetched on every tick; the rate is never reused across ticks
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, abandoning in-flight refresh");
                return Ok(());
            }
            result = refresh(service, request) => {
                println!("{}", render(&result, request, json));
            }
        }
    }
}

/// Main application logic (extracted for testing)
pub async fn run_application(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    initialize_logging(&config.log_level);
    info!("Starting ethereum-balance-client");
    info!(
        node_rpc_url = %config.node_rpc_url,
        market_data_url = %config.market_data_url,
        node_key_present = config.node_api_key().is_some(),
        market_key_present = config.market_data_api_key().is_some(),
        "Configuration loaded"
    );

    let request = build_request(&cli, &config)?;
    let service = initialize_service(&config)?;

    if cli.watch {
        let period = Duration::from_secs(config.refresh_interval_seconds);
        return watch(&service, &request, period, cli.json).await;
    }

    let result = refresh(&service, &request).await;
    println!("{}", render(&result, &request, cli.json));
    if let Err(e) = result {
        warn!(error = %e, "Balance unavailable");
        return Err(e.into());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_application(cli).await.map_err(|e| {
        error!("Application error: {}", e);
        e
    })
}
