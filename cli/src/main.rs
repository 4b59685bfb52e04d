//! Cambio CLI
//!
//! Converts amounts between currencies using exchangerate-api.com rates.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cambio_common::{CurrencyCode, RatePairKey};
use cambio_fx::{
    ConversionRequest, CredentialSource, ExchangeRateApiClient, ExchangeRateApiConfig,
    RateResolver, ResolverConfig,
};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod display;
mod presets;

/// Cambio currency converter
#[derive(Parser, Debug)]
#[command(name = "cambio")]
#[command(about = "Convert amounts between currencies using live exchange rates")]
struct Args {
    /// Properties file holding `api_key` (used when EXR_API_KEY is unset)
    #[arg(long, global = true, default_value = cambio_fx::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Rate service root URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// How long fetched rates are reused, in seconds
    #[arg(long, global = true)]
    ttl_secs: Option<i64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert AMOUNT from BASE to TARGET
    Convert {
        base: String,
        target: String,
        amount: Decimal,

        /// Convert TARGET -> BASE instead
        #[arg(long)]
        inverse: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert using a predefined pair
    Quick {
        /// Pair number as shown by --list
        index: Option<usize>,
        amount: Option<Decimal>,

        /// Convert the pair the other way round
        #[arg(long)]
        inverse: bool,

        /// List the predefined pairs
        #[arg(long)]
        list: bool,
    },

    /// Show rates relative to BASE
    Rates {
        base: String,

        /// Comma-separated currencies to show (defaults to the recommended list)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },

    /// List recommended currencies
    Currencies,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // EXR_* and RUST_LOG may also come from a local .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so results on stdout stay clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    debug!(?args, "Parsed arguments");

    match &args.command {
        Command::Convert {
            base,
            target,
            amount,
            inverse,
            json,
        } => {
            let pair = RatePairKey::parse(base, target).context("Invalid currency pair")?;
            convert(&build_resolver(&args)?, pair, *amount, *inverse, *json).await
        }
        Command::Quick { list: true, .. } | Command::Quick { index: None, .. } => {
            print_quick_pairs();
            Ok(())
        }
        Command::Quick {
            index: Some(index),
            amount,
            inverse,
            ..
        } => {
            let pair = presets::quick_pair(*index)
                .with_context(|| format!("No quick pair numbered {}", index))?;
            let amount = (*amount).context("An amount is required")?;
            convert(&build_resolver(&args)?, pair, amount, *inverse, false).await
        }
        Command::Rates { base, only } => {
            let base = CurrencyCode::parse(base).context("Invalid base currency")?;
            let codes = if only.is_empty() {
                presets::recommended()
            } else {
                only.iter()
                    .map(|c| CurrencyCode::parse(c))
                    .collect::<Result<Vec<_>, _>>()
                    .context("Invalid currency in --only")?
            };
            show_rates(&build_resolver(&args)?, &base, &codes).await
        }
        Command::Currencies => {
            println!("Recommended currencies:");
            for code in presets::RECOMMENDED {
                println!("- {}", code);
            }
            Ok(())
        }
    }
}

/// Assemble the resolver from environment, flags and the credential file.
fn build_resolver(args: &Args) -> anyhow::Result<RateResolver> {
    let mut api = ExchangeRateApiConfig::from_env();
    if let Some(url) = &args.base_url {
        api.base_url = url.clone();
    }
    if let Some(secs) = args.timeout_secs {
        api.request_timeout = Duration::from_secs(secs);
    }
    api.validate()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    match CredentialSource::default().with_config_path(&args.config).load() {
        Ok(key) => api.api_key = Some(key),
        // Left unset: every fetch then fails with NotConfigured.
        Err(e) => warn!(error = %e, "No API key available"),
    }

    let mut resolver_config = ResolverConfig::from_env();
    if let Some(secs) = args.ttl_secs {
        resolver_config
            .set_ttl_secs(secs)
            .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    }
    resolver_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let client = ExchangeRateApiClient::new(api);
    Ok(RateResolver::new(Arc::new(client), resolver_config))
}

async fn convert(
    resolver: &RateResolver,
    pair: RatePairKey,
    amount: Decimal,
    inverse: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut request = ConversionRequest::new(pair, amount);
    if inverse {
        request = request.inverse();
    }

    let result = resolver.convert(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", display::conversion_line(&result));
    }
    Ok(())
}

async fn show_rates(
    resolver: &RateResolver,
    base: &CurrencyCode,
    codes: &[CurrencyCode],
) -> anyhow::Result<()> {
    let table = resolver.fetch_table(base).await?;

    println!("Rates for base {}:", table.base);
    for (code, rate) in table.select(codes) {
        println!("{}", display::table_line(&code, rate));
    }
    Ok(())
}

fn print_quick_pairs() {
    println!("Quick pairs:");
    for (i, (base, target)) in presets::QUICK_PAIRS.iter().enumerate() {
        println!("{:2}) {} -> {}", i + 1, base, target);
    }
}
