//! blest - issue BLEST calls through the batching client
//!
//! Every positional call is issued in the same burst, so they travel in as
//! few batches as the configured batch size allows. Each outcome is printed
//! as one JSON line in the order the calls were given.

use anyhow::{Context, bail};
use blest_batch::utils::logging::{LoggingConfig, init_logging};
use blest_batch::{
    BlestClient, ClientConfig, LONG_VERSION, RequestOptions, Selector, build_info,
};
use clap::Parser;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "blest",
    version,
    long_version = LONG_VERSION,
    about = "Batch BLEST calls over HTTP"
)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "BLEST_CONFIG")]
    config: Option<PathBuf>,

    /// Batch endpoint URL (overrides the configuration file)
    #[arg(short, long)]
    url: Option<String>,

    /// Maximum requests per HTTP batch
    #[arg(long)]
    max_batch_size: Option<usize>,

    /// Debounce window in milliseconds
    #[arg(long)]
    buffer_delay: Option<u64>,

    /// Extra HTTP header, `name=value`; may be repeated
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Field selector applied to every call, as JSON (e.g. '["id","name"]')
    #[arg(long)]
    select: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Calls to issue: `route` or `route=<json parameters>`
    #[arg(required = true)]
    calls: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let logging = LoggingConfig::default()
        .with_level("warn")
        .with_json(cli.json_logs);
    if let Err(e) = init_logging(&logging) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    debug!(build = %build_info(), "Starting blest");
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every call succeeded
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(&cli).await?;
    let options = match &cli.select {
        Some(raw) => {
            let selector: Selector =
                serde_json::from_str(raw).context("--select must be a JSON array")?;
            RequestOptions::new().with_select(selector)
        }
        None => RequestOptions::new(),
    };
    let calls = cli
        .calls
        .iter()
        .map(|call| parse_call(call))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let client = BlestClient::new(config)?;
    let mut handles: Vec<_> = calls
        .into_iter()
        .map(|(route, parameters)| client.request(route, parameters, options.clone()))
        .collect();

    let mut all_ok = true;
    for handle in &mut handles {
        let outcome = handle.settled().await.unwrap_or_default();
        all_ok &= outcome.is_ok();
        let line = json!({
            "id": handle.id(),
            "route": handle.route(),
            "data": outcome.data,
            "error": outcome.error,
        });
        println!("{}", line);
    }

    client.dispose();
    Ok(all_ok)
}

async fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match (&cli.config, &cli.url) {
        (Some(path), _) => ClientConfig::from_file(path).await?,
        (None, Some(url)) => ClientConfig::new(url.clone()),
        (None, None) => ClientConfig::from_env()
            .context("no endpoint given: pass --url, --config or set BLEST_URL")?,
    };

    if let (Some(_), Some(url)) = (&cli.config, &cli.url) {
        config.url = url.clone();
    }
    if let Some(size) = cli.max_batch_size {
        config = config.with_max_batch_size(size);
    }
    if let Some(delay) = cli.buffer_delay {
        config = config.with_buffer_delay(Duration::from_millis(delay));
    }
    for header in &cli.headers {
        let (name, value) = header
            .split_once('=')
            .with_context(|| format!("header `{}` is not `name=value`", header))?;
        config = config.with_header(name.trim(), value.trim());
    }

    debug!(?config, "Resolved client configuration");
    Ok(config)
}

/// Split `route=<json>` into route and parameters
fn parse_call(call: &str) -> anyhow::Result<(String, Option<Value>)> {
    let (route, parameters) = match call.split_once('=') {
        Some((route, raw)) => {
            let parameters: Value = serde_json::from_str(raw)
                .with_context(|| format!("parameters of `{}` are not valid JSON", route))?;
            (route, Some(parameters))
        }
        None => (call, None),
    };

    if route.trim().is_empty() {
        bail!("empty route in `{}`", call);
    }
    Ok((route.trim().to_string(), parameters))
}
