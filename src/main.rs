//! ttc, trending topics for a location, from the command line.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  RawResponse  ┌──────────┐  TrendBatch  ┌──────────────┐  Verdict  ┌───────────┐
//! │ fetch.rs │ ────────────► │ source/  │ ───────────► │ staleness.rs │ ────────► │ format.rs │
//! │ (HTTP)   │               │ (decode) │              │ (filter)     │           │ (render)  │
//! └──────────┘               └──────────┘              └──────────────┘           └───────────┘
//! ```
//!
//! * **`source/`**: the `Decoder` trait, the XML and JSON decoders and the
//!   normalized `Trend` / `TrendBatch` types.
//! * **`fetch`**: issues the request and drives one decode-filter-render
//!   cycle.
//! * **`staleness`**: accepts a batch only if it is newer than the last one.
//! * **`format`**: renders an accepted batch in the selected output format.
//! * **`location`**: resolves country codes and woeids.
//! * **`config`**: environment-driven settings.
//! * **`main`**: wires everything together: parse args, set up logging, run
//!   one cycle and map the result to an exit code.

mod config;
mod fetch;
mod format;
mod location;
mod source;
mod staleness;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use fetch::{CycleOptions, FetchError, TrendsClient};
use format::{notice, OutputFormat};
use location::Location;
use source::WireFormat;
use staleness::LastKnown;

const GENERIC_ERROR_CODE: &str = "1000000000000001";

#[derive(Debug, Parser)]
#[command(
    name = "ttc",
    version,
    about = "Print the trending topics for a location",
    after_help = "Set TTC_BEARER_TOKEN to sign requests and raise the API calls limit."
)]
struct Opts {
    /// Two letter country code or woeid of the location
    #[arg(short, long, default_value = "1")]
    location: Location,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Normal)]
    format: OutputFormat,

    /// Representation requested from the API
    #[arg(short, long, value_enum, default_value_t = WireFormat::Xml)]
    wire: WireFormat,

    /// Print the known country codes and woeids, then exit
    #[arg(long)]
    locations: bool,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    // Help and version are "errors" to clap; everything goes to stdout.
    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(err) => {
            print!("{}", err.render());
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(opts.format);

    if opts.locations {
        print!("{}", location::known_locations());
        return ExitCode::SUCCESS;
    }

    let mut out = String::new();
    let result = run(&opts, &mut out).await;
    print!("{out}");

    match result {
        Ok(last_known) => {
            tracing::debug!(accepted = last_known.batch().is_some(), "cycle complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            print!("{}", report(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(format: OutputFormat) {
    let default_filter = if format.is_verbose() {
        "ttc=debug"
    } else {
        "ttc=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// One fetch cycle, starting from an empty last-known state.
async fn run(opts: &Opts, out: &mut String) -> Result<LastKnown> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let client = TrendsClient::new(&config);
    if !client.is_signed() {
        tracing::info!(
            "sending unauthenticated requests; set TTC_BEARER_TOKEN to raise the API calls limit"
        );
    }

    let options = CycleOptions {
        location: opts.location,
        format: opts.format,
        low_quota_threshold: config.low_quota_threshold,
    };

    let last_known =
        fetch::run_cycle(&client, opts.wire, &options, LastKnown::empty(), out).await?;
    Ok(last_known)
}

fn report(err: &anyhow::Error) -> String {
    match err.downcast_ref::<FetchError>() {
        Some(fetch_error) => fetch_error.report(),
        None => notice("error", &format!("{err:#}"), GENERIC_ERROR_CODE),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
