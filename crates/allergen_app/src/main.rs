mod cli;
mod config;
mod report;

use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use allergen_core::AllergenMatcher;
use allergen_engine::{
    write_report, BatchWindow, CartPage, ReqwestFetcher, ScanEvent, ScanHandle, ScanPipeline,
    ScanRequest, ScanResponse,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use scan_logging::{scan_debug, scan_error, scan_info};
use url::Url;

use cli::Cli;
use config::{load_config, ScanConfig, DEFAULT_BASE_URL};

const SCAN_REQUEST_ID: u64 = 1;

fn main() -> ExitCode {
    let cli = Cli::parse();
    scan_logging::initialize(cli.log.into(), cli.log_level());

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            scan_error!("{:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// Runs one scan. `Ok(false)` when the scan itself reported a top-level failure.
fn run(cli: &Cli) -> Result<bool> {
    let config = load_config(cli.config.as_deref())?;
    let request = scan_request(cli, &config)?;
    let cart = read_cart(&cli.cart, cli.base_url.as_deref().or(config.base_url.as_deref()))?;

    let synonyms = Arc::new(config.synonym_table());
    let fetcher = ReqwestFetcher::new(config.fetch_settings())
        .context("failed to build the HTTP client")?;
    let width = cli.batch_width.unwrap_or(config.batch_width);
    let pipeline = ScanPipeline::new(Arc::new(fetcher), synonyms.clone())
        .with_window(BatchWindow::new(width));

    let handle = ScanHandle::new(pipeline);
    handle.submit(SCAN_REQUEST_ID, cart, request.clone());
    let response = wait_for_response(&handle)?;

    let query = AllergenMatcher::new(&synonyms).query(request.allergies());
    print!("{}", report::render(&response, &query));

    if let Some(output) = cli.output.as_deref() {
        let written = write_report(output, &response)
            .with_context(|| format!("failed to write report to {}", output.display()))?;
        scan_info!("Report written to {:?}", written);
    }

    Ok(response.success)
}

fn scan_request(cli: &Cli, config: &ScanConfig) -> Result<ScanRequest> {
    if let Some(path) = cli.request.as_deref() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read request {}", path.display()))?;
        return ScanRequest::from_json(&text)
            .with_context(|| format!("failed to parse request {}", path.display()));
    }
    let allergies = if cli.allergies.is_empty() {
        config.allergies.clone()
    } else {
        cli.allergies.clone()
    };
    Ok(ScanRequest::scrape_cart(allergies))
}

fn read_cart(path: &Path, base_url: Option<&str>) -> Result<CartPage> {
    let base = base_url.unwrap_or(DEFAULT_BASE_URL);
    let base_url = Url::parse(base).with_context(|| format!("invalid base URL {base}"))?;
    let markup = fs::read_to_string(path)
        .with_context(|| format!("failed to read cart page {}", path.display()))?;
    Ok(CartPage::new(markup, base_url))
}

fn wait_for_response(handle: &ScanHandle) -> Result<ScanResponse> {
    while let Some(event) = handle.recv() {
        match event {
            ScanEvent::Progress(progress) => scan_debug!(
                "Scan {} is {:?}: {} of {} items succeeded so far",
                progress.request_id,
                progress.phase,
                progress.items_succeeded,
                progress.items_total
            ),
            ScanEvent::Completed { response, .. } => return Ok(response),
        }
    }
    bail!("scan runtime stopped before the scan completed")
}
