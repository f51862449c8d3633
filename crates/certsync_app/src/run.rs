use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use certsync_core::{extract_records, BatchReport, Extraction};
use certsync_engine::{
    authenticate, collect_listing, parse_listing, replicate_batch, CodePrompt, Credentials,
    MigrationSettings, NoCodePrompt, WebDriverSurface,
};
use chrono::Local;
use engine_logging::{engine_info, engine_warn};

use crate::cli::{Args, SOURCE_PASSWORD_ENV, TARGET_PASSWORD_ENV};

/// Runs one migration as described by the command line.
///
/// Exits with failure when any attempted certificate could not be added.
pub async fn run(args: &Args, settings: &MigrationSettings) -> Result<ExitCode> {
    let extraction = match &args.listing_html {
        Some(path) => extract_from_file(path, args, settings)?,
        None => extract_from_source(args, settings).await?,
    };
    engine_info!(
        "Extracted {} certificate(s), skipped {} listing entries",
        extraction.records.len(),
        extraction.skipped.len()
    );

    if args.dry_run {
        print_extraction(&extraction);
        return Ok(ExitCode::SUCCESS);
    }

    let credentials = Credentials {
        identity: required(&args.target_identity, "--target-identity")?,
        password: password_from_env(TARGET_PASSWORD_ENV)?,
        one_time_code: args.one_time_code.clone(),
    };

    let surface = WebDriverSurface::start(&settings.webdriver)
        .await
        .context("starting a browser session for the claims portal")?;
    let outcome = submit(&surface, settings, &credentials, extraction).await;
    if let Err(err) = surface.close().await {
        engine_warn!("Could not close the claims portal session: {}", err);
    }
    let report = outcome?;

    println!("Run finished {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("{report}");
    Ok(if report.failure_count() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn submit(
    surface: &WebDriverSurface,
    settings: &MigrationSettings,
    credentials: &Credentials,
    extraction: Extraction,
) -> Result<BatchReport> {
    authenticate(
        surface,
        &settings.target_login,
        credentials,
        &TerminalCodePrompt,
        &settings.waits,
    )
    .await
    .context("logging in to the claims portal")?;
    let report = replicate_batch(surface, settings, extraction)
        .await
        .context("submitting certificates")?;
    Ok(report)
}

fn extract_from_file(path: &Path, args: &Args, settings: &MigrationSettings) -> Result<Extraction> {
    let html = fs::read_to_string(path)
        .with_context(|| format!("reading saved listing {}", path.display()))?;
    let base_url = args
        .profile_handle
        .as_deref()
        .map(|handle| settings.listing.url_for(handle));
    let entries = parse_listing(&html, &settings.listing.selectors, base_url.as_deref())
        .context("parsing saved listing")?;
    Ok(extract_records(entries))
}

async fn extract_from_source(args: &Args, settings: &MigrationSettings) -> Result<Extraction> {
    let handle = required(&args.profile_handle, "--profile-handle")?;
    let credentials = Credentials {
        identity: required(&args.source_identity, "--source-identity")?,
        password: password_from_env(SOURCE_PASSWORD_ENV)?,
        one_time_code: None,
    };
    let listing_url = settings.listing.url_for(&handle);

    let surface = WebDriverSurface::start(&settings.webdriver)
        .await
        .context("starting a browser session for the source profile")?;
    let entries = async {
        authenticate(
            &surface,
            &settings.source_login,
            &credentials,
            &NoCodePrompt,
            &settings.waits,
        )
        .await
        .context("logging in to the source profile")?;
        let entries = collect_listing(
            &surface,
            &listing_url,
            &settings.listing.selectors,
            &settings.waits,
        )
        .await
        .context("reading the certification listing")?;
        Ok::<_, anyhow::Error>(entries)
    }
    .await;
    if let Err(err) = surface.close().await {
        engine_warn!("Could not close the source profile session: {}", err);
    }

    Ok(extract_records(entries?))
}

/// Reads the portal's one-time code from the terminal when the code field shows.
struct TerminalCodePrompt;

impl CodePrompt for TerminalCodePrompt {
    fn one_time_code(&self) -> Option<String> {
        print!("One-time code for the claims portal: ");
        if let Err(err) = io::stdout().flush() {
            engine_warn!("Could not show the one-time code prompt: {}", err);
        }
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(err) => {
                engine_warn!("Could not read the one-time code: {}", err);
                None
            }
        }
    }
}

fn print_extraction(extraction: &Extraction) {
    println!("{} certificate(s) ready to submit:", extraction.records.len());
    for record in &extraction.records {
        println!("  {record}");
    }
    if !extraction.skipped.is_empty() {
        println!("Skipped listing entries:");
        for skipped in &extraction.skipped {
            println!("  #{} {:?}: {}", skipped.index, skipped.title, skipped.reason);
        }
    }
}

fn required(value: &Option<String>, flag: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => bail!("{flag} is required for this run"),
    }
}

fn password_from_env(var: &str) -> Result<String> {
    let password = env::var(var).with_context(|| format!("{var} is not set"))?;
    if password.is_empty() {
        bail!("{var} is empty");
    }
    Ok(password)
}
