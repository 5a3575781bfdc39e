mod cli;

use crate::cli::{Command, LogFormatArg, CLI};
use anyhow::Context;
use clap::Parser;
use compactlink_idgen::{CompactIdGenerator, CompactIdSettings};
use compactlink_shortener::{
    ExpirationPolicy, InMemoryRepository, ShortenParams, Shortener, ShortenerService,
};
use std::io::Write;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    init_tracing(config.log_format);

    info!(
        machine_id = config.machine_id,
        base_url = %config.base_url,
        log_format = %config.log_format,
        "starting compactlink"
    );

    let settings = CompactIdSettings::builder()
        .machine_id(config.machine_id)
        .build();
    let generator =
        CompactIdGenerator::new(settings).context("invalid id generator configuration")?;

    match config.command {
        Command::Mint { count } => mint(generator, count).await,
        Command::Shorten { urls, expire_days } => {
            let service =
                ShortenerService::new(InMemoryRepository::new(), generator, config.base_url);
            shorten(&service, urls, expire_days).await
        }
    }
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

async fn mint(generator: CompactIdGenerator, count: usize) -> anyhow::Result<()> {
    // minting may sleep when a second's sequence space runs out
    let codes = tokio::task::spawn_blocking(move || {
        (0..count)
            .map(|_| generator.mint_short_code())
            .collect::<Result<Vec<_>, _>>()
    })
    .await
    .context("mint task did not complete")??;

    let mut stdout = std::io::stdout().lock();
    for code in codes {
        writeln!(stdout, "{code}")?;
    }
    Ok(())
}

async fn shorten<S: Shortener>(
    service: &S,
    urls: Vec<String>,
    expire_days: Option<u64>,
) -> anyhow::Result<()> {
    let expiration = match expire_days {
        Some(days) if days > 0 => {
            ExpirationPolicy::AfterDuration(Duration::from_secs(days.saturating_mul(86_400)))
        }
        _ => ExpirationPolicy::Never,
    };

    for url in urls {
        let shortened = service
            .shorten(ShortenParams {
                original_url: url.clone(),
                expiration: expiration.clone(),
                custom_alias: None,
            })
            .await
            .with_context(|| format!("failed to shorten {url}"))?;
        println!("{}", serde_json::to_string(&shortened)?);
    }
    Ok(())
}
