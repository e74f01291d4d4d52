mod batch;
mod quote;
mod search;
mod stats;
mod trending;
mod watch;

use std::time::{Duration, Instant};

use serde_json::Value;
use stocksnap_core::{SnapshotConfig, StockService};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::{Envelope, Metadata};

#[derive(Debug)]
pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let config = resolve_config(cli, SnapshotConfig::from_env()?)?;
    let service = StockService::from_config(config)?;
    let started = Instant::now();

    let command_result = match &cli.command {
        Command::Quote(args) => quote::run(args, &service).await?,
        Command::Search(args) => search::run(args, &service).await?,
        Command::Trending(args) => trending::run(args, &service).await?,
        Command::Batch(args) => batch::run(args, &service).await?,
        Command::Stats => stats::run(&service).await?,
        Command::Watch(args) => watch::run(args, &service).await?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
    } = command_result;

    let store = service.cache_stats().await.store;
    let mut metadata = Metadata::new(started.elapsed().as_millis() as u64, &store);
    if store.present && !store.fresh {
        metadata.push_warning("served from a snapshot older than its TTL");
    }
    for warning in warnings {
        metadata.push_warning(warning);
    }
    for error in errors {
        metadata.push_error(error);
    }

    Ok(Envelope::new(metadata, data))
}

/// Overlay command-line flags on the environment-derived configuration.
fn resolve_config(cli: &Cli, mut config: SnapshotConfig) -> Result<SnapshotConfig, CliError> {
    if let Some(secs) = cli.ttl_secs {
        config.refresh.ttl = Duration::from_secs(secs);
    }
    if let Some(secs) = cli.refresh_secs {
        config.refresh.period = Duration::from_secs(secs);
    }
    if let Some(ms) = cli.timeout_ms {
        config.feed.request_timeout = Duration::from_millis(ms);
    }
    if let Some(pages) = cli.pages {
        config.feed.pages = pages;
    }
    if let Some(page_size) = cli.page_size {
        config.feed.page_size = page_size;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use stocksnap_core::ValidationError;

    use super::*;

    #[test]
    fn flags_override_configuration() {
        let cli = Cli::try_parse_from([
            "stocksnap",
            "stats",
            "--ttl-secs",
            "120",
            "--refresh-secs",
            "15",
            "--timeout-ms",
            "2500",
            "--page-size",
            "250",
        ])
        .expect("valid args");

        let config = resolve_config(&cli, SnapshotConfig::default()).expect("valid config");

        assert_eq!(config.refresh.ttl, Duration::from_secs(120));
        assert_eq!(config.refresh.period, Duration::from_secs(15));
        assert_eq!(config.feed.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.feed.page_size, 250);
        assert_eq!(config.feed.pages, 4);
    }

    #[test]
    fn zero_pages_flag_is_rejected() {
        let cli = Cli::try_parse_from(["stocksnap", "stats", "--pages", "0"]).expect("valid args");

        let err = resolve_config(&cli, SnapshotConfig::default()).expect_err("must fail");

        assert!(matches!(
            err,
            CliError::Validation(ValidationError::ZeroConfigValue { field: "pages" })
        ));
    }
}
