use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use weather_proxy_core::{
    AuditSink, Config, FileAuditSink, QueryConfig, ServiceError, SourceId, WeatherService,
    provider::provider_from_source,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-proxy", version, about = "Weather proxy CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific source.
    Configure {
        /// Source short name, e.g. "weatherstack".
        source: String,
    },

    /// Fetch the current weather for a city and print it as JSON.
    Show {
        /// City name, passed verbatim to the upstream provider.
        city: String,

        /// Source short name; if absent, the configured default is used.
        #[arg(long)]
        source: Option<String>,

        /// JSON-encoded per-request override, e.g. '{"apiKey":"...","baseUrl":"..."}'.
        #[arg(long)]
        config: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { source } => configure(&source),
            Command::Show { city, source, config } => {
                show(&city, source.as_deref(), config.as_deref()).await
            }
        }
    }
}

fn configure(source: &str) -> Result<()> {
    let id = SourceId::try_from(source)?;
    if id == SourceId::Mock {
        bail!("The '{id}' source needs no credentials.");
    }

    let mut cfg = Config::load()?;

    let access_key = inquire::Text::new("Access key:")
        .prompt()
        .context("Failed to read access key")?;
    let base_url = inquire::Text::new("Base URL (leave empty for the default):")
        .prompt()
        .context("Failed to read base URL")?;

    let base_url = if base_url.trim().is_empty() { None } else { Some(base_url.trim().to_string()) };

    cfg.upsert_source(id, access_key, base_url);
    cfg.save()?;

    println!("Saved configuration for source '{id}'.");
    println!("Config file: {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(city: &str, source: Option<&str>, config_json: Option<&str>) -> Result<()> {
    // Caller errors are rejected before any fetch or audit write.
    let overrides = config_json
        .map(serde_json::from_str::<QueryConfig>)
        .transpose()
        .context(r#"Invalid config: expected JSON like {"apiKey":"...","baseUrl":"..."}"#)?;

    let cfg = Config::load()?;
    let id = match source {
        Some(s) => SourceId::try_from(s)?,
        None => cfg.default_source_id()?,
    };

    let audit: Arc<dyn AuditSink> = Arc::new(FileAuditSink::new(Config::audit_log_path()?));
    let provider = provider_from_source(id, &cfg, Arc::clone(&audit))?;
    let service = WeatherService::new(id, provider, audit);

    match service.current_weather(city, overrides.as_ref()).await {
        Ok(dto) => {
            println!("{}", serde_json::to_string_pretty(&dto)?);
            Ok(())
        }
        Err(ServiceError::NotFound) => bail!("No weather data found for '{city}'."),
        Err(ServiceError::Fetch(err)) => bail!("Fetching weather for '{city}' failed: {err}"),
    }
}
