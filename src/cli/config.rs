use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::{Map, Value as JsonValue};
use tokio::fs;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::{emit, OutputFormat};
use crate::config::Config;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Read one key, e.g. `resolver.tiers`
    Get {
        /// Dotted configuration key
        key: String,
    },

    /// Write one key to the configuration file
    Set {
        /// Dotted configuration key
        key: String,

        /// New value (JSON, or a bare string)
        value: String,
    },

    /// Check the configuration file
    Validate,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    let path = ctx.config_path();
    match args.action {
        ConfigAction::Show => {
            emit(&ctx.output(), ctx.config(), |config| {
                let body = serde_yaml::to_string(config).unwrap_or_default();
                format!("Effective configuration ({}):\n{}", path.display(), body)
            })?;
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Get { key } => {
            let json = serde_json::to_value(ctx.config())?;
            let segments = split_key(&key)?;
            let Some(value) = lookup(&json, &segments) else {
                bail!("{key} not found in configuration");
            };
            match ctx.output() {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
                OutputFormat::Human | OutputFormat::Yaml => {
                    print!("{}", serde_yaml::to_string(value)?)
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut json = serde_json::to_value(read_config_file(path).await?)?;
            let segments = split_key(&key)?;
            assign(&mut json, &segments, parse_value(&value))?;
            let config: Config = serde_json::from_value(json)
                .with_context(|| format!("{key} = {value} is not a valid setting"))?;
            config.validate()?;
            write_config_file(path, &config).await?;
            info!("Updated configuration key {}", key);
            println!("Saved configuration to {}", path.display());
        }
        ConfigAction::Validate => {
            if fs::try_exists(path).await? {
                read_config_file(path).await?.validate()?;
                println!("Configuration file {} is valid", path.display());
            } else {
                println!(
                    "No configuration file at {}; defaults are valid",
                    path.display()
                );
            }
        }
    }

    Ok(())
}

async fn read_config_file(path: &Path) -> Result<Config> {
    if !fs::try_exists(path).await? {
        return Ok(Config::default());
    }
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

async fn write_config_file(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, serde_yaml::to_string(config)?)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

fn parse_value(raw: &str) -> JsonValue {
    serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()))
}

fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key.split('.').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        bail!("configuration key cannot be empty");
    }
    Ok(segments)
}

fn lookup<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    path.iter()
        .try_fold(value, |current, segment| current.as_object()?.get(*segment))
}

fn assign(target: &mut JsonValue, path: &[&str], value: JsonValue) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        bail!("configuration key cannot be empty");
    };
    let mut current = target;
    for segment in parents {
        current = object_mut(current, segment)?
            .entry((*segment).to_string())
            .or_insert(JsonValue::Null);
    }
    object_mut(current, last)?.insert((*last).to_string(), value);
    Ok(())
}

fn object_mut<'a>(value: &'a mut JsonValue, segment: &str) -> Result<&'a mut Map<String, JsonValue>> {
    if value.is_null() {
        *value = JsonValue::Object(Map::new());
    }
    match value {
        JsonValue::Object(map) => Ok(map),
        _ => bail!("{segment} is not a section; cannot assign a nested key"),
    }
}
