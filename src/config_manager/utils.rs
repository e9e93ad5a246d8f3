use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::config_manager::main::Config;

/// Read a JSON-LD/JSON or YAML configuration file with environment variable
/// substitution.
pub fn read_config_file(config_path: &str) -> Result<Value> {
    if !Path::new(config_path).exists() {
        anyhow::bail!("Configuration file not found: {}", config_path);
    }

    let content = load_text_file_with_guess_encoding(config_path)?;
    if content.trim().is_empty() {
        anyhow::bail!("Configuration file is empty: {}", config_path);
    }

    let content = substitute_env_vars(&content)?;

    let path_lower = config_path.to_lowercase();
    let value = if path_lower.ends_with(".yaml") || path_lower.ends_with(".yml") {
        serde_yaml::from_str::<Value>(&content)
            .with_context(|| format!("Invalid YAML in {}", config_path))?
    } else {
        // @context is kept as an opaque value and otherwise ignored
        serde_json::from_str::<Value>(&content)
            .with_context(|| format!("Invalid JSON-LD in {}", config_path))?
    };
    Ok(value)
}

/// Replace `${VAR_NAME}` with the variable's value; unknown variables are
/// left untouched.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let replaced = pattern.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    Ok(replaced.into_owned())
}

/// Validate configuration data against the Config model
pub fn validate_config(config_data: &Value) -> Result<Config> {
    let config: Config = serde_json::from_value(config_data.clone())?;
    config.validate()?;
    Ok(config)
}

/// Load text file, stripping a UTF-8 BOM and falling back to GBK for files
/// that are not UTF-8.
pub fn load_text_file_with_guess_encoding(file_path: &str) -> Result<String> {
    let mut bytes = fs::read(file_path)?;
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(0..3);
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            debug!("{} is not UTF-8, decoding as GBK", file_path);
            let (cow, _, _) = encoding_rs::GBK.decode(e.as_bytes());
            Ok(cow.into_owned())
        }
    }
}

/// Try each candidate path in order and load the first file that exists.
///
/// Missing files are skipped; a file that exists but fails to parse or
/// validate is an error.
pub fn load_first_existing(paths: &[String]) -> Result<Option<(Config, String)>> {
    for path in paths {
        if !Path::new(path).exists() {
            debug!("No config at {}", path);
            continue;
        }
        let config = Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?;
        return Ok(Some((config, path.clone())));
    }
    Ok(None)
}
