//! Handlers for `hub config` subcommands.
//!
//! Values are addressed by dotted keys (`server.port`, `media.cloud_name`)
//! over the TOML form of [`HubConfig`].

use std::path::Path;

use hub_api::HubConfig;
use hub_api::config::PROJECT_NAME;

use crate::cli::ConfigAction;
use crate::{Error, Result};

/// Runs one `hub config` subcommand.
pub fn handle_config_command(config_path: Option<&Path>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => {
            println!("{}", config_get(config_path, &key)?);
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let path = config_set(config_path, &key, &value)?;
            println!("Set {key} = {value} in {}", path.display());
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let path = config_init(file.as_deref().or(config_path), force)?;
            println!("Config file created at {}", path.display());
            Ok(())
        }
        ConfigAction::Export { docker_env } => {
            let config = HubConfig::load(config_path)?;
            for line in export_lines(&config, docker_env) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

/// Show the resolved config file path.
pub fn cmd_config_path(config_path: Option<&Path>) -> Result<()> {
    let path = HubConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory for this platform"))?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(file does not exist; run `hub config init` to create it)");
    }
    Ok(())
}

/// The value at a dotted key of the effective configuration, formatted
/// for display.
pub fn config_get(config_path: Option<&Path>, key: &str) -> Result<String> {
    let config = HubConfig::load(config_path)?;
    let value = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    get_nested_value(&value, key)
        .map(format_toml_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Sets a dotted key in the config file, returning the file path.
///
/// The result must still parse as a [`HubConfig`]; otherwise the file is
/// left untouched.
pub fn config_set(config_path: Option<&Path>, key: &str, value: &str) -> Result<std::path::PathBuf> {
    let path = HubConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `hub config init` first.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    set_nested_value(&mut doc, key, parse_value(value))?;
    doc.clone()
        .try_into::<HubConfig>()
        .map_err(|e| Error::config(format!("{key} = {value} is not valid: {e}")))?;

    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(path)
}

/// Writes a default config file, returning its path.
pub fn config_init(file: Option<&Path>, force: bool) -> Result<std::path::PathBuf> {
    let path = match file {
        Some(p) => p.to_path_buf(),
        None => HubConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = HubConfig::default().to_toml_string()?;
    let header = format!("# {PROJECT_NAME} configuration\n\n");
    std::fs::write(&path, header + &toml_str).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(path)
}

/// The configuration as `KEY=VALUE` lines, or `--env KEY=VALUE` for
/// docker.
pub fn export_lines(config: &HubConfig, docker_env: bool) -> Vec<String> {
    config
        .to_env_vars()
        .into_iter()
        .map(|(key, value)| {
            if docker_env {
                format!("--env {key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect()
}

/// Navigate a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
pub fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let last = match parts.pop() {
        Some(last) if !last.is_empty() => last,
        _ => return Err(Error::config("Empty key path")),
    };

    let mut current = root;
    for part in parts {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part)
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Parse a string value into a TOML value, auto-detecting the type.
///
/// Priority: bool, integer, float, string.
pub fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => return toml::Value::Boolean(true),
        "false" => return toml::Value::Boolean(false),
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(s.to_string())
}

/// Format a TOML value for display on stdout.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(items) => {
            let items: Vec<String> = items.iter().map(format_toml_value).collect();
            items.join(",")
        }
        toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}
