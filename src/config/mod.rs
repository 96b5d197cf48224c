pub mod constants;
mod schema;

pub use schema::{PromotionRequirements, RankingParameters, SheetNames};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

const CONFIG_FILE: &str = "ranking_parameters.yaml";

/// Get the config directory path (~/.config/clan-rating/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("clan-rating"))
}

/// Get the default config file path (~/.config/clan-rating/ranking_parameters.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

/// Load ranking parameters from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to the file. If None, uses the default path
///   (~/.config/clan-rating/ranking_parameters.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist
/// - The file cannot be read
/// - The YAML cannot be parsed or contains unknown fields
pub fn load_config(path: Option<PathBuf>) -> Result<RankingParameters> {
    let config_path = match path {
        Some(path) => path,
        None => get_config_path()?,
    };

    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Copy ranking_parameters.example.yaml there and adjust it",
            config_path.display()
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let params: RankingParameters = serde_saphyr::from_str(&config_content).with_context(|| {
        format!("Failed to parse config: invalid YAML in {}", config_path.display())
    })?;

    Ok(params)
}
