use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "storyflow.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Override for the data directory; platform default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub concept: ConceptConfig,
    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptConfig {
    /// The core story concept offered as "currently selected" at the
    /// start of a session.
    #[serde(default = "default_concept")]
    pub default: String,
}

impl Default for ConceptConfig {
    fn default() -> Self {
        Self {
            default: default_concept(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Minimum length for headerless text to be adopted as an implicit
    /// first attack point.
    #[serde(default = "default_implicit_attack_min_chars")]
    pub implicit_attack_min_chars: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            implicit_attack_min_chars: default_implicit_attack_min_chars(),
        }
    }
}

fn default_concept() -> String {
    storyflow_engine::EngineOptions::default().default_concept
}

fn default_implicit_attack_min_chars() -> usize {
    50
}

/// Config directory (~/.config/storyflow/).
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("storyflow"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load config from disk, returning defaults if not found.
pub fn load_config() -> Result<CliConfig> {
    load_config_at(&config_path()?)
}

pub fn load_config_at(path: &Path) -> Result<CliConfig> {
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config at {}", path.display()))
}

pub fn save_config(config: &CliConfig) -> Result<()> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config dir at {}", dir.display()))?;
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    let path = config_path()?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(())
}

/// Print current config.
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    let path = config_path()?;
    println!("Config file: {}", path.display());
    println!();
    match &config.data_dir {
        Some(dir) => println!("data_dir = {}", dir.display()),
        None => println!("data_dir = (platform default)"),
    }
    println!();
    println!("[concept]");
    let preview: String = config.concept.default.chars().take(80).collect();
    println!("  default = {preview}...");
    println!();
    println!("[parser]");
    println!(
        "  implicit_attack_min_chars = {}",
        config.parser.implicit_attack_min_chars
    );
    Ok(())
}

/// Update config with provided values.
pub fn set_config(
    data_dir: Option<PathBuf>,
    concept: Option<String>,
    implicit_attack_min_chars: Option<usize>,
) -> Result<()> {
    let mut config = load_config()?;

    if let Some(dir) = data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(concept) = concept {
        config.concept.default = concept;
    }
    if let Some(threshold) = implicit_attack_min_chars {
        config.parser.implicit_attack_min_chars = threshold;
    }

    save_config(&config)?;
    println!("Configuration updated.");
    show_config()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_at(&dir.path().join("nope.toml")).unwrap();
        assert!(config.data_dir.is_none());
        assert_eq!(config.parser.implicit_attack_min_chars, 50);
        assert!(!config.concept.default.is_empty());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[parser]\nimplicit_attack_min_chars = 80\n").unwrap();

        let config = load_config_at(&path).unwrap();
        assert_eq!(config.parser.implicit_attack_min_chars, 80);
        assert!(!config.concept.default.is_empty());
    }
}
