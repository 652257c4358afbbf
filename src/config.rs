//! Configuration management
//!
//! Manages provider settings, per-request model assignments, content
//! language and the study timer length.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coach::llm::OPENROUTER_BASE_URL;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM provider settings
    #[serde(default)]
    pub provider: ProviderSettings,
    /// Model assignments for each kind of generated content
    #[serde(default)]
    pub models: ModelsConfig,
    /// Generated content settings
    #[serde(default)]
    pub content: ContentConfig,
    /// Study mate settings
    #[serde(default)]
    pub study: StudyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// OpenAI-compatible base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (0 = none)
    #[serde(default)]
    pub timeout_secs: u64,
    /// Completion token limit per request, reasoning included (0 = provider default)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_base_url() -> String {
    OPENROUTER_BASE_URL.to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: 0,
            max_tokens: default_max_tokens(),
        }
    }
}

/// Model assignments for the different request kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Dashboard micro-task routines
    #[serde(default = "default_flash_model")]
    pub routine: String,
    /// Study goal breakdowns
    #[serde(default = "default_flash_model")]
    pub study: String,
    /// Social simulation (needs more nuance)
    #[serde(default = "default_social_model")]
    pub social: String,
    /// Task praise
    #[serde(default = "default_flash_model")]
    pub praise: String,
    /// Rescue panel tips and comfort messages
    #[serde(default = "default_flash_model")]
    pub rescue: String,
    /// Outdoor missions
    #[serde(default = "default_flash_model")]
    pub quest: String,
}

fn default_flash_model() -> String {
    "google/gemini-2.5-flash".to_string()
}

fn default_social_model() -> String {
    "google/gemini-2.5-pro".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            routine: default_flash_model(),
            study: default_flash_model(),
            social: default_social_model(),
            praise: default_flash_model(),
            rescue: default_flash_model(),
            quest: default_flash_model(),
        }
    }
}

impl ModelsConfig {
    /// Get model for a role name
    pub fn get(&self, role: &str) -> Option<&str> {
        match role.to_lowercase().as_str() {
            "routine" | "dashboard" => Some(&self.routine),
            "study" => Some(&self.study),
            "social" => Some(&self.social),
            "praise" => Some(&self.praise),
            "rescue" | "tip" | "comfort" => Some(&self.rescue),
            "quest" | "outdoor" => Some(&self.quest),
            _ => None,
        }
    }

    /// Set model for a role name
    pub fn set(&mut self, role: &str, model: String) -> bool {
        match role.to_lowercase().as_str() {
            "routine" | "dashboard" => { self.routine = model; true }
            "study" => { self.study = model; true }
            "social" => { self.social = model; true }
            "praise" => { self.praise = model; true }
            "rescue" | "tip" | "comfort" => { self.rescue = model; true }
            "quest" | "outdoor" => { self.quest = model; true }
            _ => false,
        }
    }

    /// List all available roles
    pub fn roles() -> &'static [&'static str] {
        &["routine", "study", "social", "praise", "rescue", "quest"]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Language the model should answer in
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "English".to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self { language: default_language() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Focus session length
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
}

fn default_focus_minutes() -> u32 {
    25
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self { focus_minutes: default_focus_minutes() }
    }
}

impl StudyConfig {
    pub fn focus_seconds(&self) -> u32 {
        self.focus_minutes.max(1).saturating_mul(60)
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "sprout", "sprout")
        .context("Failed to get project directories")
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration ({})", config_path()?.display());
    println!();
    println!("  provider:       {}", config.provider.base_url);
    println!("  timeout:        {}", match config.provider.timeout_secs {
        0 => "none".to_string(),
        secs => format!("{}s", secs),
    });
    println!("  max tokens:     {}", match config.provider.max_tokens {
        0 => "provider default".to_string(),
        n => n.to_string(),
    });
    println!("  language:       {}", config.content.language);
    println!("  focus session:  {} min", config.study.focus_minutes);
    println!("  api key:        {}", if crate::security::has_api_key() { "configured" } else { "not set (offline content)" });
    println!();
    list_model_assignments(&config.models);

    println!("\nUse 'sprout config --set-model <role> <model>' to change a model");
    println!("   Available roles: {}", ModelsConfig::roles().join(", "));

    Ok(())
}

fn list_model_assignments(models: &ModelsConfig) {
    println!("Model Assignments:");
    for role in ModelsConfig::roles() {
        println!("  {:<10} {}", role, models.get(role).unwrap_or("-"));
    }
}

/// Set model for a specific role
pub fn set_model(role: &str, model: &str) -> Result<()> {
    let mut config = Config::load()?;

    if !config.models.set(role, model.to_string()) {
        anyhow::bail!("Unknown role '{}'. Available roles: {}", role, ModelsConfig::roles().join(", "));
    }

    config.save()?;
    println!("Model for '{}' set to: {}", role, model);
    Ok(())
}

/// Get model for a specific role
pub fn get_model(role: &str) -> Result<()> {
    let config = Config::load()?;

    match config.models.get(role) {
        Some(model) => println!("Model for '{}': {}", role, model),
        None => anyhow::bail!("Unknown role '{}'. Available roles: {}", role, ModelsConfig::roles().join(", ")),
    }

    Ok(())
}

/// List all model assignments
pub fn list_models() -> Result<()> {
    let config = Config::load()?;
    list_model_assignments(&config.models);
    Ok(())
}

/// Set the language generated content is written in
pub fn set_language(language: &str) -> Result<()> {
    let language = language.trim();
    if language.is_empty() {
        anyhow::bail!("Language cannot be empty");
    }
    let mut config = Config::load()?;
    config.content.language = language.to_string();
    config.save()?;
    println!("Content language set to {}", language);
    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}
