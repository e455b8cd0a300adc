use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::text::classify::{
    INGREDIENT_THRESHOLD, SECTION_BONUS, SERVINGS_SCAN_LINES, STEP_THRESHOLD, TITLE_SCAN_LINES,
};
use crate::text::steps::MAX_STEP_LEN;

/// Top-level settings structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Page fetching
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Line classifier tuning
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Output caps for the HTML path
    #[serde(default)]
    pub limits: LimitsConfig,
    /// OCR engine credentials
    #[serde(default)]
    pub ocr: OcrConfig,
}

/// Configuration for fetching pages by URL
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// User agent sent with the request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Thresholds and scan windows for the plain-text parser
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Minimum ingredient evidence for a line to become an ingredient
    #[serde(default = "default_ingredient_threshold")]
    pub ingredient_threshold: f32,
    /// Minimum step evidence for a line to become a step
    #[serde(default = "default_step_threshold")]
    pub step_threshold: f32,
    /// Bonus added to the score matching the current section
    #[serde(default = "default_section_bonus")]
    pub section_bonus: f32,
    /// Steps longer than this many characters get chunked
    #[serde(default = "default_max_step_len")]
    pub max_step_len: usize,
    /// Number of non-blank lines searched for a title
    #[serde(default = "default_title_scan_lines")]
    pub title_scan_lines: usize,
    /// Number of lines searched for servings at each end of the text
    #[serde(default = "default_servings_scan_lines")]
    pub servings_scan_lines: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            ingredient_threshold: default_ingredient_threshold(),
            step_threshold: default_step_threshold(),
            section_bonus: default_section_bonus(),
            max_step_len: default_max_step_len(),
            title_scan_lines: default_title_scan_lines(),
            servings_scan_lines: default_servings_scan_lines(),
        }
    }
}

/// Caps applied to HTML extraction results
#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    /// Maximum ingredients and steps returned
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// Maximum generic `ol li` items taken as steps
    #[serde(default = "default_max_fallback_steps")]
    pub max_fallback_steps: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            max_fallback_steps: default_max_fallback_steps(),
        }
    }
}

/// OCR engine configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct OcrConfig {
    /// Google Cloud Vision API key (GOOGLE_API_KEY is used when absent)
    pub google_api_key: Option<String>,
}

// Default value functions
fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124 Safari/537.36".to_string()
}

fn default_ingredient_threshold() -> f32 {
    INGREDIENT_THRESHOLD
}

fn default_step_threshold() -> f32 {
    STEP_THRESHOLD
}

fn default_section_bonus() -> f32 {
    SECTION_BONUS
}

fn default_max_step_len() -> usize {
    MAX_STEP_LEN
}

fn default_title_scan_lines() -> usize {
    TITLE_SCAN_LINES
}

fn default_servings_scan_lines() -> usize {
    SERVINGS_SCAN_LINES
}

fn default_max_items() -> usize {
    200
}

fn default_max_fallback_steps() -> usize {
    50
}

impl Settings {
    /// Load settings from file and environment variables
    ///
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_CLEANER__ prefix
    /// 2. recipe-cleaner.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_CLEANER__FETCH__TIMEOUT
    pub fn load() -> Result<Self, ConfigError> {
        load_settings()
    }
}

/// Load settings from file and environment variables, see [`Settings::load`]
pub fn load_settings() -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("recipe-cleaner").required(false))
        // Use double underscore for nested: RECIPE_CLEANER__CLASSIFIER__STEP_THRESHOLD
        .add_source(
            Environment::with_prefix("RECIPE_CLEANER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_timeout(), 30);
        assert_eq!(default_max_items(), 200);
        assert_eq!(default_max_fallback_steps(), 50);
        assert!(default_user_agent().starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_classifier_defaults_match_constants() {
        let config = ClassifierConfig::default();
        assert_eq!(config.ingredient_threshold, 1.8);
        assert_eq!(config.step_threshold, 1.6);
        assert_eq!(config.section_bonus, 0.8);
        assert_eq!(config.max_step_len, 220);
        assert_eq!(config.title_scan_lines, 40);
        assert_eq!(config.servings_scan_lines, 50);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = Config::builder()
            .add_source(config::File::from_str(
                "[classifier]\nstep_threshold = 2.0\n\n[limits]\nmax_items = 10\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.classifier.step_threshold, 2.0);
        assert_eq!(settings.classifier.ingredient_threshold, 1.8);
        assert_eq!(settings.limits.max_items, 10);
        assert_eq!(settings.limits.max_fallback_steps, 50);
        assert_eq!(settings.fetch.timeout, 30);
        assert!(settings.ocr.google_api_key.is_none());
    }

    #[test]
    fn test_load_settings_without_file() {
        // No config file in the crate root: defaults must load
        let settings = load_settings().unwrap();
        assert_eq!(settings.limits.max_items, 200);
    }
}
