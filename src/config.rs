//! Analyzer and workflow configuration.
//!
//! The lexicon and theme catalog are plain data. [`AnalyzerConfig::default`]
//! carries the built-in tables; a JSON file with the same shape replaces them.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const POSITIVE_WORDS: [&str; 10] = [
    "excellent",
    "great",
    "amazing",
    "outstanding",
    "satisfied",
    "fast",
    "good",
    "perfect",
    "love",
    "awesome",
];

const NEGATIVE_WORDS: [&str; 10] = [
    "bad",
    "terrible",
    "awful",
    "disappointed",
    "slow",
    "poor",
    "damaged",
    "unhelpful",
    "complicated",
    "difficult",
];

const THEMES: [(&str, &[&str]); 6] = [
    ("Product Quality", &["quality", "product", "item", "features"]),
    (
        "Shipping & Delivery",
        &["shipping", "delivery", "fast", "slow", "arrived"],
    ),
    ("Customer Service", &["service", "support", "help", "response"]),
    ("Website & UX", &["website", "navigate", "checkout", "process"]),
    ("Packaging", &["packaging", "package", "box"]),
    ("Value & Pricing", &["price", "value", "money", "cost"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().map(|word| word.to_string()).collect(),
            negative: NEGATIVE_WORDS.iter().map(|word| word.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDefinition {
    pub name: String,
    pub keywords: Vec<String>,
}

impl ThemeDefinition {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
        }
    }
}

pub fn default_themes() -> Vec<ThemeDefinition> {
    THEMES
        .iter()
        .map(|(name, keywords)| ThemeDefinition::new(*name, keywords))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub lexicon: Lexicon,
    #[serde(default = "default_themes")]
    pub themes: Vec<ThemeDefinition>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            lexicon: Lexicon::default(),
            themes: default_themes(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: AnalyzerConfig = serde_json::from_str(&raw)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Lowercases every lexicon word and theme keyword in place.
    pub fn normalize(&mut self) {
        for word in self
            .lexicon
            .positive
            .iter_mut()
            .chain(self.lexicon.negative.iter_mut())
        {
            *word = word.trim().to_lowercase();
        }
        for theme in &mut self.themes {
            theme.name = theme.name.trim().to_string();
            for keyword in &mut theme.keywords {
                *keyword = keyword.trim().to_lowercase();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive: HashSet<&str> = self.lexicon.positive.iter().map(String::as_str).collect();
        if let Some(word) = self
            .lexicon
            .negative
            .iter()
            .find(|word| positive.contains(word.as_str()))
        {
            return Err(Error::Config(format!(
                "'{word}' appears in both the positive and negative lexicon"
            )));
        }
        if let Some(word) = self
            .lexicon
            .positive
            .iter()
            .chain(self.lexicon.negative.iter())
            .find(|word| word.is_empty() || word.chars().any(char::is_whitespace))
        {
            return Err(Error::Config(format!(
                "lexicon entry '{word}' must be a single non-empty word"
            )));
        }

        let mut names = HashSet::new();
        for theme in &self.themes {
            if theme.name.is_empty() {
                return Err(Error::Config("theme name must not be empty".to_string()));
            }
            if !names.insert(theme.name.as_str()) {
                return Err(Error::Config(format!("duplicate theme '{}'", theme.name)));
            }
            if theme.keywords.is_empty() || theme.keywords.iter().any(String::is_empty) {
                return Err(Error::Config(format!(
                    "theme '{}' needs at least one non-empty keyword",
                    theme.name
                )));
            }
        }

        Ok(())
    }
}

/// Fixed delays of the demo workflow, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowTimings {
    pub type_interval_ms: u64,
    pub typing_settle_ms: u64,
    pub submit_delay_ms: u64,
    pub transfer_ms: u64,
    pub analyze_delay_ms: u64,
    pub display_ms: u64,
}

impl Default for WorkflowTimings {
    fn default() -> Self {
        Self {
            type_interval_ms: 25,
            typing_settle_ms: 1000,
            submit_delay_ms: 500,
            transfer_ms: 1500,
            analyze_delay_ms: 2000,
            display_ms: 3000,
        }
    }
}

impl WorkflowTimings {
    pub fn type_interval(&self) -> Duration {
        Duration::from_millis(self.type_interval_ms)
    }

    pub fn typing_settle(&self) -> Duration {
        Duration::from_millis(self.typing_settle_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn transfer(&self) -> Duration {
        Duration::from_millis(self.transfer_ms)
    }

    pub fn analyze_delay(&self) -> Duration {
        Duration::from_millis(self.analyze_delay_ms)
    }

    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.themes.len(), 6);
        assert_eq!(config.themes[1].name, "Shipping & Delivery");
    }

    #[test]
    fn overlapping_lexicon_is_rejected() {
        let mut config = AnalyzerConfig::default();
        config.lexicon.negative.push("great".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(message) if message.contains("great")));
    }

    #[test]
    fn duplicate_theme_is_rejected() {
        let mut config = AnalyzerConfig::default();
        config
            .themes
            .push(ThemeDefinition::new("Packaging", &["crate"]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_and_normalizes_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "lexicon": {{ "positive": ["Superb"], "negative": ["BROKEN"] }},
                "themes": [{{ "name": "Hardware", "keywords": ["Screen", "battery"] }}]
            }}"#
        )
        .unwrap();

        let config = AnalyzerConfig::from_path(file.path()).unwrap();
        assert_eq!(config.lexicon.positive, vec!["superb"]);
        assert_eq!(config.lexicon.negative, vec!["broken"]);
        assert_eq!(config.themes[0].keywords, vec!["screen", "battery"]);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        let config = AnalyzerConfig::from_path(file.path()).unwrap();
        assert_eq!(config, AnalyzerConfig::default());
    }
}
