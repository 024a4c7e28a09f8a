//! Settings - what the operator configures, and the compiled form the
//! engine runs on.
//!
//! Settings come from `setting.toml` with fixed overrides merged on top.
//! [`EngineConfig`] is built once per (re)load and never mutated.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use chat_corpus::TokenizerKind;

use crate::attention::TalkMode;
use crate::error::{EngineError, EngineResult};

/// Operator settings as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Nicknames the agent answers to.
    pub nicks: Vec<String>,

    /// Only senders matching this pattern are used as base messages.
    pub target_nick: Option<String>,

    /// Senders matching this pattern are never used as base messages.
    pub forbidden_nick: Option<String>,

    /// Talkativeness mode index (0-4) applied on every (re)load.
    pub default_mode: u8,

    /// Supervised mode: utterances only teach words and are not logged.
    pub teacher_mode: bool,

    pub disable_studying: bool,
    pub disable_commands: bool,
    pub disable_auto_saving: bool,

    /// How many of the newest messages are never used as base messages.
    pub recent_unused_count: usize,

    /// How many recent base messages are remembered to avoid repeats.
    pub repeat_proof_count: usize,

    pub tokenizer: TokenizerKind,

    /// Seed for the random source. Drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nicks: vec!["bot".to_string()],
            target_nick: None,
            forbidden_nick: None,
            default_mode: TalkMode::Normal.index(),
            teacher_mode: false,
            disable_studying: false,
            disable_commands: false,
            disable_auto_saving: false,
            recent_unused_count: 100,
            repeat_proof_count: 50,
            tokenizer: TokenizerKind::default(),
            seed: None,
        }
    }
}

impl Settings {
    /// Parse settings text and merge `fixed` over it.
    pub fn parse(content: &str, fixed: &toml::Table) -> EngineResult<Self> {
        let mut table: toml::Table = content.parse()?;
        for (key, value) in fixed {
            table.insert(key.clone(), value.clone());
        }
        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Load settings from a file. A missing file yields the defaults plus `fixed`.
    pub fn load(path: &Path, fixed: &toml::Table) -> EngineResult<Self> {
        if !path.exists() {
            tracing::warn!("No settings at {}, using defaults", path.display());
            return Self::parse("", fixed);
        }
        Self::parse(&fs::read_to_string(path)?, fixed)
    }
}

/// Compile a case-insensitive nickname pattern.
pub fn nick_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn optional_nick_regex(pattern: Option<&str>) -> EngineResult<Option<Regex>> {
    match pattern {
        Some(p) if !p.is_empty() => nick_regex(p)
            .map(Some)
            .map_err(|source| EngineError::InvalidPattern {
                pattern: p.to_string(),
                source,
            }),
        _ => Ok(None),
    }
}

/// Immutable engine configuration compiled from [`Settings`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub nicks: Vec<String>,

    /// Matches any of the agent's own nicknames.
    pub nick_pattern: Option<Regex>,

    /// `None` matches every sender.
    pub target_nick: Option<Regex>,

    /// `None` matches no sender.
    pub forbidden_nick: Option<Regex>,

    pub default_mode: TalkMode,
    pub supervised: bool,
    pub studying: bool,
    pub commands: bool,
    pub auto_save: bool,
    pub recent_unused_count: usize,
    pub repeat_proof_count: usize,
}

impl EngineConfig {
    /// Compile settings.
    pub fn from_settings(settings: &Settings) -> EngineResult<Self> {
        let nicks: Vec<String> = settings
            .nicks
            .iter()
            .filter(|n| !n.is_empty())
            .cloned()
            .collect();
        let nick_pattern = if nicks.is_empty() {
            None
        } else {
            let alternation = nicks
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation)?)
        };

        let default_mode = TalkMode::from_index(settings.default_mode).unwrap_or_else(|| {
            tracing::warn!("Unknown default_mode {}, using normal", settings.default_mode);
            TalkMode::Normal
        });

        Ok(Self {
            nicks,
            nick_pattern,
            target_nick: optional_nick_regex(settings.target_nick.as_deref())?,
            forbidden_nick: optional_nick_regex(settings.forbidden_nick.as_deref())?,
            default_mode,
            supervised: settings.teacher_mode,
            studying: !settings.disable_studying,
            commands: !settings.disable_commands,
            auto_save: !settings.disable_auto_saving,
            recent_unused_count: settings.recent_unused_count,
            repeat_proof_count: settings.repeat_proof_count,
        })
    }

    /// Whether `text` mentions one of the agent's nicknames.
    pub fn is_called(&self, text: &str) -> bool {
        self.nicks.iter().any(|n| text.contains(n.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_defaults() {
        let settings = Settings::parse("nicks = [\"ロイディ\"]\ndefault_mode = 3\n", &toml::Table::new()).unwrap();

        assert_eq!(settings.nicks, vec!["ロイディ"]);
        assert_eq!(settings.default_mode, 3);
        assert_eq!(settings.recent_unused_count, 100);
        assert_eq!(settings.tokenizer, TokenizerKind::CharClass);
    }

    #[test]
    fn test_fixed_overrides_win() {
        let mut fixed = toml::Table::new();
        fixed.insert("teacher_mode".into(), toml::Value::Boolean(true));
        fixed.insert("tokenizer".into(), toml::Value::String("whitespace".into()));

        let settings = Settings::parse("teacher_mode = false\n", &fixed).unwrap();
        assert!(settings.teacher_mode);
        assert_eq!(settings.tokenizer, TokenizerKind::Whitespace);
    }

    #[test]
    fn test_malformed_settings_error() {
        let result = Settings::parse("nicks = [", &toml::Table::new());
        assert!(matches!(result, Err(EngineError::Settings(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("setting.toml"), &toml::Table::new()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_config_patterns() {
        let settings = Settings {
            nicks: vec!["bot".into(), "a.b".into()],
            target_nick: Some("alice".into()),
            forbidden_nick: Some(String::new()),
            ..Settings::default()
        };
        let config = EngineConfig::from_settings(&settings).unwrap();

        assert!(config.target_nick.as_ref().unwrap().is_match("ALICE"));
        assert!(config.forbidden_nick.is_none());
        let nick_pattern = config.nick_pattern.as_ref().unwrap();
        assert!(nick_pattern.is_match("a.b"));
        assert!(!nick_pattern.is_match("axb"));
        assert!(config.is_called("hey bot"));
        assert!(!config.is_called("hey you"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let settings = Settings {
            target_nick: Some("(alice".into()),
            ..Settings::default()
        };
        let result = EngineConfig::from_settings(&settings);
        assert!(matches!(result, Err(EngineError::InvalidPattern { .. })));
    }

    #[test]
    fn test_unknown_mode_falls_back_to_normal() {
        let settings = Settings {
            default_mode: 9,
            ..Settings::default()
        };
        let config = EngineConfig::from_settings(&settings).unwrap();
        assert_eq!(config.default_mode, TalkMode::Normal);
    }
}
