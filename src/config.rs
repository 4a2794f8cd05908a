// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Loader configuration.
//!
//! [`LoaderConfig`] is the typed form used by a load. [`PersistedConfig`] is
//! the document a host saves alongside a layout: every value is a string
//! and every field may be missing, in which case the default applies.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::io::TopicFilter;
use crate::transform::DEFAULT_MAX_ARRAY_SIZE;

/// Separator between channel names in [`PersistedConfig::selected_topics`].
pub const TOPIC_SEPARATOR: char = ';';

/// Errors reading or writing configuration documents.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Cannot access config file '{path}': {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML document could not be parsed
    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML document could not be written
    #[error("Cannot serialize config: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// JSON document could not be parsed or written
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Typed loader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Channels to load
    pub selected_topics: Vec<String>,
    /// Prefer `header.stamp` over arrival time
    pub use_header_stamp: bool,
    /// Apply renaming rules
    pub use_renaming_rules: bool,
    /// Array element limit
    pub max_array_size: usize,
    /// Drop arrays over the limit instead of truncating them
    pub discard_large_arrays: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            selected_topics: Vec::new(),
            use_header_stamp: false,
            use_renaming_rules: true,
            max_array_size: DEFAULT_MAX_ARRAY_SIZE,
            discard_large_arrays: true,
        }
    }
}

impl LoaderConfig {
    /// Channel filter for the selected topics.
    pub fn topic_filter(&self) -> TopicFilter {
        TopicFilter::include(self.selected_topics.iter().cloned())
    }

    /// Whether `channel` is selected.
    pub fn is_selected(&self, channel: &str) -> bool {
        self.selected_topics.iter().any(|t| t == channel)
    }
}

/// The persisted configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedConfig {
    /// Semicolon-joined channel names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_topics: Option<String>,
    /// `"true"` or `"false"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_header_stamp: Option<String>,
    /// `"true"` or `"false"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_renaming_rules: Option<String>,
    /// `"true"` or `"false"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discard_large_arrays: Option<String>,
    /// Decimal integer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_array_size: Option<String>,
}

impl PersistedConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render as pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a file; `.json` files are JSON, everything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if is_json(path) {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }

    /// Save to a file; `.json` files are JSON, everything else TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = if is_json(path) {
            self.to_json_string()?
        } else {
            self.to_toml_string()?
        };
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Typed settings. Missing or unparsable values take their default.
    pub fn to_loader_config(&self) -> LoaderConfig {
        let defaults = LoaderConfig::default();
        LoaderConfig {
            selected_topics: self
                .selected_topics
                .as_deref()
                .map(split_topics)
                .unwrap_or(defaults.selected_topics),
            use_header_stamp: parse_flag(&self.use_header_stamp, defaults.use_header_stamp),
            use_renaming_rules: parse_flag(&self.use_renaming_rules, defaults.use_renaming_rules),
            discard_large_arrays: parse_flag(
                &self.discard_large_arrays,
                defaults.discard_large_arrays,
            ),
            max_array_size: self
                .max_array_size
                .as_deref()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_array_size),
        }
    }
}

impl From<&LoaderConfig> for PersistedConfig {
    fn from(config: &LoaderConfig) -> Self {
        let sep = TOPIC_SEPARATOR.to_string();
        Self {
            selected_topics: Some(config.selected_topics.join(&sep)),
            use_header_stamp: Some(config.use_header_stamp.to_string()),
            use_renaming_rules: Some(config.use_renaming_rules.to_string()),
            discard_large_arrays: Some(config.discard_large_arrays.to_string()),
            max_array_size: Some(config.max_array_size.to_string()),
        }
    }
}

impl From<&PersistedConfig> for LoaderConfig {
    fn from(doc: &PersistedConfig) -> Self {
        doc.to_loader_config()
    }
}

/// Chooses channels and settings when no persisted document exists.
///
/// The host implements this with a dialog; returning `None` declines the
/// load.
pub trait ChannelSelector {
    /// `channels` lists `(channel, type name)` pairs; `defaults` holds the
    /// last-used settings.
    fn select(&mut self, channels: &[(String, String)], defaults: &LoaderConfig)
        -> Option<LoaderConfig>;
}

/// Selector that accepts a fixed configuration without asking.
#[derive(Debug, Clone)]
pub struct FixedSelector(pub LoaderConfig);

impl ChannelSelector for FixedSelector {
    fn select(&mut self, _channels: &[(String, String)], _defaults: &LoaderConfig) -> Option<LoaderConfig> {
        Some(self.0.clone())
    }
}

/// Selector that picks every channel and keeps the given defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAll;

impl ChannelSelector for SelectAll {
    fn select(&mut self, channels: &[(String, String)], defaults: &LoaderConfig) -> Option<LoaderConfig> {
        Some(LoaderConfig {
            selected_topics: channels.iter().map(|(name, _)| name.clone()).collect(),
            ..defaults.clone()
        })
    }
}

/// Selector that always declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl ChannelSelector for Decline {
    fn select(&mut self, _channels: &[(String, String)], _defaults: &LoaderConfig) -> Option<LoaderConfig> {
        None
    }
}

fn split_topics(joined: &str) -> Vec<String> {
    joined
        .split(TOPIC_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn parse_flag(value: &Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        Some("true") => true,
        Some("false") => false,
        _ => default,
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
