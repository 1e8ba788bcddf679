use crate::error::{Result, ScopeError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for scanning, chain building and snippet rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Tab stops are placed at multiples of this width
    pub tab_width: u32,

    /// Ancestors closer than this many lines to the queried line are omitted
    pub proximity_window: u32,

    /// Words that look like labels (`else:`) but introduce a block
    pub label_exempt_keywords: Vec<String>,

    /// Snippet rendering options
    pub format: FormatOptions,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            tab_width: 8,
            proximity_window: 20,
            label_exempt_keywords: ["else", "try", "finally", "except"]
                .into_iter()
                .map(String::from)
                .collect(),
            format: FormatOptions::default(),
        }
    }
}

impl ScopeConfig {
    /// Report every ancestor, however close it is to the queried line
    pub fn unfiltered() -> Self {
        Self {
            proximity_window: 0,
            ..Default::default()
        }
    }

    /// Keep control-flow snippets at full length
    #[must_use]
    pub fn with_full_snippets(mut self) -> Self {
        self.format.max_ident_len = usize::MAX;
        self.format.max_control_len = usize::MAX;
        self
    }

    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate().map_err(ScopeError::invalid_config)?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.tab_width == 0 {
            return Err("tab_width must be > 0".to_string());
        }

        if self.format.max_ident_len == 0 {
            return Err("format.max_ident_len must be > 0".to_string());
        }

        if self.format.control_keywords.iter().any(String::is_empty) {
            return Err("format.control_keywords must not contain empty keywords".to_string());
        }

        if self.format.strip_prefixes.iter().any(String::is_empty) {
            return Err("format.strip_prefixes must not contain empty prefixes".to_string());
        }

        Ok(())
    }
}

/// How a single ancestor line is abbreviated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Keywords (followed by whitespace) that mark a control-flow header
    pub control_keywords: Vec<String>,

    /// Leading tokens removed before rendering, repeatedly
    pub strip_prefixes: Vec<String>,

    /// Identifier/number runs longer than this are cut on control-flow lines
    pub max_ident_len: usize,

    /// Rendered length at which control-flow snippets stop
    pub max_control_len: usize,

    /// Emitted once in place of the cut part of a long run
    pub truncation_marker: char,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            control_keywords: ["if", "do", "for", "case", "while", "switch"]
                .into_iter()
                .map(String::from)
                .collect(),
            strip_prefixes: vec!["namespace ".to_string()],
            max_ident_len: 6,
            max_control_len: 20,
            truncation_marker: '$',
        }
    }
}
