use anyhow::{Context, Result, anyhow};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::extraction::DEFAULT_DELIMITERS;
use crate::translation::{ChunkLimits, RedistributionPolicy, UnitKind};

/// Pipeline configuration module
/// This module handles the pipeline configuration including loading,
/// validating and saving configuration settings.
/// Represents the pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Size thresholds and time estimate
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Chunk budgets
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Extraction options
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Translation call options
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Size thresholds used by the format router
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoutingConfig {
    /// Largest document processed whole without caution
    #[serde(default = "default_whole_document_max_bytes")]
    pub whole_document_max_bytes: usize,

    /// Largest document processed whole at all; above this it is chunked
    #[serde(default = "default_caution_max_bytes")]
    pub caution_max_bytes: usize,

    /// Fixed part of the processing time estimate
    #[serde(default = "default_estimate_base_ms")]
    pub estimate_base_ms: u64,

    /// Per-KiB part of the processing time estimate
    #[serde(default = "default_estimate_ms_per_kib")]
    pub estimate_ms_per_kib: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            whole_document_max_bytes: default_whole_document_max_bytes(),
            caution_max_bytes: default_caution_max_bytes(),
            estimate_base_ms: default_estimate_base_ms(),
            estimate_ms_per_kib: default_estimate_ms_per_kib(),
        }
    }
}

/// Chunk budgets for each routing strategy
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChunkingConfig {
    /// Units per chunk in chunked mode
    #[serde(default = "default_max_units_per_chunk")]
    pub max_units_per_chunk: usize,

    /// Characters per chunk in chunked mode
    #[serde(default = "default_max_chars_per_chunk")]
    pub max_chars_per_chunk: usize,

    /// Characters per chunk in whole-document mode
    #[serde(default = "default_whole_document_max_chars")]
    pub whole_document_max_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_units_per_chunk: default_max_units_per_chunk(),
            max_chars_per_chunk: default_max_chars_per_chunk(),
            whole_document_max_chars: default_whole_document_max_chars(),
        }
    }
}

impl ChunkingConfig {
    /// Limits for chunked processing
    pub fn chunked_limits(&self) -> ChunkLimits {
        ChunkLimits::new(Some(self.max_units_per_chunk), Some(self.max_chars_per_chunk))
    }

    /// Limits for whole-document processing
    pub fn whole_document_limits(&self) -> ChunkLimits {
        ChunkLimits::chars(self.whole_document_max_chars)
    }
}

/// Structural extraction options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Record run/paragraph formatting per segment
    #[serde(default)]
    pub record_attributes: bool,

    /// Delimiter candidates in priority order
    #[serde(default = "default_delimiters")]
    pub delimiters: Vec<char>,

    /// Longest plain-text paragraph kept as one segment
    #[serde(default = "default_plain_text_max_segment_chars")]
    pub plain_text_max_segment_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            record_attributes: false,
            delimiters: default_delimiters(),
            plain_text_max_segment_chars: default_plain_text_max_segment_chars(),
        }
    }
}

/// Translation call options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    /// Maximum number of concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Request timeout in seconds; `None` leaves timeouts to the client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: Option<u64>,

    /// Keep numbers, dates and separators verbatim
    #[serde(default = "default_true")]
    pub passthrough_numeric: bool,

    /// Segment or paragraph translation units
    #[serde(default)]
    pub unit: UnitKind,

    /// How paragraph translations are spread over runs
    #[serde(default)]
    pub redistribution: RedistributionPolicy,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: default_concurrent_requests(),
            request_timeout_secs: default_request_timeout_secs(),
            passthrough_numeric: true,
            unit: UnitKind::default(),
            redistribution: RedistributionPolicy::default(),
        }
    }
}

impl TranslationConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter to hand to whichever logger the caller installs
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "es".to_string()
}

fn default_whole_document_max_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_caution_max_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_estimate_base_ms() -> u64 {
    1500
}

fn default_estimate_ms_per_kib() -> u64 {
    12
}

fn default_max_units_per_chunk() -> usize {
    50
}

fn default_max_chars_per_chunk() -> usize {
    4000
}

fn default_whole_document_max_chars() -> usize {
    30_000
}

fn default_delimiters() -> Vec<char> {
    DEFAULT_DELIMITERS.to_vec()
}

fn default_plain_text_max_segment_chars() -> usize {
    2000
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_request_timeout_secs() -> Option<u64> {
    Some(60)
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if self.routing.caution_max_bytes < self.routing.whole_document_max_bytes {
            return Err(anyhow!(
                "caution_max_bytes ({}) must not be below whole_document_max_bytes ({})",
                self.routing.caution_max_bytes,
                self.routing.whole_document_max_bytes
            ));
        }

        let budgets = [
            ("max_units_per_chunk", self.chunking.max_units_per_chunk),
            ("max_chars_per_chunk", self.chunking.max_chars_per_chunk),
            ("whole_document_max_chars", self.chunking.whole_document_max_chars),
            ("plain_text_max_segment_chars", self.extraction.plain_text_max_segment_chars),
            ("concurrent_requests", self.translation.concurrent_requests),
        ];
        if let Some((name, _)) = budgets.iter().find(|(_, value)| *value == 0) {
            return Err(anyhow!("{} must be greater than zero", name));
        }

        if self.extraction.delimiters.is_empty() {
            return Err(anyhow!("At least one delimiter candidate is required"));
        }
        if let Some(c) = self.extraction.delimiters.iter().find(|c| c.is_alphanumeric() || c.is_whitespace()) {
            return Err(anyhow!("Delimiter candidate {:?} would collide with ordinary text", c));
        }

        if self.translation.request_timeout_secs == Some(0) {
            return Err(anyhow!("request_timeout_secs must be greater than zero when set"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            routing: RoutingConfig::default(),
            chunking: ChunkingConfig::default(),
            extraction: ExtractionConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
