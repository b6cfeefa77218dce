use crate::error::ConfigError;
use poi_extract::{FALLBACK_CONTAINER_SELECTORS, ROLE_ATTRIBUTE};
use poi_observe::DEFAULT_THRESHOLDS;
use poi_outline::TitleLimits;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables of the engine. Every field has a default, so a partial JSON document
/// only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavConfig {
    /// Trailing-edge delay between the last trigger and the rebuild pass.
    pub debounce_ms: u64,
    /// Used instead of `debounce_ms` while a reply is still streaming in.
    pub streaming_debounce_ms: Option<u64>,
    /// Gap kept above an entry scrolled into view.
    pub scroll_margin_px: f64,
    /// Content height change above which scroll position is restored by
    /// fraction instead of raw offset.
    pub layout_shift_threshold_px: f64,
    /// Animation frames on which the scroll restore is re-applied.
    pub restore_correction_passes: u32,
    pub visibility_thresholds: Vec<f64>,
    pub message_selector: String,
    pub role_attribute: String,
    pub fallback_container_selectors: Vec<String>,
    /// Prefix of every persisted key.
    pub storage_namespace: String,
    pub title_limit: usize,
    pub preview_limit: usize,
    pub code_header_limit: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            streaming_debounce_ms: None,
            scroll_margin_px: 60.0,
            layout_shift_threshold_px: 200.0,
            restore_correction_passes: 2,
            visibility_thresholds: DEFAULT_THRESHOLDS.to_vec(),
            message_selector: format!("[{}]", ROLE_ATTRIBUTE),
            role_attribute: ROLE_ATTRIBUTE.to_string(),
            fallback_container_selectors: FALLBACK_CONTAINER_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            storage_namespace: "poi-nav".to_string(),
            title_limit: 100,
            preview_limit: 80,
            code_header_limit: 40,
        }
    }
}

impl NavConfig {
    /// Parses and validates a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: NavConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "debounceMs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.streaming_debounce_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "streamingDebounceMs",
                reason: "must be greater than zero when set".to_string(),
            });
        }
        if self.visibility_thresholds.is_empty() {
            return Err(ConfigError::Invalid {
                field: "visibilityThresholds",
                reason: "at least one threshold is required".to_string(),
            });
        }
        if let Some(bad) = self
            .visibility_thresholds
            .iter()
            .find(|t| !(0.0..=1.0).contains(*t))
        {
            return Err(ConfigError::Invalid {
                field: "visibilityThresholds",
                reason: format!("{} is outside 0..=1", bad),
            });
        }
        if self.visibility_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid {
                field: "visibilityThresholds",
                reason: "thresholds must be strictly increasing".to_string(),
            });
        }
        if self.message_selector.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "messageSelector",
                reason: "must not be empty".to_string(),
            });
        }
        if self.storage_namespace.is_empty() {
            return Err(ConfigError::Invalid {
                field: "storageNamespace",
                reason: "must not be empty".to_string(),
            });
        }
        if self.scroll_margin_px < 0.0 || self.layout_shift_threshold_px < 0.0 {
            return Err(ConfigError::Invalid {
                field: "scrollMarginPx",
                reason: "pixel values must not be negative".to_string(),
            });
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn streaming_debounce(&self) -> Option<Duration> {
        self.streaming_debounce_ms.map(Duration::from_millis)
    }

    pub fn title_limits(&self) -> TitleLimits {
        TitleLimits {
            title: self.title_limit,
            preview: self.preview_limit,
            code_header: self.code_header_limit,
        }
    }
}
