//! Run configuration: counting policy and overlay settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::counting::{CountFilter, DEFAULT_MIN_CONFIDENCE, DEFAULT_TARGET_CLASS};
use crate::error::{Error, Result};

/// Named threshold policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Local window variant.
    #[default]
    Standard,
    /// Web dashboard variant, more permissive.
    Dashboard,
}

impl Preset {
    pub fn min_confidence(self) -> f32 {
        match self {
            Preset::Standard => DEFAULT_MIN_CONFIDENCE,
            Preset::Dashboard => 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub target_class: String,
    pub min_confidence: f32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            target_class: DEFAULT_TARGET_CLASS.to_string(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl CounterConfig {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            min_confidence: preset.min_confidence(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_class.trim().is_empty() {
            return Err(Error::config("target_class must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(Error::config(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }

    pub fn filter(&self) -> CountFilter {
        CountFilter::new(self.target_class.clone(), self.min_confidence)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// TrueType font for labels. Text is skipped when unset.
    pub font: Option<PathBuf>,
    pub label_scale: f32,
    pub banner_scale: f32,
    /// Banner wording, e.g. `People`. Defaults to the plural of the class.
    pub banner_label: Option<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font: None,
            label_scale: 15.0,
            banner_scale: 30.0,
            banner_label: None,
        }
    }
}

/// Everything a YAML config file may set.
///
/// ```yaml
/// counter:
///   target_class: car
///   min_confidence: 0.4
/// overlay:
///   font: /usr/share/fonts/TTF/DejaVuSans.ttf
///   banner_label: Vehicles
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub counter: CounterConfig,
    pub overlay: OverlayConfig,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(contents)?;
        config.counter.validate()?;
        Ok(config)
    }
}
