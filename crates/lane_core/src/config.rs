use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assignment::PairingStrategy;
use crate::diversity::{SelectionOptions, DEFAULT_PER_GROUP_CAP};
use crate::error::ConfigError;
use crate::scoring::DEFAULT_DIVERSITY_BONUS;

/// Default radius ladder (miles) for the expanding search.
pub const DEFAULT_RADII_MILES: [f64; 3] = [75.0, 100.0, 125.0];

/// Unique market areas wanted per endpoint when not filling to ten pairs.
pub const DEFAULT_MIN_UNIQUE_MARKETS: usize = 5;

/// Unique market areas wanted per endpoint when filling to ten pairs.
pub const DEFAULT_FILL_MIN_UNIQUE_MARKETS: usize = 10;

pub const DEFAULT_TARGET_PAIRS: usize = 5;
pub const DEFAULT_FILL_TARGET_PAIRS: usize = 10;

fn default_radii_miles() -> Vec<f64> {
    DEFAULT_RADII_MILES.to_vec()
}

fn default_min_unique_markets() -> usize {
    DEFAULT_MIN_UNIQUE_MARKETS
}

fn default_fill_min_unique_markets() -> usize {
    DEFAULT_FILL_MIN_UNIQUE_MARKETS
}

fn default_target_pairs() -> usize {
    DEFAULT_TARGET_PAIRS
}

fn default_fill_target_pairs() -> usize {
    DEFAULT_FILL_TARGET_PAIRS
}

fn default_per_group_cap() -> usize {
    DEFAULT_PER_GROUP_CAP
}

fn default_diversity_bonus() -> f64 {
    DEFAULT_DIVERSITY_BONUS
}

/// Tunables for [`LaneCrawler`](crate::crawl::LaneCrawler).
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Search radii tried in order until the diversity target is met.
    #[serde(default = "default_radii_miles")]
    pub radii_miles: Vec<f64>,
    /// Unique market areas wanted per endpoint (`prefer_fill_to_10 == false`).
    #[serde(default = "default_min_unique_markets")]
    pub min_unique_markets: usize,
    /// Unique market areas wanted per endpoint (`prefer_fill_to_10 == true`).
    #[serde(default = "default_fill_min_unique_markets")]
    pub fill_min_unique_markets: usize,
    /// Alternates shortlisted per side, and so the most pairs returned.
    #[serde(default = "default_target_pairs")]
    pub target_pairs: usize,
    #[serde(default = "default_fill_target_pairs")]
    pub fill_target_pairs: usize,
    #[serde(default = "default_per_group_cap")]
    pub per_group_cap: usize,
    #[serde(default)]
    pub total_cap: Option<usize>,
    /// Bonus for a market area not yet used by an earlier alternate.
    #[serde(default = "default_diversity_bonus")]
    pub diversity_bonus: f64,
    #[serde(default)]
    pub pairing: PairingStrategy,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            radii_miles: default_radii_miles(),
            min_unique_markets: DEFAULT_MIN_UNIQUE_MARKETS,
            fill_min_unique_markets: DEFAULT_FILL_MIN_UNIQUE_MARKETS,
            target_pairs: DEFAULT_TARGET_PAIRS,
            fill_target_pairs: DEFAULT_FILL_TARGET_PAIRS,
            per_group_cap: DEFAULT_PER_GROUP_CAP,
            total_cap: None,
            diversity_bonus: DEFAULT_DIVERSITY_BONUS,
            pairing: PairingStrategy::default(),
        }
    }
}

impl CrawlConfig {
    pub fn with_radii_miles(mut self, radii: impl Into<Vec<f64>>) -> Self {
        self.radii_miles = radii.into();
        self
    }

    pub fn with_min_unique_markets(mut self, markets: usize) -> Self {
        self.min_unique_markets = markets;
        self
    }

    pub fn with_target_pairs(mut self, pairs: usize) -> Self {
        self.target_pairs = pairs;
        self
    }

    pub fn with_per_group_cap(mut self, cap: usize) -> Self {
        self.per_group_cap = cap;
        self
    }

    pub fn with_total_cap(mut self, cap: usize) -> Self {
        self.total_cap = Some(cap);
        self
    }

    pub fn with_diversity_bonus(mut self, bonus: f64) -> Self {
        self.diversity_bonus = bonus;
        self
    }

    pub fn with_pairing(mut self, pairing: PairingStrategy) -> Self {
        self.pairing = pairing;
        self
    }

    /// Diversity target for one endpoint.
    pub fn market_target(&self, prefer_fill_to_10: bool) -> usize {
        if prefer_fill_to_10 {
            self.fill_min_unique_markets
        } else {
            self.min_unique_markets
        }
    }

    /// Alternates shortlisted per endpoint.
    pub fn pair_target(&self, prefer_fill_to_10: bool) -> usize {
        if prefer_fill_to_10 {
            self.fill_target_pairs
        } else {
            self.target_pairs
        }
    }

    pub fn selection_options(&self) -> SelectionOptions {
        SelectionOptions {
            per_group_cap: self.per_group_cap,
            total_cap: self.total_cap,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radii_miles.is_empty() {
            return Err(ConfigError::Invalid("radii_miles cannot be empty".to_string()));
        }
        if let Some(bad) = self
            .radii_miles
            .iter()
            .find(|r| !r.is_finite() || **r <= 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "radii_miles must be positive finite numbers, got {bad}"
            )));
        }
        if self.per_group_cap == 0 {
            return Err(ConfigError::Invalid("per_group_cap must be at least 1".to_string()));
        }
        if self.total_cap == Some(0) {
            return Err(ConfigError::Invalid("total_cap must be at least 1 when set".to_string()));
        }
        if self.target_pairs == 0 || self.fill_target_pairs == 0 {
            return Err(ConfigError::Invalid("pair targets must be at least 1".to_string()));
        }
        if !self.diversity_bonus.is_finite() || self.diversity_bonus < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "diversity_bonus must be a non-negative finite number, got {}",
                self.diversity_bonus
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: CrawlConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
