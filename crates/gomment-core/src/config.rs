//! Engine configuration: query limits and sibling-sampling quotas.
//!
//! Loaded from an optional JSON file. Every field has a default, so an empty
//! object (or no file at all) yields [`EngineConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

const WARN_COMMENT_DEPTH_MAX: i64 = 20;
const WARN_QUERY_LIMIT_MAX: i64 = 500;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: Limits,
    pub quotas: QuotaPolicy,
}

/// Bounds applied by the service layer to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Deepest `depth_level` a reply may have. 0 means replies are disabled.
    pub comment_depth_max: i64,
    /// Largest `max_depth` a tree query may ask for.
    pub initial_query_depth_max: i64,
    /// Largest number of comments a single query may return.
    pub query_limit_max: i64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            comment_depth_max: 8,
            initial_query_depth_max: 4,
            query_limit_max: 200,
        }
    }
}

/// Per-tier share (in percent) of the result budget for NSF/OSF sampling.
///
/// The root tier always receives whatever the deeper tiers leave over, so the
/// tiers sum exactly to the requested count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaPolicy {
    /// Level-1 share when `max_depth == 1`.
    pub shallow_child_percent: i64,
    /// Level-1 share when `max_depth >= 2`.
    pub deep_child_percent: i64,
    /// Level-2 share when `max_depth >= 2`.
    pub deep_grandchild_percent: i64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            shallow_child_percent: 25,
            deep_child_percent: 20,
            deep_grandchild_percent: 10,
        }
    }
}

impl QuotaPolicy {
    /// Split `max_count` into per-level quotas, root level first.
    ///
    /// `max_depth == 0` yields one tier, `1` two tiers, anything deeper three.
    /// Each non-root quota is `floor(max_count * percent / 100)`, computed
    /// without forming the product so any non-negative `max_count` is safe.
    #[must_use]
    pub fn tiers(&self, max_count: i64, max_depth: i64) -> Vec<i64> {
        let share =
            |percent: i64| (max_count / 100) * percent + (max_count % 100) * percent / 100;
        match max_depth {
            ..=0 => vec![max_count],
            1 => {
                let children = share(self.shallow_child_percent);
                vec![max_count - children, children]
            }
            _ => {
                let children = share(self.deep_child_percent);
                let grandchildren = share(self.deep_grandchild_percent);
                vec![max_count - children - grandchildren, children, grandchildren]
            }
        }
    }

    fn validate(&self) -> CoreResult<()> {
        let percents = [
            ("shallow_child_percent", self.shallow_child_percent),
            ("deep_child_percent", self.deep_child_percent),
            ("deep_grandchild_percent", self.deep_grandchild_percent),
        ];
        for (name, value) in percents {
            if !(0..=100).contains(&value) {
                return Err(CoreError::Config(format!(
                    "quota {name} must be in the range [0,100], was {value}"
                )));
            }
        }
        let deep = self.deep_child_percent + self.deep_grandchild_percent;
        if deep > 100 {
            return Err(CoreError::Config(format!(
                "deep_child_percent + deep_grandchild_percent must not exceed 100, was {deep}"
            )));
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Read a configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            tracing::info!(
                path = %path.display(),
                "configuration file not found, using default configuration"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::ConfigLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_json(&content).map_err(|e| match e {
            CoreError::ConfigLoad { reason, .. } => CoreError::ConfigLoad {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;

        tracing::debug!(?config, "loaded engine configuration");
        Ok(config)
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(content: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(content).map_err(|e| CoreError::ConfigLoad {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the limits for consistency. Large but legal values only warn.
    pub fn validate(&self) -> CoreResult<()> {
        let limits = &self.limits;

        if limits.comment_depth_max < 0 {
            return Err(CoreError::Config(format!(
                "the maximum comment depth (comment_depth_max) must be >= 0, was {}",
                limits.comment_depth_max
            )));
        }
        if limits.comment_depth_max > WARN_COMMENT_DEPTH_MAX {
            tracing::warn!(
                comment_depth_max = limits.comment_depth_max,
                "comment_depth_max is > {WARN_COMMENT_DEPTH_MAX}, this might degrade performance"
            );
        }

        if limits.initial_query_depth_max < 0
            || limits.initial_query_depth_max > limits.comment_depth_max
        {
            return Err(CoreError::Config(format!(
                "the maximum initial query depth (initial_query_depth_max) must be in the range [0,comment_depth_max], was {}",
                limits.initial_query_depth_max
            )));
        }

        if limits.query_limit_max < 1 {
            return Err(CoreError::Config(format!(
                "the maximum query limit (query_limit_max) must be > 0, was {}",
                limits.query_limit_max
            )));
        }
        if limits.query_limit_max > WARN_QUERY_LIMIT_MAX {
            tracing::warn!(
                query_limit_max = limits.query_limit_max,
                "query_limit_max is > {WARN_QUERY_LIMIT_MAX}, this might degrade performance"
            );
        }

        self.quotas.validate()
    }
}
