//! Configuration surface of the tracking and reconciliation engine.
//!
//! Every threshold the engine depends on lives here rather than in the
//! algorithms, and the whole tree can be loaded from JSON.

use crate::error::TrackError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/*----------------------------------------------------------------------------
Tracker configuration
----------------------------------------------------------------------------*/

/// Which tracks the tracker reports for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingMode {
    /// Only confirmed tracks matched this frame.
    #[default]
    Confirmed,
    /// Every track matched or born this frame, tentative ones included.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum IoU for a track/detection pair to be accepted
    pub iou_threshold: f32,
    /// A track is removed once it has gone more than this many frames
    /// without a match
    pub max_age: usize,
    /// Consecutive matches needed to confirm a tentative track
    pub min_hits: usize,
    pub reporting: ReportingMode,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::sparse()
    }
}

impl TrackerConfig {
    /// Sparse detections: tracks die after a single missed frame.
    pub fn sparse() -> Self {
        Self {
            iou_threshold: 0.3,
            max_age: 1,
            min_hits: 3,
            reporting: ReportingMode::Confirmed,
        }
    }

    /// Dense detections: tracks coast through short occlusions.
    pub fn dense() -> Self {
        Self {
            max_age: 12,
            ..Self::sparse()
        }
    }

    pub fn with_iou_threshold(self, iou_threshold: f32) -> Self {
        Self {
            iou_threshold,
            ..self
        }
    }

    pub fn with_max_age(self, max_age: usize) -> Self {
        Self { max_age, ..self }
    }

    pub fn with_min_hits(self, min_hits: usize) -> Self {
        Self { min_hits, ..self }
    }

    pub fn with_reporting(self, reporting: ReportingMode) -> Self {
        Self { reporting, ..self }
    }
}

/*----------------------------------------------------------------------------
Linking policy
----------------------------------------------------------------------------*/

/// How a plate is attributed when several vehicle boxes contain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPolicy {
    /// First containing vehicle in tracker output order.
    #[default]
    FirstMatch,
    /// Tightest containing vehicle; equal areas fall back to output order.
    SmallestArea,
}

/*----------------------------------------------------------------------------
Category rules
----------------------------------------------------------------------------*/

/// Identities in `[start, end)` are reported as `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl CategoryRule {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    pub fn matches(&self, identity: usize) -> bool {
        self.start <= identity && identity < self.end
    }
}

/// Piecewise mapping from identity to vehicle category.
///
/// Rules are tried in order; the first one whose range holds the identity
/// wins, otherwise `fallback` is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRules {
    pub rules: Vec<CategoryRule>,
    pub fallback: String,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            rules: vec![
                CategoryRule::new(1, 100, "car"),
                CategoryRule::new(100, 200, "bus"),
                CategoryRule::new(200, 300, "truck"),
            ],
            fallback: "unknown".to_string(),
        }
    }
}

impl CategoryRules {
    pub fn categorize(&self, identity: usize) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(identity))
            .map(|rule| rule.label.as_str())
            .unwrap_or(&self.fallback)
    }
}

/*----------------------------------------------------------------------------
Pipeline configuration
----------------------------------------------------------------------------*/

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tracker: TrackerConfig,
    pub link_policy: LinkPolicy,
    pub categories: CategoryRules,
}

impl PipelineConfig {
    /// Parse a configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, TrackError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TrackError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
