//! Main SortTracker implementation
//!
//! This module provides the `SortTracker` struct that runs the per-frame
//! predict, associate, update, age, spawn and confirm cycle over vehicle
//! detections and hands out permanent identities.

use super::assoc::associate;
use super::track::{Track, TrackState};
use crate::config::{ReportingMode, TrackerConfig};
use crate::error::TrackError;
use crate::object::Object;
use log::{debug, trace, warn};

/// SortTracker - IoU + Kalman multi-object tracker
///
/// Tracks start tentative, become confirmed after `min_hits` consecutive
/// matches and are removed once they go more than `max_age` frames without
/// a match. Identities start at 1 and are never reused.
#[derive(Debug)]
pub struct SortTracker {
    config: TrackerConfig,

    // Internal state
    frame_count: usize,
    track_id_count: usize,
    trackers: Vec<Track>,
}

impl SortTracker {
    /// Create a new SortTracker.
    ///
    /// # Example
    /// ```
    /// use platetrack_rs::config::TrackerConfig;
    /// use platetrack_rs::sort::SortTracker;
    /// let tracker = SortTracker::new(TrackerConfig::dense().with_min_hits(2));
    /// assert_eq!(tracker.tracker_count(), 0);
    /// ```
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            track_id_count: 0,
            trackers: Vec::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Update tracker with the detections of the next frame.
    ///
    /// An empty slice is a valid frame: every track ages by one.
    ///
    /// # Returns
    /// One object per reported track, carrying the track identity and the
    /// score of the detection it matched this frame.
    pub fn update(&mut self, objects: &[Object]) -> Result<Vec<Object>, TrackError> {
        self.frame_count += 1;

        // Step 1: Predict all existing trackers
        let mut trks: Vec<[f32; 4]> = Vec::with_capacity(self.trackers.len());
        let frame_count = self.frame_count;
        self.trackers.retain_mut(|tracker| {
            let pos = tracker.predict();
            if pos.iter().any(|v| !v.is_finite()) {
                warn!(
                    "frame {}: dropping track {} with non-finite prediction",
                    frame_count,
                    tracker.id()
                );
                tracker.mark_as_removed();
                return false;
            }
            trks.push(pos);
            true
        });

        // Step 2: Associate predictions with detections
        let dets: Vec<[f32; 4]> = objects.iter().map(|o| o.get_rect().get_xyxy()).collect();
        let result = associate(&trks, &dets, self.config.iou_threshold)?;
        trace!(
            "frame {}: {} tracks, {} detections, {} matches",
            self.frame_count,
            trks.len(),
            dets.len(),
            result.matches.len()
        );

        // Step 3: Update matched trackers
        for &(trk_idx, det_idx) in &result.matches {
            let det = &objects[det_idx];
            let tracker = &mut self.trackers[trk_idx];
            tracker.update(det.get_rect(), det.get_prob())?;
            if tracker.state() == TrackState::Tentative
                && tracker.hit_streak() >= self.config.min_hits
            {
                tracker.mark_as_confirmed();
                debug!("frame {}: track {} confirmed", self.frame_count, tracker.id());
            }
        }

        // Step 4: Remove trackers that went unmatched for too long
        let max_age = self.config.max_age;
        for tracker in self.trackers.iter_mut() {
            if tracker.time_since_update() > max_age {
                tracker.mark_as_removed();
                debug!(
                    "frame {}: track {} removed after {} missed frames",
                    frame_count,
                    tracker.id(),
                    tracker.time_since_update()
                );
            }
        }
        self.trackers.retain(|t| t.state() != TrackState::Removed);

        // Step 5: Create new trackers for unmatched detections
        for &det_idx in &result.unmatched_detections {
            let det = &objects[det_idx];
            self.track_id_count += 1;
            let mut tracker = Track::new(det.get_rect(), det.get_prob(), self.track_id_count);
            if self.config.min_hits == 0 {
                tracker.mark_as_confirmed();
            }
            debug!(
                "frame {}: track {} born at {:?}",
                self.frame_count,
                tracker.id(),
                det.get_rect().get_xyxy()
            );
            self.trackers.push(tracker);
        }

        // Step 6: Report tracks matched or born this frame
        let output = self
            .trackers
            .iter()
            .filter(|t| t.time_since_update() == 0)
            .filter(|t| match self.config.reporting {
                ReportingMode::Confirmed => t.is_confirmed(),
                ReportingMode::All => true,
            })
            .map(|t| {
                // a filtered box can collapse; fall back to what was observed
                let rect = t.get_rect().unwrap_or(*t.last_observation());
                Object::new(rect, t.score(), Some(t.id()))
            })
            .collect();

        Ok(output)
    }

    /// Get current frame count.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Get number of live trackers.
    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }

    /// Live tracks, tentative ones included.
    pub fn tracks(&self) -> &[Track] {
        &self.trackers
    }
}
