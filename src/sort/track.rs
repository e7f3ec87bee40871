//! Single track management for the SORT tracker
//!
//! This module provides the `Track` struct that represents one tracked
//! vehicle: a Kalman motion model plus lifecycle bookkeeping.

use super::kalman_filter::{DetectBox, KalmanFilter};
use crate::error::TrackError;
use crate::rect::Rect;

/*----------------------------------------------------------------------------
Track State enums
----------------------------------------------------------------------------*/

/// Lifecycle of a track: `Tentative -> Confirmed -> Removed`, or
/// `Tentative -> Removed` when it ages out before confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Tentative,
    Confirmed,
    Removed,
}

/*----------------------------------------------------------------------------
Track struct
----------------------------------------------------------------------------*/

/// Represents an individual tracked object using Kalman filter state estimation.
pub struct Track {
    /// Kalman filter for state estimation
    kf: KalmanFilter,
    /// Permanent identity assigned at birth
    id: usize,
    state: TrackState,
    /// Frames since last successful update
    time_since_update: usize,
    /// Total successful updates
    hits: usize,
    /// Consecutive frames with successful detections
    hit_streak: usize,
    /// Total predictions since the track was created
    age: usize,
    /// Detection that last matched this track
    last_observation: Rect<f32>,
    score: f32,
}

impl Track {
    /// Create a new tentative track from the detection that spawned it.
    pub fn new(rect: &Rect<f32>, score: f32, id: usize) -> Self {
        let z = DetectBox::from_iterator(convert_bbox_to_z(&rect.get_xyxy()));
        Self {
            kf: KalmanFilter::new(&z),
            id,
            state: TrackState::Tentative,
            time_since_update: 0,
            hits: 0,
            hit_streak: 0,
            age: 0,
            last_observation: *rect,
            score,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    pub fn time_since_update(&self) -> usize {
        self.time_since_update
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn hit_streak(&self) -> usize {
        self.hit_streak
    }

    pub fn age(&self) -> usize {
        self.age
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn last_observation(&self) -> &Rect<f32> {
        &self.last_observation
    }

    /// Advance the motion model by one frame.
    ///
    /// Increments age and `time_since_update`; a track that already missed
    /// its previous frame loses its hit streak. Returns the predicted box in
    /// [x1, y1, x2, y2] format, which may be degenerate.
    pub fn predict(&mut self) -> [f32; 4] {
        self.kf.predict();
        self.age += 1;
        if self.time_since_update > 0 {
            self.hit_streak = 0;
        }
        self.time_since_update += 1;
        self.get_state()
    }

    /// Correct the motion model with a matched detection box.
    pub fn update(&mut self, rect: &Rect<f32>, score: f32) -> Result<(), TrackError> {
        let z = convert_bbox_to_z(&rect.get_xyxy());
        self.kf.update(&DetectBox::from_iterator(z))?;
        self.last_observation = *rect;
        self.score = score;
        self.time_since_update = 0;
        self.hits += 1;
        self.hit_streak += 1;
        Ok(())
    }

    pub(crate) fn mark_as_confirmed(&mut self) {
        self.state = TrackState::Confirmed;
    }

    pub(crate) fn mark_as_removed(&mut self) {
        self.state = TrackState::Removed;
    }

    /// Current state estimate in [x1, y1, x2, y2] format.
    pub fn get_state(&self) -> [f32; 4] {
        let x = self.kf.state();
        convert_x_to_bbox(&[x[0], x[1], x[2], x[3]])
    }

    /// Current state estimate as a checked box.
    pub fn get_rect(&self) -> Result<Rect<f32>, TrackError> {
        Rect::from_array(&self.get_state())
    }

    /// Velocity part of the state vector: [vcx, vcy, vs].
    pub fn velocity(&self) -> [f32; 3] {
        let x = self.kf.state();
        [x[4], x[5], x[6]]
    }

    /// Variance of the predicted center, a rough measure of how stale the
    /// motion estimate is.
    pub fn position_variance(&self) -> f32 {
        let p = self.kf.covariance();
        p[(0, 0)] + p[(1, 1)]
    }
}

impl std::fmt::Debug for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Track {{ id: {}, state: {:?}, age: {}, hits: {}, hit_streak: {}, time_since_update: {} }}",
            self.id, self.state, self.age, self.hits, self.hit_streak, self.time_since_update
        )
    }
}

/// Convert bounding box [x1, y1, x2, y2] to measurement [cx, cy, s, r],
/// where s is the area and r the aspect ratio w/h.
pub fn convert_bbox_to_z(bbox: &[f32; 4]) -> [f32; 4] {
    let w = bbox[2] - bbox[0];
    let h = bbox[3] - bbox[1];
    let x = bbox[0] + w / 2.0;
    let y = bbox[1] + h / 2.0;
    [x, y, w * h, w / h]
}

/// Convert state [cx, cy, s, r] back to [x1, y1, x2, y2].
pub fn convert_x_to_bbox(x: &[f32; 4]) -> [f32; 4] {
    let sr = x[2] * x[3];
    let w = if sr <= 0.0 { 0.0 } else { sr.sqrt() };
    let h = if w <= 0.0 { 0.0 } else { x[2] / w };
    [
        x[0] - w / 2.0,
        x[1] - h / 2.0,
        x[0] + w / 2.0,
        x[1] + h / 2.0,
    ]
}
