//! Frame loop: tracks vehicles, links plates to them and records the result.

use crate::config::PipelineConfig;
use crate::error::TrackError;
use crate::object::Object;
use crate::plate::{find_vehicle, PlateDetection};
use crate::sort::{SortTracker, Track};
use crate::trajectory::{FrameRecord, TrajectoryStore};
use log::{debug, trace};
use std::collections::HashMap;

/// Tracking phase of the engine.
///
/// Feed frames in increasing order with [`PlatePipeline::process_frame`],
/// then call [`PlatePipeline::finish`] to hand the store to the
/// reconciliation phase.
#[derive(Debug)]
pub struct PlatePipeline {
    config: PipelineConfig,
    tracker: SortTracker,
    store: TrajectoryStore,
    last_frame: Option<usize>,
}

impl PlatePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            tracker: SortTracker::new(config.tracker),
            config,
            store: TrajectoryStore::new(),
            last_frame: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one frame of vehicle and plate detections.
    ///
    /// # Returns
    /// The tracked vehicles reported for this frame.
    pub fn process_frame(
        &mut self,
        frame_number: usize,
        vehicles: &[Object],
        plates: &[PlateDetection],
    ) -> Result<Vec<Object>, TrackError> {
        if let Some(last) = self.last_frame {
            // identity 0 is never assigned; it stands for the frame sequence
            if frame_number <= last {
                return Err(TrackError::NonMonotonicFrame {
                    identity: 0,
                    last,
                    got: frame_number,
                });
            }
        }
        self.last_frame = Some(frame_number);

        let tracked = self.tracker.update(vehicles)?;

        let mut records: Vec<FrameRecord> = tracked
            .iter()
            .filter_map(|o| {
                o.get_track_id()
                    .map(|id| FrameRecord::vehicle(frame_number, id, *o.get_rect()))
            })
            .collect();
        let slot: HashMap<usize, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.identity, i))
            .collect();

        for plate in plates {
            let Some(text) = plate.get_text().filter(|t| !t.is_empty()) else {
                trace!("frame {}: plate without text dropped", frame_number);
                continue;
            };
            let Some(owner) = find_vehicle(plate.get_rect(), &tracked, self.config.link_policy)
                .and_then(|v| v.get_track_id())
            else {
                trace!("frame {}: plate {:?} not inside any vehicle", frame_number, text);
                continue;
            };
            let Some(&idx) = slot.get(&owner) else {
                continue;
            };
            let record = &mut records[idx];
            if record.has_text() && !outscores(plate.get_text_score(), record.text_score) {
                continue;
            }
            *record = FrameRecord::vehicle(frame_number, owner, record.vehicle).with_plate(
                *plate.get_rect(),
                plate.get_score(),
                text,
                plate.get_text_score(),
            );
            debug!("frame {}: plate {:?} linked to track {}", frame_number, text, owner);
        }

        for record in records {
            self.store.append(record)?;
        }
        Ok(tracked)
    }

    /// Live tracks, for inspection between frames.
    pub fn tracks(&self) -> &[Track] {
        self.tracker.tracks()
    }

    /// Records gathered so far.
    pub fn store(&self) -> &TrajectoryStore {
        &self.store
    }

    /// End the tracking phase.
    pub fn finish(self) -> TrajectoryStore {
        self.store
    }
}

/// Strictly higher OCR score; a missing score never wins.
fn outscores(candidate: Option<f32>, current: Option<f32>) -> bool {
    match (candidate, current) {
        (Some(c), Some(cur)) => c > cur,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
