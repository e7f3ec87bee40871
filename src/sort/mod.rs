//! SORT: Kalman motion model, IoU association and the track lifecycle.

pub mod assoc;
mod kalman_filter;
mod sort_tracker;
pub mod track;

pub use assoc::{associate, iou_batch, linear_assignment, AssignmentResult};
pub use sort_tracker::SortTracker;
pub use track::{Track, TrackState};
