//! Per-identity trajectories: storage, gap filling, canonical reduction and
//! the CSV interchange format between those phases.

pub mod canonical;
pub mod csv_io;
pub mod interpolate;
mod store;

pub use canonical::{best_reading, canonicalize, CanonicalRecord};
pub use interpolate::{interpolate, interpolate_track};
pub use store::{FrameRecord, TrajectoryStore};
