pub mod config;
pub mod counter;
pub mod error;
pub mod object;
pub mod pipeline;
pub mod plate;
pub mod rect;
pub mod sort;
pub mod trajectory;

mod lapjv;

pub use config::{CategoryRules, LinkPolicy, PipelineConfig, ReportingMode, TrackerConfig};
pub use counter::{CountingLine, Direction, LineCounter};
pub use error::TrackError;
pub use object::Object;
pub use pipeline::PlatePipeline;
pub use plate::PlateDetection;
pub use rect::Rect;
pub use sort::SortTracker;
pub use trajectory::{CanonicalRecord, FrameRecord, TrajectoryStore};
