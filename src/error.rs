use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("degenerate box: [{0}, {1}, {2}, {3}] must satisfy x1 < x2 and y1 < y2")]
    DegenerateBox(f64, f64, f64, f64),
    #[error("non-finite box coordinate")]
    NonFiniteCoordinate,
    #[error("Error: {0}")]
    LapjvError(String),
    #[error("innovation covariance is not positive definite")]
    SingularCovariance,
    #[error("identity {identity}: frame {got} does not follow frame {last}")]
    NonMonotonicFrame {
        identity: usize,
        last: usize,
        got: usize,
    },
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
