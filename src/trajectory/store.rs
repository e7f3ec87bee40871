use crate::error::TrackError;
use crate::rect::Rect;
use std::collections::BTreeMap;

/*------------------------------------------------------------------------------
FrameRecord struct
------------------------------------------------------------------------------*/

/// Everything known about one identity in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub frame: usize,
    pub identity: usize,
    pub vehicle: Rect<f32>,
    pub plate: Option<Rect<f32>>,
    /// Detector confidence for the plate box
    pub plate_score: Option<f32>,
    pub text: Option<String>,
    /// OCR confidence for `text`
    pub text_score: Option<f32>,
    /// Set when any field of the row was reconstructed rather than observed
    pub interpolated: bool,
}

impl FrameRecord {
    /// A vehicle-only observation with empty plate fields.
    pub fn vehicle(frame: usize, identity: usize, vehicle: Rect<f32>) -> Self {
        Self {
            frame,
            identity,
            vehicle,
            plate: None,
            plate_score: None,
            text: None,
            text_score: None,
            interpolated: false,
        }
    }

    pub fn with_plate(
        self,
        plate: Rect<f32>,
        plate_score: f32,
        text: impl Into<String>,
        text_score: Option<f32>,
    ) -> Self {
        Self {
            plate: Some(plate),
            plate_score: Some(plate_score),
            text: Some(text.into()),
            text_score,
            ..self
        }
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }
}

/*------------------------------------------------------------------------------
TrajectoryStore struct
------------------------------------------------------------------------------*/

/// Append-only table of frame records keyed by identity.
///
/// Within one identity frames are strictly increasing; frame numbers may
/// have gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryStore {
    tracks: BTreeMap<usize, Vec<FrameRecord>>,
}

impl TrajectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records in any order.
    pub fn from_records<I>(records: I) -> Result<Self, TrackError>
    where
        I: IntoIterator<Item = FrameRecord>,
    {
        let mut records: Vec<FrameRecord> = records.into_iter().collect();
        records.sort_by_key(|r| (r.identity, r.frame));
        let mut store = Self::new();
        for record in records {
            store.append(record)?;
        }
        Ok(store)
    }

    /// Append a record, rejecting a frame that does not follow the
    /// identity's last one.
    pub fn append(&mut self, record: FrameRecord) -> Result<(), TrackError> {
        let rows = self.tracks.entry(record.identity).or_default();
        if let Some(last) = rows.last() {
            if record.frame <= last.frame {
                return Err(TrackError::NonMonotonicFrame {
                    identity: record.identity,
                    last: last.frame,
                    got: record.frame,
                });
            }
        }
        rows.push(record);
        Ok(())
    }

    /// Records of one identity in frame order.
    pub fn get(&self, identity: usize) -> Option<&[FrameRecord]> {
        self.tracks.get(&identity).map(|rows| rows.as_slice())
    }

    pub fn identities(&self) -> impl Iterator<Item = usize> + '_ {
        self.tracks.keys().copied()
    }

    /// Per-identity record slices, ascending by identity.
    pub fn tracks(&self) -> impl Iterator<Item = (usize, &[FrameRecord])> + '_ {
        self.tracks.iter().map(|(id, rows)| (*id, rows.as_slice()))
    }

    pub fn num_identities(&self) -> usize {
        self.tracks.len()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// All records ordered by (frame, identity).
    pub fn records_by_frame(&self) -> Vec<&FrameRecord> {
        let mut rows: Vec<&FrameRecord> = self.tracks.values().flatten().collect();
        rows.sort_by_key(|r| (r.frame, r.identity));
        rows
    }
}
