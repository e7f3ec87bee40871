//! CSV interchange between the tracking, interpolation and reporting phases.
//!
//! Boxes are stored as `[x1 y1 x2 y2]`; absent values are empty fields.
//! Floats are written in shortest round-trip form, so reading a file back
//! reproduces the store exactly.

use super::canonical::CanonicalRecord;
use super::store::{FrameRecord, TrajectoryStore};
use crate::error::TrackError;
use crate::rect::Rect;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct FrameRow {
    frame_nmr: usize,
    car_id: usize,
    car_bbox: String,
    license_plate_bbox: Option<String>,
    license_plate_bbox_score: Option<f32>,
    license_number: Option<String>,
    license_number_score: Option<f32>,
    interpolated: u8,
}

#[derive(Debug, Serialize, Deserialize)]
struct CanonicalRow {
    car_id: usize,
    license_number: String,
    license_number_score: Option<f32>,
    vehicle_type: String,
}

/*------------------------------------------------------------------------------
Box fields
------------------------------------------------------------------------------*/

pub fn format_box(rect: &Rect<f32>) -> String {
    let [x1, y1, x2, y2] = rect.get_xyxy();
    format!("[{} {} {} {}]", x1, y1, x2, y2)
}

/// Parse a `[x1 y1 x2 y2]` field. Commas are accepted as separators too.
pub fn parse_box(field: &str) -> Result<Rect<f32>, TrackError> {
    let inner = field
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| TrackError::InvalidRecord(format!("box not bracketed: {field:?}")))?;
    let values = inner
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f32>()
                .map_err(|e| TrackError::InvalidRecord(format!("box value {s:?}: {e}")))
        })
        .collect::<Result<Vec<f32>, TrackError>>()?;
    let xyxy: [f32; 4] = values
        .try_into()
        .map_err(|_| TrackError::InvalidRecord(format!("box needs 4 values: {field:?}")))?;
    Rect::from_array(&xyxy)
}

/*------------------------------------------------------------------------------
Frame records
------------------------------------------------------------------------------*/

impl From<&FrameRecord> for FrameRow {
    fn from(r: &FrameRecord) -> Self {
        Self {
            frame_nmr: r.frame,
            car_id: r.identity,
            car_bbox: format_box(&r.vehicle),
            license_plate_bbox: r.plate.as_ref().map(format_box),
            license_plate_bbox_score: r.plate_score,
            license_number: r.text.clone(),
            license_number_score: r.text_score,
            interpolated: u8::from(r.interpolated),
        }
    }
}

impl FrameRow {
    fn into_record(self) -> Result<FrameRecord, TrackError> {
        Ok(FrameRecord {
            frame: self.frame_nmr,
            identity: self.car_id,
            vehicle: parse_box(&self.car_bbox)?,
            plate: self.license_plate_bbox.as_deref().map(parse_box).transpose()?,
            plate_score: self.license_plate_bbox_score,
            text: self.license_number,
            text_score: self.license_number_score,
            interpolated: self.interpolated != 0,
        })
    }
}

/// Write every record ordered by (frame, identity).
pub fn write_records<W: io::Write>(store: &TrajectoryStore, writer: W) -> Result<(), TrackError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in store.records_by_frame() {
        wtr.serialize(FrameRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_records_to_path<P: AsRef<Path>>(
    store: &TrajectoryStore,
    path: P,
) -> Result<(), TrackError> {
    let file = std::fs::File::create(path)?;
    write_records(store, io::BufWriter::new(file))
}

/// Read records written by [`write_records`]. Row order does not matter.
pub fn read_records<R: io::Read>(reader: R) -> Result<TrajectoryStore, TrackError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize::<FrameRow>() {
        records.push(row?.into_record()?);
    }
    TrajectoryStore::from_records(records)
}

pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<TrajectoryStore, TrackError> {
    let file = std::fs::File::open(path)?;
    read_records(io::BufReader::new(file))
}

/*------------------------------------------------------------------------------
Canonical records
------------------------------------------------------------------------------*/

pub fn write_canonical<W: io::Write>(
    records: &[CanonicalRecord],
    writer: W,
) -> Result<(), TrackError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in records {
        wtr.serialize(CanonicalRow {
            car_id: r.identity,
            license_number: r.text.clone(),
            license_number_score: r.text_score,
            vehicle_type: r.category.clone(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_canonical_to_path<P: AsRef<Path>>(
    records: &[CanonicalRecord],
    path: P,
) -> Result<(), TrackError> {
    let file = std::fs::File::create(path)?;
    write_canonical(records, io::BufWriter::new(file))
}
