//! Gap filling over a trajectory store.
//!
//! Boxes are interpolated linearly between the nearest known frames and are
//! never extrapolated past the first or last one. Plate text and its scores
//! are carried forward instead of blended.

use super::store::{FrameRecord, TrajectoryStore};
use crate::error::TrackError;
use crate::rect::Rect;

/// Fill frame gaps for every identity in `store`.
///
/// The input is left untouched; the result has one record per frame between
/// each identity's first and last observation.
pub fn interpolate(store: &TrajectoryStore) -> Result<TrajectoryStore, TrackError> {
    let mut out = TrajectoryStore::new();
    for (_, rows) in store.tracks() {
        for record in interpolate_track(rows) {
            out.append(record)?;
        }
    }
    Ok(out)
}

/// Fill frame gaps of a single identity. `rows` must be in frame order.
pub fn interpolate_track(rows: &[FrameRecord]) -> Vec<FrameRecord> {
    let (first, last) = match (rows.first(), rows.last()) {
        (Some(f), Some(l)) => (f.frame, l.frame),
        _ => return Vec::new(),
    };
    let identity = rows[0].identity;

    // Step 1: one row per frame, vehicle box blended across missing frames
    let mut filled: Vec<FrameRecord> = Vec::with_capacity(last - first + 1);
    for pair in rows.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        filled.push(prev.clone());
        for frame in prev.frame + 1..next.frame {
            let t = fraction(prev.frame, next.frame, frame);
            let mut record =
                FrameRecord::vehicle(frame, identity, prev.vehicle.lerp(&next.vehicle, t));
            record.interpolated = true;
            filled.push(record);
        }
    }
    filled.push(rows[rows.len() - 1].clone());

    // Step 2: plate boxes, only strictly between two known plate frames
    let known: Vec<(usize, Rect<f32>)> = filled
        .iter()
        .filter_map(|r| r.plate.map(|p| (r.frame, p)))
        .collect();
    for pair in known.windows(2) {
        let ((f0, p0), (f1, p1)) = (pair[0], pair[1]);
        for record in filled.iter_mut() {
            if record.frame > f0 && record.frame < f1 && record.plate.is_none() {
                record.plate = Some(p0.lerp(&p1, fraction(f0, f1, record.frame)));
                record.interpolated = true;
            }
        }
    }

    // Step 3: forward-fill text and scores into rows without a reading
    let mut carried: Option<(String, Option<f32>, Option<f32>)> = None;
    for record in filled.iter_mut() {
        if let Some(text) = &record.text {
            carried = Some((text.clone(), record.text_score, record.plate_score));
            continue;
        }
        if let Some((text, text_score, plate_score)) = &carried {
            record.text = Some(text.clone());
            record.text_score = *text_score;
            if record.plate_score.is_none() {
                record.plate_score = *plate_score;
            }
            record.interpolated = true;
        }
    }

    filled
}

fn fraction(start: usize, end: usize, at: usize) -> f32 {
    (at - start) as f32 / (end - start) as f32
}
