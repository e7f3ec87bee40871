//! Best-evidence reduction: one canonical plate reading per identity.

use super::store::{FrameRecord, TrajectoryStore};
use crate::config::CategoryRules;

/// Summary row reported for one identity.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub identity: usize,
    pub text: String,
    pub text_score: Option<f32>,
    pub category: String,
    /// Frame the reading was taken from
    pub frame: usize,
}

/// Reduce every identity to its highest-scoring plate reading.
///
/// Identities without a single observed (non-interpolated) reading are
/// skipped. Output is ordered by identity.
pub fn canonicalize(store: &TrajectoryStore, categories: &CategoryRules) -> Vec<CanonicalRecord> {
    store
        .tracks()
        .filter_map(|(identity, rows)| {
            let best = best_reading(rows)?;
            Some(CanonicalRecord {
                identity,
                text: best.text.clone()?,
                text_score: best.text_score,
                category: categories.categorize(identity).to_string(),
                frame: best.frame,
            })
        })
        .collect()
}

/// Row with the maximum text score; ties keep the lowest frame and a
/// missing score ranks below any present one.
pub fn best_reading(rows: &[FrameRecord]) -> Option<&FrameRecord> {
    if !rows.iter().any(|r| r.has_text() && !r.interpolated) {
        return None;
    }
    let key = |r: &FrameRecord| r.text_score.unwrap_or(f32::NEG_INFINITY);
    rows.iter()
        .filter(|r| r.has_text())
        .fold(None, |best: Option<&FrameRecord>, r| match best {
            Some(b) if key(r) <= key(b) || key(r).is_nan() => Some(b),
            _ => Some(r),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rect;

    fn car() -> Rect<f32> {
        Rect::from_xyxy(0.0, 0.0, 100.0, 100.0).unwrap()
    }

    fn reading(frame: usize, identity: usize, text: &str, score: Option<f32>) -> FrameRecord {
        let plate = Rect::from_xyxy(10.0, 80.0, 30.0, 90.0).unwrap();
        FrameRecord::vehicle(frame, identity, car()).with_plate(plate, 0.9, text, score)
    }

    #[test]
    fn test_first_of_tied_maxima_wins() {
        let rows = vec![
            reading(1, 1, "AAA", Some(0.6)),
            reading(2, 1, "BBB", Some(0.9)),
            reading(3, 1, "CCC", Some(0.9)),
        ];
        let best = best_reading(&rows).unwrap();
        assert_eq!(best.frame, 2);
        assert_eq!(best.text.as_deref(), Some("BBB"));
    }

    #[test]
    fn test_missing_score_ranks_lowest() {
        let rows = vec![reading(1, 1, "AAA", None), reading(2, 1, "BBB", Some(0.1))];
        assert_eq!(best_reading(&rows).unwrap().frame, 2);

        let rows = vec![reading(1, 1, "AAA", None), reading(2, 1, "BBB", None)];
        assert_eq!(best_reading(&rows).unwrap().frame, 1);
    }

    #[test]
    fn test_interpolated_rows_compete_but_do_not_qualify() {
        let mut filled = reading(2, 1, "AAA", Some(0.8));
        filled.interpolated = true;
        assert!(best_reading(&[filled.clone()]).is_none());

        let rows = vec![reading(1, 1, "AAA", Some(0.5)), filled];
        assert_eq!(best_reading(&rows).unwrap().frame, 2);
    }

    #[test]
    fn test_canonicalize_skips_identities_without_text() {
        let mut store = TrajectoryStore::new();
        store.append(reading(1, 5, "AB12CDE", Some(0.7))).unwrap();
        store.append(reading(2, 5, "AB12CDF", Some(0.4))).unwrap();
        store.append(FrameRecord::vehicle(1, 150, car())).unwrap();
        store.append(reading(3, 250, "XY99", Some(0.3))).unwrap();
        store.append(reading(3, 400, "ZZ11", Some(0.2))).unwrap();

        let records = canonicalize(&store, &CategoryRules::default());
        let summary: Vec<(usize, &str, &str)> = records
            .iter()
            .map(|r| (r.identity, r.text.as_str(), r.category.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (5, "AB12CDE", "car"),
                (250, "XY99", "truck"),
                (400, "ZZ11", "unknown"),
            ]
        );
        assert_eq!(records[0].text_score, Some(0.7));
        assert_eq!(records[0].frame, 1);
    }
}
