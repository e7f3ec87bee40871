//! Plate-to-vehicle linking
//!
//! A plate belongs to the tracked vehicle whose box contains it entirely.
//! There is no partial-overlap fallback: an uncontained plate is dropped.

use crate::config::LinkPolicy;
use crate::object::Object;
use crate::rect::Rect;

/// A license plate detection together with the OCR reading for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateDetection {
    rect: Rect<f32>,
    score: f32,
    text: Option<String>,
    text_score: Option<f32>,
}

impl PlateDetection {
    pub fn new(
        rect: Rect<f32>,
        score: f32,
        text: Option<String>,
        text_score: Option<f32>,
    ) -> Self {
        Self {
            rect,
            score,
            text,
            text_score,
        }
    }

    pub fn get_rect(&self) -> &Rect<f32> {
        &self.rect
    }

    /// Detector confidence for the plate box.
    pub fn get_score(&self) -> f32 {
        self.score
    }

    /// Recognized text, `None` when OCR produced nothing usable.
    pub fn get_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn get_text_score(&self) -> Option<f32> {
        self.text_score
    }
}

/// Find the tracked vehicle that owns `plate`.
///
/// `vehicles` is the tracker output for the same frame. With
/// `LinkPolicy::FirstMatch` the first containing vehicle in output order is
/// returned; with `LinkPolicy::SmallestArea` the tightest one is.
pub fn find_vehicle<'a>(
    plate: &Rect<f32>,
    vehicles: &'a [Object],
    policy: LinkPolicy,
) -> Option<&'a Object> {
    let mut containing = vehicles.iter().filter(|v| v.get_rect().contains(plate));
    match policy {
        LinkPolicy::FirstMatch => containing.next(),
        LinkPolicy::SmallestArea => containing.fold(None, |best: Option<&Object>, v| match best {
            Some(b) if b.get_rect().area() <= v.get_rect().area() => Some(b),
            _ => Some(v),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x1: f32, y1: f32, x2: f32, y2: f32) -> Rect<f32> {
        Rect::from_xyxy(x1, y1, x2, y2).unwrap()
    }

    fn vehicle(id: usize, x1: f32, y1: f32, x2: f32, y2: f32) -> Object {
        Object::new(rect(x1, y1, x2, y2), 0.9, Some(id))
    }

    #[test]
    fn test_plate_accessors() {
        let plate = PlateDetection::new(
            rect(0.0, 0.0, 4.0, 1.0),
            0.7,
            Some("AB12CDE".to_string()),
            Some(0.42),
        );
        assert_eq!(plate.get_text(), Some("AB12CDE"));
        assert_eq!(plate.get_text_score(), Some(0.42));
        assert_eq!(plate.get_score(), 0.7);
    }

    #[test]
    fn test_contained_plate_links() {
        let vehicles = [vehicle(3, 0.0, 0.0, 100.0, 100.0)];
        let found = find_vehicle(&rect(40.0, 80.0, 60.0, 90.0), &vehicles, LinkPolicy::FirstMatch);
        assert_eq!(found.and_then(|v| v.get_track_id()), Some(3));
    }

    #[test]
    fn test_shared_border_counts_as_contained() {
        let vehicles = [vehicle(3, 0.0, 0.0, 100.0, 100.0)];
        let found = find_vehicle(&rect(0.0, 90.0, 100.0, 100.0), &vehicles, LinkPolicy::FirstMatch);
        assert!(found.is_some());
    }

    #[test]
    fn test_partially_outside_plate_is_dropped() {
        let vehicles = [vehicle(3, 0.0, 0.0, 100.0, 100.0)];
        let found = find_vehicle(&rect(90.0, 90.0, 110.0, 99.0), &vehicles, LinkPolicy::FirstMatch);
        assert!(found.is_none());
        assert!(find_vehicle(&rect(1.0, 1.0, 2.0, 2.0), &[], LinkPolicy::FirstMatch).is_none());
    }

    #[test]
    fn test_nested_vehicles_first_match() {
        let vehicles = [
            vehicle(1, 0.0, 0.0, 500.0, 500.0),
            vehicle(2, 100.0, 100.0, 200.0, 200.0),
        ];
        let plate = rect(140.0, 180.0, 160.0, 190.0);
        let first = find_vehicle(&plate, &vehicles, LinkPolicy::FirstMatch);
        assert_eq!(first.and_then(|v| v.get_track_id()), Some(1));

        let smallest = find_vehicle(&plate, &vehicles, LinkPolicy::SmallestArea);
        assert_eq!(smallest.and_then(|v| v.get_track_id()), Some(2));
    }

    #[test]
    fn test_smallest_area_tie_keeps_output_order() {
        let vehicles = [
            vehicle(5, 0.0, 0.0, 100.0, 100.0),
            vehicle(6, 10.0, 10.0, 110.0, 110.0),
        ];
        let plate = rect(40.0, 40.0, 60.0, 50.0);
        let found = find_vehicle(&plate, &vehicles, LinkPolicy::SmallestArea);
        assert_eq!(found.and_then(|v| v.get_track_id()), Some(5));
    }
}
