//! Line-crossing counter over tracker output.

use crate::object::Object;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Crossing direction in image coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Center y goes from above the line to on or below it.
    Down,
    /// Center y goes from below the line to on or above it.
    Up,
}

/// A horizontal counting line at image row `y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountingLine {
    pub name: String,
    pub y: f32,
    pub direction: Direction,
}

impl CountingLine {
    pub fn new(name: impl Into<String>, y: f32, direction: Direction) -> Self {
        Self {
            name: name.into(),
            y,
            direction,
        }
    }

    pub fn is_crossed(&self, prev_cy: f32, cy: f32) -> bool {
        match self.direction {
            Direction::Down => prev_cy < self.y && cy >= self.y,
            Direction::Up => prev_cy > self.y && cy <= self.y,
        }
    }
}

/// Counts identities whose box center crosses each line. An identity is
/// counted at most once per line.
#[derive(Debug, Clone, Default)]
pub struct LineCounter {
    lines: Vec<CountingLine>,
    counted: Vec<Vec<usize>>,
    prev_centers: HashMap<usize, (f32, f32)>,
}

impl LineCounter {
    pub fn new(lines: Vec<CountingLine>) -> Self {
        let counted = vec![Vec::new(); lines.len()];
        Self {
            lines,
            counted,
            prev_centers: HashMap::new(),
        }
    }

    pub fn lines(&self) -> &[CountingLine] {
        &self.lines
    }

    /// Feed one frame of tracker output.
    ///
    /// Objects without a track id are ignored. Returns the
    /// `(line index, identity)` pairs counted for the first time this frame.
    pub fn observe(&mut self, tracks: &[Object]) -> Vec<(usize, usize)> {
        let mut crossings = Vec::new();
        for obj in tracks {
            let Some(id) = obj.get_track_id() else {
                continue;
            };
            let (cx, cy) = obj.get_rect().center();
            if let Some(&(_, prev_cy)) = self.prev_centers.get(&id) {
                for (idx, line) in self.lines.iter().enumerate() {
                    if line.is_crossed(prev_cy, cy) && !self.counted[idx].contains(&id) {
                        self.counted[idx].push(id);
                        debug!("track {} crossed line {:?}", id, line.name);
                        crossings.push((idx, id));
                    }
                }
            }
            self.prev_centers.insert(id, (cx, cy));
        }
        crossings
    }

    /// Number of identities counted on line `idx`.
    pub fn count(&self, idx: usize) -> usize {
        self.counted.get(idx).map_or(0, Vec::len)
    }

    /// Identities counted on line `idx`, in crossing order.
    pub fn counted(&self, idx: usize) -> &[usize] {
        self.counted.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rect;

    fn at(id: usize, cy: f32) -> Object {
        Object::new(
            Rect::from_xyxy(100.0, cy - 10.0, 140.0, cy + 10.0).unwrap(),
            0.9,
            Some(id),
        )
    }

    fn counter() -> LineCounter {
        LineCounter::new(vec![
            CountingLine::new("down", 660.0, Direction::Down),
            CountingLine::new("up", 520.0, Direction::Up),
        ])
    }

    #[test]
    fn test_down_crossing_counts_once() {
        let mut counter = counter();
        assert!(counter.observe(&[at(1, 650.0)]).is_empty());
        assert_eq!(counter.observe(&[at(1, 660.0)]), vec![(0, 1)]);
        // moving back and across again is not counted twice
        counter.observe(&[at(1, 640.0)]);
        assert!(counter.observe(&[at(1, 670.0)]).is_empty());
        assert_eq!(counter.count(0), 1);
        assert_eq!(counter.count(1), 0);
    }

    #[test]
    fn test_up_crossing() {
        let mut counter = counter();
        counter.observe(&[at(4, 530.0), at(5, 600.0)]);
        let crossed = counter.observe(&[at(4, 515.0), at(5, 590.0)]);
        assert_eq!(crossed, vec![(1, 4)]);
        assert_eq!(counter.counted(1), &[4]);
    }

    #[test]
    fn test_first_sighting_on_the_line_is_not_a_crossing() {
        let mut counter = counter();
        assert!(counter.observe(&[at(2, 660.0)]).is_empty());
        assert!(counter.observe(&[at(2, 700.0)]).is_empty());
    }

    #[test]
    fn test_wrong_direction_is_ignored() {
        let mut counter = counter();
        counter.observe(&[at(3, 670.0)]);
        assert!(counter.observe(&[at(3, 650.0)]).is_empty());
    }

    #[test]
    fn test_untracked_objects_and_unknown_lines() {
        let mut counter = counter();
        let det = Object::detection(Rect::from_xyxy(0.0, 0.0, 1.0, 1.0).unwrap(), 0.5);
        assert!(counter.observe(&[det]).is_empty());
        assert_eq!(counter.count(9), 0);
        assert!(counter.counted(9).is_empty());
    }
}
