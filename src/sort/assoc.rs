//! Association functions for the SORT tracker
//!
//! This module computes the IoU affinity between predicted track boxes and
//! detections and solves the optimal one-to-one assignment between them.

use crate::error::TrackError;
use crate::lapjv::lapjv;
use crate::rect::iou_xyxy;
use nalgebra::DMatrix;
use std::collections::HashSet;

/// Compute IoU between all pairs of tracks and detections.
///
/// # Arguments
/// * `tracks` - Predicted track boxes in [x1, y1, x2, y2] format
/// * `detections` - Detection boxes in [x1, y1, x2, y2] format
///
/// # Returns
/// A matrix of shape (num_tracks, num_detections). Degenerate boxes score 0.
pub fn iou_batch(tracks: &[[f32; 4]], detections: &[[f32; 4]]) -> DMatrix<f32> {
    DMatrix::from_fn(tracks.len(), detections.len(), |i, j| {
        iou_xyxy(&tracks[i], &detections[j])
    })
}

/// Result of linear assignment
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssignmentResult {
    /// Matched pairs as (track_index, detection_index)
    pub matches: Vec<(usize, usize)>,
    /// Indices of unmatched tracks
    pub unmatched_tracks: Vec<usize>,
    /// Indices of unmatched detections
    pub unmatched_detections: Vec<usize>,
}

impl AssignmentResult {
    /// Sum of the IoU over the matched pairs.
    pub fn total_iou(&self, iou_matrix: &DMatrix<f32>) -> f32 {
        self.matches.iter().map(|&(t, d)| iou_matrix[(t, d)]).sum()
    }
}

/// Maximise the total IoU with a one-to-one assignment.
///
/// Pairs below `threshold` are gated out of the cost matrix before solving
/// and any pair the solver still returns below it is reclassified as
/// unmatched on both sides.
pub fn linear_assignment(
    iou_matrix: &DMatrix<f32>,
    threshold: f32,
) -> Result<AssignmentResult, TrackError> {
    let num_trks = iou_matrix.nrows();
    let num_dets = iou_matrix.ncols();

    if num_trks == 0 || num_dets == 0 {
        return Ok(AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_trks).collect(),
            unmatched_detections: (0..num_dets).collect(),
        });
    }

    // LAPJV needs a square matrix and minimises, so pad to n x n with the
    // same cost as a rejected pair and minimise 1 - IoU.
    let n = num_trks.max(num_dets);
    let mut cost: Vec<Vec<f64>> = vec![vec![1.0; n]; n];
    for i in 0..num_trks {
        for j in 0..num_dets {
            let iou = iou_matrix[(i, j)];
            if iou >= threshold {
                cost[i][j] = 1.0 - iou as f64;
            }
        }
    }

    let mut x = vec![-1isize; n];
    let mut y = vec![-1isize; n];
    lapjv(&cost, &mut x, &mut y)?;

    let mut matches = Vec::new();
    for (t, &d) in x.iter().enumerate().take(num_trks) {
        if d >= 0 && (d as usize) < num_dets && iou_matrix[(t, d as usize)] >= threshold {
            matches.push((t, d as usize));
        }
    }

    let matched_trks: HashSet<usize> = matches.iter().map(|&(t, _)| t).collect();
    let matched_dets: HashSet<usize> = matches.iter().map(|&(_, d)| d).collect();

    Ok(AssignmentResult {
        unmatched_tracks: (0..num_trks).filter(|t| !matched_trks.contains(t)).collect(),
        unmatched_detections: (0..num_dets).filter(|d| !matched_dets.contains(d)).collect(),
        matches,
    })
}

/// Associate predicted track boxes with detections by IoU.
pub fn associate(
    tracks: &[[f32; 4]],
    detections: &[[f32; 4]],
    iou_threshold: f32,
) -> Result<AssignmentResult, TrackError> {
    let iou_matrix = iou_batch(tracks, detections);
    linear_assignment(&iou_matrix, iou_threshold)
}
