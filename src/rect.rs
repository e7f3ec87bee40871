use crate::error::TrackError;
use num::Float;
use std::fmt::Debug;

/* ------------------------------------------------------------------------------
 * Free functions
 * ------------------------------------------------------------------------------ */

/// Intersection-over-Union of two `[x1, y1, x2, y2]` boxes.
///
/// Returns `0` when the boxes do not overlap or when either box has no area,
/// so predicted boxes that collapsed never poison the cost matrix.
pub fn iou_xyxy<T: Float>(a: &[T; 4], b: &[T; 4]) -> T {
    let zero = T::zero();
    let area_a = (a[2] - a[0]).max(zero) * (a[3] - a[1]).max(zero);
    let area_b = (b[2] - b[0]).max(zero) * (b[3] - b[1]).max(zero);
    if !(area_a > zero) || !(area_b > zero) {
        return zero;
    }

    let iw = (a[2].min(b[2]) - a[0].max(b[0])).max(zero);
    let ih = (a[3].min(b[3]) - a[1].max(b[1])).max(zero);
    let inter = iw * ih;
    let union = area_a + area_b - inter;
    if union > zero {
        (inter / union).min(T::one())
    } else {
        zero
    }
}

/* ------------------------------------------------------------------------------
 * Rect struct
 * ------------------------------------------------------------------------------ */

/// Axis-aligned box in `[x1, y1, x2, y2]` form.
///
/// A `Rect` can only be built through the checked factories, so every value
/// satisfies `x1 < x2` and `y1 < y2` with finite coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<T>
where
    T: Debug + Float,
{
    xyxy: [T; 4],
}

impl<T> Rect<T>
where
    T: Debug + Float,
{
    pub fn from_xyxy(x1: T, y1: T, x2: T, y2: T) -> Result<Self, TrackError> {
        if !(x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite())
        {
            return Err(TrackError::NonFiniteCoordinate);
        }
        if !(x1 < x2 && y1 < y2) {
            return Err(TrackError::DegenerateBox(
                x1.to_f64().unwrap_or(f64::NAN),
                y1.to_f64().unwrap_or(f64::NAN),
                x2.to_f64().unwrap_or(f64::NAN),
                y2.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(Self {
            xyxy: [x1, y1, x2, y2],
        })
    }

    /// Create Rect from top-left corner plus width and height.
    pub fn from_tlwh(x: T, y: T, width: T, height: T) -> Result<Self, TrackError> {
        Self::from_xyxy(x, y, x + width, y + height)
    }

    pub fn from_array(xyxy: &[T; 4]) -> Result<Self, TrackError> {
        Self::from_xyxy(xyxy[0], xyxy[1], xyxy[2], xyxy[3])
    }

    #[inline(always)]
    pub fn x1(&self) -> T {
        self.xyxy[0]
    }

    #[inline(always)]
    pub fn y1(&self) -> T {
        self.xyxy[1]
    }

    #[inline(always)]
    pub fn x2(&self) -> T {
        self.xyxy[2]
    }

    #[inline(always)]
    pub fn y2(&self) -> T {
        self.xyxy[3]
    }

    #[inline(always)]
    pub fn width(&self) -> T {
        self.xyxy[2] - self.xyxy[0]
    }

    #[inline(always)]
    pub fn height(&self) -> T {
        self.xyxy[3] - self.xyxy[1]
    }

    pub fn area(&self) -> T {
        self.width() * self.height()
    }

    pub fn center(&self) -> (T, T) {
        let two = T::one() + T::one();
        (
            self.xyxy[0] + self.width() / two,
            self.xyxy[1] + self.height() / two,
        )
    }

    /// Get bounding box as [x1, y1, x2, y2] format
    pub fn get_xyxy(&self) -> [T; 4] {
        self.xyxy
    }

    pub fn calc_iou(&self, other: &Rect<T>) -> T {
        iou_xyxy(&self.xyxy, &other.xyxy)
    }

    /// True when `inner` lies entirely inside `self`, borders included.
    pub fn contains(&self, inner: &Rect<T>) -> bool {
        self.xyxy[0] <= inner.xyxy[0]
            && self.xyxy[1] <= inner.xyxy[1]
            && inner.xyxy[2] <= self.xyxy[2]
            && inner.xyxy[3] <= self.xyxy[3]
    }

    /// Linear blend between `self` (t = 0) and `other` (t = 1).
    pub fn lerp(&self, other: &Rect<T>, t: T) -> Rect<T> {
        let mut xyxy = self.xyxy;
        for (v, (a, b)) in xyxy.iter_mut().zip(self.xyxy.iter().zip(other.xyxy.iter())) {
            *v = *a + (*b - *a) * t;
        }
        Rect { xyxy }
    }
}
