use crate::rect::Rect;

/*------------------------------------------------------------------------------
Object struct
------------------------------------------------------------------------------*/

/// A scored box. As tracker input it is a detection (`track_id` is `None`);
/// as tracker output it carries the identity of the track that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    rect: Rect<f32>,
    prob: f32,
    track_id: Option<usize>,
}

impl Object {
    pub fn new(rect: Rect<f32>, prob: f32, track_id: Option<usize>) -> Self {
        Self {
            rect,
            prob,
            track_id,
        }
    }

    pub fn detection(rect: Rect<f32>, prob: f32) -> Self {
        Self::new(rect, prob, None)
    }

    pub fn get_rect(&self) -> &Rect<f32> {
        &self.rect
    }

    pub fn get_prob(&self) -> f32 {
        self.prob
    }

    pub fn get_track_id(&self) -> Option<usize> {
        self.track_id
    }
}
