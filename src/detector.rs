use anyhow::Result;
use serde::{Deserialize, Serialize};

// MediaPipe Hands landmark indices used by the trigger predicates.
pub const THUMB_MCP: usize = 2;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

/// Number of landmarks the detector reports per hand.
pub const LANDMARKS_PER_HAND: usize = 21;

/// A detected keypoint, normalized to [0, 1] in x/y (z is relative depth).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Per-frame detector output: zero or more hands, each an ordered
/// landmark sequence. Ephemeral — replaced every frame, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandResults {
    pub hands: Vec<Vec<Landmark>>,
}

impl HandResults {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

/// A raw video frame as captured, forwarded opaquely to the detector.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Interleaved RGB pixel data.
    pub data: Vec<u8>,
}

/// Seam for the external hand-landmark detector. The detector owns the
/// hard work; callers only see per-frame results.
pub trait Detector: Send {
    fn process(&mut self, frame: &VideoFrame) -> Result<HandResults>;
}
