use crate::detector::{Detector, HandResults, VideoFrame};

pub type ResultsHandler = Box<dyn FnMut(&HandResults) + Send>;

/// Thin adapter between the capture loop and the external detector:
/// one `send` per frame, one handler invocation per successful detection.
pub struct HandTracker {
    detector: Box<dyn Detector>,
    handler: Option<ResultsHandler>,
    frames_processed: u64,
    frames_skipped: u64,
}

impl HandTracker {
    pub fn new(detector: Box<dyn Detector>) -> Self {
        Self {
            detector,
            handler: None,
            frames_processed: 0,
            frames_skipped: 0,
        }
    }

    /// Registers the per-frame results callback, replacing any previous one.
    pub fn on_results(&mut self, handler: ResultsHandler) {
        self.handler = Some(handler);
    }

    /// Forwards one frame to the detector. A detection failure is non-fatal:
    /// the frame is skipped and no results are delivered.
    pub fn send(&mut self, frame: &VideoFrame) {
        match self.detector.process(frame) {
            Ok(results) => {
                self.frames_processed += 1;
                if let Some(handler) = self.handler.as_mut() {
                    handler(&results);
                }
            }
            Err(e) => {
                self.frames_skipped += 1;
                tracing::warn!("Detection failed, skipping frame: {}", e);
            }
        }
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }
}
