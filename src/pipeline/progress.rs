/*!
 * Request stages and progress reporting.
 *
 * Reported percentages never go down, and 100 is only reported once the
 * request has produced its document.
 */

use log::{debug, error, warn};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::errors::PipelineError;

/// Caller-supplied progress sink: `(percentage, message)`
pub type ProgressCallback = Arc<dyn Fn(u8, &str) + Send + Sync>;

/// Stages of one translation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Idle,
    Extracting,
    Chunking,
    Translating,
    Reconstructing,
    Rebuilding,
    Done,
    Failed,
}

impl PipelineStage {
    /// Whether the request has finished, one way or the other
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `next` may directly follow this stage
    pub fn can_transition_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        if next == Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Idle, Extracting)
                | (Extracting, Chunking)
                | (Chunking, Translating)
                | (Translating, Reconstructing)
                | (Reconstructing, Rebuilding)
                | (Rebuilding, Done)
        )
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Chunking => "chunking",
            Self::Translating => "translating",
            Self::Reconstructing => "reconstructing",
            Self::Rebuilding => "rebuilding",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug)]
struct TrackerState {
    stage: PipelineStage,
    percent: u8,
}

/// Stage machine plus monotonic progress for one request
pub struct ProgressTracker {
    callback: Option<ProgressCallback>,
    state: Mutex<TrackerState>,
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("has_callback", &self.callback.is_some())
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl ProgressTracker {
    pub fn new(callback: Option<ProgressCallback>) -> Self {
        Self {
            callback,
            state: Mutex::new(TrackerState {
                stage: PipelineStage::Idle,
                percent: 0,
            }),
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.state.lock().stage
    }

    pub fn percent(&self) -> u8 {
        self.state.lock().percent
    }

    /// Move to `next`; an illegal transition is refused and logged
    pub fn advance(&self, next: PipelineStage) -> bool {
        let mut state = self.state.lock();
        if !state.stage.can_transition_to(next) {
            warn!("Refusing stage transition {} -> {}", state.stage, next);
            return false;
        }
        debug!("Stage {} -> {}", state.stage, next);
        state.stage = next;
        true
    }

    /// Report progress below 100; lower values than already reported are raised
    pub fn report(&self, percent: u8, message: &str) {
        let emitted = {
            let mut state = self.state.lock();
            if state.stage.is_terminal() {
                return;
            }
            state.percent = state.percent.max(percent.min(99));
            state.percent
        };
        self.emit(emitted, message);
    }

    /// Finish successfully and report 100
    pub fn complete(&self, message: &str) {
        {
            let mut state = self.state.lock();
            if state.stage != PipelineStage::Done && !state.stage.can_transition_to(PipelineStage::Done) {
                warn!("Completing from stage {}", state.stage);
            }
            state.stage = PipelineStage::Done;
            state.percent = 100;
        }
        self.emit(100, message);
    }

    /// Mark the request failed; no further progress is reported
    pub fn fail(&self, err: &PipelineError) {
        let mut state = self.state.lock();
        error!("Request failed during {}: {}", state.stage, err);
        if state.stage.can_transition_to(PipelineStage::Failed) {
            state.stage = PipelineStage::Failed;
        }
    }

    fn emit(&self, percent: u8, message: &str) {
        if let Some(callback) = &self.callback {
            callback(percent, message);
        }
    }
}
