use crate::retry::CancelToken;
use crate::source::{FormatClass, SourceReference};
use crate::utils::Instant;

/// Identity of one load request. Later requests always get larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(pub u64);

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tracks a radiance panorama while its decoder is awaited and it decodes
pub struct LoadAttempt {
    pub id: AttemptId,

    /// Source being loaded
    pub source: SourceReference,

    pub class: FormatClass,

    /// How often the decoder registry has been checked
    pub polls: u32,

    /// Decode progress from 0.0 to 1.0
    pub progress: f32,

    /// When the load was requested
    pub start_time: Instant,

    pub(crate) cancel: CancelToken,
}

impl LoadAttempt {
    pub fn new(id: AttemptId, source: SourceReference, class: FormatClass) -> Self {
        Self {
            id,
            source,
            class,
            polls: 0,
            progress: 0.0,
            start_time: Instant::now(),
            cancel: CancelToken::new(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Update the progress value
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress.clamp(0.0, 1.0);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
