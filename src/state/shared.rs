use flume;

use crate::viewer::SourceEvent;

/// Channel for source requests produced outside the frame loop
/// (async file dialogs, drop handlers), drained by `Viewer::update`.
pub struct SharedState {
    /// Sender handed to request producers
    pub source_sender: flume::Sender<SourceEvent>,

    /// Receiver drained once per frame
    pub source_receiver: flume::Receiver<SourceEvent>,
}

impl SharedState {
    /// Create a new SharedState instance with an initialized channel
    pub fn new() -> Self {
        let (source_sender, source_receiver) = flume::unbounded();

        Self {
            source_sender,
            source_receiver,
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
