// Resolution Events
// Progress reporting for dependency resolution

use crate::records::FolderCoordinate;

use std::time::Duration;
use tokio::sync::mpsc;

/// Sender for resolution progress events
pub type ProgressSender = mpsc::UnboundedSender<ResolutionEvent>;

/// Receiver for resolution progress events
pub type ProgressReceiver = mpsc::UnboundedReceiver<ResolutionEvent>;

/// Create a new progress channel
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// Events emitted while resolving a job graph
#[derive(Debug, Clone)]
pub enum ResolutionEvent {
    /// A job was entered for the first time in this resolution
    JobEntered {
        job: String,
        folder: FolderCoordinate,
        depth: usize,
    },

    /// Resolution descends into a predecessor
    PredecessorRequired {
        job: String,
        predecessor: String,
        folder: FolderCoordinate,
    },

    /// The job did not need to run
    JobSkipped {
        job: String,
        folder: FolderCoordinate,
        reason: String,
    },

    /// The solver is about to run
    JobStarted {
        job: String,
        folder: FolderCoordinate,
        predecessor: Option<String>,
    },

    /// The solver finished
    JobCompleted {
        job: String,
        folder: FolderCoordinate,
        success: bool,
        exit_code: Option<i32>,
        duration: Duration,
    },
}

/// Helper to send events without caring whether anyone listens
#[derive(Clone, Default)]
pub struct EventSender {
    tx: Option<ProgressSender>,
}

impl EventSender {
    pub fn new(tx: Option<ProgressSender>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: ResolutionEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_sender_without_receiver() {
        let sender = EventSender::default();
        sender.send(ResolutionEvent::JobSkipped {
            job: "a".to_string(),
            folder: FolderCoordinate::new("1", "1"),
            reason: "none".to_string(),
        });
    }

    #[tokio::test]
    async fn test_event_sender_delivers() {
        let (tx, mut rx) = progress_channel();
        let sender = EventSender::new(Some(tx));
        sender.send(ResolutionEvent::JobEntered {
            job: "a".to_string(),
            folder: FolderCoordinate::new("1", "1"),
            depth: 0,
        });

        match rx.recv().await {
            Some(ResolutionEvent::JobEntered { job, depth, .. }) => {
                assert_eq!(job, "a");
                assert_eq!(depth, 0);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
