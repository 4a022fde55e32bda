/// Lifecycle stage of a provider job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Queued,
    InProgress,
    Completed,
}

/// Progress notification emitted while a job waits or runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub status: QueueStatus,
    /// Jobs ahead of this one, when queued
    pub queue_position: Option<u32>,
    /// Log lines produced since the previous update (only while in progress)
    pub logs: Vec<String>,
}

impl ProgressUpdate {
    pub fn queued(queue_position: Option<u32>) -> Self {
        Self {
            status: QueueStatus::Queued,
            queue_position,
            logs: Vec::new(),
        }
    }

    pub fn in_progress(logs: Vec<String>) -> Self {
        Self {
            status: QueueStatus::InProgress,
            queue_position: None,
            logs,
        }
    }

    pub fn completed() -> Self {
        Self {
            status: QueueStatus::Completed,
            queue_position: None,
            logs: Vec::new(),
        }
    }
}

/// One item of a job's event stream
///
/// A stream yields any number of `Progress` items followed by exactly one
/// terminal item: `Completed`, or an `Err` in the stream's `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    Progress(ProgressUpdate),
    /// Raw provider payload, not yet normalized
    Completed(serde_json::Value),
}
