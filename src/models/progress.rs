//! Progress events emitted while a run executes.

use serde::Serialize;
use std::time::Duration;

/// Snapshot emitted after each completed stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub stage: String,
    /// 1-based index of the completed stage.
    pub current: usize,
    /// Fixed for the whole run.
    pub total: usize,
    pub percentage: f64,
    pub message: String,
    #[serde(
        rename = "estimatedSecondsRemaining",
        serialize_with = "serialize_remaining",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_remaining: Option<Duration>,
}

fn serialize_remaining<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(d) => serializer.serialize_f64(d.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}

impl ProgressEvent {
    pub fn new(
        stage: impl Into<String>,
        current: usize,
        total: usize,
        message: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        let percentage = if total == 0 {
            100.0
        } else {
            (current as f64 / total as f64 * 1000.0).round() / 10.0
        };
        let estimated_remaining = if current == 0 || current >= total {
            None
        } else {
            let per_step = elapsed.as_secs_f64() / current as f64;
            Some(Duration::from_secs_f64(per_step * (total - current) as f64))
        };
        Self {
            stage: stage.into(),
            current,
            total,
            percentage,
            message: message.into(),
            estimated_remaining,
        }
    }

    pub fn is_final(&self) -> bool {
        self.current == self.total
    }
}

/// Receiver for progress events.
///
/// Sinks are called synchronously on the thread executing the run and should
/// return quickly.
pub trait ProgressSink {
    fn on_progress(&mut self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressEvent),
{
    fn on_progress(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink that keeps every event, mostly useful in tests and batch summaries.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<ProgressEvent>,
}

impl ProgressSink for CollectingSink {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self.events.push(event.clone());
    }
}
