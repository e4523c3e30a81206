use serde::Serialize;
use tokio::sync::mpsc;

/// Result of a finished scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Archives read during this scan
    pub scanned: usize,
    /// Archives skipped because their fingerprint was already in the ledger
    pub unchanged: usize,
    /// Archives no reflector could open
    pub unreadable: usize,
    /// Classes whose reflection failed
    pub failed_classes: usize,
    /// Classes in the committed index after the scan
    pub classes: usize,
    /// Whether the index files were rewritten
    pub persisted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    Progress { message: String, percent: u8 },
    Finished(ScanSummary),
    Failed { message: String },
}

/// Receiver side of scan events.
///
/// `send` returns false once the requester is gone; nothing is sent after
/// that.
pub trait ProgressSink {
    fn send(&mut self, event: ScanEvent) -> bool;
}

/// Discards every event.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn send(&mut self, _event: ScanEvent) -> bool {
        true
    }
}

impl ProgressSink for Vec<ScanEvent> {
    fn send(&mut self, event: ScanEvent) -> bool {
        self.push(event);
        true
    }
}

/// Blocking sender for use on a scan thread; a dropped receiver means the
/// requesting context was torn down.
impl ProgressSink for mpsc::Sender<ScanEvent> {
    fn send(&mut self, event: ScanEvent) -> bool {
        !self.is_closed() && self.blocking_send(event).is_ok()
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn send(&mut self, event: ScanEvent) -> bool {
        (**self).send(event)
    }
}

/// Turns raw progress into the event stream: percentages never go down,
/// repeats are suppressed, and a dead sink silently drops everything.
pub struct ProgressTracker<S: ProgressSink> {
    sink: S,
    last: Option<u8>,
    alive: bool,
}

impl<S: ProgressSink> ProgressTracker<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            last: None,
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn last_percent(&self) -> Option<u8> {
        self.last
    }

    fn deliver(&mut self, event: ScanEvent) {
        if self.alive {
            self.alive = self.sink.send(event);
        }
    }

    pub fn report(&mut self, message: impl Into<String>, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        self.deliver(ScanEvent::Progress {
            message: message.into(),
            percent,
        });
    }

    /// Report `done` out of `total` work units.
    pub fn report_fraction(&mut self, message: impl Into<String>, done: f64, total: f64) {
        let percent = if total <= 0.0 {
            100.0
        } else {
            (done / total * 100.0).clamp(0.0, 100.0)
        };
        self.report(message, percent.floor() as u8);
    }

    pub fn finish(mut self, summary: ScanSummary) {
        self.deliver(ScanEvent::Finished(summary));
    }

    pub fn fail(mut self, message: impl Into<String>) {
        self.deliver(ScanEvent::Failed {
            message: message.into(),
        });
    }
}
