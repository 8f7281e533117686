//! One-way progress channel with guaranteed, single close.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::types::ProgressEvent;

/// Message sent when the channel is dropped without a terminal event.
const UNEXPECTED_TERMINATION: &str = "Stage execution terminated unexpectedly";

/// The emitting half of a stage execution's progress stream.
///
/// Events are delivered in the order they are emitted. `Progress` percentages
/// are clamped so the emitted sequence never decreases and never exceeds 100.
///
/// The channel closes exactly once: [`EventChannel::complete`] and
/// [`EventChannel::fail`] consume the channel after sending their terminal
/// event, and dropping it on any other path (early return, panic unwind)
/// sends an `Error` event before the sender goes away.
///
/// ```ignore
/// let (mut channel, rx) = EventChannel::open("task-1");
/// channel.action("Starting");
/// channel.complete(); // or channel.fail("reason")
/// ```
pub struct EventChannel {
    sender: mpsc::UnboundedSender<ProgressEvent>,
    label: String,
    last_percent: u8,
    emitted: usize,
    terminated: bool,
}

impl EventChannel {
    /// Open a channel. `label` identifies the execution in logs.
    pub fn open(label: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let channel = Self {
            sender,
            label: label.into(),
            last_percent: 0,
            emitted: 0,
            terminated: false,
        };
        (channel, receiver)
    }

    /// Send an event. Returns `false` if the receiver has gone away.
    ///
    /// Terminal events must go through [`complete`](Self::complete) or
    /// [`fail`](Self::fail); passing one here is ignored.
    pub fn emit(&mut self, event: ProgressEvent) -> bool {
        if event.is_terminal() {
            warn!(label = %self.label, kind = event.kind(), "Terminal event passed to emit, ignoring");
            return false;
        }
        let event = match event {
            ProgressEvent::Progress { percent, step } => {
                let percent = percent.min(100).max(self.last_percent);
                self.last_percent = percent;
                ProgressEvent::Progress { percent, step }
            }
            other => other,
        };
        self.send(event)
    }

    pub fn thought(&mut self, content: impl Into<String>) -> bool {
        self.emit(ProgressEvent::thought(content))
    }

    pub fn action(&mut self, content: impl Into<String>) -> bool {
        self.emit(ProgressEvent::action(content))
    }

    pub fn progress(&mut self, percent: u8, step: impl Into<String>) -> bool {
        self.emit(ProgressEvent::progress(percent, step))
    }

    pub fn result(&mut self, content: impl Into<String>) -> bool {
        self.emit(ProgressEvent::result(content))
    }

    pub fn deliverable(&mut self, key: impl Into<String>, url: impl Into<String>) -> bool {
        self.emit(ProgressEvent::deliverable(key, url))
    }

    /// Emit `Progress{100}` then `Complete`, and close.
    pub fn complete(mut self) {
        self.progress(100, "Complete");
        self.send(ProgressEvent::Complete);
        self.terminated = true;
        debug!(label = %self.label, emitted = self.emitted, "Progress channel completed");
    }

    /// Emit `Error{content}` and close.
    pub fn fail(mut self, content: impl Into<String>) {
        self.send(ProgressEvent::error(content));
        self.terminated = true;
        debug!(label = %self.label, emitted = self.emitted, "Progress channel failed");
    }

    /// True once the receiving side has been dropped (client disconnected).
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once the receiving side has been dropped.
    pub async fn closed(&self) {
        self.sender.closed().await
    }

    /// Highest percentage emitted so far.
    pub fn last_percent(&self) -> u8 {
        self.last_percent
    }

    /// Number of events delivered so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn send(&mut self, event: ProgressEvent) -> bool {
        match self.sender.send(event) {
            Ok(()) => {
                self.emitted += 1;
                true
            }
            Err(_) => false,
        }
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        if !self.terminated {
            warn!(
                label = %self.label,
                "Progress channel dropped without a terminal event - emitting error"
            );
            self.send(ProgressEvent::error(UNEXPECTED_TERMINATION));
        }
    }
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("label", &self.label)
            .field("last_percent", &self.last_percent)
            .field("emitted", &self.emitted)
            .field("terminated", &self.terminated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn drain(rx: &mut mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (mut channel, mut rx) = EventChannel::open("test");
        channel.thought("one");
        channel.action("two");
        channel.result("three");
        channel.complete();

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                ProgressEvent::thought("one"),
                ProgressEvent::action("two"),
                ProgressEvent::result("three"),
                ProgressEvent::progress(100, "Complete"),
                ProgressEvent::Complete,
            ]
        );
        // sender dropped, channel closed
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_progress_never_decreases() {
        let (mut channel, mut rx) = EventChannel::open("test");
        channel.progress(30, "a");
        channel.progress(20, "b");
        channel.progress(150, "c");
        assert_eq!(channel.last_percent(), 100);
        channel.fail("stop");

        let percents: Vec<u8> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Progress { percent, .. } => Some(percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents, vec![30, 30, 100]);
    }

    #[tokio::test]
    async fn test_fail_closes_once() {
        let (mut channel, mut rx) = EventChannel::open("test");
        channel.action("working");
        channel.fail("boom");

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![ProgressEvent::action("working"), ProgressEvent::error("boom")]
        );
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_drop_without_terminal_emits_error() {
        let (mut channel, mut rx) = EventChannel::open("test");
        channel.action("working");
        drop(channel);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], ProgressEvent::Error { .. }));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_terminal_events_rejected_by_emit() {
        let (mut channel, mut rx) = EventChannel::open("test");
        assert!(!channel.emit(ProgressEvent::Complete));
        channel.complete();

        let events = drain(&mut rx);
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[test]
    fn test_closed_receiver_detected() {
        let (mut channel, rx) = EventChannel::open("test");
        assert!(!channel.is_closed());
        drop(rx);
        assert!(channel.is_closed());
        assert!(!channel.thought("nobody listening"));
        assert_eq!(channel.emitted(), 0);
        channel.complete();
    }

    #[tokio::test]
    async fn test_closed_resolves_when_receiver_dropped() {
        let (channel, rx) = EventChannel::open("test");
        let waiter = tokio::spawn(async move {
            channel.closed().await;
            channel
        });
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(rx);
        let channel = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("closed() resolved")
            .unwrap();
        assert!(channel.is_closed());
        channel.fail("client gone");
    }
}
