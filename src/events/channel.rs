//! Event channel implementation using crossbeam-channel.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sending half handed to the engine.
///
/// Cloneable and `Send`, so it can cross into a worker thread.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// A dropped receiver is not an error: progress reporting is optional.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half used by front ends
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event, or `None` once every sender is gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Iterate until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Factory for connected sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    ///
    /// Events are small and the engine is single-threaded, so an unbounded
    /// queue never grows past one run's worth of events.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender whose events go nowhere.
///
/// Used by the engine's `run()` and by tests that don't watch progress.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
