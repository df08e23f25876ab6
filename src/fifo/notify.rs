//! Readable-event fan-out for a single channel.
//!
//! Each open handle may register one [`Observer`]. A successful write calls
//! [`NotificationRegistry::notify_readable`] after the buffer lock has been
//! released; the registry snapshots its observers under its own lock and
//! delivers outside of it, so an observer may call back into the channel.

use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

/// "Data is readable" event delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Readable {
    /// Index of the channel that became readable.
    pub channel: usize,
}

/// An observer could not take the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryError;

/// Receiver of readable events.
pub trait Observer: Send + Sync {
    fn readable(&self, event: Readable) -> Result<(), DeliveryError>;
}

impl Observer for Sender<Readable> {
    fn readable(&self, event: Readable) -> Result<(), DeliveryError> {
        self.send(event).map_err(|_| DeliveryError)
    }
}

/// Observers of one channel, keyed by the id of the handle that registered them.
#[derive(Default)]
pub(crate) struct NotificationRegistry {
    observers: Mutex<HashMap<u64, Arc<dyn Observer>>>,
}

impl NotificationRegistry {
    /// Registers `observer` for `handle`, replacing any earlier one.
    pub(crate) fn register(&self, handle: u64, observer: Arc<dyn Observer>) {
        self.observers.lock().insert(handle, observer);
    }

    /// Removes the observer of `handle`. No-op if there is none.
    pub(crate) fn unregister(&self, handle: u64) -> bool {
        self.observers.lock().remove(&handle).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.lock().len()
    }

    /// Delivers one [`Readable`] event to every registered observer.
    ///
    /// Delivery failures stay here.
    pub(crate) fn notify_readable(&self, channel: usize) {
        let observers: Vec<Arc<dyn Observer>> = self.observers.lock().values().cloned().collect();
        if observers.is_empty() {
            return;
        }
        log::trace!("channel {}: notifying {} observers", channel, observers.len());
        let event = Readable { channel };
        for observer in observers {
            if observer.readable(event).is_err() {
                log::trace!("channel {}: observer dropped readable event", channel);
            }
        }
    }
}
