//! Bounded FIFO byte channel and the handles that open it.
//!
//! # Overview
//! A [`Channel`] combines one fixed-capacity byte buffer, the lock and wait
//! conditions that serialize access to it, and a registry of readable-event
//! observers. Callers never touch a channel directly; they [`open`](Channel::open)
//! it and get a [`Handle`], which is the per-opener view: it reads, writes,
//! subscribes to readable events and can be interrupted while blocked.
//!
//! Any number of handles may be open on the same channel, from any number of
//! threads. Reads and writes transfer as much as currently fits and return
//! the count; a short transfer is not an error.
//!
//! # Example
//! ```
//! use chardev_fifo::{ChannelTable, Mode};
//!
//! let table = ChannelTable::create(1, 8).unwrap();
//! let writer = table.open(0).unwrap();
//! let reader = table.open(0).unwrap();
//!
//! assert_eq!(writer.write(b"ABCDEFGH", Mode::Blocking), Ok(8));
//! let mut out = [0u8; 3];
//! assert_eq!(reader.read(&mut out, Mode::Blocking), Ok(3));
//! assert_eq!(&out, b"ABC");
//! ```
//!
//! # Internals
//! The buffer and its wait conditions live in a [`WaitSet`] shared through an
//! `Arc`, so that an [`Interrupter`] can wake sleepers without borrowing the
//! handle. Notification fan-out happens after [`WaitSet::write`] has dropped
//! the buffer lock.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crossbeam_channel::{Receiver, unbounded};

use super::inner_fifo::BoundedBuffer;
use super::notify::{NotificationRegistry, Observer, Readable};
use super::wait_set::{Interrupter, Mode, Signal, WaitSet};
use crate::error::Result;
use crate::user::{UserSink, UserSource};

/// One independent bounded byte buffer with its synchronization and
/// notification state.
pub struct Channel {
    index: usize,
    wait_set: Arc<WaitSet>,
    registry: NotificationRegistry,
    next_handle: AtomicU64,
}

impl Channel {
    pub(crate) fn new(index: usize, buffer: BoundedBuffer) -> Self {
        Self {
            index,
            wait_set: Arc::new(WaitSet::new(buffer)),
            registry: NotificationRegistry::default(),
            next_handle: AtomicU64::new(0),
        }
    }

    /// Opens a new handle on the channel. Does not touch the buffer.
    pub fn open(self: &Arc<Self>) -> Handle {
        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        Handle {
            channel: Arc::clone(self),
            signal: Arc::new(Signal::default()),
            id,
        }
    }

    /// Position of the channel in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.wait_set.capacity()
    }

    /// Bytes buffered right now. Stale as soon as it returns.
    pub fn len(&self) -> usize {
        self.wait_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of handles with a registered observer.
    pub fn observer_count(&self) -> usize {
        self.registry.len()
    }

    #[cfg(test)]
    pub(crate) fn contents(&self) -> Vec<u8> {
        self.wait_set.contents()
    }
}

/// An opened view of a [`Channel`].
///
/// Dropping the handle releases it, exactly like [`release`](Handle::release).
pub struct Handle {
    channel: Arc<Channel>,
    signal: Arc<Signal>,
    id: u64,
}

impl Handle {
    /// Writes up to `src.len()` bytes and returns how many were accepted.
    ///
    /// A full buffer makes a [`Mode::Blocking`] call sleep until a reader
    /// frees room, and a [`Mode::NonBlocking`] call fail with
    /// [`WouldBlock`](crate::FifoError::WouldBlock). Otherwise the request is
    /// truncated to the free space. Every successful write delivers one
    /// [`Readable`] event to each registered observer.
    pub fn write<S: UserSource + ?Sized>(&self, src: &S, mode: Mode) -> Result<usize> {
        let n = self.channel.wait_set.write(src, mode, &self.signal)?;
        self.channel.registry.notify_readable(self.channel.index);
        Ok(n)
    }

    /// Reads up to `dst.len()` bytes into the front of `dst` and returns how
    /// many were copied.
    ///
    /// An empty buffer makes a [`Mode::Blocking`] call sleep until a writer
    /// supplies data, and a [`Mode::NonBlocking`] call fail with
    /// [`WouldBlock`](crate::FifoError::WouldBlock).
    pub fn read<D: UserSink + ?Sized>(&self, dst: &mut D, mode: Mode) -> Result<usize> {
        self.channel.wait_set.read(dst, mode, &self.signal)
    }

    /// Registers `observer` for readable events, replacing any observer this
    /// handle registered before.
    pub fn register_observer<O: Observer + 'static>(&self, observer: O) {
        self.channel.registry.register(self.id, Arc::new(observer));
        log::debug!("channel {}: handle {} registered observer", self.channel.index, self.id);
    }

    /// Registers a channel-backed observer and returns its receiving end.
    pub fn subscribe(&self) -> Receiver<Readable> {
        let (tx, rx) = unbounded();
        self.register_observer(tx);
        rx
    }

    /// Removes this handle's observer. No-op if none is registered.
    pub fn unregister_observer(&self) {
        if self.channel.registry.unregister(self.id) {
            log::debug!("channel {}: handle {} unregistered observer", self.channel.index, self.id);
        }
    }

    /// Returns an [`Interrupter`] that cancels blocking calls on this handle.
    pub fn interrupter(&self) -> Interrupter {
        Interrupter::new(Arc::clone(&self.signal), Arc::clone(&self.channel.wait_set))
    }

    /// Closes the handle. Buffered data and other handles are unaffected.
    pub fn release(self) {}

    pub fn channel(&self) -> &Arc<Channel> {
        &self.channel
    }

    pub fn channel_index(&self) -> usize {
        self.channel.index
    }

    /// Identifier of this handle, unique within its channel.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.unregister_observer();
    }
}
