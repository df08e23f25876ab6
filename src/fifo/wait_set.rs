//! Mutual exclusion and wait/wake protocol around a [`BoundedBuffer`].
//!
//! A [`WaitSet`] owns the buffer behind a [`parking_lot::Mutex`] and two
//! condition variables:
//!
//! - `room_available` - writers sleep here while the buffer is full.
//! - `data_available` - readers sleep here while the buffer is empty.
//!
//! Waiting uses [`Condvar::wait`], which releases the lock and parks the
//! thread atomically, so a wakeup issued after the waiter checked its
//! condition cannot be lost. Every woken waiter re-checks its condition;
//! no FIFO order among waiters is promised.
//!
//! # Interruption
//!
//! A blocked call can be cancelled through an [`Interrupter`]. Raising it
//! bumps the [`Signal`] epoch and then broadcasts both conditions while
//! holding the buffer lock. A waiter only compares epochs with the lock held,
//! so the raise either happens before that check or finds the waiter already
//! parked. Each call remembers the last consumed epoch it started from, so one
//! raise cancels every call sleeping on the handle, not just the first to wake.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::inner_fifo::BoundedBuffer;
use crate::error::{FifoError, Result};
use crate::user::{UserSink, UserSource};

/// Blocking behaviour of a read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Sleep until the transfer can make progress.
    #[default]
    Blocking,
    /// Fail with [`FifoError::WouldBlock`] instead of sleeping.
    NonBlocking,
}

/// Interrupt state of one handle.
///
/// `raised` counts interrupts; `consumed` is the highest raise already
/// turned into an [`FifoError::Interrupted`]. A raise newer than `consumed`
/// is pending.
#[derive(Debug, Default)]
pub(crate) struct Signal {
    raised: AtomicU64,
    consumed: AtomicU64,
}

impl Signal {
    /// Epoch a call starts from; raises after it cancel the call.
    #[inline]
    fn enter(&self) -> u64 {
        self.consumed.load(Ordering::Acquire)
    }

    /// Returns `true`, and marks the raise consumed, if an interrupt newer
    /// than `seen` is pending.
    #[inline]
    fn fired(&self, seen: u64) -> bool {
        let raised = self.raised.load(Ordering::Acquire);
        if raised <= seen {
            return false;
        }
        self.consumed.fetch_max(raised, Ordering::AcqRel);
        true
    }
}

/// Cancels blocking calls made through one [`Handle`](crate::Handle).
///
/// Cloneable and `Send`, so it can be moved to the thread that wants to
/// interrupt. One interrupt cancels every call blocked on the handle. Raised
/// while no call is blocked, it stays pending and cancels the next call that
/// has to sleep.
#[derive(Clone)]
pub struct Interrupter {
    signal: Arc<Signal>,
    wait_set: Arc<WaitSet>,
}

impl Interrupter {
    pub(crate) fn new(signal: Arc<Signal>, wait_set: Arc<WaitSet>) -> Self {
        Self { signal, wait_set }
    }

    /// Interrupts the blocked calls, if any; they fail with [`FifoError::Interrupted`].
    pub fn interrupt(&self) {
        self.signal.raised.fetch_add(1, Ordering::AcqRel);
        let _guard = self.wait_set.buffer.lock();
        self.wait_set.room_available.notify_all();
        self.wait_set.data_available.notify_all();
    }
}

/// The synchronized core of a channel.
pub(crate) struct WaitSet {
    capacity: usize,
    buffer: Mutex<BoundedBuffer>,
    room_available: Condvar,
    data_available: Condvar,
}

impl WaitSet {
    pub(crate) fn new(buffer: BoundedBuffer) -> Self {
        Self {
            capacity: buffer.capacity(),
            buffer: Mutex::new(buffer),
            room_available: Condvar::new(),
            data_available: Condvar::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes currently buffered.
    pub(crate) fn len(&self) -> usize {
        self.buffer.lock().available_to_read()
    }

    /// Writes up to `src.len()` bytes, truncating to the free space.
    ///
    /// Blocks while the buffer is full unless `mode` is
    /// [`Mode::NonBlocking`]. Returns the number of bytes written; on success
    /// readers blocked on `data_available` are woken. The caller is
    /// responsible for the readable notification, which must run after the
    /// lock is gone.
    pub(crate) fn write<S: UserSource + ?Sized>(&self, src: &S, mode: Mode, signal: &Signal) -> Result<usize> {
        let seen = signal.enter();
        let mut buffer = self.buffer.lock();
        while buffer.available_to_write() == 0 {
            if mode == Mode::NonBlocking {
                return Err(FifoError::WouldBlock);
            }
            Self::sleep(&self.room_available, &mut buffer, signal, seen)?;
        }

        let n = src.len().min(buffer.available_to_write());
        buffer.append(src, n).map_err(|_| FifoError::Fault)?;
        log::debug!("wrote {} bytes, fifo len {}", n, buffer.available_to_read());
        drop(buffer);

        self.data_available.notify_all();
        Ok(n)
    }

    /// Reads up to `dst.len()` bytes, truncating to what is buffered.
    ///
    /// Blocks while the buffer is empty unless `mode` is
    /// [`Mode::NonBlocking`]. On success writers blocked on `room_available`
    /// are woken.
    pub(crate) fn read<D: UserSink + ?Sized>(&self, dst: &mut D, mode: Mode, signal: &Signal) -> Result<usize> {
        let seen = signal.enter();
        let mut buffer = self.buffer.lock();
        while buffer.available_to_read() == 0 {
            if mode == Mode::NonBlocking {
                return Err(FifoError::WouldBlock);
            }
            Self::sleep(&self.data_available, &mut buffer, signal, seen)?;
        }

        let n = dst.len().min(buffer.available_to_read());
        buffer.consume(dst, n).map_err(|_| FifoError::Fault)?;
        log::debug!("read {} bytes, fifo len {}", n, buffer.available_to_read());
        drop(buffer);

        self.room_available.notify_all();
        Ok(n)
    }

    /// Parks on `condvar` until notified.
    ///
    /// Fails with [`FifoError::Interrupted`] if an interrupt newer than `seen`
    /// is pending before parking or after waking. The buffer is not touched
    /// on that path.
    fn sleep(condvar: &Condvar, buffer: &mut MutexGuard<'_, BoundedBuffer>, signal: &Signal, seen: u64) -> Result<()> {
        if signal.fired(seen) {
            return Err(FifoError::Interrupted);
        }
        condvar.wait(buffer);
        if signal.fired(seen) {
            return Err(FifoError::Interrupted);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn contents(&self) -> Vec<u8> {
        self.buffer.lock().contents().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_does_not_take_the_buffer_lock() {
        let ws = WaitSet::new(BoundedBuffer::try_new(16).unwrap());
        let _held = ws.buffer.lock();
        assert_eq!(ws.capacity(), 16);
    }

    #[test]
    fn raise_is_seen_by_every_call_started_before_it() {
        let signal = Signal::default();
        let first = signal.enter();
        let second = signal.enter();
        signal.raised.fetch_add(1, Ordering::AcqRel);

        assert!(signal.fired(first));
        assert!(signal.fired(second));
        assert!(!signal.fired(signal.enter()));
    }
}
