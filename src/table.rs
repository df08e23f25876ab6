//! Fixed-size table of independent channels.

use std::sync::Arc;

use crate::config::FifoConfig;
use crate::error::{FifoError, Result};
use crate::fifo::{BoundedBuffer, Channel, Handle};

/// Owns `N` channels indexed `0..N`, created together and torn down together.
///
/// The table is an ordinary value: whoever routes open requests holds it (or
/// an `Arc` of it) and passes it where it is needed.
pub struct ChannelTable {
    channels: Vec<Arc<Channel>>,
    capacity: usize,
}

impl ChannelTable {
    /// Builds `channels` empty channels of `capacity` bytes each.
    ///
    /// If any channel fails to initialize, the ones already built are
    /// released and a single [`FifoError::Alloc`] naming the failing index is
    /// returned.
    pub fn create(channels: usize, capacity: usize) -> Result<Self> {
        Self::create_with(channels, capacity, |index, capacity| {
            BoundedBuffer::try_new(capacity).map(|buffer| Arc::new(Channel::new(index, buffer)))
        })
    }

    /// Builds the table with `build(index, capacity)` constructing each
    /// channel; `None` fails creation at that index.
    pub(crate) fn create_with<F>(channels: usize, capacity: usize, mut build: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> Option<Arc<Channel>>,
    {
        if channels == 0 {
            return Err(FifoError::NoChannels);
        }
        if capacity == 0 {
            return Err(FifoError::InvalidCapacity);
        }

        let mut table = Vec::new();
        table
            .try_reserve_exact(channels)
            .map_err(|_| FifoError::Alloc { index: 0, bytes: capacity })?;

        for index in 0..channels {
            let Some(channel) = build(index, capacity) else {
                log::warn!("channel {} allocation failed, rolling back {} channels", index, table.len());
                return Err(FifoError::Alloc { index, bytes: capacity });
            };
            table.push(channel);
        }

        log::info!("created {} channels of {} bytes", channels, capacity);
        Ok(Self { channels: table, capacity })
    }

    /// Builds a table from a validated [`FifoConfig`].
    pub fn from_config(config: &FifoConfig) -> Result<Self> {
        config.validate()?;
        Self::create(config.channels, config.capacity)
    }

    /// Opens a handle on channel `index`.
    pub fn open(&self, index: usize) -> Result<Handle> {
        self.channel(index).map(Channel::open)
    }

    pub fn channel(&self, index: usize) -> Result<&Arc<Channel>> {
        self.channels.get(index).ok_or(FifoError::NoSuchChannel {
            index,
            channels: self.channels.len(),
        })
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Always `false`; creation rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Per-channel capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Channel>> {
        self.channels.iter()
    }

    /// Tears the table down.
    ///
    /// Callers must have stopped all I/O first: blocked calls are not
    /// cancelled. Handles still open keep their own channel alive until they
    /// are released.
    pub fn destroy(self) {
        let open = self.channels.iter().filter(|c| Arc::strong_count(c) > 1).count();
        if open > 0 {
            log::warn!("destroying channel table with {} channels still open", open);
        }
        log::info!("destroyed {} channels", self.channels.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mode;

    #[test]
    fn rejects_degenerate_sizes() {
        assert_eq!(ChannelTable::create(0, 16).err(), Some(FifoError::NoChannels));
        assert_eq!(ChannelTable::create(4, 0).err(), Some(FifoError::InvalidCapacity));
    }

    #[test]
    fn oversized_capacity_fails_without_partial_table() {
        let err = ChannelTable::create(2, usize::MAX).err();
        assert_eq!(err, Some(FifoError::Alloc { index: 0, bytes: usize::MAX }));
    }

    #[test]
    fn failure_mid_table_releases_built_channels() {
        let mut built = Vec::new();
        let res = ChannelTable::create_with(4, 8, |index, capacity| {
            if index == 2 {
                return None;
            }
            let channel = Arc::new(Channel::new(index, BoundedBuffer::try_new(capacity)?));
            built.push(Arc::downgrade(&channel));
            Some(channel)
        });

        assert_eq!(res.err(), Some(FifoError::Alloc { index: 2, bytes: 8 }));
        assert_eq!(built.len(), 2);
        assert!(built.iter().all(|weak| weak.upgrade().is_none()));
    }

    #[test]
    fn open_out_of_range() {
        let table = ChannelTable::create(3, 16).unwrap();
        assert_eq!(table.open(3).err(), Some(FifoError::NoSuchChannel { index: 3, channels: 3 }));
        assert_eq!(table.channel(2).unwrap().index(), 2);
    }

    #[test]
    fn channels_are_independent() {
        let table = ChannelTable::create(2, 4).unwrap();
        let a = table.open(0).unwrap();
        let b = table.open(1).unwrap();

        assert_eq!(a.write(b"full", Mode::NonBlocking), Ok(4));
        assert_eq!(a.write(b"x", Mode::NonBlocking), Err(FifoError::WouldBlock));
        assert_eq!(b.write(b"xy", Mode::NonBlocking), Ok(2));

        let mut out = [0u8; 4];
        assert_eq!(b.read(&mut out, Mode::NonBlocking), Ok(2));
        assert_eq!(&out[..2], b"xy");
        assert_eq!(table.channel(0).unwrap().len(), 4);
    }

    #[test]
    fn default_config_matches_reference_device() {
        let table = ChannelTable::from_config(&FifoConfig::default()).unwrap();
        assert_eq!(table.len(), 10);
        assert_eq!(table.capacity(), 4096);
        assert!(table.iter().enumerate().all(|(i, c)| c.index() == i && c.is_empty()));
        table.destroy();
    }

    #[test]
    fn handle_outlives_destroyed_table() {
        let table = ChannelTable::create(1, 8).unwrap();
        let handle = table.open(0).unwrap();
        table.destroy();
        assert_eq!(handle.write(b"ok", Mode::NonBlocking), Ok(2));
    }
}
