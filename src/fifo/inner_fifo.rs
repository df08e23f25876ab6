use crate::user::{CopyFault, UserSink, UserSource};

/// Fixed-capacity byte store wrapped by [`WaitSet`](super::wait_set::WaitSet).
///
/// # Overview
///
/// `BoundedBuffer` is the raw storage behind a channel. It holds at most
/// `capacity` bytes and keeps every valid byte at the front of the storage:
/// the region `storage[0..len)` is the FIFO contents, oldest byte first, and
/// anything past `len` is stale and never handed to a reader.
///
/// # Compaction
///
/// The buffer is not a ring. Consuming `n` bytes copies them out of the head
/// and then moves the remaining `len - n` bytes down to offset 0:
///
/// ```text
/// before: [A B C D E F G H]  len = 8
/// consume(3) -> "ABC"
/// after:  [D E F G H . . .]  len = 5
/// ```
///
/// This costs O(len) per read but keeps appends a single contiguous copy into
/// `storage[len..len + n)`.
///
/// # Thread safety
///
/// None of its own. Every method is called with the channel lock held.
pub(crate) struct BoundedBuffer {
    storage: Box<[u8]>,
    len: usize,
}

impl BoundedBuffer {
    /// Allocates an empty buffer of `capacity` bytes.
    ///
    /// Returns `None` if the allocation fails, so that table construction can
    /// roll back instead of aborting the process.
    pub(crate) fn try_new(capacity: usize) -> Option<Self> {
        let mut storage = Vec::new();
        storage.try_reserve_exact(capacity).ok()?;
        storage.resize(capacity, 0);
        Some(Self {
            storage: storage.into_boxed_slice(),
            len: 0,
        })
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline(always)]
    pub(crate) fn available_to_write(&self) -> usize {
        self.capacity() - self.len
    }

    #[inline(always)]
    pub(crate) fn available_to_read(&self) -> usize {
        self.len
    }

    /// Appends the first `n` bytes of `src` to the tail of the contents.
    ///
    /// The bytes are copied straight into the free region; `len` only moves
    /// once the copy succeeded, so a fault leaves the buffer untouched.
    ///
    /// # Preconditions
    ///
    /// `n <= self.available_to_write()` and `n <= src.len()`.
    pub(crate) fn append<S: UserSource + ?Sized>(&mut self, src: &S, n: usize) -> Result<(), CopyFault> {
        debug_assert!(n <= self.available_to_write());
        let tail = &mut self.storage[self.len..self.len + n];
        src.copy_out(tail)?;
        self.len += n;
        Ok(())
    }

    /// Copies the oldest `n` bytes into `dst` and compacts the remainder down
    /// to offset 0.
    ///
    /// Nothing moves if the copy faults.
    ///
    /// # Preconditions
    ///
    /// `n <= self.available_to_read()` and `n <= dst.len()`.
    pub(crate) fn consume<D: UserSink + ?Sized>(&mut self, dst: &mut D, n: usize) -> Result<(), CopyFault> {
        debug_assert!(n <= self.len);
        dst.copy_in(&self.storage[..n])?;
        // Overlap-safe move of the unread tail to the front.
        self.storage.copy_within(n..self.len, 0);
        self.len -= n;
        Ok(())
    }

    /// Valid contents, oldest byte first.
    #[cfg(test)]
    pub(crate) fn contents(&self) -> &[u8] {
        &self.storage[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FaultySource;

    impl UserSource for FaultySource {
        fn len(&self) -> usize {
            4
        }

        fn copy_out(&self, _dst: &mut [u8]) -> Result<(), CopyFault> {
            Err(CopyFault)
        }
    }

    #[test]
    fn append_then_consume_compacts() {
        let mut buf = BoundedBuffer::try_new(8).unwrap();
        buf.append(b"ABCDEFGH".as_slice(), 8).unwrap();
        assert_eq!(buf.available_to_write(), 0);

        let mut out = [0u8; 3];
        buf.consume(&mut out, 3).unwrap();
        assert_eq!(&out, b"ABC");
        assert_eq!(buf.contents(), b"DEFGH");
        assert_eq!(buf.available_to_write(), 3);

        buf.append(b"IJ".as_slice(), 2).unwrap();
        assert_eq!(buf.contents(), b"DEFGHIJ");
    }

    #[test]
    fn faulted_append_leaves_length() {
        let mut buf = BoundedBuffer::try_new(8).unwrap();
        buf.append(b"ab".as_slice(), 2).unwrap();
        assert_eq!(buf.append(&FaultySource, 4), Err(CopyFault));
        assert_eq!(buf.contents(), b"ab");
    }

    #[test]
    fn faulted_consume_keeps_contents() {
        let mut buf = BoundedBuffer::try_new(4).unwrap();
        buf.append(b"wxyz".as_slice(), 4).unwrap();
        let mut tiny = [0u8; 1];
        assert_eq!(buf.consume(&mut tiny, 2), Err(CopyFault));
        assert_eq!(buf.contents(), b"wxyz");
    }
}
