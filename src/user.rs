//! Caller-memory copy primitives.
//!
//! Reads and writes never touch caller memory directly. They go through
//! [`UserSource`] and [`UserSink`], which stand in for the copy-from-user and
//! copy-to-user routines of a device driver. A failing copy reports
//! [`CopyFault`], surfaced to the caller as [`FifoError::Fault`](crate::FifoError::Fault).
//!
//! Plain byte slices and vectors implement both traits and never fault.

/// A copy to or from caller memory failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyFault;

/// Caller memory that a write copies bytes out of.
pub trait UserSource {
    /// Number of bytes the caller asked to write.
    fn len(&self) -> usize;

    /// Returns `true` when the request is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the first `dst.len()` bytes of the source into `dst`.
    ///
    /// `dst.len()` never exceeds [`len`](UserSource::len).
    fn copy_out(&self, dst: &mut [u8]) -> Result<(), CopyFault>;
}

/// Caller memory that a read copies bytes into.
pub trait UserSink {
    /// Number of bytes the caller can receive.
    fn len(&self) -> usize;

    /// Returns `true` when the destination has no room.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies `src` into the front of the destination.
    ///
    /// `src.len()` never exceeds [`len`](UserSink::len).
    fn copy_in(&mut self, src: &[u8]) -> Result<(), CopyFault>;
}

impl UserSource for [u8] {
    #[inline]
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    #[inline]
    fn copy_out(&self, dst: &mut [u8]) -> Result<(), CopyFault> {
        let src = self.get(..dst.len()).ok_or(CopyFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl UserSource for Vec<u8> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn copy_out(&self, dst: &mut [u8]) -> Result<(), CopyFault> {
        self.as_slice().copy_out(dst)
    }
}

impl<const N: usize> UserSource for [u8; N] {
    #[inline]
    fn len(&self) -> usize {
        N
    }

    #[inline]
    fn copy_out(&self, dst: &mut [u8]) -> Result<(), CopyFault> {
        self.as_slice().copy_out(dst)
    }
}

impl UserSink for [u8] {
    #[inline]
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    #[inline]
    fn copy_in(&mut self, src: &[u8]) -> Result<(), CopyFault> {
        let dst = self.get_mut(..src.len()).ok_or(CopyFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl UserSink for Vec<u8> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn copy_in(&mut self, src: &[u8]) -> Result<(), CopyFault> {
        self.as_mut_slice().copy_in(src)
    }
}

impl<const N: usize> UserSink for [u8; N] {
    #[inline]
    fn len(&self) -> usize {
        N
    }

    #[inline]
    fn copy_in(&mut self, src: &[u8]) -> Result<(), CopyFault> {
        self.as_mut_slice().copy_in(src)
    }
}
