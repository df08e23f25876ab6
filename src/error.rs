use thiserror::Error;

/// Result alias for channel operations.
pub type Result<T> = core::result::Result<T, FifoError>;

/// Errors returned by channel, handle and table operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FifoError {
    /// Non-blocking call made while the buffer was full (write) or empty (read).
    #[error("operation would block")]
    WouldBlock,
    /// A blocking wait was cancelled through the handle's [`Interrupter`](crate::Interrupter).
    #[error("blocking wait interrupted")]
    Interrupted,
    /// Copying to or from the caller's buffer failed.
    #[error("bad address while copying caller memory")]
    Fault,
    /// The requested channel index is outside the table.
    #[error("no channel {index} (table has {channels})")]
    NoSuchChannel { index: usize, channels: usize },
    /// A channel cannot be built with zero bytes of storage.
    #[error("channel capacity must be positive")]
    InvalidCapacity,
    /// A table must hold at least one channel.
    #[error("channel table must hold at least one channel")]
    NoChannels,
    /// Storage for channel `index` could not be allocated; the table was rolled back.
    #[error("failed to allocate {bytes} bytes for channel {index}")]
    Alloc { index: usize, bytes: usize },
}

/// Errors produced while loading a [`FifoConfig`](crate::FifoConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] FifoError),
}
