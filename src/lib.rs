//! Fixed-capacity, in-memory FIFO byte channels.
//!
//! A [`ChannelTable`] holds a fixed number of independent [`Channel`]s. Each
//! channel is opened into [`Handle`]s that read and write concurrently, either
//! blocking until progress is possible or failing fast with
//! [`FifoError::WouldBlock`]. Transfers may be short; the returned count is
//! authoritative. Handles can subscribe to a [`Readable`] event raised by
//! every successful write, and blocked calls can be cancelled through an
//! [`Interrupter`].
//!
//! Logging goes through the [`log`] facade; no logger is installed here.

pub mod config;
pub mod error;
pub mod fifo;
pub mod table;
pub mod user;

pub use config::FifoConfig;
pub use error::{ConfigError, FifoError, Result};
pub use fifo::{Channel, DeliveryError, Handle, Interrupter, Mode, Observer, Readable};
pub use table::ChannelTable;
pub use user::{CopyFault, UserSink, UserSource};
