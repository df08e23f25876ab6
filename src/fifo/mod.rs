mod channel;
pub(crate) mod inner_fifo;
mod notify;
pub(crate) mod wait_set;

#[cfg(test)]
mod tests_prop;

pub use channel::{Channel, Handle};
pub(crate) use inner_fifo::BoundedBuffer;
pub use notify::{DeliveryError, Observer, Readable};
pub use wait_set::{Interrupter, Mode};
