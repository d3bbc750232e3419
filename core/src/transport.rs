//! Exchanging raw APDUs with the card through a reader.
//!
//! The reader side is not implemented here: anything that can move bytes to the
//! card and back (PC/SC, a test double, a bridge to another runtime) can serve
//! as a [`Transport`].

use std::fmt::{Debug, Formatter};

/// A failure of the reader to complete one command/response exchange.
#[derive(thiserror::Error)]
#[error("{0}")]
pub struct Error(Box<dyn std::error::Error + Send + Sync>);

impl Error {
    /// Wraps an error raised by the reader implementation.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

/// A delegate to communicate with the card outside.
pub trait Transport {
    /// Transmits the command octets to the card, then returns the response octets,
    /// including the trailing status word.
    fn transmit(&self, command: &[u8]) -> Result<Vec<u8>, Error>;

    /// Answer-To-Reset reported by the card when it was powered up.
    fn atr(&self) -> &[u8];
}

impl<T> Transport for &T
where
    T: Transport + ?Sized,
{
    fn transmit(&self, command: &[u8]) -> Result<Vec<u8>, Error> {
        (**self).transmit(command)
    }

    fn atr(&self) -> &[u8] {
        (**self).atr()
    }
}

impl<T> Transport for Box<T>
where
    T: Transport + ?Sized,
{
    fn transmit(&self, command: &[u8]) -> Result<Vec<u8>, Error> {
        (**self).transmit(command)
    }

    fn atr(&self) -> &[u8] {
        (**self).atr()
    }
}
