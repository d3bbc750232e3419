//! PC/SC support for celik library.
//! Can be enabled by turning `pcsc` feature on.
//!
//! ## What is PC/SC?
//! PC/SC (Personal Computer/Smart Card) is an abstraction layer for communicating with Smart Cards
//! from Windows. Using this layer, applications can connect to any devices that supports PC/SC,
//! without depending on their driver implementation. Windows and macOS supports PC/SC by themselves,
//! Linux also supports by installing pcsc-lite shared library.
//!
//! Refer the documentation of pcsc-rust for details:
//! <https://github.com/bluetech/pcsc-rust>
//!
//! ## Usage
//! ```rust,no_run
//! use celik::pcsc::Context;
//! use celik::{Card, IdCard};
//!
//! let ctx = Context::try_new().unwrap();
//! let device = ctx.open(0).unwrap();
//! let pcsc_card = device.connect(&ctx).unwrap();
//!
//! let id_card = IdCard::open(Card::new(pcsc_card)).unwrap();
//! let document = id_card.read_document().unwrap();
//! ```

use std::ffi::{CStr, CString};
use std::thread::sleep;
use std::time::Duration;

use pcsc::{Attribute, Protocols, Scope, ShareMode, MAX_BUFFER_SIZE};

use crate::trace::{debug, info};
use crate::transport::{self, Transport};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error occurred while communicating with PC/SC: {0}")]
    PcscError(#[from] pcsc::Error),

    #[error("Reader not found on PC/SC service")]
    ReaderNotFound,

    #[error("Only {0} readers found on PC/SC service")]
    ReaderIndexOutOfRange(usize),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// PC/SC context. Released when dropped.
pub struct Context {
    ctx: pcsc::Context,
}

impl Context {
    /// Creates a PC/SC context in user scope.
    pub fn try_new() -> Result<Self> {
        Ok(Self {
            ctx: pcsc::Context::establish(Scope::User)?,
        })
    }

    /// Names of the readers known to the PC/SC service.
    pub fn list_readers(&self) -> Result<Vec<CString>> {
        readers_or_empty(self.ctx.list_readers_owned())
    }

    /// Finds the PC/SC device at `index` in the reader list.
    pub fn open(&self, index: usize) -> Result<Device> {
        let readers = self.list_readers()?;

        match readers.len() {
            0 => Err(Error::ReaderNotFound),
            n if index >= n => Err(Error::ReaderIndexOutOfRange(n)),
            _ => Ok(Device::new(&readers[index])),
        }
    }
}

/// An empty reader list is reported as an error by PC/SC.
fn readers_or_empty(
    readers: std::result::Result<Vec<CString>, pcsc::Error>,
) -> Result<Vec<CString>> {
    match readers {
        Ok(readers) => Ok(readers),
        Err(pcsc::Error::NoReadersAvailable) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// PC/SC device handle.
pub struct Device {
    reader: CString,
}

impl Device {
    fn new(reader: &CStr) -> Self {
        debug!("Using device: {}", reader.to_str().unwrap_or_default());

        Self {
            reader: reader.to_owned(),
        }
    }

    /// Name of the reader.
    pub fn name(&self) -> &CStr {
        &self.reader
    }

    /// Connects to the card inserted to the device after waiting them.
    pub fn connect(&self, ctx: &Context) -> Result<PcscCard> {
        // Waits for inserting card, polling for each seconds.
        debug!("Waiting for a card");

        loop {
            match ctx
                .ctx
                .connect(&self.reader, ShareMode::Shared, Protocols::ANY)
            {
                Ok(card) => {
                    debug!("Connected to your card");

                    return PcscCard::new(card);
                }
                Err(e) => match e {
                    pcsc::Error::NoSmartcard | pcsc::Error::RemovedCard => {
                        info!("Still waiting for your card...");
                        sleep(Duration::from_secs(1));

                        continue;
                    }
                    _ => return Err(Error::PcscError(e)),
                },
            }
        }
    }
}

/// A card to be communicated through PC/SC. Disconnected when dropped.
pub struct PcscCard {
    card: pcsc::Card,
    atr: Vec<u8>,
}

impl PcscCard {
    fn new(card: pcsc::Card) -> Result<Self> {
        let atr = card.get_attribute_owned(Attribute::AtrString)?;

        debug!("ATR: {}", hex::encode_upper(&atr));

        Ok(Self { card, atr })
    }

    /// Transmits an APDU command to the card, then receives a response from them.
    pub fn transmit(&self, tx: &[u8]) -> Result<Vec<u8>> {
        debug!("TX: {}", hex::encode(tx));

        let mut rx = [0u8; MAX_BUFFER_SIZE];
        let rx = self.card.transmit(tx, &mut rx)?;

        debug!("RX: {}", hex::encode(rx));

        Ok(Vec::from(rx))
    }
}

impl Transport for PcscCard {
    fn transmit(&self, command: &[u8]) -> std::result::Result<Vec<u8>, transport::Error> {
        PcscCard::transmit(self, command).map_err(transport::Error::new)
    }

    fn atr(&self) -> &[u8] {
        &self.atr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_readers_is_empty_list() {
        assert!(readers_or_empty(Err(pcsc::Error::NoReadersAvailable))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_readers_are_kept() {
        let readers = vec![CString::new("ACS ACR39U 00 00").unwrap()];

        assert_eq!(readers.clone(), readers_or_empty(Ok(readers)).unwrap());
    }

    #[test]
    fn test_other_errors_are_reported() {
        assert!(matches!(
            readers_or_empty(Err(pcsc::Error::NoService)),
            Err(Error::PcscError(pcsc::Error::NoService)),
        ));
    }
}
