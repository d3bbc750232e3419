//! A crate to read Serbian electronic ID cards through an APDU delegate.
//!
//! ```rust,no_run
//! # fn run(transport: impl celik::transport::Transport) -> Result<(), celik::Error> {
//! let document = celik::read_document(transport)?;
//! println!("{} {}", document.document_number, document.full_name());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "pcsc")]
pub mod pcsc;

pub mod apdu;
pub mod card;
pub mod document;
pub mod family;
pub mod id_card;
pub mod tlv;
pub mod transport;

mod trace;

pub use card::Card;
pub use document::IdDocument;
pub use family::{CardFamily, FileKind};
pub use id_card::{Error, IdCard};

/// Identifies the card behind the delegate and reads the whole document from it.
pub fn read_document<T>(delegate: T) -> Result<IdDocument, Error>
where
    T: transport::Transport,
{
    IdCard::open(Card::new(delegate))?.read_document()
}
