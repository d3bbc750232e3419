//! Reading the whole document from an ID card.

use image::ImageError;

use crate::card::{self, Card, ReadError};
use crate::document::{self, Fields, IdDocument};
use crate::family::{CardFamily, FileKind, UnsupportedCard};
use crate::tlv;
use crate::trace::{debug, info};
use crate::transport::Transport;

/// Files carrying text fields, in the order they are read.
const TEXT_FILES: [FileKind; 3] = [FileKind::Document, FileKind::Personal, FileKind::Residence];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    UnsupportedCard(#[from] UnsupportedCard),

    #[error("initializing card: {0}")]
    Init(#[source] card::Error),

    #[error("reading {file} file: {source}")]
    ReadFile {
        file: FileKind,
        #[source]
        source: ReadError,
    },

    #[error("parsing {file} file: {source}")]
    ParseFile {
        file: FileKind,
        #[source]
        source: tlv::Error,
    },

    #[error("decoding photo file: {0}")]
    Portrait(#[from] ImageError),
}

/// An ID card whose family has been identified
pub struct IdCard<T>
where
    T: Transport,
{
    card: Card<T>,
    family: CardFamily,
}

impl<T> IdCard<T>
where
    T: Transport,
{
    /// Identifies the card family from the ATR, then selects the ID application
    /// if the family has one. Nothing is sent to an unsupported card.
    pub fn open(card: Card<T>) -> Result<Self, Error> {
        let family = CardFamily::detect(card.atr())?;

        info!("Detected {} card", family);

        if let Some(aid) = family.application() {
            card.select_application(aid).map_err(Error::Init)?;
        }

        Ok(Self { card, family })
    }

    pub fn family(&self) -> CardFamily {
        self.family
    }

    /// Gives the session back.
    pub fn into_card(self) -> Card<T> {
        self.card
    }

    /// Reads the raw content of a logical file, applying the family's padding policy.
    pub fn read_file(&self, file: FileKind) -> Result<Vec<u8>, Error> {
        debug!("Reading {} file", file);

        self.card
            .read_file(self.family.file_id(file), self.family.trims(file))
            .map_err(|source| Error::ReadFile { file, source })
    }

    /// Reads and decodes the text fields of a logical file.
    pub fn read_fields(&self, file: FileKind) -> Result<Fields, Error> {
        let buf = self.read_file(file)?;

        document::decode_fields(file, &buf).map_err(|source| Error::ParseFile { file, source })
    }

    /// Reads every file and assembles the document.
    /// Any failure aborts the whole read.
    pub fn read_document(&self) -> Result<IdDocument, Error> {
        let mut fields = Fields::new();

        for file in TEXT_FILES {
            fields.append(&mut self.read_fields(file)?);
        }

        let photo = self.read_file(FileKind::Photo)?;
        let portrait = document::decode_portrait(&photo)?;

        Ok(IdDocument::from_fields(fields, portrait))
    }
}
