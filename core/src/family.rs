//! Card generations and the policy that applies to each of them.

use std::fmt::{Display, Formatter};

const APOLLO_ATR: [u8; 18] = [
    0x3B, 0xB9, 0x18, 0x00, 0x81, 0x31, 0xFE, 0x9E, 0x80, 0x73, 0xFF, 0x61, 0x40, 0x83, 0x00,
    0x00, 0x00, 0xDF,
];

const GEMALTO_ATR: [u8; 25] = [
    0x3B, 0xFF, 0x94, 0x00, 0x00, 0x81, 0x31, 0x80, 0x43, 0x80, 0x31, 0x80, 0x65, 0xB0, 0x85,
    0x02, 0x01, 0xF3, 0x12, 0x0F, 0xFF, 0x82, 0x90, 0x00, 0x79,
];

/// Name of the ID application on Gemalto cards.
const GEMALTO_AID: [u8; 11] = [
    0xF3, 0x81, 0x00, 0x00, 0x02, 0x53, 0x45, 0x52, 0x49, 0x44, 0x01,
];

const EF_DOCUMENT: [u8; 2] = [0x0F, 0x02];
const EF_PERSONAL: [u8; 2] = [0x0F, 0x03];
const EF_RESIDENCE: [u8; 2] = [0x0F, 0x04];
const EF_PHOTO: [u8; 2] = [0x0F, 0x06];

/// Answer-To-Reset of a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Atr(pub Vec<u8>);

impl Display for Atr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode_upper(&self.0))
    }
}

impl From<&[u8]> for Atr {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// The ATR does not belong to any supported card.
#[derive(Debug, thiserror::Error)]
#[error("unsupported card (ATR {0})")]
pub struct UnsupportedCard(pub Atr);

/// Logical files holding the document data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    Document,
    Personal,
    Residence,
    Photo,
}

impl Display for FileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Document => "document",
            Self::Personal => "personal",
            Self::Residence => "residence",
            Self::Photo => "photo",
        })
    }
}

/// Generation of the ID card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardFamily {
    /// First cards, no longer issued.
    Apollo,

    /// Cards issued today.
    Gemalto,
}

impl CardFamily {
    const ALL: [CardFamily; 2] = [Self::Apollo, Self::Gemalto];

    /// Identifies the family by comparing the ATR against the known ones.
    pub fn detect(atr: &[u8]) -> Result<Self, UnsupportedCard> {
        Self::ALL
            .into_iter()
            .find(|family| family.atr() == atr)
            .ok_or_else(|| UnsupportedCard(atr.into()))
    }

    /// ATR reported by cards of this family.
    pub fn atr(self) -> &'static [u8] {
        match self {
            Self::Apollo => &APOLLO_ATR,
            Self::Gemalto => &GEMALTO_ATR,
        }
    }

    /// Application to select before any file can be read, if the family has one.
    pub fn application(self) -> Option<&'static [u8]> {
        match self {
            Self::Apollo => None,
            Self::Gemalto => Some(&GEMALTO_AID),
        }
    }

    /// Identifier of the EF holding the file. Both families share the same file table.
    pub fn file_id(self, file: FileKind) -> [u8; 2] {
        match file {
            FileKind::Document => EF_DOCUMENT,
            FileKind::Personal => EF_PERSONAL,
            FileKind::Residence => EF_RESIDENCE,
            FileKind::Photo => EF_PHOTO,
        }
    }

    /// Whether the file stores four padding octets before the content.
    /// Both families pad the photo file only.
    pub fn trims(self, file: FileKind) -> bool {
        matches!(file, FileKind::Photo)
    }
}

impl Display for CardFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Apollo => "Apollo",
            Self::Gemalto => "Gemalto",
        })
    }
}
