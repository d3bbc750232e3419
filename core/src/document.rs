//! The document record and the decoders filling it from the card files.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use image::{DynamicImage, ImageResult};

use crate::family::FileKind;
use crate::tlv;

const RAW_DATE_FORMAT: &str = "%Y%m%d";
const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y.";

/// Text fields of the document, with the TLV tag each is stored under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    DocumentNumber,
    DocumentType,
    DocumentSerialNumber,
    IssuingDate,
    ExpiryDate,
    IssuingAuthority,

    PersonalNumber,
    Surname,
    GivenName,
    ParentGivenName,
    Sex,
    PlaceOfBirth,
    CommunityOfBirth,
    StateOfBirth,
    DateOfBirth,

    State,
    Community,
    Place,
    Street,
    AddressNumber,
    AddressLetter,
    AddressEntrance,
    AddressFloor,
    AddressApartmentNumber,
    AddressDate,
}

const DOCUMENT_FIELDS: &[Field] = &[
    Field::DocumentNumber,
    Field::DocumentType,
    Field::DocumentSerialNumber,
    Field::IssuingDate,
    Field::ExpiryDate,
    Field::IssuingAuthority,
];

const PERSONAL_FIELDS: &[Field] = &[
    Field::PersonalNumber,
    Field::Surname,
    Field::GivenName,
    Field::ParentGivenName,
    Field::Sex,
    Field::PlaceOfBirth,
    Field::CommunityOfBirth,
    Field::StateOfBirth,
    Field::DateOfBirth,
];

const RESIDENCE_FIELDS: &[Field] = &[
    Field::State,
    Field::Community,
    Field::Place,
    Field::Street,
    Field::AddressNumber,
    Field::AddressLetter,
    Field::AddressEntrance,
    Field::AddressFloor,
    Field::AddressApartmentNumber,
    Field::AddressDate,
];

impl Field {
    /// Tag of the field in the TLV table of their file.
    pub const fn tag(self) -> u16 {
        match self {
            Self::DocumentNumber => 1546,
            Self::DocumentType => 1547,
            Self::DocumentSerialNumber => 1548,
            Self::IssuingDate => 1549,
            Self::ExpiryDate => 1550,
            Self::IssuingAuthority => 1551,

            Self::PersonalNumber => 1558,
            Self::Surname => 1559,
            Self::GivenName => 1560,
            Self::ParentGivenName => 1561,
            Self::Sex => 1562,
            Self::PlaceOfBirth => 1563,
            Self::CommunityOfBirth => 1564,
            Self::StateOfBirth => 1565,
            Self::DateOfBirth => 1566,

            Self::State => 1568,
            Self::Community => 1569,
            Self::Place => 1570,
            Self::Street => 1571,
            Self::AddressNumber => 1572,
            Self::AddressLetter => 1573,
            Self::AddressEntrance => 1574,
            Self::AddressFloor => 1575,
            Self::AddressApartmentNumber => 1578,
            Self::AddressDate => 1580,
        }
    }

    /// Whether the value is a date, stored as `YYYYMMDD` on the card.
    pub fn is_date(self) -> bool {
        matches!(
            self,
            Self::IssuingDate | Self::ExpiryDate | Self::DateOfBirth | Self::AddressDate
        )
    }

    /// Fields stored in the file. The photo file has none.
    pub fn in_file(file: FileKind) -> &'static [Field] {
        match file {
            FileKind::Document => DOCUMENT_FIELDS,
            FileKind::Personal => PERSONAL_FIELDS,
            FileKind::Residence => RESIDENCE_FIELDS,
            FileKind::Photo => &[],
        }
    }
}

/// Text values decoded from one or more files.
pub type Fields = BTreeMap<Field, String>;

/// Converts a `YYYYMMDD` date into `DD.MM.YYYY.`.
/// Anything else, including an already converted date, is returned unchanged.
pub fn format_date(date: &str) -> String {
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return date.to_owned();
    }

    match NaiveDate::parse_from_str(date, RAW_DATE_FORMAT) {
        Ok(parsed) => parsed.format(DISPLAY_DATE_FORMAT).to_string(),
        Err(_) => date.to_owned(),
    }
}

/// Decodes the text fields of a file.
///
/// Tags the file is not expected to hold are ignored, expected tags that are
/// absent are left out of the result.
pub fn decode_fields(file: FileKind, buf: &[u8]) -> Result<Fields, tlv::Error> {
    let table = tlv::decode(buf)?;

    Ok(Field::in_file(file)
        .iter()
        .filter_map(|&field| {
            let raw = table.get(&field.tag())?;
            let value = String::from_utf8_lossy(raw);

            Some(match field.is_date() {
                true => (field, format_date(&value)),
                _ => (field, value.into_owned()),
            })
        })
        .collect())
}

/// Decodes the portrait stored in the photo file.
pub fn decode_portrait(buf: &[u8]) -> ImageResult<DynamicImage> {
    image::load_from_memory(buf)
}

/// Data read from an ID card.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct IdDocument {
    pub document_number: String,
    pub document_type: String,
    pub document_serial_number: String,
    pub issuing_date: String,
    pub expiry_date: String,
    pub issuing_authority: String,

    pub personal_number: String,
    pub surname: String,
    pub given_name: String,
    pub parent_given_name: String,
    pub sex: String,
    pub place_of_birth: String,
    pub community_of_birth: String,
    pub state_of_birth: String,
    pub date_of_birth: String,

    pub state: String,
    pub community: String,
    pub place: String,
    pub street: String,
    pub address_number: String,
    pub address_letter: String,
    pub address_entrance: String,
    pub address_floor: String,
    pub address_apartment_number: String,
    pub address_date: String,

    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    pub portrait: DynamicImage,
}

impl IdDocument {
    /// Assembles the record. Fields missing from `fields` are left empty.
    pub fn from_fields(mut fields: Fields, portrait: DynamicImage) -> Self {
        let mut take = |field: Field| fields.remove(&field).unwrap_or_default();

        Self {
            document_number: take(Field::DocumentNumber),
            document_type: take(Field::DocumentType),
            document_serial_number: take(Field::DocumentSerialNumber),
            issuing_date: take(Field::IssuingDate),
            expiry_date: take(Field::ExpiryDate),
            issuing_authority: take(Field::IssuingAuthority),

            personal_number: take(Field::PersonalNumber),
            surname: take(Field::Surname),
            given_name: take(Field::GivenName),
            parent_given_name: take(Field::ParentGivenName),
            sex: take(Field::Sex),
            place_of_birth: take(Field::PlaceOfBirth),
            community_of_birth: take(Field::CommunityOfBirth),
            state_of_birth: take(Field::StateOfBirth),
            date_of_birth: take(Field::DateOfBirth),

            state: take(Field::State),
            community: take(Field::Community),
            place: take(Field::Place),
            street: take(Field::Street),
            address_number: take(Field::AddressNumber),
            address_letter: take(Field::AddressLetter),
            address_entrance: take(Field::AddressEntrance),
            address_floor: take(Field::AddressFloor),
            address_apartment_number: take(Field::AddressApartmentNumber),
            address_date: take(Field::AddressDate),

            portrait,
        }
    }

    /// Given name, parent's given name and surname, as printed on the card.
    pub fn full_name(&self) -> String {
        [&self.given_name, &self.parent_given_name, &self.surname]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Street, number, letter, entrance, floor and apartment, followed by place and community.
    pub fn full_address(&self) -> String {
        let mut address = self.street.clone();

        if !self.address_number.is_empty() {
            address.push(' ');
            address.push_str(&self.address_number);
            address.push_str(&self.address_letter);
        }

        for (label, value) in [
            ("ulaz", &self.address_entrance),
            ("sprat", &self.address_floor),
            ("stan", &self.address_apartment_number),
        ] {
            if !value.is_empty() {
                address.push_str(&format!(", {label} {value}"));
            }
        }

        for part in [&self.place, &self.community] {
            if !part.is_empty() {
                if !address.is_empty() {
                    address.push_str(", ");
                }
                address.push_str(part);
            }
        }

        address
    }
}
