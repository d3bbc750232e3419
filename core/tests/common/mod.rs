//! A simulated ID card answering SELECT and READ BINARY from an in-memory file system.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;

use celik::tlv::{self, FieldTable};
use celik::transport::{self, Transport};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

pub const APOLLO_ATR: [u8; 18] = [
    0x3B, 0xB9, 0x18, 0x00, 0x81, 0x31, 0xFE, 0x9E, 0x80, 0x73, 0xFF, 0x61, 0x40, 0x83, 0x00,
    0x00, 0x00, 0xDF,
];

pub const GEMALTO_ATR: [u8; 25] = [
    0x3B, 0xFF, 0x94, 0x00, 0x00, 0x81, 0x31, 0x80, 0x43, 0x80, 0x31, 0x80, 0x65, 0xB0, 0x85,
    0x02, 0x01, 0xF3, 0x12, 0x0F, 0xFF, 0x82, 0x90, 0x00, 0x79,
];

pub const GEMALTO_AID: [u8; 11] = [
    0xF3, 0x81, 0x00, 0x00, 0x02, 0x53, 0x45, 0x52, 0x49, 0x44, 0x01,
];

pub const EF_DOCUMENT: [u8; 2] = [0x0F, 0x02];
pub const EF_PERSONAL: [u8; 2] = [0x0F, 0x03];
pub const EF_RESIDENCE: [u8; 2] = [0x0F, 0x04];
pub const EF_PHOTO: [u8; 2] = [0x0F, 0x06];

const SW_OK: [u8; 2] = [0x90, 0x00];
const SW_NOT_FOUND: [u8; 2] = [0x6A, 0x82];
const SW_WRONG_PARAMS: [u8; 2] = [0x6B, 0x00];
const SW_INS_NOT_SUPPORTED: [u8; 2] = [0x6D, 0x00];

pub struct SimulatedCard {
    atr: Vec<u8>,
    aid: Option<Vec<u8>>,
    files: HashMap<[u8; 2], Vec<u8>>,
    /// Most octets a single READ BINARY returns, whatever Le asks for.
    max_chunk: usize,
    application_selected: RefCell<bool>,
    selected: RefCell<Option<[u8; 2]>>,
    commands: RefCell<Vec<Vec<u8>>>,
}

impl SimulatedCard {
    pub fn new(atr: &[u8]) -> Self {
        Self {
            atr: atr.to_vec(),
            aid: None,
            files: HashMap::new(),
            max_chunk: 0xFF,
            application_selected: RefCell::new(false),
            selected: RefCell::new(None),
            commands: RefCell::new(Vec::new()),
        }
    }

    pub fn apollo() -> Self {
        Self::new(&APOLLO_ATR)
    }

    pub fn gemalto() -> Self {
        Self::new(&GEMALTO_ATR).with_application(&GEMALTO_AID)
    }

    /// Files can only be selected once the application has been.
    pub fn with_application(mut self, aid: &[u8]) -> Self {
        self.aid = Some(aid.to_vec());
        self
    }

    pub fn with_max_chunk(mut self, max_chunk: usize) -> Self {
        self.max_chunk = max_chunk;
        self
    }

    /// Stores an EF made of the 6-octet header followed by the content.
    pub fn with_file(mut self, id: [u8; 2], content: &[u8]) -> Self {
        let mut ef = vec![0x00, 0x00, 0x00, 0x00];
        ef.extend_from_slice(&(content.len() as u16).to_le_bytes());
        ef.extend_from_slice(content);

        self.files.insert(id, ef);
        self
    }

    /// Stores an EF whose content starts with four padding octets.
    pub fn with_padded_file(self, id: [u8; 2], content: &[u8]) -> Self {
        let mut padded = vec![0xDE, 0xAD, 0xBE, 0xEF];
        padded.extend_from_slice(content);

        self.with_file(id, &padded)
    }

    /// Stores an EF with raw octets, header included.
    pub fn with_raw_file(mut self, id: [u8; 2], ef: Vec<u8>) -> Self {
        self.files.insert(id, ef);
        self
    }

    pub fn commands(&self) -> Vec<Vec<u8>> {
        self.commands.borrow().clone()
    }

    /// READ BINARY commands sent so far, header reads included.
    pub fn read_commands(&self) -> Vec<Vec<u8>> {
        self.commands()
            .into_iter()
            .filter(|c| c[1] == 0xB0)
            .collect()
    }

    fn respond(&self, command: &[u8]) -> Vec<u8> {
        match (command[1], command[2]) {
            (0xA4, 0x04) => {
                let aid = &command[5..5 + command[4] as usize];
                match self.aid.as_deref() == Some(aid) {
                    true => {
                        *self.application_selected.borrow_mut() = true;
                        SW_OK.to_vec()
                    }
                    _ => SW_NOT_FOUND.to_vec(),
                }
            }
            (0xA4, 0x08) => {
                let id = [command[5], command[6]];
                let reachable = self.aid.is_none() || *self.application_selected.borrow();
                match reachable && self.files.contains_key(&id) {
                    true => {
                        *self.selected.borrow_mut() = Some(id);
                        SW_OK.to_vec()
                    }
                    _ => SW_NOT_FOUND.to_vec(),
                }
            }
            (0xB0, _) => {
                let Some(ef) = self.selected.borrow().and_then(|id| self.files.get(&id)) else {
                    return SW_NOT_FOUND.to_vec();
                };

                let offset = u16::from_be_bytes([command[2], command[3]]) as usize;
                let le = match command[4] {
                    0 => 0x100,
                    n => n as usize,
                };

                if offset > ef.len() {
                    return SW_WRONG_PARAMS.to_vec();
                }

                let end = ef.len().min(offset + le.min(self.max_chunk));
                let mut rx = ef[offset..end].to_vec();
                rx.extend_from_slice(&SW_OK);
                rx
            }
            _ => SW_INS_NOT_SUPPORTED.to_vec(),
        }
    }
}

impl Transport for SimulatedCard {
    fn transmit(&self, command: &[u8]) -> Result<Vec<u8>, transport::Error> {
        self.commands.borrow_mut().push(command.to_vec());

        if command.len() < 5 {
            return Err(transport::Error::new("command too short"));
        }

        Ok(self.respond(command))
    }

    fn atr(&self) -> &[u8] {
        &self.atr
    }
}

pub fn encode_fields(pairs: &[(u16, &str)]) -> Vec<u8> {
    let table: FieldTable = pairs
        .iter()
        .map(|(tag, value)| (*tag, value.as_bytes().to_vec()))
        .collect();

    tlv::encode(&table)
}

pub fn portrait() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(3, 2, |x, y| {
        Rgb([(x * 80) as u8, (y * 120) as u8, 200])
    }))
}

pub fn portrait_png() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    portrait().write_to(&mut buf, ImageFormat::Png).unwrap();

    buf.into_inner()
}
