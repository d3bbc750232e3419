//! APDU commands sent to the card and responses received from them.

mod command;
mod response;

pub use command::Command;
pub use response::{Response, StatusError};

pub const CLA_DEFAULT: u8 = 0x00;

pub(crate) mod ins {
    pub const SELECT_FILE: u8 = 0xA4;
    pub const READ_BINARY: u8 = 0xB0;
}
