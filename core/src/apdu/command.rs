use crate::apdu;
use crate::apdu::ins;

const SELECT_P1_DF_NAME: u8 = 0x04;
const SELECT_P1_PATH: u8 = 0x08;
const SELECT_P2: u8 = 0x00;

/// Largest `Nc` / `Ne` that still fits the short length encoding.
const SHORT_NC_MAX: usize = 0xFF;
const SHORT_NE_MAX: usize = 0x100;

/// An APDU command to be transmitted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    data: Vec<u8>,
    ne: usize,
}

impl Command {
    /// Constructs a command with CLA, INS, P1, and P2.
    /// No payloads will be transmitted or received.
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Vec::new(),
            ne: 0,
        }
    }

    /// Sets the payload to be transmitted.
    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    /// Sets the maximum number of octets expected in the response (up to 65536).
    pub fn with_ne(mut self, ne: usize) -> Self {
        self.ne = ne;
        self
    }

    /// Constructs a `SELECT FILE` command addressing an EF by its identifier.
    pub fn select_file(id: [u8; 2], ne: usize) -> Self {
        Self::new(apdu::CLA_DEFAULT, ins::SELECT_FILE, SELECT_P1_PATH, SELECT_P2)
            .with_data(id)
            .with_ne(ne)
    }

    /// Constructs a `SELECT FILE` command addressing an application by its name.
    pub fn select_application(aid: &[u8]) -> Self {
        Self::new(
            apdu::CLA_DEFAULT,
            ins::SELECT_FILE,
            SELECT_P1_DF_NAME,
            SELECT_P2,
        )
        .with_data(aid)
    }

    /// Constructs a `READ BINARY` command reading the selected EF from `offset`.
    /// Only offsets up to `0x7FFF` are read as such; a set bit 8 in P1 means short EF addressing.
    pub fn read_binary(offset: u16, ne: usize) -> Self {
        let [p1, p2] = offset.to_be_bytes();

        Self::new(apdu::CLA_DEFAULT, ins::READ_BINARY, p1, p2).with_ne(ne)
    }

    /// Converts the command into octets.
    pub fn into_bytes(self) -> Vec<u8> {
        let Self {
            cla,
            ins,
            p1,
            p2,
            data,
            ne,
        } = self;

        let mut buffer: Vec<u8> = Vec::with_capacity(4 + 3 + data.len() + 3);
        buffer.extend_from_slice(&[cla, ins, p1, p2]);

        let extended = data.len() > SHORT_NC_MAX || ne > SHORT_NE_MAX;

        if !data.is_empty() {
            if extended {
                buffer.push(0x00);
                buffer.extend_from_slice(&(data.len() as u16).to_be_bytes());
            } else {
                buffer.push(data.len() as u8);
            }

            buffer.extend_from_slice(&data);
        }

        if ne > 0 {
            if extended {
                // The leading zero is shared with Lc when a payload is present.
                if data.is_empty() {
                    buffer.push(0x00);
                }

                // 65536 wraps to 00 00.
                buffer.extend_from_slice(&(ne as u16).to_be_bytes());
            } else {
                // 256 wraps to 00.
                buffer.push(ne as u8);
            }
        }

        buffer
    }
}

impl From<Command> for Vec<u8> {
    fn from(command: Command) -> Self {
        command.into_bytes()
    }
}
