use crate::apdu::{Command, Response, StatusError};
use crate::trace::{debug, trace};
use crate::transport::{self, Transport};

/// Expected response length of `SELECT FILE`.
const SELECT_NE: usize = 4;

/// Every EF starts with a header of this size; octets 4..6 hold the content length.
const HEADER_LEN: usize = 6;

/// Leading octets some files store before their content.
const TRIM_LEN: usize = 4;

/// Largest chunk requested by a single `READ BINARY`.
const READ_NE_MAX: usize = 0xFF;

/// Largest offset `READ BINARY` can address; bit 8 of P1 selects an SFI instead.
const OFFSET_MAX: usize = 0x7FFF;

/// A single command/response exchange failed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error occurred while communicating with the card: {0}")]
    Transport(#[from] transport::Error),

    #[error("{0}")]
    Status(#[from] StatusError),
}

/// Reading an EF failed; the variant tells which step.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("selecting file: {0}")]
    Select(#[source] Error),

    #[error("reading file header: {0}")]
    Header(#[source] Error),

    #[error("file header too short ({0} octets)")]
    HeaderTooShort(usize),

    #[error("file of {0} octets is too short to skip the leading padding")]
    TooShortToTrim(usize),

    #[error("reading file at offset {offset}: {source}")]
    Fragment {
        offset: usize,
        #[source]
        source: Error,
    },

    #[error("card returned no data at offset {0}")]
    EmptyFragment(usize),

    #[error("offset {0} cannot be addressed by READ BINARY")]
    OffsetOutOfRange(usize),
}

/// An adapter to communicate with the card through the delegate
pub struct Card<T>
where
    T: Transport,
{
    delegate: T,
}

impl<T> Card<T>
where
    T: Transport,
{
    /// Initiates an adapter with the delegate.
    pub fn new(delegate: T) -> Self {
        Self { delegate }
    }

    /// Answer-To-Reset of the card in the session.
    pub fn atr(&self) -> &[u8] {
        self.delegate.atr()
    }

    /// Gives the delegate back, ending the session.
    pub fn into_inner(self) -> T {
        self.delegate
    }

    /// Selects an application with their name.
    pub fn select_application(&self, aid: &[u8]) -> Result<(), Error> {
        debug!("Selecting application {}", hex::encode_upper(aid));

        self.handle(Command::select_application(aid)).map(|_| ())
    }

    /// Selects an EF with their identifier.
    pub fn select_file(&self, id: [u8; 2]) -> Result<Vec<u8>, Error> {
        debug!("Selecting file {}", hex::encode_upper(id));

        self.handle(Command::select_file(id, SELECT_NE))
    }

    /// Reads binary from the selected file at `offset` for `len` octets max.
    /// The card may return fewer octets than requested.
    pub fn read_binary(&self, offset: u16, len: usize) -> Result<Vec<u8>, Error> {
        self.handle(Command::read_binary(offset, len))
    }

    /// Selects an EF, then reads their whole content.
    ///
    /// The content length is taken from the EF header. With `trim`, the first
    /// four octets of the content are skipped.
    pub fn read_file(&self, id: [u8; 2], trim: bool) -> Result<Vec<u8>, ReadError> {
        self.select_file(id).map_err(ReadError::Select)?;

        let header = self.read_binary(0, HEADER_LEN).map_err(ReadError::Header)?;
        if header.len() < HEADER_LEN {
            return Err(ReadError::HeaderTooShort(header.len()));
        }

        let mut length = u16::from_le_bytes([header[4], header[5]]) as usize;
        let mut offset = HEADER_LEN;

        if trim {
            length = length
                .checked_sub(TRIM_LEN)
                .ok_or(ReadError::TooShortToTrim(length))?;
            offset += TRIM_LEN;
        }

        debug!("File {} holds {} octets", hex::encode_upper(id), length);

        let mut buf: Vec<u8> = Vec::with_capacity(length);

        while length > 0 {
            if offset > OFFSET_MAX {
                return Err(ReadError::OffsetOutOfRange(offset));
            }

            let mut fragment = self
                .read_binary(offset as u16, length.min(READ_NE_MAX))
                .map_err(|source| ReadError::Fragment { offset, source })?;

            if fragment.is_empty() {
                return Err(ReadError::EmptyFragment(offset));
            }

            fragment.truncate(length);

            let received = fragment.len();
            trace!("Read {} octets at offset {}", received, offset);

            buf.append(&mut fragment);
            offset += received;
            length -= received;
        }

        Ok(buf)
    }

    fn handle(&self, command: Command) -> Result<Vec<u8>, Error> {
        let rx = self.delegate.transmit(&command.into_bytes())?;

        Ok(Response::from(rx).into_result()?)
    }
}
