/// The status word returned by the card did not indicate success.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("The card returned an error ({sw1:#04X}, {sw2:#04X}).")]
pub struct StatusError {
    pub sw1: u8,
    pub sw2: u8,
}

impl From<(u8, u8)> for StatusError {
    fn from((sw1, sw2): (u8, u8)) -> Self {
        StatusError { sw1, sw2 }
    }
}

/// A response that was received from the card
#[derive(Debug, Default)]
pub struct Response {
    payload: Vec<u8>,
    trailer: (u8, u8),
}

impl Response {
    /// Parses a response from the octets.
    /// A response too short to carry a status word gets `00 00`, which is not a success.
    pub fn from_bytes(mut bytes: Vec<u8>) -> Self {
        if bytes.len() < 2 {
            return Self::default();
        }

        let sw2 = bytes.pop().unwrap_or_default();
        let sw1 = bytes.pop().unwrap_or_default();

        Self {
            payload: bytes,
            trailer: (sw1, sw2),
        }
    }

    /// Determines whether the response indicates success or not.
    pub fn is_ok(&self) -> bool {
        matches!(self.trailer, (0x90, 0x00))
    }

    /// Status word as SW1 and SW2.
    pub fn trailer(&self) -> (u8, u8) {
        self.trailer
    }

    /// Converts the response to a result of octets.
    pub fn into_result(self) -> Result<Vec<u8>, StatusError> {
        let is_ok = self.is_ok();
        let Self { payload, trailer } = self;

        match is_ok {
            true => Ok(payload),
            _ => Err(trailer.into()),
        }
    }
}

impl From<Vec<u8>> for Response {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}
