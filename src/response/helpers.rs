//! Code classification and text conversion for [`Response`].

use super::Response;
use std::str::FromStr;

/// Whether a numeric code denotes an error.
///
/// 400-599 are errors, as are the extended error numerics 723, 734,
/// 765-769 and 902-907.
#[inline]
pub fn is_error_code(code: u16) -> bool {
    (400..600).contains(&code)
        || code == 723
        || code == 734
        || (765..=769).contains(&code)
        || (902..=907).contains(&code)
}

impl Response {
    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is an error response
    #[inline]
    pub fn is_error(&self) -> bool {
        is_error_code(self.code())
    }

    /// Check if this is a success/informational response
    #[inline]
    pub fn is_success(&self) -> bool {
        !self.is_error()
    }

    /// Check if this is a connection registration response (001-099)
    #[inline]
    pub fn is_registration(&self) -> bool {
        self.code() < 100
    }

    /// Check if this is a command reply (200-399)
    #[inline]
    pub fn is_reply(&self) -> bool {
        (200..400).contains(&self.code())
    }

    /// Check if this reports contact presence (WATCH or MONITOR)
    #[inline]
    pub fn is_presence(&self) -> bool {
        matches!(
            self,
            Response::RPL_LOGON
                | Response::RPL_LOGOFF
                | Response::RPL_NOWON
                | Response::RPL_NOWOFF
                | Response::RPL_MONONLINE
                | Response::RPL_MONOFFLINE
                | Response::RPL_ISON
        )
    }
}

impl FromStr for Response {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u16 = s.parse().map_err(|_| ParseResponseError::InvalidFormat)?;
        Response::from_code(code).ok_or(ParseResponseError::UnknownCode(code))
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// Error when parsing a response code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseResponseError {
    #[error("invalid response code format")]
    InvalidFormat,
    #[error("unknown response code: {0}")]
    UnknownCode(u16),
}
