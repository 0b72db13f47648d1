//! Error type shared by every property round trip.

use thiserror::Error;
use x11rb::errors::{ConnectionError, ReplyError, ReplyOrIdError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The link to the X server is unusable. Never defaulted away.
    #[error("X server connection failed: {0}")]
    Connection(#[from] ConnectionError),

    /// The server answered with an X11 error (BadWindow, BadAtom, ...).
    #[error("X11 request failed: {0}")]
    Request(String),

    #[error("property {property} is malformed: {reason}")]
    Malformed {
        property: &'static str,
        reason: String,
    },

    #[error("_NET_ACTIVE_WINDOW is not set on the root window")]
    NoActiveWindow,
}

impl Error {
    /// Only a broken connection has to reach the window manager.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    pub(crate) fn malformed(property: &'static str, reason: impl Into<String>) -> Self {
        Error::Malformed {
            property,
            reason: reason.into(),
        }
    }
}

impl From<ReplyError> for Error {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::ConnectionError(e) => Error::Connection(e),
            ReplyError::X11Error(e) => Error::Request(format!(
                "{:?} (major {}, minor {})",
                e.error_kind, e.major_opcode, e.minor_opcode
            )),
        }
    }
}

impl From<ReplyOrIdError> for Error {
    fn from(err: ReplyOrIdError) -> Self {
        match err {
            ReplyOrIdError::IdsExhausted => Error::Request("X11 resource IDs exhausted".into()),
            ReplyOrIdError::ConnectionError(e) => Error::Connection(e),
            ReplyOrIdError::X11Error(e) => Error::Request(format!("{:?}", e.error_kind)),
        }
    }
}
