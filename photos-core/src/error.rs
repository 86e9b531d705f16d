use std::{error, fmt, io};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The server answered with a non-success status.
    HttpError { status: u16 },
    /// The request never produced a response.
    NetworkError(String),
    /// The response body did not have the expected shape.
    DecodeError(String),
    ConfigError(String),
}

impl Error {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpError { status } => write!(f, "HTTP error, status: {status}"),
            Self::NetworkError(err) => write!(f, "Network error: {err}"),
            Self::DecodeError(err) => write!(f, "Unexpected response: {err}"),
            Self::ConfigError(err) => write!(f, "Invalid config: {err}"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::NetworkError(err.to_string())
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Error {
        match err {
            ureq::Error::StatusCode(status) => Error::HttpError { status },
            ureq::Error::Io(err) => err.into(),
            err => Error::NetworkError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::DecodeError(err.to_string())
    }
}
