use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure of a survey fetch.
///
/// `Config` means the gateway cannot make the call at all (no usable
/// credential, client could not be built). `Upstream` covers everything that
/// went wrong talking to the survey API once the call was attempted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Error {
    Config(String),
    Upstream(String),
}

impl Error {
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Error::Config(g) => g,
            Error::Upstream(g) => g,
        };
        write!(f, "{}", text)
    }
}

impl std::error::Error for Error {}
