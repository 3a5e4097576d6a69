use std::fmt;

use thiserror::Error;

use crate::oracle::OracleError;

/// Which of the two oracle calls in a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleCall {
    Baseline,
    Alternative,
}

impl fmt::Display for OracleCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleCall::Baseline => write!(f, "baseline"),
            OracleCall::Alternative => write!(f, "alternative"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("crime store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("route oracle unavailable on {which} call: {source}")]
    OracleUnavailable {
        which: OracleCall,
        #[source]
        source: OracleError,
    },
    #[error("coordinate ({lat}, {lng}) outside plausible range")]
    InvalidCoordinate { lat: f64, lng: f64 },
    #[error("oracle returned a polyline with fewer than two points")]
    DegenerateRoute,
}

impl Error {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::OracleUnavailable {
                which: OracleCall::Alternative,
                ..
            }
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::StoreUnavailable(err.to_string())
    }
}
