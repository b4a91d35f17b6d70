use std::fmt;

use crate::types::HvacMode;

#[derive(Debug)]
pub enum Error {
    NoSuchSystem(u8),
    NoSuchZone { system: u8, zone: u8 },
    InvalidMode(String),
    InvalidFanMode(String),
    UnsupportedInMode { mode: HvacMode, what: &'static str },
    Inconsistent(&'static str),
    Device(String),
    Stopped,
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoSuchSystem(id) => write!(f, "no such system: {id}"),
            Error::NoSuchZone { system, zone } => {
                write!(f, "no such zone: system {system} zone {zone}")
            }
            Error::InvalidMode(raw) => write!(f, "invalid hvac mode: {raw:?}"),
            Error::InvalidFanMode(raw) => write!(f, "invalid fan mode: {raw:?}"),
            Error::UnsupportedInMode { mode, what } => {
                write!(f, "cannot set {what} in hvac mode {mode}")
            }
            Error::Inconsistent(msg) => write!(f, "internal inconsistency: {msg}"),
            Error::Device(msg) => write!(f, "device error: {msg}"),
            Error::Stopped => write!(f, "coordinator is not running"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl Error {
    /// True for errors raised because a system or zone is missing from the snapshot.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Error::NoSuchSystem(_) | Error::NoSuchZone { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
