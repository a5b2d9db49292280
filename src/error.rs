//! This module provides an `Error` type for the crate using the [`thiserror`] crate, and a
//! [`Status`] code type mirroring the numeric ABI described by the embedding API.
use thiserror::Error;

/// The `Error` type.
#[derive(Debug, Error)]
pub enum Error {
    /// The given handle does not refer to a live VM instance.
    #[error("invalid VM handle")]
    InvalidHandle,
    /// An argument was out of range or otherwise malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A memory or register-file allocation could not be satisfied.
    #[error("out of memory")]
    OutOfMemory,
    /// The instance registry has no free slots (capacity 256).
    #[error("VM registry is full")]
    RegistryFull,
    /// Too many breakpoints are already set on this instance (capacity 64).
    #[error("breakpoint limit reached")]
    BreakpointLimitReached,
    /// `clear_breakpoint` was called for an address with no breakpoint set.
    #[error("no breakpoint set at that address")]
    BreakpointNotFound,
    /// Wraps [`std::io::Error`] for host tooling that loads programs from disk.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The stable numeric status codes from the embedding API, matching the closed set the original
/// C core returns. Negative values are errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum Status {
    /// The call completed normally.
    Ok = 0,
    /// An unspecified failure occurred.
    Error = -1,
    /// Allocation failed.
    ENoMem = -2,
    /// An argument was invalid.
    EInval = -3,
    /// The library or instance was not initialized.
    EInit = -4,
}

impl From<&Error> for Status {
    fn from(error: &Error) -> Self {
        match error {
            Error::InvalidHandle => Status::EInval,
            Error::InvalidArgument(_) => Status::EInval,
            Error::OutOfMemory => Status::ENoMem,
            Error::RegistryFull => Status::Error,
            Error::BreakpointLimitReached => Status::EInval,
            Error::BreakpointNotFound => Status::Error,
            Error::Io(_) => Status::Error,
        }
    }
}

impl From<Error> for Status {
    fn from(error: Error) -> Self {
        Status::from(&error)
    }
}

/// Collapses a `Result<(), Error>` into the numeric status an embedder expects, for the `api`
/// module's C-ABI-flavored surface.
pub fn status_of<T>(result: &Result<T, Error>) -> Status {
    match result {
        Ok(_) => Status::Ok,
        Err(error) => Status::from(error),
    }
}
