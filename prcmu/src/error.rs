/*++

Licensed under the Apache-2.0 license.

File Name:

    error.rs

Abstract:

    Error types returned by the PRCMU driver.

--*/

use crate::dump::DiagnosticDump;

#[derive(Debug)]
pub enum Error {
    /// The requested value is outside what the firmware protocol can encode.
    InvalidArgument,
    /// A reference-counted request was released more times than requested.
    Unbalanced,
    /// A shared resource is already configured incompatibly.
    Busy,
    /// The DSI PLL did not report lock within the allowed time.
    PllNotLocked,
    /// The firmware-mediated I2C transfer was not acknowledged.
    I2c { status: u8 },
    /// The firmware acknowledgment does not match the request, or no
    /// acknowledgment arrived in time. There is no recovery procedure once
    /// host and firmware state may have diverged; the embedder decides
    /// whether to halt. The dump snapshots the mailbox state at detection.
    ProtocolDesync(Box<DiagnosticDump>),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "invalid argument"),
            Error::Unbalanced => write!(f, "unbalanced release of a counted request"),
            Error::Busy => write!(f, "resource already configured incompatibly"),
            Error::PllNotLocked => write!(f, "DSI PLL failed to lock"),
            Error::I2c { status } => {
                write!(f, "ABB I2C transfer failed (status 0x{status:02x})")
            }
            Error::ProtocolDesync(dump) => {
                write!(f, "firmware protocol desync: {dump}")
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
