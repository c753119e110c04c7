//! Error types for the orchestrator
//!
//! This module defines the error reported by subsystem drivers ([`DriverError`]),
//! errors of the orchestration protocols ([`Error`]) and configuration
//! errors ([`BuilderError`]).
//!
//! ## Error Types
//!
//! - [`DriverError`] - A status reported by a controller, HV or NVM driver
//! - [`Error`] - Failures of `init`, `update`, `clear_init` and friends
//! - [`BuilderError`] - Errors during orchestrator construction
//!
//! ## Example
//!
//! ```
//! use pl_epdc::{Builder, BuilderError};
//!
//! // Controller is mandatory
//! let result = Builder::new().default_vcom(4500).build();
//! assert!(matches!(result, Err(BuilderError::MissingController)));
//! ```

use std::path::PathBuf;

use crate::nvm::NvmFormat;
use crate::sequence::SequenceReport;

/// Result type returned by driver capabilities
pub type DriverResult<T = ()> = core::result::Result<T, DriverError>;

/// Status reported by a subsystem driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverError {
    /// Driver-specific non-zero status code
    Status(i32),
    /// The hardware did not respond in time
    Timeout,
    /// Bus or GPIO communication failed
    Bus,
    /// The driver does not implement the requested capability
    Unsupported,
}

impl core::fmt::Display for DriverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "driver reported status {code}"),
            Self::Timeout => write!(f, "driver timed out"),
            Self::Bus => write!(f, "bus error"),
            Self::Unsupported => write!(f, "capability not supported by driver"),
        }
    }
}

impl core::error::Error for DriverError {}

/// Step of the initialization protocol that reported a driver failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStep {
    /// Controller-specific initialization
    ControllerInit,
    /// HV subsystem initialization
    HvInit,
    /// Waveform library load
    LoadWaveform,
    /// VCOM configuration
    ApplyVcom,
    /// Temperature resample
    UpdateTemp,
    /// Raw NVM content read
    ReadNvm,
    /// NVM header parse
    ReadHeader,
}

impl InitStep {
    /// Short human readable name of the step
    pub const fn name(self) -> &'static str {
        match self {
            Self::ControllerInit => "controller init",
            Self::HvInit => "hv init",
            Self::LoadWaveform => "waveform load",
            Self::ApplyVcom => "vcom apply",
            Self::UpdateTemp => "temperature update",
            Self::ReadNvm => "nvm read",
            Self::ReadHeader => "nvm header read",
        }
    }
}

/// Errors reported by the orchestration protocols
#[derive(Debug)]
pub enum Error {
    /// NVM loading was requested but no NVM is attached
    MissingNvm,
    /// No VCOM configuration capability on the HV subsystem
    MissingVcomConfig,
    /// The NVM format does not support waveform loading
    UnsupportedNvmFormat(NvmFormat),
    /// The NVM returned no content
    EmptyNvmContent,
    /// Raw update mode does not decode to a valid base mode
    InvalidUpdateMode(u8),
    /// A driver failed during initialization
    Init {
        /// Failing step
        step: InitStep,
        /// Driver status
        source: DriverError,
    },
    /// Programming the VCOM level failed
    Vcom {
        /// Driver status
        source: DriverError,
    },
    /// A register or command access failed
    Register {
        /// Register or command address
        addr: u16,
        /// Driver status
        source: DriverError,
    },
    /// Creating, reading or writing a staged file failed
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// Not all bytes of a blob were written
    ShortWrite {
        /// File involved
        path: PathBuf,
        /// Blob size in bytes
        expected: usize,
        /// Bytes reported as written
        written: usize,
    },
    /// The VCOM file produced by the unpacker is empty
    VcomFileEmpty(PathBuf),
    /// The VCOM file does not start with an integer
    VcomFileInvalid(PathBuf),
    /// The external NVM unpacker exited unsuccessfully
    ///
    /// `status` is `None` when the process was terminated by a signal.
    UnpackFailed {
        /// Exit status of the unpacker
        status: Option<i32>,
    },
    /// The unpacker cannot write an output to the configured path
    UnpackerPathMismatch {
        /// Path configured in [`NvmPaths`](crate::staging::NvmPaths)
        configured: PathBuf,
        /// Path the unpacker writes
        produced: PathBuf,
    },
    /// One or more steps of a best-effort sequence failed
    Sequence(SequenceReport),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingNvm => write!(f, "no nvm defined in the EPDC"),
            Self::MissingVcomConfig => {
                write!(f, "no vcom configuration hardware defined in the EPDC")
            }
            Self::UnsupportedNvmFormat(format) => {
                write!(f, "nvm format {format} does not support waveform loading")
            }
            Self::EmptyNvmContent => write!(f, "nvm content is empty"),
            Self::InvalidUpdateMode(raw) => write!(f, "invalid update mode: {raw}"),
            Self::Init { step, source } => write!(f, "{} failed: {source}", step.name()),
            Self::Vcom { source } => write!(f, "vcom apply failed: {source}"),
            Self::Register { addr, source } => {
                write!(f, "register access 0x{addr:04x} failed: {source}")
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::ShortWrite {
                path,
                expected,
                written,
            } => write!(
                f,
                "{}: wrote {written} of {expected} bytes",
                path.display()
            ),
            Self::VcomFileEmpty(path) => write!(f, "vcom file {} is empty", path.display()),
            Self::VcomFileInvalid(path) => {
                write!(f, "vcom file {} holds no integer", path.display())
            }
            Self::UnpackFailed { status: Some(code) } => {
                write!(f, "nvm unpacker exited with status {code}")
            }
            Self::UnpackFailed { status: None } => write!(f, "nvm unpacker was terminated"),
            Self::UnpackerPathMismatch {
                configured,
                produced,
            } => write!(
                f,
                "unpacker writes {} but {} is configured",
                produced.display(),
                configured.display()
            ),
            Self::Sequence(report) => write!(f, "{report}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Init { source, .. }
            | Self::Vcom { source }
            | Self::Register { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors that can occur when building the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderError {
    /// [`Builder::controller()`](crate::config::Builder::controller) was not called
    MissingController,
    /// [`Builder::hv()`](crate::config::Builder::hv) was not called
    MissingHv,
    /// [`Builder::default_vcom()`](crate::config::Builder::default_vcom) was not called
    MissingDefaultVcom,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingController => write!(f, "A controller must be specified"),
            Self::MissingHv => write!(f, "An HV subsystem must be specified"),
            Self::MissingDefaultVcom => write!(f, "A default VCOM must be specified"),
        }
    }
}

impl core::error::Error for BuilderError {}
