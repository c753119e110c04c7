//! Staging of NVM artifacts on the filesystem
//!
//! Loading waveform and VCOM data from the display NVM goes through files:
//! the controller loads waveform libraries from a path, and the `S040` format
//! is split by an external unpacker that reads a dump file and writes a VCOM
//! file plus a waveform file.
//!
//! [`NvmPaths`] names those files. The defaults are the paths the unpacker
//! expects; [`NvmPaths::in_dir`] moves them into a per-instance directory.
//!
//! [`StagedFile`] owns one artifact and removes it when dropped, so every exit
//! path of the loading protocol cleans up after itself unless the file is
//! explicitly persisted.

use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::Error;

/// Program used by [`ScriptUnpacker::default`]
pub const DEFAULT_UNPACK_SCRIPT: &str = "/home/root/scripts/extract_display_nvm_content.py";

const S040_DUMP: &str = "dummy.nvm";
const S040_VCOM: &str = "vcom_from_display_nvm";
const S040_WAVEFORM: &str = "waveform_from_display_nvm.bin";
const EPSON_WAVEFORM: &str = "dummy.generic.wbf";
const PLAIN_DUMP: &str = "dummy.plain.bin";

/// Paths of the files used while loading NVM content
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NvmPaths {
    /// Raw dump handed to the unpacker (`S040`)
    pub s040_dump: PathBuf,
    /// VCOM value written by the unpacker (`S040`)
    pub s040_vcom: PathBuf,
    /// Waveform library written by the unpacker (`S040`)
    pub s040_waveform: PathBuf,
    /// Waveform library copied verbatim from NVM (`EPSON`)
    pub epson_waveform: PathBuf,
    /// Verbatim dump (`PLAIN`)
    pub plain_dump: PathBuf,
}

impl Default for NvmPaths {
    fn default() -> Self {
        Self::in_dir("/tmp")
    }
}

impl NvmPaths {
    /// Use the standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            s040_dump: dir.join(S040_DUMP),
            s040_vcom: dir.join(S040_VCOM),
            s040_waveform: dir.join(S040_WAVEFORM),
            epson_waveform: dir.join(EPSON_WAVEFORM),
            plain_dump: dir.join(PLAIN_DUMP),
        }
    }
}

/// Write `data` and return the number of bytes the writer accepted
///
/// Stops early when the writer accepts no more bytes, so the count can be
/// less than `data.len()`.
pub fn write_blob<W: Write>(writer: &mut W, data: &[u8]) -> std::io::Result<usize> {
    let mut written = 0;
    while written < data.len() {
        match writer.write(&data[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    writer.flush()?;
    Ok(written)
}

/// A staged artifact, removed from disk on drop unless persisted
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    retain: bool,
}

impl StagedFile {
    /// Create (or truncate) `path` and write `data` to it
    pub fn create(path: impl Into<PathBuf>, data: &[u8]) -> Result<Self, Error> {
        let path = path.into();
        let mut file = File::create(&path).map_err(|source| {
            log::error!("error creating binary file {}", path.display());
            Error::Io {
                path: path.clone(),
                source,
            }
        })?;
        Self::write_into(path, &mut file, data)
    }

    /// Write `data` through `writer` into the already created file at `path`
    ///
    /// The file is removed again if the write fails or comes up short.
    fn write_into<W: Write>(path: PathBuf, writer: &mut W, data: &[u8]) -> Result<Self, Error> {
        let staged = Self::adopt(path);

        let written = write_blob(writer, data).map_err(|source| Error::Io {
            path: staged.path.clone(),
            source,
        })?;
        if written != data.len() {
            log::error!("error during binary file write: {}", staged.path.display());
            return Err(Error::ShortWrite {
                path: staged.path.clone(),
                expected: data.len(),
                written,
            });
        }

        log::debug!("staged {} bytes to {}", written, staged.path.display());
        Ok(staged)
    }

    /// Take ownership of a file produced by someone else
    pub fn adopt(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retain: false,
        }
    }

    /// Path of the artifact
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file on disk and return its path
    pub fn persist(mut self) -> PathBuf {
        self.retain = true;
        core::mem::take(&mut self.path)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.retain {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("removed {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::warn!("could not remove {}: {}", self.path.display(), e),
        }
    }
}

/// Read the VCOM value (millivolts) from the start of a text file
pub fn read_vcom_file(path: &Path) -> Result<i32, Error> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        log::error!("given vcom-file ({}) not found", path.display());
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let Some(token) = contents.split_whitespace().next() else {
        log::error!("vcom file ({}) seems to be empty", path.display());
        return Err(Error::VcomFileEmpty(path.to_path_buf()));
    };

    leading_int(token).ok_or_else(|| Error::VcomFileInvalid(path.to_path_buf()))
}

/// Parse an optionally signed integer prefix of `token`
fn leading_int(token: &str) -> Option<i32> {
    let digits_start = usize::from(token.starts_with(['+', '-']));
    let digits_len = token[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    token[..digits_start + digits_len].parse().ok()
}

/// Splits a packed `S040` dump into VCOM and waveform files
pub trait Unpacker {
    /// Unpack `paths.s040_dump`
    ///
    /// On success `paths.s040_vcom` and `paths.s040_waveform` exist.
    fn unpack(&mut self, paths: &NvmPaths) -> Result<(), Error>;
}

/// Runs an external program with the dump path as its only argument
///
/// The program decides where its outputs go. [`ScriptUnpacker::outputs`]
/// declares those paths (the legacy `/tmp` ones by default) and `unpack`
/// refuses to run when [`NvmPaths`] expects the outputs elsewhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptUnpacker {
    program: PathBuf,
    vcom_output: PathBuf,
    waveform_output: PathBuf,
}

impl ScriptUnpacker {
    /// Use `program` as the unpacker
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let legacy = NvmPaths::default();
        Self {
            program: program.into(),
            vcom_output: legacy.s040_vcom,
            waveform_output: legacy.s040_waveform,
        }
    }

    /// Declare where the program writes the VCOM and waveform files
    #[must_use]
    pub fn outputs(mut self, vcom: impl Into<PathBuf>, waveform: impl Into<PathBuf>) -> Self {
        self.vcom_output = vcom.into();
        self.waveform_output = waveform.into();
        self
    }

    /// Program invoked by [`Unpacker::unpack`]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn check_output(configured: &Path, produced: &Path) -> Result<(), Error> {
        if configured == produced {
            return Ok(());
        }
        log::error!(
            "unpacker writes {} but {} is configured",
            produced.display(),
            configured.display()
        );
        Err(Error::UnpackerPathMismatch {
            configured: configured.to_path_buf(),
            produced: produced.to_path_buf(),
        })
    }
}

impl Default for ScriptUnpacker {
    fn default() -> Self {
        Self::new(DEFAULT_UNPACK_SCRIPT)
    }
}

impl Unpacker for ScriptUnpacker {
    fn unpack(&mut self, paths: &NvmPaths) -> Result<(), Error> {
        Self::check_output(&paths.s040_vcom, &self.vcom_output)?;
        Self::check_output(&paths.s040_waveform, &self.waveform_output)?;

        log::info!(
            "unpacking {} with {}",
            paths.s040_dump.display(),
            self.program.display()
        );
        let status = Command::new(&self.program)
            .arg(&paths.s040_dump)
            .status()
            .map_err(|source| Error::Io {
                path: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            log::error!("nvm unpacker failed: {}", status);
            Err(Error::UnpackFailed {
                status: status.code(),
            })
        }
    }
}
