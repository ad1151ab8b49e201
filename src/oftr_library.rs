//! Raw API binding for the `oftr_call` entry point of an oftr shared library
//!
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::ptr;

use dlopen2::wrapper::Container;
use dlopen2::wrapper::WrapperApi;

use crate::error::{ProbeError, Result};

pub const OFTR_CALL_SYMBOL: &str = "oftr_call";

/// Capacity of the output buffer handed to the version call.
pub const VERSION_BUFFER_LEN: usize = 1024;

/// Largest input or output length `oftr_call` accepts.
pub const MAX_SUPPORTED_LEN: usize = 1073741823;

/// Selects the operation performed by `oftr_call`.
///
/// The least significant byte is the operation; the remaining bits carry flags
/// or, for encoding, the OpenFlow version in the top byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Opcode(pub u32);

impl Opcode {
    pub const VERSION: Opcode = Opcode(0);
    pub const DECODE: Opcode = Opcode(2);
    const ENCODE: u32 = 1;

    pub fn encode(of_version: u8) -> Self {
        Opcode(((of_version as u32) << 24) | Self::ENCODE)
    }

    pub fn operation(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

#[derive(dlopen2_derive::WrapperApi)]
pub struct OftrBindings {
    oftr_call: unsafe extern "C" fn(opcode: u32, input: *const c_char, input_len: usize, output: *mut c_char, output_len: usize) -> i32,
}

/// Meaning of a value returned by `oftr_call`, relative to the output capacity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    /// Number of bytes written to the output buffer
    Written(usize),
    InvalidArguments,
    InternalError,
    /// An error message of this many bytes sits in the output buffer
    Failed(usize),
    /// The output buffer must hold at least this many bytes
    TooSmall(usize),
}

impl CallOutcome {
    pub fn from_result(result: i32, capacity: usize) -> Self {
        match result {
            -1 => CallOutcome::InvalidArguments,
            -2 => CallOutcome::InternalError,
            r if r >= 0 => {
                let len = r as usize;
                if len <= capacity {
                    CallOutcome::Written(len)
                } else {
                    CallOutcome::InternalError
                }
            }
            r => {
                let len = r.unsigned_abs() as usize;
                if len <= capacity {
                    CallOutcome::Failed(len)
                } else {
                    CallOutcome::TooSmall(len)
                }
            }
        }
    }
}

pub struct OftrLibrary {
    api: Container<OftrBindings>,
    path: PathBuf,
}

impl OftrLibrary {

    /// Opens the library at `path` and binds `oftr_call`.
    ///
    /// The path is canonicalized first, so the dynamic loader never consults its search path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let lib = path.canonicalize()
            .map_err(|e| ProbeError::OpenLibrary { path: path.to_path_buf(), reason: e.to_string() })?;
        log::debug!("Loading library: '{}'", lib.display());
        let api: Container<OftrBindings> = unsafe { Container::load(&lib) }
            .map_err(|e| match e {
                dlopen2::Error::OpeningLibraryError(e) => ProbeError::OpenLibrary { path: lib.clone(), reason: loader_reason(&lib, &e) },
                dlopen2::Error::SymbolGettingError(_) | dlopen2::Error::NullSymbol => {
                    ProbeError::MissingSymbol { symbol: OFTR_CALL_SYMBOL, path: lib.clone() }
                }
                other => ProbeError::from(other),
            })?;
        log::trace!("Resolved {OFTR_CALL_SYMBOL} in '{}'", lib.display());
        Ok(Self { api, path: lib })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Performs exactly one foreign call; `output` is owned by the caller and filled in place.
    pub fn call_raw(&self, opcode: Opcode, input: &[u8], output: &mut [u8]) -> i32 {
        let input_ptr = if input.is_empty() { ptr::null() } else { input.as_ptr() as *const c_char };
        let output_ptr = if output.is_empty() { ptr::null_mut() } else { output.as_mut_ptr() as *mut c_char };
        log::trace!("calling {OFTR_CALL_SYMBOL}(opcode=0x{:08x}, input_len={}, output_len={})", opcode.0, input.len(), output.len());
        // SAFETY: both buffers outlive the call and are passed together with their exact lengths.
        let result = unsafe { self.api.oftr_call(opcode.0, input_ptr, input.len(), output_ptr, output.len()) };
        log::trace!("{OFTR_CALL_SYMBOL} returned {result}");
        result
    }

    pub fn call(&self, opcode: Opcode, input: &[u8]) -> Result<Vec<u8>> {
        self.call_with_capacity(opcode, input, VERSION_BUFFER_LEN)
    }

    /// Calls `oftr_call` with an output buffer of `capacity` bytes.
    ///
    /// When the library reports a larger required size, the call is repeated once with a buffer of that size.
    pub fn call_with_capacity(&self, opcode: Opcode, input: &[u8], capacity: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; capacity];
        let mut result = self.call_raw(opcode, input, &mut buf);
        if let CallOutcome::TooSmall(required) = CallOutcome::from_result(result, buf.len()) {
            if required > MAX_SUPPORTED_LEN {
                return Err(ProbeError::BufferTooSmall(required));
            }
            log::debug!("Output buffer of {} bytes is too small, retrying with {required}", buf.len());
            buf.resize(required, 0);
            result = self.call_raw(opcode, input, &mut buf);
        }
        match CallOutcome::from_result(result, buf.len()) {
            CallOutcome::Written(len) => {
                buf.truncate(len);
                Ok(buf)
            }
            CallOutcome::InvalidArguments => Err(ProbeError::InvalidArguments),
            CallOutcome::InternalError => Err(ProbeError::InternalError),
            CallOutcome::Failed(len) => Err(ProbeError::CallFailed(String::from_utf8_lossy(&buf[..len]).into_owned())),
            CallOutcome::TooSmall(required) => Err(ProbeError::BufferTooSmall(required)),
        }
    }

    /// Retrieves the version string, exactly as many bytes as the library wrote.
    pub fn version(&self) -> Result<String> {
        let bytes = self.call_with_capacity(Opcode::VERSION, &[], VERSION_BUFFER_LEN)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Translates a YAML message into binary OpenFlow of the given protocol version.
    pub fn encode(&self, yaml: &str, of_version: u8) -> Result<Vec<u8>> {
        self.call(Opcode::encode(of_version), yaml.as_bytes())
    }

    /// Translates a binary OpenFlow message into YAML.
    pub fn decode(&self, message: &[u8]) -> Result<String> {
        let bytes = self.call(Opcode::DECODE, message)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// dlerror() already names the file; keep only the loader's complaint.
fn loader_reason(path: &Path, err: &std::io::Error) -> String {
    let msg = err.to_string();
    let prefix = format!("{}: ", path.display());
    match msg.strip_prefix(&prefix) {
        Some(reason) => reason.to_string(),
        None => msg,
    }
}

impl Drop for OftrLibrary {
    fn drop(&mut self) {
        log::trace!("Closing library: '{}'", self.path.display());
    }
}
