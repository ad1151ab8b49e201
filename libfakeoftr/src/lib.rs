//! A dynamic library exposing `oftr_call` with the same result convention as the real oftr
//!
//! Supports the version operation plus encode/decode of bare `HELLO` messages. Opcodes from 0xF0
//! up misbehave on purpose so the client's error paths can be reached.

use std::os::raw::c_char;
use std::ptr;

const VERSION: &str = "1.14.0 (abcdef1) <https://github.com/byllyfish/oftr>";

const MAX_SUPPORTED_LEN: usize = 1073741823;
const INVALID_ARGUMENTS: i32 = -1;
const INTERNAL_ERROR: i32 = -2;

const OFTR_VERSION: u32 = 0;
const OFTR_ENCODE: u32 = 1;
const OFTR_DECODE: u32 = 2;
/// Always asks for one byte more than the output buffer holds.
const FAKE_GROWING: u32 = 0xF0;
const FAKE_INTERNAL_ERROR: u32 = 0xF1;
/// Asks for a buffer beyond the supported maximum.
const FAKE_OVERSIZED: u32 = 0xF2;

const HEADER_LEN: usize = 8;
const OFPT_HELLO: u8 = 0;

/// # Safety
///
/// `input` must point to `input_len` readable bytes and `output` to `output_len` writable bytes.
/// Null is accepted only together with a zero length.
#[no_mangle]
pub unsafe extern "C" fn oftr_call(opcode: u32, input: *const c_char, input_len: usize, output: *mut c_char, output_len: usize) -> i32 {
    if input_len > MAX_SUPPORTED_LEN
        || output_len > MAX_SUPPORTED_LEN
        || (input.is_null() && input_len > 0)
        || (output.is_null() && output_len > 0)
    {
        return INVALID_ARGUMENTS;
    }
    let input: &[u8] = if input.is_null() {
        &[]
    } else {
        std::slice::from_raw_parts(input as *const u8, input_len)
    };
    let out = Output { ptr: output as *mut u8, len: output_len };

    match opcode & 0xFF {
        OFTR_VERSION => out.ok(VERSION.as_bytes()),
        OFTR_ENCODE => match encode(input, (opcode >> 24) as u8) {
            Ok(data) => out.ok(&data),
            Err(msg) => out.err(&msg),
        },
        OFTR_DECODE => match decode(input) {
            Ok(text) => out.ok(text.as_bytes()),
            Err(msg) => out.err(&msg),
        },
        FAKE_GROWING => -(output_len as i32 + 1),
        FAKE_INTERNAL_ERROR => INTERNAL_ERROR,
        FAKE_OVERSIZED => -(MAX_SUPPORTED_LEN as i32 + 1),
        _ => INVALID_ARGUMENTS,
    }
}

struct Output {
    ptr: *mut u8,
    len: usize,
}

impl Output {
    fn ok(&self, data: &[u8]) -> i32 {
        self.copy(data, false)
    }

    fn err(&self, msg: &str) -> i32 {
        self.copy(msg.as_bytes(), true)
    }

    /// Copies `data` if it fits. A result that does not fit is reported as its negated size.
    fn copy(&self, data: &[u8], error: bool) -> i32 {
        if data.len() > MAX_SUPPORTED_LEN {
            return INTERNAL_ERROR;
        }
        let result = data.len() as i32;
        if data.len() > self.len || self.ptr.is_null() {
            return -result;
        }
        // SAFETY: the caller guarantees `len` writable bytes at `ptr`, and data fits.
        unsafe { ptr::copy_nonoverlapping(data.as_ptr(), self.ptr, data.len()) };
        if error { -result } else { result }
    }
}

fn encode(input: &[u8], of_version: u8) -> Result<Vec<u8>, String> {
    let text = std::str::from_utf8(input).map_err(|_| "YAML:1:1: error: invalid UTF-8".to_string())?;
    if text.trim().is_empty() {
        return Err("YAML:1:1: error: not a document".to_string());
    }
    let mut msg_type = None;
    let mut version = None;
    let mut xid = 0u32;
    for (lineno, line) in text.lines().enumerate() {
        let Some((key, value)) = line.split_once(':') else {
            return Err(format!("YAML:{}:1: error: expected 'key: value'", lineno + 1));
        };
        let value = value.trim();
        match key.trim() {
            "type" => msg_type = Some(value),
            "version" => version = value.parse::<u8>().ok(),
            "xid" => xid = parse_u32(value).ok_or_else(|| format!("YAML:{}:1: error: invalid xid", lineno + 1))?,
            _ => {}
        }
    }
    match msg_type {
        Some("HELLO") => {}
        Some(other) => return Err(format!("unsupported message type: {other}")),
        None => return Err("missing key 'type'".to_string()),
    }
    let version = if of_version != 0 { of_version } else { version.unwrap_or(4) };
    let mut data = vec![version, OFPT_HELLO, 0, HEADER_LEN as u8];
    data.extend_from_slice(&xid.to_be_bytes());
    Ok(data)
}

fn parse_u32(value: &str) -> Option<u32> {
    match value.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn decode(input: &[u8]) -> Result<String, String> {
    if input.len() < HEADER_LEN {
        return Err("Buffer size < 8 bytes".to_string());
    }
    if input.len() > 0xffff {
        return Err("Buffer size > 65535 bytes".to_string());
    }
    if u16::from_be_bytes([input[2], input[3]]) as usize != input.len() {
        return Err("Message length does not match buffer size".to_string());
    }
    let version = input[0];
    if input[1] != OFPT_HELLO {
        return Err(format!("unsupported message type: {}", input[1]));
    }
    let xid = u32::from_be_bytes([input[4], input[5], input[6], input[7]]);
    Ok(format!(
        "---\ntype:            HELLO\nxid:             0x{xid:08X}\nversion:         0x{version:02X}\nmsg:             \n  versions:        [ {version} ]\n...\n"
    ))
}
