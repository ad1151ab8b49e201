//! A dynamic library exposing `oftr_call` that reports a malformed version string

use std::os::raw::c_char;
use std::ptr;

const VERSION: &[u8] = b"1.2 (abc)";

/// # Safety
///
/// `output` must point to `output_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn oftr_call(opcode: u32, _input: *const c_char, _input_len: usize, output: *mut c_char, output_len: usize) -> i32 {
    if opcode & 0xFF != 0 {
        return -1;
    }
    if output.is_null() || output_len < VERSION.len() {
        return -(VERSION.len() as i32);
    }
    ptr::copy_nonoverlapping(VERSION.as_ptr(), output as *mut u8, VERSION.len());
    VERSION.len() as i32
}
