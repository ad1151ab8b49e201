//! Sample implementation of the older libofp buffer API, without `oftr_call`
//!
//! Loading this library must fail at symbol resolution, not at opening.
#![allow(non_camel_case_types)]

use std::os::raw::c_void;
use std::ptr;

const VERSION: &str = "0.9.0 (0000000)  <https://github.com/byllyfish/oftr>";

#[repr(C)]
pub struct libofp_buffer {
    data: *mut c_void,
    length: usize,
}

/// # Safety
///
/// `result` must point to a valid `libofp_buffer`.
#[no_mangle]
pub unsafe extern "C" fn libofp_version(result: *mut libofp_buffer) {
    (*result).data = VERSION.as_ptr() as *mut c_void;
    (*result).length = VERSION.len();
}

/// # Safety
///
/// `buffer` must point to a valid `libofp_buffer`.
#[no_mangle]
pub unsafe extern "C" fn libofp_buffer_free(buffer: *mut libofp_buffer) {
    (*buffer).data = ptr::null_mut();
    (*buffer).length = 0;
}
