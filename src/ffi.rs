//! C-ABI FFI bindings for cross-language integration.
//!
//! This module provides a C-compatible API for merging documents with
//! pdfstitch from other languages such as C#, Python, and Node.js.

use std::ffi::{c_char, c_int, CStr, CString};
use std::path::PathBuf;
use std::ptr;

use crate::{inspect_file, Stitcher};

/// Exit code for arguments that cannot be used (null or non-UTF-8 strings).
const INVALID_ARGUMENT: c_int = 1;

/// Result structure returned by FFI functions.
#[repr(C)]
pub struct PdfstitchResult {
    /// Exit code: 0 on success, otherwise the CLI's failure taxonomy.
    pub code: c_int,
    /// JSON report (null if failed). Must be freed with `pdfstitch_free_string`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Must be freed with `pdfstitch_free_string`.
    pub error: *mut c_char,
}

impl PdfstitchResult {
    fn success(data: String) -> Self {
        Self {
            code: 0,
            data: CString::new(data).unwrap_or_default().into_raw(),
            error: ptr::null_mut(),
        }
    }

    fn error(code: c_int, message: String) -> Self {
        Self {
            code,
            data: ptr::null_mut(),
            error: CString::new(message).unwrap_or_default().into_raw(),
        }
    }

    fn from_error(err: crate::Error) -> Self {
        Self::error(err.exit_code(), err.to_string())
    }
}

unsafe fn path_arg(ptr: *const c_char, what: &str) -> Result<PathBuf, PdfstitchResult> {
    if ptr.is_null() {
        return Err(PdfstitchResult::error(
            INVALID_ARGUMENT,
            format!("{} cannot be null", what),
        ));
    }
    match CStr::from_ptr(ptr).to_str() {
        Ok(s) => Ok(PathBuf::from(s)),
        Err(_) => Err(PdfstitchResult::error(
            INVALID_ARGUMENT,
            format!("Invalid UTF-8 in {}", what),
        )),
    }
}

unsafe fn input_paths(
    paths: *const *const c_char,
    count: usize,
) -> Result<Vec<PathBuf>, PdfstitchResult> {
    if paths.is_null() {
        return Err(PdfstitchResult::error(
            INVALID_ARGUMENT,
            "Input list cannot be null".to_string(),
        ));
    }
    (0..count)
        .map(|i| path_arg(*paths.add(i), "input path"))
        .collect()
}

/// Merge `count` PDF files into `output`.
///
/// Returns 0 on success, 2 for an unreadable input, 3 for an input that is
/// not a PDF, 4 when no pages were found, 5 when the output cannot be
/// written and 1 for anything else.
///
/// # Safety
///
/// `paths` must point to `count` valid null-terminated UTF-8 strings and
/// `output` must be a valid null-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn pdfstitch_merge(
    paths: *const *const c_char,
    count: usize,
    output: *const c_char,
) -> c_int {
    let result = pdfstitch_merge_report(paths, count, output);
    let code = result.code;
    pdfstitch_free_result(result);
    code
}

/// Merge `count` PDF files into `output` and return a JSON merge report.
///
/// # Safety
///
/// Same requirements as [`pdfstitch_merge`]. The returned result must be
/// freed with `pdfstitch_free_result`.
#[no_mangle]
pub unsafe extern "C" fn pdfstitch_merge_report(
    paths: *const *const c_char,
    count: usize,
    output: *const c_char,
) -> PdfstitchResult {
    let inputs = match input_paths(paths, count) {
        Ok(inputs) => inputs,
        Err(result) => return result,
    };
    let output = match path_arg(output, "output path") {
        Ok(output) => output,
        Err(result) => return result,
    };

    let stitcher = inputs.iter().fold(Stitcher::new(), |s, path| s.input(path));
    match stitcher.merge_to(&output) {
        Ok(report) => PdfstitchResult::success(
            serde_json::to_string(&report).unwrap_or_else(|_| "{}".to_string()),
        ),
        Err(e) => PdfstitchResult::from_error(e),
    }
}

/// Inspect a PDF file and return a JSON structure report.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `pdfstitch_free_result`.
#[no_mangle]
pub unsafe extern "C" fn pdfstitch_inspect(path: *const c_char) -> PdfstitchResult {
    let path = match path_arg(path, "path") {
        Ok(path) => path,
        Err(result) => return result,
    };

    match inspect_file(&path) {
        Ok(report) => PdfstitchResult::success(
            serde_json::to_string(&report).unwrap_or_else(|_| "{}".to_string()),
        ),
        Err(e) => PdfstitchResult::from_error(e),
    }
}

/// Free a result returned by a pdfstitch function.
///
/// # Safety
///
/// The `result` must have been returned by a pdfstitch function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn pdfstitch_free_result(result: PdfstitchResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Free a string allocated by pdfstitch.
///
/// # Safety
///
/// The `ptr` must have been allocated by pdfstitch.
/// This function should only be called once per pointer.
#[no_mangle]
pub unsafe extern "C" fn pdfstitch_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the version of the pdfstitch library.
///
/// # Safety
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn pdfstitch_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let version = pdfstitch_version();
        assert!(!version.is_null());
    }

    #[test]
    fn test_null_inputs() {
        let output = CString::new("out.pdf").unwrap();
        unsafe {
            assert_eq!(pdfstitch_merge(ptr::null(), 0, output.as_ptr()), 1);
        }
    }

    #[test]
    fn test_null_output() {
        let input = CString::new("a.pdf").unwrap();
        let inputs = [input.as_ptr()];
        unsafe {
            let result = pdfstitch_merge_report(inputs.as_ptr(), 1, ptr::null());
            assert_eq!(result.code, 1);
            assert!(!result.error.is_null());
            pdfstitch_free_result(result);
        }
    }

    #[test]
    fn test_missing_input_exit_code() {
        let input = CString::new("/nonexistent/a.pdf").unwrap();
        let output = CString::new("/nonexistent/out.pdf").unwrap();
        let inputs = [input.as_ptr()];
        unsafe {
            assert_eq!(pdfstitch_merge(inputs.as_ptr(), 1, output.as_ptr()), 2);
        }
    }

    #[test]
    fn test_inspect_null() {
        unsafe {
            let result = pdfstitch_inspect(ptr::null());
            assert_eq!(result.code, 1);
            pdfstitch_free_result(result);
        }
    }
}
