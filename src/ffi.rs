//! C ABI for host applications
//!
//! Every entry point returns a non-negative value on success and `-1` on any
//! failure: null pointers, negative lengths, invalid UTF-8, library errors and
//! panics alike. The cause is logged through `tracing` before it is collapsed.
//! No function writes past the capacity it is given.
//!
//! A decrypted score of `-1` is indistinguishable from failure at this
//! boundary; Rust callers should use [`crate::score::decrypt_score`] instead.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::error;

use crate::error::{Error, Result};
use crate::{keys, score};

const FAILURE: c_int = -1;

/// Run `f`, collapsing errors and panics into [`FAILURE`]
fn guarded<F>(op: &'static str, f: F) -> c_int
where
    F: FnOnce() -> Result<c_int>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            error!(op, error = %e, "call failed");
            FAILURE
        }
        Err(_) => {
            error!(op, "panic caught at the C boundary");
            FAILURE
        }
    }
}

/// Borrow a NUL-terminated UTF-8 string.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
unsafe fn c_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(Error::InvalidInput(format!("{name} is null")));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|e| Error::InvalidInput(format!("{name} is not valid UTF-8: {e}")))
}

fn c_len(len: c_int, name: &str) -> Result<usize> {
    usize::try_from(len).map_err(|_| Error::InvalidInput(format!("{name} is negative: {len}")))
}

/// Borrow `len` elements; a zero length accepts a null pointer.
///
/// # Safety
/// For `len > 0`, `ptr` must point to `len` initialized elements valid for `'a`.
unsafe fn c_slice<'a, T>(ptr: *const T, len: c_int, name: &str) -> Result<&'a [T]> {
    let len = c_len(len, name)?;
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(Error::InvalidInput(format!("{name} is null")));
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

fn to_c_int(value: usize, name: &str) -> Result<c_int> {
    c_int::try_from(value).map_err(|_| Error::InvalidInput(format!("{name} {value} exceeds c_int")))
}

/// Generate a key bundle for `ring_degree` into `output_dir`.
///
/// Returns 0 on success, -1 on failure.
///
/// # Safety
/// `output_dir` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn generate_keys(output_dir: *const c_char, ring_degree: c_int) -> c_int {
    guarded("generate_keys", || {
        let dir = c_str(output_dir, "output_dir")?;
        let degree = c_len(ring_degree, "ring_degree")?;
        keys::generate(Path::new(dir), degree)?;
        Ok(0)
    })
}

/// Decrypt a base64 result ciphertext with secret key bytes held in memory.
///
/// Returns the score, or -1 on failure.
///
/// # Safety
/// `enc_score_base64` must be null or a valid NUL-terminated string;
/// `sk_bytes` must point to `sk_size` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn decrypt_score_memory(
    enc_score_base64: *const c_char,
    sk_bytes: *const u8,
    sk_size: c_int,
) -> c_int {
    guarded("decrypt_score_memory", || {
        let encoded = c_str(enc_score_base64, "enc_score_base64")?;
        let secret_key = c_slice(sk_bytes, sk_size, "sk_bytes")?;
        let score = score::decrypt_score(encoded, secret_key)?;
        c_int::try_from(score)
            .map_err(|_| Error::InvalidInput(format!("score {score} exceeds c_int")))
    })
}

/// Shared body of the encrypt entry points
///
/// # Safety
/// Same contract as [`encrypt_vector_ex`].
unsafe fn encrypt_into_buffer(
    vec: *const c_int,
    vec_len: c_int,
    out_buf: *mut u8,
    out_capacity: c_int,
    keys_dir: *const c_char,
) -> Result<usize> {
    let entries = c_slice(vec, vec_len, "vec")?;
    let capacity = c_len(out_capacity, "out_capacity")?;
    let dir = c_str(keys_dir, "keys_dir")?;

    let vector = entries
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            u64::try_from(v)
                .map_err(|_| Error::InvalidInput(format!("entry {i} is negative: {v}")))
        })
        .collect::<Result<Vec<u64>>>()?;

    if capacity > 0 && out_buf.is_null() {
        return Err(Error::InvalidInput("out_buf is null".into()));
    }
    let out: &mut [u8] = if capacity == 0 {
        &mut []
    } else {
        std::slice::from_raw_parts_mut(out_buf, capacity)
    };

    score::encrypt_vector(&vector, Path::new(dir), out)
}

/// Encrypt a query vector with the public key in `keys_dir`.
///
/// Returns the number of bytes written to `out_buf`, or -1 on failure
/// (including an undersized buffer).
///
/// # Safety
/// `vec` must point to `vec_len` readable ints, `out_buf` to
/// `out_capacity` writable bytes, and `keys_dir` must be null or a valid
/// NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn encrypt_vector(
    vec: *const c_int,
    vec_len: c_int,
    out_buf: *mut u8,
    out_capacity: c_int,
    keys_dir: *const c_char,
) -> c_int {
    guarded("encrypt_vector", || {
        let written = encrypt_into_buffer(vec, vec_len, out_buf, out_capacity, keys_dir)?;
        to_c_int(written, "written length")
    })
}

/// Like [`encrypt_vector`], also reporting the required buffer size.
///
/// When the buffer is too small, the serialized size is stored through
/// `required_len` (if non-null) before returning -1. On success the number of
/// bytes written is stored there too.
///
/// # Safety
/// As for [`encrypt_vector`]; `required_len` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn encrypt_vector_ex(
    vec: *const c_int,
    vec_len: c_int,
    out_buf: *mut u8,
    out_capacity: c_int,
    keys_dir: *const c_char,
    required_len: *mut c_int,
) -> c_int {
    guarded("encrypt_vector_ex", || {
        let report = |len: usize| -> Result<()> {
            if !required_len.is_null() {
                *required_len = to_c_int(len, "required length")?;
            }
            Ok(())
        };

        match encrypt_into_buffer(vec, vec_len, out_buf, out_capacity, keys_dir) {
            Ok(written) => {
                report(written)?;
                to_c_int(written, "written length")
            }
            Err(Error::BufferTooSmall { required, capacity }) => {
                report(required)?;
                Err(Error::BufferTooSmall { required, capacity })
            }
            Err(e) => Err(e),
        }
    })
}
