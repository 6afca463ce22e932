//! Foreign Function Interface (FFI) surface for the mobile shells.
//!
//! A host opens a [`TrackerHandle`] on a data directory and drives it with JSON
//! payloads. Every call returns an [`FfiErrorCategory`] code; results come back
//! through an out-pointer as a C string owned by this library, which the host
//! must release with [`ffi_string_free`].

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::PathBuf;
use std::ptr;
use std::sync::OnceLock;

use serde::Serialize;

use crate::config::Config;
use crate::core::Tracker;
use crate::domain::{FilterMode, TransactionDraft, TransactionId};
use crate::errors::LedgerError;

/// Semantic version of the Rust core (mirrors `Cargo.toml`).
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Semantic version of the FFI surface. Bumps when ABI/contract changes.
pub const FFI_VERSION: &str = "0.1.0";

/// Error categories surfaced across the FFI boundary.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCategory {
    Ok = 0,
    Validation = 1,
    NotFound = 2,
    Persistence = 3,
    NotLoaded = 4,
    InvalidArgument = 5,
    Internal = 6,
}

impl From<FfiErrorCategory> for i32 {
    fn from(value: FfiErrorCategory) -> Self {
        value as i32
    }
}

/// Maps ledger errors into categories.
pub fn classify_error(err: &LedgerError) -> FfiErrorCategory {
    match err {
        LedgerError::Validation(_) => FfiErrorCategory::Validation,
        LedgerError::NotFound(_) => FfiErrorCategory::NotFound,
        LedgerError::NotLoaded => FfiErrorCategory::NotLoaded,
        LedgerError::Persistence(_) | LedgerError::Io(_) | LedgerError::Serde(_) => {
            FfiErrorCategory::Persistence
        }
    }
}

/// Opaque session owned by the host between `ffi_tracker_open` and `ffi_tracker_free`.
pub struct TrackerHandle {
    tracker: Tracker,
}

/// Mutation result as seen by the host: the record plus a durability flag.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MutationPayload<T: Serialize> {
    record: T,
    saved: bool,
}

/// Returns the core (Rust) semantic version as a C string.
#[no_mangle]
pub extern "C" fn ffi_core_version() -> *const c_char {
    static CORE: OnceLock<CString> = OnceLock::new();
    CORE.get_or_init(|| CString::new(CORE_VERSION).unwrap_or_default())
        .as_ptr()
}

/// Returns the FFI interface semantic version as a C string.
#[no_mangle]
pub extern "C" fn ffi_version() -> *const c_char {
    static FFI: OnceLock<CString> = OnceLock::new();
    FFI.get_or_init(|| CString::new(FFI_VERSION).unwrap_or_default())
        .as_ptr()
}

/// Opens (and loads) a tracker stored under `data_dir`. Returns null on failure.
///
/// # Safety
/// `data_dir` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn ffi_tracker_open(data_dir: *const c_char) -> *mut TrackerHandle {
    let Some(dir) = read_str(data_dir) else {
        return ptr::null_mut();
    };
    match Config::with_data_dir(PathBuf::from(dir)).open_tracker() {
        Ok(tracker) => Box::into_raw(Box::new(TrackerHandle { tracker })),
        Err(err) => {
            tracing::warn!(error = %err, "ffi: failed to open tracker");
            ptr::null_mut()
        }
    }
}

/// Releases a handle returned by [`ffi_tracker_open`].
///
/// # Safety
/// `handle` must be null or a pointer obtained from `ffi_tracker_open` that
/// has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn ffi_tracker_free(handle: *mut TrackerHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Adds a transaction from a draft JSON object; writes the created record to `out`.
///
/// # Safety
/// `handle` must be live, `draft_json` a valid C string and `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn ffi_tracker_add(
    handle: *mut TrackerHandle,
    draft_json: *const c_char,
    out: *mut *mut c_char,
) -> i32 {
    let Some(handle) = handle.as_ref() else {
        return FfiErrorCategory::InvalidArgument.into();
    };
    let draft = match parse_json::<TransactionDraft>(draft_json) {
        Ok(draft) => draft,
        Err(code) => return code.into(),
    };
    match handle.tracker.add(draft) {
        Ok(mutation) => write_json(
            out,
            &MutationPayload {
                saved: mutation.is_durable(),
                record: mutation.value,
            },
        ),
        Err(err) => classify_error(&err).into(),
    }
}

/// Replaces the transaction `id` with the draft; writes the updated record to `out`.
///
/// # Safety
/// Same contract as [`ffi_tracker_add`]; `id` must be a valid C string.
#[no_mangle]
pub unsafe extern "C" fn ffi_tracker_update(
    handle: *mut TrackerHandle,
    id: *const c_char,
    draft_json: *const c_char,
    out: *mut *mut c_char,
) -> i32 {
    let (Some(handle), Some(id)) = (handle.as_ref(), read_str(id)) else {
        return FfiErrorCategory::InvalidArgument.into();
    };
    let draft = match parse_json::<TransactionDraft>(draft_json) {
        Ok(draft) => draft,
        Err(code) => return code.into(),
    };
    match handle.tracker.update(&TransactionId::from(id), draft) {
        Ok(mutation) => write_json(
            out,
            &MutationPayload {
                saved: mutation.is_durable(),
                record: mutation.value,
            },
        ),
        Err(err) => classify_error(&err).into(),
    }
}

/// Removes the transaction `id`. The host confirms with the user beforehand.
///
/// # Safety
/// `handle` must be live, `id` a valid C string and `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn ffi_tracker_remove(
    handle: *mut TrackerHandle,
    id: *const c_char,
    out: *mut *mut c_char,
) -> i32 {
    let (Some(handle), Some(id)) = (handle.as_ref(), read_str(id)) else {
        return FfiErrorCategory::InvalidArgument.into();
    };
    match handle.tracker.remove(&TransactionId::from(id)) {
        Ok(mutation) => write_json(
            out,
            &MutationPayload {
                saved: mutation.is_durable(),
                record: mutation.value,
            },
        ),
        Err(err) => classify_error(&err).into(),
    }
}

/// Writes the full ledger as a JSON array to `out`.
///
/// # Safety
/// `handle` must be live and `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn ffi_tracker_list(
    handle: *const TrackerHandle,
    out: *mut *mut c_char,
) -> i32 {
    match handle.as_ref() {
        Some(handle) => write_json(out, &handle.tracker.list()),
        None => FfiErrorCategory::InvalidArgument.into(),
    }
}

/// Sets the active filter mode from `"all"`, `"income"` or `"expense"`.
///
/// # Safety
/// `handle` must be live and `mode` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn ffi_tracker_set_filter_mode(
    handle: *mut TrackerHandle,
    mode: *const c_char,
) -> i32 {
    let (Some(handle), Some(mode)) = (handle.as_mut(), read_str(mode)) else {
        return FfiErrorCategory::InvalidArgument.into();
    };
    match mode.parse::<FilterMode>() {
        Ok(mode) => {
            handle.tracker.set_filter_mode(mode);
            FfiErrorCategory::Ok.into()
        }
        Err(err) => classify_error(&err).into(),
    }
}

/// Writes the records selected by the active filter to `out`.
///
/// # Safety
/// `handle` must be live and `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn ffi_tracker_filtered_view(
    handle: *const TrackerHandle,
    out: *mut *mut c_char,
) -> i32 {
    match handle.as_ref() {
        Some(handle) => write_json(out, &handle.tracker.filtered_view()),
        None => FfiErrorCategory::InvalidArgument.into(),
    }
}

/// Writes `{totalIncome, totalExpense, balance}` to `out`.
///
/// # Safety
/// `handle` must be live and `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn ffi_tracker_aggregates(
    handle: *const TrackerHandle,
    out: *mut *mut c_char,
) -> i32 {
    match handle.as_ref() {
        Some(handle) => write_json(out, &handle.tracker.aggregates()),
        None => FfiErrorCategory::InvalidArgument.into(),
    }
}

/// Returns 1 when the dark theme is enabled, 0 otherwise (including a null handle).
///
/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn ffi_tracker_theme(handle: *const TrackerHandle) -> i32 {
    handle
        .as_ref()
        .map(|handle| i32::from(handle.tracker.theme_preference()))
        .unwrap_or(0)
}

/// Persists the theme flag. A persistence code means the choice will not survive a restart.
///
/// # Safety
/// `handle` must be live.
#[no_mangle]
pub unsafe extern "C" fn ffi_tracker_set_theme(handle: *const TrackerHandle, enabled: bool) -> i32 {
    let Some(handle) = handle.as_ref() else {
        return FfiErrorCategory::InvalidArgument.into();
    };
    match handle.tracker.set_theme_preference(enabled) {
        Ok(()) => FfiErrorCategory::Ok.into(),
        Err(err) => classify_error(&err).into(),
    }
}

/// Frees a string produced by this library.
///
/// # Safety
/// `value` must be null or a pointer handed out through an `out` parameter.
#[no_mangle]
pub unsafe extern "C" fn ffi_string_free(value: *mut c_char) {
    if !value.is_null() {
        drop(CString::from_raw(value));
    }
}

unsafe fn read_str<'a>(value: *const c_char) -> Option<&'a str> {
    if value.is_null() {
        return None;
    }
    CStr::from_ptr(value).to_str().ok()
}

unsafe fn parse_json<T: serde::de::DeserializeOwned>(
    value: *const c_char,
) -> Result<T, FfiErrorCategory> {
    let raw = read_str(value).ok_or(FfiErrorCategory::InvalidArgument)?;
    serde_json::from_str(raw).map_err(|err| {
        tracing::debug!(error = %err, "ffi: rejected payload");
        FfiErrorCategory::Validation
    })
}

unsafe fn write_json<T: Serialize + ?Sized>(out: *mut *mut c_char, value: &T) -> i32 {
    let Ok(json) = serde_json::to_string(value) else {
        return FfiErrorCategory::Internal.into();
    };
    let Ok(text) = CString::new(json) else {
        return FfiErrorCategory::Internal.into();
    };
    if !out.is_null() {
        *out = text.into_raw();
    }
    FfiErrorCategory::Ok.into()
}
