//! Embedded-signature trust verification against the platform code-signing
//! policy (`WINTRUST_ACTION_GENERIC_VERIFY_V2`).
//!
//! Verification is a bounded two-attempt state machine. The first attempt
//! restricts chain retrieval to locally cached data, which keeps the common
//! already-verified case off the network. Only when the chain cannot be built
//! from the cache (or the provider reports something we do not recognize) is
//! the call repeated once with network retrieval enabled. Revocation checking
//! and UI are disabled on both attempts.

use crate::error::{trust_status_from_hr, TrustStatus};
use crate::utils::to_wide_null_terminated;
use crate::win32_guards::WinVerifyTrustGuard;
use std::ptr;
use tracing::{debug, trace};
use windows::core::*;
use windows::Win32::Foundation::*;
use windows::Win32::Security::WinTrust::*;

/// Chain-data retrieval modes for the two verification attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetrievalMode {
    /// Consult only locally cached chain data (fast path).
    CacheOnly,
    /// Allow the provider to fetch missing chain data over the network.
    Network,
}

/// Verifies the embedded signature of the file at `path`.
///
/// Runs the cache-only attempt first; if its outcome is `ChainingFailed` or
/// unrecognized, runs exactly one more attempt with network retrieval
/// enabled. The second outcome is terminal regardless of value; at most two
/// attempts are ever made.
pub fn verify_embedded_signature(path: &str) -> TrustStatus {
    let wide_path = to_wide_null_terminated(path);

    let status = run_trust_attempt(&wide_path, RetrievalMode::CacheOnly);
    if !status.needs_network_retry() {
        return status;
    }

    debug!(
        path,
        first_attempt = %status,
        "cached chain data insufficient, retrying with network retrieval"
    );
    run_trust_attempt(&wide_path, RetrievalMode::Network)
}

/// One WinVerifyTrust invocation in the given retrieval mode.
fn run_trust_attempt(wide_path: &[u16], mode: RetrievalMode) -> TrustStatus {
    let mut file_info = WINTRUST_FILE_INFO {
        cbStruct: std::mem::size_of::<WINTRUST_FILE_INFO>() as u32,
        pcwszFilePath: PCWSTR::from_raw(wide_path.as_ptr()),
        hFile: HANDLE(ptr::null_mut()),
        pgKnownSubject: ptr::null_mut(),
    };

    let prov_flags = match mode {
        RetrievalMode::CacheOnly => WTD_REVOCATION_CHECK_NONE | WTD_CACHE_ONLY_URL_RETRIEVAL,
        RetrievalMode::Network => WTD_REVOCATION_CHECK_NONE,
    };

    let mut trust_data = WINTRUST_DATA {
        cbStruct: std::mem::size_of::<WINTRUST_DATA>() as u32,
        pPolicyCallbackData: ptr::null_mut(),
        pSIPClientData: ptr::null_mut(),
        dwUIChoice: WTD_UI_NONE,
        fdwRevocationChecks: WTD_REVOKE_NONE,
        dwUnionChoice: WTD_CHOICE_FILE,
        Anonymous: WINTRUST_DATA_0 {
            pFile: &mut file_info as *mut _,
        },
        dwStateAction: WTD_STATEACTION_VERIFY,
        hWVTStateData: HANDLE(ptr::null_mut()),
        pwszURLReference: PWSTR(ptr::null_mut()),
        dwProvFlags: prov_flags,
        dwUIContext: WINTRUST_DATA_UICONTEXT(0),
        pSignatureSettings: ptr::null_mut(),
    };

    let action = WINTRUST_ACTION_GENERIC_VERIFY_V2;
    let hr = unsafe {
        WinVerifyTrust(
            HWND(ptr::null_mut()),
            &action as *const GUID as *mut GUID,
            &mut trust_data as *mut WINTRUST_DATA as *mut std::ffi::c_void,
        )
    };
    // Must be read before any other call touches the thread error state.
    let last_error = unsafe { GetLastError().0 as i32 };

    // State data opened by WTD_STATEACTION_VERIFY is closed when the guard
    // goes out of scope.
    let _guard = WinVerifyTrustGuard::new(trust_data.hWVTStateData);

    let status = trust_status_from_hr(hr, last_error);
    trace!(?mode, hr = %format_args!("0x{:08X}", hr as u32), %status, "trust attempt finished");
    status
}
