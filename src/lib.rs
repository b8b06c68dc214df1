//! signgate - embedded code-signature trust gate
//!
//! Decides whether a binary file carries a valid embedded (Authenticode)
//! signature whose publisher is on an allow-list, before a host application
//! decides to load it. Trust-chain verification is delegated to the Windows
//! WinTrust subsystem; this crate orchestrates verification, signer-info
//! extraction and the publisher-matching policy, and always answers with a
//! plain boolean (fail-closed).
//!
//! # Examples
//!
//! ```no_run
//! use signgate::GateConfig;
//!
//! let allow_list = GateConfig::default().allow_list();
//! # #[cfg(windows)]
//! # {
//! if signgate::is_trusted_signed_file(r"C:\Program Files\Vendor\plugin.dll", &allow_list) {
//!     println!("publisher is trusted, safe to load");
//! }
//! # }
//! ```

pub mod config;
pub mod error;
pub mod policy;

#[cfg(windows)]
pub mod signer_info;
#[cfg(windows)]
pub mod utils;
#[cfg(windows)]
pub mod verification;

#[cfg(windows)]
mod cert_info;
#[cfg(windows)]
mod opus_info;
#[cfg(windows)]
mod win32_guards;

#[cfg(all(test, windows))]
mod tests;

// Re-export commonly used types for convenience
pub use config::{ConfigError, GateConfig};
pub use error::{trust_status_from_hr, ExtractionError, TrustStatus};
pub use policy::{is_trusted_publisher, PublisherAllowList};
#[cfg(windows)]
pub use signer_info::{extract_signature_info, SignatureInfo};
#[cfg(windows)]
pub use verification::verify_embedded_signature;

/// Verifies the file at `path` and matches its signing publisher against
/// `allow_list`.
///
/// Trust verification runs first; only on success is the signer information
/// extracted and the publisher policy evaluated. Any failure anywhere in the
/// chain yields `false`; the specific reason is traced but never surfaced.
#[cfg(windows)]
pub fn is_trusted_signed_file(path: &str, allow_list: &PublisherAllowList) -> bool {
    use tracing::{debug, warn};

    let status = verification::verify_embedded_signature(path);
    if status != TrustStatus::Success {
        debug!(path, %status, "trust verification rejected file");
        return false;
    }

    let info = match signer_info::extract_signature_info(path) {
        Ok(info) => info,
        Err(err) => {
            warn!(path, %err, "signature information extraction failed");
            return false;
        }
    };

    policy::is_trusted_publisher(&status, &info.subject_name, allow_list)
}
