use std::fmt;
use thiserror::Error;

// HRESULTs kept as raw constants so the mapping stays platform-free and
// unit-testable off Windows.
const TRUST_E_PROVIDER_UNKNOWN: i32 = 0x800B_0001_u32 as i32;
const TRUST_E_SUBJECT_FORM_UNKNOWN: i32 = 0x800B_0003_u32 as i32;
const TRUST_E_SUBJECT_NOT_TRUSTED: i32 = 0x800B_0004_u32 as i32;
const TRUST_E_NOSIGNATURE: i32 = 0x800B_0100_u32 as i32;
const CERT_E_CHAINING: i32 = 0x800B_010A_u32 as i32;
const TRUST_E_EXPLICIT_DISTRUST: i32 = 0x800B_0111_u32 as i32;
const TRUST_E_BAD_DIGEST: i32 = 0x8009_6010_u32 as i32;
const CRYPT_E_SECURITY_SETTINGS: i32 = 0x8009_2026_u32 as i32;

/// Outcome of one trust-verification request against the platform policy.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TrustStatus {
    /// The signature is valid and chains to a trusted root.
    Success,
    /// The file carries no signature at all.
    NotSigned,
    /// A signature is present but did not verify (bad digest, damaged blob).
    SignatureInvalid,
    /// The subject or publisher hash is disallowed by admin or user policy.
    ExplicitlyDistrusted,
    /// The user declined to trust this subject.
    UserDistrusted,
    /// Admin policy disabled user trust decisions for this subject.
    SecurityPolicyBlocked,
    /// No certificate chain could be built to a trusted root authority.
    ChainingFailed,
    /// Any other verification outcome, carrying the raw status code.
    Unknown(i32),
}

impl TrustStatus {
    /// Whether this outcome of the cache-only attempt warrants the single
    /// network-enabled retry. Chain building commonly fails when the
    /// intermediates are not yet in the local cache, so `ChainingFailed` and
    /// unrecognized outcomes get a second attempt; every other outcome is
    /// terminal.
    pub fn needs_network_retry(&self) -> bool {
        matches!(self, TrustStatus::ChainingFailed | TrustStatus::Unknown(_))
    }
}

impl fmt::Display for TrustStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustStatus::Success => write!(f, "signature is valid and trusted"),
            TrustStatus::NotSigned => write!(f, "TRUST_E_NOSIGNATURE: no signature was present in the subject"),
            TrustStatus::SignatureInvalid => write!(f, "TRUST_E_BAD_DIGEST: the signature did not verify against the file contents"),
            TrustStatus::ExplicitlyDistrusted => write!(f, "TRUST_E_EXPLICIT_DISTRUST: the subject or publisher is explicitly disallowed"),
            TrustStatus::UserDistrusted => write!(f, "TRUST_E_SUBJECT_NOT_TRUSTED: the user declined to trust the subject"),
            TrustStatus::SecurityPolicyBlocked => write!(f, "CRYPT_E_SECURITY_SETTINGS: admin policy prevented the trust decision"),
            TrustStatus::ChainingFailed => write!(f, "CERT_E_CHAINING: no certificate chain could be built to a trusted root"),
            TrustStatus::Unknown(code) => write!(f, "unrecognized trust status (0x{:08X})", *code as u32),
        }
    }
}

/// Maps a raw `WinVerifyTrust` status to a [`TrustStatus`].
///
/// `last_error` is the thread error state captured right after the call;
/// `TRUST_E_NOSIGNATURE` alone does not distinguish an unsigned file from a
/// file whose signature blob is damaged, the provider reports that detail
/// there.
pub fn trust_status_from_hr(hr: i32, last_error: i32) -> TrustStatus {
    match hr {
        0 => TrustStatus::Success,
        TRUST_E_NOSIGNATURE => match last_error {
            TRUST_E_NOSIGNATURE | TRUST_E_SUBJECT_FORM_UNKNOWN | TRUST_E_PROVIDER_UNKNOWN => {
                TrustStatus::NotSigned
            }
            _ => TrustStatus::SignatureInvalid,
        },
        TRUST_E_BAD_DIGEST => TrustStatus::SignatureInvalid,
        TRUST_E_EXPLICIT_DISTRUST => TrustStatus::ExplicitlyDistrusted,
        TRUST_E_SUBJECT_NOT_TRUSTED => TrustStatus::UserDistrusted,
        CRYPT_E_SECURITY_SETTINGS => TrustStatus::SecurityPolicyBlocked,
        CERT_E_CHAINING => TrustStatus::ChainingFailed,
        _ => TrustStatus::Unknown(hr),
    }
}

/// Errors raised while pulling signer details out of an already-verified file.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ExtractionError {
    /// The file could not be opened or parsed as a signed object.
    #[error("file could not be opened as a signed object")]
    QueryFailed,
    /// The signer-info record could not be sized or fetched from the message.
    #[error("signer information record could not be retrieved")]
    SignerInfoUnavailable,
    /// No certificate in the message store matches the signer's issuer and serial.
    #[error("signer certificate not found in the message certificate store")]
    SignerCertificateNotFound,
    /// The issuer or subject display name could not be retrieved.
    #[error("certificate display name could not be retrieved")]
    NameUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_maps_from_zero() {
        assert_eq!(trust_status_from_hr(0, 0), TrustStatus::Success);
    }

    #[test]
    fn no_signature_variants_map_to_not_signed() {
        for last_error in [
            TRUST_E_NOSIGNATURE,
            TRUST_E_SUBJECT_FORM_UNKNOWN,
            TRUST_E_PROVIDER_UNKNOWN,
        ] {
            assert_eq!(
                trust_status_from_hr(TRUST_E_NOSIGNATURE, last_error),
                TrustStatus::NotSigned
            );
        }
    }

    #[test]
    fn no_signature_with_other_last_error_is_invalid() {
        // a damaged blob reports TRUST_E_NOSIGNATURE with e.g. CRYPT_E_FILE_ERROR
        let crypt_e_file_error = 0x8009_2003_u32 as i32;
        assert_eq!(
            trust_status_from_hr(TRUST_E_NOSIGNATURE, crypt_e_file_error),
            TrustStatus::SignatureInvalid
        );
    }

    #[test]
    fn bad_digest_is_invalid() {
        assert_eq!(
            trust_status_from_hr(TRUST_E_BAD_DIGEST, 0),
            TrustStatus::SignatureInvalid
        );
    }

    #[test]
    fn named_terminal_outcomes_map_directly() {
        assert_eq!(
            trust_status_from_hr(TRUST_E_EXPLICIT_DISTRUST, 0),
            TrustStatus::ExplicitlyDistrusted
        );
        assert_eq!(
            trust_status_from_hr(TRUST_E_SUBJECT_NOT_TRUSTED, 0),
            TrustStatus::UserDistrusted
        );
        assert_eq!(
            trust_status_from_hr(CRYPT_E_SECURITY_SETTINGS, 0),
            TrustStatus::SecurityPolicyBlocked
        );
        assert_eq!(
            trust_status_from_hr(CERT_E_CHAINING, 0),
            TrustStatus::ChainingFailed
        );
    }

    #[test]
    fn unrecognized_code_is_preserved() {
        let cert_e_untrustedroot = 0x800B_0109_u32 as i32;
        assert_eq!(
            trust_status_from_hr(cert_e_untrustedroot, 0),
            TrustStatus::Unknown(cert_e_untrustedroot)
        );
    }

    #[test]
    fn only_chaining_and_unknown_trigger_the_network_retry() {
        assert!(TrustStatus::ChainingFailed.needs_network_retry());
        assert!(TrustStatus::Unknown(0x800B_0109_u32 as i32).needs_network_retry());

        assert!(!TrustStatus::Success.needs_network_retry());
        assert!(!TrustStatus::NotSigned.needs_network_retry());
        assert!(!TrustStatus::SignatureInvalid.needs_network_retry());
        assert!(!TrustStatus::ExplicitlyDistrusted.needs_network_retry());
        assert!(!TrustStatus::UserDistrusted.needs_network_retry());
        assert!(!TrustStatus::SecurityPolicyBlocked.needs_network_retry());
    }
}
