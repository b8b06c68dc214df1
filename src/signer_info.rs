use crate::cert_info;
use crate::error::ExtractionError;
use crate::opus_info;
use crate::utils::{filetime_to_datetime, to_wide_null_terminated};
use crate::win32_guards::{CertStoreHandle, CryptMsgHandle};
use chrono::{DateTime, Utc};
use std::ptr;
use tracing::debug;
use windows::Win32::Security::Cryptography::*;

/// Everything extracted from one embedded signature.
///
/// Created fresh per verification request and discarded at request end;
/// nothing here is shared or cached. Once extraction succeeds the serial
/// number, issuer name and subject name are always populated together; the
/// opus-derived fields are optional attributes that may be absent on any
/// signed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub program_name: Option<String>,
    pub publisher_link: Option<String>,
    pub more_info_link: Option<String>,
    /// Serial-number bytes as stored in the certificate (little-endian).
    pub serial_number: Vec<u8>,
    pub issuer_name: String,
    pub subject_name: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl SignatureInfo {
    /// Serial number rendered most-significant-byte first, as certificate
    /// viewers display it.
    pub fn serial_number_hex(&self) -> String {
        self.serial_number
            .iter()
            .rev()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join("")
    }
}

impl std::fmt::Display for SignatureInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Signed by: {}\nIssued by: {}\nSerial: {}\nValid from: {}\nValid to: {}",
            self.subject_name,
            self.issuer_name,
            self.serial_number_hex(),
            self.not_before.format("%Y-%m-%d %H:%M:%S UTC"),
            self.not_after.format("%Y-%m-%d %H:%M:%S UTC"),
        )?;
        if let Some(name) = &self.program_name {
            write!(f, "\nProgram: {}", name)?;
        }
        if let Some(link) = &self.publisher_link {
            write!(f, "\nPublisher link: {}", link)?;
        }
        if let Some(link) = &self.more_info_link {
            write!(f, "\nMore info: {}", link)?;
        }
        Ok(())
    }
}

/// Owned copy of the raw signer-info record fetched from a cryptographic
/// message. Keeps the bytes alive for as long as anything points into them
/// (the certificate lookup borrows the issuer and serial blobs).
pub(crate) struct SignerInfoRecord {
    buf: Vec<u8>,
}

impl SignerInfoRecord {
    /// Fetches the signer-info record from an open message handle using the
    /// two-phase size-query-then-fetch pattern.
    pub(crate) fn from_message(h_msg: *mut std::ffi::c_void) -> Result<Self, ExtractionError> {
        let mut len = 0u32;
        let sized = unsafe { CryptMsgGetParam(h_msg, CMSG_SIGNER_INFO_PARAM, 0, None, &mut len) };
        if sized.is_err() || len == 0 {
            return Err(ExtractionError::SignerInfoUnavailable);
        }

        let mut buf = vec![0u8; len as usize];
        let fetched = unsafe {
            CryptMsgGetParam(
                h_msg,
                CMSG_SIGNER_INFO_PARAM,
                0,
                Some(buf.as_mut_ptr() as *mut _),
                &mut len,
            )
        };
        if fetched.is_err() {
            return Err(ExtractionError::SignerInfoUnavailable);
        }
        Ok(SignerInfoRecord { buf })
    }

    pub(crate) fn as_raw(&self) -> &CMSG_SIGNER_INFO {
        unsafe { &*(self.buf.as_ptr() as *const CMSG_SIGNER_INFO) }
    }
}

/// Opens the embedded PKCS#7 signed-data blob of the file at `path` and
/// extracts the signer identity plus any descriptive opus metadata.
///
/// Fails with [`ExtractionError::QueryFailed`] when the file cannot be
/// opened or parsed as a signed object, and with the more specific variants
/// when the signer record or certificate identity cannot be recovered. All
/// native handles are guard-scoped to this call.
pub fn extract_signature_info(path: &str) -> Result<SignatureInfo, ExtractionError> {
    let wide_path = to_wide_null_terminated(path);

    let mut h_store = HCERTSTORE(ptr::null_mut());
    let mut h_msg: *mut std::ffi::c_void = ptr::null_mut();
    let mut encoding = CERT_QUERY_ENCODING_TYPE(0);
    let mut content_type = CERT_QUERY_CONTENT_TYPE(0);
    let mut format_type = CERT_QUERY_FORMAT_TYPE(0);

    let queried = unsafe {
        CryptQueryObject(
            CERT_QUERY_OBJECT_FILE,
            wide_path.as_ptr() as *const std::ffi::c_void,
            CERT_QUERY_CONTENT_FLAG_PKCS7_SIGNED_EMBED,
            CERT_QUERY_FORMAT_FLAG_BINARY,
            0,
            Some(&mut encoding),
            Some(&mut content_type),
            Some(&mut format_type),
            Some(&mut h_store),
            Some(&mut h_msg),
            None,
        )
    };
    if queried.is_err() || h_msg.is_null() || h_store.0.is_null() {
        debug!(path, "file did not open as an embedded signed object");
        return Err(ExtractionError::QueryFailed);
    }

    let store_guard = CertStoreHandle::new(h_store);
    let _msg_guard = CryptMsgHandle::new(h_msg);

    let record = SignerInfoRecord::from_message(h_msg)?;
    let signer = record.as_raw();

    // Informational attribute first; its absence never fails the call.
    let opus = opus_info::program_and_publisher_info(signer);
    let identity = cert_info::certificate_identity(*store_guard, signer)?;

    Ok(SignatureInfo {
        program_name: opus.program_name,
        publisher_link: opus.publisher_link,
        more_info_link: opus.more_info_link,
        serial_number: identity.serial_number,
        issuer_name: identity.issuer_name,
        subject_name: identity.subject_name,
        not_before: filetime_to_datetime(identity.not_before),
        not_after: filetime_to_datetime(identity.not_after),
    })
}
