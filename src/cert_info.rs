//! Signer-certificate lookup and identity extraction.
//!
//! The signer-info record names the certificate only by issuer and serial
//! number; the certificate itself lives in the store that accompanied the
//! signed message. Lookup and name extraction are atomic: either serial,
//! issuer name and subject name all come back, or the inspection fails.

use crate::error::ExtractionError;
use crate::win32_guards::CertContextHandle;
use tracing::{debug, trace};
use windows::Win32::Foundation::FILETIME;
use windows::Win32::Security::Cryptography::*;

/// Identity of the signer certificate, copied into independently owned
/// buffers so nothing borrows from the store after the call returns.
#[derive(Debug)]
pub(crate) struct CertificateIdentity {
    pub serial_number: Vec<u8>,
    pub issuer_name: String,
    pub subject_name: String,
    pub not_before: FILETIME,
    pub not_after: FILETIME,
}

/// Looks up the certificate matching the signer-info issuer and serial
/// number in `store` and extracts its identity.
pub(crate) fn certificate_identity(
    store: HCERTSTORE,
    signer: &CMSG_SIGNER_INFO,
) -> Result<CertificateIdentity, ExtractionError> {
    // CERT_FIND_SUBJECT_CERT keys the search on an Issuer + SerialNumber
    // pair; the blobs keep pointing into the caller's signer-info buffer.
    let mut lookup = CERT_INFO::default();
    lookup.Issuer = signer.Issuer;
    lookup.SerialNumber = signer.SerialNumber;

    let ctx = unsafe {
        CertFindCertificateInStore(
            store,
            X509_ASN_ENCODING | PKCS_7_ASN_ENCODING,
            0,
            CERT_FIND_SUBJECT_CERT,
            Some(&lookup as *const _ as *const _),
            None,
        )
    };
    if ctx.is_null() {
        debug!("no certificate in the message store matches the signer");
        return Err(ExtractionError::SignerCertificateNotFound);
    }
    let ctx = CertContextHandle::new(ctx);

    let cert_info = unsafe { (*ctx.as_ptr()).pCertInfo };
    let serial = unsafe { &(*cert_info).SerialNumber };
    let serial_number = if serial.pbData.is_null() {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(serial.pbData, serial.cbData as usize) }.to_vec()
    };

    // Both names must come back or the whole inspection fails; a partial
    // identity is never returned.
    let issuer_name = simple_display_name(ctx.as_ptr(), CERT_NAME_ISSUER_FLAG)
        .ok_or(ExtractionError::NameUnavailable)?;
    let subject_name =
        simple_display_name(ctx.as_ptr(), 0).ok_or(ExtractionError::NameUnavailable)?;

    trace!(subject = %subject_name, issuer = %issuer_name, "signer certificate resolved");

    Ok(CertificateIdentity {
        serial_number,
        issuer_name,
        subject_name,
        not_before: unsafe { (*cert_info).NotBefore },
        not_after: unsafe { (*cert_info).NotAfter },
    })
}

/// Locale-formatted simple display name of the certificate subject, or of
/// its issuer when `flags` carries `CERT_NAME_ISSUER_FLAG`. Two-phase:
/// query the required length, then fetch into a buffer of exactly that size.
fn simple_display_name(ctx: *const CERT_CONTEXT, flags: u32) -> Option<String> {
    let len = unsafe { CertGetNameStringW(ctx, CERT_NAME_SIMPLE_DISPLAY_TYPE, flags, None, None) };
    if len <= 1 {
        return None;
    }

    let mut buffer = vec![0u16; len as usize];
    let len = unsafe {
        CertGetNameStringW(
            ctx,
            CERT_NAME_SIMPLE_DISPLAY_TYPE,
            flags,
            None,
            Some(buffer.as_mut_slice()),
        )
    };
    if len <= 1 {
        return None;
    }
    buffer.truncate((len - 1) as usize);
    Some(String::from_utf16_lossy(&buffer))
}
