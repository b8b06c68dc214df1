//! Decoding of the optional publisher-description authenticated attribute
//! (`SPC_SP_OPUS_INFO`, OID 1.3.6.1.4.1.311.2.1.12).
//!
//! The attribute is purely informational and never consulted by policy, so
//! absence, decode failures and unrecognized link variants all yield empty
//! fields rather than errors.

use tracing::trace;
use windows::Win32::Security::Cryptography::*;
use windows::Win32::Security::WinTrust::{
    SPC_FILE_LINK_CHOICE, SPC_LINK, SPC_SP_OPUS_INFO, SPC_SP_OPUS_INFO_OBJID, SPC_URL_LINK_CHOICE,
};

/// Descriptive metadata recovered from the signer's authenticated attributes.
#[derive(Debug, Default)]
pub(crate) struct OpusFields {
    pub program_name: Option<String>,
    pub publisher_link: Option<String>,
    pub more_info_link: Option<String>,
}

/// Scans the signer's authenticated attributes for the opus-info attribute
/// and decodes it. Returns all-empty fields when the attribute is absent or
/// cannot be decoded.
pub(crate) fn program_and_publisher_info(signer: &CMSG_SIGNER_INFO) -> OpusFields {
    if signer.AuthAttrs.cAttr == 0 || signer.AuthAttrs.rgAttr.is_null() {
        return OpusFields::default();
    }

    let attrs = unsafe {
        std::slice::from_raw_parts(signer.AuthAttrs.rgAttr, signer.AuthAttrs.cAttr as usize)
    };
    for attr in attrs {
        if attr.pszObjId.is_null()
            || unsafe { attr.pszObjId.as_bytes() } != unsafe { SPC_SP_OPUS_INFO_OBJID.as_bytes() }
        {
            continue;
        }
        if attr.cValue == 0 || attr.rgValue.is_null() {
            break;
        }
        let value = unsafe { &*attr.rgValue };
        if value.pbData.is_null() || value.cbData == 0 {
            break;
        }
        let encoded =
            unsafe { std::slice::from_raw_parts(value.pbData, value.cbData as usize) };
        return decode_opus_info(encoded);
    }

    trace!("no opus-info attribute on signer");
    OpusFields::default()
}

/// Two-phase decode of the DER-encoded attribute value: size query first,
/// then decode into a buffer of exactly that size.
fn decode_opus_info(encoded: &[u8]) -> OpusFields {
    let mut len = 0u32;
    let sized = unsafe {
        CryptDecodeObject(
            X509_ASN_ENCODING | PKCS_7_ASN_ENCODING,
            SPC_SP_OPUS_INFO_OBJID,
            encoded,
            CRYPT_DECODE_OBJECT_FLAGS(0),
            None,
            &mut len,
        )
    };
    if sized.is_err() || len == 0 {
        return OpusFields::default();
    }

    let mut buf = vec![0u8; len as usize];
    let decoded = unsafe {
        CryptDecodeObject(
            X509_ASN_ENCODING | PKCS_7_ASN_ENCODING,
            SPC_SP_OPUS_INFO_OBJID,
            encoded,
            CRYPT_DECODE_OBJECT_FLAGS(0),
            Some(buf.as_mut_ptr() as *mut _),
            &mut len,
        )
    };
    if decoded.is_err() {
        return OpusFields::default();
    }

    let info = unsafe { &*(buf.as_ptr() as *const SPC_SP_OPUS_INFO) };
    OpusFields {
        program_name: if info.pwszProgramName.is_null() {
            None
        } else {
            unsafe { info.pwszProgramName.to_string().ok() }
        },
        publisher_link: link_target(info.pPublisherInfo),
        more_info_link: link_target(info.pMoreInfo),
    }
}

/// Resolves the tagged URL-or-file choice of an `SPC_LINK`. An unrecognized
/// choice tag yields an empty field, not an error.
fn link_target(link: *mut SPC_LINK) -> Option<String> {
    if link.is_null() {
        return None;
    }
    let link = unsafe { &*link };
    match link.dwLinkChoice {
        SPC_URL_LINK_CHOICE => unsafe { link.Anonymous.pwszUrl.to_string().ok() },
        SPC_FILE_LINK_CHOICE => unsafe { link.Anonymous.pwszFile.to_string().ok() },
        _ => None,
    }
}
