use crate::config::GateConfig;
use crate::error::{ExtractionError, TrustStatus};
use crate::policy::PublisherAllowList;
use crate::signer_info::extract_signature_info;
use crate::verification::verify_embedded_signature;
use crate::is_trusted_signed_file;
use std::io::Write;

fn default_allow_list() -> PublisherAllowList {
    GateConfig::default().allow_list()
}

/// Writes a plain unsigned file under the temp directory and returns its path.
fn unsigned_fixture(name: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("signgate-{}-{}", std::process::id(), name));
    let mut file = std::fs::File::create(&path).expect("failed to create unsigned fixture");
    file.write_all(b"just bytes, no signature blob")
        .expect("failed to write unsigned fixture");
    path
}

#[test]
fn nonexistent_path_is_untrusted() {
    let path = r"C:\definitely\missing\signgate-no-such-file.exe";
    assert!(!std::path::Path::new(path).exists());

    assert!(!is_trusted_signed_file(path, &default_allow_list()));
    assert_eq!(
        extract_signature_info(path),
        Err(ExtractionError::QueryFailed)
    );
}

#[test]
fn unsigned_file_is_not_signed_and_untrusted() {
    let path = unsigned_fixture("unsigned.bin");
    let path_str = path.to_str().unwrap();

    assert_eq!(verify_embedded_signature(path_str), TrustStatus::NotSigned);
    assert!(!is_trusted_signed_file(path_str, &default_allow_list()));
    // An unsigned file is not a signed object either.
    assert_eq!(
        extract_signature_info(path_str),
        Err(ExtractionError::QueryFailed)
    );

    let _ = std::fs::remove_file(&path);
}

#[test]
fn catalog_only_system_binary_has_no_embedded_signature() {
    // cmd.exe is catalog-signed on modern Windows; the embedded check must
    // not report success for it.
    let path = r"C:\Windows\System32\cmd.exe";
    if !std::path::Path::new(path).exists() {
        panic!(
            "cmd.exe not found at {}. This test requires a standard Windows install.",
            path
        );
    }

    let status = verify_embedded_signature(path);
    assert_ne!(status, TrustStatus::Success);
    assert!(!is_trusted_signed_file(path, &default_allow_list()));
}

#[test]
fn verification_is_idempotent_for_an_unmodified_file() {
    let path = r"C:\Windows\System32\cmd.exe";
    if !std::path::Path::new(path).exists() {
        panic!(
            "cmd.exe not found at {}. This test requires a standard Windows install.",
            path
        );
    }

    let first = is_trusted_signed_file(path, &default_allow_list());
    let second = is_trusted_signed_file(path, &default_allow_list());
    assert_eq!(first, second);
}

#[test]
fn signed_binary_yields_atomic_certificate_identity() {
    // Path to the Firefox binary (typical install location on Windows)
    let path = r"C:\Program Files\Mozilla Firefox\firefox.exe";
    if !std::path::Path::new(path).exists() {
        panic!(
            "Firefox binary not found at {}. Please install Firefox to run this test.",
            path
        );
    }

    let status = verify_embedded_signature(path);
    assert_eq!(status, TrustStatus::Success, "Firefox signature should verify");

    let info = extract_signature_info(path).expect("extraction should succeed on a signed file");
    // Serial, issuer and subject are populated together or not at all.
    assert!(!info.serial_number.is_empty());
    assert!(!info.issuer_name.is_empty());
    assert!(!info.subject_name.is_empty());
    assert_eq!(info.serial_number_hex().len(), info.serial_number.len() * 2);
}

#[test]
fn allow_listed_publisher_is_trusted_regardless_of_opus_attribute() {
    let path = r"C:\Program Files\Mozilla Firefox\firefox.exe";
    if !std::path::Path::new(path).exists() {
        panic!(
            "Firefox binary not found at {}. Please install Firefox to run this test.",
            path
        );
    }

    let info = extract_signature_info(path).expect("extraction should succeed on a signed file");

    // The decision follows the subject prefix only; the descriptive opus
    // fields are informational and may be absent entirely.
    let matching = PublisherAllowList::new(vec![info.subject_name.clone()]);
    assert!(is_trusted_signed_file(path, &matching));

    let offset_only = PublisherAllowList::new(vec![format!("Not {}", info.subject_name)]);
    assert!(!is_trusted_signed_file(path, &offset_only));
}
