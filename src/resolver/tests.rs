use super::{normalize_domain, normalize_exchange};
use crate::delivery::DeliveryError;

#[test]
fn normalize_domain_rejects_empty() {
    let err = normalize_domain("  ").expect_err("empty domain should fail");
    assert!(matches!(err, DeliveryError::EmptyDomain));
    let err = normalize_domain(".").expect_err("root only should fail");
    assert!(matches!(err, DeliveryError::EmptyDomain));
}

#[test]
fn normalize_domain_encodes_idna() {
    let ascii = normalize_domain(" Bücher.Example. ").expect("valid domain");
    assert_eq!(ascii, "xn--bcher-kva.example");
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    assert_eq!(normalize_exchange("Mail.EXAMPLE.com."), "mail.example.com");
}
