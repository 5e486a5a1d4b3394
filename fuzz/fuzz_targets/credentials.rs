#![no_main]

use libfuzzer_sys::fuzz_target;
use bright_core::credentials::{Credentials, redact_token};

fuzz_target!(|token: &str| {
    let redacted = redact_token(token);
    assert!(redacted.ends_with("***REDACTED***"));

    if let Ok(credentials) = Credentials::new(token) {
        assert_eq!(credentials.token(), token);
        assert!(!format!("{credentials:?}").contains(token));
    }
});
