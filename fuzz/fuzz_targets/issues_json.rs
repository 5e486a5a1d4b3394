#![no_main]

use libfuzzer_sys::fuzz_target;
use bright_core::types::Issue;
use bright_reporter::{IssuesGrouper, render_table};

fuzz_target!(|data: &[u8]| {
    if let Ok(issues) = serde_json::from_slice::<Vec<Issue>>(data) {
        let groups = IssuesGrouper::group(issues);
        let _ = render_table(&groups);
    }
});
