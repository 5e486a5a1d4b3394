#![no_main]

use libfuzzer_sys::fuzz_target;
use bright_core::types::Severity;
use bright_scan::ScanState;

fuzz_target!(|data: &[u8]| {
    if let Ok(state) = serde_json::from_slice::<ScanState>(data) {
        // 카운터 합산이 overflow로 패닉하면 안 됨
        let _ = state.total();
        for severity in Severity::DESCENDING {
            let _ = state.count_at_or_above(severity);
        }
        let _ = state.status.is_terminal();
    }
});
