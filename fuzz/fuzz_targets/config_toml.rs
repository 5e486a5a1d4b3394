#![no_main]

use libfuzzer_sys::fuzz_target;
use bright_core::config::BrightConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(config) = BrightConfig::parse(content) {
            let _ = config.validate();
        }
    }
});
