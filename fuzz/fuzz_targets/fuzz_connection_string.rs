#![no_main]

use db_adapter::client::ConnectionInfo;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(info) = ConnectionInfo::parse(s) {
        let _ = info.to_config();
    }
});
