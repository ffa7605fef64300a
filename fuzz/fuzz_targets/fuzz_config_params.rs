#![no_main]

use db_adapter::connection::ConnectionConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|pairs: Vec<(String, String)>| {
    if let Ok(config) = ConnectionConfig::from_params(pairs) {
        assert!(!config.database.is_empty());
    }
});
