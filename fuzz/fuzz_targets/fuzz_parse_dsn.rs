#![no_main]

use dbsql_wire::client::ConnectionInfo;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(dsn) = std::str::from_utf8(data) {
        if let Ok(info) = ConnectionInfo::parse(dsn) {
            let config = info.to_config();
            assert!(!config.host.is_empty());
        }
    }
});
