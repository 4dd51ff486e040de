#![no_main]

use libfuzzer_sys::fuzz_target;
use refind_rs_core::config::{GlobalConfig, file::ConfigFile};

fuzz_target!(|data: &[u8]| {
    let mut file = ConfigFile::from_bytes(data);
    let mut config = GlobalConfig::default();
    config.evaluate(&mut file);
});
