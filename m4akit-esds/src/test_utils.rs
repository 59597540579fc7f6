//! Cookies and logging setup shared by the tests of this crate and its users.
//! Enabled in dependents with the `test-utils` feature.

use crate::{DecodedAudioConfig, DecoderConfig, MagicCookie};
use std::sync::Once;

/// esds body as written by QuickTime for 44.1 kHz stereo AAC LC.
pub const QUICKTIME_LC_COOKIE: [u8; 39] = [
    0x03, 0x80, 0x80, 0x80, 0x22, // ES_Descriptor, size 34
    0x00, 0x00, 0x00, // ES_ID 0, flags 0
    0x04, 0x80, 0x80, 0x80, 0x14, // DecoderConfigDescriptor, size 20
    0x40, 0x15, 0x00, 0x18, 0x00, 0x00, 0x01, 0xf4, 0x00, 0x00, 0x01, 0xf4, 0x00,
    0x05, 0x80, 0x80, 0x80, 0x02, // decSpecificConfig, size 2
    0x12, 0x10, //
    0x06, 0x80, 0x80, 0x80, 0x01, // SLConfigDescriptor
    0x02,
];

/// A complete cookie wrapping the given AudioSpecificConfig bytes verbatim.
pub fn cookie_with_asc(dec_specific_config: &[u8]) -> Vec<u8> {
    MagicCookie {
        es_id: Some(1),
        decoder_config: Some(DecoderConfig::default()),
        dec_specific_config: dec_specific_config.to_vec(),
    }
    .to_bytes()
}

/// A complete cookie for `config`. Panics if the config cannot be encoded.
pub fn cookie_for(config: &DecodedAudioConfig) -> Vec<u8> {
    let asc = config
        .to_bytes()
        .unwrap_or_else(|e| panic!("unencodable test config {config:?}: {e}"));
    cookie_with_asc(&asc)
}

/// Installs a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
