//! Reads the AAC magic cookie (an MPEG-4 esds descriptor sequence), decodes
//! its AudioSpecificConfig and synthesizes per-frame ADTS headers.

pub mod adts;
pub mod audio_specific_config;
pub mod bits;
pub mod cookie;
pub mod descriptor;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adts::AdtsHeader;
pub use audio_specific_config::{sampling_rate_for_index, DecodedAudioConfig};
pub use cookie::{extract_dec_specific_config, CookieLayout, DecoderConfig, MagicCookie};
pub use descriptor::{DescriptorHeader, DescriptorReader};
pub use error::{Error, Result};

/// Extracts and decodes the AudioSpecificConfig of an AAC magic cookie.
///
/// Returns the raw config bytes, which a container stores verbatim, together
/// with the decoded fields.
pub fn parse_cookie(
    cookie: &[u8],
    layout: CookieLayout,
) -> Result<(Vec<u8>, DecodedAudioConfig)> {
    let cookie = MagicCookie::parse(cookie, layout)?;
    let decoded = DecodedAudioConfig::decode(&cookie.dec_specific_config)?;
    Ok((cookie.dec_specific_config, decoded))
}
