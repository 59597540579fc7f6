use crate::bits::{read_bits, write_bits};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// samplingFrequencyIndex value announcing an explicit 24-bit rate.
pub const ESCAPE_SAMPLING_INDEX: u8 = 0x0f;

const SAMPLING_RATES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

// Bit positions within the AudioSpecificConfig.
const OBJECT_TYPE_BITS: u32 = 5;
const INDEX_OFFSET: usize = 5;
const INDEX_BITS: u32 = 4;
const EXPLICIT_RATE_OFFSET: usize = 9;
const EXPLICIT_RATE_BITS: u32 = 24;
const CHANNEL_BITS: u32 = 4;

/// Length in bytes needed to reach the end of the channel configuration.
const MIN_LEN: usize = 2;
const MIN_LEN_ESCAPE: usize = MIN_LEN + 3;

/// Sampling rate for a tabulated samplingFrequencyIndex. Indices 13 and 14
/// are reserved and 15 is the escape code, none of which has a table entry.
pub fn sampling_rate_for_index(index: u8) -> Result<u32> {
    SAMPLING_RATES
        .get(index as usize)
        .copied()
        .ok_or_else(|| {
            Error::invalid_audio_config(format!(
                "sampling frequency index {} has no tabulated rate",
                index
            ))
        })
}

/// Table index for an exact sampling rate, if it has one.
pub fn index_for_sampling_rate(rate: u32) -> Option<u8> {
    SAMPLING_RATES
        .iter()
        .position(|&r| r == rate)
        .map(|i| i as u8)
}

/// The fields of an MPEG-4 AudioSpecificConfig that drive container setup
/// and ADTS framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedAudioConfig {
    /// audioObjectType, e.g. 2 for AAC LC. Informational only.
    pub object_type: u8,
    /// samplingFrequencyIndex as coded; 0x0f when the rate is explicit.
    pub sampling_rate_index: u8,
    pub sampling_rate: u32,
    pub channel_config: u8,
}

impl DecodedAudioConfig {
    /// Decodes the leading fields of an AudioSpecificConfig payload.
    ///
    /// ```text
    /// audioObjectType          5
    /// samplingFrequencyIndex   4
    /// samplingFrequency       24   only if index == 0xf
    /// channelConfiguration     4
    /// ```
    pub fn decode(config: &[u8]) -> Result<Self> {
        if config.len() < MIN_LEN {
            return Err(Error::invalid_audio_config(format!(
                "need at least {} bytes, got {}",
                MIN_LEN,
                config.len()
            )));
        }

        let object_type = read_bits(config, 0, OBJECT_TYPE_BITS)? as u8;
        let sampling_rate_index = read_bits(config, INDEX_OFFSET, INDEX_BITS)? as u8;

        let (sampling_rate, channel_offset) = if sampling_rate_index == ESCAPE_SAMPLING_INDEX {
            if config.len() < MIN_LEN_ESCAPE {
                return Err(Error::invalid_audio_config(format!(
                    "explicit sampling rate needs {} bytes, got {}",
                    MIN_LEN_ESCAPE,
                    config.len()
                )));
            }
            let rate = read_bits(config, EXPLICIT_RATE_OFFSET, EXPLICIT_RATE_BITS)?;
            (rate, EXPLICIT_RATE_OFFSET + EXPLICIT_RATE_BITS as usize)
        } else {
            (
                sampling_rate_for_index(sampling_rate_index)?,
                EXPLICIT_RATE_OFFSET,
            )
        };

        let channel_config = read_bits(config, channel_offset, CHANNEL_BITS)? as u8;

        let decoded = Self {
            object_type,
            sampling_rate_index,
            sampling_rate,
            channel_config,
        };
        debug!(
            object_type,
            sampling_rate_index,
            sampling_rate_hz = sampling_rate,
            channel_config,
            "decoded AudioSpecificConfig"
        );
        Ok(decoded)
    }

    /// Builds a config for `sampling_rate`, using the table index when the
    /// rate is tabulated and the escape form otherwise.
    pub fn for_rate(object_type: u8, sampling_rate: u32, channel_config: u8) -> Self {
        let sampling_rate_index =
            index_for_sampling_rate(sampling_rate).unwrap_or(ESCAPE_SAMPLING_INDEX);
        Self {
            object_type,
            sampling_rate_index,
            sampling_rate,
            channel_config,
        }
    }

    /// Re-encodes the fields into an AudioSpecificConfig prefix: two bytes,
    /// or five on the escape path. Trailing GASpecificConfig bits are zero.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.object_type > 30 {
            return Err(Error::invalid_audio_config(format!(
                "object type {} needs the extended escape form",
                self.object_type
            )));
        }
        if self.channel_config > 0x0f {
            return Err(Error::invalid_audio_config(format!(
                "channel configuration {} does not fit in 4 bits",
                self.channel_config
            )));
        }

        let escape = self.sampling_rate_index == ESCAPE_SAMPLING_INDEX;
        let mut out = vec![0u8; if escape { MIN_LEN_ESCAPE } else { MIN_LEN }];
        write_bits(&mut out, 0, OBJECT_TYPE_BITS, u32::from(self.object_type));
        write_bits(
            &mut out,
            INDEX_OFFSET,
            INDEX_BITS,
            u32::from(self.sampling_rate_index),
        );

        let channel_offset = if escape {
            if self.sampling_rate >= 1 << EXPLICIT_RATE_BITS {
                return Err(Error::invalid_audio_config(format!(
                    "sampling rate {} does not fit in 24 bits",
                    self.sampling_rate
                )));
            }
            write_bits(
                &mut out,
                EXPLICIT_RATE_OFFSET,
                EXPLICIT_RATE_BITS,
                self.sampling_rate,
            );
            EXPLICIT_RATE_OFFSET + EXPLICIT_RATE_BITS as usize
        } else {
            let tabulated = sampling_rate_for_index(self.sampling_rate_index)?;
            if tabulated != self.sampling_rate {
                return Err(Error::invalid_audio_config(format!(
                    "index {} means {} Hz, not {} Hz",
                    self.sampling_rate_index, tabulated, self.sampling_rate
                )));
            }
            EXPLICIT_RATE_OFFSET
        };

        write_bits(
            &mut out,
            channel_offset,
            CHANNEL_BITS,
            u32::from(self.channel_config),
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lc_stereo_44100() {
        let config = DecodedAudioConfig::decode(&[0x12, 0x10]).unwrap();
        assert_eq!(
            config,
            DecodedAudioConfig {
                object_type: 2,
                sampling_rate_index: 4,
                sampling_rate: 44100,
                channel_config: 2,
            }
        );
    }

    #[test]
    fn every_tabulated_index_maps_to_its_rate() {
        for (index, &rate) in SAMPLING_RATES.iter().enumerate() {
            // object type 2, channel config 1
            let b0 = (2 << 3) | (index as u8 >> 1);
            let b1 = ((index as u8 & 1) << 7) | (1 << 3);
            let config = DecodedAudioConfig::decode(&[b0, b1]).unwrap();
            assert_eq!(config.sampling_rate_index as usize, index);
            assert_eq!(config.sampling_rate, rate);
            assert_eq!(config.channel_config, 1);
        }
    }

    #[test]
    fn index_12_is_7350() {
        assert_eq!(sampling_rate_for_index(12).unwrap(), 7350);
    }

    #[test]
    fn reserved_indices_are_rejected() {
        for index in [13u8, 14] {
            let b0 = (2 << 3) | (index >> 1);
            let b1 = (index & 1) << 7;
            let err = DecodedAudioConfig::decode(&[b0, b1]).unwrap_err();
            assert!(matches!(err, Error::InvalidAudioConfig(_)), "{index}");
        }
        assert!(sampling_rate_for_index(ESCAPE_SAMPLING_INDEX).is_err());
    }

    #[test]
    fn escape_path_reads_explicit_rate() {
        // object type 2, index 0xf, rate 0x00ac44, channel config 2
        let payload = [0x17, 0x80, 0x56, 0x22, 0x10];
        let config = DecodedAudioConfig::decode(&payload).unwrap();
        assert_eq!(config.sampling_rate_index, ESCAPE_SAMPLING_INDEX);
        assert_eq!(config.sampling_rate, 44100);
        assert_eq!(config.channel_config, 2);
    }

    #[test]
    fn escape_path_matches_byte_formula() {
        let p = [0x17u8, 0xab, 0xcd, 0xef, 0xb8];
        let expected = (u32::from(p[1]) & 0x7f) << 17
            | u32::from(p[2]) << 9
            | u32::from(p[3]) << 1
            | u32::from(p[4]) >> 7;
        let config = DecodedAudioConfig::decode(&p).unwrap();
        assert_eq!(config.sampling_rate, expected);
        // channel configuration sits three bytes later than usual
        assert_eq!(config.channel_config, (p[4] >> 3) & 0xf);
    }

    #[test]
    fn short_payloads_are_rejected() {
        assert!(matches!(
            DecodedAudioConfig::decode(&[0x12]),
            Err(Error::InvalidAudioConfig(_))
        ));
        assert!(matches!(
            DecodedAudioConfig::decode(&[0x17, 0x80, 0x56, 0x22]),
            Err(Error::InvalidAudioConfig(_))
        ));
    }

    #[test]
    fn encodes_tabulated_and_explicit_rates() {
        let lc = DecodedAudioConfig::for_rate(2, 44100, 2);
        assert_eq!(lc.to_bytes().unwrap(), vec![0x12, 0x10]);

        let odd = DecodedAudioConfig::for_rate(2, 44100 + 1, 1);
        assert_eq!(odd.sampling_rate_index, ESCAPE_SAMPLING_INDEX);
        let bytes = odd.to_bytes().unwrap();
        assert_eq!(bytes.len(), 5);
        assert_eq!(DecodedAudioConfig::decode(&bytes).unwrap(), odd);
    }

    #[test]
    fn encode_rejects_inconsistent_rate() {
        let config = DecodedAudioConfig {
            object_type: 2,
            sampling_rate_index: 4,
            sampling_rate: 48000,
            channel_config: 2,
        };
        assert!(config.to_bytes().is_err());
    }
}
