use crate::audio_specific_config::{
    index_for_sampling_rate, DecodedAudioConfig, ESCAPE_SAMPLING_INDEX,
};
use crate::error::{Error, Result};
use bytes::BufMut;
use std::io::{self, Write};

pub const HEADER_LEN: usize = 7;
/// aac_frame_length is 13 bits and counts the header itself.
pub const MAX_FRAME_LENGTH: usize = 0x1fff;
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LENGTH - HEADER_LEN;

/// Highest samplingFrequencyIndex with a meaning in ADTS. There is no
/// explicit-rate escape in ADTS.
const MAX_SAMPLING_INDEX: u8 = 12;
const MAX_CHANNEL_CONFIG: u8 = 7;

/// ADTS profile is audioObjectType - 1; always AAC LC here.
const PROFILE_LC: u8 = 1;

/// Header template: syncword 0xfff, MPEG-4, layer 0, no CRC,
/// buffer fullness 0x7ff (VBR), one raw data block.
const TEMPLATE: [u8; HEADER_LEN] = [0xff, 0xf1, 0x00, 0x00, 0x00, 0x1f, 0xfc];

/// A fixed + variable ADTS header without CRC.
///
/// ```text
/// byte 2: profile(2) sampling_frequency_index(4) private(1) channel_config[2]
/// byte 3: channel_config[1..0] orig home copy_id copy_start frame_length[12..11]
/// byte 4: frame_length[10..3]
/// byte 5: frame_length[2..0] buffer_fullness[10..6]
/// byte 6: buffer_fullness[5..0] raw_data_blocks(2)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdtsHeader {
    sampling_frequency_index: u8,
    channel_config: u8,
    frame_length: u16,
}

impl AdtsHeader {
    pub fn new(config: &DecodedAudioConfig, payload_len: usize) -> Result<Self> {
        let sampling_frequency_index = check_config(config)?;

        let frame_length = payload_len + HEADER_LEN;
        if frame_length > MAX_FRAME_LENGTH {
            return Err(Error::FrameTooLarge { frame_length });
        }

        Ok(Self {
            sampling_frequency_index,
            channel_config: config.channel_config,
            frame_length: frame_length as u16,
        })
    }

    /// Total frame length, header included.
    pub fn frame_length(&self) -> usize {
        self.frame_length as usize
    }

    pub fn payload_len(&self) -> usize {
        self.frame_length as usize - HEADER_LEN
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut adts = TEMPLATE;
        let len = self.frame_length;

        adts[2] |= PROFILE_LC << 6;
        adts[2] |= self.sampling_frequency_index << 2;
        adts[2] |= (self.channel_config & 4) >> 2;
        adts[3] |= (self.channel_config & 3) << 6;
        adts[3] |= (len >> 11) as u8;
        adts[4] |= ((len >> 3) & 0xff) as u8;
        adts[5] |= ((len & 7) << 5) as u8;
        adts
    }

    pub fn put<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.to_bytes());
    }

    pub fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }
}

/// Checks that `config` can be framed as ADTS and returns the
/// sampling_frequency_index to put in the header.
///
/// An explicit (escape-coded) rate is accepted when it equals a tabulated
/// rate, and is framed with that table index.
pub fn check_config(config: &DecodedAudioConfig) -> Result<u8> {
    let index = match config.sampling_rate_index {
        index if index <= MAX_SAMPLING_INDEX => index,
        ESCAPE_SAMPLING_INDEX => index_for_sampling_rate(config.sampling_rate).ok_or_else(|| {
            Error::invalid_audio_config(format!(
                "explicit sampling rate {} Hz cannot be carried in ADTS",
                config.sampling_rate
            ))
        })?,
        index => {
            return Err(Error::invalid_audio_config(format!(
                "sampling frequency index {} cannot be carried in ADTS",
                index
            )))
        }
    };
    if config.channel_config > MAX_CHANNEL_CONFIG {
        return Err(Error::invalid_audio_config(format!(
            "channel configuration {} does not fit in 3 bits",
            config.channel_config
        )));
    }
    Ok(index)
}

/// Builds one complete ADTS frame: header followed by `payload`.
pub fn frame(config: &DecodedAudioConfig, payload: &[u8]) -> Result<Vec<u8>> {
    let header = AdtsHeader::new(config, payload.len())?;
    let mut out = Vec::with_capacity(header.frame_length());
    header.put(&mut out);
    out.extend_from_slice(payload);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adts_reader::{AdtsHeader as ReferenceHeader, ProtectionIndicator};

    fn lc(index: u8, channel_config: u8) -> DecodedAudioConfig {
        DecodedAudioConfig {
            object_type: 2,
            sampling_rate_index: index,
            sampling_rate: 0,
            channel_config,
        }
    }

    #[test]
    fn stereo_44100_with_200_byte_payload() {
        let config = DecodedAudioConfig::decode(&[0x12, 0x10]).unwrap();
        let header = AdtsHeader::new(&config, 200).unwrap();
        assert_eq!(header.frame_length(), 207);
        // 207 = 0b000_0011001_111
        assert_eq!(
            header.to_bytes(),
            [0xff, 0xf1, 0x50, 0x80, 0x19, 0xff, 0xfc]
        );
    }

    #[test]
    fn reference_parser_agrees() {
        for index in 0..=12u8 {
            for channel_config in 0..=7u8 {
                for payload_len in [0usize, 1, 200, 2047, MAX_PAYLOAD_LEN] {
                    let payload = vec![0xa5; payload_len];
                    let bytes = frame(&lc(index, channel_config), &payload).unwrap();
                    let parsed = ReferenceHeader::from_bytes(&bytes).unwrap();

                    assert_eq!(parsed.sampling_frequency() as u8, index);
                    assert_eq!(parsed.channel_configuration() as u8, channel_config);
                    assert_eq!(parsed.frame_length() as usize, payload_len + HEADER_LEN);
                    assert_eq!(parsed.protection(), ProtectionIndicator::CrcAbsent);
                    assert_eq!(parsed.payload().unwrap(), &payload[..]);
                }
            }
        }
    }

    #[test]
    fn fixed_fields_and_buffer_fullness() {
        let bytes = AdtsHeader::new(&lc(3, 1), 10).unwrap().to_bytes();
        assert_eq!(u16::from(bytes[0]) << 4 | u16::from(bytes[1] >> 4), 0xfff);
        assert_eq!(bytes[1] & 0x08, 0, "MPEG-4");
        assert_eq!(bytes[1] & 0x06, 0, "layer");
        assert_eq!(bytes[2] >> 6, PROFILE_LC);
        let fullness = u16::from(bytes[5] & 0x1f) << 6 | u16::from(bytes[6] >> 2);
        assert_eq!(fullness, 0x7ff);
        assert_eq!(bytes[6] & 0x03, 0);
    }

    #[test]
    fn rejects_values_without_adts_form() {
        for index in [13u8, 14, 15] {
            assert!(matches!(
                AdtsHeader::new(&lc(index, 2), 10),
                Err(Error::InvalidAudioConfig(_))
            ));
        }
        assert!(matches!(
            AdtsHeader::new(&lc(4, 8), 10),
            Err(Error::InvalidAudioConfig(_))
        ));
    }

    #[test]
    fn tabulated_explicit_rate_uses_table_index() {
        let config = DecodedAudioConfig::decode(&[0x17, 0x80, 0x56, 0x22, 0x10]).unwrap();
        assert_eq!(config.sampling_rate_index, ESCAPE_SAMPLING_INDEX);

        let bytes = frame(&config, &[0; 16]).unwrap();
        let parsed = ReferenceHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.sampling_frequency() as u8, 4);
        assert_eq!(parsed.channel_configuration() as u8, 2);
        assert_eq!(check_config(&config), Ok(4));

        let untabulated = DecodedAudioConfig::for_rate(2, 50000, 2);
        assert!(matches!(
            check_config(&untabulated),
            Err(Error::InvalidAudioConfig(_))
        ));
    }

    #[test]
    fn rejects_oversized_frames() {
        assert!(AdtsHeader::new(&lc(4, 2), MAX_PAYLOAD_LEN).is_ok());
        assert_eq!(
            AdtsHeader::new(&lc(4, 2), MAX_PAYLOAD_LEN + 1),
            Err(Error::FrameTooLarge {
                frame_length: MAX_FRAME_LENGTH + 1
            })
        );
    }

    #[test]
    fn encode_writes_seven_bytes() {
        let header = AdtsHeader::new(&lc(4, 2), 5).unwrap();
        let mut out = Vec::new();
        header.encode(&mut out).unwrap();
        assert_eq!(out.len(), HEADER_LEN);
        assert_eq!(header.payload_len(), 5);
    }
}
