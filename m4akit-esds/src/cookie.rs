//! The AAC "magic cookie" handed out by QuickTime-style encoders is an esds
//! descriptor sequence. Only the decSpecificConfig payload is needed to set up
//! a track; the wrapper descriptors are skipped.

use crate::descriptor::{
    write_header, DescriptorReader, DECODER_CONFIG_DESCRIPTOR_TAG, DEC_SPECIFIC_INFO_TAG,
    ES_DESCRIPTOR_TAG,
};
use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// ES_ID:16, flags:3, streamPriority:5
const ES_DESCRIPTOR_FIXED_LEN: usize = 3;
/// objectTypeIndication:8, streamType:6, upStream:1, reserved:1,
/// bufferSizeDB:24, maxBitrate:32, avgBitrate:32
const DECODER_CONFIG_FIXED_LEN: usize = 13;

const STREAM_DEPENDENCE_FLAG: u8 = 0x80;
const URL_FLAG: u8 = 0x40;
const OCR_STREAM_FLAG: u8 = 0x20;

/// MPEG-4 Audio objectTypeIndication in a DecoderConfigDescriptor.
pub const MPEG4_AUDIO_OBJECT_TYPE_INDICATION: u8 = 0x40;
/// AudioStream streamType.
pub const AUDIO_STREAM_TYPE: u8 = 0x05;

/// How the ES_Descriptor body is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieLayout {
    /// Skip a fixed 3-byte ES_Descriptor body. Encoders that produce AAC
    /// cookies always clear the optional-field flags.
    #[default]
    Fixed,
    /// Honour the streamDependence, URL and OCRstream flags and skip the
    /// optional fields they announce.
    Flagged,
}

/// Values carried by the DecoderConfigDescriptor.
///
/// Encoders often write placeholder bitrates here; muxers recompute them from
/// the real stream when the file is finalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    pub object_type_indication: u8,
    pub stream_type: u8,
    pub up_stream: bool,
    pub buffer_size_db: u32,
    pub max_bitrate: u32,
    pub avg_bitrate: u32,
}

impl DecoderConfig {
    fn parse(body: &[u8]) -> Self {
        Self {
            object_type_indication: body[0],
            stream_type: body[1] >> 2,
            up_stream: body[1] & 0x02 != 0,
            buffer_size_db: BigEndian::read_u24(&body[2..5]),
            max_bitrate: BigEndian::read_u32(&body[5..9]),
            avg_bitrate: BigEndian::read_u32(&body[9..13]),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        let mut body = [0u8; DECODER_CONFIG_FIXED_LEN];
        body[0] = self.object_type_indication;
        body[1] = (self.stream_type << 2) | (u8::from(self.up_stream) << 1) | 0x01;
        BigEndian::write_u24(&mut body[2..5], self.buffer_size_db);
        BigEndian::write_u32(&mut body[5..9], self.max_bitrate);
        BigEndian::write_u32(&mut body[9..13], self.avg_bitrate);
        out.extend_from_slice(&body);
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            object_type_indication: MPEG4_AUDIO_OBJECT_TYPE_INDICATION,
            stream_type: AUDIO_STREAM_TYPE,
            up_stream: false,
            buffer_size_db: 0,
            max_bitrate: 0,
            avg_bitrate: 0,
        }
    }
}

/// Everything a magic cookie says about the elementary stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicCookie {
    pub es_id: Option<u16>,
    pub decoder_config: Option<DecoderConfig>,
    /// The raw AudioSpecificConfig, copied out of the cookie.
    pub dec_specific_config: Vec<u8>,
}

impl MagicCookie {
    /// Walks the descriptor sequence up to the first decSpecificConfig.
    ///
    /// Fails with [`Error::MalformedCookie`] if the sequence ends first, or
    /// if any descriptor claims more bytes than the cookie holds.
    pub fn parse(cookie: &[u8], layout: CookieLayout) -> Result<Self> {
        let mut reader = DescriptorReader::new(cookie);
        let mut es_id = None;
        let mut decoder_config = None;

        while let Some(header) = reader.read_header()? {
            trace!(
                tag = header.tag,
                size = header.size,
                offset = reader.position(),
                "descriptor"
            );
            match header.tag {
                ES_DESCRIPTOR_TAG => {
                    let body = reader.take(ES_DESCRIPTOR_FIXED_LEN)?;
                    es_id = Some(BigEndian::read_u16(&body[..2]));
                    let flags = body[2];
                    match layout {
                        CookieLayout::Fixed => {
                            if flags & (STREAM_DEPENDENCE_FLAG | URL_FLAG | OCR_STREAM_FLAG) != 0 {
                                warn!(flags, "ES_Descriptor optional fields present but not skipped");
                            }
                        }
                        CookieLayout::Flagged => skip_optional_es_fields(&mut reader, flags)?,
                    }
                }
                DECODER_CONFIG_DESCRIPTOR_TAG => {
                    let body = reader.take(DECODER_CONFIG_FIXED_LEN)?;
                    decoder_config = Some(DecoderConfig::parse(body));
                }
                DEC_SPECIFIC_INFO_TAG => {
                    let dec_specific_config = reader.take(header.size as usize)?.to_vec();
                    debug!(
                        es_id,
                        config_len = dec_specific_config.len(),
                        "found decSpecificConfig"
                    );
                    return Ok(Self {
                        es_id,
                        decoder_config,
                        dec_specific_config,
                    });
                }
                _ => reader.skip(header.size as usize)?,
            }
        }

        Err(Error::malformed_cookie(
            "descriptor sequence ended without a decSpecificConfig",
        ))
    }

    /// Serialises an esds body: ES_Descriptor wrapping a
    /// DecoderConfigDescriptor, the decSpecificConfig and an SLConfig
    /// descriptor, all with zeroed ES_Descriptor flags.
    pub fn to_bytes(&self) -> Vec<u8> {
        let decoder_config = self.decoder_config.unwrap_or_default();
        let asc_len = self.dec_specific_config.len() as u32;

        let mut dec_specific = Vec::new();
        write_header(DEC_SPECIFIC_INFO_TAG, asc_len, &mut dec_specific);
        dec_specific.extend_from_slice(&self.dec_specific_config);

        let mut decoder = Vec::new();
        write_header(
            DECODER_CONFIG_DESCRIPTOR_TAG,
            (DECODER_CONFIG_FIXED_LEN + dec_specific.len()) as u32,
            &mut decoder,
        );
        decoder_config.write(&mut decoder);
        decoder.extend_from_slice(&dec_specific);

        // SLConfigDescriptor, predefined = 2 (MP4 file)
        let sl_config = [0x06, 0x01, 0x02];

        let mut out = Vec::new();
        write_header(
            ES_DESCRIPTOR_TAG,
            (ES_DESCRIPTOR_FIXED_LEN + decoder.len() + sl_config.len()) as u32,
            &mut out,
        );
        out.extend_from_slice(&self.es_id.unwrap_or(0).to_be_bytes());
        out.push(0);
        out.extend_from_slice(&decoder);
        out.extend_from_slice(&sl_config);
        out
    }
}

fn skip_optional_es_fields(reader: &mut DescriptorReader<'_>, flags: u8) -> Result<()> {
    if flags & STREAM_DEPENDENCE_FLAG != 0 {
        // dependsOn_ES_ID
        reader.skip(2)?;
    }
    if flags & URL_FLAG != 0 {
        let len = reader.take(1)?[0];
        reader.skip(len as usize)?;
    }
    if flags & OCR_STREAM_FLAG != 0 {
        // OCR_ES_Id
        reader.skip(2)?;
    }
    Ok(())
}

/// Returns the AudioSpecificConfig carried by an AAC magic cookie.
pub fn extract_dec_specific_config(cookie: &[u8]) -> Result<Vec<u8>> {
    MagicCookie::parse(cookie, CookieLayout::Fixed).map(|c| c.dec_specific_config)
}
