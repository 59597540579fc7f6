use crate::error::Result;
use m4akit_esds::cookie::MPEG4_AUDIO_OBJECT_TYPE_INDICATION;
use m4akit_esds::{parse_cookie, CookieLayout, DecodedAudioConfig};
use serde::Serialize;
use tracing::debug;

/// Samples per AAC LC access unit.
pub const AAC_FRAME_SAMPLES: u32 = 1024;

/// The values an MP4 muxer needs to create an AAC audio track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mp4TrackSetup {
    /// Movie and media time scale, equal to the sampling rate.
    pub time_scale: u32,
    /// Duration of each sample (access unit) in `time_scale` units.
    pub sample_duration: u32,
    pub object_type_indication: u8,
    /// AudioSampleEntry channel count. ISO/IEC 14496-12 only allows 1 or 2
    /// here; the real layout travels in `es_configuration`.
    pub channel_count: u16,
    /// AudioSpecificConfig, stored verbatim as the track's decoder specific info.
    pub es_configuration: Vec<u8>,
    pub audio_config: DecodedAudioConfig,
}

impl Mp4TrackSetup {
    pub fn from_cookie(cookie: &[u8], layout: CookieLayout) -> Result<Self> {
        let (es_configuration, audio_config) = parse_cookie(cookie, layout)?;
        let setup = Self {
            time_scale: audio_config.sampling_rate,
            sample_duration: AAC_FRAME_SAMPLES,
            object_type_indication: MPEG4_AUDIO_OBJECT_TYPE_INDICATION,
            channel_count: if audio_config.channel_config == 1 { 1 } else { 2 },
            es_configuration,
            audio_config,
        };
        debug!(
            time_scale = setup.time_scale,
            channel_count = setup.channel_count,
            es_configuration_len = setup.es_configuration.len(),
            "MP4 track setup"
        );
        Ok(setup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{cookie_for, lc_cookie};

    #[test]
    fn stereo_track_from_quicktime_cookie() {
        let setup = Mp4TrackSetup::from_cookie(&lc_cookie(), CookieLayout::Fixed).unwrap();
        assert_eq!(setup.time_scale, 44100);
        assert_eq!(setup.sample_duration, 1024);
        assert_eq!(setup.object_type_indication, 0x40);
        assert_eq!(setup.channel_count, 2);
        assert_eq!(setup.es_configuration, vec![0x12, 0x10]);
    }

    #[test]
    fn channel_count_is_one_or_two() {
        for (channel_config, expected) in [(0u8, 2u16), (1, 1), (2, 2), (6, 2), (7, 2)] {
            let config = DecodedAudioConfig::for_rate(2, 48000, channel_config);
            let setup = Mp4TrackSetup::from_cookie(&cookie_for(&config), CookieLayout::Fixed)
                .unwrap();
            assert_eq!(setup.channel_count, expected, "config {channel_config}");
            assert_eq!(setup.audio_config.channel_config, channel_config);
        }
    }

    #[test]
    fn explicit_rate_sets_time_scale() {
        let config = DecodedAudioConfig::for_rate(2, 50000, 2);
        let setup = Mp4TrackSetup::from_cookie(&cookie_for(&config), CookieLayout::Fixed).unwrap();
        assert_eq!(setup.time_scale, 50000);
        assert_eq!(setup.es_configuration.len(), 5);
    }
}
