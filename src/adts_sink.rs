use crate::error::{Error, Result};
use crate::sink::{ByteSink, OutputSink, SinkTarget};
use m4akit_esds::adts::{self, AdtsHeader};
use m4akit_esds::{parse_cookie, CookieLayout, DecodedAudioConfig};
use serde::Serialize;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteStats {
    pub frames_written: u64,
    /// Header and payload bytes.
    pub bytes_written: u64,
}

/// Writes raw AAC access units as an ADTS stream.
///
/// The cookie is decoded once when the sink is created; every frame header is
/// rebuilt from that config and the frame's length alone.
pub struct AdtsSink<S: ByteSink> {
    sink: S,
    config: DecodedAudioConfig,
    stats: WriteStats,
}

impl AdtsSink<OutputSink> {
    /// Opens `target` (`-` for stdout) and prepares it for `cookie`'s stream.
    pub fn create(target: &SinkTarget, cookie: &[u8], layout: CookieLayout) -> Result<Self> {
        // Decode and check before touching the filesystem so a bad cookie
        // leaves no file.
        let (_, config) = parse_cookie(cookie, layout)?;
        adts::check_config(&config)?;
        let sink = target.open()?;
        debug!(output = %target, "opened ADTS output");
        Self::with_config(sink, config)
    }
}

impl<S: ByteSink> AdtsSink<S> {
    pub fn new(sink: S, cookie: &[u8], layout: CookieLayout) -> Result<Self> {
        let (_, config) = parse_cookie(cookie, layout)?;
        Self::with_config(sink, config)
    }

    /// Fails with `InvalidAudioConfig` when `config` has no ADTS form, so
    /// that no frame write can fail on it later.
    pub fn with_config(sink: S, config: DecodedAudioConfig) -> Result<Self> {
        let sampling_frequency_index = adts::check_config(&config)?;
        debug!(
            sampling_rate_index = config.sampling_rate_index,
            sampling_frequency_index,
            sampling_rate_hz = config.sampling_rate,
            channel_config = config.channel_config,
            "ADTS sink ready"
        );
        Ok(Self {
            sink,
            config,
            stats: WriteStats::default(),
        })
    }

    pub fn config(&self) -> &DecodedAudioConfig {
        &self.config
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    /// Writes one frame: the 7-byte header, then `payload`.
    ///
    /// A sink failure is returned as [`Error::SinkWrite`]; the stream should be
    /// abandoned after it.
    pub fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        let header = AdtsHeader::new(&self.config, payload.len())?;

        self.sink
            .write_bytes(&header.to_bytes())
            .map_err(Error::SinkWrite)?;
        self.sink.write_bytes(payload).map_err(Error::SinkWrite)?;

        self.stats.frames_written += 1;
        self.stats.bytes_written += header.frame_length() as u64;
        trace!(
            frame = self.stats.frames_written,
            payload_len = payload.len(),
            frame_length = header.frame_length(),
            "wrote ADTS frame"
        );
        Ok(())
    }

    /// Flushes the sink and returns it with the final statistics.
    pub fn finish(mut self) -> Result<(S, WriteStats)> {
        self.sink.flush_bytes().map_err(Error::SinkWrite)?;
        debug!(
            frames = self.stats.frames_written,
            bytes = self.stats.bytes_written,
            "ADTS stream finished"
        );
        Ok((self.sink, self.stats))
    }
}
