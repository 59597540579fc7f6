pub mod adts_sink;
pub mod config;
pub mod error;
pub mod mp4_track;
pub mod sink;

pub use adts_sink::{AdtsSink, WriteStats};
pub use config::Config;
pub use error::{Error, Result};
pub use m4akit_esds as esds;
pub use m4akit_esds::{CookieLayout, DecodedAudioConfig};
pub use mp4_track::Mp4TrackSetup;
pub use sink::{ByteSink, OutputSink, SinkTarget};

#[cfg(test)]
pub(crate) mod test_utils {
    pub use m4akit_esds::test_utils::{cookie_for, cookie_with_asc, init_tracing};

    pub fn lc_cookie() -> Vec<u8> {
        m4akit_esds::test_utils::QUICKTIME_LC_COOKIE.to_vec()
    }
}
