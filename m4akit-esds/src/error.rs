use thiserror::Error;

/// Errors produced while reading a magic cookie or building ADTS headers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The cookie is not a well-formed esds descriptor sequence, or it never
    /// carries a `decSpecificConfig`.
    #[error("malformed magic cookie: {0}")]
    MalformedCookie(String),

    /// The AudioSpecificConfig is truncated or holds a value this codec
    /// cannot represent.
    #[error("invalid audio specific config: {0}")]
    InvalidAudioConfig(String),

    /// The frame does not fit in the 13-bit ADTS frame length field.
    #[error("ADTS frame length {frame_length} exceeds {}", crate::adts::MAX_FRAME_LENGTH)]
    FrameTooLarge { frame_length: usize },
}

impl Error {
    pub fn malformed_cookie(msg: impl Into<String>) -> Self {
        Self::MalformedCookie(msg.into())
    }

    pub fn invalid_audio_config(msg: impl Into<String>) -> Self {
        Self::InvalidAudioConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = Error::malformed_cookie("no decSpecificConfig");
        assert_eq!(
            err.to_string(),
            "malformed magic cookie: no decSpecificConfig"
        );

        let err = Error::FrameTooLarge { frame_length: 9000 };
        assert_eq!(err.to_string(), "ADTS frame length 9000 exceeds 8191");
    }
}
