// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Video(VideoError),
    Snapshot(SnapshotError),
}

/// Specific error types for the shared playback surface.
/// Used to provide user-friendly, localized error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoError {
    /// A caller broke an operation's precondition (e.g. capturing a moment
    /// with no active player). Indicates a driver bug, not a runtime
    /// condition to recover from; the operation halts.
    Precondition(String),

    /// File format is not supported (e.g., unknown extension)
    UnsupportedFormat,

    /// File exists but contains no video stream
    NoVideoStream,

    /// The source could not be opened or its metadata read
    LoadFailed(String),

    /// Decoding failed during playback
    DecodingFailed(String),

    /// Seeking to a resume position failed
    SeekFailed(String),

    /// Generic error with raw message
    Other(String),
}

impl VideoError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            VideoError::Precondition(_) => "error-video-precondition",
            VideoError::UnsupportedFormat => "error-video-unsupported-format",
            VideoError::NoVideoStream => "error-video-no-video-stream",
            VideoError::LoadFailed(_) => "error-video-load-failed",
            VideoError::DecodingFailed(_) => "error-video-decoding-failed",
            VideoError::SeekFailed(_) => "error-video-seek-failed",
            VideoError::Other(_) => "error-video-general",
        }
    }

    /// Categorizes a raw decoder/FFmpeg message into a specific variant.
    pub fn from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("no such file")
            || msg_lower.contains("permission denied")
            || msg_lower.contains("i/o error")
        {
            return VideoError::LoadFailed(msg.to_string());
        }

        if msg_lower.contains("no video stream") || msg_lower.contains("no video track") {
            return VideoError::NoVideoStream;
        }

        if msg_lower.contains("seek") {
            return VideoError::SeekFailed(msg.to_string());
        }

        if msg_lower.contains("packet")
            || msg_lower.contains("decode")
            || msg_lower.contains("scaling")
            || msg_lower.contains("unsupported")
        {
            return VideoError::DecodingFailed(msg.to_string());
        }

        VideoError::Other(msg.to_string())
    }
}

impl fmt::Display for VideoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoError::Precondition(msg) => write!(f, "Precondition violated: {}", msg),
            VideoError::UnsupportedFormat => write!(f, "Unsupported video format"),
            VideoError::NoVideoStream => write!(f, "No video stream found"),
            VideoError::LoadFailed(msg) => write!(f, "Load failed: {}", msg),
            VideoError::DecodingFailed(msg) => write!(f, "Decoding failed: {}", msg),
            VideoError::SeekFailed(msg) => write!(f, "Seek failed: {}", msg),
            VideoError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Errors while capturing a thumbnail of the current frame.
///
/// Snapshot failures are never fatal: callers log a warning and continue,
/// leaving the previous thumbnail in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// No decoded frame is available to draw from.
    NoFrame,
    /// The frame buffer dimensions were inconsistent.
    InvalidFrame,
    /// Encoding the raster to PNG failed.
    Encode(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::NoFrame => write!(f, "No frame available for snapshot"),
            SnapshotError::InvalidFrame => write!(f, "Frame buffer is inconsistent"),
            SnapshotError::Encode(msg) => write!(f, "Snapshot encoding failed: {}", msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Video(e) => write!(f, "Video Error: {}", e),
            Error::Snapshot(e) => write!(f, "Snapshot Error: {}", e),
        }
    }
}

impl From<VideoError> for Error {
    fn from(err: VideoError) -> Self {
        Error::Video(err)
    }
}

impl From<SnapshotError> for Error {
    fn from(err: SnapshotError) -> Self {
        Error::Snapshot(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }

    #[test]
    fn video_error_from_message_load() {
        let err = VideoError::from_message("No such file or directory");
        assert!(matches!(err, VideoError::LoadFailed(_)));
    }

    #[test]
    fn video_error_from_message_no_stream() {
        let err = VideoError::from_message("No video stream found in file");
        assert_eq!(err, VideoError::NoVideoStream);
    }

    #[test]
    fn video_error_from_message_seek() {
        let err = VideoError::from_message("Seek beyond end of stream");
        assert!(matches!(err, VideoError::SeekFailed(_)));
    }

    #[test]
    fn video_error_from_message_decoding() {
        let err = VideoError::from_message("Packet send failed: error");
        assert!(matches!(err, VideoError::DecodingFailed(_)));
    }

    #[test]
    fn video_error_i18n_keys() {
        assert_eq!(
            VideoError::UnsupportedFormat.i18n_key(),
            "error-video-unsupported-format"
        );
        assert_eq!(
            VideoError::Precondition("x".into()).i18n_key(),
            "error-video-precondition"
        );
    }

    #[test]
    fn snapshot_error_display() {
        assert_eq!(
            format!("{}", SnapshotError::NoFrame),
            "No frame available for snapshot"
        );
    }
}
