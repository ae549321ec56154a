// SPDX-License-Identifier: MPL-2.0
//! Video playback: one decoder, one surface, many logical players.

pub mod backend;
pub mod decoder;
pub mod moment;
pub mod service;
pub mod snapshot;

pub use backend::{LoadStart, MediaEvent, RawFrame, SourceMetadata, SourceUri, VideoBackend};
pub use decoder::FfmpegBackend;
pub use moment::{MomentLength, MomentWindow};
pub use service::{PlayerId, VideoEvent, VideoService};
pub use snapshot::Thumbnail;
