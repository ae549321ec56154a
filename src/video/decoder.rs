// SPDX-License-Identifier: MPL-2.0
//! FFmpeg-backed implementation of the playback port.
//!
//! Decoding runs in a blocking Tokio task (FFmpeg contexts are not `Send`)
//! and talks to the [`FfmpegBackend`] through channels: an unbounded command
//! channel in, a bounded frame/event channel out. The bounded side keeps the
//! decoder from racing ahead of the UI during seeks.

use crate::error::VideoError;
use crate::video::backend::{
    LoadStart, MediaEvent, RawFrame, SourceMetadata, SourceUri, VideoBackend,
};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Commands sent to the decode task.
#[derive(Debug, Clone)]
enum WorkerCommand {
    Play,
    Pause,
    Seek { target_secs: f64 },
    Stop,
}

/// Events sent from the decode task.
#[derive(Debug, Clone)]
enum WorkerEvent {
    Frame { frame: RawFrame, pts_secs: f64 },
    EndOfStream,
    Error(String),
}

struct Worker {
    command_tx: mpsc::UnboundedSender<WorkerCommand>,
    event_rx: mpsc::Receiver<WorkerEvent>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.command_tx.send(WorkerCommand::Stop);
    }
}

/// Playback backend decoding through `ffmpeg-next`.
///
/// One source is loaded at a time; loading a new source stops the previous
/// decode task.
pub struct FfmpegBackend {
    worker: Option<Worker>,
    frame: Option<RawFrame>,
    position: Duration,
    playing: bool,
    ended: bool,
}

impl FfmpegBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            worker: None,
            frame: None,
            position: Duration::ZERO,
            playing: false,
            ended: false,
        }
    }

    fn send(&self, command: WorkerCommand) {
        if let Some(worker) = &self.worker {
            let _ = worker.command_tx.send(command);
        }
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoBackend for FfmpegBackend {
    fn load(&mut self, source: &SourceUri) -> Result<LoadStart, VideoError> {
        // Dropping the old worker sends Stop.
        self.worker = None;
        self.frame = None;
        self.position = Duration::ZERO;
        self.playing = false;
        self.ended = false;

        let path = PathBuf::from(source.as_str());
        if !path.exists() {
            return Err(VideoError::LoadFailed(format!(
                "no such file: {}",
                path.display()
            )));
        }

        let metadata = probe_metadata(&path)?;

        // Commands are unbounded so the UI never blocks; the frame channel
        // is bounded to two entries for backpressure.
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(2);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = decode_loop(&path, command_rx, &event_tx) {
                let _ = event_tx.blocking_send(WorkerEvent::Error(e.to_string()));
            }
        });

        self.worker = Some(Worker {
            command_tx,
            event_rx,
        });
        Ok(LoadStart::Ready(metadata))
    }

    fn seek(&mut self, position: Duration) -> Result<(), VideoError> {
        if self.worker.is_none() {
            return Err(VideoError::Precondition("no source loaded".to_string()));
        }
        self.send(WorkerCommand::Seek {
            target_secs: position.as_secs_f64(),
        });
        self.position = position;
        self.ended = false;
        Ok(())
    }

    fn play(&mut self) {
        self.send(WorkerCommand::Play);
        self.playing = true;
        self.ended = false;
    }

    fn pause(&mut self) {
        self.send(WorkerCommand::Pause);
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn current_frame(&self) -> Option<RawFrame> {
        self.frame.clone()
    }

    fn tick(&mut self, _now: Instant) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        let Some(worker) = &mut self.worker else {
            return events;
        };
        while let Ok(event) = worker.event_rx.try_recv() {
            match event {
                WorkerEvent::Frame { frame, pts_secs } => {
                    self.frame = Some(frame);
                    self.position = Duration::from_secs_f64(pts_secs.max(0.0));
                }
                WorkerEvent::EndOfStream => {
                    if !self.ended {
                        self.ended = true;
                        self.playing = false;
                        events.push(MediaEvent::Ended);
                    }
                }
                WorkerEvent::Error(message) => {
                    log::warn!("decode error: {message}");
                }
            }
        }
        events
    }
}

/// Initializes FFmpeg once per process, quieting its default log spam.
fn init_ffmpeg() -> Result<(), VideoError> {
    static INIT: std::sync::Once = std::sync::Once::new();
    let mut result = Ok(());
    INIT.call_once(|| {
        result = ffmpeg_next::init().map_err(|e| VideoError::from_message(&e.to_string()));
        unsafe {
            ffmpeg_next::sys::av_log_set_level(ffmpeg_next::sys::AV_LOG_ERROR);
        }
    });
    result
}

/// Opens the container just long enough to read stream metadata.
fn probe_metadata(path: &Path) -> Result<SourceMetadata, VideoError> {
    init_ffmpeg()?;

    let ictx =
        ffmpeg_next::format::input(path).map_err(|e| VideoError::from_message(&e.to_string()))?;
    let stream = ictx
        .streams()
        .best(ffmpeg_next::media::Type::Video)
        .ok_or(VideoError::NoVideoStream)?;

    let context = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
        .map_err(|e| VideoError::from_message(&e.to_string()))?;
    let decoder = context
        .decoder()
        .video()
        .map_err(|e| VideoError::from_message(&e.to_string()))?;

    let duration_secs = if ictx.duration() >= 0 {
        ictx.duration() as f64 / f64::from(ffmpeg_next::sys::AV_TIME_BASE)
    } else {
        0.0
    };
    let rate = stream.avg_frame_rate();
    let fps = if rate.denominator() > 0 {
        f64::from(rate.numerator()) / f64::from(rate.denominator())
    } else {
        0.0
    };

    Ok(SourceMetadata {
        width: decoder.width(),
        height: decoder.height(),
        duration_secs,
        fps,
    })
}

/// Cached keyframe for fast paused seeks.
struct CachedKeyframe {
    frame: RawFrame,
    pts_secs: f64,
}

/// LRU cache of keyframes, keyed by centisecond timestamp. Only keyframes
/// are cached since they decode independently.
struct KeyframeCache {
    entries: LruCache<u64, CachedKeyframe>,
}

impl KeyframeCache {
    const CAPACITY: usize = 32;
    /// Maximum distance between a paused seek target and a cached frame.
    const TOLERANCE_SECS: f64 = 0.5;

    fn new() -> Self {
        Self {
            entries: LruCache::new(
                NonZeroUsize::new(Self::CAPACITY).expect("capacity is nonzero"),
            ),
        }
    }

    fn key(pts_secs: f64) -> u64 {
        (pts_secs.max(0.0) * 100.0) as u64
    }

    fn insert(&mut self, frame: RawFrame, pts_secs: f64) {
        self.entries
            .put(Self::key(pts_secs), CachedKeyframe { frame, pts_secs });
    }

    /// The closest cached frame at or before `target_secs`, if it falls
    /// within the tolerance window.
    fn nearest_before(&mut self, target_secs: f64) -> Option<(RawFrame, f64)> {
        let best = self
            .entries
            .iter()
            .filter(|(_, e)| e.pts_secs <= target_secs)
            .max_by(|(_, a), (_, b)| a.pts_secs.total_cmp(&b.pts_secs))
            .map(|(key, _)| *key)?;
        let entry = self.entries.get(&best)?;
        if target_secs - entry.pts_secs <= Self::TOLERANCE_SECS {
            Some((entry.frame.clone(), entry.pts_secs))
        } else {
            None
        }
    }
}

/// Main decode loop, run on a blocking thread since FFmpeg types are not
/// `Send`.
fn decode_loop(
    path: &Path,
    mut command_rx: mpsc::UnboundedReceiver<WorkerCommand>,
    event_tx: &mpsc::Sender<WorkerEvent>,
) -> Result<(), VideoError> {
    init_ffmpeg()?;

    let mut ictx =
        ffmpeg_next::format::input(path).map_err(|e| VideoError::from_message(&e.to_string()))?;
    let input = ictx
        .streams()
        .best(ffmpeg_next::media::Type::Video)
        .ok_or(VideoError::NoVideoStream)?;
    let stream_index = input.index();

    let context = ffmpeg_next::codec::context::Context::from_parameters(input.parameters())
        .map_err(|e| VideoError::from_message(&e.to_string()))?;
    let mut decoder = context
        .decoder()
        .video()
        .map_err(|e| VideoError::from_message(&e.to_string()))?;

    let width = decoder.width();
    let height = decoder.height();

    let mut scaler = ffmpeg_next::software::scaling::Context::get(
        decoder.format(),
        width,
        height,
        ffmpeg_next::format::Pixel::RGBA,
        width,
        height,
        ffmpeg_next::software::scaling::Flags::BILINEAR,
    )
    .map_err(|e| VideoError::from_message(&e.to_string()))?;

    let time_base = input.time_base();
    let time_base_secs = f64::from(time_base.numerator()) / f64::from(time_base.denominator());

    let mut is_playing = false;
    let mut playback_start: Option<Instant> = None;
    let mut first_pts: Option<f64> = None;
    let mut decode_single_frame = false;
    let mut cache = KeyframeCache::new();

    loop {
        match command_rx.try_recv() {
            Ok(WorkerCommand::Play) => {
                is_playing = true;
                playback_start = Some(Instant::now());
                first_pts = None;
            }
            Ok(WorkerCommand::Pause) => {
                is_playing = false;
                playback_start = None;
                first_pts = None;
            }
            Ok(WorkerCommand::Seek { target_secs }) => {
                // Paused seeks can be served straight from the keyframe
                // cache if a close enough frame is available.
                if !is_playing {
                    if let Some((frame, pts_secs)) = cache.nearest_before(target_secs) {
                        let _ = event_tx.blocking_send(WorkerEvent::Frame { frame, pts_secs });
                        continue;
                    }
                }

                // AV_TIME_BASE timestamps are in microseconds. RangeTo lets
                // FFmpeg land on the preceding keyframe.
                let timestamp = (target_secs * 1_000_000.0) as i64;
                if let Err(e) = ictx.seek(timestamp, ..timestamp) {
                    let _ = event_tx
                        .blocking_send(WorkerEvent::Error(format!("seek failed: {e}")));
                } else {
                    decoder.flush();
                    playback_start = Some(Instant::now());
                    first_pts = None;
                    if !is_playing {
                        decode_single_frame = true;
                    }
                }
            }
            Ok(WorkerCommand::Stop) | Err(mpsc::error::TryRecvError::Disconnected) => {
                return Ok(());
            }
            Err(mpsc::error::TryRecvError::Empty) => {}
        }

        if !is_playing && !decode_single_frame {
            std::thread::sleep(Duration::from_millis(10));
            continue;
        }

        let mut frame_decoded = false;
        for (stream, packet) in ictx.packets() {
            if stream.index() != stream_index {
                continue;
            }

            if let Err(e) = decoder.send_packet(&packet) {
                let _ =
                    event_tx.blocking_send(WorkerEvent::Error(format!("packet rejected: {e}")));
                continue;
            }

            let mut decoded = ffmpeg_next::frame::Video::empty();
            if decoder.receive_frame(&mut decoded).is_ok() {
                let mut rgba_frame = ffmpeg_next::frame::Video::empty();
                if let Err(e) = scaler.run(&decoded, &mut rgba_frame) {
                    let _ =
                        event_tx.blocking_send(WorkerEvent::Error(format!("scaling failed: {e}")));
                    continue;
                }

                let pts_secs = decoded
                    .timestamp()
                    .map_or(0.0, |pts| pts as f64 * time_base_secs);

                // Frame pacing: hold the frame until its presentation time.
                if let Some(start) = playback_start {
                    let first = *first_pts.get_or_insert(pts_secs);
                    let due = start + Duration::from_secs_f64((pts_secs - first).max(0.0));
                    let now = Instant::now();
                    if due > now {
                        std::thread::sleep(due - now);
                    }
                }

                let frame = RawFrame {
                    rgba: Arc::new(extract_rgba(&rgba_frame)),
                    width,
                    height,
                };

                if decoded.is_key() {
                    cache.insert(frame.clone(), pts_secs);
                }

                if event_tx
                    .blocking_send(WorkerEvent::Frame { frame, pts_secs })
                    .is_err()
                {
                    return Ok(());
                }

                frame_decoded = true;
                decode_single_frame = false;
                break;
            }
        }

        if !frame_decoded {
            let _ = event_tx.blocking_send(WorkerEvent::EndOfStream);
            is_playing = false;
            playback_start = None;
            first_pts = None;
            decode_single_frame = false;
        }
    }
}

/// Copies RGBA rows out of a scaled frame, dropping stride padding.
fn extract_rgba(frame: &ffmpeg_next::frame::Video) -> Vec<u8> {
    let width = frame.width();
    let height = frame.height();
    let data = frame.data(0);
    let stride = frame.stride(0);

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        let row_start = (y * stride as u32) as usize;
        let row_end = row_start + (width * 4) as usize;
        rgba.extend_from_slice(&data[row_start..row_end]);
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_fails_for_missing_file() {
        let mut backend = FfmpegBackend::new();
        let result = backend.load(&SourceUri::from("/nonexistent/video.mp4"));
        assert!(matches!(result, Err(VideoError::LoadFailed(_))));
    }

    #[test]
    fn seek_requires_a_loaded_source() {
        let mut backend = FfmpegBackend::new();
        let err = backend.seek(Duration::from_secs(3)).unwrap_err();
        assert!(matches!(err, VideoError::Precondition(_)));
    }

    #[test]
    fn keyframe_cache_serves_nearby_frames_only() {
        let mut cache = KeyframeCache::new();
        let frame = RawFrame::from_rgba(2, 2, vec![0u8; 16]);
        cache.insert(frame, 10.0);

        assert!(cache.nearest_before(10.3).is_some());
        assert!(cache.nearest_before(10.6).is_none(), "beyond tolerance");
        assert!(cache.nearest_before(9.9).is_none(), "only frames before");
    }

    #[test]
    fn keyframe_cache_prefers_latest_frame_before_target() {
        let mut cache = KeyframeCache::new();
        cache.insert(RawFrame::from_rgba(2, 2, vec![1u8; 16]), 5.0);
        cache.insert(RawFrame::from_rgba(2, 2, vec![2u8; 16]), 5.4);

        let (frame, pts) = cache.nearest_before(5.5).unwrap();
        assert_eq!(pts, 5.4);
        assert_eq!(frame.rgba[0], 2);
    }
}
