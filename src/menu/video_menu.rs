// SPDX-License-Identifier: MPL-2.0
//! Video library inside the sidebar.
//!
//! New sources are probed before they become tappable: the menu plays the
//! file briefly on a hidden host, freezes the first decoded frame into a
//! thumbnail, and only then lists the entry. Tapping an entry runs the
//! full-screen choreography: the video fills the stage with all controls
//! hidden, replays once at reduced size with the controls back, and on the
//! second natural end hands the stage over to the expanded fans.

use crate::animation::Transform;
use crate::error::VideoError;
use crate::gesture::TapGuard;
use crate::stage::{NodeId, Stage};
use crate::video::{snapshot, PlayerId, SourceUri, VideoEvent, VideoService};
use iced::Size;
use std::time::Instant;

/// Thumbnail tile dimensions of a library entry.
pub const ENTRY_WIDTH: f32 = 160.0;
pub const ENTRY_HEIGHT: f32 = 90.0;

/// Scale of the playback screen during the intermission replay.
const INTERMISSION_SCALE: f32 = 0.6;

/// Handle to a library entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

/// Lifecycle notifications from the video library.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoMenuEvent {
    /// A probed source became a tappable entry.
    ItemAdded(EntryId),
    ItemRemoved(EntryId),
    /// The source could not be probed; nothing was added.
    ProbeFailed {
        source: SourceUri,
        error: VideoError,
    },
    /// Full-screen playback began; controls should hide.
    PlaybackStarted,
    /// First natural end; the screen shrinks and controls return while the
    /// video replays.
    Intermission,
    /// Second natural end; the stage belongs to the fans now.
    PlaybackFinished,
}

#[derive(Debug)]
struct Entry {
    id: EntryId,
    label: String,
    source: SourceUri,
    node: NodeId,
    player: PlayerId,
    tap_guard: TapGuard,
}

#[derive(Debug)]
struct Probe {
    player: PlayerId,
    node: NodeId,
    label: String,
    source: SourceUri,
    awaiting_frame: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    FirstPass(PlayerId),
    SecondPass(PlayerId),
}

/// The sidebar's video library and full-screen playback driver.
#[derive(Debug)]
pub struct VideoMenu {
    entries: Vec<Entry>,
    next_id: u64,
    probe: Option<Probe>,
    phase: Phase,
    /// Full-stage node hosting the playback surface during the
    /// choreography.
    screen: NodeId,
}

impl VideoMenu {
    /// Creates the library with a hidden full-stage playback screen above
    /// everything else.
    pub fn new(stage: &mut Stage) -> Self {
        let screen = stage.create_node(stage.size());
        stage.attach(stage.root(), screen);
        stage.set_z_index(screen, 100);
        stage.set_opacity(screen, 0.0);
        Self {
            entries: Vec::new(),
            next_id: 0,
            probe: None,
            phase: Phase::Idle,
            screen,
        }
    }

    /// The library entries as `(id, label, thumbnail node)`, in insertion
    /// order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &str, NodeId)> + '_ {
        self.entries
            .iter()
            .map(|e| (e.id, e.label.as_str(), e.node))
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// The full-stage playback screen node.
    #[must_use]
    pub fn screen(&self) -> NodeId {
        self.screen
    }

    /// Starts probing a new source. The entry is listed once a frame could
    /// be decoded for its thumbnail; a pending probe is replaced.
    pub fn begin_add(
        &mut self,
        source: SourceUri,
        label: String,
        stage: &mut Stage,
        service: &mut VideoService,
    ) -> Vec<VideoMenuEvent> {
        self.abort_probe(stage, service);

        let node = stage.create_node(Size::new(ENTRY_WIDTH, ENTRY_HEIGHT));
        let player = service.register(source.clone(), node);
        self.probe = Some(Probe {
            player,
            node,
            label,
            source,
            awaiting_frame: false,
        });

        let mut out = Vec::new();
        for event in service.activate(player, stage) {
            self.on_video_event(&event, stage, service, &mut out);
        }
        out
    }

    /// Removes an entry (pan-to-remove on the sidebar tile).
    pub fn remove_entry(
        &mut self,
        id: EntryId,
        stage: &mut Stage,
        service: &mut VideoService,
    ) -> Vec<VideoMenuEvent> {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return Vec::new();
        };
        let entry = self.entries.remove(index);
        service.unregister(entry.player, stage);
        stage.remove(entry.node);
        vec![VideoMenuEvent::ItemRemoved(id)]
    }

    /// Tap on a library entry: start the full-screen playback choreography.
    /// Debounced per entry; taps during a running playback are ignored.
    pub fn tap_entry(
        &mut self,
        id: EntryId,
        now: Instant,
        stage: &mut Stage,
        service: &mut VideoService,
    ) -> Vec<VideoMenuEvent> {
        if self.phase != Phase::Idle {
            return Vec::new();
        }
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return Vec::new();
        };
        if !entry.tap_guard.try_tap(now) {
            return Vec::new();
        }
        let player = entry.player;

        stage.set_transform(self.screen, Transform::IDENTITY);
        stage.set_node_size(self.screen, stage.size());
        stage.set_opacity(self.screen, 1.0);

        self.phase = Phase::FirstPass(player);
        let mut out = vec![VideoMenuEvent::PlaybackStarted];
        for event in service.replay(player, stage) {
            self.on_video_event(&event, stage, service, &mut out);
        }
        out
    }

    /// Feeds playback lifecycle events into the choreography.
    pub fn handle_video_event(
        &mut self,
        event: &VideoEvent,
        stage: &mut Stage,
        service: &mut VideoService,
    ) -> Vec<VideoMenuEvent> {
        let mut out = Vec::new();
        self.on_video_event(event, stage, service, &mut out);
        out
    }

    /// Polls a probe that is still waiting for its first decoded frame.
    pub fn tick(&mut self, stage: &mut Stage, service: &mut VideoService) -> Vec<VideoMenuEvent> {
        let waiting = self
            .probe
            .as_ref()
            .is_some_and(|p| p.awaiting_frame && service.active() == Some(p.player));
        if !waiting {
            return Vec::new();
        }
        let Ok((frame, _)) = service.capture_from_active() else {
            // Still no frame; keep waiting.
            return Vec::new();
        };
        let Some(probe) = self.probe.take() else {
            return Vec::new();
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        match snapshot::capture(&frame, ENTRY_WIDTH as u32, ENTRY_HEIGHT as u32) {
            Ok(thumbnail) => stage.set_background(probe.node, thumbnail),
            Err(error) => log::warn!("probe thumbnail failed: {error}"),
        }
        service.deactivate(stage);
        // The probe player was hosted on the tile; playback runs on the
        // full screen, so the entry gets its own player.
        service.unregister(probe.player, stage);
        let player = service.register(probe.source.clone(), self.screen);

        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            label: probe.label,
            source: probe.source,
            node: probe.node,
            player,
            tap_guard: TapGuard::new(TapGuard::DEFAULT_COOLDOWN),
        });
        vec![VideoMenuEvent::ItemAdded(id)]
    }

    fn on_video_event(
        &mut self,
        event: &VideoEvent,
        stage: &mut Stage,
        service: &mut VideoService,
        out: &mut Vec<VideoMenuEvent>,
    ) {
        match *event {
            VideoEvent::Activated(player) => {
                if self.probe.as_ref().is_some_and(|p| p.player == player) {
                    if let Some(probe) = self.probe.as_mut() {
                        probe.awaiting_frame = true;
                    }
                }
            }
            VideoEvent::ActivationFailed { player, ref error } => {
                if self.probe.as_ref().is_some_and(|p| p.player == player) {
                    if let Some(probe) = self.probe.take() {
                        service.unregister(probe.player, stage);
                        stage.remove(probe.node);
                        out.push(VideoMenuEvent::ProbeFailed {
                            source: probe.source,
                            error: error.clone(),
                        });
                    }
                } else if self.playing_player() == Some(player) {
                    self.phase = Phase::Idle;
                    stage.set_opacity(self.screen, 0.0);
                    out.push(VideoMenuEvent::PlaybackFinished);
                }
            }
            VideoEvent::PlaybackEnded(player) => match self.phase {
                Phase::FirstPass(p) if p == player => {
                    self.phase = Phase::SecondPass(player);
                    let size = stage.size();
                    stage.set_transform(
                        self.screen,
                        Transform::new(
                            size.width * (1.0 - INTERMISSION_SCALE) / 2.0,
                            size.height * (1.0 - INTERMISSION_SCALE) / 2.0,
                            0.0,
                            INTERMISSION_SCALE,
                            INTERMISSION_SCALE,
                        ),
                    );
                    out.push(VideoMenuEvent::Intermission);
                    for event in service.replay(player, stage) {
                        self.on_video_event(&event, stage, service, out);
                    }
                }
                Phase::SecondPass(p) if p == player => {
                    self.phase = Phase::Idle;
                    service.deactivate(stage);
                    stage.set_opacity(self.screen, 0.0);
                    out.push(VideoMenuEvent::PlaybackFinished);
                }
                _ => {}
            },
            VideoEvent::Deactivated(_) | VideoEvent::MomentElapsed(_) => {}
        }
    }

    fn playing_player(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::Idle => None,
            Phase::FirstPass(p) | Phase::SecondPass(p) => Some(p),
        }
    }

    fn abort_probe(&mut self, stage: &mut Stage, service: &mut VideoService) {
        if let Some(probe) = self.probe.take() {
            service.unregister(probe.player, stage);
            stage.remove(probe.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::{
        LoadStart, MediaEvent, RawFrame, SourceMetadata, VideoBackend,
    };
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Backend whose current frame is fed from the outside, so the probe's
    /// wait-for-first-frame path can be driven explicitly.
    struct FeedBackend {
        frame: Arc<Mutex<Option<RawFrame>>>,
        position: Duration,
        playing: bool,
    }

    impl VideoBackend for FeedBackend {
        fn load(&mut self, _source: &SourceUri) -> Result<LoadStart, VideoError> {
            Ok(LoadStart::Ready(SourceMetadata {
                width: 16,
                height: 9,
                duration_secs: 60.0,
                fps: 25.0,
            }))
        }

        fn seek(&mut self, position: Duration) -> Result<(), VideoError> {
            self.position = position;
            Ok(())
        }

        fn play(&mut self) {
            self.playing = true;
        }

        fn pause(&mut self) {
            self.playing = false;
        }

        fn is_playing(&self) -> bool {
            self.playing
        }

        fn position(&self) -> Duration {
            self.position
        }

        fn current_frame(&self) -> Option<RawFrame> {
            self.frame.lock().unwrap().clone()
        }

        fn tick(&mut self, _now: Instant) -> Vec<MediaEvent> {
            Vec::new()
        }
    }

    fn setup() -> (Stage, VideoService, VideoMenu, Arc<Mutex<Option<RawFrame>>>) {
        let mut stage = Stage::new(Size::new(1920.0, 1080.0));
        let frame = Arc::new(Mutex::new(None));
        let backend = FeedBackend {
            frame: Arc::clone(&frame),
            position: Duration::ZERO,
            playing: false,
        };
        let service = VideoService::new(Box::new(backend), &mut stage);
        let menu = VideoMenu::new(&mut stage);
        (stage, service, menu, frame)
    }

    fn feed_frame(cell: &Arc<Mutex<Option<RawFrame>>>) {
        *cell.lock().unwrap() = Some(RawFrame::from_rgba(2, 2, vec![255u8; 16]));
    }

    fn add_entry(
        stage: &mut Stage,
        service: &mut VideoService,
        menu: &mut VideoMenu,
        frame: &Arc<Mutex<Option<RawFrame>>>,
    ) -> EntryId {
        menu.begin_add(
            SourceUri::from("a.mp4"),
            "a".to_string(),
            stage,
            service,
        );
        feed_frame(frame);
        let added = menu.tick(stage, service);
        let VideoMenuEvent::ItemAdded(id) = added[0] else {
            panic!("expected ItemAdded");
        };
        id
    }

    #[test]
    fn probe_lists_entry_once_a_frame_arrives() {
        let (mut stage, mut service, mut menu, frame) = setup();
        let events = menu.begin_add(
            SourceUri::from("a.mp4"),
            "a".to_string(),
            &mut stage,
            &mut service,
        );
        // Activation succeeded but no entry yet; the thumbnail needs a
        // decoded frame first.
        assert!(events.is_empty());
        assert_eq!(menu.entries().count(), 0);
        assert!(menu.tick(&mut stage, &mut service).is_empty());

        feed_frame(&frame);
        let events = menu.tick(&mut stage, &mut service);
        assert!(matches!(events.as_slice(), [VideoMenuEvent::ItemAdded(_)]));
        assert_eq!(menu.entries().count(), 1);
        // The probe handed the surface back.
        assert!(service.active().is_none());

        let (id, _, node) = menu.entries().next().unwrap();
        let _ = id;
        assert!(stage.background(node).is_some());
    }

    #[test]
    fn choreography_runs_two_passes() {
        let (mut stage, mut service, mut menu, frame) = setup();
        let id = add_entry(&mut stage, &mut service, &mut menu, &frame);

        let now = Instant::now();
        let events = menu.tap_entry(id, now, &mut stage, &mut service);
        assert_eq!(events[0], VideoMenuEvent::PlaybackStarted);
        assert!(menu.is_playing());
        assert_eq!(stage.opacity(menu.screen()), 1.0);

        let player = service.active().expect("playback active");

        let events = menu.handle_video_event(
            &VideoEvent::PlaybackEnded(player),
            &mut stage,
            &mut service,
        );
        assert!(events.contains(&VideoMenuEvent::Intermission));
        // The screen shrinks for the replay.
        assert!(stage.transform(menu.screen()).scale_x < 1.0);

        let events = menu.handle_video_event(
            &VideoEvent::PlaybackEnded(player),
            &mut stage,
            &mut service,
        );
        assert!(events.contains(&VideoMenuEvent::PlaybackFinished));
        assert!(!menu.is_playing());
        assert_eq!(stage.opacity(menu.screen()), 0.0);
    }

    #[test]
    fn tap_is_debounced() {
        let (mut stage, mut service, mut menu, frame) = setup();
        let id = add_entry(&mut stage, &mut service, &mut menu, &frame);

        let now = Instant::now();
        let first = menu.tap_entry(id, now, &mut stage, &mut service);
        assert!(!first.is_empty());
        // Finish playback so phase is idle again, then tap within the
        // cooldown window.
        let player = service.active().expect("playback active");
        menu.handle_video_event(&VideoEvent::PlaybackEnded(player), &mut stage, &mut service);
        menu.handle_video_event(&VideoEvent::PlaybackEnded(player), &mut stage, &mut service);
        let second = menu.tap_entry(id, now + Duration::from_millis(100), &mut stage, &mut service);
        assert!(second.is_empty());
    }

    #[test]
    fn removed_entry_releases_its_player() {
        let (mut stage, mut service, mut menu, frame) = setup();
        let id = add_entry(&mut stage, &mut service, &mut menu, &frame);
        let events = menu.remove_entry(id, &mut stage, &mut service);
        assert_eq!(events, vec![VideoMenuEvent::ItemRemoved(id)]);
        assert_eq!(menu.entries().count(), 0);
    }
}
