// SPDX-License-Identifier: MPL-2.0
//! Multiplexing of one playback surface across logical players.
//!
//! The kiosk shows many video tiles, but only one decoder and one playback
//! surface exist. [`VideoService`] owns the [`VideoBackend`] and hands the
//! surface from player to player: activating a player first retires the
//! current holder (freezing its last frame onto its tile, detaching the
//! surface, recording where it left off) and only then loads the new
//! player's source.
//!
//! The retirement of the previous holder always completes before the new
//! load starts; the surface is never visually attached to two tiles at
//! once, and a tile never goes blank without its frozen frame in place.

use crate::error::VideoError;
use crate::stage::{NodeId, Stage};
use crate::video::backend::{
    LoadStart, MediaEvent, RawFrame, SourceMetadata, SourceUri, VideoBackend,
};
use crate::video::moment::MomentWindow;
use crate::video::snapshot;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Handle to a registered logical player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(u64);

#[cfg(test)]
impl PlayerId {
    pub(crate) fn test_id(id: u64) -> Self {
        Self(id)
    }
}

/// Events the service emits toward the application.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoEvent {
    /// The player now holds the surface and playback has started.
    Activated(PlayerId),
    /// Activation failed; no player holds the surface afterwards.
    ActivationFailed { player: PlayerId, error: VideoError },
    /// The player gave up the surface; its tile shows its frozen frame.
    Deactivated(PlayerId),
    /// The active player's source played to its end.
    PlaybackEnded(PlayerId),
    /// The active player's moment window elapsed; playback is paused.
    MomentElapsed(PlayerId),
}

#[derive(Debug)]
struct PlayerRecord {
    source: SourceUri,
    host: NodeId,
    resume: Duration,
    metadata: Option<SourceMetadata>,
}

#[derive(Debug)]
struct PendingActivation {
    player: PlayerId,
    seek: Duration,
    window: Option<MomentWindow>,
}

/// Owner of the playback surface and the backend behind it.
pub struct VideoService {
    backend: Box<dyn VideoBackend>,
    players: HashMap<PlayerId, PlayerRecord>,
    next_id: u64,
    active: Option<PlayerId>,
    pending: Option<PendingActivation>,
    window: Option<MomentWindow>,
    surface: NodeId,
}

impl VideoService {
    /// Creates the service and its surface node. The node starts detached;
    /// it attaches under a player's host on activation.
    pub fn new(backend: Box<dyn VideoBackend>, stage: &mut Stage) -> Self {
        let surface = stage.create_node(stage.size());
        Self {
            backend,
            players: HashMap::new(),
            next_id: 0,
            active: None,
            pending: None,
            window: None,
            surface,
        }
    }

    /// The stage node the live frame is drawn into.
    #[must_use]
    pub fn surface(&self) -> NodeId {
        self.surface
    }

    /// The player currently holding the surface, if any.
    #[must_use]
    pub fn active(&self) -> Option<PlayerId> {
        self.active
    }

    /// The frame the surface shows right now, for the renderer. `None`
    /// while no player holds the surface or nothing is decoded yet.
    #[must_use]
    pub fn surface_frame(&self) -> Option<RawFrame> {
        self.active?;
        self.backend.current_frame()
    }

    /// Registers a logical player for `source`, hosted on `host`.
    pub fn register(&mut self, source: SourceUri, host: NodeId) -> PlayerId {
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        self.players.insert(
            id,
            PlayerRecord {
                source,
                host,
                resume: Duration::ZERO,
                metadata: None,
            },
        );
        id
    }

    /// Forgets a player. If it holds the surface, the surface is detached
    /// without a frozen frame; the host node is left to the caller.
    pub fn unregister(&mut self, player: PlayerId, stage: &mut Stage) {
        if self.active == Some(player) {
            self.backend.pause();
            stage.detach(self.surface);
            self.active = None;
            self.window = None;
        }
        if self.pending.as_ref().is_some_and(|p| p.player == player) {
            self.pending = None;
        }
        self.players.remove(&player);
    }

    /// The host node of a registered player.
    #[must_use]
    pub fn host_of(&self, player: PlayerId) -> Option<NodeId> {
        self.players.get(&player).map(|r| r.host)
    }

    /// The source a player was registered with.
    #[must_use]
    pub fn source_of(&self, player: PlayerId) -> Option<SourceUri> {
        self.players.get(&player).map(|r| r.source.clone())
    }

    /// Hands the surface to `player`, resuming where it last left off.
    pub fn activate(&mut self, player: PlayerId, stage: &mut Stage) -> Vec<VideoEvent> {
        let seek = self
            .players
            .get(&player)
            .map_or(Duration::ZERO, |r| r.resume);
        self.begin_activation(player, seek, None, stage)
    }

    /// Hands the surface to `player` and plays from the beginning,
    /// regardless of any resume position on record.
    pub fn replay(&mut self, player: PlayerId, stage: &mut Stage) -> Vec<VideoEvent> {
        self.begin_activation(player, Duration::ZERO, None, stage)
    }

    /// Hands the surface to `player` and plays the given moment window.
    /// Playback pauses with a [`VideoEvent::MomentElapsed`] once the window
    /// has run its length.
    pub fn play_moment(
        &mut self,
        player: PlayerId,
        window: MomentWindow,
        stage: &mut Stage,
    ) -> Vec<VideoEvent> {
        self.begin_activation(player, window.start(), Some(window), stage)
    }

    /// Takes the surface away from the active player without handing it to
    /// another one.
    pub fn deactivate(&mut self, stage: &mut Stage) -> Vec<VideoEvent> {
        let mut events = Vec::new();
        self.retire_active(stage, &mut events);
        events
    }

    /// The active player's current frame and playback position, used to
    /// capture a moment.
    ///
    /// # Errors
    ///
    /// Returns [`VideoError::Precondition`] if no player holds the surface
    /// or no frame has been decoded yet.
    pub fn capture_from_active(&self) -> Result<(RawFrame, Duration), VideoError> {
        if self.active.is_none() {
            return Err(VideoError::Precondition(
                "no player holds the playback surface".to_string(),
            ));
        }
        let frame = self.backend.current_frame().ok_or_else(|| {
            VideoError::Precondition("no frame decoded yet".to_string())
        })?;
        Ok((frame, self.backend.position()))
    }

    /// Advances playback, drains backend events, and enforces the moment
    /// window.
    pub fn tick(&mut self, now: Instant, stage: &mut Stage) -> Vec<VideoEvent> {
        let mut events = Vec::new();
        for media in self.backend.tick(now) {
            self.on_media_event(media, stage, &mut events);
        }
        if let (Some(player), Some(window)) = (self.active, self.window) {
            if self.backend.is_playing() && window.is_elapsed(self.backend.position()) {
                self.backend.pause();
                self.window = None;
                events.push(VideoEvent::MomentElapsed(player));
            }
        }
        events
    }

    // === Internals ===

    fn begin_activation(
        &mut self,
        player: PlayerId,
        seek: Duration,
        window: Option<MomentWindow>,
        stage: &mut Stage,
    ) -> Vec<VideoEvent> {
        let mut events = Vec::new();
        if self.active == Some(player) {
            // Already holding the surface; just reposition.
            if let Err(error) = self.backend.seek(seek) {
                log::warn!("seek failed for active player: {error}");
            }
            self.window = window;
            self.backend.play();
            return events;
        }

        self.retire_active(stage, &mut events);
        self.pending = None;

        let Some(record) = self.players.get(&player) else {
            events.push(VideoEvent::ActivationFailed {
                player,
                error: VideoError::Precondition("player is not registered".to_string()),
            });
            return events;
        };
        let source = record.source.clone();

        match self.backend.load(&source) {
            Ok(LoadStart::Ready(metadata)) => {
                self.finish_activation(player, metadata, seek, window, stage, &mut events);
            }
            Ok(LoadStart::Pending) => {
                self.pending = Some(PendingActivation {
                    player,
                    seek,
                    window,
                });
            }
            Err(error) => {
                log::warn!("failed to load {source}: {error}");
                events.push(VideoEvent::ActivationFailed { player, error });
            }
        }
        events
    }

    fn finish_activation(
        &mut self,
        player: PlayerId,
        metadata: SourceMetadata,
        seek: Duration,
        window: Option<MomentWindow>,
        stage: &mut Stage,
        events: &mut Vec<VideoEvent>,
    ) {
        let Some(record) = self.players.get_mut(&player) else {
            return;
        };
        record.metadata = Some(metadata);
        let host = record.host;

        if let Err(error) = self.backend.seek(seek) {
            log::warn!("seek to {seek:?} failed: {error}");
            events.push(VideoEvent::ActivationFailed { player, error });
            return;
        }

        stage.attach(host, self.surface);
        stage.set_node_size(self.surface, stage.node_size(host));
        self.backend.play();
        self.active = Some(player);
        self.window = window;
        events.push(VideoEvent::Activated(player));
    }

    fn retire_active(&mut self, stage: &mut Stage, events: &mut Vec<VideoEvent>) {
        let Some(previous) = self.active.take() else {
            return;
        };
        self.backend.pause();
        self.window = None;

        if let Some(record) = self.players.get_mut(&previous) {
            record.resume = self.backend.position();
            let host = record.host;
            match self.backend.current_frame() {
                Some(frame) => {
                    let size = stage.node_size(host);
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    match snapshot::capture(&frame, size.width as u32, size.height as u32) {
                        Ok(thumbnail) => stage.set_background(host, thumbnail),
                        Err(error) => {
                            log::warn!("failed to freeze frame for retired player: {error}");
                        }
                    }
                }
                None => log::debug!("retiring player before any frame was decoded"),
            }
        }

        stage.detach(self.surface);
        events.push(VideoEvent::Deactivated(previous));
    }

    fn on_media_event(
        &mut self,
        media: MediaEvent,
        stage: &mut Stage,
        events: &mut Vec<VideoEvent>,
    ) {
        match media {
            MediaEvent::MetadataLoaded(metadata) => {
                if let Some(pending) = self.pending.take() {
                    self.finish_activation(
                        pending.player,
                        metadata,
                        pending.seek,
                        pending.window,
                        stage,
                        events,
                    );
                }
            }
            MediaEvent::LoadFailed(error) => {
                if let Some(pending) = self.pending.take() {
                    log::warn!("deferred load failed: {error}");
                    events.push(VideoEvent::ActivationFailed {
                        player: pending.player,
                        error,
                    });
                }
            }
            MediaEvent::Ended => {
                if let Some(player) = self.active {
                    self.window = None;
                    events.push(VideoEvent::PlaybackEnded(player));
                }
            }
        }
    }
}

impl std::fmt::Debug for VideoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoService")
            .field("players", &self.players.len())
            .field("active", &self.active)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}
