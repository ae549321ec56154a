// SPDX-License-Identifier: MPL-2.0
//! Corner-anchored fan control.
//!
//! A fan button composes one fan with a corner anchor and a three-phase
//! lifecycle: collapsed, active (accepting captures from the playing
//! video), and expanded (capture phase over, items become freely gesture
//! manipulable). Expansion is one-way; only a reset collapses the button
//! again.

use crate::animation::Transform;
use crate::error::{Error, Result};
use crate::fan::{Fan, FanEvent, FanItem, ItemBehavior, ItemId, MaxItems};
use crate::gesture::GestureEvent;
use crate::layout::{anchored, circle_layout, AnchorSpec};
use crate::stage::{NodeId, Stage};
use crate::video::{snapshot, MomentLength, MomentWindow, VideoEvent, VideoService};
use iced::Size;
use std::time::{Duration, Instant};

/// Side length of a captured tile.
const TILE_SIZE: f32 = 110.0;
/// Fan radius while the button is active.
const CAPTURE_RADIUS: f32 = 100.0;
/// Fan radius after expansion.
const EXPANDED_RADIUS: f32 = 220.0;
/// Fade-in of a freshly captured tile.
const FADE_IN_STEPS: u32 = 8;
const FADE_IN_INTERVAL: Duration = Duration::from_millis(25);

/// Lifecycle phase of a fan button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Collapsed,
    Active,
    Expanded,
}

/// Notifications a fan button emits toward the application.
#[derive(Debug, Clone, PartialEq)]
pub enum FanButtonEvent {
    Fan(FanEvent),
    Video(VideoEvent),
    Activated,
    Expanded,
    Collapsed,
}

/// One corner control and the fan it owns.
#[derive(Debug)]
pub struct FanButton {
    spec: AnchorSpec,
    node: NodeId,
    fan: Fan,
    state: ButtonState,
    promote_on_place: bool,
}

impl FanButton {
    /// Builds the button at its corner with an empty fan.
    pub fn new(spec: AnchorSpec, max_items: MaxItems, stage: &mut Stage) -> Self {
        let node = stage.create_node(Size::new(TILE_SIZE, TILE_SIZE));
        stage.attach(stage.root(), node);

        let container = stage.create_node(stage.size());
        stage.attach(stage.root(), container);

        let mut button = Self {
            spec,
            node,
            fan: Fan::new(
                container,
                max_items,
                Box::new(Self::capture_layout(spec, max_items, stage.size())),
            ),
            state: ButtonState::Collapsed,
            promote_on_place: false,
        };
        button.place(stage, Instant::now());
        button
    }

    #[must_use]
    pub fn state(&self) -> ButtonState {
        self.state
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub fn fan(&self) -> &Fan {
        &self.fan
    }

    #[must_use]
    pub fn spec(&self) -> AnchorSpec {
        self.spec
    }

    /// Re-anchors the button and re-places the fan, for stage resizes.
    pub fn place(&mut self, stage: &mut Stage, now: Instant) {
        let placement = self
            .spec
            .anchor
            .placement(stage.node_size(self.node), stage.size());
        stage.set_transform(self.node, placement);

        let radius = match self.state {
            ButtonState::Expanded => EXPANDED_RADIUS,
            _ => CAPTURE_RADIUS,
        };
        self.fan.swap_layout(
            Box::new(Self::fan_layout(
                self.spec,
                self.fan.max_items(),
                radius,
                stage.size(),
            )),
            now,
        );
    }

    /// Marks the button as the capture target. No-op once expanded.
    pub fn activate(&mut self) -> Vec<FanButtonEvent> {
        if self.state != ButtonState::Collapsed {
            return Vec::new();
        }
        self.state = ButtonState::Active;
        vec![FanButtonEvent::Activated]
    }

    /// Captures the currently playing frame into a new fan item.
    ///
    /// The capture freezes the active player's frame as the tile image,
    /// registers a sibling player for the same source, and fades the tile
    /// in from the stage center before it fans out.
    ///
    /// # Errors
    ///
    /// Fails if the button is not in its active phase or no video is
    /// playing.
    pub fn capture(
        &mut self,
        stage: &mut Stage,
        service: &mut VideoService,
        moment_length: MomentLength,
        now: Instant,
    ) -> Result<Vec<FanButtonEvent>> {
        if self.state != ButtonState::Active {
            return Err(Error::Video(crate::error::VideoError::Precondition(
                format!("button at {} is not capturing", self.spec.anchor.id()),
            )));
        }
        let active = service.active().ok_or_else(|| {
            Error::Video(crate::error::VideoError::Precondition(
                "no video is playing".to_string(),
            ))
        })?;
        let source = service.source_of(active).ok_or_else(|| {
            Error::Video(crate::error::VideoError::Precondition(
                "active player has no source".to_string(),
            ))
        })?;

        let (frame, position) = service.capture_from_active().map_err(Error::Video)?;
        let window = MomentWindow::around(position, moment_length);

        let node = stage.create_node(Size::new(TILE_SIZE, TILE_SIZE));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        match snapshot::capture(&frame, TILE_SIZE as u32, TILE_SIZE as u32) {
            Ok(thumbnail) => stage.set_background(node, thumbnail),
            Err(error) => log::warn!("capture thumbnail failed: {error}"),
        }

        let player = service.register(source, node);
        let mut item = FanItem::new(node, ItemBehavior::Removable).with_moment(player, window);

        // Start at the stage center, invisible, and fade in while fanning
        // out toward the assigned slot.
        let size = stage.size();
        let center = Transform::translation(
            size.width / 2.0 - TILE_SIZE / 2.0,
            size.height / 2.0 - TILE_SIZE / 2.0,
        );
        item.animator().translate(center);
        stage.set_transform(node, center);
        item.fade().set(0.0);
        item.fade().fade_to(1.0, FADE_IN_STEPS, FADE_IN_INTERVAL, now);
        stage.set_opacity(node, 0.0);

        let (added, events) = self.fan.add_item(item, stage, now);
        if added.is_none() {
            // Over capacity: the capture is dropped silently.
            service.unregister(player, stage);
            stage.remove(node);
            return Ok(Vec::new());
        }
        Ok(events.into_iter().map(FanButtonEvent::Fan).collect())
    }

    /// Ends the capture phase: the fan widens and, once every item settles
    /// into the wider arc, items become fully manipulable. Idempotent; only
    /// the first call takes effect.
    pub fn expand(&mut self, stage: &mut Stage, now: Instant) -> Vec<FanButtonEvent> {
        if self.state == ButtonState::Expanded {
            return Vec::new();
        }
        self.state = ButtonState::Expanded;
        self.promote_on_place = true;
        self.fan.swap_layout(
            Box::new(Self::fan_layout(
                self.spec,
                self.fan.max_items(),
                EXPANDED_RADIUS,
                stage.size(),
            )),
            now,
        );
        vec![FanButtonEvent::Expanded]
    }

    /// Empties the fan and collapses the button, from any state.
    pub fn reset(
        &mut self,
        stage: &mut Stage,
        service: &mut VideoService,
        now: Instant,
    ) -> Vec<FanButtonEvent> {
        let (removed, fan_events) = self.fan.remove_all(stage, now);
        let mut events: Vec<FanButtonEvent> =
            fan_events.into_iter().map(FanButtonEvent::Fan).collect();
        for item in removed {
            if let Some(player) = item.player() {
                service.unregister(player, stage);
            }
            stage.remove(item.node());
        }
        self.state = ButtonState::Collapsed;
        self.promote_on_place = false;
        events.push(FanButtonEvent::Collapsed);
        events
    }

    /// Interprets a gesture recognized on one of the fan's items.
    pub fn on_gesture(
        &mut self,
        id: ItemId,
        gesture: GestureEvent,
        stage: &mut Stage,
        service: &mut VideoService,
        now: Instant,
    ) -> Vec<FanButtonEvent> {
        let mut events = Vec::new();
        match gesture {
            GestureEvent::Drag { delta, total } => {
                if let Some(item) = self.fan.item_mut(id) {
                    let moved = item
                        .animator()
                        .current()
                        .add(Transform::offset(delta.x, delta.y));
                    item.animator().translate(moved);
                    let node = item.node();
                    stage.set_transform(node, moved);
                    // The tile fades out as it travels its own width.
                    let distance = total.x.hypot(total.y);
                    stage.set_opacity(node, (1.0 - distance / TILE_SIZE).max(0.0));
                }
            }
            GestureEvent::DragEnd { total } => {
                // A pan ending past the tile's own width flings it off.
                if total.x.hypot(total.y) >= TILE_SIZE {
                    let (removed, fan_events) = self.fan.remove_item(id, stage, now);
                    events.extend(fan_events.into_iter().map(FanButtonEvent::Fan));
                    if let Some(item) = removed {
                        if let Some(player) = item.player() {
                            service.unregister(player, stage);
                        }
                        stage.remove(item.node());
                    }
                } else {
                    // Snap everything back into the arc at full opacity.
                    if let Some(item) = self.fan.item(id) {
                        stage.set_opacity(item.node(), 1.0);
                    }
                    self.fan.place_items(now);
                }
            }
            GestureEvent::Manipulate {
                pan,
                rotate_deg,
                scale,
            } => {
                if let Some(item) = self.fan.item_mut(id) {
                    let t = item.animator().current();
                    let reshaped = Transform::new(
                        t.x + pan.x,
                        t.y + pan.y,
                        t.angle_deg + rotate_deg,
                        t.scale_x * scale,
                        t.scale_y * scale,
                    );
                    item.animator().translate(reshaped);
                    let node = item.node();
                    stage.set_transform(node, reshaped);
                }
            }
            GestureEvent::ManipulateEnd => {}
            GestureEvent::Tap(_) => {
                let moment = self
                    .fan
                    .item(id)
                    .and_then(|item| Some((item.player()?, item.moment()?)));
                if let Some((player, window)) = moment {
                    let video_events = service.play_moment(player, window, stage);
                    events.extend(video_events.into_iter().map(FanButtonEvent::Video));
                }
            }
        }
        events
    }

    /// Advances the fan's animations; promotes items after the expansion
    /// placement settles.
    pub fn tick(&mut self, now: Instant, stage: &mut Stage) -> Vec<FanButtonEvent> {
        let events: Vec<FanButtonEvent> = self
            .fan
            .tick(now, stage)
            .into_iter()
            .map(FanButtonEvent::Fan)
            .collect();

        let placed = events
            .iter()
            .any(|e| matches!(e, FanButtonEvent::Fan(FanEvent::Placed)));
        if placed && self.promote_on_place {
            self.promote_on_place = false;
            for id in self.fan.ids() {
                if let Some(item) = self.fan.item_mut(id) {
                    item.rebind(ItemBehavior::Manipulable);
                }
            }
        }
        events
    }

    /// Live capacity adjustment from the menu slider.
    pub fn set_max_items(
        &mut self,
        max_items: MaxItems,
        stage: &mut Stage,
        service: &mut VideoService,
        now: Instant,
    ) -> Vec<FanButtonEvent> {
        let (evicted, fan_events) = self.fan.set_max_items(max_items, stage, now);
        for item in evicted {
            if let Some(player) = item.player() {
                service.unregister(player, stage);
            }
            stage.remove(item.node());
        }
        self.place(stage, now);
        fan_events.into_iter().map(FanButtonEvent::Fan).collect()
    }

    /// Routes a touch hitting `node` into the fan's gesture recognizers.
    pub fn handle_touch(
        &mut self,
        node: NodeId,
        touch: crate::gesture::TouchInput,
        now: Instant,
    ) -> Option<(ItemId, GestureEvent)> {
        self.fan.handle_touch(node, touch, now)
    }

    fn fan_layout(
        spec: AnchorSpec,
        max_items: MaxItems,
        radius: f32,
        stage_size: Size,
    ) -> impl Fn(usize) -> Vec<Transform> {
        // The "full" count (capacity less the reserved slot) spans the
        // corner's arc, so a full fan exactly fills its opening angle.
        let items_per_circle =
            (max_items.get() as f32 - 1.0).max(1.0) * (360.0 / spec.angle_length);
        let anchor = spec
            .anchor
            .placement(Size::new(TILE_SIZE, TILE_SIZE), stage_size);
        anchored(
            circle_layout(radius, items_per_circle, spec.from_angle),
            anchor,
        )
    }

    fn capture_layout(
        spec: AnchorSpec,
        max_items: MaxItems,
        stage_size: Size,
    ) -> impl Fn(usize) -> Vec<Transform> {
        Self::fan_layout(spec, max_items, CAPTURE_RADIUS, stage_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CORNER_SPECS;
    use crate::video::backend::{LoadStart, MediaEvent, RawFrame, SourceMetadata, SourceUri};
    use crate::video::VideoBackend;
    use iced::Vector;

    struct StillBackend {
        frame: Option<RawFrame>,
        position: Duration,
        playing: bool,
    }

    impl StillBackend {
        fn new() -> Self {
            Self {
                frame: Some(RawFrame::from_rgba(4, 4, vec![128u8; 64])),
                position: Duration::from_secs(30),
                playing: false,
            }
        }
    }

    impl VideoBackend for StillBackend {
        fn load(&mut self, _: &SourceUri) -> std::result::Result<LoadStart, crate::error::VideoError> {
            Ok(LoadStart::Ready(SourceMetadata {
                width: 4,
                height: 4,
                duration_secs: 300.0,
                fps: 25.0,
            }))
        }
        // Pinned at one position so capture windows are predictable.
        fn seek(&mut self, _: Duration) -> std::result::Result<(), crate::error::VideoError> {
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
            self.frame.clone()
        }
        fn tick(&mut self, _: Instant) -> Vec<MediaEvent> {
            Vec::new()
        }
    }

    fn setup() -> (Stage, VideoService, FanButton) {
        let mut stage = Stage::new(Size::new(1280.0, 800.0));
        let mut service = VideoService::new(Box::new(StillBackend::new()), &mut stage);

        // A playing source to capture from.
        let host = stage.create_node(Size::new(640.0, 360.0));
        let root = stage.root();
        stage.attach(root, host);
        let player = service.register(SourceUri::from("show.mp4"), host);
        service.activate(player, &mut stage);

        let button = FanButton::new(CORNER_SPECS[0], MaxItems::new(5), &mut stage);
        (stage, service, button)
    }

    fn settle(button: &mut FanButton, stage: &mut Stage, mut now: Instant) -> Vec<FanButtonEvent> {
        let mut events = Vec::new();
        for _ in 0..20 {
            now += Duration::from_millis(20);
            events.extend(button.tick(now, stage));
        }
        events
    }

    #[test]
    fn starts_collapsed_at_its_corner() {
        let (stage, _service, button) = setup();
        assert_eq!(button.state(), ButtonState::Collapsed);
        assert_eq!(stage.transform(button.node()), Transform::translation(0.0, 0.0));
    }

    #[test]
    fn capture_requires_active_state() {
        let (mut stage, mut service, mut button) = setup();
        let now = Instant::now();
        let result = button.capture(&mut stage, &mut service, MomentLength::default(), now);
        assert!(result.is_err());
    }

    #[test]
    fn capture_adds_a_removable_item_with_a_moment() {
        let (mut stage, mut service, mut button) = setup();
        let now = Instant::now();
        button.activate();

        let events = button
            .capture(&mut stage, &mut service, MomentLength::new(6), now)
            .unwrap();
        assert!(matches!(
            events[0],
            FanButtonEvent::Fan(FanEvent::ItemAdded(_))
        ));
        assert_eq!(button.fan().len(), 1);

        let id = button.fan().ids()[0];
        let item = button.fan().item(id).unwrap();
        assert_eq!(item.behavior(), ItemBehavior::Removable);
        // Backend position 30s, length 6s: window 27..33.
        assert_eq!(item.moment().unwrap().start(), Duration::from_secs(27));
        assert!(stage.background(item.node()).is_some());
        assert!(stage.is_attached(item.node()));
    }

    #[test]
    fn expand_is_one_way_and_promotes_items() {
        let (mut stage, mut service, mut button) = setup();
        let now = Instant::now();
        button.activate();
        button
            .capture(&mut stage, &mut service, MomentLength::default(), now)
            .unwrap();
        settle(&mut button, &mut stage, now);

        let events = button.expand(&mut stage, now);
        assert_eq!(events, vec![FanButtonEvent::Expanded]);
        assert!(button.expand(&mut stage, now).is_empty());

        settle(&mut button, &mut stage, now);
        let id = button.fan().ids()[0];
        assert_eq!(
            button.fan().item(id).unwrap().behavior(),
            ItemBehavior::Manipulable
        );
    }

    #[test]
    fn long_drag_removes_the_item_and_its_player() {
        let (mut stage, mut service, mut button) = setup();
        let now = Instant::now();
        button.activate();
        button
            .capture(&mut stage, &mut service, MomentLength::default(), now)
            .unwrap();
        settle(&mut button, &mut stage, now);
        let id = button.fan().ids()[0];
        let node = button.fan().item(id).unwrap().node();

        let events = button.on_gesture(
            id,
            GestureEvent::DragEnd {
                total: Vector::new(200.0, 80.0),
            },
            &mut stage,
            &mut service,
            now,
        );
        assert!(events
            .iter()
            .any(|e| matches!(e, FanButtonEvent::Fan(FanEvent::ItemRemoved(_)))));
        assert!(button.fan().is_empty());
        assert!(!stage.is_attached(node));
    }

    #[test]
    fn short_drag_snaps_back() {
        let (mut stage, mut service, mut button) = setup();
        let now = Instant::now();
        button.activate();
        button
            .capture(&mut stage, &mut service, MomentLength::default(), now)
            .unwrap();
        settle(&mut button, &mut stage, now);
        let id = button.fan().ids()[0];
        let settled = button.fan().item(id).unwrap().animator.target();

        button.on_gesture(
            id,
            GestureEvent::Drag {
                delta: Vector::new(40.0, 0.0),
                total: Vector::new(40.0, 0.0),
            },
            &mut stage,
            &mut service,
            now,
        );
        button.on_gesture(
            id,
            GestureEvent::DragEnd {
                total: Vector::new(40.0, 0.0),
            },
            &mut stage,
            &mut service,
            now,
        );
        settle(&mut button, &mut stage, now);
        assert_eq!(button.fan().item(id).unwrap().animator.current(), settled);
        let node = button.fan().item(id).unwrap().node();
        assert_eq!(stage.opacity(node), 1.0);
    }

    #[test]
    fn pan_fades_with_distance_and_removes_past_tile_width() {
        let (mut stage, mut service, mut button) = setup();
        let now = Instant::now();
        button.activate();
        button
            .capture(&mut stage, &mut service, MomentLength::default(), now)
            .unwrap();
        settle(&mut button, &mut stage, now);
        let id = button.fan().ids()[0];
        let node = button.fan().item(id).unwrap().node();
        assert_eq!(stage.opacity(node), 1.0);

        button.on_gesture(
            id,
            GestureEvent::Drag {
                delta: Vector::new(55.0, 0.0),
                total: Vector::new(55.0, 0.0),
            },
            &mut stage,
            &mut service,
            now,
        );
        // Halfway across its own width the tile is half gone.
        assert!((stage.opacity(node) - 0.5).abs() < 1e-3);

        // Past the tile width, the lift removes the item.
        let events = button.on_gesture(
            id,
            GestureEvent::DragEnd {
                total: Vector::new(120.0, 0.0),
            },
            &mut stage,
            &mut service,
            now,
        );
        assert!(events
            .iter()
            .any(|e| matches!(e, FanButtonEvent::Fan(FanEvent::ItemRemoved(_)))));
        assert!(button.fan().is_empty());
        assert!(!stage.is_attached(node));
    }

    #[test]
    fn fan_arc_spreads_the_full_count_across_the_opening_angle() {
        let layout = FanButton::fan_layout(
            CORNER_SPECS[0],
            MaxItems::new(5),
            CAPTURE_RADIUS,
            Size::new(1280.0, 800.0),
        );
        let placed = layout(2);
        // One slot stays reserved, so four tiles share the 110 degree arc.
        assert!((placed[1].angle_deg - 27.5).abs() < 1e-3);
    }

    #[test]
    fn snap_back_during_expansion_still_promotes() {
        let (mut stage, mut service, mut button) = setup();
        let now = Instant::now();
        button.activate();
        for _ in 0..2 {
            button
                .capture(&mut stage, &mut service, MomentLength::default(), now)
                .unwrap();
        }
        settle(&mut button, &mut stage, now);

        button.expand(&mut stage, now);
        // A short drag interrupts the expansion placement and re-places.
        let id = button.fan().ids()[0];
        button.on_gesture(
            id,
            GestureEvent::Drag {
                delta: Vector::new(30.0, 0.0),
                total: Vector::new(30.0, 0.0),
            },
            &mut stage,
            &mut service,
            now,
        );
        button.on_gesture(
            id,
            GestureEvent::DragEnd {
                total: Vector::new(30.0, 0.0),
            },
            &mut stage,
            &mut service,
            now,
        );

        settle(&mut button, &mut stage, now);
        for id in button.fan().ids() {
            assert_eq!(
                button.fan().item(id).unwrap().behavior(),
                ItemBehavior::Manipulable
            );
        }
    }

    #[test]
    fn tap_plays_the_captured_moment() {
        let (mut stage, mut service, mut button) = setup();
        let now = Instant::now();
        button.activate();
        button
            .capture(&mut stage, &mut service, MomentLength::new(10), now)
            .unwrap();
        settle(&mut button, &mut stage, now);
        let id = button.fan().ids()[0];

        let events = button.on_gesture(
            id,
            GestureEvent::Tap(iced::Point::ORIGIN),
            &mut stage,
            &mut service,
            now,
        );
        // Previous holder retires, the moment's player activates.
        assert!(events
            .iter()
            .any(|e| matches!(e, FanButtonEvent::Video(VideoEvent::Activated(_)))));
        // Window 30s +/- 5s.
        let item_player = button.fan().item(id).unwrap().player().unwrap();
        assert_eq!(service.active(), Some(item_player));
    }

    #[test]
    fn reset_empties_the_fan_from_any_state() {
        let (mut stage, mut service, mut button) = setup();
        let now = Instant::now();
        button.activate();
        button
            .capture(&mut stage, &mut service, MomentLength::default(), now)
            .unwrap();
        button.expand(&mut stage, now);

        let events = button.reset(&mut stage, &mut service, now);
        assert!(events.contains(&FanButtonEvent::Collapsed));
        assert!(button.fan().is_empty());
        assert_eq!(button.state(), ButtonState::Collapsed);

        // Collapsed again: a second activation works.
        assert_eq!(button.activate(), vec![FanButtonEvent::Activated]);
    }

    #[test]
    fn capacity_slider_evicts_live() {
        let (mut stage, mut service, mut button) = setup();
        let now = Instant::now();
        button.activate();
        for _ in 0..4 {
            button
                .capture(&mut stage, &mut service, MomentLength::default(), now)
                .unwrap();
        }
        assert_eq!(button.fan().len(), 4);

        let events = button.set_max_items(MaxItems::new(2), &mut stage, &mut service, now);
        assert_eq!(button.fan().len(), 2);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, FanButtonEvent::Fan(FanEvent::ItemRemoved(_))))
                .count(),
            2
        );
    }
}
