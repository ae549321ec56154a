// SPDX-License-Identifier: MPL-2.0
//! View rendering for the application.
//!
//! The whole stage is drawn on a single canvas: nodes come out in draw
//! order with their accumulated translation, opacity, and background
//! thumbnail, and the node holding the playback surface gets the current
//! decoded frame. The sidebar is ordinary widgets stacked on top, offset
//! by its animated openness.

use super::{App, Message};
use crate::gesture::{TouchInput, TouchPhase};
use crate::stage::Stage;
use crate::video::{RawFrame, VideoService};
use fluent_bundle::FluentArgs;
use iced::widget::{
    button, canvas, column, container, image, row, slider, text, Column, Space, Stack,
};
use iced::alignment::{Horizontal, Vertical};
use iced::{mouse, Color, Element, Length, Point, Rectangle, Renderer, Theme};

pub fn view(app: &App) -> Element<'_, Message> {
    let stage_canvas = canvas::Canvas::new(StageCanvas {
        stage: &app.stage,
        service: &app.service,
    })
    .width(Length::Fill)
    .height(Length::Fill);

    let mut layers = Stack::new().push(stage_canvas);

    if let Some(key) = hint_key(app) {
        layers = layers.push(
            container(
                text(app.i18n.tr(key))
                    .size(16)
                    .color(Color::from_rgba(1.0, 1.0, 1.0, 0.7)),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(Horizontal::Center)
            .align_y(Vertical::Bottom)
            .padding(24),
        );
    }

    if app.sidebar.offset() > 0.0 {
        layers = layers.push(
            container(sidebar_panel(app))
                .width(Length::Fixed(app.sidebar.offset()))
                .height(Length::Fill)
                .style(|_theme| container::Style {
                    background: Some(Color::from_rgba(0.1, 0.1, 0.1, 0.92).into()),
                    ..container::Style::default()
                }),
        );
    }
    layers.into()
}

/// Picks the guidance line for the current state, or none while the
/// sidebar or a full-screen playback is up.
fn hint_key(app: &App) -> Option<&'static str> {
    use crate::fan::ButtonState;

    if app.buttons_hidden || app.sidebar.is_open() {
        return None;
    }
    let any_active = app
        .buttons
        .iter()
        .any(|b| b.state() != ButtonState::Collapsed);
    if !any_active {
        Some("hint-tap-corner")
    } else if app.menu.any_full() {
        Some("hint-fan-full")
    } else {
        Some("hint-tap-video")
    }
}

fn sidebar_panel(app: &App) -> Element<'_, Message> {
    let i18n = &app.i18n;
    let max_items = app.menu.max_items().get() as u32;
    let moment_secs = app.menu.moment_length().secs() as u32;

    let mut entries = Column::new().spacing(8);
    for (id, label, node) in app.video_menu.entries() {
        let thumbnail: Element<'_, Message> = match app.stage.background(node) {
            Some(thumb) => image(image::Handle::from_bytes(thumb.png.to_vec()))
                .width(Length::Fixed(crate::menu::video_menu::ENTRY_WIDTH))
                .into(),
            None => Space::new()
                .width(Length::Fixed(crate::menu::video_menu::ENTRY_WIDTH))
                .height(Length::Fixed(crate::menu::video_menu::ENTRY_HEIGHT))
                .into(),
        };
        entries = entries.push(
            row![
                button(thumbnail).on_press(Message::EntryTapped(id)),
                column![
                    text(label.to_string()).size(14),
                    button(text("x").size(12)).on_press(Message::EntryRemovePressed(id)),
                ]
                .spacing(4),
            ]
            .spacing(8),
        );
    }

    let mut occupied_args = FluentArgs::new();
    occupied_args.set("count", app.menu.occupied() as i64);

    let mut panel = column![
        text(i18n.tr("menu-title")).size(22),
        text(i18n.tr("menu-max-items")).size(14),
        slider(1..=10u32, max_items, Message::MaxItemsChanged).step(1u32),
        text(format!("{max_items}")).size(12),
        text(i18n.tr("menu-moment-length")).size(14),
        slider(1..=30u32, moment_secs, Message::MomentSecsChanged).step(1u32),
        text(format!("{moment_secs} s")).size(12),
        text(i18n.tr_args("menu-occupied", &occupied_args)).size(12),
        button(text(i18n.tr("menu-reset"))).on_press(Message::ResetPressed),
        button(text(i18n.tr("menu-add-video"))).on_press(Message::AddVideoPressed),
        entries,
    ]
    .spacing(12)
    .padding(16);

    if let Some(message) = app.last_error.as_deref() {
        panel = panel.push(text(message).size(12).color(Color::from_rgb(0.9, 0.4, 0.4)));
    }

    panel.into()
}

/// Canvas program that paints the stage and forwards pointer events as
/// touch input.
struct StageCanvas<'a> {
    stage: &'a Stage,
    service: &'a VideoService,
}

impl canvas::Program<Message> for StageCanvas<'_> {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &iced::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<iced::widget::Action<Message>> {
        use iced::widget::Action;

        let touch = |phase: TouchPhase, position: Point| {
            Message::Touch(TouchInput {
                id: 0,
                phase,
                position,
            })
        };

        match event {
            iced::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                Some(Action::publish(touch(TouchPhase::Began, position)).and_capture())
            }
            iced::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let position = cursor.position_in(bounds)?;
                Some(Action::publish(touch(TouchPhase::Moved, position)))
            }
            iced::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds).unwrap_or(Point::ORIGIN);
                Some(Action::publish(touch(TouchPhase::Ended, position)).and_capture())
            }
            iced::Event::Mouse(mouse::Event::CursorLeft) => {
                Some(Action::publish(touch(TouchPhase::Cancelled, Point::ORIGIN)))
            }
            iced::Event::Touch(touch_event) => {
                let (phase, position) = match *touch_event {
                    iced::touch::Event::FingerPressed { position, .. } => {
                        (TouchPhase::Began, position)
                    }
                    iced::touch::Event::FingerMoved { position, .. } => {
                        (TouchPhase::Moved, position)
                    }
                    iced::touch::Event::FingerLifted { position, .. } => {
                        (TouchPhase::Ended, position)
                    }
                    iced::touch::Event::FingerLost { position, .. } => {
                        (TouchPhase::Cancelled, position)
                    }
                };
                let finger = match *touch_event {
                    iced::touch::Event::FingerPressed { id, .. }
                    | iced::touch::Event::FingerMoved { id, .. }
                    | iced::touch::Event::FingerLifted { id, .. }
                    | iced::touch::Event::FingerLost { id, .. } => id.0,
                };
                Some(
                    Action::publish(Message::Touch(TouchInput {
                        id: finger,
                        phase,
                        position,
                    }))
                    .and_capture(),
                )
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::BLACK);

        let surface = self.service.surface();
        let surface_frame = self.service.surface_frame();

        for node in self.stage.draw_order() {
            if node == self.stage.root() {
                continue;
            }
            let opacity = self.stage.opacity(node);
            if opacity == 0.0 || !self.stage.is_attached(node) {
                continue;
            }
            let (x, y) = self.stage.absolute_translation(node);
            let transform = self.stage.transform(node);
            let size = self.stage.node_size(node);
            // Translate, rotate, scale: same composition order the
            // transform's CSS encoding declares.
            frame.with_save(|frame| {
                frame.translate(iced::Vector::new(x, y));
                frame.rotate(transform.angle_deg.to_radians());
                frame.scale_nonuniform(iced::Vector::new(
                    transform.scale_x,
                    transform.scale_y,
                ));
                let area = Rectangle {
                    x: 0.0,
                    y: 0.0,
                    width: size.width,
                    height: size.height,
                };

                if node == surface {
                    if let Some(raw) = surface_frame.as_ref() {
                        draw_raw_frame(frame, area, raw, opacity);
                        return;
                    }
                }

                match self.stage.background(node) {
                    Some(thumb) => {
                        let handle = image::Handle::from_bytes(thumb.png.to_vec());
                        frame.draw_image(area, canvas::Image::new(handle).opacity(opacity));
                    }
                    None => {
                        frame.fill_rectangle(
                            Point::ORIGIN,
                            area.size(),
                            Color::from_rgba(1.0, 1.0, 1.0, 0.15 * opacity),
                        );
                    }
                }
            });
        }

        vec![frame.into_geometry()]
    }
}

fn draw_raw_frame(
    frame: &mut canvas::Frame,
    area: Rectangle,
    raw: &RawFrame,
    opacity: f32,
) {
    let handle = image::Handle::from_rgba(raw.width, raw.height, raw.rgba.to_vec());
    frame.draw_image(area, canvas::Image::new(handle).opacity(opacity));
}
