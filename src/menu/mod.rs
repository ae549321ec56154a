// SPDX-License-Identifier: MPL-2.0
//! Settings menu living inside the sidebar.
//!
//! Two sliders (fan capacity and moment length) and a reset button. The
//! menu listens to fan lifecycle notifications so the capacity slider can
//! reflect live occupancy, and hides with the sidebar during full-screen
//! playback.

pub mod sidebar;
pub mod video_menu;

pub use sidebar::{SideBar, SideBarEvent};
pub use video_menu::{EntryId, VideoMenu, VideoMenuEvent};

use crate::fan::{FanEvent, MaxItems};
use crate::video::MomentLength;

/// Settings changes the menu requests from the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    MaxItemsChanged(MaxItems),
    MomentLengthChanged(MomentLength),
    ResetRequested,
}

/// Slider and button state of the settings menu.
#[derive(Debug)]
pub struct Menu {
    max_items: MaxItems,
    moment_length: MomentLength,
    occupied: usize,
    any_full: bool,
}

impl Menu {
    #[must_use]
    pub fn new(max_items: MaxItems, moment_length: MomentLength) -> Self {
        Self {
            max_items,
            moment_length,
            occupied: 0,
            any_full: false,
        }
    }

    #[must_use]
    pub fn max_items(&self) -> MaxItems {
        self.max_items
    }

    #[must_use]
    pub fn moment_length(&self) -> MomentLength {
        self.moment_length
    }

    /// Items currently held across fans, for the occupancy readout.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Whether any fan has reported itself full.
    #[must_use]
    pub fn any_full(&self) -> bool {
        self.any_full
    }

    /// Capacity slider moved. The raw value is clamped.
    pub fn set_max_items(&mut self, count: usize) -> MenuEvent {
        self.max_items = MaxItems::new(count);
        MenuEvent::MaxItemsChanged(self.max_items)
    }

    /// Moment length slider moved. The raw value is clamped.
    pub fn set_moment_secs(&mut self, secs: u64) -> MenuEvent {
        self.moment_length = MomentLength::new(secs);
        MenuEvent::MomentLengthChanged(self.moment_length)
    }

    pub fn request_reset(&mut self) -> MenuEvent {
        self.occupied = 0;
        self.any_full = false;
        MenuEvent::ResetRequested
    }

    /// Tracks fan lifecycle notifications.
    pub fn notify(&mut self, event: FanEvent) {
        match event {
            FanEvent::ItemAdded(_) => self.occupied += 1,
            FanEvent::ItemRemoved(_) => self.occupied = self.occupied.saturating_sub(1),
            FanEvent::BecameFull => self.any_full = true,
            FanEvent::RoomAgain => self.any_full = false,
            FanEvent::Placed => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fan::ItemId;

    fn item_id(raw: u64) -> ItemId {
        ItemId(raw)
    }

    #[test]
    fn sliders_clamp_their_ranges() {
        let mut menu = Menu::new(MaxItems::default(), MomentLength::default());
        assert_eq!(
            menu.set_max_items(99),
            MenuEvent::MaxItemsChanged(MaxItems::new(10))
        );
        assert_eq!(
            menu.set_moment_secs(0),
            MenuEvent::MomentLengthChanged(MomentLength::new(1))
        );
        assert_eq!(menu.max_items().get(), 10);
        assert_eq!(menu.moment_length().secs(), 1);
    }

    #[test]
    fn occupancy_tracks_lifecycle() {
        let mut menu = Menu::new(MaxItems::default(), MomentLength::default());
        menu.notify(FanEvent::ItemAdded(item_id(0)));
        menu.notify(FanEvent::ItemAdded(item_id(1)));
        menu.notify(FanEvent::BecameFull);
        assert_eq!(menu.occupied(), 2);
        assert!(menu.any_full());

        menu.notify(FanEvent::ItemRemoved(item_id(0)));
        menu.notify(FanEvent::RoomAgain);
        assert_eq!(menu.occupied(), 1);
        assert!(!menu.any_full());
    }

    #[test]
    fn reset_clears_tracking() {
        let mut menu = Menu::new(MaxItems::default(), MomentLength::default());
        menu.notify(FanEvent::ItemAdded(item_id(0)));
        menu.notify(FanEvent::BecameFull);
        assert_eq!(menu.request_reset(), MenuEvent::ResetRequested);
        assert_eq!(menu.occupied(), 0);
        assert!(!menu.any_full());
    }
}
