// SPDX-License-Identifier: MPL-2.0
//! Fan items and their behavior variants.
//!
//! Every item carries the same core: a stage node, an animator, a fade, and
//! an optional association with a logical video player. What differs between
//! variants is only the gesture capability set, so "upgrading" an item is
//! constructing a new variant around the same core rather than rebuilding
//! its scene state.

use crate::animation::{Animator, Fade};
use crate::gesture::{Capabilities, ItemGestures};
use crate::stage::NodeId;
use crate::video::{MomentWindow, PlayerId};

/// Handle to an item within a fan. Unique per fan for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub(crate) u64);

/// Which gesture vocabulary an item responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemBehavior {
    /// Inert placeholder; placed and animated, nothing else.
    Plain,
    /// Can be dragged off the fan to remove it.
    Removable,
    /// Full manipulation: drag, pinch/rotate, and tap-to-preview.
    Manipulable,
}

impl ItemBehavior {
    #[must_use]
    pub fn capabilities(self) -> Capabilities {
        match self {
            ItemBehavior::Plain => Capabilities::default(),
            ItemBehavior::Removable => Capabilities {
                drag_to_remove: true,
                ..Capabilities::default()
            },
            ItemBehavior::Manipulable => Capabilities {
                drag_to_remove: true,
                pinch_rotate: true,
                tap_to_preview: true,
            },
        }
    }
}

/// One positioned item in a fan.
#[derive(Debug)]
pub struct FanItem {
    pub(crate) node: NodeId,
    pub(crate) animator: Animator,
    pub(crate) fade: Fade,
    pub(crate) behavior: ItemBehavior,
    pub(crate) gestures: ItemGestures,
    player: Option<PlayerId>,
    window: Option<MomentWindow>,
}

impl FanItem {
    #[must_use]
    pub fn new(node: NodeId, behavior: ItemBehavior) -> Self {
        Self {
            node,
            animator: Animator::default(),
            fade: Fade::new(1.0),
            behavior,
            gestures: ItemGestures::new(behavior.capabilities()),
            player: None,
            window: None,
        }
    }

    /// Associates the item with a captured moment of a logical player.
    #[must_use]
    pub fn with_moment(mut self, player: PlayerId, window: MomentWindow) -> Self {
        self.player = Some(player);
        self.window = Some(window);
        self
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub fn behavior(&self) -> ItemBehavior {
        self.behavior
    }

    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        self.player
    }

    #[must_use]
    pub fn moment(&self) -> Option<MomentWindow> {
        self.window
    }

    pub fn animator(&mut self) -> &mut Animator {
        &mut self.animator
    }

    pub fn fade(&mut self) -> &mut Fade {
        &mut self.fade
    }

    /// Rebinds the item to a new behavior variant, keeping its scene state
    /// and media association.
    pub fn rebind(&mut self, behavior: ItemBehavior) {
        self.behavior = behavior;
        self.gestures = ItemGestures::new(behavior.capabilities());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::MomentLength;
    use std::time::Duration;

    #[test]
    fn behavior_maps_to_capabilities() {
        assert_eq!(ItemBehavior::Plain.capabilities(), Capabilities::default());
        assert!(ItemBehavior::Removable.capabilities().drag_to_remove);
        assert!(!ItemBehavior::Removable.capabilities().tap_to_preview);
        let full = ItemBehavior::Manipulable.capabilities();
        assert!(full.drag_to_remove && full.pinch_rotate && full.tap_to_preview);
    }

    #[test]
    fn rebind_keeps_media_association() {
        let node = NodeId::test_id(3);
        let window = MomentWindow::around(Duration::from_secs(9), MomentLength::default());
        let mut item = FanItem::new(node, ItemBehavior::Removable)
            .with_moment(PlayerId::test_id(1), window);

        item.rebind(ItemBehavior::Manipulable);
        assert_eq!(item.behavior(), ItemBehavior::Manipulable);
        assert_eq!(item.player(), Some(PlayerId::test_id(1)));
        assert_eq!(item.moment(), Some(window));
        assert_eq!(item.node(), node);
    }
}
