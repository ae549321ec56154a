// SPDX-License-Identifier: MPL-2.0
//! Capacity-bounded circular item container.
//!
//! A fan owns an ordered sequence of items, a capacity, and a replaceable
//! layout function. Items are laid out by animating each one toward the slot
//! the layout function assigns it; membership changes (add, remove, swap,
//! capacity change) re-run the layout over the current occupancy.
//!
//! Fullness deliberately triggers one slot early (`len >= max - 1`): the
//! last slot stays visually free as a placeholder, so the "fan is full"
//! signal fires while an empty slot is still showing.

pub mod button;
pub mod item;

pub use button::{ButtonState, FanButton, FanButtonEvent};
pub use item::{FanItem, ItemBehavior, ItemId};

use crate::gesture::{GestureEvent, TouchInput};
use crate::layout::LayoutFn;
use crate::stage::{NodeId, Stage};
use std::fmt;
use std::time::{Duration, Instant};

/// Steps per placement animation.
const PLACEMENT_STEPS: u32 = 10;
/// Cadence of placement animation steps.
const PLACEMENT_INTERVAL: Duration = Duration::from_millis(20);

/// Fan capacity, clamped to `1..=10`. Live-adjustable from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MaxItems(usize);

impl MaxItems {
    pub const MIN: usize = 1;
    pub const MAX: usize = 10;
    pub const DEFAULT: usize = 5;

    /// Creates a capacity, clamping to the valid range.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self(count.clamp(Self::MIN, Self::MAX))
    }

    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for MaxItems {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for MaxItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notifications a fan emits toward its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanEvent {
    ItemAdded(ItemId),
    ItemRemoved(ItemId),
    /// Occupancy crossed into the full regime (one reserved slot left).
    BecameFull,
    /// Occupancy dropped back out of the full regime.
    RoomAgain,
    /// Every item of the latest placement reached its slot.
    Placed,
}

struct Slot {
    id: ItemId,
    item: FanItem,
}

struct Placement {
    pending: Vec<ItemId>,
}

/// Ordered, capacity-bounded container of positioned items.
pub struct Fan {
    container: NodeId,
    slots: Vec<Slot>,
    next_id: u64,
    max_items: MaxItems,
    layout: LayoutFn,
    placement: Option<Placement>,
}

impl Fan {
    pub fn new(container: NodeId, max_items: MaxItems, layout: LayoutFn) -> Self {
        Self {
            container,
            slots: Vec::new(),
            next_id: 0,
            max_items,
            layout,
            placement: None,
        }
    }

    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn max_items(&self) -> MaxItems {
        self.max_items
    }

    /// Whether the fan is in the full regime. One slot is always kept in
    /// reserve, so this trips at `max - 1` occupancy.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.len() + 1 >= self.max_items.get()
    }

    /// Item ids in visual order.
    #[must_use]
    pub fn ids(&self) -> Vec<ItemId> {
        self.slots.iter().map(|s| s.id).collect()
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&FanItem> {
        self.slots.iter().find(|s| s.id == id).map(|s| &s.item)
    }

    /// The item whose node is `node`, if the fan holds one.
    #[must_use]
    pub fn item_at(&self, node: NodeId) -> Option<ItemId> {
        self.slots
            .iter()
            .find(|s| s.item.node() == node)
            .map(|s| s.id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut FanItem> {
        self.slots
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| &mut s.item)
    }

    /// Appends an item and lays the fan out again.
    ///
    /// Adding at capacity is a silent no-op; the caller keeps ownership of
    /// the rejected item.
    pub fn add_item(
        &mut self,
        item: FanItem,
        stage: &mut Stage,
        now: Instant,
    ) -> (Option<ItemId>, Vec<FanEvent>) {
        let mut events = Vec::new();
        if self.slots.len() >= self.max_items.get() {
            return (None, events);
        }
        let was_full = self.is_full();

        let id = ItemId(self.next_id);
        self.next_id += 1;
        stage.attach(self.container, item.node());
        self.slots.push(Slot { id, item });
        events.push(FanEvent::ItemAdded(id));

        self.place_items(now);
        if !was_full && self.is_full() {
            events.push(FanEvent::BecameFull);
        }
        (Some(id), events)
    }

    /// Removes an item by identity, detaches its element, and lays the fan
    /// out again. Returns the removed item so the caller can release its
    /// scene and media resources.
    pub fn remove_item(
        &mut self,
        id: ItemId,
        stage: &mut Stage,
        now: Instant,
    ) -> (Option<FanItem>, Vec<FanEvent>) {
        let mut events = Vec::new();
        let Some(index) = self.slots.iter().position(|s| s.id == id) else {
            return (None, events);
        };
        let was_full = self.is_full();

        let slot = self.slots.remove(index);
        stage.detach(slot.item.node());
        events.push(FanEvent::ItemRemoved(id));

        self.place_items(now);
        if was_full && !self.is_full() {
            events.push(FanEvent::RoomAgain);
        }
        (Some(slot.item), events)
    }

    /// Replaces `old` with `new` at the same sequence position.
    ///
    /// The new item immediately takes the old item's last target transform,
    /// so an upgraded item does not replay its placement animation. Returns
    /// the new item's id and the displaced item.
    pub fn swap_item(
        &mut self,
        old: ItemId,
        mut new: FanItem,
        stage: &mut Stage,
    ) -> Option<(ItemId, FanItem)> {
        let index = self.slots.iter().position(|s| s.id == old)?;

        let continuity = self.slots[index].item.animator.target();
        new.animator.translate(continuity);

        let id = ItemId(self.next_id);
        self.next_id += 1;
        stage.detach(self.slots[index].item.node());
        stage.attach(self.container, new.node());
        stage.set_transform(new.node(), continuity);

        let displaced = std::mem::replace(&mut self.slots[index], Slot { id, item: new });
        Some((id, displaced.item))
    }

    /// Empties the fan: detaches every node, clears the slots, and drops
    /// any pending placement. The removed items are returned for cleanup.
    pub fn remove_all(
        &mut self,
        stage: &mut Stage,
        now: Instant,
    ) -> (Vec<FanItem>, Vec<FanEvent>) {
        let was_full = self.is_full();
        let mut events = Vec::new();
        let mut removed = Vec::new();
        for slot in self.slots.drain(..) {
            stage.detach(slot.item.node());
            events.push(FanEvent::ItemRemoved(slot.id));
            removed.push(slot.item);
        }
        self.place_items(now);
        if was_full && !self.is_full() {
            events.push(FanEvent::RoomAgain);
        }
        (removed, events)
    }

    /// Replaces the layout function and re-places every item.
    pub fn swap_layout(&mut self, layout: LayoutFn, now: Instant) {
        self.layout = layout;
        self.place_items(now);
    }

    /// Adjusts capacity. Shrinking evicts trailing items (newest first)
    /// until occupancy fits; the evicted items are returned for cleanup.
    pub fn set_max_items(
        &mut self,
        max_items: MaxItems,
        stage: &mut Stage,
        now: Instant,
    ) -> (Vec<FanItem>, Vec<FanEvent>) {
        let was_full = self.is_full();
        let mut events = Vec::new();
        let mut evicted = Vec::new();

        self.max_items = max_items;
        while self.slots.len() > self.max_items.get() {
            let slot = self.slots.pop().expect("occupancy exceeds capacity");
            stage.detach(slot.item.node());
            events.push(FanEvent::ItemRemoved(slot.id));
            evicted.push(slot.item);
        }
        if !evicted.is_empty() {
            self.place_items(now);
        }

        match (was_full, self.is_full()) {
            (false, true) => events.push(FanEvent::BecameFull),
            (true, false) => events.push(FanEvent::RoomAgain),
            _ => {}
        }
        (evicted, events)
    }

    /// Computes one layout slot per item and starts every item animating
    /// toward its slot concurrently.
    ///
    /// All completions of this run are aggregated into a single
    /// [`FanEvent::Placed`], reported from [`Fan::tick`] once the last item
    /// arrives. An empty fan has nothing to place and never completes.
    pub fn place_items(&mut self, now: Instant) {
        if self.slots.is_empty() {
            self.placement = None;
            return;
        }
        let targets = (self.layout)(self.slots.len());
        debug_assert_eq!(targets.len(), self.slots.len());

        let mut pending = Vec::with_capacity(self.slots.len());
        for (slot, target) in self.slots.iter_mut().zip(targets) {
            slot.item
                .animator
                .animate(target, PLACEMENT_STEPS, PLACEMENT_INTERVAL, now);
            pending.push(slot.id);
        }
        self.placement = Some(Placement { pending });
    }

    /// Routes a touch update to the item hosting `node`.
    pub fn handle_touch(
        &mut self,
        node: NodeId,
        touch: TouchInput,
        now: Instant,
    ) -> Option<(ItemId, GestureEvent)> {
        let slot = self.slots.iter_mut().find(|s| s.item.node() == node)?;
        let event = slot.item.gestures.handle(touch, now)?;
        Some((slot.id, event))
    }

    /// Advances every item's animation and fade, applying the results to
    /// the stage.
    pub fn tick(&mut self, now: Instant, stage: &mut Stage) -> Vec<FanEvent> {
        let mut events = Vec::new();
        for slot in &mut self.slots {
            let outcome = slot.item.animator.tick(now);
            if outcome != crate::animation::StepOutcome::Idle {
                stage.set_transform(slot.item.node(), slot.item.animator.current());
            }
            if outcome == crate::animation::StepOutcome::Finished {
                if let Some(placement) = self.placement.as_mut() {
                    placement.pending.retain(|&id| id != slot.id);
                }
            }
            if slot.item.fade.tick(now) || slot.item.fade.is_fading() {
                stage.set_opacity(slot.item.node(), slot.item.fade.current());
            }
        }
        if self
            .placement
            .as_ref()
            .is_some_and(|p| p.pending.is_empty())
        {
            self.placement = None;
            events.push(FanEvent::Placed);
        }
        events
    }
}

impl fmt::Debug for Fan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fan")
            .field("container", &self.container)
            .field("len", &self.slots.len())
            .field("max_items", &self.max_items)
            .finish_non_exhaustive()
    }
}
