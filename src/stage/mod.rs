// SPDX-License-Identifier: MPL-2.0
//! Scene graph for the kiosk stage.
//!
//! The stage is a flat arena of nodes with parent/child links, a transform,
//! an opacity, a z-order, an optional background thumbnail, and a size. It
//! holds the state the view renders; no widget or GPU resource lives here,
//! so the fan and video cores can be driven headless in tests.
//!
//! Attachment is the kiosk's notion of "visible": an item counts as present
//! only while its node is reachable from the stage root.

use crate::animation::Transform;
use crate::video::snapshot::Thumbnail;
use iced::Size;

/// Handle to a node in the stage arena.
///
/// Ids are reused after [`Stage::remove`]; holders must drop their handle
/// once the node is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[cfg(test)]
impl NodeId {
    pub(crate) fn test_id(index: usize) -> Self {
        Self(index)
    }
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    transform: Transform,
    opacity: f32,
    z_index: i32,
    size: Size,
    background: Option<Thumbnail>,
}

impl Node {
    fn new(size: Size) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform: Transform::IDENTITY,
            opacity: 1.0,
            z_index: 0,
            size,
            background: None,
        }
    }
}

/// Arena of scene nodes rooted at [`Stage::root`].
#[derive(Debug)]
pub struct Stage {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
    size: Size,
}

impl Stage {
    /// Creates a stage of the given size with an attached root node.
    #[must_use]
    pub fn new(size: Size) -> Self {
        let root_node = Node::new(size);
        Self {
            nodes: vec![Some(root_node)],
            free: Vec::new(),
            root: NodeId(0),
            size,
        }
    }

    /// The root node; always attached.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The stage dimensions.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Resizes the stage (window resize). Placement functions read this
    /// through [`Stage::size`]; callers re-place their content afterwards.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        if let Some(root) = self.node_mut(self.root) {
            root.size = size;
        }
    }

    /// Creates a detached node of the given size.
    pub fn create_node(&mut self, size: Size) -> NodeId {
        let node = Node::new(size);
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Attaches `child` under `parent`, detaching it from any previous
    /// parent first.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(parent != child, "node cannot parent itself");
        self.detach(child);
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Detaches `child` from its parent, leaving the node alive.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.node(child).and_then(|n| n.parent) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
    }

    /// Removes a node and its entire subtree from the arena.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        self.detach(id);
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        self.free.push(id.0);
        for child in node.children {
            self.remove(child);
        }
    }

    /// Whether the node is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = id;
        loop {
            if cursor == self.root {
                return true;
            }
            match self.node(cursor).and_then(|n| n.parent) {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
    }

    /// The node's children, in attachment order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// The node's parent, if attached to one.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn transform(&self, id: NodeId) -> Transform {
        self.node(id).map_or(Transform::IDENTITY, |n| n.transform)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) {
        if let Some(node) = self.node_mut(id) {
            node.transform = transform;
        }
    }

    #[must_use]
    pub fn opacity(&self, id: NodeId) -> f32 {
        self.node(id).map_or(1.0, |n| n.opacity)
    }

    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) {
        if let Some(node) = self.node_mut(id) {
            node.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    #[must_use]
    pub fn z_index(&self, id: NodeId) -> i32 {
        self.node(id).map_or(0, |n| n.z_index)
    }

    pub fn set_z_index(&mut self, id: NodeId, z_index: i32) {
        if let Some(node) = self.node_mut(id) {
            node.z_index = z_index;
        }
    }

    #[must_use]
    pub fn node_size(&self, id: NodeId) -> Size {
        self.node(id).map_or(Size::ZERO, |n| n.size)
    }

    pub fn set_node_size(&mut self, id: NodeId, size: Size) {
        if let Some(node) = self.node_mut(id) {
            node.size = size;
        }
    }

    #[must_use]
    pub fn background(&self, id: NodeId) -> Option<&Thumbnail> {
        self.node(id).and_then(|n| n.background.as_ref())
    }

    pub fn set_background(&mut self, id: NodeId, thumbnail: Thumbnail) {
        if let Some(node) = self.node_mut(id) {
            node.background = Some(thumbnail);
        }
    }

    /// The node's translation in stage coordinates, accumulated through its
    /// ancestor chain. Rotation and scale are ignored; hit areas stay
    /// axis-aligned.
    #[must_use]
    pub fn absolute_translation(&self, id: NodeId) -> (f32, f32) {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            let t = self.transform(node);
            x += t.x;
            y += t.y;
            cursor = self.parent(node);
        }
        (x, y)
    }

    /// The topmost attached node whose axis-aligned bounds contain `point`,
    /// ignoring fully transparent nodes. Scans back-to-front draw order in
    /// reverse, so whatever renders on top wins the hit.
    #[must_use]
    pub fn node_at(&self, point: iced::Point) -> Option<NodeId> {
        for &id in self.draw_order().iter().rev() {
            if id == self.root || self.opacity(id) == 0.0 {
                continue;
            }
            let (x, y) = self.absolute_translation(id);
            let size = self.node_size(id);
            if point.x >= x
                && point.x <= x + size.width
                && point.y >= y
                && point.y <= y + size.height
            {
                return Some(id);
            }
        }
        None
    }

    /// Depth-first traversal from the root, parents before children and
    /// siblings in attachment order. The view renders in this order, then
    /// sorts by z-index.
    #[must_use]
    pub fn draw_order(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut pending = vec![self.root];
        while let Some(id) = pending.pop() {
            order.push(id);
            let children = self.children(id);
            for &child in children.iter().rev() {
                pending.push(child);
            }
        }
        order.sort_by_key(|&id| self.z_index(id));
        order
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }
}
