use std::collections::HashMap;
use std::time::Duration;

use tracing::trace;

use crate::error::SurfaceError;
use crate::types::{Rect, Size, Viewport};

use super::Surface;

/// Fixed-pitch text layout used to size blurbs without a real renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    pub max_width: f64,
    pub char_width: f64,
    pub line_height: f64,
    pub padding: f64,
}

impl TextMetrics {
    /// Greedy word wrap; words longer than a line are split.
    #[must_use]
    pub fn layout(&self, text: &str) -> Size {
        let inner = (self.max_width - 2.0 * self.padding).max(self.char_width);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let per_line = ((inner / self.char_width).floor() as usize).max(1);

        let mut lines = 0usize;
        let mut widest = 0usize;
        let mut current = 0usize;
        for word in text.split_whitespace() {
            let mut len = word.chars().count();
            while len > per_line {
                if current > 0 {
                    lines += 1;
                }
                lines += 1;
                widest = per_line;
                len -= per_line;
                current = 0;
            }
            let needed = if current == 0 { len } else { current + 1 + len };
            if needed > per_line {
                lines += 1;
                widest = widest.max(current);
                current = len;
            } else {
                current = needed;
            }
        }
        if current > 0 || lines == 0 {
            lines += 1;
            widest = widest.max(current);
        }

        #[allow(clippy::cast_precision_loss)]
        Size::new(
            (widest as f64).mul_add(self.char_width, 2.0 * self.padding),
            (lines as f64).mul_add(self.line_height, 2.0 * self.padding),
        )
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// Observable state of a node held by a [`VirtualSurface`].
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
    pub text: String,
    pub rect: Rect,
    pub opacity: f64,
    pub fade: Option<Duration>,
}

/// In-memory surface. Only live nodes are kept; removal forgets the node.
#[derive(Debug)]
pub struct VirtualSurface {
    viewport: Viewport,
    metrics: TextMetrics,
    next_id: u64,
    removed: usize,
    nodes: HashMap<u64, NodeSnapshot>,
}

impl VirtualSurface {
    #[must_use]
    pub fn new(viewport: Viewport, metrics: TextMetrics) -> Self {
        Self {
            viewport,
            metrics,
            next_id: 1,
            removed: 0,
            nodes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn node(&self, id: u64) -> Option<&NodeSnapshot> {
        self.nodes.get(&id)
    }

    /// Nodes created and not yet removed.
    pub fn live_nodes(&self) -> impl Iterator<Item = (u64, &NodeSnapshot)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Total number of nodes ever created.
    #[must_use]
    pub fn created(&self) -> usize {
        usize::try_from(self.next_id - 1).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub const fn removed(&self) -> usize {
        self.removed
    }

    fn live_mut(&mut self, node: &NodeId) -> Result<&mut NodeSnapshot, SurfaceError> {
        self.nodes.get_mut(&node.0).ok_or(SurfaceError::UnknownNode)
    }
}

impl Surface for VirtualSurface {
    type Node = NodeId;

    fn create_node(&mut self, text: &str) -> Result<NodeId, SurfaceError> {
        let id = self.next_id;
        self.next_id += 1;
        let size = self.metrics.layout(text);
        self.nodes.insert(
            id,
            NodeSnapshot {
                text: text.to_string(),
                rect: Rect::at(0.0, 0.0, size),
                opacity: 1.0,
                fade: None,
            },
        );
        trace!(node = id, width = size.width, height = size.height, "node created");
        Ok(NodeId(id))
    }

    fn measure(&self, node: &NodeId) -> Result<Rect, SurfaceError> {
        self.nodes
            .get(&node.0)
            .map(|snapshot| snapshot.rect)
            .ok_or(SurfaceError::UnknownNode)
    }

    fn set_position(&mut self, node: &NodeId, x: f64, y: f64) -> Result<(), SurfaceError> {
        let snapshot = self.live_mut(node)?;
        snapshot.rect.left = x;
        snapshot.rect.top = y;
        Ok(())
    }

    fn fade_out(&mut self, node: &NodeId, duration: Duration) -> Result<(), SurfaceError> {
        let snapshot = self.live_mut(node)?;
        snapshot.opacity = 0.0;
        snapshot.fade = Some(duration);
        Ok(())
    }

    fn remove(&mut self, node: NodeId) {
        if self.nodes.remove(&node.0).is_some() {
            self.removed += 1;
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
