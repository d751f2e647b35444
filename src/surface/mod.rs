mod virtual_surface;

use std::time::Duration;

use crate::error::SurfaceError;
use crate::types::{Rect, Viewport};

pub use virtual_surface::{NodeId, NodeSnapshot, TextMetrics, VirtualSurface};

/// Rendering collaborator that owns the on-screen representation of blurbs.
///
/// Node handles are exclusive: the engine holds each one inside exactly one
/// record and gives it back through [`Surface::remove`].
pub trait Surface {
    type Node;

    /// Materialise a node showing `text`; it is not positioned yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot create the node.
    fn create_node(&mut self, text: &str) -> Result<Self::Node, SurfaceError>;

    /// Occupied rectangle of `node` after layout.
    ///
    /// # Errors
    ///
    /// Returns an error when `node` is unknown to the backend.
    fn measure(&self, node: &Self::Node) -> Result<Rect, SurfaceError>;

    /// # Errors
    ///
    /// Returns an error when `node` is unknown to the backend.
    fn set_position(&mut self, node: &Self::Node, x: f64, y: f64) -> Result<(), SurfaceError>;

    /// Start fading `node` out over `duration`.
    ///
    /// # Errors
    ///
    /// Returns an error when `node` is unknown to the backend.
    fn fade_out(&mut self, node: &Self::Node, duration: Duration) -> Result<(), SurfaceError>;

    fn remove(&mut self, node: Self::Node);

    fn viewport(&self) -> Viewport;
}
