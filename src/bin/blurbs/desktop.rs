//! Desktop notification backend. Geometry still comes from the in-memory
//! layout; every committed blurb is additionally shown as a notification.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use blurbs::error::SurfaceError;
use blurbs::surface::{NodeId, Surface, VirtualSurface};
use blurbs::types::{Rect, Viewport};
use notify_rust::{Notification, NotificationHandle, Timeout};
use tracing::{debug, trace};

pub struct DesktopSurface {
    layout: VirtualSurface,
    appname: String,
    icon: Option<PathBuf>,
    shown: HashMap<u64, NotificationHandle>,
}

impl DesktopSurface {
    pub fn new(layout: VirtualSurface, appname: String, icon: Option<PathBuf>) -> Self {
        Self {
            layout,
            appname,
            icon,
            shown: HashMap::new(),
        }
    }

    fn show(&self, text: &str) -> Result<NotificationHandle, SurfaceError> {
        let mut builder = Notification::new();
        builder
            .summary(&self.appname)
            .body(text)
            .appname(&self.appname)
            .timeout(Timeout::Never);
        if let Some(icon) = &self.icon {
            builder.icon(&icon.to_string_lossy());
        }
        builder
            .show()
            .map_err(|err| SurfaceError::Backend(err.to_string()))
    }
}

impl Surface for DesktopSurface {
    type Node = NodeId;

    fn create_node(&mut self, text: &str) -> Result<NodeId, SurfaceError> {
        self.layout.create_node(text)
    }

    fn measure(&self, node: &NodeId) -> Result<Rect, SurfaceError> {
        self.layout.measure(node)
    }

    fn set_position(&mut self, node: &NodeId, x: f64, y: f64) -> Result<(), SurfaceError> {
        self.layout.set_position(node, x, y)?;
        let text = self
            .layout
            .node(node.raw())
            .map(|snapshot| snapshot.text.clone())
            .ok_or(SurfaceError::UnknownNode)?;
        let handle = self.show(&text)?;
        trace!(node = node.raw(), x, y, "desktop notification shown");
        self.shown.insert(node.raw(), handle);
        Ok(())
    }

    fn fade_out(&mut self, node: &NodeId, duration: Duration) -> Result<(), SurfaceError> {
        // Notifications cannot fade; they are closed when the node goes away.
        debug!(node = node.raw(), ?duration, "fade requested");
        self.layout.fade_out(node, duration)
    }

    fn remove(&mut self, node: NodeId) {
        if let Some(handle) = self.shown.remove(&node.raw()) {
            handle.close();
        }
        self.layout.remove(node);
    }

    fn viewport(&self) -> Viewport {
        self.layout.viewport()
    }
}
