//! Random, bounded-retry placement of a blurb on the viewport.
//!
//! Candidates keep clear of the viewport edges, of a square-ish zone around
//! the centre, and of every rectangle already on screen. When no candidate
//! fits within the attempt budget the last one is used anyway and the result
//! is flagged as degraded.

use rand::Rng;

use crate::types::{Rect, Size, Viewport};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementParams {
    /// Distance from the viewport border inside which positions are sampled.
    pub edge_margin: f64,
    /// Hard clamp keeping the whole node on screen.
    pub inner_margin: f64,
    /// Added to the node's longest side to size the central keep-out zone.
    pub center_padding: f64,
    pub max_attempts: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub attempts: u32,
    /// Set when no sample satisfied every constraint.
    pub degraded: bool,
}

impl Placement {
    #[must_use]
    pub const fn rect(&self, size: Size) -> Rect {
        Rect::at(self.x, self.y, size)
    }
}

/// Central keep-out rectangle for a node of `size`.
///
/// With `m = max(w, h) + padding` a node at `(x, y)` touches the zone exactly
/// when its offset from the centred position is at most `m` on both axes.
#[must_use]
pub fn exclusion_zone(size: Size, viewport: Viewport, padding: f64) -> Rect {
    let margin = size.longest_side() + padding;
    let half_w = margin - size.width / 2.0;
    let half_h = margin - size.height / 2.0;
    let (cx, cy) = viewport.center();
    Rect::new(cx - half_w, cy - half_h, half_w * 2.0, half_h * 2.0)
}

pub fn resolve_placement<'a, R>(
    size: Size,
    viewport: Viewport,
    active: impl IntoIterator<Item = &'a Rect> + Clone,
    params: &PlacementParams,
    rng: &mut R,
) -> Placement
where
    R: Rng + ?Sized,
{
    let zone = exclusion_zone(size, viewport, params.center_padding);
    let budget = params.max_attempts.max(1);

    let mut last = (0.0, 0.0);
    for attempt in 1..=budget {
        let x = sample_axis(rng, viewport.width, size.width, params);
        let y = sample_axis(rng, viewport.height, size.height, params);
        last = (x, y);

        let candidate = Rect::at(x, y, size);
        if candidate.intersects(&zone) {
            continue;
        }
        if active.clone().into_iter().any(|rect| candidate.intersects(rect)) {
            continue;
        }
        return Placement {
            x,
            y,
            attempts: attempt,
            degraded: false,
        };
    }

    Placement {
        x: last.0,
        y: last.1,
        attempts: budget,
        degraded: true,
    }
}

fn sample_axis<R>(rng: &mut R, extent: f64, length: f64, params: &PlacementParams) -> f64
where
    R: Rng + ?Sized,
{
    let span = extent - 2.0 * params.edge_margin - length;
    let mut pos = rng.random::<f64>().mul_add(span, params.edge_margin);
    if pos < params.inner_margin {
        pos = params.inner_margin;
    }
    let upper = extent - length - params.inner_margin;
    if pos > upper {
        pos = upper;
    }
    pos
}
