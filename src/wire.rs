//! Connectors: short-lived lines showing data moving between two boxes.

use tokio::time::Instant;
use tracing::trace;

use crate::geometry::{self, Rect};
use crate::stage::{Anchor, Stage};

/// draw a connector from the edge of box `from` to the edge of box `to`.
/// returns whether anything was drawn.
pub fn connect(stage: &mut Stage, from: Rect, to: Rect) -> bool {
    match geometry::segment_between(from, to) {
        Some(segment) => {
            stage.add_wire(segment, Instant::now());
            true
        }
        None => {
            trace!("boxes coincide, no connector");
            false
        }
    }
}

/// draw a connector between two anchors. without a container there is
/// nothing to draw on, so nothing happens.
pub fn draw_connector(stage: &mut Stage, from: Anchor, to: Anchor) -> bool {
    let (Some(a), Some(b)) = (stage.anchor_rect(from), stage.anchor_rect(to)) else {
        trace!(%from, %to, "no container, connector skipped");
        return false;
    };
    connect(stage, a, b)
}
