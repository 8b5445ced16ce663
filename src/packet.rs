//! The packet: the one token that carries the keystroke around the diagram.

use tracing::trace;

use crate::geometry::{Point, Rect};
use crate::stage::{Anchor, PacketPos, Stage, PACKET_SIZE_PX};
use crate::wire;

/// jump the packet onto `anchor`, leaving a connector behind it.
/// no container means no layout, and nothing moves.
pub fn move_to(stage: &mut Stage, anchor: Anchor) {
    let (Some(from), Some(to)) = (stage.packet_rect(), stage.anchor_rect(anchor)) else {
        trace!(%anchor, "no container, packet not moved");
        return;
    };

    wire::connect(stage, from, to);

    let target = Rect::centred_on(to.centre(), PACKET_SIZE_PX, PACKET_SIZE_PX);
    stage.set_packet(PacketPos::At(Point::new(target.x, target.y)));
}
