//! Mix Module
//!
//! The mixing surface itself:
//! - Geometry and palette assets
//! - Live loops and the per-category channels that sequence them
//! - Mixing slots, corner rigs and the session that routes input to them

pub mod asset;
pub mod channel;
pub mod cookable;
pub mod geometry;
pub mod rig;
pub mod session;
pub mod slot;

pub use asset::{Color, LoopAsset, LoopCategory};
pub use channel::Channel;
pub use cookable::{CookableLoop, LoopId};
pub use geometry::{Point, Viewport};
pub use rig::{crossfade_gain, Corner, Rig, SLOT_COLOR};
pub use session::{
    ChannelSnapshot, LoopSnapshot, MixSession, PointerEvent, PointerKind, RigSnapshot,
    SessionSnapshot,
};
pub use slot::{MixingSlot, Quadrant, TouchParameters, TouchTarget, CENTRE_VOLUME, RADIUS_LOOP_PCT};
