use bitflags::bitflags;

use crate::common::geometry::{Point, Rect, Size};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ViewFlags: u8 {
        const VISIBLE = 1 << 0;
        /// A redraw is pending for this node or something below it.
        const REFRESH = 1 << 1;
        const HOVER = 1 << 2;
        const PRESSED = 1 << 3;
        const FOCUSED = 1 << 4;
        /// The node is the root of an on-screen window.
        const WINDOW = 1 << 5;
        /// `destroy` was called while the node was still retained.
        const DESTROYING = 1 << 6;
    }
}

impl Default for ViewFlags {
    fn default() -> Self { ViewFlags::VISIBLE }
}

bitflags! {
    /// Which corners of a view are drawn rounded.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RoundType: u8 {
        const TOP_LEFT = 1 << 0;
        const TOP_RIGHT = 1 << 1;
        const BOTTOM_RIGHT = 1 << 2;
        const BOTTOM_LEFT = 1 << 3;

        const TOP = Self::TOP_LEFT.bits() | Self::TOP_RIGHT.bits();
        const BOTTOM = Self::BOTTOM_LEFT.bits() | Self::BOTTOM_RIGHT.bits();
        const LEFT = Self::TOP_LEFT.bits() | Self::BOTTOM_LEFT.bits();
        const RIGHT = Self::TOP_RIGHT.bits() | Self::BOTTOM_RIGHT.bits();
        const ALL = Self::TOP.bits() | Self::BOTTOM.bits();
    }
}

/// Per-node state owned by the tree rather than by the view object, so it
/// stays readable while the view itself is lent out to one of its hooks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
    pub(crate) position: Point,
    pub(crate) size: Size,
    pub(crate) flags: ViewFlags,
    pub(crate) round_type: RoundType,
    pub(crate) round_radius: f32,
    pub(crate) ref_count: u32,
}

impl ViewState {
    pub fn position(&self) -> Point { self.position }

    pub fn size(&self) -> Size { self.size }

    /// Frame in the parent's coordinate space.
    pub fn rect(&self) -> Rect { Rect::new(self.position, self.size) }

    pub fn flags(&self) -> ViewFlags { self.flags }

    pub fn round_type(&self) -> RoundType { self.round_type }

    pub fn round_radius(&self) -> f32 { self.round_radius }

    pub fn ref_count(&self) -> u32 { self.ref_count }

    pub fn is_visible(&self) -> bool { self.flags.contains(ViewFlags::VISIBLE) }

    pub(crate) fn set(&mut self, flag: ViewFlags, on: bool) -> bool {
        let before = self.flags;
        self.flags.set(flag, on);
        before != self.flags
    }
}
