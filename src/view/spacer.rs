use crate::common::geometry::Size;
use crate::model::tree::NodeId;
use crate::view::{View, ViewTree};

/// Leaf that draws nothing and only takes up room.
#[derive(Clone, Copy, Debug, Default)]
pub struct Spacer {
    preferred: Option<Size>,
    expand_x: bool,
    expand_y: bool,
}

impl Spacer {
    pub fn new() -> Self { Self::default() }

    pub fn with_preferred_size(mut self, size: Size) -> Self {
        self.preferred = Some(size);
        self
    }

    pub fn with_expand(mut self, expand_x: bool, expand_y: bool) -> Self {
        self.expand_x = expand_x;
        self.expand_y = expand_y;
        self
    }
}

impl View for Spacer {
    fn preferred_size(&self, tree: &ViewTree, _this: NodeId) -> Size {
        self.preferred.unwrap_or_else(|| tree.config().view.default_preferred_size())
    }

    fn is_expand_x(&self, _tree: &ViewTree, _this: NodeId) -> bool { self.expand_x }

    fn is_expand_y(&self, _tree: &ViewTree, _this: NodeId) -> bool { self.expand_y }
}
