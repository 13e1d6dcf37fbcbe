use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::geometry::{Point, Size};

/// Axis along which a splitter lays out its panes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Left to right.
    #[default]
    Horizontal,
    /// Bottom to top; y grows upward.
    Vertical,
}

impl Orientation {
    pub fn perpendicular(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// Length of `size` along this axis.
    pub fn extent(self, size: Size) -> i32 {
        match self {
            Orientation::Horizontal => size.width,
            Orientation::Vertical => size.height,
        }
    }

    pub fn cross_extent(self, size: Size) -> i32 { self.perpendicular().extent(size) }

    pub fn size(self, extent: i32, cross: i32) -> Size {
        match self {
            Orientation::Horizontal => Size::new(extent, cross),
            Orientation::Vertical => Size::new(cross, extent),
        }
    }

    pub fn offset(self, point: Point) -> i32 {
        match self {
            Orientation::Horizontal => point.x,
            Orientation::Vertical => point.y,
        }
    }

    pub fn point(self, offset: i32, cross: i32) -> Point {
        match self {
            Orientation::Horizontal => Point::new(offset, cross),
            Orientation::Vertical => Point::new(cross, offset),
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" | "h" => Ok(Orientation::Horizontal),
            "vertical" | "v" => Ok(Orientation::Vertical),
            _ => Err(format!("invalid orientation: {s}")),
        }
    }
}

/// How much room a newly added pane asks for along the splitter's axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
    /// An even share of the room. Existing panes are not shrunk.
    #[default]
    Default,
    /// The pane's preferred size.
    Preferred,
    /// The pane's current size.
    Current,
    /// Whatever the existing panes' preferred sizes leave over.
    ExpandToFill,
}
