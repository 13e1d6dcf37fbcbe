pub mod common;
pub mod layout_engine;
pub mod model;
pub mod view;

pub use common::geometry::{Point, Rect, Size};
pub use layout_engine::{Orientation, SizePolicy, Splitter, SplitterHandle};
pub use model::tree::{NodeId, TreeError};
pub use view::{Response, View, ViewTree};
