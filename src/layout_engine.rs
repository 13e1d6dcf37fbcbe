mod graph;
mod handle;
mod splitter;

pub use graph::{Orientation, SizePolicy};
pub use handle::SplitterHandle;
pub use splitter::Splitter;

#[cfg(test)]
mod tests;
