use bitflags::bitflags;

use crate::common::geometry::Point;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// A pointer event. `position` is relative to the view receiving it and is
/// rebased as the event is routed down the tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouseEvent {
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub fn new(position: Point) -> Self { MouseEvent { position, ..Default::default() } }

    pub fn with_button(self, button: MouseButton) -> Self { MouseEvent { button, ..self } }

    pub fn with_modifiers(self, modifiers: Modifiers) -> Self { MouseEvent { modifiers, ..self } }

    /// The same event seen from a child whose origin is `origin`.
    pub fn to_local(&self, origin: Point) -> MouseEvent {
        MouseEvent { position: self.position - origin, ..*self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: char,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: char) -> Self { KeyEvent { key, modifiers: Modifiers::empty() } }
}
