//! Window-system independent keys.

/// Keys the viewer reacts to. Characters are lowercase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Escape,
}

/// What the event loop should do after an input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopControl {
    #[default]
    Continue,
    Exit,
}
