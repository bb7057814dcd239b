/// Platform-agnostic input events consumed by [`InputState`](super::InputState).
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved; physical pixels relative to the window's top-left corner.
    PointerMoved { x: f32, y: f32 },

    /// Pointer left the window.
    PointerLeft,
}
