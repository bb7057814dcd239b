use super::types::InputEvent;

/// Pointer state for the task window.
#[derive(Debug, Default)]
pub struct InputState {
    /// Pointer position in physical pixels; `None` outside the window.
    pub pointer_pos: Option<(f32, f32)>,

    /// Last position the pointer had inside the window.
    ///
    /// Shaders keep reacting to the last known position after the pointer leaves.
    pub last_pointer_pos: Option<(f32, f32)>,
}

impl InputState {
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::PointerMoved { x, y } => {
                self.pointer_pos = Some((*x, *y));
                self.last_pointer_pos = self.pointer_pos;
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }
        }
    }
}
