//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types. The runtime
//! translates window events into `InputEvent`s and applies them to the window's
//! `InputState`. Positions are physical pixels, matching what shaders see.

mod state;
mod translate;
mod types;

pub use state::InputState;
pub use types::InputEvent;

pub(crate) use translate::translate_window_event;
