use winit::event::WindowEvent;

use super::InputEvent;

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Returns `None` for events not represented by the input subsystem.
pub(crate) fn translate_window_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::PointerMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalSize;

    use super::*;

    #[test]
    fn non_pointer_events_are_ignored() {
        assert_eq!(translate_window_event(&WindowEvent::Focused(true)), None);
        assert_eq!(
            translate_window_event(&WindowEvent::Resized(PhysicalSize::new(10, 10))),
            None
        );
        assert_eq!(translate_window_event(&WindowEvent::CloseRequested), None);
    }
}
