use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved};

use crate::camera::ViewportSize;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveTouch>()
            .add_message::<PointerEvent>()
            .add_systems(Update, collect_pointer_events);
    }
}

/// Pointer input, already normalized for the targeter
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Normalized device coordinates: [-1, 1] on both axes, +Y up
    Move { ndc: Vec2 },
    /// Pointer left the interactive surface
    Leave,
}

/// Window (logical) coordinates, origin top-left, into NDC.
///
/// `None` for a collapsed viewport (minimized window).
pub fn normalize_pointer(position: Vec2, viewport: Vec2) -> Option<Vec2> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    let unit = position / viewport;
    Some(Vec2::new(unit.x * 2.0 - 1.0, 1.0 - unit.y * 2.0))
}

/// The one touch that drives the pointer; other fingers are ignored
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct ActiveTouch(Option<u64>);

pub fn collect_pointer_events(
    viewport: Res<ViewportSize>,
    mut cursor_moved: MessageReader<CursorMoved>,
    mut cursor_left: MessageReader<CursorLeft>,
    mut touch_events: MessageReader<TouchInput>,
    mut active_touch: ResMut<ActiveTouch>,
    mut out: MessageWriter<PointerEvent>,
) {
    for e in cursor_moved.read() {
        if let Some(ndc) = normalize_pointer(e.position, viewport.0) {
            out.write(PointerEvent::Move { ndc });
        }
    }

    if cursor_left.read().count() > 0 {
        out.write(PointerEvent::Leave);
    }

    for ev in touch_events.read() {
        match ev.phase {
            TouchPhase::Started if active_touch.0.is_none() => active_touch.0 = Some(ev.id),
            _ if active_touch.0 != Some(ev.id) => continue,
            _ => {}
        }

        match ev.phase {
            TouchPhase::Started | TouchPhase::Moved => {
                if let Some(ndc) = normalize_pointer(ev.position, viewport.0) {
                    out.write(PointerEvent::Move { ndc });
                }
            }
            TouchPhase::Ended | TouchPhase::Canceled => {
                active_touch.0 = None;
                out.write(PointerEvent::Leave);
            }
        }
    }
}
