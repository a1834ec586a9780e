use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewportSize>()
            .add_systems(Startup, (setup_camera, init_viewport_size))
            .add_systems(Update, track_viewport_size);
    }
}

/// Distance from the camera to the scene origin along +Z
const CAMERA_DISTANCE: f32 = 6.0;

#[derive(Component)]
pub struct MainCamera;

/// Logical size of the primary window, used to normalize pointer input
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize(pub Vec2);

impl Default for ViewportSize {
    fn default() -> Self {
        Self(Vec2::new(1280.0, 720.0))
    }
}

/// Perspective camera looking down -Z at the solid
///
/// ```text
///        Y
///        ↑
///        |
///        +---→ X
///       /
///      ↙ Z (toward the camera)
/// ```
fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 45.0_f32.to_radians(),
            ..default()
        }),
        // LUT-free tonemapper; the LUT feature is not compiled in
        Tonemapping::AcesFitted,
        Transform::from_xyz(0.0, 0.0, CAMERA_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));
}

fn init_viewport_size(
    mut viewport: ResMut<ViewportSize>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if let Ok(window) = windows.single() {
        viewport.0 = window.size();
    }
}

/// Update the viewport when the window is resized
fn track_viewport_size(
    mut resized: MessageReader<WindowResized>,
    mut viewport: ResMut<ViewportSize>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };

    let size = Vec2::new(last.width, last.height);
    if size != viewport.0 {
        viewport.0 = size;
        debug!("Viewport resized to {}x{}", size.x, size.y);
    }
}
