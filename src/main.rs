use bevy::prelude::*;

mod camera;
mod config;
mod input;
mod visual;

use bevy::window::WindowResolution;
use camera::CameraPlugin;
use input::InputPlugin;
use visual::melt::MeltMaterialPlugin;

use crate::visual::plugin::MeltScenePlugin;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Melt".into(),
            resolution: WindowResolution::new(1280, 720),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(ClearColor(Color::srgb(0.04, 0.04, 0.06)))
    .add_plugins(CameraPlugin)
    .add_plugins(InputPlugin)
    .add_plugins(MeltMaterialPlugin)
    .add_plugins(MeltScenePlugin);

    app.run();
}
