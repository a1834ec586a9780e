use crate::config::load_config;
use crate::input::collect_pointer_events;
use crate::visual::interactions::target_pointer;
use crate::visual::melt::{drive_frame, publish_influence, setup_melt, spin_solids};
use crate::visual::setup::setup_scene;
use bevy::prelude::*;

pub struct MeltScenePlugin;

impl Plugin for MeltScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (load_config, setup_melt, setup_scene).chain())
            .add_systems(
                Update,
                (
                    // Input only ever replaces the raw target
                    target_pointer,
                    // One tick: smooth, publish, then move things
                    drive_frame,
                    publish_influence,
                    spin_solids,
                )
                    .chain()
                    .after(collect_pointer_events),
            );
    }
}
