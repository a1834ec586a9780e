//! Interactive melt effect: smoothing, displacement, material binding and the
//! per-frame driver that ties them to one shared influence block.

pub mod deform;
pub mod driver;
pub mod material;
pub mod smoother;

use bevy::prelude::*;
use bevy::render::storage::ShaderStorageBuffer;

use crate::{config::MeltConfig, visual::interactions::pointer::ReferencePlane};

pub use driver::{MeltState, RawTarget, drive_frame, publish_influence, spin_solids};
pub use material::{MeltMaterialPlugin, SharedInfluence};

/// Startup: create the shared influence block and the state that feeds it
pub fn setup_melt(
    mut commands: Commands,
    mut buffers: ResMut<Assets<ShaderStorageBuffer>>,
    config: Res<MeltConfig>,
) {
    let state = MeltState::from_config(&config);

    commands.insert_resource(SharedInfluence::new(&mut buffers, *state.params()));
    commands.insert_resource(RawTarget(config.far_target()));
    commands.insert_resource(ReferencePlane::facing_camera(config.plane_depth));
    commands.insert_resource(state);
}
