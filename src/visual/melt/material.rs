//! Melt vertex stage layered on top of any `StandardMaterial`.
//!
//! The extension only owns a handle to the shared influence buffer. Colour,
//! transmission, roughness and every other fragment input stay with the base
//! material; the vertex stage resolves the mesh position the way the base
//! material would, displaces it with [`melt`](super::deform::melt), then
//! projects as usual.
//!
//! A bound material's bind group captures the GPU buffer behind the handle
//! when it is prepared, and a rewritten storage buffer is re-uploaded into a
//! fresh GPU buffer. Publishing therefore touches every reader so the render
//! world rebuilds its bind group against the new contents.

use bevy::pbr::{ExtendedMaterial, MaterialExtension, MaterialPlugin};
use bevy::prelude::*;
use bevy::render::render_resource::AsBindGroup;
use bevy::render::storage::ShaderStorageBuffer;
use bevy::shader::ShaderRef;

use super::deform::InfluenceParameters;

const MELT_SHADER_PATH: &str = "shaders/melt.wgsl";

/// A standard surface material with the melt vertex stage installed
pub type MeltMaterial = ExtendedMaterial<StandardMaterial, MeltExtension>;

pub struct MeltMaterialPlugin;

impl Plugin for MeltMaterialPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<MeltMaterial>::default());
    }
}

#[derive(Asset, AsBindGroup, Reflect, Debug, Clone)]
pub struct MeltExtension {
    /// Bindings 0-99 belong to the base material
    #[storage(100, read_only)]
    pub influence: Handle<ShaderStorageBuffer>,
}

impl MaterialExtension for MeltExtension {
    fn vertex_shader() -> ShaderRef {
        MELT_SHADER_PATH.into()
    }
}

/// Handle to the one influence block shared by every melting material
#[derive(Resource, Debug, Clone)]
pub struct SharedInfluence(pub Handle<ShaderStorageBuffer>);

impl SharedInfluence {
    pub fn new(buffers: &mut Assets<ShaderStorageBuffer>, params: InfluenceParameters) -> Self {
        Self(buffers.add(ShaderStorageBuffer::from(params)))
    }

    /// Overwrite the shared block and mark every material reading it as changed.
    ///
    /// Returns how many bound materials were touched.
    pub fn publish(
        &self,
        buffers: &mut Assets<ShaderStorageBuffer>,
        materials: &mut Assets<MeltMaterial>,
        params: InfluenceParameters,
    ) -> usize {
        let Some(buffer) = buffers.get_mut(&self.0) else {
            return 0;
        };
        buffer.set_data(params);

        let readers: Vec<AssetId<MeltMaterial>> = materials
            .iter()
            .filter(|(_, material)| self.is_read_by(material))
            .map(|(id, _)| id)
            .collect();

        let mut touched = 0;
        for id in readers {
            // Mutable access queues `AssetEvent::Modified`, which re-prepares the bind group
            if materials.get_mut(id).is_some() {
                touched += 1;
            }
        }
        touched
    }

    pub fn is_read_by(&self, material: &MeltMaterial) -> bool {
        material.extension.influence == self.0
    }
}

/// Install the melt vertex stage on a material.
///
/// Binding an already-melting material only re-points its influence handle,
/// so the displacement is never applied twice.
pub trait MeltBind {
    fn bind_melt(self, influence: &SharedInfluence) -> MeltMaterial;
}

impl MeltBind for StandardMaterial {
    fn bind_melt(self, influence: &SharedInfluence) -> MeltMaterial {
        ExtendedMaterial {
            base: self,
            extension: MeltExtension {
                influence: influence.0.clone(),
            },
        }
    }
}

impl MeltBind for MeltMaterial {
    fn bind_melt(mut self, influence: &SharedInfluence) -> MeltMaterial {
        self.extension.influence = influence.0.clone();
        self
    }
}
