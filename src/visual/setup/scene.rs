use bevy::prelude::*;

use crate::{
    config::MeltConfig,
    visual::{
        interactions::pointer::{CollisionMesh, MeltCollider},
        melt::{
            driver::Spin,
            material::{MeltBind, MeltMaterial, SharedInfluence},
        },
        setup::lettering::label_mesh,
    },
};

/// Sphere tessellation; the droop needs dense vertices to read as liquid
const SOLID_SECTORS: u32 = 96;
const SOLID_STACKS: u32 = 64;

/// Marker for the translucent melting solid
#[derive(Component)]
pub struct MeltSolid;

/// Marker for the melting label
#[derive(Component)]
pub struct MeltLabel;

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<MeltMaterial>>,
    shared: Res<SharedInfluence>,
    config: Res<MeltConfig>,
) {
    spawn_solid(&mut commands, &mut meshes, &mut materials, &shared, &config);
    spawn_label(&mut commands, &mut meshes, &mut materials, &shared, &config);

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            // Shadows would come from the rest shape, not the melted one
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(3.0, 5.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        PointLight {
            intensity: 400_000.0,
            range: 30.0,
            ..default()
        },
        Transform::from_xyz(-4.0, -1.0, 3.0),
    ));

    info!("Melt scene created!");
}

fn spawn_solid(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<MeltMaterial>,
    shared: &SharedInfluence,
    config: &MeltConfig,
) {
    let mesh = Sphere::new(config.solid_radius)
        .mesh()
        .uv(SOLID_SECTORS, SOLID_STACKS);
    let collider = CollisionMesh::from_mesh(&mesh);

    let material = StandardMaterial {
        base_color: Color::srgb(0.85, 0.92, 1.0),
        specular_transmission: 0.9,
        thickness: config.solid_radius * 1.5,
        ior: 1.45,
        perceptual_roughness: 0.12,
        reflectance: 0.6,
        ..default()
    }
    .bind_melt(shared);

    let [spin_x, spin_y] = config.spin;
    let mut solid = commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(materials.add(material)),
        Transform::from_xyz(0.0, 0.0, config.plane_depth),
        Spin {
            x: spin_x,
            y: spin_y,
        },
        MeltSolid,
    ));

    match collider {
        Some(collider) => {
            info!(
                "Solid collider: {} triangles",
                collider.triangle_count()
            );
            solid.insert(MeltCollider(collider));
        }
        None => warn!("Solid has no pickable geometry; pointer will use the reference plane"),
    }
}

/// The label is optional: without drawable text the solid melts on its own
fn spawn_label(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<MeltMaterial>,
    shared: &SharedInfluence,
    config: &MeltConfig,
) {
    let label = &config.label;
    let Some(mesh) = label_mesh(&label.text, label.cell_size, label.depth) else {
        warn!("Label {:?} has nothing to draw, skipping it", label.text);
        return;
    };

    let material = StandardMaterial {
        base_color: Color::srgb(1.0, 0.55, 0.2),
        metallic: 0.1,
        perceptual_roughness: 0.35,
        ..default()
    }
    .bind_melt(shared);

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(materials.add(material)),
        Transform::from_translation(config.label_position()),
        MeltLabel,
    ));

    info!("Label {:?} created", label.text);
}
