use bevy::prelude::*;
use bevy::render::storage::ShaderStorageBuffer;

use crate::config::MeltConfig;

use super::deform::InfluenceParameters;
use super::material::{MeltMaterial, SharedInfluence};
use super::smoother::TargetSmoother;

/// Last pointer-derived world position, replaced whole on every write
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct RawTarget(pub Vec3);

/// Incidental rotation driven by elapsed time (radians per second around X and Y)
#[derive(Component, Debug, Clone, Copy)]
pub struct Spin {
    pub x: f32,
    pub y: f32,
}

impl Spin {
    pub fn rotation_at(&self, elapsed: f32) -> Quat {
        Quat::from_euler(EulerRot::XYZ, elapsed * self.x, elapsed * self.y, 0.0)
    }
}

/// Frame-to-frame state of the melt effect
#[derive(Resource, Debug, Clone)]
pub struct MeltState {
    params: InfluenceParameters,
    smoother: TargetSmoother,
}

impl MeltState {
    pub fn new(params: InfluenceParameters, smoother: TargetSmoother) -> Self {
        Self { params, smoother }
    }

    pub fn from_config(config: &MeltConfig) -> Self {
        let mut smoother = TargetSmoother::new(config.damping, config.far_target());
        if config.frame_rate_independent {
            smoother = smoother.frame_rate_independent(config.reference_fps);
        }

        Self::new(InfluenceParameters::from_config(config), smoother)
    }

    pub fn params(&self) -> &InfluenceParameters {
        &self.params
    }

    pub fn elapsed(&self) -> f32 {
        self.params.time
    }

    /// Advance one frame of `dt` seconds toward `target`
    pub fn tick(&mut self, target: Vec3, dt: f32) -> InfluenceParameters {
        self.params.time += dt.max(0.0);
        self.params.point = self.smoother.step(target, dt);
        self.params
    }
}

/// System: advance time and smooth the influence point
pub fn drive_frame(time: Res<Time>, target: Res<RawTarget>, mut state: ResMut<MeltState>) {
    state.tick(target.0, time.delta_secs());
}

/// System: write the influence block into the shared buffer and flag its readers
pub fn publish_influence(
    state: Res<MeltState>,
    shared: Res<SharedInfluence>,
    mut buffers: ResMut<Assets<ShaderStorageBuffer>>,
    mut materials: ResMut<Assets<MeltMaterial>>,
) {
    shared.publish(&mut buffers, &mut materials, *state.params());
}

/// System: rotate spinning objects as a function of elapsed time
pub fn spin_solids(state: Res<MeltState>, mut spinners: Query<(&Spin, &mut Transform)>) {
    let elapsed = state.elapsed();
    for (spin, mut transform) in &mut spinners {
        transform.rotation = spin.rotation_at(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::melt::deform::melt;
    use crate::visual::melt::material::MeltBind;
    use bevy::asset::AssetPlugin;

    #[derive(Resource, Default)]
    struct ModifiedMaterials(Vec<AssetId<MeltMaterial>>);

    fn record_modified(
        mut events: MessageReader<AssetEvent<MeltMaterial>>,
        mut seen: ResMut<ModifiedMaterials>,
    ) {
        for event in events.read() {
            if let AssetEvent::Modified { id } = event {
                seen.0.push(*id);
            }
        }
    }

    fn driver_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<ShaderStorageBuffer>()
            .init_asset::<MeltMaterial>()
            .init_resource::<ModifiedMaterials>()
            .add_systems(Update, (drive_frame, publish_influence).chain())
            .add_systems(Last, record_modified);

        let config = MeltConfig::default();
        let state = MeltState::from_config(&config);
        let shared = {
            let mut buffers = app.world_mut().resource_mut::<Assets<ShaderStorageBuffer>>();
            SharedInfluence::new(&mut buffers, *state.params())
        };
        app.insert_resource(state)
            .insert_resource(RawTarget(Vec3::ZERO))
            .insert_resource(shared);
        app
    }

    #[test]
    fn test_tick_advances_time_and_point() {
        let mut state = MeltState::from_config(&MeltConfig::default());
        let target = Vec3::new(0.0, 0.0, 0.0);
        let start = state.params().point;

        let params = state.tick(target, 0.5);
        assert_eq!(params.time, 0.5);
        assert!(params.point.distance(target) < start.distance(target));

        state.tick(target, 0.25);
        assert_eq!(state.elapsed(), 0.75);
    }

    #[test]
    fn test_tick_is_deterministic() {
        let mut a = MeltState::from_config(&MeltConfig::default());
        let mut b = MeltState::from_config(&MeltConfig::default());

        for i in 0..50 {
            let target = Vec3::new(i as f32 * 0.01, 0.2, 0.0);
            assert_eq!(a.tick(target, 1.0 / 60.0), b.tick(target, 1.0 / 60.0));
        }
    }

    #[test]
    fn test_pointer_leave_decays_to_neutral() {
        let config = MeltConfig::default();
        let mut state = MeltState::from_config(&config);
        let surface = Vec3::new(0.0, 0.0, config.solid_radius);

        // Pointer resting on the solid
        for _ in 0..600 {
            state.tick(surface, 1.0 / 60.0);
        }
        let params = *state.params();
        assert_ne!(melt(surface, surface, &params), surface);

        // Pointer leaves
        for _ in 0..60 {
            state.tick(config.far_target(), 1.0 / 60.0);
        }
        let params = *state.params();
        for vertex in [surface, Vec3::Y, -Vec3::X, Vec3::new(0.3, -0.9, 0.2)] {
            let displaced = melt(vertex, vertex, &params);
            assert!(displaced.distance(vertex) < 1e-6);
        }
    }

    #[test]
    fn test_publish_marks_bound_materials_modified() {
        let mut app = driver_app();
        let shared = app.world().resource::<SharedInfluence>().clone();
        let bound = app
            .world_mut()
            .resource_mut::<Assets<MeltMaterial>>()
            .add(StandardMaterial::default().bind_melt(&shared));

        for _ in 0..5 {
            app.update();
        }

        let seen = &app.world().resource::<ModifiedMaterials>().0;
        assert!(!seen.is_empty(), "publishing never re-prepared the bound material");
        assert!(seen.iter().all(|id| *id == bound.id()));
    }

    #[test]
    fn test_spin_is_function_of_elapsed_time() {
        let spin = Spin { x: 0.0, y: 1.0 };
        let rotation = spin.rotation_at(std::f32::consts::PI);

        let turned = rotation * Vec3::X;
        assert!((turned - -Vec3::X).length() < 1e-5);
        assert_eq!(spin.rotation_at(0.0), Quat::IDENTITY);
    }
}
