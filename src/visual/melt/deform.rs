use bevy::math::Vec3;
use bevy::render::render_resource::ShaderType;

use crate::config::MeltConfig;

/// Keeps the bulge direction defined when a vertex sits on the influence point
pub const BULGE_EPSILON: f32 = 1e-4;

/// The one influence block every melting material reads.
///
/// Field order matches `Influence` in `assets/shaders/melt.wgsl`.
#[derive(ShaderType, Debug, Clone, Copy, PartialEq)]
pub struct InfluenceParameters {
    /// Smoothed centre of the effect (world space)
    pub point: Vec3,
    /// Falloff distance, must be positive
    pub radius: f32,
    /// Vertical droop at full influence
    pub strength: f32,
    /// Seconds since the driver started
    pub time: f32,
    pub sway_rate: f32,
    pub sway_amplitude: f32,
    pub bulge: f32,
}

impl InfluenceParameters {
    /// Resting block: the point parked at the far-away target, clock at zero
    pub fn from_config(config: &MeltConfig) -> Self {
        Self {
            point: config.far_target(),
            radius: config.radius,
            strength: config.strength,
            time: 0.0,
            sway_rate: config.sway_rate,
            sway_amplitude: config.sway_amplitude,
            bulge: config.bulge,
        }
    }
}

/// Quintic smootherstep: zero first and second derivative at 0 and 1
pub fn liquid(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Falloff weight in [0, 1] for a world-space point
pub fn influence_at(world_pos: Vec3, params: &InfluenceParameters) -> f32 {
    let dist = world_pos.distance(params.point);
    let t = (1.0 - dist / params.radius).clamp(0.0, 1.0);
    liquid(t)
}

/// Displace a local-space vertex toward the influence point.
///
/// `world_pos` is the same vertex after the model transform; the returned
/// position is in local space again. Pure: same inputs, same output.
pub fn melt(local_pos: Vec3, world_pos: Vec3, params: &InfluenceParameters) -> Vec3 {
    let influence = influence_at(world_pos, params);
    let mut out = local_pos;

    // Droop
    out.y -= influence * params.strength;

    // Sway
    out.x += (params.time * params.sway_rate).sin() * influence * params.sway_amplitude;

    // Bulge
    let away = (world_pos - params.point + Vec3::splat(BULGE_EPSILON)).normalize();
    out += away * influence * params.bulge;

    out
}
