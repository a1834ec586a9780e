use bevy::prelude::*;
use serde::Deserialize;

const MELT_JSON: &str = include_str!("../assets/melt.json");

/// Tunable numbers for the melt effect and the scene around it.
///
/// Loaded once at startup from the embedded `assets/melt.json`. Any field the
/// file leaves out keeps its `Default` value.
#[derive(Resource, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MeltConfig {
    /// Falloff distance of the effect (world units)
    pub radius: f32,
    /// Vertical droop at full influence
    pub strength: f32,
    /// Fraction of the remaining gap the influence point covers per frame
    pub damping: f32,
    /// Angular rate of the lateral sway (radians per second)
    pub sway_rate: f32,
    /// Lateral sway amplitude at full influence
    pub sway_amplitude: f32,
    /// Outward push away from the influence point at full influence
    pub bulge: f32,
    /// Where the target goes when the pointer leaves the window
    pub far_target: [f32; 3],
    /// Z of the fallback reference plane (the solid's resting depth)
    pub plane_depth: f32,
    /// Rescale `damping` by frame time instead of applying it once per frame
    pub frame_rate_independent: bool,
    /// Frame rate `damping` was tuned at
    pub reference_fps: f32,
    /// Rotation speed of the solid around X and Y (radians per second)
    pub spin: [f32; 2],
    pub solid_radius: f32,
    pub label: LabelConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LabelConfig {
    pub text: String,
    /// Edge length of one font cell
    pub cell_size: f32,
    /// Extrusion depth
    pub depth: f32,
    pub position: [f32; 3],
}

impl Default for MeltConfig {
    fn default() -> Self {
        Self {
            radius: 1.2,
            strength: 0.6,
            damping: 0.025,
            sway_rate: 0.8,
            sway_amplitude: 0.08,
            bulge: 0.1,
            far_target: [9999.0, 9999.0, 9999.0],
            plane_depth: 0.0,
            frame_rate_independent: false,
            reference_fps: 60.0,
            spin: [0.15, 0.25],
            solid_radius: 1.0,
            label: LabelConfig::default(),
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            text: "MELT".to_string(),
            cell_size: 0.12,
            depth: 0.15,
            position: [0.0, -1.9, 0.4],
        }
    }
}

impl MeltConfig {
    /// Load the embedded configuration
    pub fn load() -> Result<Self, String> {
        Self::from_json(MELT_JSON)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: MeltConfig =
            serde_json::from_str(json).map_err(|e| format!("Invalid melt config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if !(self.radius > 0.0) {
            return Err(format!("radius must be positive, got {}", self.radius));
        }
        if !(self.strength >= 0.0) {
            return Err(format!("strength must be non-negative, got {}", self.strength));
        }
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(format!("damping must be in (0, 1), got {}", self.damping));
        }
        if self.frame_rate_independent && !(self.reference_fps > 0.0) {
            return Err(format!(
                "reference_fps must be positive, got {}",
                self.reference_fps
            ));
        }
        Ok(())
    }

    pub fn far_target(&self) -> Vec3 {
        Vec3::from_array(self.far_target)
    }

    pub fn label_position(&self) -> Vec3 {
        Vec3::from_array(self.label.position)
    }
}

/// Startup: install the configuration, falling back to defaults on error
pub fn load_config(mut commands: Commands) {
    let config = MeltConfig::load().unwrap_or_else(|err| {
        warn!("{} - using built-in defaults", err);
        MeltConfig::default()
    });

    info!(
        "Melt config: radius={}, strength={}, damping={}",
        config.radius, config.strength, config.damping
    );
    commands.insert_resource(config);
}
