//! Simulation configuration.
//!
//! A configuration has three groups:
//! - [`ParticleSettings`]: capacity, fades, gravity, alpha maps, gradients, easing
//! - [`RenderSettings`]: pass-through flags for the rendering backend
//! - [`EmitterSettings`]: emission timing and the randomized spawn ranges
//!
//! Field names serialize in camelCase so editor exports deserialize directly.
//! Every group is `#[serde(default)]`: missing fields take the documented
//! defaults.

use flare_common::{ColorStop, ConfigError};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Opaque handle to a resolved alpha-map texture.
///
/// Handles are produced by the host's image resolver and consumed by its
/// atlas provider; the simulation only counts them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlphaMapHandle(String);

impl AlphaMapHandle {
    /// Creates a handle from the resolver's texture key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the texture key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.0
    }
}

/// Particle shape mode (pass-through for the renderer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AppearanceMode {
    /// Square/quad particles
    #[default]
    Square,
    /// Circular particles with soft edges
    Circular,
}

impl TryFrom<u8> for AppearanceMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Square),
            1 => Ok(Self::Circular),
            other => Err(format!("unknown appearance mode {other}")),
        }
    }
}

impl From<AppearanceMode> for u8 {
    fn from(mode: AppearanceMode) -> Self {
        match mode {
            AppearanceMode::Square => 0,
            AppearanceMode::Circular => 1,
        }
    }
}

/// Blending mode, numbered like the web renderer's blending constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[allow(missing_docs)]
pub enum BlendingMode {
    None,
    Normal,
    #[default]
    Additive,
    Subtractive,
    Multiply,
}

impl TryFrom<u8> for BlendingMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Normal),
            2 => Ok(Self::Additive),
            3 => Ok(Self::Subtractive),
            4 => Ok(Self::Multiply),
            other => Err(format!("unsupported blending mode {other}")),
        }
    }
}

impl From<BlendingMode> for u8 {
    fn from(mode: BlendingMode) -> Self {
        mode as u8
    }
}

/// Which faces of the particle quad are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[allow(missing_docs)]
pub enum FaceSide {
    #[default]
    Front,
    Back,
    Double,
}

impl TryFrom<u8> for FaceSide {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Front),
            1 => Ok(Self::Back),
            2 => Ok(Self::Double),
            other => Err(format!("unknown face side {other}")),
        }
    }
}

impl From<FaceSide> for u8 {
    fn from(side: FaceSide) -> Self {
        side as u8
    }
}

/// Alpha-map texture filter, numbered like the web renderer's filter constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
#[allow(missing_docs)]
pub enum AlphaMapFilter {
    Nearest,
    #[default]
    Linear,
}

impl TryFrom<u16> for AlphaMapFilter {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1003 => Ok(Self::Nearest),
            1006 => Ok(Self::Linear),
            other => Err(format!("unsupported alpha map filter {other}")),
        }
    }
}

impl From<AlphaMapFilter> for u16 {
    fn from(filter: AlphaMapFilter) -> Self {
        match filter {
            AlphaMapFilter::Nearest => 1003,
            AlphaMapFilter::Linear => 1006,
        }
    }
}

/// Emission timing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnMode {
    /// Spread `rate` particles over `duration` seconds
    #[default]
    Time,
    /// Emit `rate` particles at once
    Burst,
}

/// Visual appearance and behavior of particles.
///
/// Generic over the alpha-map representation: resolved configurations hold
/// [`AlphaMapHandle`]s, editor exports hold path strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticleSettings<M = AlphaMapHandle> {
    /// Pool capacity (maximum live slots)
    pub count: u32,
    /// Color intensity multiplier
    pub intensity: f32,
    /// Size fade window `[in, out]` over eased progress
    pub fade_size: [f32; 2],
    /// Alpha fade window `[in, out]` over eased progress
    pub fade_alpha: [f32; 2],
    /// Alpha-map morph window `[start, end]` over eased progress
    pub fade_alpha_map: [f32; 2],
    /// Constant acceleration
    pub gravity: Vec3,
    /// Alpha maps for the start of a particle's life
    pub alpha_maps_start: Vec<M>,
    /// Alpha maps for the end of a particle's life
    pub alpha_maps_end: Vec<M>,
    /// Gradient rows, each an ordered list of color stops
    pub colors: Vec<Vec<ColorStop>>,
    /// Particle shape mode
    pub appearance: AppearanceMode,
    /// Easing function name
    pub ease_function: String,
}

impl<M> Default for ParticleSettings<M> {
    fn default() -> Self {
        Self {
            count: 1000,
            intensity: 1.0,
            fade_size: [0.1, 0.9],
            fade_alpha: [0.0, 1.0],
            fade_alpha_map: [0.0, 1.0],
            gravity: Vec3::ZERO,
            alpha_maps_start: Vec::new(),
            alpha_maps_end: Vec::new(),
            colors: vec![vec![ColorStop::new("#ffffff", 0.0)]],
            appearance: AppearanceMode::Square,
            ease_function: "easeLinear".to_string(),
        }
    }
}

impl<M> ParticleSettings<M> {
    /// Total number of alpha maps (start and end).
    #[must_use]
    pub fn alpha_map_count(&self) -> usize {
        self.alpha_maps_start.len() + self.alpha_maps_end.len()
    }

    /// Converts the alpha-map representation, keeping every other field.
    pub fn map_alpha_maps<N>(self, mut f: impl FnMut(M) -> N) -> ParticleSettings<N> {
        ParticleSettings {
            count: self.count,
            intensity: self.intensity,
            fade_size: self.fade_size,
            fade_alpha: self.fade_alpha,
            fade_alpha_map: self.fade_alpha_map,
            gravity: self.gravity,
            alpha_maps_start: self.alpha_maps_start.into_iter().map(&mut f).collect(),
            alpha_maps_end: self.alpha_maps_end.into_iter().map(&mut f).collect(),
            colors: self.colors,
            appearance: self.appearance,
            ease_function: self.ease_function,
        }
    }
}

/// Rendering flags. Not simulated; consumed by the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderSettings {
    /// Size of each alpha-map cell in the atlas, in pixels
    pub alpha_map_size: u32,
    /// Alpha-map texture filter
    pub alpha_map_filter: AlphaMapFilter,
    /// Frustum culling for the particle mesh
    pub frustum_culled: bool,
    /// Blending mode
    pub blending_mode: BlendingMode,
    /// Rendered faces
    pub side: FaceSide,
    /// Depth testing
    pub depth_test: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            alpha_map_size: 256,
            alpha_map_filter: AlphaMapFilter::Linear,
            frustum_culled: true,
            blending_mode: BlendingMode::Additive,
            side: FaceSide::Front,
            depth_test: true,
        }
    }
}

impl RenderSettings {
    /// Whether the material expects premultiplied alpha.
    #[must_use]
    pub const fn premultiplied_alpha(&self) -> bool {
        matches!(
            self.blending_mode,
            BlendingMode::Subtractive | BlendingMode::Multiply
        )
    }

    /// Particles never write depth.
    #[must_use]
    pub const fn depth_write(&self) -> bool {
        false
    }
}

/// Emission timing and randomized spawn ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmitterSettings {
    /// Emission cycle length in seconds
    pub duration: f32,
    /// Particles per cycle
    pub rate: u32,
    /// Emission timing mode
    pub spawn_mode: SpawnMode,
    /// 0 keeps the spawn-time emitter position, 1 follows the emitter
    #[serde(rename = "static")]
    pub static_factor: f32,
    /// Rotate trajectories toward world alignment over each particle's life
    pub world_up_right: bool,
    /// Keep emitting after the first `rate` particles
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Seconds before the first emission
    pub delay: f32,
    /// Show the emitter debug marker
    pub debug: bool,
    /// Lifetime range in seconds
    pub lifetime: [f32; 2],
    /// Speed range in units per second
    pub speed: [f32; 2],
    /// Size range
    pub size: [f32; 2],
    /// Minimum spawn position offset
    pub start_position_min: Vec3,
    /// Maximum spawn position offset
    pub start_position_max: Vec3,
    /// Minimum initial rotation, normalized -1..1
    pub start_rotation_min: Vec3,
    /// Maximum initial rotation, normalized -1..1
    pub start_rotation_max: Vec3,
    /// Minimum rotation speed in radians per second
    pub rotation_speed_min: Vec3,
    /// Maximum rotation speed in radians per second
    pub rotation_speed_max: Vec3,
    /// Minimum emission direction
    pub direction_min: Vec3,
    /// Maximum emission direction
    pub direction_max: Vec3,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            duration: 1.0,
            rate: 1000,
            spawn_mode: SpawnMode::Time,
            static_factor: 0.0,
            world_up_right: false,
            looping: false,
            delay: 0.0,
            debug: false,
            lifetime: [0.1, 1.0],
            speed: [5.0, 20.0],
            size: [0.1, 1.0],
            start_position_min: Vec3::ZERO,
            start_position_max: Vec3::ZERO,
            start_rotation_min: Vec3::ZERO,
            start_rotation_max: Vec3::ZERO,
            rotation_speed_min: Vec3::ZERO,
            rotation_speed_max: Vec3::ZERO,
            direction_min: Vec3::ZERO,
            direction_max: Vec3::ZERO,
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Particle appearance and behavior
    pub particles: ParticleSettings,
    /// Rendering flags
    pub render: RenderSettings,
    /// Emission behavior
    pub emitter: EmitterSettings,
}

impl SimulationConfig {
    /// Checks the fields the simulation cannot run without.
    ///
    /// Randomized ranges with `min > max` are accepted as is.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particles.count == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let duration = self.emitter.duration;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "emitter.duration",
                value: duration,
            });
        }

        for (field, value) in [
            ("emitter.delay", self.emitter.delay),
            ("emitter.static", self.emitter.static_factor),
            ("particles.intensity", self.particles.intensity),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }

        Ok(())
    }
}

/// Assigns every `Some` field of a patch onto its target.
macro_rules! merge_fields {
    ($target:expr, $patch:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )+
    };
}

/// Partial update for [`ParticleSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ParticleSettingsPatch {
    pub count: Option<u32>,
    pub intensity: Option<f32>,
    pub fade_size: Option<[f32; 2]>,
    pub fade_alpha: Option<[f32; 2]>,
    pub fade_alpha_map: Option<[f32; 2]>,
    pub gravity: Option<Vec3>,
    pub alpha_maps_start: Option<Vec<AlphaMapHandle>>,
    pub alpha_maps_end: Option<Vec<AlphaMapHandle>>,
    pub colors: Option<Vec<Vec<ColorStop>>>,
    pub appearance: Option<AppearanceMode>,
    pub ease_function: Option<String>,
}

/// Partial update for [`RenderSettings`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct RenderSettingsPatch {
    pub alpha_map_size: Option<u32>,
    pub alpha_map_filter: Option<AlphaMapFilter>,
    pub frustum_culled: Option<bool>,
    pub blending_mode: Option<BlendingMode>,
    pub side: Option<FaceSide>,
    pub depth_test: Option<bool>,
}

/// Partial update for [`EmitterSettings`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct EmitterSettingsPatch {
    pub duration: Option<f32>,
    pub rate: Option<u32>,
    pub spawn_mode: Option<SpawnMode>,
    #[serde(rename = "static")]
    pub static_factor: Option<f32>,
    pub world_up_right: Option<bool>,
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
    pub delay: Option<f32>,
    pub debug: Option<bool>,
    pub lifetime: Option<[f32; 2]>,
    pub speed: Option<[f32; 2]>,
    pub size: Option<[f32; 2]>,
    pub start_position_min: Option<Vec3>,
    pub start_position_max: Option<Vec3>,
    pub start_rotation_min: Option<Vec3>,
    pub start_rotation_max: Option<Vec3>,
    pub rotation_speed_min: Option<Vec3>,
    pub rotation_speed_max: Option<Vec3>,
    pub direction_min: Option<Vec3>,
    pub direction_max: Option<Vec3>,
}

/// Partial configuration, shallow-merged into each group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfigPatch {
    /// Particle settings to overwrite
    pub particles: Option<ParticleSettingsPatch>,
    /// Render settings to overwrite
    pub render: Option<RenderSettingsPatch>,
    /// Emitter settings to overwrite
    pub emitter: Option<EmitterSettingsPatch>,
}

impl SimulationConfigPatch {
    /// Applies the patch onto a configuration.
    pub fn apply_to(self, config: &mut SimulationConfig) {
        if let Some(p) = self.particles {
            merge_fields!(config.particles, p;
                count, intensity, fade_size, fade_alpha, fade_alpha_map, gravity,
                alpha_maps_start, alpha_maps_end, colors, appearance, ease_function,
            );
        }
        if let Some(r) = self.render {
            merge_fields!(config.render, r;
                alpha_map_size, alpha_map_filter, frustum_culled, blending_mode, side, depth_test,
            );
        }
        if let Some(e) = self.emitter {
            merge_fields!(config.emitter, e;
                duration, rate, spawn_mode, static_factor, world_up_right, looping, delay, debug,
                lifetime, speed, size, start_position_min, start_position_max,
                start_rotation_min, start_rotation_max, rotation_speed_min, rotation_speed_max,
                direction_min, direction_max,
            );
        }
    }
}
