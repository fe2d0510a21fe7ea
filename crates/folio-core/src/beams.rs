use crate::color::Rgb;
use crate::config::{parse_f32, parse_usize, AttrConfig, ConfigError};
use crate::constants::*;
use rand::Rng;
use std::f32::consts::TAU;

/// Parameters of the beam field, fixed for the lifetime of one mount.
#[derive(Clone, Debug, PartialEq)]
pub struct BeamConfig {
    pub beam_width: f32,
    pub beam_height: f32,
    pub beam_count: usize,
    pub light_color: Rgb,
    pub speed: f32,
    pub noise_intensity: f32,
    pub scale: f32,
    pub rotation_deg: f32,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            beam_width: BEAM_WIDTH,
            beam_height: BEAM_HEIGHT,
            beam_count: BEAM_COUNT,
            light_color: Rgb::from_hex(BEAM_LIGHT_COLOR).unwrap_or(Rgb::WHITE),
            speed: BEAM_SPEED,
            noise_intensity: BEAM_NOISE_INTENSITY,
            scale: BEAM_SCALE,
            rotation_deg: BEAM_ROTATION_DEG,
        }
    }
}

impl BeamConfig {
    /// Backdrop used behind the landing page's top hero.
    pub fn top_hero() -> Self {
        Self {
            beam_count: 12,
            speed: 2.0,
            noise_intensity: 1.75,
            ..Self::default()
        }
    }

    #[inline]
    pub fn rotation_rad(&self) -> f32 {
        self.rotation_deg.to_radians()
    }

    /// Gradient stops as `(offset, css colour)`, top of the bar first.
    pub fn gradient_stops(&self) -> [(f32, String); 3] {
        BEAM_GRADIENT_STOPS.map(|(offset, alpha)| (offset, self.light_color.css_rgba(alpha)))
    }
}

impl AttrConfig for BeamConfig {
    fn apply(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "beam-width" => self.beam_width = parse_f32(key, value)?,
            "beam-height" => self.beam_height = parse_f32(key, value)?,
            "beam-number" => self.beam_count = parse_usize(key, value)?,
            "light-color" => self.light_color = Rgb::from_hex(value)?,
            "speed" => self.speed = parse_f32(key, value)?,
            "noise-intensity" => self.noise_intensity = parse_f32(key, value)?,
            "scale" => self.scale = parse_f32(key, value)?,
            "rotation" => self.rotation_deg = parse_f32(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn preset(name: &str) -> Result<Self, ConfigError> {
        match name.trim() {
            "" | "default" => Ok(Self::default()),
            "top-hero" => Ok(Self::top_hero()),
            _ => Err(ConfigError::UnknownVariant {
                key: "preset".to_string(),
                value: name.to_string(),
            }),
        }
    }
}

/// One drifting bar. Position is stored as fractions of the surface so a
/// resize never invalidates it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Beam {
    pub x: f32,
    pub y: f32,
    pub phase: f32,
    pub speed_mult: f32,
    pub width_mult: f32,
    pub height_mult: f32,
}

impl Beam {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            x: rng.gen::<f32>(),
            y: rng.gen::<f32>(),
            phase: rng.gen::<f32>() * TAU,
            speed_mult: jitter(rng, BEAM_SPEED_MULT_RANGE),
            width_mult: jitter(rng, BEAM_WIDTH_MULT_RANGE),
            height_mult: jitter(rng, BEAM_HEIGHT_MULT_RANGE),
        }
    }

    #[inline]
    pub fn width(&self, config: &BeamConfig) -> f32 {
        config.beam_width * self.width_mult
    }

    #[inline]
    pub fn height(&self, config: &BeamConfig) -> f32 {
        config.beam_height * self.height_mult * (1.0 + config.scale)
    }

    /// Vertical translation at `time_ms`, wrapped into `[-h, surface_height)`.
    pub fn offset_y(&self, config: &BeamConfig, surface_height: f32, time_ms: f64) -> f32 {
        let h = self.height(config) as f64;
        let base_y = self.y as f64 * surface_height as f64;
        let period = surface_height as f64 + h;
        if period <= 0.0 {
            return base_y as f32;
        }
        let wobble = (time_ms * BEAM_WOBBLE_RATE as f64 + self.phase as f64).sin()
            * config.noise_intensity as f64
            * BEAM_WOBBLE_PX as f64;
        let drift = time_ms * BEAM_DRIFT_PX_PER_MS as f64 * config.speed as f64;
        let travel = (drift + wobble) * self.speed_mult as f64;
        ((base_y + h + travel).rem_euclid(period) - h) as f32
    }

    /// Time for the drift alone to carry the beam once around the wrap band.
    /// `None` when the beam does not drift.
    pub fn wrap_period_ms(&self, config: &BeamConfig, surface_height: f32) -> Option<f64> {
        let px_per_ms =
            BEAM_DRIFT_PX_PER_MS as f64 * config.speed as f64 * self.speed_mult as f64;
        if px_per_ms.abs() <= f64::EPSILON {
            return None;
        }
        Some((surface_height as f64 + self.height(config) as f64) / px_per_ms.abs())
    }
}

#[inline]
fn jitter<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    lo + rng.gen::<f32>() * (hi - lo)
}

/// Drawing-surface size in CSS pixels plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            dpr: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32, dpr: f32) -> Self {
        let mut vp = Self::default();
        vp.resize(width, height, dpr);
        vp
    }

    pub fn resize(&mut self, width: f32, height: f32, dpr: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    }

    /// Backing-store size in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.dpr) as u32,
            (self.height * self.dpr) as u32,
        )
    }
}

/// Where and how large to paint one beam this frame. The bar is painted in
/// its local frame as the rectangle `(-width / 2, -height, width, 2 * height)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamQuad {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
}

pub struct BeamField {
    config: BeamConfig,
    beams: Vec<Beam>,
}

impl BeamField {
    pub fn new<R: Rng + ?Sized>(config: BeamConfig, rng: &mut R) -> Self {
        let beams = (0..config.beam_count).map(|_| Beam::random(rng)).collect();
        Self { config, beams }
    }

    pub fn config(&self) -> &BeamConfig {
        &self.config
    }

    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    pub fn quads<'a>(
        &'a self,
        viewport: &'a Viewport,
        time_ms: f64,
    ) -> impl Iterator<Item = BeamQuad> + 'a {
        let rotation = self.config.rotation_rad();
        self.beams.iter().map(move |beam| BeamQuad {
            x: beam.x * viewport.width,
            y: beam.offset_y(&self.config, viewport.height, time_ms),
            width: beam.width(&self.config),
            height: beam.height(&self.config),
            rotation,
        })
    }
}
