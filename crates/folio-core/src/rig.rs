//! Scroll-synchronized pose for a single 3D model.
//!
//! [`ObjectRig::update`] is called once per displayed frame with the current
//! progress and frame time. Everything is recomputed from scratch except the
//! damped yaw and the smoothed camera position, which carry over.

use crate::clock::FrameTime;
use crate::config::{parse_f32, parse_flag, AttrConfig, ConfigError};
use crate::constants::*;
use crate::fit::{BoundingSphere, FitParams};
use crate::material::MaterialOverrides;
use crate::progress::clamp01;
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::f32::consts::TAU;

#[derive(Clone, Debug, PartialEq)]
pub struct RigConfig {
    pub model_url: String,
    pub scale_min: f32,
    pub scale_max: f32,
    pub tilt_x: f32,
    pub base_rotation_y: f32,
    pub rotation_damping: f32,
    pub x_amplitude: f32,
    pub x_offset: f32,
    pub auto_fit: bool,
    pub fit_margin: f32,
    pub idle_wobble: f32,
    pub idle_wobble_speed: f32,
    pub idle_yaw_amplitude: f32,
    pub idle_yaw_speed: f32,
    pub fov_deg: f32,
    pub materials: MaterialOverrides,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            model_url: RIG_MODEL_URL.to_string(),
            scale_min: RIG_SCALE,
            scale_max: RIG_SCALE,
            tilt_x: RIG_TILT_X,
            base_rotation_y: 0.0,
            rotation_damping: RIG_ROTATION_DAMPING,
            x_amplitude: RIG_X_AMPLITUDE,
            x_offset: 0.0,
            auto_fit: true,
            fit_margin: RIG_FIT_MARGIN,
            idle_wobble: RIG_IDLE_WOBBLE,
            idle_wobble_speed: RIG_IDLE_WOBBLE_SPEED,
            idle_yaw_amplitude: RIG_IDLE_YAW_AMPLITUDE,
            idle_yaw_speed: RIG_IDLE_YAW_SPEED,
            fov_deg: CAMERA_FOV_DEG,
            materials: MaterialOverrides::default(),
        }
    }
}

impl RigConfig {
    /// Framing used by the landing page's second hero section.
    pub fn hero() -> Self {
        Self {
            scale_min: 2.82,
            scale_max: 2.82,
            tilt_x: 0.0,
            x_amplitude: 0.45,
            x_offset: 0.2,
            fit_margin: 1.08,
            idle_wobble: 0.09,
            idle_wobble_speed: 0.95,
            ..Self::default()
        }
    }
}

impl AttrConfig for RigConfig {
    fn apply(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "model-url" => self.model_url = value.trim().to_string(),
            "scale-min" => self.scale_min = parse_f32(key, value)?,
            "scale-max" => self.scale_max = parse_f32(key, value)?,
            "tilt-x" => self.tilt_x = parse_f32(key, value)?,
            "base-rotation-y" => self.base_rotation_y = parse_f32(key, value)?,
            "rotation-damping" => self.rotation_damping = parse_f32(key, value)?,
            "x-amplitude" => self.x_amplitude = parse_f32(key, value)?,
            "x-offset" => self.x_offset = parse_f32(key, value)?,
            "auto-fit" => self.auto_fit = parse_flag(key, value)?,
            "fit-margin" => self.fit_margin = parse_f32(key, value)?,
            "idle-wobble" => self.idle_wobble = parse_f32(key, value)?,
            "idle-wobble-speed" => self.idle_wobble_speed = parse_f32(key, value)?,
            "idle-yaw-amplitude" => self.idle_yaw_amplitude = parse_f32(key, value)?,
            "idle-yaw-speed" => self.idle_yaw_speed = parse_f32(key, value)?,
            "fov" => {
                let fov = parse_f32(key, value)?;
                if !(fov > 0.0 && fov < 180.0) {
                    return Err(ConfigError::OutOfRange {
                        key: key.to_string(),
                        value: value.to_string(),
                        expected: "0 < fov < 180",
                    });
                }
                self.fov_deg = fov;
            }
            _ => return self.materials.apply(key, value),
        }
        Ok(true)
    }

    fn preset(name: &str) -> Result<Self, ConfigError> {
        match name.trim() {
            "" | "default" => Ok(Self::default()),
            "hero" => Ok(Self::hero()),
            _ => Err(ConfigError::UnknownVariant {
                key: "preset".to_string(),
                value: name.to_string(),
            }),
        }
    }
}

/// Model transform; rotation is Euler XYZ in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Pose {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigFrame {
    pub pose: Pose,
    pub camera: CameraPose,
}

pub struct ObjectRig {
    config: RigConfig,
    fit: Option<FitParams>,
    yaw: f32,
    camera: Vec3,
}

impl ObjectRig {
    pub fn new(config: RigConfig) -> Self {
        let yaw = config.base_rotation_y;
        Self {
            config,
            fit: None,
            yaw,
            camera: Vec3::from_array(CAMERA_INITIAL),
        }
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn fit(&self) -> Option<FitParams> {
        self.fit
    }

    /// Derive fit parameters from the loaded asset's bounds. Computed at most
    /// once per rig; later calls return the cached value. `None` when
    /// auto-fit is disabled.
    pub fn attach_fit(&mut self, bounds: &BoundingSphere) -> Option<FitParams> {
        if !self.config.auto_fit {
            return None;
        }
        if self.fit.is_none() {
            let fit = FitParams::from_sphere(bounds, self.config.fov_deg, self.config.fit_margin);
            log::debug!(
                "[rig] fit radius={:.4} scale={:.4} distance={:.4}",
                fit.radius,
                fit.scale,
                fit.distance
            );
            self.fit = Some(fit);
        }
        self.fit
    }

    #[inline]
    pub fn fit_scale(&self) -> f32 {
        match (self.config.auto_fit, self.fit) {
            (true, Some(fit)) => fit.scale,
            _ => 1.0,
        }
    }

    pub fn update(&mut self, progress: f32, time: FrameTime, reduced_motion: bool) -> RigFrame {
        let t = clamp01(progress);
        let c = &self.config;

        let x = (t * TAU).sin() * c.x_amplitude + c.x_offset;
        let mut y = lerp(RIG_Y_TRAVEL, -RIG_Y_TRAVEL, t);
        if !reduced_motion {
            y += (time.elapsed * RIG_BOB_SPEED).sin() * RIG_BOB_AMPLITUDE;
        }
        let position = Vec3::new(x, y, 0.0);
        let scale = lerp(c.scale_min, c.scale_max, t) * self.fit_scale();

        let rotation_z;
        if reduced_motion {
            self.yaw = c.base_rotation_y;
            rotation_z = 0.0;
        } else {
            let yaw_amp = c.idle_yaw_amplitude.clamp(0.0, RIG_IDLE_YAW_MAX);
            let target_yaw = c.base_rotation_y + yaw_amp * (time.elapsed * c.idle_yaw_speed).sin();
            self.yaw = damp(self.yaw, target_yaw, c.rotation_damping, time.delta);
            rotation_z = (time.elapsed * c.idle_wobble_speed).sin()
                * c.idle_wobble.clamp(0.0, RIG_IDLE_WOBBLE_MAX);
        }
        let rotation = Vec3::new(c.tilt_x, self.yaw, rotation_z);

        let camera_target = Vec3::new(
            0.0,
            lerp(CAMERA_Y_RANGE.0, CAMERA_Y_RANGE.1, t),
            self.camera_depth(t),
        );
        self.camera = if reduced_motion {
            camera_target
        } else {
            self.camera.lerp(camera_target, CAMERA_SMOOTHING)
        };

        RigFrame {
            pose: Pose {
                position,
                rotation,
                scale,
            },
            camera: CameraPose {
                position: self.camera,
                look_at: position,
            },
        }
    }

    fn camera_depth(&self, t: f32) -> f32 {
        match (self.config.auto_fit, self.fit) {
            (true, Some(fit)) => lerp(
                fit.distance * CAMERA_FIT_DEPTH_RANGE.0,
                fit.distance * CAMERA_FIT_DEPTH_RANGE.1,
                t,
            ),
            _ => lerp(CAMERA_FREE_DEPTH_RANGE.0, CAMERA_FREE_DEPTH_RANGE.1, t),
        }
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Frame-rate independent exponential approach of `current` toward `target`.
/// `lambda` is the decay rate per second, `dt` the real elapsed seconds.
#[inline]
pub fn damp(current: f32, target: f32, lambda: f32, dt: f32) -> f32 {
    lerp(current, target, 1.0 - (-lambda * dt.max(0.0)).exp())
}
