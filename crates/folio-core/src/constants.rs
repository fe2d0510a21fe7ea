/// Tuning constants for the beam field, scroll progress and model rig.
///
/// These express intended behavior (jitter ranges, travel distances,
/// smoothing factors) and keep magic numbers out of the per-frame code.
use std::f32::consts::PI;

// ---------------- Beam field defaults ----------------
pub const BEAM_WIDTH: f32 = 2.0; // CSS px before width jitter
pub const BEAM_HEIGHT: f32 = 15.0; // CSS px before height jitter and scale
pub const BEAM_COUNT: usize = 10;
pub const BEAM_LIGHT_COLOR: &str = "#ffffff";
pub const BEAM_SPEED: f32 = 1.5;
pub const BEAM_NOISE_INTENSITY: f32 = 1.25;
pub const BEAM_SCALE: f32 = 0.2;
pub const BEAM_ROTATION_DEG: f32 = 0.0;

// Per-beam jitter ranges, drawn once at construction
pub const BEAM_SPEED_MULT_RANGE: (f32, f32) = (0.6, 1.4);
pub const BEAM_WIDTH_MULT_RANGE: (f32, f32) = (0.6, 1.4);
pub const BEAM_HEIGHT_MULT_RANGE: (f32, f32) = (0.8, 1.6);

// Motion: drift in px per ms per unit speed, wobble in rad per ms and px per unit noise
pub const BEAM_DRIFT_PX_PER_MS: f32 = 0.05;
pub const BEAM_WOBBLE_RATE: f32 = 0.001;
pub const BEAM_WOBBLE_PX: f32 = 10.0;

// Gradient stops (offset, alpha): transparent -> translucent -> opaque tint
pub const BEAM_GRADIENT_STOPS: [(f32, f32); 3] = [(0.0, 0.0), (0.5, 0.25), (1.0, 0.8)];

// ---------------- Scroll progress ----------------
pub const PROGRESS_MIN_DIVISOR: f32 = 1.0;

// ---------------- Object rig ----------------
pub const RIG_MODEL_URL: &str = "/model.glb";
pub const RIG_SCALE: f32 = 1.25;
pub const RIG_TILT_X: f32 = -0.35;
pub const RIG_ROTATION_DAMPING: f32 = 10.0;
pub const RIG_X_AMPLITUDE: f32 = 1.2;
pub const RIG_FIT_MARGIN: f32 = 1.12;
pub const RIG_IDLE_WOBBLE: f32 = 0.08;
pub const RIG_IDLE_WOBBLE_SPEED: f32 = 0.9;
pub const RIG_IDLE_YAW_AMPLITUDE: f32 = PI / 4.0;
pub const RIG_IDLE_YAW_SPEED: f32 = 0.35;

pub const RIG_Y_TRAVEL: f32 = 1.6; // model travels from +Y to -Y over progress
pub const RIG_BOB_AMPLITUDE: f32 = 0.12;
pub const RIG_BOB_SPEED: f32 = 1.6;
pub const RIG_IDLE_WOBBLE_MAX: f32 = 0.35;
pub const RIG_IDLE_YAW_MAX: f32 = PI * 1.1;

// Fit normalization
pub const FIT_TARGET_RADIUS: f32 = 1.6;
pub const FIT_MIN_RADIUS: f32 = 0.0001;
pub const FIT_MARGIN_RANGE: (f32, f32) = (1.05, 2.5);

// Camera
pub const CAMERA_FOV_DEG: f32 = 50.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 200.0;
pub const CAMERA_INITIAL: [f32; 3] = [0.0, 0.0, 4.0];
pub const CAMERA_Y_RANGE: (f32, f32) = (-0.8, 0.8);
pub const CAMERA_FIT_DEPTH_RANGE: (f32, f32) = (1.03, 0.98); // multiples of fit distance
pub const CAMERA_FREE_DEPTH_RANGE: (f32, f32) = (4.8, 4.2); // used when auto-fit is off
pub const CAMERA_SMOOTHING: f32 = 0.12; // per-frame lerp factor
pub const CAMERA_MAX_DPR: f64 = 1.5;

// Material overrides
pub const TINT_COLOR: &str = "#111827";
pub const EMISSIVE_COLOR: &str = "#60a5fa";

// ---------------- Scene lighting ----------------
pub const AMBIENT_INTENSITY: f32 = 0.6;
pub const KEY_LIGHT_POSITION: [f32; 3] = [6.0, 7.0, 10.0];
pub const KEY_LIGHT_INTENSITY: f32 = 1.15;
pub const RIM_LIGHT_POSITION: [f32; 3] = [-6.0, 3.0, -8.0];
pub const RIM_LIGHT_INTENSITY: f32 = 0.35;
pub const POINT_LIGHT_POSITION: [f32; 3] = [-8.0, 6.0, 10.0];
pub const POINT_LIGHT_INTENSITY: f32 = 0.4;
pub const STUDIO_FILL_INTENSITY: f32 = 0.35; // hemispheric stand-in for the environment map
pub const TONE_MAPPING_EXPOSURE: f32 = 1.0;
