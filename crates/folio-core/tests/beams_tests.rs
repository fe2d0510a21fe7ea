// Host-side tests for the beam field.

use folio_core::constants::*;
use folio_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn field(config: BeamConfig, seed: u64) -> BeamField {
    let mut rng = StdRng::seed_from_u64(seed);
    BeamField::new(config, &mut rng)
}

#[test]
fn jitter_stays_within_ranges() {
    let config = BeamConfig {
        beam_count: 500,
        ..BeamConfig::default()
    };
    let f = field(config, 7);
    assert_eq!(f.beams().len(), 500);
    for b in f.beams() {
        assert!((0.0..1.0).contains(&b.x));
        assert!((0.0..1.0).contains(&b.y));
        assert!((0.0..std::f32::consts::TAU).contains(&b.phase));
        assert!(b.speed_mult >= BEAM_SPEED_MULT_RANGE.0 && b.speed_mult <= BEAM_SPEED_MULT_RANGE.1);
        assert!(b.width_mult >= BEAM_WIDTH_MULT_RANGE.0 && b.width_mult <= BEAM_WIDTH_MULT_RANGE.1);
        assert!(
            b.height_mult >= BEAM_HEIGHT_MULT_RANGE.0 && b.height_mult <= BEAM_HEIGHT_MULT_RANGE.1
        );
    }
}

#[test]
fn beam_count_follows_config() {
    assert_eq!(field(BeamConfig::default(), 1).beams().len(), BEAM_COUNT);
    assert_eq!(field(BeamConfig::top_hero(), 1).beams().len(), 12);
    let empty = BeamConfig {
        beam_count: 0,
        ..BeamConfig::default()
    };
    let f = field(empty, 1);
    let vp = Viewport::new(800.0, 600.0, 2.0);
    assert_eq!(f.quads(&vp, 1234.0).count(), 0);
}

#[test]
fn static_beam_holds_its_initial_position() {
    let config = BeamConfig {
        beam_count: 1,
        speed: 0.0,
        noise_intensity: 0.0,
        ..BeamConfig::default()
    };
    let f = field(config, 99);
    let beam = f.beams()[0];
    let vp = Viewport::new(1280.0, 720.0, 1.0);
    let expected = beam.y * vp.height;
    for step in 0..200 {
        let time_ms = step as f64 * 16.7 + 3.0;
        let quad = f.quads(&vp, time_ms).next().unwrap();
        assert!(
            (quad.y - expected).abs() < 1e-3,
            "beam moved at {time_ms}ms: {} vs {expected}",
            quad.y
        );
        assert_eq!(quad.x, beam.x * vp.width);
    }
    assert!(beam.wrap_period_ms(f.config(), vp.height).is_none());
}

#[test]
fn offset_is_periodic_over_wrap_period() {
    let config = BeamConfig {
        noise_intensity: 0.0,
        ..BeamConfig::default()
    };
    let f = field(config, 3);
    let height = 900.0;
    for beam in f.beams() {
        let period = beam.wrap_period_ms(f.config(), height).unwrap();
        let band = height + beam.height(f.config());
        for k in 0..8 {
            let t0 = 500.0 + k as f64 * 137.0;
            let a = beam.offset_y(f.config(), height, t0);
            let b = beam.offset_y(f.config(), height, t0 + period);
            // Equal modulo the wrap band (guards the seam).
            let diff = (a - b).abs();
            let wrapped = diff.min((band - diff).abs());
            assert!(wrapped < 1e-2, "a={a} b={b} period={period}");
        }
    }
}

#[test]
fn offset_wraps_into_band_even_with_heavy_wobble() {
    let config = BeamConfig {
        noise_intensity: 40.0,
        speed: 3.0,
        ..BeamConfig::default()
    };
    let f = field(config, 11);
    let height = 400.0;
    for beam in f.beams() {
        let h = beam.height(f.config());
        for step in 0..2000 {
            let y = beam.offset_y(f.config(), height, step as f64 * 33.3);
            assert!(y >= -h - 1e-3 && y < height + 1e-3, "y={y} h={h}");
        }
    }
}

#[test]
fn quads_use_effective_size_and_rotation() {
    let config = BeamConfig {
        beam_width: 4.0,
        beam_height: 10.0,
        scale: 0.5,
        rotation_deg: 90.0,
        ..BeamConfig::default()
    };
    let f = field(config, 5);
    let vp = Viewport::new(1000.0, 500.0, 1.5);
    for (quad, beam) in f.quads(&vp, 0.0).zip(f.beams()) {
        assert_eq!(quad.width, 4.0 * beam.width_mult);
        assert_eq!(quad.height, 10.0 * beam.height_mult * 1.5);
        assert!((quad.rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}

#[test]
fn resize_keeps_beams_and_rescales_positions() {
    let f = field(BeamConfig::default(), 21);
    let before: Vec<Beam> = f.beams().to_vec();
    let mut vp = Viewport::new(800.0, 600.0, 1.0);
    let xs_small: Vec<f32> = f.quads(&vp, 0.0).map(|q| q.x).collect();
    vp.resize(1600.0, 600.0, 2.0);
    let xs_large: Vec<f32> = f.quads(&vp, 0.0).map(|q| q.x).collect();
    assert_eq!(f.beams(), before.as_slice());
    for (a, b) in xs_small.iter().zip(&xs_large) {
        assert!((b - a * 2.0).abs() < 1e-3);
    }
    assert_eq!(vp.backing_size(), (3200, 1200));
}

#[test]
fn viewport_rejects_bad_pixel_ratio() {
    let vp = Viewport::new(100.0, 50.0, 0.0);
    assert_eq!(vp.dpr, 1.0);
    let vp = Viewport::new(-5.0, 50.0, f32::NAN);
    assert_eq!(vp.width, 0.0);
    assert_eq!(vp.dpr, 1.0);
}

#[test]
fn gradient_runs_from_transparent_to_opaque_tint() {
    let config = BeamConfig {
        light_color: Rgb::from_hex("#3366ff").unwrap(),
        ..BeamConfig::default()
    };
    let stops = config.gradient_stops();
    assert_eq!(stops[0], (0.0, "rgba(51,102,255,0)".to_string()));
    assert_eq!(stops[1], (0.5, "rgba(51,102,255,0.25)".to_string()));
    assert_eq!(stops[2], (1.0, "rgba(51,102,255,0.8)".to_string()));
}

fn still_beam(y: f32, phase: f32, speed_mult: f32) -> Beam {
    Beam {
        x: 0.5,
        y,
        phase,
        speed_mult,
        width_mult: 1.0,
        height_mult: 1.0,
    }
}

#[test]
fn drift_is_five_hundredths_px_per_ms_times_speed() {
    let config = BeamConfig {
        speed: 1.5,
        noise_intensity: 0.0,
        ..BeamConfig::default()
    };
    // Tall surface so nothing wraps; bar height is 15 * 1.2 = 18.
    let beam = still_beam(0.0, 0.0, 1.0);
    assert!((beam.offset_y(&config, 10_000.0, 1000.0) - 75.0).abs() < 1e-3);
    assert!((beam.offset_y(&config, 10_000.0, 2000.0) - 150.0).abs() < 1e-3);

    let faster = still_beam(0.0, 0.0, 1.2);
    assert!((faster.offset_y(&config, 10_000.0, 1000.0) - 90.0).abs() < 1e-3);
}

#[test]
fn wobble_is_a_ten_px_sine_scaled_by_noise_and_speed_mult() {
    let config = BeamConfig {
        speed: 0.0,
        noise_intensity: 1.25,
        ..BeamConfig::default()
    };
    let beam = still_beam(0.5, 0.3, 1.4);
    let t = 2000.0;
    let expected = 5000.0 + (t * 0.001 + 0.3f64).sin() * 1.25 * 10.0 * 1.4;
    let got = beam.offset_y(&config, 10_000.0, t) as f64;
    assert!((got - expected).abs() < 1e-2, "{got} vs {expected}");

    // A quarter period later the sine has moved on.
    let later = beam.offset_y(&config, 10_000.0, t + 1570.0) as f64;
    let expected_later = 5000.0 + ((t + 1570.0) * 0.001 + 0.3f64).sin() * 17.5;
    assert!((later - expected_later).abs() < 1e-2);
}
