// Host-side tests for attribute-driven configuration.

use folio_core::constants::*;
use folio_core::*;

#[test]
fn defaults_match_tuning_constants() {
    let beams = BeamConfig::default();
    assert_eq!(beams.beam_width, BEAM_WIDTH);
    assert_eq!(beams.beam_count, BEAM_COUNT);
    assert_eq!(beams.light_color, Rgb::WHITE);
    let rig = RigConfig::default();
    assert_eq!(rig.scale_min, RIG_SCALE);
    assert_eq!(rig.scale_max, RIG_SCALE);
    assert!(rig.auto_fit);
    assert_eq!(rig.model_url, RIG_MODEL_URL);
}

#[test]
fn beam_config_from_attributes() {
    let config = BeamConfig::from_attrs([
        ("beam-width", "3"),
        ("beam-height", " 20 "),
        ("beam-number", "4"),
        ("light-color", "#ff0000"),
        ("rotation", "30"),
        ("unknown-key", "whatever"),
    ])
    .unwrap();
    assert_eq!(config.beam_width, 3.0);
    assert_eq!(config.beam_height, 20.0);
    assert_eq!(config.beam_count, 4);
    assert_eq!(config.light_color, Rgb::new(1.0, 0.0, 0.0));
    assert!((config.rotation_rad() - 30f32.to_radians()).abs() < 1e-6);
    assert_eq!(config.speed, BEAM_SPEED);
}

#[test]
fn bad_values_are_reported() {
    assert_eq!(
        BeamConfig::from_attrs([("speed", "fast")]),
        Err(ConfigError::InvalidNumber {
            key: "speed".to_string(),
            value: "fast".to_string()
        })
    );
    assert!(BeamConfig::from_attrs([("beam-number", "-2")]).is_err());
    assert!(BeamConfig::from_attrs([("scale", "NaN")]).is_err());
    assert!(BeamConfig::from_attrs([("light-color", "#12345")]).is_err());
    assert!(RigConfig::from_attrs([("auto-fit", "maybe")]).is_err());
}

#[test]
fn rig_config_from_attributes_includes_material_keys() {
    let config = RigConfig::from_attrs([
        ("model-url", " /assets/bust.glb "),
        ("auto-fit", "false"),
        ("scale-min", "1"),
        ("scale-max", "2"),
        ("roughness", "0.3"),
        ("tint-strength", "0.25"),
    ])
    .unwrap();
    assert_eq!(config.model_url, "/assets/bust.glb");
    assert!(!config.auto_fit);
    assert_eq!((config.scale_min, config.scale_max), (1.0, 2.0));
    assert_eq!(config.materials.roughness, Some(0.3));
    assert_eq!(config.materials.tint_strength, 0.25);
}

#[test]
fn empty_flag_counts_as_true() {
    assert_eq!(parse_flag("auto-fit", ""), Ok(true));
    assert_eq!(parse_flag("auto-fit", "on"), Ok(true));
    assert_eq!(parse_flag("auto-fit", "0"), Ok(false));
}

#[test]
fn hex_colours_parse_both_forms() {
    assert_eq!(Rgb::from_hex("#fff").unwrap(), Rgb::WHITE);
    assert_eq!(Rgb::from_hex("ffffff").unwrap(), Rgb::WHITE);
    assert_eq!(
        "#60a5fa".parse::<Rgb>().unwrap().to_rgb8(),
        [0x60, 0xa5, 0xfa]
    );
    assert!(Rgb::from_hex("#ggg").is_err());
    assert!(Rgb::from_hex("").is_err());
    assert!(Rgb::from_hex("#ééé").is_err());
}

#[test]
fn presets_differ_from_defaults() {
    let hero = RigConfig::hero();
    assert_eq!(hero.scale_min, 2.82);
    assert_eq!(hero.scale_max, 2.82);
    assert_eq!(hero.fit_margin, 1.08);
    let top = BeamConfig::top_hero();
    assert_eq!(top.beam_count, 12);
    assert_eq!(top.speed, 2.0);
    assert_eq!(top.noise_intensity, 1.75);
}

#[test]
fn preset_key_picks_the_base_config() {
    let config = BeamConfig::from_attrs([("speed", "3"), ("preset", "top-hero")]).unwrap();
    assert_eq!(config.beam_count, 12);
    assert_eq!(config.noise_intensity, 1.75);
    assert_eq!(config.speed, 3.0);

    let rig = RigConfig::from_attrs([("preset", "hero"), ("x-offset", "0")]).unwrap();
    assert_eq!(rig.scale_min, 2.82);
    assert_eq!(rig.x_offset, 0.0);

    assert!(matches!(
        RigConfig::from_attrs([("preset", "villain")]),
        Err(ConfigError::UnknownVariant { .. })
    ));
    assert_eq!(
        MaterialOverrides::from_attrs([("preset", "default")]).unwrap(),
        MaterialOverrides::default()
    );
}

#[test]
fn fov_outside_open_range_is_rejected() {
    for bad in ["0", "180", "-5", "270"] {
        match RigConfig::from_attrs([("fov", bad)]) {
            Err(ConfigError::OutOfRange { key, value, .. }) => {
                assert_eq!(key, "fov");
                assert_eq!(value, bad);
            }
            other => panic!("fov {bad}: expected out of range, got {other:?}"),
        }
    }
    let rig = RigConfig::from_attrs([("fov", "50")]).unwrap();
    assert_eq!(rig.fov_deg, 50.0);
    assert!(RigConfig::from_attrs([("fov", "179.5")]).is_ok());
}
