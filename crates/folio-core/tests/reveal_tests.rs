// Host-side tests for the staggered word reveal.

use folio_core::*;

#[test]
fn words_reveal_in_order() {
    let curve = RevealCurve::HEADLINE;
    for step in 0..=100 {
        let p = step as f32 / 100.0;
        let amounts: Vec<f32> = (0..6).map(|i| curve.amount(p, i)).collect();
        for pair in amounts.windows(2) {
            assert!(pair[0] >= pair[1], "p={p} amounts={amounts:?}");
        }
    }
}

#[test]
fn headline_fully_visible_by_end() {
    let curve = RevealCurve::HEADLINE;
    assert_eq!(curve.amount(0.0, 0), 0.0);
    for i in 0..10 {
        assert_eq!(curve.amount(1.0, i), 1.0, "word {i}");
    }
}

#[test]
fn subtitle_waits_for_its_lead() {
    let curve = RevealCurve::SUBTITLE;
    assert_eq!(curve.amount(0.1, 0), 0.0);
    assert_eq!(curve.amount(0.15, 0), 0.0);
    assert!(curve.amount(0.2, 0) > 0.0);
}

#[test]
fn word_style_slides_up_as_it_fades_in() {
    let curve = RevealCurve::HEADLINE;
    let hidden = curve.word(0.0, 0, false);
    assert_eq!(hidden.opacity, 0.0);
    assert_eq!(hidden.translate_y_px, Some(20.0));
    assert_eq!(hidden.css_transform(), "translateY(20px)");
    let shown = curve.word(1.0, 0, false);
    assert_eq!(shown.opacity, 1.0);
    assert_eq!(shown.translate_y_px, Some(0.0));
}

#[test]
fn reduced_motion_shows_words_without_transform() {
    let style = RevealCurve::SUBTITLE.word(0.0, 3, true);
    assert_eq!(style, WordStyle::VISIBLE);
    assert_eq!(style.css_transform(), "none");
}

#[test]
fn curves_parse_by_name() {
    assert_eq!(RevealCurve::parse("headline").unwrap(), RevealCurve::HEADLINE);
    assert_eq!(RevealCurve::parse("subtitle").unwrap(), RevealCurve::SUBTITLE);
    assert!(RevealCurve::parse("footer").is_err());
}

#[test]
fn split_words_drops_extra_whitespace() {
    assert_eq!(
        split_words("  Building  calm\ninterfaces "),
        vec!["Building", "calm", "interfaces"]
    );
    assert!(split_words("   ").is_empty());
}
