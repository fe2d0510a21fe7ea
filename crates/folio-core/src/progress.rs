use crate::config::ConfigError;
use crate::constants::PROGRESS_MIN_DIVISOR;

/// Clamp to `[0, 1]`. NaN maps to 0.
#[inline]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Geometry read from the page on every scroll/resize event.
///
/// `section_top` is the section's top edge relative to the viewport (as
/// reported by `getBoundingClientRect`), so it decreases as the page scrolls
/// down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollSample {
    pub scroll_y: f32,
    pub viewport_height: f32,
    pub section_top: f32,
    pub section_height: f32,
}

impl ScrollSample {
    /// Section top in document coordinates.
    #[inline]
    pub fn section_top_abs(&self) -> f32 {
        self.scroll_y + self.section_top
    }
}

/// How section geometry maps onto a progress value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressMapping {
    /// Rises from the moment the section's top enters at the bottom of the
    /// viewport until its bottom leaves at the top.
    ViewportEntry,
    /// Rises once the section's top passes the viewport top, reaching 1 when
    /// the section's bottom meets the viewport bottom.
    ScrollThrough,
}

impl ProgressMapping {
    pub fn progress(self, sample: &ScrollSample) -> f32 {
        match self {
            ProgressMapping::ViewportEntry => viewport_entry_progress(
                sample.section_top,
                sample.section_height,
                sample.viewport_height,
            ),
            ProgressMapping::ScrollThrough => scroll_through_progress(
                sample.scroll_y,
                sample.section_top_abs(),
                sample.section_height,
                sample.viewport_height,
            ),
        }
    }

    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim() {
            "viewport-entry" => Ok(ProgressMapping::ViewportEntry),
            "scroll-through" => Ok(ProgressMapping::ScrollThrough),
            _ => Err(ConfigError::UnknownVariant {
                key: "section".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// `clamp01((V - top) / max(1, H + V))`
#[inline]
pub fn viewport_entry_progress(section_top: f32, section_height: f32, viewport_height: f32) -> f32 {
    let total = (section_height + viewport_height).max(PROGRESS_MIN_DIVISOR);
    clamp01((viewport_height - section_top) / total)
}

/// `clamp01((scrollY - sectionTop) / max(1, H - V))`
#[inline]
pub fn scroll_through_progress(
    scroll_y: f32,
    section_top_abs: f32,
    section_height: f32,
    viewport_height: f32,
) -> f32 {
    let range = (section_height - viewport_height).max(PROGRESS_MIN_DIVISOR);
    clamp01((scroll_y - section_top_abs) / range)
}

/// Whole-document progress, used when a consumer has no section of its own.
#[inline]
pub fn document_progress(scroll_top: f32, scroll_height: f32, viewport_height: f32) -> f32 {
    let range = scroll_height - viewport_height;
    if range <= 0.0 {
        return 0.0;
    }
    clamp01(scroll_top / range)
}
