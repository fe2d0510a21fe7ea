use crate::config::ConfigError;
use crate::progress::clamp01;

/// Staggered per-word fade/slide driven by section progress.
///
/// Word `i` reaches full visibility at
/// `clamp01((progress - lead) * rate - i * stagger) == 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealCurve {
    pub lead: f32,
    pub rate: f32,
    pub stagger: f32,
    pub travel_px: f32,
}

impl RevealCurve {
    pub const HEADLINE: RevealCurve = RevealCurve {
        lead: 0.0,
        rate: 3.0,
        stagger: 0.1,
        travel_px: 20.0,
    };

    pub const SUBTITLE: RevealCurve = RevealCurve {
        lead: 0.15,
        rate: 4.0,
        stagger: 0.05,
        travel_px: 10.0,
    };

    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim() {
            "headline" => Ok(Self::HEADLINE),
            "subtitle" => Ok(Self::SUBTITLE),
            _ => Err(ConfigError::UnknownVariant {
                key: "reveal".to_string(),
                value: value.to_string(),
            }),
        }
    }

    #[inline]
    pub fn amount(&self, progress: f32, index: usize) -> f32 {
        clamp01((progress - self.lead) * self.rate - index as f32 * self.stagger)
    }

    pub fn word(&self, progress: f32, index: usize, reduced_motion: bool) -> WordStyle {
        if reduced_motion {
            return WordStyle::VISIBLE;
        }
        let a = self.amount(progress, index);
        WordStyle {
            opacity: a,
            translate_y_px: Some((1.0 - a) * self.travel_px),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WordStyle {
    pub opacity: f32,
    /// `None` means no transform at all.
    pub translate_y_px: Option<f32>,
}

impl WordStyle {
    pub const VISIBLE: WordStyle = WordStyle {
        opacity: 1.0,
        translate_y_px: None,
    };

    pub fn css_transform(&self) -> String {
        match self.translate_y_px {
            Some(px) => format!("translateY({}px)", px),
            None => "none".to_string(),
        }
    }
}

/// Split text into the words the reveal animates, preserving order.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}
