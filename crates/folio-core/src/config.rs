//! Attribute-driven configuration.
//!
//! Effects are configured once at mount from `key = value` pairs (the web
//! front-end feeds `data-fx-*` attributes with the prefix stripped). A
//! config change means tearing the effect down and mounting it again.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid number for `{key}`: {value:?}")]
    InvalidNumber { key: String, value: String },
    #[error("invalid colour {0:?}")]
    InvalidColor(String),
    #[error("invalid flag for `{key}`: {value:?}")]
    InvalidFlag { key: String, value: String },
    #[error("unknown value for `{key}`: {value:?}")]
    UnknownVariant { key: String, value: String },
    #[error("`{key}` out of range: {value:?} (expected {expected})")]
    OutOfRange {
        key: String,
        value: String,
        expected: &'static str,
    },
}

pub trait AttrConfig: Default {
    /// Apply one pair. Returns `Ok(false)` when the key is not recognised.
    fn apply(&mut self, key: &str, value: &str) -> Result<bool, ConfigError>;

    /// Named starting point selected with the `preset` key.
    fn preset(name: &str) -> Result<Self, ConfigError> {
        match name.trim() {
            "" | "default" => Ok(Self::default()),
            _ => Err(ConfigError::UnknownVariant {
                key: "preset".to_string(),
                value: name.to_string(),
            }),
        }
    }

    /// Build from pairs: the `preset` key (if any) picks the base, every
    /// other pair is applied on top of it in order.
    fn from_attrs<'a, I>(attrs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let attrs: Vec<(&str, &str)> = attrs.into_iter().collect();
        let mut config = match attrs.iter().find(|(key, _)| *key == "preset") {
            Some((_, name)) => Self::preset(name)?,
            None => Self::default(),
        };
        for (key, value) in attrs {
            if key == "preset" {
                continue;
            }
            if !config.apply(key, value)? {
                log::debug!("[config] ignoring unknown key `{}`", key);
            }
        }
        Ok(config)
    }
}

pub fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}

pub fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// A present-but-empty attribute counts as `true`.
pub fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "" | "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
