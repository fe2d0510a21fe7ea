//! Shared asset materials and their per-instance customized copies.
//!
//! A decoded asset is cached and may back several mounted rigs, so its
//! materials are never edited in place: [`MaterialOverrides::customize`]
//! always returns a fresh copy owned by the caller.

use crate::color::Rgb;
use crate::config::{parse_f32, AttrConfig, ConfigError};
use crate::constants::{EMISSIVE_COLOR, TINT_COLOR};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Data textures, sampled as-is.
    Linear,
    /// Display-referred colour, decoded to linear on sampling.
    Srgb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureSlot {
    pub image: usize,
    pub color_space: ColorSpace,
}

/// How base-colour alpha is treated when drawing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphaMode {
    /// Alpha is ignored; the surface is fully opaque.
    #[default]
    Opaque,
    /// Fragments below the cutoff are dropped, the rest are opaque.
    Mask,
    /// Alpha blends with whatever was drawn behind.
    Blend,
}

impl AlphaMode {
    #[inline]
    pub fn shader_code(self) -> f32 {
        match self {
            AlphaMode::Opaque => 0.0,
            AlphaMode::Mask => 1.0,
            AlphaMode::Blend => 2.0,
        }
    }
}

/// Metal/rough surface description. Colours are scene-linear.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub base_color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub base_color_texture: Option<TextureSlot>,
    pub emissive_texture: Option<TextureSlot>,
    /// Blue channel scales metalness, green scales roughness.
    pub metallic_roughness_texture: Option<TextureSlot>,
    /// Red channel, blended toward 1 by `1 - occlusion_strength`.
    pub occlusion_texture: Option<TextureSlot>,
    pub occlusion_strength: f32,
    pub vertex_colors: bool,
    pub double_sided: bool,
}

impl Default for Material {
    /// glTF's default material: white, fully metallic, fully rough.
    fn default() -> Self {
        Self {
            name: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            metalness: 1.0,
            roughness: 1.0,
            emissive: [0.0, 0.0, 0.0],
            emissive_intensity: 1.0,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            base_color_texture: None,
            emissive_texture: None,
            metallic_roughness_texture: None,
            occlusion_texture: None,
            occlusion_strength: 1.0,
            vertex_colors: false,
            double_sided: false,
        }
    }
}

impl Material {
    pub fn color_textures(&self) -> impl Iterator<Item = &TextureSlot> {
        self.base_color_texture
            .iter()
            .chain(self.emissive_texture.iter())
    }

    #[inline]
    pub fn is_blended(&self) -> bool {
        self.alpha_mode == AlphaMode::Blend
    }

    /// Output alpha for a fragment whose sampled base alpha is `alpha`, or
    /// `None` when a masked fragment is dropped. The model shader applies
    /// the same rule.
    pub fn coverage(&self, alpha: f32) -> Option<f32> {
        match self.alpha_mode {
            AlphaMode::Opaque => Some(1.0),
            AlphaMode::Mask if alpha < self.alpha_cutoff => None,
            AlphaMode::Mask => Some(1.0),
            AlphaMode::Blend => Some(alpha.clamp(0.0, 1.0)),
        }
    }
}

/// Optional look adjustments applied on top of the authored materials. The
/// default leaves every material visually unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialOverrides {
    pub tint_color: Rgb,
    pub tint_strength: f32,
    pub metalness: Option<f32>,
    pub roughness: Option<f32>,
    pub emissive_color: Rgb,
    pub emissive_intensity: f32,
}

impl Default for MaterialOverrides {
    fn default() -> Self {
        Self {
            tint_color: Rgb::from_hex(TINT_COLOR).unwrap_or(Rgb::WHITE),
            tint_strength: 0.0,
            metalness: None,
            roughness: None,
            emissive_color: Rgb::from_hex(EMISSIVE_COLOR).unwrap_or(Rgb::WHITE),
            emissive_intensity: 0.0,
        }
    }
}

impl MaterialOverrides {
    /// Copy `shared` and apply the overrides to the copy.
    ///
    /// Colour-bearing textures are always tagged sRGB; `has_vertex_colors`
    /// reflects the mesh the copy is destined for.
    pub fn customize(&self, shared: &Material, has_vertex_colors: bool) -> Material {
        let mut mat = shared.clone();

        if has_vertex_colors {
            mat.vertex_colors = true;
        }
        for slot in [&mut mat.base_color_texture, &mut mat.emissive_texture]
            .into_iter()
            .flatten()
        {
            slot.color_space = ColorSpace::Srgb;
        }

        if self.tint_strength > 0.0 {
            let k = self.tint_strength.clamp(0.0, 1.0);
            let tint = self.tint_color.to_linear();
            for (c, t) in mat.base_color.iter_mut().zip(tint) {
                *c += (t - *c) * k;
            }
        }
        if let Some(m) = self.metalness {
            mat.metalness = m;
        }
        if let Some(r) = self.roughness {
            mat.roughness = r;
        }
        if self.emissive_intensity > 0.0 {
            mat.emissive = self.emissive_color.to_linear();
            mat.emissive_intensity = self.emissive_intensity;
        }
        mat
    }
}

impl AttrConfig for MaterialOverrides {
    fn apply(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "tint-color" => self.tint_color = Rgb::from_hex(value)?,
            "tint-strength" => self.tint_strength = parse_f32(key, value)?,
            "metalness" => self.metalness = Some(parse_f32(key, value)?),
            "roughness" => self.roughness = Some(parse_f32(key, value)?),
            "emissive-color" => self.emissive_color = Rgb::from_hex(value)?,
            "emissive-intensity" => self.emissive_intensity = parse_f32(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}
