//! glTF/GLB decoding into a flat, renderer-agnostic model asset.
//!
//! Decoding runs in two steps so multi-file glTF works without a file
//! system: [`ModelSource::parse`] reads the document and reports the
//! external files it references, the caller fetches them, and
//! [`ModelSource::decode`] builds the asset. Node transforms are baked into
//! vertex data, the whole model is recentred on its bounding-box centre and
//! the bounding sphere is computed once here.

use crate::fit::{Aabb, BoundingSphere};
use crate::material::{AlphaMode, ColorSpace, Material, TextureSlot};
use fnv::FnvHashMap;
use glam::{Mat3, Mat4, Vec3};
use smallvec::SmallVec;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("glTF decode failed: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("asset has no scene")]
    NoScene,
    #[error("asset has no drawable geometry")]
    NoGeometry,
    #[error("external resource {0:?} was not supplied")]
    MissingResource(String),
    #[error("image {0} points outside its buffer")]
    ImageRange(usize),
    #[error("image {index} could not be decoded: {source}")]
    Image {
        index: usize,
        #[source]
        source: image::ImageError,
    },
}

/// Bytes of the files a document references, keyed by the URI exactly as it
/// is written in the document.
pub type ExternalResources = FnvHashMap<String, Vec<u8>>;

#[inline]
fn is_data_uri(uri: &str) -> bool {
    uri.starts_with("data:")
}

/// Resolve a document-relative `uri` against the URL the document came from.
/// Absolute paths and URIs with a scheme are returned unchanged.
pub fn resolve_uri(base_url: &str, uri: &str) -> String {
    if uri.contains(':') || uri.starts_with('/') {
        return uri.to_string();
    }
    let base = base_url.split(&['?', '#'][..]).next().unwrap_or(base_url);
    match base.rfind('/') {
        Some(i) => format!("{}{}", &base[..=i], uri),
        None => uri.to_string(),
    }
}

/// A parsed document whose buffers and images may still live in other files.
pub struct ModelSource {
    document: gltf::Document,
    blob: Option<Vec<u8>>,
}

impl ModelSource {
    pub fn parse(bytes: &[u8]) -> Result<Self, AssetError> {
        let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
        Ok(Self { document, blob })
    }

    /// URIs of buffers and images stored outside this file, in document
    /// order and without duplicates. Embedded data URIs are never listed.
    pub fn external_uris(&self) -> Vec<String> {
        let buffers = self.document.buffers().filter_map(|b| match b.source() {
            gltf::buffer::Source::Uri(uri) => Some(uri),
            gltf::buffer::Source::Bin => None,
        });
        let images = self.document.images().filter_map(|i| match i.source() {
            gltf::image::Source::Uri { uri, .. } => Some(uri),
            gltf::image::Source::View { .. } => None,
        });
        let mut uris: Vec<String> = Vec::new();
        for uri in buffers.chain(images) {
            if !is_data_uri(uri) && !uris.iter().any(|u| u == uri) {
                uris.push(uri.to_string());
            }
        }
        uris
    }

    /// Build the asset. Every URI from [`external_uris`](Self::external_uris)
    /// must be present in `resources`.
    pub fn decode(self, resources: &ExternalResources) -> Result<ModelAsset, AssetError> {
        let Self { document, mut blob } = self;
        let buffers = document
            .buffers()
            .map(|buffer| {
                let data = match buffer.source() {
                    gltf::buffer::Source::Uri(uri) if !is_data_uri(uri) => gltf::buffer::Data(
                        resources
                            .get(uri)
                            .ok_or_else(|| AssetError::MissingResource(uri.to_string()))?
                            .clone(),
                    ),
                    source => gltf::buffer::Data::from_source_and_blob(source, None, &mut blob)?,
                };
                if data.len() < buffer.length() {
                    return Err(AssetError::Gltf(gltf::Error::BufferLength {
                        buffer: buffer.index(),
                        expected: buffer.length(),
                        actual: data.len(),
                    }));
                }
                Ok(data)
            })
            .collect::<Result<Vec<_>, AssetError>>()?;

        let images = document
            .images()
            .map(|image| {
                let index = image.index();
                let encoded: Cow<'_, [u8]> = match image.source() {
                    gltf::image::Source::View { view, .. } => {
                        let start = view.offset();
                        let bytes = buffers
                            .get(view.buffer().index())
                            .and_then(|b| b.get(start..start + view.length()))
                            .ok_or(AssetError::ImageRange(index))?;
                        Cow::Borrowed(bytes)
                    }
                    // Reuses the buffer path for the base64 payload; the
                    // alignment padding it adds is ignored by the decoders.
                    gltf::image::Source::Uri { uri, .. } if is_data_uri(uri) => Cow::Owned(
                        gltf::buffer::Data::from_source(gltf::buffer::Source::Uri(uri), None)?.0,
                    ),
                    gltf::image::Source::Uri { uri, .. } => Cow::Borrowed(
                        resources
                            .get(uri)
                            .ok_or_else(|| AssetError::MissingResource(uri.to_string()))?
                            .as_slice(),
                    ),
                };
                decode_image(index, &encoded)
            })
            .collect::<Result<Vec<_>, AssetError>>()?;

        ModelAsset::build(&document, &buffers, images)
    }
}

#[derive(Clone, Debug, Default)]
pub struct PrimitiveData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Option<Vec<[f32; 4]>>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

impl PrimitiveData {
    #[inline]
    pub fn has_vertex_colors(&self) -> bool {
        self.colors.is_some()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub name: Option<String>,
    pub primitives: SmallVec<[PrimitiveData; 1]>,
}

/// Decoded RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct ModelAsset {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<Material>,
    pub images: Vec<ImageData>,
    pub bounds: BoundingSphere,
}

impl ModelAsset {
    /// Decode a self-contained asset (GLB, or glTF with embedded data URIs).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AssetError> {
        ModelSource::parse(bytes)?.decode(&ExternalResources::default())
    }

    fn build(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        images: Vec<ImageData>,
    ) -> Result<Self, AssetError> {
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or(AssetError::NoScene)?;

        let mut meshes = Vec::new();
        for node in scene.nodes() {
            collect_node(&node, Mat4::IDENTITY, buffers, &mut meshes);
        }

        let bounds = meshes
            .iter()
            .flat_map(|m| m.primitives.iter())
            .flat_map(|p| p.positions.iter())
            .fold(Aabb::EMPTY, |mut aabb, p| {
                aabb.extend(Vec3::from_array(*p));
                aabb
            });
        if bounds.is_empty() {
            return Err(AssetError::NoGeometry);
        }
        let center = bounds.center();
        for p in meshes
            .iter_mut()
            .flat_map(|m| m.primitives.iter_mut())
            .flat_map(|p| p.positions.iter_mut())
        {
            *p = (Vec3::from_array(*p) - center).to_array();
        }
        let sphere = bounds.bounding_sphere();

        let materials = document.materials().map(|m| read_material(&m)).collect();

        log::debug!(
            "[asset] meshes={} materials={} images={} radius={:.4}",
            meshes.len(),
            document.materials().len(),
            images.len(),
            sphere.radius
        );

        Ok(Self {
            meshes,
            materials,
            images,
            bounds: BoundingSphere {
                center: Vec3::ZERO,
                radius: sphere.radius,
            },
        })
    }

    pub fn primitive_count(&self) -> usize {
        self.meshes.iter().map(|m| m.primitives.len()).sum()
    }
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        let primitives = mesh
            .primitives()
            .filter_map(|p| read_primitive(&p, world, buffers))
            .collect::<SmallVec<_>>();
        if !primitives.is_empty() {
            out.push(MeshData {
                name: mesh.name().map(str::to_string),
                primitives,
            });
        }
    }
    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Option<PrimitiveData> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        return None;
    }
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    let positions: Vec<[f32; 3]> = reader
        .read_positions()?
        .map(|p| world.transform_point3(Vec3::from_array(p)).to_array())
        .collect();
    if positions.is_empty() {
        return None;
    }
    let indices: Vec<u32> = match reader.read_indices() {
        Some(ix) => ix.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let normals = match reader.read_normals() {
        Some(ns) => ns
            .map(|n| {
                (normal_matrix * Vec3::from_array(n))
                    .normalize_or_zero()
                    .to_array()
            })
            .collect(),
        None => smooth_normals(&positions, &indices),
    };
    let uvs = match reader.read_tex_coords(0) {
        Some(tc) => tc.into_f32().collect(),
        None => vec![[0.0, 0.0]; positions.len()],
    };
    let colors = reader
        .read_colors(0)
        .map(|c| c.into_rgba_f32().collect::<Vec<_>>());

    Some(PrimitiveData {
        positions,
        normals,
        uvs,
        colors,
        indices,
        material: primitive.material().index(),
    })
}

/// Area-weighted vertex normals for primitives authored without them.
fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from_array(positions[a]);
        let n = (Vec3::from_array(positions[b]) - pa).cross(Vec3::from_array(positions[c]) - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

fn read_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let occlusion = material.occlusion_texture();
    Material {
        name: material.name().map(str::to_string),
        base_color: pbr.base_color_factor(),
        metalness: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
        emissive: material.emissive_factor(),
        emissive_intensity: 1.0,
        alpha_mode: match material.alpha_mode() {
            gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
            gltf::material::AlphaMode::Mask => AlphaMode::Mask,
            gltf::material::AlphaMode::Blend => AlphaMode::Blend,
        },
        alpha_cutoff: material.alpha_cutoff().unwrap_or(0.5),
        base_color_texture: texture_slot(pbr.base_color_texture()),
        emissive_texture: texture_slot(material.emissive_texture()),
        metallic_roughness_texture: texture_slot(pbr.metallic_roughness_texture()),
        occlusion_texture: occlusion.as_ref().map(|o| TextureSlot {
            image: o.texture().source().index(),
            color_space: ColorSpace::Linear,
        }),
        occlusion_strength: occlusion.as_ref().map_or(1.0, |o| o.strength()),
        vertex_colors: false,
        double_sided: material.double_sided(),
    }
}

fn texture_slot(info: Option<gltf::texture::Info<'_>>) -> Option<TextureSlot> {
    info.map(|i| TextureSlot {
        image: i.texture().source().index(),
        color_space: ColorSpace::Linear,
    })
}

fn decode_image(index: usize, encoded: &[u8]) -> Result<ImageData, AssetError> {
    let rgba = image::load_from_memory(encoded)
        .map_err(|source| AssetError::Image { index, source })?
        .to_rgba8();
    Ok(ImageData {
        width: rgba.width(),
        height: rgba.height(),
        rgba8: rgba.into_raw(),
    })
}
