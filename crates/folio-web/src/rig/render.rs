//! WebGPU renderer for one mounted model.
//!
//! Geometry and the per-instance material copies are uploaded once. Each
//! frame only rewrites the scene uniform (camera, model transform, lights)
//! and draws every primitive.

use super::helpers;
use fnv::FnvHashMap;
use folio_core::constants::*;
use folio_core::{ColorSpace, Material, MaterialOverrides, ModelAsset, RigFrame, TextureSlot};
use glam::{Mat4, Vec3};
use web_sys as web;
use wgpu::util::DeviceExt;

static MODEL_WGSL: &str = include_str!("../../shaders/model.wgsl");

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
    color: [f32; 4],
}

impl ModelVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x4
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    key_light: [f32; 4],
    rim_light: [f32; 4],
    point_light: [f32; 4],
    ambient: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniforms {
    base_color: [f32; 4],
    emissive: [f32; 4],
    params: [f32; 4],
    alpha: [f32; 4],
}

impl MaterialUniforms {
    fn from_material(mat: &Material) -> Self {
        let [er, eg, eb] = mat.emissive;
        Self {
            base_color: mat.base_color,
            emissive: [er, eg, eb, mat.emissive_intensity],
            params: [
                mat.metalness,
                mat.roughness,
                if mat.vertex_colors { 1.0 } else { 0.0 },
                0.0,
            ],
            alpha: [
                mat.alpha_mode.shader_code(),
                mat.alpha_cutoff,
                mat.occlusion_strength,
                0.0,
            ],
        }
    }
}

/// One upload per (image, colour space) pair, shared by every primitive.
type TextureCache = FnvHashMap<(usize, ColorSpace), (wgpu::Texture, wgpu::TextureView)>;

fn ensure_texture(
    cache: &mut TextureCache,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    asset: &ModelAsset,
    slot: Option<TextureSlot>,
) -> Option<(usize, ColorSpace)> {
    let slot = slot?;
    let image = asset.images.get(slot.image)?;
    let key = (slot.image, slot.color_space);
    cache.entry(key).or_insert_with(|| {
        let format = match slot.color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        };
        helpers::upload_rgba8(
            device,
            queue,
            "model_texture",
            image.width,
            image.height,
            format,
            &image.rgba8,
        )
    });
    Some(key)
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    _material_buffer: wgpu::Buffer,
    index_count: u32,
    bind_group: wgpu::BindGroup,
    pipeline: usize,
    blended: bool,
}

/// Index into `ModelRenderer::pipelines`.
fn pipeline_index(double_sided: bool, blended: bool) -> usize {
    usize::from(double_sided) + 2 * usize::from(blended)
}

fn light(direction_from: [f32; 3], intensity: f32) -> [f32; 4] {
    Vec3::from_array(direction_from)
        .normalize_or_zero()
        .extend(intensity)
        .to_array()
}

pub struct ModelRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    view_format: wgpu::TextureFormat,
    pipelines: [wgpu::RenderPipeline; 4],
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    depth: (wgpu::Texture, wgpu::TextureView),
    primitives: Vec<GpuPrimitive>,
    _textures: TextureCache,
    _white: (wgpu::Texture, wgpu::TextureView),
    fov_deg: f32,
}

impl ModelRenderer {
    pub async fn new(
        canvas: &web::HtmlCanvasElement,
        asset: &ModelAsset,
        overrides: &MaterialOverrides,
        fov_deg: f32,
    ) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("rig_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!("request_device error: {:?}", e))?;

        let caps = surface.get_capabilities(&adapter);
        let format = *caps
            .formats
            .first()
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        // Canvas formats are usually plain unorm; render through an sRGB view.
        let view_format = format.add_srgb_suffix();
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: if view_format != format {
                vec![view_format]
            } else {
                vec![]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("model_shader"),
            source: wgpu::ShaderSource::Wgsl(MODEL_WGSL.into()),
        });

        let scene_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        };
        let material_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                texture_entry(4),
                texture_entry(5),
            ],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("model_pl"),
            bind_group_layouts: &[&scene_bgl, &material_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = |double_sided: bool, blended: bool| {
            let cull = if double_sided { None } else { Some(wgpu::Face::Back) };
            helpers::make_model_pipeline(
                &device,
                &layout,
                &shader,
                ModelVertex::layout(),
                view_format,
                cull,
                blended,
            )
        };
        let pipelines = [
            pipeline(false, false),
            pipeline(true, false),
            pipeline(false, true),
            pipeline(true, true),
        ];

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bg"),
            layout: &scene_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("model_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let white = helpers::upload_rgba8(
            &device,
            &queue,
            "white",
            1,
            1,
            wgpu::TextureFormat::Rgba8Unorm,
            &[255, 255, 255, 255],
        );

        let mut textures: TextureCache = FnvHashMap::default();
        let mut primitives = Vec::with_capacity(asset.primitive_count());
        let fallback = Material::default();
        for prim in asset.meshes.iter().flat_map(|m| m.primitives.iter()) {
            if prim.indices.is_empty() {
                continue;
            }
            let shared = prim
                .material
                .and_then(|i| asset.materials.get(i))
                .unwrap_or(&fallback);
            let material = overrides.customize(shared, prim.has_vertex_colors());

            let vertices: Vec<ModelVertex> = (0..prim.positions.len())
                .map(|i| ModelVertex {
                    position: prim.positions[i],
                    normal: prim.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    uv: prim.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                    color: prim
                        .colors
                        .as_ref()
                        .and_then(|c| c.get(i).copied())
                        .unwrap_or([1.0; 4]),
                })
                .collect();
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("model_vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("model_indices"),
                contents: bytemuck::cast_slice(&prim.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("material_uniforms"),
                contents: bytemuck::bytes_of(&MaterialUniforms::from_material(&material)),
                usage: wgpu::BufferUsages::UNIFORM,
            });

            // Missing maps sample white, which leaves every factor unchanged.
            let keys = [
                material.base_color_texture,
                material.emissive_texture,
                material.metallic_roughness_texture,
                material.occlusion_texture,
            ]
            .map(|slot| ensure_texture(&mut textures, &device, &queue, asset, slot));
            let [base_view, emissive_view, metal_rough_view, occlusion_view] = keys.map(|key| {
                key.and_then(|k| textures.get(&k))
                    .map_or(&white.1, |t| &t.1)
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("material_bg"),
                layout: &material_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: material_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(base_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(emissive_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::TextureView(metal_rough_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 5,
                        resource: wgpu::BindingResource::TextureView(occlusion_view),
                    },
                ],
            });
            primitives.push(GpuPrimitive {
                vertex_buffer,
                index_buffer,
                _material_buffer: material_buffer,
                index_count: prim.indices.len() as u32,
                bind_group,
                pipeline: pipeline_index(material.double_sided, material.is_blended()),
                blended: material.is_blended(),
            });
        }
        // Blended primitives composite over everything already drawn.
        primitives.sort_by_key(|p| p.blended);

        let depth = helpers::create_depth_texture(&device, width, height);
        log::info!(
            "[rig] renderer ready: {:?} ({:?}), {} primitives, {} textures",
            view_format,
            alpha_mode,
            primitives.len(),
            textures.len()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            view_format,
            pipelines,
            scene_buffer,
            scene_bind_group,
            depth,
            primitives,
            _textures: textures,
            _white: white,
            fov_deg,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth = helpers::create_depth_texture(&self.device, width, height);
        }
    }

    fn scene_uniforms(&self, frame: &RigFrame) -> SceneUniforms {
        let aspect = self.config.width as f32 / self.config.height.max(1) as f32;
        let proj = Mat4::perspective_rh(
            self.fov_deg.to_radians(),
            aspect,
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        let view_proj = proj * frame.camera.view();
        let model = frame.pose.matrix();
        let normal_matrix = model.inverse().transpose();
        SceneUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            camera_pos: frame.camera.position.extend(1.0).to_array(),
            key_light: light(KEY_LIGHT_POSITION, KEY_LIGHT_INTENSITY),
            rim_light: light(RIM_LIGHT_POSITION, RIM_LIGHT_INTENSITY),
            point_light: Vec3::from_array(POINT_LIGHT_POSITION)
                .extend(POINT_LIGHT_INTENSITY)
                .to_array(),
            ambient: [
                AMBIENT_INTENSITY,
                STUDIO_FILL_INTENSITY,
                TONE_MAPPING_EXPOSURE,
                0.0,
            ],
        }
    }

    pub fn render(&mut self, frame: &RigFrame) -> Result<(), wgpu::SurfaceError> {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.surface.get_current_texture()?
            }
            Err(e) => return Err(e),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.view_format),
            ..Default::default()
        });

        let uniforms = self.scene_uniforms(frame);
        self.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("rig_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("model_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.1,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.scene_bind_group, &[]);
            for prim in &self.primitives {
                rpass.set_pipeline(&self.pipelines[prim.pipeline]);
                rpass.set_bind_group(1, &prim.bind_group, &[]);
                rpass.set_vertex_buffer(0, prim.vertex_buffer.slice(..));
                rpass.set_index_buffer(prim.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..prim.index_count, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}
