//! Floating photo frame.
//!
//! The picture is loaded once at startup. Any failure (missing file, bad
//! format) is logged and replaced by a drawn placeholder: a pink card with a
//! question mark.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};
use image::{Rgba, RgbaImage};
use wgpu::util::DeviceExt;

use crate::config::Rgb;
use crate::error::TextureError;
use crate::sim::SCENE_OFFSET;

pub const FRAME_POSITION: Vec3 = Vec3::new(2.2, 2.5, 1.8);
pub const FRAME_YAW: f32 = -0.6;
const FRAME_SIZE: (f32, f32) = (1.5, 2.0);
const PHOTO_SIZE: (f32, f32) = (1.2, 1.6);
const PHOTO_CENTER_Y: f32 = 0.1;
const TAPE_SIZE: (f32, f32) = (0.3, 0.08);

const FRAME_COLOR: Rgb = Rgb::new(0xff, 0xf0, 0xf5);
const TAPE_COLOR: Rgb = Rgb::new(0xff, 0xd7, 0x00);
const PLACEHOLDER_BACKGROUND: Rgb = Rgb::new(0xff, 0xda, 0xe9);
const PLACEHOLDER_MARK: Rgb = Rgb::new(0xff, 0x69, 0xb4);

/// Photo pixels and where they came from.
#[derive(Debug, Clone)]
pub struct PhotoImage {
    pub image: RgbaImage,
    pub is_placeholder: bool,
}

impl PhotoImage {
    /// Decode an image file.
    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path)?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();
        Ok(Self {
            image,
            is_placeholder: false,
        })
    }

    /// Load `path`, falling back to the placeholder.
    pub fn load_or_placeholder(path: &Path) -> Self {
        match Self::load(path) {
            Ok(photo) => {
                tracing::info!(
                    "Loaded photo {} ({}x{})",
                    path.display(),
                    photo.image.width(),
                    photo.image.height()
                );
                photo
            }
            Err(e) => {
                tracing::warn!("Photo {} unavailable ({}), using placeholder", path.display(), e);
                Self::placeholder()
            }
        }
    }

    /// A 3:4 pink card with a question mark.
    pub fn placeholder() -> Self {
        const W: u32 = 240;
        const H: u32 = 320;
        let bg = rgba(PLACEHOLDER_BACKGROUND);
        let mark = rgba(PLACEHOLDER_MARK);
        let (cx, cy) = (W as f32 / 2.0, H as f32 * 0.36);

        let image = RgbaImage::from_fn(W, H, |x, y| {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            let (dx, dy) = (px - cx, py - cy);
            let r = (dx * dx + dy * dy).sqrt();

            // Hook: upper half ring plus its right shoulder.
            let hook = (r - 40.0).abs() < 10.0 && (dy < 0.0 || dx > 0.0 && dy < 25.0);
            // Stem dropping from the hook.
            let stem = (px - cx).abs() < 10.0 && py > cy + 30.0 && py < cy + 85.0;
            let neck = py > cy + 25.0 && py < cy + 40.0 && px > cx - 10.0 && px < cx + 40.0;
            let dot_dy = py - (cy + 120.0);
            let dot = (dx * dx + dot_dy * dot_dy).sqrt() < 14.0;

            if hook || stem || neck || dot {
                mark
            } else {
                bg
            }
        });
        Self {
            image,
            is_placeholder: true,
        }
    }
}

fn rgba(c: Rgb) -> Rgba<u8> {
    Rgba([c.r, c.g, c.b, 255])
}

/// Gentle drift applied to the frame: `(rotation, vertical offset)`.
pub fn float_motion(elapsed: f32, speed: f32, rotation_intensity: f32, float_intensity: f32) -> (Vec3, f32) {
    let phase = elapsed / 4.0 * speed;
    let rotation = Vec3::new(
        phase.cos() / 8.0 * rotation_intensity,
        phase.sin() / 8.0 * rotation_intensity,
        phase.sin() / 20.0 * rotation_intensity,
    );
    (rotation, phase.sin() / 10.0 * float_intensity)
}

/// World transform of the frame at `elapsed` seconds.
pub fn frame_transform(elapsed: f32) -> Mat4 {
    let (rotation, lift) = float_motion(elapsed, 2.0, 0.1, 0.5);
    Mat4::from_translation(SCENE_OFFSET + FRAME_POSITION)
        * Mat4::from_rotation_y(FRAME_YAW)
        * Mat4::from_translation(Vec3::new(0.0, lift, 0.0))
        * Mat4::from_quat(Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z))
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct PhotoVertex {
    position: [f32; 3],
    uv: [f32; 2],
    color: [f32; 4],
    /// 0 = flat color, 1 = photo texel.
    tex_mix: f32,
}

impl PhotoVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x4, 3 => Float32];
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct PhotoUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

fn quad(
    out: &mut Vec<PhotoVertex>,
    center: Vec3,
    size: (f32, f32),
    roll: f32,
    color: Vec3,
    tex_mix: f32,
) {
    let rot = Mat4::from_translation(center) * Mat4::from_rotation_z(roll);
    let (hw, hh) = (size.0 / 2.0, size.1 / 2.0);
    let corners = [
        (Vec3::new(-hw, -hh, 0.0), [0.0, 1.0]),
        (Vec3::new(hw, -hh, 0.0), [1.0, 1.0]),
        (Vec3::new(hw, hh, 0.0), [1.0, 0.0]),
        (Vec3::new(-hw, hh, 0.0), [0.0, 0.0]),
    ];
    for i in [0usize, 1, 2, 0, 2, 3] {
        let (p, uv) = corners[i];
        out.push(PhotoVertex {
            position: rot.transform_point3(p).to_array(),
            uv,
            color: color.extend(1.0).to_array(),
            tex_mix,
        });
    }
}

fn frame_vertices() -> Vec<PhotoVertex> {
    let mut v = Vec::with_capacity(18);
    quad(&mut v, Vec3::new(0.0, 0.0, 0.025), FRAME_SIZE, 0.0, FRAME_COLOR.to_linear(), 0.0);
    quad(&mut v, Vec3::new(0.0, PHOTO_CENTER_Y, 0.03), PHOTO_SIZE, 0.0, Vec3::ONE, 1.0);
    quad(&mut v, Vec3::new(0.0, 0.95, 0.04), TAPE_SIZE, 0.05, TAPE_COLOR.to_linear(), 0.0);
    v
}

const PHOTO_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var photo: texture_2d<f32>;
@group(0) @binding(2) var photo_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
    @location(2) tex_mix: f32,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
    @location(3) tex_mix: f32,
) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * uniforms.model * vec4<f32>(position, 1.0);
    out.uv = uv;
    out.color = color;
    out.tex_mix = tex_mix;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(photo, photo_sampler, in.uv);
    return vec4<f32>(mix(in.color.rgb, texel.rgb, in.tex_mix), 1.0);
}
"#;

/// GPU resources for the frame.
pub struct PhotoRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PhotoRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        photo: &PhotoImage,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let (width, height) = photo.image.dimensions();
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("Photo Texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            photo.image.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Photo Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Photo Uniforms"),
            size: std::mem::size_of::<PhotoUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Photo Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Photo Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let vertices = frame_vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Photo Frame Vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Photo Shader"),
            source: wgpu::ShaderSource::Wgsl(PHOTO_SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Photo Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Photo Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<PhotoVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &PhotoVertex::ATTRIBUTES,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, view_proj: Mat4, elapsed: f32) {
        let uniforms = PhotoUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            model: frame_transform(elapsed).to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}
