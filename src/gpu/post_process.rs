//! Glow post-processing.
//!
//! The scene is rendered into an HDR offscreen texture, then:
//!
//! 1. bright pass + horizontal blur into half-res target A
//! 2. vertical blur from A into half-res target B
//! 3. composite to the surface: scene + glow, ACES tone mapping, vignette,
//!    film noise
//!
//! With glow off the same passes run with zero glow, vignette and noise, so
//! tone mapping stays identical.

use bytemuck::{Pod, Zeroable};

use super::DEPTH_FORMAT;

/// Offscreen color format.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const EXPOSURE: f32 = 1.2;

/// Tunables for one frame of post-processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostParams {
    pub threshold: f32,
    pub smoothing: f32,
    pub intensity: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
    pub noise_opacity: f32,
    pub exposure: f32,
}

impl PostParams {
    pub fn glow() -> Self {
        Self {
            threshold: 0.5,
            smoothing: 0.025,
            intensity: 1.0,
            vignette_offset: 0.1,
            vignette_darkness: 0.8,
            noise_opacity: 0.02,
            exposure: EXPOSURE,
        }
    }

    /// Tone mapping only.
    pub fn plain() -> Self {
        Self {
            intensity: 0.0,
            vignette_darkness: 0.0,
            noise_opacity: 0.0,
            ..Self::glow()
        }
    }

    pub fn for_glow(enabled: bool) -> Self {
        if enabled {
            Self::glow()
        } else {
            Self::plain()
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct PostUniforms {
    threshold: f32,
    smoothing: f32,
    intensity: f32,
    vignette_offset: f32,
    vignette_darkness: f32,
    noise_opacity: f32,
    exposure: f32,
    time: f32,
}

impl PostUniforms {
    fn new(params: &PostParams, time: f32) -> Self {
        Self {
            threshold: params.threshold,
            smoothing: params.smoothing,
            intensity: params.intensity,
            vignette_offset: params.vignette_offset,
            vignette_darkness: params.vignette_darkness,
            noise_opacity: params.noise_opacity,
            exposure: params.exposure,
            time,
        }
    }
}

/// A texture with its default view.
struct RenderTarget {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    fn color(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        Self::new(
            device,
            label,
            width,
            height,
            HDR_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        )
    }
}

/// Render targets that depend on the window size.
struct Targets {
    scene: RenderTarget,
    depth: RenderTarget,
    glow_a: RenderTarget,
    glow_b: RenderTarget,
}

impl Targets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (half_w, half_h) = ((width / 2).max(1), (height / 2).max(1));
        Self {
            scene: RenderTarget::color(device, "Scene Texture", width, height),
            depth: RenderTarget::new(
                device,
                "Scene Depth Texture",
                width,
                height,
                DEPTH_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            ),
            glow_a: RenderTarget::color(device, "Glow Texture A", half_w, half_h),
            glow_b: RenderTarget::color(device, "Glow Texture B", half_w, half_h),
        }
    }
}

/// GPU resources for post-processing.
pub struct PostProcessState {
    targets: Targets,
    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    bright_bind_group: wgpu::BindGroup,
    blur_bind_group: wgpu::BindGroup,
    composite_bind_group: wgpu::BindGroup,
}

impl PostProcessState {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let targets = Targets::new(device, width, height);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Post-Process Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Post-Process Uniforms"),
            size: std::mem::size_of::<PostUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Post-Process Bind Group Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Post-Process Shader"),
            source: wgpu::ShaderSource::Wgsl(POST_SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Post-Process Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = |label: &str, entry: &str, format: wgpu::TextureFormat| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let bright_pipeline = pipeline("Glow Bright Pipeline", "fs_bright_blur_h", HDR_FORMAT);
        let blur_pipeline = pipeline("Glow Blur Pipeline", "fs_blur_v", HDR_FORMAT);
        let composite_pipeline = pipeline("Composite Pipeline", "fs_composite", surface_format);

        let (bright_bind_group, blur_bind_group, composite_bind_group) =
            create_bind_groups(device, &bind_group_layout, &targets, &sampler, &uniform_buffer);

        Self {
            targets,
            sampler,
            bind_group_layout,
            uniform_buffer,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            bright_bind_group,
            blur_bind_group,
            composite_bind_group,
        }
    }

    /// Recreate textures and bind groups after window resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets = Targets::new(device, width, height);
        let (bright, blur, composite) = create_bind_groups(
            device,
            &self.bind_group_layout,
            &self.targets,
            &self.sampler,
            &self.uniform_buffer,
        );
        self.bright_bind_group = bright;
        self.blur_bind_group = blur;
        self.composite_bind_group = composite;
    }

    /// Where the scene pass should draw.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene.view
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.targets.depth.view
    }

    pub fn update(&self, queue: &wgpu::Queue, params: &PostParams, time: f32) {
        let uniforms = PostUniforms::new(params, time);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Encode the glow and composite passes, writing to `output`.
    pub fn run(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let passes = [
            ("Glow Bright Pass", &self.targets.glow_a.view, &self.bright_pipeline, &self.bright_bind_group),
            ("Glow Blur Pass", &self.targets.glow_b.view, &self.blur_pipeline, &self.blur_bind_group),
            ("Composite Pass", output, &self.composite_pipeline, &self.composite_bind_group),
        ];
        for (label, view, pipeline, bind_group) in passes {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
    }
}

fn create_bind_groups(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    targets: &Targets,
    sampler: &wgpu::Sampler,
    uniform_buffer: &wgpu::Buffer,
) -> (wgpu::BindGroup, wgpu::BindGroup, wgpu::BindGroup) {
    let make = |label: &str, first: &wgpu::TextureView, second: &wgpu::TextureView| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(first),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(second),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        })
    };
    (
        make("Glow Bright Bind Group", &targets.scene.view, &targets.scene.view),
        make("Glow Blur Bind Group", &targets.glow_a.view, &targets.glow_a.view),
        make("Composite Bind Group", &targets.scene.view, &targets.glow_b.view),
    )
}

const POST_SHADER: &str = r#"
struct PostUniforms {
    threshold: f32,
    smoothing: f32,
    intensity: f32,
    vignette_offset: f32,
    vignette_darkness: f32,
    noise_opacity: f32,
    exposure: f32,
    time: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0) var primary: texture_2d<f32>;
@group(0) @binding(1) var secondary: texture_2d<f32>;
@group(0) @binding(2) var linear_sampler: sampler;
@group(0) @binding(3) var<uniform> post: PostUniforms;

const BLUR_SPREAD: f32 = 2.0;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}

fn bright(uv: vec2<f32>) -> vec3<f32> {
    let color = textureSample(primary, linear_sampler, uv).rgb;
    let luma = dot(color, vec3<f32>(0.2126, 0.7152, 0.0722));
    let keep = smoothstep(post.threshold, post.threshold + post.smoothing, luma);
    return color * keep;
}

@fragment
fn fs_bright_blur_h(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = 1.0 / vec2<f32>(textureDimensions(primary));
    let stride = vec2<f32>(texel.x * BLUR_SPREAD, 0.0);
    var weights = array<f32, 5>(0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);
    var sum = bright(in.uv) * weights[0];
    for (var i = 1; i < 5; i++) {
        let offset = stride * f32(i);
        sum += (bright(in.uv + offset) + bright(in.uv - offset)) * weights[i];
    }
    return vec4<f32>(sum, 1.0);
}

@fragment
fn fs_blur_v(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = 1.0 / vec2<f32>(textureDimensions(primary));
    let stride = vec2<f32>(0.0, texel.y * BLUR_SPREAD);
    var weights = array<f32, 5>(0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);
    var sum = textureSample(primary, linear_sampler, in.uv).rgb * weights[0];
    for (var i = 1; i < 5; i++) {
        let offset = stride * f32(i);
        sum += (textureSample(primary, linear_sampler, in.uv + offset).rgb
            + textureSample(primary, linear_sampler, in.uv - offset).rgb) * weights[i];
    }
    return vec4<f32>(sum, 1.0);
}

fn rrt_and_odt_fit(v: vec3<f32>) -> vec3<f32> {
    let a = v * (v + 0.0245786) - 0.000090537;
    let b = v * (0.983729 * v + 0.4329510) + 0.238081;
    return a / b;
}

fn aces_filmic(color: vec3<f32>) -> vec3<f32> {
    let input_mat = mat3x3<f32>(
        vec3<f32>(0.59719, 0.07600, 0.02840),
        vec3<f32>(0.35458, 0.90834, 0.13383),
        vec3<f32>(0.04823, 0.01566, 0.83777),
    );
    let output_mat = mat3x3<f32>(
        vec3<f32>(1.60475, -0.10208, -0.00327),
        vec3<f32>(-0.53108, 1.10813, -0.07276),
        vec3<f32>(-0.07367, -0.00605, 1.07602),
    );
    var c = color * post.exposure / 0.6;
    c = input_mat * c;
    c = rrt_and_odt_fit(c);
    c = output_mat * c;
    return clamp(c, vec3<f32>(0.0), vec3<f32>(1.0));
}

fn hash(p: vec2<f32>) -> f32 {
    return fract(sin(dot(p, vec2<f32>(12.9898, 78.233))) * 43758.5453);
}

@fragment
fn fs_composite(in: VertexOutput) -> @location(0) vec4<f32> {
    let scene = textureSample(primary, linear_sampler, in.uv).rgb;
    let glow = textureSample(secondary, linear_sampler, in.uv).rgb;
    var color = aces_filmic(scene + glow * post.intensity);

    let centered = (in.uv - vec2<f32>(0.5)) * post.vignette_offset;
    color = mix(color, vec3<f32>(1.0 - post.vignette_darkness), dot(centered, centered));

    let grain = hash(in.clip_position.xy + vec2<f32>(fract(post.time) * 1000.0));
    let screen = vec3<f32>(1.0) - (vec3<f32>(1.0) - color) * (1.0 - grain);
    color = mix(color, screen, post.noise_opacity);

    return vec4<f32>(color, 1.0);
}
"#;
