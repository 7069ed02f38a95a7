use ::wgpu::util::DeviceExt;
use std::borrow::Cow;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::scene_math::SceneMatrices;

#[derive(Debug)]
pub struct WgpuContext {
    pub _instance: &'static ::wgpu::Instance,
    pub surface: ::wgpu::Surface<'static>,
    pub device: ::wgpu::Device,
    pub queue: ::wgpu::Queue,
    pub config: ::wgpu::SurfaceConfiguration,
    pub _canvas: web_sys::HtmlCanvasElement,
    pub stars_pipeline: ::wgpu::RenderPipeline,
    pub stars_count: u32,
    pub surface_pipeline: ::wgpu::RenderPipeline,
    pub clouds_pipeline: ::wgpu::RenderPipeline,
    pub atmos_pipeline: ::wgpu::RenderPipeline,
    pub globals_buffer: ::wgpu::Buffer,
    pub globals_bind_group: ::wgpu::BindGroup,
    pub texture_bind_group_layout: ::wgpu::BindGroupLayout,
    pub texture_bind_group: ::wgpu::BindGroup,
    pub surface_sampler: ::wgpu::Sampler,
    pub has_surface_map: bool,
    pub depth_view: ::wgpu::TextureView,
    pub vertex_buffer: ::wgpu::Buffer,
    pub index_buffer: ::wgpu::Buffer,
    pub index_count: u32,
}

const SURFACE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    surface_model: mat4x4<f32>,
    clouds_model: mat4x4<f32>,
    atmos_model: mat4x4<f32>,
    eye: vec3<f32>,
    tex_mix: f32,
    light_dir: vec3<f32>,
    _pad1: f32,
};

@group(0) @binding(0)
var<storage, read> globals: Globals;

@group(1) @binding(0)
var surface_tex: texture_2d<f32>;
@group(1) @binding(1)
var surface_samp: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> VsOut {
    let world = globals.surface_model * vec4<f32>(position, 1.0);
    let n = (globals.surface_model * vec4<f32>(normal, 0.0)).xyz;
    return VsOut(globals.view_proj * world, n, uv);
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(fs_in.normal);
    let l = normalize(globals.light_dir);
    let ndotl = max(dot(n, l), 0.0);

    // Keep the night side readable instead of fully dark.
    let shade = 0.25 + 0.75 * ndotl;
    let texel = textureSample(surface_tex, surface_samp, fs_in.uv);

    // Until the host uploads a surface map, shade a flat ocean-blue ramp;
    // tex_mix flips to 1.0 once real pixels arrive.
    let ramp = vec3<f32>(0.10, 0.55, 0.85);
    let albedo = mix(ramp, texel.rgb, globals.tex_mix);
    return vec4<f32>(albedo * shade, 1.0);
}
"#;

const CLOUDS_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    surface_model: mat4x4<f32>,
    clouds_model: mat4x4<f32>,
    atmos_model: mat4x4<f32>,
    eye: vec3<f32>,
    tex_mix: f32,
    light_dir: vec3<f32>,
    _pad1: f32,
};

@group(0) @binding(0)
var<storage, read> globals: Globals;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> VsOut {
    let world = globals.clouds_model * vec4<f32>(position, 1.0);
    let n = (globals.clouds_model * vec4<f32>(normal, 0.0)).xyz;
    return VsOut(globals.view_proj * world, n, uv);
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(fs_in.normal);
    let l = normalize(globals.light_dir);
    let shade = 0.35 + 0.65 * max(dot(n, l), 0.0);

    // Procedural wisps: two interfering bands over the shell's uv.
    let a = sin(fs_in.uv.x * 21.0 + fs_in.uv.y * 9.0);
    let b = sin(fs_in.uv.y * 17.0 - fs_in.uv.x * 5.0);
    let wisp = clamp(a * b, 0.0, 1.0);
    return vec4<f32>(vec3<f32>(shade), wisp * 0.32);
}
"#;

const ATMOS_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    surface_model: mat4x4<f32>,
    clouds_model: mat4x4<f32>,
    atmos_model: mat4x4<f32>,
    eye: vec3<f32>,
    tex_mix: f32,
    light_dir: vec3<f32>,
    _pad1: f32,
};

@group(0) @binding(0)
var<storage, read> globals: Globals;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) world_pos: vec3<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> VsOut {
    let world = globals.atmos_model * vec4<f32>(position, 1.0);
    let n = (globals.atmos_model * vec4<f32>(normal, 0.0)).xyz;
    return VsOut(globals.view_proj * world, n, world.xyz);
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    // Back faces only: the glow peaks at the silhouette, where the shell
    // normal is perpendicular to the view ray.
    let v = normalize(globals.eye - fs_in.world_pos);
    let rim = pow(1.0 - abs(dot(normalize(fs_in.normal), v)), 3.0);
    return vec4<f32>(0.35, 0.60, 1.0, rim * 0.6);
}
"#;

const STARS_SHADER: &str = r#"
fn hash_u32(x_in: u32) -> u32 {
    // 32-bit integer mix (non-linear) to avoid visible correlation patterns.
    var x = x_in;
    x ^= x >> 16u;
    x *= 0x7feb352du;
    x ^= x >> 15u;
    x *= 0x846ca68bu;
    x ^= x >> 16u;
    return x;
}

fn hash01(x: u32) -> f32 {
    return f32(hash_u32(x)) / 4294967295.0;
}

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) a: f32,
};

@vertex
fn vs_main(@builtin(vertex_index) vid: u32) -> VsOut {
    // Deterministic pseudo-random star positions in clip space.
    // Use different salts per component to avoid structure.
    let rx = hash01(vid ^ 0x68bc21ebu);
    let ry = hash01(vid ^ 0x02e5be93u);
    let rb = hash01(vid ^ 0x9e3779b9u);

    let x = rx * 2.0 - 1.0;
    let y = ry * 2.0 - 1.0;
    // Mostly faint stars with a few bright ones; conservative overall so the
    // background reads as depth, not noise.
    let a = 0.03 + 0.22 * rb * rb;

    return VsOut(vec4<f32>(x, y, 0.9999, 1.0), a);
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, fs_in.a);
}
"#;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    surface_model: [[f32; 4]; 4],
    clouds_model: [[f32; 4]; 4],
    atmos_model: [[f32; 4]; 4],
    eye: [f32; 3],
    tex_mix: f32,
    light_dir: [f32; 3],
    _pad1: f32,
}

fn create_depth_view(
    device: &::wgpu::Device,
    config: &::wgpu::SurfaceConfiguration,
) -> ::wgpu::TextureView {
    let tex = device.create_texture(&::wgpu::TextureDescriptor {
        label: Some("umoja-depth"),
        size: ::wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: ::wgpu::TextureDimension::D2,
        format: ::wgpu::TextureFormat::Depth24Plus,
        usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&::wgpu::TextureViewDescriptor::default())
}

fn generate_sphere_mesh(lat_segments: u32, lon_segments: u32) -> (Vec<Vertex>, Vec<u16>) {
    let lat_segments = lat_segments.max(3);
    let lon_segments = lon_segments.max(3);

    let mut vertices = Vec::with_capacity(((lat_segments + 1) * (lon_segments + 1)) as usize);
    for lat in 0..=lat_segments {
        let v = lat as f32 / lat_segments as f32;
        let theta = v * std::f32::consts::PI;
        let sin_t = theta.sin();
        let cos_t = theta.cos();

        for lon in 0..=lon_segments {
            let u = lon as f32 / lon_segments as f32;
            let phi = u * std::f32::consts::TAU;
            let sin_p = phi.sin();
            let cos_p = phi.cos();

            let x = sin_t * cos_p;
            let y = cos_t;
            let z = sin_t * sin_p;
            vertices.push(Vertex {
                position: [x, y, z],
                normal: [x, y, z],
                // Equirectangular mapping; v runs north to south.
                uv: [u, v],
            });
        }
    }

    let stride = lon_segments + 1;
    let mut indices = Vec::with_capacity((lat_segments * lon_segments * 6) as usize);
    for lat in 0..lat_segments {
        for lon in 0..lon_segments {
            let i0 = lat * stride + lon;
            let i1 = i0 + 1;
            let i2 = i0 + stride;
            let i3 = i2 + 1;

            indices.push(i0 as u16);
            indices.push(i2 as u16);
            indices.push(i1 as u16);
            indices.push(i1 as u16);
            indices.push(i2 as u16);
            indices.push(i3 as u16);
        }
    }

    (vertices, indices)
}

fn create_surface_texture_bind_group(
    device: &::wgpu::Device,
    layout: &::wgpu::BindGroupLayout,
    texture_view: &::wgpu::TextureView,
    sampler: &::wgpu::Sampler,
) -> ::wgpu::BindGroup {
    device.create_bind_group(&::wgpu::BindGroupDescriptor {
        label: Some("umoja-surface-texture-bg"),
        layout,
        entries: &[
            ::wgpu::BindGroupEntry {
                binding: 0,
                resource: ::wgpu::BindingResource::TextureView(texture_view),
            },
            ::wgpu::BindGroupEntry {
                binding: 1,
                resource: ::wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn upload_rgba_texture(
    device: &::wgpu::Device,
    queue: &::wgpu::Queue,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> ::wgpu::TextureView {
    let texture = device.create_texture(&::wgpu::TextureDescriptor {
        label: Some("umoja-surface-texture"),
        size: ::wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: ::wgpu::TextureDimension::D2,
        format: ::wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: ::wgpu::TextureUsages::TEXTURE_BINDING | ::wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        ::wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: ::wgpu::Origin3d::ZERO,
            aspect: ::wgpu::TextureAspect::All,
        },
        pixels,
        ::wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        ::wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    texture.create_view(&::wgpu::TextureViewDescriptor::default())
}

pub async fn init_wgpu_from_canvas_id(canvas_id: &str) -> Result<WgpuContext, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("document missing"))?;
    let canvas_elem = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str("canvas missing"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()?;

    let width = canvas_elem.width();
    let height = canvas_elem.height();

    // IMPORTANT: `wgpu::Surface` must not outlive its `wgpu::Instance`.
    // To avoid UB, we leak the instance for the lifetime of the app.
    //
    // Prefer WebGPU when available, but allow WebGL as a fallback.
    let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
        &::wgpu::InstanceDescriptor {
            backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
            ..Default::default()
        },
    )));

    let surface = instance
        .create_surface(::wgpu::SurfaceTarget::Canvas(canvas_elem.clone()))
        .map_err(|e| JsValue::from_str(&format!("surface error: {e}")))?;

    let adapter = instance
        .request_adapter(&::wgpu::RequestAdapterOptions {
            power_preference: ::wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| JsValue::from_str(&format!("adapter error: {e}")))?;

    let (device, queue) = adapter
        .request_device(&::wgpu::DeviceDescriptor {
            label: Some("umoja-wgpu-device"),
            required_features: ::wgpu::Features::empty(),
            required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
            ..Default::default()
        })
        .await
        .map_err(|e| JsValue::from_str(&format!("device error: {e}")))?;

    let surface_caps = surface.get_capabilities(&adapter);
    let format = surface_caps
        .formats
        .iter()
        .cloned()
        .find(|f| f.is_srgb())
        .unwrap_or(surface_caps.formats[0]);

    let config = ::wgpu::SurfaceConfiguration {
        usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width,
        height,
        desired_maximum_frame_latency: 2,
        present_mode: ::wgpu::PresentMode::Fifo,
        alpha_mode: surface_caps.alpha_modes[0],
        view_formats: vec![],
    };
    surface.configure(&device, &config);

    let depth_view = create_depth_view(&device, &config);

    let surface_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
        label: Some("umoja-surface-shader"),
        source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(SURFACE_SHADER)),
    });

    let clouds_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
        label: Some("umoja-clouds-shader"),
        source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(CLOUDS_SHADER)),
    });

    let atmos_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
        label: Some("umoja-atmos-shader"),
        source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(ATMOS_SHADER)),
    });

    let stars_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
        label: Some("umoja-stars-shader"),
        source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(STARS_SHADER)),
    });

    let globals_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
        label: Some("umoja-globals"),
        size: std::mem::size_of::<Globals>() as u64,
        usage: ::wgpu::BufferUsages::STORAGE | ::wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let globals_bind_group_layout =
        device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("umoja-globals-bgl"),
            entries: &[::wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: ::wgpu::BindingType::Buffer {
                    ty: ::wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

    let globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
        label: Some("umoja-globals-bg"),
        layout: &globals_bind_group_layout,
        entries: &[::wgpu::BindGroupEntry {
            binding: 0,
            resource: globals_buffer.as_entire_binding(),
        }],
    });

    let texture_bind_group_layout =
        device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("umoja-surface-texture-bgl"),
            entries: &[
                ::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Texture {
                        sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: ::wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                ::wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

    let surface_sampler = device.create_sampler(&::wgpu::SamplerDescriptor {
        label: Some("umoja-surface-sampler"),
        address_mode_u: ::wgpu::AddressMode::Repeat,
        address_mode_v: ::wgpu::AddressMode::ClampToEdge,
        address_mode_w: ::wgpu::AddressMode::ClampToEdge,
        mag_filter: ::wgpu::FilterMode::Linear,
        min_filter: ::wgpu::FilterMode::Linear,
        mipmap_filter: ::wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    // 1x1 placeholder so the texture bind group is always valid. Until the
    // host uploads a real surface map, tex_mix stays 0.0 and the shader
    // falls back to the color ramp.
    let placeholder_view = upload_rgba_texture(&device, &queue, 1, 1, &[11, 23, 48, 255]);
    let texture_bind_group = create_surface_texture_bind_group(
        &device,
        &texture_bind_group_layout,
        &placeholder_view,
        &surface_sampler,
    );

    let textured_pipeline_layout =
        device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("umoja-surface-pipeline-layout"),
            bind_group_layouts: &[&globals_bind_group_layout, &texture_bind_group_layout],
            immediate_size: 0,
        });

    let shell_pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
        label: Some("umoja-shell-pipeline-layout"),
        bind_group_layouts: &[&globals_bind_group_layout],
        immediate_size: 0,
    });

    let stars_pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
        label: Some("umoja-stars-pipeline-layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    let vertex_layout = ::wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as ::wgpu::BufferAddress,
        step_mode: ::wgpu::VertexStepMode::Vertex,
        attributes: &[
            ::wgpu::VertexAttribute {
                format: ::wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            ::wgpu::VertexAttribute {
                format: ::wgpu::VertexFormat::Float32x3,
                offset: 12,
                shader_location: 1,
            },
            ::wgpu::VertexAttribute {
                format: ::wgpu::VertexFormat::Float32x2,
                offset: 24,
                shader_location: 2,
            },
        ],
    };

    // Starfield background: generated procedurally via vertex_index.
    let stars_pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
        label: Some("umoja-stars-pipeline"),
        layout: Some(&stars_pipeline_layout),
        vertex: ::wgpu::VertexState {
            module: &stars_shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(::wgpu::FragmentState {
            module: &stars_shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(::wgpu::ColorTargetState {
                format: config.format,
                blend: Some(::wgpu::BlendState::ALPHA_BLENDING),
                write_mask: ::wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: ::wgpu::PrimitiveState {
            topology: ::wgpu::PrimitiveTopology::PointList,
            strip_index_format: None,
            front_face: ::wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: ::wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: ::wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    let surface_pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
        label: Some("umoja-surface-pipeline"),
        layout: Some(&textured_pipeline_layout),
        vertex: ::wgpu::VertexState {
            module: &surface_shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout.clone()],
        },
        fragment: Some(::wgpu::FragmentState {
            module: &surface_shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(::wgpu::ColorTargetState {
                format: config.format,
                blend: Some(::wgpu::BlendState::REPLACE),
                write_mask: ::wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: ::wgpu::PrimitiveState {
            topology: ::wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: ::wgpu::FrontFace::Ccw,
            // Disable culling for now. If winding ends up opposite what we expect
            // (common when generating sphere indices), culling will make the globe
            // completely disappear and you'll only see the clear color.
            cull_mode: None,
            polygon_mode: ::wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(::wgpu::DepthStencilState {
            format: ::wgpu::TextureFormat::Depth24Plus,
            depth_write_enabled: true,
            depth_compare: ::wgpu::CompareFunction::Less,
            stencil: ::wgpu::StencilState::default(),
            bias: ::wgpu::DepthBiasState::default(),
        }),
        multisample: ::wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    let clouds_pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
        label: Some("umoja-clouds-pipeline"),
        layout: Some(&shell_pipeline_layout),
        vertex: ::wgpu::VertexState {
            module: &clouds_shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout.clone()],
        },
        fragment: Some(::wgpu::FragmentState {
            module: &clouds_shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(::wgpu::ColorTargetState {
                format: config.format,
                blend: Some(::wgpu::BlendState::ALPHA_BLENDING),
                write_mask: ::wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: ::wgpu::PrimitiveState {
            topology: ::wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: ::wgpu::FrontFace::Ccw,
            cull_mode: Some(::wgpu::Face::Back),
            polygon_mode: ::wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        // Clouds read depth so they hide behind the limb but never write it,
        // keeping the shell transparent to later passes.
        depth_stencil: Some(::wgpu::DepthStencilState {
            format: ::wgpu::TextureFormat::Depth24Plus,
            depth_write_enabled: false,
            depth_compare: ::wgpu::CompareFunction::LessEqual,
            stencil: ::wgpu::StencilState::default(),
            bias: ::wgpu::DepthBiasState::default(),
        }),
        multisample: ::wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    let atmos_pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
        label: Some("umoja-atmos-pipeline"),
        layout: Some(&shell_pipeline_layout),
        vertex: ::wgpu::VertexState {
            module: &atmos_shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout],
        },
        fragment: Some(::wgpu::FragmentState {
            module: &atmos_shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(::wgpu::ColorTargetState {
                format: config.format,
                blend: Some(::wgpu::BlendState::ALPHA_BLENDING),
                write_mask: ::wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: ::wgpu::PrimitiveState {
            topology: ::wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: ::wgpu::FrontFace::Ccw,
            // Front faces culled: the rim is drawn on the far side of the
            // shell so it halos beyond the globe's silhouette.
            cull_mode: Some(::wgpu::Face::Front),
            polygon_mode: ::wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(::wgpu::DepthStencilState {
            format: ::wgpu::TextureFormat::Depth24Plus,
            depth_write_enabled: false,
            depth_compare: ::wgpu::CompareFunction::Less,
            stencil: ::wgpu::StencilState::default(),
            bias: ::wgpu::DepthBiasState::default(),
        }),
        multisample: ::wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    let (vertices, indices) = generate_sphere_mesh(64, 128);
    let vertex_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
        label: Some("umoja-sphere-vertices"),
        contents: bytemuck::cast_slice(&vertices),
        usage: ::wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
        label: Some("umoja-sphere-indices"),
        contents: bytemuck::cast_slice(&indices),
        usage: ::wgpu::BufferUsages::INDEX,
    });

    // Initialize uniforms so the first render doesn't read uninitialized memory.
    let globals = Globals {
        view_proj: [[0.0; 4]; 4],
        surface_model: [[0.0; 4]; 4],
        clouds_model: [[0.0; 4]; 4],
        atmos_model: [[0.0; 4]; 4],
        eye: [0.0, 0.0, 1.0],
        tex_mix: 0.0,
        light_dir: [0.4, 0.7, 0.2],
        _pad1: 0.0,
    };
    queue.write_buffer(&globals_buffer, 0, bytemuck::bytes_of(&globals));

    Ok(WgpuContext {
        _instance: instance,
        surface,
        device,
        queue,
        config,
        _canvas: canvas_elem,
        stars_pipeline,
        stars_count: 1200,
        surface_pipeline,
        clouds_pipeline,
        atmos_pipeline,
        globals_buffer,
        globals_bind_group,
        texture_bind_group_layout,
        texture_bind_group,
        surface_sampler,
        has_surface_map: false,
        depth_view,
        vertex_buffer,
        index_buffer,
        index_count: indices.len() as u32,
    })
}

/// Replace the surface map with host-provided RGBA8 pixels. Returns false
/// (leaving the current map in place) if the pixel slice does not match the
/// stated dimensions.
pub fn upload_surface_texture(ctx: &mut WgpuContext, width: u32, height: u32, pixels: &[u8]) -> bool {
    if width == 0 || height == 0 || pixels.len() != (width as usize * height as usize * 4) {
        return false;
    }
    let view = upload_rgba_texture(&ctx.device, &ctx.queue, width, height, pixels);
    ctx.texture_bind_group = create_surface_texture_bind_group(
        &ctx.device,
        &ctx.texture_bind_group_layout,
        &view,
        &ctx.surface_sampler,
    );
    ctx.has_surface_map = true;
    true
}

pub fn resize_wgpu(ctx: &mut WgpuContext, width: u32, height: u32) {
    ctx.config.width = width.max(1);
    ctx.config.height = height.max(1);
    ctx.surface.configure(&ctx.device, &ctx.config);
    ctx.depth_view = create_depth_view(&ctx.device, &ctx.config);
}

pub fn render_scene(ctx: &WgpuContext, m: &SceneMatrices) -> Result<(), JsValue> {
    let frame = ctx
        .surface
        .get_current_texture()
        .map_err(|e| JsValue::from_str(&format!("surface acquire failed: {e}")))?;
    let view = frame
        .texture
        .create_view(&::wgpu::TextureViewDescriptor::default());

    let globals = Globals {
        view_proj: m.view_proj,
        surface_model: m.surface_model,
        clouds_model: m.clouds_model,
        atmos_model: m.atmos_model,
        eye: m.eye,
        tex_mix: if ctx.has_surface_map { 1.0 } else { 0.0 },
        light_dir: m.light_dir,
        _pad1: 0.0,
    };
    ctx.queue
        .write_buffer(&ctx.globals_buffer, 0, bytemuck::bytes_of(&globals));

    let mut encoder = ctx
        .device
        .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
            label: Some("umoja-scene-encoder"),
        });

    // Pass 1: clear to deep space and draw stars (no depth attachment).
    {
        let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
            label: Some("umoja-stars-pass"),
            color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                depth_slice: None,
                ops: ::wgpu::Operations {
                    load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                        r: 0.004,
                        g: 0.008,
                        b: 0.016,
                        a: 1.0,
                    }),
                    store: ::wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&ctx.stars_pipeline);
        rpass.draw(0..ctx.stars_count, 0..1);
    }

    // Pass 2: the textured surface with depth, preserving the starfield color.
    {
        let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
            label: Some("umoja-surface-pass"),
            color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                depth_slice: None,
                ops: ::wgpu::Operations {
                    load: ::wgpu::LoadOp::Load,
                    store: ::wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.depth_view,
                depth_ops: Some(::wgpu::Operations {
                    load: ::wgpu::LoadOp::Clear(1.0),
                    store: ::wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&ctx.surface_pipeline);
        rpass.set_bind_group(0, &ctx.globals_bind_group, &[]);
        rpass.set_bind_group(1, &ctx.texture_bind_group, &[]);
        rpass.set_vertex_buffer(0, ctx.vertex_buffer.slice(..));
        rpass.set_index_buffer(ctx.index_buffer.slice(..), ::wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..ctx.index_count, 0, 0..1);
    }

    // Pass 3: cloud shell (alpha blended, depth read only).
    {
        let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
            label: Some("umoja-clouds-pass"),
            color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                depth_slice: None,
                ops: ::wgpu::Operations {
                    load: ::wgpu::LoadOp::Load,
                    store: ::wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.depth_view,
                depth_ops: Some(::wgpu::Operations {
                    load: ::wgpu::LoadOp::Load,
                    store: ::wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&ctx.clouds_pipeline);
        rpass.set_bind_group(0, &ctx.globals_bind_group, &[]);
        rpass.set_vertex_buffer(0, ctx.vertex_buffer.slice(..));
        rpass.set_index_buffer(ctx.index_buffer.slice(..), ::wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..ctx.index_count, 0, 0..1);
    }

    // Pass 4: atmosphere rim halo.
    {
        let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
            label: Some("umoja-atmos-pass"),
            color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                depth_slice: None,
                ops: ::wgpu::Operations {
                    load: ::wgpu::LoadOp::Load,
                    store: ::wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.depth_view,
                depth_ops: Some(::wgpu::Operations {
                    load: ::wgpu::LoadOp::Load,
                    store: ::wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&ctx.atmos_pipeline);
        rpass.set_bind_group(0, &ctx.globals_bind_group, &[]);
        rpass.set_vertex_buffer(0, ctx.vertex_buffer.slice(..));
        rpass.set_index_buffer(ctx.index_buffer.slice(..), ::wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..ctx.index_count, 0, 0..1);
    }

    ctx.queue.submit(std::iter::once(encoder.finish()));
    frame.present();
    Ok(())
}
