use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;

use crate::loader::Image;

use super::{DrawList, ImageTexture, QuadCmd, RenderConfig, RenderCtx, RenderTarget, TextureHandle, Viewport};

/// Draws tile quads sampling the uploaded image.
///
/// GPU objects are created lazily; the pipeline is rebuilt if the surface
/// format changes. Only one image is resident at a time.
pub struct TileRenderer {
    config: RenderConfig,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    view_ubo: Option<wgpu::Buffer>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,

    image: Option<ResidentImage>,
    next_handle: u64,

    warned_stale: bool,
}

struct ResidentImage {
    handle: TextureHandle,
    texture: ImageTexture,
    bind_group: wgpu::BindGroup,
}

impl TileRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            view_ubo: None,
            quad_vbo: None,
            quad_ibo: None,
            instance_vbo: None,
            instance_capacity: 0,
            image: None,
            next_handle: 0,
            warned_stale: false,
        }
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Handle of the resident image, if one was uploaded.
    #[inline]
    pub fn current_texture(&self) -> Option<TextureHandle> {
        self.image.as_ref().map(|img| img.handle)
    }

    /// Uploads `image`, replacing the resident texture.
    ///
    /// Handles returned by earlier calls become stale.
    pub fn upload(&mut self, ctx: &RenderCtx<'_>, image: &Image) -> Result<TextureHandle> {
        self.ensure_layout(ctx);
        self.ensure_view_uniform(ctx);

        let texture = ImageTexture::upload(ctx.device, ctx.queue, image, &self.config)
            .context("failed to upload image texture")?;

        let layout = self
            .bind_group_layout
            .as_ref()
            .context("tile bind group layout missing")?;
        let view_ubo = self.view_ubo.as_ref().context("tile view uniform missing")?;

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tilescope tile bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: view_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        self.image = Some(ResidentImage {
            handle,
            texture,
            bind_group,
        });
        self.warned_stale = false;

        Ok(handle)
    }

    /// Draws every quad in `draw_list` on top of `target`.
    ///
    /// One draw call per quad, in list order. Quads referring to a texture
    /// other than the resident one are skipped (one-time warning).
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &DrawList,
        camera: Mat4,
    ) {
        let Some((current, image_size)) = self
            .image
            .as_ref()
            .map(|img| (img.handle, img.texture.size()))
        else {
            return;
        };

        self.ensure_pipeline(ctx);
        self.ensure_static_buffers(ctx);

        let (instances, stale) = build_instances(draw_list.items(), current);
        if stale > 0 && !self.warned_stale {
            log::warn!("TileRenderer: skipped {stale} quad(s) with a stale texture handle");
            self.warned_stale = true;
        }
        if instances.is_empty() {
            return;
        }

        let view = fit_matrix(image_size, ctx.viewport, self.config.preserve_aspect) * camera;
        self.write_view_uniform(ctx, view);
        self.ensure_instance_capacity(ctx, instances.len());

        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&instances));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(image) = self.image.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tilescope tile pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &image.bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

        for i in 0..instances.len() as u32 {
            rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, i..i + 1);
        }
    }

    fn ensure_layout(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group_layout.is_some() {
            return;
        }

        let layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("tilescope tile bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<ViewUniform>() as u64,
                            ),
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

        self.bind_group_layout = Some(layout);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }
        self.ensure_layout(ctx);
        let Some(bind_group_layout) = self.bind_group_layout.as_ref() else { return };

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tilescope tile shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/tiles.wgsl").into()),
        });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("tilescope tile pipeline layout"),
                bind_group_layouts: &[bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tilescope tile pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), TileInstance::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("TileRenderer: pipeline built for {:?}", ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
    }

    fn ensure_view_uniform(&mut self, ctx: &RenderCtx<'_>) {
        if self.view_ubo.is_some() {
            return;
        }
        self.view_ubo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tilescope tile view ubo"),
            size: std::mem::size_of::<ViewUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tilescope quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tilescope quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn write_view_uniform(&self, ctx: &RenderCtx<'_>, view: Mat4) {
        let Some(ubo) = self.view_ubo.as_ref() else { return };
        let u = ViewUniform::new(view, self.config.clamped_lod_bias());
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required_instances: usize) {
        if required_instances <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }

        let new_cap = required_instances.next_power_of_two().max(64);
        let new_size = (new_cap * std::mem::size_of::<TileInstance>()) as u64;

        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tilescope tile instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

/// Scale applied after the camera so the image keeps its aspect ratio.
///
/// The image rectangle `[-1, 1]²` fills the viewport along its tighter axis
/// and is letterboxed along the other. Identity when `preserve_aspect` is
/// off or either size is degenerate.
pub fn fit_matrix(image_size: (u32, u32), viewport: Viewport, preserve_aspect: bool) -> Mat4 {
    let fit = fit_scale(image_size, viewport, preserve_aspect);
    Mat4::from_scale(Vec3::new(fit.x, fit.y, 1.0))
}

/// Per-axis factors of [`fit_matrix`].
pub fn fit_scale(image_size: (u32, u32), viewport: Viewport, preserve_aspect: bool) -> Vec2 {
    let (w, h) = image_size;
    if !preserve_aspect || w == 0 || h == 0 || !viewport.is_valid() {
        return Vec2::ONE;
    }

    let image_aspect = w as f32 / h as f32;
    let viewport_aspect = viewport.aspect();

    if image_aspect > viewport_aspect {
        Vec2::new(1.0, viewport_aspect / image_aspect)
    } else {
        Vec2::new(image_aspect / viewport_aspect, 1.0)
    }
}

/// Instance data for quads sampling `current`, plus the number skipped.
fn build_instances(items: &[QuadCmd], current: TextureHandle) -> (Vec<TileInstance>, usize) {
    let mut stale = 0;
    let mut out = Vec::with_capacity(items.len());
    for quad in items {
        if quad.texture != current {
            stale += 1;
            continue;
        }
        out.push(TileInstance::from_quad(quad));
    }
    (out, stale)
}

// ── gpu types ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewUniform {
    view: [[f32; 4]; 4],
    lod_bias: f32,
    _pad: [f32; 3],
}

impl ViewUniform {
    fn new(view: Mat4, lod_bias: f32) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            lod_bias,
            _pad: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct TileInstance {
    model: [[f32; 4]; 4],
    uv: [f32; 4],
}

impl TileInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x4, // model col 0
        2 => Float32x4, // model col 1
        3 => Float32x4, // model col 2
        4 => Float32x4, // model col 3
        5 => Float32x4  // u0 v0 u1 v1
    ];

    fn from_quad(quad: &QuadCmd) -> Self {
        Self {
            model: quad.model.to_cols_array_2d(),
            uv: quad.uv.to_array(),
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TileInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;
    use tilescope_layout::compute_grid;

    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    // ── fit ───────────────────────────────────────────────────────────────

    #[test]
    fn wide_image_is_letterboxed_vertically() {
        let fit = fit_matrix((2000, 500), Viewport::new(800.0, 600.0), true);
        let top = fit * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert!(approx(top.x, 1.0));
        // image aspect 4, viewport aspect 4/3
        assert!(approx(top.y, 1.0 / 3.0));
    }

    #[test]
    fn tall_image_is_pillarboxed() {
        let fit = fit_matrix((500, 1000), Viewport::new(800.0, 800.0), true);
        let corner = fit * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert!(approx(corner.x, 0.5));
        assert!(approx(corner.y, 1.0));
    }

    #[test]
    fn matching_aspect_is_identity() {
        let fit = fit_matrix((800, 600), Viewport::new(1600.0, 1200.0), true);
        assert!(fit.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn fit_scale_matches_matrix_diagonal() {
        let viewport = Viewport::new(800.0, 600.0);
        let fit = fit_scale((2000, 500), viewport, true);
        let m = fit_matrix((2000, 500), viewport, true);
        assert!(approx(fit.x, m.x_axis.x));
        assert!(approx(fit.y, m.y_axis.y));
        assert_eq!(fit_scale((2000, 500), viewport, false), Vec2::ONE);
    }

    #[test]
    fn stretch_and_degenerate_inputs_are_identity() {
        assert_eq!(fit_matrix((2000, 500), Viewport::new(800.0, 600.0), false), Mat4::IDENTITY);
        assert_eq!(fit_matrix((0, 500), Viewport::new(800.0, 600.0), true), Mat4::IDENTITY);
        assert_eq!(fit_matrix((2000, 500), Viewport::new(0.0, 600.0), true), Mat4::IDENTITY);
    }

    // ── instances ─────────────────────────────────────────────────────────

    #[test]
    fn stale_quads_are_skipped() {
        let grid = compute_grid(600, 400, 256, 256).unwrap();
        let mut list = DrawList::new();
        list.push_grid(&grid, TextureHandle(1));
        list.push_grid(&grid, TextureHandle(2));

        let (instances, stale) = build_instances(list.items(), TextureHandle(2));
        assert_eq!(instances.len(), 6);
        assert_eq!(stale, 6);
    }

    #[test]
    fn instance_carries_model_and_uv() {
        let grid = compute_grid(600, 400, 256, 256).unwrap();
        let tile = grid.tile_at(1, 1).unwrap();
        let quad = QuadCmd::from_tile(&tile, TextureHandle(7));

        let inst = TileInstance::from_quad(&quad);
        assert_eq!(inst.uv, tile.uv.to_array());
        assert_eq!(inst.model[3][0], tile.model.translate[0]);
        assert_eq!(inst.model[3][1], tile.model.translate[1]);
        assert_eq!(inst.model[0][0], tile.model.scale[0]);
        assert_eq!(inst.model[1][1], tile.model.scale[1]);
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn gpu_structs_match_shader_layout() {
        assert_eq!(std::mem::size_of::<ViewUniform>(), 80);
        assert_eq!(std::mem::size_of::<TileInstance>(), 80);
        assert_eq!(std::mem::size_of::<QuadVertex>(), 8);
    }

    #[test]
    fn uniform_clamps_lod_bias_through_config() {
        let renderer = TileRenderer::new(RenderConfig { lod_bias: -100.0, ..Default::default() });
        let u = ViewUniform::new(Mat4::IDENTITY, renderer.config().clamped_lod_bias());
        assert_eq!(u.lod_bias, -16.0);
        assert!(renderer.current_texture().is_none());
    }
}
