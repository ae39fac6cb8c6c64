use std::borrow::Cow;

use anyhow::{ensure, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use tilescope_layout::VAxis;

use crate::loader::Image;

use super::RenderConfig;

/// Number of mip levels uploaded for a `width × height` image.
///
/// The full chain ends at 1×1; it is cut after `max_mip_level`. Always at
/// least 1.
pub fn mip_chain_len(width: u32, height: u32, config: &RenderConfig) -> u32 {
    if !config.generate_mipmaps {
        return 1;
    }
    let full = u32::BITS - width.max(height).max(1).leading_zeros();
    full.min(config.max_mip_level.saturating_add(1))
}

/// The uploaded image: texture, view and sampler.
///
/// RGBA8 sRGB. Mip levels are downsampled on the CPU (triangle filter)
/// before upload.
pub struct ImageTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
}

impl ImageTexture {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &Image,
        config: &RenderConfig,
    ) -> Result<Self> {
        let (width, height) = image.size();
        let max_dim = device.limits().max_texture_dimension_2d;
        ensure!(
            width <= max_dim && height <= max_dim,
            "image is {width}x{height} but this GPU accepts at most {max_dim}x{max_dim} textures"
        );

        let mip_levels = mip_chain_len(width, height, config);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tilescope image texture"),
            size: extent(width, height),
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let levels = build_levels(image.as_rgba(), config.v_axis, mip_levels);
        for (mip, level) in (0u32..).zip(&levels) {
            write_level(queue, &texture, mip, level);
        }

        let base_mip_level = config.base_mip_level.min(mip_levels - 1);
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("tilescope image view"),
            base_mip_level,
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tilescope image sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: config.filter.filter_mode(),
            min_filter: config.filter.filter_mode(),
            mipmap_filter: config.filter.mipmap_filter_mode(),
            ..Default::default()
        });

        log::info!(
            "uploaded {width}x{height} texture, {mip_levels} mip level(s), base level {base_mip_level}"
        );

        Ok(Self {
            texture,
            view,
            sampler,
            width,
            height,
            mip_levels,
        })
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// The pixel data of each uploaded mip level, level 0 first.
///
/// Rows are reversed for `BottomUp` so the picture stays upright. Each level
/// halves the previous one (at least 1 px per side).
fn build_levels(source: &RgbaImage, v_axis: VAxis, mip_levels: u32) -> Vec<Cow<'_, RgbaImage>> {
    let mut levels: Vec<Cow<'_, RgbaImage>> = Vec::with_capacity(mip_levels as usize);
    levels.push(match v_axis {
        VAxis::TopDown => Cow::Borrowed(source),
        VAxis::BottomUp => Cow::Owned(imageops::flip_vertical(source)),
    });

    for _ in 1..mip_levels {
        let prev = &levels[levels.len() - 1];
        let w = (prev.width() / 2).max(1);
        let h = (prev.height() / 2).max(1);
        let next = imageops::resize(&**prev, w, h, FilterType::Triangle);
        levels.push(Cow::Owned(next));
    }
    levels
}

fn write_level(queue: &wgpu::Queue, texture: &wgpu::Texture, mip_level: u32, data: &RgbaImage) {
    let (w, h) = data.dimensions();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * w),
            rows_per_image: Some(h),
        },
        extent(w, h),
    );
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn config(max_mip_level: u32, generate_mipmaps: bool) -> RenderConfig {
        RenderConfig { max_mip_level, generate_mipmaps, ..Default::default() }
    }

    #[test]
    fn full_chain_ends_at_one_pixel() {
        assert_eq!(mip_chain_len(1024, 512, &config(u32::MAX, true)), 11);
        assert_eq!(mip_chain_len(600, 400, &config(u32::MAX, true)), 10);
        assert_eq!(mip_chain_len(1, 1, &config(u32::MAX, true)), 1);
    }

    #[test]
    fn chain_is_capped_by_max_level() {
        assert_eq!(mip_chain_len(1024, 1024, &config(4, true)), 5);
        assert_eq!(mip_chain_len(1024, 1024, &config(0, true)), 1);
    }

    #[test]
    fn disabled_mipmaps_give_one_level() {
        assert_eq!(mip_chain_len(4096, 4096, &config(4, false)), 1);
    }

    // ── levels ────────────────────────────────────────────────────────────

    fn striped(width: u32, height: u32) -> RgbaImage {
        // Row 0 red, every other row blue.
        RgbaImage::from_fn(width, height, |_, y| {
            if y == 0 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 255]) }
        })
    }

    #[test]
    fn top_down_level_zero_is_the_source() {
        let source = striped(4, 3);
        let levels = build_levels(&source, VAxis::TopDown, 1);
        assert_eq!(levels.len(), 1);
        assert!(matches!(levels[0], Cow::Borrowed(_)));
        assert_eq!(*levels[0].get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn bottom_up_level_zero_is_flipped() {
        let source = striped(4, 3);
        let levels = build_levels(&source, VAxis::BottomUp, 1);
        assert_eq!(*levels[0].get_pixel(0, 2), Rgba([255, 0, 0, 255]));
        assert_eq!(*levels[0].get_pixel(0, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn level_sizes_halve_down_to_one_pixel() {
        let source = striped(600, 400);
        let count = mip_chain_len(600, 400, &config(u32::MAX, true));
        let levels = build_levels(&source, VAxis::TopDown, count);

        let sizes: Vec<(u32, u32)> = levels.iter().map(|l| l.dimensions()).collect();
        assert_eq!(
            sizes,
            [
                (600, 400),
                (300, 200),
                (150, 100),
                (75, 50),
                (37, 25),
                (18, 12),
                (9, 6),
                (4, 3),
                (2, 1),
                (1, 1),
            ]
        );
    }
}
