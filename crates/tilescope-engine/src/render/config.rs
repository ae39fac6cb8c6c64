use tilescope_layout::VAxis;

/// Texture filtering for both magnification and minification.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum TextureFilter {
    #[default]
    Linear,
    Nearest,
}

impl TextureFilter {
    pub(crate) fn filter_mode(self) -> wgpu::FilterMode {
        match self {
            TextureFilter::Linear => wgpu::FilterMode::Linear,
            TextureFilter::Nearest => wgpu::FilterMode::Nearest,
        }
    }

    pub(crate) fn mipmap_filter_mode(self) -> wgpu::MipmapFilterMode {
        match self {
            TextureFilter::Linear => wgpu::MipmapFilterMode::Linear,
            TextureFilter::Nearest => wgpu::MipmapFilterMode::Nearest,
        }
    }
}

/// Renderer configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Added to the sampler's computed level of detail. Typical values lie in
    /// `[-0.5, 0.5]`; anything outside `[-16, 15.99]` is clamped.
    pub lod_bias: f32,

    /// First mip level the sampler may use (0 = full resolution).
    pub base_mip_level: u32,

    /// Last mip level generated and sampled.
    pub max_mip_level: u32,

    /// Build a mip chain on upload. When off only level 0 exists.
    pub generate_mipmaps: bool,

    pub filter: TextureFilter,

    /// Orientation the tile grid was computed in. `BottomUp` uploads the rows
    /// reversed so the picture stays upright.
    pub v_axis: VAxis,

    /// Letterbox the image instead of stretching it over the window.
    pub preserve_aspect: bool,

    pub clear_color: wgpu::Color,
}

impl RenderConfig {
    pub const LOD_BIAS_RANGE: (f32, f32) = (-16.0, 15.99);

    /// `lod_bias` clamped to the range WGSL `textureSampleBias` accepts.
    pub fn clamped_lod_bias(&self) -> f32 {
        let (lo, hi) = Self::LOD_BIAS_RANGE;
        if self.lod_bias.is_finite() { self.lod_bias.clamp(lo, hi) } else { 0.0 }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            lod_bias: 0.0,
            base_mip_level: 0,
            max_mip_level: 4,
            generate_mipmaps: true,
            filter: TextureFilter::Linear,
            v_axis: VAxis::TopDown,
            preserve_aspect: true,
            clear_color: wgpu::Color { r: 0.05, g: 0.05, b: 0.06, a: 1.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lod_bias_is_clamped() {
        let mut config = RenderConfig { lod_bias: 40.0, ..Default::default() };
        assert_eq!(config.clamped_lod_bias(), 15.99);
        config.lod_bias = f32::NAN;
        assert_eq!(config.clamped_lod_bias(), 0.0);
        config.lod_bias = -0.5;
        assert_eq!(config.clamped_lod_bias(), -0.5);
    }
}
