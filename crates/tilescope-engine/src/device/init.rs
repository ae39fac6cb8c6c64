/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// The image texture is uploaded as sRGB, so an sRGB surface keeps the
    /// round trip color-exact.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). FIFO is supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Adapter selection hint.
    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the device.
    ///
    /// `None` requests the adapter's own limits, which is what lets images
    /// larger than the 8192px WebGPU default fit in one texture.
    pub required_limits: Option<wgpu::Limits>,

    /// Desired maximum frame latency for the surface (a hint).
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: None,
            desired_maximum_frame_latency: 2,
        }
    }
}
