/// Adapter, device and swapchain settings for the window GPU context.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,

    /// Pick an sRGB swapchain format when one exists. Off by default so strip bytes
    /// reach the screen without a transfer-function conversion.
    pub prefer_srgb: bool,

    /// FIFO paces presentation to the display and is available everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Requested compositing mode; the surface's first mode when unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub features: wgpu::Features,
    pub limits: wgpu::Limits,

    /// Maximum frames queued ahead of presentation (hint).
    pub frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            features: wgpu::Features::empty(),
            limits: wgpu::Limits::default(),
            frame_latency: 2,
        }
    }
}

impl GpuInit {
    pub(crate) fn instance(&self) -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: self.backends,
            ..Default::default()
        })
    }

    pub(crate) fn device_descriptor(&self) -> wgpu::DeviceDescriptor<'static> {
        wgpu::DeviceDescriptor {
            label: Some("ledscope device"),
            required_features: self.features,
            required_limits: self.limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }
    }
}
