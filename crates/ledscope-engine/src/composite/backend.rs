use crate::coords::{SurfaceSize, Vec2};
use crate::error::CompositeResult;

/// Drawing surface whose pixel size the compositors control.
///
/// `size` is the backing resolution; `display_size` is the size the host should show
/// it at (the scene back-end renders at 2x its display size).
pub trait DrawingSurface {
    fn size(&self) -> SurfaceSize;

    fn resize(&mut self, size: SurfaceSize);

    fn display_size(&self) -> SurfaceSize;

    fn set_display_size(&mut self, size: SurfaceSize);
}

/// GPU capability used by [`RasterCompositor`](super::RasterCompositor).
///
/// Handles are released by dropping them.
pub trait RasterBackend: DrawingSurface {
    /// Pipeline plus the static quad buffers.
    type Program;
    /// RGB texture sampled by the quad.
    type Texture;

    fn create_program(&mut self) -> CompositeResult<Self::Program>;

    fn create_texture(
        &mut self,
        program: &Self::Program,
        size: SurfaceSize,
    ) -> CompositeResult<Self::Texture>;

    /// Sub-image transfer of a full, tightly packed RGB buffer of `size`.
    fn upload_rgb(&mut self, texture: &Self::Texture, size: SurfaceSize, rgb: &[u8]);

    /// Draws `texture` over the whole surface, sampling `[0, uv_scale]` of it.
    fn draw_quad(&mut self, program: &Self::Program, texture: &Self::Texture, uv_scale: [f32; 2]);
}

/// Render target description for [`SceneBackend::create_scene`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneDesc {
    /// Internal render resolution.
    pub size: SurfaceSize,
}

/// A filled disk in scene space (origin at the center, +Y up, render pixels).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DiskDesc {
    pub center: Vec2,
    pub radius: f32,
    pub color: [f32; 3],
}

/// Bloom post-processing parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BloomParams {
    /// Gain applied to the blurred glow before it is added to the scene.
    pub strength: f32,
    /// Blur spread; 1.0 is the default kernel width.
    pub radius: f32,
    /// Channel values below this contribute no glow.
    pub threshold: f32,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            strength: 8.0,
            radius: 1.0,
            threshold: 0.0,
        }
    }
}

/// Scene-graph capability used by [`SceneCompositor`](super::SceneCompositor):
/// create a scene, create disks in it, build a bloom pipeline, render.
pub trait SceneBackend: DrawingSurface {
    type Scene;
    type Disk;
    type Bloom;

    fn create_scene(&mut self, desc: &SceneDesc) -> CompositeResult<Self::Scene>;

    fn create_disk(&mut self, scene: &mut Self::Scene, disk: &DiskDesc) -> Self::Disk;

    fn update_disk(
        &mut self,
        scene: &mut Self::Scene,
        disk: &Self::Disk,
        center: Vec2,
        color: [f32; 3],
    );

    fn dispose_disk(&mut self, scene: &mut Self::Scene, disk: Self::Disk);

    fn compose_bloom(
        &mut self,
        scene: &Self::Scene,
        params: &BloomParams,
    ) -> CompositeResult<Self::Bloom>;

    /// Renders the scene, then the bloom passes, onto the surface.
    fn render(&mut self, scene: &mut Self::Scene, bloom: &mut Self::Bloom);
}
