//! In-memory backend that records what the compositors ask for.

use std::cell::Cell;
use std::rc::Rc;

use crate::coords::{SurfaceSize, Vec2};
use crate::error::{CompositeError, CompositeResult};

use super::backend::{BloomParams, DiskDesc, DrawingSurface, RasterBackend, SceneBackend, SceneDesc};

#[derive(Debug, Default)]
struct Counters {
    programs_created: Cell<usize>,
    textures_created: Cell<usize>,
    scenes_created: Cell<usize>,
    live_programs: Cell<usize>,
    live_textures: Cell<usize>,
    live_scenes: Cell<usize>,
    live_disks: Cell<usize>,
    live_blooms: Cell<usize>,
}

fn inc(c: &Cell<usize>) {
    c.set(c.get() + 1);
}

fn dec(c: &Cell<usize>) {
    c.set(c.get() - 1);
}

#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    size: SurfaceSize,
    display_size: SurfaceSize,
    counters: Rc<Counters>,
    uploads: usize,
    last_upload_len: Option<usize>,
    last_uv_scale: Option<[f32; 2]>,
    fail_textures: bool,
    fail_bloom: bool,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_textures(&mut self, fail: bool) {
        self.fail_textures = fail;
    }

    pub(crate) fn fail_bloom(&mut self, fail: bool) {
        self.fail_bloom = fail;
    }

    pub(crate) fn uploads(&self) -> usize {
        self.uploads
    }

    pub(crate) fn last_upload_len(&self) -> Option<usize> {
        self.last_upload_len
    }

    pub(crate) fn last_uv_scale(&self) -> Option<[f32; 2]> {
        self.last_uv_scale
    }

    pub(crate) fn programs_created(&self) -> usize {
        self.counters.programs_created.get()
    }

    pub(crate) fn textures_created(&self) -> usize {
        self.counters.textures_created.get()
    }

    pub(crate) fn scenes_created(&self) -> usize {
        self.counters.scenes_created.get()
    }

    pub(crate) fn live_programs(&self) -> usize {
        self.counters.live_programs.get()
    }

    pub(crate) fn live_textures(&self) -> usize {
        self.counters.live_textures.get()
    }

    pub(crate) fn live_scenes(&self) -> usize {
        self.counters.live_scenes.get()
    }

    pub(crate) fn live_disks(&self) -> usize {
        self.counters.live_disks.get()
    }

    pub(crate) fn live_blooms(&self) -> usize {
        self.counters.live_blooms.get()
    }
}

impl DrawingSurface for FakeBackend {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn display_size(&self) -> SurfaceSize {
        self.display_size
    }

    fn set_display_size(&mut self, size: SurfaceSize) {
        self.display_size = size;
    }
}

// ── raster ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct FakeProgram(Rc<Counters>);

impl Drop for FakeProgram {
    fn drop(&mut self) {
        dec(&self.0.live_programs);
    }
}

#[derive(Debug)]
pub(crate) struct FakeTexture {
    pub size: SurfaceSize,
    counters: Rc<Counters>,
}

impl Drop for FakeTexture {
    fn drop(&mut self) {
        dec(&self.counters.live_textures);
    }
}

impl RasterBackend for FakeBackend {
    type Program = FakeProgram;
    type Texture = FakeTexture;

    fn create_program(&mut self) -> CompositeResult<FakeProgram> {
        inc(&self.counters.programs_created);
        inc(&self.counters.live_programs);
        Ok(FakeProgram(Rc::clone(&self.counters)))
    }

    fn create_texture(&mut self, _program: &FakeProgram, size: SurfaceSize) -> CompositeResult<FakeTexture> {
        if self.fail_textures {
            return Err(CompositeError::unsupported_surface("texture allocation refused"));
        }
        inc(&self.counters.textures_created);
        inc(&self.counters.live_textures);
        Ok(FakeTexture {
            size,
            counters: Rc::clone(&self.counters),
        })
    }

    fn upload_rgb(&mut self, texture: &FakeTexture, size: SurfaceSize, rgb: &[u8]) {
        assert_eq!(texture.size, size);
        assert_eq!(rgb.len(), size.byte_len(3));
        self.uploads += 1;
        self.last_upload_len = Some(rgb.len());
    }

    fn draw_quad(&mut self, _program: &FakeProgram, _texture: &FakeTexture, uv_scale: [f32; 2]) {
        self.last_uv_scale = Some(uv_scale);
    }
}

// ── scene ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakeDisk {
    pub center: Vec2,
    pub radius: f32,
    pub color: [f32; 3],
    pub alive: bool,
}

#[derive(Debug)]
pub(crate) struct FakeScene {
    pub size: SurfaceSize,
    pub disks: Vec<FakeDisk>,
    pub renders: usize,
    counters: Rc<Counters>,
}

impl Drop for FakeScene {
    fn drop(&mut self) {
        dec(&self.counters.live_scenes);
    }
}

#[derive(Debug)]
pub(crate) struct DiskHandle(usize);

#[derive(Debug)]
pub(crate) struct FakeBloom {
    pub params: BloomParams,
    counters: Rc<Counters>,
}

impl Drop for FakeBloom {
    fn drop(&mut self) {
        dec(&self.counters.live_blooms);
    }
}

impl SceneBackend for FakeBackend {
    type Scene = FakeScene;
    type Disk = DiskHandle;
    type Bloom = FakeBloom;

    fn create_scene(&mut self, desc: &SceneDesc) -> CompositeResult<FakeScene> {
        inc(&self.counters.scenes_created);
        inc(&self.counters.live_scenes);
        Ok(FakeScene {
            size: desc.size,
            disks: Vec::new(),
            renders: 0,
            counters: Rc::clone(&self.counters),
        })
    }

    fn create_disk(&mut self, scene: &mut FakeScene, disk: &DiskDesc) -> DiskHandle {
        inc(&self.counters.live_disks);
        scene.disks.push(FakeDisk {
            center: disk.center,
            radius: disk.radius,
            color: disk.color,
            alive: true,
        });
        DiskHandle(scene.disks.len() - 1)
    }

    fn update_disk(&mut self, scene: &mut FakeScene, disk: &DiskHandle, center: Vec2, color: [f32; 3]) {
        let d = &mut scene.disks[disk.0];
        assert!(d.alive, "update of disposed disk");
        d.center = center;
        d.color = color;
    }

    fn dispose_disk(&mut self, scene: &mut FakeScene, disk: DiskHandle) {
        dec(&self.counters.live_disks);
        scene.disks[disk.0].alive = false;
    }

    fn compose_bloom(&mut self, scene: &FakeScene, params: &BloomParams) -> CompositeResult<FakeBloom> {
        if self.fail_bloom {
            return Err(CompositeError::unsupported_surface("bloom pipeline refused"));
        }
        assert!(!scene.size.is_empty());
        inc(&self.counters.live_blooms);
        Ok(FakeBloom {
            params: *params,
            counters: Rc::clone(&self.counters),
        })
    }

    fn render(&mut self, scene: &mut FakeScene, _bloom: &mut FakeBloom) {
        scene.renders += 1;
    }
}
