use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ledscope_engine::composite::{BloomParams, CompositorKind};

#[derive(Parser, Debug)]
#[command(name = "ledscope", version, about = "Live view of addressable LED strips")]
pub struct Args {
    /// Compositor to draw with.
    #[arg(long, value_enum, default_value_t = BackendChoice::Raster)]
    pub backend: BackendChoice,

    /// Target frame rate.
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// JSON-lines file of strip geometry events; overrides --demo.
    #[arg(long)]
    pub map: Option<PathBuf>,

    /// Built-in layout used when no --map is given.
    #[arg(long, value_enum, default_value_t = DemoLayout::Grid)]
    pub demo: DemoLayout,

    /// Initial window width (logical pixels).
    #[arg(long, default_value_t = 800.0)]
    pub width: f64,

    /// Initial window height (logical pixels).
    #[arg(long, default_value_t = 600.0)]
    pub height: f64,

    /// Log filter, `env_logger` syntax. Falls back to RUST_LOG.
    #[arg(long)]
    pub log: Option<String>,

    /// Bloom gain for the scene compositor.
    #[arg(long, default_value_t = 8.0)]
    pub bloom_strength: f32,

    /// Bloom blur spread for the scene compositor.
    #[arg(long, default_value_t = 1.0)]
    pub bloom_radius: f32,
}

impl Args {
    pub fn bloom(&self) -> BloomParams {
        BloomParams {
            strength: self.bloom_strength,
            radius: self.bloom_radius,
            ..BloomParams::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendChoice {
    Raster,
    Scene,
}

impl From<BackendChoice> for CompositorKind {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Raster => CompositorKind::Raster,
            BackendChoice::Scene => CompositorKind::Scene,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DemoLayout {
    /// Eight serpentine rows of 32, one strip per row.
    Grid,
    /// Three concentric rings with declared diameters.
    Ring,
    /// One straight strip of 60.
    Strip,
}
