mod app;
mod cli;
mod demo;

use clap::Parser;
use ledscope_engine::device::GpuInit;
use ledscope_engine::logging::{LoggingConfig, init_logging};
use ledscope_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

use crate::app::ViewerApp;
use crate::cli::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    let events = match &args.map {
        Some(path) => demo::load_events(path)?,
        None => demo::layout_events(args.demo),
    };
    log::info!("loaded {} strip events", events.len());

    let config = RuntimeConfig {
        title: "ledscope".to_string(),
        initial_size: LogicalSize::new(args.width, args.height),
        fps: args.fps,
    };
    let app = ViewerApp::new(args.backend.into(), args.bloom(), events);

    Runtime::run(config, GpuInit::default(), app)
}
