//! sparkle-tree - gesture-controlled particle holiday tree.

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use winit::event_loop::{ControlFlow, EventLoop};

use sparkle_tree::{App, Config, Perception};

/// Particle holiday tree driven by hand gestures or the mouse.
#[derive(Parser, Debug)]
#[command(name = "sparkle-tree", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable hand tracking and use the pointer only
    #[arg(long)]
    no_camera: bool,

    /// Landmark UDP port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Photo shown in the floating frame (overrides config)
    #[arg(long)]
    photo: Option<PathBuf>,

    /// Fixed seed for particle layouts (overrides config)
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if self.no_camera {
            config.perception.enabled = false;
        }
        if let Some(port) = self.port {
            config.perception.port = port;
        }
        if let Some(photo) = &self.photo {
            config.scene.photo = photo.clone();
        }
        if let Some(seed) = self.seed {
            config.scene.seed = Some(seed);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting sparkle-tree v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let perception = Perception::init(&config.perception);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, perception);
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.take_error() {
        return Err(e.into());
    }
    info!("Goodbye");
    Ok(())
}
