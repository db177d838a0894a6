use anyhow::{Context, Result};
use renderer::{load_shader_source, ClockPolicy, Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{ClockMode, RunArgs};

pub fn run(args: RunArgs) -> Result<()> {
    // Load the shader text before any window or GPU resource exists, so a
    // missing file fails the run with nothing to tear down.
    let fragment_source = load_shader_source(&args.shader)
        .with_context(|| format!("failed to load fragment shader {}", args.shader.display()))?;
    tracing::info!(
        path = %args.shader.display(),
        bytes = fragment_source.len(),
        "loaded fragment shader"
    );

    let clock = match args.clock {
        ClockMode::Step => ClockPolicy::Stepped {
            step: args.time_step,
        },
        ClockMode::Wall => ClockPolicy::Wall,
    };

    let config = RendererConfig {
        surface_size: args.size,
        fragment_source,
        clock,
    };

    let mut renderer = Renderer::new(config);
    renderer.run()
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
