use std::path::PathBuf;

use clap::Parser;
use renderer::DEFAULT_TIME_STEP;

#[derive(Parser, Debug)]
#[command(
    name = "fragview",
    author,
    version,
    about = "Minimal real-time fragment shader viewer",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the fragment shader file to render.
    #[arg(value_name = "SHADER", default_value = "shaders/frag.glsl")]
    pub shader: PathBuf,

    /// Window size in physical pixels (e.g. `1280x720`).
    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        value_parser = parse_surface_size,
        default_value = "800x600"
    )]
    pub size: (u32, u32),

    /// How `iTime` advances: `step` (fixed increment per frame) or `wall`.
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_clock,
        default_value = "step"
    )]
    pub clock: ClockMode,

    /// Increment in seconds applied per frame under the `step` clock.
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = parse_time_step,
        default_value_t = DEFAULT_TIME_STEP
    )]
    pub time_step: f32,
}

/// CLI-facing clock selector, mapped onto the renderer's policy in `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    Step,
    Wall,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (w, h) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{trimmed}'; expected WIDTHxHEIGHT"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{trimmed}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height in '{trimmed}'"))?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".to_string());
    }
    Ok((width, height))
}

pub fn parse_clock(value: &str) -> Result<ClockMode, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "step" | "stepped" | "frame" => Ok(ClockMode::Step),
        "wall" | "real" | "clock" => Ok(ClockMode::Wall),
        other => Err(format!("unknown clock mode '{other}'; expected step or wall")),
    }
}

pub fn parse_time_step(value: &str) -> Result<f32, String> {
    let step = value
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid time step '{value}'"))?;
    if !step.is_finite() || step <= 0.0 {
        return Err("time step must be a positive number of seconds".to_string());
    }
    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_surface_size_variants() {
        assert_eq!(parse_surface_size("800x600").unwrap(), (800, 600));
        assert_eq!(parse_surface_size("1920X1080").unwrap(), (1920, 1080));
        assert!(parse_surface_size("800").is_err());
        assert!(parse_surface_size("0x600").is_err());
        assert!(parse_surface_size("800xtall").is_err());
    }

    #[test]
    fn parses_clock_modes() {
        assert_eq!(parse_clock("step").unwrap(), ClockMode::Step);
        assert_eq!(parse_clock("WALL").unwrap(), ClockMode::Wall);
        assert!(parse_clock("sundial").is_err());
    }

    #[test]
    fn rejects_non_positive_time_step() {
        assert!(parse_time_step("0").is_err());
        assert!(parse_time_step("-0.5").is_err());
        assert!(parse_time_step("abc").is_err());
        assert!((parse_time_step("0.01").unwrap() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn defaults_apply_without_flags() {
        let cli = Cli::parse_from(["fragview"]);
        assert_eq!(cli.run.shader, PathBuf::from("shaders/frag.glsl"));
        assert_eq!(cli.run.size, (800, 600));
        assert_eq!(cli.run.clock, ClockMode::Step);
        assert!((cli.run.time_step - DEFAULT_TIME_STEP).abs() < 1e-6);
    }
}
