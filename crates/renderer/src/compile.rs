use std::borrow::Cow;

use anyhow::{anyhow, Result};
use wgpu::naga::front::glsl;
use wgpu::naga::ShaderStage;

/// Uniform names the viewer feeds by itself; declarations in the loaded
/// shader text are stripped so the injected block wins.
const KNOWN_UNIFORMS: [&str; 3] = ["iTime", "iResolution", "iMouse"];

/// Upper bound for compile diagnostics, mirroring the fixed-size info-log
/// buffers of classic GL loaders.
const MAX_DIAGNOSTIC_LEN: usize = 2048;

/// Compiles the static fullscreen-quad vertex shader.
///
/// The source is a compiled-in asset, so a validation failure here is a
/// fatal setup error rather than something to fall back from.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    validate_stage(ShaderStage::Vertex, VERTEX_SHADER_GLSL)
        .map_err(|diagnostic| anyhow!("vertex shader failed validation:\n{diagnostic}"))?;
    Ok(create_module(
        device,
        "fragview vertex",
        Cow::Borrowed(VERTEX_SHADER_GLSL),
        ShaderStage::Vertex,
    ))
}

/// Wraps the loaded shader text with the viewer prelude and compiles it.
///
/// Validation failures are non-fatal: the diagnostic is logged and a solid
/// black fallback module is substituted, so the render loop still starts and
/// the user can keep editing the shader file.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device, source: &str) -> wgpu::ShaderModule {
    let wrapped = wrap_fragment(source);
    match validate_stage(ShaderStage::Fragment, &wrapped) {
        Ok(()) => create_module(
            device,
            "fragview fragment",
            Cow::Owned(wrapped),
            ShaderStage::Fragment,
        ),
        Err(diagnostic) => {
            tracing::error!("{}", fragment_diagnostic(&diagnostic));
            create_module(
                device,
                "fragview fallback fragment",
                Cow::Borrowed(FALLBACK_FRAGMENT_GLSL),
                ShaderStage::Fragment,
            )
        }
    }
}

fn create_module(
    device: &wgpu::Device,
    label: &str,
    shader: Cow<'static, str>,
    stage: ShaderStage,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader,
            stage,
            defines: &[],
        },
    })
}

/// Parses one shader stage through naga's GLSL frontend without creating a
/// module, returning a bounded diagnostic on failure.
pub(crate) fn validate_stage(stage: ShaderStage, source: &str) -> Result<(), String> {
    let mut frontend = glsl::Frontend::default();
    frontend
        .parse(&glsl::Options::from(stage), source)
        .map(|_| ())
        .map_err(|errors| bounded_diagnostic(errors.emit_to_string(source)))
}

/// Formats a fragment validation failure the way the viewer reports it.
pub(crate) fn fragment_diagnostic(detail: &str) -> String {
    format!("ERROR::SHADER::FRAGMENT::COMPILATION_FAILED\n{detail}")
}

fn bounded_diagnostic(mut message: String) -> String {
    if message.len() > MAX_DIAGNOSTIC_LEN {
        let mut end = MAX_DIAGNOSTIC_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
        message.push_str("... (truncated)");
    }
    message
}

/// Produces a self-contained GLSL fragment shader from the loaded text.
///
/// Steps performed:
///
/// 1. Strip `#version` directives and declarations of the known uniforms so
///    we can inject our own definitions.
/// 2. Prepend [`HEADER`] which declares the uniform block, macro aliases for
///    the uniform names, and the `gl_FragColor` output plumbing.
///
/// Uniform names the shader never declares or reads stay silent no-ops.
pub(crate) fn wrap_fragment(source: &str) -> String {
    let mut sanitized = String::with_capacity(source.len());
    let mut skipped_version = false;
    for line in source.lines() {
        let trimmed = line.trim_start();
        if !skipped_version && trimmed.starts_with("#version") {
            skipped_version = true;
            continue;
        }
        let is_known_uniform = trimmed.starts_with("uniform ")
            && KNOWN_UNIFORMS.iter().any(|name| trimmed.contains(name));
        if is_known_uniform {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    format!("{HEADER}\n#line 1\n{sanitized}")
}

/// GLSL prologue injected ahead of every loaded fragment shader.
///
/// The uniform block layout must match `ViewerUniforms` in `uniforms.rs`.
const HEADER: &str = r"#version 450
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform ViewerParams {
    vec2 _iResolution;
    float _iTime;
    float _pad0;
    vec2 _iMouse;
    vec2 _pad1;
} ubo;

#define iResolution ubo._iResolution
#define iTime ubo._iTime
#define iMouse ubo._iMouse
#define gl_FragColor outColor
";

/// Minimal fullscreen-quad vertex shader, fixed at build time.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 position;

void main() {
    gl_Position = vec4(position, 0.0, 1.0);
}
";

/// Substitute fragment stage used when the loaded shader fails validation.
const FALLBACK_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) out vec4 outColor;

void main() {
    outColor = vec4(0.0, 0.0, 0.0, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO_FRAGMENT: &str = r#"
#version 330 core
uniform float iTime;
uniform vec2 iResolution;
void main() {
    vec2 uv = gl_FragCoord.xy / iResolution;
    gl_FragColor = vec4(uv, 0.5 + 0.5 * sin(iTime), 1.0);
}
"#;

    #[test]
    fn wrap_strips_version_and_known_uniforms() {
        let wrapped = wrap_fragment(DEMO_FRAGMENT);
        assert!(!wrapped.contains("#version 330"));
        assert!(!wrapped.contains("uniform float iTime"));
        assert!(!wrapped.contains("uniform vec2 iResolution"));
        assert!(wrapped.contains("gl_FragCoord.xy / iResolution"));
        assert!(wrapped.starts_with("#version 450"));
    }

    #[test]
    fn wrapped_fragment_validates() {
        let wrapped = wrap_fragment(DEMO_FRAGMENT);
        validate_stage(ShaderStage::Fragment, &wrapped).expect("demo shader should compile");
    }

    #[test]
    fn builtin_stages_validate() {
        validate_stage(ShaderStage::Vertex, VERTEX_SHADER_GLSL).expect("vertex shader");
        validate_stage(ShaderStage::Fragment, FALLBACK_FRAGMENT_GLSL).expect("fallback fragment");
    }

    #[test]
    fn invalid_fragment_reports_compilation_failure() {
        let wrapped = wrap_fragment("void main() { this is not glsl }");
        let diagnostic = validate_stage(ShaderStage::Fragment, &wrapped).unwrap_err();
        let report = fragment_diagnostic(&diagnostic);
        assert!(report.contains("COMPILATION_FAILED"));
    }

    #[test]
    fn diagnostics_are_bounded() {
        let long = "x".repeat(MAX_DIAGNOSTIC_LEN * 2);
        let bounded = bounded_diagnostic(long);
        assert!(bounded.len() <= MAX_DIAGNOSTIC_LEN + "... (truncated)".len());
        assert!(bounded.ends_with("(truncated)"));
    }
}
