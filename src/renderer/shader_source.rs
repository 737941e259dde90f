// renderer/shader_source.rs
use std::fmt::Write;

use crate::scene::{Billboard, Clip, ShadowCaster};
use crate::settings::ShaderPrecision;

/// Source of a shadow program, one string per stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

/// Produces the program source a shadow caster needs.
///
/// Must be a pure function of the caster's configuration and the number of
/// clip planes: every caster mapping to the same pass fingerprint has to get
/// byte-identical source.
pub trait ShaderSourceGenerator {
    fn generate(&self, clips: &[Clip], caster: &ShadowCaster) -> ShaderSource;
}

/// Default generator: writes packed fragment depth into the shadow map.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowShaderSource {
    precision: ShaderPrecision,
}

impl ShadowShaderSource {
    pub fn new(precision: ShaderPrecision) -> Self {
        Self { precision }
    }

    fn vertex(&self, clips: &[Clip], caster: &ShadowCaster) -> String {
        let geometry = &caster.geometry;
        let quantized = geometry.quantized;
        let clipping = !clips.is_empty();
        let points = geometry.primitive == wgpu::PrimitiveTopology::PointList;
        let billboard = caster.state.billboard;

        let mut src = String::new();
        src.push_str("// Shadow map vertex shader\n");
        let _ = writeln!(src, "precision {} float;", self.precision.keyword());
        let _ = writeln!(src, "precision {} int;", self.precision.keyword());
        src.push_str("attribute vec3 position;\n");
        src.push_str("uniform mat4 modelMatrix;\n");
        src.push_str("uniform mat4 viewMatrix;\n");
        src.push_str("uniform mat4 projMatrix;\n");
        if quantized {
            src.push_str("uniform mat4 positionsDecodeMatrix;\n");
        }
        if points {
            src.push_str("uniform float pointSize;\n");
        }
        if clipping {
            src.push_str("varying vec4 vWorldPosition;\n");
        }
        if billboard != Billboard::None {
            src.push_str("void billboard(inout mat4 mat) {\n");
            src.push_str("    mat[0][0] = 1.0;\n    mat[0][1] = 0.0;\n    mat[0][2] = 0.0;\n");
            if billboard == Billboard::Spherical {
                src.push_str("    mat[1][0] = 0.0;\n    mat[1][1] = 1.0;\n    mat[1][2] = 0.0;\n");
            }
            src.push_str("    mat[2][0] = 0.0;\n    mat[2][1] = 0.0;\n    mat[2][2] = 1.0;\n");
            src.push_str("}\n");
        }
        src.push_str("void main(void) {\n");
        src.push_str("    vec4 localPosition = vec4(position, 1.0);\n");
        if quantized {
            src.push_str("    localPosition = positionsDecodeMatrix * localPosition;\n");
        }
        src.push_str("    mat4 viewMatrix2 = viewMatrix;\n");
        src.push_str("    mat4 modelMatrix2 = modelMatrix;\n");
        if billboard != Billboard::None {
            src.push_str("    billboard(modelMatrix2);\n");
            src.push_str("    billboard(viewMatrix2);\n");
        }
        src.push_str("    vec4 worldPosition = modelMatrix2 * localPosition;\n");
        src.push_str("    vec4 viewPosition = viewMatrix2 * worldPosition;\n");
        if clipping {
            src.push_str("    vWorldPosition = worldPosition;\n");
        }
        src.push_str("    gl_Position = projMatrix * viewPosition;\n");
        if points {
            src.push_str("    gl_PointSize = pointSize;\n");
        }
        src.push_str("}\n");
        src
    }

    fn fragment(&self, clips: &[Clip], caster: &ShadowCaster) -> String {
        let clipping = !clips.is_empty();
        let points = caster.geometry.primitive == wgpu::PrimitiveTopology::PointList;

        let mut src = String::new();
        src.push_str("// Shadow map fragment shader\n");
        let _ = writeln!(src, "precision {} float;", self.precision.keyword());
        let _ = writeln!(src, "precision {} int;", self.precision.keyword());
        if clipping {
            src.push_str("varying vec4 vWorldPosition;\n");
            src.push_str("uniform bool clippable;\n");
            for i in 0..clips.len() {
                let _ = writeln!(src, "uniform bool clipActive{i};");
                let _ = writeln!(src, "uniform vec3 clipPos{i};");
                let _ = writeln!(src, "uniform vec3 clipDir{i};");
            }
        }
        src.push_str("vec4 encodeFloat(const in float depth) {\n");
        src.push_str("    const vec4 bitShift = vec4(256.0 * 256.0 * 256.0, 256.0 * 256.0, 256.0, 1.0);\n");
        src.push_str("    const vec4 bitMask = vec4(0.0, 1.0 / 256.0, 1.0 / 256.0, 1.0 / 256.0);\n");
        src.push_str("    vec4 comp = fract(depth * bitShift);\n");
        src.push_str("    comp -= comp.xxyz * bitMask;\n");
        src.push_str("    return comp;\n");
        src.push_str("}\n");
        src.push_str("void main(void) {\n");
        if clipping {
            src.push_str("    if (clippable) {\n");
            src.push_str("        float dist = 0.0;\n");
            for i in 0..clips.len() {
                let _ = writeln!(src, "        if (clipActive{i}) {{");
                let _ = writeln!(
                    src,
                    "            dist += clamp(dot(-clipDir{i}.xyz, vWorldPosition.xyz - clipPos{i}.xyz), 0.0, 1000.0);"
                );
                src.push_str("        }\n");
            }
            src.push_str("        if (dist > 0.0) { discard; }\n");
            src.push_str("    }\n");
        }
        if points {
            src.push_str("    vec2 cxy = 2.0 * gl_PointCoord - 1.0;\n");
            src.push_str("    if (dot(cxy, cxy) > 1.0) { discard; }\n");
        }
        src.push_str("    gl_FragColor = encodeFloat(gl_FragCoord.z);\n");
        src.push_str("}\n");
        src
    }
}

impl ShaderSourceGenerator for ShadowShaderSource {
    fn generate(&self, clips: &[Clip], caster: &ShadowCaster) -> ShaderSource {
        ShaderSource {
            vertex: self.vertex(clips, caster),
            fragment: self.fragment(clips, caster),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glam::{Mat4, Vec3};

    use super::*;
    use crate::asset::Id;
    use crate::scene::{DrawableState, GeometryState, MaterialState};

    fn caster(primitive: wgpu::PrimitiveTopology, quantized: bool) -> ShadowCaster {
        let mut geometry = GeometryState::combined(Id::new(1), primitive, None);
        if quantized {
            geometry = geometry.with_quantization(Mat4::IDENTITY);
        }
        ShadowCaster::new(Rc::new(geometry), Rc::new(MaterialState::new(Id::new(1))))
    }

    #[test]
    fn declares_one_uniform_triple_per_clip() {
        let clips = [Clip::new(Vec3::ZERO, Vec3::X), Clip::new(Vec3::ONE, Vec3::Y)];
        let source = ShadowShaderSource::default()
            .generate(&clips, &caster(wgpu::PrimitiveTopology::TriangleList, false));

        assert!(source.fragment.contains("uniform bool clippable;"));
        for i in 0..2 {
            assert!(source.fragment.contains(&format!("uniform bool clipActive{i};")));
            assert!(source.fragment.contains(&format!("uniform vec3 clipPos{i};")));
            assert!(source.fragment.contains(&format!("uniform vec3 clipDir{i};")));
        }
        assert!(!source.fragment.contains("clipActive2"));
    }

    #[test]
    fn optional_uniforms_follow_configuration() {
        let generator = ShadowShaderSource::new(ShaderPrecision::Mediump);
        let plain = generator.generate(&[], &caster(wgpu::PrimitiveTopology::TriangleList, false));
        let quantized_points =
            generator.generate(&[], &caster(wgpu::PrimitiveTopology::PointList, true));

        assert!(!plain.vertex.contains("positionsDecodeMatrix"));
        assert!(!plain.vertex.contains("pointSize"));
        assert!(!plain.fragment.contains("clippable"));
        assert!(plain.vertex.contains("precision mediump float;"));
        assert!(quantized_points.vertex.contains("uniform mat4 positionsDecodeMatrix;"));
        assert!(quantized_points.vertex.contains("uniform float pointSize;"));
    }

    #[test]
    fn billboard_mode_changes_source() {
        let generator = ShadowShaderSource::default();
        let base = caster(wgpu::PrimitiveTopology::TriangleList, false);
        let spherical = base.clone().with_state(DrawableState {
            billboard: Billboard::Spherical,
            clippable: true,
        });

        let a = generator.generate(&[], &base);
        let b = generator.generate(&[], &spherical);
        assert_ne!(a.vertex, b.vertex);
        assert!(b.vertex.contains("billboard(viewMatrix2);"));
        assert_eq!(a.fragment, b.fragment);
    }
}
