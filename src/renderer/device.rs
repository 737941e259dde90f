// renderer/device.rs
use glam::{Mat4, Vec3};

use crate::renderer::ShaderSource;

/// Device-assigned name of a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Device-assigned name of a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Resolved location of a uniform inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Resolved location of a vertex attribute inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeLocation(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

/// Component type of vertex attribute data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Float32,
    /// Quantized positions, decoded in the shader by `positionsDecodeMatrix`.
    Uint16,
}

impl ComponentType {
    pub fn size_in_bytes(self) -> u32 {
        match self {
            Self::Float32 => 4,
            Self::Uint16 => 2,
        }
    }
}

/// Immediate-mode command surface of the graphics context that owns the
/// shadow passes.
///
/// Everything runs on the thread that owns the context. Implementations must
/// not call back into the pass registry from any of these methods.
pub trait GraphicsDevice {
    /// Compiles and links `source`. On failure returns the driver diagnostics.
    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramId, Vec<String>>;

    /// `None` when the uniform is not active in the linked program.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// `None` when the attribute is not active in the linked program.
    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation>;

    fn use_program(&mut self, program: ProgramId);

    fn delete_program(&mut self, program: ProgramId);

    fn create_buffer(&mut self, target: BufferTarget, contents: &[u8]) -> BufferId;

    fn uniform_mat4(&mut self, location: UniformLocation, value: &Mat4);

    fn uniform_vec3(&mut self, location: UniformLocation, value: Vec3);

    fn uniform_f32(&mut self, location: UniformLocation, value: f32);

    fn uniform_bool(&mut self, location: UniformLocation, value: bool);

    fn set_cull_face(&mut self, enabled: bool);

    fn set_front_face(&mut self, front_face: wgpu::FrontFace);

    fn set_line_width(&mut self, width: f32);

    fn bind_vertex_attribute(
        &mut self,
        attribute: AttributeLocation,
        buffer: BufferId,
        components: u32,
        component_type: ComponentType,
    );

    fn bind_index_buffer(&mut self, buffer: BufferId);

    fn draw_elements(
        &mut self,
        topology: wgpu::PrimitiveTopology,
        count: u32,
        format: wgpu::IndexFormat,
    );

    fn draw_arrays(&mut self, topology: wgpu::PrimitiveTopology, first: u32, count: u32);
}
