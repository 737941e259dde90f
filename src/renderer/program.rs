// renderer/program.rs
use thiserror::Error;

use crate::renderer::{AttributeLocation, GraphicsDevice, ProgramId, ShaderSource, UniformLocation};

/// Compilation or link failure, with the driver's diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("shadow program failed to compile:\n{}", .errors.join("\n"))]
pub struct CompileError {
    pub errors: Vec<String>,
}

/// A linked GPU program. Dropping it does not free the GPU object; call
/// [`Program::destroy`] with the device that created it.
#[derive(Debug, PartialEq, Eq)]
pub struct Program {
    id: ProgramId,
}

impl Program {
    pub fn compile<D: GraphicsDevice>(
        device: &mut D,
        source: &ShaderSource,
    ) -> Result<Self, CompileError> {
        match device.compile_program(source) {
            Ok(id) => Ok(Self { id }),
            Err(errors) if errors.is_empty() => Err(CompileError {
                errors: vec!["unknown compile error".to_string()],
            }),
            Err(errors) => Err(CompileError { errors }),
        }
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn location<D: GraphicsDevice>(&self, device: &D, name: &str) -> Option<UniformLocation> {
        device.uniform_location(self.id, name)
    }

    pub fn attribute<D: GraphicsDevice>(
        &self,
        device: &D,
        name: &str,
    ) -> Option<AttributeLocation> {
        device.attribute_location(self.id, name)
    }

    pub fn bind<D: GraphicsDevice>(&self, device: &mut D) {
        device.use_program(self.id);
    }

    pub fn destroy<D: GraphicsDevice>(self, device: &mut D) {
        device.delete_program(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{GpuCommand, RecordingDevice};

    fn source(vertex: &str, fragment: &str) -> ShaderSource {
        ShaderSource {
            vertex: vertex.to_string(),
            fragment: fragment.to_string(),
        }
    }

    #[test]
    fn compile_error_lists_diagnostics() {
        let mut device = RecordingDevice::new();
        let err = Program::compile(&mut device, &source("uniform mat4 m;", "void main(void) {}"))
            .unwrap_err();

        assert!(!err.errors.is_empty());
        assert!(err.to_string().starts_with("shadow program failed to compile"));
    }

    #[test]
    fn locations_resolve_through_device() {
        let mut device = RecordingDevice::new();
        let program = Program::compile(
            &mut device,
            &source(
                "attribute vec3 position;\nuniform mat4 modelMatrix;\nvoid main(void) {}",
                "void main(void) {}",
            ),
        )
        .unwrap();

        assert!(program.location(&device, "modelMatrix").is_some());
        assert!(program.location(&device, "viewMatrix").is_none());
        assert!(program.attribute(&device, "position").is_some());

        program.bind(&mut device);
        let id = program.id();
        program.destroy(&mut device);
        assert_eq!(
            device.commands(),
            &[GpuCommand::UseProgram(id), GpuCommand::DeleteProgram(id)]
        );
    }
}
