pub mod device;
pub mod frame;
pub mod program;
pub mod recording;
pub mod registry;
pub mod shader_source;
pub mod shadow_pass;

pub use device::{
    AttributeLocation, BufferId, BufferTarget, ComponentType, GraphicsDevice, ProgramId,
    UniformLocation,
};
pub use frame::FrameContext;
pub use program::{CompileError, Program};
pub use recording::{GpuCommand, RecordingDevice};
pub use registry::{Fingerprint, ShadowPassRegistry, SharedShadowPass};
pub use shader_source::{ShaderSource, ShaderSourceGenerator, ShadowShaderSource};
pub use shadow_pass::{PassStatus, ShadowPass};
