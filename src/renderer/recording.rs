// renderer/recording.rs
use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::renderer::{
    AttributeLocation, BufferId, BufferTarget, ComponentType, GraphicsDevice, ProgramId,
    ShaderSource, UniformLocation,
};

/// A command issued to a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    UseProgram(ProgramId),
    DeleteProgram(ProgramId),
    UniformMat4(UniformLocation, Mat4),
    UniformVec3(UniformLocation, Vec3),
    UniformF32(UniformLocation, f32),
    UniformBool(UniformLocation, bool),
    SetCullFace(bool),
    SetFrontFace(wgpu::FrontFace),
    SetLineWidth(f32),
    BindVertexAttribute {
        attribute: AttributeLocation,
        buffer: BufferId,
        components: u32,
        component_type: ComponentType,
    },
    BindIndexBuffer(BufferId),
    DrawElements {
        topology: wgpu::PrimitiveTopology,
        count: u32,
        format: wgpu::IndexFormat,
    },
    DrawArrays {
        topology: wgpu::PrimitiveTopology,
        first: u32,
        count: u32,
    },
}

impl GpuCommand {
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::DrawElements { .. } | Self::DrawArrays { .. })
    }
}

#[derive(Debug, Default)]
struct ReflectedProgram {
    uniforms: HashMap<String, UniformLocation>,
    attributes: HashMap<String, AttributeLocation>,
}

/// In-memory graphics device.
///
/// "Compiles" by checking each stage for a `main` entry point and balanced
/// braces, and reflects one `uniform`/`attribute` declaration per line to hand
/// out locations. Every state or draw command is appended to a command log that
/// can be inspected or drained per frame.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<GpuCommand>,
    programs: HashMap<ProgramId, ReflectedProgram>,
    buffers: HashMap<BufferId, usize>,
    next_program: u32,
    next_buffer: u32,
    programs_compiled: u32,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn count(&self, predicate: impl Fn(&GpuCommand) -> bool) -> usize {
        self.commands.iter().filter(|command| predicate(*command)).count()
    }

    pub fn draw_count(&self) -> usize {
        self.count(GpuCommand::is_draw)
    }

    /// Programs currently alive on the device.
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Successful compilations since the device was created.
    pub fn programs_compiled(&self) -> u32 {
        self.programs_compiled
    }

    pub fn is_live(&self, program: ProgramId) -> bool {
        self.programs.contains_key(&program)
    }

    pub fn buffer_size(&self, buffer: BufferId) -> Option<usize> {
        self.buffers.get(&buffer).copied()
    }

    /// Drops every program, as a lost context would. Program names are never
    /// reused, so stale ids held elsewhere stay distinguishable.
    pub fn lose_context(&mut self) {
        log::warn!(
            "Simulating context loss ({} programs dropped)",
            self.programs.len()
        );
        self.programs.clear();
    }

    fn validate_stage(stage: &str, source: &str, errors: &mut Vec<String>) {
        if !source.contains("void main") {
            errors.push(format!("ERROR: {stage} shader: missing entry point 'main'"));
        }
        let mut depth = 0i32;
        for (line_no, line) in source.lines().enumerate() {
            for c in line.chars() {
                match c {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
                if depth < 0 {
                    errors.push(format!(
                        "ERROR: {stage} shader:{}: unexpected '}}'",
                        line_no + 1
                    ));
                    return;
                }
            }
        }
        if depth != 0 {
            errors.push(format!("ERROR: {stage} shader: unterminated block"));
        }
    }

    fn reflect(source: &ShaderSource) -> ReflectedProgram {
        let mut program = ReflectedProgram::default();
        let lines = source.vertex.lines().chain(source.fragment.lines());
        for line in lines {
            let mut tokens = line.split_whitespace();
            let (Some(qualifier), Some(_ty), Some(name)) =
                (tokens.next(), tokens.next(), tokens.next())
            else {
                continue;
            };
            let name = name.trim_end_matches(';').to_string();
            match qualifier {
                "uniform" => {
                    let next = program.uniforms.len() as u32;
                    program
                        .uniforms
                        .entry(name)
                        .or_insert(UniformLocation(next));
                }
                "attribute" => {
                    let next = program.attributes.len() as u32;
                    program
                        .attributes
                        .entry(name)
                        .or_insert(AttributeLocation(next));
                }
                _ => {}
            }
        }
        program
    }
}

impl GraphicsDevice for RecordingDevice {
    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramId, Vec<String>> {
        let mut errors = Vec::new();
        Self::validate_stage("vertex", &source.vertex, &mut errors);
        Self::validate_stage("fragment", &source.fragment, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        self.next_program += 1;
        let id = ProgramId(self.next_program);
        self.programs.insert(id, Self::reflect(source));
        self.programs_compiled += 1;
        Ok(id)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.programs.get(&program)?.uniforms.get(name).copied()
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation> {
        self.programs.get(&program)?.attributes.get(name).copied()
    }

    fn use_program(&mut self, program: ProgramId) {
        if !self.programs.contains_key(&program) {
            log::warn!("use_program on unknown program {:?}", program);
        }
        self.commands.push(GpuCommand::UseProgram(program));
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        self.commands.push(GpuCommand::DeleteProgram(program));
    }

    fn create_buffer(&mut self, _target: BufferTarget, contents: &[u8]) -> BufferId {
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        self.buffers.insert(id, contents.len());
        id
    }

    fn uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        self.commands.push(GpuCommand::UniformMat4(location, *value));
    }

    fn uniform_vec3(&mut self, location: UniformLocation, value: Vec3) {
        self.commands.push(GpuCommand::UniformVec3(location, value));
    }

    fn uniform_f32(&mut self, location: UniformLocation, value: f32) {
        self.commands.push(GpuCommand::UniformF32(location, value));
    }

    fn uniform_bool(&mut self, location: UniformLocation, value: bool) {
        self.commands.push(GpuCommand::UniformBool(location, value));
    }

    fn set_cull_face(&mut self, enabled: bool) {
        self.commands.push(GpuCommand::SetCullFace(enabled));
    }

    fn set_front_face(&mut self, front_face: wgpu::FrontFace) {
        self.commands.push(GpuCommand::SetFrontFace(front_face));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(GpuCommand::SetLineWidth(width));
    }

    fn bind_vertex_attribute(
        &mut self,
        attribute: AttributeLocation,
        buffer: BufferId,
        components: u32,
        component_type: ComponentType,
    ) {
        self.commands.push(GpuCommand::BindVertexAttribute {
            attribute,
            buffer,
            components,
            component_type,
        });
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        self.commands.push(GpuCommand::BindIndexBuffer(buffer));
    }

    fn draw_elements(
        &mut self,
        topology: wgpu::PrimitiveTopology,
        count: u32,
        format: wgpu::IndexFormat,
    ) {
        self.commands.push(GpuCommand::DrawElements {
            topology,
            count,
            format,
        });
    }

    fn draw_arrays(&mut self, topology: wgpu::PrimitiveTopology, first: u32, count: u32) {
        self.commands.push(GpuCommand::DrawArrays {
            topology,
            first,
            count,
        });
    }
}
