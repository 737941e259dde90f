// renderer/shadow_pass.rs
use crate::renderer::{
    AttributeLocation, CompileError, Fingerprint, FrameContext, GraphicsDevice, Program,
    ProgramId, ShaderSource, UniformLocation,
};
use crate::scene::{
    Clip, GeometryId, LightId, MaterialId, ShadowCaster, ShadowLight, ShadowScene, VertexBufsId,
};

/// Uniform locations of one clip plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ClipUniforms {
    active: Option<UniformLocation>,
    pos: Option<UniformLocation>,
    dir: Option<UniformLocation>,
}

/// Locations resolved from a linked shadow program. Any of them may be absent
/// when the compiler dropped an unused declaration; absent bindings are
/// skipped at draw time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ShadowBindings {
    positions_decode_matrix: Option<UniformLocation>,
    model_matrix: Option<UniformLocation>,
    view_matrix: Option<UniformLocation>,
    proj_matrix: Option<UniformLocation>,
    clips: Vec<ClipUniforms>,
    clippable: Option<UniformLocation>,
    point_size: Option<UniformLocation>,
    position: Option<AttributeLocation>,
}

impl ShadowBindings {
    fn resolve<D: GraphicsDevice>(device: &D, program: &Program, clip_count: usize) -> Self {
        let clips = (0..clip_count)
            .map(|i| ClipUniforms {
                active: program.location(device, &format!("clipActive{i}")),
                pos: program.location(device, &format!("clipPos{i}")),
                dir: program.location(device, &format!("clipDir{i}")),
            })
            .collect();

        Self {
            positions_decode_matrix: program.location(device, "positionsDecodeMatrix"),
            model_matrix: program.location(device, "modelMatrix"),
            view_matrix: program.location(device, "viewMatrix"),
            proj_matrix: program.location(device, "projMatrix"),
            clips,
            clippable: program.location(device, "clippable"),
            point_size: program.location(device, "pointSize"),
            position: program.attribute(device, "position"),
        }
    }

    fn push_clips<D: GraphicsDevice>(&self, device: &mut D, clips: &[Clip]) {
        for (uniforms, clip) in self.clips.iter().zip(clips) {
            if let Some(active) = uniforms.active {
                device.uniform_bool(active, clip.active);
            }
            if let Some(pos) = uniforms.pos {
                device.uniform_vec3(pos, clip.pos);
            }
            if let Some(dir) = uniforms.dir {
                device.uniform_vec3(dir, clip.dir);
            }
        }
    }
}

#[derive(Debug)]
struct Allocation {
    program: Program,
    bindings: ShadowBindings,
}

/// Identities of the state last established by this pass since its program
/// was bound. `None` means nothing is known and the next draw must push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cursors {
    light: Option<LightId>,
    material: Option<MaterialId>,
    vertex_bufs: Option<VertexBufsId>,
    geometry: Option<GeometryId>,
}

impl Cursors {
    fn invalidate(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus {
    Drawable,
    NonDrawable,
}

/// Draws shadow casters that share one program configuration into a shadow
/// map, skipping GPU state changes that consecutive draws would repeat.
///
/// Instances are shared through [`ShadowPassRegistry`](crate::renderer::ShadowPassRegistry),
/// which owns their lifecycle.
#[derive(Debug)]
pub struct ShadowPass {
    fingerprint: Fingerprint,
    source: ShaderSource,
    clip_count: usize,
    use_count: u32,
    allocation: Option<Allocation>,
    errors: Option<Vec<String>>,
    cursors: Cursors,
    rebind: bool,
}

impl ShadowPass {
    pub(crate) fn new(fingerprint: Fingerprint, source: ShaderSource, clip_count: usize) -> Self {
        Self {
            fingerprint,
            source,
            clip_count,
            use_count: 0,
            allocation: None,
            errors: None,
            cursors: Cursors::default(),
            rebind: false,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn use_count(&self) -> u32 {
        self.use_count
    }

    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    /// Number of clip planes compiled into the program.
    pub fn clip_count(&self) -> usize {
        self.clip_count
    }

    pub fn program_id(&self) -> Option<ProgramId> {
        self.allocation.as_ref().map(|allocation| allocation.program.id())
    }

    pub fn is_allocated(&self) -> bool {
        self.allocation.is_some()
    }

    /// Diagnostics of the last failed allocation.
    pub fn errors(&self) -> Option<&[String]> {
        self.errors.as_deref()
    }

    pub(crate) fn acquire(&mut self) {
        self.use_count += 1;
    }

    /// Returns the remaining use count. Releasing an unused pass is a no-op.
    pub(crate) fn release(&mut self) -> u32 {
        self.use_count = self.use_count.saturating_sub(1);
        self.use_count
    }

    /// Compiles the program and resolves its bindings.
    pub(crate) fn allocate<D: GraphicsDevice>(&mut self, device: &mut D) -> Result<(), CompileError> {
        self.cursors.invalidate();
        match Program::compile(device, &self.source) {
            Ok(program) => {
                let bindings = ShadowBindings::resolve(device, &program, self.clip_count);
                self.allocation = Some(Allocation { program, bindings });
                self.errors = None;
                Ok(())
            }
            Err(err) => {
                self.allocation = None;
                self.errors = Some(err.errors.clone());
                Err(err)
            }
        }
    }

    /// Reallocates the program if it is missing, e.g. after a context loss.
    pub fn ensure_allocated<D: GraphicsDevice>(&mut self, device: &mut D) -> PassStatus {
        if self.allocation.is_some() {
            return PassStatus::Drawable;
        }
        if self.use_count == 0 {
            log::warn!(
                "Shadow pass {} used after its last release; not reallocating",
                self.fingerprint
            );
            return PassStatus::NonDrawable;
        }
        match self.allocate(device) {
            Ok(()) => {
                log::debug!("Reallocated shadow pass {}", self.fingerprint);
                self.rebind = true;
                PassStatus::Drawable
            }
            Err(err) => {
                log::error!("Failed to reallocate shadow pass {}: {}", self.fingerprint, err);
                PassStatus::NonDrawable
            }
        }
    }

    /// Forgets the program without deleting it; the context that owned it is
    /// gone. The next draw reallocates.
    pub fn context_lost(&mut self) {
        self.allocation = None;
        self.cursors.invalidate();
    }

    pub(crate) fn destroy<D: GraphicsDevice>(&mut self, device: &mut D) {
        if let Some(allocation) = self.allocation.take() {
            allocation.program.destroy(device);
        }
        self.cursors.invalidate();
    }

    /// Draws `caster` into the shadow map of `light`.
    ///
    /// Only state that differs from what this pass (or, for rasterizer state,
    /// any pass in `frame`) last established is pushed. The model matrix and
    /// the draw command are issued on every call.
    pub fn draw<D: GraphicsDevice>(
        &mut self,
        device: &mut D,
        frame: &mut FrameContext,
        scene: &ShadowScene,
        caster: &ShadowCaster,
        light: &ShadowLight,
    ) {
        if self.ensure_allocated(device) == PassStatus::NonDrawable {
            return;
        }
        let rebind = std::mem::take(&mut self.rebind);
        let Some(allocation) = &self.allocation else {
            return;
        };
        let program = &allocation.program;
        let bindings = &allocation.bindings;
        let cursors = &mut self.cursors;

        if rebind || frame.last_program_id != Some(program.id()) {
            frame.last_program_id = Some(program.id());
            program.bind(device);
            frame.use_program += 1;
            cursors.invalidate();
            bindings.push_clips(device, &scene.clips.clips);
        }
        frame.texture_unit = 0;

        if cursors.light != Some(light.id) {
            if let Some(view_matrix) = bindings.view_matrix {
                device.uniform_mat4(view_matrix, &light.shadow_view_matrix);
            }
            if let Some(proj_matrix) = bindings.proj_matrix {
                device.uniform_mat4(proj_matrix, &light.shadow_proj_matrix);
            }
            cursors.light = Some(light.id);
        }

        let material = &*caster.material;
        if cursors.material != Some(material.id) {
            if frame.backfaces != Some(material.backfaces) {
                device.set_cull_face(!material.backfaces);
                frame.backfaces = Some(material.backfaces);
            }
            if frame.frontface != Some(material.frontface) {
                device.set_front_face(material.frontface);
                frame.frontface = Some(material.frontface);
            }
            if frame.line_width != Some(material.line_width) {
                device.set_line_width(material.line_width);
                frame.line_width = Some(material.line_width);
            }
            if let Some(point_size) = bindings.point_size {
                device.uniform_f32(point_size, material.point_size);
            }
            cursors.material = Some(material.id);
        }

        if let Some(model_matrix) = bindings.model_matrix {
            device.uniform_mat4(model_matrix, &caster.world_matrix);
        }

        let geometry = &*caster.geometry;
        if geometry.combined {
            match caster.vertex_bufs.as_deref() {
                Some(vertex_bufs) if cursors.vertex_bufs != Some(vertex_bufs.id) => {
                    if let (Some(position), Some(buffer)) = (bindings.position, vertex_bufs.positions_buf) {
                        device.bind_vertex_attribute(
                            position,
                            buffer.id(),
                            buffer.item_size(),
                            buffer.component_type(),
                        );
                        frame.bind_array += 1;
                    }
                    cursors.vertex_bufs = Some(vertex_bufs.id);
                }
                Some(_) => {}
                None => log::debug!(
                    "Combined geometry {:?} drawn without vertex buffers",
                    geometry.id
                ),
            }
        }

        if let Some(clippable) = bindings.clippable {
            device.uniform_bool(clippable, caster.state.clippable);
        }

        if cursors.geometry != Some(geometry.id) {
            if let (Some(location), Some(decode)) =
                (bindings.positions_decode_matrix, geometry.positions_decode_matrix)
            {
                device.uniform_mat4(location, &decode);
            }
            if geometry.combined {
                // Positions come from the vertex-buffer set bound above.
                if let Some(indices) = geometry.indices_buf_combined {
                    device.bind_index_buffer(indices.id());
                    frame.bind_array += 1;
                }
            } else {
                if let (Some(position), Some(buffer)) = (bindings.position, geometry.positions_buf) {
                    device.bind_vertex_attribute(
                        position,
                        buffer.id(),
                        buffer.item_size(),
                        buffer.component_type(),
                    );
                    frame.bind_array += 1;
                }
                if let Some(indices) = geometry.indices_buf {
                    device.bind_index_buffer(indices.id());
                    frame.bind_array += 1;
                }
            }
            cursors.geometry = Some(geometry.id);
        }

        // Combined positions are shared by every geometry batched into the
        // vertex-buffer set, so only indices select this geometry's vertices.
        let (indices, positions) = if geometry.combined {
            (geometry.indices_buf_combined, None)
        } else {
            (geometry.indices_buf, geometry.positions_buf)
        };
        if let Some(indices) = indices {
            device.draw_elements(geometry.primitive, indices.num_items(), indices.format());
            frame.draw_elements += 1;
        } else if let Some(positions) = positions {
            device.draw_arrays(wgpu::PrimitiveTopology::TriangleList, 0, positions.num_items());
            frame.draw_arrays += 1;
        } else {
            log::debug!("Geometry {:?} has nothing to draw", geometry.id);
        }
    }
}
