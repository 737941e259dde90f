// scene/caster.rs
use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};

use super::{ClipsState, GeometryState, MaterialState, VertexBufs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Billboard {
    #[default]
    None,
    /// Always faces the viewer.
    Spherical,
    /// Rotates about its local Y axis only.
    Cylindrical,
}

/// Per-drawable state. Only `billboard` changes generated shader code;
/// `clippable` is a uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawableState {
    pub billboard: Billboard,
    pub clippable: bool,
}

impl Default for DrawableState {
    fn default() -> Self {
        Self {
            billboard: Billboard::None,
            clippable: true,
        }
    }
}

impl DrawableState {
    pub fn signature(&self) -> String {
        match self.billboard {
            Billboard::None => String::new(),
            Billboard::Spherical => "bs".to_string(),
            Billboard::Cylindrical => "bc".to_string(),
        }
    }
}

/// A drawable that casts shadows: geometry and material shared with other
/// drawables, plus its own world transform.
#[derive(Debug, Clone)]
pub struct ShadowCaster {
    pub state: DrawableState,
    pub geometry: Rc<GeometryState>,
    pub material: Rc<MaterialState>,
    /// Shared vertex buffers, required when `geometry.combined` is set.
    pub vertex_bufs: Option<Rc<VertexBufs>>,
    pub world_matrix: Mat4,
}

impl ShadowCaster {
    pub fn new(geometry: Rc<GeometryState>, material: Rc<MaterialState>) -> Self {
        Self {
            state: DrawableState::default(),
            geometry,
            material,
            vertex_bufs: None,
            world_matrix: Mat4::IDENTITY,
        }
    }

    pub fn with_vertex_bufs(mut self, vertex_bufs: Rc<VertexBufs>) -> Self {
        self.vertex_bufs = Some(vertex_bufs);
        self
    }

    pub fn with_state(mut self, state: DrawableState) -> Self {
        self.state = state;
        self
    }

    pub fn with_trs(mut self, translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        self.world_matrix = Mat4::from_scale_rotation_translation(scale, rotation, translation);
        self
    }

    pub fn with_world_matrix(mut self, world_matrix: Mat4) -> Self {
        self.world_matrix = world_matrix;
        self
    }
}

/// The part of the scene every shadow pass depends on: the surface it draws
/// for and its clip planes.
#[derive(Debug, Clone, Default)]
pub struct ShadowScene {
    pub surface_id: String,
    pub clips: ClipsState,
}

impl ShadowScene {
    pub fn new(surface_id: impl Into<String>) -> Self {
        Self {
            surface_id: surface_id.into(),
            clips: ClipsState::new(),
        }
    }

    pub fn with_clips(mut self, clips: ClipsState) -> Self {
        self.clips = clips;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Id;

    #[test]
    fn trs_scales_before_translating() {
        let geometry = GeometryState::combined(Id::new(1), wgpu::PrimitiveTopology::TriangleList, None);
        let caster = ShadowCaster::new(Rc::new(geometry), Rc::new(MaterialState::new(Id::new(1))))
            .with_trs(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, Vec3::splat(2.0));

        // (1,0,0) -> (2,0,0) -> (3,2,3)
        let p = caster.world_matrix.transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(3.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn clippable_does_not_change_signature() {
        let a = DrawableState {
            billboard: Billboard::Spherical,
            clippable: true,
        };
        let b = DrawableState {
            clippable: false,
            ..a
        };
        assert_eq!(a.signature(), b.signature());
        assert_ne!(a.signature(), DrawableState::default().signature());
    }
}
