use glam::Mat4;

use crate::asset::Id;

pub type LightId = Id<ShadowLight>;

/// A shadow-casting light. Its matrices are computed by the scene; the shadow
/// pass only uploads them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowLight {
    pub id: LightId,
    pub shadow_view_matrix: Mat4,
    pub shadow_proj_matrix: Mat4,
}

impl ShadowLight {
    pub fn new(id: LightId, shadow_view_matrix: Mat4, shadow_proj_matrix: Mat4) -> Self {
        Self {
            id,
            shadow_view_matrix,
            shadow_proj_matrix,
        }
    }
}
