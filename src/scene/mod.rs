pub mod caster;
pub mod clips;
pub mod geometry;
pub mod light;
pub mod material;

pub use caster::{Billboard, DrawableState, ShadowCaster, ShadowScene};
pub use clips::{Clip, ClipsState};
pub use geometry::{GeometryId, GeometryState, VertexBufs, VertexBufsId};
pub use light::{LightId, ShadowLight};
pub use material::{MaterialId, MaterialState};
