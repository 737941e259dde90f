pub mod buffer;
pub mod handle;

pub use buffer::{IndexBuffer, VertexBuffer};
pub use handle::Id;
