// scene/geometry.rs
use glam::Mat4;

use crate::asset::{Id, IndexBuffer, VertexBuffer};

pub type GeometryId = Id<GeometryState>;
pub type VertexBufsId = Id<VertexBufs>;

/// GPU-side state of a geometry.
///
/// A geometry either owns its buffers (`positions_buf`/`indices_buf`) or is
/// `combined`, in which case its vertices live in a [`VertexBufs`] shared with
/// other geometries and only its indices (`indices_buf_combined`) are its own.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryState {
    pub id: GeometryId,
    pub primitive: wgpu::PrimitiveTopology,
    pub combined: bool,
    pub quantized: bool,
    pub positions_decode_matrix: Option<Mat4>,
    pub positions_buf: Option<VertexBuffer>,
    pub indices_buf: Option<IndexBuffer>,
    pub indices_buf_combined: Option<IndexBuffer>,
}

impl GeometryState {
    /// Geometry with its own, unquantized buffers.
    pub fn separate(
        id: GeometryId,
        primitive: wgpu::PrimitiveTopology,
        positions_buf: VertexBuffer,
        indices_buf: Option<IndexBuffer>,
    ) -> Self {
        Self {
            id,
            primitive,
            combined: false,
            quantized: false,
            positions_decode_matrix: None,
            positions_buf: Some(positions_buf),
            indices_buf,
            indices_buf_combined: None,
        }
    }

    /// Geometry whose vertices live in a shared [`VertexBufs`].
    pub fn combined(
        id: GeometryId,
        primitive: wgpu::PrimitiveTopology,
        indices_buf_combined: Option<IndexBuffer>,
    ) -> Self {
        Self {
            id,
            primitive,
            combined: true,
            quantized: false,
            positions_decode_matrix: None,
            positions_buf: None,
            indices_buf: None,
            indices_buf_combined,
        }
    }

    /// Marks positions as quantized, decoded in the shader by `decode`.
    pub fn with_quantization(mut self, decode: Mat4) -> Self {
        self.quantized = true;
        self.positions_decode_matrix = Some(decode);
        self
    }

    /// Configuration signature: everything about the geometry that changes
    /// generated shader code.
    pub fn signature(&self) -> String {
        let mut signature = String::from(primitive_name(self.primitive));
        if self.combined {
            signature.push_str("/c");
        }
        if self.quantized {
            signature.push_str("/q");
        }
        signature
    }
}

/// Vertex buffers shared by every combined geometry batched into them.
/// Quantization is carried by the buffer's component type.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBufs {
    pub id: VertexBufsId,
    pub positions_buf: Option<VertexBuffer>,
}

impl VertexBufs {
    pub fn new(id: VertexBufsId, positions_buf: VertexBuffer) -> Self {
        Self {
            id,
            positions_buf: Some(positions_buf),
        }
    }
}

pub(crate) fn primitive_name(primitive: wgpu::PrimitiveTopology) -> &'static str {
    match primitive {
        wgpu::PrimitiveTopology::PointList => "points",
        wgpu::PrimitiveTopology::LineList => "lines",
        wgpu::PrimitiveTopology::LineStrip => "line-strip",
        wgpu::PrimitiveTopology::TriangleList => "triangles",
        wgpu::PrimitiveTopology::TriangleStrip => "triangle-strip",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingDevice;

    #[test]
    fn signature_covers_layout_and_quantization() {
        let mut device = RecordingDevice::new();
        let positions = VertexBuffer::from_positions(&mut device, &[[0.0; 3]; 3]);

        let plain = GeometryState::separate(
            Id::new(1),
            wgpu::PrimitiveTopology::TriangleList,
            positions,
            None,
        );
        let quantized = plain.clone().with_quantization(Mat4::IDENTITY);
        let combined = GeometryState::combined(Id::new(2), wgpu::PrimitiveTopology::LineList, None);

        assert_eq!(plain.signature(), "triangles");
        assert_eq!(quantized.signature(), "triangles/q");
        assert_eq!(combined.signature(), "lines/c");
    }

    #[test]
    fn signature_ignores_identity() {
        let a = GeometryState::combined(Id::new(1), wgpu::PrimitiveTopology::TriangleList, None);
        let b = GeometryState::combined(Id::new(2), wgpu::PrimitiveTopology::TriangleList, None);
        assert_eq!(a.signature(), b.signature());
    }
}
