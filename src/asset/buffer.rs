use crate::renderer::{BufferId, BufferTarget, ComponentType, GraphicsDevice};

/// Vertex attribute data living in a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBuffer {
    id: BufferId,
    num_items: u32,
    item_size: u32,
    component_type: ComponentType,
}

impl VertexBuffer {
    /// Uploads unquantized `xyz` positions.
    pub fn from_positions<D: GraphicsDevice>(device: &mut D, positions: &[[f32; 3]]) -> Self {
        let id = device.create_buffer(BufferTarget::Array, bytemuck::cast_slice(positions));
        Self {
            id,
            num_items: positions.len() as u32,
            item_size: 3,
            component_type: ComponentType::Float32,
        }
    }

    /// Uploads `xyz` positions quantized to 16 bits per component.
    pub fn from_quantized_positions<D: GraphicsDevice>(
        device: &mut D,
        positions: &[[u16; 3]],
    ) -> Self {
        let id = device.create_buffer(BufferTarget::Array, bytemuck::cast_slice(positions));
        Self {
            id,
            num_items: positions.len() as u32,
            item_size: 3,
            component_type: ComponentType::Uint16,
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Number of vertices in the buffer.
    pub fn num_items(&self) -> u32 {
        self.num_items
    }

    /// Components per vertex.
    pub fn item_size(&self) -> u32 {
        self.item_size
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn size_in_bytes(&self) -> u32 {
        self.num_items * self.item_size * self.component_type.size_in_bytes()
    }
}

/// Element indices living in a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBuffer {
    id: BufferId,
    num_items: u32,
    format: wgpu::IndexFormat,
}

impl IndexBuffer {
    pub fn from_u16<D: GraphicsDevice>(device: &mut D, indices: &[u16]) -> Self {
        let id = device.create_buffer(BufferTarget::ElementArray, bytemuck::cast_slice(indices));
        Self {
            id,
            num_items: indices.len() as u32,
            format: wgpu::IndexFormat::Uint16,
        }
    }

    pub fn from_u32<D: GraphicsDevice>(device: &mut D, indices: &[u32]) -> Self {
        let id = device.create_buffer(BufferTarget::ElementArray, bytemuck::cast_slice(indices));
        Self {
            id,
            num_items: indices.len() as u32,
            format: wgpu::IndexFormat::Uint32,
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn num_items(&self) -> u32 {
        self.num_items
    }

    pub fn format(&self) -> wgpu::IndexFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingDevice;

    #[test]
    fn quantized_positions_are_half_the_size() {
        let mut device = RecordingDevice::new();
        let float = VertexBuffer::from_positions(&mut device, &[[0.0; 3]; 4]);
        let quantized = VertexBuffer::from_quantized_positions(&mut device, &[[0; 3]; 4]);

        assert_eq!(float.size_in_bytes(), 48);
        assert_eq!(quantized.size_in_bytes(), 24);
        assert_eq!(device.buffer_size(float.id()), Some(48));
        assert_eq!(device.buffer_size(quantized.id()), Some(24));
        assert_ne!(float.id(), quantized.id());
    }

    #[test]
    fn index_buffer_tracks_format() {
        let mut device = RecordingDevice::new();
        let small = IndexBuffer::from_u16(&mut device, &[0, 1, 2]);
        let large = IndexBuffer::from_u32(&mut device, &[0, 1, 2, 2, 3, 0]);

        assert_eq!(small.format(), wgpu::IndexFormat::Uint16);
        assert_eq!(small.num_items(), 3);
        assert_eq!(large.format(), wgpu::IndexFormat::Uint32);
        assert_eq!(device.buffer_size(large.id()), Some(24));
    }
}
