// scene/material.rs
use crate::asset::Id;

pub type MaterialId = Id<MaterialState>;

/// Render state of a material that matters when drawing into a shadow map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialState {
    pub id: MaterialId,
    /// When true both faces are rasterized and face culling is disabled.
    pub backfaces: bool,
    pub frontface: wgpu::FrontFace,
    pub line_width: f32,
    pub point_size: f32,
}

impl MaterialState {
    pub fn new(id: MaterialId) -> Self {
        Self {
            id,
            backfaces: false,
            frontface: wgpu::FrontFace::Ccw,
            line_width: 1.0,
            point_size: 1.0,
        }
    }

    pub fn with_backfaces(mut self, backfaces: bool) -> Self {
        self.backfaces = backfaces;
        self
    }

    pub fn with_frontface(mut self, frontface: wgpu::FrontFace) -> Self {
        self.frontface = frontface;
        self
    }

    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }
}
