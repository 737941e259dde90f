// renderer/frame.rs
use crate::renderer::ProgramId;

/// Per-frame state threaded through every shadow draw.
///
/// Holds cursors shared by all passes drawing in the same frame (which program
/// is bound, current culling/winding/line width) and counters for
/// observability. Several passes mutate it within one frame; the caller calls
/// [`FrameContext::reset`] exactly once per frame boundary and after a context
/// loss.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameContext {
    pub last_program_id: Option<ProgramId>,
    pub backfaces: Option<bool>,
    pub frontface: Option<wgpu::FrontFace>,
    pub line_width: Option<f32>,
    /// Next free texture unit. Shadow programs sample nothing, so draws only
    /// rewind it.
    pub texture_unit: u32,
    pub use_program: u32,
    pub bind_array: u32,
    pub draw_elements: u32,
    pub draw_arrays: u32,
}

impl FrameContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total_draw_calls(&self) -> u32 {
        self.draw_elements + self.draw_arrays
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_cursors_and_counters() {
        let mut frame = FrameContext {
            last_program_id: Some(ProgramId(3)),
            backfaces: Some(true),
            frontface: Some(wgpu::FrontFace::Cw),
            line_width: Some(2.0),
            texture_unit: 1,
            use_program: 4,
            bind_array: 9,
            draw_elements: 5,
            draw_arrays: 2,
        };
        assert_eq!(frame.total_draw_calls(), 7);

        frame.reset();
        assert_eq!(frame, FrameContext::new());
        assert_eq!(frame.last_program_id, None);
    }
}
