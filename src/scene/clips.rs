// scene/clips.rs
use glam::Vec3;

/// A user clipping plane. Fragments on the positive side of `dir` are
/// discarded while the plane is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    pub active: bool,
    pub pos: Vec3,
    pub dir: Vec3,
}

impl Clip {
    pub fn new(pos: Vec3, dir: Vec3) -> Self {
        Self {
            active: true,
            pos,
            dir,
        }
    }
}

/// Clip planes configured on a scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipsState {
    pub clips: Vec<Clip>,
}

impl ClipsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, clip: Clip) {
        self.clips.push(clip);
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Clips a program compiled with at most `max_clip_planes` planes sees.
    pub fn effective(&self, max_clip_planes: usize) -> &[Clip] {
        &self.clips[..self.clips.len().min(max_clip_planes)]
    }

    /// Configuration signature. Only the number of planes changes generated
    /// code; plane values are uniforms.
    pub fn signature(&self, max_clip_planes: usize) -> String {
        match self.effective(max_clip_planes).len() {
            0 => String::new(),
            n => format!("cp{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_ignores_plane_values() {
        let mut a = ClipsState::new();
        a.push(Clip::new(Vec3::ZERO, Vec3::X));
        let mut b = ClipsState::new();
        b.push(Clip::new(Vec3::ONE, Vec3::NEG_Y));

        assert_eq!(a.signature(6), b.signature(6));
        assert_eq!(ClipsState::new().signature(6), "");
    }

    #[test]
    fn signature_respects_plane_limit() {
        let mut clips = ClipsState::new();
        for _ in 0..4 {
            clips.push(Clip::new(Vec3::ZERO, Vec3::Z));
        }
        assert_eq!(clips.signature(6), "cp4");
        assert_eq!(clips.signature(2), "cp2");
        assert_eq!(clips.effective(2).len(), 2);
    }
}
