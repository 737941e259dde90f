// renderer/registry.rs
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::renderer::{
    CompileError, GraphicsDevice, ShaderSourceGenerator, ShadowPass, ShadowShaderSource,
};
use crate::scene::{ShadowCaster, ShadowScene};
use crate::settings::ShadowSettings;
use crate::stats::MemoryStats;

pub type SharedShadowPass = Rc<RefCell<ShadowPass>>;

/// Everything that decides which program a shadow caster needs. Casters with
/// equal fingerprints get byte-identical programs and binding layouts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(
        surface_id: &str,
        clips_signature: &str,
        geometry_signature: &str,
        state_signature: &str,
    ) -> Self {
        Self(
            [
                surface_id,
                clips_signature,
                geometry_signature,
                state_signature,
            ]
            .join(";"),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shares one [`ShadowPass`] among every shadow caster with the same
/// [`Fingerprint`].
///
/// One registry belongs to one graphics context: create it with the context
/// and [`clear`](Self::clear) it when the context is torn down. Each successful
/// [`acquire`](Self::acquire) must be matched by exactly one
/// [`release`](Self::release).
pub struct ShadowPassRegistry {
    passes: HashMap<Fingerprint, SharedShadowPass>,
    generator: Box<dyn ShaderSourceGenerator>,
    settings: ShadowSettings,
    stats: MemoryStats,
}

impl fmt::Debug for ShadowPassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowPassRegistry")
            .field("passes", &self.passes.keys().collect::<Vec<_>>())
            .field("settings", &self.settings)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl ShadowPassRegistry {
    pub fn new(settings: ShadowSettings) -> Self {
        Self {
            passes: HashMap::new(),
            generator: Box::new(ShadowShaderSource::new(settings.precision)),
            settings,
            stats: MemoryStats::new(),
        }
    }

    /// Counts programs in `stats`, typically shared with other registries on
    /// the same context.
    pub fn with_stats(mut self, stats: MemoryStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_generator(mut self, generator: impl ShaderSourceGenerator + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }

    pub fn settings(&self) -> &ShadowSettings {
        &self.settings
    }

    pub fn stats(&self) -> &MemoryStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<SharedShadowPass> {
        self.passes.get(fingerprint).cloned()
    }

    pub fn fingerprint(&self, scene: &ShadowScene, caster: &ShadowCaster) -> Fingerprint {
        Fingerprint::new(
            &scene.surface_id,
            &scene.clips.signature(self.settings.max_clip_planes),
            &caster.geometry.signature(),
            &caster.state.signature(),
        )
    }

    /// Returns the pass for `caster`, compiling its program on first use.
    ///
    /// A pass whose program fails to compile is not cached, so a later acquire
    /// with the same fingerprint compiles again.
    pub fn acquire<D: GraphicsDevice>(
        &mut self,
        device: &mut D,
        scene: &ShadowScene,
        caster: &ShadowCaster,
    ) -> Result<SharedShadowPass, CompileError> {
        let fingerprint = self.fingerprint(scene, caster);
        if let Some(pass) = self.passes.get(&fingerprint) {
            pass.borrow_mut().acquire();
            log::debug!("Reusing shadow pass {}", fingerprint);
            return Ok(Rc::clone(pass));
        }

        let clips = scene.clips.effective(self.settings.max_clip_planes);
        let source = self.generator.generate(clips, caster);
        let mut pass = ShadowPass::new(fingerprint.clone(), source, clips.len());
        if let Err(err) = pass.allocate(device) {
            if self.settings.log_compile_errors {
                log::error!("{}", err);
            }
            return Err(err);
        }
        pass.acquire();

        self.stats.program_created();
        log::info!(
            "Created shadow pass {} ({} live programs)",
            fingerprint,
            self.stats.programs()
        );

        let pass = Rc::new(RefCell::new(pass));
        self.passes.insert(fingerprint, Rc::clone(&pass));
        Ok(pass)
    }

    /// Gives up one use of `pass`. The last release destroys its program and
    /// evicts it.
    pub fn release<D: GraphicsDevice>(&mut self, device: &mut D, pass: &SharedShadowPass) {
        let mut inner = pass.borrow_mut();
        if inner.use_count() == 0 {
            log::warn!(
                "Shadow pass {} released more times than acquired",
                inner.fingerprint()
            );
            debug_assert!(!self.settings.strict_release, "shadow pass over-released");
            return;
        }
        if inner.release() > 0 {
            log::debug!(
                "Released shadow pass {} ({} uses left)",
                inner.fingerprint(),
                inner.use_count()
            );
            return;
        }

        inner.destroy(device);
        let cached = self
            .passes
            .get(inner.fingerprint())
            .is_some_and(|cached| Rc::ptr_eq(cached, pass));
        if cached {
            self.passes.remove(inner.fingerprint());
            self.stats.program_destroyed();
        }
        log::info!(
            "Destroyed shadow pass {} ({} live programs)",
            inner.fingerprint(),
            self.stats.programs()
        );
    }

    /// Drops every pass's program after the graphics context was lost. Use
    /// counts and cache membership are untouched; passes reallocate on their
    /// next draw.
    pub fn context_lost(&mut self) {
        log::info!(
            "Graphics context lost; {} shadow passes will reallocate",
            self.passes.len()
        );
        for pass in self.passes.values() {
            pass.borrow_mut().context_lost();
        }
    }

    /// Destroys every pass. Handles still held by callers become undrawable.
    pub fn clear<D: GraphicsDevice>(&mut self, device: &mut D) {
        for (_, pass) in self.passes.drain() {
            let mut pass = pass.borrow_mut();
            pass.destroy(device);
            while pass.release() > 0 {}
            self.stats.program_destroyed();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::asset::{Id, IndexBuffer, VertexBuffer};
    use crate::renderer::RecordingDevice;
    use crate::scene::{GeometryState, MaterialState};

    fn caster(device: &mut RecordingDevice) -> ShadowCaster {
        let positions = VertexBuffer::from_positions(device, &[[0.0; 3]; 3]);
        let indices = IndexBuffer::from_u16(device, &[0, 1, 2]);
        ShadowCaster::new(
            Rc::new(GeometryState::separate(
                Id::new(1),
                wgpu::PrimitiveTopology::TriangleList,
                positions,
                Some(indices),
            )),
            Rc::new(MaterialState::new(Id::new(1))),
        )
    }

    #[test]
    fn fingerprint_joins_components() {
        let fingerprint = Fingerprint::new("canvas", "cp2", "triangles/q", "bs");
        assert_eq!(fingerprint.as_str(), "canvas;cp2;triangles/q;bs");
        assert_eq!(fingerprint.to_string(), fingerprint.as_str());
    }

    #[test]
    fn surfaces_do_not_share_passes() {
        let mut device = RecordingDevice::new();
        let mut registry = ShadowPassRegistry::new(ShadowSettings::default());
        let caster = caster(&mut device);

        let a = registry.acquire(&mut device, &ShadowScene::new("left"), &caster).unwrap();
        let b = registry.acquire(&mut device, &ShadowScene::new("right"), &caster).unwrap();

        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.stats().programs(), 2);
    }

    #[test]
    fn over_release_is_clamped() {
        let mut device = RecordingDevice::new();
        let mut registry = ShadowPassRegistry::new(ShadowSettings::default());
        let caster = caster(&mut device);
        let scene = ShadowScene::new("canvas");

        let pass = registry.acquire(&mut device, &scene, &caster).unwrap();
        registry.release(&mut device, &pass);
        registry.release(&mut device, &pass);

        assert_eq!(pass.borrow().use_count(), 0);
        assert!(registry.is_empty());
        assert_eq!(registry.stats().programs(), 0);
        assert_eq!(device.live_programs(), 0);
    }

    #[test]
    fn clear_destroys_everything() {
        let mut device = RecordingDevice::new();
        let stats = MemoryStats::new();
        let mut registry = ShadowPassRegistry::new(ShadowSettings::default()).with_stats(stats.clone());
        let caster = caster(&mut device);

        let pass = registry.acquire(&mut device, &ShadowScene::new("canvas"), &caster).unwrap();
        registry.acquire(&mut device, &ShadowScene::new("canvas"), &caster).unwrap();
        registry.clear(&mut device);

        assert!(registry.is_empty());
        assert_eq!(stats.programs(), 0);
        assert_eq!(device.live_programs(), 0);
        assert_eq!(pass.borrow().use_count(), 0);
        assert!(!pass.borrow().is_allocated());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "shadow pass over-released")]
    fn strict_release_asserts_on_over_release() {
        let mut device = RecordingDevice::new();
        let settings = ShadowSettings {
            strict_release: true,
            ..ShadowSettings::default()
        };
        let mut registry = ShadowPassRegistry::new(settings);
        let caster = caster(&mut device);

        let pass = registry.acquire(&mut device, &ShadowScene::new("canvas"), &caster).unwrap();
        registry.release(&mut device, &pass);
        registry.release(&mut device, &pass);
    }

    #[test]
    fn stale_handle_does_not_evict_newer_pass() {
        let mut device = RecordingDevice::new();
        let mut registry = ShadowPassRegistry::new(ShadowSettings::default());
        let caster = caster(&mut device);
        let scene = ShadowScene::new("canvas");

        let stale = registry.acquire(&mut device, &scene, &caster).unwrap();
        registry.clear(&mut device);
        // A holder that kept counting a use of the pass dropped by `clear`.
        stale.borrow_mut().acquire();

        let fresh = registry.acquire(&mut device, &scene, &caster).unwrap();
        let fingerprint = fresh.borrow().fingerprint().clone();
        registry.release(&mut device, &stale);

        let cached = registry.get(&fingerprint).expect("newer pass stays cached");
        assert!(Rc::ptr_eq(&cached, &fresh));
        assert_eq!(registry.stats().programs(), 1);
        assert!(fresh.borrow().is_allocated());
        assert_eq!(stale.borrow().use_count(), 0);

        registry.release(&mut device, &fresh);
        assert!(registry.is_empty());
        assert_eq!(registry.stats().programs(), 0);
    }

    #[test]
    fn debug_lists_cached_fingerprints() {
        let mut device = RecordingDevice::new();
        let mut registry = ShadowPassRegistry::new(ShadowSettings::default());
        let caster = caster(&mut device);
        registry.acquire(&mut device, &ShadowScene::new("canvas"), &caster).unwrap();

        let debug = format!("{:?}", registry);
        assert!(debug.starts_with("ShadowPassRegistry"));
        assert!(debug.contains(registry.fingerprint(&ShadowScene::new("canvas"), &caster).as_str()));
    }
}
