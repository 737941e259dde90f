pub mod asset;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod stats;

mod demo_scene;

use renderer::{CompileError, FrameContext, RecordingDevice, ShadowPassRegistry};
use settings::ShadowSettings;

pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Renders one captured shadow frame of the demo scene and logs what the
/// passes issued.
pub fn run() -> Result<(), CompileError> {
    init_logging();

    log::info!("Starting shadow pass capture");

    let settings = ShadowSettings::load();
    let mut device = RecordingDevice::new();
    let mut registry = ShadowPassRegistry::new(settings);
    let demo = demo_scene::build(&mut device);

    let mut passes = Vec::with_capacity(demo.casters.len());
    for caster in &demo.casters {
        passes.push(registry.acquire(&mut device, &demo.scene, caster)?);
    }
    log::info!(
        "{} casters share {} shadow passes",
        demo.casters.len(),
        registry.len()
    );

    let mut frame = FrameContext::new();
    for light in &demo.lights {
        for (caster, pass) in demo.casters.iter().zip(&passes) {
            pass.borrow_mut()
                .draw(&mut device, &mut frame, &demo.scene, caster, light);
        }
    }

    log::info!(
        "Frame: {} program binds, {} buffer binds, {} indexed + {} non-indexed draws, {} commands",
        frame.use_program,
        frame.bind_array,
        frame.draw_elements,
        frame.draw_arrays,
        device.commands().len()
    );
    for command in device.take_commands() {
        log::debug!("{:?}", command);
    }

    for pass in &passes {
        registry.release(&mut device, pass);
    }

    log::info!(
        "Shutdown complete ({} live programs)",
        registry.stats().programs()
    );

    Ok(())
}
