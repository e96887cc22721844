use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::ViewerConfig;
use crate::decoder::{install_builtin_decoders, DecoderRegistry};
use crate::fetch::Fetcher;
use crate::input::{InputSurface, WheelEvent};
use crate::loader::LoadStatus;
use crate::source::SourceReference;
use crate::state::LoadAttempt;
use crate::surface::HeadlessSurface;
use crate::utils::{sleep, spawn_local};
use crate::viewer::{SourceEvent, Viewer};

/// What a headless run should do after mounting.
#[derive(Debug, Clone)]
pub struct HeadlessRequest {
    /// Replaces the default panorama once the viewer is interactive.
    pub source: Option<SourceEvent>,
    /// Wheel deltas dispatched after the load settles.
    pub wheel: Vec<f32>,
    /// How long the built-in decoders take to become available.
    pub decoder_delay: Duration,
    pub frame: Duration,
}

impl Default for HeadlessRequest {
    fn default() -> Self {
        Self {
            source: None,
            wheel: Vec::new(),
            decoder_delay: Duration::ZERO,
            frame: Duration::from_millis(16),
        }
    }
}

#[derive(Debug)]
pub struct HeadlessReport {
    pub surface: HeadlessSurface,
    pub source: Option<SourceReference>,
    /// Last load outcome, `None` if only raster panoramas were shown.
    pub status: Option<LoadStatus>,
}

/// Mounts a viewer on a [`HeadlessSurface`] and drives its frame loop until
/// the requested panorama has loaded or failed.
///
/// Must run inside a local task set (`LocalSet` natively). `on_progress`
/// sees the in-flight attempt once per frame.
pub async fn run_headless<F>(
    config: &ViewerConfig,
    request: HeadlessRequest,
    mut on_progress: F,
) -> anyhow::Result<HeadlessReport>
where
    F: FnMut(&LoadAttempt),
{
    let surface = Rc::new(RefCell::new(HeadlessSurface::default()));
    let input = Rc::new(InputSurface::new());
    let decoders = Rc::new(DecoderRegistry::new());

    let mut viewer = Viewer::mount(config, surface.clone(), input.clone(), decoders.clone());
    let fetcher = Fetcher::new(viewer.session().resources().reader());
    spawn_local(install_builtin_decoders(decoders, fetcher, request.decoder_delay));

    let mut status = None;
    loop {
        if let Some(s) = viewer.update() {
            status = Some(s);
        }
        if viewer.session().is_interactive() {
            break;
        }
        sleep(request.frame).await;
    }

    if let Some(event) = request.source {
        viewer.handle(event)?;
    }

    loop {
        if let Some(s) = viewer.update() {
            status = Some(s);
        }
        let loader = viewer.session().loader();
        match loader.active() {
            Some(attempt) => on_progress(attempt),
            None => break,
        }
        sleep(request.frame).await;
    }

    for delta in request.wheel {
        input.dispatch_wheel(WheelEvent::new(delta, true));
    }

    let report = HeadlessReport {
        surface: surface.borrow().clone(),
        source: viewer.session().current().cloned(),
        status,
    };
    viewer.unmount();
    Ok(report)
}
