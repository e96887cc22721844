#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use pano_viewer::{
    DecodeError, DecoderRegistry, FormatClass, HeadlessSurface, InputSurface, PanoramaDecoder,
    PanoramaTexture, ProgressFn, Viewer, ViewerConfig,
};

/// Decoder that answers after a per-url delay and remembers every url it saw.
#[derive(Default)]
pub struct ScriptedDecoder {
    delays: Vec<(&'static str, u64)>,
    pub calls: RefCell<Vec<String>>,
}

impl ScriptedDecoder {
    pub fn with_delays(delays: &[(&'static str, u64)]) -> Rc<Self> {
        Rc::new(Self {
            delays: delays.to_vec(),
            calls: RefCell::default(),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl PanoramaDecoder for ScriptedDecoder {
    fn load(
        &self,
        url: &str,
        progress: Option<ProgressFn>,
    ) -> LocalBoxFuture<'static, Result<PanoramaTexture, DecodeError>> {
        self.calls.borrow_mut().push(url.to_string());
        let delay = self
            .delays
            .iter()
            .find(|(needle, _)| url.contains(needle))
            .map_or(0, |(_, ms)| *ms);
        let url = url.to_string();
        Box::pin(async move {
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if let Some(progress) = progress {
                progress(1.);
            }
            Ok(PanoramaTexture::new(url, 4, 2, vec![[0.5; 4]; 8]))
        })
    }
}

pub struct Harness {
    pub viewer: Viewer<HeadlessSurface>,
    pub surface: Rc<RefCell<HeadlessSurface>>,
    pub input: Rc<InputSurface>,
    pub decoders: Rc<DecoderRegistry>,
}

/// Mounts an immediately interactive viewer with an empty decoder registry.
/// Call inside a `LocalSet`.
pub fn mount() -> Harness {
    mount_with(&ViewerConfig {
        startup_grace_ms: 0,
        ..Default::default()
    })
}

pub fn mount_with(config: &ViewerConfig) -> Harness {
    let surface = Rc::new(RefCell::new(HeadlessSurface::default()));
    let input = Rc::new(InputSurface::new());
    let decoders = Rc::new(DecoderRegistry::new());
    let viewer = Viewer::mount(
        config,
        surface.clone(),
        input.clone(),
        decoders.clone(),
    );
    Harness {
        viewer,
        surface,
        input,
        decoders,
    }
}

/// Registers `decoder` for both radiance classes right now.
pub fn install_now(decoders: &DecoderRegistry, decoder: Rc<ScriptedDecoder>) {
    decoders.install(FormatClass::RadianceHdr, decoder.clone());
    decoders.install(FormatClass::RadianceExr, decoder);
}

/// Registers `decoder` for both radiance classes after `ms` milliseconds.
pub fn install_after(decoders: Rc<DecoderRegistry>, decoder: Rc<ScriptedDecoder>, ms: u64) {
    tokio::task::spawn_local(async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        install_now(&decoders, decoder);
    });
}
