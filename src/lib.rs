#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

mod camera;
pub use camera::{ZoomController, DEFAULT_FOV, DEFAULT_WHEEL_SCALE, MAX_FOV, MIN_FOV};
mod controller;
pub use controller::{WheelZoom, WHEEL_ZOOM};

pub mod config;
pub use config::ViewerConfig;

pub mod decoder;
pub use decoder::{DecodeError, DecoderRegistry, ImageDecoder, PanoramaDecoder, ProgressFn};
pub mod fetch;
pub use fetch::{CrossOrigin, FetchError, Fetcher};

pub mod headless;
pub use headless::{run_headless, HeadlessReport, HeadlessRequest};

pub mod input;
pub use input::{InputSurface, ListenerId, WheelEvent};

mod loader;
pub use loader::{LoadError, LoadStatus, TextureLoader};

pub mod resource;
pub use resource::{LocalFile, ResourceError, ResourceStore};

pub mod retry;
pub use retry::{retry_until, CancelToken, RetryOutcome, RetryPolicy};

mod session;
pub use session::ViewerSession;

pub mod source;
pub use source::{classify, FormatClass, SourceReference};

pub mod state;
pub use state::{AttemptId, LoadAttempt, StartupPhase};

pub mod surface;
pub use surface::{HeadlessSurface, RenderSurface, SkyContent};

pub mod texture;
pub use texture::{FilterMode, PanoramaTexture, TextureMapping};

pub mod utils;

mod viewer;
pub use viewer::{SourceEvent, Viewer};

/// Browser entry: shows `source` (or the default panorama) on a headless
/// surface and logs what was applied.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn run_wasm(source: Option<String>) {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    // a second call from the same page keeps the first logger
    let _ = console_log::init();

    let request = HeadlessRequest {
        source: source.map(SourceEvent::UrlSubmitted),
        ..Default::default()
    };
    match run_headless(&ViewerConfig::default(), request, |attempt| {
        log::debug!("{} at {:.0}%", attempt.source, attempt.progress * 100.)
    })
    .await
    {
        Ok(report) => match report.surface.texture() {
            Some(texture) => log::info!(
                "showing {} ({}x{})",
                texture.name,
                texture.width,
                texture.height
            ),
            None => log::info!("showing {:?}", report.source),
        },
        Err(err) => log::error!("viewer failed: {err:#}"),
    }
}
