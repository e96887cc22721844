use std::cell::RefCell;
use std::rc::Rc;

use cgmath::Deg;

use crate::config::ViewerConfig;
use crate::decoder::DecoderRegistry;
use crate::loader::{LoadStatus, TextureLoader};
use crate::resource::{LocalFile, ResourceError, ResourceStore};
use crate::source::SourceReference;
use crate::state::{StartupPhase, StartupTimer};
use crate::surface::RenderSurface;

/// Holds the current panorama source and owns everything tied to it: the
/// temporary handle (if the source is one) and the in-flight load.
pub struct ViewerSession<S: RenderSurface> {
    surface: Rc<RefCell<S>>,
    resources: ResourceStore,
    loader: TextureLoader,
    current: Option<SourceReference>,
    default_source: SourceReference,
    default_yaw: Deg<f32>,
    startup: StartupTimer,
}

impl<S: RenderSurface> ViewerSession<S> {
    pub fn new(config: &ViewerConfig, surface: Rc<RefCell<S>>, decoders: Rc<DecoderRegistry>) -> Self {
        Self {
            surface,
            resources: ResourceStore::new(),
            loader: TextureLoader::new(decoders, config.retry_policy()),
            current: None,
            default_source: config.default_source(),
            default_yaw: Deg(config.default_yaw_deg),
            startup: StartupTimer::start(config.startup_grace()),
        }
    }

    /// Replaces the displayed panorama.
    ///
    /// Setting the current source again changes nothing. Otherwise the
    /// previous temporary handle is released before the new load starts.
    pub fn set_source(&mut self, source: SourceReference) {
        if self.current.as_ref() == Some(&source) {
            log::debug!("{source} is already shown");
            return;
        }
        if let Some(previous) = self.current.take() {
            self.resources.release_handle(&previous);
        }

        let yaw = if source == self.default_source {
            self.default_yaw
        } else {
            Deg(0.)
        };
        let mut surface = self.surface.borrow_mut();
        surface.set_yaw_offset(yaw);
        self.loader.load(&source, &mut *surface);
        drop(surface);
        self.current = Some(source);
    }

    /// Creates a temporary handle for a local file and shows it.
    ///
    /// Nothing changes if the file cannot be read.
    pub fn open_file(&mut self, file: &LocalFile) -> Result<SourceReference, ResourceError> {
        let handle = self.resources.create_handle(file)?;
        self.set_source(handle.clone());
        Ok(handle)
    }

    /// Shows the panorama at a typed-in URL. Blank input is ignored.
    pub fn submit_url(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.set_source(SourceReference::new(text));
        true
    }

    pub fn current(&self) -> Option<&SourceReference> {
        self.current.as_ref()
    }

    pub fn is_default_source(&self) -> bool {
        self.current.as_ref() == Some(&self.default_source)
    }

    pub fn phase(&self) -> StartupPhase {
        self.startup.phase()
    }

    pub fn is_interactive(&self) -> bool {
        self.startup.phase() == StartupPhase::Ready
    }

    /// Advances startup and applies finished loads. Call once per frame.
    pub fn update(&mut self) -> Option<LoadStatus> {
        self.startup.poll();
        self.loader.update(&mut *self.surface.borrow_mut())
    }

    pub fn loader(&self) -> &TextureLoader {
        &self.loader
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    pub fn surface(&self) -> &Rc<RefCell<S>> {
        &self.surface
    }

    /// Cancels the pending load and releases the live handle. Safe to call
    /// more than once.
    pub fn shutdown(&mut self) {
        self.loader.cancel();
        if let Some(current) = self.current.take() {
            self.resources.release_handle(&current);
        }
    }
}

impl<S: RenderSurface> Drop for ViewerSession<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
