use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::ZoomController;
use crate::config::ViewerConfig;
use crate::controller::WheelZoom;
use crate::decoder::DecoderRegistry;
use crate::input::InputSurface;
use crate::loader::LoadStatus;
use crate::resource::{accepts, LocalFile, ResourceError};
use crate::session::ViewerSession;
use crate::state::SharedState;
use crate::surface::RenderSurface;

/// Everything the chrome around the viewer can ask for.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    UrlSubmitted(String),
    FileSelected(LocalFile),
    FileDropped(LocalFile),
}

/// A mounted panorama viewer: session, wheel zoom and request queue.
///
/// Until the startup grace period is over, source requests are queued and
/// wheel zoom is not bound.
pub struct Viewer<S: RenderSurface + 'static> {
    session: ViewerSession<S>,
    zoom: Option<WheelZoom>,
    /// Set until wheel zoom has been offered to the input surface.
    pending_input: Option<(Rc<InputSurface>, ZoomController)>,
    shared: SharedState,
}

impl<S: RenderSurface + 'static> Viewer<S> {
    /// Starts loading the default panorama. Wheel zoom is bound to `input`
    /// once the viewer becomes interactive.
    pub fn mount(
        config: &ViewerConfig,
        surface: Rc<RefCell<S>>,
        input: Rc<InputSurface>,
        decoders: Rc<DecoderRegistry>,
    ) -> Self {
        let mut session = ViewerSession::new(config, surface, decoders);
        session.set_source(config.default_source());
        let mut viewer = Self {
            session,
            zoom: None,
            pending_input: Some((input, config.zoom_controller())),
            shared: SharedState::new(),
        };
        if viewer.session.is_interactive() {
            viewer.bind_input();
        }
        viewer
    }

    fn bind_input(&mut self) {
        let Some((input, zoom)) = self.pending_input.take() else {
            return;
        };
        self.zoom = WheelZoom::attach(input, zoom, self.session.surface().clone());
        if self.zoom.is_none() {
            log::warn!("wheel zoom is owned by another viewer, zoom disabled for this mount");
        }
    }

    /// Sender for producers that run outside the frame loop.
    pub fn requests(&self) -> flume::Sender<SourceEvent> {
        self.shared.source_sender.clone()
    }

    /// Applies a source request, or queues it while the viewer is still
    /// initializing.
    pub fn handle(&mut self, event: SourceEvent) -> Result<(), ResourceError> {
        if !self.session.is_interactive() {
            log::debug!("viewer not ready, holding request until startup finishes");
            if self.shared.source_sender.send(event).is_err() {
                log::warn!("request queue closed, dropping request");
            }
            return Ok(());
        }
        match event {
            SourceEvent::UrlSubmitted(text) => {
                if !self.session.submit_url(&text) {
                    log::debug!("ignoring empty url");
                }
            }
            SourceEvent::FileSelected(file) => {
                let name = file.name();
                if !accepts(&name) {
                    log::warn!("{name} is not a supported panorama file");
                    return Ok(());
                }
                self.session.open_file(&file)?;
            }
            SourceEvent::FileDropped(file) => {
                self.session.open_file(&file)?;
            }
        }
        Ok(())
    }

    /// Advances the session and, once interactive, runs queued requests.
    /// Call once per frame.
    pub fn update(&mut self) -> Option<LoadStatus> {
        let status = self.session.update();
        if self.session.is_interactive() {
            self.bind_input();
            while let Ok(event) = self.shared.source_receiver.try_recv() {
                if let Err(err) = self.handle(event) {
                    log::error!("cannot open panorama: {err}");
                }
            }
        }
        status
    }

    pub fn session(&self) -> &ViewerSession<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ViewerSession<S> {
        &mut self.session
    }

    pub fn zoom(&self) -> Option<&WheelZoom> {
        self.zoom.as_ref()
    }

    /// Detaches input handlers and releases everything the session holds.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(mut zoom) = self.zoom.take() {
            zoom.detach();
        }
        self.pending_input = None;
        self.session.shutdown();
    }
}

impl<S: RenderSurface + 'static> Drop for Viewer<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
