use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::ZoomController;
use crate::input::{InputSurface, ListenerId, WheelEvent};
use crate::surface::RenderSurface;

pub const WHEEL_ZOOM: &str = "mouse-wheel-zoom";

/// Wheel zoom attached to an input surface for the lifetime of a mount.
///
/// Detaches on [`WheelZoom::detach`] or drop, whichever comes first.
pub struct WheelZoom {
    input: Rc<InputSurface>,
    listener: Option<ListenerId>,
    zoom: Rc<RefCell<ZoomController>>,
}

impl WheelZoom {
    /// Registers the zoom handler. Returns `None` if another mount already
    /// holds it.
    pub fn attach<S: RenderSurface + 'static>(
        input: Rc<InputSurface>,
        zoom: ZoomController,
        surface: Rc<RefCell<S>>,
    ) -> Option<Self> {
        let zoom = Rc::new(RefCell::new(zoom));
        let handler_zoom = zoom.clone();
        let handler_surface = surface.clone();
        let listener = input.register(
            WHEEL_ZOOM,
            Rc::new(move |event: &mut WheelEvent| {
                let fov = handler_zoom.borrow_mut().on_wheel(event.delta_y);
                handler_surface.borrow_mut().set_field_of_view(fov);
                event.prevent_default();
            }),
        )?;
        // refused mounts leave the surface untouched
        surface.borrow_mut().set_field_of_view(zoom.borrow().fov());
        Some(Self {
            input,
            listener: Some(listener),
            zoom,
        })
    }

    pub fn zoom(&self) -> ZoomController {
        *self.zoom.borrow()
    }

    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    pub fn detach(&mut self) {
        if let Some(id) = self.listener.take() {
            self.input.deregister(id);
            log::debug!("wheel zoom detached");
        }
    }
}

impl Drop for WheelZoom {
    fn drop(&mut self) {
        self.detach();
    }
}
