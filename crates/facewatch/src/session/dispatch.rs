//! Explicit event dispatch for the session controller.
//!
//! Platform callbacks (surface holder, selection listener, activity lifecycle)
//! are translated into [`UiEvent`] values by whatever hosts the controller.

use facewatch_protocol::ComputeMode;

use crate::engine::OutputWindow;

use super::controller::SessionController;

/// Display surface lifecycle.
#[derive(Debug, Clone)]
pub enum SurfaceEvent {
    Created,
    /// Geometry changed or the surface was recreated.
    Changed(OutputWindow),
    Destroyed,
}

/// Everything the host can tell the controller.
#[derive(Debug, Clone)]
pub enum UiEvent {
    HostCreated,
    HostResumed,
    HostDestroyed,
    Surface(SurfaceEvent),
    /// A model was picked from the index-addressed selection list.
    ModelSelected(usize),
    ComputeSelected(ComputeMode),
}

/// Surface holder callbacks.
pub trait SurfaceCallbacks {
    fn surface_created(&mut self);
    fn surface_changed(&mut self, window: OutputWindow);
    fn surface_destroyed(&mut self);
}

impl SurfaceCallbacks for SessionController {
    fn surface_created(&mut self) {
        self.on_surface_created();
    }

    fn surface_changed(&mut self, window: OutputWindow) {
        self.on_surface_changed(window);
    }

    fn surface_destroyed(&mut self) {
        self.on_surface_destroyed();
    }
}

impl SessionController {
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::HostCreated => self.host_created(),
            UiEvent::HostResumed => self.host_resumed(),
            UiEvent::HostDestroyed => self.host_destroyed(),
            UiEvent::Surface(SurfaceEvent::Created) => self.surface_created(),
            UiEvent::Surface(SurfaceEvent::Changed(window)) => self.surface_changed(window),
            UiEvent::Surface(SurfaceEvent::Destroyed) => self.surface_destroyed(),
            UiEvent::ModelSelected(position) => {
                self.select_model(position);
            }
            UiEvent::ComputeSelected(compute) => {
                self.select_compute(compute);
            }
        }
    }
}
