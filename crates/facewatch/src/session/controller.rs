//! Session controller - drives the engine from surface and selection events.
//!
//! The controller owns the single [`Session`], the engine handle and the alert
//! poller. It enforces the call ordering the engine relies on:
//! - `open_camera` is never issued while the camera is open
//! - `set_output_window` is only issued after a successful `open_camera`
//! - the alert poller is stopped before `close_camera`
//!
//! All methods run on the thread that owns the controller; only the poller
//! runs elsewhere and it never touches session state.

use std::sync::Arc;

use chrono::Utc;
use facewatch_protocol::{ComputeMode, Event, EventPayload, ModelId, ModelSelection};
use log::{debug, error, info, warn};

use crate::alert::{AlertConfig, AlertHandler, AlertPoller, LogAlertHandler};
use crate::engine::{AssetSource, InferenceEngine, OutputWindow};
use crate::events::{EventSink, LogEventSink};

use super::models::{ReloadPolicy, Session, SessionConfig};

pub struct SessionController {
    engine: Arc<dyn InferenceEngine>,
    assets: Arc<dyn AssetSource>,
    alert_handler: Arc<dyn AlertHandler>,
    events: Arc<dyn EventSink>,
    reload_policy: ReloadPolicy,
    alert: AlertConfig,
    session: Session,
    /// Whether the display surface currently exists.
    surface_present: bool,
    /// Window received before the camera opened; bound right after it does.
    pending_window: Option<OutputWindow>,
    /// Most recent window, rebound after a close-and-reopen reload.
    last_window: Option<OutputWindow>,
    poller: Option<AlertPoller>,
}

impl SessionController {
    pub fn new(
        engine: Arc<dyn InferenceEngine>,
        assets: Arc<dyn AssetSource>,
        config: SessionConfig,
        alert: AlertConfig,
    ) -> Self {
        Self {
            engine,
            assets,
            alert_handler: Arc::new(LogAlertHandler),
            events: Arc::new(LogEventSink),
            reload_policy: config.reload,
            alert,
            session: Session::new(config.facing, config.selection),
            surface_present: false,
            pending_window: None,
            last_window: None,
            poller: None,
        }
    }

    pub fn with_alert_handler(mut self, handler: Arc<dyn AlertHandler>) -> Self {
        self.alert_handler = handler;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    // ========================================================================
    // Host lifecycle
    // ========================================================================

    /// Load the initial model selection.
    pub fn host_created(&mut self) {
        self.reload();
    }

    /// Retry opening the camera if the surface exists but the camera is closed,
    /// e.g. after permission was granted.
    pub fn host_resumed(&mut self) {
        if !self.surface_present || self.session.is_open {
            return;
        }
        info!("host resumed with closed camera; retrying open");
        self.open_camera();
        self.start_poller();
    }

    pub fn host_destroyed(&mut self) {
        self.teardown();
    }

    // ========================================================================
    // Surface lifecycle
    // ========================================================================

    pub(super) fn on_surface_created(&mut self) {
        self.surface_present = true;
        if self.session.is_open {
            warn!("surface created while camera is already open; ignoring");
            return;
        }
        self.open_camera();
        self.start_poller();
    }

    pub(super) fn on_surface_changed(&mut self, window: OutputWindow) {
        self.last_window = Some(window.clone());
        if !self.session.is_open {
            debug!(
                "camera not open; deferring output window {} until it is",
                window.id()
            );
            self.pending_window = Some(window);
            return;
        }
        self.bind_window(window);
    }

    pub(super) fn on_surface_destroyed(&mut self) {
        self.surface_present = false;
        self.last_window = None;
        self.teardown();
    }

    // ========================================================================
    // Model selection
    // ========================================================================

    /// Select a model by list position. Returns whether a reload happened.
    pub fn select_model(&mut self, position: usize) -> bool {
        let model = ModelId(position);
        if model == self.session.selection.model {
            debug!("model {} already selected", model);
            return false;
        }
        self.session.selection = self.session.selection.with_model(model);
        self.reload();
        true
    }

    /// Select a compute mode. Returns whether a reload happened.
    pub fn select_compute(&mut self, compute: ComputeMode) -> bool {
        if compute == self.session.selection.compute {
            debug!("compute mode {} already selected", compute);
            return false;
        }
        self.session.selection = self.session.selection.with_compute(compute);
        self.reload();
        true
    }

    fn reload(&mut self) {
        let selection = self.session.selection;
        let reopen =
            self.reload_policy == ReloadPolicy::CloseAndReopen && self.session.is_open;

        if reopen {
            debug!("closing camera for reload of {}", selection);
            self.stop_poller();
            self.close_camera();
        }

        self.load_model(selection);

        if reopen && self.surface_present {
            if self.session.is_open {
                warn!("camera still open after failed close; not reopening");
            } else {
                self.pending_window = self.last_window.clone();
                self.open_camera();
            }
            self.start_poller();
        }
    }

    fn load_model(&mut self, selection: ModelSelection) {
        match self
            .engine
            .load_model(self.assets.as_ref(), selection.model, selection.compute)
        {
            Ok(()) => {
                info!("loaded {}", selection);
                self.session.loaded = Some(selection);
                self.emit(EventPayload::ModelLoaded {
                    model: selection.model,
                    compute: selection.compute,
                });
            }
            Err(err) => {
                // Non-fatal: whatever model was resident keeps running.
                error!("model load failed for {}: {}", selection, err);
                self.emit(EventPayload::ModelLoadFailed {
                    model: selection.model,
                    compute: selection.compute,
                    error: err.to_string(),
                });
            }
        }
    }

    // ========================================================================
    // Engine calls
    // ========================================================================

    fn open_camera(&mut self) {
        let facing = self.session.facing;
        match self.engine.open_camera(facing) {
            Ok(()) => {
                self.session.is_open = true;
                self.emit(EventPayload::CameraOpened { facing });
                if let Some(window) = self.pending_window.take() {
                    self.bind_window(window);
                }
            }
            Err(err) => {
                self.session.is_open = false;
                warn!("failed to open {} camera: {}", facing, err);
                self.emit(EventPayload::CameraOpenFailed {
                    facing,
                    error: err.to_string(),
                });
            }
        }
    }

    /// A failed close leaves `is_open` set so the next teardown retries it.
    fn close_camera(&mut self) {
        match self.engine.close_camera() {
            Ok(()) => {
                self.session.is_open = false;
                self.session.window_bound = false;
                self.emit(EventPayload::CameraClosed { error: None });
            }
            Err(err) => {
                warn!("failed to close camera: {}", err);
                self.emit(EventPayload::CameraClosed {
                    error: Some(err.to_string()),
                });
            }
        }
    }

    fn bind_window(&mut self, window: OutputWindow) {
        let (width, height) = (window.width(), window.height());
        match self.engine.set_output_window(window) {
            Ok(()) => {
                self.session.window_bound = true;
                self.emit(EventPayload::WindowBound { width, height });
            }
            Err(err) => {
                warn!("failed to bind output window: {}", err);
                self.emit(EventPayload::WindowBindFailed {
                    error: err.to_string(),
                });
            }
        }
    }

    fn teardown(&mut self) {
        self.pending_window = None;
        self.stop_poller();
        if self.session.is_open {
            self.close_camera();
        }
    }

    // ========================================================================
    // Alert poller
    // ========================================================================

    fn start_poller(&mut self) {
        if self.poller.is_some() {
            return;
        }
        if self.alert.require_open_camera && !self.session.is_open {
            debug!("camera not open; alert poller not started");
            return;
        }

        match AlertPoller::spawn(
            Arc::clone(&self.engine),
            Arc::clone(&self.alert_handler),
            &self.alert,
        ) {
            Ok(poller) => {
                self.poller = Some(poller);
                self.emit(EventPayload::PollerStarted {
                    interval_ms: self.alert.interval_ms,
                });
            }
            Err(err) => error!("failed to spawn alert poller: {}", err),
        }
    }

    fn stop_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            let polls = poller.stop();
            self.emit(EventPayload::PollerStopped { polls });
        }
    }

    fn emit(&self, payload: EventPayload) {
        self.events.emit(Event::new(
            self.session.id.clone(),
            Utc::now().timestamp_millis(),
            payload,
        ));
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.teardown();
    }
}
