//! Drives a `PanelState` against the device service: fetch on device-name
//! change, edit toggling, and the two-step save.
//!
//! Every operation absorbs its own failures into `PanelState::error`; nothing
//! is returned to the caller as an `Err`. Fetches are not fenced, so when two
//! are in flight the one applied last wins.

use std::sync::Arc;

use chrono::Utc;
use device_client::{DeviceService, HttpDeviceService, MissingDeviceService, VariableResolver};
use shared::{
    error::ErrorState,
    protocol::{NewAnnotationRequest, UpdateDeviceRequest},
};
use tracing::{debug, info, warn};

use crate::{
    config::PanelOptions,
    state::{EditField, PanelState, SaveOutcome},
    view::PanelView,
};

/// Resolved `api` / `apiKey` pair the current HTTP service was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ServiceEndpoint {
    base_url: String,
    api_key: String,
}

impl ServiceEndpoint {
    fn resolve(options: &PanelOptions, resolver: &dyn VariableResolver) -> Self {
        Self {
            base_url: resolver.resolve(&options.api),
            api_key: resolver.resolve(&options.api_key),
        }
    }

    fn connect(&self) -> Arc<dyn DeviceService> {
        if self.base_url.trim().is_empty() {
            warn!("no device service url configured");
            Arc::new(MissingDeviceService)
        } else {
            debug!(api = %self.base_url, "device service endpoint configured");
            Arc::new(HttpDeviceService::new(
                self.base_url.clone(),
                self.api_key.clone(),
            ))
        }
    }
}

pub struct DeviceAnnotationController {
    service: Arc<dyn DeviceService>,
    resolver: Arc<dyn VariableResolver>,
    /// `None` when the service was injected; it is then never rebuilt.
    endpoint: Option<ServiceEndpoint>,
    options: PanelOptions,
    state: PanelState,
}

impl DeviceAnnotationController {
    pub fn new(
        options: PanelOptions,
        service: Arc<dyn DeviceService>,
        resolver: Arc<dyn VariableResolver>,
    ) -> Self {
        Self {
            service,
            resolver,
            endpoint: None,
            options,
            state: PanelState::new(Utc::now()),
        }
    }

    /// Builds the HTTP service from the resolved `api` and `apiKey` options.
    /// The service is rebuilt on `refresh` whenever either resolves differently.
    pub fn from_options(options: PanelOptions, resolver: Arc<dyn VariableResolver>) -> Self {
        let endpoint = ServiceEndpoint::resolve(&options, resolver.as_ref());
        let service = endpoint.connect();
        let mut controller = Self::new(options, service, resolver);
        controller.endpoint = Some(endpoint);
        controller
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn options(&self) -> &PanelOptions {
        &self.options
    }

    pub fn view(&self) -> PanelView {
        PanelView::new(&self.options, &self.state)
    }

    /// Resolves the configured device template and records the result.
    pub fn resolve_device_name(&mut self) -> String {
        let name = self.resolver.resolve(&self.options.device);
        self.state.device_name = Some(name.clone());
        name
    }

    /// Re-resolves the endpoint and the device name, fetching when either
    /// changed. Call on mount and whenever the template inputs may have changed.
    pub async fn refresh(&mut self) {
        let endpoint_changed = self.sync_endpoint();
        let previous = self.state.device_name.clone();
        let name = self.resolve_device_name();
        if endpoint_changed || previous.as_deref() != Some(name.as_str()) {
            self.on_device_name_changed(&name).await;
        }
    }

    /// Rebuilds a service created from options when `api` or `apiKey` now
    /// resolve differently. Returns whether it was rebuilt.
    fn sync_endpoint(&mut self) -> bool {
        let Some(current) = self.endpoint.as_ref() else {
            return false;
        };
        let resolved = ServiceEndpoint::resolve(&self.options, self.resolver.as_ref());
        if &resolved == current {
            return false;
        }
        info!(api = %resolved.base_url, "device service endpoint changed");
        self.service = resolved.connect();
        self.endpoint = Some(resolved);
        true
    }

    pub async fn set_options(&mut self, options: PanelOptions) {
        self.options = options;
        self.refresh().await;
    }

    pub async fn on_device_name_changed(&mut self, name: &str) {
        self.state.clear_error();
        if name.is_empty() {
            debug!("device name resolved empty, nothing to fetch");
            return;
        }
        self.fetch_device(name).await;
    }

    pub async fn fetch_device(&mut self, name: &str) {
        self.state.clear_error();
        match self.service.get_device(name).await {
            Ok(device) => {
                info!(
                    device = %name,
                    device_id = %device.id,
                    annotations = device.annotations.len(),
                    "device loaded"
                );
                self.state.apply_device(device);
            }
            Err(err) => {
                warn!(device = %name, error = %err, "failed to load device");
                self.state.fail(ErrorState::from(&err));
            }
        }
    }

    pub fn enter_edit_mode(&mut self) {
        self.state.enter_edit_mode(Utc::now());
    }

    pub fn exit_edit_mode_without_saving(&mut self) {
        self.state.exit_edit_mode();
    }

    pub fn update_field(&mut self, field: EditField, raw: &str) {
        self.state.update_field(field, raw);
    }

    /// Creates a new annotation from the buffer, then updates the device
    /// metadata. Nothing is rolled back when the second step fails, so a
    /// retry posts the annotation again.
    pub async fn save(&mut self) -> SaveOutcome {
        let Some(device_id) = self.state.device.as_ref().map(|device| device.id.clone()) else {
            warn!("save requested with no device loaded");
            return self.state.abort_save(ErrorState::transport("no device loaded"));
        };

        self.state.begin_save();

        let annotation = NewAnnotationRequest::new(
            self.state.description.clone(),
            self.state.hives,
            self.state.begin,
        );
        match self.service.create_annotation(&device_id, &annotation).await {
            Ok(created) => {
                info!(
                    device_id = %device_id,
                    annotation_id = %created.id,
                    hives = created.hives(),
                    "annotation created"
                );
                self.state.apply_created_annotation(created);
            }
            Err(err) => {
                warn!(device_id = %device_id, error = %err, "failed to create annotation");
                return self.state.abort_save(ErrorState::from(&err));
            }
        }

        let update =
            UpdateDeviceRequest::with_user_description(self.state.user_description.clone());
        match self.service.update_device(&device_id, &update).await {
            Ok(device) => {
                info!(device_id = %device_id, "device metadata updated");
                self.state.apply_updated_device(device);
                SaveOutcome::Saved
            }
            Err(err) => {
                warn!(
                    device_id = %device_id,
                    error = %err,
                    "failed to update device metadata; annotation already stored"
                );
                self.state.abort_save(ErrorState::from(&err))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/controller_http_tests.rs"]
mod http_tests;
