//! Client side of the hive-scale device service: the `DeviceService` seam, its
//! reqwest implementation and the template resolver used to build requests.

use async_trait::async_trait;
use shared::{
    domain::{Annotation, Device, DeviceId},
    protocol::{NewAnnotationRequest, UpdateDeviceRequest},
};

pub mod error;
pub mod http;
pub mod resolver;

pub use error::ServiceError;
pub use http::HttpDeviceService;
pub use resolver::{IdentityResolver, TemplateVariables, VariableResolver};

#[async_trait]
pub trait DeviceService: Send + Sync {
    /// `GET /devices/{name}`
    async fn get_device(&self, name: &str) -> Result<Device, ServiceError>;

    /// `POST /devices/{id}/annotations`
    async fn create_annotation(
        &self,
        device_id: &DeviceId,
        request: &NewAnnotationRequest,
    ) -> Result<Annotation, ServiceError>;

    /// `PUT /devices/{id}`
    async fn update_device(
        &self,
        device_id: &DeviceId,
        request: &UpdateDeviceRequest,
    ) -> Result<Device, ServiceError>;
}

pub struct MissingDeviceService;

#[async_trait]
impl DeviceService for MissingDeviceService {
    async fn get_device(&self, name: &str) -> Result<Device, ServiceError> {
        Err(ServiceError::Unavailable(format!(
            "no device service configured to fetch '{name}'"
        )))
    }

    async fn create_annotation(
        &self,
        device_id: &DeviceId,
        _request: &NewAnnotationRequest,
    ) -> Result<Annotation, ServiceError> {
        Err(ServiceError::Unavailable(format!(
            "no device service configured to annotate device {device_id}"
        )))
    }

    async fn update_device(
        &self,
        device_id: &DeviceId,
        _request: &UpdateDeviceRequest,
    ) -> Result<Device, ServiceError> {
        Err(ServiceError::Unavailable(format!(
            "no device service configured to update device {device_id}"
        )))
    }
}
