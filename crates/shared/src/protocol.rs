use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AnnotationData, DeviceMeta};

/// Body of `POST /devices/{id}/annotations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewAnnotationRequest {
    pub description: String,
    pub data: AnnotationData,
    pub begin: DateTime<Utc>,
}

impl NewAnnotationRequest {
    pub fn new(description: impl Into<String>, hives: i64, begin: DateTime<Utc>) -> Self {
        Self {
            description: description.into(),
            data: AnnotationData { hives },
            begin,
        }
    }
}

/// Body of `PUT /devices/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateDeviceRequest {
    pub meta: DeviceMeta,
}

impl UpdateDeviceRequest {
    pub fn with_user_description(user_description: impl Into<String>) -> Self {
        Self {
            meta: DeviceMeta {
                user_description: user_description.into(),
            },
        }
    }
}
