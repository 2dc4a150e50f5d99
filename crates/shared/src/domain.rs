use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(DeviceId);
id_newtype!(AnnotationId);

/// A hive scale as stored by the device service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Device {
    #[serde(default)]
    pub id: DeviceId,
    /// Display name; also the key used by `GET /devices/{name}`.
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub meta: DeviceMeta,
    /// Newest first.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Device {
    pub fn latest_annotation(&self) -> Option<&Annotation> {
        self.annotations.first()
    }

    pub fn user_description(&self) -> &str {
        &self.meta.user_description
    }

    /// Folds a metadata-update response into this cached copy. The service may
    /// answer with a partial device, so identity and annotations missing from
    /// `update` are kept from `self`.
    pub fn merge_update(&self, update: Device) -> Device {
        Device {
            id: if update.id.0.is_empty() {
                self.id.clone()
            } else {
                update.id
            },
            device: if update.device.is_empty() {
                self.device.clone()
            } else {
                update.device
            },
            meta: update.meta,
            annotations: if update.annotations.is_empty() {
                self.annotations.clone()
            } else {
                update.annotations
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceMeta {
    #[serde(default)]
    pub user_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Annotation {
    #[serde(default)]
    pub id: AnnotationId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data: AnnotationData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<DateTime<Utc>>,
}

impl Annotation {
    pub fn hives(&self) -> i64 {
        self.data.hives
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnnotationData {
    #[serde(default)]
    pub hives: i64,
}
