use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProvisioningError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = ProvisioningError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Create" => Ok(Self::Create),
            "Update" => Ok(Self::Update),
            "Delete" => Ok(Self::Delete),
            other => Err(ProvisioningError::InvalidRequestType(other.to_string())),
        }
    }
}

/// A custom resource lifecycle event as delivered by the provider framework.
///
/// `RequestType` is kept as the raw literal so that an unrecognized value can
/// be reported verbatim instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    pub request_type: String,
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl LifecycleEvent {
    pub fn from_value(payload: Value) -> Result<Self, ProvisioningError> {
        serde_json::from_value(payload)
            .map_err(|error| ProvisioningError::InvalidEvent(error.to_string()))
    }

    pub fn request_type(&self) -> Result<RequestType, ProvisioningError> {
        self.request_type.parse()
    }

    /// The stored physical id. Update and Delete events must carry one.
    pub fn physical_resource_id(&self) -> Result<&str, ProvisioningError> {
        match self.physical_resource_id.as_deref() {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ProvisioningError::MissingPhysicalResourceId {
                request_type: self.request_type.clone(),
            }),
        }
    }

    pub fn properties_value(&self) -> Value {
        Value::Object(self.resource_properties.clone())
    }
}

/// Raw vendor acknowledgment of a teardown call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeleteAcknowledgment {
    #[serde(rename = "GatewayARN")]
    Gateway(String),
    #[serde(rename = "FileShareARN")]
    FileShare(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HandlerResponse {
    Resource {
        #[serde(rename = "PhysicalResourceId")]
        physical_resource_id: String,
    },
    Deleted(DeleteAcknowledgment),
}

impl HandlerResponse {
    pub fn resource(physical_resource_id: impl Into<String>) -> Self {
        Self::Resource {
            physical_resource_id: physical_resource_id.into(),
        }
    }

    pub fn physical_resource_id(&self) -> Option<&str> {
        match self {
            Self::Resource {
                physical_resource_id,
            } => Some(physical_resource_id),
            Self::Deleted(_) => None,
        }
    }
}
