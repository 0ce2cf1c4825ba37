//! Typed views over `ResourceProperties`.
//!
//! Each resource kind is parsed into its own spec and validated before any
//! vendor call is attempted. Keys the handlers do not consume (for example
//! the provider framework's `ServiceToken`) are ignored.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProvisioningError;

pub const GUEST_PASSWORD_SECRET_KEY: &str = "GuestPassword";
pub const SMB_GUEST_ACCESS: &str = "GuestAccess";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySpec {
    pub secret_id: String,
    pub activation_key: String,
    pub gateway_name: String,
    pub gateway_timezone: String,
    pub gateway_region: String,
    pub gateway_type: String,
    pub log_group_arn: String,
    pub rollback_on_failure: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawGatewayProperties {
    secret_id: Option<String>,
    activation_key: Option<String>,
    gateway_name: Option<String>,
    gateway_timezone: Option<String>,
    gateway_region: Option<String>,
    gateway_type: Option<String>,
    #[serde(rename = "LogARN")]
    log_arn: Option<String>,
    rollback_on_failure: Option<Flag>,
}

impl GatewaySpec {
    pub fn from_properties(properties: &Value) -> Result<Self, ProvisioningError> {
        let raw: RawGatewayProperties = parse_raw(properties)?;
        Ok(Self {
            secret_id: require("SecretId", raw.secret_id)?,
            activation_key: require("ActivationKey", raw.activation_key)?,
            gateway_name: require("GatewayName", raw.gateway_name)?,
            gateway_timezone: require("GatewayTimezone", raw.gateway_timezone)?,
            gateway_region: require("GatewayRegion", raw.gateway_region)?,
            gateway_type: require("GatewayType", raw.gateway_type)?,
            log_group_arn: require("LogARN", raw.log_arn)?,
            rollback_on_failure: match raw.rollback_on_failure {
                Some(flag) => flag.resolve("RollbackOnFailure")?,
                None => false,
            },
        })
    }
}

/// Fields shared by both file share variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareTarget {
    pub secret_id: String,
    pub gateway_arn: String,
    pub role_arn: String,
    pub location_arn: String,
    pub file_share_name: String,
    /// Key inside the secret bundle whose value is the idempotency token.
    pub client_token_key: String,
    pub audit_destination_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmbShareSpec {
    pub target: ShareTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfsShareSpec {
    pub target: ShareTarget,
    pub client_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileShareSpec {
    Smb(SmbShareSpec),
    Nfs(NfsShareSpec),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawFileShareProperties {
    share_type: Option<String>,
    secret_id: Option<String>,
    #[serde(rename = "GatewayARN")]
    gateway_arn: Option<String>,
    role: Option<String>,
    #[serde(rename = "LocationARN")]
    location_arn: Option<String>,
    file_share_name: Option<String>,
    client_token: Option<String>,
    #[serde(rename = "AuditDestinationARN")]
    audit_destination_arn: Option<String>,
    client_list: Option<String>,
}

impl FileShareSpec {
    pub fn from_properties(properties: &Value) -> Result<Self, ProvisioningError> {
        let raw: RawFileShareProperties = parse_raw(properties)?;
        let share_type = require("ShareType", raw.share_type)?;
        if share_type != "SMB" && share_type != "NFS" {
            return Err(ProvisioningError::UnsupportedShareType(share_type));
        }

        let target = ShareTarget {
            secret_id: require("SecretId", raw.secret_id)?,
            gateway_arn: require("GatewayARN", raw.gateway_arn)?,
            role_arn: require("Role", raw.role)?,
            location_arn: require("LocationARN", raw.location_arn)?,
            file_share_name: require("FileShareName", raw.file_share_name)?,
            client_token_key: require("ClientToken", raw.client_token)?,
            audit_destination_arn: require("AuditDestinationARN", raw.audit_destination_arn)?,
        };

        if share_type == "SMB" {
            return Ok(Self::Smb(SmbShareSpec { target }));
        }

        Ok(Self::Nfs(NfsShareSpec {
            target,
            client_list: vec![require("ClientList", raw.client_list)?],
        }))
    }

    pub fn target(&self) -> &ShareTarget {
        match self {
            Self::Smb(spec) => &spec.target,
            Self::Nfs(spec) => &spec.target,
        }
    }

    pub fn share_type(&self) -> &'static str {
        match self {
            Self::Smb(_) => "SMB",
            Self::Nfs(_) => "NFS",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn resolve(self, key: &str) -> Result<bool, ProvisioningError> {
        match self {
            Self::Bool(value) => Ok(value),
            Self::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" | "" => Ok(false),
                _ => Err(ProvisioningError::invalid_properties(format!(
                    "{key} must be true or false, got '{text}'"
                ))),
            },
        }
    }
}

fn parse_raw<T: DeserializeOwned>(properties: &Value) -> Result<T, ProvisioningError> {
    if !properties.is_object() {
        return Err(ProvisioningError::invalid_properties(
            "ResourceProperties must be a JSON object",
        ));
    }
    serde_json::from_value(properties.clone())
        .map_err(|error| ProvisioningError::invalid_properties(error.to_string()))
}

fn require(key: &str, value: Option<String>) -> Result<String, ProvisioningError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(ProvisioningError::invalid_properties(format!(
            "{key} cannot be blank"
        ))),
        None => Err(ProvisioningError::invalid_properties(format!(
            "{key} is required"
        ))),
    }
}
