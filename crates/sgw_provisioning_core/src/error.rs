use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Failure reported by a vendor control-plane call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct VendorError {
    pub operation: String,
    pub message: String,
}

impl VendorError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Ordered steps of a gateway activation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningStep {
    Activate,
    AwaitDisks,
    AttachCache,
    SetGuestPassword,
    AttachLogGroup,
}

impl ProvisioningStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::AwaitDisks => "await_disks",
            Self::AttachCache => "attach_cache",
            Self::SetGuestPassword => "set_guest_password",
            Self::AttachLogGroup => "attach_log_group",
        }
    }
}

impl fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to side effects that landed before a step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    NotAttempted,
    RolledBack,
    Failed(VendorError),
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAttempted => f.write_str("not attempted"),
            Self::RolledBack => f.write_str("rolled back"),
            Self::Failed(error) => write!(f, "rollback failed ({error})"),
        }
    }
}

/// Every way a lifecycle invocation can fail. All variants are fatal to the
/// invocation; the invoking platform reports them as provisioning failures.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("malformed lifecycle event: {0}")]
    InvalidEvent(String),

    #[error("Invalid request type: {0}")]
    InvalidRequestType(String),

    #[error("{request_type} event is missing PhysicalResourceId")]
    MissingPhysicalResourceId { request_type: String },

    #[error("invalid resource properties: {0}")]
    InvalidProperties(String),

    #[error("unsupported ShareType '{0}' (expected SMB or NFS)")]
    UnsupportedShareType(String),

    #[error("secret '{secret_id}' could not be read: {source}")]
    SecretUnavailable {
        secret_id: String,
        #[source]
        source: VendorError,
    },

    #[error("secret '{secret_id}' is not a JSON object: {source}")]
    MalformedSecret {
        secret_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("secret '{secret_id}' has no key '{key}'")]
    MissingSecretKey { secret_id: String, key: String },

    #[error("secret '{secret_id}' key '{key}' is not a string")]
    InvalidSecretValue { secret_id: String, key: String },

    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error(
        "local disks of {gateway_arn} were not listable after {attempts} attempts ({elapsed:?}): {last_error}"
    )]
    DiskWaitTimedOut {
        gateway_arn: String,
        attempts: u32,
        elapsed: Duration,
        last_error: VendorError,
    },

    #[error("gateway {gateway_arn} reported no local disks to use as cache")]
    EmptyDiskInventory { gateway_arn: String },

    #[error(
        "step {step} failed for gateway {gateway_arn} after [{}]; compensation {compensation}: {source}",
        join_steps(.completed)
    )]
    PartialFailure {
        step: ProvisioningStep,
        gateway_arn: String,
        completed: Vec<ProvisioningStep>,
        compensation: Compensation,
        #[source]
        source: Box<ProvisioningError>,
    },
}

impl ProvisioningError {
    pub fn invalid_properties(message: impl Into<String>) -> Self {
        Self::InvalidProperties(message.into())
    }
}

fn join_steps(steps: &[ProvisioningStep]) -> String {
    steps
        .iter()
        .map(|step| step.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
