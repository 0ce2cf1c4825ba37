//! Recording fakes for the vendor adapters.
//!
//! Shared by unit tests and the integration tests under `tests/`.

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use sgw_provisioning_core::error::VendorError;
use sgw_provisioning_core::wait::{DiskWaitPolicy, WaitClock};

use crate::adapters::secret_store::SecretStore;
use crate::adapters::storage_gateway::{
    ActivateGatewayRequest, LocalDisk, NfsFileShareRequest, SmbFileShareRequest,
    StorageGatewayApi,
};

pub const TEST_GATEWAY_ARN: &str = "arn:aws:storagegateway:us-east-1:111122223333:gateway/sgw-12A3456B";
pub const TEST_FILE_SHARE_ARN: &str =
    "arn:aws:storagegateway:us-east-1:111122223333:share/share-1B2C3D4E";
pub const TEST_SECRET_ID: &str = "sg-instrument-credentials";

/// One recorded vendor call, with the arguments it was issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ActivateGateway(ActivateGatewayRequest),
    ListLocalDisks(String),
    AddCache { gateway_arn: String, disk_ids: Vec<String> },
    SetSmbGuestPassword { gateway_arn: String, password: String },
    UpdateGatewayInformation { gateway_arn: String, log_group_arn: String },
    CreateSmbFileShare(SmbFileShareRequest),
    CreateNfsFileShare(NfsFileShareRequest),
    DeleteFileShare(String),
    DeleteGateway(String),
}

impl GatewayCall {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::ActivateGateway(_) => "ActivateGateway",
            Self::ListLocalDisks(_) => "ListLocalDisks",
            Self::AddCache { .. } => "AddCache",
            Self::SetSmbGuestPassword { .. } => "SetSMBGuestPassword",
            Self::UpdateGatewayInformation { .. } => "UpdateGatewayInformation",
            Self::CreateSmbFileShare(_) => "CreateSMBFileShare",
            Self::CreateNfsFileShare(_) => "CreateNFSFileShare",
            Self::DeleteFileShare(_) => "DeleteFileShare",
            Self::DeleteGateway(_) => "DeleteGateway",
        }
    }

    /// Whether the call changes vendor state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::ListLocalDisks(_))
    }
}

/// In-memory storage gateway that records every call.
///
/// `ListLocalDisks` fails `disk_listing_failures` times before returning
/// `disks`; any operation named in `failing_operations` fails every time.
pub struct FakeStorageGateway {
    calls: Mutex<Vec<GatewayCall>>,
    disks: Vec<LocalDisk>,
    disk_listing_failures: Mutex<u32>,
    failing_operations: Mutex<HashMap<&'static str, String>>,
}

impl FakeStorageGateway {
    pub fn new() -> Self {
        Self::with_disks(&["d-1", "d-2"])
    }

    pub fn with_disks(disk_ids: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            disks: disk_ids
                .iter()
                .map(|disk_id| LocalDisk {
                    disk_id: disk_id.to_string(),
                })
                .collect(),
            disk_listing_failures: Mutex::new(0),
            failing_operations: Mutex::new(HashMap::new()),
        }
    }

    pub fn fail_disk_listing(self, times: u32) -> Self {
        *self.disk_listing_failures.lock().expect("poisoned mutex") = times;
        self
    }

    pub fn fail_operation(self, operation: &'static str, message: &str) -> Self {
        self.failing_operations
            .lock()
            .expect("poisoned mutex")
            .insert(operation, message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.calls().iter().map(GatewayCall::operation).collect()
    }

    pub fn mutations(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(GatewayCall::is_mutation)
            .collect()
    }

    fn record(&self, call: GatewayCall) -> Result<(), VendorError> {
        let operation = call.operation();
        self.calls.lock().expect("poisoned mutex").push(call);
        match self
            .failing_operations
            .lock()
            .expect("poisoned mutex")
            .get(operation)
        {
            Some(message) => Err(VendorError::new(operation, message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for FakeStorageGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageGatewayApi for FakeStorageGateway {
    fn activate_gateway(&self, request: &ActivateGatewayRequest) -> Result<String, VendorError> {
        self.record(GatewayCall::ActivateGateway(request.clone()))?;
        Ok(TEST_GATEWAY_ARN.to_string())
    }

    fn list_local_disks(&self, gateway_arn: &str) -> Result<Vec<LocalDisk>, VendorError> {
        self.record(GatewayCall::ListLocalDisks(gateway_arn.to_string()))?;
        let mut remaining = self.disk_listing_failures.lock().expect("poisoned mutex");
        if *remaining > 0 {
            *remaining -= 1;
            return Err(VendorError::new(
                "ListLocalDisks",
                "InvalidGatewayRequestException: gateway is not connected",
            ));
        }
        Ok(self.disks.clone())
    }

    fn add_cache(&self, gateway_arn: &str, disk_ids: &[String]) -> Result<(), VendorError> {
        self.record(GatewayCall::AddCache {
            gateway_arn: gateway_arn.to_string(),
            disk_ids: disk_ids.to_vec(),
        })
    }

    fn set_smb_guest_password(
        &self,
        gateway_arn: &str,
        password: &str,
    ) -> Result<(), VendorError> {
        self.record(GatewayCall::SetSmbGuestPassword {
            gateway_arn: gateway_arn.to_string(),
            password: password.to_string(),
        })
    }

    fn update_gateway_information(
        &self,
        gateway_arn: &str,
        log_group_arn: &str,
    ) -> Result<(), VendorError> {
        self.record(GatewayCall::UpdateGatewayInformation {
            gateway_arn: gateway_arn.to_string(),
            log_group_arn: log_group_arn.to_string(),
        })
    }

    fn create_smb_file_share(&self, request: &SmbFileShareRequest) -> Result<String, VendorError> {
        self.record(GatewayCall::CreateSmbFileShare(request.clone()))?;
        Ok(TEST_FILE_SHARE_ARN.to_string())
    }

    fn create_nfs_file_share(&self, request: &NfsFileShareRequest) -> Result<String, VendorError> {
        self.record(GatewayCall::CreateNfsFileShare(request.clone()))?;
        Ok(TEST_FILE_SHARE_ARN.to_string())
    }

    fn delete_file_share(&self, file_share_arn: &str) -> Result<String, VendorError> {
        self.record(GatewayCall::DeleteFileShare(file_share_arn.to_string()))?;
        Ok(file_share_arn.to_string())
    }

    fn delete_gateway(&self, gateway_arn: &str) -> Result<String, VendorError> {
        self.record(GatewayCall::DeleteGateway(gateway_arn.to_string()))?;
        Ok(gateway_arn.to_string())
    }
}

/// Secret store backed by a map; unknown ids fail like a missing secret.
pub struct FakeSecretStore {
    secrets: HashMap<String, String>,
    reads: Mutex<Vec<String>>,
}

impl FakeSecretStore {
    pub fn new() -> Self {
        Self {
            secrets: HashMap::new(),
            reads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_secret(mut self, secret_id: &str, secret_string: &str) -> Self {
        self.secrets
            .insert(secret_id.to_string(), secret_string.to_string());
        self
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().expect("poisoned mutex").clone()
    }
}

impl Default for FakeSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for FakeSecretStore {
    fn get_secret_string(&self, secret_id: &str) -> Result<String, VendorError> {
        self.reads
            .lock()
            .expect("poisoned mutex")
            .push(secret_id.to_string());
        self.secrets.get(secret_id).cloned().ok_or_else(|| {
            VendorError::new(
                "GetSecretValue",
                format!("ResourceNotFoundException: secret {secret_id} not found"),
            )
        })
    }
}

/// Clock that advances only when slept on.
pub struct ManualClock {
    origin: Instant,
    offset: Cell<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("poisoned mutex").clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitClock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }

    fn sleep(&self, duration: Duration) {
        self.offset.set(self.offset.get() + duration);
        self.sleeps.lock().expect("poisoned mutex").push(duration);
    }
}

/// Deterministic policy for tests: 1s, 2s, 4s... capped at 8s, 60s budget.
pub fn test_wait_policy() -> DiskWaitPolicy {
    DiskWaitPolicy {
        max_attempts: 0,
        initial_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(8),
        backoff_multiplier: 2.0,
        max_elapsed: Duration::from_secs(60),
        jitter: false,
    }
}

pub fn gateway_properties() -> Value {
    json!({
        "ServiceToken": "arn:aws:lambda:us-east-1:111122223333:function:agentProvider",
        "ActivationKey": "ABCDE-12345-FGHIJ-67890-KLMNO",
        "GatewayName": "dev-CVH-Storage-Gateway",
        "GatewayTimezone": "GMT-2:00",
        "GatewayRegion": "us-east-1",
        "GatewayType": "FILE_S3",
        "SecretId": TEST_SECRET_ID,
        "LogARN": "arn:aws:logs:us-east-1:111122223333:log-group:dev-Storage-Gateway-Log-Group"
    })
}

pub fn file_share_properties(share_type: &str) -> Value {
    json!({
        "ServiceToken": "arn:aws:lambda:us-east-1:111122223333:function:shareProvider",
        "ShareType": share_type,
        "GatewayARN": TEST_GATEWAY_ARN,
        "Role": "arn:aws:iam::111122223333:role/fileShareRole",
        "LocationARN": "arn:aws:s3:::dev-LANDING-TEST/platform/us-east-1/cellavista-hamilton/",
        "ClientList": "10.14.0.0/16",
        "FileShareName": "CVH-Data",
        "SecretId": TEST_SECRET_ID,
        "ClientToken": "sg-ch-CustomShareToken",
        "AuditDestinationARN": "arn:aws:logs:us-east-1:111122223333:log-group:CVH-Log-Group"
    })
}

pub fn test_secret_string() -> String {
    json!({
        "GuestPassword": "guest-pass-1",
        "sg-ch-CustomShareToken": "client-token-1"
    })
    .to_string()
}

pub fn create_event(properties: Value) -> Value {
    json!({
        "RequestType": "Create",
        "RequestId": "9f1c2b7e-0000-4000-8000-000000000001",
        "StackId": "arn:aws:cloudformation:us-east-1:111122223333:stack/CvhamTsStack/1",
        "LogicalResourceId": "sgCustomResource1",
        "ResourceType": "AWS::CloudFormation::CustomResource",
        "ResourceProperties": properties
    })
}

pub fn existing_resource_event(request_type: &str, physical_id: &str, properties: Value) -> Value {
    json!({
        "RequestType": request_type,
        "RequestId": "9f1c2b7e-0000-4000-8000-000000000002",
        "StackId": "arn:aws:cloudformation:us-east-1:111122223333:stack/CvhamTsStack/1",
        "LogicalResourceId": "sgCustomResource1",
        "ResourceType": "AWS::CloudFormation::CustomResource",
        "PhysicalResourceId": physical_id,
        "ResourceProperties": properties
    })
}
