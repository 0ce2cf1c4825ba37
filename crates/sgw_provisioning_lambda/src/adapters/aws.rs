//! AWS SDK implementations of the vendor adapter traits.
//!
//! Clients are built once per process and injected into the handlers. The
//! handlers are synchronous, so each call blocks the current runtime worker
//! until the SDK future resolves.

use std::future::Future;

use aws_sdk_storagegateway::error::DisplayErrorContext;
use sgw_provisioning_core::error::VendorError;

use crate::adapters::secret_store::SecretStore;
use crate::adapters::storage_gateway::{
    ActivateGatewayRequest, LocalDisk, NfsFileShareRequest, SmbFileShareRequest,
    StorageGatewayApi,
};

#[derive(Clone)]
pub struct AwsStorageGateway {
    client: aws_sdk_storagegateway::Client,
}

impl AwsStorageGateway {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_storagegateway::Client::new(config),
        }
    }
}

#[derive(Clone)]
pub struct AwsSecretsManager {
    client: aws_sdk_secretsmanager::Client,
}

impl AwsSecretsManager {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_secretsmanager::Client::new(config),
        }
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn sdk_error(operation: &str, error: impl std::error::Error) -> VendorError {
    VendorError::new(operation, DisplayErrorContext(error).to_string())
}

fn required_arn(operation: &str, field: &str, value: Option<&str>) -> Result<String, VendorError> {
    value
        .map(str::to_string)
        .ok_or_else(|| VendorError::new(operation, format!("response did not include {field}")))
}

impl StorageGatewayApi for AwsStorageGateway {
    fn activate_gateway(&self, request: &ActivateGatewayRequest) -> Result<String, VendorError> {
        let client = self.client.clone();
        let request = request.clone();
        let output = block_on(async move {
            client
                .activate_gateway()
                .activation_key(request.activation_key)
                .gateway_name(request.gateway_name)
                .gateway_timezone(request.gateway_timezone)
                .gateway_region(request.gateway_region)
                .gateway_type(request.gateway_type)
                .send()
                .await
        })
        .map_err(|error| sdk_error("ActivateGateway", error))?;
        required_arn("ActivateGateway", "GatewayARN", output.gateway_arn())
    }

    fn list_local_disks(&self, gateway_arn: &str) -> Result<Vec<LocalDisk>, VendorError> {
        let client = self.client.clone();
        let gateway_arn = gateway_arn.to_string();
        let output = block_on(async move {
            client
                .list_local_disks()
                .gateway_arn(gateway_arn)
                .send()
                .await
        })
        .map_err(|error| sdk_error("ListLocalDisks", error))?;

        Ok(output
            .disks()
            .iter()
            .filter_map(|disk| {
                disk.disk_id().map(|disk_id| LocalDisk {
                    disk_id: disk_id.to_string(),
                })
            })
            .collect())
    }

    fn add_cache(&self, gateway_arn: &str, disk_ids: &[String]) -> Result<(), VendorError> {
        let client = self.client.clone();
        let gateway_arn = gateway_arn.to_string();
        let disk_ids = disk_ids.to_vec();
        block_on(async move {
            client
                .add_cache()
                .gateway_arn(gateway_arn)
                .set_disk_ids(Some(disk_ids))
                .send()
                .await
        })
        .map(|_| ())
        .map_err(|error| sdk_error("AddCache", error))
    }

    fn set_smb_guest_password(
        &self,
        gateway_arn: &str,
        password: &str,
    ) -> Result<(), VendorError> {
        let client = self.client.clone();
        let gateway_arn = gateway_arn.to_string();
        let password = password.to_string();
        block_on(async move {
            client
                .set_smb_guest_password()
                .gateway_arn(gateway_arn)
                .password(password)
                .send()
                .await
        })
        .map(|_| ())
        .map_err(|error| sdk_error("SetSMBGuestPassword", error))
    }

    fn update_gateway_information(
        &self,
        gateway_arn: &str,
        log_group_arn: &str,
    ) -> Result<(), VendorError> {
        let client = self.client.clone();
        let gateway_arn = gateway_arn.to_string();
        let log_group_arn = log_group_arn.to_string();
        block_on(async move {
            client
                .update_gateway_information()
                .gateway_arn(gateway_arn)
                .cloud_watch_log_group_arn(log_group_arn)
                .send()
                .await
        })
        .map(|_| ())
        .map_err(|error| sdk_error("UpdateGatewayInformation", error))
    }

    fn create_smb_file_share(&self, request: &SmbFileShareRequest) -> Result<String, VendorError> {
        let client = self.client.clone();
        let request = request.clone();
        let output = block_on(async move {
            client
                .create_smb_file_share()
                .client_token(request.client_token)
                .gateway_arn(request.gateway_arn)
                .role(request.role_arn)
                .location_arn(request.location_arn)
                .authentication(request.authentication)
                .file_share_name(request.file_share_name)
                .audit_destination_arn(request.audit_destination_arn)
                .send()
                .await
        })
        .map_err(|error| sdk_error("CreateSMBFileShare", error))?;
        required_arn("CreateSMBFileShare", "FileShareARN", output.file_share_arn())
    }

    fn create_nfs_file_share(&self, request: &NfsFileShareRequest) -> Result<String, VendorError> {
        let client = self.client.clone();
        let request = request.clone();
        let output = block_on(async move {
            client
                .create_nfs_file_share()
                .client_token(request.client_token)
                .gateway_arn(request.gateway_arn)
                .role(request.role_arn)
                .location_arn(request.location_arn)
                .set_client_list(Some(request.client_list))
                .file_share_name(request.file_share_name)
                .audit_destination_arn(request.audit_destination_arn)
                .send()
                .await
        })
        .map_err(|error| sdk_error("CreateNFSFileShare", error))?;
        required_arn("CreateNFSFileShare", "FileShareARN", output.file_share_arn())
    }

    fn delete_file_share(&self, file_share_arn: &str) -> Result<String, VendorError> {
        let client = self.client.clone();
        let file_share_arn = file_share_arn.to_string();
        let output = block_on(async move {
            client
                .delete_file_share()
                .file_share_arn(file_share_arn)
                .send()
                .await
        })
        .map_err(|error| sdk_error("DeleteFileShare", error))?;
        required_arn("DeleteFileShare", "FileShareARN", output.file_share_arn())
    }

    fn delete_gateway(&self, gateway_arn: &str) -> Result<String, VendorError> {
        let client = self.client.clone();
        let gateway_arn = gateway_arn.to_string();
        let output = block_on(async move {
            client
                .delete_gateway()
                .gateway_arn(gateway_arn)
                .send()
                .await
        })
        .map_err(|error| sdk_error("DeleteGateway", error))?;
        required_arn("DeleteGateway", "GatewayARN", output.gateway_arn())
    }
}

impl SecretStore for AwsSecretsManager {
    fn get_secret_string(&self, secret_id: &str) -> Result<String, VendorError> {
        let client = self.client.clone();
        let id = secret_id.to_string();
        let output = block_on(async move { client.get_secret_value().secret_id(id).send().await })
            .map_err(|error| sdk_error("GetSecretValue", error))?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| VendorError::new("GetSecretValue", "secret has no string value"))
    }
}
