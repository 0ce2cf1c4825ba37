use sgw_provisioning_core::error::VendorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateGatewayRequest {
    pub activation_key: String,
    pub gateway_name: String,
    pub gateway_timezone: String,
    pub gateway_region: String,
    pub gateway_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDisk {
    pub disk_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmbFileShareRequest {
    pub client_token: String,
    pub gateway_arn: String,
    pub role_arn: String,
    pub location_arn: String,
    pub authentication: String,
    pub file_share_name: String,
    pub audit_destination_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfsFileShareRequest {
    pub client_token: String,
    pub gateway_arn: String,
    pub role_arn: String,
    pub location_arn: String,
    pub client_list: Vec<String>,
    pub file_share_name: String,
    pub audit_destination_arn: String,
}

/// Storage gateway control-plane calls used by the lifecycle handlers.
/// Calls that create or delete a resource return its ARN.
pub trait StorageGatewayApi {
    fn activate_gateway(&self, request: &ActivateGatewayRequest) -> Result<String, VendorError>;
    fn list_local_disks(&self, gateway_arn: &str) -> Result<Vec<LocalDisk>, VendorError>;
    fn add_cache(&self, gateway_arn: &str, disk_ids: &[String]) -> Result<(), VendorError>;
    fn set_smb_guest_password(&self, gateway_arn: &str, password: &str)
        -> Result<(), VendorError>;
    fn update_gateway_information(
        &self,
        gateway_arn: &str,
        log_group_arn: &str,
    ) -> Result<(), VendorError>;
    fn create_smb_file_share(&self, request: &SmbFileShareRequest) -> Result<String, VendorError>;
    fn create_nfs_file_share(&self, request: &NfsFileShareRequest) -> Result<String, VendorError>;
    fn delete_file_share(&self, file_share_arn: &str) -> Result<String, VendorError>;
    fn delete_gateway(&self, gateway_arn: &str) -> Result<String, VendorError>;
}
