use sgw_provisioning_core::error::VendorError;

pub trait SecretStore {
    fn get_secret_string(&self, secret_id: &str) -> Result<String, VendorError>;
}
