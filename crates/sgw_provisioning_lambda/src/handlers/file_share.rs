use sgw_provisioning_core::contract::{DeleteAcknowledgment, HandlerResponse, LifecycleEvent};
use sgw_provisioning_core::error::ProvisioningError;
use sgw_provisioning_core::properties::{FileShareSpec, SMB_GUEST_ACCESS};
use tracing::info;

use crate::adapters::secret_store::SecretStore;
use crate::adapters::storage_gateway::{
    NfsFileShareRequest, SmbFileShareRequest, StorageGatewayApi,
};
use crate::handlers::dispatch::{pass_through_update, LifecycleHandler};
use crate::handlers::secret_resolver::resolve_secret_bundle;

const COMPONENT: &str = "file_share_handler";

/// File share lifecycle: a single create call per variant, no polling.
pub struct FileShareHandler<'a, G, S> {
    gateway: &'a G,
    secrets: &'a S,
}

impl<'a, G, S> FileShareHandler<'a, G, S>
where
    G: StorageGatewayApi,
    S: SecretStore,
{
    pub fn new(gateway: &'a G, secrets: &'a S) -> Self {
        Self { gateway, secrets }
    }
}

impl<G, S> LifecycleHandler for FileShareHandler<'_, G, S>
where
    G: StorageGatewayApi,
    S: SecretStore,
{
    fn resource_kind(&self) -> &'static str {
        COMPONENT
    }

    fn on_create(&self, event: &LifecycleEvent) -> Result<HandlerResponse, ProvisioningError> {
        let spec = FileShareSpec::from_properties(&event.properties_value())?;
        let target = spec.target();
        info!(
            component = COMPONENT,
            share_type = spec.share_type(),
            gateway_arn = %target.gateway_arn,
            file_share_name = %target.file_share_name,
            "file_share_create_started"
        );

        let secrets = resolve_secret_bundle(self.secrets, &target.secret_id)?;
        let client_token = secrets.value(&target.client_token_key)?.to_string();

        let file_share_arn = match &spec {
            FileShareSpec::Smb(_) => self.gateway.create_smb_file_share(&SmbFileShareRequest {
                client_token,
                gateway_arn: target.gateway_arn.clone(),
                role_arn: target.role_arn.clone(),
                location_arn: target.location_arn.clone(),
                authentication: SMB_GUEST_ACCESS.to_string(),
                file_share_name: target.file_share_name.clone(),
                audit_destination_arn: target.audit_destination_arn.clone(),
            })?,
            FileShareSpec::Nfs(nfs) => self.gateway.create_nfs_file_share(&NfsFileShareRequest {
                client_token,
                gateway_arn: target.gateway_arn.clone(),
                role_arn: target.role_arn.clone(),
                location_arn: target.location_arn.clone(),
                client_list: nfs.client_list.clone(),
                file_share_name: target.file_share_name.clone(),
                audit_destination_arn: target.audit_destination_arn.clone(),
            })?,
        };

        info!(
            component = COMPONENT,
            file_share_arn = %file_share_arn,
            "file_share_created"
        );
        Ok(HandlerResponse::resource(file_share_arn))
    }

    fn on_update(&self, event: &LifecycleEvent) -> Result<HandlerResponse, ProvisioningError> {
        pass_through_update(COMPONENT, event)
    }

    fn on_delete(&self, event: &LifecycleEvent) -> Result<HandlerResponse, ProvisioningError> {
        let file_share_arn = event.physical_resource_id()?;
        info!(component = COMPONENT, file_share_arn, "file_share_delete_requested");
        let acknowledged = self.gateway.delete_file_share(file_share_arn)?;
        Ok(HandlerResponse::Deleted(DeleteAcknowledgment::FileShare(
            acknowledged,
        )))
    }
}
