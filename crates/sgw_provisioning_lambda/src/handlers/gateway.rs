//! Gateway activation lifecycle.
//!
//! Create runs `Activate -> AwaitDisks -> AttachCache -> SetGuestPassword ->
//! AttachLogGroup`. Once activation has landed, any later failure is reported
//! as a partial failure naming the step and the gateway ARN; with
//! `RollbackOnFailure` set the gateway is deleted as the compensating action.

use sgw_provisioning_core::contract::{DeleteAcknowledgment, HandlerResponse, LifecycleEvent};
use sgw_provisioning_core::error::{Compensation, ProvisioningError, ProvisioningStep};
use sgw_provisioning_core::properties::{GatewaySpec, GUEST_PASSWORD_SECRET_KEY};
use sgw_provisioning_core::wait::{DiskWaitPolicy, WaitClock};
use tracing::{error, info, warn};

use crate::adapters::secret_store::SecretStore;
use crate::adapters::storage_gateway::{ActivateGatewayRequest, StorageGatewayApi};
use crate::handlers::consistency::wait_for_local_disks;
use crate::handlers::dispatch::{pass_through_update, LifecycleHandler};
use crate::handlers::secret_resolver::resolve_secret_bundle;

const COMPONENT: &str = "gateway_handler";

pub struct GatewayHandler<'a, G, S, C> {
    gateway: &'a G,
    secrets: &'a S,
    wait_policy: DiskWaitPolicy,
    clock: C,
}

type StepFailure = (ProvisioningStep, ProvisioningError);

impl<'a, G, S, C> GatewayHandler<'a, G, S, C>
where
    G: StorageGatewayApi,
    S: SecretStore,
    C: WaitClock,
{
    pub fn new(gateway: &'a G, secrets: &'a S, wait_policy: DiskWaitPolicy, clock: C) -> Self {
        Self {
            gateway,
            secrets,
            wait_policy,
            clock,
        }
    }

    fn configure(
        &self,
        spec: &GatewaySpec,
        gateway_arn: &str,
        guest_password: &str,
        completed: &mut Vec<ProvisioningStep>,
    ) -> Result<(), StepFailure> {
        let disks = wait_for_local_disks(self.gateway, gateway_arn, &self.wait_policy, &self.clock)
            .map_err(|error| (ProvisioningStep::AwaitDisks, error))?;
        completed.push(ProvisioningStep::AwaitDisks);

        let cache_disk = disks.first().ok_or_else(|| {
            (
                ProvisioningStep::AttachCache,
                ProvisioningError::EmptyDiskInventory {
                    gateway_arn: gateway_arn.to_string(),
                },
            )
        })?;
        self.gateway
            .add_cache(gateway_arn, std::slice::from_ref(&cache_disk.disk_id))
            .map_err(|error| (ProvisioningStep::AttachCache, error.into()))?;
        info!(component = COMPONENT, gateway_arn, disk_id = %cache_disk.disk_id, "cache_attached");
        completed.push(ProvisioningStep::AttachCache);

        self.gateway
            .set_smb_guest_password(gateway_arn, guest_password)
            .map_err(|error| (ProvisioningStep::SetGuestPassword, error.into()))?;
        info!(component = COMPONENT, gateway_arn, "guest_password_set");
        completed.push(ProvisioningStep::SetGuestPassword);

        self.gateway
            .update_gateway_information(gateway_arn, &spec.log_group_arn)
            .map_err(|error| (ProvisioningStep::AttachLogGroup, error.into()))?;
        info!(
            component = COMPONENT,
            gateway_arn,
            log_group_arn = %spec.log_group_arn,
            "log_group_attached"
        );
        completed.push(ProvisioningStep::AttachLogGroup);

        Ok(())
    }

    fn compensate(&self, gateway_arn: &str, rollback: bool) -> Compensation {
        if !rollback {
            return Compensation::NotAttempted;
        }
        match self.gateway.delete_gateway(gateway_arn) {
            Ok(_) => {
                warn!(component = COMPONENT, gateway_arn, "gateway_rolled_back");
                Compensation::RolledBack
            }
            Err(failure) => {
                error!(
                    component = COMPONENT,
                    gateway_arn,
                    error = %failure,
                    "gateway_rollback_failed"
                );
                Compensation::Failed(failure)
            }
        }
    }
}

impl<G, S, C> LifecycleHandler for GatewayHandler<'_, G, S, C>
where
    G: StorageGatewayApi,
    S: SecretStore,
    C: WaitClock,
{
    fn resource_kind(&self) -> &'static str {
        COMPONENT
    }

    fn on_create(&self, event: &LifecycleEvent) -> Result<HandlerResponse, ProvisioningError> {
        let spec = GatewaySpec::from_properties(&event.properties_value())?;
        info!(
            component = COMPONENT,
            gateway_name = %spec.gateway_name,
            gateway_type = %spec.gateway_type,
            "gateway_create_started"
        );

        let secrets = resolve_secret_bundle(self.secrets, &spec.secret_id)?;
        let guest_password = secrets.value(GUEST_PASSWORD_SECRET_KEY)?;

        let gateway_arn = self.gateway.activate_gateway(&ActivateGatewayRequest {
            activation_key: spec.activation_key.clone(),
            gateway_name: spec.gateway_name.clone(),
            gateway_timezone: spec.gateway_timezone.clone(),
            gateway_region: spec.gateway_region.clone(),
            gateway_type: spec.gateway_type.clone(),
        })?;
        info!(component = COMPONENT, gateway_arn = %gateway_arn, "gateway_activated");

        let mut completed = vec![ProvisioningStep::Activate];
        match self.configure(&spec, &gateway_arn, guest_password, &mut completed) {
            Ok(()) => Ok(HandlerResponse::resource(gateway_arn)),
            Err((step, source)) => {
                error!(
                    component = COMPONENT,
                    gateway_arn = %gateway_arn,
                    step = step.as_str(),
                    error = %source,
                    "gateway_create_partially_failed"
                );
                let compensation = self.compensate(&gateway_arn, spec.rollback_on_failure);
                Err(ProvisioningError::PartialFailure {
                    step,
                    gateway_arn,
                    completed,
                    compensation,
                    source: Box::new(source),
                })
            }
        }
    }

    fn on_update(&self, event: &LifecycleEvent) -> Result<HandlerResponse, ProvisioningError> {
        pass_through_update(COMPONENT, event)
    }

    fn on_delete(&self, event: &LifecycleEvent) -> Result<HandlerResponse, ProvisioningError> {
        let gateway_arn = event.physical_resource_id()?;
        info!(component = COMPONENT, gateway_arn, "gateway_delete_requested");
        let acknowledged = self.gateway.delete_gateway(gateway_arn)?;
        Ok(HandlerResponse::Deleted(DeleteAcknowledgment::Gateway(
            acknowledged,
        )))
    }
}

#[cfg(test)]
mod tests {
    use sgw_provisioning_core::contract::LifecycleEvent;

    use super::*;
    use crate::test_helpers::{
        create_event, gateway_properties, test_secret_string, test_wait_policy, FakeSecretStore,
        FakeStorageGateway, GatewayCall, ManualClock, TEST_GATEWAY_ARN, TEST_SECRET_ID,
    };

    fn create(properties: serde_json::Value) -> LifecycleEvent {
        LifecycleEvent::from_value(create_event(properties)).expect("valid event")
    }

    fn secrets() -> FakeSecretStore {
        FakeSecretStore::new().with_secret(TEST_SECRET_ID, &test_secret_string())
    }

    #[test]
    fn create_runs_every_step_in_order() {
        let api = FakeStorageGateway::new();
        let store = secrets();
        let handler = GatewayHandler::new(&api, &store, test_wait_policy(), ManualClock::new());

        let response = handler
            .on_create(&create(gateway_properties()))
            .expect("gateway provisioned");

        assert_eq!(response, HandlerResponse::resource(TEST_GATEWAY_ARN));
        assert_eq!(
            api.operations(),
            vec![
                "ActivateGateway",
                "ListLocalDisks",
                "AddCache",
                "SetSMBGuestPassword",
                "UpdateGatewayInformation"
            ]
        );
        let calls = api.calls();
        assert_eq!(
            calls[4],
            GatewayCall::UpdateGatewayInformation {
                gateway_arn: TEST_GATEWAY_ARN.to_string(),
                log_group_arn:
                    "arn:aws:logs:us-east-1:111122223333:log-group:dev-Storage-Gateway-Log-Group"
                        .to_string(),
            }
        );
    }

    #[test]
    fn missing_guest_password_fails_before_activation() {
        let api = FakeStorageGateway::new();
        let store = FakeSecretStore::new().with_secret(TEST_SECRET_ID, r#"{"Other":"x"}"#);
        let handler = GatewayHandler::new(&api, &store, test_wait_policy(), ManualClock::new());

        let error = handler
            .on_create(&create(gateway_properties()))
            .expect_err("no guest password");

        assert!(matches!(error, ProvisioningError::MissingSecretKey { ref key, .. } if key == "GuestPassword"));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn activation_failure_is_propagated_without_partial_state() {
        let api = FakeStorageGateway::new().fail_operation("ActivateGateway", "InvalidActivationKey");
        let store = secrets();
        let handler = GatewayHandler::new(&api, &store, test_wait_policy(), ManualClock::new());

        let error = handler
            .on_create(&create(gateway_properties()))
            .expect_err("activation rejected");

        assert!(matches!(error, ProvisioningError::Vendor(ref vendor) if vendor.operation == "ActivateGateway"));
        assert_eq!(api.operations(), vec!["ActivateGateway"]);
    }

    #[test]
    fn empty_disk_inventory_is_a_partial_failure_at_attach_cache() {
        let api = FakeStorageGateway::with_disks(&[]);
        let store = secrets();
        let handler = GatewayHandler::new(&api, &store, test_wait_policy(), ManualClock::new());

        let error = handler
            .on_create(&create(gateway_properties()))
            .expect_err("no cache disk");

        match error {
            ProvisioningError::PartialFailure {
                step,
                gateway_arn,
                completed,
                compensation,
                source,
            } => {
                assert_eq!(step, ProvisioningStep::AttachCache);
                assert_eq!(gateway_arn, TEST_GATEWAY_ARN);
                assert_eq!(
                    completed,
                    vec![ProvisioningStep::Activate, ProvisioningStep::AwaitDisks]
                );
                assert_eq!(compensation, Compensation::NotAttempted);
                assert!(matches!(*source, ProvisioningError::EmptyDiskInventory { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!api.operations().contains(&"AddCache"));
    }

    #[test]
    fn rollback_deletes_the_activated_gateway() {
        let api = FakeStorageGateway::new().fail_operation("UpdateGatewayInformation", "AccessDenied");
        let store = secrets();
        let handler = GatewayHandler::new(&api, &store, test_wait_policy(), ManualClock::new());
        let mut properties = gateway_properties();
        properties["RollbackOnFailure"] = serde_json::json!("true");

        let error = handler
            .on_create(&create(properties))
            .expect_err("log group attach fails");

        assert!(matches!(
            error,
            ProvisioningError::PartialFailure {
                step: ProvisioningStep::AttachLogGroup,
                compensation: Compensation::RolledBack,
                ..
            }
        ));
        assert_eq!(
            api.calls().last(),
            Some(&GatewayCall::DeleteGateway(TEST_GATEWAY_ARN.to_string()))
        );
    }

    #[test]
    fn failed_rollback_is_reported() {
        let api = FakeStorageGateway::new()
            .fail_operation("SetSMBGuestPassword", "InternalServerError")
            .fail_operation("DeleteGateway", "InternalServerError");
        let store = secrets();
        let handler = GatewayHandler::new(&api, &store, test_wait_policy(), ManualClock::new());
        let mut properties = gateway_properties();
        properties["RollbackOnFailure"] = serde_json::json!(true);

        let error = handler
            .on_create(&create(properties))
            .expect_err("guest password fails");

        assert!(matches!(
            error,
            ProvisioningError::PartialFailure {
                step: ProvisioningStep::SetGuestPassword,
                compensation: Compensation::Failed(_),
                ..
            }
        ));
    }

    #[test]
    fn disk_wait_timeout_after_activation_rolls_back() {
        let api = FakeStorageGateway::new().fail_operation("ListLocalDisks", "still booting");
        let store = secrets();
        let clock = ManualClock::new();
        let handler = GatewayHandler::new(&api, &store, test_wait_policy(), &clock);
        let mut properties = gateway_properties();
        properties["RollbackOnFailure"] = serde_json::json!(true);

        let error = handler
            .on_create(&create(properties))
            .expect_err("disks never listed");

        match error {
            ProvisioningError::PartialFailure {
                step,
                gateway_arn,
                completed,
                compensation,
                source,
            } => {
                assert_eq!(step, ProvisioningStep::AwaitDisks);
                assert_eq!(gateway_arn, TEST_GATEWAY_ARN);
                assert_eq!(completed, vec![ProvisioningStep::Activate]);
                assert_eq!(compensation, Compensation::RolledBack);
                assert!(matches!(*source, ProvisioningError::DiskWaitTimedOut { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            api.calls().last(),
            Some(&GatewayCall::DeleteGateway(TEST_GATEWAY_ARN.to_string()))
        );
        assert!(!api.operations().contains(&"AddCache"));
    }

    #[test]
    fn delete_returns_vendor_acknowledgment() {
        let api = FakeStorageGateway::new();
        let store = secrets();
        let handler = GatewayHandler::new(&api, &store, test_wait_policy(), ManualClock::new());
        let event = LifecycleEvent::from_value(crate::test_helpers::existing_resource_event(
            "Delete",
            TEST_GATEWAY_ARN,
            gateway_properties(),
        ))
        .expect("valid event");

        let response = handler.on_delete(&event).expect("deleted");

        assert_eq!(
            response,
            HandlerResponse::Deleted(DeleteAcknowledgment::Gateway(TEST_GATEWAY_ARN.to_string()))
        );
        assert!(store.reads().is_empty());
    }
}
