use serde_json::Value;
use sgw_provisioning_core::contract::{HandlerResponse, LifecycleEvent, RequestType};
use sgw_provisioning_core::error::ProvisioningError;
use tracing::{error, info};

/// Create/update/delete logic for one custom resource kind.
pub trait LifecycleHandler {
    fn resource_kind(&self) -> &'static str;

    fn on_create(&self, event: &LifecycleEvent) -> Result<HandlerResponse, ProvisioningError>;

    fn on_update(&self, event: &LifecycleEvent) -> Result<HandlerResponse, ProvisioningError>;

    fn on_delete(&self, event: &LifecycleEvent) -> Result<HandlerResponse, ProvisioningError>;
}

/// Logs the raw event, then routes it by `RequestType`. An unrecognized
/// request type fails before the handler is consulted.
pub fn dispatch_event(
    payload: Value,
    handler: &impl LifecycleHandler,
) -> Result<HandlerResponse, ProvisioningError> {
    info!(
        component = handler.resource_kind(),
        event = %payload,
        "lifecycle_event_received"
    );

    let result = route(payload, handler);
    match &result {
        Ok(response) => info!(
            component = handler.resource_kind(),
            physical_resource_id = response.physical_resource_id(),
            "lifecycle_event_completed"
        ),
        Err(failure) => error!(
            component = handler.resource_kind(),
            error = %failure,
            "lifecycle_event_failed"
        ),
    }
    result
}

fn route(
    payload: Value,
    handler: &impl LifecycleHandler,
) -> Result<HandlerResponse, ProvisioningError> {
    let event = LifecycleEvent::from_value(payload)?;
    match event.request_type()? {
        RequestType::Create => handler.on_create(&event),
        RequestType::Update => {
            event.physical_resource_id()?;
            handler.on_update(&event)
        }
        RequestType::Delete => {
            event.physical_resource_id()?;
            handler.on_delete(&event)
        }
    }
}

/// Update is a pass-through: configuration is immutable after creation, so
/// the stored physical id is echoed back unchanged.
pub fn pass_through_update(
    resource_kind: &str,
    event: &LifecycleEvent,
) -> Result<HandlerResponse, ProvisioningError> {
    let physical_resource_id = event.physical_resource_id()?;
    info!(
        component = resource_kind,
        physical_resource_id,
        properties = %event.properties_value(),
        "update_ignored"
    );
    Ok(HandlerResponse::resource(physical_resource_id))
}
