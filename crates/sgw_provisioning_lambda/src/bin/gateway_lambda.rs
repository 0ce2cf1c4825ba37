use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use sgw_provisioning_core::wait::{DiskWaitPolicy, SystemClock};
use sgw_provisioning_lambda::adapters::aws::{AwsSecretsManager, AwsStorageGateway};
use sgw_provisioning_lambda::config::disk_wait_policy_from_env;
use sgw_provisioning_lambda::handlers::dispatch::dispatch_event;
use sgw_provisioning_lambda::handlers::gateway::GatewayHandler;
use sgw_provisioning_lambda::telemetry::init_tracing;

struct RuntimeDependencies {
    gateway: AwsStorageGateway,
    secrets: AwsSecretsManager,
    wait_policy: DiskWaitPolicy,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    let handler = GatewayHandler::new(
        &deps.gateway,
        &deps.secrets,
        deps.wait_policy.clone(),
        SystemClock,
    );
    // The disk wait sleeps between attempts, so keep it off the async worker.
    let response = tokio::task::block_in_place(|| dispatch_event(event.payload, &handler))?;
    serde_json::to_value(response)
        .map_err(|error| Error::from(format!("failed to serialize handler response: {error}")))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let wait_policy = disk_wait_policy_from_env().map_err(Error::from)?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        gateway: AwsStorageGateway::new(&aws_config),
        secrets: AwsSecretsManager::new(&aws_config),
        wait_policy,
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, deps).await
    }))
    .await
}
