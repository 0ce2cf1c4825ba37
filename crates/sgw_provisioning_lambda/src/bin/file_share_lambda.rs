use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use sgw_provisioning_lambda::adapters::aws::{AwsSecretsManager, AwsStorageGateway};
use sgw_provisioning_lambda::handlers::dispatch::dispatch_event;
use sgw_provisioning_lambda::handlers::file_share::FileShareHandler;
use sgw_provisioning_lambda::telemetry::init_tracing;

struct RuntimeDependencies {
    gateway: AwsStorageGateway,
    secrets: AwsSecretsManager,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    let handler = FileShareHandler::new(&deps.gateway, &deps.secrets);
    let response = dispatch_event(event.payload, &handler)?;
    serde_json::to_value(response)
        .map_err(|error| Error::from(format!("failed to serialize handler response: {error}")))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        gateway: AwsStorageGateway::new(&aws_config),
        secrets: AwsSecretsManager::new(&aws_config),
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, deps).await
    }))
    .await
}
