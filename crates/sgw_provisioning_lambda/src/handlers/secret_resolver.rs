use sgw_provisioning_core::error::ProvisioningError;
use sgw_provisioning_core::secrets::SecretBundle;
use tracing::info;

use crate::adapters::secret_store::SecretStore;

/// Fetches and parses a secret bundle. No caching: every Create resolves the
/// secret again.
pub fn resolve_secret_bundle(
    store: &impl SecretStore,
    secret_id: &str,
) -> Result<SecretBundle, ProvisioningError> {
    let raw = store
        .get_secret_string(secret_id)
        .map_err(|source| ProvisioningError::SecretUnavailable {
            secret_id: secret_id.to_string(),
            source,
        })?;
    let bundle = SecretBundle::parse(secret_id, &raw)?;
    info!(secret_id, "secret_resolved");
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use sgw_provisioning_core::error::VendorError;

    use super::*;

    struct StaticStore(Result<String, VendorError>);

    impl SecretStore for StaticStore {
        fn get_secret_string(&self, _secret_id: &str) -> Result<String, VendorError> {
            self.0.clone()
        }
    }

    #[test]
    fn parses_the_secret_string() {
        let store = StaticStore(Ok(r#"{"GuestPassword":"p"}"#.to_string()));
        let bundle = resolve_secret_bundle(&store, "sg-credentials").expect("resolved");
        assert_eq!(bundle.value("GuestPassword").expect("present"), "p");
    }

    #[test]
    fn store_failures_are_propagated_with_the_secret_id() {
        let store = StaticStore(Err(VendorError::new(
            "GetSecretValue",
            "ResourceNotFoundException",
        )));
        let error = resolve_secret_bundle(&store, "missing").expect_err("not found");
        match error {
            ProvisioningError::SecretUnavailable { secret_id, source } => {
                assert_eq!(secret_id, "missing");
                assert_eq!(source.message, "ResourceNotFoundException");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_json_is_a_malformed_secret() {
        let store = StaticStore(Ok("{GuestPassword: p}".to_string()));
        let error = resolve_secret_bundle(&store, "sg-credentials").expect_err("bad json");
        assert!(matches!(error, ProvisioningError::MalformedSecret { .. }));
    }
}
