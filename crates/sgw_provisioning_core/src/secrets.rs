use std::fmt;

use serde_json::{Map, Value};

use crate::error::ProvisioningError;

/// JSON credential bundle fetched from the secret store.
///
/// Values never appear in `Debug` output; only key names do.
#[derive(Clone)]
pub struct SecretBundle {
    secret_id: String,
    values: Map<String, Value>,
}

impl SecretBundle {
    pub fn parse(secret_id: &str, raw: &str) -> Result<Self, ProvisioningError> {
        let values = serde_json::from_str::<Map<String, Value>>(raw).map_err(|source| {
            ProvisioningError::MalformedSecret {
                secret_id: secret_id.to_string(),
                source,
            }
        })?;
        Ok(Self {
            secret_id: secret_id.to_string(),
            values,
        })
    }

    pub fn value(&self, key: &str) -> Result<&str, ProvisioningError> {
        match self.values.get(key) {
            Some(Value::String(text)) => Ok(text),
            Some(_) => Err(ProvisioningError::InvalidSecretValue {
                secret_id: self.secret_id.clone(),
                key: key.to_string(),
            }),
            None => Err(ProvisioningError::MissingSecretKey {
                secret_id: self.secret_id.clone(),
                key: key.to_string(),
            }),
        }
    }
}

impl fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBundle")
            .field("secret_id", &self.secret_id)
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_values() {
        let bundle = SecretBundle::parse(
            "sg-credentials",
            r#"{"GuestPassword":"p","sg-ch-CustomShareToken":"token-1"}"#,
        )
        .expect("valid bundle");

        assert_eq!(bundle.value("GuestPassword").expect("present"), "p");
        assert_eq!(
            bundle.value("sg-ch-CustomShareToken").expect("present"),
            "token-1"
        );
    }

    #[test]
    fn malformed_payload_is_reported_with_secret_id() {
        let error = SecretBundle::parse("sg-credentials", "not json").expect_err("parse error");
        assert!(
            matches!(error, ProvisioningError::MalformedSecret { ref secret_id, .. } if secret_id == "sg-credentials")
        );
    }

    #[test]
    fn non_object_payload_is_malformed() {
        let error = SecretBundle::parse("sg-credentials", r#"["p"]"#).expect_err("not an object");
        assert!(matches!(error, ProvisioningError::MalformedSecret { .. }));
    }

    #[test]
    fn missing_and_non_string_keys_are_distinguished() {
        let bundle = SecretBundle::parse("s", r#"{"Port": 445}"#).expect("valid bundle");
        assert!(matches!(
            bundle.value("GuestPassword"),
            Err(ProvisioningError::MissingSecretKey { .. })
        ));
        assert!(matches!(
            bundle.value("Port"),
            Err(ProvisioningError::InvalidSecretValue { .. })
        ));
    }

    #[test]
    fn debug_output_hides_values() {
        let bundle = SecretBundle::parse("s", r#"{"GuestPassword":"hunter2"}"#).expect("valid");
        let rendered = format!("{bundle:?}");
        assert!(rendered.contains("GuestPassword"));
        assert!(!rendered.contains("hunter2"));
    }
}
