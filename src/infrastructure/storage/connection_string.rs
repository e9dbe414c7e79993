use object_store::azure::{AzureConfigKey, MicrosoftAzureBuilder};

use crate::application::ports::StorageError;

const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Parsed Azure storage connection string (`Key=Value;Key=Value;...`)
#[derive(Clone, Default)]
pub struct StorageConnectionString {
    account_name: Option<String>,
    account_key: Option<String>,
    blob_endpoint: Option<String>,
    protocol: Option<String>,
    endpoint_suffix: Option<String>,
    sas_token: Option<String>,
    use_development_storage: bool,
}

impl StorageConnectionString {
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let mut parsed = Self::default();

        for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            // Account keys are base64 and may end in '=', so split on the first one only
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                StorageError::Misconfigured(format!(
                    "connection string segment '{}' is not Key=Value",
                    redact_segment(pair)
                ))
            })?;
            let value = value.trim().to_string();

            match key.trim().to_ascii_lowercase().as_str() {
                "accountname" => parsed.account_name = Some(value),
                "accountkey" => parsed.account_key = Some(value),
                "blobendpoint" => parsed.blob_endpoint = Some(value.trim_end_matches('/').to_string()),
                "defaultendpointsprotocol" => parsed.protocol = Some(value),
                "endpointsuffix" => parsed.endpoint_suffix = Some(value),
                "sharedaccesssignature" => {
                    parsed.sas_token = Some(value.trim_start_matches('?').to_string())
                }
                "usedevelopmentstorage" => {
                    parsed.use_development_storage = value.eq_ignore_ascii_case("true")
                }
                // Queue/table/file endpoints are irrelevant to blob reads
                _ => {}
            }
        }

        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), StorageError> {
        if self.use_development_storage {
            return Ok(());
        }

        if self.account_name.is_none() {
            return Err(StorageError::Misconfigured(
                "connection string has no AccountName".to_string(),
            ));
        }

        if self.account_key.is_none() && self.sas_token.is_none() {
            return Err(StorageError::Misconfigured(
                "connection string has neither AccountKey nor SharedAccessSignature".to_string(),
            ));
        }

        Ok(())
    }

    /// Account-level blob endpoint, e.g. `https://acct.blob.core.windows.net`
    pub fn blob_endpoint(&self) -> Option<String> {
        if let Some(endpoint) = &self.blob_endpoint {
            return Some(endpoint.clone());
        }

        self.account_name.as_ref().map(|account| {
            format!(
                "{}://{}.blob.{}",
                self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL),
                account,
                self.endpoint_suffix
                    .as_deref()
                    .unwrap_or(DEFAULT_ENDPOINT_SUFFIX)
            )
        })
    }

    /// Client builder scoped to a single container
    pub fn builder_for(&self, container: &str) -> MicrosoftAzureBuilder {
        let builder = MicrosoftAzureBuilder::new().with_container_name(container);

        if self.use_development_storage {
            return builder.with_use_emulator(true);
        }

        let mut builder = builder;
        if let Some(account) = &self.account_name {
            builder = builder.with_account(account);
        }
        if let Some(key) = &self.account_key {
            builder = builder.with_access_key(key);
        }
        if let Some(sas) = &self.sas_token {
            builder = builder.with_config(AzureConfigKey::SasKey, sas);
        }
        if let Some(endpoint) = self.blob_endpoint() {
            builder = builder
                .with_allow_http(endpoint.starts_with("http://"))
                .with_endpoint(endpoint);
        }

        builder
    }
}

impl std::fmt::Debug for StorageConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConnectionString")
            .field("account_name", &self.account_name)
            .field("account_key", &self.account_key.as_ref().map(|_| "<redacted>"))
            .field("blob_endpoint", &self.blob_endpoint)
            .field("sas_token", &self.sas_token.as_ref().map(|_| "<redacted>"))
            .field("use_development_storage", &self.use_development_storage)
            .finish()
    }
}

fn redact_segment(segment: &str) -> String {
    segment.chars().take(16).collect::<String>() + "..."
}
