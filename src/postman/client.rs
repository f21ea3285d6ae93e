use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ApiError, ExportError};
use crate::http::{ApiRequest, HttpTransport, Method};
use crate::infrastructure::logging::{BoundaryLogger, Timer};

/// Postman API client: exports collections and environments to local JSON files
pub struct PostmanClient<T> {
    transport: T,
    base_url: String,
    api_key: String,
    logger: BoundaryLogger,
}

impl<T: HttpTransport> PostmanClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>, api_key: impl Into<String>, logger: BoundaryLogger) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            logger,
        }
    }

    /// Fetch a collection by ID and write it, pretty-printed, to `output_path`
    pub fn fetch_collection(&self, collection_id: &str, output_path: &Path) -> Result<PathBuf, ExportError> {
        self.export(&format!("/collections/{}", collection_id), output_path)?;
        info!("Postman collection exported successfully to {}", output_path.display());
        Ok(output_path.to_path_buf())
    }

    /// Fetch an environment by ID and write it, pretty-printed, to `output_path`
    pub fn fetch_environment(&self, environment_id: &str, output_path: &Path) -> Result<PathBuf, ExportError> {
        self.export(&format!("/environments/{}", environment_id), output_path)?;
        info!("Postman environment exported successfully to {}", output_path.display());
        Ok(output_path.to_path_buf())
    }

    fn export(&self, path: &str, output_path: &Path) -> Result<(), ExportError> {
        let operation = format!("GET {}", path);
        let request = ApiRequest::new(Method::Get, format!("{}{}", self.base_url, path))
            .header("X-Api-Key", self.api_key.as_str());

        let timer = Timer::start();
        self.logger.external_call("PostmanClient", "Postman", &operation);

        let response = self.transport.send(&request).map_err(|e| {
            self.logger.external_error("PostmanClient", "Postman", &operation, &e);
            ApiError::Transport {
                operation: operation.clone(),
                source: e,
            }
        })?;
        self.logger
            .external_done("PostmanClient", "Postman", &operation, timer.elapsed_ms(), response.status);

        if response.status != 200 {
            self.logger
                .external_rejected("PostmanClient", "Postman", &operation, response.status, &response.body);
            return Err(ApiError::Status {
                operation,
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let document: serde_json::Value = response
            .json()
            .map_err(|source| ApiError::Decode { operation, source })?;
        let pretty = serde_json::to_string_pretty(&document).map_err(|source| ApiError::Decode {
            operation: format!("GET {}", path),
            source,
        })?;

        std::fs::write(output_path, pretty).map_err(|source| ExportError::Io {
            path: output_path.to_path_buf(),
            source,
        })
    }
}
