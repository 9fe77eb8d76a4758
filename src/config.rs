//! Batch configuration.
//!
//! There is no config file: every setting comes from the command line and
//! lives only for one run. [`BatchConfig`] is the validated bundle the batch
//! worker reads from.
//!
//! ## Settings
//!
//! ```text
//! request       scale factor (0.1..=3.0) or target preset (e.g. 1024x1024)
//! jpeg_quality  95      JPEG re-encode quality; other formats use defaults
//! filter        lanczos3
//! ```

use crate::imaging::{Filter, Quality, RequestError, ResizeRequest, TargetBox};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Read-only settings shared by every file in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchConfig {
    pub request: ResizeRequest,
    pub jpeg_quality: Quality,
    pub filter: Filter,
}

impl BatchConfig {
    pub fn new(request: ResizeRequest) -> Self {
        Self {
            request,
            jpeg_quality: Quality::default(),
            filter: Filter::default(),
        }
    }

    /// Build from the two mutually exclusive command-line flags.
    ///
    /// Target sizes must be one of the presets.
    pub fn from_flags(scale: Option<f64>, target: Option<&str>) -> Result<Self, ConfigError> {
        let request = match (scale, target) {
            (Some(f), None) => ResizeRequest::scale(f)?,
            (None, Some(t)) => ResizeRequest::TargetBox(TargetBox::preset(t)?),
            (Some(_), Some(_)) => {
                return Err(ConfigError::Validation(
                    "choose either a scale factor or a target size, not both".into(),
                ));
            }
            (None, None) => {
                return Err(ConfigError::Validation(
                    "a scale factor or a target size is required".into(),
                ));
            }
        };
        let config = Self::new(request);
        config.validate()?;
        Ok(config)
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Validate that the request is one the shell offers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.request {
            ResizeRequest::TargetBox(target) if !target.is_preset() => Err(
                ConfigError::Validation(format!("target size {target} is not a preset")),
            ),
            _ => Ok(()),
        }
    }
}
