//! HTTP layer: axum controllers over the review pipeline and knowledge bank.

pub(crate) mod controller;
pub(crate) mod error;
pub(crate) mod extractors;
pub(crate) mod params;
pub mod router;

pub use error::Error;

use domain::PipelineContext;
use service::config::Config;

/// Web-level state shared with every request handler: the parsed service
/// configuration plus the pipeline handles.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pipeline: PipelineContext,
}

impl AppState {
    pub fn new(config: Config, pipeline: PipelineContext) -> Self {
        Self { config, pipeline }
    }

    pub fn pipeline_ref(&self) -> &PipelineContext {
        &self.pipeline
    }
}
