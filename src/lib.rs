// Library exports for cursor-forge

pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod pipeline;
pub mod pipeline_worker;
pub mod report;

pub use config::Config;
pub use pipeline_worker::{BuildOutcome, PipelineWorker};
