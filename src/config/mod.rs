//! Configuration module for EchoCheckr

mod profiles;

pub use profiles::{
    ConfigBuilder, EchoConfig, PipelineSelection, ProfilePreset, DEFAULT_MAX_TRANSFORM_SIZE,
};
