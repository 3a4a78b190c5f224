// Copyright @yucwang 2026

use std::fmt;

#[derive(Debug)]
pub enum RenderEngineError {
    UnsupportedConfiguration(String),
    IncompatibleSampler { engine: String, sampler: String },
    RenderStateTypeMismatch { expected: String, found: String },
    UnknownEngineType(String),
    InvalidProperty { name: String, reason: String },
    MissingProperty(String),
    FilmAlreadyInitialized,
    FilmNotInitialized,
    EngineAlreadyStarted,
    ScreenBufferBusy,
    Io(std::io::Error),
    Serialization(String),
    Image(String),
}

impl fmt::Display for RenderEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderEngineError::UnsupportedConfiguration(msg) => write!(f, "unsupported configuration: {}", msg),
            RenderEngineError::IncompatibleSampler { engine, sampler } => {
                write!(f, "{} render engine can not use {} sampler", engine, sampler)
            }
            RenderEngineError::RenderStateTypeMismatch { expected, found } => {
                write!(f, "wrong render state type: expected {}, found {}", expected, found)
            }
            RenderEngineError::UnknownEngineType(tag) => write!(f, "unknown render engine type: {}", tag),
            RenderEngineError::InvalidProperty { name, reason } => write!(f, "invalid property {}: {}", name, reason),
            RenderEngineError::MissingProperty(name) => write!(f, "missing property: {}", name),
            RenderEngineError::FilmAlreadyInitialized => write!(f, "film has already been initialized"),
            RenderEngineError::FilmNotInitialized => write!(f, "film must be initialized before starting the engine"),
            RenderEngineError::EngineAlreadyStarted => write!(f, "render engine is already started"),
            RenderEngineError::ScreenBufferBusy => {
                write!(f, "screen buffer can not be updated while rendering without overlapped updates")
            }
            RenderEngineError::Io(err) => write!(f, "io error: {}", err),
            RenderEngineError::Serialization(msg) => write!(f, "serialization error: {}", msg),
            RenderEngineError::Image(msg) => write!(f, "image error: {}", msg),
        }
    }
}

impl std::error::Error for RenderEngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderEngineError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RenderEngineError {
    fn from(err: std::io::Error) -> Self {
        RenderEngineError::Io(err)
    }
}

impl From<serde_json::Error> for RenderEngineError {
    fn from(err: serde_json::Error) -> Self {
        RenderEngineError::Serialization(err.to_string())
    }
}

impl From<exr::error::Error> for RenderEngineError {
    fn from(err: exr::error::Error) -> Self {
        RenderEngineError::Image(err.to_string())
    }
}

impl From<image::ImageError> for RenderEngineError {
    fn from(err: image::ImageError) -> Self {
        RenderEngineError::Image(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RenderEngineError>;
