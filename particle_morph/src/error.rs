//! Error types.  None of these is fatal to the render loop.

use thiserror::Error;

/// A hand detector could not be brought up or lost its device.
///
/// The cloud keeps animating with a neutral interaction factor when this
/// happens; callers only need to report it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("hand model failed to load: {0}")]
    ModelLoad(String),

    #[error("tracking device error: {0}")]
    Device(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid colour {0:?}: expected #rrggbb or #rgb")]
    InvalidHex(String),
}
