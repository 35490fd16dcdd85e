//! Error Types
//!
//! Three layers of failure:
//! - [`FunctionError`]: a hook of one function under test failed; captured per trial
//! - [`DeviceError`]: the injected device could not synchronize or report memory
//! - [`SweepError`]: the run as a whole cannot proceed (missing dependency, bad options)

use thiserror::Error;

/// Failure raised by a `setup`, `mem_include` or `run` hook.
#[derive(Debug, Error)]
pub enum FunctionError {
    /// The hook reported a failure
    #[error("{0}")]
    Failed(String),

    /// The hook panicked; the payload message is preserved
    #[error("panicked: {0}")]
    Panicked(String),

    /// The hook needed a device but none was injected for this run
    #[error("no device available")]
    NoDevice,

    /// The synchronization barrier after the hook failed
    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl FunctionError {
    /// Shorthand for [`FunctionError::Failed`]
    pub fn msg(message: impl Into<String>) -> Self {
        FunctionError::Failed(message.into())
    }
}

/// Failure reported by a [`Device`](crate::Device).
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Waiting for queued work did not complete
    #[error("device synchronization failed: {0}")]
    Synchronize(String),

    /// Any other device-side failure
    #[error("device error: {0}")]
    Other(String),
}

/// Run-level failure. Always fatal when returned from the harness.
#[derive(Debug, Error)]
pub enum SweepError {
    /// A comparison library a function depends on is not installed
    #[error("function `{function}` requires `{library}`, which is not available")]
    MissingDependency {
        /// Function id
        function: String,
        /// Library name
        library: String,
    },

    /// Invalid combination of sweep, measurement and output options
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SweepError {
    /// Shorthand for [`SweepError::Configuration`]
    pub fn config(message: impl Into<String>) -> Self {
        SweepError::Configuration(message.into())
    }
}
