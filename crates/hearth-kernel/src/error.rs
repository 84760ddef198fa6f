//! Kernel-specific error types.

use hearth_types::error::HearthError;
use thiserror::Error;

/// Kernel error type wrapping HearthError with boot-time context.
#[derive(Error, Debug)]
pub enum KernelError {
    /// A wrapped HearthError.
    #[error(transparent)]
    Hearth(#[from] HearthError),

    /// The session failed to boot.
    #[error("Boot failed: {0}")]
    BootFailed(String),
}

/// Alias for kernel results.
pub type KernelResult<T> = Result<T, KernelError>;
