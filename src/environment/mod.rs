//! External environment that hands out time-bounded extensions.
//!
//! The coordinator never talks to a platform directly: everything it needs
//! (request, release, revocation) goes through [`Environment`].

pub mod simulated;


pub use simulated::SimulatedPlatform;

use std::fmt;

/// Opaque identifier of one granted extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrantHandle(u64);

impl GrantHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GrantHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grant#{}", self.0)
    }
}

/// Callback the environment invokes (at most once) when it cuts an extension short.
pub type RevocationHandler = Box<dyn FnOnce() + Send + 'static>;

/// Reasons an environment refuses to hand out an extension.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    #[error("extension capability was revoked")]
    Revoked,
    #[error("extensions are not supported by the environment")]
    Unsupported,
    #[error("environment is at capacity ({capacity} outstanding extensions)")]
    AtCapacity { capacity: usize },
}

/// Environment interface for requesting extra running time.
///
/// Implementations must not invoke `on_revoked` synchronously from inside
/// `request_extension` or `release_extension`: the coordinator calls both
/// while holding its critical section and the handler re-enters it.
pub trait Environment: Send + Sync {
    /// Attempts to obtain an extension named `name`.
    fn request_extension(
        &self,
        name: &str,
        on_revoked: RevocationHandler,
    ) -> Result<GrantHandle, AcquireError>;

    /// Signals that the extension is no longer needed.
    fn release_extension(&self, handle: GrantHandle);
}
