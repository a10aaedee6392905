pub mod clone_locator;
pub mod credential;
pub mod host_target;

pub use clone_locator::{AuthenticatedLocator, CloneLocator, CloneLocatorError};
pub use credential::{Credential, REDACTION_MASK};
pub use host_target::{HostTarget, DEFAULT_HOST};
