/// Version-control operations infrastructure
///
/// `VcsCommands` is the seam over the external `git` tool; `LfsInvoker` builds the
/// per-repository migration steps on top of it.
pub mod git_cli;
pub mod lfs_invoker;
pub mod scm_interface;

pub use git_cli::GitCli;
pub use lfs_invoker::{InvokerError, LfsInvoker, ORIGIN_REMOTE};
pub use scm_interface::{VcsCommands, VcsError};
