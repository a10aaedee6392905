/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - Version-control operations through the `git` executable
/// - Input file loading
/// - Process execution
pub mod filesystem;
pub mod process;
pub mod scm;

pub use filesystem::{RecordStore, RecordStoreError};
pub use process::CommandExecutor;
pub use scm::{GitCli, InvokerError, LfsInvoker, VcsCommands, VcsError};
