pub mod display;

pub use display::{ConsoleObserver, DisplayHelper, StatusType};
