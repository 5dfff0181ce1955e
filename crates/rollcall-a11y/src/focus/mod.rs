//! Focus movement, save/restore and focus traps

pub mod manager;
pub mod trap;

pub use manager::{FocusManager, TrapOutcome, WrapPolicy};
pub use trap::{FocusTrap, TrapMonitor};
