//! Scan input controller
//!
//! Drives a single input stream, typed by hand or emitted by a barcode/QR
//! scanner acting as a keyboard, against the domain service that records the
//! scan. The controller:
//! - ignores blank submissions
//! - rejects submissions while a scan is in flight or inside the debounce window
//! - keeps keyboard focus on the scan surface
//! - narrates every outcome through the [`Announcer`](rollcall_a11y::Announcer)

pub mod controller;
pub mod error;
pub mod service;
pub mod session;

pub use controller::{ScanControllerBuilder, ScanInputController};
pub use error::DomainError;
pub use service::{DomainService, InMemoryRoster, ScanReceipt};
pub use session::{Admission, ScanDisplay, ScanOutcome, ScanStats};
