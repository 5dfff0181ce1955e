//! Scan input controller
//!
//! [`ScanInputController`] owns one scan surface. Submissions are admitted by
//! the scan session, accepted ids are handed to the [`DomainService`],
//! and every outcome is narrated through the shared [`Announcer`].
//!
//! Three timers keep the surface focus-sticky:
//! - a retention poll every `focus_check_ms`
//! - an auto-refocus `auto_clear_ms` after each successful scan
//! - a blur refocus one scheduler yield after the surface loses focus
//!
//! All of them stop when the controller is unmounted or its last handle is
//! dropped. None of them act while a focus trap is active.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use rollcall_a11y::{Announcer, FocusHost, Key, KeyEvent, NodeId, TrapMonitor};
use rollcall_config::ScanSettings;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::service::{DomainService, ScanReceipt};
use crate::session::{Admission, ScanDisplay, ScanOutcome, ScanSession, ScanStats};

/// What the timers need to put focus back on the surface
///
/// Timer tasks hold this instead of the controller so that dropping the last
/// controller handle still tears everything down.
#[derive(Clone)]
struct Refocuser {
    host: Arc<dyn FocusHost>,
    surface: NodeId,
    traps: TrapMonitor,
    token: CancellationToken,
}

impl Refocuser {
    fn refocus(&self, reason: &'static str) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        if self.traps.is_trapping() {
            debug!(reason, "refocus suspended by focus trap");
            return false;
        }
        if self.host.active() == Some(self.surface) {
            return false;
        }

        let focused = self.host.focus(self.surface);
        debug!(reason, focused, "scan surface refocused");
        focused
    }
}

#[derive(Default)]
struct ControllerState {
    session: ScanSession,
    input: String,
    display: ScanDisplay,
    retention: Option<JoinHandle<()>>,
    auto_refocus: Option<JoinHandle<()>>,
    blur_refocus: Option<JoinHandle<()>>,
}

impl ControllerState {
    fn abort_timers(&mut self) {
        for handle in [
            self.retention.take(),
            self.auto_refocus.take(),
            self.blur_refocus.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}

struct Shared {
    service: Arc<dyn DomainService>,
    announcer: Announcer,
    refocuser: Refocuser,
    settings: ScanSettings,
    state: Mutex<ControllerState>,
}

impl Shared {
    fn teardown(&self) {
        self.refocuser.token.cancel();
        self.state.lock().abort_timers();
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Clears the processing flag when the service call ends, however it ends
struct ProcessingGuard<'a> {
    state: &'a Mutex<ControllerState>,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().session.complete(Instant::now());
    }
}

/// Builds and mounts a [`ScanInputController`]
pub struct ScanControllerBuilder {
    service: Arc<dyn DomainService>,
    announcer: Announcer,
    host: Arc<dyn FocusHost>,
    surface: NodeId,
    settings: ScanSettings,
    traps: TrapMonitor,
}

impl ScanControllerBuilder {
    /// Builder for a controller over `surface`, with default settings
    pub fn new(
        service: Arc<dyn DomainService>,
        announcer: Announcer,
        host: Arc<dyn FocusHost>,
        surface: NodeId,
    ) -> Self {
        Self {
            service,
            announcer,
            host,
            surface,
            settings: ScanSettings::default(),
            traps: TrapMonitor::new(),
        }
    }

    /// Replace the timing settings and messages
    pub fn settings(mut self, settings: ScanSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Share the trap registry used by modal dialogs on the same host
    pub fn trap_monitor(mut self, traps: &TrapMonitor) -> Self {
        self.traps = traps.clone();
        self
    }

    /// Focus the surface and start the retention poll
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(self) -> ScanInputController {
        let refocuser = Refocuser {
            host: self.host,
            surface: self.surface,
            traps: self.traps,
            token: CancellationToken::new(),
        };
        refocuser.refocus("mount");

        let period = Duration::from_millis(self.settings.focus_check_ms.max(1));
        let retention = spawn_retention(refocuser.clone(), period);
        debug!(
            surface = self.surface.raw(),
            focus_check_ms = period.as_millis() as u64,
            "scan surface mounted"
        );

        ScanInputController {
            shared: Arc::new(Shared {
                service: self.service,
                announcer: self.announcer,
                refocuser,
                settings: self.settings,
                state: Mutex::new(ControllerState {
                    retention: Some(retention),
                    ..ControllerState::default()
                }),
            }),
        }
    }
}

fn spawn_retention(refocuser: Refocuser, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = refocuser.token.cancelled() => break,
                _ = ticker.tick() => {
                    refocuser.refocus("retention");
                }
            }
        }
        debug!("focus retention stopped");
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "domain service panicked".to_string()
    }
}

/// Handle to a mounted scan surface
///
/// Clones share the same session. Dropping the last clone unmounts.
#[derive(Clone)]
pub struct ScanInputController {
    shared: Arc<Shared>,
}

impl ScanInputController {
    /// Start configuring a controller, see [`ScanControllerBuilder`]
    pub fn builder(
        service: Arc<dyn DomainService>,
        announcer: Announcer,
        host: Arc<dyn FocusHost>,
        surface: NodeId,
    ) -> ScanControllerBuilder {
        ScanControllerBuilder::new(service, announcer, host, surface)
    }

    pub fn surface(&self) -> NodeId {
        self.shared.refocuser.surface
    }

    /// Text currently in the input buffer
    pub fn value(&self) -> String {
        self.shared.state.lock().input.clone()
    }

    /// Replace the buffer, as a paste or a test fixture would
    pub fn set_value(&self, value: impl Into<String>) {
        self.shared.state.lock().input = value.into();
    }

    pub fn push_char(&self, c: char) {
        self.shared.state.lock().input.push(c);
    }

    /// Remove and return the last typed character
    pub fn pop_char(&self) -> Option<char> {
        self.shared.state.lock().input.pop()
    }

    pub fn clear(&self) {
        self.shared.state.lock().input.clear();
    }

    /// Result and error lines currently shown
    pub fn display(&self) -> ScanDisplay {
        self.shared.state.lock().display.clone()
    }

    /// Show a result supplied by the caller and announce it politely
    pub fn show_result(&self, text: impl Into<String>) {
        let text = text.into();
        self.shared.state.lock().display = ScanDisplay {
            result: Some(text.clone()),
            error: None,
        };
        self.shared.announcer.announce_success(text);
    }

    /// Show an error supplied by the caller and announce it assertively
    pub fn show_error(&self, text: impl Into<String>) {
        let text = text.into();
        self.shared.state.lock().display = ScanDisplay {
            result: None,
            error: Some(text.clone()),
        };
        self.shared.announcer.announce_error(text);
    }

    /// Counters at the current instant
    pub fn stats(&self) -> ScanStats {
        self.shared.state.lock().session.stats(Instant::now())
    }

    /// False after [`ScanInputController::unmount`]
    pub fn is_mounted(&self) -> bool {
        !self.shared.refocuser.token.is_cancelled()
    }

    /// Feed one key from the scan surface
    ///
    /// Printable characters and Backspace edit the input, Enter submits.
    /// Returns the outcome when the key submitted a scan.
    pub async fn handle_key(&self, event: &mut KeyEvent) -> Option<ScanOutcome> {
        if event.is_default_prevented() || event.is_shortcut() {
            return None;
        }
        match event.key {
            Key::Char(c) => {
                self.push_char(c);
                None
            }
            Key::Backspace => {
                self.pop_char();
                None
            }
            Key::Enter => {
                event.prevent_default();
                Some(self.submit().await)
            }
            _ => None,
        }
    }

    /// Set the input and submit it, as a scanner does when it ends with Enter
    pub async fn submit_value(&self, value: impl Into<String>) -> ScanOutcome {
        self.set_value(value);
        self.submit().await
    }

    /// Submit the current input
    ///
    /// Never fails: rejections and domain failures are reported through the
    /// returned outcome and the announcer.
    pub async fn submit(&self) -> ScanOutcome {
        let shared = &*self.shared;
        if !self.is_mounted() {
            return ScanOutcome::Detached;
        }

        let debounce = Duration::from_millis(shared.settings.debounce_ms);
        let admission = {
            let mut state = shared.state.lock();
            let value = state.input.clone();
            state.session.admit(&value, Instant::now(), debounce)
        };

        let id = match admission {
            Admission::Ignored => return ScanOutcome::Ignored,
            Admission::RejectedConcurrent => {
                debug!("scan rejected while another is in flight");
                shared
                    .announcer
                    .announce_error(shared.settings.messages.in_progress.clone());
                return ScanOutcome::RejectedConcurrent;
            }
            Admission::RejectedRateLimited => {
                debug!(debounce_ms = shared.settings.debounce_ms, "scan rejected by debounce");
                shared
                    .announcer
                    .announce_error(shared.settings.messages.too_quick.clone());
                return ScanOutcome::RejectedRateLimited;
            }
            Admission::Accepted(id) => id,
        };

        info!(%id, "scan accepted");
        let result = {
            let _guard = ProcessingGuard {
                state: &shared.state,
            };
            AssertUnwindSafe(shared.service.record_scan(&id))
                .catch_unwind()
                .await
        };

        let result: Result<ScanReceipt, String> = match result {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(err)) => Err(err.to_string()),
            Err(payload) => Err(panic_message(&*payload)),
        };

        if result.is_err() {
            shared.state.lock().session.record_error();
        }

        if !self.is_mounted() {
            debug!(%id, "scan finished after unmount");
            return ScanOutcome::Detached;
        }

        match result {
            Ok(receipt) => {
                let message = receipt
                    .message
                    .unwrap_or_else(|| shared.settings.messages.success.clone());
                {
                    let mut state = shared.state.lock();
                    state.input.clear();
                    state.display = ScanDisplay {
                        result: Some(message.clone()),
                        error: None,
                    };
                }
                shared.announcer.announce_success(message);
                self.arm_auto_refocus();
                ScanOutcome::Accepted
            }
            Err(err) => {
                warn!(%id, error = %err, "scan failed");
                let text = format!("{}: {}", shared.settings.messages.error, err);
                {
                    let mut state = shared.state.lock();
                    state.input.clear();
                    state.display = ScanDisplay {
                        result: None,
                        error: Some(text.clone()),
                    };
                }
                shared.announcer.announce_error(text);
                ScanOutcome::Failed(err)
            }
        }
    }

    /// The surface lost focus; take it back on the next scheduler turn
    pub fn on_blur(&self) {
        if !self.is_mounted() {
            return;
        }
        let refocuser = self.shared.refocuser.clone();
        let handle = tokio::spawn(async move {
            tokio::task::yield_now().await;
            refocuser.refocus("blur");
        });
        if let Some(previous) = self.shared.state.lock().blur_refocus.replace(handle) {
            previous.abort();
        }
    }

    fn arm_auto_refocus(&self) {
        let refocuser = self.shared.refocuser.clone();
        let delay = Duration::from_millis(self.shared.settings.auto_clear_ms);
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = refocuser.token.cancelled() => {}
                _ = time::sleep(delay) => {
                    refocuser.refocus("auto-clear");
                }
            }
        });
        debug!(auto_clear_ms = delay.as_millis() as u64, "auto-refocus armed");
        if let Some(previous) = self.shared.state.lock().auto_refocus.replace(handle) {
            previous.abort();
        }
    }

    /// Stop every timer; later completions are ignored
    pub fn unmount(&self) {
        if self.is_mounted() {
            debug!(surface = self.surface().raw(), "scan surface unmounted");
        }
        self.shared.teardown();
    }
}

impl fmt::Debug for ScanInputController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("ScanInputController")
            .field("surface", &self.shared.refocuser.surface)
            .field("input", &state.input)
            .field("processing", &state.session.is_processing())
            .field("mounted", &!self.shared.refocuser.token.is_cancelled())
            .finish()
    }
}
