//! Screen reader announcer
//!
//! One `Announcer` is created at application start with [`Announcer::init`]
//! and handed to every component that narrates state changes. Clones share
//! the same channels. There is no queue: a new announcement replaces whatever
//! its channel currently holds.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, ReentrantMutex};
use rollcall_config::AnnouncerSettings;
use tracing::{debug, trace};

use super::live_region::{AnnouncementPriority, LiveRegion, LiveRegionSink};

/// One message to narrate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementRequest {
    pub text: String,
    pub priority: AnnouncementPriority,
    pub submitted_at: Instant,
}

struct AnnouncerState {
    enabled: bool,
    disposed: bool,
    polite: LiveRegion,
    assertive: LiveRegion,
    history: VecDeque<AnnouncementRequest>,
    history_limit: usize,
    sink: Option<Arc<dyn LiveRegionSink>>,
}

impl AnnouncerState {
    fn channel_mut(&mut self, priority: AnnouncementPriority) -> &mut LiveRegion {
        match priority {
            AnnouncementPriority::Polite => &mut self.polite,
            AnnouncementPriority::Assertive => &mut self.assertive,
        }
    }
}

/// Live-region announcement service
///
/// Sink delivery is serialized across clones: mutations reach the sink in the
/// same order the channels were written, even when several threads announce
/// at once. The delivery lock is reentrant, so a sink may announce again from
/// inside `apply`.
#[derive(Clone)]
pub struct Announcer {
    state: Arc<Mutex<AnnouncerState>>,
    delivery: Arc<ReentrantMutex<()>>,
}

impl Announcer {
    /// Create the announcer and its two channels
    pub fn init(settings: &AnnouncerSettings, sink: Option<Arc<dyn LiveRegionSink>>) -> Self {
        debug!(enabled = settings.enabled, "announcer initialized");
        Self {
            state: Arc::new(Mutex::new(AnnouncerState {
                enabled: settings.enabled,
                disposed: false,
                polite: LiveRegion::new(AnnouncementPriority::Polite),
                assertive: LiveRegion::new(AnnouncementPriority::Assertive),
                history: VecDeque::new(),
                history_limit: settings.history_limit.max(1),
                sink,
            })),
            delivery: Arc::new(ReentrantMutex::new(())),
        }
    }

    /// Announce `message` on the channel matching `priority`
    pub fn announce(&self, message: impl Into<String>, priority: AnnouncementPriority) {
        let text = message.into();
        let _delivery = self.delivery.lock();
        let (sink, mutations) = {
            let mut state = self.state.lock();
            if state.disposed || !state.enabled {
                trace!(%priority, "announcement dropped");
                return;
            }

            let mutations = state.channel_mut(priority).write(&text, priority);
            if state.history.len() == state.history_limit {
                state.history.pop_front();
            }
            state.history.push_back(AnnouncementRequest {
                text: text.clone(),
                priority,
                submitted_at: Instant::now(),
            });
            (state.sink.clone(), mutations)
        };

        debug!(%priority, text = %text, "announce");
        // Applied outside the state lock so a sink may announce again
        if let Some(sink) = sink {
            for mutation in &mutations {
                sink.apply(priority, mutation);
            }
        }
    }

    /// Polite announcement, spoken when the user is idle
    pub fn announce_polite(&self, message: impl Into<String>) {
        self.announce(message, AnnouncementPriority::Polite);
    }

    /// Errors interrupt current speech
    pub fn announce_error(&self, message: impl Into<String>) {
        self.announce(message, AnnouncementPriority::Assertive);
    }

    /// Alias for [`Announcer::announce_polite`]
    pub fn announce_success(&self, message: impl Into<String>) {
        self.announce(message, AnnouncementPriority::Polite);
    }

    /// Snapshot of a channel
    pub fn channel(&self, priority: AnnouncementPriority) -> LiveRegion {
        self.state.lock().channel_mut(priority).clone()
    }

    /// Most recent accepted request
    pub fn last_announcement(&self) -> Option<AnnouncementRequest> {
        self.state.lock().history.back().cloned()
    }

    /// Accepted requests, oldest first
    pub fn history(&self) -> Vec<AnnouncementRequest> {
        self.state.lock().history.iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.state.lock().history.clear();
    }

    /// Resume announcing; has no effect after [`Announcer::dispose`]
    pub fn enable(&self) {
        self.state.lock().enabled = true;
    }

    /// Drop announcements until [`Announcer::enable`] is called
    pub fn disable(&self) {
        self.state.lock().enabled = false;
    }

    /// False while disabled or once disposed
    pub fn is_enabled(&self) -> bool {
        let state = self.state.lock();
        state.enabled && !state.disposed
    }

    /// Shut the announcer down; later announcements are dropped
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.sink = None;
        state.history.clear();
        debug!("announcer disposed");
    }

    /// True after [`Announcer::dispose`]
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }
}

impl fmt::Debug for Announcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Announcer")
            .field("enabled", &state.enabled)
            .field("disposed", &state.disposed)
            .field("polite", &state.polite)
            .field("assertive", &state.assertive)
            .field("history", &state.history.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let settings = AnnouncerSettings {
            enabled: true,
            history_limit: 2,
        };
        let announcer = Announcer::init(&settings, None);
        announcer.announce_polite("one");
        announcer.announce_polite("two");
        announcer.announce_polite("three");

        let texts: Vec<String> = announcer.history().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["two", "three"]);
    }

    #[test]
    fn test_clones_share_channels() {
        let announcer = Announcer::init(&AnnouncerSettings::default(), None);
        let other = announcer.clone();
        other.announce_error("offline");
        assert_eq!(
            announcer.channel(AnnouncementPriority::Assertive).content(),
            "offline"
        );
        assert_eq!(announcer.channel(AnnouncementPriority::Polite).content(), "");
    }

    #[test]
    fn test_disabled_drops_requests() {
        let settings = AnnouncerSettings {
            enabled: false,
            ..AnnouncerSettings::default()
        };
        let announcer = Announcer::init(&settings, None);
        announcer.announce_polite("ignored");
        assert!(announcer.last_announcement().is_none());

        announcer.enable();
        announcer.announce_polite("heard");
        assert_eq!(announcer.last_announcement().unwrap().text, "heard");
    }
}
