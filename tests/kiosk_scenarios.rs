//! End-to-end kiosk scenarios
//!
//! A scan surface and a modal confirmation dialog share one document, one
//! trap registry and one announcer, configured from a TOML file.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use rollcall_a11y::*;
use rollcall_config::{ConfigManager, EngineConfig};
use rollcall_scan::*;
use tokio::time;

struct Kiosk {
    doc: SharedDocument,
    surface: NodeId,
    dialog: NodeId,
    ok: NodeId,
    cancel: NodeId,
    announcer: Announcer,
    sink: Arc<RecordingSink>,
    traps: TrapMonitor,
}

impl Kiosk {
    fn new(config: &EngineConfig) -> Self {
        let mut doc = Document::new();
        let root = doc.root();
        let surface = doc.append(root, Element::text_field("بطاقة الطالب")).unwrap();
        let dialog = doc.append(root, Element::container("تأكيد")).unwrap();
        let ok = doc.append(dialog, Element::button("موافق")).unwrap();
        let cancel = doc.append(dialog, Element::button("إلغاء")).unwrap();

        let sink = Arc::new(RecordingSink::new());
        let announcer = Announcer::init(
            &config.announcer,
            Some(sink.clone() as Arc<dyn LiveRegionSink>),
        );
        Self {
            doc: SharedDocument::new(doc),
            surface,
            dialog,
            ok,
            cancel,
            announcer,
            sink,
            traps: TrapMonitor::new(),
        }
    }

    fn host(&self) -> Arc<dyn FocusHost> {
        Arc::new(self.doc.clone())
    }

    fn scanner(
        &self,
        config: &EngineConfig,
        service: Arc<dyn DomainService>,
    ) -> ScanInputController {
        ScanInputController::builder(service, self.announcer.clone(), self.host(), self.surface)
            .settings(config.scan.clone())
            .trap_monitor(&self.traps)
            .mount()
    }

    fn active(&self) -> Option<NodeId> {
        self.doc.read().active()
    }
}

#[derive(Default)]
struct SilentService {
    calls: AtomicUsize,
}

#[async_trait]
impl DomainService for SilentService {
    async fn record_scan(&self, _id: &str) -> Result<ScanReceipt, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ScanReceipt::default())
    }
}

fn load_config(toml: &str) -> EngineConfig {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(toml.as_bytes()).unwrap();
    ConfigManager::with_path(file.path())
        .with_env_prefix("ROLLCALL_KIOSK_SCENARIO")
        .load()
        .unwrap()
}

const ARABIC_CONFIG: &str = r#"
[scan]
debounce_ms = 800

[scan.messages]
too_quick = "انتظر قليلاً"
success = "تم التسجيل"

[navigation]
trap_focus = true
auto_focus_on_mount = true
"#;

#[tokio::test(start_paused = true)]
async fn test_modal_dialog_suspends_scan_focus_retention() {
    let config = load_config(ARABIC_CONFIG);
    let kiosk = Kiosk::new(&config);
    let scanner = kiosk.scanner(&config, Arc::new(SilentService::default()));
    assert_eq!(kiosk.active(), Some(kiosk.surface));

    let closed = Arc::new(AtomicBool::new(false));
    let on_escape = Arc::clone(&closed);
    let options =
        NavigationOptions::from_settings(&config.navigation).on(NavKey::Escape, move |_| {
            on_escape.store(true, Ordering::SeqCst);
        });
    let dialog = KeyboardNavigation::mount(kiosk.host(), kiosk.dialog, options, &kiosk.traps);
    assert!(dialog.is_trapping());
    assert_eq!(kiosk.active(), Some(kiosk.ok));

    // The retention poll must not pull focus out of the open dialog
    time::sleep(Duration::from_millis(500)).await;
    assert_eq!(kiosk.active(), Some(kiosk.ok));

    let mut back: KeyEvent = "Shift+Tab".parse().unwrap();
    assert_eq!(dialog.handle_key(&mut back), KeyDispatch::Handled);
    assert_eq!(kiosk.active(), Some(kiosk.cancel));
    let mut tab = KeyEvent::new(Key::Tab);
    dialog.handle_key(&mut tab);
    assert!(tab.is_default_prevented());
    assert_eq!(kiosk.active(), Some(kiosk.ok));

    let mut escape = KeyEvent::new(Key::Escape);
    assert_eq!(dialog.handle_key(&mut escape), KeyDispatch::Handled);
    assert!(closed.load(Ordering::SeqCst));
    dialog.unmount();

    assert!(!kiosk.traps.is_trapping());
    assert_eq!(kiosk.active(), Some(kiosk.surface));

    assert_eq!(scanner.submit_value("STU001").await, ScanOutcome::Accepted);
    assert_eq!(
        kiosk.sink.texts(AnnouncementPriority::Polite),
        vec!["تم التسجيل"]
    );

    time::advance(Duration::from_millis(100)).await;
    assert_eq!(
        scanner.submit_value("STU002").await,
        ScanOutcome::RejectedRateLimited
    );
    assert_eq!(
        kiosk.sink.texts(AnnouncementPriority::Assertive),
        vec!["انتظر قليلاً"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_roster_rejects_duplicate_attendance() {
    let config = EngineConfig::default();
    let kiosk = Kiosk::new(&config);
    let roster = Arc::new(InMemoryRoster::new([(
        "STU001".to_string(),
        "Lina Haddad".to_string(),
    )]));
    let scanner = kiosk.scanner(&config, roster.clone());

    assert_eq!(scanner.submit_value("STU001").await, ScanOutcome::Accepted);
    assert_eq!(scanner.display().result.as_deref(), Some("Lina Haddad"));

    time::advance(Duration::from_millis(1000)).await;
    assert_eq!(
        scanner.submit_value("STU001").await,
        ScanOutcome::Failed("Already recorded today: STU001".to_string())
    );
    assert_eq!(
        kiosk.sink.texts(AnnouncementPriority::Assertive),
        vec!["Scan error: Already recorded today: STU001"]
    );

    time::advance(Duration::from_millis(1000)).await;
    assert!(matches!(
        scanner.submit_value("STU999").await,
        ScanOutcome::Failed(_)
    ));
    assert_eq!(roster.recorded(), vec!["STU001"]);
    assert_eq!(scanner.stats().total_errors, 2);
}

proptest! {
    /// For any spacing of scanner submissions, the service is only reached
    /// when at least the debounce window has passed since the previous
    /// completed scan.
    #[test]
    fn prop_debounce_spacing(gaps in prop::collection::vec(0u64..2500, 1..12)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .start_paused(true)
            .build()
            .unwrap();

        runtime.block_on(async {
            let config = EngineConfig::default();
            let debounce = config.scan.debounce_ms;
            let kiosk = Kiosk::new(&config);
            let service = Arc::new(SilentService::default());
            let scanner = kiosk.scanner(&config, service.clone());

            let mut clock = 0u64;
            let mut last_completed: Option<u64> = None;
            for (i, gap) in gaps.iter().enumerate() {
                time::advance(Duration::from_millis(*gap)).await;
                clock += gap;

                let outcome = scanner.submit_value(format!("STU{i:03}")).await;
                let expected = match last_completed {
                    Some(last) if clock - last < debounce => ScanOutcome::RejectedRateLimited,
                    _ => ScanOutcome::Accepted,
                };
                prop_assert_eq!(&outcome, &expected);
                if outcome == ScanOutcome::Accepted {
                    last_completed = Some(clock);
                }
            }

            let stats = scanner.stats();
            prop_assert_eq!(stats.total_scans as usize, service.calls.load(Ordering::SeqCst));
            prop_assert!(!stats.is_processing);
            Ok(())
        })?;
    }
}
