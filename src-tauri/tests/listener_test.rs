//! 热键监听器集成测试

mod common;

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{settle, Fixture};
use focuskeeper_lib::hotkey::{StoreError, DEFAULT_SHORTCUT};
use focuskeeper_lib::notification::NotificationCenter;
use focuskeeper_lib::task_gate::TaskGate;
use focuskeeper_lib::trigger::{
    ErrorReporter, FocusActions, NavigationContext, RetryPolicy, ShortcutListener,
    TriggerDispatcher, TriggerRoute,
};
use focuskeeper_lib::utils::error::{ErrorCode, ErrorContext};
use tokio::sync::{mpsc, watch};

const TUTORIAL: &str = "/onboarding/tutorial";

/// 记录每次执行的假动作
struct FakeActions {
    navigation: NavigationContext,
    runs: AtomicUsize,
    fail: AtomicBool,
    delay: Duration,
    tx: mpsc::UnboundedSender<TriggerRoute>,
}

impl FakeActions {
    fn run(&self, route: TriggerRoute) -> impl Future<Output = anyhow::Result<()>> + Send + '_ {
        async move {
            self.runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            let _ = self.tx.send(route);

            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("main window not found");
            }
            Ok(())
        }
    }
}

impl FocusActions for FakeActions {
    fn route(&self) -> TriggerRoute {
        self.navigation.route()
    }

    fn complete_tutorial(&self) -> impl Future<Output = anyhow::Result<()>> + Send {
        self.run(TriggerRoute::CompleteTutorial)
    }

    fn start_or_resume_session(&self) -> impl Future<Output = anyhow::Result<()>> + Send {
        self.run(TriggerRoute::StartOrResumeSession)
    }
}

#[derive(Default)]
struct FakeReporter {
    reports: Mutex<Vec<ErrorContext>>,
}

impl FakeReporter {
    fn codes(&self) -> Vec<ErrorCode> {
        self.reports.lock().unwrap().iter().map(|c| c.code).collect()
    }
}

impl ErrorReporter for FakeReporter {
    fn report(&self, context: &ErrorContext) {
        self.reports.lock().unwrap().push(context.clone());
    }
}

struct Harness {
    fixture: Fixture,
    notifications: Arc<NotificationCenter>,
    actions: Arc<FakeActions>,
    reporter: Arc<FakeReporter>,
    dispatcher: TriggerDispatcher<FakeActions, FakeReporter>,
    routes: mpsc::UnboundedReceiver<TriggerRoute>,
}

impl Harness {
    fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    fn with_delay(delay: Duration) -> Self {
        let (tx, routes) = mpsc::unbounded_channel();
        let actions = Arc::new(FakeActions {
            navigation: NavigationContext::new(TUTORIAL),
            runs: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            delay,
            tx,
        });
        let reporter = Arc::new(FakeReporter::default());
        let dispatcher = TriggerDispatcher::new(
            Arc::new(TaskGate::new()),
            Arc::clone(&actions),
            Arc::clone(&reporter),
        );

        Self {
            fixture: Fixture::new(),
            notifications: Arc::new(NotificationCenter::new()),
            actions,
            reporter,
            dispatcher,
            routes,
        }
    }

    fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.dispatcher = self.dispatcher.with_cooldown(cooldown);
        self
    }

    async fn start(&self) -> ShortcutListener {
        ShortcutListener::start(
            &self.fixture.coordinator,
            &self.notifications,
            self.dispatcher.clone(),
        )
        .await
        .unwrap()
    }

    fn press(&self) {
        assert!(self.fixture.backend.press(DEFAULT_SHORTCUT));
    }

    async fn next_route(&mut self) -> TriggerRoute {
        tokio::time::timeout(Duration::from_secs(1), self.routes.recv())
            .await
            .expect("action did not run")
            .unwrap()
    }

    fn runs(&self) -> usize {
        self.actions.runs.load(Ordering::SeqCst)
    }
}

async fn wait_armed(rx: &mut watch::Receiver<bool>, armed: bool) {
    tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|v| *v == armed))
        .await
        .expect("armed state did not change")
        .unwrap();
}

#[tokio::test]
async fn test_press_starts_session() {
    let mut harness = Harness::new();
    let listener = harness.start().await;
    assert!(listener.armed());

    harness.press();

    assert_eq!(harness.next_route().await, TriggerRoute::StartOrResumeSession);
}

#[tokio::test]
async fn test_press_on_tutorial_completes_tutorial() {
    let mut harness = Harness::new();
    let _listener = harness.start().await;
    harness.actions.navigation.set_location(TUTORIAL);

    harness.press();

    assert_eq!(harness.next_route().await, TriggerRoute::CompleteTutorial);
}

#[tokio::test]
async fn test_notification_disarms_listener() {
    let harness = Harness::new();
    let listener = harness.start().await;
    let mut armed = listener.watch_armed();

    harness.notifications.created("break-over").await;
    wait_armed(&mut armed, false).await;

    harness.press();
    settle().await;

    assert_eq!(harness.runs(), 0);
    assert!(!listener.armed());
}

#[tokio::test]
async fn test_dismissed_notification_rearms_listener() {
    let mut harness = Harness::new();
    let listener = harness.start().await;
    let mut armed = listener.watch_armed();

    harness.notifications.created("break-over").await;
    wait_armed(&mut armed, false).await;
    harness.notifications.dismissed("break-over").await;
    wait_armed(&mut armed, true).await;

    harness.press();

    assert_eq!(harness.next_route().await, TriggerRoute::StartOrResumeSession);
    assert_eq!(harness.runs(), 1);
}

#[tokio::test]
async fn test_open_notification_before_start_keeps_listener_disarmed() {
    let mut harness = Harness::new();
    harness.notifications.created("break-over").await;

    let listener = harness.start().await;
    let mut armed = listener.watch_armed();
    assert!(!listener.armed());
    assert_eq!(harness.fixture.coordinator.press_bus().listener_count(), 0);

    harness.press();
    settle().await;
    assert_eq!(harness.runs(), 0);

    harness.notifications.dismissed("break-over").await;
    wait_armed(&mut armed, true).await;
    harness.press();

    assert_eq!(harness.next_route().await, TriggerRoute::StartOrResumeSession);
    assert_eq!(harness.runs(), 1);
}

#[tokio::test]
async fn test_dismiss_while_armed_keeps_single_subscription() {
    let harness = Harness::new();
    let listener = harness.start().await;
    let press_bus = harness.fixture.coordinator.press_bus();
    assert_eq!(press_bus.listener_count(), 1);

    harness.notifications.dismissed("unknown").await;
    harness.notifications.dismissed("unknown").await;
    settle().await;

    assert!(listener.armed());
    assert_eq!(press_bus.listener_count(), 1);
}

#[tokio::test]
async fn test_burst_of_presses_runs_action_once() {
    let harness = Harness::with_delay(Duration::from_millis(100));
    let _listener = harness.start().await;

    for _ in 0..5 {
        harness.press();
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(harness.runs(), 1);

    // 上一次结束后可以再次触发
    harness.press();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(harness.runs(), 2);
}

#[tokio::test]
async fn test_burst_of_presses_with_instant_action_runs_once() {
    let harness = Harness::new();
    let _listener = harness.start().await;

    for _ in 0..5 {
        harness.press();
    }
    settle().await;

    assert_eq!(harness.runs(), 1);
}

#[tokio::test]
async fn test_presses_within_cooldown_are_ignored() {
    let harness = Harness::new().with_cooldown(Duration::from_millis(150));
    let _listener = harness.start().await;

    harness.press();
    settle().await;
    harness.press();
    settle().await;
    harness.press();
    settle().await;
    assert_eq!(harness.runs(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    harness.press();
    settle().await;
    assert_eq!(harness.runs(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cooldown_holds_across_worker_threads() {
    let harness = Harness::new().with_cooldown(Duration::from_millis(200));
    let _listener = harness.start().await;

    for _ in 0..10 {
        harness.press();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(harness.runs(), 1);
}

#[tokio::test]
async fn test_failed_action_is_reported() {
    let mut harness = Harness::new();
    harness.actions.fail.store(true, Ordering::SeqCst);
    let _listener = harness.start().await;

    harness.press();
    harness.next_route().await;
    settle().await;

    assert_eq!(harness.reporter.codes(), vec![ErrorCode::ActionFailed]);
}

#[tokio::test]
async fn test_registration_failure_reported_but_listening() {
    let harness = Harness::new();
    harness.fixture.backend.reject(DEFAULT_SHORTCUT);

    let listener = harness.start().await;

    assert!(listener.armed());
    assert_eq!(
        harness.reporter.codes(),
        vec![ErrorCode::HotkeyRegistrationFailed]
    );
}

#[tokio::test]
async fn test_stop_disarms_listener() {
    let harness = Harness::new();
    let mut listener = harness.start().await;
    let mut armed = listener.watch_armed();

    listener.stop().await;
    wait_armed(&mut armed, false).await;

    harness.press();
    settle().await;
    assert_eq!(harness.runs(), 0);
}

#[tokio::test]
async fn test_dropping_listener_stops_it() {
    let harness = Harness::new();
    let listener = harness.start().await;
    let mut armed = listener.watch_armed();

    drop(listener);
    wait_armed(&mut armed, false).await;
}

// ============================================================================
// 启动重试
// ============================================================================

#[tokio::test]
async fn test_start_with_retry_waits_out_locked_store() {
    let harness = Harness::new();
    harness
        .fixture
        .store
        .fail_open(StoreError::Locked("database is locked".into()));

    let store = harness.fixture.store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        store.heal();
    });

    let listener = ShortcutListener::start_with_retry(
        &harness.fixture.coordinator,
        &harness.notifications,
        harness.dispatcher.clone(),
        RetryPolicy {
            attempts: 10,
            delay: Duration::from_millis(20),
        },
    )
    .await;

    assert!(listener.is_some());
    assert!(harness.fixture.store.opens() >= 2);
    assert!(harness.reporter.codes().is_empty());
}

#[tokio::test]
async fn test_start_with_retry_gives_up_quietly() {
    let harness = Harness::new();
    harness
        .fixture
        .store
        .fail_open(StoreError::Locked("database is locked".into()));

    let listener = ShortcutListener::start_with_retry(
        &harness.fixture.coordinator,
        &harness.notifications,
        harness.dispatcher.clone(),
        RetryPolicy {
            attempts: 2,
            delay: Duration::from_millis(5),
        },
    )
    .await;

    assert!(listener.is_none());
    assert_eq!(harness.fixture.store.opens(), 2);
    assert!(harness.reporter.codes().is_empty());
    assert!(!harness.fixture.coordinator.is_initialized().await);
}

#[tokio::test]
async fn test_notification_during_retry_leaves_listener_disarmed() {
    let harness = Harness::new();
    harness
        .fixture
        .store
        .fail_open(StoreError::Locked("database is locked".into()));

    let notifications = Arc::clone(&harness.notifications);
    let store = harness.fixture.store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        notifications.created("break-over").await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        store.heal();
    });

    let listener = ShortcutListener::start_with_retry(
        &harness.fixture.coordinator,
        &harness.notifications,
        harness.dispatcher.clone(),
        RetryPolicy {
            attempts: 20,
            delay: Duration::from_millis(20),
        },
    )
    .await
    .unwrap();

    assert!(!listener.armed());
    harness.press();
    settle().await;
    assert_eq!(harness.runs(), 0);
}
