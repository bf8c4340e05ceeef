mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use common::{app_state, fast_settings, next_prediction, FakeCamera, FakeClassifier, Scene};
use leafwatch_lib::capture::{
    CameraError, CaptureController, CaptureError, CaptureTrigger, ControllerState,
};
use leafwatch_lib::events::{AppEvent, NoticeSeverity};
use leafwatch_lib::metrics::CaptureOutcome;
use leafwatch_lib::settings::CaptureSettings;

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn still_scene_never_submits() {
    let app = app_state().await;
    let camera = FakeCamera::new(Scene::Still);
    let classifier = FakeClassifier::instant();
    let mut controller = CaptureController::new(
        Arc::new(camera.clone()),
        classifier.clone(),
        app.clone(),
        fast_settings(2_000),
    );

    controller.start().await.unwrap();
    assert_eq!(controller.state(), ControllerState::Streaming);

    tokio::time::sleep(Duration::from_secs(21)).await;
    assert!(camera.grabs.load(Ordering::SeqCst) >= 5);
    assert_eq!(classifier.calls(), 0);
    assert!(app.history.is_empty().await);

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn motion_captures_once_and_records_history() {
    let app = app_state().await;
    let mut events = app.events.subscribe();
    let camera = FakeCamera::new(Scene::Still);
    let classifier = FakeClassifier::instant();
    let mut controller = CaptureController::new(
        Arc::new(camera.clone()),
        classifier.clone(),
        app.clone(),
        fast_settings(2_000),
    );

    controller.start().await.unwrap();
    // Readiness at t=0, reference frame at t=2, still compare at t=4.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(classifier.calls(), 0);

    camera.set_brightness(200);
    let (trigger, entry) = next_prediction(&mut events).await;
    assert_eq!(trigger, CaptureTrigger::Motion);
    assert_eq!(entry.result.label, "Tomato___Late_blight");
    assert!(entry.image_preview.starts_with("data:image/jpeg;base64,"));
    assert_eq!(classifier.last_mime().as_deref(), Some("image/jpeg"));

    // The scene is still again; nothing else is captured.
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(classifier.calls(), 1);
    assert_eq!(app.history.len().await, 1);

    controller.stop().await;
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn cooldown_spaces_automatic_captures() {
    let app = app_state().await;
    let camera = FakeCamera::new(Scene::Flicker);
    let classifier = FakeClassifier::instant();
    let mut controller = CaptureController::new(
        Arc::new(camera),
        classifier.clone(),
        app.clone(),
        fast_settings(10_000),
    );

    controller.start().await.unwrap();
    // Motion on every tick from t=4; captures at t=4, 14 and 24.
    tokio::time::sleep(Duration::from_secs(31)).await;
    controller.stop().await;

    assert_eq!(classifier.calls(), 3);
    let snapshot = app.metrics.get_snapshot().await;
    assert!(snapshot.cooldown_suppressed >= 10);
    assert_eq!(snapshot.busy_suppressed, 0);
}

#[tokio::test(start_paused = true)]
async fn in_flight_submission_blocks_new_captures() {
    let app = app_state().await;
    let mut events = app.events.subscribe();
    let gate = Arc::new(Notify::new());
    let classifier = FakeClassifier::held(gate.clone());
    let mut controller = CaptureController::new(
        Arc::new(FakeCamera::new(Scene::Flicker)),
        classifier.clone(),
        app.clone(),
        fast_settings(0),
    );

    controller.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(11)).await;

    assert_eq!(classifier.calls(), 1);
    assert_eq!(controller.state(), ControllerState::Detecting);
    assert!(app.submissions.is_busy());
    assert!(app.metrics.get_snapshot().await.busy_suppressed >= 2);
    assert!(matches!(controller.capture_now().await, Err(CaptureError::Busy)));

    gate.notify_one();
    let (trigger, _) = next_prediction(&mut events).await;
    assert_eq!(trigger, CaptureTrigger::Motion);
    settle().await;
    assert_eq!(controller.state(), ControllerState::Streaming);
    assert!(!app.submissions.is_busy());

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn manual_capture_bypasses_motion_gate() {
    let app = app_state().await;
    let mut events = app.events.subscribe();
    let classifier = FakeClassifier::instant();
    let mut controller = CaptureController::new(
        Arc::new(FakeCamera::new(Scene::Still)),
        classifier.clone(),
        app.clone(),
        fast_settings(2_000),
    );

    assert!(matches!(
        controller.capture_now().await,
        Err(CaptureError::NotStreaming)
    ));

    controller.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    controller.capture_now().await.unwrap();
    let (trigger, entry) = next_prediction(&mut events).await;
    assert_eq!(trigger, CaptureTrigger::Manual);
    assert_eq!(app.history.entries().await[0].id, entry.id);

    controller.stop().await;
    assert!(matches!(
        controller.capture_now().await,
        Err(CaptureError::NotStreaming)
    ));
}

#[tokio::test(start_paused = true)]
async fn stop_releases_camera_but_applies_in_flight_result() {
    let app = app_state().await;
    let mut events = app.events.subscribe();
    let gate = Arc::new(Notify::new());
    let camera = FakeCamera::new(Scene::Flicker);
    let classifier = FakeClassifier::held(gate.clone());
    let mut controller = CaptureController::new(
        Arc::new(camera.clone()),
        classifier.clone(),
        app.clone(),
        fast_settings(0),
    );

    controller.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(classifier.calls(), 1);

    // Stop is honored while the classifier is still pending.
    controller.stop().await;
    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(camera.closes.load(Ordering::SeqCst), 1);

    let grabs = camera.grabs.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(camera.grabs.load(Ordering::SeqCst), grabs);

    gate.notify_one();
    next_prediction(&mut events).await;
    assert_eq!(app.history.len().await, 1);
    settle().await;
    assert_eq!(controller.state(), ControllerState::Idle);

    controller.stop().await;
    assert_eq!(camera.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn teardown_discards_late_result() {
    let app = app_state().await;
    let gate = Arc::new(Notify::new());
    let camera = FakeCamera::new(Scene::Flicker);
    let classifier = FakeClassifier::held(gate.clone());
    let mut controller = CaptureController::new(
        Arc::new(camera.clone()),
        classifier.clone(),
        app.clone(),
        fast_settings(0),
    );

    controller.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(classifier.calls(), 1);

    drop(controller);
    gate.notify_one();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(app.history.is_empty().await);
    assert_eq!(camera.closes.load(Ordering::SeqCst), 1);
    let snapshot = app.metrics.get_snapshot().await;
    assert_eq!(
        snapshot.recent_captures.last().map(|c| c.outcome),
        Some(CaptureOutcome::Discarded)
    );
}

#[tokio::test(start_paused = true)]
async fn classifier_failure_is_reported_and_loop_continues() {
    let app = app_state().await;
    let mut events = app.events.subscribe();
    let classifier = FakeClassifier::instant();
    classifier.fail.store(true, Ordering::SeqCst);
    let mut controller = CaptureController::new(
        Arc::new(FakeCamera::new(Scene::Flicker)),
        classifier.clone(),
        app.clone(),
        fast_settings(0),
    );

    controller.start().await.unwrap();

    let notice = loop {
        if let AppEvent::Notice(notice) = events.recv().await.unwrap() {
            break notice;
        }
    };
    assert_eq!(notice.severity, NoticeSeverity::Transient);
    assert!(notice.message.contains("503"));

    classifier.fail.store(false, Ordering::SeqCst);
    next_prediction(&mut events).await;

    assert_eq!(app.history.len().await, 1);
    assert!(app.metrics.get_snapshot().await.failure_count >= 1);
    assert!(controller.state().is_streaming());

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn denied_camera_leaves_controller_idle() {
    let app = app_state().await;
    let mut events = app.events.subscribe();
    let mut camera = FakeCamera::new(Scene::Still);
    camera.deny = true;
    let mut controller = CaptureController::new(
        Arc::new(camera),
        FakeClassifier::instant(),
        app.clone(),
        fast_settings(2_000),
    );

    let err = controller.start().await.unwrap_err();
    assert!(matches!(
        err,
        CaptureError::Camera(CameraError::PermissionDenied)
    ));
    assert_eq!(controller.state(), ControllerState::Idle);

    let mut saw_blocking = false;
    while let Ok(event) = events.try_recv() {
        if let AppEvent::Notice(notice) = event {
            saw_blocking |= notice.severity == NoticeSeverity::Blocking;
        }
    }
    assert!(saw_blocking);
}

#[tokio::test(start_paused = true)]
async fn lost_stream_returns_to_idle_and_can_restart() {
    let app = app_state().await;
    let mut camera = FakeCamera::new(Scene::Still);
    camera.lose_after = Some(2);
    let mut controller = CaptureController::new(
        Arc::new(camera.clone()),
        FakeClassifier::instant(),
        app.clone(),
        fast_settings(2_000),
    );

    controller.start().await.unwrap();
    assert!(matches!(
        controller.start().await,
        Err(CaptureError::AlreadyStreaming)
    ));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(camera.closes.load(Ordering::SeqCst), 1);

    controller.start().await.unwrap();
    assert_eq!(camera.opens.load(Ordering::SeqCst), 2);
    assert_eq!(controller.state(), ControllerState::Streaming);
    controller.stop().await;
    assert_eq!(camera.closes.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn stream_is_kept_until_ready_and_settled() {
    let app = app_state().await;
    let mut camera = FakeCamera::new(Scene::Still);
    camera.not_ready_for = 3;
    let classifier = FakeClassifier::instant();
    let mut controller = CaptureController::new(
        Arc::new(camera.clone()),
        classifier.clone(),
        app.clone(),
        CaptureSettings {
            settle_delay_ms: 3_000,
            ..fast_settings(2_000)
        },
    );

    controller.start().await.unwrap();
    // Readiness checks fail at t=0, 2 and 4.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(camera.ready_checks.load(Ordering::SeqCst), 3);
    assert!(matches!(
        controller.capture_now().await,
        Err(CaptureError::Camera(CameraError::NotReady(_)))
    ));
    assert_eq!(camera.grabs.load(Ordering::SeqCst), 0);
    assert_eq!(camera.closes.load(Ordering::SeqCst), 0);
    assert_eq!(controller.state(), ControllerState::Streaming);

    // Ready at t=6, settling until t=9; the t=8 tick only waits.
    tokio::time::sleep(Duration::from_millis(4_500)).await;
    assert_eq!(camera.ready_checks.load(Ordering::SeqCst), 4);
    assert_eq!(camera.grabs.load(Ordering::SeqCst), 0);

    // First reference frame on the t=10 tick.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(camera.grabs.load(Ordering::SeqCst), 1);
    assert_eq!(camera.ready_checks.load(Ordering::SeqCst), 4);
    assert_eq!(classifier.calls(), 0);
    assert_eq!(camera.opens.load(Ordering::SeqCst), 1);

    controller.stop().await;
    assert_eq!(camera.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn manual_capture_works_once_stream_is_ready() {
    let app = app_state().await;
    let mut events = app.events.subscribe();
    let mut camera = FakeCamera::new(Scene::Still);
    camera.not_ready_for = 1;
    let mut controller = CaptureController::new(
        Arc::new(camera.clone()),
        FakeClassifier::instant(),
        app.clone(),
        fast_settings(2_000),
    );

    controller.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(matches!(
        controller.capture_now().await,
        Err(CaptureError::Camera(CameraError::NotReady(_)))
    ));
    assert!(app.history.is_empty().await);

    // The t=2 check succeeds.
    tokio::time::sleep(Duration::from_secs(2)).await;
    controller.capture_now().await.unwrap();
    let (trigger, _) = next_prediction(&mut events).await;
    assert_eq!(trigger, CaptureTrigger::Manual);

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn zero_tick_interval_still_releases_camera_on_stop() {
    let app = app_state().await;
    let camera = FakeCamera::new(Scene::Still);
    let mut controller = CaptureController::new(
        Arc::new(camera.clone()),
        FakeClassifier::instant(),
        app.clone(),
        CaptureSettings {
            tick_interval_ms: 0,
            ..fast_settings(2_000)
        },
    );

    controller.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(controller.state(), ControllerState::Streaming);
    assert!(camera.grabs.load(Ordering::SeqCst) >= 2);

    controller.stop().await;
    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(camera.closes.load(Ordering::SeqCst), 1);
}
