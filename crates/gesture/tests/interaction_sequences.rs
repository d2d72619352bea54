//! End-to-end input sequences through the public API.

use std::sync::Arc;
use std::time::Duration;
use userscript_events::{listener, EventRecorder};
use userscript_gesture::{
    Gesture, GestureConfig, GestureDetected, GestureKind, GestureRecognizer, Phase,
    PointerSample, RawInput, TokioScheduler,
};

fn recognizer(config: GestureConfig) -> GestureRecognizer {
    let scheduler = Arc::new(TokioScheduler::current().expect("tokio runtime"));
    GestureRecognizer::new(config, scheduler)
}

fn finger(phase: Phase, x: f64, y: f64) -> RawInput {
    RawInput::touch(phase, vec![PointerSample::new(x, y, 7)])
}

#[tokio::test(start_paused = true)]
async fn test_swipe_then_release_does_not_tap_twice() {
    let recognizer = recognizer(GestureConfig::default());
    let recorder = EventRecorder::new();
    recorder.attach::<_, GestureDetected>(recognizer.events());

    recognizer.handle(&finger(Phase::Start, 0.0, 0.0));
    recognizer.handle(&finger(Phase::Move, 80.0, 0.0));
    recognizer.handle(&RawInput::touch(Phase::End, Vec::new()));
    tokio::time::sleep(Duration::from_millis(400)).await;

    let kinds: Vec<GestureKind> = recorder.events().iter().map(Gesture::kind).collect();
    // The delayed single-tap confirmation still fires for the start.
    assert_eq!(kinds, vec![GestureKind::Swipe, GestureKind::Tap]);
}

#[tokio::test(start_paused = true)]
async fn test_custom_thresholds() {
    let recognizer = recognizer(GestureConfig {
        swipe_threshold: 10.0,
        tap_window_ms: 100,
    });
    let recorder = EventRecorder::new();
    recorder.attach::<_, GestureDetected>(recognizer.events());

    recognizer.handle(&finger(Phase::Start, 0.0, 0.0));
    recognizer.handle(&finger(Phase::Move, 0.0, 10.0));
    tokio::time::sleep(Duration::from_millis(50)).await;
    recognizer.handle(&finger(Phase::Start, 0.0, 0.0));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let kinds: Vec<GestureKind> = recorder.events().iter().map(Gesture::kind).collect();
    assert_eq!(
        kinds,
        vec![GestureKind::Swipe, GestureKind::Tap, GestureKind::Tap]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failing_consumer_does_not_break_recognition() {
    let recognizer = recognizer(GestureConfig::default());
    recognizer
        .events()
        .on::<GestureDetected>(listener(|_: &Gesture| panic!("consumer bug")));
    let recorder = EventRecorder::new();
    recorder.attach::<_, GestureDetected>(recognizer.events());

    recognizer.handle(&RawInput::GestureStart(PointerSample::new(1.0, 2.0, 0)));
    recognizer.handle(&RawInput::GestureStart(PointerSample::new(3.0, 4.0, 0)));

    assert_eq!(recorder.len(), 2);
}
