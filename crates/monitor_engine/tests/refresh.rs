use std::sync::{Arc, Mutex};
use std::time::Duration;

use monitor_engine::{AutoRefresh, EngineEvent, EventSink};
use tokio::runtime::Handle;

#[derive(Default)]
struct CountingSink {
    ticks: Mutex<usize>,
}

impl CountingSink {
    fn ticks(&self) -> usize {
        *self.ticks.lock().unwrap()
    }
}

impl EventSink for CountingSink {
    fn emit(&self, event: EngineEvent) {
        if event == EngineEvent::RefreshTick {
            *self.ticks.lock().unwrap() += 1;
        }
    }
}

fn refresh() -> (AutoRefresh, Arc<CountingSink>) {
    let sink = Arc::new(CountingSink::default());
    (AutoRefresh::new(sink.clone(), Handle::current()), sink)
}

#[tokio::test(start_paused = true)]
async fn ticks_once_per_interval() {
    let (mut refresh, sink) = refresh();
    assert_eq!(refresh.enable(Duration::from_secs(10)), Duration::from_secs(10));
    assert!(refresh.is_enabled());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(sink.ticks(), 0);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(sink.ticks(), 3);
}

#[tokio::test(start_paused = true)]
async fn disable_stops_ticks() {
    let (mut refresh, sink) = refresh();
    refresh.enable(Duration::from_secs(10));
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(sink.ticks(), 1);

    refresh.disable();
    assert!(!refresh.is_enabled());
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(sink.ticks(), 1);
}

#[tokio::test(start_paused = true)]
async fn re_enabling_replaces_the_previous_timer() {
    let (mut refresh, sink) = refresh();
    refresh.enable(Duration::from_secs(10));
    refresh.enable(Duration::from_secs(10));
    tokio::time::sleep(Duration::from_secs(21)).await;
    assert_eq!(sink.ticks(), 2);
}

#[tokio::test(start_paused = true)]
async fn too_short_interval_is_raised_to_minimum() {
    let (mut refresh, sink) = refresh();
    assert_eq!(refresh.enable(Duration::from_secs(1)), Duration::from_secs(5));
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(sink.ticks(), 2);
}
