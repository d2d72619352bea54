use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use userscript_dom::{DomError, DomHost, DomWriter, ElementWatcher, MemoryDom, NodeRef, ObserverId};

fn setup() -> (Arc<MemoryDom>, ElementWatcher<MemoryDom>) {
    let dom = Arc::new(MemoryDom::new());
    let watcher = ElementWatcher::new(Arc::clone(&dom));
    (dom, watcher)
}

fn element(dom: &MemoryDom, tag: &str, id: &str) -> NodeRef {
    let node = dom.create_element(tag);
    dom.set_attribute(&node, "id", id);
    node
}

/// Append `node` to the body after `delay`.
fn insert_later(dom: &Arc<MemoryDom>, node: NodeRef, delay: Duration) {
    let dom = Arc::clone(dom);
    tokio::spawn(async move {
        sleep(delay).await;
        let body = dom.body().unwrap();
        dom.append_child(&body, &node);
    });
}

#[tokio::test(start_paused = true)]
async fn test_present_element_resolves_without_subscription() {
    let (dom, watcher) = setup();
    let target = element(&dom, "div", "ready");
    dom.append_child(&dom.body().unwrap(), &target);

    let started = tokio::time::Instant::now();
    let found = watcher
        .watch("#ready", None, Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(found, target);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(dom.deliveries(), 0);
    assert_eq!(dom.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_element_appearing_later_resolves() {
    let (dom, watcher) = setup();
    let target = element(&dom, "div", "late");
    insert_later(&dom, target, Duration::from_millis(200));

    let found = watcher
        .watch("div#late", None, Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(found, target);
    assert_eq!(dom.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_descendant_of_inserted_node_resolves() {
    let (dom, watcher) = setup();
    let wrapper = dom.create_element("section");
    let nested = element(&dom, "button", "go");
    dom.append_child(&wrapper, &nested);
    insert_later(&dom, wrapper, Duration::from_millis(50));

    let found = watcher
        .watch("section #go", None, Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(found, nested);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_tears_down_subscription() {
    let (dom, watcher) = setup();

    let err = watcher
        .watch("#missing", None, Duration::from_millis(500))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DomError::Timeout {
            selector: "#missing".into(),
            timeout_ms: 500
        }
    );
    assert_eq!(err.to_string(), "element \"#missing\" not found within 500ms");
    assert_eq!(dom.observer_count(), 0);

    // A late match reaches nobody.
    let late = element(&dom, "div", "missing");
    dom.append_child(&dom.body().unwrap(), &late);
    assert_eq!(dom.deliveries(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_match_then_elapsed_timeout_is_inert() {
    let (dom, watcher) = setup();
    let target = element(&dom, "p", "first");
    insert_later(&dom, target, Duration::from_millis(10));

    let found = watcher
        .watch("#first", None, Duration::from_millis(100))
        .await
        .unwrap();
    assert_eq!(found, target);

    sleep(Duration::from_millis(200)).await;
    let other = element(&dom, "p", "first");
    dom.append_child(&dom.body().unwrap(), &other);

    assert_eq!(dom.observer_count(), 0);
    assert_eq!(dom.deliveries(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_text_insertions_are_ignored() {
    let (dom, watcher) = setup();
    let body = dom.body().unwrap();
    let text = dom.create_text("loading");
    let paragraph = dom.create_element("p");

    let inserter = {
        let dom = Arc::clone(&dom);
        tokio::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            dom.append_child(&body, &text);
            sleep(Duration::from_millis(10)).await;
            dom.append_child(&body, &paragraph);
        })
    };

    let found = watcher
        .watch("*", Some(body), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(found, paragraph);
    inserter.await.unwrap();
    assert_eq!(dom.deliveries(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_future_cancels() {
    let (dom, watcher) = setup();

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        watcher.watch("#never", None, Duration::from_secs(10)),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(dom.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pending_wait_holds_one_subscription() {
    let (dom, watcher) = setup();

    let mut wait = Box::pin(watcher.watch("#x", None, Duration::from_secs(1)));
    assert!(futures::poll!(&mut wait).is_pending());
    assert_eq!(dom.observer_count(), 1);

    drop(wait);
    assert_eq!(dom.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_host_closing_subscription_fails_wait() {
    let (dom, watcher) = setup();

    let handle = {
        let watcher = watcher.clone();
        tokio::spawn(async move { watcher.watch("#x", None, Duration::from_secs(5)).await })
    };
    while dom.observer_count() == 0 {
        tokio::task::yield_now().await;
    }
    dom.disconnect(ObserverId::new(0));

    let err = handle.await.unwrap().unwrap_err();
    assert_eq!(
        err,
        DomError::ObserverClosed {
            selector: "#x".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_watch_all_resolves_in_input_order() {
    let (dom, watcher) = setup();
    let a = element(&dom, "div", "a");
    let b = element(&dom, "div", "b");
    insert_later(&dom, b, Duration::from_millis(10));
    insert_later(&dom, a, Duration::from_millis(20));

    let found = watcher
        .watch_all(&["#a", "#b"], None, Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(found, vec![a, b]);
    assert_eq!(dom.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_watch_all_fails_fast() {
    let (dom, watcher) = setup();
    let a = element(&dom, "div", "a");
    insert_later(&dom, a, Duration::from_millis(10));

    let err = watcher
        .watch_all(&["#a", "#b"], None, Duration::from_millis(300))
        .await
        .unwrap_err();

    assert!(matches!(err, DomError::Timeout { ref selector, .. } if selector == "#b"));
    assert_eq!(dom.observer_count(), 0);

    let err = watcher
        .watch_all(&["#a", "a >"], None, Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(matches!(err, DomError::InvalidSelector { .. }));
}
