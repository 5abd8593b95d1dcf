//! Serialization, listener management and shutdown of the runtime.

use std::sync::Arc;

use openpush::registration::{
    adapters::InMemoryRegistrationStore,
    domain::PushEvent,
    ports::EventListener,
    services::OrchestratorError,
};
use rstest::rstest;

use super::helpers::{channel_listener, name, next_event, providers, start, token};

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_register_calls_issue_one_request() {
    let mut test = start(providers(&["A"]), InMemoryRegistrationStore::new());
    let mut callers = Vec::new();
    for _ in 0..16 {
        let handle = test.runtime.handle();
        callers.push(tokio::spawn(async move { handle.register().await }));
    }
    for caller in callers {
        caller
            .await
            .expect("caller task completes")
            .expect("register accepted");
    }

    assert_eq!(test.provider(0).register_calls(), 1);
    for callback in test.provider(0).take_held() {
        callback.registered(token("tok-1"));
    }
    assert_eq!(
        next_event(&mut test.events).await,
        PushEvent::Registered {
            provider: name("A"),
            token: token("tok-1"),
        }
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listeners_added_through_handle_receive_events() {
    let test = start(providers(&["A"]), InMemoryRegistrationStore::new());
    let handle = test.runtime.handle();
    let (listener, mut extra) = channel_listener();
    let listener: Arc<dyn EventListener> = listener;
    handle.add_listener(Arc::clone(&listener));

    handle
        .deliver_deleted_messages(name("A"), None)
        .expect("notice accepted");
    assert_eq!(
        next_event(&mut extra).await,
        PushEvent::DeletedMessages {
            provider: name("A"),
            count: None,
        }
    );

    assert!(handle.remove_listener(&listener));
    assert!(!handle.remove_listener(&listener));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn handles_report_stopped_after_shutdown() {
    let test = start(providers(&["A"]), InMemoryRegistrationStore::new());
    let handle = test.runtime.handle();

    test.runtime.shutdown().await.expect("shutdown completes");

    assert!(matches!(
        handle.register().await,
        Err(OrchestratorError::Stopped)
    ));
    assert!(matches!(
        handle.deliver_message(name("A"), Default::default()),
        Err(OrchestratorError::Stopped)
    ));
}
