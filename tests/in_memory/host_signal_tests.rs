//! Host-triggered entry points: boot, identity change, message delivery.

use std::collections::BTreeMap;

use openpush::registration::{
    adapters::{InMemoryRegistrationStore, ScriptedReply},
    domain::{DeviceFingerprint, OrchestratorState, PushEvent, RegistrationRecord},
};
use rstest::rstest;

use super::helpers::{DEVICE, name, next_event, providers, start, token};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn boot_resumes_registration_interrupted_by_restart() {
    let store = InMemoryRegistrationStore::with_record(RegistrationRecord::registering(
        name("A"),
        DeviceFingerprint::new(DEVICE),
    ));
    let mut test = start(providers(&["A"]), store);
    test.provider(0)
        .set_register_default(ScriptedReply::Token(token("tok-r")));
    let handle = test.runtime.handle();

    handle.boot_completed().await.expect("boot accepted");

    assert_eq!(
        next_event(&mut test.events).await,
        PushEvent::Registered {
            provider: name("A"),
            token: token("tok-r"),
        }
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn identity_change_reregisters() {
    let mut test = start(providers(&["A", "B"]), InMemoryRegistrationStore::new());
    test.provider(0)
        .push_register_reply(ScriptedReply::Token(token("tok-1")));
    test.provider(0)
        .push_register_reply(ScriptedReply::Token(token("tok-2")));
    let handle = test.runtime.handle();
    handle.register().await.expect("register accepted");
    next_event(&mut test.events).await;

    handle
        .device_identity_changed(DeviceFingerprint::new("device-2"))
        .await
        .expect("identity change accepted");

    assert_eq!(
        next_event(&mut test.events).await,
        PushEvent::Unregistered {
            provider: name("A"),
            token: token("tok-1"),
        }
    );
    assert_eq!(
        next_event(&mut test.events).await,
        PushEvent::Registered {
            provider: name("A"),
            token: token("tok-2"),
        }
    );
    let record = test.store.snapshot().expect("record persisted");
    assert_eq!(record.device_fingerprint().as_str(), "device-2");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn messages_reach_listeners_while_unregistered() {
    let mut test = start(providers(&["A"]), InMemoryRegistrationStore::new());
    let handle = test.runtime.handle();
    let payload = BTreeMap::from([("body".to_owned(), "ping".to_owned())]);

    handle
        .deliver_message(name("A"), payload.clone())
        .expect("message accepted");
    handle
        .deliver_deleted_messages(name("A"), Some(3))
        .expect("notice accepted");

    assert_eq!(
        next_event(&mut test.events).await,
        PushEvent::Message {
            provider: name("A"),
            payload,
        }
    );
    assert_eq!(
        next_event(&mut test.events).await,
        PushEvent::DeletedMessages {
            provider: name("A"),
            count: Some(3),
        }
    );
    assert_eq!(
        handle.state().await.expect("state available"),
        OrchestratorState::Unregistered
    );
}
