//! Registration, retry and unregistration through the runtime.

use openpush::registration::{
    adapters::{InMemoryRegistrationStore, ScriptedReply, ScriptedUnregisterReply},
    domain::{OrchestratorState, ProviderErrorCode, PushEvent, RegistrationErrorKind},
    ports::RegistrationStore,
};
use rstest::rstest;

use super::helpers::{name, next_event, providers, start, token};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_selects_first_available_provider() {
    let mut test = start(providers(&["A", "B"]), InMemoryRegistrationStore::new());
    test.provider(0).set_available(false);
    test.provider(1)
        .set_register_default(ScriptedReply::Token(token("tok-1")));
    let handle = test.runtime.handle();

    handle.register().await.expect("register accepted");

    assert_eq!(
        next_event(&mut test.events).await,
        PushEvent::Registered {
            provider: name("B"),
            token: token("tok-1"),
        }
    );
    assert_eq!(
        handle.state().await.expect("state available"),
        OrchestratorState::Registered {
            provider: name("B"),
            token: token("tok-1"),
        }
    );
    let record = test.store.load().expect("record loads");
    assert_eq!(record.provider_name(), Some(&name("B")));
    assert_eq!(test.provider(0).register_calls(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn recoverable_failures_are_retried_by_timer() {
    let mut test = start(providers(&["A"]), InMemoryRegistrationStore::new());
    for _ in 0..2 {
        test.provider(0)
            .push_register_reply(ScriptedReply::Fail(ProviderErrorCode::ServiceNotAvailable));
    }
    test.provider(0)
        .push_register_reply(ScriptedReply::Token(token("tok-a")));

    test.runtime
        .handle()
        .register()
        .await
        .expect("register accepted");

    for _ in 0..2 {
        let event = next_event(&mut test.events).await;
        assert!(matches!(
            event,
            PushEvent::RegistrationError { ref error, .. }
                if error.kind() == RegistrationErrorKind::Recoverable
        ));
    }
    assert_eq!(
        next_event(&mut test.events).await,
        PushEvent::Registered {
            provider: name("A"),
            token: token("tok-a"),
        }
    );
    assert_eq!(test.provider(0).register_calls(), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn all_candidates_failing_reports_no_available_provider() {
    let mut test = start(providers(&["A", "B"]), InMemoryRegistrationStore::new());
    for provider in &test.providers {
        provider.set_register_default(ScriptedReply::Fail(ProviderErrorCode::InvalidParameters));
    }

    test.runtime
        .handle()
        .register()
        .await
        .expect("register accepted");

    let mut kinds = Vec::new();
    loop {
        let event = next_event(&mut test.events).await;
        kinds.push(event.kind());
        if event == PushEvent::NoAvailableProvider {
            break;
        }
    }
    assert_eq!(
        kinds,
        vec![
            "registration_error",
            "registration_error",
            "no_available_provider"
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unregister_removes_registration() {
    let mut test = start(providers(&["A"]), InMemoryRegistrationStore::new());
    test.provider(0)
        .set_register_default(ScriptedReply::Token(token("tok-1")));
    let handle = test.runtime.handle();
    handle.register().await.expect("register accepted");
    next_event(&mut test.events).await;

    handle.unregister().await.expect("unregister accepted");

    assert_eq!(
        next_event(&mut test.events).await,
        PushEvent::Unregistered {
            provider: name("A"),
            token: token("tok-1"),
        }
    );
    assert_eq!(
        handle.state().await.expect("state available"),
        OrchestratorState::Unregistered
    );
    assert_eq!(test.store.snapshot(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn late_unregistration_confirmation_is_applied() {
    let mut test = start(providers(&["A"]), InMemoryRegistrationStore::new());
    test.provider(0)
        .set_register_default(ScriptedReply::Token(token("tok-1")));
    test.provider(0)
        .set_unregister_default(ScriptedUnregisterReply::Hold);
    let handle = test.runtime.handle();
    handle.register().await.expect("register accepted");
    next_event(&mut test.events).await;

    handle.unregister().await.expect("unregister accepted");
    assert!(matches!(
        handle.state().await.expect("state available"),
        OrchestratorState::Unregistering { .. }
    ));
    let held = test.provider(0).take_held();
    let confirm = tokio::spawn(async move {
        for callback in held {
            callback.unregistered();
        }
    });
    confirm.await.expect("confirmation task completes");

    assert!(matches!(
        next_event(&mut test.events).await,
        PushEvent::Unregistered { .. }
    ));
}
