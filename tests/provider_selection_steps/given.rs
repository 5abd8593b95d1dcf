//! Given steps for provider selection BDD scenarios.

use eyre::WrapErr;
use openpush::registration::{adapters::ScriptedReply, domain::ProviderErrorCode};
use rstest_bdd_macros::given;

use super::world::{SelectionWorld, parse_token, run_async};

#[given(r#"providers "{first}" and "{second}" are configured"#)]
fn providers_configured(
    world: &mut SelectionWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    world.start(&[first, second])
}

#[given(r#"provider "{name}" is unavailable"#)]
fn provider_unavailable(world: &mut SelectionWorld, name: String) -> Result<(), eyre::Report> {
    world.provider(&name)?.set_available(false);
    Ok(())
}

#[given(r#"provider "{name}" issues token "{token}""#)]
fn provider_issues_token(
    world: &mut SelectionWorld,
    name: String,
    token: String,
) -> Result<(), eyre::Report> {
    world
        .provider(&name)?
        .set_register_default(ScriptedReply::Token(parse_token(&token)?));
    Ok(())
}

#[given(r#"provider "{name}" fails transiently {count:usize} times then issues "{token}""#)]
fn provider_fails_then_issues(
    world: &mut SelectionWorld,
    name: String,
    count: usize,
    token: String,
) -> Result<(), eyre::Report> {
    let provider = world.provider(&name)?;
    for _ in 0..count {
        provider.push_register_reply(ScriptedReply::Fail(ProviderErrorCode::ServiceNotAvailable));
    }
    provider.push_register_reply(ScriptedReply::Token(parse_token(&token)?));
    Ok(())
}

#[given("every provider rejects the credentials")]
fn every_provider_rejects(world: &mut SelectionWorld) {
    for provider in &world.providers {
        provider.set_register_default(ScriptedReply::Fail(ProviderErrorCode::AuthenticationFailed));
    }
}

#[given("the application has registered")]
fn application_has_registered(world: &mut SelectionWorld) -> Result<(), eyre::Report> {
    let handle = world.handle()?;
    run_async(handle.register()).wrap_err("register before scenario action")?;
    let state = world.settle()?;
    if !state.is_registered() {
        return Err(eyre::eyre!("expected a registration, found {state}"));
    }
    Ok(())
}
