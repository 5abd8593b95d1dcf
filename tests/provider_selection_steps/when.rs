//! When steps for provider selection BDD scenarios.

use eyre::WrapErr;
use openpush::registration::domain::DeviceFingerprint;
use rstest_bdd_macros::when;

use super::world::{SelectionWorld, run_async};

#[when("the application requests registration")]
fn request_registration(world: &mut SelectionWorld) -> Result<(), eyre::Report> {
    let handle = world.handle()?;
    run_async(handle.register()).wrap_err("register request")?;
    Ok(())
}

#[when("the application requests unregistration")]
fn request_unregistration(world: &mut SelectionWorld) -> Result<(), eyre::Report> {
    let handle = world.handle()?;
    run_async(handle.unregister()).wrap_err("unregister request")?;
    Ok(())
}

#[when(r#"the device identity changes to "{fingerprint}""#)]
fn identity_changes(world: &mut SelectionWorld, fingerprint: String) -> Result<(), eyre::Report> {
    let handle = world.handle()?;
    run_async(handle.device_identity_changed(DeviceFingerprint::new(fingerprint)))
        .wrap_err("identity change")?;
    Ok(())
}

#[when("registration settles")]
fn registration_settles(world: &mut SelectionWorld) -> Result<(), eyre::Report> {
    world.settle()?;
    Ok(())
}
