pub mod init;
pub mod route;
pub mod shell;
pub mod stop;

use anyhow::Context;
use std::path::Path;
use transit_core::session::Session;

/// Open the project, run one command, and persist the stores if it changed them.
fn run_once(
    root: &Path,
    mutates: bool,
    exec: impl FnOnce(&mut Session) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut session = Session::open(root).context("failed to open transit project")?;
    exec(&mut session)?;
    if mutates {
        session.save().context("failed to save transit data")?;
    }
    Ok(())
}
