use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use transit_core::session::Session;

pub fn run(root: &Path, project: Option<&str>, json: bool) -> anyhow::Result<()> {
    let default_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transit".to_string());
    let project = project.unwrap_or(&default_name);

    let config = Session::init(root, project)
        .with_context(|| format!("failed to initialize {}", root.display()))?;

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "project": config.project,
        }))?;
    } else {
        println!(
            "Initialized transit project '{}' in {}",
            config.project,
            root.display()
        );
    }
    Ok(())
}
