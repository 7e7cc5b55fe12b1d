use crate::output::{print_json, print_stops};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use transit_core::session::Session;
use transit_core::stop::NewStop;

#[derive(Subcommand)]
pub enum StopSubcommand {
    /// Register a new stop
    Add {
        name: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Use this id instead of a generated one
        #[arg(long)]
        id: Option<String>,
    },
    /// List all stops
    List,
    /// Show one stop
    Show { stop_id: String },
    /// Remove a stop from the registry
    Remove { stop_id: String },
}

impl StopSubcommand {
    pub fn mutates(&self) -> bool {
        matches!(self, StopSubcommand::Add { .. } | StopSubcommand::Remove { .. })
    }
}

pub fn run(root: &Path, subcmd: StopSubcommand, json: bool) -> anyhow::Result<()> {
    super::run_once(root, subcmd.mutates(), |session| exec(session, subcmd, json))
}

pub fn exec(session: &mut Session, subcmd: StopSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        StopSubcommand::Add {
            name,
            location,
            lat,
            lon,
            id,
        } => add(
            session,
            NewStop {
                stop_id: id,
                stop_name: name,
                location,
                latitude: lat,
                longitude: lon,
            },
            json,
        ),
        StopSubcommand::List => list(session, json),
        StopSubcommand::Show { stop_id } => show(session, &stop_id, json),
        StopSubcommand::Remove { stop_id } => remove(session, &stop_id, json),
    }
}

fn add(session: &mut Session, new: NewStop, json: bool) -> anyhow::Result<()> {
    let name = new.stop_name.clone();
    let stop = session
        .create_stop(new)
        .with_context(|| format!("failed to add stop '{}'", name.trim()))?;

    if json {
        print_json(&stop)?;
    } else {
        println!("Created stop '{}' ({}).", stop.stop_name, stop.stop_id);
    }
    Ok(())
}

fn list(session: &Session, json: bool) -> anyhow::Result<()> {
    let stops = session.stops().all();
    if json {
        return print_json(&stops);
    }
    if stops.is_empty() {
        println!("No stops.");
        return Ok(());
    }
    print_stops(stops);
    Ok(())
}

fn show(session: &Session, stop_id: &str, json: bool) -> anyhow::Result<()> {
    let stop = session
        .stops()
        .get(stop_id)
        .with_context(|| format!("stop '{stop_id}' not found"))?;

    if json {
        return print_json(stop);
    }
    println!("Stop:     {} ({})", stop.stop_name, stop.stop_id);
    if !stop.location.is_empty() {
        println!("Location: {}", stop.location);
    }
    if let (Some(lat), Some(lon)) = (stop.latitude, stop.longitude) {
        println!("Coords:   {lat}, {lon}");
    }
    println!("Created:  {}", stop.created_at.to_rfc3339());
    Ok(())
}

fn remove(session: &mut Session, stop_id: &str, json: bool) -> anyhow::Result<()> {
    let stop = session
        .delete_stop(stop_id)
        .with_context(|| format!("failed to remove stop '{stop_id}'"))?;

    if json {
        print_json(&stop)?;
    } else {
        println!("Removed stop '{}'.", stop.stop_name);
    }
    Ok(())
}
