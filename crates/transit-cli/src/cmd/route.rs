use crate::output::{print_json, print_route, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use transit_core::session::{Session, StopEdit};

#[derive(Subcommand)]
pub enum RouteSubcommand {
    /// Create an empty route
    Create { name: String },
    /// List all routes
    List,
    /// Show a route and its stops in order
    Show {
        /// Route id or name
        route: String,
    },
    /// Delete a route
    Delete { route: String },
    /// Add a new stop to a route
    AddStop {
        route: String,
        name: String,
        /// Insert at position N (0-based); appends if omitted
        #[arg(long, value_name = "N")]
        position: Option<usize>,
    },
    /// Remove the stop at a position
    RemoveStop { route: String, position: usize },
    /// Edit the stop at a position
    UpdateStop {
        route: String,
        position: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Reorder a route's stops
    Reorder {
        route: String,
        /// Stop ids in the desired order
        #[arg(required = true)]
        stop_ids: Vec<String>,
    },
    /// Place a registered stop on a route
    Assign {
        route: String,
        stop_id: String,
        /// Insert at position N (0-based); appends if omitted
        #[arg(long, value_name = "N")]
        position: Option<usize>,
    },
}

impl RouteSubcommand {
    pub fn mutates(&self) -> bool {
        !matches!(self, RouteSubcommand::List | RouteSubcommand::Show { .. })
    }
}

pub fn run(root: &Path, subcmd: RouteSubcommand, json: bool) -> anyhow::Result<()> {
    super::run_once(root, subcmd.mutates(), |session| exec(session, subcmd, json))
}

pub fn exec(session: &mut Session, subcmd: RouteSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RouteSubcommand::Create { name } => create(session, &name, json),
        RouteSubcommand::List => list(session, json),
        RouteSubcommand::Show { route } => show(session, &route, json),
        RouteSubcommand::Delete { route } => delete(session, &route, json),
        RouteSubcommand::AddStop {
            route,
            name,
            position,
        } => add_stop(session, &route, &name, position, json),
        RouteSubcommand::RemoveStop { route, position } => {
            remove_stop(session, &route, position, json)
        }
        RouteSubcommand::UpdateStop {
            route,
            position,
            name,
            location,
            lat,
            lon,
        } => update_stop(
            session,
            &route,
            position,
            StopEdit {
                stop_name: name,
                location,
                latitude: lat,
                longitude: lon,
            },
            json,
        ),
        RouteSubcommand::Reorder { route, stop_ids } => reorder(session, &route, &stop_ids, json),
        RouteSubcommand::Assign {
            route,
            stop_id,
            position,
        } => assign(session, &route, &stop_id, position, json),
    }
}

fn create(session: &mut Session, name: &str, json: bool) -> anyhow::Result<()> {
    let route = session
        .create_route(name)
        .with_context(|| format!("failed to create route '{}'", name.trim()))?;

    if json {
        print_json(&route)?;
    } else {
        println!("Created route '{}' ({}).", route.route_name, route.route_id);
    }
    Ok(())
}

fn list(session: &Session, json: bool) -> anyhow::Result<()> {
    let routes = session.routes().all();

    if json {
        let items: Vec<serde_json::Value> = routes
            .iter()
            .map(|r| {
                serde_json::json!({
                    "route_id": r.route_id,
                    "route_name": r.route_name,
                    "stop_count": r.stops.len(),
                })
            })
            .collect();
        return print_json(&items);
    }

    if routes.is_empty() {
        println!("No routes.");
        return Ok(());
    }

    let rows = routes
        .iter()
        .map(|r| {
            vec![
                r.route_id.clone(),
                r.route_name.clone(),
                r.stops.len().to_string(),
            ]
        })
        .collect();
    print_table(&["ROUTE_ID", "NAME", "STOPS"], rows);
    Ok(())
}

fn show(session: &Session, route: &str, json: bool) -> anyhow::Result<()> {
    let route = session
        .routes()
        .resolve(route)
        .with_context(|| format!("route '{route}' not found"))?;

    if json {
        return print_json(route);
    }
    print_route(route);
    Ok(())
}

fn delete(session: &mut Session, route: &str, json: bool) -> anyhow::Result<()> {
    let removed = session
        .delete_route(route)
        .with_context(|| format!("failed to delete route '{route}'"))?;

    if json {
        print_json(&removed)?;
    } else {
        println!(
            "Deleted route '{}' ({} stops).",
            removed.route_name,
            removed.stops.len()
        );
    }
    Ok(())
}

fn add_stop(
    session: &mut Session,
    route: &str,
    name: &str,
    position: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let stop = session
        .add_route_stop(route, name, position)
        .with_context(|| format!("failed to add '{}' to route '{route}'", name.trim()))?;
    let at = session
        .routes()
        .resolve(route)
        .ok()
        .and_then(|r| r.position_of(&stop.stop_id));

    if json {
        print_json(&serde_json::json!({
            "route": route,
            "position": at,
            "stop": stop,
        }))?;
    } else {
        match at {
            Some(at) => println!("Added '{}' to '{route}' at position {at}.", stop.stop_name),
            None => println!("Added '{}' to '{route}'.", stop.stop_name),
        }
    }
    Ok(())
}

fn remove_stop(session: &mut Session, route: &str, position: usize, json: bool) -> anyhow::Result<()> {
    let stop = session
        .remove_route_stop(route, position)
        .with_context(|| format!("failed to remove stop {position} from route '{route}'"))?;

    if json {
        print_json(&serde_json::json!({
            "route": route,
            "position": position,
            "stop": stop,
        }))?;
    } else {
        println!("Removed '{}' from '{route}'.", stop.stop_name);
    }
    Ok(())
}

fn update_stop(
    session: &mut Session,
    route: &str,
    position: usize,
    edit: StopEdit,
    json: bool,
) -> anyhow::Result<()> {
    let stop = session
        .update_route_stop(route, position, edit)
        .with_context(|| format!("failed to update stop {position} on route '{route}'"))?;

    if json {
        print_json(&stop)?;
    } else {
        println!("Updated stop {position} on '{route}': {}.", stop.stop_name);
    }
    Ok(())
}

fn reorder(session: &mut Session, route: &str, stop_ids: &[String], json: bool) -> anyhow::Result<()> {
    let ordered: Vec<&str> = stop_ids.iter().map(String::as_str).collect();
    let updated = session
        .reorder_route_stops(route, &ordered)
        .with_context(|| format!("failed to reorder route '{route}'"))?;

    if json {
        print_json(&updated)?;
    } else {
        let names: Vec<&str> = updated.stops.iter().map(|s| s.stop_name.as_str()).collect();
        println!("Reordered '{}': {}", updated.route_name, names.join(", "));
    }
    Ok(())
}

fn assign(
    session: &mut Session,
    route: &str,
    stop_id: &str,
    position: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let stop = session
        .assign_stop(route, stop_id, position)
        .with_context(|| format!("failed to assign stop '{stop_id}' to route '{route}'"))?;

    if json {
        print_json(&stop)?;
    } else {
        println!("Assigned '{}' to '{route}'.", stop.stop_name);
    }
    Ok(())
}
