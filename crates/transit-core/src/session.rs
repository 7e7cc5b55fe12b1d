use crate::config::Config;
use crate::error::{Result, TransitError};
use crate::history::{ActionHistory, ActionPayload, UndoOutcome};
use crate::io::{self, Format};
use crate::paths;
use crate::route::{Route, RouteStore};
use crate::stop::{NewStop, Stop, StopStore};
use std::path::{Path, PathBuf};

/// Fields to change on a stop already placed on a route.
#[derive(Debug, Clone, Default)]
pub struct StopEdit {
    pub stop_name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One operator's working set: both stores plus the undo history for
/// everything done through this session. Each mutation commits to a store
/// first and is recorded only when the commit succeeds.
#[derive(Debug)]
pub struct Session {
    root: PathBuf,
    config: Config,
    stops: StopStore,
    routes: RouteStore,
    history: ActionHistory,
}

impl Session {
    /// Create the `.transit/` layout. Existing files are left alone.
    pub fn init(root: &Path, project: &str) -> Result<Config> {
        io::seed(&paths::config_path(root), Format::Yaml, &Config::new(project))?;
        if !paths::stops_path(root).exists() {
            StopStore::new().save(root)?;
        }
        if !paths::routes_path(root).exists() {
            RouteStore::new().save(root)?;
        }
        Config::load(root)
    }

    pub fn open(root: &Path) -> Result<Self> {
        if !paths::transit_dir(root).is_dir() {
            return Err(TransitError::NotInitialized);
        }
        let config = Config::load(root)?;
        for warning in config.validate() {
            tracing::warn!("config: {}", warning.message);
        }
        let history = ActionHistory::with_limit(config.history_limit);
        Ok(Self {
            root: root.to_path_buf(),
            stops: StopStore::load(root)?,
            routes: RouteStore::load(root)?,
            config,
            history,
        })
    }

    pub fn save(&self) -> Result<()> {
        self.stops.save(&self.root)?;
        self.routes.save(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stops(&self) -> &StopStore {
        &self.stops
    }

    pub fn routes(&self) -> &RouteStore {
        &self.routes
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    // ---------------------------------------------------------------------------
    // Stop registry
    // ---------------------------------------------------------------------------

    pub fn create_stop(&mut self, new: NewStop) -> Result<Stop> {
        let stop = self.stops.add_stop(new)?;
        self.history.record(ActionPayload::StopCreated {
            stop_id: stop.stop_id.clone(),
        });
        Ok(stop)
    }

    pub fn delete_stop(&mut self, stop_id: &str) -> Result<Stop> {
        let stop = self.stops.remove_stop(stop_id)?;
        self.history.record(ActionPayload::StopDeleted {
            stop_data: stop.clone(),
        });
        Ok(stop)
    }

    // ---------------------------------------------------------------------------
    // Routes
    // ---------------------------------------------------------------------------

    pub fn create_route(&mut self, route_name: &str) -> Result<Route> {
        let route = self.routes.create_route(route_name)?;
        self.history.record(ActionPayload::RouteCreated {
            route_id: route.route_id.clone(),
        });
        Ok(route)
    }

    /// `route` is an id or a name.
    pub fn delete_route(&mut self, route: &str) -> Result<Route> {
        let route_id = self.route_id(route)?;
        let removed = self.routes.delete_route(&route_id)?;
        self.history.record(ActionPayload::RouteDeleted {
            route_data: removed.clone(),
        });
        Ok(removed)
    }

    /// Put a new, route-only stop on `route`. `None` appends.
    pub fn add_route_stop(
        &mut self,
        route: &str,
        stop_name: &str,
        position: Option<usize>,
    ) -> Result<Stop> {
        let route_id = self.route_id(route)?;
        let name = paths::normalize_name(stop_name);
        if name.is_empty() {
            return Err(TransitError::StopNameRequired);
        }
        let stop = Stop::new(name);
        self.routes.add_stop(&route_id, stop.clone(), position)?;
        self.history.record(ActionPayload::StopAdded {
            route_id,
            stop_id: stop.stop_id.clone(),
        });
        Ok(stop)
    }

    pub fn remove_route_stop(&mut self, route: &str, position: usize) -> Result<Stop> {
        let route_id = self.route_id(route)?;
        let removed = self.routes.remove_stop(&route_id, position)?;
        self.history.record(ActionPayload::StopRemoved {
            route_id,
            position,
            stop_data: removed.clone(),
        });
        Ok(removed)
    }

    pub fn update_route_stop(
        &mut self,
        route: &str,
        position: usize,
        edit: StopEdit,
    ) -> Result<Stop> {
        let route_id = self.route_id(route)?;
        let current = self
            .routes
            .get(&route_id)
            .and_then(|r| r.stops.get(position))
            .cloned()
            .ok_or_else(|| TransitError::PositionOutOfBounds {
                position,
                len: self.routes.get(&route_id).map_or(0, |r| r.stops.len()),
            })?;

        let mut updated = current.clone();
        if let Some(name) = edit.stop_name {
            let name = paths::normalize_name(&name);
            if name.is_empty() {
                return Err(TransitError::StopNameRequired);
            }
            updated.stop_name = name;
        }
        if let Some(location) = edit.location {
            updated.location = location;
        }
        if edit.latitude.is_some() {
            updated.latitude = edit.latitude;
        }
        if edit.longitude.is_some() {
            updated.longitude = edit.longitude;
        }

        let previous_stop = self
            .routes
            .update_stop(&route_id, position, updated.clone())?;
        self.history.record(ActionPayload::StopUpdated {
            route_id,
            position,
            previous_stop,
        });
        Ok(updated)
    }

    pub fn reorder_route_stops(&mut self, route: &str, ordered: &[&str]) -> Result<Route> {
        let route_id = self.route_id(route)?;
        let previous_stops = self.routes.reorder_stops(&route_id, ordered)?;
        self.history.record(ActionPayload::StopsReordered {
            route_id: route_id.clone(),
            previous_stops,
        });
        self.routes.resolve(&route_id).cloned()
    }

    /// Place a registry stop on `route`. `None` appends.
    pub fn assign_stop(
        &mut self,
        route: &str,
        stop_id: &str,
        position: Option<usize>,
    ) -> Result<Stop> {
        let route_id = self.route_id(route)?;
        let stop = self
            .stops
            .assign_stop_to_route(&mut self.routes, &route_id, stop_id, position)?;
        self.history.record(ActionPayload::StopAssigned {
            route_id,
            stop_id: stop.stop_id.clone(),
        });
        Ok(stop)
    }

    // ---------------------------------------------------------------------------
    // Undo
    // ---------------------------------------------------------------------------

    pub fn undo(&mut self) -> Result<UndoOutcome> {
        self.history
            .undo_last(&mut self.routes, Some(&mut self.stops))
    }

    fn route_id(&self, route: &str) -> Result<String> {
        self.routes.resolve(route).map(|r| r.route_id.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
