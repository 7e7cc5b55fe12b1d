use crate::error::{Result, TransitError};
use crate::history::RouteCollaborator;
use crate::io::{self, Format};
use crate::paths;
use crate::stop::Stop;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: String,
    pub route_name: String,
    #[serde(default)]
    pub stops: Vec<Stop>,
    pub created_at: DateTime<Utc>,
}

impl Route {
    pub fn new(route_name: impl Into<String>) -> Self {
        Self {
            route_id: uuid::Uuid::new_v4().to_string(),
            route_name: route_name.into(),
            stops: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Zero-based position of `stop_id` in this route.
    pub fn position_of(&self, stop_id: &str) -> Option<usize> {
        self.stops.iter().position(|s| s.stop_id == stop_id)
    }
}

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct RoutesFile {
    #[serde(default)]
    routes: Vec<Route>,
    #[serde(default)]
    total_routes: usize,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// RouteStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RouteStore {
    routes: Vec<Route>,
}

impl RouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        let file: Option<RoutesFile> = io::fetch(&paths::routes_path(root), Format::Json)?;
        Ok(Self {
            routes: file.map(|f| f.routes).unwrap_or_default(),
        })
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let file = RoutesFile {
            routes: self.routes.clone(),
            total_routes: self.routes.len(),
            last_updated: Some(Utc::now()),
        };
        io::store(&paths::routes_path(root), Format::Json, &file)
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn all(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, route_id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.route_id == route_id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| paths::same_name(&r.route_name, name))
    }

    /// Look a route up by id first, then by name.
    pub fn resolve(&self, id_or_name: &str) -> Result<&Route> {
        self.get(id_or_name)
            .or_else(|| self.get_by_name(id_or_name))
            .ok_or_else(|| TransitError::RouteNotFound(id_or_name.to_string()))
    }

    pub fn get_stop_position(&self, route_id: &str, stop_id: &str) -> Option<usize> {
        self.get(route_id).and_then(|r| r.position_of(stop_id))
    }

    pub fn has_stop_name(&self, route_id: &str, stop_name: &str) -> bool {
        self.get(route_id).is_some_and(|r| {
            r.stops
                .iter()
                .any(|s| paths::same_name(&s.stop_name, stop_name))
        })
    }

    // ---------------------------------------------------------------------------
    // Route mutations
    // ---------------------------------------------------------------------------

    pub fn create_route(&mut self, route_name: &str) -> Result<Route> {
        let route_name = paths::normalize_name(route_name);
        if route_name.is_empty() {
            return Err(TransitError::RouteNameRequired);
        }
        if self.get_by_name(&route_name).is_some() {
            return Err(TransitError::RouteExists(route_name));
        }
        let route = Route::new(route_name);
        self.routes.push(route.clone());
        Ok(route)
    }

    pub fn delete_route(&mut self, route_id: &str) -> Result<Route> {
        let idx = self
            .routes
            .iter()
            .position(|r| r.route_id == route_id)
            .ok_or_else(|| TransitError::RouteNotFound(route_id.to_string()))?;
        Ok(self.routes.remove(idx))
    }

    /// Put back a deleted route with its id, name and stop sequence intact.
    pub fn restore_route(&mut self, route: Route) -> Result<()> {
        if self.get(&route.route_id).is_some() || self.get_by_name(&route.route_name).is_some() {
            return Err(TransitError::RouteExists(paths::normalize_name(
                &route.route_name,
            )));
        }
        self.routes.push(route);
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Stop-sequence mutations
    // ---------------------------------------------------------------------------

    /// Insert `stop` at `position` (0-based); `None` appends.
    pub fn add_stop(&mut self, route_id: &str, stop: Stop, position: Option<usize>) -> Result<()> {
        let route = self.find_mut(route_id)?;
        if route
            .stops
            .iter()
            .any(|s| paths::same_name(&s.stop_name, &stop.stop_name))
        {
            return Err(TransitError::DuplicateRouteStop(paths::normalize_name(
                &stop.stop_name,
            )));
        }
        let len = route.stops.len();
        let at = position.unwrap_or(len);
        if at > len {
            return Err(TransitError::PositionOutOfBounds { position: at, len });
        }
        route.stops.insert(at, stop);
        Ok(())
    }

    pub fn remove_stop(&mut self, route_id: &str, position: usize) -> Result<Stop> {
        let route = self.find_mut(route_id)?;
        let len = route.stops.len();
        if position >= len {
            return Err(TransitError::PositionOutOfBounds { position, len });
        }
        Ok(route.stops.remove(position))
    }

    /// Overwrite the stop at `position`, returning the one it replaced.
    pub fn update_stop(&mut self, route_id: &str, position: usize, stop: Stop) -> Result<Stop> {
        let route = self.find_mut(route_id)?;
        let len = route.stops.len();
        if position >= len {
            return Err(TransitError::PositionOutOfBounds { position, len });
        }
        let clash = route
            .stops
            .iter()
            .enumerate()
            .any(|(i, s)| i != position && paths::same_name(&s.stop_name, &stop.stop_name));
        if clash {
            return Err(TransitError::DuplicateRouteStop(paths::normalize_name(
                &stop.stop_name,
            )));
        }
        Ok(std::mem::replace(&mut route.stops[position], stop))
    }

    pub fn replace_stops(&mut self, route_id: &str, stops: Vec<Stop>) -> Result<Vec<Stop>> {
        let route = self.find_mut(route_id)?;
        Ok(std::mem::replace(&mut route.stops, stops))
    }

    /// Reorder the route to follow `ordered` stop ids. Every stop currently on
    /// the route must appear exactly once. Returns the previous sequence.
    pub fn reorder_stops(&mut self, route_id: &str, ordered: &[&str]) -> Result<Vec<Stop>> {
        let route = self.find_mut(route_id)?;

        let mut seen = HashSet::new();
        for &id in ordered {
            if !seen.insert(id) {
                return Err(TransitError::InvalidStopOrder(format!(
                    "duplicate stop in order list: '{id}'"
                )));
            }
        }

        let existing: HashSet<&str> = route.stops.iter().map(|s| s.stop_id.as_str()).collect();
        for &id in ordered {
            if !existing.contains(id) {
                return Err(TransitError::InvalidStopOrder(format!(
                    "'{id}' is not on this route"
                )));
            }
        }
        for s in &route.stops {
            if !seen.contains(s.stop_id.as_str()) {
                return Err(TransitError::InvalidStopOrder(format!(
                    "missing stop in order list: '{}'",
                    s.stop_id
                )));
            }
        }

        let mut next = Vec::with_capacity(route.stops.len());
        for &id in ordered {
            if let Some(stop) = route.stops.iter().find(|s| s.stop_id == id) {
                next.push(stop.clone());
            }
        }
        Ok(std::mem::replace(&mut route.stops, next))
    }

    fn find_mut(&mut self, route_id: &str) -> Result<&mut Route> {
        self.routes
            .iter_mut()
            .find(|r| r.route_id == route_id)
            .ok_or_else(|| TransitError::RouteNotFound(route_id.to_string()))
    }
}

impl RouteCollaborator for RouteStore {
    fn delete_route(&mut self, route_id: &str) -> Result<()> {
        RouteStore::delete_route(self, route_id).map(|_| ())
    }

    fn restore_route(&mut self, route: Route) -> Result<()> {
        RouteStore::restore_route(self, route)
    }

    fn get_stop_position(&self, route_id: &str, stop_id: &str) -> Option<usize> {
        RouteStore::get_stop_position(self, route_id, stop_id)
    }

    fn remove_stop(&mut self, route_id: &str, position: usize) -> Result<()> {
        RouteStore::remove_stop(self, route_id, position).map(|_| ())
    }

    fn add_stop(&mut self, route_id: &str, stop: Stop, position: usize) -> Result<()> {
        RouteStore::add_stop(self, route_id, stop, Some(position))
    }

    fn update_stop(&mut self, route_id: &str, position: usize, stop: Stop) -> Result<()> {
        RouteStore::update_stop(self, route_id, position, stop).map(|_| ())
    }

    fn replace_stops(&mut self, route_id: &str, stops: Vec<Stop>) -> Result<()> {
        RouteStore::replace_stops(self, route_id, stops).map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
