use crate::error::{Result, TransitError};
use crate::history::StopCollaborator;
use crate::io::{self, Format};
use crate::paths;
use crate::route::RouteStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Stop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    pub stop_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Stop {
    /// Build a stop with a fresh UUID and no location data.
    pub fn new(stop_name: impl Into<String>) -> Self {
        Self {
            stop_id: uuid::Uuid::new_v4().to_string(),
            stop_name: stop_name.into(),
            location: String::new(),
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
        }
    }
}

/// Input for [`StopStore::add_stop`]. The id is generated when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewStop {
    #[serde(default)]
    pub stop_id: Option<String>,
    pub stop_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl NewStop {
    pub fn named(stop_name: impl Into<String>) -> Self {
        Self {
            stop_name: stop_name.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct StopsFile {
    #[serde(default)]
    stops: Vec<Stop>,
    #[serde(default)]
    total_stops: usize,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// StopStore
// ---------------------------------------------------------------------------

/// The city-wide stop registry. Stop names are unique ignoring case and
/// surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct StopStore {
    stops: Vec<Stop>,
}

impl StopStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        let file: Option<StopsFile> = io::fetch(&paths::stops_path(root), Format::Json)?;
        Ok(Self {
            stops: file.map(|f| f.stops).unwrap_or_default(),
        })
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let file = StopsFile {
            stops: self.stops.clone(),
            total_stops: self.stops.len(),
            last_updated: Some(Utc::now()),
        };
        io::store(&paths::stops_path(root), Format::Json, &file)
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn all(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn get(&self, stop_id: &str) -> Option<&Stop> {
        self.stops.iter().find(|s| s.stop_id == stop_id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Stop> {
        self.stops.iter().find(|s| paths::same_name(&s.stop_name, name))
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    pub fn add_stop(&mut self, new: NewStop) -> Result<Stop> {
        let stop_name = paths::normalize_name(&new.stop_name);
        if stop_name.is_empty() {
            return Err(TransitError::StopNameRequired);
        }
        if self.find_by_name(&stop_name).is_some() {
            return Err(TransitError::StopExists(stop_name));
        }

        let stop_id = match new.stop_id.filter(|id| !id.is_empty()) {
            Some(id) if self.get(&id).is_some() => return Err(TransitError::StopIdExists(id)),
            Some(id) => id,
            None => uuid::Uuid::new_v4().to_string(),
        };

        let stop = Stop {
            stop_id,
            stop_name,
            location: new.location,
            latitude: new.latitude,
            longitude: new.longitude,
            created_at: Utc::now(),
        };
        self.stops.push(stop.clone());
        Ok(stop)
    }

    pub fn remove_stop(&mut self, stop_id: &str) -> Result<Stop> {
        let idx = self
            .stops
            .iter()
            .position(|s| s.stop_id == stop_id)
            .ok_or_else(|| TransitError::StopNotFound(stop_id.to_string()))?;
        Ok(self.stops.remove(idx))
    }

    /// Put back a stop removed earlier, keeping its original id and timestamp.
    pub fn restore_stop(&mut self, stop: Stop) -> Result<()> {
        if self.get(&stop.stop_id).is_some() {
            return Err(TransitError::StopIdExists(stop.stop_id));
        }
        if self.find_by_name(&stop.stop_name).is_some() {
            return Err(TransitError::StopExists(paths::normalize_name(
                &stop.stop_name,
            )));
        }
        self.stops.push(stop);
        Ok(())
    }

    /// Copy an existing stop into a route. `None` appends.
    pub fn assign_stop_to_route(
        &self,
        routes: &mut RouteStore,
        route_id: &str,
        stop_id: &str,
        position: Option<usize>,
    ) -> Result<Stop> {
        let route_len = routes
            .get(route_id)
            .map(|r| r.stops.len())
            .ok_or_else(|| TransitError::RouteNotFound(route_id.to_string()))?;
        let stop = self
            .get(stop_id)
            .ok_or_else(|| TransitError::StopNotFound(stop_id.to_string()))?;

        if routes.has_stop_name(route_id, &stop.stop_name) {
            return Err(TransitError::DuplicateRouteStop(paths::normalize_name(
                &stop.stop_name,
            )));
        }
        if let Some(pos) = position {
            if pos > route_len {
                return Err(TransitError::PositionOutOfBounds {
                    position: pos,
                    len: route_len,
                });
            }
        }

        routes.add_stop(route_id, stop.clone(), position)?;
        Ok(stop.clone())
    }
}

impl StopCollaborator for StopStore {
    fn remove_stop(&mut self, stop_id: &str) -> Result<()> {
        StopStore::remove_stop(self, stop_id).map(|_| ())
    }

    fn restore_stop(&mut self, stop: Stop) -> Result<()> {
        StopStore::restore_stop(self, stop)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn add_stop_trims_and_generates_id() {
        let mut stops = StopStore::new();
        let stop = stops.add_stop(NewStop::named("  Oak Street ")).unwrap();
        assert_eq!(stop.stop_name, "Oak Street");
        assert!(!stop.stop_id.is_empty());
        assert_eq!(stops.len(), 1);
    }

    #[test]
    fn add_stop_keeps_supplied_id() {
        let mut stops = StopStore::new();
        let stop = stops
            .add_stop(NewStop {
                stop_id: Some("S1".into()),
                stop_name: "Elm".into(),
                ..NewStop::default()
            })
            .unwrap();
        assert_eq!(stop.stop_id, "S1");
        assert!(stops.get("S1").is_some());
    }

    #[test]
    fn add_stop_rejects_id_in_use() {
        let mut stops = StopStore::new();
        stops
            .add_stop(NewStop {
                stop_id: Some("S1".into()),
                stop_name: "Oak".into(),
                ..NewStop::default()
            })
            .unwrap();

        let err = stops
            .add_stop(NewStop {
                stop_id: Some("S1".into()),
                stop_name: "Elm".into(),
                ..NewStop::default()
            })
            .unwrap_err();
        assert!(matches!(err, TransitError::StopIdExists(ref id) if id == "S1"));
        assert_eq!(stops.len(), 1);
        assert_eq!(stops.get("S1").unwrap().stop_name, "Oak");
    }

    #[test]
    fn restore_rejects_id_in_use() {
        let mut stops = StopStore::new();
        let stop = stops.add_stop(NewStop::named("Pine")).unwrap();
        let mut twin = stop.clone();
        twin.stop_name = "Cedar".into();

        assert!(matches!(
            stops.restore_stop(twin),
            Err(TransitError::StopIdExists(_))
        ));
        assert_eq!(stops.len(), 1);
    }

    #[test]
    fn add_stop_requires_name() {
        let mut stops = StopStore::new();
        assert!(matches!(
            stops.add_stop(NewStop::named("   ")),
            Err(TransitError::StopNameRequired)
        ));
    }

    #[test]
    fn add_stop_rejects_case_insensitive_duplicate() {
        let mut stops = StopStore::new();
        stops.add_stop(NewStop::named("Market")).unwrap();
        let err = stops.add_stop(NewStop::named(" MARKET ")).unwrap_err();
        assert_eq!(err.to_string(), "stop 'MARKET' already exists");
    }

    #[test]
    fn remove_then_restore_keeps_record() {
        let mut stops = StopStore::new();
        let stop = stops.add_stop(NewStop::named("Pine")).unwrap();

        let removed = stops.remove_stop(&stop.stop_id).unwrap();
        assert!(stops.is_empty());
        assert!(matches!(
            stops.remove_stop(&stop.stop_id),
            Err(TransitError::StopNotFound(_))
        ));

        stops.restore_stop(removed).unwrap();
        assert_eq!(stops.get(&stop.stop_id), Some(&stop));
    }

    #[test]
    fn restore_rejects_name_taken_in_between() {
        let mut stops = StopStore::new();
        let stop = stops.add_stop(NewStop::named("Pine")).unwrap();
        let removed = stops.remove_stop(&stop.stop_id).unwrap();
        stops.add_stop(NewStop::named("pine")).unwrap();

        assert!(matches!(
            stops.restore_stop(removed),
            Err(TransitError::StopExists(_))
        ));
    }

    #[test]
    fn save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut stops = StopStore::new();
        stops
            .add_stop(NewStop {
                stop_name: "Harbor".into(),
                location: "Pier 4".into(),
                latitude: Some(47.6),
                longitude: Some(-122.3),
                ..NewStop::default()
            })
            .unwrap();
        stops.save(dir.path()).unwrap();

        let raw: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(paths::stops_path(dir.path())).unwrap(),
        )
        .unwrap();
        assert_eq!(raw["total_stops"], 1);

        let loaded = StopStore::load(dir.path()).unwrap();
        assert_eq!(loaded.all(), stops.all());
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(StopStore::load(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn assign_copies_stop_into_route() {
        let mut stops = StopStore::new();
        let mut routes = RouteStore::new();
        let route = routes.create_route("Line 1").unwrap();
        let stop = stops.add_stop(NewStop::named("Depot")).unwrap();

        stops
            .assign_stop_to_route(&mut routes, &route.route_id, &stop.stop_id, None)
            .unwrap();
        assert_eq!(routes.get(&route.route_id).unwrap().stops, vec![stop.clone()]);

        assert!(matches!(
            stops.assign_stop_to_route(&mut routes, &route.route_id, &stop.stop_id, None),
            Err(TransitError::DuplicateRouteStop(_))
        ));
    }

    #[test]
    fn assign_validates_route_stop_and_position() {
        let mut stops = StopStore::new();
        let mut routes = RouteStore::new();
        let route = routes.create_route("Line 1").unwrap();
        let stop = stops.add_stop(NewStop::named("Depot")).unwrap();

        assert!(matches!(
            stops.assign_stop_to_route(&mut routes, "ghost", &stop.stop_id, None),
            Err(TransitError::RouteNotFound(_))
        ));
        assert!(matches!(
            stops.assign_stop_to_route(&mut routes, &route.route_id, "ghost", None),
            Err(TransitError::StopNotFound(_))
        ));
        assert!(matches!(
            stops.assign_stop_to_route(&mut routes, &route.route_id, &stop.stop_id, Some(3)),
            Err(TransitError::PositionOutOfBounds { position: 3, len: 0 })
        ));
    }
}
