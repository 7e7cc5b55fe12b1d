//! Single-step undo for stop and route mutations.
//!
//! Every mutation is recorded as an [`Action`] whose payload holds everything
//! needed to reverse it. [`ActionHistory::undo_last`] pops the newest action
//! and applies its inverse through the [`RouteCollaborator`] and
//! [`StopCollaborator`] contracts, so the history never reaches into store
//! internals and never re-derives data at undo time.

use crate::error::{Result, TransitError};
use crate::route::Route;
use crate::stop::Stop;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Collaborator contracts
// ---------------------------------------------------------------------------

/// Route-side operations the inverse dispatcher needs.
pub trait RouteCollaborator {
    fn delete_route(&mut self, route_id: &str) -> Result<()>;
    fn restore_route(&mut self, route: Route) -> Result<()>;
    /// `None` when the route or the stop on it is gone.
    fn get_stop_position(&self, route_id: &str, stop_id: &str) -> Option<usize>;
    fn remove_stop(&mut self, route_id: &str, position: usize) -> Result<()>;
    fn add_stop(&mut self, route_id: &str, stop: Stop, position: usize) -> Result<()>;
    fn update_stop(&mut self, route_id: &str, position: usize, stop: Stop) -> Result<()>;
    fn replace_stops(&mut self, route_id: &str, stops: Vec<Stop>) -> Result<()>;
}

/// Stop-registry operations the inverse dispatcher needs.
pub trait StopCollaborator {
    fn remove_stop(&mut self, stop_id: &str) -> Result<()>;
    fn restore_stop(&mut self, stop: Stop) -> Result<()>;
}

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    RouteCreated,
    RouteDeleted,
    StopAdded,
    StopRemoved,
    StopUpdated,
    StopsReordered,
    StopCreated,
    StopDeleted,
    StopAssigned,
}

impl ActionKind {
    pub fn all() -> &'static [ActionKind] {
        &[
            ActionKind::RouteCreated,
            ActionKind::RouteDeleted,
            ActionKind::StopAdded,
            ActionKind::StopRemoved,
            ActionKind::StopUpdated,
            ActionKind::StopsReordered,
            ActionKind::StopCreated,
            ActionKind::StopDeleted,
            ActionKind::StopAssigned,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::RouteCreated => "route_created",
            ActionKind::RouteDeleted => "route_deleted",
            ActionKind::StopAdded => "stop_added",
            ActionKind::StopRemoved => "stop_removed",
            ActionKind::StopUpdated => "stop_updated",
            ActionKind::StopsReordered => "stops_reordered",
            ActionKind::StopCreated => "stop_created",
            ActionKind::StopDeleted => "stop_deleted",
            ActionKind::StopAssigned => "stop_assigned",
        }
    }

    /// Kinds whose inverse goes through the stop registry.
    pub fn needs_stop_store(self) -> bool {
        matches!(self, ActionKind::StopCreated | ActionKind::StopDeleted)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = TransitError;

    fn from_str(s: &str) -> Result<Self> {
        ActionKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| TransitError::UnsupportedAction(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ActionPayload / Action
// ---------------------------------------------------------------------------

/// What was changed, with the data required to change it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ActionPayload {
    RouteCreated {
        route_id: String,
    },
    RouteDeleted {
        route_data: Route,
    },
    StopAdded {
        route_id: String,
        stop_id: String,
    },
    StopRemoved {
        route_id: String,
        position: usize,
        stop_data: Stop,
    },
    StopUpdated {
        route_id: String,
        position: usize,
        previous_stop: Stop,
    },
    StopsReordered {
        route_id: String,
        previous_stops: Vec<Stop>,
    },
    StopCreated {
        stop_id: String,
    },
    StopDeleted {
        stop_data: Stop,
    },
    StopAssigned {
        route_id: String,
        stop_id: String,
    },
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::RouteCreated { .. } => ActionKind::RouteCreated,
            ActionPayload::RouteDeleted { .. } => ActionKind::RouteDeleted,
            ActionPayload::StopAdded { .. } => ActionKind::StopAdded,
            ActionPayload::StopRemoved { .. } => ActionKind::StopRemoved,
            ActionPayload::StopUpdated { .. } => ActionKind::StopUpdated,
            ActionPayload::StopsReordered { .. } => ActionKind::StopsReordered,
            ActionPayload::StopCreated { .. } => ActionKind::StopCreated,
            ActionPayload::StopDeleted { .. } => ActionKind::StopDeleted,
            ActionPayload::StopAssigned { .. } => ActionKind::StopAssigned,
        }
    }
}

/// A recorded mutation. Serializes as `{"type", "payload", "timestamp"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub payload: ActionPayload,
    pub timestamp: DateTime<Utc>,
}

impl Action {
    pub fn new(payload: ActionPayload) -> Self {
        Self {
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }
}

// ---------------------------------------------------------------------------
// UndoOutcome
// ---------------------------------------------------------------------------

pub const NOTHING_TO_UNDO: &str = "No actions to undo";

#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    /// The action was popped and its inverse applied.
    Undone(Action),
    /// The history was empty. Nothing was touched.
    Empty,
}

impl UndoOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UndoOutcome::Undone(_))
    }

    pub fn action(&self) -> Option<&Action> {
        match self {
            UndoOutcome::Undone(action) => Some(action),
            UndoOutcome::Empty => None,
        }
    }

    /// `{"success": true, "action": ...}` or
    /// `{"success": false, "message": "No actions to undo"}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            UndoOutcome::Undone(action) => serde_json::json!({
                "success": true,
                "action": action,
            }),
            UndoOutcome::Empty => serde_json::json!({
                "success": false,
                "message": NOTHING_TO_UNDO,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionHistory
// ---------------------------------------------------------------------------

/// LIFO stack of recorded actions. Popped actions are gone for good.
#[derive(Debug, Clone, Default)]
pub struct ActionHistory {
    // Oldest at the front so a depth limit can evict cheaply.
    stack: VecDeque<Action>,
    limit: Option<usize>,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` actions; the oldest is dropped on overflow.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            stack: VecDeque::new(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn peek(&self) -> Option<&Action> {
        self.stack.back()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.stack.iter().rev()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn record(&mut self, payload: ActionPayload) {
        let action = Action::new(payload);
        tracing::debug!(kind = %action.kind(), depth = self.stack.len() + 1, "recorded action");
        self.stack.push_back(action);
        if let Some(limit) = self.limit {
            while self.stack.len() > limit {
                if let Some(evicted) = self.stack.pop_front() {
                    tracing::debug!(kind = %evicted.kind(), "history limit reached, dropped oldest action");
                }
            }
        }
    }

    /// Record from the untyped `{kind, payload}` form. Nothing is pushed
    /// when the kind is unknown or the payload does not fit it.
    pub fn record_raw(&mut self, kind: &str, payload: serde_json::Value) -> Result<()> {
        let kind: ActionKind = kind.parse()?;
        let typed: ActionPayload = serde_json::from_value(serde_json::json!({
            "type": kind.as_str(),
            "payload": payload,
        }))?;
        self.record(typed);
        Ok(())
    }

    /// Pop the newest action and apply its inverse.
    ///
    /// A stop-registry action with no `stops` collaborator fails with
    /// [`TransitError::StopStoreUnavailable`] and stays on the stack. Any
    /// other failure happens after the pop: the error is returned unchanged
    /// and the action is lost.
    pub fn undo_last(
        &mut self,
        routes: &mut dyn RouteCollaborator,
        stops: Option<&mut dyn StopCollaborator>,
    ) -> Result<UndoOutcome> {
        let Some(top) = self.stack.back() else {
            return Ok(UndoOutcome::Empty);
        };
        if top.kind().needs_stop_store() && stops.is_none() {
            return Err(TransitError::StopStoreUnavailable);
        }
        let Some(action) = self.stack.pop_back() else {
            return Ok(UndoOutcome::Empty);
        };

        match apply_inverse(&action.payload, routes, stops) {
            Ok(()) => {
                tracing::info!(kind = %action.kind(), "undid action");
                Ok(UndoOutcome::Undone(action))
            }
            Err(e) => {
                tracing::warn!(kind = %action.kind(), error = %e, "undo failed, action discarded");
                Err(e)
            }
        }
    }
}

fn apply_inverse(
    payload: &ActionPayload,
    routes: &mut dyn RouteCollaborator,
    stops: Option<&mut dyn StopCollaborator>,
) -> Result<()> {
    match payload {
        ActionPayload::RouteCreated { route_id } => routes.delete_route(route_id),
        ActionPayload::RouteDeleted { route_data } => routes.restore_route(route_data.clone()),
        ActionPayload::StopAdded { route_id, stop_id } => {
            let position = routes.get_stop_position(route_id, stop_id).ok_or_else(|| {
                TransitError::StopNotInRoute {
                    route_id: route_id.clone(),
                    stop_id: stop_id.clone(),
                }
            })?;
            routes.remove_stop(route_id, position)
        }
        ActionPayload::StopRemoved {
            route_id,
            position,
            stop_data,
        } => routes.add_stop(route_id, stop_data.clone(), *position),
        ActionPayload::StopUpdated {
            route_id,
            position,
            previous_stop,
        } => routes.update_stop(route_id, *position, previous_stop.clone()),
        ActionPayload::StopsReordered {
            route_id,
            previous_stops,
        } => routes.replace_stops(route_id, previous_stops.clone()),
        ActionPayload::StopCreated { stop_id } => stops
            .ok_or(TransitError::StopStoreUnavailable)?
            .remove_stop(stop_id),
        ActionPayload::StopDeleted { stop_data } => stops
            .ok_or(TransitError::StopStoreUnavailable)?
            .restore_stop(stop_data.clone()),
        // Already gone from the route counts as undone.
        ActionPayload::StopAssigned { route_id, stop_id } => {
            match routes.get_stop_position(route_id, stop_id) {
                Some(position) => routes.remove_stop(route_id, position),
                None => Ok(()),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
