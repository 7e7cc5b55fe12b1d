use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitError {
    #[error("not initialized: run 'transit init'")]
    NotInitialized,

    #[error("stop not found: {0}")]
    StopNotFound(String),

    #[error("stop '{0}' already exists")]
    StopExists(String),

    #[error("stop id '{0}' is already in use")]
    StopIdExists(String),

    #[error("stop_name is required")]
    StopNameRequired,

    #[error("route not found: {0}")]
    RouteNotFound(String),

    #[error("route '{0}' already exists")]
    RouteExists(String),

    #[error("route_name is required")]
    RouteNameRequired,

    #[error("stop {stop_id} not found in route {route_id}")]
    StopNotInRoute { route_id: String, stop_id: String },

    #[error("route already contains stop '{0}'")]
    DuplicateRouteStop(String),

    #[error("position {position} out of bounds for route of {len} stops")]
    PositionOutOfBounds { position: usize, len: usize },

    #[error("invalid stop order: {0}")]
    InvalidStopOrder(String),

    #[error("stop store not available for undo")]
    StopStoreUnavailable,

    #[error("unsupported action type: {0}")]
    UnsupportedAction(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TransitError>;
