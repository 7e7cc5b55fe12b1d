pub mod config;
pub mod error;
pub mod history;
pub mod io;
pub mod paths;
pub mod route;
pub mod session;
pub mod stop;

pub use error::{Result, TransitError};
