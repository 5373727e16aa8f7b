pub mod catalog;
pub mod chat;
pub mod conference;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod models;
pub mod notifications;
pub mod route;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod store;

pub use catalog::Catalog;
pub use config::{CoreConfig, SimulationTiming};
pub use error::{ConfigError, StoreError, ValidationError};
pub use events::SimEvent;
pub use runtime::SimulationRuntime;
pub use session::{ParticipantSession, SessionStores};
