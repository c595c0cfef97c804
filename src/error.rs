//! Error type shared by the simulation library.
//!
//! Configuration problems (bad spawn bags, malformed config files) and
//! unimplemented entity behavior surface as [`SimError`]. Deliberate
//! fallbacks, such as the damage-negotiation default, are not errors and
//! never go through this type.

use thiserror::Error;

/// Errors produced by spawning, configuration loading and state driving.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A spawn configuration lacks a key the entity type requires.
    #[error("{entity}: missing required spawn key `{key}`")]
    MissingSpawnKey { entity: String, key: String },

    /// A spawn configuration value has the wrong type.
    #[error("{entity}: spawn key `{key}` must be {expected}")]
    InvalidSpawnValue {
        entity: String,
        key: String,
        expected: &'static str,
    },

    /// No definition is registered for the requested entity tag.
    #[error("unknown entity type `{0}`")]
    UnknownEntityType(String),

    /// An entity entered a state whose behavior was never written.
    #[error("{entity}: state `{state}` is not implemented")]
    NotImplemented { entity: String, state: String },

    /// A state machine refers to a state outside its declared set.
    #[error("state `{0}` is not declared in this state machine")]
    UndeclaredState(String),

    /// A state machine declaration has no initial state.
    #[error("state machine has no initial state")]
    MissingInitialState,

    /// The entity was despawned or never existed.
    #[error("entity {0} does not exist")]
    NoSuchEntity(String),

    /// The asset provider has no region for the requested sprite.
    #[error("no texture region `{sprite}` in atlas `{atlas}`")]
    MissingAsset { atlas: String, sprite: String },

    /// The simulation config file could not be read or parsed.
    #[error("config: {0}")]
    Config(String),

    /// A JSON document (scenario or spawn bag) failed to parse.
    #[error("json: {0}")]
    Json(String),
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Json(e.to_string())
    }
}

pub type SimResult<T> = Result<T, SimError>;
