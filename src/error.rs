//! Error types for the composition core

use thiserror::Error;

use crate::engine::EngineError;

/// Errors surfaced by composer/component operations.
///
/// Note what is *not* here: a template or part that resolves to nothing is a
/// soft miss (empty string, skipped element), never an error. Composition
/// must tolerate components that do not implement every optional slot.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Render or parts requested on a component never registered into a
    /// composer
    #[error("component '{component}' is not registered into a composer")]
    NotRegistered { component: String },

    /// A component can be registered into at most one composer, once
    #[error("component '{component}' is already registered into a composer")]
    AlreadyRegistered { component: String },

    /// Two components under the same name within one composer
    #[error("a component named '{name}' is already registered")]
    DuplicateName { name: String },

    /// Underlying template engine failure, propagated unchanged
    #[error(transparent)]
    Engine(#[from] EngineError),
}
