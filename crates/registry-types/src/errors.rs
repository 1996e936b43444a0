//! # Error Types
//!
//! Every failure during bootstrap is fatal. The variants below classify the
//! failure so operators can tell a typo in an identifier from a module that
//! could not start.

use std::fmt;

use thiserror::Error;

/// The kind of component an implementation identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// A functional module contributing resources.
    Module,
    /// The shared storage backend.
    StorageProvider,
    /// The optional file storage backend.
    FileStorage,
    /// A leadership participant for delegated election.
    LeadershipParticipant,
}

impl ComponentKind {
    /// Human-readable name used in logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::StorageProvider => "storage provider",
            Self::FileStorage => "file storage",
            Self::LeadershipParticipant => "leadership participant",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure reported by a collaborator's own `init`/`activate` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ComponentError {
    pub message: String,
}

impl ComponentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An implementation identifier could not be resolved to a factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no {kind} registered under identifier '{implementation_id}'")]
pub struct ResolutionError {
    pub kind: ComponentKind,
    pub implementation_id: String,
}

/// Fatal bootstrap error taxonomy.
#[derive(Debug, Clone, Error)]
pub enum BootstrapError {
    /// Missing or malformed required configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A configured implementation identifier cannot be located.
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// A resolved implementation reported failure from its own init.
    #[error("initialization of {component} failed: {source}")]
    Initialization {
        component: String,
        #[source]
        source: ComponentError,
    },

    /// The leadership participant could not start participating.
    #[error("leadership participation failed for server {server_url}: {source}")]
    Participation {
        server_url: String,
        #[source]
        source: ComponentError,
    },

    /// The routing layer refused a resource.
    #[error("registration of resource '{resource}' failed: {message}")]
    Registration { resource: String, message: String },
}

impl BootstrapError {
    /// Short label used for metrics and structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Resolution(_) => "resolution",
            Self::Initialization { .. } => "initialization",
            Self::Participation { .. } => "participation",
            Self::Registration { .. } => "registration",
        }
    }

    pub fn initialization(component: impl Into<String>, source: ComponentError) -> Self {
        Self::Initialization {
            component: component.into(),
            source,
        }
    }
}
