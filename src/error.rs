use thiserror::Error;

/// Errors raised while flattening or resolving dependency metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(
        "Dependency graph below field '{field}' exceeds the maximum nesting depth of {max_depth}"
    )]
    MalformedDependencyGraph { field: String, max_depth: usize },
}

/// Errors raised while ingesting metadata snapshots from the host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Metadata source '{source_name}' is unavailable: {message}")]
    Unavailable {
        source_name: String,
        message: String,
    },

    #[error("Failed to parse metadata JSON: {0}")]
    Json(String),

    #[error("Field '{field}' is missing from the {source_name} payload")]
    MissingField { source_name: String, field: String },
}

impl From<serde_json::Error> for MetadataError {
    fn from(err: serde_json::Error) -> Self {
        MetadataError::Json(err.to_string())
    }
}

/// Errors raised by the step transition engine and the widget driving it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error(
        "The flow API name designated for this step could not be found amongst active screen flows. \
         Please contact your system administrator, as this means the configuration for the {value} \
         value on the {field} picklist field on the {object} object is not valid and will prevent \
         users from updating to this value."
    )]
    InvalidFlowConfiguration {
        value: String,
        field: String,
        object: String,
    },

    #[error("{}", label_errors_with_numbers(.messages))]
    PersistenceFailure { messages: Vec<String> },

    #[error("Value '{0}' is not an entry of the controlling picklist")]
    UnknownValue(String),

    #[error("The path is disabled while a transition to '{0}' is pending")]
    PathDisabled(String),

    #[error("'{0}' is the last step; there is nothing left to complete")]
    CompletionDisabled(String),

    #[error("Event '{event}' cannot be applied while the path is {state}")]
    UnexpectedEvent { event: &'static str, state: String },

    #[error("Another save is already in flight")]
    CommitInFlight,

    #[error("The path has no {0} yet")]
    NotReady(&'static str),
}

/// Joins reduced host messages into a single user-facing string.
///
/// No messages yield `"Unknown error"`, one message is returned as is, and
/// several are numbered `Error 1: ... Error 2: ...`.
pub fn label_errors_with_numbers(messages: &[String]) -> String {
    match messages {
        [] => "Unknown error".to_string(),
        [single] => single.clone(),
        many => many
            .iter()
            .enumerate()
            .map(|(i, msg)| format!("Error {}: {}", i + 1, msg))
            .collect::<Vec<_>>()
            .join(" "),
    }
}
