//! Prelude module for convenient imports
//!
//! Re-exports the types most hosts need to resolve dependencies and drive a
//! path. Import it to skip naming each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use waypost::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let snapshot = MetadataSnapshot::from_file("path/to/snapshot.json")?;
//! let resolution = DependencyResolver::new(snapshot).resolve();
//!
//! for (value, fields) in resolution.dependencies.to_sorted() {
//!     println!("{} requires {:?}", value, fields);
//! }
//! # Ok(())
//! # }
//! ```

// Metadata model
pub use crate::config::{ModalSize, WidgetConfig};
pub use crate::metadata::{
    DependencyNode, DependentEntry, DependentPicklistField, IntoSnapshot, MetadataSnapshot,
    PathStepConfig, PicklistEntry, ValidFor,
};

// Resolution
pub use crate::picklist::PicklistIndex;
pub use crate::resolver::{DependencyResolver, Resolution, ResolvedDependencyMap};
pub use crate::validity::{DefaultValidityDecoder, ValidityDecoder};

// Transitions
pub use crate::transition::{
    CompletionAction, FlowOutcome, FlowRequest, GatingDecision, StepTransitionEngine,
    StepView, TransitionState,
};
pub use crate::widget::PathWidget;

// Host seams
pub use crate::host::{
    FieldCollectionOutcome, FieldCollectionRequest, FieldCollector, FlowRunner, HostError,
    Notification, NotificationSink, PathHost, PersistenceService, RecordUpdate, Severity,
};

// Error types
pub use crate::error::{MetadataError, ResolveError, TransitionError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
