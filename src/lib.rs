//! # Waypost - Picklist Path Assistant Engine
//!
//! **Waypost** drives a guided "path" over the values of a controlling picklist
//! field. It works out which fields must be filled in before a record may move
//! to a given value, and decides how each transition is gated: committed
//! directly, routed through a sub-flow, or held until dependent fields are
//! collected.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic and performs no I/O. It operates on a
//! canonical [`MetadataSnapshot`](metadata::MetadataSnapshot). The workflow is:
//!
//! 1.  **Load Metadata**: Parse the host's responses into your own structs, or use the
//!     [`ui_api`](metadata::ui_api) models for the common UI API shapes.
//! 2.  **Convert**: Implement [`IntoSnapshot`](metadata::IntoSnapshot) to translate them into a snapshot.
//! 3.  **Resolve**: Build a [`DependencyResolver`](resolver::DependencyResolver) and call `resolve()`
//!     to get the value → required fields map.
//! 4.  **Transition**: Feed the result into a [`StepTransitionEngine`](transition::StepTransitionEngine),
//!     or let a [`PathWidget`](widget::PathWidget) run the whole session against your host services.
//!
//! ## Quick Start
//!
//! ```rust
//! use waypost::prelude::*;
//!
//! let snapshot = MetadataSnapshot {
//!     controlling_field: "Stage".to_string(),
//!     entries: vec![
//!         PicklistEntry::new("New", "New"),
//!         PicklistEntry::new("Qualified", "Qualified"),
//!         PicklistEntry::new("Closed", "Closed"),
//!     ],
//!     steps: vec![PathStepConfig::new("Closed").with_dependent_fields(["Reason"])],
//!     ..Default::default()
//! };
//!
//! let resolver = DependencyResolver::builder(snapshot).build();
//! let resolution = resolver.resolve();
//! assert_eq!(resolution.dependencies.sorted_fields_for("Closed"), vec!["Reason"]);
//!
//! let mut engine = StepTransitionEngine::new(WidgetConfig::new("001", "Opportunity", "Stage"));
//! engine.load(resolver.index().clone(), resolver.snapshot().steps.clone(), resolution.dependencies);
//! engine.sync_record(Some("Qualified".to_string()));
//!
//! let decision = engine.mark_complete().unwrap();
//! assert!(matches!(decision, GatingDecision::CollectDependentFields { .. }));
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod host;
pub mod metadata;
pub mod picklist;
pub mod prelude;
pub mod resolver;
pub mod transition;
pub mod validity;
pub mod widget;
