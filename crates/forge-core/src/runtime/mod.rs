//! Definiciones de runtime, delegación y registro.

pub mod builder;
pub mod definition;
pub mod delegating;
pub mod observe;
pub mod registry;
pub mod roles;

pub use builder::RuntimeBuilder;
pub use definition::{Definition, RuntimeDefinition};
pub use delegating::DelegatingDefinition;
pub use observe::ReplayRegistry;
pub use registry::{DefinitionFactory, DefinitionRegistry};
pub use roles::StepRole;
