pub mod arguments;
pub mod provider;
pub mod resolved;

pub use arguments::{RuntimeArguments, RuntimeMultiArguments};
pub use provider::Provider;
pub use resolved::{ResolvedArguments, ResolvedMultiArguments};
