// Module declarations
mod builder;
mod core;
mod options;
mod propagation;

// Public API exports
pub use builder::{Endpoints, create_client};
pub use self::core::Client;
pub use options::ClientOptions;
