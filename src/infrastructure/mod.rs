// Infrastructure module - shared plumbing for every sub-client
pub mod headers;
pub mod http;
pub mod task_manager;

pub use headers::{SharedHeaders, bearer, header_map};
pub use http::{build_http_client, check_response, join_url};
pub use task_manager::TaskManager;
