pub mod api;
mod error;
pub mod render;
pub mod state;

pub use api::ApiClient;
pub use state::AppContext;
