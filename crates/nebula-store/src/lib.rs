pub mod config;
pub mod error;
pub mod json_bridge;
pub mod schema;
pub mod store;

pub use config::{FileConfig, companion_key, default_base_dir, load_config, open_store};
pub use error::{Result, StoreError};
pub use store::Store;
