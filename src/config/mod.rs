pub mod settings;

pub use settings::{ApiConfig, ApiStyle, AppConfig};
