pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, ConfigError, LibraryConfig, MonitorConfig, RefreshConfig, SchedulerConfig, SourcesConfig, TrailerConfig, default_scheduler_config};
pub use credentials::CredentialStore;
pub use paths::{PathManager, container_base_path};
