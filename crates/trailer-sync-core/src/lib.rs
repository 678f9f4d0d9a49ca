pub mod discovery;
pub mod expiry;
pub mod folder;
pub mod id_resolver;
pub mod monitor;
pub mod pointer;
pub mod refresh;
pub mod scheduler;
pub mod store;

pub use discovery::{scan, scan_for_media, FolderScan, VIDEO_EXTENSIONS};
pub use folder::FolderRef;
pub use id_resolver::{IdResolver, Resolution};
pub use monitor::{ContinuousMonitor, MonitorSettings, TickReport};
pub use pointer::PointerLayout;
pub use refresh::{FolderState, PassReport, PurgeReport, RefreshOrchestrator, RefreshSettings};
pub use scheduler::PeriodicScheduler;
pub use store::{CacheStore, JsonStore};

#[cfg(test)]
mod test_support;
