//! Services combining the data source, engine and store.

pub mod brawls;
pub mod history;
pub mod summary;
pub mod sync;

pub use brawls::{BrawlReport, BrawlService};
pub use history::{HistoryEntry, HistoryService};
pub use summary::{SeasonSummary, SummaryError, SummaryService, UserData};
pub use sync::{SyncError, SyncReport, SyncService};
