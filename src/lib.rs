pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod store;

pub use config::Config;
pub use datasource::{
    CachedDataSource, DataSource, DataSourceError, MockDataSource, SplinterlandsDataSource,
};
pub use db::{init_db, Repository};
pub use domain::{
    AggregatedTotals, Category, Decimal, PriceQuotes, RewardEntry, SeasonSnapshot, SeasonWindow,
    TimeMs, TournamentResult, Username,
};
pub use error::AppError;
pub use store::{SnapshotStore, StoreError, SupabaseStore};
