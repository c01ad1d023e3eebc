/// Durable entity definitions for finished-game summaries.
pub mod models;
/// Storage abstraction layer error types.
pub mod storage;
/// Summary persistence trait and backends.
pub mod summary_store;
