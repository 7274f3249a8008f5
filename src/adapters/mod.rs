//! Infrastructure adapters implementing the port traits.

pub mod csv_adapter;
pub mod file_config_adapter;

pub use csv_adapter::CsvAdapter;
pub use file_config_adapter::FileConfigAdapter;
