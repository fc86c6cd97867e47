//! Adapters to the outside world: the tariff lookup service and the CSV
//! files at the batch boundary.

pub mod reference;
pub mod tables;
pub mod tariff_api;

pub use reference::{load_reference_table, DEFAULT_REFERENCE_PATH};
pub use tables::{
    read_product_rows, read_product_rows_from_path, write_costed_rows, write_costed_rows_to_path,
    ParsedBatch, TableError,
};
pub use tariff_api::{TariffApiClient, TariffApiError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
