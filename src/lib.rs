pub mod app;
pub mod cli;
pub mod error;
pub mod loader;
pub mod model;
pub mod selector;
pub mod ui;
pub mod utils;

pub use error::{Result, TrendError};
pub use loader::{build_series, CsvSeriesLoader, SeriesLoader};
pub use model::{CarModel, Price, PricePoint, PriceSeries, RootSelection};
pub use selector::{classify, classify_names, ModelList};
