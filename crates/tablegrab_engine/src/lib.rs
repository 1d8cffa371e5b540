//! Tablegrab engine: configuration-driven extraction of HTML tables into
//! row-oriented datasets.
mod config;
mod decode;
mod export;
mod extract;
mod fetch;
mod resolve;
mod types;

pub use config::{ConfigError, Matcher, ParseConfig, SelectorRule};
pub use decode::{decode_html, DecodedHtml};
pub use export::{ensure_output_dir, sheet_name_from_url, ExportError, Workbook};
pub use extract::TableExtractor;
pub use fetch::{FetchMetadata, FetchOutput, FetchSettings, Fetcher, ReqwestFetcher};
pub use resolve::{resolve, Resolution};
pub use types::{
    Dataset, ExtractError, FailureKind, FetchError, TableProfile, DEFAULT_PROFILE,
};
