//! The table extraction engine: fetch a page, pick the working table, split
//! it into header and body regions, and collect the cell text row by row.
//!
//! Every locate step is best-effort: a missing region degrades (header
//! omitted, body falls back to the whole table) or ends the call with
//! `Ok(None)`. Only transport failures and malformed selector rules are
//! hard errors.

use scraper::{ElementRef, Html};

use crate::config::{ConfigError, ParseConfig};
use crate::decode::decode_html;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::resolve::{resolve, Resolution};
use crate::types::{Dataset, ExtractError, TableProfile};

/// Header and body are singular regions; two matches is enough to take the
/// first.
const REGION_LIMIT: usize = 2;
const ROW_LIMIT: usize = 500;
const CELL_LIMIT: usize = 500;

pub struct TableExtractor {
    config: ParseConfig,
    fetcher: Box<dyn Fetcher>,
}

impl TableExtractor {
    pub fn new(config: ParseConfig) -> Self {
        Self::with_fetcher(
            config,
            Box::new(ReqwestFetcher::new(FetchSettings::default())),
        )
    }

    /// Construct with a caller-supplied fetcher. Tests use this to feed
    /// canned pages through the full pipeline.
    pub fn with_fetcher(config: ParseConfig, fetcher: Box<dyn Fetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Fetch `url` and extract the table selected by `profile`.
    ///
    /// `Ok(None)` means the page or the table was unavailable; details are
    /// in the log.
    pub async fn extract(
        &self,
        url: &str,
        profile: &TableProfile,
    ) -> Result<Option<Dataset>, ExtractError> {
        let output = self.fetcher.fetch(url).await?;
        if output.metadata.status != 200 {
            log::warn!(
                "page unavailable at {url} (status {})",
                output.metadata.status
            );
            return Ok(None);
        }

        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref());
        self.extract_from_html(&decoded.html, profile)
    }

    /// Extraction over an already-fetched document.
    pub fn extract_from_html(
        &self,
        html: &str,
        profile: &TableProfile,
    ) -> Result<Option<Dataset>, ExtractError> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let tables = match self.locate(root, "table", &profile.table, profile.table_index + 2)? {
            Resolution::Found(tables) => tables,
            _ => {
                log::warn!("table rule {:?} did not resolve", profile.table);
                Vec::new()
            }
        };
        if tables.is_empty() {
            log::warn!("page has no matching table");
            return Ok(None);
        }
        let Some(&table) = tables.get(profile.table_index) else {
            log::warn!(
                "page has {} matching tables, none at position {}",
                tables.len(),
                profile.table_index
            );
            return Ok(None);
        };

        let mut header_row: Vec<String> = Vec::new();
        match self.locate(table, "header", &profile.header, REGION_LIMIT)? {
            Resolution::Found(headers) if !headers.is_empty() => {
                if let Resolution::Found(cells) =
                    self.locate(headers[0], "column", &profile.column, CELL_LIMIT)?
                {
                    header_row = cells.iter().copied().map(element_text).collect();
                }
            }
            _ => log::warn!("no header region; rows will carry no column names"),
        }

        let row_container = match self.locate(table, "body", &profile.body, REGION_LIMIT)? {
            Resolution::Found(bodies) if !bodies.is_empty() => bodies[0],
            _ => {
                log::warn!("no body region; scanning the whole table for rows");
                table
            }
        };

        let row_elements = match self.locate(row_container, "row", &profile.row, ROW_LIMIT)? {
            Resolution::Found(rows) => rows,
            _ => {
                log::warn!("row rule {:?} did not resolve", profile.row);
                Vec::new()
            }
        };

        let mut rows = Vec::with_capacity(row_elements.len());
        for row in row_elements {
            let cells = match self.locate(row, "column", &profile.column, CELL_LIMIT)? {
                Resolution::Found(cells) => cells,
                _ => Vec::new(),
            };
            // Row width is whatever the selector yields; it is not checked
            // against the header width.
            rows.push(cells.iter().copied().map(element_text).collect());
        }

        let columns = if header_row.is_empty() {
            None
        } else {
            Some(header_row)
        };
        Ok(Some(Dataset { columns, rows }))
    }

    /// Resolver call that escalates a malformed rule to a hard error and
    /// leaves the other miss causes to the caller.
    fn locate<'a>(
        &self,
        scope: ElementRef<'a>,
        category: &str,
        profile: &str,
        limit: usize,
    ) -> Result<Resolution<'a>, ExtractError> {
        match resolve(&self.config, scope, category, profile, limit) {
            Resolution::ConfigMalformed => {
                Err(ExtractError::Config(ConfigError::MalformedRule {
                    category: category.to_string(),
                    profile: profile.to_string(),
                }))
            }
            other => Ok(other),
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
