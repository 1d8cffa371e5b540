use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use tablegrab_engine::{
    Dataset, ExtractError, FetchError, FetchMetadata, FetchOutput, Fetcher, ParseConfig,
    TableExtractor, TableProfile,
};

/// Serves one canned page regardless of URL.
struct StubFetcher {
    status: u16,
    body: &'static str,
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        Ok(FetchOutput {
            bytes: self.body.as_bytes().to_vec(),
            metadata: FetchMetadata {
                final_url: url.to_string(),
                status: self.status,
                content_type: Some("text/html; charset=utf-8".to_string()),
            },
        })
    }
}

fn demo_config() -> ParseConfig {
    ParseConfig::from_value(json!({
        "table": { "demo": { "tag": "table" } },
        "row": { "demo": { "tag": "tr" } },
        "column": { "demo": { "tag": "td" } }
    }))
    .unwrap()
}

fn full_config() -> ParseConfig {
    ParseConfig::from_value(json!({
        "table": { "demo": { "tag": "table" } },
        "header": { "demo": { "tag": "thead" } },
        "body": { "demo": { "tag": "tbody", "class": "data" } },
        "row": { "demo": { "tag": "tr" } },
        "column": { "demo": { "tag": "regex_^t[hd]$" } }
    }))
    .unwrap()
}

/// The demo profile with header and body phases skipped.
fn rows_only_profile() -> TableProfile {
    let mut profile = TableProfile::named("demo", 0);
    profile.header.clear();
    profile.body.clear();
    profile
}

#[tokio::test]
async fn end_to_end_rows_without_column_names() {
    scrape_logging::initialize_for_tests();
    let extractor = TableExtractor::with_fetcher(
        demo_config(),
        Box::new(StubFetcher {
            status: 200,
            body: "<table><tr><td>A</td><td>B</td></tr><tr><td>1</td><td>2</td></tr></table>",
        }),
    );

    let dataset = extractor
        .extract("https://example.com/components", &rows_only_profile())
        .await
        .unwrap()
        .expect("dataset");

    assert_eq!(
        dataset,
        Dataset {
            columns: None,
            rows: vec![
                vec!["A".to_string(), "B".to_string()],
                vec!["1".to_string(), "2".to_string()],
            ],
        }
    );
}

#[tokio::test]
async fn non_200_page_yields_none_not_an_error() {
    let extractor = TableExtractor::with_fetcher(
        demo_config(),
        Box::new(StubFetcher {
            status: 404,
            body: "<html>not here</html>",
        }),
    );

    let result = extractor
        .extract("https://example.com/gone", &rows_only_profile())
        .await
        .unwrap();
    assert_eq!(result, None);
}

#[test]
fn header_region_supplies_column_names() {
    let html = r#"
        <table>
            <thead><tr><th>Symbol</th><th>Price</th></tr></thead>
            <tbody class="data">
                <tr><td>TCS</td><td>3500</td></tr>
                <tr><td>INFY</td><td>1500</td></tr>
            </tbody>
        </table>"#;
    let extractor = TableExtractor::with_fetcher(
        full_config(),
        Box::new(StubFetcher {
            status: 200,
            body: "",
        }),
    );

    let dataset = extractor
        .extract_from_html(html, &TableProfile::named("demo", 0))
        .unwrap()
        .expect("dataset");

    let columns = dataset.columns.expect("column names");
    assert_eq!(columns, vec!["Symbol", "Price"]);
    assert_eq!(
        dataset.rows,
        vec![vec!["TCS", "3500"], vec!["INFY", "1500"]]
    );
}

#[test]
fn headerless_table_has_no_column_names() {
    let html = r#"
        <table>
            <tbody class="data"><tr><td>TCS</td><td>3500</td></tr></tbody>
        </table>"#;
    let extractor = TableExtractor::with_fetcher(
        full_config(),
        Box::new(StubFetcher {
            status: 200,
            body: "",
        }),
    );

    let dataset = extractor
        .extract_from_html(html, &TableProfile::named("demo", 0))
        .unwrap()
        .expect("dataset");

    assert_eq!(dataset.columns, None);
    assert_eq!(dataset.rows, vec![vec!["TCS", "3500"]]);
}

#[test]
fn missing_body_region_falls_back_to_whole_table() {
    // The body rule wants tbody.data; this page has a bare tbody, so the
    // rows are collected from the table element instead. Same rows either
    // way.
    let wrapped = r#"<table><tbody class="data">
        <tr><td>a</td></tr><tr><td>b</td></tr>
    </tbody></table>"#;
    let bare = r#"<table>
        <tr><td>a</td></tr><tr><td>b</td></tr>
    </table>"#;
    let extractor = TableExtractor::with_fetcher(
        full_config(),
        Box::new(StubFetcher {
            status: 200,
            body: "",
        }),
    );
    let mut profile = TableProfile::named("demo", 0);
    profile.header.clear();

    let from_wrapped = extractor
        .extract_from_html(wrapped, &profile)
        .unwrap()
        .expect("dataset");
    let from_bare = extractor
        .extract_from_html(bare, &profile)
        .unwrap()
        .expect("dataset");

    assert_eq!(from_wrapped.rows, from_bare.rows);
    assert_eq!(from_bare.rows.len(), 2);
}

#[test]
fn table_ordinal_selects_among_matches() {
    let html = r#"
        <table><tr><td>first</td></tr></table>
        <table><tr><td>second</td></tr></table>"#;
    let extractor = TableExtractor::with_fetcher(
        demo_config(),
        Box::new(StubFetcher {
            status: 200,
            body: "",
        }),
    );
    let mut profile = rows_only_profile();
    profile.table_index = 1;

    let dataset = extractor
        .extract_from_html(html, &profile)
        .unwrap()
        .expect("dataset");
    assert_eq!(dataset.rows, vec![vec!["second"]]);
}

#[test]
fn ordinal_equal_to_match_count_yields_none() {
    // Two tables, index 2: out of range, a miss rather than a panic.
    let html = r#"
        <table><tr><td>first</td></tr></table>
        <table><tr><td>second</td></tr></table>"#;
    let extractor = TableExtractor::with_fetcher(
        demo_config(),
        Box::new(StubFetcher {
            status: 200,
            body: "",
        }),
    );
    let mut profile = rows_only_profile();
    profile.table_index = 2;

    assert_eq!(extractor.extract_from_html(html, &profile).unwrap(), None);
}

#[test]
fn empty_table_profile_yields_none() {
    let extractor = TableExtractor::with_fetcher(
        demo_config(),
        Box::new(StubFetcher {
            status: 200,
            body: "",
        }),
    );
    let mut profile = rows_only_profile();
    profile.table.clear();

    let result = extractor
        .extract_from_html("<table><tr><td>x</td></tr></table>", &profile)
        .unwrap();
    assert_eq!(result, None);
}

#[test]
fn unconfigured_table_profile_yields_none() {
    let extractor = TableExtractor::with_fetcher(
        demo_config(),
        Box::new(StubFetcher {
            status: 200,
            body: "",
        }),
    );
    let mut profile = rows_only_profile();
    profile.table = "nonexistent".to_string();

    let result = extractor
        .extract_from_html("<table><tr><td>x</td></tr></table>", &profile)
        .unwrap();
    assert_eq!(result, None);
}

#[test]
fn malformed_rule_is_a_hard_error() {
    let config = ParseConfig::from_value(json!({
        "table": { "demo": {} },
        "row": { "demo": { "tag": "tr" } },
        "column": { "demo": { "tag": "td" } }
    }))
    .unwrap();
    let extractor = TableExtractor::with_fetcher(
        config,
        Box::new(StubFetcher {
            status: 200,
            body: "",
        }),
    );

    let err = extractor
        .extract_from_html("<table><tr><td>x</td></tr></table>", &rows_only_profile())
        .unwrap_err();
    assert!(matches!(err, ExtractError::Config(_)));
}

#[test]
fn cell_text_is_flattened_and_trimmed() {
    let html = "<table><tr><td>  TCS <b>Ltd</b>  </td><td>\n 3500 \n</td></tr></table>";
    let extractor = TableExtractor::with_fetcher(
        demo_config(),
        Box::new(StubFetcher {
            status: 200,
            body: "",
        }),
    );

    let dataset = extractor
        .extract_from_html(html, &rows_only_profile())
        .unwrap()
        .expect("dataset");
    assert_eq!(dataset.rows, vec![vec!["TCS Ltd", "3500"]]);
}

#[test]
fn row_widths_are_not_validated_against_header() {
    let html = r#"
        <table>
            <thead><tr><th>A</th><th>B</th><th>C</th></tr></thead>
            <tbody class="data"><tr><td>only-one</td></tr></tbody>
        </table>"#;
    let extractor = TableExtractor::with_fetcher(
        full_config(),
        Box::new(StubFetcher {
            status: 200,
            body: "",
        }),
    );
    let dataset = extractor
        .extract_from_html(html, &TableProfile::named("demo", 0))
        .unwrap()
        .expect("dataset");
    assert_eq!(dataset.columns.as_deref().map(<[String]>::len), Some(3));
    assert_eq!(dataset.rows, vec![vec!["only-one"]]);
}
