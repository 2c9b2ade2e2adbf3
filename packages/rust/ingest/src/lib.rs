//! Tabular export ingest.
//!
//! Parses a header-led, comma-separated export (quoted fields, doubled-quote
//! escaping) into [`ContentRecord`]s. Header names are matched loosely so the
//! same contract accepts exports from different tools:
//! - required: title, canonical URL
//! - optional: image, publish date, categories, tags, body, excerpt,
//!   created/modified overrides, author
//!
//! A broken header contract or unreadable file is fatal. Rows are never
//! rejected here; missing per-record values are left for the synthesizer.

use std::path::Path;

use tracing::{debug, info, instrument};

use ldgraph_shared::{ContentRecord, LdGraphError, Result};

// ---------------------------------------------------------------------------
// Header contract
// ---------------------------------------------------------------------------

/// Logical columns of the header contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Title,
    Url,
    Image,
    Published,
    Categories,
    Tags,
    Body,
    Excerpt,
    Created,
    Modified,
    Author,
}

/// Accepted header spellings, compared after [`header_key`] normalization.
const COLUMN_ALIASES: &[(Column, &[&str])] = &[
    (Column::Title, &["title", "posttitle", "name"]),
    (Column::Url, &["url", "canonicalurl", "canonical", "permalink", "link"]),
    (Column::Image, &["image", "imageurl", "featuredimage", "thumbnail"]),
    (Column::Published, &["date", "publishdate", "published", "postdate", "datepublished"]),
    (Column::Categories, &["categories", "category"]),
    (Column::Tags, &["tags", "tag"]),
    (Column::Body, &["content", "body", "html", "postcontent"]),
    (Column::Excerpt, &["excerpt", "summary"]),
    (Column::Created, &["created", "createddate", "datecreated"]),
    (Column::Modified, &["modified", "modifieddate", "lastmodified", "datemodified"]),
    (Column::Author, &["author", "authorname"]),
];

/// Column positions resolved from the header row.
#[derive(Debug, Default)]
struct ColumnMap {
    positions: Vec<(Column, usize)>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let mut positions: Vec<(Column, usize)> = Vec::new();

        for (idx, header) in headers.iter().enumerate() {
            let key = header_key(header);
            let column = COLUMN_ALIASES
                .iter()
                .find(|(_, aliases)| aliases.contains(&key.as_str()))
                .map(|(column, _)| *column);

            match column {
                // First matching header wins; later duplicates are ignored.
                Some(c) if !positions.iter().any(|(seen, _)| *seen == c) => {
                    positions.push((c, idx));
                }
                Some(_) => debug!(header, "duplicate column ignored"),
                None => debug!(header, "unrecognized column ignored"),
            }
        }

        let map = Self { positions };
        for required in [Column::Title, Column::Url] {
            if map.position(required).is_none() {
                return Err(LdGraphError::input(format!(
                    "header row is missing the required {required:?} column"
                )));
            }
        }
        Ok(map)
    }

    fn position(&self, column: Column) -> Option<usize> {
        self.positions
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, idx)| *idx)
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, column: Column) -> &'r str {
        self.position(column)
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .unwrap_or("")
    }

    fn get_opt(&self, record: &csv::StringRecord, column: Column) -> Option<String> {
        let value = self.get(record, column);
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Lowercase a header and drop everything but ASCII alphanumerics.
fn header_key(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Read and parse a tabular export from disk.
///
/// The file is read fully and the handle released before parsing begins.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_records(path: &Path) -> Result<Vec<ContentRecord>> {
    let bytes = std::fs::read(path).map_err(|e| LdGraphError::io(path, e))?;
    let content = String::from_utf8(bytes).map_err(|e| {
        LdGraphError::input(format!("{} is not valid UTF-8: {e}", path.display()))
    })?;
    parse_records(&content)
}

/// Parse tabular export text into records.
pub fn parse_records(content: &str) -> Result<Vec<ContentRecord>> {
    if content.trim().is_empty() {
        return Err(LdGraphError::input("input is empty"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .double_quote(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LdGraphError::input(format!("failed to read header row: {e}")))?
        .clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row_number = idx + 1;
        let row = row.map_err(|e| {
            LdGraphError::input(format!("malformed row {row_number}: {e}"))
        })?;

        if row.iter().all(|field| field.trim().is_empty()) {
            debug!(row = row_number, "blank row skipped");
            continue;
        }

        records.push(ContentRecord {
            row: row_number,
            title: columns.get(&row, Column::Title).to_string(),
            url: columns.get(&row, Column::Url).to_string(),
            body: columns.get(&row, Column::Body).to_string(),
            published: columns.get(&row, Column::Published).to_string(),
            created: columns.get_opt(&row, Column::Created),
            modified: columns.get_opt(&row, Column::Modified),
            categories: split_list(columns.get(&row, Column::Categories)),
            tags: split_list(columns.get(&row, Column::Tags)),
            image_url: columns.get_opt(&row, Column::Image),
            excerpt: columns.get_opt(&row, Column::Excerpt),
            author: columns.get_opt(&row, Column::Author),
        });
    }

    info!(records = records.len(), "tabular input parsed");
    Ok(records)
}

/// Split a multi-valued cell on `|`, `;` or `,`, trimming and dropping empties.
fn split_list(cell: &str) -> Vec<String> {
    cell.split(['|', ';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Title,URL,Image URL,Publish Date,Categories,Tags,Content\n";

    #[test]
    fn parses_basic_rows() {
        let input = format!(
            "{HEADER}First Post,https://example.com/first/,https://example.com/a.jpg,2024-03-05,Lighting|Gear,flash,Body text\n"
        );
        let records = parse_records(&input).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.row, 1);
        assert_eq!(r.title, "First Post");
        assert_eq!(r.url, "https://example.com/first/");
        assert_eq!(r.image_url.as_deref(), Some("https://example.com/a.jpg"));
        assert_eq!(r.categories, vec!["Lighting", "Gear"]);
        assert_eq!(r.tags, vec!["flash"]);
        assert_eq!(r.body, "Body text");
    }

    #[test]
    fn quoted_fields_with_doubled_quotes() {
        let input = format!(
            "{HEADER}\"The \"\"Golden\"\" Hour, Explained\",https://example.com/golden,,2024-01-01,\"Light, Color\",,\"Line one\nLine two\"\n"
        );
        let records = parse_records(&input).unwrap();
        assert_eq!(records[0].title, "The \"Golden\" Hour, Explained");
        assert_eq!(records[0].categories, vec!["Light", "Color"]);
        assert_eq!(records[0].body, "Line one\nLine two");
        assert!(records[0].image_url.is_none());
    }

    #[test]
    fn header_aliases_are_case_insensitive() {
        let input = "post_title;PERMALINK\n";
        // Semicolon is not the delimiter: this is one unrecognized column.
        assert!(parse_records(input).is_err());

        let input = "POST TITLE,Permalink,Featured Image\nHello,https://example.com/h,\n";
        let records = parse_records(input).unwrap();
        assert_eq!(records[0].title, "Hello");
        assert_eq!(records[0].url, "https://example.com/h");
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let err = parse_records("Title,Image\nHello,x.jpg\n").unwrap_err();
        assert!(err.to_string().contains("Url"));
    }

    #[test]
    fn empty_input_is_fatal() {
        assert!(parse_records("   \n").is_err());
    }

    #[test]
    fn short_rows_and_blank_rows_tolerated() {
        let input = format!("{HEADER}Only Title,https://example.com/x\n,,,,,,\n");
        let records = parse_records(&input).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].tags.is_empty());
        assert!(records[0].published.is_empty());
    }

    #[test]
    fn missing_title_is_kept_for_synthesizer_to_skip() {
        let input = format!("{HEADER},https://example.com/untitled\n");
        let records = parse_records(&input).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].title.is_empty());
    }

    #[test]
    fn split_list_handles_mixed_separators() {
        assert_eq!(split_list(" a | b;c ,, "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn reads_fixture_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures/csv/articles.csv");
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 5);
        assert!(records.iter().any(|r| r.tags.iter().any(|t| t == "Practice Assignment")));
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let err = read_records(Path::new("/nonexistent/ldgraph/input.csv")).unwrap_err();
        assert!(matches!(err, LdGraphError::Io { .. }));
    }
}
