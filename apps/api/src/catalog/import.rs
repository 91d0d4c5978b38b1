//! CSV catalog import. Deliberately simple ETL: one storefront export row
//! per line, quote-aware field splitting, reader-type labels mapped to age
//! ranges, upsert keyed on (title, author).

use serde::Serialize;
use tracing::info;

use crate::models::book::{AgeRange, BookInput};
use crate::store::Store;

/// Columns the storefront export must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Title",
    "Vendor",
    "Type",
    "Tags",
    "Image Src",
    "Genre (product.metafields.shopify.genre)",
];

/// Reader-type labels as exported by the storefront, with their age spans.
const READER_TYPES: [(&str, u8, u8); 5] = [
    ("early-readers", 3, 5),
    ("emerging-readers", 6, 8),
    ("junior-readers", 9, 10),
    ("preteen-readers", 11, 12),
    ("teen-readers", 13, 18),
];

/// Fallback range when a row carries no recognized reader type.
const DEFAULT_AGE_RANGE: AgeRange = AgeRange { min: 4, max: 14 };

/// Cap on per-row errors echoed back to the caller.
const MAX_REPORTED_ERRORS: usize = 100;

#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    pub message: String,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}

/// Imports a CSV export into the catalog.
pub async fn import_csv(store: &dyn Store, text: &str) -> Result<ImportOutcome, String> {
    let mut lines = text.lines();
    let header_line = lines.next().ok_or_else(|| "CSV file is empty".to_string())?;
    let header = split_csv_line(header_line);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !header.iter().any(|h| h == *col))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing required columns: {}", missing.join(", ")));
    }

    let column = |name: &str| header.iter().position(|h| h == name);
    let title_idx = column("Title").unwrap_or(0);
    let vendor_idx = column("Vendor").unwrap_or(0);
    let type_idx = column("Type").unwrap_or(0);
    let tags_idx = column("Tags").unwrap_or(0);
    let image_idx = column("Image Src").unwrap_or(0);
    let genre_idx = column("Genre (product.metafields.shopify.genre)").unwrap_or(0);

    let mut success_count = 0usize;
    let mut error_count = 0usize;
    let mut errors = Vec::new();

    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_csv_line(line);
        let field = |idx: usize| fields.get(idx).map(String::as_str).unwrap_or("");

        let title = field(title_idx).trim().to_string();
        if title.is_empty() {
            error_count += 1;
            errors.push(format!("Row {}: Empty title", line_no + 2));
            continue;
        }

        let author = {
            let vendor = field(vendor_idx).trim();
            if vendor.is_empty() {
                "Unknown".to_string()
            } else {
                vendor.to_string()
            }
        };
        let image = {
            let src = field(image_idx).trim();
            (!src.is_empty()).then(|| src.to_string())
        };

        let input = BookInput {
            title,
            author,
            genres: split_semicolon_list(field(genre_idx)),
            age_range: age_range_for_reader_types(field(type_idx)),
            description: None,
            tags: split_semicolon_list(field(tags_idx)),
            image,
        };

        match store.upsert_book(input).await {
            Ok(_) => success_count += 1,
            Err(e) => {
                error_count += 1;
                errors.push(format!("Row {}: {e}", line_no + 2));
            }
        }
    }

    errors.truncate(MAX_REPORTED_ERRORS);
    info!("catalog import finished: {success_count} ok, {error_count} failed");

    Ok(ImportOutcome {
        message: "Import completed".to_string(),
        success_count,
        error_count,
        errors,
    })
}

/// Maps a semicolon-separated reader-type cell to the union of the matching
/// age spans, or the default range when none match.
pub fn age_range_for_reader_types(cell: &str) -> AgeRange {
    let mut min = u8::MAX;
    let mut max = 0u8;
    for reader_type in cell.split(';').map(str::trim) {
        if let Some((_, lo, hi)) = READER_TYPES.iter().find(|(label, _, _)| *label == reader_type)
        {
            min = min.min(*lo);
            max = max.max(*hi);
        }
    }
    if min == u8::MAX {
        DEFAULT_AGE_RANGE
    } else {
        AgeRange { min, max }
    }
}

pub fn split_semicolon_list(cell: &str) -> Vec<String> {
    cell.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits one CSV line into fields, honoring double-quoted cells and the
/// doubled-quote escape. Multi-line cells are out of scope.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::{BookFilter, Store};

    #[test]
    fn test_split_csv_line_handles_quoted_commas() {
        let fields = split_csv_line(r#"Dog Man,"Pilkey, Dav",emerging-readers"#);
        assert_eq!(fields, vec!["Dog Man", "Pilkey, Dav", "emerging-readers"]);
    }

    #[test]
    fn test_split_csv_line_handles_escaped_quotes() {
        let fields = split_csv_line(r#""The ""Best"" Book",Author"#);
        assert_eq!(fields, vec![r#"The "Best" Book"#, "Author"]);
    }

    #[test]
    fn test_reader_types_merge_to_widest_span() {
        let range = age_range_for_reader_types("early-readers; junior-readers");
        assert_eq!(range, AgeRange { min: 3, max: 10 });
    }

    #[test]
    fn test_reader_types_default_when_unrecognized() {
        assert_eq!(age_range_for_reader_types(""), AgeRange { min: 4, max: 14 });
        assert_eq!(
            age_range_for_reader_types("grown-ups"),
            AgeRange { min: 4, max: 14 }
        );
    }

    #[test]
    fn test_semicolon_list_trims_and_drops_blanks() {
        assert_eq!(
            split_semicolon_list("Fantasy; Adventure; ;Humor"),
            vec!["Fantasy", "Adventure", "Humor"]
        );
        assert!(split_semicolon_list("").is_empty());
    }

    const HEADER: &str =
        "Title,Vendor,Type,Tags,Image Src,Genre (product.metafields.shopify.genre)";

    #[tokio::test]
    async fn test_import_inserts_rows_and_reports_empty_titles() {
        let store = MemoryStore::new();
        let csv = format!(
            "{HEADER}\n\
             Dog Man,Dav Pilkey,emerging-readers,funny;graphic,https://img/dogman.jpg,Humor;Adventure\n\
             ,Nobody,early-readers,,,Fantasy\n\
             Amulet,Kazu Kibuishi,junior-readers;preteen-readers,,,Fantasy"
        );
        let outcome = import_csv(&store, &csv).await.unwrap();
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.error_count, 1);
        assert!(outcome.errors[0].contains("Empty title"));

        let books = store.find_books(&BookFilter::default()).await.unwrap();
        assert_eq!(books.len(), 2);
        let amulet = books.iter().find(|b| b.title == "Amulet").unwrap();
        assert_eq!(amulet.age_range, AgeRange { min: 9, max: 12 });
        assert_eq!(amulet.genres, vec!["Fantasy"]);
    }

    #[tokio::test]
    async fn test_import_rejects_missing_columns() {
        let store = MemoryStore::new();
        let err = import_csv(&store, "Title,Vendor\nDog Man,Dav Pilkey")
            .await
            .unwrap_err();
        assert!(err.contains("Missing required columns"));
        assert!(err.contains("Type"));
    }

    #[tokio::test]
    async fn test_import_upserts_duplicate_rows() {
        let store = MemoryStore::new();
        let csv = format!(
            "{HEADER}\n\
             Dog Man,Dav Pilkey,emerging-readers,,,Humor\n\
             Dog Man,Dav Pilkey,emerging-readers,,,Humor;Adventure"
        );
        let outcome = import_csv(&store, &csv).await.unwrap();
        assert_eq!(outcome.success_count, 2);
        assert_eq!(store.count_books().await.unwrap(), 1);
    }
}
