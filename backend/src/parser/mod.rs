//! Delimited-file reader with encoding and delimiter auto-detection.
//!
//! Bank exports arrive as UTF-8, Latin-1 or Windows-1252 with `,` or `;`
//! separators depending on the source system. This module turns raw bytes
//! into a header plus string rows; `records` maps those rows onto the
//! transaction and rate models.

pub mod records;

use std::path::Path;

use crate::error::{DatasetError, DatasetResult};

pub use records::{to_rates, to_transaction_table};

/// Rows of one file with the settings used to read it
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    /// Trimmed header names
    pub headers: Vec<String>,
    /// One entry per data row, padded to the header width
    pub rows: Vec<Vec<String>>,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is taken as UTF-8 as-is; chardet is only asked about bytes
/// that are not, since its guesses on short UTF-8 text with a few accented
/// characters tend to come back as a single-byte charset.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;
    match charset.to_lowercase().as_str() {
        // Not valid UTF-8 whatever chardet says
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" | "" => "windows-1252".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ if encoding_rs::Encoding::for_label(charset.as_bytes()).is_some() => charset,
        _ => "windows-1252".to_string(),
    }
}

/// Decode bytes with the given encoding, dropping a leading BOM.
///
/// Bytes that are invalid in `encoding`, or an encoding label encoding_rs
/// does not know, are an error rather than replacement characters.
pub fn decode_content(bytes: &[u8], encoding: &str, path: &Path) -> DatasetResult<String> {
    let encoding_err = |message: String| DatasetError::Encoding {
        path: path.to_path_buf(),
        message,
    };

    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" => encoding_rs::UTF_8
            .decode_without_bom_handling_and_without_replacement(bytes)
            .ok_or_else(|| encoding_err("invalid UTF-8".to_string()))?
            .into_owned(),
        label => {
            let codec = encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| encoding_err(format!("unsupported encoding '{}'", label)))?;
            let (text, _, had_errors) = codec.decode(bytes);
            if had_errors {
                return Err(encoding_err(format!("invalid {} content", codec.name())));
            }
            text.into_owned()
        }
    };

    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Ties go to `,`.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Read a file with auto-detection of encoding and delimiter.
pub fn parse_file_auto(path: &Path) -> DatasetResult<ParseResult> {
    let bytes = std::fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_bytes_auto(&bytes, path)
}

/// Parse bytes with auto-detection. `path` is only used in errors.
pub fn parse_bytes_auto(bytes: &[u8], path: &Path) -> DatasetResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let (encoding, content) = match decode_content(bytes, &encoding, path) {
        Ok(content) => (encoding, content),
        // chardet picked a multi-byte charset the bytes do not fit
        Err(DatasetError::Encoding { .. }) if encoding != "utf-8" => {
            let content = decode_content(bytes, "windows-1252", path)?;
            ("windows-1252".to_string(), content)
        }
        Err(e) => return Err(e),
    };
    let delimiter = detect_delimiter(&content);

    parse_str(&content, delimiter, encoding, path)
}

/// Parse decoded content with an explicit delimiter.
pub fn parse_str(content: &str, delimiter: char, encoding: String, path: &Path) -> DatasetResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(DatasetError::EmptyFile(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DatasetError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().trim_matches('"').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| DatasetError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let row: Vec<String> = (0..headers.len())
            .map(|i| record.get(i).unwrap_or("").to_string())
            .collect();
        rows.push(row);
    }

    Ok(ParseResult {
        headers,
        rows,
        encoding,
        delimiter,
    })
}
