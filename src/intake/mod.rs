//! Intake of lookup requests
//!
//! A request arrives as a free-text form body naming the requester plus a list
//! of identifiers, either as an `.xlsx` workbook or as plain text. Identifiers
//! are passed on verbatim; validation is the classifier's job so malformed
//! tokens still show up as error rows.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};

use crate::error::{DigipostError, Result};

/// Label preceding the requester address in the intake form
pub const EMAIL_LABEL: &str = "E-mail:";

/// Column headers recognised on the first row of an identifier list
const HEADER_NAMES: [&str; 5] = ["cpr", "cvr", "id", "identifier", "cpr/cvr"];

/// File extensions read as workbooks
const WORKBOOK_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

/// How the first non-blank row of an identifier list is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum HeaderRow {
    /// Skip it when its first column is a known header name
    #[default]
    Detect,
    /// Always skip it
    Always,
    /// Never skip it
    Never,
}

impl HeaderRow {
    fn skips(self, first_column: &str) -> bool {
        match self {
            Self::Detect => HEADER_NAMES
                .iter()
                .any(|name| first_column.eq_ignore_ascii_case(name)),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// One lookup request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeRequest {
    /// Address the report is sent to
    pub requester: String,
    /// Raw identifier tokens in input order
    pub identifiers: Vec<String>,
    /// Requested concurrency, if the form asked for one
    pub thread_count: Option<usize>,
}

impl IntakeRequest {
    pub fn new(requester: impl Into<String>, identifiers: Vec<String>) -> Result<Self> {
        let requester = requester.into().trim().to_string();
        validate_address(&requester)?;
        Ok(Self {
            requester,
            identifiers,
            thread_count: None,
        })
    }

    /// Build a request from a form body and a text identifier list
    pub fn from_form(form_body: &str, identifier_list: &str) -> Result<Self> {
        let requester = requester_from_form_body(form_body)?;
        Self::new(
            requester,
            parse_identifier_list(identifier_list, HeaderRow::Detect),
        )
    }

    /// Build a request from the bytes of an `.xlsx` attachment
    pub fn from_xlsx(requester: impl Into<String>, bytes: &[u8], header: HeaderRow) -> Result<Self> {
        Self::new(requester, parse_identifier_workbook(bytes, header)?)
    }

    /// Read the identifier list from a file
    ///
    /// `.xlsx`/`.xlsm` files are read as workbooks, anything else as text.
    pub fn from_path(requester: impl Into<String>, path: &Path, header: HeaderRow) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            DigipostError::Intake(format!(
                "Failed to read identifier list {}: {e}",
                path.display()
            ))
        })?;

        if is_workbook(path) {
            log::debug!("Reading identifiers from workbook {}", path.display());
            return Self::from_xlsx(requester, &bytes, header);
        }

        let text = String::from_utf8(bytes).map_err(|e| {
            DigipostError::Intake(format!("{} is not UTF-8 text: {e}", path.display()))
        })?;
        Self::new(requester, parse_identifier_list(&text, header))
    }

    /// Request a specific concurrency level
    #[must_use]
    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = Some(thread_count);
        self
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn validate_address(address: &str) -> Result<()> {
    let valid = address
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
        && !address.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(DigipostError::Intake(format!(
            "Invalid requester address: '{address}'"
        )))
    }
}

/// Find the requester address in an intake form body
///
/// The address is the first whitespace-delimited token after `E-mail:`.
pub fn requester_from_form_body(body: &str) -> Result<String> {
    body.match_indices(EMAIL_LABEL)
        .find_map(|(at, label)| body[at + label.len()..].split_whitespace().next())
        .map(str::to_string)
        .ok_or_else(|| {
            DigipostError::Intake(format!("No '{EMAIL_LABEL}' line found in form body"))
        })
}

/// Keep non-blank first-column values, applying the header rule to the first
fn collect_identifiers<I>(first_columns: I, header: HeaderRow) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut tokens = Vec::new();
    let mut header_checked = false;
    for value in first_columns.into_iter().flatten() {
        if !header_checked {
            header_checked = true;
            if header.skips(&value) {
                continue;
            }
        }
        tokens.push(value);
    }
    tokens
}

/// Split a text identifier list into raw tokens
///
/// One identifier per line. For delimited lines (`;`, `,` or tab) only the
/// first column is used. Blank lines are skipped; the first non-blank line is
/// handled according to `header`.
#[must_use]
pub fn parse_identifier_list(text: &str, header: HeaderRow) -> Vec<String> {
    let first_columns = text.lines().map(|line| {
        let first = line
            .split([';', ',', '\t'])
            .next()
            .unwrap_or(line)
            .trim()
            .trim_matches('"');
        (!first.is_empty()).then(|| first.to_string())
    });
    collect_identifiers(first_columns, header)
}

/// Read column A of the first worksheet of an `.xlsx` workbook
///
/// Text cells are taken as-is, so identifiers stored as text keep their
/// leading zeros. Numeric cells are rendered without a decimal part. Empty
/// cells are skipped and the first non-empty row is handled according to
/// `header`.
pub fn parse_identifier_workbook(bytes: &[u8], header: HeaderRow) -> Result<Vec<String>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| DigipostError::Intake(format!("Failed to open workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DigipostError::Intake("Workbook has no worksheets".to_string()))?
        .map_err(|e| DigipostError::Intake(format!("Failed to read worksheet: {e}")))?;

    let (Some((first_row, _)), Some((last_row, _))) = (range.start(), range.end()) else {
        return Ok(Vec::new());
    };

    let first_columns = (first_row..=last_row).map(|row| range.get_value((row, 0)).and_then(cell_text));
    Ok(collect_identifiers(first_columns, header))
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        other => other.to_string().trim().to_string(),
    };
    (!text.is_empty()).then_some(text)
}
