//! # Conversion Orchestrator
//!
//! Runs the whole pipeline for one workbook: extract a sheet, project the selected
//! columns, build the table, render both outputs in memory and only then write
//! `<base>.docx` and `<base>.pdf` to the output directory.
//!
//! Naming a sheet converts just that sheet and returns its first error. Without a
//! sheet every sheet of the workbook is converted in order; each outcome is recorded
//! in a [`ConversionReport`] and one failing sheet does not stop the others unless
//! [`ConversionRequest::fail_fast`] is set.
use crate::document::write_docx;
use crate::error::{ConvertError, ResultMessage};
use crate::render::{self, Font, FontSource, PageSpec, DEFAULT_TITLE};
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::Workbook;
use crate::table::{project, ColumnSelection, StyleMode, TableModel};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything one conversion needs, with defaults matching the command line.
#[derive(Clone, Debug)]
pub struct ConversionRequest {
    pub source: PathBuf,
    /// Defaults to the directory of the source file
    pub output_dir: Option<PathBuf>,
    /// None converts every sheet
    pub sheet: Option<String>,
    /// Comma separated glob patterns limiting which sheets a batch converts
    pub sheet_patterns: Option<String>,
    pub columns: ColumnSelection,
    pub style: StyleMode,
    pub page: PageSpec,
    pub font: FontSource,
    pub title: String,
    pub fail_fast: bool,
}

impl ConversionRequest {
    pub fn new<P: Into<PathBuf>>(source: P) -> Self {
        ConversionRequest {
            source: source.into(),
            output_dir: None,
            sheet: None,
            sheet_patterns: None,
            columns: ColumnSelection::default(),
            style: StyleMode::default(),
            page: PageSpec::default(),
            font: FontSource::default(),
            title: DEFAULT_TITLE.to_owned(),
            fail_fast: false,
        }
    }

    pub fn output_dir<P: Into<PathBuf>>(mut self, output_dir: P) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn sheet<S: Into<String>>(mut self, sheet: S) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn sheet_patterns<S: Into<String>>(mut self, patterns: S) -> Self {
        self.sheet_patterns = Some(patterns.into());
        self
    }

    pub fn columns(mut self, columns: ColumnSelection) -> Self {
        self.columns = columns;
        self
    }

    pub fn style(mut self, style: StyleMode) -> Self {
        self.style = style;
        self
    }

    pub fn page(mut self, page: PageSpec) -> Self {
        self.page = page;
        self
    }

    pub fn font(mut self, font: FontSource) -> Self {
        self.font = font;
        self
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Files written for one sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionOutput {
    pub sheet: String,
    pub document_path: PathBuf,
    pub pdf_path: PathBuf,
    pub pages: usize,
    /// Table rows, including the header row
    pub rows: usize,
}

#[derive(Debug)]
pub struct SheetOutcome {
    pub sheet: String,
    pub result: Result<ConversionOutput, ConvertError>,
}

/// Per-sheet results in workbook order.
#[derive(Debug, Default)]
pub struct ConversionReport {
    outcomes: Vec<SheetOutcome>,
}

impl ConversionReport {
    pub fn outcomes(&self) -> &[SheetOutcome] {
        &self.outcomes
    }

    pub fn outputs(&self) -> impl Iterator<Item = &ConversionOutput> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ConvertError)> {
        self.outcomes.iter().filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .err()
                .map(|error| (outcome.sheet.as_str(), error))
        })
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }
}

/// Converts the requested sheet, or every sheet, of a workbook.
///
/// # Errors
///
/// Opening errors (`SourceNotFound`, `UnsupportedFormat`, `SourceReadError`) and an
/// invalid sheet pattern always fail the call. In single-sheet mode any error of
/// that sheet fails the call too; in batch mode sheet errors land in the report.
pub fn convert(request: &ConversionRequest) -> Result<ConversionReport, ConvertError> {
    let mut workbook = Workbook::open(&request.source)?;
    let output_dir = request
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&request.source));
    let base_name = base_name(&request.source);

    if let Some(sheet) = &request.sheet {
        let paths = OutputNames::new(&output_dir, &base_name, false).next(sheet);
        let output = convert_sheet(&mut workbook, sheet, &paths, request)?;
        return Ok(ConversionReport {
            outcomes: vec![SheetOutcome {
                sheet: sheet.to_owned(),
                result: Ok(output),
            }],
        });
    }

    let criteria = Criteria::parse(request.sheet_patterns.as_deref())?;
    let sheets: Vec<String> = workbook
        .sheet_names()
        .iter()
        .filter(|name| criteria.accept(name))
        .cloned()
        .collect();
    debug!(source = %request.source.display(), sheets = sheets.len(), "batch conversion");

    let mut names = OutputNames::new(&output_dir, &base_name, sheets.len() > 1);
    let mut outcomes = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let paths = names.next(&sheet);
        let result = convert_sheet(&mut workbook, &sheet, &paths, request);
        let failed = match &result {
            Ok(_) => false,
            Err(error) => {
                warn!(sheet = %sheet, %error, "sheet conversion failed");
                true
            }
        };
        outcomes.push(SheetOutcome { sheet, result });
        if failed && request.fail_fast {
            break;
        }
    }
    Ok(ConversionReport { outcomes })
}

/// Returns the sheet names of a workbook in workbook order.
pub fn list_sheets<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ConvertError> {
    Ok(Workbook::open(path)?.sheet_names().to_vec())
}

fn convert_sheet(
    workbook: &mut Workbook,
    sheet: &str,
    paths: &OutputPaths,
    request: &ConversionRequest,
) -> Result<ConversionOutput, ConvertError> {
    let grid = workbook.extract(sheet)?;
    let indices = request.columns.resolve(grid.width())?;
    let model = TableModel::build(project(&grid, &indices), request.style);

    let mut chars = model.characters();
    chars.extend(request.title.chars().filter(|c| !c.is_control()));
    let font = Font::load(&request.font, &chars);

    let rendered = render::render(&model, &request.page, &font, &request.title).map_err(|source| {
        ConvertError::RenderError {
            sheet: sheet.to_owned(),
            source,
        }
    })?;
    let document = write_docx(&model, &request.title)
        .with_prefix(&format!("Write document for sheet '{}'", sheet))?;

    if let Some(dir) = paths.pdf.parent() {
        fs::create_dir_all(dir)
            .map_err(ConvertError::from)
            .with_prefix(&format!("Create output directory '{}'", dir.display()))?;
    }
    fs::write(&paths.document, document)
        .map_err(ConvertError::from)
        .with_prefix(&format!("Write '{}'", paths.document.display()))?;
    fs::write(&paths.pdf, &rendered.pdf)
        .map_err(ConvertError::from)
        .with_prefix(&format!("Write '{}'", paths.pdf.display()))?;

    info!(
        sheet,
        pdf = %paths.pdf.display(),
        pages = rendered.page_count(),
        rows = model.rows().len(),
        font = font.name(),
        "converted sheet"
    );
    Ok(ConversionOutput {
        sheet: sheet.to_owned(),
        document_path: paths.document.clone(),
        pdf_path: paths.pdf.clone(),
        pages: rendered.page_count(),
        rows: model.rows().len(),
    })
}

fn default_output_dir(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn base_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_owned())
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct OutputPaths {
    document: PathBuf,
    pdf: PathBuf,
}

/// Hands out output paths, appending the sheet name when a run writes several sheets.
struct OutputNames {
    dir: PathBuf,
    base_name: String,
    per_sheet: bool,
    used: HashSet<String>,
}

impl OutputNames {
    fn new(dir: &Path, base_name: &str, per_sheet: bool) -> Self {
        OutputNames {
            dir: dir.to_path_buf(),
            base_name: base_name.to_owned(),
            per_sheet,
            used: HashSet::new(),
        }
    }

    fn next(&mut self, sheet: &str) -> OutputPaths {
        let stem = if self.per_sheet {
            let name = format!("{}_{}", self.base_name, sanitize_file_name(sheet));
            let mut candidate = name.clone();
            let mut counter = 2;
            while self.used.contains(&candidate) {
                candidate = format!("{name}_{counter}");
                counter += 1;
            }
            self.used.insert(candidate.clone());
            candidate
        } else {
            self.base_name.clone()
        };
        OutputPaths {
            document: self.dir.join(format!("{stem}.docx")),
            pdf: self.dir.join(format!("{stem}.pdf")),
        }
    }
}

/// Replaces characters file systems reject and trims trailing dots and spaces.
fn sanitize_file_name(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
                '_'
            } else {
                c
            }
        })
        .collect();
    let name = name.trim().trim_end_matches('.');
    if name.is_empty() {
        "sheet".to_owned()
    } else {
        name.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_defaults() {
        let request = ConversionRequest::new("data/book.xlsx");
        assert_eq!(request.columns, ColumnSelection::Default);
        assert_eq!(request.style, StyleMode::TextOnly);
        assert_eq!(request.title, "Excel Data Export");
        assert_eq!(request.font, FontSource::System);
        assert!(!request.fail_fast);
        assert_eq!(default_output_dir(&request.source), PathBuf::from("data"));
        assert_eq!(base_name(&request.source), "book");
    }

    #[test]
    fn bare_file_name_writes_to_current_directory() {
        assert_eq!(default_output_dir(Path::new("book.xlsx")), PathBuf::from("."));
    }

    #[test]
    fn single_sheet_keeps_the_base_name() {
        let mut names = OutputNames::new(Path::new("out"), "book", false);
        assert_eq!(
            names.next("Sheet1"),
            OutputPaths {
                document: PathBuf::from("out/book.docx"),
                pdf: PathBuf::from("out/book.pdf"),
            }
        );
    }

    #[test]
    fn batch_names_are_unique() {
        let mut names = OutputNames::new(Path::new("out"), "book", true);
        assert_eq!(names.next("Data").pdf, PathBuf::from("out/book_Data.pdf"));
        assert_eq!(names.next("a/b").pdf, PathBuf::from("out/book_a_b.pdf"));
        assert_eq!(names.next("a:b").pdf, PathBuf::from("out/book_a_b_2.pdf"));
        assert_eq!(names.next("a?b").pdf, PathBuf::from("out/book_a_b_3.pdf"));
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("Q1/Q2"), "Q1_Q2");
        assert_eq!(sanitize_file_name(" Summary. "), "Summary");
        assert_eq!(sanitize_file_name("..."), "sheet");
        assert_eq!(sanitize_file_name("売上"), "売上");
    }

    #[test]
    fn report_partitions_outcomes() {
        let report = ConversionReport {
            outcomes: vec![
                SheetOutcome {
                    sheet: "A".to_owned(),
                    result: Ok(ConversionOutput {
                        sheet: "A".to_owned(),
                        document_path: PathBuf::from("a.docx"),
                        pdf_path: PathBuf::from("a.pdf"),
                        pages: 1,
                        rows: 2,
                    }),
                },
                SheetOutcome {
                    sheet: "B".to_owned(),
                    result: Err(ConvertError::WithContextError("boom".to_owned())),
                },
            ],
        };
        assert!(!report.is_success());
        assert_eq!(report.outputs().count(), 1);
        assert_eq!(report.failures().map(|(sheet, _)| sheet).collect::<Vec<_>>(), vec!["B"]);
    }
}
