use anyhow::{bail, Context, Result};
use clap::Parser;
use rusty_sheet_pdf::{
    convert, list_sheets, ColumnSelection, ConversionRequest, FontSource, StyleMode, DEFAULT_TITLE,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Render spreadsheet sheets as paginated PDF tables.
#[derive(Debug, Parser)]
#[command(name = "rusty-sheet-pdf", version, about)]
struct Cli {
    /// Workbook to convert (.xlsx, .xlsm or .xls)
    source: PathBuf,

    /// Output directory, defaults to the directory of the workbook
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Convert only this sheet; all sheets are converted when omitted
    #[arg(short, long)]
    sheet: Option<String>,

    /// Comma separated glob patterns selecting sheets when converting all sheets
    #[arg(long, conflicts_with = "sheet")]
    sheets: Option<String>,

    /// Columns to keep: "B", "ALL" or letters such as "A,C,AA"
    #[arg(short, long, default_value = "B")]
    columns: String,

    /// Draw header highlight, cell backgrounds and grid lines
    #[arg(long)]
    decorated: bool,

    /// TrueType font file to embed
    #[arg(long, conflicts_with = "builtin_font")]
    font: Option<PathBuf>,

    /// Use the standard Helvetica font instead of searching installed fonts
    #[arg(long)]
    builtin_font: bool,

    /// Title printed at the top of the first page
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// Stop at the first sheet that fails
    #[arg(long)]
    fail_fast: bool,

    /// Print the sheet names and exit
    #[arg(long)]
    list_sheets: bool,
}

impl Cli {
    fn request(&self) -> Result<ConversionRequest> {
        let columns = ColumnSelection::parse(&self.columns).context("Invalid --columns")?;
        let font = match (&self.font, self.builtin_font) {
            (Some(path), _) => FontSource::File(path.clone()),
            (None, true) => FontSource::Builtin,
            (None, false) => FontSource::System,
        };
        let mut request = ConversionRequest::new(&self.source)
            .columns(columns)
            .style(StyleMode::from_text_only(!self.decorated))
            .font(font)
            .title(&self.title)
            .fail_fast(self.fail_fast);
        if let Some(output_dir) = &self.output_dir {
            request = request.output_dir(output_dir);
        }
        if let Some(sheet) = &self.sheet {
            request = request.sheet(sheet);
        }
        if let Some(patterns) = &self.sheets {
            request = request.sheet_patterns(patterns);
        }
        Ok(request)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.list_sheets {
        let sheets = list_sheets(&cli.source)
            .with_context(|| format!("List sheets of '{}' failed", cli.source.display()))?;
        for sheet in sheets {
            println!("{sheet}");
        }
        return Ok(());
    }

    let request = cli.request()?;
    let report = convert(&request)
        .with_context(|| format!("Convert '{}' failed", cli.source.display()))?;
    for output in report.outputs() {
        println!(
            "{}: {} ({} pages), {}",
            output.sheet,
            output.pdf_path.display(),
            output.pages,
            output.document_path.display()
        );
    }
    let failures: Vec<String> = report
        .failures()
        .map(|(sheet, error)| format!("{sheet}: {error}"))
        .collect();
    if !failures.is_empty() {
        for failure in &failures {
            eprintln!("{failure}");
        }
        bail!("{} of {} sheets failed", failures.len(), report.outcomes().len());
    }
    Ok(())
}
