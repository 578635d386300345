//! Command-line inspector for legacy Excel workbooks.
//!
//! Prints the container and BIFF metadata of each input file, then the
//! sheets with their dimensions and, unless `--info-only` is given, every
//! non-empty cell.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example xl_info -- book.xls
//! cargo run --example xl_info -- --info-only *.xls
//! cargo run --example xl_info -- book.xls --sheet 1 --max-rows 20
//! ```

use clap::Parser;
use freexl::ole::xls::cell_reference;
use freexl::{InfoKind, OpenOptions, Workbook};
use std::path::{Path, PathBuf};

/// Dump the structure and contents of .xls files
#[derive(Parser, Debug)]
#[command(name = "xl_info", about = "Inspect legacy Excel (.xls) workbooks", version)]
struct Args {
    /// Workbook file(s) to inspect
    #[arg(value_name = "INPUT", required = true)]
    input: Vec<PathBuf>,

    /// Load metadata only; skip cell values
    #[arg(long)]
    info_only: bool,

    /// Only print this sheet (0-based)
    #[arg(long, value_name = "INDEX")]
    sheet: Option<usize>,

    /// Stop after this many rows per sheet
    #[arg(long, value_name = "N")]
    max_rows: Option<u32>,
}

fn main() {
    let args = Args::parse();
    let mut failed = false;

    for path in &args.input {
        if let Err(err) = inspect(path, &args) {
            eprintln!("{}: {}", path.display(), err);
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
}

fn inspect(path: &Path, args: &Args) -> freexl::Result<()> {
    let options = if args.info_only {
        OpenOptions::info_only()
    } else {
        OpenOptions::default()
    };
    let mut workbook = Workbook::open_with(path, &options)?;

    println!("== {} ({:?})", path.display(), workbook.stream_kind());
    for kind in InfoKind::ALL {
        println!("{:>22}: {}", kind.name(), workbook.info(kind));
    }

    for index in 0..workbook.sheet_count() {
        if args.sheet.is_some_and(|only| only != index) {
            continue;
        }
        workbook.select_active_worksheet(index)?;
        let (rows, columns) = workbook.worksheet_dimensions()?;
        let sheet = workbook.sheet(index)?;
        println!(
            "-- sheet {} '{}' {:?} {:?}: {} rows x {} columns",
            index,
            sheet.name(),
            sheet.kind(),
            sheet.visibility(),
            rows,
            columns
        );

        if workbook.is_info_only() {
            continue;
        }
        let last_row = args.max_rows.map_or(rows, |max| max.min(rows));
        for row in 0..last_row {
            for col in 0..columns {
                let value = workbook.cell(row, col)?;
                if !value.is_null() {
                    println!(
                        "{:>8} {:?}: {}",
                        cell_reference(row, u32::from(col)),
                        value.kind(),
                        value
                    );
                }
            }
        }
    }

    workbook.close();
    Ok(())
}
