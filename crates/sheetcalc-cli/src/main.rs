//! Sheetcalc CLI - evaluate spreadsheet formulas from the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lazy_regex::regex_captures;
use sheetcalc::prelude::*;
use sheetcalc::{builtin_functions, FunctionRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetcalc")]
#[command(author, version, about = "Spreadsheet formula calculator")]
struct Cli {
    /// Log evaluation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula and print its value
    Eval {
        /// Formula text; the leading '=' is optional
        formula: String,

        /// Compatibility mode: excel, openoffice or gnumeric
        #[arg(short, long, default_value = "excel")]
        mode: CompatibilityMode,

        /// Cell content on the first sheet, e.g. A1=42, B2=hello or C3==A1*2
        #[arg(short, long = "cell", value_parser = parse_assignment)]
        cells: Vec<Assignment>,

        /// Row number (1-based) to hide
        #[arg(long = "hidden-row")]
        hidden_rows: Vec<u32>,

        /// Localized spelling of TRUE
        #[arg(long, default_value = "TRUE")]
        true_token: String,

        /// Localized spelling of FALSE
        #[arg(long, default_value = "FALSE")]
        false_token: String,
    },

    /// List the built-in functions
    Functions,
}

/// One `--cell ADDRESS=CONTENT` option
#[derive(Debug, Clone, PartialEq)]
struct Assignment {
    address: String,
    content: String,
}

fn parse_assignment(s: &str) -> std::result::Result<Assignment, String> {
    let (_, address, content) = regex_captures!(r"^\s*(\$?[A-Za-z]{1,3}\$?[0-9]+)\s*=(.*)$", s)
        .ok_or_else(|| format!("expected ADDRESS=CONTENT, got '{s}'"))?;
    Ok(Assignment {
        address: address.to_uppercase(),
        content: content.to_string(),
    })
}

/// Interpret typed cell content the way a spreadsheet does
fn cell_content(content: &str, settings: &CalcSettings) -> CellValue {
    if content.is_empty() {
        return CellValue::Empty;
    }
    if let Some(n) = content.trim().parse::<f64>().ok().filter(|n| n.is_finite()) {
        return CellValue::Number(n);
    }
    if let Some(b) = settings.parse_boolean(content.trim()) {
        return CellValue::Boolean(b);
    }
    if let Ok(code) = content.trim().parse::<ErrorCode>() {
        return CellValue::Error(code);
    }
    CellValue::from(content)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Eval {
            formula,
            mode,
            cells,
            hidden_rows,
            true_token,
            false_token,
        } => {
            let settings =
                CalcSettings::new(mode).with_boolean_tokens(true_token, false_token);
            let value = eval(&formula, &settings, &cells, &hidden_rows)?;
            println!("{}", value.as_display_string());
            Ok(())
        }
        Commands::Functions => {
            list_functions(builtin_functions());
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn eval(
    formula: &str,
    settings: &CalcSettings,
    cells: &[Assignment],
    hidden_rows: &[u32],
) -> Result<Value> {
    let mut workbook = Workbook::new();
    let sheet = workbook
        .worksheet_mut(0)
        .context("Workbook has no first sheet")?;

    let mut formula_cells = Vec::new();
    for cell in cells {
        if cell.content.starts_with('=') {
            sheet
                .set_cell_formula(&cell.address, &cell.content)
                .with_context(|| format!("Failed to set formula in {}", cell.address))?;
            formula_cells.push(cell.address.as_str());
        } else {
            sheet
                .set_cell_value(&cell.address, cell_content(&cell.content, settings))
                .with_context(|| format!("Failed to set {}", cell.address))?;
        }
    }
    for &row in hidden_rows {
        if row == 0 {
            bail!("Row numbers start at 1");
        }
        sheet.set_row_hidden(row - 1, true);
    }

    // formula cells see the results of those given before them
    for address in formula_cells {
        let value = workbook
            .store_formula_result(0, address, settings)
            .with_context(|| format!("Failed to evaluate {address}"))?;
        tracing::debug!("{address} = {}", value.as_display_string());
    }

    let formula = if formula.starts_with('=') {
        formula.to_string()
    } else {
        format!("={formula}")
    };
    workbook
        .evaluate_at(0, "A1", &formula, settings)
        .context("Failed to evaluate formula")
}

fn list_functions(registry: &FunctionRegistry) {
    for def in registry.definitions() {
        let volatile = if def.volatile { " (volatile)" } else { "" };
        println!("{:<12} {} args{}", def.name, def.arity(), volatile);
    }
    println!("\nTotal: {} functions", registry.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assignment(s: &str) -> Assignment {
        parse_assignment(s).unwrap()
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            assignment("a1=42"),
            Assignment {
                address: "A1".into(),
                content: "42".into()
            }
        );
        assert_eq!(assignment("B2==A1*2").content, "=A1*2");
        assert_eq!(assignment("C3=").content, "");
        assert!(parse_assignment("42").is_err());
        assert!(parse_assignment("=A1").is_err());
    }

    #[test]
    fn test_cell_content() {
        let settings = CalcSettings::default();
        assert_eq!(cell_content("1.5", &settings), CellValue::Number(1.5));
        assert_eq!(cell_content("true", &settings), CellValue::Boolean(true));
        assert_eq!(
            cell_content("#N/A", &settings),
            CellValue::Error(ErrorCode::Na)
        );
        assert_eq!(cell_content("hello", &settings), CellValue::from("hello"));
        assert_eq!(cell_content("", &settings), CellValue::Empty);
    }

    #[test]
    fn test_eval_with_cells_and_hidden_rows() {
        let settings = CalcSettings::default();
        let cells = vec![
            assignment("A1=1"),
            assignment("A2=2"),
            assignment("A3=4"),
            assignment("B1==SUM(A1:A3)"),
        ];
        assert_eq!(
            eval("SUBTOTAL(109,A1:A3)", &settings, &cells, &[2]).unwrap(),
            Value::Number(5.0)
        );
        assert_eq!(
            eval("=B1*2", &settings, &cells, &[]).unwrap(),
            Value::Number(14.0)
        );
        assert!(eval("=1", &settings, &cells, &[0]).is_err());
    }
}
