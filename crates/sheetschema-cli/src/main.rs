//! sheetschema CLI - compile schema workbooks to JSON

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sheetschema::{tool_catalog_from_path, CompilerOptions, Dictionary, SchemaCompiler};
use sheetschema_xlsx::XlsxReader;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetschema")]
#[command(author, version, about = "Compile schema-authoring workbooks into schemas")]
struct Cli {
    /// Log compiler progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a workbook and print the result as JSON
    Compile {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON list of known tools, used to resolve tool references
        #[arg(short, long)]
        tools: Option<PathBuf>,

        /// JSON file overriding header labels and keywords
        #[arg(short, long)]
        dictionary: Option<PathBuf>,

        /// Emit complete schemas instead of summaries
        #[arg(long)]
        full: bool,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,

        /// Exit with an error when the workbook has problems
        #[arg(long)]
        strict: bool,
    },

    /// List all sheets in a workbook
    Sheets {
        /// Input workbook
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile {
            input,
            output,
            tools,
            dictionary,
            full,
            pretty,
            strict,
        } => compile(
            &input,
            output.as_deref(),
            tools.as_deref(),
            dictionary.as_deref(),
            full,
            pretty,
            strict,
        ),
        Commands::Sheets { input } => list_sheets(&input),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

fn compile(
    input: &Path,
    output: Option<&Path>,
    tools: Option<&Path>,
    dictionary: Option<&Path>,
    full: bool,
    pretty: bool,
    strict: bool,
) -> Result<()> {
    let mut options = CompilerOptions::default();
    if let Some(path) = dictionary {
        options = options.with_dictionary(load_dictionary(path)?);
    }

    let mut compiler = SchemaCompiler::with_options(options);
    if let Some(path) = tools {
        let catalog = tool_catalog_from_path(path)
            .with_context(|| format!("Failed to load tools from '{}'", path.display()))?;
        compiler = compiler.with_tools(catalog);
    }

    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to open '{}'", input.display()))?;
    let report = compiler.parse_bytes(&bytes);

    let document = if full {
        serde_json::json!({
            "schemas": compiler.result().schemas(),
            "tools": compiler.result().tools(),
            "errors": report.errors,
        })
    } else {
        serde_json::to_value(&report).context("Failed to serialize report")?
    };
    let mut json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    json.push('\n');

    if let Some(output_path) = output {
        std::fs::write(output_path, &json)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!(
            "Wrote {} schemas, {} tools to '{}'",
            report.schemas.len(),
            report.tools.len(),
            output_path.display()
        );
    } else {
        io::stdout()
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
    }

    for error in &report.errors {
        match &error.cell {
            Some(cell) => eprintln!("{}!{}: {}", error.worksheet, cell, error.text),
            None => eprintln!("{}: {}", error.worksheet, error.text),
        }
    }
    if strict && report.has_errors() {
        bail!("{} problems found in '{}'", report.errors.len(), input.display());
    }

    Ok(())
}

fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open '{}'", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Invalid dictionary '{}'", path.display()))
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    for (i, sheet) in workbook.worksheets().enumerate() {
        println!("{}\t{}", i, sheet.name());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compile_args() {
        let cli = Cli::try_parse_from([
            "sheetschema",
            "compile",
            "policy.xlsx",
            "--tools",
            "tools.json",
            "--pretty",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Compile {
                input,
                tools,
                pretty,
                full,
                ..
            } => {
                assert_eq!(input, PathBuf::from("policy.xlsx"));
                assert_eq!(tools, Some(PathBuf::from("tools.json")));
                assert!(pretty);
                assert!(!full);
            }
            Commands::Sheets { .. } => panic!("expected compile"),
        }
    }

    #[test]
    fn test_missing_input() {
        assert!(Cli::try_parse_from(["sheetschema", "sheets"]).is_err());
    }
}
