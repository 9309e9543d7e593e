//! yamlcalc CLI - evaluate and render live YAML documents

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use yamlcalc::prelude::*;
use yamlcalc::{
    output_dir, to_yaml_string, write_asciidoc_attrs, Chart, ChartOptions, CsvWriteOptions,
    CsvWriter, LineTerminator, SvgRenderer, DEFS_FIELD,
};

#[derive(Parser)]
#[command(name = "yc")]
#[command(author, version, about = "Live YAML documents with formulas")]
struct Cli {
    #[command(flatten)]
    load: LoadArgs,

    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command that loads a document
#[derive(Args)]
struct LoadArgs {
    /// Top-level field holding the definitions preamble
    #[arg(long, default_value = DEFS_FIELD, global = true)]
    defs_field: String,

    /// Append the failure reason to "Error!" values
    #[arg(long, global = true)]
    detailed_errors: bool,

    /// Deepest allowed nesting of formula evaluations
    #[arg(long, global = true)]
    max_depth: Option<usize>,
}

impl LoadArgs {
    fn options(&self) -> DocumentOptions {
        let mut options = DocumentOptions {
            defs_field: self.defs_field.clone(),
            ..DocumentOptions::default()
        };
        options.eval.detailed_errors = self.detailed_errors;
        if let Some(depth) = self.max_depth {
            options.eval.max_depth = depth;
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every formula and print the resulting document
    Calc {
        /// Input YAML document
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: Format,
    },

    /// Write the table view at PATH as CSV
    Csv {
        /// Input YAML document
        input: PathBuf,

        /// View path, e.g. `$.report.table`
        path: String,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// End records with `\n` instead of `\r\n`
        #[arg(long)]
        lf: bool,
    },

    /// Write the chart view at PATH as SVG
    Chart {
        /// Input YAML document
        input: PathBuf,

        /// View path, e.g. `$.report.chart`
        path: String,

        /// Output SVG file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the attribute view at PATH as AsciiDoc `{set:...}` lines
    Asciidoc {
        /// Input YAML document
        input: PathBuf,

        /// View path, e.g. `$.attrs`
        path: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a view into a directory next to the input
    Render {
        /// Input YAML document
        input: PathBuf,

        /// View path (default: the document's VIEW field)
        #[arg(long)]
        view: Option<String>,

        /// Output directory (default: the input path without its extension)
        #[arg(long)]
        outdir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = cli.load.options();
    match cli.command {
        Commands::Calc {
            input,
            output,
            format,
        } => calc(&input, output.as_deref(), format, &options),
        Commands::Csv {
            input,
            path,
            output,
            delimiter,
            lf,
        } => csv(&input, &path, output.as_deref(), delimiter, lf, &options),
        Commands::Chart {
            input,
            path,
            output,
        } => chart(&input, &path, output.as_deref(), &options),
        Commands::Asciidoc {
            input,
            path,
            output,
        } => asciidoc(&input, &path, output.as_deref(), &options),
        Commands::Render {
            input,
            view,
            outdir,
        } => render(&input, view.as_deref(), outdir, &options),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn open_document(input: &Path, options: &DocumentOptions) -> Result<Document> {
    Document::open(input, options).with_context(|| format!("Failed to load '{}'", input.display()))
}

/// Locate and evaluate the view at `path`
fn load_view(document: &Document, path: &str) -> Result<Node> {
    let path: ViewPath = path
        .parse()
        .with_context(|| format!("Invalid view path '{}'", path))?;
    let view = resolve_view(document, Some(&path))
        .with_context(|| format!("Failed to evaluate view '{}'", path))?;
    debug!(%path, "resolved view");
    Ok(view)
}

/// Open the output file, or stdout when none is given
fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create '{}'", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}

fn describe(output: Option<&Path>) -> String {
    match output {
        Some(path) => format!("'{}'", path.display()),
        None => "stdout".to_string(),
    }
}

fn calc(input: &Path, output: Option<&Path>, format: Format, options: &DocumentOptions) -> Result<()> {
    let document = open_document(input, options)?;
    let resolved = document
        .resolve()
        .with_context(|| format!("Failed to evaluate '{}'", input.display()))?;

    let text = match format {
        Format::Yaml => to_yaml_string(&resolved)?,
        Format::Json => {
            let mut text = serde_json::to_string_pretty(&resolved)?;
            text.push('\n');
            text
        }
    };

    let mut writer = open_output(output)?;
    writer
        .write_all(text.as_bytes())
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write {}", describe(output)))?;
    Ok(())
}

fn csv(
    input: &Path,
    path: &str,
    output: Option<&Path>,
    delimiter: char,
    lf: bool,
    options: &DocumentOptions,
) -> Result<()> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }

    let document = open_document(input, options)?;
    let view = load_view(&document, path)?;

    let csv_options = CsvWriteOptions {
        delimiter: delimiter as u8,
        line_terminator: if lf {
            LineTerminator::LF
        } else {
            LineTerminator::CRLF
        },
        ..CsvWriteOptions::default()
    };
    CsvWriter::write(&view, open_output(output)?, &csv_options)
        .with_context(|| format!("Failed to write CSV to {}", describe(output)))?;
    Ok(())
}

fn chart(input: &Path, path: &str, output: Option<&Path>, options: &DocumentOptions) -> Result<()> {
    let document = open_document(input, options)?;
    let view = load_view(&document, path)?;

    let chart = Chart::from_view_with(&view, &ChartOptions::default())
        .with_context(|| format!("Invalid chart view '{}'", path))?;
    SvgRenderer::write(&chart, open_output(output)?)
        .with_context(|| format!("Failed to write SVG to {}", describe(output)))?;
    Ok(())
}

fn asciidoc(input: &Path, path: &str, output: Option<&Path>, options: &DocumentOptions) -> Result<()> {
    let document = open_document(input, options)?;
    let view = load_view(&document, path)?;

    write_asciidoc_attrs(&view, open_output(output)?)
        .with_context(|| format!("Failed to write attributes to {}", describe(output)))?;
    Ok(())
}

fn render(
    input: &Path,
    view: Option<&str>,
    outdir: Option<PathBuf>,
    options: &DocumentOptions,
) -> Result<()> {
    let document = open_document(input, options)?;
    let path = view
        .map(|text| {
            text.parse::<ViewPath>()
                .with_context(|| format!("Invalid view path '{}'", text))
        })
        .transpose()?;
    let outdir = outdir.unwrap_or_else(|| output_dir(input));

    let target = render_to_dir(&document, path.as_ref(), &outdir, &RenderOptions::default())
        .with_context(|| format!("Failed to render '{}'", input.display()))?;
    eprintln!("Wrote '{}'", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_map_onto_options() {
        let cli = Cli::try_parse_from([
            "yc",
            "calc",
            "budget.yml",
            "--detailed-errors",
            "--max-depth",
            "12",
            "--defs-field",
            "PRELUDE",
        ])
        .unwrap();

        let options = cli.load.options();
        assert_eq!(options.defs_field, "PRELUDE");
        assert_eq!(options.eval.max_depth, 12);
        assert!(options.eval.detailed_errors);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["yc", "render", "budget.yml"]).unwrap();
        assert_eq!(cli.load.options(), DocumentOptions::default());
        assert_eq!(cli.verbose, 0);
        assert!(matches!(
            cli.command,
            Commands::Render {
                view: None,
                outdir: None,
                ..
            }
        ));
    }

    #[test]
    fn test_calc_format() {
        let cli = Cli::try_parse_from(["yc", "calc", "in.yml", "-f", "json", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Calc {
                format: Format::Json,
                output: None,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["yc", "calc", "in.yml", "-f", "toml"]).is_err());
    }

    #[test]
    fn test_view_commands_need_a_path() {
        assert!(Cli::try_parse_from(["yc", "csv", "in.yml"]).is_err());
        let cli = Cli::try_parse_from(["yc", "csv", "in.yml", "$.table", "-d", ";", "--lf"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Csv {
                delimiter: ';',
                lf: true,
                ..
            }
        ));
    }
}
