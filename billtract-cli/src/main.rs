use anyhow::{Context, Result, bail};
use billtract_core::{Currency, ExtractedExpenses, Table};
use billtract_expenses::{ExpenseMapper, validate};
use billtract_ingest::{parse_document_file, parsers::parse_statement_lines};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod output;
mod state;

use config::Config;
use output::{OutputFormat, open_output, write_expenses};

#[derive(Parser, Debug)]
#[command(name = "billtract", version, about = "Extract expenses from analyzed credit-card bills")]
struct Cli {
    /// Log per-table decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tables rebuilt from a saved document-analysis JSON
    Tables {
        #[arg(long)]
        document: PathBuf,
    },

    /// Extract expenses from a saved document-analysis JSON
    Extract {
        #[arg(long)]
        document: PathBuf,

        #[command(flatten)]
        templates: TemplateArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Write results here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Extract expenses from raw PDF-to-text statement lines
    Lines {
        #[arg(long)]
        text: PathBuf,

        /// Template for the line table (default: raw_lines_v1)
        #[arg(long, default_value = "raw_lines_v1")]
        template: String,

        /// JSON template file (default: bundled templates)
        #[arg(long)]
        templates: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compare an extraction against a ground-truth JSON
    Validate {
        #[arg(long)]
        document: PathBuf,

        #[arg(long)]
        ground_truth: PathBuf,

        #[command(flatten)]
        templates: TemplateArgs,
    },

    /// List available templates
    Templates {
        #[arg(long)]
        templates: Option<PathBuf>,
    },

    /// Manage ~/.billtract/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(clap::Args, Debug)]
struct TemplateArgs {
    /// Template name (default: config `extract.default_template`)
    #[arg(long)]
    template: Option<String>,

    /// JSON template file (default: config `extract.templates_file`, then bundled)
    #[arg(long)]
    templates: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Tables { document } => {
            let tables = parse_document_file(&document)
                .with_context(|| format!("parsing {}", document.display()))?;
            print_tables(&tables);
        }

        Command::Extract {
            document,
            templates,
            format,
            output,
        } => {
            let cfg = config::load_config()?;
            let tables = parse_document_file(&document)
                .with_context(|| format!("parsing {}", document.display()))?;
            let expenses = run_mapper(&cfg, &tables, templates)?;
            print_summary(&expenses);
            write_expenses(open_output(output.as_deref())?, &expenses, format)?;
        }

        Command::Lines {
            text,
            template,
            templates,
            format,
            output,
        } => {
            let cfg = config::load_config()?;
            let raw =
                fs::read_to_string(&text).with_context(|| format!("read {}", text.display()))?;
            let table = parse_statement_lines(&raw)?;
            let expenses = run_mapper(
                &cfg,
                &[table],
                TemplateArgs {
                    template: Some(template),
                    templates,
                },
            )?;
            print_summary(&expenses);
            write_expenses(open_output(output.as_deref())?, &expenses, format)?;
        }

        Command::Validate {
            document,
            ground_truth,
            templates,
        } => {
            let cfg = config::load_config()?;
            let tables = parse_document_file(&document)
                .with_context(|| format!("parsing {}", document.display()))?;
            let extracted = run_mapper(&cfg, &tables, templates)?;
            let expected = load_ground_truth(&ground_truth)?;
            print_validation(&extracted, &expected);
        }

        Command::Templates { templates } => {
            let cfg = config::load_config()?;
            let registry = cfg.registry(templates.as_deref())?;
            if registry.is_empty() {
                bail!("no templates defined");
            }
            for name in registry.names() {
                let marker = if name == cfg.extract.default_template { " (default)" } else { "" };
                println!("{name}{marker}");
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
        },
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_mapper(cfg: &Config, tables: &[Table], args: TemplateArgs) -> Result<ExtractedExpenses> {
    let registry = cfg.registry(args.templates.as_deref())?;
    let name = cfg.template_name(args.template);
    debug!(template = %name, available = registry.len(), "resolved template");
    ExpenseMapper::new(registry)
        .extract(tables, &name)
        .with_context(|| format!("extracting with template {name}"))
}

fn load_ground_truth(path: &Path) -> Result<ExtractedExpenses> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display()))
}

fn print_tables(tables: &[Table]) {
    println!("Parsed {} tables.", tables.len());
    for (i, table) in tables.iter().enumerate() {
        println!("\n--- Table {} ({}x{}) ---", i + 1, table.n_rows(), table.n_cols());
        for row in table.rows() {
            println!("{}", row.join(" | "));
        }
    }
}

fn print_summary(expenses: &ExtractedExpenses) {
    eprintln!(
        "Foreign expenses: {} | Domestic expenses: {}",
        expenses.foreign_expenses.len(),
        expenses.domestic_expenses.len()
    );
}

fn print_validation(extracted: &ExtractedExpenses, expected: &ExtractedExpenses) {
    let report = validate(extracted, expected);

    for currency in [Currency::Foreign, Currency::Domestic] {
        let b = report.bucket(currency);
        println!("\n=== {} ===", currency.label().to_uppercase());
        println!("Extracted: {}, Ground truth: {}", b.extracted, b.expected);
        println!(
            "True positives: {}, False positives: {}, False negatives: {}",
            b.true_positives, b.false_positives, b.false_negatives
        );
        println!(
            "Precision: {:.2}%, Recall: {:.2}%",
            b.precision() * 100.0,
            b.recall() * 100.0
        );

        if b.mismatches.is_empty() {
            println!("All compared rows match.");
            continue;
        }
        println!("{} row mismatches:", b.mismatches.len());
        for m in b.mismatches.iter().take(10) {
            println!("  Row {}:", m.index);
            for f in &m.fields {
                let got = f.extracted.as_ref().map(|v| v.to_string()).unwrap_or_default();
                println!(
                    "    {}: extracted={:?} expected={:?}",
                    f.field,
                    got,
                    f.expected.to_string()
                );
            }
        }
    }
}
