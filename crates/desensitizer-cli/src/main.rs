mod connection;
mod registry;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use desensitizer_config::{
    ConfigError, DesensitizeConfig, OutputFormat, StrategyKind, ValidationIssue,
    ValidationReport, config_json_schema, load_config, read_config_document, validate_config,
    validate_config_semantics,
};
use desensitizer_core::{RedactedConnection, redact_connection_string};
use desensitizer_mask::{
    CancellationToken, ConfigurationError, DesensitizationRun, DesensitizeError, DirectorySinks,
    GeneratorRegistry, RunReport, build_run_plan,
};
use desensitizer_source::{CatalogSource, SourceError, SourceOptions, connect};
use registry::{RunContext, init_logging, start_run, write_report, write_run_config};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("desensitization failed: {0}")]
    Desensitize(#[from] DesensitizeError),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no database url: pass --database-url or set DATABASE_URL (or DB_HOST and DB_NAME)")]
    MissingDatabaseUrl,
}

#[derive(Parser, Debug)]
#[command(
    name = "desensitize",
    version,
    about = "Export database tables with sensitive columns replaced by consistent synthetic values"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Desensitize the configured tables of a database.
    Run(RunArgs),
    /// Validate a configuration file without connecting.
    Validate(ValidateArgs),
    /// List the registered type tags.
    Types,
    /// Print the configuration JSON Schema.
    Schema,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Configuration file (JSON, or TOML by extension).
    #[arg(long, short = 'c')]
    config: PathBuf,
    /// Database connection string.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,
    /// Output directory; tables land in `<out>/<database>/`.
    #[arg(long, default_value = "out")]
    out: PathBuf,
    /// Overrides the configured output format.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Overrides the configured mapping strategy.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
    /// Overrides the configured run seed.
    #[arg(long)]
    seed: Option<u64>,
    /// PostgreSQL schema to read from.
    #[arg(long, default_value = "public")]
    schema: String,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[arg(long, short = 'c')]
    config: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Sql,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Sql => OutputFormat::Sql,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Hashed,
    Cached,
}

impl From<StrategyArg> for StrategyKind {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Hashed => StrategyKind::Hashed,
            StrategyArg::Cached => StrategyKind::Cached,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run_desensitize(args).await,
        Command::Validate(args) => {
            init_logging(None)?;
            run_validate(&args.config)
        }
        Command::Types => {
            for tag in GeneratorRegistry::new().type_tags() {
                println!("{tag}");
            }
            Ok(())
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&config_json_schema())?);
            Ok(())
        }
    }
}

async fn run_desensitize(args: RunArgs) -> Result<(), CliError> {
    let database_url =
        connection::resolve_database_url(args.database_url).ok_or(CliError::MissingDatabaseUrl)?;
    let connection = redact_connection_string(&database_url);
    let output_dir = args.out.join(output_dir_name(&connection));

    let run_ctx = RunContext {
        run_id: Uuid::new_v4().to_string(),
        started_at: chrono::Utc::now(),
        config_path: args.config.clone(),
        output_dir,
        connection,
    };
    let run_paths = start_run(&run_ctx)?;
    init_logging(Some(&run_paths.logs_path))?;

    info!(
        event = "run_started",
        run_id = %run_ctx.run_id,
        connection = %run_ctx.connection.redacted,
        output_dir = %run_paths.output_dir.display()
    );

    let (config, warnings) =
        prepare_config(&args.config, args.format, args.strategy, args.seed)?;
    for issue in &warnings {
        warn!(code = %issue.code, path = %issue.path, "{}", issue.message);
    }
    write_run_config(&run_paths, &run_ctx, &config)?;

    let registry = GeneratorRegistry::new();
    let cancel = CancellationToken::new();
    let mut run = DesensitizationRun::new(&config, &registry)?
        .with_run_id(run_ctx.run_id.clone())
        .with_cancellation(cancel.clone());

    let options = SourceOptions {
        schema: args.schema,
        ..SourceOptions::default()
    };
    let adapter = connect(&database_url, &options).await?;
    let dialect = adapter.dialect();

    if config.include_unconfigured_tables {
        let extra: Vec<String> = adapter
            .list_tables()
            .await?
            .into_iter()
            .filter(|table| config.table(table).is_none())
            .collect();
        info!(event = "passthrough_tables", tables = extra.len());
        run = run.with_passthrough_tables(extra);
    }

    let table_names: Vec<String> = run
        .plan()
        .tables
        .iter()
        .map(|table| table.table_name.clone())
        .collect();
    let catalog = CatalogSource::load(adapter, &table_names).await?;

    let mut sinks = DirectorySinks::new(&run_paths.output_dir, config.output_format)
        .with_dialect(dialect);
    if config.output_format == OutputFormat::Sql {
        for table in &table_names {
            if let Some(ddl) = catalog.create_table_sql(table) {
                sinks = sinks.with_preamble(table, ddl);
            }
        }
    }

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!(event = "interrupt_received", "cancelling after the current row");
            interrupt.cancel();
        }
    });

    let timer = Instant::now();
    let report = match run.execute(&catalog, &mut sinks).await {
        Ok(report) => report,
        Err(err) => {
            error!(
                event = "run_finished",
                status = "failed",
                table = err.table().unwrap_or_default(),
                rows_emitted = err.rows_emitted().unwrap_or_default(),
                error = %err
            );
            return Err(err.into());
        }
    };

    write_report(&run_paths, &report)?;
    info!(
        event = "run_finished",
        status = "success",
        rows = report.rows_total(),
        duration_ms = timer.elapsed().as_millis() as u64,
        report = %run_paths.report_path.display()
    );

    print_summary(&report, &run_paths.output_dir);
    Ok(())
}

/// Load the configuration, apply command-line overrides, then run the
/// semantic checks on the result so warnings reflect what actually runs.
fn prepare_config(
    path: &Path,
    format: Option<FormatArg>,
    strategy: Option<StrategyArg>,
    seed: Option<u64>,
) -> Result<(DesensitizeConfig, Vec<ValidationIssue>), CliError> {
    let document = read_config_document(path)?;
    let mut config = validate_config(&document)
        .map_err(ConfigError::Invalid)?
        .config;
    apply_overrides(&mut config, format, strategy, seed);

    let report = validate_config_semantics(&config);
    if !report.is_ok() {
        return Err(ConfigError::Invalid(report).into());
    }
    Ok((config, report.warnings))
}

/// Directory name for a run: the decoded database name with path separators
/// replaced, or `desensitized`.
fn output_dir_name(connection: &RedactedConnection) -> String {
    let name = connection
        .database
        .as_deref()
        .map(|database| database.replace(['/', '\\'], "_"))
        .unwrap_or_default();
    match name.trim() {
        "" | "." | ".." => "desensitized".to_string(),
        _ => name,
    }
}

fn apply_overrides(
    config: &mut DesensitizeConfig,
    format: Option<FormatArg>,
    strategy: Option<StrategyArg>,
    seed: Option<u64>,
) {
    if let Some(format) = format {
        config.output_format = format.into();
    }
    if let Some(strategy) = strategy {
        config.strategy = strategy.into();
    }
    if seed.is_some() {
        config.seed = seed;
    }
}

fn run_validate(path: &Path) -> Result<(), CliError> {
    let validated = match load_config(path) {
        Ok(validated) => validated,
        Err(ConfigError::Invalid(report)) => {
            print_issues(&report);
            return Err(CliError::InvalidConfig(format!(
                "{} error(s) in {}",
                report.errors.len(),
                path.display()
            )));
        }
        Err(err) => return Err(err.into()),
    };

    let plan = build_run_plan(&validated.config, &GeneratorRegistry::new())?;
    let columns: usize = plan.tables.iter().map(|table| table.columns.len()).sum();
    println!(
        "{}: ok ({} table(s), {} masked column(s), strategy {})",
        path.display(),
        plan.tables.len(),
        columns,
        plan.strategy
    );
    for warning in &validated.warnings {
        println!("warning: {warning}");
    }
    Ok(())
}

fn print_issues(report: &ValidationReport) {
    for issue in report.errors.iter().chain(report.warnings.iter()) {
        match &issue.hint {
            Some(hint) => eprintln!("{issue} (hint: {hint})"),
            None => eprintln!("{issue}"),
        }
    }
}

fn print_summary(report: &RunReport, output_dir: &Path) {
    println!("run {} ({})", report.run_id, report.strategy);
    for table in &report.tables {
        println!(
            "  {:<24} {:>8} rows  {:>8} cells masked  {:>6} nulls kept",
            table.table, table.rows_emitted, table.cells_masked, table.nulls_preserved
        );
    }
    if let Some(distinct) = report.distinct_mappings {
        println!("  distinct mappings: {distinct}");
    }
    println!("output: {}", output_dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_arguments_parse_with_overrides() {
        let cli = Cli::try_parse_from([
            "desensitize",
            "run",
            "--config",
            "config.json",
            "--database-url",
            "mysql://app@localhost/classicmodels",
            "--format",
            "sql",
            "--strategy",
            "cached",
            "--seed",
            "7",
        ])
        .expect("parse");

        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert_eq!(args.out, PathBuf::from("out"));
        assert_eq!(args.schema, "public");
        assert!(matches!(args.format, Some(FormatArg::Sql)));
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn run_requires_a_config() {
        assert!(Cli::try_parse_from(["desensitize", "run"]).is_err());
    }

    #[test]
    fn overrides_replace_configured_values() {
        let mut config: DesensitizeConfig = serde_json::from_value(serde_json::json!({
            "strategy": "hashed",
            "seed": 1,
            "tables": [{"name": "customers"}]
        }))
        .expect("config");

        apply_overrides(&mut config, Some(FormatArg::Sql), Some(StrategyArg::Cached), None);
        assert_eq!(config.output_format, OutputFormat::Sql);
        assert_eq!(config.strategy, StrategyKind::Cached);
        assert_eq!(config.seed, Some(1));

        apply_overrides(&mut config, None, None, Some(99));
        assert_eq!(config.seed, Some(99));
    }

    fn write_config(contents: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("desensitizer_cli_config_{}.json", Uuid::new_v4()));
        std::fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn seed_warning_follows_the_overridden_config() {
        let path = write_config(
            r#"{"strategy": "cached", "tables": [{"name": "customers", "columns": [{"name": "customerName", "type": "company"}]}]}"#,
        );
        let codes = |warnings: Vec<ValidationIssue>| {
            warnings.into_iter().map(|issue| issue.code).collect::<Vec<_>>()
        };

        let (_, warnings) = prepare_config(&path, None, None, None).expect("config");
        assert!(!codes(warnings).contains(&"seed_not_set".to_string()));

        let (config, warnings) =
            prepare_config(&path, None, Some(StrategyArg::Hashed), None).expect("config");
        assert_eq!(config.strategy, StrategyKind::Hashed);
        assert!(codes(warnings).contains(&"seed_not_set".to_string()));

        let (config, warnings) =
            prepare_config(&path, None, Some(StrategyArg::Hashed), Some(9)).expect("config");
        assert_eq!(config.seed, Some(9));
        assert!(!codes(warnings).contains(&"seed_not_set".to_string()));
    }

    #[test]
    fn output_dir_uses_the_decoded_database_name() {
        let connection = redact_connection_string("mysql://app@localhost/my%20db");
        assert_eq!(output_dir_name(&connection), "my db");

        let connection = redact_connection_string("mysql://app@localhost/a%2Fb");
        assert_eq!(output_dir_name(&connection), "a_b");

        let connection = redact_connection_string("mysql://app@localhost/");
        assert_eq!(output_dir_name(&connection), "desensitized");
    }

    #[test]
    fn validate_reports_unknown_type_tags() {
        let mut path = std::env::temp_dir();
        path.push(format!("desensitizer_validate_{}.json", Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{"tables": [{"name": "customers", "columns": [{"name": "x", "type": "nope"}]}]}"#,
        )
        .expect("write config");

        let result = run_validate(&path);
        assert!(matches!(
            result,
            Err(CliError::Configuration(ConfigurationError::UnknownType { .. }))
        ));
    }
}
