//! CLI entrypoint for grant-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use council_application::{
    AssignReviewersError, AssignReviewersInput, AssignReviewersUseCase, AuditLogger,
    NoAuditLogger, RegisterError, RegisterRecordsUseCase, ReplaceAssignmentsError,
    ReplaceAssignmentsInput, ReplaceAssignmentsUseCase, ReportError, ReportRequest,
    ResolveEligibilityError, ResolveEligibilityUseCase, RunReportUseCase, StoreError,
};
use council_domain::{ConfigIssue, Severity};
use council_infrastructure::{
    ConfigLoader, DatasetFileError, FileConfig, JsonlAuditLogger, SqliteCouncilStore,
    read_dataset,
};
use council_presentation::{
    Cli, Command, ConsoleAssignmentProgress, OutputConfig, OutputFormatter, candidate_source,
    formatter_for,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Configuration that failed validation.
#[derive(Debug)]
struct InvalidConfig;

impl std::fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration has errors")
    }
}

impl std::error::Error for InvalidConfig {}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command.clone() else {
        anyhow::bail!(InvalidCommand("no command given; see --help"));
    };

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!(e.to_string()).context(InvalidConfig))?
    };
    if let Some(path) = &cli.database {
        config.database.path = path.clone();
    }

    let _log_guard = init_tracing(cli.verbose, config.logging.file.as_deref())?;
    info!("Starting grant-council");

    report_config_issues(&config)?;

    let output = OutputConfig::resolve(
        cli.output,
        cli.no_color,
        cli.quiet,
        config.output.format,
        config.output.color,
    );
    output.apply();
    let formatter = formatter_for(output.format);

    // === Dependency Injection ===
    let store = Arc::new(SqliteCouncilStore::open(&config.database.path).with_context(|| {
        format!("opening database {}", config.database.path.display())
    })?);
    let params = config.assignment.to_params();
    let audit_logger: Arc<dyn AuditLogger> = match config
        .logging
        .audit_log
        .as_ref()
        .and_then(JsonlAuditLogger::new)
    {
        Some(logger) => Arc::new(logger),
        None => Arc::new(NoAuditLogger),
    };

    let text = match command {
        Command::Init => {
            let version = store.schema_version().await?;
            format!(
                "Database {} is at schema version {}",
                config.database.path.display(),
                version
            )
        }

        Command::Load { file } => {
            let dataset = read_dataset(&file)?;
            let report = RegisterRecordsUseCase::new(store, params)
                .with_audit_logger(audit_logger)
                .load_dataset(dataset)
                .await?;
            formatter.load_report(&report)
        }

        Command::OpenCompetitions { month } => {
            report(store, formatter.as_ref(), ReportRequest::OpenCompetitions { month }).await?
        }
        Command::LargestRequest { area } => {
            report(store, formatter.as_ref(), ReportRequest::LargestRequest { area }).await?
        }
        Command::LargestAward { before } => {
            report(store, formatter.as_ref(), ReportRequest::LargestAward { before }).await?
        }
        Command::Discrepancy { area } => {
            report(store, formatter.as_ref(), ReportRequest::Discrepancy { area }).await?
        }
        Command::Reviews { name } => {
            report(store, formatter.as_ref(), ReportRequest::ReviewsFor { name }).await?
        }
        Command::View { table } => {
            report(store, formatter.as_ref(), ReportRequest::ViewTable { table }).await?
        }

        Command::Eligible { proposal, explain } => {
            let eligibility = ResolveEligibilityUseCase::new(store, params.caps)
                .execute(proposal)
                .await?;
            formatter.eligibility(&eligibility, explain)
        }

        Command::Assign {
            proposal,
            reviewers,
        } => {
            let mut source = candidate_source(&reviewers);
            let progress = if output.quiet {
                ConsoleAssignmentProgress::quiet()
            } else {
                ConsoleAssignmentProgress::new()
            };

            let outcome = AssignReviewersUseCase::new(store, params)
                .with_audit_logger(audit_logger)
                .execute(
                    AssignReviewersInput::new(proposal),
                    source.as_mut(),
                    &progress,
                )
                .await?;
            formatter.assignment_outcome(&outcome)
        }

        Command::ReplaceAssignments {
            proposal,
            reviewers,
            clear: _,
        } => {
            // --clear conflicts with --reviewer, so it always arrives with an empty list.
            let replaced = ReplaceAssignmentsUseCase::new(store, params)
                .with_audit_logger(audit_logger)
                .execute(ReplaceAssignmentsInput::new(proposal, reviewers))
                .await?;
            formatter.replacement(&replaced)
        }
    };

    println!("{}", text.trim_end());
    Ok(())
}

async fn report(
    store: Arc<SqliteCouncilStore>,
    formatter: &dyn OutputFormatter,
    request: ReportRequest,
) -> Result<String> {
    let output = RunReportUseCase::new(store).execute(request).await?;
    Ok(formatter.report(&output))
}

/// A command line that parsed but cannot run.
#[derive(Debug)]
struct InvalidCommand(&'static str);

impl std::fmt::Display for InvalidCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for InvalidCommand {}

/// Initialize logging based on verbosity level. With a log file, events go
/// there instead of stderr; the guard flushes it on drop.
fn init_tracing(verbose: u8, file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("log file {} has no file name", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// Print configuration issues; errors stop the run.
fn report_config_issues(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Warning => warn!("config: {}", issue.message),
            Severity::Error => eprintln!("config error: {}", issue.message),
        }
    }
    if ConfigIssue::has_errors(&issues) {
        return Err(InvalidConfig.into());
    }
    Ok(())
}

/// 2 for mistakes the caller can fix, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    const CALLER: u8 = 2;
    const FAILURE: u8 = 1;

    let caller = err.is::<InvalidConfig>()
        || err.is::<InvalidCommand>()
        || err.is::<DatasetFileError>()
        || err
            .downcast_ref::<StoreError>()
            .is_some_and(StoreError::is_caller_error)
        || err
            .downcast_ref::<ReportError>()
            .is_some_and(ReportError::is_caller_error)
        || err
            .downcast_ref::<ResolveEligibilityError>()
            .is_some_and(ResolveEligibilityError::is_caller_error)
        || err
            .downcast_ref::<AssignReviewersError>()
            .is_some_and(AssignReviewersError::is_caller_error)
        || err
            .downcast_ref::<ReplaceAssignmentsError>()
            .is_some_and(ReplaceAssignmentsError::is_caller_error)
        || err
            .downcast_ref::<RegisterError>()
            .is_some_and(RegisterError::is_caller_error);

    if caller { CALLER } else { FAILURE }
}
