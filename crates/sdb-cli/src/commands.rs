use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use sdb_gate::{ConfirmationGate, GateConfig};
use sdb_sdk::{
    get_qc_data, get_scilife_to_customer_name, ConnectionOverrides, Database, DatabaseConnection,
    Document, DocumentId, MatchOptions, MatchingConfig, Reconciliation, SaveStatus, Server,
    StatusDbConfig,
};
use sdb_types::SystemClock;
use serde_json::{json, Value};
use tracing::warn;

use crate::cli::*;

/// Everything a command needs: the loaded server and the matching
/// defaults.
struct Session {
    server: Server,
    matching: MatchingConfig,
    dump: PathBuf,
    format: OutputFormat,
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let session = open_session(&cli)?;
    match cli.command {
        Command::Match(args) => cmd_match(&session, args),
        Command::Upsert(args) => cmd_upsert(&session, args),
        Command::Qc(args) => cmd_qc(&session, args),
        Command::Names(args) => cmd_names(&session, args),
        Command::Storage(args) => cmd_storage(&session, args),
    }
}

fn open_session(cli: &Cli) -> anyhow::Result<Session> {
    let config = load_config(cli)?;
    let matching = config.as_ref().map(|c| c.matching).unwrap_or_default();
    let gate = Arc::new(ConfirmationGate::console(GateConfig {
        force: matching.force,
    }));
    let server = match &config {
        Some(config) => Server::from_config(config, gate),
        None => Server::new(Arc::new(SystemClock), gate),
    };
    if cli.dump.exists() {
        server.load_dump(&cli.dump)?;
    } else {
        warn!("dump {} does not exist; starting with empty databases", cli.dump.display());
    }
    Ok(Session {
        server,
        matching,
        dump: cli.dump.clone(),
        format: cli.format.clone(),
    })
}

/// An explicit `--config` must load; the default location may be absent.
fn load_config(cli: &Cli) -> anyhow::Result<Option<StatusDbConfig>> {
    let mut config = match &cli.config {
        Some(path) => StatusDbConfig::load(Some(path.as_path()))
            .with_context(|| format!("loading {}", path.display()))?,
        None => match StatusDbConfig::load(None) {
            Ok(config) => config,
            Err(err) => {
                warn!("no configuration loaded: {err}");
                return Ok(None);
            }
        },
    };
    let args = &cli.connection;
    config.connection.apply_overrides(&ConnectionOverrides {
        url: args.url.clone(),
        port: args.port,
        username: args.username.clone(),
        password: args.password.clone(),
        db: args.db.clone(),
    });
    Ok(Some(config))
}

fn connect(server: &Server, database: Database) -> anyhow::Result<Box<dyn DatabaseConnection>> {
    Ok(match database {
        Database::Projects => Box::new(server.projects()?),
        Database::Samples => Box::new(server.samples()?),
        Database::Flowcells => Box::new(server.flowcells()?),
        Database::Analysis => Box::new(server.analysis()?),
    })
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// JSON form of an identity-indexed save; `status` is null when the
/// document does not exist.
fn save_status_json(id: &DocumentId, status: Option<SaveStatus>) -> Value {
    json!({ "id": id, "status": status })
}

fn cmd_match(session: &Session, args: MatchArgs) -> anyhow::Result<()> {
    let options = MatchOptions {
        extensive: args.extensive || session.matching.extensive,
        force: args.force || session.matching.force,
    };
    let projects = session.server.projects()?;
    let found = projects.match_project_sample(&args.project, &args.barcode, options)?;
    if let OutputFormat::Json = session.format {
        return print_json(&found);
    }
    match found {
        Some(found) => {
            println!(
                "{} {} -> {}",
                "✓".green().bold(),
                args.barcode.yellow(),
                found.sample_name.bold()
            );
            if let Some(customer) = &found.project_sample.customer_name {
                println!("  Customer name: {}", customer.cyan());
            }
        }
        None => println!(
            "{} no project sample in {} for {}",
            "✗".red().bold(),
            args.project.bold(),
            args.barcode.yellow()
        ),
    }
    Ok(())
}

fn cmd_upsert(session: &Session, args: UpsertArgs) -> anyhow::Result<()> {
    let database: Database = args.database.parse()?;
    let text = std::fs::read_to_string(&args.document)
        .with_context(|| format!("reading {}", args.document.display()))?;
    let mut document = Document::from_value(serde_json::from_str(&text)?)?;
    let conn = connect(&session.server, database)?;

    let wrote = if args.by_id {
        let status = conn.save_by_id(&mut document)?;
        match session.format {
            OutputFormat::Json => print_json(&save_status_json(&document.id, Some(status)))?,
            OutputFormat::Text => {
                println!("{} {} {}", "✓".green().bold(), document, status.to_string().cyan())
            }
        }
        status.wrote()
    } else {
        let outcome = conn.save(document)?;
        match &outcome {
            _ if matches!(session.format, OutputFormat::Json) => print_json(&outcome)?,
            Reconciliation::Insert { document, stale_id } => {
                println!("{} {} created", "✓".green().bold(), document);
                if let Some(id) = stale_id {
                    println!("  {} name index pointed at missing {}", "!".yellow(), id);
                }
            }
            Reconciliation::Update { document, .. } => {
                println!("{} {} updated", "✓".green().bold(), document);
            }
            Reconciliation::Unchanged { existing_id } => {
                println!("{} {} not in need of updating", "-".dimmed(), existing_id);
            }
        }
        outcome.needs_write()
    };

    if wrote {
        write_dump(session)?;
    }
    Ok(())
}

fn cmd_qc(session: &Session, args: QcArgs) -> anyhow::Result<()> {
    let projects = session.server.projects()?;
    let samples = session.server.samples()?;
    let records = get_qc_data(&args.project, &projects, &samples, args.flowcell.as_deref())?;
    if let OutputFormat::Json = session.format {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("No sample runs for {}.", args.project.bold());
        return Ok(());
    }
    for (name, record) in &records {
        println!("{}", name.yellow().bold());
        println!(
            "  Sample: {}  Lane: {}  Flowcell: {}",
            record.sample.as_deref().unwrap_or("-"),
            record.lane.as_deref().unwrap_or("-"),
            record.flowcell.as_deref().unwrap_or("-"),
        );
        println!("  Total reads: {}", display(record.total_reads));
        println!("  Duplication: {}", percent(record.percent_duplication));
        println!("  Mean insert size: {}", display(record.mean_insert_size));
        println!("  Aligned: {}", percent(record.pct_pf_reads_aligned));
        if let Some(on_target) = record.percent_on_target {
            println!("  On target: {on_target:.1}%");
        }
    }
    Ok(())
}

fn cmd_names(session: &Session, args: NamesArgs) -> anyhow::Result<()> {
    let projects = session.server.projects()?;
    let samples = session.server.samples()?;
    let names = get_scilife_to_customer_name(&args.project, &projects, &samples, args.barcode_seq)?;
    if let OutputFormat::Json = session.format {
        return print_json(&names);
    }
    for (barcode, entry) in &names {
        let mut line = format!(
            "{} {} {}",
            barcode.yellow(),
            entry.scilife_name.bold(),
            entry.customer_name.as_deref().unwrap_or("-").cyan()
        );
        if let Some(seq) = &entry.barcode_seq {
            line.push_str(&format!(" {}", seq.dimmed()));
        }
        println!("{line}");
    }
    Ok(())
}

fn cmd_storage(session: &Session, args: StorageArgs) -> anyhow::Result<()> {
    let flowcells = session.server.flowcells()?;
    let Some(doc_id) = args.set else {
        let runs = flowcells.get_storage_status(&args.status);
        if let OutputFormat::Json = session.format {
            return print_json(&runs);
        }
        for run in runs.keys() {
            println!("{} {}", run.yellow(), args.status.green());
        }
        return Ok(());
    };

    let id = DocumentId::new(doc_id.as_str());
    let status = flowcells.set_storage_status(&id, &args.status)?;
    match (&session.format, status) {
        (OutputFormat::Json, _) => print_json(&save_status_json(&id, status))?,
        (OutputFormat::Text, Some(status)) => {
            println!("{} {} {}", "✓".green().bold(), doc_id.yellow(), status.to_string().cyan())
        }
        (OutputFormat::Text, None) => {
            println!("{} no run with id {}", "✗".red().bold(), doc_id.yellow())
        }
    }
    if status.is_some_and(SaveStatus::wrote) {
        write_dump(session)?;
    }
    Ok(())
}

/// Write the databases back to the dump; only text output reports it.
fn write_dump(session: &Session) -> anyhow::Result<()> {
    session.server.write_dump(&session.dump)?;
    if let OutputFormat::Text = session.format {
        println!("  Dump: {}", session.dump.display());
    }
    Ok(())
}

fn display<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}%"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_status_json_shape() {
        let id = DocumentId::new("run1");
        assert_eq!(
            save_status_json(&id, Some(SaveStatus::Updated)),
            json!({"id": "run1", "status": "updated"})
        );
        assert_eq!(
            save_status_json(&id, Some(SaveStatus::NotUpdated)),
            json!({"id": "run1", "status": "not_updated"})
        );
        assert_eq!(save_status_json(&id, None), json!({"id": "run1", "status": null}));
    }
}
