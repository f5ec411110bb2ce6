mod console;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use admin_records::config::{self, Config};
use admin_records::screen::{
    AutoConfirmer, Confirmation, Confirmer, Field, RecordScreen, ScreenEvent, ScreenServices,
    ScreenView,
};
use admin_records::{HttpTransport, MutationGateway, RecordId, RecordStore, ResourceKind};

use console::{ConsoleNotifier, TerminalConfirmer};

#[derive(Debug, Parser)]
#[command(
    name = "admin-records",
    version,
    about = "Manage sub-modules and control families"
)]
struct Cli {
    /// Config file (default: ~/.admin-records/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for config and logs (default: ~/.admin-records)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Tenant identifier sent with mutations
    #[arg(long, global = true)]
    customer_id: Option<i64>,

    /// Which records to manage: submodules or control-families
    #[arg(long, global = true, default_value = "submodules")]
    resource: ResourceKind,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all records
    List,
    /// Show one record
    Show { id: i64 },
    /// Edit a record
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a record after confirmation
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(config::default_data_dir);
    init_logging(&data_dir, cli.verbose)?;

    let mut config =
        Config::load(&data_dir, cli.config.as_deref()).context("Failed to load config")?;
    if let Some(base_url) = &cli.base_url {
        config.set_base_url(base_url);
    }
    if let Some(customer_id) = cli.customer_id {
        config.customer_id = customer_id;
    }

    let transport =
        Arc::new(HttpTransport::from_config(&config).context("Failed to build HTTP client")?);
    let confirmer: Arc<dyn Confirmer> = match cli.command {
        Command::Delete { yes: true, .. } => Arc::new(AutoConfirmer(Confirmation::Confirmed)),
        _ => Arc::new(TerminalConfirmer),
    };
    let services = ScreenServices {
        store: RecordStore::new(transport.clone(), config.retry_policy()),
        gateway: MutationGateway::new(transport, config.customer_id),
        notifier: Arc::new(ConsoleNotifier),
        confirmer,
    };

    let mut screen = RecordScreen::new(cli.resource.resource(), services);
    screen.load().await;

    let ok = match cli.command {
        Command::List => list(&screen),
        Command::Show { id } => show(&mut screen, RecordId(id)),
        Command::Update {
            id,
            name,
            display_name,
            description,
        } => {
            let edits = [
                (Field::Name, name),
                (Field::DisplayName, display_name),
                (Field::Description, description),
            ];
            update(&mut screen, RecordId(id), edits).await
        }
        Command::Delete { id, .. } => delete(&mut screen, RecordId(id)).await,
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(data_dir: &Path, verbose: bool) -> Result<()> {
    // Log to <data_dir>/logs/admin-records.log; stdout is for output.
    let logs_dir = data_dir.join("logs");
    fs::create_dir_all(&logs_dir).context("Failed to create log directory")?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(logs_dir.join("admin-records.log"))
        .context("Failed to open log file")?;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

/// Report the error/empty views shared by every command. Returns true when
/// records are available.
fn has_records(screen: &RecordScreen) -> bool {
    let resource = screen.state().resource();
    match screen.view() {
        ScreenView::Records(_) => true,
        ScreenView::Empty => {
            println!("No {}s found.", resource.noun);
            false
        }
        ScreenView::Error(failure) => {
            eprintln!(
                "Error: could not load {}s ({} error): {}",
                resource.noun,
                failure.kind.as_str(),
                failure
            );
            false
        }
        ScreenView::Loading => {
            eprintln!("Error: {}s did not load", resource.noun);
            false
        }
    }
}

fn list(screen: &RecordScreen) -> bool {
    match screen.view() {
        ScreenView::Records(view) => {
            for record in view.records {
                println!(
                    "{:>6}  {:<32}  {}",
                    record.id, record.display_name, record.description
                );
            }
            true
        }
        // An empty collection is a successful listing.
        ScreenView::Empty => {
            has_records(screen);
            true
        }
        _ => has_records(screen),
    }
}

fn select(screen: &mut RecordScreen, id: RecordId) -> bool {
    if !has_records(screen) {
        return false;
    }
    screen.dispatch(ScreenEvent::Select(id));
    if screen.state().selected().is_none() {
        eprintln!("Error: no {} with id {}", screen.state().resource().noun, id);
        return false;
    }
    true
}

fn show(screen: &mut RecordScreen, id: RecordId) -> bool {
    if !select(screen, id) {
        return false;
    }
    let Some(record) = screen.state().selected() else {
        return false;
    };
    println!("Id:           {}", record.id);
    println!("Name:         {}", record.name);
    println!("Display Name: {}", record.display_name);
    println!("Description:  {}", record.description);
    true
}

async fn update(
    screen: &mut RecordScreen,
    id: RecordId,
    edits: [(Field, Option<String>); 3],
) -> bool {
    if !select(screen, id) {
        return false;
    }
    screen.dispatch(ScreenEvent::ToggleEdit);
    for (field, value) in edits {
        let Some(value) = value else { continue };
        let editable = screen
            .state()
            .form()
            .map(|form| form.schema().contains(field))
            .unwrap_or(false);
        if !editable {
            eprintln!(
                "Error: {} has no editable field '{}'",
                screen.state().resource().noun,
                field
            );
            return false;
        }
        screen.dispatch(ScreenEvent::EditField { field, value });
    }

    screen.dispatch(ScreenEvent::Submit);
    if let Some(form) = screen.state().form() {
        if !form.is_submitting() {
            for rule in form.schema().rules() {
                if let Some(message) = form.errors().get(rule.field) {
                    eprintln!("{}: {}", rule.label, message);
                }
            }
            return false;
        }
    }

    screen.settle().await;
    // The form only survives a submission that failed.
    screen.state().form().is_none()
}

async fn delete(screen: &mut RecordScreen, id: RecordId) -> bool {
    if !select(screen, id) {
        return false;
    }
    screen.dispatch(ScreenEvent::RequestDelete);
    screen.settle().await;
    !screen.state().selection().is_some()
}
