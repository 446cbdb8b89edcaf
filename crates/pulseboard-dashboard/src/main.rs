//! `pulseboard` command line dashboard
//!
//! Runs the dashboard views headless: polling views log a summary after every cycle,
//! configuration screens are driven through subcommands.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::{Parser, Subcommand, ValueEnum};
use pulseboard_core::types::{DiscoverRequest, FieldType};
use pulseboard_core::{Config, DataMode};
use pulseboard_dashboard::views::ProcessOperation;
use pulseboard_dashboard::{Dashboard, DashboardError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::signal;
use tracing::{info, warn};

/// Command line interface for pulseboard
#[derive(Parser)]
#[command(
    name = "pulseboard",
    version = env!("CARGO_PKG_VERSION"),
    about = "Headless supply-chain and operations dashboard",
    long_about = "Polls a dashboard backend (or the bundled fixture set), derives health metrics and drives the configuration screens from the command line."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Poll the supply-chain view until Ctrl+C
    Watch,

    /// Poll the control-center view until Ctrl+C
    ControlCenter,

    /// Run one poll cycle and print the summary as JSON
    Snapshot {
        /// View to snapshot
        #[arg(value_enum, default_value = "supply-chain")]
        view: SnapshotView,
    },

    /// Manage communication types
    Types {
        /// Communication type subcommand
        #[command(subcommand)]
        action: TypeCommands,
    },

    /// Manage field definitions
    Fields {
        /// Field definition subcommand
        #[command(subcommand)]
        action: FieldCommands,
    },

    /// Show or edit the user profile
    Profile {
        /// Profile subcommand
        #[command(subcommand)]
        action: ProfileCommands,
    },

    /// Process-mining operations
    Process {
        /// Process-mining subcommand
        #[command(subcommand)]
        action: ProcessCommands,
    },

    /// Validate configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Validate configuration
        #[arg(short, long)]
        validate: bool,
    },
}

/// Views that can be snapshotted
#[derive(Clone, Copy, ValueEnum)]
enum SnapshotView {
    /// Fleet, stores and alerts
    SupplyChain,
    /// Services and data sources
    ControlCenter,
    /// Schemas and backend health
    Catalog,
}

/// Communication type commands
#[derive(Subcommand)]
enum TypeCommands {
    /// List communication types
    List,

    /// Add a communication type
    Add {
        /// Machine name, normalized to lower case with underscores
        name: String,

        /// Display name (defaults to the name as typed)
        #[arg(long)]
        display_name: Option<String>,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Position in lists
        #[arg(long, default_value = "0")]
        sort_order: i32,

        /// Create the type disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Remove a communication type
    Remove {
        /// Type id
        id: String,
    },
}

/// Field definition commands
#[derive(Subcommand)]
enum FieldCommands {
    /// List field definitions
    List {
        /// Only fields attached to this communication type
        #[arg(long, value_name = "TYPE_ID")]
        type_id: Option<String>,
    },

    /// Add a field definition
    Add {
        /// Machine name, normalized to lower case with underscores
        name: String,

        /// Label shown in forms
        #[arg(long)]
        label: String,

        /// Owning communication type
        #[arg(long, value_name = "TYPE_ID")]
        type_id: Option<String>,

        /// Input kind
        #[arg(long, value_enum, default_value = "text")]
        kind: FieldKind,

        /// Mark the field mandatory
        #[arg(long)]
        required: bool,

        /// Choices for select fields (comma separated)
        #[arg(long, value_delimiter = ',')]
        options: Vec<String>,
    },

    /// Remove a field definition
    Remove {
        /// Field id
        id: String,
    },
}

/// Field input kinds accepted on the command line
#[derive(Clone, Copy, ValueEnum)]
enum FieldKind {
    Text,
    Number,
    Date,
    Select,
    Boolean,
}

impl From<FieldKind> for FieldType {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => Self::Text,
            FieldKind::Number => Self::Number,
            FieldKind::Date => Self::Date,
            FieldKind::Select => Self::Select,
            FieldKind::Boolean => Self::Boolean,
        }
    }
}

/// Profile commands
#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the profile
    Show,

    /// Create or update the profile
    Set {
        /// Business role
        #[arg(long)]
        role: String,

        /// Focus areas (comma separated)
        #[arg(long, value_delimiter = ',')]
        focus: Vec<String>,

        /// Display preference as KEY=VALUE, repeatable
        #[arg(long = "pref", value_name = "KEY=VALUE")]
        preferences: Vec<String>,
    },
}

/// Process-mining commands
#[derive(Subcommand)]
enum ProcessCommands {
    /// List known processes
    List,

    /// Run process discovery and print the backend response
    Discover {
        /// Process id
        process_id: String,

        /// Discovery algorithm
        #[arg(long, default_value = "inductive")]
        algorithm: String,

        /// Noise filtering threshold in [0, 1]
        #[arg(long, default_value = "0.2")]
        noise: f64,
    },
}

/// Main entry point for the dashboard CLI
///
/// # Errors
///
/// Returns error if configuration, backend access or a command fails
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }
    pulseboard_core::init_logging(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?config.backend.mode,
        "pulseboard starting"
    );

    match cli.command {
        Some(Commands::Config { show, validate }) => handle_config_command(&config, show, validate),
        command => {
            config.validate()?;
            let mut dashboard = Dashboard::connect(&config).await?;
            let result = run_command(&mut dashboard, command).await;
            dashboard.shutdown().await?;
            result
        }
    }
}

/// Load configuration from file or environment
///
/// # Errors
///
/// Returns error if the configuration file cannot be read or parsed
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        info!("Loading configuration from: {}", path.display());
        Config::from_toml_file(path).map_err(|e| {
            DashboardError::configuration(format!(
                "Failed to load config file {}: {e}",
                path.display()
            ))
        })
    } else {
        Ok(Config::load()?)
    }
}

async fn run_command(dashboard: &mut Dashboard, command: Option<Commands>) -> Result<()> {
    if dashboard.backend().mode() == DataMode::Fixture {
        info!("Fixture mode: configuration changes last for this process only");
    }

    match command {
        Some(Commands::Watch) | None => watch_supply_chain(dashboard).await,
        Some(Commands::ControlCenter) => watch_control_center(dashboard).await,
        Some(Commands::Snapshot { view }) => snapshot(dashboard, view).await,
        Some(Commands::Types { action }) => handle_type_command(dashboard, action).await,
        Some(Commands::Fields { action }) => handle_field_command(dashboard, action).await,
        Some(Commands::Profile { action }) => handle_profile_command(dashboard, action).await,
        Some(Commands::Process { action }) => handle_process_command(dashboard, action).await,
        Some(Commands::Config { .. }) => Ok(()),
    }
}

fn log_supply_chain(dashboard: &Dashboard) {
    let view = &dashboard.supply_chain;
    let summary = view.summary();
    info!(
        health = summary.health_score,
        trucks = summary.fleet.total,
        delayed = summary.fleet.delayed,
        low_stock = summary.stores.low_stock,
        unresolved_alerts = summary.alerts.unresolved,
        pending_actions = summary.pending_actions,
        "Supply chain"
    );
    for error in view.errors() {
        warn!(resource = %error.resource, "{}", error.message);
    }
}

fn log_control_center(dashboard: &Dashboard) {
    let view = &dashboard.control_center;
    let summary = view.summary();
    let status = view
        .health()
        .map_or_else(|| "unknown".to_string(), |h| h.status);
    info!(
        status = %status,
        services_up = summary.services_up,
        services_down = summary.services_down,
        availability = summary.availability_percent,
        sources = summary.connected_sources,
        "Control center"
    );
    for error in view.errors() {
        warn!(resource = %error.resource, "{}", error.message);
    }
}

/// Poll the supply-chain view until Ctrl+C
///
/// # Errors
///
/// Returns error if the view cannot be activated or stopped
async fn watch_supply_chain(dashboard: &Dashboard) -> Result<()> {
    dashboard.supply_chain.activate().await?;
    log_supply_chain(dashboard);
    info!("Watching supply chain. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down gracefully");
                break;
            }
            cycle = dashboard.supply_chain.poller().wait_for_cycle() => {
                cycle?;
                log_supply_chain(dashboard);
            }
        }
    }

    dashboard.supply_chain.deactivate().await
}

/// Poll the control-center view until Ctrl+C
///
/// # Errors
///
/// Returns error if the view cannot be activated or stopped
async fn watch_control_center(dashboard: &Dashboard) -> Result<()> {
    dashboard.control_center.activate().await?;
    log_control_center(dashboard);
    info!("Watching control center. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down gracefully");
                break;
            }
            cycle = dashboard.control_center.poller().wait_for_cycle() => {
                cycle?;
                log_control_center(dashboard);
            }
        }
    }

    dashboard.control_center.deactivate().await
}

/// Run one cycle of a view and print its summary
///
/// # Errors
///
/// Returns error if the summary cannot be serialized
async fn snapshot(dashboard: &Dashboard, view: SnapshotView) -> Result<()> {
    let value = match view {
        SnapshotView::SupplyChain => {
            let view = &dashboard.supply_chain;
            view.refresh().await;
            serde_json::json!({
                "summary": view.summary(),
                "errors": view.errors(),
            })
        }
        SnapshotView::ControlCenter => {
            let view = &dashboard.control_center;
            view.refresh().await;
            serde_json::json!({
                "health": view.health(),
                "summary": view.summary(),
                "errors": view.errors(),
            })
        }
        SnapshotView::Catalog => {
            let view = &dashboard.catalog;
            view.refresh().await;
            serde_json::json!({
                "health": view.health(),
                "schemas": view.schemas(),
                "placeholder": view.placeholder(),
                "errors": view.errors(),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Fail with the banner a controller set while loading
fn require_loaded(loaded: bool, banner: Option<&str>) -> Result<()> {
    if loaded {
        Ok(())
    } else {
        Err(DashboardError::configuration(
            banner.unwrap_or("Failed to load list").to_string(),
        ))
    }
}

/// Handle communication type commands
///
/// # Errors
///
/// Returns error if the backend rejects the request or the form is invalid
async fn handle_type_command(dashboard: &mut Dashboard, action: TypeCommands) -> Result<()> {
    let types = &mut dashboard.comms.types;
    let loaded = types.load().await;
    require_loaded(loaded, types.error())?;

    match action {
        TypeCommands::List => {
            if types.items().is_empty() {
                println!("No communication types configured");
            }
            for t in types.items() {
                println!(
                    "{:<38} {:<20} {:<24} order={} {}",
                    t.id,
                    t.name,
                    t.display_name,
                    t.sort_order,
                    if t.enabled { "enabled" } else { "disabled" }
                );
            }
        }
        TypeCommands::Add {
            name,
            display_name,
            description,
            sort_order,
            disabled,
        } => {
            types.open_create();
            if let Some(form) = types.form_mut() {
                form.display_name = display_name.unwrap_or_else(|| name.clone());
                form.name = name;
                form.description = description;
                form.sort_order = sort_order;
                form.enabled = !disabled;
            }
            let saved = types.save().await?;
            println!("Created communication type {} ({})", saved.name, saved.id);
        }
        TypeCommands::Remove { id } => {
            types.delete(&id).await?;
            println!("Removed communication type {id}");
        }
    }

    Ok(())
}

/// Handle field definition commands
///
/// # Errors
///
/// Returns error if the backend rejects the request or the form is invalid
async fn handle_field_command(dashboard: &mut Dashboard, action: FieldCommands) -> Result<()> {
    let comms = &mut dashboard.comms;
    let loaded = comms.fields.load().await;
    require_loaded(loaded, comms.fields.error())?;

    match action {
        FieldCommands::List { type_id } => {
            let fields = match type_id.as_deref() {
                Some(type_id) => comms.fields_for(type_id),
                None => comms.fields.items().iter().collect(),
            };
            if fields.is_empty() {
                println!("No field definitions configured");
            }
            for f in fields {
                println!(
                    "{:<38} {:<20} {:<24} type={} {}",
                    f.id,
                    f.name,
                    f.label,
                    f.communication_type_id.as_deref().unwrap_or("-"),
                    if f.required { "required" } else { "optional" }
                );
            }
        }
        FieldCommands::Add {
            name,
            label,
            type_id,
            kind,
            required,
            options,
        } => {
            let fields = &mut comms.fields;
            fields.open_create();
            if let Some(form) = fields.form_mut() {
                form.name = name;
                form.label = label;
                form.communication_type_id = type_id;
                form.field_type = kind.into();
                form.required = required;
                form.options = options;
            }
            if !fields.can_submit() {
                return Err(DashboardError::validation(
                    "options",
                    "select fields need at least one option",
                ));
            }
            let saved = fields.save().await?;
            println!("Created field {} ({})", saved.name, saved.id);
        }
        FieldCommands::Remove { id } => {
            comms.fields.delete(&id).await?;
            println!("Removed field {id}");
        }
    }

    Ok(())
}

fn parse_preferences(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| {
                    DashboardError::validation("pref", format!("expected KEY=VALUE, got {pair}"))
                })
        })
        .collect()
}

/// Handle profile commands
///
/// # Errors
///
/// Returns error if the profile cannot be loaded or saved
async fn handle_profile_command(dashboard: &mut Dashboard, action: ProfileCommands) -> Result<()> {
    let editor = &mut dashboard.profile;
    if !editor.load().await {
        return Err(DashboardError::configuration(
            editor.error().unwrap_or("Failed to load profile").to_string(),
        ));
    }

    match action {
        ProfileCommands::Show => match editor.profile() {
            Some(profile) => println!("{}", serde_json::to_string_pretty(profile)?),
            None => println!("No profile saved yet"),
        },
        ProfileCommands::Set {
            role,
            focus,
            preferences,
        } => {
            let preferences = parse_preferences(&preferences)?;
            let form = editor.form_mut();
            form.role = role;
            if !focus.is_empty() {
                form.focus_areas = focus;
            }
            form.preferences.extend(preferences);

            let created = !editor.exists();
            let saved = editor.save().await?;
            println!(
                "{} profile for role {}",
                if created { "Created" } else { "Updated" },
                saved.role
            );
        }
    }

    Ok(())
}

/// Handle process-mining commands
///
/// # Errors
///
/// Returns error if the backend rejects the request
async fn handle_process_command(dashboard: &Dashboard, action: ProcessCommands) -> Result<()> {
    let view = &dashboard.process_mining;

    match action {
        ProcessCommands::List => {
            if !view.load_processes().await {
                return Err(DashboardError::configuration(
                    view.processes_error()
                        .unwrap_or_else(|| "Failed to load processes".to_string()),
                ));
            }
            for p in view.processes() {
                println!(
                    "{:<24} {:<32} cases={} events={}",
                    p.id, p.name, p.case_count, p.event_count
                );
            }
        }
        ProcessCommands::Discover {
            process_id,
            algorithm,
            noise,
        } => {
            let request = DiscoverRequest {
                process_id,
                algorithm,
                noise_threshold: noise.clamp(0.0, 1.0),
            };
            let value = view.discover(&request).await?;
            info!(operation = %ProcessOperation::Discover, "Request completed");
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

/// Handle configuration commands
///
/// # Errors
///
/// Returns error if validation fails or configuration cannot be serialized
fn handle_config_command(config: &Config, show: bool, validate: bool) -> Result<()> {
    if validate {
        info!("Validating configuration...");
        config.validate()?;
        println!("Configuration is valid");
    }

    if show {
        println!("{}", config.to_toml_string()?);
    }

    Ok(())
}
