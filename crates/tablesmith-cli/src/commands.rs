use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use tablesmith_core::{
    ConnectionInfo, DefaultParameters, DriverType, Error, GeneratorParamWrapper, TableInfo, TargetConfig,
};
use tablesmith_service::BuilderService;
use tablesmith_settings::EnvSecretStore;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage saved connections
    Connections {
        #[command(subcommand)]
        action: ConnectionsCommand,
    },
    /// List the databases of a connection
    Databases {
        /// Connection id
        id: String,
    },
    /// List the base tables of a database
    Tables {
        id: String,
        database: String,
    },
    /// List the columns of a table
    Columns {
        id: String,
        database: String,
        table: String,
    },
    /// Stage the parameters of a generation run
    Stage(StageArgs),
    /// Show the last staged parameters
    Last,
    /// Show (or update) the default target packages used by `stage`
    Defaults(DefaultsArgs),
    /// Show (or clear) the target package history
    History {
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConnectionsCommand {
    List,
    /// Add a connection, replacing any with the same id
    Add(AddConnectionArgs),
    Remove {
        id: String,
    },
    /// Open and close a connection
    Test {
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct AddConnectionArgs {
    /// mysql, postgresql, sqlite or oracle
    #[arg(long)]
    driver: DriverType,
    /// Generated when omitted
    #[arg(long)]
    id: Option<String>,
    #[arg(long, default_value = "")]
    name: String,
    /// Used verbatim instead of the driver's URL pattern
    #[arg(long)]
    url: Option<String>,
    #[arg(long, default_value = "localhost")]
    host: String,
    /// Defaults to the driver's standard port
    #[arg(long)]
    port: Option<u16>,
    /// Database name, or file path for sqlite
    #[arg(long, default_value = "")]
    database: String,
    #[arg(long, default_value = "")]
    username: String,
}

#[derive(Args, Debug)]
pub struct StageArgs {
    /// Connection the tables were selected from
    #[arg(long)]
    connection: Option<String>,
    /// Selected table as DATABASE.TABLE (repeatable)
    #[arg(long = "table", required = true, value_parser = parse_table)]
    tables: Vec<(String, String)>,
    #[arg(long)]
    project: Option<String>,
    #[arg(long)]
    model_package: Option<String>,
    #[arg(long)]
    client_package: Option<String>,
    #[arg(long)]
    sql_map_package: Option<String>,
}

#[derive(Args, Debug)]
pub struct DefaultsArgs {
    #[arg(long)]
    project: Option<String>,
    #[arg(long)]
    model_package: Option<String>,
    #[arg(long)]
    client_package: Option<String>,
    #[arg(long)]
    sql_map_package: Option<String>,
    #[arg(long)]
    generate_comments: Option<bool>,
}

fn parse_table(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once('.') {
        Some((database, table)) if !database.is_empty() && !table.is_empty() => {
            Ok((database.to_string(), table.to_string()))
        }
        _ => Err(format!("expected DATABASE.TABLE, got '{}'", value)),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to serialize output")
}

pub async fn run(service: &BuilderService, command: Command) -> Result<Value> {
    match command {
        Command::Connections { action } => run_connections(service, action).await,
        Command::Databases { id } => to_json(&service.fetch_databases(&id).await?),
        Command::Tables { id, database } => to_json(&service.fetch_tables(&id, &database).await?),
        Command::Columns {
            id,
            database,
            table,
        } => to_json(
            &service
                .fetch_columns(&id, &TableInfo::new(database, table))
                .await?,
        ),
        Command::Stage(args) => {
            let params = build_params(service, args).await?;
            service.stash_generator_params(params.clone()).await?;
            to_json(&params)
        }
        Command::Last => to_json(&service.last_generator_params().await?),
        Command::Defaults(args) => {
            let mut defaults = service.default_parameters().await?;
            if apply_defaults(&mut defaults, args) {
                service.save_default_parameters(defaults.clone()).await?;
            }
            to_json(&defaults)
        }
        Command::History { clear } => {
            if clear {
                service.clear_history().await?;
            }
            to_json(&service.history().await?)
        }
    }
}

async fn run_connections(service: &BuilderService, action: ConnectionsCommand) -> Result<Value> {
    match action {
        ConnectionsCommand::List => to_json(&service.load_connection_infos().await?),
        ConnectionsCommand::Add(args) => {
            let info = connection_from_args(args);
            let mut connections = service.load_connection_infos().await?;
            check_password_variable(&connections, &info)?;
            connections.retain(|existing| existing.id != info.id);
            connections.push(info.clone());
            service.save_connection_infos(connections).await?;

            tracing::info!(connection_id = %info.id, "Saved connection");
            to_json(&info)
        }
        ConnectionsCommand::Remove { id } => {
            let mut connections = service.load_connection_infos().await?;
            let before = connections.len();
            connections.retain(|existing| existing.id != id);
            if connections.len() == before {
                return Err(Error::ConnectionNotFound(id).into());
            }
            service.save_connection_infos(connections).await?;
            Ok(json!({ "removed": id }))
        }
        ConnectionsCommand::Test { id } => {
            let info = service.connection_info_with_password(&id).await?;
            service
                .test_connection(&info)
                .await
                .with_context(|| format!("Connection '{}' failed", info.display_name()))?;
            Ok(json!({ "connection_id": id, "status": "ok" }))
        }
    }
}

/// Passwords come from `TABLESMITH_PASSWORD_<ID>`; two ids must not share one
fn check_password_variable(connections: &[ConnectionInfo], info: &ConnectionInfo) -> Result<()> {
    if let Some(existing) = connections
        .iter()
        .find(|existing| EnvSecretStore::collides(existing, info))
    {
        bail!(
            "Connection id '{}' would share the password variable {} with '{}'",
            info.id,
            EnvSecretStore::variable_name(info),
            existing.id
        );
    }
    Ok(())
}

fn connection_from_args(args: AddConnectionArgs) -> ConnectionInfo {
    let port = args.port.unwrap_or_else(|| args.driver.default_port());
    let mut info = ConnectionInfo::new(args.driver)
        .with_name(args.name)
        .with_host(args.host, port)
        .with_database(args.database)
        .with_credentials(args.username, None);
    if let Some(id) = args.id {
        info = info.with_id(id);
    }
    if let Some(url) = args.url {
        info = info.with_url(url);
    }
    info
}

/// Selected tables start from their remembered choices; packages not given
/// on the command line come from the saved defaults
async fn build_params(service: &BuilderService, args: StageArgs) -> Result<GeneratorParamWrapper> {
    if let Some(id) = &args.connection {
        service.connection_info_with_password(id).await?;
    }

    let mut tables = Vec::with_capacity(args.tables.len());
    for (database, table) in args.tables {
        let key = TableInfo::new(database, table);
        tables.push(service.last_table_info(&key).await?.unwrap_or(key));
    }

    let defaults = service.default_parameters().await?;
    let project = args.project.unwrap_or_default();

    let mut params = GeneratorParamWrapper::new(tables);
    params.connection_id = args.connection;
    params.model_config = target(&project, args.model_package, &defaults.model_config);
    params.client_config = target(&project, args.client_package, &defaults.client_config);
    params.sql_map_config = target(&project, args.sql_map_package, &defaults.sql_map_config);

    if params.target_packages().is_empty() {
        bail!("No target package given and no defaults saved");
    }
    Ok(params)
}

/// Returns whether anything changed
fn apply_defaults(defaults: &mut DefaultParameters, args: DefaultsArgs) -> bool {
    let mut changed = false;
    let targets = [
        (&mut defaults.model_config, args.model_package),
        (&mut defaults.client_config, args.client_package),
        (&mut defaults.sql_map_config, args.sql_map_package),
    ];
    for (config, package) in targets {
        if let Some(package) = package {
            config.target_package = package;
            changed = true;
        }
        if let Some(project) = &args.project {
            config.target_project = project.clone();
            changed = true;
        }
    }
    if let Some(generate_comments) = args.generate_comments {
        defaults.generate_comments = generate_comments;
        changed = true;
    }
    changed
}

fn target(project: &str, package: Option<String>, default: &TargetConfig) -> Option<TargetConfig> {
    match package {
        Some(package) => Some(TargetConfig::new(project, package)),
        None if !default.target_package.trim().is_empty() => Some(default.clone()),
        None => None,
    }
}
