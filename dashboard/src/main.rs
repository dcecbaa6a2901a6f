//! Dokku Dashboard - Entry Point
//!
//! Command-line harness over the dashboard core. Every query prints JSON
//! on stdout; `--diagnostic` prints a short colored summary instead.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use colored::Colorize;
use futures::StreamExt;
use serde::Serialize;
use tracing::{error, info};

use dokku_dashboard::client::DokkuClient;
use dokku_dashboard::config::settings::{Settings, DEFAULT_SETTINGS_PATH};
use dokku_dashboard::errors::DashboardError;
use dokku_dashboard::logs::{init_logging, LogOptions};
use dokku_dashboard::models::app::LifecycleAction;
use dokku_dashboard::utils::version_info;

/// Default number of lines for `--logs`
const DEFAULT_LOG_LINES: u32 = 100;

#[derive(Serialize)]
struct MaskedVariable<'a> {
    key: &'a str,
    value: &'a str,
    is_sensitive: bool,
}

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        print_json(&version_info());
        return;
    }

    // Load settings
    let settings_path = cli_args
        .get("settings")
        .map(String::as_str)
        .unwrap_or(DEFAULT_SETTINGS_PATH);
    let settings = match Settings::load(settings_path).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file {}: {}", settings_path, e);
            std::process::exit(2);
        }
    };

    // Initialize logging; keep the guard so file output is flushed on exit
    let log_options = LogOptions {
        log_level: settings.effective_log_level(),
        log_dir: settings.log_dir.clone(),
        json_format: settings.json_logs,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    // Run diagnostics
    if cli_args.contains_key("diagnostic") || cli_args.contains_key("diag") {
        run_diagnostic(&settings).await;
        return;
    }

    let client = match DokkuClient::from_settings(&settings) {
        Ok(client) => client,
        Err(e) => {
            error!("Unable to reach dokku: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&client, &cli_args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(client: &DokkuClient, cli_args: &HashMap<String, String>) -> Result<(), DashboardError> {
    if let Some(action) = cli_args.get("action") {
        let action: LifecycleAction = action.parse().map_err(DashboardError::ValidationError)?;
        let app = cli_args
            .get("app")
            .ok_or_else(|| DashboardError::ValidationError("--action requires --app".to_string()))?;
        let outcome = client.control(app, action).await?;
        print_json(&outcome);
        return Ok(());
    }

    if let Some(app) = cli_args.get("app") {
        print_json(&client.app_detail(app).await);
        return Ok(());
    }

    if let Some(app) = cli_args.get("config") {
        let vars = client.config_list(app).await;
        let masked: Vec<MaskedVariable> = vars
            .iter()
            .map(|var| MaskedVariable {
                key: &var.key,
                value: var.masked_value(),
                is_sensitive: var.is_sensitive,
            })
            .collect();
        print_json(&masked);
        return Ok(());
    }

    if let Some(app) = cli_args.get("logs") {
        let lines = match cli_args.get("lines") {
            Some(lines) => lines
                .parse()
                .map_err(|_| DashboardError::ValidationError(format!("Invalid --lines: {}", lines)))?,
            None => DEFAULT_LOG_LINES,
        };
        if cli_args.contains_key("follow") {
            return follow_logs(client, app, lines).await;
        }
        for line in client.logs_recent(app, lines).await {
            print_json_line(&line);
        }
        return Ok(());
    }

    if cli_args.contains_key("certs") {
        print_json(&client.certificates().await);
    } else if cli_args.contains_key("services") {
        print_json(&client.services().await);
    } else if cli_args.contains_key("plugins") {
        print_json(&client.plugins().await);
    } else if cli_args.contains_key("system") {
        print_json(&client.system_info().await);
    } else {
        // --apps is also the default
        print_json(&client.list_apps().await);
    }
    Ok(())
}

/// Print log lines until the stream ends or ctrl-c
async fn follow_logs(client: &DokkuClient, app: &str, lines: u32) -> Result<(), DashboardError> {
    let mut stream = client.logs_stream(app, lines).await?;
    info!("Following logs of {} (pid {:?})", app, stream.pid());

    loop {
        tokio::select! {
            line = stream.next() => match line {
                Some(line) => print_json_line(&line),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, closing log stream...");
                break;
            }
        }
    }
    Ok(())
}

async fn run_diagnostic(settings: &Settings) {
    let version = version_info();
    println!("{} {} ({})", "dokku-dash".bold(), version.version, version.git_hash);

    let socket = &settings.paths.control_socket;
    println!("  settings data source: {:?}", settings.data_source);
    println!("  control socket {}: {}", socket.display(), presence(socket));
    if settings.ssh.host.is_empty() {
        println!("  remote host: {}", "not configured".yellow());
    } else {
        println!(
            "  remote host: {}@{}:{} (key {}: {})",
            settings.ssh.user,
            settings.ssh.host,
            settings.ssh.port,
            settings.ssh.key_path.display(),
            presence(&settings.ssh.key_path)
        );
    }

    let client = match DokkuClient::from_settings(settings) {
        Ok(client) => client,
        Err(e) => {
            println!("  data source: {}", e.to_string().red());
            return;
        }
    };
    println!("  data source: {}", client.kind().as_str().green());

    let system = client.system_info().await;
    let version = if system.dokku_version == "unknown" {
        system.dokku_version.red()
    } else {
        system.dokku_version.green()
    };
    println!("  dokku version: {}", version);
    match &system.docker_version {
        Some(docker) => println!("  docker version: {}", docker),
        None => println!("  docker version: {}", "unavailable".yellow()),
    }
    println!("  apps: {}", system.app_count);
    if let Some(host) = &system.host {
        println!(
            "  host {}: cpu {:.1}%, memory {:.1}%, disk {:.1}%",
            host.hostname, host.cpu_usage, host.memory_percent, host.disk_percent
        );
    }
}

fn presence(path: &Path) -> colored::ColoredString {
    if path.exists() {
        "present".green()
    } else {
        "missing".red()
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Unable to serialize output: {}", e),
    }
}

fn print_json_line<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Unable to serialize output: {}", e),
    }
}
