//! # Switchyard - Interactive Routing Console
//!
//! A thin interactive wrapper around the routing core: reads a numeric menu
//! choice and a request identifier from a human, routes the request through
//! the selected strategy, and prints route/accept/reject messages. All
//! algorithmic behavior lives in the library; this binary only does I/O.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::signal;
use tracing::info;

use switchyard::observability::{init_logging, init_metrics};
use switchyard::{
    Request, Router, RoutingResult, RoutingStrategy, ServiceRegistry, StrategyConfig,
    SwitchyardConfig,
};

#[tokio::main]
async fn main() -> RoutingResult<()> {
    let config = load_config().await?;

    init_logging(&config.observability.logging);
    let metrics_handle = init_metrics(&config.observability.metrics)?;

    info!("🚀 Starting Switchyard routing console");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(ServiceRegistry::from_config(&config)?);

    // One router per strategy over the shared registry, so the operator can
    // switch algorithms per request while all of them observe the same fleet.
    let routers = [
        Router::new(Arc::clone(&registry), RoutingStrategy::least_loaded()),
        Router::new(Arc::clone(&registry), RoutingStrategy::hash_routed()),
        Router::new(Arc::clone(&registry), RoutingStrategy::round_robin()),
    ];
    let default_router = match config.strategy {
        StrategyConfig::LeastLoaded => 0,
        StrategyConfig::HashRouted => 1,
        StrategyConfig::RoundRobin => 2,
    };

    info!(
        default_strategy = config.strategy.name(),
        request_types = ?registry.request_types(),
        "Routing core ready"
    );

    let session = run_session(&registry, &routers, default_router, metrics_handle.as_ref());
    tokio::select! {
        result = session => result?,
        _ = signal::ctrl_c() => {
            println!();
            info!("📡 Received Ctrl+C, exiting");
        }
    }

    info!("✅ Switchyard shutdown complete");
    Ok(())
}

/// Load configuration from `SWITCHYARD_CONFIG_PATH` (default
/// `config/switchyard.yaml`), falling back to the built-in demo fleet when
/// no file exists at the default path.
async fn load_config() -> RoutingResult<SwitchyardConfig> {
    let config_path = std::env::var("SWITCHYARD_CONFIG_PATH")
        .unwrap_or_else(|_| "config/switchyard.yaml".to_string());

    if std::path::Path::new(&config_path).exists() {
        SwitchyardConfig::load_from_file(&config_path).await
    } else {
        let mut config = SwitchyardConfig::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }
}

/// The interactive menu loop. Errors from individual requests are printed
/// and the session continues; only I/O failures end it.
async fn run_session(
    registry: &Arc<ServiceRegistry>,
    routers: &[Router; 3],
    default_router: usize,
    metrics_handle: Option<&metrics_exporter_prometheus::PrometheusHandle>,
) -> RoutingResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!();
        println!("Select Load Balancing Algorithm:");
        println!("1. Least Loaded");
        println!("2. Hash Routed");
        println!("3. Round Robin");
        println!("4. Exit");
        println!("5. Show Stats");
        prompt(&format!(
            "Enter choice [{}]: ",
            routers[default_router].strategy_name()
        ))?;

        let Some(choice) = lines.next_line().await? else {
            break; // stdin closed
        };

        let router = match choice.trim() {
            "" => &routers[default_router],
            "1" => &routers[0],
            "2" => &routers[1],
            "3" => &routers[2],
            "4" => {
                println!("Exiting Switchyard...");
                break;
            }
            "5" => {
                print_stats(registry, metrics_handle)?;
                continue;
            }
            _ => {
                println!("Invalid choice. Try again.");
                continue;
            }
        };

        let Some(request) = read_request(&mut lines, registry).await? else {
            break;
        };

        route_one(router, &request);
    }

    Ok(())
}

/// Prompt for request type and id, returning `None` when stdin closes.
async fn read_request(
    lines: &mut Lines<BufReader<Stdin>>,
    registry: &ServiceRegistry,
) -> RoutingResult<Option<Request>> {
    let request_types = registry.request_types();
    let default_type = request_types
        .first()
        .cloned()
        .unwrap_or_else(|| "http".to_string());

    prompt(&format!("Request type [{}]: ", default_type))?;
    let Some(type_line) = lines.next_line().await? else {
        return Ok(None);
    };
    let request_type = match type_line.trim() {
        "" => default_type,
        other => other.to_string(),
    };

    prompt("Enter Request ID (numeric or string): ")?;
    let Some(id_line) = lines.next_line().await? else {
        return Ok(None);
    };

    Ok(Some(Request::new(
        format!("REQ{}", id_line.trim()),
        request_type,
    )))
}

/// Route one request and run the two-phase accept/complete demonstration.
fn route_one(router: &Router, request: &Request) {
    match router.route(request) {
        Ok(destination) => {
            println!("➡️  Request routed to: {}", destination.address());

            // Routing chose the destination; admission is the separate
            // second phase and may still reject.
            if destination.try_admit() {
                println!(
                    "✅ Request accepted by {} | Currently serving: {}",
                    destination.address(),
                    destination.in_flight()
                );
                destination.release();
                println!(
                    "✔️  Request completed by {} | Currently serving: {}",
                    destination.address(),
                    destination.in_flight()
                );
            } else {
                println!(
                    "❌ Request rejected by {} (Overloaded)",
                    destination.address()
                );
            }
        }
        Err(e) => println!("⚠️  Error: {}", e),
    }
}

/// Print registry statistics as JSON, plus the Prometheus rendering when
/// the recorder is installed.
fn print_stats(
    registry: &ServiceRegistry,
    metrics_handle: Option<&metrics_exporter_prometheus::PrometheusHandle>,
) -> RoutingResult<()> {
    let stats = registry.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    if let Some(handle) = metrics_handle {
        let rendered = handle.render();
        if !rendered.is_empty() {
            println!("{}", rendered);
        }
    }

    Ok(())
}

/// Print a prompt without a trailing newline and flush it out.
fn prompt(text: &str) -> RoutingResult<()> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}
