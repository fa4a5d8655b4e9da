use clap::Parser;
use efishpond::config::AppConfig;
use efishpond::core::TelemetryHub;
use efishpond::ui::{self, icons, text_renderer, Route, Router, ScreenSettings, StackRouter};
use efishpond_core::{global_registry, SharedRemoteStore};
use efishpond_types::{MetricKey, StoreBackend};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

/// Ticks between screen changes in tour mode
const TOUR_STEP: u64 = 8;

/// e-FishPond - live pond telemetry in the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "efishpond")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Remote store backend (memory, simulated, replay)
    #[arg(short = 'b', long = "backend", value_name = "BACKEND")]
    backend: Option<StoreBackend>,

    /// Replay script to play back (implies --backend replay)
    #[arg(short = 'r', long = "replay", value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Screen to show at startup (home, ph, temperature, oxygen, feeder)
    #[arg(short = 's', long = "screen", value_name = "SCREEN")]
    screen: Option<Route>,

    /// Stop after this many event loop ticks
    #[arg(short = 't', long = "ticks", value_name = "N")]
    ticks: Option<u64>,

    /// Walk through every detail screen and back
    #[arg(long = "tour")]
    tour: bool,

    /// Configuration file to use instead of the default location
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the effective configuration back to disk
    #[arg(long = "save-config")]
    save_config: bool,

    /// List available store backends
    #[arg(short = 'l', long = "list")]
    list_backends: bool,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    warn!("Starting e-FishPond v{}", env!("CARGO_PKG_VERSION"));

    // Register all built-in store backends
    efishpond_sources::register_all();

    if cli.list_backends {
        list_backends();
        return Ok(());
    }

    let config = load_config(&cli)?;
    if cli.save_config {
        match &cli.config {
            Some(path) => config.save_to_path(path)?,
            None => config.save()?,
        }
        info!("Configuration saved");
    }

    let store = {
        let registry = global_registry()
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registry.create_configured(&config.store)?
    };
    info!("Using store backend: {}", store.metadata().name);

    run(&cli, &config, store).await
}

/// Load the configuration file and apply command line overrides
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }),
    };

    if let Some(backend) = cli.backend {
        config.store.backend = backend;
    }
    if let Some(path) = &cli.replay {
        config.store.backend = StoreBackend::Replay;
        config.store.replay_file = Some(path.clone());
    }
    if let Some(screen) = cli.screen {
        config.ui.start_screen = screen;
    }
    Ok(config)
}

fn list_backends() {
    let registry = global_registry()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let stores = registry.list_stores();
    println!("Available store backends ({}):", stores.len());
    for id in stores {
        let name = registry
            .store_info(&id)
            .map(|info| info.display_name.clone())
            .unwrap_or_else(|| id.clone());
        println!("  {:<10} {}", id, name);
    }
}

/// Event loop: poll the store, deliver notifications, redraw on change
async fn run(cli: &Cli, config: &AppConfig, store: SharedRemoteStore) -> anyhow::Result<()> {
    let hub = TelemetryHub::new(store.clone());
    let settings = ScreenSettings::from(config);
    let tabs = ui::tabs(icons());

    let mut router = StackRouter::new();
    if config.ui.start_screen != Route::Home {
        router.push(config.ui.start_screen);
    }
    let mut screen = ui::mount(router.current(), &hub, settings.clone())?;
    let mut last_revision: Option<u64> = None;
    let mut tour_index = 0usize;

    let mut interval = tokio::time::interval(Duration::from_millis(config.ui.tick_interval_ms.max(1)));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut tick: u64 = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }
        tick += 1;

        if let Err(e) = store.update() {
            warn!("Store update failed: {}", e);
        }
        hub.pump();

        if cli.tour && tick % TOUR_STEP == 0 {
            if router.current() == Route::Home {
                let key = MetricKey::ALL[tour_index % MetricKey::ALL.len()];
                tour_index += 1;
                router.push(ui::detail_route(key));
            } else {
                screen.back(&mut router);
            }
            // Unmount before mounting the next screen
            drop(screen);
            screen = ui::mount(router.current(), &hub, settings.clone())?;
            hub.pump();
            last_revision = None;
        }

        let revision = screen.revision();
        if last_revision != Some(revision) {
            let frame = text_renderer::render_frame(&screen.view(), &tabs, router.current());
            println!("{}", frame);
            last_revision = Some(revision);
        }

        if cli.ticks.is_some_and(|max| tick >= max) {
            break;
        }
    }

    drop(screen);
    info!(
        "Shut down with {} hub listeners, {} store listeners",
        hub.listener_count(),
        store.listener_count()
    );
    hub.debug_print_listeners();
    Ok(())
}
