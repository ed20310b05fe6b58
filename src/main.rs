use color_eyre::{eyre::eyre, Result};
use kanapad::config::{OutputKind, Settings};
use kanapad::controller::gilrs_source::GilrsSource;
use kanapad::controller::{Classifier, Direction, PadPoller};
use kanapad::engine::{EngineContext, EngineHandle, InputEngine};
use kanapad::mapping::BindingTable;
use kanapad::output::{KeySink, LogSink};
use std::sync::Arc;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let settings = Settings::load().await?;
    info!("Using settings: {:?}", settings);

    let table = BindingTable::standard().map_err(|e| {
        error!("Refusing to start with an invalid binding table: {}", e);
        eyre!("Invalid binding table: {}", e)
    })?;

    let sink = create_sink(settings.output);
    let context = EngineContext::new(table, sink).with_timing(settings.repeat_timing());

    let engine = InputEngine::create(
        create_poller(),
        Classifier::new(settings.deadzone),
        context,
        settings.poll_interval(),
    )
    .map_err(|e| eyre!("Failed to configure input engine: {}", e))?;

    let mut handle = EngineHandle::spawn(engine);
    log_cheat_sheet(&handle.table());
    let status_task = spawn_status_logger(&handle);

    info!("Ready, press Ctrl-C to quit");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| eyre!("Failed to listen for Ctrl-C: {}", e))?;

    info!("Shutting down");
    let ticks = handle
        .shutdown()
        .await
        .map_err(|e| eyre!("Failed to stop input engine: {}", e))?;
    status_task.abort();
    info!("Stopped after {} ticks", ticks);
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

/// Gilrs-backed poller, or an idle one when no backend is available
fn create_poller() -> PadPoller {
    match GilrsSource::create() {
        Ok(source) => PadPoller::new(Box::new(source.initialize())),
        Err(e) => {
            warn!("Controller backend unavailable, idling: {}", e);
            PadPoller::idle()
        }
    }
}

fn create_sink(kind: OutputKind) -> Arc<dyn KeySink> {
    match kind {
        OutputKind::Log => Arc::new(LogSink),
        OutputKind::Uinput => uinput_sink(),
    }
}

#[cfg(target_os = "linux")]
fn uinput_sink() -> Arc<dyn KeySink> {
    match kanapad::output::UinputSink::create() {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            warn!("{}, falling back to log output", e);
            Arc::new(LogSink)
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn uinput_sink() -> Arc<dyn KeySink> {
    warn!("uinput output needs Linux, falling back to log output");
    Arc::new(LogSink)
}

/// One debug line per grid cell with the bindings under it
fn log_cheat_sheet(table: &BindingTable) {
    for direction in Direction::GRID {
        let cell: Vec<String> = table
            .bindings_for_direction(direction)
            .iter()
            .map(|binding| binding.to_string())
            .collect();
        debug!("{}: {}", direction.label(), cell.join(", "));
    }
}

/// Logs every mode/direction change and enable flip in place of an overlay
fn spawn_status_logger(handle: &EngineHandle) -> tokio::task::JoinHandle<()> {
    let mut status = handle.status();
    let mut enabled = handle.enabled();
    let table = handle.table();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = *status.borrow_and_update();
                    let page: Vec<&str> = table
                        .bindings_for(current.mode, current.direction)
                        .iter()
                        .map(|binding| binding.display_name.as_str())
                        .collect();
                    info!("{} [{}]", current, page.join(" "));
                }
                changed = enabled.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let on = *enabled.borrow_and_update();
                    info!("Input {}", if on { "ON" } else { "OFF" });
                }
            }
        }
    })
}
