//! Entry point for the **gridwm** daemon.
//!
//! Spawns the command listener on a background thread and feeds every
//! request it delivers into the [`Engine`](gridwm::engine::Engine) on the
//! main thread, one at a time.

use gridwm::backend::headless::HeadlessBackend;
use gridwm::command::Request;
use gridwm::config::Config;
use gridwm::engine::{Engine, Flow};
use gridwm::ipc::listener::UnixSocketListener;
use gridwm::traits::{Backend, CommandSource};
use log::{error, info};
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::sync::mpsc;

/// Default socket path for the command listener.
fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("gridwm.sock")
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/gridwm`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("gridwm")
}

/// Try to load the config from `$XDG_CONFIG_HOME/gridwm/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();
    let backend = HeadlessBackend::new(config.monitors.clone());
    let engine = match Engine::new(backend, config.workspaces.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            error!("failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let (req_tx, req_rx) = mpsc::channel::<Request>();
    let socket = config.socket_path.clone().unwrap_or_else(default_socket_path);
    spawn_command_sources(req_tx, socket.clone());

    if run_event_loop(engine, req_rx) == Flow::Restart {
        restart(&socket);
    }
}

/// Apply requests until every source has closed or a restart is asked for.
fn run_event_loop<B: Backend>(mut engine: Engine<B>, req_rx: mpsc::Receiver<Request>) -> Flow {
    info!("gridwm running");
    for req in req_rx {
        match engine.handle(req) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Restart) => return Flow::Restart,
            Err(e) => error!("command error: {}", e),
        }
    }
    info!("all command sources closed, exiting");
    Flow::Continue
}

/// Replace the running process with a fresh copy of the same binary.
fn restart(socket: &std::path::Path) {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            error!("cannot locate own binary: {}", e);
            std::process::exit(1);
        }
    };
    info!("restarting {}", exe.display());
    let _ = std::fs::remove_file(socket);
    let err = std::process::Command::new(&exe)
        .args(std::env::args_os().skip(1))
        .exec();
    error!("restart failed: {}", err);
    std::process::exit(1);
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Request>, path: PathBuf) {
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
