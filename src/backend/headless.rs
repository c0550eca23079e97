//! [`Backend`] that drives no display.
//!
//! Every request is written to the log instead of a window system, which
//! makes the daemon usable for scripting the layout model and for watching
//! what a real transport would be asked to do.  Only `spawn` has a real
//! effect: it starts the program through `sh -c`, detached from the
//! daemon.

use crate::geometry::MonitorInfo;
use crate::layout::{Layout, WindowId};
use crate::traits::Backend;
use log::{debug, info};
use std::cell::Cell;
use std::process::{Command, Stdio};

/// Log-only backend with a fixed set of monitors.
pub struct HeadlessBackend {
    monitors: Vec<MonitorInfo>,
    next_stack_window: Cell<u64>,
}

/// Errors from the headless backend.
#[derive(Debug, thiserror::Error)]
#[error("headless backend error: {0}")]
pub struct HeadlessError(String);

/// Stack indicator ids are allocated from here upwards so they never
/// collide with ids handed to `manage`.
const STACK_WINDOW_BASE: u64 = 0xffff_0000_0000;

impl HeadlessBackend {
    /// Create a backend reporting `monitors` as its outputs.
    pub fn new(monitors: Vec<MonitorInfo>) -> Self {
        Self {
            monitors,
            next_stack_window: Cell::new(STACK_WINDOW_BASE),
        }
    }
}

impl Backend for HeadlessBackend {
    type Error = HeadlessError;

    fn monitors(&self) -> Result<Vec<MonitorInfo>, HeadlessError> {
        if self.monitors.is_empty() {
            return Err(HeadlessError("no monitors configured".into()));
        }
        Ok(self.monitors.clone())
    }

    fn render(&self, layout: &Layout) -> Result<(), HeadlessError> {
        for (idx, monitor) in layout.monitors().iter().enumerate() {
            let ws = layout.workspace(monitor.current_workspace());
            let (cols, rows) = ws.grid().dimensions();
            debug!(
                "monitor {} ({}): workspace {}, {}x{} grid",
                idx,
                monitor.name(),
                ws.num(),
                cols,
                rows
            );
            for c in ws.grid().containers().filter(|c| !c.is_empty()) {
                let r = c.rect();
                debug!(
                    "  ({}, {}) {}x{}+{}+{} {:?}: {:?}",
                    c.col(),
                    c.row(),
                    r.width,
                    r.height,
                    r.x,
                    r.y,
                    c.mode(),
                    c.clients()
                );
            }
        }
        Ok(())
    }

    fn map_window(&self, window: WindowId) -> Result<(), HeadlessError> {
        debug!("map {}", window);
        Ok(())
    }

    fn unmap_window(&self, window: WindowId) -> Result<(), HeadlessError> {
        debug!("unmap {}", window);
        Ok(())
    }

    fn set_input_focus(&self, window: WindowId) -> Result<(), HeadlessError> {
        info!("focus {}", window);
        Ok(())
    }

    fn focus_pointer_root(&self) -> Result<(), HeadlessError> {
        info!("focus follows pointer");
        Ok(())
    }

    fn warp_pointer_to_window(&self, window: WindowId) -> Result<(), HeadlessError> {
        debug!("warp pointer into {}", window);
        Ok(())
    }

    fn warp_pointer(&self, x: i32, y: i32) -> Result<(), HeadlessError> {
        debug!("warp pointer to ({}, {})", x, y);
        Ok(())
    }

    fn set_fullscreen(&self, window: WindowId, fullscreen: bool) -> Result<(), HeadlessError> {
        info!("fullscreen {} = {}", window, fullscreen);
        Ok(())
    }

    fn create_stack_window(&self) -> Result<WindowId, HeadlessError> {
        let id = WindowId(self.next_stack_window.get());
        self.next_stack_window.set(id.0 + 1);
        debug!("created stack window {}", id);
        Ok(id)
    }

    fn destroy_stack_window(&self, window: WindowId) -> Result<(), HeadlessError> {
        debug!("destroyed stack window {}", window);
        Ok(())
    }

    fn spawn(&self, command_line: &str) -> Result<(), HeadlessError> {
        // The outer shell backgrounds the program and exits at once, so the
        // program is reparented to init and never becomes our zombie.
        let status = Command::new("sh")
            .arg("-c")
            .arg(r#"sh -c "$1" &"#)
            .arg("gridwm")
            .arg(command_line)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| HeadlessError(format!("spawn {:?}: {}", command_line, e)))?;
        if !status.success() {
            return Err(HeadlessError(format!("spawn {:?}: {}", command_line, status)));
        }
        debug!("started {:?}", command_line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceConfig;
    use crate::engine::Engine;
    use crate::testing::{side_by_side, w};

    #[test]
    fn reports_configured_monitors() {
        let backend = HeadlessBackend::new(side_by_side());
        let monitors = backend.monitors().unwrap();
        assert_eq!(monitors.len(), 2);
        assert_eq!(monitors[1].name, "DP-2");
    }

    #[test]
    fn no_monitors_is_an_error() {
        assert!(HeadlessBackend::new(Vec::new()).monitors().is_err());
    }

    #[test]
    fn stack_window_ids_are_unique() {
        let backend = HeadlessBackend::new(side_by_side());
        let a = backend.create_stack_window().unwrap();
        let b = backend.create_stack_window().unwrap();
        assert_ne!(a, b);
        assert!(a.0 >= STACK_WINDOW_BASE);
    }

    #[test]
    fn drives_an_engine() {
        let mut e = Engine::new(HeadlessBackend::new(side_by_side()), WorkspaceConfig::default())
            .unwrap();
        e.manage(w(1), false);
        e.execute_str("ml").unwrap();
        e.execute_str("s").unwrap();
        e.execute_str("l").unwrap();
        assert_eq!(e.check(), Ok(()));
    }

    #[test]
    fn spawn_runs_through_the_shell() {
        let backend = HeadlessBackend::new(side_by_side());
        let marker = std::env::temp_dir().join(format!("gridwm-test-spawn-{}", std::process::id()));
        let _ = std::fs::remove_file(&marker);
        backend
            .spawn(&format!("touch '{}'", marker.display()))
            .unwrap();
        for _ in 0..40 {
            if marker.exists() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
        assert!(marker.exists());
        let _ = std::fs::remove_file(&marker);
    }

    #[test]
    fn spawn_returns_without_waiting_for_the_program() {
        let backend = HeadlessBackend::new(side_by_side());
        let started = std::time::Instant::now();
        backend.spawn("sleep 5").unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(3));
    }
}
