//! Showing workspaces on monitors and sending clients to other workspaces.
//!
//! A workspace is bound lazily: the first time it is shown or receives a
//! client it is attached to the active monitor and takes over that
//! monitor's rectangle.  A workspace that is switched away from while
//! holding no clients is unbound again.

use crate::engine::{request, Engine, EngineError, Outcome};
use crate::layout::{CellRef, NavigationContext, WindowId};
use crate::traits::Backend;
use log::{debug, info};

impl<B: Backend> Engine<B> {
    /// Show workspace number `num`.
    ///
    /// If the workspace is bound to another monitor, the active monitor
    /// changes first.  Showing a workspace that is already visible maps and
    /// unmaps nothing.
    pub fn show(&mut self, num: usize) -> Result<Outcome, EngineError> {
        let target = self.workspace_slot(num)?;
        self.persist_cursor();
        let monitor = self.bind_to_active_monitor(target);

        let switched = monitor != self.active_monitor();
        if switched {
            self.enter_monitor(monitor);
        }
        if self.layout.monitors[monitor].current_workspace == target {
            debug!("workspace {} is already shown", num);
            return Ok(if switched {
                Outcome::Applied
            } else {
                Outcome::Unchanged
            });
        }

        info!(
            "showing workspace {} on {}",
            num, self.layout.monitors[monitor].name
        );
        let outgoing = self.nav.workspace;
        let hidden: Vec<WindowId> = self.layout.workspaces[outgoing].grid.windows().collect();
        for &window in &hidden {
            request("unmap", self.backend.unmap_window(window));
        }
        if hidden.is_empty() {
            debug!("workspace {} is empty, unbinding it", outgoing + 1);
            self.layout.workspaces[outgoing].monitor = None;
        }
        let indicators: Vec<WindowId> = self.layout.workspaces[outgoing].stack_windows().collect();
        for window in indicators {
            request("unmap", self.backend.unmap_window(window));
        }

        self.layout.monitors[monitor].current_workspace = target;
        let ws = &self.layout.workspaces[target];
        self.nav = NavigationContext::at(target, ws.cursor);
        let shown: Vec<WindowId> = ws.grid.windows().chain(ws.stack_windows()).collect();
        for window in shown {
            request("map", self.backend.map_window(window));
        }

        match self.active_container().focused {
            Some(window) => self.set_focus(window),
            None => request("focus root", self.backend.focus_pointer_root()),
        }
        self.render();
        Ok(Outcome::Applied)
    }

    /// Send the focused client of the active cell to workspace `num`.
    ///
    /// The client joins the tail of the destination workspace's remembered
    /// cell and is unmapped if that workspace is not visible.  The cursor
    /// stays where it is.
    pub fn move_client_to_workspace(&mut self, num: usize) -> Result<Outcome, EngineError> {
        let target = self.workspace_slot(num)?;
        let from = self.nav.cell();
        let Some(window) = self.active_container().focused else {
            debug!("no focused client to send to workspace {}", num);
            return Ok(Outcome::Unchanged);
        };
        if target == from.workspace {
            debug!("{} is already on workspace {}", window, num);
            return Ok(Outcome::Unchanged);
        }
        self.bind_to_active_monitor(target);

        let (col, row) = self.layout.workspaces[target].cursor;
        let to = CellRef {
            workspace: target,
            col,
            row,
        };
        info!("moving {} to workspace {}", window, num);
        self.layout.workspaces[from.workspace].forget_focus(window);
        self.relocate(window, from, to);
        self.layout.workspaces[target].push_focus(window);
        if !self.layout.is_shown(target) {
            request("unmap", self.backend.unmap_window(window));
        }
        self.cleanup(from.workspace);
        self.render();
        Ok(Outcome::Applied)
    }

    /// Bind workspace `slot` to the active monitor unless it already has
    /// one.  Returns the monitor it is bound to.
    fn bind_to_active_monitor(&mut self, slot: usize) -> usize {
        if let Some(monitor) = self.layout.workspaces[slot].monitor {
            return monitor;
        }
        let monitor = self.active_monitor();
        debug!("binding workspace {} to monitor {}", slot + 1, monitor);
        let rect = self.layout.monitors[monitor].rect;
        let ws = &mut self.layout.workspaces[slot];
        ws.monitor = Some(monitor);
        ws.rect = rect;
        monitor
    }

    /// Make `monitor` the active one: restore the cursor of the workspace
    /// it shows and warp the pointer there.
    fn enter_monitor(&mut self, monitor: usize) {
        let slot = self.layout.monitors[monitor].current_workspace;
        debug!("switching to monitor {}", monitor);
        self.nav = NavigationContext::at(slot, self.layout.workspaces[slot].cursor);
        match self.active_container().focused {
            Some(window) => request("warp pointer", self.backend.warp_pointer_to_window(window)),
            None => {
                let (x, y) = self.layout.monitors[monitor].rect.center();
                request("warp pointer", self.backend.warp_pointer(x, y));
            }
        }
    }
}
