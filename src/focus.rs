//! Moving the focus cursor.
//!
//! Vertical window-scoped focus first cycles through the clients of the
//! active container.  Everything else walks to the neighbouring grid cell,
//! and from the edge of the grid onto whatever monitor lies beyond it.

use crate::command::{Direction, Scope};
use crate::engine::{Engine, Outcome};
use crate::geometry::find_monitor_containing;
use crate::layout::{NavigationContext, WindowId};
use crate::traits::Backend;
use log::debug;

impl<B: Backend> Engine<B> {
    /// Move the focus one step in `direction`.
    ///
    /// Focus never lands on an empty cell: if the destination holds no
    /// focused client, nothing changes.
    pub fn focus(&mut self, direction: Direction, scope: Scope) -> Outcome {
        if direction.is_vertical() && scope == Scope::Window {
            if let Some(next) = self.cycle_in_container(direction) {
                self.set_focus(next);
                return Outcome::Applied;
            }
        }

        let Some(dest) = self.focus_destination(direction) else {
            return Outcome::Unchanged;
        };
        let target = self.layout.workspaces[dest.workspace]
            .grid
            .cell(dest.col, dest.row)
            .focused;
        match target {
            Some(window) => {
                self.set_focus(window);
                Outcome::Applied
            }
            None => {
                debug!("focus {}: cell ({}, {}) is empty", direction, dest.col, dest.row);
                Outcome::Unchanged
            }
        }
    }

    /// Next client of the active container in cycling order, docks
    /// excluded.
    fn cycle_in_container(&self, direction: Direction) -> Option<WindowId> {
        let clients = &self.layout.clients;
        self.active_container()
            .cycle(direction, |w| clients.get(&w).is_some_and(|c| c.dock))
    }

    /// The cell focus would move to: the grid neighbour if there is one,
    /// otherwise a cell on the monitor beyond the active container's edge.
    fn focus_destination(&self, direction: Direction) -> Option<NavigationContext> {
        let nav = self.nav;
        let grid = &self.active_workspace().grid;
        let neighbour = match direction {
            Direction::Left => nav.col.checked_sub(1).map(|c| (c, nav.row)),
            Direction::Right => Some((nav.col + 1, nav.row)),
            Direction::Up => nav.row.checked_sub(1).map(|r| (nav.col, r)),
            Direction::Down => Some((nav.col, nav.row + 1)),
        };
        if let Some((col, row)) = neighbour.filter(|&(c, r)| grid.cell_exists(c, r)) {
            return Some(NavigationContext::at(nav.workspace, (col, row)));
        }

        let rect = self.active_container().rect;
        let (x, y) = match direction {
            Direction::Up => (rect.x, rect.y - 1),
            Direction::Down => (rect.x, rect.bottom() + 1),
            Direction::Left => (rect.x - 1, rect.y),
            Direction::Right => (rect.right() + 1, rect.y),
        };
        let Some(monitor) = find_monitor_containing(self.layout.monitors.iter().map(|m| &m.rect), x, y)
        else {
            debug!("focus {}: no monitor at ({}, {})", direction, x, y);
            return None;
        };
        if monitor == self.active_monitor() {
            debug!("focus {}: already on monitor {}", direction, monitor);
            return None;
        }

        let slot = self.layout.monitors[monitor].current_workspace;
        let (cols, rows) = self.layout.workspaces[slot].grid.dimensions();
        let (col, row) = match direction {
            Direction::Up => (nav.col, rows - 1),
            Direction::Down => (nav.col, 0),
            Direction::Left => (cols - 1, nav.row),
            Direction::Right => (0, nav.row),
        };
        debug!("focus {}: crossing to monitor {}", direction, monitor);
        Some(NavigationContext::at(slot, (col.min(cols - 1), row.min(rows - 1))))
    }
}
