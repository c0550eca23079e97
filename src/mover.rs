//! Relocating the focused client.
//!
//! Vertical moves first reorder the client inside its own container; only
//! when it is already first/last does it leave for the neighbouring cell.
//! Moving past the right or bottom edge grows the grid.

use crate::command::Direction;
use crate::engine::{Engine, Outcome};
use crate::layout::{CellRef, Client, NavigationContext, WindowId};
use crate::traits::Backend;
use log::{debug, info};

impl<B: Backend> Engine<B> {
    /// Swap `window` with its predecessor/successor in the active
    /// container.  Returns `false` if it is already at that end.
    pub(crate) fn move_in_container(&mut self, window: WindowId, direction: Direction) -> bool {
        let at = self.nav.cell();
        if !self.layout.container_mut(at).swap_with_neighbour(window, direction) {
            return false;
        }
        debug!("moved {} {} inside its container", window, direction);
        self.render();
        true
    }

    /// Move the focused client of the active cell one step in `direction`.
    pub fn move_window(&mut self, direction: Direction) -> Outcome {
        let from = self.nav.cell();
        let Some(window) = self.active_container().focused else {
            debug!("move {}: no focused client", direction);
            return Outcome::Unchanged;
        };
        if self.layout.client(window).is_some_and(Client::is_dock) {
            debug!("move {}: {} is a dock", direction, window);
            return Outcome::Unchanged;
        }

        let (cols, rows) = self.active_workspace().grid.dimensions();
        let (col, row) = match direction {
            Direction::Left => {
                if from.col == 0 {
                    return Outcome::Unchanged;
                }
                (from.col - 1, from.row)
            }
            Direction::Right => {
                if from.col == cols - 1 {
                    self.layout.workspaces[from.workspace].grid.expand_columns();
                }
                (from.col + 1, from.row)
            }
            Direction::Up => {
                if self.move_in_container(window, Direction::Up) {
                    return Outcome::Applied;
                }
                if from.row == 0 {
                    return Outcome::Unchanged;
                }
                (from.col, from.row - 1)
            }
            Direction::Down => {
                if self.move_in_container(window, Direction::Down) {
                    return Outcome::Applied;
                }
                if from.row == rows - 1 {
                    self.layout.workspaces[from.workspace].grid.expand_rows();
                }
                (from.col, from.row + 1)
            }
        };

        let to = CellRef {
            workspace: from.workspace,
            col,
            row,
        };
        info!("moving {} to ({}, {})", window, col, row);
        self.nav = NavigationContext::at(from.workspace, (col, row));
        self.relocate(window, from, to);
        self.cleanup(from.workspace);
        self.render();
        self.set_focus(window);
        Outcome::Applied
    }
}
