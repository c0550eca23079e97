//! Growing a container's span into neighbouring empty cells.
//!
//! Only right and down are primitive.  Snapping left or up moves the
//! focused client one cell in that direction and then snaps the container
//! it landed in right or down.

use crate::command::Direction;
use crate::engine::{Engine, Outcome};
use crate::grid::Grid;
use crate::traits::Backend;
use log::{debug, info};

impl Grid {
    /// Grow the container at `(col, row)` by one column.
    ///
    /// Every cell the wider span would claim must exist and hold no
    /// focused client.  Containers above, in the claimed column, whose row
    /// span reaches down into this container's row are trimmed back to end
    /// just above it.  Returns `false` and changes nothing otherwise.
    pub(crate) fn snap_right(&mut self, col: usize, row: usize) -> bool {
        let c = self.cell(col, row);
        let target = col + c.colspan;
        if !(row..row + c.rowspan)
            .all(|r| self.get(target, r).is_some_and(|n| n.focused.is_none()))
        {
            return false;
        }
        for i in 0..row {
            let above = self.cell_mut(target, i);
            while above.rowspan > row - i {
                above.rowspan -= 1;
            }
        }
        self.cell_mut(col, row).colspan += 1;
        true
    }

    /// Transposed [`snap_right`](Self::snap_right): grow by one row,
    /// trimming column spans of containers to the left in the claimed row.
    pub(crate) fn snap_down(&mut self, col: usize, row: usize) -> bool {
        let c = self.cell(col, row);
        let target = row + c.rowspan;
        if !(col..col + c.colspan)
            .all(|k| self.get(k, target).is_some_and(|n| n.focused.is_none()))
        {
            return false;
        }
        for i in 0..col {
            let left = self.cell_mut(i, target);
            while left.colspan > col - i {
                left.colspan -= 1;
            }
        }
        self.cell_mut(col, row).rowspan += 1;
        true
    }
}

impl<B: Backend> Engine<B> {
    /// Snap the active container one step in `direction`.
    pub fn snap(&mut self, direction: Direction) -> Outcome {
        match direction {
            Direction::Left => {
                self.move_window(Direction::Left);
                self.snap(Direction::Right)
            }
            Direction::Up => {
                self.move_window(Direction::Up);
                self.snap(Direction::Down)
            }
            Direction::Right | Direction::Down => {
                let nav = self.nav;
                let grid = &mut self.layout.workspaces[nav.workspace].grid;
                let grown = if direction == Direction::Right {
                    grid.snap_right(nav.col, nav.row)
                } else {
                    grid.snap_down(nav.col, nav.row)
                };
                if !grown {
                    debug!("cannot snap {}: the cell is missing or in use", direction);
                    return Outcome::Unchanged;
                }
                info!("snapped ({}, {}) {}", nav.col, nav.row, direction);
                self.render();
                Outcome::Applied
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::WindowId;
    use crate::testing::{grid_engine, single, w};

    fn grid(cols: usize, rows: usize) -> Grid {
        let mut g = Grid::new();
        for _ in 1..cols {
            g.expand_columns();
        }
        for _ in 1..rows {
            g.expand_rows();
        }
        g
    }

    fn occupy(g: &mut Grid, col: usize, row: usize, id: u64) {
        let c = g.cell_mut(col, row);
        c.append(WindowId(id));
        c.focused = Some(WindowId(id));
    }

    #[test]
    fn snap_right_into_empty_cell() {
        let mut g = grid(2, 1);
        occupy(&mut g, 0, 0, 1);
        assert!(g.snap_right(0, 0));
        assert_eq!(g.cell(0, 0).colspan(), 2);
        // no further column
        assert!(!g.snap_right(0, 0));
        assert_eq!(g.cell(0, 0).colspan(), 2);
    }

    #[test]
    fn snap_right_refuses_occupied_neighbour() {
        let mut g = grid(2, 1);
        occupy(&mut g, 0, 0, 1);
        occupy(&mut g, 1, 0, 2);
        let before = g.clone();
        assert!(!g.snap_right(0, 0));
        assert_eq!(g, before);
    }

    #[test]
    fn snap_right_trims_spans_reaching_into_the_row() {
        // (1,0) spans three rows; (0,2) claims (1,2)
        let mut g = grid(2, 3);
        occupy(&mut g, 1, 0, 1);
        occupy(&mut g, 0, 2, 2);
        g.cell_mut(1, 0).rowspan = 3;
        g.cell_mut(1, 1).rowspan = 2;
        assert!(g.snap_right(0, 2));
        assert_eq!(g.cell(0, 2).colspan(), 2);
        assert_eq!(g.cell(1, 0).rowspan(), 2);
        assert_eq!(g.cell(1, 1).rowspan(), 1);
    }

    #[test]
    fn snap_down_trims_column_spans() {
        let mut g = grid(3, 2);
        occupy(&mut g, 2, 0, 1);
        g.cell_mut(0, 1).colspan = 3;
        assert!(g.snap_down(2, 0));
        assert_eq!(g.cell(2, 0).rowspan(), 2);
        assert_eq!(g.cell(0, 1).colspan(), 2);
    }

    #[test]
    fn snap_checks_every_cell_of_a_wide_span() {
        let mut g = grid(2, 2);
        occupy(&mut g, 0, 0, 1);
        occupy(&mut g, 1, 1, 2);
        g.cell_mut(0, 0).colspan = 2;
        // (0,1) is free but (1,1) under the span is not
        assert!(!g.snap_down(0, 0));
        assert_eq!(g.cell(0, 0).rowspan(), 1);
    }

    #[test]
    fn engine_snap_right_and_noop() {
        let mut e = grid_engine(single(), 2, 1, &[(2, 1, 0), (1, 0, 0)]);
        e.backend().take();
        assert_eq!(e.snap(Direction::Right), Outcome::Unchanged);
        assert!(e.backend().take().is_empty());

        let mut e = grid_engine(single(), 2, 1, &[(1, 0, 0)]);
        assert_eq!(e.snap(Direction::Right), Outcome::Applied);
        assert_eq!(e.active_container().colspan(), 2);
        assert_eq!(e.active_container().rect().width, 1920);
    }

    #[test]
    fn snap_left_moves_then_snaps_right() {
        let mut e = grid_engine(single(), 3, 1, &[(2, 2, 0), (1, 1, 0)]);
        assert_eq!(e.snap(Direction::Left), Outcome::Applied);
        assert_eq!((e.navigation().col, e.navigation().row), (0, 0));
        let grid = e.active_workspace().grid();
        assert_eq!(grid.cell(0, 0).clients(), &[w(1)]);
        assert_eq!(grid.cell(0, 0).colspan(), 2);
        assert!(grid.cell(1, 0).is_empty());
    }

    #[test]
    fn snap_up_moves_then_snaps_down() {
        let mut e = grid_engine(single(), 1, 3, &[(2, 0, 2), (1, 0, 1)]);
        assert_eq!(e.snap(Direction::Up), Outcome::Applied);
        assert_eq!(e.active_container().clients(), &[w(1)]);
        assert_eq!((e.navigation().col, e.navigation().row), (0, 0));
        assert_eq!(e.active_container().rowspan(), 2);
    }
}
