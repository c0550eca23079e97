//! The per-workspace table of containers.
//!
//! A [`Grid`] is a `cols × rows` table in which every cell holds exactly one
//! [`Container`].  It starts at 1×1, grows one column or row at a time when a
//! window is moved past its right or bottom edge, and shrinks again by
//! dropping trailing columns/rows that have become completely empty.
//!
//! Cells are addressed by `(col, row)`.  Growth only appends and shrinking
//! only removes the trailing column/row, so the coordinates of every
//! surviving container stay valid across both.

use crate::command::Direction;
use crate::geometry::Rect;
use crate::layout::WindowId;
use serde::{Deserialize, Serialize};

/// How a container arranges its clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Clients share the cell, one below the other.
    #[default]
    Default,
    /// One client is visible at a time, with a stacking indicator window
    /// listing the others.
    Stack,
}

/// One grid cell: an ordered group of clients plus a focus pointer.
///
/// Insertion order is the visual and cycling order.  If the group is
/// non-empty, `focused` names one of its members; if it is empty, so is
/// `focused`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub(crate) col: usize,
    pub(crate) row: usize,
    pub(crate) colspan: usize,
    pub(crate) rowspan: usize,
    pub(crate) clients: Vec<WindowId>,
    pub(crate) focused: Option<WindowId>,
    pub(crate) mode: LayoutMode,
    pub(crate) stack_window: Option<WindowId>,
    pub(crate) rect: Rect,
}

impl Container {
    /// An empty 1×1 container at `(col, row)`.
    pub fn new(col: usize, row: usize) -> Self {
        Self {
            col,
            row,
            colspan: 1,
            rowspan: 1,
            clients: Vec::new(),
            focused: None,
            mode: LayoutMode::Default,
            stack_window: None,
            rect: Rect::default(),
        }
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn colspan(&self) -> usize {
        self.colspan
    }

    pub fn rowspan(&self) -> usize {
        self.rowspan
    }

    /// Clients in stacking order.
    pub fn clients(&self) -> &[WindowId] {
        &self.clients
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// The stacking-indicator window, present while in [`LayoutMode::Stack`].
    pub fn stack_window(&self) -> Option<WindowId> {
        self.stack_window
    }

    /// Pixel rectangle assigned by the last arrangement.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn position_of(&self, window: WindowId) -> Option<usize> {
        self.clients.iter().position(|&w| w == window)
    }

    /// Append `window` at the tail of the group.
    pub(crate) fn append(&mut self, window: WindowId) {
        self.clients.push(window);
    }

    /// Remove `window` from the group.
    ///
    /// If it was the focused client, focus passes to its successor, or to
    /// its predecessor when it was last, or to nobody when the group is now
    /// empty.  Returns `false` if the window was not in this container.
    pub(crate) fn remove(&mut self, window: WindowId) -> bool {
        let Some(idx) = self.position_of(window) else {
            return false;
        };
        let neighbour = self
            .clients
            .get(idx + 1)
            .or_else(|| idx.checked_sub(1).and_then(|i| self.clients.get(i)))
            .copied();
        self.clients.remove(idx);
        if self.focused == Some(window) {
            self.focused = neighbour;
        }
        true
    }

    /// Swap `window` with its predecessor (`Up`) or successor (`Down`).
    ///
    /// Ordering does not wrap: returns `false` when the window is already
    /// first/last, or for horizontal directions.
    pub(crate) fn swap_with_neighbour(&mut self, window: WindowId, direction: Direction) -> bool {
        let Some(idx) = self.position_of(window) else {
            return false;
        };
        let other = match direction {
            Direction::Up => match idx.checked_sub(1) {
                Some(i) => i,
                None => return false,
            },
            Direction::Down if idx + 1 < self.clients.len() => idx + 1,
            _ => return false,
        };
        self.clients.swap(idx, other);
        true
    }

    /// The client that in-container cycling would select next.
    ///
    /// Walks backwards (`Up`) or forwards (`Down`) from the focused client,
    /// wrapping around at either end and skipping clients for which `skip`
    /// returns `true`.  A lone eligible client selects itself.  Returns
    /// `None` for an empty container or horizontal directions.
    pub(crate) fn cycle(
        &self,
        direction: Direction,
        skip: impl Fn(WindowId) -> bool,
    ) -> Option<WindowId> {
        let idx = self.position_of(self.focused?)?;
        let len = self.clients.len();
        let step = match direction {
            Direction::Up => len - 1,
            Direction::Down => 1,
            _ => return None,
        };
        (1..=len)
            .map(|k| self.clients[(idx + k * step) % len])
            .find(|&w| !skip(w))
    }
}

/// A dynamic `cols × rows` table of containers, stored column-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<Container>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// A 1×1 grid holding one empty container.
    pub fn new() -> Self {
        Self {
            cells: vec![vec![Container::new(0, 0)]],
        }
    }

    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    pub fn rows(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Grid dimensions as `(cols, rows)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols(), self.rows())
    }

    /// Whether `(col, row)` lies inside the current bounds.
    pub fn cell_exists(&self, col: usize, row: usize) -> bool {
        col < self.cols() && row < self.rows()
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&Container> {
        self.cells.get(col).and_then(|c| c.get(row))
    }

    pub fn get_mut(&mut self, col: usize, row: usize) -> Option<&mut Container> {
        self.cells.get_mut(col).and_then(|c| c.get_mut(row))
    }

    /// The container at `(col, row)`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is out of bounds.  Callers hold coordinates that
    /// the grid handed out, so this is a broken invariant, not bad input.
    pub fn cell(&self, col: usize, row: usize) -> &Container {
        &self.cells[col][row]
    }

    /// Mutable counterpart of [`cell`](Self::cell).
    pub fn cell_mut(&mut self, col: usize, row: usize) -> &mut Container {
        &mut self.cells[col][row]
    }

    /// Every container, column by column.
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.cells.iter().flatten()
    }

    pub(crate) fn containers_mut(&mut self) -> impl Iterator<Item = &mut Container> {
        self.cells.iter_mut().flatten()
    }

    /// Every client in the grid, column by column, in stacking order.
    pub fn windows(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.containers().flat_map(|c| c.clients.iter().copied())
    }

    /// Append one column of empty containers on the right.
    pub fn expand_columns(&mut self) {
        let col = self.cols();
        let column = (0..self.rows()).map(|row| Container::new(col, row)).collect();
        self.cells.push(column);
    }

    /// Append one row of empty containers at the bottom.
    pub fn expand_rows(&mut self) {
        let row = self.rows();
        for (col, column) in self.cells.iter_mut().enumerate() {
            column.push(Container::new(col, row));
        }
    }

    /// Drop trailing columns and rows that hold no clients.
    ///
    /// Works inwards from the right/bottom edge and stops at the first
    /// column/row that still has a client or that an occupied container's
    /// span reaches into.  Spans of empty containers do not hold a line;
    /// they are cut back to the new bounds.  The grid never shrinks below
    /// 1×1.
    pub fn cleanup(&mut self) -> Trimmed {
        let mut trimmed = Trimmed::default();
        loop {
            let mut changed = false;
            while self.cols() > 1 && self.column_removable(self.cols() - 1) {
                if let Some(column) = self.cells.pop() {
                    trimmed.collect(column);
                }
                trimmed.columns += 1;
                changed = true;
            }
            while self.rows() > 1 && self.row_removable(self.rows() - 1) {
                let dropped: Vec<Container> =
                    self.cells.iter_mut().filter_map(Vec::pop).collect();
                trimmed.collect(dropped);
                trimmed.rows += 1;
                changed = true;
            }
            if !changed {
                break;
            }
        }
        let (cols, rows) = self.dimensions();
        for c in self.containers_mut() {
            c.colspan = c.colspan.min(cols - c.col);
            c.rowspan = c.rowspan.min(rows - c.row);
        }
        trimmed
    }

    fn column_removable(&self, col: usize) -> bool {
        self.cells[col].iter().all(Container::is_empty)
            && !self
                .containers()
                .any(|c| !c.is_empty() && c.col < col && c.col + c.colspan > col)
    }

    fn row_removable(&self, row: usize) -> bool {
        self.cells.iter().all(|column| column[row].is_empty())
            && !self
                .containers()
                .any(|c| !c.is_empty() && c.row < row && c.row + c.rowspan > row)
    }
}

/// What a [`Grid::cleanup`] pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trimmed {
    pub columns: usize,
    pub rows: usize,
    /// Stacking indicators of the dropped containers.  Nothing in the model
    /// refers to them any more.
    pub stack_windows: Vec<WindowId>,
}

impl Trimmed {
    /// Removed `(columns, rows)`.
    pub fn lines(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    fn collect(&mut self, dropped: Vec<Container>) {
        self.stack_windows
            .extend(dropped.into_iter().filter_map(|c| c.stack_window));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(n: u64) -> WindowId {
        WindowId(n)
    }

    fn container_with(ids: &[u64]) -> Container {
        let mut c = Container::new(0, 0);
        for &id in ids {
            c.append(w(id));
        }
        c.focused = ids.first().map(|&id| w(id));
        c
    }

    #[test]
    fn new_grid_is_1x1() {
        let g = Grid::new();
        assert_eq!(g.dimensions(), (1, 1));
        assert!(g.cell_exists(0, 0));
        assert!(!g.cell_exists(1, 0));
        assert!(!g.cell_exists(0, 1));
        assert!(g.cell(0, 0).is_empty());
        assert_eq!(g.cell(0, 0).colspan(), 1);
    }

    #[test]
    fn expand_assigns_coordinates() {
        let mut g = Grid::new();
        g.expand_columns();
        g.expand_rows();
        assert_eq!(g.dimensions(), (2, 2));
        for col in 0..2 {
            for row in 0..2 {
                let c = g.cell(col, row);
                assert_eq!((c.col(), c.row()), (col, row));
                assert_eq!((c.colspan(), c.rowspan()), (1, 1));
            }
        }
    }

    #[test]
    fn cleanup_removes_all_trailing_empty_lines() {
        let mut g = Grid::new();
        g.expand_columns();
        g.expand_columns();
        g.expand_rows();
        g.cell_mut(0, 0).append(w(1));
        assert_eq!(g.cleanup().lines(), (2, 1));
        assert_eq!(g.dimensions(), (1, 1));
    }

    #[test]
    fn cleanup_stops_at_first_occupied_column() {
        let mut g = Grid::new();
        g.expand_columns();
        g.expand_columns();
        // column 1 is occupied, column 0 is empty but not trailing
        g.cell_mut(1, 0).append(w(1));
        assert_eq!(g.cleanup().lines(), (1, 0));
        assert_eq!(g.dimensions(), (2, 1));
        assert_eq!(g.cell(1, 0).clients(), &[w(1)]);
    }

    #[test]
    fn cleanup_never_goes_below_1x1() {
        let mut g = Grid::new();
        g.expand_columns();
        g.expand_rows();
        g.cleanup();
        assert_eq!(g.dimensions(), (1, 1));
    }

    #[test]
    fn cleanup_keeps_row_with_client() {
        let mut g = Grid::new();
        g.expand_rows();
        g.expand_rows();
        g.cell_mut(0, 2).append(w(9));
        assert_eq!(g.cleanup().lines(), (0, 0));
        assert_eq!(g.dimensions(), (1, 3));
    }

    #[test]
    fn cleanup_keeps_column_covered_by_a_span() {
        let mut g = Grid::new();
        g.expand_columns();
        g.cell_mut(0, 0).append(w(1));
        g.cell_mut(0, 0).colspan = 2;
        assert_eq!(g.cleanup().lines(), (0, 0));
        assert_eq!(g.cols(), 2);
    }

    #[test]
    fn cleanup_ignores_spans_of_empty_containers() {
        let mut g = Grid::new();
        g.expand_columns();
        g.expand_rows();
        g.cell_mut(0, 0).colspan = 2;
        g.cell_mut(0, 0).rowspan = 2;
        assert_eq!(g.cleanup().lines(), (1, 1));
        assert_eq!(g.dimensions(), (1, 1));
        assert_eq!((g.cell(0, 0).colspan(), g.cell(0, 0).rowspan()), (1, 1));
    }

    #[test]
    fn cleanup_hands_back_dropped_stack_windows() {
        let mut g = Grid::new();
        g.expand_columns();
        g.expand_rows();
        g.cell_mut(0, 0).append(w(1));
        g.cell_mut(1, 0).stack_window = Some(w(0x1000));
        g.cell_mut(0, 1).stack_window = Some(w(0x1001));
        let trimmed = g.cleanup();
        assert_eq!(trimmed.lines(), (1, 1));
        assert_eq!(trimmed.stack_windows, vec![w(0x1000), w(0x1001)]);
    }

    #[test]
    fn remove_hands_focus_to_successor_then_predecessor() {
        let mut c = container_with(&[1, 2, 3]);
        c.focused = Some(w(2));
        assert!(c.remove(w(2)));
        assert_eq!(c.focused(), Some(w(3)));
        assert!(c.remove(w(3)));
        assert_eq!(c.focused(), Some(w(1)));
        assert!(c.remove(w(1)));
        assert_eq!(c.focused(), None);
        assert!(!c.remove(w(1)));
    }

    #[test]
    fn remove_of_unfocused_client_keeps_focus() {
        let mut c = container_with(&[1, 2, 3]);
        assert!(c.remove(w(3)));
        assert_eq!(c.focused(), Some(w(1)));
    }

    #[test]
    fn swap_stops_at_the_ends() {
        let mut c = container_with(&[1, 2, 3]);
        assert!(!c.swap_with_neighbour(w(1), Direction::Up));
        assert!(c.swap_with_neighbour(w(1), Direction::Down));
        assert_eq!(c.clients(), &[w(2), w(1), w(3)]);
        assert!(c.swap_with_neighbour(w(1), Direction::Down));
        assert!(!c.swap_with_neighbour(w(1), Direction::Down));
        assert!(!c.swap_with_neighbour(w(1), Direction::Left));
        assert_eq!(c.clients(), &[w(2), w(3), w(1)]);
    }

    #[test]
    fn cycle_wraps_in_both_directions() {
        let c = container_with(&[1, 2, 3]);
        assert_eq!(c.cycle(Direction::Down, |_| false), Some(w(2)));
        assert_eq!(c.cycle(Direction::Up, |_| false), Some(w(3)));
        assert_eq!(c.cycle(Direction::Left, |_| false), None);
    }

    #[test]
    fn cycle_skips_and_falls_back_to_self() {
        let c = container_with(&[1, 2, 3]);
        assert_eq!(c.cycle(Direction::Down, |x| x == w(2)), Some(w(3)));
        assert_eq!(c.cycle(Direction::Down, |x| x != w(1)), Some(w(1)));
        let lone = container_with(&[5]);
        assert_eq!(lone.cycle(Direction::Up, |_| false), Some(w(5)));
        assert_eq!(Container::new(0, 0).cycle(Direction::Up, |_| false), None);
    }
}
