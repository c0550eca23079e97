//! The layout model: clients, workspaces, monitors and the navigation
//! cursor.
//!
//! [`Layout`] owns everything.  Clients live in a map keyed by their window
//! handle and point back at the cell that holds them through a [`CellRef`];
//! containers only store window handles.  Nothing here talks to the
//! transport: the [`Engine`](crate::engine::Engine) mutates the model and
//! then issues the side effects.

use crate::geometry::{MonitorInfo, Rect};
use crate::grid::Grid;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque transport handle of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Address of one grid cell: workspace slot plus `(col, row)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub workspace: usize,
    pub col: usize,
    pub row: usize,
}

/// One managed window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub(crate) window: WindowId,
    pub(crate) dock: bool,
    pub(crate) fullscreen: bool,
    pub(crate) location: CellRef,
}

impl Client {
    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Docked clients are skipped by focus cycling and never moved.
    pub fn is_dock(&self) -> bool {
        self.dock
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// The cell whose container holds this client.
    pub fn location(&self) -> CellRef {
        self.location
    }
}

/// A numbered grid, shown on at most one monitor at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub(crate) num: usize,
    pub(crate) grid: Grid,
    pub(crate) monitor: Option<usize>,
    pub(crate) cursor: (usize, usize),
    pub(crate) focus_stack: Vec<WindowId>,
    pub(crate) rect: Rect,
}

impl Workspace {
    /// An empty, unbound workspace with the given 1-based number.
    pub fn new(num: usize) -> Self {
        Self {
            num,
            grid: Grid::new(),
            monitor: None,
            cursor: (0, 0),
            focus_stack: Vec::new(),
            rect: Rect::default(),
        }
    }

    pub fn num(&self) -> usize {
        self.num
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Index of the monitor this workspace is bound to, if any.
    pub fn monitor(&self) -> Option<usize> {
        self.monitor
    }

    /// The `(col, row)` that was active when this workspace was last left.
    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Clients ordered by most recent focus, newest first.
    pub fn focus_stack(&self) -> &[WindowId] {
        &self.focus_stack
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Stacking-indicator windows of this workspace's containers.
    pub fn stack_windows(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.grid.containers().filter_map(|c| c.stack_window)
    }

    /// Move `window` to the head of the focus-recency stack.
    pub(crate) fn push_focus(&mut self, window: WindowId) {
        self.focus_stack.retain(|&w| w != window);
        self.focus_stack.insert(0, window);
    }

    pub(crate) fn forget_focus(&mut self, window: WindowId) {
        self.focus_stack.retain(|&w| w != window);
    }

    /// Pull the remembered cursor back inside the grid after it shrank.
    pub(crate) fn clamp_cursor(&mut self) {
        let (cols, rows) = self.grid.dimensions();
        self.cursor = (self.cursor.0.min(cols - 1), self.cursor.1.min(rows - 1));
    }

    /// Divide the workspace rectangle into equal column and row tracks and
    /// give every container the tracks its span covers.
    pub(crate) fn arrange(&mut self) {
        let (cols, rows) = self.grid.dimensions();
        let rect = self.rect;
        let edge = |origin: i32, extent: u32, index: usize, count: usize| -> i32 {
            origin + (extent as u64 * index as u64 / count as u64) as i32
        };
        for c in self.grid.containers_mut() {
            let x0 = edge(rect.x, rect.width, c.col, cols);
            let x1 = edge(rect.x, rect.width, (c.col + c.colspan).min(cols), cols);
            let y0 = edge(rect.y, rect.height, c.row, rows);
            let y1 = edge(rect.y, rect.height, (c.row + c.rowspan).min(rows), rows);
            c.rect = Rect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32);
        }
    }
}

/// A physical output and the workspace it currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub(crate) name: String,
    pub(crate) rect: Rect,
    pub(crate) current_workspace: usize,
}

impl Monitor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Slot index of the workspace shown on this monitor.
    pub fn current_workspace(&self) -> usize {
        self.current_workspace
    }
}

/// The active workspace slot and the active cell within it.
///
/// Every navigation, move, snap and show operation reads and updates this
/// cursor.  Whenever the active workspace changes, the outgoing value is
/// stored in that workspace's remembered cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationContext {
    pub workspace: usize,
    pub col: usize,
    pub row: usize,
}

impl NavigationContext {
    pub fn at(workspace: usize, (col, row): (usize, usize)) -> Self {
        Self {
            workspace,
            col,
            row,
        }
    }

    pub fn cell(&self) -> CellRef {
        CellRef {
            workspace: self.workspace,
            col: self.col,
            row: self.row,
        }
    }
}

/// A broken model invariant.
///
/// These are programming errors, never the result of user input.  The
/// engine aborts when it detects one; tests can inspect them through
/// [`Engine::check`](crate::engine::Engine::check).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("workspace {0} has an empty grid")]
    EmptyGrid(usize),
    #[error("container at ({col}, {row}) of workspace {workspace} records coordinates {recorded:?}")]
    MisplacedContainer {
        workspace: usize,
        col: usize,
        row: usize,
        recorded: (usize, usize),
    },
    #[error("container {0:?} has a span that is zero or leaves the grid")]
    BadSpan(CellRef),
    #[error("container {0:?} focus does not match its clients")]
    BadFocus(CellRef),
    #[error("client {0} is listed in {1:?} but records a different location")]
    ClientLocation(WindowId, CellRef),
    #[error("client {0} is listed in a container but not managed")]
    UnknownClient(WindowId),
    #[error("client {0} is managed but listed in {1} containers")]
    ClientCount(WindowId, usize),
    #[error("navigation cursor {0:?} is outside its grid")]
    CursorOutOfBounds(NavigationContext),
    #[error("active workspace {0} is not shown on any monitor")]
    ActiveNotShown(usize),
    #[error("monitor {0} shows workspace {1} which is bound elsewhere")]
    MonitorBinding(usize, usize),
}

/// All monitors, workspaces and clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub(crate) monitors: Vec<Monitor>,
    pub(crate) workspaces: Vec<Workspace>,
    pub(crate) clients: HashMap<WindowId, Client>,
}

impl Layout {
    /// Build the initial model: `workspaces` empty slots (at least one per
    /// monitor), with monitor `i` showing and bound to workspace slot `i`.
    pub fn new(monitors: &[MonitorInfo], workspaces: usize) -> Self {
        let count = workspaces.max(monitors.len());
        let mut slots: Vec<Workspace> = (1..=count).map(Workspace::new).collect();
        let monitors = monitors
            .iter()
            .enumerate()
            .map(|(idx, info)| {
                slots[idx].monitor = Some(idx);
                slots[idx].rect = info.rect();
                Monitor {
                    name: info.name.clone(),
                    rect: info.rect(),
                    current_workspace: idx,
                }
            })
            .collect();
        Self {
            monitors,
            workspaces: slots,
            clients: HashMap::new(),
        }
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    pub fn workspace(&self, slot: usize) -> &Workspace {
        &self.workspaces[slot]
    }

    pub fn client(&self, window: WindowId) -> Option<&Client> {
        self.clients.get(&window)
    }

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// Whether workspace `slot` is the one its monitor currently shows.
    pub fn is_shown(&self, slot: usize) -> bool {
        self.workspaces[slot]
            .monitor
            .is_some_and(|m| self.monitors[m].current_workspace == slot)
    }

    pub(crate) fn container_mut(&mut self, at: CellRef) -> &mut crate::grid::Container {
        self.workspaces[at.workspace].grid.cell_mut(at.col, at.row)
    }

    /// Verify every structural invariant of the model against `nav`.
    pub fn check(&self, nav: &NavigationContext) -> Result<(), InvariantViolation> {
        let mut listed: HashMap<WindowId, usize> = HashMap::new();
        for (slot, ws) in self.workspaces.iter().enumerate() {
            let (cols, rows) = ws.grid.dimensions();
            if cols == 0 || rows == 0 {
                return Err(InvariantViolation::EmptyGrid(slot));
            }
            for col in 0..cols {
                for row in 0..rows {
                    let at = CellRef {
                        workspace: slot,
                        col,
                        row,
                    };
                    let c = ws.grid.get(col, row).ok_or(InvariantViolation::EmptyGrid(slot))?;
                    if (c.col, c.row) != (col, row) {
                        return Err(InvariantViolation::MisplacedContainer {
                            workspace: slot,
                            col,
                            row,
                            recorded: (c.col, c.row),
                        });
                    }
                    if c.colspan == 0
                        || c.rowspan == 0
                        || col + c.colspan > cols
                        || row + c.rowspan > rows
                    {
                        return Err(InvariantViolation::BadSpan(at));
                    }
                    let focus_ok = match c.focused {
                        Some(w) => c.clients.contains(&w),
                        None => c.clients.is_empty(),
                    };
                    if !focus_ok {
                        return Err(InvariantViolation::BadFocus(at));
                    }
                    for &w in &c.clients {
                        let client = self
                            .clients
                            .get(&w)
                            .ok_or(InvariantViolation::UnknownClient(w))?;
                        if client.location != at {
                            return Err(InvariantViolation::ClientLocation(w, at));
                        }
                        *listed.entry(w).or_default() += 1;
                    }
                }
            }
        }
        for &w in self.clients.keys() {
            let n = listed.get(&w).copied().unwrap_or(0);
            if n != 1 {
                return Err(InvariantViolation::ClientCount(w, n));
            }
        }

        let active = self
            .workspaces
            .get(nav.workspace)
            .ok_or(InvariantViolation::CursorOutOfBounds(*nav))?;
        if !active.grid.cell_exists(nav.col, nav.row) {
            return Err(InvariantViolation::CursorOutOfBounds(*nav));
        }
        if !self.is_shown(nav.workspace) {
            return Err(InvariantViolation::ActiveNotShown(nav.workspace));
        }
        for (idx, m) in self.monitors.iter().enumerate() {
            if self.workspaces[m.current_workspace].monitor != Some(idx) {
                return Err(InvariantViolation::MonitorBinding(idx, m.current_workspace));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitors() -> Vec<MonitorInfo> {
        vec![
            MonitorInfo {
                name: "DP-1".into(),
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            },
            MonitorInfo {
                name: "HDMI-A-1".into(),
                x: 1920,
                y: 0,
                width: 1280,
                height: 1024,
            },
        ]
    }

    #[test]
    fn new_layout_binds_one_workspace_per_monitor() {
        let l = Layout::new(&monitors(), 10);
        assert_eq!(l.workspaces().len(), 10);
        assert_eq!(l.workspace(0).monitor(), Some(0));
        assert_eq!(l.workspace(1).monitor(), Some(1));
        assert_eq!(l.workspace(2).monitor(), None);
        assert_eq!(l.workspace(1).rect(), Rect::new(1920, 0, 1280, 1024));
        assert_eq!(l.workspace(3).num(), 4);
        assert!(l.is_shown(0) && l.is_shown(1) && !l.is_shown(2));
        assert_eq!(l.check(&NavigationContext::default()), Ok(()));
    }

    #[test]
    fn at_least_one_workspace_per_monitor() {
        let l = Layout::new(&monitors(), 1);
        assert_eq!(l.workspaces().len(), 2);
    }

    #[test]
    fn arrange_splits_tracks_and_honours_spans() {
        let mut ws = Workspace::new(1);
        ws.rect = Rect::new(100, 0, 900, 600);
        ws.grid.expand_columns();
        ws.grid.expand_columns();
        ws.grid.expand_rows();
        ws.grid.cell_mut(0, 0).colspan = 2;
        ws.arrange();
        assert_eq!(ws.grid.cell(0, 0).rect(), Rect::new(100, 0, 600, 300));
        assert_eq!(ws.grid.cell(2, 0).rect(), Rect::new(700, 0, 300, 300));
        assert_eq!(ws.grid.cell(1, 1).rect(), Rect::new(400, 300, 300, 300));
    }

    #[test]
    fn check_detects_dangling_focus() {
        let mut l = Layout::new(&monitors(), 2);
        l.workspaces[0].grid.cell_mut(0, 0).focused = Some(WindowId(1));
        assert!(matches!(
            l.check(&NavigationContext::default()),
            Err(InvariantViolation::BadFocus(_))
        ));
    }

    #[test]
    fn check_detects_cursor_outside_grid() {
        let l = Layout::new(&monitors(), 2);
        let nav = NavigationContext {
            workspace: 0,
            col: 1,
            row: 0,
        };
        assert_eq!(l.check(&nav), Err(InvariantViolation::CursorOutOfBounds(nav)));
    }

    #[test]
    fn check_detects_hidden_active_workspace() {
        let l = Layout::new(&monitors(), 4);
        let nav = NavigationContext::at(3, (0, 0));
        assert_eq!(l.check(&nav), Err(InvariantViolation::ActiveNotShown(3)));
    }

    #[test]
    fn push_focus_moves_to_head() {
        let mut ws = Workspace::new(1);
        ws.push_focus(WindowId(1));
        ws.push_focus(WindowId(2));
        ws.push_focus(WindowId(1));
        assert_eq!(ws.focus_stack(), &[WindowId(1), WindowId(2)]);
        ws.forget_focus(WindowId(1));
        assert_eq!(ws.focus_stack(), &[WindowId(2)]);
    }

    #[test]
    fn window_id_display_is_hex() {
        assert_eq!(WindowId(255).to_string(), "0xff");
    }
}
