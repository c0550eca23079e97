//! Test doubles shared by the unit tests of every module.

use crate::config::WorkspaceConfig;
use crate::engine::Engine;
use crate::geometry::MonitorInfo;
use crate::layout::{Layout, NavigationContext, WindowId};
use crate::traits::Backend;
use std::cell::{Cell, RefCell};

/// One recorded backend request.  Renders are recorded without the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Render,
    Map(WindowId),
    Unmap(WindowId),
    Focus(WindowId),
    FocusRoot,
    WarpToWindow(WindowId),
    WarpTo(i32, i32),
    Fullscreen(WindowId, bool),
    CreateStack(WindowId),
    DestroyStack(WindowId),
    Spawn(String),
}

#[derive(Debug, thiserror::Error)]
#[error("recorder error")]
pub struct RecorderError;

/// A backend that records every call and never fails.
pub struct RecorderBackend {
    monitors: Vec<MonitorInfo>,
    calls: RefCell<Vec<Call>>,
    next_stack_window: Cell<u64>,
}

impl RecorderBackend {
    pub fn new(monitors: Vec<MonitorInfo>) -> Self {
        Self {
            monitors,
            calls: RefCell::new(Vec::new()),
            next_stack_window: Cell::new(0x1000),
        }
    }

    fn record(&self, call: Call) -> Result<(), RecorderError> {
        self.calls.borrow_mut().push(call);
        Ok(())
    }

    /// Drain and return the calls recorded so far.
    pub fn take(&self) -> Vec<Call> {
        self.calls.borrow_mut().drain(..).collect()
    }

    /// Drain the log and return only the windows that were given focus.
    pub fn take_focus(&self) -> Vec<WindowId> {
        self.take()
            .into_iter()
            .filter_map(|c| match c {
                Call::Focus(w) => Some(w),
                _ => None,
            })
            .collect()
    }
}

impl Backend for RecorderBackend {
    type Error = RecorderError;

    fn monitors(&self) -> Result<Vec<MonitorInfo>, RecorderError> {
        Ok(self.monitors.clone())
    }

    fn render(&self, _layout: &Layout) -> Result<(), RecorderError> {
        self.record(Call::Render)
    }

    fn map_window(&self, window: WindowId) -> Result<(), RecorderError> {
        self.record(Call::Map(window))
    }

    fn unmap_window(&self, window: WindowId) -> Result<(), RecorderError> {
        self.record(Call::Unmap(window))
    }

    fn set_input_focus(&self, window: WindowId) -> Result<(), RecorderError> {
        self.record(Call::Focus(window))
    }

    fn focus_pointer_root(&self) -> Result<(), RecorderError> {
        self.record(Call::FocusRoot)
    }

    fn warp_pointer_to_window(&self, window: WindowId) -> Result<(), RecorderError> {
        self.record(Call::WarpToWindow(window))
    }

    fn warp_pointer(&self, x: i32, y: i32) -> Result<(), RecorderError> {
        self.record(Call::WarpTo(x, y))
    }

    fn set_fullscreen(&self, window: WindowId, fullscreen: bool) -> Result<(), RecorderError> {
        self.record(Call::Fullscreen(window, fullscreen))
    }

    fn create_stack_window(&self) -> Result<WindowId, RecorderError> {
        let id = WindowId(self.next_stack_window.get());
        self.next_stack_window.set(id.0 + 1);
        self.record(Call::CreateStack(id))?;
        Ok(id)
    }

    fn destroy_stack_window(&self, window: WindowId) -> Result<(), RecorderError> {
        self.record(Call::DestroyStack(window))
    }

    fn spawn(&self, command_line: &str) -> Result<(), RecorderError> {
        self.record(Call::Spawn(command_line.to_string()))
    }
}

fn monitor(name: &str, x: i32, y: i32) -> MonitorInfo {
    MonitorInfo {
        name: name.into(),
        x,
        y,
        width: 1920,
        height: 1080,
    }
}

pub fn single() -> Vec<MonitorInfo> {
    vec![monitor("DP-1", 0, 0)]
}

/// Two 1920×1080 outputs, left and right.
pub fn side_by_side() -> Vec<MonitorInfo> {
    vec![monitor("DP-1", 0, 0), monitor("DP-2", 1920, 0)]
}

/// Two 1920×1080 outputs, top and bottom.
pub fn stacked() -> Vec<MonitorInfo> {
    vec![monitor("DP-1", 0, 0), monitor("DP-2", 0, 1080)]
}

pub fn w(n: u64) -> WindowId {
    WindowId(n)
}

pub fn engine(monitors: Vec<MonitorInfo>) -> Engine<RecorderBackend> {
    let e = Engine::new(RecorderBackend::new(monitors), WorkspaceConfig::default())
        .expect("engine with monitors");
    e.backend().take();
    e
}

/// An engine whose first workspace is a `cols × rows` grid with the given
/// `(window, col, row)` placements, managed in order.  The cursor ends on
/// the last placement and the call log is empty.
pub fn grid_engine(
    monitors: Vec<MonitorInfo>,
    cols: usize,
    rows: usize,
    placements: &[(u64, usize, usize)],
) -> Engine<RecorderBackend> {
    let mut e = engine(monitors);
    let grid = &mut e.layout.workspaces[0].grid;
    for _ in 1..cols {
        grid.expand_columns();
    }
    for _ in 1..rows {
        grid.expand_rows();
    }
    for &(id, col, row) in placements {
        e.nav = NavigationContext::at(0, (col, row));
        e.manage(w(id), false);
    }
    e.render();
    e.backend().take();
    e
}
