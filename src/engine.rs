//! The command interpreter that ties the layout model and the backend
//! together.
//!
//! [`Engine`] owns the [`Layout`], the [`NavigationContext`] and a
//! [`Backend`].  It decodes one command at a time and runs it to completion
//! before the next is accepted; nothing in here is reentrant.  The
//! individual operations live next to their helpers:
//!
//! * [`focus`](crate::focus): moving the focus cursor,
//! * [`mover`](crate::mover): relocating clients,
//! * [`snap`](crate::snap): growing container spans,
//! * [`workspace`](crate::workspace): showing workspaces and sending
//!   clients to them.

use crate::command::{Action, Command};
use crate::config::{OutOfRangePolicy, WorkspaceConfig};
use crate::grid::{Container, LayoutMode};
use crate::layout::{CellRef, Client, InvariantViolation, Layout, NavigationContext, WindowId, Workspace};
use crate::traits::Backend;
use log::{debug, error, info, warn};
use std::fmt::Display;

/// Possible errors from the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The command line could not be decoded.  Nothing was changed.
    #[error(transparent)]
    Command(#[from] crate::command::CommandError),
    /// A direction sequence hit a character that is not `h`/`j`/`k`/`l`.
    /// Every direction before it has already been applied.
    #[error("unknown direction: {0:?}")]
    UnknownDirection(char),
    /// The workspace number is `0` or outside what the slot policy allows.
    #[error("no such workspace: {0}")]
    NoSuchWorkspace(usize),
    /// The backend reported no outputs at startup.
    #[error("no monitors available")]
    NoMonitors,
    /// The backend returned an error on a request the engine cannot do
    /// without.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Whether an operation changed anything.
///
/// Requests without a valid destination (no neighbouring cell, no monitor
/// in that direction, an occupied neighbour) are [`Unchanged`](Outcome::Unchanged),
/// never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Unchanged,
}

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// `restart` was requested: re-execute the running binary.
    Restart,
}

/// Log a failed fire-and-forget backend request and carry on.
pub(crate) fn request<E: Display>(what: &str, result: Result<(), E>) {
    if let Err(e) = result {
        warn!("{} failed: {}", what, e);
    }
}

/// Orchestrates layout mutations and backend requests.
///
/// The engine is generic over any [`Backend`], which keeps it independent
/// of the window system and lets tests record every side effect.
///
/// # Typical usage
///
/// ```ignore
/// let mut engine = Engine::new(backend, config.workspaces)?;
/// engine.manage(WindowId(0x400001), false);
/// engine.execute_str("ml")?;
/// ```
pub struct Engine<B: Backend> {
    pub(crate) backend: B,
    pub(crate) layout: Layout,
    pub(crate) nav: NavigationContext,
    pub(crate) workspaces: WorkspaceConfig,
}

impl<B: Backend> Engine<B> {
    /// Create an engine for the monitors `backend` reports.
    ///
    /// Monitor `i` starts out showing workspace number `i + 1`; the cursor
    /// starts in the top-left cell of the first one.
    pub fn new(backend: B, workspaces: WorkspaceConfig) -> Result<Self, EngineError> {
        let monitors = backend
            .monitors()
            .map_err(|e| EngineError::Backend(e.to_string()))?;
        if monitors.is_empty() {
            return Err(EngineError::NoMonitors);
        }
        info!("found {} monitor(s)", monitors.len());
        let layout = Layout::new(&monitors, workspaces.preallocated);
        let mut engine = Self {
            backend,
            layout,
            nav: NavigationContext::default(),
            workspaces,
        };
        engine.render();
        Ok(engine)
    }

    //  Accessors

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn navigation(&self) -> NavigationContext {
        self.nav
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The workspace the cursor is on.
    pub fn active_workspace(&self) -> &Workspace {
        &self.layout.workspaces[self.nav.workspace]
    }

    /// The container under the cursor.
    pub fn active_container(&self) -> &Container {
        self.active_workspace()
            .grid
            .cell(self.nav.col, self.nav.row)
    }

    /// Check every model invariant without aborting.
    pub fn check(&self) -> Result<(), InvariantViolation> {
        self.layout.check(&self.nav)
    }

    //  Command interpretation

    /// Decode and run one command line.
    pub fn execute_str(&mut self, line: &str) -> Result<Flow, EngineError> {
        info!("command {:?}", line);
        let cmd = Command::parse(line)?;
        self.execute(cmd)
    }

    /// Run one decoded command to completion.
    ///
    /// A directional command applies its directions one after another,
    /// each against the state the previous one left behind.  It is not a
    /// transaction: if a stray character ends the sequence, the directions
    /// before it stay applied and [`EngineError::UnknownDirection`] is
    /// returned.
    pub fn execute(&mut self, cmd: Command) -> Result<Flow, EngineError> {
        let result = match cmd {
            Command::Exec(command_line) => {
                info!("starting {:?}", command_line);
                request("spawn", self.backend.spawn(&command_line));
                Ok(Flow::Continue)
            }
            Command::Restart => {
                info!("restart requested");
                Ok(Flow::Restart)
            }
            Command::ToggleFullscreen => {
                self.toggle_fullscreen();
                Ok(Flow::Continue)
            }
            Command::SetMode(mode) => {
                self.set_layout_mode(mode);
                Ok(Flow::Continue)
            }
            Command::Show(num) => self.show(num).map(|_| Flow::Continue),
            Command::MoveToWorkspace(num) => {
                self.move_client_to_workspace(num).map(|_| Flow::Continue)
            }
            Command::Directional {
                action,
                scope,
                count,
                directions,
                stray,
            } => {
                if let Some(n) = count {
                    debug!("repeat count {} is not applied", n);
                }
                for direction in directions {
                    match action {
                        Action::Focus => self.focus(direction, scope),
                        Action::Move => self.move_window(direction),
                        Action::Snap => self.snap(direction),
                    };
                }
                match stray {
                    Some(c) => Err(EngineError::UnknownDirection(c)),
                    None => Ok(Flow::Continue),
                }
            }
        };
        self.enforce_invariants();
        result
    }

    /// Process one request from a [`CommandSource`](crate::traits::CommandSource).
    pub fn handle(&mut self, req: crate::command::Request) -> Result<Flow, EngineError> {
        use crate::command::Request;
        match req {
            Request::Command(line) => self.execute_str(&line),
            Request::Manage { window, dock } => {
                self.manage(window, dock);
                Ok(Flow::Continue)
            }
            Request::Unmanage(window) => {
                self.unmanage(window);
                Ok(Flow::Continue)
            }
        }
    }

    //  Client lifecycle

    /// Start managing `window`: it joins the tail of the active container
    /// and, unless it is a dock, takes the focus.
    pub fn manage(&mut self, window: WindowId, dock: bool) -> Outcome {
        if self.layout.clients.contains_key(&window) {
            debug!("{} is already managed", window);
            return Outcome::Unchanged;
        }
        let at = self.nav.cell();
        info!("managing {} at ({}, {})", window, at.col, at.row);
        self.layout.clients.insert(
            window,
            Client {
                window,
                dock,
                fullscreen: false,
                location: at,
            },
        );
        let container = self.layout.container_mut(at);
        container.append(window);
        if !dock || container.focused.is_none() {
            container.focused = Some(window);
        }
        request("map", self.backend.map_window(window));
        self.render();
        if !dock {
            self.set_focus(window);
        }
        self.enforce_invariants();
        Outcome::Applied
    }

    /// Forget `window`.  If it lived in the active cell, focus passes to
    /// whatever that cell focuses next.
    pub fn unmanage(&mut self, window: WindowId) -> Outcome {
        let Some(client) = self.layout.clients.remove(&window) else {
            debug!("{} is not managed", window);
            return Outcome::Unchanged;
        };
        let at = client.location;
        info!("unmanaging {}", window);
        let was_active = self.nav.cell() == at;
        self.layout.container_mut(at).remove(window);
        self.layout.workspaces[at.workspace].forget_focus(window);
        self.cleanup(at.workspace);
        self.render();
        if was_active {
            match self.active_container().focused {
                Some(next) => self.set_focus(next),
                None => request("focus root", self.backend.focus_pointer_root()),
            }
        }
        self.enforce_invariants();
        Outcome::Applied
    }

    //  Container-level commands

    /// Toggle fullscreen for the focused client of the active cell.
    pub fn toggle_fullscreen(&mut self) -> Outcome {
        let Some(window) = self.active_container().focused else {
            debug!("no focused client to make fullscreen");
            return Outcome::Unchanged;
        };
        let Some(client) = self.layout.clients.get_mut(&window) else {
            return Outcome::Unchanged;
        };
        client.fullscreen = !client.fullscreen;
        let on = client.fullscreen;
        info!("fullscreen {} for {}", if on { "on" } else { "off" }, window);
        request("set fullscreen", self.backend.set_fullscreen(window, on));
        self.render();
        Outcome::Applied
    }

    /// Switch the active container between default and stacking layout.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) -> Outcome {
        let at = self.nav.cell();
        if self.layout.container_mut(at).mode == mode {
            return Outcome::Unchanged;
        }
        info!("layout mode {:?} for ({}, {})", mode, at.col, at.row);
        match mode {
            LayoutMode::Stack => match self.backend.create_stack_window() {
                Ok(indicator) => {
                    self.layout.container_mut(at).stack_window = Some(indicator);
                    if self.layout.is_shown(at.workspace) {
                        request("map", self.backend.map_window(indicator));
                    }
                }
                Err(e) => warn!("could not create stack window: {}", e),
            },
            LayoutMode::Default => {
                if let Some(indicator) = self.layout.container_mut(at).stack_window.take() {
                    request("destroy stack window", self.backend.destroy_stack_window(indicator));
                }
            }
        }
        self.layout.container_mut(at).mode = mode;
        self.render();
        Outcome::Applied
    }

    //  Shared helpers

    /// Focus `window`: move the cursor to its cell, make it the cell's
    /// focused client and the head of its workspace's focus stack, and ask
    /// the backend for input focus.
    pub(crate) fn set_focus(&mut self, window: WindowId) {
        let Some(at) = self.layout.client(window).map(Client::location) else {
            warn!("cannot focus unmanaged window {}", window);
            return;
        };
        if at.workspace != self.nav.workspace {
            self.persist_cursor();
        }
        self.nav = NavigationContext {
            workspace: at.workspace,
            col: at.col,
            row: at.row,
        };
        self.layout.container_mut(at).focused = Some(window);
        self.layout.workspaces[at.workspace].push_focus(window);
        request("set input focus", self.backend.set_input_focus(window));
    }

    /// Arrange every bound workspace and ask the backend to redraw.
    pub(crate) fn render(&mut self) {
        for ws in &mut self.layout.workspaces {
            if ws.monitor.is_some() {
                ws.arrange();
            }
        }
        request("render", self.backend.render(&self.layout));
    }

    /// Take `window` out of the container at `from` and append it to the
    /// one at `to`, which focuses it.
    pub(crate) fn relocate(&mut self, window: WindowId, from: CellRef, to: CellRef) {
        self.layout.container_mut(from).remove(window);
        let dest = self.layout.container_mut(to);
        dest.append(window);
        dest.focused = Some(window);
        if let Some(client) = self.layout.clients.get_mut(&window) {
            client.location = to;
        }
    }

    /// Drop empty trailing columns/rows of workspace `slot` and pull any
    /// cursor on it back inside the grid.
    pub(crate) fn cleanup(&mut self, slot: usize) {
        let trimmed = self.layout.workspaces[slot].grid.cleanup();
        for indicator in trimmed.stack_windows.iter().copied() {
            request("destroy stack window", self.backend.destroy_stack_window(indicator));
        }
        let (cols, rows) = trimmed.lines();
        if cols == 0 && rows == 0 {
            return;
        }
        let ws = &mut self.layout.workspaces[slot];
        debug!(
            "workspace {}: removed {} column(s) and {} row(s)",
            ws.num, cols, rows
        );
        ws.clamp_cursor();
        if self.nav.workspace == slot {
            let (cols, rows) = ws.grid.dimensions();
            self.nav.col = self.nav.col.min(cols - 1);
            self.nav.row = self.nav.row.min(rows - 1);
        }
    }

    /// Store the cursor in the active workspace before leaving it.
    pub(crate) fn persist_cursor(&mut self) {
        let nav = self.nav;
        self.layout.workspaces[nav.workspace].cursor = (nav.col, nav.row);
    }

    /// Index of the monitor showing the active workspace.
    ///
    /// # Panics
    ///
    /// The active workspace is always bound; anything else is a broken
    /// invariant.
    pub(crate) fn active_monitor(&self) -> usize {
        match self.active_workspace().monitor {
            Some(m) => m,
            None => panic!(
                "active workspace {} is not bound to a monitor",
                self.active_workspace().num
            ),
        }
    }

    /// Translate a 1-based workspace number into a slot index, allocating
    /// slots if the policy allows it.
    pub(crate) fn workspace_slot(&mut self, num: usize) -> Result<usize, EngineError> {
        if num == 0 {
            return Err(EngineError::NoSuchWorkspace(0));
        }
        let slot = num - 1;
        let allocated = self.layout.workspaces.len();
        if slot < allocated {
            return Ok(slot);
        }
        match self.workspaces.out_of_range {
            OutOfRangePolicy::Grow if num <= self.workspaces.limit => {
                info!("allocating workspaces {}..={}", allocated + 1, num);
                self.layout
                    .workspaces
                    .extend((allocated + 1..=num).map(Workspace::new));
                Ok(slot)
            }
            _ => Err(EngineError::NoSuchWorkspace(num)),
        }
    }

    /// Abort on a broken model; continuing would act on garbage.
    fn enforce_invariants(&self) {
        if let Err(violation) = self.check() {
            error!("layout invariant violated: {}", violation);
            panic!("layout invariant violated: {violation}");
        }
    }
}
