//! Core traits that decouple gridwm from any specific window-system
//! transport or command transport.
//!
//! The [`Engine`](crate::engine::Engine) only depends on these
//! abstractions: it mutates its layout model and then asks a [`Backend`] to
//! make the screen match.

use crate::command::Request;
use crate::geometry::MonitorInfo;
use crate::layout::{Layout, WindowId};
use std::sync::mpsc;

/// Abstraction over the window-system transport.
///
/// Every call except [`monitors`](Backend::monitors) and
/// [`create_stack_window`](Backend::create_stack_window) is a
/// fire-and-forget request: the engine issues them in program order, does
/// not wait for them to take effect, and only logs failures.
/// Implementations must deliver them in the order they were issued.
pub trait Backend {
    /// The error type produced by this backend.
    type Error: std::error::Error + Send + 'static;

    /// Return the list of outputs, in discovery order.
    fn monitors(&self) -> Result<Vec<MonitorInfo>, Self::Error>;

    /// Redraw from the current model state.  Idempotent.
    fn render(&self, layout: &Layout) -> Result<(), Self::Error>;

    fn map_window(&self, window: WindowId) -> Result<(), Self::Error>;

    fn unmap_window(&self, window: WindowId) -> Result<(), Self::Error>;

    /// Give keyboard input focus to `window`.
    fn set_input_focus(&self, window: WindowId) -> Result<(), Self::Error>;

    /// Neutral focus: input follows the pointer over the root window.
    fn focus_pointer_root(&self) -> Result<(), Self::Error>;

    /// Move the pointer into `window`.
    fn warp_pointer_to_window(&self, window: WindowId) -> Result<(), Self::Error>;

    /// Move the pointer to absolute desktop coordinates.
    fn warp_pointer(&self, x: i32, y: i32) -> Result<(), Self::Error>;

    fn set_fullscreen(&self, window: WindowId, fullscreen: bool) -> Result<(), Self::Error>;

    /// Create the indicator window drawn above a stacked container.
    fn create_stack_window(&self) -> Result<WindowId, Self::Error>;

    fn destroy_stack_window(&self, window: WindowId) -> Result<(), Self::Error>;

    /// Launch an external program from a shell command line.
    fn spawn(&self, command_line: &str) -> Result<(), Self::Error>;
}

/// A source of [`Request`]s.
///
/// Implementations listen on some transport (a Unix socket or an
/// in-memory channel) and forward every request into the
/// provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received request must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Request`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error>;
}
