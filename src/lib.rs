//! **gridwm**: the layout and navigation core of a tiling window manager.
//!
//! Every workspace is a dynamic `cols × rows` grid of containers, each
//! holding an ordered group of client windows.  A small command language
//! (`h`/`j`/`k`/`l` with optional `m`ove, `s`nap and `wc` container-scope
//! prefixes, workspace numbers, `f`, `s`, `d`, `exec`, `restart`) moves the
//! focus cursor through the grid and across monitors, relocates clients,
//! grows container spans and switches workspaces.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::Backend`]: the window-system transport: mapping, input
//!   focus, pointer warps and redraws, so the layout logic is not coupled
//!   to any specific display server.
//! * [`traits::CommandSource`]: abstracts the transport that delivers
//!   commands and client lifecycle events (a Unix socket, a key-binding
//!   daemon, …) so the main loop is not coupled to any specific IPC
//!   mechanism.
//!
//! [`engine::Engine`] owns the [`layout::Layout`] model and interprets
//! commands; its operations are spread over [`focus`], [`mover`], [`snap`]
//! and [`workspace`].  Concrete implementations live in [`backend`]
//! (headless logging transport) and [`ipc`] (Unix-socket listener).

pub mod backend;
pub mod command;
pub mod config;
pub mod engine;
pub mod focus;
pub mod geometry;
pub mod grid;
pub mod ipc;
pub mod layout;
pub mod mover;
pub mod snap;
pub mod traits;
pub mod workspace;

#[cfg(test)]
mod testing;
