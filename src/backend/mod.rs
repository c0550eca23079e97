//! Concrete [`Backend`](crate::traits::Backend) implementations.
//!
//! The engine never talks to a window system directly; everything it wants
//! done on screen goes through one of these.

pub mod headless;
