//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, overlays, and the auth gate
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `views`: Screen-specific content rendering (home, dashboard, group)

pub mod input;
pub mod render;
pub mod styles;
pub mod views;
