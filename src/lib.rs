//! # Tasks Calendar MCP - Google Tasks and Calendar tool server
//!
//! Exposes ten tools over the Model Context Protocol (stdio transport):
//! - Task lists and tasks: list, add, update (patch), delete
//! - Calendars and events: list, create, update (patch), delete
//!
//! ## Architecture
//!
//! Every tool call is validated, dispatched to exactly one remote operation
//! and wrapped in a uniform response envelope:
//! ```text
//!                    ┌──────────────────────────────────┐
//!   tools/call   →   │  ToolRuntime                     │
//!                    │  ┌─────────┐  ┌──────────┐       │
//!                    │  │ Catalog │→ │Validator │       │
//!                    │  └─────────┘  └────┬─────┘       │
//!                    │               ┌────▼─────┐       │   HTTPS
//!                    │               │Dispatcher│ ──────┼──────→ Google APIs
//!                    │               └────┬─────┘       │
//!                    │               ┌────▼─────┐       │
//!   envelope     ←   │               │ Envelope │       │
//!                    │               └──────────┘       │
//!                    └──────────────────────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod envelope;
pub mod google;
pub mod mcp;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, ErrorKind, Result};
