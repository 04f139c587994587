//! # EmberKV
//!
//! A small single-node key-value server with:
//! - A text dialect of RESP on the wire
//! - PING, ECHO, GET and SET (NX/XX, GET, EX/PX/EXAT/PXAT/KEEPTTL)
//! - Lazy, clock-driven key expiry
//! - One thread per client connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │               (one thread per connection)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ lines in / reply bytes out
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Protocol Codec                             │
//! │        (request arrays → tokens, Reply → bytes)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Command Call + Validator                        │
//! │             (tokens → typed Command)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐
//!               │    Store     │
//!               │  (RwLock,    │
//!               │  lazy TTL)   │
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CommandError, EmberError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of EmberKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
