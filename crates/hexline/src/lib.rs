//! # Hexline
//!
//! Line protocol for multiplayer hex board games.
//!
//! Each message is one text line: a numeric type id, then the message's
//! fields joined with two levels of separator. This crate ties the pieces
//! together:
//!
//! - [`hexline_protocol`]: field codec, message templates, registry,
//!   version gate, localization.
//! - [`hexline_catalog`]: the concrete message types.
//! - [`hexline_session`]: per-peer version, locale and login state.
//! - here: [`Connection`] over any `tokio` stream, [`HexlineConfig`],
//!   [`logging::init`], and [`HexlineError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hexline::prelude::*;
//!
//! # async fn run() -> Result<(), HexlineError> {
//! let config = HexlineConfig::load("hexline.json")?;
//! hexline::logging::init(&config.log_filter);
//!
//! let stream = tokio::net::TcpStream::connect("127.0.0.1:8880").await?;
//! let (read, write) = stream.into_split();
//! let strings = Arc::new(MemoryStrings::new(config.default_locale.clone()));
//! let mut conn = Connection::new(PeerId(1), read, write, Inbound::new(), config.outbound(strings));
//!
//! conn.announce(&config.announcement(Some("en_US".into()))?).await?;
//! while let Some(msg) = conn.recv().await? {
//!     println!("{msg}");
//! }
//! # Ok(())
//! # }
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod config;
mod connection;
mod error;
pub mod io;
pub mod logging;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use config::HexlineConfig;
pub use connection::Connection;
pub use error::HexlineError;

pub use hexline_catalog as catalog;
pub use hexline_protocol as protocol;
pub use hexline_session as session;

/// Everything most users need in one import.
pub mod prelude {
    pub use crate::io::{LineReader, LineWriter};
    pub use crate::{Connection, HexlineConfig, HexlineError};
    pub use hexline_catalog::{registry, GameMessage, VersionMsg};
    pub use hexline_protocol::{
        Capabilities, Localizable, MemoryStrings, Message, MessageType, StringTable, Version,
    };
    pub use hexline_session::{Inbound, Outbound, PeerDirectory, PeerId, PeerInfo};
}
