//! Terminal client for the symptom-sprint game.
//!
//! # Architecture
//!
//! ```text
//! main (composition root)
//!   ├─→ Runtime (session worker, provider, store)
//!   └─→ App (line input, snapshot rendering via SessionHandle only)
//! ```

pub mod app;
pub mod config;
pub mod input;
pub mod logging;
pub mod render;

pub use app::App;
pub use config::ClientConfig;
