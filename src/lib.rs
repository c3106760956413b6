//! Core of a model-inspection dashboard for an IBM-style data/ML platform.
//!
//! The crate splits into a thin authenticated HTTP client (`platform`), an
//! explicit per-session context (`session`), a small typed table loaded
//! from CSV (`table`), pure chart-data builders (`viz`), and the prediction
//! form state machine (`form`). Presentation is out of scope: everything
//! here returns data and typed errors for some UI layer to render.

pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod platform;
pub mod session;
pub mod table;
pub mod viz;
