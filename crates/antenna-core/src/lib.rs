//! Antenna-array composition and RF engineering calculations.
//!
//! The crate turns a raw element pattern plus array geometry into composite
//! horizontal and vertical patterns, an ERP table, figures of merit and the
//! `.PAT` / `.PRN` export encodings. The [`rf`] and [`cable`] modules are
//! independent calculators used by the feeder-loss computation and by the
//! command-line calculator surface.
//!
//! Everything here is synchronous and stateless: each call takes immutable
//! inputs and returns freshly allocated outputs.

pub mod cable;
pub mod composer;
pub mod config;
pub mod error;
pub mod erp;
pub mod export;
pub mod metrics;
pub mod pattern;
pub mod rf;
pub mod units;

pub use cable::{feeder_loss_db, CableCurve, FeederSpec};
pub use composer::{compose_horizontal, compose_project, compose_vertical, ProjectComposition};
pub use config::{HorizontalArrayConfig, ProjectConfig, VerticalArrayConfig};
pub use erp::{compute_erp, ErpTable};
pub use error::{Result, RfError};
pub use pattern::{CompositePattern, ElementPattern, NormalizationMode, PatternKind, PatternSample};
