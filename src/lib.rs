//! # cq: multi-metric static-quality analyzer
//!
//! `cq` scores a source tree across four dimensions — **duplication**,
//! **lint**, **type-correctness**, and **cognitive complexity** — and
//! reports **architecture-conformance** violations alongside a
//! **bootstrapped confidence interval** on the aggregate grade.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        Pipeline                            │
//! ├────────────────────────────────────────────────────────────┤
//! │  core::fs_enum   │  core::ast_service  │  detectors::*     │
//! │  (enumerate)     │  (parse once)       │  (per-file score) │
//! ├────────────────────────────────────────────────────────────┤
//! │  tools::{lint,typing}        │  core::scoring (aggregate)  │
//! ├────────────────────────────────────────────────────────────┤
//! │  io::report (validate + render)                            │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every numeric output is a deterministic function of `(sources, config,
//! bootstrap seed)` — parallelism is used only for independent per-file
//! work, never in a way that could leak ordering into the result.

#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub mod core {
    //! Core data model, configuration, AST services, and aggregation.

    pub mod ast_service;
    pub mod config;
    pub mod errors;
    pub mod fs_enum;
    pub mod model;
    pub mod pipeline;
    pub mod scoring;
}

pub mod detectors {
    //! Algorithmic analyzers: duplication, complexity, architecture.

    pub mod architecture;
    pub mod complexity;
    pub mod duplication;
}

pub mod tools {
    //! Adapters to unreliable external collaborators (lint, type checker).

    pub mod lint;
    pub mod typing;
}

pub mod io {
    //! Report model, schema validation, and JSON/Markdown rendering.

    pub mod json_report;
    pub mod markdown_report;
    pub mod report;
    pub mod schema;
}

pub use core::errors::{CqError, Result};
pub use core::model::{FileReport, ProjectReport, Report};
pub use core::pipeline::Pipeline;

/// Library version, forwarded from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
