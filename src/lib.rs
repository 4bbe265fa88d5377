//! # Turismo
//!
//! A read-only query service and dashboard toolkit for scraped Caribbean
//! tourism data.
//!
//! Two externally-owned document stores (a location-discovery scrape with
//! sites, reviewers, and tip documents; a mapping-service scrape with
//! rated sites) are exposed through a JSON API filtered by region
//! (`departamento`). A client side polls that API to print dashboard
//! aggregates and to assemble a multi-sheet spreadsheet export.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐
//! │ Scrape stores │──▶│ Query Service │──▶│ Presentation    │
//! │ (two SQLite)  │   │ (axum, read-  │   │ report / export │
//! │               │   │  only)        │   │ (reqwest)       │
//! └──────────────┘   └──────────────┘   └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export TURISMO_DB_ROOT=/var/data/turismo
//! turismo serve                        # start the query service
//! turismo report "Atlántico"           # print the dashboard aggregates
//! turismo export "Atlántico"           # write Datos_Completos_Atlántico.xlsx
//! turismo ping                         # liveness check against both stores
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Environment configuration |
//! | [`db`] | Store connections |
//! | [`models`] | Record types and curated projections |
//! | [`query`] | Region filtering and tip expansion |
//! | [`error`] | Typed API errors |
//! | [`server`] | Query Service HTTP server |
//! | [`client`] | Presentation-side HTTP client |
//! | [`aggregate`] | Chart-facing aggregates |
//! | [`report`] | Terminal dashboard rendering |
//! | [`xlsx`] | Spreadsheet writer |
//! | [`export`] | Multi-sheet export assembly |

pub mod aggregate;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod query;
pub mod report;
pub mod server;
pub mod xlsx;
