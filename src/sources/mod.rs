//! Source adapters for fetching food-safety records from upstream providers.
//!
//! This module contains one submodule per external source. Each adapter
//! follows the same contract:
//!
//! 1. **Fetch**: pull raw data over HTTP within the requested date window
//! 2. **Normalize**: map it into [`crate::models::MediaItem`]s via the shared
//!    normalizer
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Food Safety News | [`fsn`] | RSS | Single feed, strict date filter |
//! | Food Safety Magazine | [`fsm`] | RSS | Parallel topic feeds |
//! | FDA | [`fda`] | REST API | openFDA food enforcement, 404 = empty |
//! | FSIS | [`fsis`] | HTML scrape | openFDA keyword fallback when scrape fails |
//! | CDC | [`cdc`] | Multi-strategy | Media API + listing pages + podcast feeds |
//!
//! # Common Patterns
//!
//! Each adapter exports `fetch(client, opts) -> Vec<MediaItem>` and **never**
//! errors out for operational failures: transport and parse problems are
//! logged through `tracing` and become an empty (or partial) list, so one
//! broken source degrades the aggregate instead of aborting it.

pub mod cdc;
pub mod fda;
pub mod fsis;
pub mod fsm;
pub mod fsn;
