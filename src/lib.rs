//! # Curio
//!
//! A minimal static site generator for curated catalogs of creative works.
//! Per-work YAML records are the data source: each record describes one work,
//! its sub-items (editions, variants), and where its assets come from. A
//! single run produces a deployable static site — no server, no database.
//!
//! # Architecture: Linear Build Pipeline
//!
//! Curio executes once, top to bottom:
//!
//! ```text
//! 1. Load      works/*.yaml + data/  →  ordered catalog (in memory)
//! 2. Resolve   catalog               →  download + translation work lists
//! 3. Assemble  everything            →  public/   (pages, assets, manuals)
//! ```
//!
//! Loading and resolution are pure data transformations, so the interesting
//! pipeline logic (cover deduplication, translation synthesis, link
//! backfilling) is unit-testable without touching the network or the
//! filesystem. All I/O — directory lifecycle, page writing, concurrent
//! fetches, archive extraction — is confined to the assemble stage.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Loads per-work records and shared data files, derives tag unions, sorts by declared order |
//! | [`resolve`] | Pure asset resolution: dedups cover downloads, synthesizes translation fetches, backfills links |
//! | [`render`] | Maud-rendered index and 404 pages |
//! | [`fetch`] | HTTP client plumbing and translation-table extraction from wiki markup |
//! | [`assemble`] | Orchestrates the full build: output tree, static copy, fan-out fetches, manual archives |
//! | [`config`] | Optional `config.toml`: remote hosts, concurrency bound, deployment mode |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system. Malformed markup is a build error, template variables
//! are Rust expressions, and all interpolation is auto-escaped. There is no
//! template directory to ship or get out of sync.
//!
//! ## Fail-Fast, No Partial-Success Bookkeeping
//!
//! Every error — a malformed record, a failed fetch, a bad archive — aborts
//! the run with a non-zero exit. There are no retries and no rollback; the
//! output directory is cheap to rebuild from scratch, so resilience
//! machinery would cost more than it saves.
//!
//! ## Bounded Fan-Out
//!
//! Asset downloads run through a semaphore-bounded task runner
//! ([`assemble::fetch_bounded`]) so the concurrency limit is a config value
//! rather than a structural artifact of list slicing. Translation fetches
//! are unbounded — the set is small and each one is a single text document.

pub mod assemble;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod render;
pub mod resolve;

#[cfg(test)]
pub(crate) mod test_helpers;
