//! # Galley
//!
//! Build-time content aggregation and feed engine for a site whose posts live
//! behind a remote content API.
//!
//! ## Architecture
//!
//! ```text
//! ContentClient → PostRepository → AggregationEngine → index artifacts
//!                                                    ↘ FeedBuilder (terminal)
//! ```
//!
//! The client fetches the paginated, loosely-typed post feed; the repository
//! drains it into a complete in-memory corpus, absorbing backend failures
//! into empty results (fail-open); the aggregation pass derives the tag,
//! category, and archive indexes plus the priority ordering; and the final
//! build step serializes the ordered post list into an Atom artifact.
//! Everything is recomputed wholesale on each build — there is no
//! cross-build state.
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface and build orchestration
//! - [`client`]: HTTP access to the content service
//! - [`config`]: Site, API, and build configuration
//! - [`domain`]: The [`Post`](domain::Post) model and its ingestion
//!   normalization
//! - [`aggregate`]: Pure index builders and priority ordering
//! - [`repo`]: Pagination-aware retrieval with the fail-open policy
//! - [`feed`]: Atom feed generation

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod feed;
pub mod repo;
