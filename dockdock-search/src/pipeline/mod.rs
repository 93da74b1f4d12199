//! The search-and-enrich pipeline.
//!
//! [`paginator::SearchPaginator`] walks upstream search pages and hands each
//! page to [`enricher::BoundedEnricher`], which checks every candidate for
//! its artifact under a concurrency ceiling. [`aggregator::assemble`] turns
//! the accumulated results into the final [`crate::SearchOutcome`].

pub mod aggregator;
pub mod enricher;
pub mod paginator;
