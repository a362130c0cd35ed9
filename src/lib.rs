//! Goods catalog service: project-scoped goods with priority ordering, a
//! look-aside cache in front of Postgres, and an asynchronous audit trail.

pub mod application;
pub mod audit;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
