//! coderank library: dependency graph construction, CodeRank and package
//! coupling metrics over a resolved source model.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
