//! Inkstone Content - blog-domain layer over the Notion adapter
//!
//! Turns database query results into `Post` / `Project` / `Category` models
//! and serves them through a memoized, degrade-to-empty service.

pub mod extract;
pub mod model;
pub mod service;

pub use model::{Category, Post, Project, ProjectCategory};
pub use service::ContentService;
