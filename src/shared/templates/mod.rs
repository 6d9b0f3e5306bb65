//! Page template management.
//!
//! ```ignore
//! use minijinja::context;
//!
//! let html = engine.render("index.html", context! { apartments => list })?;
//! ```

pub mod engine;

pub use engine::TemplateEngine;
