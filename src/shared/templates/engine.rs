//! HTML page rendering using Jinja2 syntax.
//!
//! Page templates live in `templates/` at the crate root and are compiled
//! into the binary, so rendering does not depend on the working directory.

use axum::response::Html;
use minijinja::{Environment, Value};

use crate::core::error::Result;

/// `(name, source)` of every page template
const PAGES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../../templates/base.html")),
    ("index.html", include_str!("../../../templates/index.html")),
    ("dashboard.html", include_str!("../../../templates/dashboard.html")),
    ("all_reports.html", include_str!("../../../templates/all_reports.html")),
    ("report_step1.html", include_str!("../../../templates/report_step1.html")),
    ("report_step2.html", include_str!("../../../templates/report_step2.html")),
    ("report_step3.html", include_str!("../../../templates/report_step3.html")),
];

/// Shared, read-only template environment
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Build the environment and register every page template.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_filter("photo_src", photo_src);

        for &(name, source) in PAGES {
            env.add_template(name, source)?;
            tracing::debug!("Loaded template: {}", name);
        }

        Ok(Self { env })
    }

    /// Render a page with the given context.
    pub fn render(&self, template_name: &str, ctx: Value) -> Result<Html<String>> {
        let template = self.env.get_template(template_name)?;
        Ok(Html(template.render(ctx)?))
    }
}

/// Turn a stored photo reference into an `<img src>`: hosted URLs pass
/// through, bare filenames point at the local uploads route.
fn photo_src(reference: String) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        reference
    } else {
        format!("/static/uploads/{}", reference)
    }
}
