//! Runtime audit report.
//!
//! A JSON snapshot of a booted application: identity, load order, handler
//! counts, and metrics. Exposed through the CLI and intended for health
//! tooling, not as a stable machine contract.

use serde_json::{Value, json};
use thiserror::Error;

use crate::app::Application;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit reporting is disabled")]
    Disabled,
}

/// Build the audit report for a booted application.
pub fn inspect(app: &Application) -> Result<Value, AuditError> {
    if !app.config().audit.enabled {
        return Err(AuditError::Disabled);
    }

    let snapshot = app.metrics().snapshot();
    let pages: Vec<Value> = app
        .admin()
        .list_pages()
        .into_iter()
        .map(|page| {
            json!({
                "category": page.category,
                "name": page.name,
                "title": page.title,
                "url": page.url,
            })
        })
        .collect();

    Ok(json!({
        "application": {
            "name": app.config().app.name,
            "version": env!("CARGO_PKG_VERSION"),
            "environment": app.config().app.environment,
            "timezone": app.config().app.timezone,
            "status": app.status().as_str(),
        },
        "load_order": app.load_order(),
        "handlers": {
            "hashing": app.hashing().len(),
            "token": app.token().len(),
            "validator": app.validator().len(),
            "admin_pages": app.admin().len(),
        },
        "admin_pages": pages,
        "metrics": {
            "units_loaded": snapshot.units_loaded,
            "handlers_registered": snapshot.handlers_registered,
            "tokens_issued": snapshot.tokens_issued,
            "validations_failed": snapshot.validations_failed,
        },
        "generated_at": app.datetime().now().to_rfc3339(),
    }))
}
