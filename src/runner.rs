//! One complete entry run over a single browser session.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::auth::{AuthFlow, OtpPrompter};
use crate::browser::Driver;
use crate::config::SiteConfig;
use crate::credentials::Credentials;
use crate::form::EntryForm;
use crate::navigation::NavigationGuard;
use crate::pipeline::{RowPipeline, RunReport};
use crate::session::Session;

/// Log in, enter every row of `pipeline`, and close the browser.
///
/// The session is closed on every exit path; a close failure is logged and
/// never replaces the run's own error.
pub async fn run<D: Driver>(
    mut session: Session<D>,
    site: &SiteConfig,
    credentials: &Credentials,
    prompter: &dyn OtpPrompter,
    pipeline: &RowPipeline,
) -> Result<RunReport> {
    let outcome = drive(&mut session, site, credentials, prompter, pipeline).await;

    match session.close().await {
        Ok(()) => info!("Browser closed"),
        Err(err) => warn!(error = %err, "Failed to close browser"),
    }

    outcome
}

async fn drive<D: Driver>(
    session: &mut Session<D>,
    site: &SiteConfig,
    credentials: &Credentials,
    prompter: &dyn OtpPrompter,
    pipeline: &RowPipeline,
) -> Result<RunReport> {
    info!(
        input = %pipeline.path().display(),
        rows = pipeline.rows().len(),
        pending = pipeline.pending(),
        "Starting entry run"
    );

    let mut auth = AuthFlow::new(site);
    auth.login(session, credentials, prompter)
        .await
        .context("Login failed")?;

    let guard = NavigationGuard::new(site);
    session
        .driver()
        .goto(guard.entry_url())
        .await
        .context("Failed to open the entry page")?;
    guard.ensure_entry_page(session).await?;

    let form = EntryForm::new(site);
    let report = pipeline.run(session, &form).await?;

    info!(
        imported = report.imported,
        skipped = report.skipped.len(),
        "Entry run complete"
    );
    Ok(report)
}
