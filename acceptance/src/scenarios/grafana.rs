//! Grafana UI steps shared by the browser scenarios

use std::future::Future;
use std::panic::{resume_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::time::timeout;

use crate::config::AcceptanceConfig;
use crate::error::{FixtureError, FixtureResult};
use crate::fixture::{await_ok, ScenarioResult};
use crate::runtime::WebDriverSession;
use crate::traits::{Locator, UiDriver};

/// Elements are looked up for this long before a lookup reports nothing
pub const IMPLICIT_WAIT: Duration = Duration::from_secs(5);

/// Poll interval for page-level waits
pub const PAGE_POLL: Duration = Duration::from_millis(500);

pub const HOME_TITLE: &str = "Home - Grafana";
pub const DASHBOARD_HEADING: &str = ".dashboard-title > h1";

const LOGIN_BUTTON: &str = "css-6sxr68-button";

/// Open a browser session, run `steps` against it and always quit it
///
/// The steps get `config.scenario_timeout` to finish.
pub async fn with_browser<F, Fut>(config: &AcceptanceConfig, steps: F) -> ScenarioResult
where
    F: FnOnce(Arc<dyn UiDriver>) -> Fut,
    Fut: Future<Output = ScenarioResult>,
{
    let session = WebDriverSession::start(&config.remote_driver_url, IMPLICIT_WAIT).await?;
    run_with_driver(Arc::new(session), config.scenario_timeout, steps).await
}

/// Run `steps` with `driver`, quitting it afterwards even on failure, panic or timeout
pub async fn run_with_driver<F, Fut>(driver: Arc<dyn UiDriver>, limit: Duration, steps: F) -> ScenarioResult
where
    F: FnOnce(Arc<dyn UiDriver>) -> Fut,
    Fut: Future<Output = ScenarioResult>,
{
    let steps = AssertUnwindSafe(steps(driver.clone())).catch_unwind();
    let result = match timeout(limit, steps).await {
        Ok(result) => result,
        Err(_) => Ok(Err(format!("browser steps timed out after {limit:?}").into())),
    };

    if let Err(e) = driver.quit().await {
        tracing::warn!("⚠️ Browser session did not close cleanly: {}", e);
    }

    match result {
        Ok(result) => result,
        Err(panic) => resume_unwind(panic),
    }
}

/// Dashboard URL in the `/d/<uid>/<slug>` form
pub fn dashboard_url(grafana_url: &str, uid: &str, slug: &str) -> String {
    format!("{}/d/{uid}/{slug}?orgId=1", grafana_url.trim_end_matches('/'))
}

pub fn login_url(grafana_url: &str) -> String {
    format!("{}/login", grafana_url.trim_end_matches('/'))
}

/// Poll until the page title equals `expected`
pub async fn wait_for_title(driver: &dyn UiDriver, expected: &str, timeout: Duration) -> FixtureResult<()> {
    let outcome = await_ok(
        || async move { Ok::<_, FixtureError>(driver.current_title().await? == expected) },
        timeout,
        PAGE_POLL,
    )
    .await;

    if outcome.is_success() {
        return Ok(());
    }
    let actual = driver.current_title().await.unwrap_or_default();
    tracing::warn!("⏰ Title is '{}', expected '{}'", actual, expected);
    outcome.into_result(&format!("page title '{expected}'"))
}

/// Text of the first element matching `locator` must equal `expected`
pub async fn expect_text(driver: &dyn UiDriver, locator: &Locator, expected: &str) -> FixtureResult<()> {
    let texts = driver.find_texts(locator).await?;
    match texts.first() {
        Some(text) if text.trim() == expected => Ok(()),
        Some(text) => Err(FixtureError::assertion(format!("expected '{expected}', found '{text}'"))),
        None => Err(FixtureError::assertion(format!("'{expected}' is not on the page"))),
    }
}

/// Log in through the form and wait for the home screen
pub async fn login(driver: &dyn UiDriver, config: &AcceptanceConfig) -> FixtureResult<()> {
    tracing::info!("🔐 Logging into Grafana as {}", config.grafana_user);

    driver.navigate(&login_url(&config.grafana_url)).await?;
    driver.type_text(&Locator::Name("user".to_string()), &config.grafana_user).await?;
    driver
        .type_text(&Locator::Name("password".to_string()), &config.grafana_password)
        .await?;
    driver.click(&Locator::ClassName(LOGIN_BUTTON.to_string())).await?;

    wait_for_title(driver, HOME_TITLE, config.page_timeout).await
}
