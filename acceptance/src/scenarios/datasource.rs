//! Datasource checker scenario
//!
//! Creates the forwarding subscription and a seeded history, logs into
//! Grafana and waits until the checker dashboard shows the test entity in
//! both its current-data and historic-data tables. The fixture is torn down
//! whatever the outcome.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::grafana::{dashboard_url, expect_text, login, wait_for_title, with_browser};
use crate::config::AcceptanceConfig;
use crate::error::{FixtureError, FixtureResult};
use crate::fixture::{await_ok, FixtureBuilder, FixtureHandle, FixtureOrchestrator, FixtureReaper, ScenarioResult};
use crate::runtime::{FiwareApiClient, KeycloakTokenSource};
use crate::traits::{FixtureApi, Locator, UiDriver};

pub const DASHBOARD_TITLE: &str = "Orion datasource checker - Grafana";
pub const PANEL_TITLE: &str = "Timescale DB";

/// Time left to the browser scope to quit once its own steps time out
const BROWSER_QUIT_GRACE: Duration = Duration::from_secs(30);

const PANEL_HEADER: &str =
    "section.panel-container > div:nth-child(1) > header:nth-child(1) > div:nth-child(1) > h2:nth-child(1)";

/// Rows of the current-data table in grid position `position`
pub fn current_rows(position: usize) -> Locator {
    Locator::css(format!(".table-panel-table > tbody:nth-child({position}) > tr:nth-child(1)"))
}

/// First cell of each of those rows
pub fn current_first_cells(position: usize) -> Locator {
    Locator::css(format!(
        ".table-panel-table > tbody:nth-child({position}) > tr:nth-child(1) > td:nth-child(1)"
    ))
}

/// Elements mentioning `entity_id` inside the panel in grid position `position`
pub fn historic_mentions(position: usize, entity_id: &str) -> Locator {
    Locator::xpath(format!(
        "//*[{position}][self::div and contains(concat(' ', normalize-space(@class), ' '), ' react-grid-item ')]\
         //*[contains(text(), '{entity_id}')]"
    ))
}

/// Broker client for setup and a direct one for teardown
///
/// Setup writes go through the access proxy with a Keycloak token when one is
/// configured. Teardown always talks to the broker itself.
pub fn fixture_clients(config: &AcceptanceConfig) -> FixtureResult<(Arc<dyn FixtureApi>, Arc<dyn FixtureApi>)> {
    let mut writer = FiwareApiClient::new(config.write_url(), &config.timeseries_url)?;
    if let Some(keycloak) = &config.keycloak {
        info!("🔑 Writing through the access proxy at {}", keycloak.pep_url);
        writer = writer.with_token_source(Arc::new(KeycloakTokenSource::new(keycloak.clone())?));
    }
    let cleaner = FiwareApiClient::new(&config.broker_url, &config.timeseries_url)?;
    Ok((Arc::new(writer), Arc::new(cleaner)))
}

/// Full lifecycle against the deployed stack
pub async fn datasource(config: &AcceptanceConfig) -> ScenarioResult {
    info!("🧪 Datasource: current and historic data reach the dashboard");

    let (writer, cleaner) = fixture_clients(config)?;
    let orchestrator = FixtureOrchestrator::new(
        FixtureBuilder::new(writer),
        FixtureReaper::new(cleaner),
        config.fixture_plan(),
    )
    .with_body_timeout(config.scenario_timeout + BROWSER_QUIT_GRACE);

    let report = orchestrator
        .run(|handle| async move {
            with_browser(config, |driver| async move {
                verify_dashboard(driver.as_ref(), config, &handle).await?;
                ScenarioResult::Ok(())
            })
            .await
        })
        .await;

    let teardown = report.into_result()?;
    info!("✅ Datasource: PASSED ({})", teardown);
    Ok(())
}

/// Log in, open the checker dashboard and wait for the entity to show up
pub async fn verify_dashboard(
    driver: &dyn UiDriver,
    config: &AcceptanceConfig,
    handle: &FixtureHandle,
) -> FixtureResult<()> {
    login(driver, config).await?;

    let slug = &config.datasource_checker_dashboard;
    driver.navigate(&dashboard_url(&config.grafana_url, slug, slug)).await?;
    wait_for_title(driver, DASHBOARD_TITLE, config.page_timeout).await?;
    expect_text(driver, &Locator::css(PANEL_HEADER), PANEL_TITLE).await?;

    let entity_id = handle.entity_id();
    let outcome = await_ok(
        || async move { data_is_visible(driver, config, entity_id).await },
        config.wait_timeout,
        config.poll_interval,
    )
    .await;
    info!(
        "📊 Dashboard check for '{}' after {} attempts in {:?}",
        entity_id,
        outcome.attempts(),
        outcome.elapsed()
    );
    outcome.into_result(&format!("current and historic rows for '{entity_id}'"))
}

/// Current table lists the entity exactly once and the history has more than one row
pub async fn data_is_visible(driver: &dyn UiDriver, config: &AcceptanceConfig, entity_id: &str) -> FixtureResult<bool> {
    let rows = driver.find_texts(&current_rows(config.current_grid_position)).await?;
    if rows.len() != 1 {
        return Ok(false);
    }

    let first_cells = driver
        .find_texts(&current_first_cells(config.current_grid_position))
        .await?;
    if first_cells.first().map(|cell| cell.trim()) != Some(entity_id) {
        return Err(FixtureError::assertion(format!(
            "current table shows {first_cells:?}, expected '{entity_id}'"
        )));
    }

    let history = driver
        .find_texts(&historic_mentions(config.historic_grid_position, entity_id))
        .await?;
    Ok(history.len() > 1)
}
