//! Dashboard UI Tests
//!
//! Checks that need no fixture: Grafana is up, forwards anonymous users to
//! the login page and serves the air-quality dashboards.

use tracing::info;

use super::grafana::{dashboard_url, expect_text, login, login_url, wait_for_title, with_browser, DASHBOARD_HEADING};
use crate::config::AcceptanceConfig;
use crate::error::{FixtureError, FixtureResult};
use crate::fixture::ScenarioResult;
use crate::runtime::DashboardClient;
use crate::traits::{Locator, UiDriver};

pub const MONITOR_TITLE: &str = "Air Quality Data Monitor - Grafana";
pub const MONITOR_HEADING: &str = "AIR QUALITY DATA MONITOR";

const BACK_BUTTON: &str = ".back-container-icon";

/// Dashboard reached through a button on the data monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedDashboard {
    /// 1-based position of its button among the monitor's buttons
    pub button: usize,
    pub title: &'static str,
    pub heading: &'static str,
}

pub const LINKED_DASHBOARDS: [LinkedDashboard; 3] = [
    LinkedDashboard {
        button: 1,
        title: "Air Quality Index (ICA) - Grafana",
        heading: "AIR QUALITY INDEX (ICA)",
    },
    LinkedDashboard {
        button: 2,
        title: "Air Quality - Pollutants - Grafana",
        heading: "AIR QUALITY - POLLUTANTS",
    },
    LinkedDashboard {
        button: 3,
        title: "Air Quality - Particulate Matter - Grafana",
        heading: "AIR QUALITY - PARTICULATE MATTER",
    },
];

/// `n`-th navigation button on the monitor, counted in document order
pub fn monitor_button(n: usize) -> Locator {
    Locator::xpath(format!(
        "(//*[contains(concat(' ', normalize-space(@class), ' '), ' button-container ')])[{n}]"
    ))
}

/// Grafana answers 200 on its root URL
pub async fn deployed(config: &AcceptanceConfig) -> ScenarioResult {
    info!("🧪 Deployed: Grafana answers");

    let status = DashboardClient::new(&config.grafana_url)?.health_check().await?;
    if status != 200 {
        return Err(FixtureError::assertion(format!("Grafana returned status: {status}")).into());
    }

    info!("✅ Deployed: PASSED");
    Ok(())
}

/// Anonymous visitors land on the login page
pub async fn login_redirect(config: &AcceptanceConfig) -> ScenarioResult {
    info!("🧪 Login redirect: anonymous user is sent to the login page");

    with_browser(config, |driver| async move {
        check_login_redirect(driver.as_ref(), config).await?;
        ScenarioResult::Ok(())
    })
    .await?;

    info!("✅ Login redirect: PASSED");
    Ok(())
}

pub async fn check_login_redirect(driver: &dyn UiDriver, config: &AcceptanceConfig) -> FixtureResult<()> {
    driver.navigate(&config.grafana_url).await?;

    let expected = login_url(&config.grafana_url);
    let actual = driver.current_url().await?;
    if actual != expected {
        return Err(FixtureError::assertion(format!(
            "expected to be forwarded to {expected}, ended up on {actual}"
        )));
    }
    Ok(())
}

/// Walk from the data monitor to each linked dashboard and back
pub async fn air_quality(config: &AcceptanceConfig) -> ScenarioResult {
    info!("🧪 Air quality: dashboard navigation");

    with_browser(config, |driver| async move {
        login(driver.as_ref(), config).await?;
        navigate_air_quality(driver.as_ref(), config).await?;
        ScenarioResult::Ok(())
    })
    .await?;

    info!("✅ Air quality: PASSED");
    Ok(())
}

pub async fn navigate_air_quality(driver: &dyn UiDriver, config: &AcceptanceConfig) -> FixtureResult<()> {
    let heading = Locator::css(DASHBOARD_HEADING);

    driver
        .navigate(&dashboard_url(
            &config.grafana_url,
            &config.air_quality_home,
            &config.air_quality_dashboard,
        ))
        .await?;
    wait_for_title(driver, MONITOR_TITLE, config.page_timeout).await?;
    expect_text(driver, &heading, MONITOR_HEADING).await?;

    for linked in LINKED_DASHBOARDS {
        info!("🧭 Opening '{}'", linked.heading);
        driver.click(&monitor_button(linked.button)).await?;
        wait_for_title(driver, linked.title, config.page_timeout).await?;
        expect_text(driver, &heading, linked.heading).await?;

        driver.click(&Locator::css(BACK_BUTTON)).await?;
        wait_for_title(driver, MONITOR_TITLE, config.page_timeout).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockUiDriver;
    use assert_matches::assert_matches;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(grafana_url: &str) -> AcceptanceConfig {
        AcceptanceConfig::builder()
            .grafana_url(grafana_url)
            .page_timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_deployed_requires_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        assert!(deployed(&config(&server.uri())).await.is_err());
    }

    #[tokio::test]
    async fn test_login_redirect_compares_exact_url() {
        let config = config("http://grafana:3000");
        let mut driver = MockUiDriver::new();
        driver.expect_navigate().returning(|_| Ok(()));
        driver
            .expect_current_url()
            .returning(|| Ok("http://grafana:3000/login".to_string()));
        assert!(check_login_redirect(&driver, &config).await.is_ok());

        let mut driver = MockUiDriver::new();
        driver.expect_navigate().returning(|_| Ok(()));
        driver
            .expect_current_url()
            .returning(|| Ok("http://grafana:3000/?orgId=1".to_string()));
        assert_matches!(
            check_login_redirect(&driver, &config).await,
            Err(FixtureError::Assertion { .. })
        );
    }

    #[tokio::test]
    async fn test_navigation_visits_every_linked_dashboard() {
        let config = config("http://grafana:3000");
        let title = Arc::new(Mutex::new(String::new()));
        let mut driver = MockUiDriver::new();

        let current = title.clone();
        driver.expect_navigate().returning(move |_| {
            *current.lock().unwrap() = MONITOR_TITLE.to_string();
            Ok(())
        });
        let current = title.clone();
        driver.expect_click().times(6).returning(move |locator| {
            let next = LINKED_DASHBOARDS
                .iter()
                .find(|linked| monitor_button(linked.button) == *locator)
                .map_or(MONITOR_TITLE, |linked| linked.title);
            *current.lock().unwrap() = next.to_string();
            Ok(())
        });
        let current = title.clone();
        driver
            .expect_current_title()
            .returning(move || Ok(current.lock().unwrap().clone()));
        let current = title.clone();
        driver.expect_find_texts().returning(move |_| {
            let heading = LINKED_DASHBOARDS
                .iter()
                .find(|linked| *current.lock().unwrap() == linked.title)
                .map_or(MONITOR_HEADING, |linked| linked.heading);
            Ok(vec![heading.to_string()])
        });

        assert!(navigate_air_quality(&driver, &config).await.is_ok());
    }
}
