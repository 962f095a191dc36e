//! Headless Chrome implementation of [`RenderSession`] via chromiumoxide

use super::{ControlState, RenderSession};
use crate::error::{Error, Result};
use crate::types::TableData;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Poll interval while waiting for a content marker
const READY_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Deserialize)]
struct TableSnapshot {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// A headless Chrome session owning one browser and one page
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    nav_timeout: Duration,
}

impl ChromiumSession {
    /// Launch a headless Chrome instance and open a blank page
    pub async fn launch(nav_timeout: Duration) -> Result<Self> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--headless=new")
            .build()
            .map_err(Error::render)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::render(format!("failed to launch Chrome: {e}")))?;

        tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::render(e.to_string()))?;

        page.execute(
            chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams::new(
                USER_AGENT,
            ),
        )
        .await
        .map_err(|e| Error::render(e.to_string()))?;

        Ok(Self {
            browser,
            page,
            nav_timeout,
        })
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, js: &str) -> Result<T> {
        self.page
            .evaluate(js)
            .await
            .map_err(|e| Error::render(e.to_string()))?
            .into_value()
            .map_err(|e| Error::render(format!("unexpected evaluation result: {e}")))
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!(url, "navigating");
        let nav = tokio::time::timeout(self.nav_timeout, self.page.goto(url)).await;
        match nav {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(Error::navigation(e.to_string())),
            Err(_) => Err(Error::timeout(
                format!("navigation to {url}"),
                self.nav_timeout.as_millis() as u64,
            )),
        }
    }

    async fn wait_for_ready(&mut self, marker: &str, timeout: Duration) -> Result<()> {
        let selector = serde_json::to_string(marker)?;
        let probe = format!("document.querySelector({selector}) !== null");

        let wait = async {
            loop {
                if self.eval::<bool>(&probe).await.unwrap_or(false) {
                    return;
                }
                tokio::time::sleep(READY_POLL).await;
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| Error::timeout(format!("marker {marker}"), timeout.as_millis() as u64))
    }

    async fn read_table(&mut self) -> Result<Option<TableData>> {
        // Mirrors the listing's markup: headers from thead, th fallback,
        // body rows from tbody.
        let js = r"(() => {
            const table = document.querySelector('table');
            if (!table) return null;
            let headers = Array.from(table.querySelectorAll('thead th'))
                .map(th => th.innerText.trim());
            if (headers.length === 0) {
                headers = Array.from(table.querySelectorAll('th'))
                    .map(th => th.innerText.trim());
            }
            const rows = Array.from(table.querySelectorAll('tbody tr'))
                .map(row => Array.from(row.querySelectorAll('td'))
                    .map(td => td.innerText.trim()));
            return { headers, rows };
        })()";

        let snapshot: Option<TableSnapshot> = self.eval(js).await?;
        Ok(snapshot.map(|t| TableData::new(t.headers, t.rows)))
    }

    async fn find_control(&mut self, selector: &str) -> Result<ControlState> {
        let sel = serde_json::to_string(selector)?;
        let js = format!(
            "(() => {{
                const el = document.querySelector({sel});
                if (!el) return 'missing';
                const disabled = el.disabled
                    || el.classList.contains('disabled')
                    || (el.parentElement
                        && el.parentElement.classList.contains('disabled'));
                return disabled ? 'disabled' : 'enabled';
            }})()"
        );

        let state: String = self.eval(&js).await?;
        Ok(match state.as_str() {
            "enabled" => ControlState::Enabled,
            "disabled" => ControlState::Disabled,
            _ => ControlState::Missing,
        })
    }

    async fn read_text(&mut self, selector: &str) -> Result<Option<String>> {
        let sel = serde_json::to_string(selector)?;
        let js = format!(
            "(() => {{
                const el = document.querySelector({sel});
                return el ? el.innerText.trim() : null;
            }})()"
        );
        self.eval(&js).await
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| Error::render(format!("click target {selector}: {e}")))?;
        element
            .click()
            .await
            .map_err(|e| Error::render(e.to_string()))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| Error::render(e.to_string()))?;
        Ok(())
    }
}
