//! Implements the `Remote` trait with `reqwest` against the REST expense service.

use crate::api::{Remote, EXPENSES};
use crate::error::{FailureKind, IntoOutcome, Outcome};
use crate::model::{Expense, ExpenseId, ExpenseUpdates, NewExpense};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

/// Talks to a REST service that exposes the `expenses` collection under a base URL:
///
/// - `GET    {base}/expenses`
/// - `POST   {base}/expenses`
/// - `PATCH  {base}/expenses/{id}`
/// - `DELETE {base}/expenses/{id}`
pub(crate) struct HttpRemote {
    client: Client,
    collection: Url,
}

impl HttpRemote {
    pub(crate) fn new(base_url: &Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self {
            client,
            collection: collection_url(base_url)?,
        })
    }

    fn item_url(&self, id: &ExpenseId) -> Result<Url> {
        let mut url = self.collection.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("The URL '{}' cannot have path segments", self.collection))?
            .push(id.as_str());
        Ok(url)
    }

    async fn list_inner(&self) -> Result<Vec<Expense>> {
        let url = self.collection.clone();
        trace!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        decode(check(response, "GET", &url).await?, &url).await
    }

    async fn create_inner(&self, expense: &NewExpense) -> Result<Expense> {
        let url = self.collection.clone();
        trace!("POST {url}");
        let response = self
            .client
            .post(url.clone())
            .json(expense)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;
        decode(check(response, "POST", &url).await?, &url).await
    }

    async fn update_inner(&self, id: &ExpenseId, updates: &ExpenseUpdates) -> Result<Expense> {
        let url = self.item_url(id)?;
        trace!("PATCH {url}");
        let response = self
            .client
            .patch(url.clone())
            .json(updates)
            .send()
            .await
            .with_context(|| format!("PATCH {url} failed"))?;
        decode(check(response, "PATCH", &url).await?, &url).await
    }

    async fn delete_inner(&self, id: &ExpenseId) -> Result<()> {
        let url = self.item_url(id)?;
        trace!("DELETE {url}");
        let response = self
            .client
            .delete(url.clone())
            .send()
            .await
            .with_context(|| format!("DELETE {url} failed"))?;
        // The acknowledgement body, if any, carries nothing we need
        let _ = check(response, "DELETE", &url).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Remote for HttpRemote {
    async fn list(&mut self) -> Outcome<Vec<Expense>> {
        let expenses = self.list_inner().await.or_fail(FailureKind::Load)?;
        debug!("Fetched {} expenses", expenses.len());
        Ok(expenses)
    }

    async fn create(&mut self, expense: &NewExpense) -> Outcome<Expense> {
        self.create_inner(expense).await.or_fail(FailureKind::Create)
    }

    async fn update(&mut self, id: &ExpenseId, updates: &ExpenseUpdates) -> Outcome<Expense> {
        self.update_inner(id, updates)
            .await
            .or_fail(FailureKind::Update)
    }

    async fn delete(&mut self, id: &ExpenseId) -> Outcome<()> {
        self.delete_inner(id).await.or_fail(FailureKind::Delete)
    }
}

/// Builds `{base}/expenses`, tolerating a base URL with or without a trailing slash.
fn collection_url(base_url: &Url) -> Result<Url> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("The base URL '{base_url}' cannot have path segments"))?
        .pop_if_empty()
        .push(EXPENSES);
    Ok(url)
}

/// Turns a non-2xx response into an error that carries the status and body.
async fn check(response: Response, method: &str, url: &Url) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("{method} {url} failed with status {status}: {body}")
}

async fn decode<T>(response: Response, url: &Url) -> Result<T>
where
    T: DeserializeOwned,
{
    let body = response
        .text()
        .await
        .with_context(|| format!("Unable to read the response body from {url}"))?;
    serde_json::from_str(&body).with_context(|| format!("Unexpected response body from {url}"))
}
