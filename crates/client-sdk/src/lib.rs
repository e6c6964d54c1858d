use std::sync::Arc;

use common::{
    HealOptions, HealStatus, LoginRequest, SiteReplicationInfo, SiteReplicationStatus,
    StatusQuery, TraceFilter, TraceMessage,
};
use console_core::{EntityLookup, LookupOutcome};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info};

mod dashboard;
mod error;
mod stream;

pub use dashboard::{DashboardError, LookedUp, Refreshed, ReplicationDashboard};
pub use error::ClientError;
pub use stream::{CloseReason, StreamHandler, Subscription};

pub type Result<T> = std::result::Result<T, ClientError>;

const SESSION_COOKIE: &str = "token";

#[derive(Clone)]
pub struct ConsoleClient {
    http: Client,
    server_base_url: String,
    session: Arc<RwLock<Option<String>>>,
}

impl ConsoleClient {
    pub fn new(server_base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_base_url: server_base_url.into().trim_end_matches('/').to_string(),
            session: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_session_token(self, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            session: Arc::new(RwLock::new((!token.is_empty()).then_some(token))),
            ..self
        }
    }

    pub fn server_base_url(&self) -> &str {
        &self.server_base_url
    }

    pub async fn session_token(&self) -> Option<String> {
        self.session.read().await.clone()
    }

    /// Exchanges credentials for a session cookie and keeps it for later calls.
    pub async fn login(&self, access_key: &str, secret_key: &str) -> Result<String> {
        let url = format!("{}/api/v1/login", self.server_base_url);
        let response = self
            .http
            .post(url)
            .json(&LoginRequest {
                access_key: access_key.to_string(),
                secret_key: secret_key.to_string(),
            })
            .send()
            .await?;
        let response = check_status(response).await?;

        let token = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(session_cookie_value)
            .ok_or_else(|| ClientError::Login("no session cookie in login response".into()))?;

        *self.session.write().await = Some(token.clone());
        info!(access_key, "logged in to console");
        Ok(token)
    }

    pub async fn site_replication_status(
        &self,
        query: &StatusQuery,
    ) -> Result<SiteReplicationStatus> {
        let url = format!(
            "{}/api/v1/admin/site-replication/status",
            self.server_base_url
        );
        debug!(?query, "fetching site replication status");
        self.get_json(self.http.get(url).query(query)).await
    }

    /// Aggregate counts for every entity kind.
    pub async fn replication_summary(&self) -> Result<SiteReplicationStatus> {
        self.site_replication_status(&StatusQuery::summary()).await
    }

    pub async fn lookup(&self, lookup: &EntityLookup) -> Result<LookupOutcome> {
        let status = self
            .site_replication_status(&StatusQuery::lookup(lookup.entity, &lookup.value))
            .await?;
        Ok(lookup.resolve(&status))
    }

    pub async fn site_replication_info(&self) -> Result<SiteReplicationInfo> {
        let url = format!("{}/api/v1/admin/site-replication", self.server_base_url);
        self.get_json(self.http.get(url)).await
    }

    /// Streams live API calls until the subscription is cancelled or the
    /// server closes. A text heartbeat keeps the socket open.
    pub async fn subscribe_trace<H>(&self, filter: &TraceFilter, handler: H) -> Result<Subscription>
    where
        H: StreamHandler<TraceMessage>,
    {
        let url = self.ws_url("/ws/trace", filter.query_pairs())?;
        let socket = stream::connect(url, self.session_token().await).await?;
        Ok(Subscription::spawn(
            socket,
            handler,
            stream::Handshake::Heartbeat(stream::HEARTBEAT_PERIOD),
        ))
    }

    pub async fn subscribe_heal<H>(&self, options: &HealOptions, handler: H) -> Result<Subscription>
    where
        H: StreamHandler<HealStatus>,
    {
        let url = self.ws_url(&format!("/ws/heal/{}", options.bucket), options.query_pairs())?;
        let socket = stream::connect(url, self.session_token().await).await?;
        Ok(Subscription::spawn(socket, handler, stream::Handshake::Greeting))
    }

    fn ws_url(&self, path: &str, pairs: Vec<(&'static str, String)>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.server_base_url, path))
            .map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| ClientError::InvalidUrl(format!("cannot use {scheme} for {url}")))?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let request = match self.session_token().await {
            Some(token) => request.header(COOKIE, format!("{SESSION_COOKIE}={token}")),
            None => request,
        };
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::from_response(status, &body))
}

fn session_cookie_value(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    let value = pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('=')?;
    (!value.is_empty()).then(|| value.to_string())
}
