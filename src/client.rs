use crate::config::ClientConfig;
use crate::errors::{StoreError, error_detail};
use crate::models::{
    ApiMessage, AuthToken, DailyTask, LeaveRecord, LeaveStatus, PresenceRecord, Task, TeamMember,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

// Matches encodeURIComponent: everything but unreserved characters is
// escaped, since natural keys are human-entered names.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, COMPONENT).to_string()
}

/// Typed wrapper over the remote task/team/daily/presence/leave API.
/// Holds no state beyond the connection pool, base URL and an optional
/// bearer token; every call is an independent request.
pub struct StoreClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl StoreClient {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send(&self, url: &str, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder
            .send()
            .await
            .map_err(|err| StoreError::from_reqwest(url, err))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Http {
            url: url.to_string(),
            status,
            detail: error_detail(&body, status),
        })
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, StoreError> {
        response
            .json()
            .await
            .map_err(|err| StoreError::from_reqwest(url, err))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let url = self.url(path);
        let response = self.send(&url, self.request(Method::GET, &url)).await?;
        Self::decode(&url, response).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), StoreError> {
        let url = self.url(path);
        self.send(&url, self.request(Method::POST, &url).json(body))
            .await?;
        Ok(())
    }

    async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), StoreError> {
        let url = self.url(path);
        self.send(&url, self.request(Method::PUT, &url).json(body))
            .await?;
        Ok(())
    }

    // Callers treat absence of the key as success, so a 404 is not an
    // error here.
    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let url = self.url(path);
        match self.send(&url, self.request(Method::DELETE, &url)).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => {
                debug!("{url} already absent");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.get_json("/tasks").await
    }

    pub async fn create_task(&self, task: &Task) -> Result<(), StoreError> {
        self.post_json("/tasks", task).await
    }

    pub async fn update_task(&self, taskname: &str, task: &Task) -> Result<(), StoreError> {
        self.put_json(&format!("/tasks/{}", encode(taskname)), task)
            .await
    }

    pub async fn delete_task(&self, taskname: &str) -> Result<(), StoreError> {
        self.delete(&format!("/tasks/{}", encode(taskname))).await
    }

    pub async fn list_daily(&self) -> Result<Vec<DailyTask>, StoreError> {
        self.get_json("/daily").await
    }

    pub async fn create_daily(&self, daily: &DailyTask) -> Result<(), StoreError> {
        self.post_json("/daily", daily).await
    }

    pub async fn update_daily(&self, name: &str, daily: &DailyTask) -> Result<(), StoreError> {
        self.put_json(&format!("/daily/{}", encode(name)), daily)
            .await
    }

    pub async fn delete_daily(&self, name: &str) -> Result<(), StoreError> {
        self.delete(&format!("/daily/{}", encode(name))).await
    }

    /// Both task collections, fetched concurrently, for a full board load.
    pub async fn fetch_board(&self) -> Result<(Vec<Task>, Vec<DailyTask>), StoreError> {
        let (tasks, daily) = tokio::join!(self.list_tasks(), self.list_daily());
        Ok((tasks?, daily?))
    }

    pub async fn list_members(&self) -> Result<Vec<TeamMember>, StoreError> {
        self.get_json("/teams").await
    }

    pub async fn create_member(&self, member: &TeamMember) -> Result<(), StoreError> {
        self.post_json("/teams", member).await
    }

    pub async fn update_member(&self, name: &str, member: &TeamMember) -> Result<(), StoreError> {
        self.put_json(&format!("/teams/{}", encode(name)), member)
            .await
    }

    pub async fn delete_member(&self, name: &str) -> Result<(), StoreError> {
        self.delete(&format!("/teams/{}", encode(name))).await
    }

    pub async fn list_presence(
        &self,
        member_name: &str,
        date: Option<&str>,
    ) -> Result<Vec<PresenceRecord>, StoreError> {
        let mut path = format!("/presence?member_name={}", encode(member_name));
        if let Some(date) = date {
            path.push_str("&date=");
            path.push_str(&encode(date));
        }
        self.get_json(&path).await
    }

    /// Single idempotent write keyed by `(member_name, date)` in the
    /// body; the store resolves whether the record exists.
    pub async fn upsert_presence(&self, record: &PresenceRecord) -> Result<(), StoreError> {
        self.put_json("/presence", record).await
    }

    pub async fn list_leaves(
        &self,
        member_name: Option<&str>,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRecord>, StoreError> {
        let mut params = Vec::new();
        if let Some(member_name) = member_name {
            params.push(format!("member_name={}", encode(member_name)));
        }
        if let Some(status) = status {
            params.push(format!("status={status}"));
        }
        let path = if params.is_empty() {
            "/leaves".to_string()
        } else {
            format!("/leaves?{}", params.join("&"))
        };
        self.get_json(&path).await
    }

    pub async fn create_leave(&self, leave: &LeaveRecord) -> Result<(), StoreError> {
        self.post_json("/leaves", leave).await
    }

    /// Form-encoded credential exchange; the returned token can be
    /// installed with [`StoreClient::with_token`] or
    /// [`StoreClient::set_token`].
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthToken, StoreError> {
        let url = self.url("/token");
        let builder = self
            .request(Method::POST, &url)
            .form(&[("username", username), ("password", password)]);
        let response = self.send(&url, builder).await?;
        Self::decode(&url, response).await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthToken, StoreError> {
        let url = self.url("/register");
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        let response = self.send(&url, self.request(Method::POST, &url).json(&body)).await?;
        Self::decode(&url, response).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String, StoreError> {
        let url = self.url("/forgot-password");
        let body = serde_json::json!({ "email": email });
        let response = self.send(&url, self.request(Method::POST, &url).json(&body)).await?;
        let message: ApiMessage = Self::decode(&url, response).await?;
        Ok(message.message)
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<String, StoreError> {
        let url = self.url("/reset-password");
        let body = serde_json::json!({ "token": token, "new_password": new_password });
        let response = self.send(&url, self.request(Method::POST, &url).json(&body)).await?;
        let message: ApiMessage = Self::decode(&url, response).await?;
        Ok(message.message)
    }
}
