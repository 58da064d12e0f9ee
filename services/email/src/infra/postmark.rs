use anyhow::Context as _;
use serde_json::{Value, json};

use crate::domain::repository::EmailProvider;
use crate::domain::types::{
    AccountToken, BouncePage, BounceQuery, MessageStream, NewServerSpec, OutboundMessage,
    PROVIDER_BATCH_LIMIT, ProviderReceipt, ProviderServer, ServerToken, StatsQuery,
    TemplateMessage,
};
use crate::error::EmailServiceError;

const SERVER_TOKEN_HEADER: &str = "X-Postmark-Server-Token";
const ACCOUNT_TOKEN_HEADER: &str = "X-Postmark-Account-Token";

/// Stateless Postmark HTTP client. Credentials are passed explicitly on
/// every call; the client itself only holds the connection pool and base
/// URL (overridable for tests).
///
/// Failure contract: non-2xx responses surface the provider's `ErrorCode`
/// and `Message` verbatim as `EmailServiceError::Provider`; transport
/// failures become `Internal`.
#[derive(Clone)]
pub struct PostmarkClient {
    http: reqwest::Client,
    base_url: String,
}

impl PostmarkClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, EmailServiceError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .context("provider request failed")?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            let code = body
                .get("ErrorCode")
                .and_then(Value::as_i64)
                .unwrap_or_else(|| i64::from(status.as_u16()));
            let message = body
                .get("Message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| status.to_string());
            return Err(EmailServiceError::Provider { code, message });
        }
        Ok(body)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn join_addresses(addresses: &[String]) -> String {
    addresses.join(",")
}

/// Postmark `/email` request body.
fn message_body(message: &OutboundMessage) -> Value {
    let mut body = json!({
        "From": message.from,
        "To": join_addresses(&message.to),
        "Subject": message.subject,
        "MessageStream": message.message_stream,
        "TrackOpens": message.track_opens,
        "TrackLinks": message.track_links.as_str(),
    });
    if let Some(html) = &message.html_body {
        body["HtmlBody"] = json!(html);
    }
    if let Some(text) = &message.text_body {
        body["TextBody"] = json!(text);
    }
    if !message.cc.is_empty() {
        body["Cc"] = json!(join_addresses(&message.cc));
    }
    if !message.bcc.is_empty() {
        body["Bcc"] = json!(join_addresses(&message.bcc));
    }
    if let Some(reply_to) = &message.reply_to {
        body["ReplyTo"] = json!(reply_to);
    }
    if let Some(tag) = &message.tag {
        body["Tag"] = json!(tag);
    }
    if let Some(metadata) = &message.metadata {
        body["Metadata"] = metadata.clone();
    }
    body
}

/// Postmark `/email/withTemplate` request body.
fn template_body(message: &TemplateMessage) -> Value {
    let mut body = json!({
        "From": message.from,
        "To": join_addresses(&message.to),
        "TemplateModel": message.template_model,
        "MessageStream": message.message_stream,
    });
    if let Some(id) = message.template_id {
        body["TemplateId"] = json!(id);
    }
    if let Some(alias) = &message.template_alias {
        body["TemplateAlias"] = json!(alias);
    }
    if let Some(reply_to) = &message.reply_to {
        body["ReplyTo"] = json!(reply_to);
    }
    if let Some(tag) = &message.tag {
        body["Tag"] = json!(tag);
    }
    if let Some(metadata) = &message.metadata {
        body["Metadata"] = metadata.clone();
    }
    body
}

fn bounce_query_params(query: &BounceQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(count) = query.count {
        params.push(("count", count.to_string()));
    }
    if let Some(offset) = query.offset {
        params.push(("offset", offset.to_string()));
    }
    if let Some(bounce_type) = &query.bounce_type {
        params.push(("type", bounce_type.clone()));
    }
    if let Some(inactive) = query.inactive {
        params.push(("inactive", inactive.to_string()));
    }
    if let Some(filter) = &query.email_filter {
        params.push(("emailFilter", filter.clone()));
    }
    if let Some(stream) = &query.message_stream {
        params.push(("messagestream", stream.clone()));
    }
    if let Some(from) = &query.from_date {
        params.push(("fromdate", from.clone()));
    }
    if let Some(to) = &query.to_date {
        params.push(("todate", to.clone()));
    }
    params
}

impl EmailProvider for PostmarkClient {
    async fn send_email(
        &self,
        token: &ServerToken,
        message: &OutboundMessage,
    ) -> Result<ProviderReceipt, EmailServiceError> {
        let body = self
            .execute(
                self.http
                    .post(self.url("/email"))
                    .header(SERVER_TOKEN_HEADER, token.as_str())
                    .json(&message_body(message)),
            )
            .await?;
        serde_json::from_value(body)
            .context("parse provider send response")
            .map_err(Into::into)
    }

    async fn send_batch(
        &self,
        token: &ServerToken,
        messages: &[OutboundMessage],
    ) -> Result<Vec<ProviderReceipt>, EmailServiceError> {
        if messages.len() > PROVIDER_BATCH_LIMIT {
            return Err(EmailServiceError::BatchTooLarge);
        }
        let batch: Vec<Value> = messages.iter().map(message_body).collect();
        let body = self
            .execute(
                self.http
                    .post(self.url("/email/batch"))
                    .header(SERVER_TOKEN_HEADER, token.as_str())
                    .json(&batch),
            )
            .await?;
        serde_json::from_value(body)
            .context("parse provider batch response")
            .map_err(Into::into)
    }

    async fn send_with_template(
        &self,
        token: &ServerToken,
        message: &TemplateMessage,
    ) -> Result<ProviderReceipt, EmailServiceError> {
        let body = self
            .execute(
                self.http
                    .post(self.url("/email/withTemplate"))
                    .header(SERVER_TOKEN_HEADER, token.as_str())
                    .json(&template_body(message)),
            )
            .await?;
        serde_json::from_value(body)
            .context("parse provider template response")
            .map_err(Into::into)
    }

    async fn get_bounces(
        &self,
        token: &ServerToken,
        query: &BounceQuery,
    ) -> Result<BouncePage, EmailServiceError> {
        let body = self
            .execute(
                self.http
                    .get(self.url("/bounces"))
                    .header(SERVER_TOKEN_HEADER, token.as_str())
                    .query(&bounce_query_params(query)),
            )
            .await?;
        serde_json::from_value(body)
            .context("parse provider bounces response")
            .map_err(Into::into)
    }

    async fn activate_bounce(
        &self,
        token: &ServerToken,
        bounce_id: i64,
    ) -> Result<(), EmailServiceError> {
        self.execute(
            self.http
                .put(self.url(&format!("/bounces/{bounce_id}/activate")))
                .header(SERVER_TOKEN_HEADER, token.as_str()),
        )
        .await?;
        Ok(())
    }

    async fn add_suppressions(
        &self,
        token: &ServerToken,
        stream_id: &str,
        emails: &[String],
    ) -> Result<(), EmailServiceError> {
        let suppressions: Vec<Value> = emails
            .iter()
            .map(|email| json!({ "EmailAddress": email }))
            .collect();
        self.execute(
            self.http
                .post(self.url(&format!("/message-streams/{stream_id}/suppressions")))
                .header(SERVER_TOKEN_HEADER, token.as_str())
                .json(&json!({ "Suppressions": suppressions })),
        )
        .await?;
        Ok(())
    }

    async fn remove_suppression(
        &self,
        token: &ServerToken,
        stream_id: &str,
        email: &str,
    ) -> Result<(), EmailServiceError> {
        // The provider only accepts per-address deletes; the address goes in
        // the path and must be percent-encoded.
        let mut url = reqwest::Url::parse(&self.url(&format!(
            "/message-streams/{stream_id}/suppressions"
        )))
        .context("parse provider suppression url")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("provider base url cannot carry path segments"))?
            .push(email);
        self.execute(
            self.http
                .delete(url)
                .header(SERVER_TOKEN_HEADER, token.as_str()),
        )
        .await?;
        Ok(())
    }

    async fn outbound_stats(
        &self,
        token: &ServerToken,
        query: &StatsQuery,
    ) -> Result<Value, EmailServiceError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(from) = &query.from_date {
            params.push(("fromdate", from.clone()));
        }
        if let Some(to) = &query.to_date {
            params.push(("todate", to.clone()));
        }
        if let Some(stream) = &query.message_stream {
            params.push(("messagestream", stream.clone()));
        }
        if let Some(tag) = &query.tag {
            params.push(("tag", tag.clone()));
        }
        self.execute(
            self.http
                .get(self.url("/stats/outbound"))
                .header(SERVER_TOKEN_HEADER, token.as_str())
                .query(&params),
        )
        .await
    }

    async fn list_servers(
        &self,
        token: &AccountToken,
    ) -> Result<Vec<ProviderServer>, EmailServiceError> {
        let body = self
            .execute(
                self.http
                    .get(self.url("/servers"))
                    .header(ACCOUNT_TOKEN_HEADER, token.as_str()),
            )
            .await?;
        let servers = body.get("Servers").cloned().unwrap_or_else(|| json!([]));
        serde_json::from_value(servers)
            .context("parse provider server list")
            .map_err(Into::into)
    }

    async fn create_server(
        &self,
        token: &AccountToken,
        spec: &NewServerSpec,
    ) -> Result<ProviderServer, EmailServiceError> {
        let body = self
            .execute(
                self.http
                    .post(self.url("/servers"))
                    .header(ACCOUNT_TOKEN_HEADER, token.as_str())
                    .json(&json!({
                        "Name": spec.name,
                        "Color": spec.color,
                        "TrackOpens": spec.track_opens,
                        "TrackLinks": spec.track_links.as_str(),
                        "InboundHookUrl": null,
                        "BounceHookUrl": null,
                        "OpenHookUrl": null,
                        "ClickHookUrl": null,
                        "DeliveryHookUrl": null,
                    })),
            )
            .await?;
        serde_json::from_value(body)
            .context("parse provider create-server response")
            .map_err(Into::into)
    }

    async fn create_server_token(
        &self,
        token: &AccountToken,
        server_id: i64,
        name: &str,
    ) -> Result<String, EmailServiceError> {
        let body = self
            .execute(
                self.http
                    .post(self.url(&format!("/servers/{server_id}/tokens")))
                    .header(ACCOUNT_TOKEN_HEADER, token.as_str())
                    .json(&json!({ "Name": name })),
            )
            .await?;
        body.get("Token")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("provider token response missing Token").into())
    }

    async fn list_message_streams(
        &self,
        token: &ServerToken,
    ) -> Result<Vec<MessageStream>, EmailServiceError> {
        let body = self
            .execute(
                self.http
                    .get(self.url("/message-streams"))
                    .header(SERVER_TOKEN_HEADER, token.as_str()),
            )
            .await?;
        let streams = body
            .get("MessageStreams")
            .cloned()
            .unwrap_or_else(|| json!([]));
        serde_json::from_value(streams)
            .context("parse provider stream list")
            .map_err(Into::into)
    }
}
