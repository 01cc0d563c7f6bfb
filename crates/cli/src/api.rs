//! Google Ads REST API client
//!
//! Thin plumbing over the `googleAds:search` GAQL endpoint and the keyword
//! planner. Queries are opaque strings handed to the remote service; rows
//! come back as raw JSON values for basic column mapping. The client holds
//! a validated access token obtained through the credential service plus
//! the resolved customer context from the profile.

use anyhow::{Context, Result, bail};
use gads_profiles::{CredentialService, ProfileStore};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://googleads.googleapis.com/v21";

pub struct AdsClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    developer_token: String,
    customer_id: String,
    login_customer_id: Option<String>,
}

/// Request body for `customers/{id}:generateKeywordIdeas`. One explicit
/// field per option — no dynamic maps.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordIdeasRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub geo_target_constants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_seed: Option<KeywordSeed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_seed: Option<UrlSeed>,
}

#[derive(Debug, Serialize)]
pub struct KeywordSeed {
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UrlSeed {
    pub url: String,
}

impl AdsClient {
    /// Resolve the profile, obtain a valid access token through the
    /// credential service, and build a request-ready client.
    pub async fn connect(
        store: &ProfileStore,
        service: &CredentialService,
        profile: Option<&str>,
    ) -> Result<Self> {
        let resolved = store.resolve(profile).await;
        let profile = store.get(Some(&resolved)).await.with_context(|| {
            format!("profile \"{resolved}\" not found — run `gads setup` first")
        })?;
        if !profile.has_credentials() {
            bail!("profile \"{resolved}\" is missing API credentials — run `gads setup` again");
        }

        let access_token = service.get_valid_token(Some(&resolved)).await?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            access_token,
            developer_token: profile.developer_token.expose().clone(),
            customer_id: profile.customer_id.clone(),
            login_customer_id: profile.login_customer_id.clone(),
        })
    }

    fn apply_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .bearer_auth(&self.access_token)
            .header("developer-token", &self.developer_token);
        match &self.login_customer_id {
            Some(login) => request.header("login-customer-id", login),
            None => request,
        }
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value> {
        debug!(url, "Google Ads API request");
        let response = self
            .apply_headers(self.http.post(url))
            .json(body)
            .send()
            .await
            .context("Google Ads API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Google Ads API returned {status}: {body}");
        }
        response
            .json::<Value>()
            .await
            .context("invalid Google Ads API response")
    }

    /// Execute a GAQL query, following result pages to the end.
    pub async fn search(&self, query: &str) -> Result<Vec<Value>> {
        let url = format!(
            "{}/customers/{}/googleAds:search",
            self.base_url, self.customer_id
        );

        let mut results = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut body = serde_json::json!({ "query": query });
            if let Some(token) = &page_token {
                body["pageToken"] = Value::String(token.clone());
            }
            let payload = self.post(&url, &body).await?;
            if let Some(rows) = payload["results"].as_array() {
                results.extend(rows.iter().cloned());
            }
            match payload["nextPageToken"].as_str() {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(results)
    }

    pub async fn list_accessible_customers(&self) -> Result<Vec<Value>> {
        let query = "\
            SELECT \
              customer_client.client_customer, \
              customer_client.descriptive_name, \
              customer_client.currency_code, \
              customer_client.time_zone, \
              customer_client.id \
            FROM customer_client \
            WHERE customer_client.status = 'ENABLED'";
        self.search(query).await
    }

    pub async fn list_campaigns(&self, limit: usize) -> Result<Vec<Value>> {
        let query = format!(
            "SELECT \
               campaign.id, campaign.name, campaign.status, \
               campaign.advertising_channel_type, campaign.bidding_strategy_type, \
               campaign.start_date, campaign.end_date, \
               metrics.impressions, metrics.clicks, metrics.cost_micros \
             FROM campaign \
             WHERE campaign.status != 'REMOVED' \
             ORDER BY campaign.id DESC \
             LIMIT {limit}"
        );
        self.search(&query).await
    }

    pub async fn get_campaign(&self, campaign_id: &str) -> Result<Option<Value>> {
        let campaign_id: u64 = campaign_id
            .parse()
            .context("campaign id must be numeric")?;
        let query = format!(
            "SELECT \
               campaign.id, campaign.name, campaign.status, \
               campaign.advertising_channel_type, campaign.bidding_strategy_type, \
               campaign.start_date, campaign.end_date, \
               metrics.impressions, metrics.clicks, metrics.cost_micros, \
               metrics.conversions, metrics.ctr, metrics.average_cpc \
             FROM campaign \
             WHERE campaign.id = {campaign_id}"
        );
        Ok(self.search(&query).await?.into_iter().next())
    }

    pub async fn list_ad_groups(&self, campaign_id: &str, limit: usize) -> Result<Vec<Value>> {
        let campaign_id: u64 = campaign_id
            .parse()
            .context("campaign id must be numeric")?;
        let query = format!(
            "SELECT \
               ad_group.id, ad_group.name, ad_group.status, ad_group.type, \
               campaign.id, campaign.name, \
               metrics.impressions, metrics.clicks, metrics.cost_micros \
             FROM ad_group \
             WHERE campaign.id = {campaign_id} AND ad_group.status != 'REMOVED' \
             ORDER BY ad_group.id DESC \
             LIMIT {limit}"
        );
        self.search(&query).await
    }

    pub async fn search_geo_targets(&self, term: &str, limit: usize) -> Result<Vec<Value>> {
        let term = term.replace('\'', "\\'");
        let query = format!(
            "SELECT \
               geo_target_constant.id, geo_target_constant.name, \
               geo_target_constant.country_code, geo_target_constant.target_type, \
               geo_target_constant.canonical_name \
             FROM geo_target_constant \
             WHERE geo_target_constant.name LIKE '%{term}%' \
             LIMIT {limit}"
        );
        self.search(&query).await
    }

    pub async fn generate_keyword_ideas(
        &self,
        request: &KeywordIdeasRequest,
    ) -> Result<Vec<Value>> {
        let url = format!(
            "{}/customers/{}:generateKeywordIdeas",
            self.base_url, self.customer_id
        );
        let body = serde_json::to_value(request).context("serializing keyword ideas request")?;
        let payload = self.post(&url, &body).await?;
        Ok(payload["results"]
            .as_array()
            .map(|rows| rows.to_vec())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: String) -> AdsClient {
        AdsClient {
            http: reqwest::Client::new(),
            base_url,
            access_token: "at_test".into(),
            developer_token: "devtoken".into(),
            customer_id: "1234567890".into(),
            login_customer_id: Some("9876543210".into()),
        }
    }

    #[test]
    fn keyword_ideas_request_serializes_camel_case_and_skips_empty() {
        let request = KeywordIdeasRequest {
            language: Some("languageConstants/1000".into()),
            geo_target_constants: vec!["geoTargetConstants/2840".into()],
            page_size: Some(25),
            keyword_seed: Some(KeywordSeed {
                keywords: vec!["coffee".into()],
            }),
            url_seed: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["language"], "languageConstants/1000");
        assert_eq!(json["geoTargetConstants"][0], "geoTargetConstants/2840");
        assert_eq!(json["pageSize"], 25);
        assert_eq!(json["keywordSeed"]["keywords"][0], "coffee");
        assert!(json.get("urlSeed").is_none());

        let empty = serde_json::to_value(KeywordIdeasRequest::default()).unwrap();
        assert_eq!(empty, serde_json::json!({}));
    }

    #[tokio::test]
    async fn search_sends_auth_headers_and_follows_pages() {
        let mut server = mockito::Server::new_async().await;

        let query = "SELECT campaign.id FROM campaign";
        let page1 = server
            .mock("POST", "/customers/1234567890/googleAds:search")
            .match_header("authorization", "Bearer at_test")
            .match_header("developer-token", "devtoken")
            .match_header("login-customer-id", "9876543210")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "query": query
            })))
            .with_status(200)
            .with_body(
                r#"{"results":[{"campaign":{"id":"1"}}],"nextPageToken":"page-2"}"#,
            )
            .create_async()
            .await;
        let page2 = server
            .mock("POST", "/customers/1234567890/googleAds:search")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "query": query,
                "pageToken": "page-2"
            })))
            .with_status(200)
            .with_body(r#"{"results":[{"campaign":{"id":"2"}}]}"#)
            .create_async()
            .await;

        let client = test_client(server.url());
        let rows = client.search(query).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["campaign"]["id"], "1");
        assert_eq!(rows[1]["campaign"]["id"], "2");
        page1.assert_async().await;
        page2.assert_async().await;
    }

    #[tokio::test]
    async fn api_error_surfaces_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/customers/1234567890/googleAds:search")
            .with_status(403)
            .with_body(r#"{"error":{"message":"The developer token is not approved"}}"#)
            .create_async()
            .await;

        let client = test_client(server.url());
        let err = client
            .search("SELECT campaign.id FROM campaign")
            .await
            .unwrap_err();
        let message = format!("{err}");
        assert!(message.contains("403"));
        assert!(message.contains("developer token"));
    }

    #[tokio::test]
    async fn non_numeric_campaign_id_is_rejected_before_any_request() {
        let client = test_client("http://unused.invalid".into());
        assert!(client.get_campaign("abc").await.is_err());
        assert!(client.list_ad_groups("1; DROP", 10).await.is_err());
    }
}
