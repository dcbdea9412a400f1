//! Elasticsearch-backed event store.
//!
//! Talks to the REST API directly:
//! - `GET/PUT/DELETE /{index}/_doc/{id}`
//! - `POST /{index}/_update/{id}` with `{"doc": ...}`
//! - `POST /{index}/_search` with a bool query
//!
//! Event documents are stored camelCase, so keyword lookups go through the
//! dynamic `.keyword` sub-fields (`participants.username.keyword`,
//! `createdBy.keyword`, `location.zipCode.keyword`).

use std::time::Duration;

use domain::models::{Event, EventsQuery};
use domain::services::{EventStore, StoreError};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::pagination::Page;
use shared::validation::is_blank;
use tracing::{debug, error};

use crate::error::from_http;
use crate::metrics::QueryTimer;

/// Connection settings for the search cluster.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub url: String,
    pub index: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<Event>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    total: Option<SearchTotal>,
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchTotal {
    Object { value: u64 },
    Legacy(u64),
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: Event,
}

fn filter_value(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !is_blank(v))
}

/// Build the `_search` request body for `query`.
pub fn build_search_body(query: &EventsQuery) -> Value {
    let mut must: Vec<Value> = Vec::new();

    if let Some(username) = filter_value(&query.participant_username) {
        must.push(json!({ "term": { "participants.username.keyword": username } }));
    }
    if let Some(created_by) = filter_value(&query.created_by) {
        must.push(json!({ "term": { "createdBy.keyword": created_by } }));
    }
    if let Some(zip_code) = filter_value(&query.zip_code) {
        must.push(json!({ "term": { "location.zipCode.keyword": zip_code } }));
    }
    if let Some(start) = query.start_date {
        must.push(json!({ "range": { "startDate": { "gte": start } } }));
    }
    if let Some(end) = query.end_date {
        must.push(json!({ "range": { "endDate": { "lte": end } } }));
    }
    if let Some(city) = filter_value(&query.city) {
        must.push(json!({ "match": { "location.city": city } }));
    }
    if let Some(name) = filter_value(&query.participant_name) {
        must.push(json!({
            "wildcard": {
                "participants.name": {
                    "value": format!("*{}*", name.to_lowercase()),
                    "case_insensitive": true
                }
            }
        }));
    }
    if let Some(title) = filter_value(&query.title) {
        must.push(json!({ "match": { "title": title } }));
    }
    if let Some(description) = filter_value(&query.description) {
        must.push(json!({ "match": { "description": description } }));
    }

    let query_clause = if must.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({ "bool": { "must": must } })
    };

    let request = query.page_request();
    json!({
        "query": query_clause,
        "from": request.offset(),
        "size": request.limit(),
        "sort": [{ "createdAt": { "order": query.sort_order().to_string() } }],
        "track_total_hits": true
    })
}

/// Extract the documents and the total hit count from a `_search` response.
fn parse_search_response(body: Value) -> Result<(Vec<Event>, u64), StoreError> {
    let response: SearchResponse = serde_json::from_value(body)
        .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

    let events: Vec<Event> = response.hits.hits.into_iter().map(|h| h.source).collect();
    let total = match response.hits.total {
        Some(SearchTotal::Object { value }) | Some(SearchTotal::Legacy(value)) => value,
        None => events.len() as u64,
    };
    Ok((events, total))
}

#[derive(Clone)]
pub struct ElasticsearchEventStore {
    client: Client,
    base_url: String,
    index: String,
}

impl ElasticsearchEventStore {
    pub fn new(config: &SearchConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(from_http)?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.index.clone(),
        })
    }

    fn doc_url(&self, id: &str) -> String {
        format!("{}/{}/_doc/{}", self.base_url, self.index, id)
    }

    /// Cluster reachability check, used by the readiness probe.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(from_http)?;
        ensure_success(response, "ping").await.map(|_| ())
    }
}

/// Turn a non-success status into a store error, logging the response body.
async fn ensure_success(response: Response, operation: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(status = %status, operation = %operation, body = %body, "Search request failed");

    if status.is_server_error() {
        Err(StoreError::Unavailable(format!("HTTP {}", status)))
    } else {
        Err(StoreError::InvalidResponse(format!("HTTP {}: {}", status, body)))
    }
}

#[async_trait::async_trait]
impl EventStore for ElasticsearchEventStore {
    async fn get(&self, id: &str) -> Result<Option<Event>, StoreError> {
        let timer = QueryTimer::search("get_event");
        let response = self.client.get(self.doc_url(id)).send().await;
        timer.record();

        let response = response.map_err(from_http)?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(event_id = %id, "Event document not found");
            return Ok(None);
        }

        let body: GetResponse = ensure_success(response, "get_event")
            .await?
            .json()
            .await
            .map_err(from_http)?;

        Ok(if body.found { body.source } else { None })
    }

    async fn create(&self, event: &Event) -> Result<(), StoreError> {
        let timer = QueryTimer::search("index_event");
        let response = self
            .client
            .put(format!("{}?refresh=wait_for", self.doc_url(&event.id)))
            .json(event)
            .send()
            .await;
        timer.record();

        ensure_success(response.map_err(from_http)?, "index_event").await?;
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), StoreError> {
        let url = format!(
            "{}/{}/_update/{}?refresh=wait_for",
            self.base_url, self.index, event.id
        );

        let timer = QueryTimer::search("update_event");
        let response = self
            .client
            .post(url)
            .json(&json!({ "doc": event }))
            .send()
            .await;
        timer.record();

        let response = response.map_err(from_http)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotApplied(format!(
                "event {} not found",
                event.id
            )));
        }
        ensure_success(response, "update_event").await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let timer = QueryTimer::search("delete_event");
        let response = self
            .client
            .delete(format!("{}?refresh=wait_for", self.doc_url(id)))
            .send()
            .await;
        timer.record();

        let response = response.map_err(from_http)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        ensure_success(response, "delete_event").await?;
        Ok(true)
    }

    async fn search(&self, query: &EventsQuery) -> Result<Page<Event>, StoreError> {
        let url = format!("{}/{}/_search", self.base_url, self.index);
        let body = build_search_body(query);

        let timer = QueryTimer::search("search_events");
        let response = self.client.post(url).json(&body).send().await;
        timer.record();

        let response = response.map_err(from_http)?;
        // A missing index simply has no events yet.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Page::new(Vec::new(), query.page_request(), 0));
        }

        let raw: Value = ensure_success(response, "search_events")
            .await?
            .json()
            .await
            .map_err(from_http)?;
        let (events, total) = parse_search_response(raw)?;

        Ok(Page::new(events, query.page_request(), total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::pagination::SortOrder;

    #[test]
    fn test_empty_query_matches_all() {
        let body = build_search_body(&EventsQuery::default());

        assert_eq!(body["query"], json!({ "match_all": {} }));
        assert_eq!(body["from"], 0);
        assert_eq!(body["size"], 10);
        assert_eq!(body["sort"][0]["createdAt"]["order"], "desc");
    }

    #[test]
    fn test_filters_become_bool_clauses() {
        let query = EventsQuery {
            participant_username: Some("jdoe".to_string()),
            zip_code: Some("00233".to_string()),
            participant_name: Some("Jane".to_string()),
            title: Some("  ".to_string()),
            page: Some(3),
            page_size: Some(20),
            order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let body = build_search_body(&query);
        let must = body["query"]["bool"]["must"].as_array().unwrap();

        assert_eq!(must.len(), 3);
        assert_eq!(must[0]["term"]["participants.username.keyword"], "jdoe");
        assert_eq!(must[1]["term"]["location.zipCode.keyword"], "00233");
        assert_eq!(must[2]["wildcard"]["participants.name"]["value"], "*jane*");
        assert_eq!(body["from"], 40);
        assert_eq!(body["size"], 20);
        assert_eq!(body["sort"][0]["createdAt"]["order"], "asc");
    }

    #[test]
    fn test_parse_search_response() {
        let raw = json!({
            "hits": {
                "total": { "value": 42, "relation": "eq" },
                "hits": [{
                    "_id": "evt-1",
                    "_source": {
                        "id": "evt-1",
                        "title": "Rust Meetup",
                        "description": "Monthly gathering",
                        "photoUrl": "https://cdn.example.com/meetup.png",
                        "location": { "city": "Accra", "zipCode": "00233" },
                        "participants": [],
                        "startDate": "2024-06-01T18:00:00Z",
                        "endDate": "2024-06-01T21:00:00Z",
                        "createdAt": "2024-05-01T10:00:00Z",
                        "updatedAt": null,
                        "createdBy": "organizer"
                    }
                }]
            }
        });

        let (events, total) = parse_search_response(raw).unwrap();
        assert_eq!(total, 42);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].location.zip_code, "00233");
    }

    #[test]
    fn test_parse_search_response_rejects_garbage() {
        let result = parse_search_response(json!({ "error": "boom" }));
        assert!(matches!(result, Err(StoreError::InvalidResponse(_))));
    }
}
