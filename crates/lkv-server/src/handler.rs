//! Request handlers.
//!
//! Handlers translate HTTP into [`Database`] calls. Every database call runs
//! on the blocking pool; statuses are decided by [`ServerError`].

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use futures::stream;
use lkv_db::{Database, DbResult, IndexQuery, KeyStream, Metadata, Object};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::error::{ServerError, ServerResult};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Run `f` against the database on the blocking pool.
    async fn run<T, F>(&self, f: F) -> ServerResult<T>
    where
        F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let result = tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| ServerError::Internal(format!("blocking task failed: {e}")))?;
        Ok(result?)
    }
}

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Serialize)]
struct Resources {
    riak_kv_wm_buckets: &'static str,
    riak_kv_wm_index: &'static str,
    riak_kv_wm_keylist: &'static str,
    riak_kv_wm_link_walker: &'static str,
    riak_kv_wm_mapred: &'static str,
    riak_kv_wm_object: &'static str,
    riak_kv_wm_ping: &'static str,
    riak_kv_wm_props: &'static str,
    riak_kv_wm_stats: &'static str,
}

const RESOURCES: Resources = Resources {
    riak_kv_wm_buckets: "/buckets",
    riak_kv_wm_index: "/buckets",
    riak_kv_wm_keylist: "/buckets",
    riak_kv_wm_link_walker: "/buckets",
    riak_kv_wm_mapred: "/mapred",
    riak_kv_wm_object: "/buckets",
    riak_kv_wm_ping: "/ping",
    riak_kv_wm_props: "/buckets",
    riak_kv_wm_stats: "/stats",
};

#[derive(Serialize)]
struct KeyList<'a> {
    keys: &'a [String],
}

#[derive(Debug, Deserialize)]
pub struct KeysParams {
    keys: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreParams {
    returnbody: Option<String>,
}

impl StoreParams {
    fn return_body(&self) -> bool {
        self.returnbody.as_deref() == Some("true")
    }
}

// ---- Server operations ----

pub async fn ping() -> &'static str {
    "OK"
}

/// Resource map. Only served as JSON.
pub async fn resources(headers: HeaderMap) -> Response {
    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(JSON_CONTENT_TYPE));
    if wants_json {
        Json(RESOURCES).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            "We're not participating in the html nonsense.\n",
        )
            .into_response()
    }
}

pub async fn stats() -> Json<serde_json::Value> {
    Json(json!({
        "riak_kv_version": "1.3.1",
        "riak_api_version": "1.3.1",
    }))
}

pub async fn mapred() -> ServerError {
    ServerError::NotImplemented
}

pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

// ---- Buckets ----

pub async fn list_buckets(State(state): State<AppState>) -> ServerResult<Response> {
    let buckets = state.run(|db| db.list_buckets()).await?;
    Ok(Json(json!({ "buckets": buckets })).into_response())
}

/// `?keys=true` returns every key at once; `?keys=stream` sends one
/// `{"keys":[key]}` document per key as it is read.
pub async fn list_keys(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    Query(params): Query<KeysParams>,
) -> ServerResult<Response> {
    match params.keys.as_deref() {
        Some("true") => {
            let keys = state.run(move |db| db.list_keys(&bucket)).await?;
            Ok(Json(KeyList { keys: &keys }).into_response())
        }
        Some("stream") => {
            let keys = state.run(move |db| db.stream_keys(&bucket)).await?;
            Ok(stream_response(keys))
        }
        _ => Err(ServerError::BadRequest(
            "keys parameter must be `true` or `stream`\n".into(),
        )),
    }
}

fn stream_response(keys: KeyStream) -> Response {
    let chunks = stream::unfold(keys, |mut keys| async move {
        let Some(next) = keys.next_key().await else {
            return None;
        };
        let chunk = next.map_err(|e| ServerError::Db(e.into())).and_then(|key| {
            let doc = serde_json::to_vec(&json!({ "keys": [key] }))?;
            Ok(Bytes::from(doc))
        });
        Some((chunk, keys))
    });
    (
        [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
        Body::from_stream(chunks),
    )
        .into_response()
}

// ---- Objects ----

pub async fn fetch_object(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> ServerResult<Response> {
    let b = bucket.clone();
    let object = state
        .run(move |db| db.fetch_object(&b, &key))
        .await?
        .ok_or(ServerError::NotFound)?;
    Ok(object_response(StatusCode::OK, &bucket, object))
}

/// `POST /buckets/{bucket}/keys`: store under a generated key.
pub async fn create_object(
    state: State<AppState>,
    Path(bucket): Path<String>,
    params: Query<StoreParams>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    store(state, bucket, None, params, headers, body).await
}

/// `PUT`/`POST /buckets/{bucket}/keys/{key}`.
pub async fn store_object(
    state: State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    params: Query<StoreParams>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    store(state, bucket, Some(key), params, headers, body).await
}

async fn store(
    State(state): State<AppState>,
    bucket: String,
    key: Option<String>,
    Query(params): Query<StoreParams>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let meta = metadata_from(&headers);
    let b = bucket.clone();
    let (receipt, meta, body) = state
        .run(move |db| {
            let receipt = db.store_object(&b, key.as_deref(), meta.clone(), &body)?;
            Ok((receipt, meta, body))
        })
        .await?;

    let created = receipt.generated;
    let mut response = if params.return_body() {
        let status = if created { StatusCode::CREATED } else { StatusCode::OK };
        object_response(status, &bucket, Object::new(meta, body.to_vec()))
    } else if created {
        StatusCode::CREATED.into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    };

    if created {
        let location = format!("/buckets/{bucket}/keys/{}", receipt.key);
        match HeaderValue::from_str(&location) {
            Ok(value) => {
                response.headers_mut().insert(header::LOCATION, value);
            }
            Err(_) => warn!(%location, "location is not a valid header value"),
        }
    }
    Ok(response)
}

pub async fn delete_object(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> ServerResult<StatusCode> {
    if state.run(move |db| db.delete_object(&bucket, &key)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound)
    }
}

// ---- Queries ----

pub async fn index_exact(
    state: State<AppState>,
    Path((bucket, field, value)): Path<(String, String, String)>,
) -> ServerResult<Response> {
    index(state, bucket, IndexQuery::from_request(&field, &value, None)).await
}

pub async fn index_range(
    state: State<AppState>,
    Path((bucket, field, start, end)): Path<(String, String, String, String)>,
) -> ServerResult<Response> {
    index(state, bucket, IndexQuery::from_request(&field, &start, Some(&end))).await
}

async fn index(
    State(state): State<AppState>,
    bucket: String,
    query: IndexQuery,
) -> ServerResult<Response> {
    let keys = state
        .run(move |db| db.query_index(&bucket, &query))
        .await?
        .ok_or(ServerError::NotFound)?;
    Ok(Json(KeyList { keys: &keys }).into_response())
}

/// `GET /buckets/{bucket}/keys/{key}/{phase}/...`
pub async fn walk(
    State(state): State<AppState>,
    Path((bucket, key, phases)): Path<(String, String, String)>,
) -> ServerResult<Response> {
    let phases: Vec<String> = phases.split('/').map(str::to_string).collect();
    let walked = state
        .run(move |db| db.walk(&bucket, &key, &phases))
        .await?
        .ok_or(ServerError::NotFound)?;
    Ok(([(header::CONTENT_TYPE, walked.content_type)], walked.body).into_response())
}

// ---- Header mapping ----

fn metadata_from(headers: &HeaderMap) -> Metadata {
    Metadata::from_headers(
        headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
    )
}

fn object_response(status: StatusCode, bucket: &str, object: Object) -> Response {
    let mut headers = HeaderMap::new();
    for (name, value) in object.meta.to_headers(bucket) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => warn!(header = %name, "dropping header that cannot be encoded"),
        }
    }
    (status, headers, Body::from(object.payload)).into_response()
}
