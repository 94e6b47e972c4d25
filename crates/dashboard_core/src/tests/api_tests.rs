use super::*;
use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn spawn_backend(app: Router) -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/api"))
}

fn seated_backend() -> Router {
    Router::new()
        .route(
            "/api/metrics",
            get(|| async {
                Json(json!({
                    "strangers_num": 14,
                    "current_round": 2,
                    "total_rounds": 5,
                    "round_time_minutes": 3,
                    "break_time_minutes": 1
                }))
            }),
        )
        .route(
            "/api/users",
            get(|| async {
                Json(json!([
                    {"name": "Anna Petrova", "initials": "AP", "table_index": 1},
                    {"name": "Boris Ivanov", "initials": "BI", "table_index": 2},
                    {}
                ]))
            }),
        )
        .route(
            "/api/ready",
            get(|| async { Json(json!({"session_started": true})) }),
        )
}

fn api(base_url: String) -> HttpDashboardApi {
    HttpDashboardApi::new(base_url, Duration::from_secs(2)).expect("client")
}

#[tokio::test]
async fn fetches_all_three_resources() {
    let base_url = spawn_backend(seated_backend()).await.expect("spawn backend");
    let api = api(base_url);

    let metrics = api.fetch_metrics().await.expect("metrics");
    assert_eq!(metrics.current_round, 2);
    assert_eq!(metrics.round_time_minutes, 3.0);

    let people = api.fetch_people().await.expect("people");
    assert_eq!(people.len(), 2);
    assert_eq!(people[1].table_index, 2);

    let session = api.fetch_session().await.expect("session");
    assert!(session.session_started);
}

#[tokio::test]
async fn non_success_status_maps_to_status_error() {
    let app = Router::new().route(
        "/api/ready",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "boom"})),
            )
        }),
    );
    let base_url = spawn_backend(app).await.expect("spawn backend");

    let err = api(base_url).fetch_session().await.expect_err("must fail");
    assert_eq!(
        err,
        SyncError::Status {
            resource: Resource::Ready,
            status: 500
        }
    );
}

#[tokio::test]
async fn non_array_users_body_is_a_decode_error() {
    let app = Router::new().route(
        "/api/users",
        get(|| async { Json::<Value>(json!({"users": []})) }),
    );
    let base_url = spawn_backend(app).await.expect("spawn backend");

    let err = api(base_url).fetch_people().await.expect_err("must fail");
    assert!(matches!(
        err,
        SyncError::Decode {
            resource: Resource::Users,
            ..
        }
    ));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = api(format!("http://{addr}/api"))
        .fetch_metrics()
        .await
        .expect_err("must fail");
    assert!(matches!(
        err,
        SyncError::Transport {
            resource: Resource::Metrics,
            ..
        }
    ));
}

#[test]
fn trailing_slash_is_trimmed_from_base_url() {
    let api = HttpDashboardApi::with_client(Client::new(), "http://localhost:5050/api/");
    assert_eq!(api.base_url(), "http://localhost:5050/api");
}
