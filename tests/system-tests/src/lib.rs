#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::ffi::OsString;
    use std::path::PathBuf;
    use std::process::{Output, Stdio};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, OnceLock};
    use std::time::Duration;

    use anyhow::{Context, Result, bail};
    use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use client_sdk::{CloseReason, ConsoleClient, DashboardError, ReplicationDashboard};
    use common::{
        EntityType, HealOptions, HealStatus, HealthColor, LoginRequest, TraceCall, TraceFilter,
        TraceMessage,
    };
    use console_core::{Cell, EntityLookup, LookupOutcome, LookupState};
    use serde_json::json;
    use tokio::process::{Child, Command};
    use tokio::sync::{Mutex, mpsc};
    use tokio::task::JoinHandle;
    use tokio::time::{sleep, timeout};

    const SESSION: &str = "session-abc";

    #[derive(Default)]
    struct MockConsole {
        trace_queries: Mutex<Vec<HashMap<String, String>>>,
        trace_close_codes: Mutex<Vec<u16>>,
        heal_requests: Mutex<Vec<(String, HashMap<String, String>)>>,
        heal_greetings: Mutex<Vec<String>>,
        /// Delays the summary and the `mybucket` lookup.
        slow_status: AtomicBool,
    }

    #[tokio::test]
    async fn sdk_login_then_summary() -> Result<()> {
        let bind = "127.0.0.1:19180";
        let (_mock, server) = start_mock_console(bind).await?;

        let result = async {
            let client = ConsoleClient::new(format!("http://{bind}"));
            let token = client.login("admin", "secret123").await?;
            assert_eq!(token, SESSION);

            let dashboard = ReplicationDashboard::new(client);
            let refreshed = dashboard.refresh().await?;
            assert!(refreshed.state.snackbar.is_none());
            assert_eq!(refreshed.summary, refreshed.state.summary);

            let buckets = &refreshed.summary[0];
            assert_eq!(buckets.label, "Buckets");
            assert_eq!(buckets.synced, 12);
            assert_eq!(buckets.failed, 1);
            let policies = &refreshed.summary[3];
            assert_eq!(policies.label, "Policies");
            assert_eq!(policies.synced, 7);
            assert_eq!(policies.failed, 0);

            Ok::<(), anyhow::Error>(())
        }
        .await;

        server.abort();
        result
    }

    #[tokio::test]
    async fn sdk_lookup_compares_sites() -> Result<()> {
        let bind = "127.0.0.1:19181";
        let (_mock, server) = start_mock_console(bind).await?;

        let result = async {
            let client = ConsoleClient::new(format!("http://{bind}")).with_session_token(SESSION);

            let outcome = client
                .lookup(&EntityLookup::new(EntityType::Bucket, "mybucket")?)
                .await?;
            let matrix = outcome.matrix().context("mybucket should be found")?;
            assert_eq!(
                matrix.header(),
                &[
                    Cell::Header(String::new()),
                    Cell::Header("site-a".into()),
                    Cell::Header("site-b".into()),
                ]
            );
            assert_eq!(
                matrix.row("Tags"),
                Some(&[Cell::Label("Tags".into()), Cell::Status(true), Cell::Status(false)][..])
            );
            assert_eq!(
                matrix.row("Quota"),
                Some(&[Cell::Label("Quota".into()), Cell::NotApplicable, Cell::NotApplicable][..])
            );

            let outcome = client
                .lookup(&EntityLookup::new(EntityType::Bucket, "ghost-bucket")?)
                .await?;
            assert!(matches!(outcome, LookupOutcome::NotFound { .. }));
            assert_eq!(
                outcome.not_found_message().as_deref(),
                Some("Bucket: ghost-bucket not found.")
            );

            Ok::<(), anyhow::Error>(())
        }
        .await;

        server.abort();
        result
    }

    #[tokio::test]
    async fn api_error_text_reaches_snackbar() -> Result<()> {
        let bind = "127.0.0.1:19182";
        let (_mock, server) = start_mock_console(bind).await?;

        let result = async {
            let dashboard = ReplicationDashboard::new(ConsoleClient::new(format!("http://{bind}")));
            let mut notifications = dashboard.subscribe_notifications();

            let Err(DashboardError::Upstream(error)) = dashboard.refresh().await else {
                bail!("refresh should fail without a session");
            };
            assert_eq!(error.message, "Access Denied");
            assert_eq!(error.detailed, "no valid session cookie");

            let state = dashboard.snapshot().await;
            assert_eq!(state.snackbar.as_ref(), Some(&error));
            assert!(state.summary.iter().all(|card| card.synced == 0 && card.failed == 0));
            assert_eq!(notifications.recv().await?, error);

            let looked_up = dashboard.lookup(EntityType::User, "alice").await;
            assert!(matches!(looked_up, Err(DashboardError::Upstream(_))));
            assert!(matches!(
                dashboard.snapshot().await.lookup,
                LookupState::Failed { .. }
            ));

            let err = ConsoleClient::new(format!("http://{bind}"))
                .login("admin", "wrong")
                .await
                .expect_err("bad credentials must be rejected");
            assert_eq!(err.notification().message, "invalid Login");

            Ok::<(), anyhow::Error>(())
        }
        .await;

        server.abort();
        result
    }

    #[tokio::test]
    async fn trace_stream_delivers_calls_and_cancels_cleanly() -> Result<()> {
        let bind = "127.0.0.1:19183";
        let (mock, server) = start_mock_console(bind).await?;

        let result = async {
            let client = ConsoleClient::new(format!("http://{bind}")).with_session_token(SESSION);
            let filter = TraceFilter {
                calls: vec![TraceCall::S3],
                only_errors: true,
                ..TraceFilter::default()
            };

            let (tx, mut rx) = mpsc::unbounded_channel();
            let subscription = client
                .subscribe_trace(&filter, move |message: TraceMessage| {
                    let _ = tx.send(message);
                })
                .await?;

            let mut received = Vec::new();
            while received.len() < 3 {
                let message = timeout(Duration::from_secs(5), rx.recv())
                    .await
                    .context("timed out waiting for trace message")?
                    .context("trace stream ended early")?;
                received.push(message);
            }
            assert_eq!(received[0].api, "s3.GetObject");
            assert_eq!(received[2].status_code, 404);

            assert_eq!(subscription.cancel().await, CloseReason::Cancelled);

            let mut close_codes = Vec::new();
            for _ in 0..40 {
                close_codes = mock.trace_close_codes.lock().await.clone();
                if !close_codes.is_empty() {
                    break;
                }
                sleep(Duration::from_millis(50)).await;
            }
            assert_eq!(close_codes, vec![1000]);

            let queries = mock.trace_queries.lock().await;
            assert_eq!(queries[0].get("calls").map(String::as_str), Some("s3"));
            assert_eq!(queries[0].get("onlyErrors").map(String::as_str), Some("yes"));

            Ok::<(), anyhow::Error>(())
        }
        .await;

        server.abort();
        result
    }

    #[tokio::test]
    async fn cli_lookup_prints_table_and_not_found() -> Result<()> {
        let bind = "127.0.0.1:19184";
        let base_url = format!("http://{bind}");
        let (_mock, server) = start_mock_console(bind).await?;

        let result = async {
            let output = run_cli(&[
                "--server-url",
                &base_url,
                "--token",
                SESSION,
                "lookup",
                "bucket",
                "ghost-bucket",
            ])
            .await?;
            assert_eq!(output.trim(), "Bucket: ghost-bucket not found.");

            let output = run_cli(&[
                "--server-url",
                &base_url,
                "--token",
                SESSION,
                "lookup",
                "bucket",
                "mybucket",
            ])
            .await?;
            let tags = output
                .lines()
                .find(|line| line.starts_with("Tags"))
                .context("missing Tags row")?;
            assert!(tags.contains('✓') && tags.contains('✗'));
            assert!(output.lines().next().unwrap_or_default().contains("site-b"));

            let output = run_cli(&["--server-url", &base_url, "--token", SESSION, "status"]).await?;
            assert!(output.contains("Buckets"));
            assert!(output.contains("12"));

            Ok::<(), anyhow::Error>(())
        }
        .await;

        server.abort();
        result
    }

    #[tokio::test]
    async fn cli_reports_server_error_text() -> Result<()> {
        let bind = "127.0.0.1:19185";
        let base_url = format!("http://{bind}");
        let (_mock, server) = start_mock_console(bind).await?;

        let result = async {
            let output = cli_output(&["--server-url", &base_url, "status"]).await?;
            assert!(!output.status.success());
            let stderr = String::from_utf8_lossy(&output.stderr);
            assert!(stderr.contains("Access Denied"), "stderr was: {stderr}");

            Ok::<(), anyhow::Error>(())
        }
        .await;

        server.abort();
        result
    }

    #[tokio::test]
    async fn cli_web_interface_ping() -> Result<()> {
        let bind = "127.0.0.1:19186";
        let mut cli_web = start_cli_web(bind, "http://127.0.0.1:19199").await?;

        let ping_url = format!("http://{bind}/api/ping");
        let body = reqwest::get(&ping_url)
            .await
            .context("failed to call cli web ping endpoint")?
            .error_for_status()
            .context("cli web ping endpoint returned non-success status")?
            .text()
            .await
            .context("failed to read ping response body")?;

        assert!(body.contains("\"ok\":true"));
        assert!(body.contains("console-web"));

        let summary = reqwest::get(format!("http://{bind}/api/replication/summary")).await?;
        assert_eq!(summary.status(), StatusCode::BAD_GATEWAY);

        stop_server(&mut cli_web).await;
        Ok(())
    }

    #[tokio::test]
    async fn cli_web_lookup_renders_html_table() -> Result<()> {
        let bind = "127.0.0.1:19187";
        let web_bind = "127.0.0.1:19188";
        let (_mock, server) = start_mock_console(bind).await?;
        let mut cli_web = start_cli_web(web_bind, &format!("http://{bind}")).await?;

        let result = async {
            let http = reqwest::Client::new();
            let lookup: serde_json::Value = http
                .get(format!("http://{web_bind}/api/replication/lookup"))
                .query(&[("entityType", "bucket"), ("entityValue", "mybucket")])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            assert_eq!(lookup["found"], json!(true));
            let table = lookup["table"].as_str().context("missing table html")?;
            assert!(table.starts_with("<table class=\"status-table\">"));
            assert!(table.contains("class=\"fail\""));

            let missing = http
                .get(format!("http://{web_bind}/api/replication/lookup"))
                .query(&[("entityType", "bucket"), ("entityValue", " ")])
                .send()
                .await?;
            assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

            let sites: serde_json::Value = http
                .get(format!("http://{web_bind}/api/replication/sites"))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            assert_eq!(sites["sites"][1]["deploymentID"], json!("dep-b"));

            Ok::<(), anyhow::Error>(())
        }
        .await;

        stop_server(&mut cli_web).await;
        server.abort();
        result
    }

    #[tokio::test]
    async fn concurrent_dashboard_requests_keep_their_own_results() -> Result<()> {
        let bind = "127.0.0.1:19189";
        let (mock, server) = start_mock_console(bind).await?;
        mock.slow_status.store(true, Ordering::Relaxed);

        let result = async {
            let client = ConsoleClient::new(format!("http://{bind}")).with_session_token(SESSION);
            let dashboard = ReplicationDashboard::new(client);
            let mut notifications = dashboard.subscribe_notifications();

            let (refreshed, forbidden) = tokio::join!(
                dashboard.refresh(),
                dashboard.lookup(EntityType::Bucket, "forbidden-bucket"),
            );
            let refreshed = refreshed.context("refresh must not inherit the lookup's error")?;
            assert_eq!(refreshed.summary[0].synced, 12);
            let Err(DashboardError::Upstream(error)) = forbidden else {
                bail!("forbidden lookup should fail with the console's error");
            };
            assert_eq!(error.message, "Access Denied");
            assert_eq!(notifications.recv().await?, error);

            let (slow, fast) = tokio::join!(
                dashboard.lookup(EntityType::Bucket, "mybucket"),
                async {
                    sleep(Duration::from_millis(50)).await;
                    dashboard.lookup(EntityType::Bucket, "ghost-bucket").await
                },
            );
            let slow = slow?;
            assert_eq!(slow.lookup.value, "mybucket");
            assert!(slow.outcome.matrix().is_some());
            let fast = fast?;
            assert!(matches!(fast.outcome, LookupOutcome::NotFound { .. }));

            // The shared state keeps the most recent lookup only.
            match dashboard.snapshot().await.lookup {
                LookupState::Ready { lookup, .. } => assert_eq!(lookup.value, "ghost-bucket"),
                other => bail!("unexpected lookup state {other:?}"),
            }

            Ok::<(), anyhow::Error>(())
        }
        .await;

        server.abort();
        result
    }

    #[tokio::test]
    async fn heal_stream_greets_and_ends_when_server_closes() -> Result<()> {
        let bind = "127.0.0.1:19192";
        let (mock, server) = start_mock_console(bind).await?;

        let result = async {
            let client = ConsoleClient::new(format!("http://{bind}")).with_session_token(SESSION);
            let options = HealOptions {
                bucket: "photos".into(),
                recursive: true,
                ..HealOptions::default()
            };

            let (tx, mut rx) = mpsc::unbounded_channel();
            let subscription = client
                .subscribe_heal(&options, move |status: HealStatus| {
                    let _ = tx.send(status);
                })
                .await?;

            let reason = timeout(Duration::from_secs(5), subscription.closed())
                .await
                .context("heal stream did not end")?;
            assert_eq!(reason, CloseReason::ServerClosed);

            let mut received = Vec::new();
            while let Some(status) = rx.recv().await {
                received.push(status);
            }
            assert_eq!(received.len(), 2);
            assert_eq!(received[0].items_scanned, 10);
            assert_eq!(received[1].items_scanned, 25);
            assert_eq!(received[1].objects_healed, 5);
            assert_eq!(received[1].health_before_cols.get(&HealthColor::Yellow), Some(&5));
            assert_eq!(received[1].health_after_cols.get(&HealthColor::Green), Some(&5));

            assert_eq!(*mock.heal_greetings.lock().await, vec!["ok".to_string()]);
            let requests = mock.heal_requests.lock().await;
            assert_eq!(requests[0].0, "photos");
            assert_eq!(requests[0].1.get("recursive").map(String::as_str), Some("true"));

            Ok::<(), anyhow::Error>(())
        }
        .await;

        server.abort();
        result
    }

    #[tokio::test]
    async fn cli_web_serves_concurrent_requests_independently() -> Result<()> {
        let bind = "127.0.0.1:19190";
        let web_bind = "127.0.0.1:19191";
        let (mock, server) = start_mock_console(bind).await?;
        mock.slow_status.store(true, Ordering::Relaxed);
        let mut cli_web = start_cli_web(web_bind, &format!("http://{bind}")).await?;

        let result = async {
            let http = reqwest::Client::new();
            let lookup = |value: &'static str| {
                http.get(format!("http://{web_bind}/api/replication/lookup"))
                    .query(&[("entityType", "bucket"), ("entityValue", value)])
                    .send()
            };

            let (summary, found, forbidden, ghost) = tokio::join!(
                http.get(format!("http://{web_bind}/api/replication/summary"))
                    .send(),
                lookup("mybucket"),
                lookup("forbidden-bucket"),
                lookup("ghost-bucket"),
            );

            let summary = summary?;
            assert_eq!(summary.status(), StatusCode::OK);
            let summary: serde_json::Value = summary.json().await?;
            assert_eq!(summary["summary"][0]["synced"], json!(12));

            let found = found?;
            assert_eq!(found.status(), StatusCode::OK);
            let found: serde_json::Value = found.json().await?;
            assert_eq!(found["entityValue"], json!("mybucket"));
            assert_eq!(found["found"], json!(true));

            let forbidden = forbidden?;
            assert_eq!(forbidden.status(), StatusCode::BAD_GATEWAY);
            let forbidden: serde_json::Value = forbidden.json().await?;
            assert_eq!(forbidden["error"], json!("Access Denied"));
            assert_eq!(forbidden["detailed"], json!("bucket policy denies access"));

            let ghost = ghost?;
            assert_eq!(ghost.status(), StatusCode::OK);
            let ghost: serde_json::Value = ghost.json().await?;
            assert_eq!(ghost["found"], json!(false));
            assert_eq!(ghost["message"], json!("Bucket: ghost-bucket not found."));

            Ok::<(), anyhow::Error>(())
        }
        .await;

        stop_server(&mut cli_web).await;
        server.abort();
        result
    }

    async fn start_mock_console(bind: &str) -> Result<(Arc<MockConsole>, JoinHandle<()>)> {
        let mock = Arc::new(MockConsole::default());
        let app = Router::new()
            .route("/api/v1/login", post(mock_login))
            .route("/api/v1/admin/site-replication/status", get(mock_status))
            .route("/api/v1/admin/site-replication", get(mock_info))
            .route("/ws/trace", get(mock_trace))
            .route("/ws/heal/{bucket}", get(mock_heal))
            .with_state(mock.clone());

        let listener = tokio::net::TcpListener::bind(bind)
            .await
            .with_context(|| format!("failed to bind mock console at {bind}"))?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok((mock, server))
    }

    fn api_error(status: StatusCode, message: &str, detailed: &str) -> Response {
        (
            status,
            Json(json!({
                "code": status.as_u16(),
                "message": message,
                "detailedMessage": detailed,
            })),
        )
            .into_response()
    }

    fn has_session(headers: &HeaderMap) -> bool {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|cookie| cookie.split(';').any(|pair| pair.trim() == format!("token={SESSION}")))
    }

    async fn mock_login(Json(request): Json<LoginRequest>) -> Response {
        if request.access_key != "admin" || request.secret_key != "secret123" {
            return api_error(StatusCode::UNAUTHORIZED, "invalid Login", "");
        }
        (
            StatusCode::NO_CONTENT,
            [(header::SET_COOKIE, format!("token={SESSION}; Path=/; HttpOnly"))],
        )
            .into_response()
    }

    async fn mock_status(
        State(mock): State<Arc<MockConsole>>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        if !has_session(&headers) {
            return api_error(StatusCode::FORBIDDEN, "Access Denied", "no valid session cookie");
        }

        let entity_value = query.get("entityValue").map(String::as_str);
        if entity_value == Some("forbidden-bucket") {
            return api_error(
                StatusCode::FORBIDDEN,
                "Access Denied",
                "bucket policy denies access",
            );
        }
        if mock.slow_status.load(Ordering::Relaxed) && matches!(entity_value, None | Some("mybucket"))
        {
            sleep(Duration::from_millis(300)).await;
        }

        let sites = json!({
            "dep-a": { "name": "site-a", "deploymentID": "dep-a" },
            "dep-b": { "name": "site-b", "deploymentID": "dep-b" },
        });

        let Some(entity_type) = query.get("entityType") else {
            return Json(json!({
                "enabled": true,
                "maxBuckets": 12,
                "maxUsers": 4,
                "maxGroups": 2,
                "maxPolicies": 7,
                "bucketStats": {
                    "photos": {
                        "dep-a": { "HasBucket": true, "PolicyMismatch": true },
                        "dep-b": { "HasBucket": true },
                    }
                },
                "userStats": null,
                "sites": sites,
            }))
            .into_response();
        };

        let value = query.get("entityValue").cloned().unwrap_or_default();
        let bucket_stats = if entity_type == "bucket" && value == "mybucket" {
            json!({
                "mybucket": {
                    "dep-a": { "HasBucket": true, "HasTagsSet": true },
                    "dep-b": { "HasBucket": true, "HasTagsSet": true, "TagMismatch": true },
                }
            })
        } else {
            json!({})
        };

        Json(json!({
            "enabled": true,
            "bucketStats": bucket_stats,
            "sites": sites,
        }))
        .into_response()
    }

    async fn mock_info() -> Json<serde_json::Value> {
        Json(json!({
            "enabled": true,
            "name": "replication-group",
            "serviceAccountAccessKey": "site-replicator-0",
            "sites": [
                { "deploymentID": "dep-a", "endpoint": "https://a.example.net:9000", "name": "site-a" },
                { "deploymentID": "dep-b", "endpoint": "https://b.example.net:9000", "name": "site-b" },
            ],
        }))
    }

    async fn mock_trace(
        ws: WebSocketUpgrade,
        State(mock): State<Arc<MockConsole>>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        mock.trace_queries.lock().await.push(query);
        ws.on_upgrade(move |socket| serve_trace(socket, mock))
    }

    async fn serve_trace(mut socket: WebSocket, mock: Arc<MockConsole>) {
        let calls = [
            ("s3.GetObject", 200),
            ("s3.PutObject", 200),
            ("s3.HeadObject", 404),
        ];
        for (api, status_code) in calls {
            let message = json!({
                "time": "2026-10-16T09:30:00Z",
                "client": "10.0.0.7",
                "host": "site-a:9000",
                "api": api,
                "path": "/photos/cat.png",
                "statusCode": status_code,
                "callStats": { "rx": 0, "tx": 512, "duration": "1.2ms" },
            });
            if socket
                .send(Message::Text(message.to_string().into()))
                .await
                .is_err()
            {
                return;
            }
        }

        while let Some(Ok(frame)) = socket.recv().await {
            if let Message::Close(frame) = frame {
                let code = frame.map(|frame| frame.code).unwrap_or_default();
                mock.trace_close_codes.lock().await.push(code);
                break;
            }
        }
    }

    async fn mock_heal(
        ws: WebSocketUpgrade,
        State(mock): State<Arc<MockConsole>>,
        Path(bucket): Path<String>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        mock.heal_requests.lock().await.push((bucket, query));
        ws.on_upgrade(move |socket| serve_heal(socket, mock))
    }

    /// Waits for the client greeting, reports two rounds of progress, then
    /// ends the sequence by closing.
    async fn serve_heal(mut socket: WebSocket, mock: Arc<MockConsole>) {
        let greeting = match socket.recv().await {
            Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
            other => format!("unexpected first frame: {other:?}"),
        };
        let greeted = greeting == "ok";
        mock.heal_greetings.lock().await.push(greeting);
        if !greeted {
            return;
        }

        for (scanned, healed) in [(10, 2), (25, 5)] {
            let status = json!({
                "healDuration": 1.5,
                "itemsScanned": scanned,
                "objectsHealed": healed,
                "healthBeforeCols": { "Yellow": healed },
                "healthAfterCols": { "Green": healed },
            });
            if socket
                .send(Message::Text(status.to_string().into()))
                .await
                .is_err()
            {
                return;
            }
        }
        let _ = socket.send(Message::Close(None)).await;
    }

    async fn cli_output(args: &[&str]) -> Result<Output> {
        let cli_bin = binary_path("cli-client")?;
        Command::new(cli_bin)
            .args(args)
            .env_remove("CONSOLE_SESSION_TOKEN")
            .output()
            .await
            .context("failed to execute cli-client")
    }

    async fn run_cli(args: &[&str]) -> Result<String> {
        let output = cli_output(args).await?;

        if !output.status.success() {
            bail!(
                "cli-client failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn start_cli_web(bind: &str, server_url: &str) -> Result<Child> {
        let cli_bin = binary_path("cli-client")?;

        let child = Command::new(cli_bin)
            .arg("--server-url")
            .arg(server_url)
            .arg("--token")
            .arg(SESSION)
            .arg("serve-web")
            .arg("--bind")
            .arg(bind)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("failed to spawn cli-client serve-web")?;

        wait_for_url_status(&format!("http://{bind}/api/ping"), StatusCode::OK, 40).await?;
        Ok(child)
    }

    async fn wait_for_url_status(url: &str, expected: StatusCode, retries: usize) -> Result<()> {
        let http = reqwest::Client::new();

        for _ in 0..retries {
            if let Ok(resp) = http.get(url).send().await
                && resp.status() == expected
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }

        bail!("service did not return {expected} at {url}");
    }

    async fn stop_server(child: &mut Child) {
        let _ = child.kill().await;
        let _ = child.wait().await;
    }

    fn binary_path(name: &str) -> Result<PathBuf> {
        let workspace_root = workspace_root()?;
        ensure_binaries_built(&workspace_root)?;
        let mut path = workspace_root.join("target").join("debug").join(name);

        if let Some(suffix) = std::env::consts::EXE_SUFFIX.strip_prefix('.') {
            let mut filename = OsString::from(name);
            filename.push(".");
            filename.push(suffix);
            path = workspace_root.join("target").join("debug").join(filename);
        }

        if !path.exists() {
            bail!("expected binary does not exist: {}", path.display());
        }

        Ok(path)
    }

    fn workspace_root() -> Result<PathBuf> {
        let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        crate_dir
            .parent()
            .and_then(|p| p.parent())
            .map(PathBuf::from)
            .context("failed to resolve workspace root")
    }

    fn build_required_binaries(workspace_root: &PathBuf) -> Result<()> {
        let status = std::process::Command::new("cargo")
            .arg("build")
            .arg("-p")
            .arg("cli-client")
            .current_dir(workspace_root)
            .status()
            .context("failed to run cargo build for system test binaries")?;

        if !status.success() {
            bail!("cargo build for system test binaries failed");
        }

        Ok(())
    }

    fn ensure_binaries_built(workspace_root: &PathBuf) -> Result<()> {
        static BUILD_RESULT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

        let result = BUILD_RESULT.get_or_init(|| {
            build_required_binaries(workspace_root).map_err(|err| err.to_string())
        });

        if let Err(message) = result {
            bail!("failed to build required binaries: {message}");
        }

        Ok(())
    }
}
