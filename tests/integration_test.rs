use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use steam_review_insight::clients::{ReviewSource, SteamClient};
use steam_review_insight::error::ApiError;
use steam_review_insight::services::storage;
use steam_review_insight::{ClassifyJob, Config, FetchJob, StopReason};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

type Responder = dyn Fn(usize, &str) -> (u16, String) + Send + Sync;

/// 状态码为 0 时连接保持打开但永不响应
const HANG: u16 = 0;

/// 本地评论接口桩，返回 (base_url, 请求行记录)
async fn spawn_server(respond: Arc<Responder>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };

            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }

            let request = String::from_utf8_lossy(&buf).to_string();
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let cursor = query_value(&request_line, "cursor").unwrap_or_default();

            let index = {
                let mut log = log.lock().unwrap();
                log.push(request_line);
                log.len() - 1
            };

            let (status, body) = respond(index, &cursor);
            if status == HANG {
                tokio::spawn(async move {
                    let _socket = socket;
                    std::future::pending::<()>().await;
                });
                continue;
            }
            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}/appreviews", addr), requests)
}

/// 从 `GET /path?a=1&b=2 HTTP/1.1` 中取查询参数
fn query_value(request_line: &str, key: &str) -> Option<String> {
    let target = request_line.split_whitespace().nth(1)?;
    let query = target.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.replace("%2A", "*"))
    })
}

fn review(id: &str, text: &str, voted_up: bool, language: &str) -> Value {
    json!({
        "recommendationid": id,
        "review": text,
        "voted_up": voted_up,
        "votes_up": 3,
        "votes_funny": 0,
        "language": language,
        "timestamp_created": 1_700_000_000,
        "steam_purchase": true,
        "author": {"steamid": "7656", "num_games_owned": 12, "playtime_forever": 600}
    })
}

/// 三页数据：首页 2 条，第二页 1 条新 + 1 条重复，第三页为空
fn three_page_responder() -> Arc<Responder> {
    Arc::new(|_: usize, cursor: &str| {
        let body = match cursor {
            "*" => json!({
                "success": 1,
                "cursor": "page2",
                "query_summary": {
                    "total_reviews": 10,
                    "total_positive": 7,
                    "total_negative": 3,
                    "review_score_desc": "特别好评"
                },
                "reviews": [
                    review("1", "画面很好，剧情也不错", true, "schinese"),
                    review(
                        "2",
                        "经常崩溃，还有卡顿。游戏启动后十分钟就闪退了，无法正常游玩",
                        false,
                        "schinese"
                    ),
                ]
            }),
            "page2" => json!({
                "success": 1,
                "cursor": "page3",
                "reviews": [
                    review("2", "重复", false, "schinese"),
                    review("3", "Price is too high", false, "english"),
                ]
            }),
            _ => json!({"success": 1, "cursor": "page4", "reviews": []}),
        };
        (200, body.to_string())
    })
}

/// 首页 2 条（总数 10），之后的请求交给 `later`
fn first_page_then<F>(later: F) -> Arc<Responder>
where
    F: Fn(usize) -> (u16, String) + Send + Sync + 'static,
{
    Arc::new(move |index: usize, cursor: &str| {
        if cursor == "*" {
            let body = json!({
                "success": 1,
                "cursor": "page2",
                "query_summary": {"total_reviews": 10, "total_positive": 5, "total_negative": 5},
                "reviews": [
                    review("1", "还不错，可以", true, "schinese"),
                    review("2", "经常闪退", false, "schinese"),
                ]
            });
            (200, body.to_string())
        } else {
            later(index)
        }
    })
}

fn test_config(base_url: &str, output_dir: &Path) -> Config {
    Config {
        app_id: "570".to_string(),
        base_url: base_url.to_string(),
        output_dir: output_dir.display().to_string(),
        delay: 0.0,
        retry_delay: 0.01,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_fetch_then_classify() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, requests) = spawn_server(three_page_responder()).await;
    let config = test_config(&base_url, dir.path());

    let job = FetchJob::new(config.clone(), None);
    let report = assert_ok!(job.run(&CancellationToken::new()).await).expect("应该写出结果");

    assert_eq!(report.stats.fetched, 3);
    assert_eq!(report.stats.positive, 1);
    assert_eq!(report.stop_reason, StopReason::EmptyPage);

    // 请求按游标链推进，且携带固定查询参数
    {
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].starts_with("GET /appreviews/570?"));
        assert_eq!(query_value(&requests[0], "json").as_deref(), Some("1"));
        assert_eq!(query_value(&requests[0], "num_per_page").as_deref(), Some("100"));
        assert_eq!(query_value(&requests[0], "cursor").as_deref(), Some("*"));
        assert_eq!(query_value(&requests[1], "cursor").as_deref(), Some("page2"));
        assert_eq!(query_value(&requests[2], "cursor").as_deref(), Some("page3"));
    }

    let saved = assert_ok!(storage::load_fetch_output(&report.json_path).await);
    assert_eq!(saved.app_id, "570");
    assert_eq!(saved.total_fetched, 3);
    assert_eq!(saved.query_summary.total_reviews, 10);
    assert_eq!(saved.query_summary.score_desc(), "特别好评");
    let ids: Vec<_> = saved.reviews.iter().filter_map(|r| r.id()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    let csv_path = report.csv_path.expect("默认导出 CSV");
    let csv = std::fs::read_to_string(csv_path).unwrap();
    assert!(csv.starts_with('\u{feff}'));
    assert!(csv.contains("author_num_games_owned"));

    let summary = assert_ok!(ClassifyJob::new(dir.path()).run().await).expect("应该找到抓取结果");
    assert_eq!(summary.total, 3);
    assert_eq!(summary.positive, 1);
    assert_eq!(summary.negative, 2);
    assert!(summary
        .issue_counts
        .iter()
        .any(|(name, count)| name == "技术问题" && *count == 1));

    let classified: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(storage::CLASSIFIED_JSON)).unwrap(),
    )
    .unwrap();
    assert_eq!(classified["summary"]["总评论数"], json!(3));
    assert_eq!(classified["reviews"][0]["ID"], json!(1));
    assert!(dir.path().join(storage::CLASSIFIED_CSV).exists());
}

#[tokio::test]
async fn test_cli_app_id_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, requests) = spawn_server(three_page_responder()).await;
    let config = test_config(&base_url, dir.path());

    let job = FetchJob::new(config, Some("730".to_string()));
    assert_eq!(job.app_id(), "730");
    let report = assert_ok!(job.run(&CancellationToken::new()).await).unwrap();

    assert!(requests.lock().unwrap()[0].starts_with("GET /appreviews/730?"));
    let name = report.json_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("reviews_730_"));
}

#[tokio::test]
async fn test_rejected_first_page_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, requests) =
        spawn_server(Arc::new(|_: usize, _: &str| (200, json!({"success": 2}).to_string()))).await;
    let config = test_config(&base_url, dir.path());

    let client = SteamClient::new(&config, "570").unwrap();
    match client.fetch_page("*").await {
        Err(ApiError::Rejected { payload }) => assert_eq!(payload, json!({"success": 2})),
        other => panic!("应该返回 Rejected，实际: {:?}", other.map(|p| p.reviews.len())),
    }
    assert_eq!(requests.lock().unwrap().len(), 1);

    // 首页失败时任务报错，不写任何文件
    assert_err!(FetchJob::new(config, None).run(&CancellationToken::new()).await);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, requests) = spawn_server(Arc::new(|index: usize, _: &str| {
        if index == 0 {
            (500, "{}".to_string())
        } else {
            let body = json!({
                "success": 1,
                "cursor": "next",
                "reviews": [review("9", "ok", true, "english")]
            });
            (200, body.to_string())
        }
    }))
    .await;
    let config = test_config(&base_url, dir.path());

    let client = SteamClient::new(&config, "570").unwrap();
    let page = assert_ok!(client.fetch_page("*").await);
    assert_eq!(page.reviews.len(), 1);
    assert_eq!(requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cancelled_before_start_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, requests) = spawn_server(three_page_responder()).await;
    let config = test_config(&base_url, &dir.path().join("out"));

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = assert_ok!(FetchJob::new(config, None).run(&cancel).await);

    assert!(report.is_none());
    assert!(requests.lock().unwrap().is_empty());
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_classify_without_data_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let summary = assert_ok!(ClassifyJob::new(dir.path().join("missing")).run().await);
    assert!(summary.is_none());
}

#[tokio::test]
async fn test_mid_run_failure_saves_partial_result() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, requests) =
        spawn_server(first_page_then(|_| (500, "{}".to_string()))).await;
    let config = test_config(&base_url, dir.path());

    let report = assert_ok!(FetchJob::new(config, None).run(&CancellationToken::new()).await)
        .expect("首页之后的失败应该保留已获取部分");

    assert!(matches!(report.stop_reason, StopReason::Failed(_)));
    assert_eq!(report.stats.fetched, 2);
    // 首页 1 次 + 第二页 3 次尝试
    assert_eq!(requests.lock().unwrap().len(), 4);

    assert!(report.json_path.exists());
    let saved = assert_ok!(storage::load_fetch_output(&report.json_path).await);
    assert_eq!(saved.total_fetched, 2);
    assert_eq!(saved.query_summary.total_reviews, 10);
    assert!(report.csv_path.is_some_and(|path| path.exists()));
}

#[tokio::test]
async fn test_cancel_during_request_saves_partial_result() {
    let dir = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    // 第二页请求到达后才取消，此时客户端正在等待响应
    let (base_url, requests) = spawn_server(first_page_then(move |_| {
        trigger.cancel();
        (HANG, String::new())
    }))
    .await;
    let config = test_config(&base_url, dir.path());

    let report = assert_ok!(FetchJob::new(config, None).run(&cancel).await)
        .expect("中断后应该保存已获取部分");

    assert_eq!(report.stop_reason, StopReason::Cancelled);
    assert_eq!(requests.lock().unwrap().len(), 2);

    let saved = assert_ok!(storage::load_fetch_output(&report.json_path).await);
    assert_eq!(saved.total_fetched, 2);
    let ids: Vec<_> = saved.reviews.iter().filter_map(|r| r.id()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}
