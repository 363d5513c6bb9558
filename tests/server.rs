//! End-to-end tests for the HTTP server: start it on a free port and drive
//! it with a real client.

use std::sync::Arc;
use tempfile::TempDir;

use reaction_board::board::Board;
use reaction_board::config::Config;
use reaction_board::context::BoardContext;
use reaction_board::ingest::{CsvLayout, HttpCsvLoader, PostLoader};
use reaction_board::models::Post;
use reaction_board::report::{MemoryReporter, Severity};
use reaction_board::server;

// ─── Helpers ────────────────────────────────────────────────────────

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

/// Serve `body` with `status` at `/posts.csv`; returns the feed URL.
async fn serve_feed(status: axum::http::StatusCode, body: &'static str) -> String {
    let port = find_free_port();
    let app = axum::Router::new().route(
        "/posts.csv",
        axum::routing::get(move || async move { (status, body) }),
    );
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}/posts.csv", port)
}

fn http_loader(url: String, reporter: Arc<MemoryReporter>) -> HttpCsvLoader {
    HttpCsvLoader::new(
        url,
        std::time::Duration::from_secs(5),
        CsvLayout {
            image_root: "https://img.test/".to_string(),
            has_headers: false,
        },
        reporter,
    )
}

fn post(id: i64, title: &str, likes: i64) -> Post {
    Post {
        id,
        title: title.to_string(),
        url: format!("https://t.co/{}", id),
        image: format!("https://img.test/{}.gif", id),
        likes,
    }
}

fn test_config(port: u16) -> Config {
    let mut cfg = Config::minimal();
    cfg.server.bind = format!("127.0.0.1:{}", port);
    cfg.server.host = "https://reaction.test".to_string();
    cfg.search.max_results = 2;
    cfg
}

/// Serve a ready board; returns the base URL, the reporter and the task.
async fn start_with_posts(
    posts: Vec<Post>,
) -> (String, Arc<MemoryReporter>, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let reporter = Arc::new(MemoryReporter::new());
    let ctx = BoardContext::new(
        test_config(port),
        Arc::new(Board::new(posts)),
        reporter.clone(),
    )
    .unwrap();

    let handle = tokio::spawn(async move {
        server::serve(ctx).await.unwrap();
    });
    wait_for_server(port).await;
    (format!("http://127.0.0.1:{}", port), reporter, handle)
}

fn sample_posts() -> Vec<Post> {
    vec![
        post(1, "Happy Dog Reacts", 40),
        post(4, "Surprised dog", 12),
        post(2, "Sad dog", 5),
        post(3, "When the cat sees you", 0),
    ]
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_board_state() {
    let (base, _, handle) = start_with_posts(sample_posts()).await;

    let body: serde_json::Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["board"]["state"], "ready");
    assert_eq!(body["board"]["posts"], 4);

    handle.abort();
}

#[tokio::test]
async fn test_search_endpoint() {
    let (base, _, handle) = start_with_posts(sample_posts()).await;

    let resp = reqwest::Client::new()
        .get(format!("{}/search?query=dog", base))
        .header("origin", "https://elsewhere.test")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    let page: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(page["offset"], 0);
    assert_eq!(page["totalResults"], 4);
    let data = page["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["title"], "Happy Dog Reacts");
    assert_eq!(data[0]["internalURL"], "/post/1/happy-dog-reacts");

    // malformed offset means 0
    let page: serde_json::Value = reqwest::get(format!("{}/search?query=dog&offset=abc", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["offset"], 0);

    let page: serde_json::Value = reqwest::get(format!("{}/search?query=dog&offset=3", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["offset"], 3);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);

    handle.abort();
}

#[tokio::test]
async fn test_search_without_query_sorted_by_likes() {
    let (base, _, handle) = start_with_posts(sample_posts()).await;

    let page: serde_json::Value = reqwest::get(format!("{}/search", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["totalResults"], 4);
    let likes: Vec<i64> = page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["likes"].as_i64().unwrap())
        .collect();
    assert_eq!(likes.len(), 2);
    assert!(likes[0] >= likes[1]);

    handle.abort();
}

#[tokio::test]
async fn test_postdata_found_and_missing() {
    let (base, reporter, handle) = start_with_posts(sample_posts()).await;

    let resp = reqwest::get(format!("{}/postdata/2", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let page: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(page["offset"], 0);
    assert_eq!(page["totalResults"], 1);
    assert_eq!(page["data"][0]["title"], "Sad dog");

    let resp = reqwest::get(format!("{}/postdata/99", base)).await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");

    let resp = reqwest::get(format!("{}/postdata/abc", base)).await.unwrap();
    assert_eq!(resp.status(), 404);

    let events = reporter.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.severity == Severity::Warning));
    assert_eq!(events[0].message, "cannot find post");
    assert_eq!(events[1].message, "cannot parse post id");

    handle.abort();
}

#[tokio::test]
async fn test_stats_and_sitemap() {
    let (base, _, handle) = start_with_posts(sample_posts()).await;

    let stats: serde_json::Value = reqwest::get(format!("{}/stats.json", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["postCount"], "4");
    assert_eq!(stats["keywords"][0], "dog");

    let resp = reqwest::get(format!("{}/sitemap.xml", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "application/xml"
    );
    let xml = resp.text().await.unwrap();
    assert!(xml.contains("<loc>https://reaction.test/</loc>"));
    assert!(xml.contains("<loc>https://reaction.test/post/3/when-the-cat-sees-you</loc>"));

    handle.abort();
}

#[tokio::test]
async fn test_background_population_from_feed() {
    let tmp = TempDir::new().unwrap();
    let feed = tmp.path().join("posts.csv");
    std::fs::write(
        &feed,
        "1,Low,https://t.co/1,a.gif,1\n2,High,https://t.co/2,b.gif,9\n",
    )
    .unwrap();

    let port = find_free_port();
    let mut cfg = test_config(port);
    cfg.feed.path = Some(feed);

    let ctx = BoardContext::start(&cfg).await.unwrap();
    let board = ctx.board.clone();
    let handle = tokio::spawn(async move {
        server::serve(ctx).await.unwrap();
    });
    wait_for_server(port).await;

    // requests issued during the load wait for it
    let page: serde_json::Value = reqwest::get(format!("http://127.0.0.1:{}/search?query=high", port))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["totalResults"], 2);
    assert_eq!(page["data"][0]["title"], "High");

    board.wait_ready().await;
    assert_eq!(board.len().await, 2);

    handle.abort();
}

#[tokio::test]
async fn test_http_loader_fetches_and_parses_feed() {
    let url = serve_feed(
        axum::http::StatusCode::OK,
        "1,Happy Dog,https://t.co/1,dog.gif,40\n2,\"Cat, judging\",https://t.co/2,cat.gif,oops\n",
    )
    .await;
    let reporter = Arc::new(MemoryReporter::new());
    let loader = http_loader(url.clone(), reporter.clone());
    assert_eq!(loader.name(), url);

    let posts = loader.load().await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "Happy Dog");
    assert_eq!(posts[0].image, "https://img.test/dog.gif");
    assert_eq!(posts[0].likes, 40);
    assert_eq!(posts[1].title, "Cat, judging");
    assert_eq!(posts[1].likes, 0);

    let events = reporter.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message, "cannot parse likes");
}

#[tokio::test]
async fn test_http_loader_server_error_fails() {
    let url = serve_feed(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
    let reporter = Arc::new(MemoryReporter::new());
    let loader = http_loader(url, reporter.clone());

    assert!(loader.load().await.is_err());
    assert!(reporter.is_empty());
}
