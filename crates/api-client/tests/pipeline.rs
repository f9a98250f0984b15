//! End-to-end pipeline tests against a mock HTTP server
//!
//! These run the real `reqwest` transport with the default middleware, so
//! they cover header injection, envelope unwrapping and session handling as
//! the backend sees them.

use iweekly_api_client::endpoints::user::LoginRequest;
use iweekly_api_client::middleware::{
    request_with_retry, CacheConfig, RetryPolicy, TtlCache, SESSION_EXPIRED_MESSAGE,
};
use iweekly_api_client::platform::{MemoryTokenStore, Navigator, Notifier, Toast, TokenStore};
use iweekly_api_client::prelude::*;
use iweekly_api_client::UploadOptions;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Records every UI effect in order
#[derive(Default)]
struct Host {
    events: Mutex<Vec<String>>,
}

impl Host {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn toasts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("toast:").map(str::to_string))
            .collect()
    }
}

impl Notifier for Host {
    fn toast(&self, toast: &Toast) {
        self.events.lock().unwrap().push(format!("toast:{}", toast.title));
    }

    fn show_loading(&self, _title: &str) {
        self.events.lock().unwrap().push("show".to_string());
    }

    fn hide_loading(&self) {
        self.events.lock().unwrap().push("hide".to_string());
    }
}

impl Navigator for Host {
    fn navigate_to(&self, route: &str) {
        self.events.lock().unwrap().push(format!("navigate:{route}"));
    }
}

struct Fixture {
    server: MockServer,
    client: ApiClient,
    host: Arc<Host>,
    tokens: Arc<MemoryTokenStore>,
}

async fn fixture(token: Option<&str>) -> Fixture {
    let server = MockServer::builder().start().await;
    let host = Arc::new(Host::default());
    let tokens = Arc::new(match token {
        Some(token) => MemoryTokenStore::with_token(token),
        None => MemoryTokenStore::new(),
    });

    let platform = Platform::default()
        .with_tokens(tokens.clone())
        .with_notifier(host.clone())
        .with_navigator(host.clone());

    let client = ApiClient::builder(ClientConfig::default().with_base_url(server.uri()))
        .platform(platform)
        .with_default_middleware()
        .login_route("/pages/login/login")
        .build()
        .unwrap();

    Fixture {
        server,
        client,
        host,
        tokens,
    }
}

#[tokio::test]
async fn test_login_unwraps_envelope_without_token() {
    let f = fixture(None).await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"username": "ada", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {"token": "t-1", "user": {"id": 7, "nickName": "Ada"}}
        })))
        .expect(1)
        .mount(&f.server)
        .await;

    let login = f
        .client
        .users()
        .login(&LoginRequest {
            username: "ada".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(login.token, "t-1");
    let user = login.user.unwrap();
    assert_eq!(user.nickname.as_deref(), Some("Ada"));

    // public path: no Authorization header and no login prompt
    let requests = f.server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
    assert_eq!(f.host.events(), vec!["show", "hide"]);
}

#[tokio::test]
async fn test_protected_endpoint_sends_bearer_token() {
    let f = fixture(Some("t-42")).await;

    Mock::given(method("GET"))
        .and(path("/user/info"))
        .and(header("Authorization", "Bearer t-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {"id": 42, "nickname": "Grace", "avatarUrl": "https://img.test/g.png"}
        })))
        .expect(1)
        .mount(&f.server)
        .await;

    let user = f.client.users().get_user_info().await.unwrap();
    assert_eq!(user.id, json!(42));
    assert_eq!(user.avatar.as_deref(), Some("https://img.test/g.png"));
}

#[tokio::test]
async fn test_bare_brand_list_passes_through() {
    let f = fixture(None).await;

    Mock::given(method("GET"))
        .and(path("/home/brand"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Apple", "logoUrl": "https://img.test/apple.png"},
            {"id": "hw", "name": "Huawei"}
        ])))
        .mount(&f.server)
        .await;

    let brands = f.client.common().get_brands().await.unwrap();
    assert_eq!(brands.len(), 2);
    assert_eq!(brands[0].logo.as_deref(), Some("https://img.test/apple.png"));
    assert_eq!(brands[1].id, json!("hw"));
    assert!(f.host.toasts().is_empty());
}

#[tokio::test]
async fn test_business_error_rejects_with_server_message() {
    let f = fixture(Some("t")).await;

    Mock::given(method("POST"))
        .and(path("/order/create"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 500, "msg": "Out of stock"})),
        )
        .mount(&f.server)
        .await;

    let err = f
        .client
        .post::<Value, _>("/order/create", &json!({"sku": 1}))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Business { code: Some(500), .. }));
    assert_eq!(err.to_string(), "Out of stock");
    assert_eq!(f.host.toasts(), vec!["Out of stock"]);
}

#[tokio::test]
async fn test_unauthorized_ends_session() {
    let f = fixture(Some("stale")).await;

    Mock::given(method("GET"))
        .and(path("/user/info"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&f.server)
        .await;

    let err = f.client.users().get_user_info().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(f.tokens.token(), None);
    assert_eq!(
        f.host.events(),
        vec![
            "show".to_string(),
            format!("toast:{SESSION_EXPIRED_MESSAGE}"),
            "navigate:/pages/login/login".to_string(),
            "hide".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_get_params_become_query_string() {
    let f = fixture(Some("t")).await;

    Mock::given(method("GET"))
        .and(path("/phone/list"))
        .and(query_param("page", "2"))
        .and(query_param("brand", "apple"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 200, "data": {"list": []}})),
        )
        .expect(1)
        .mount(&f.server)
        .await;

    let page: Value = f
        .client
        .get_with("/phone/list", &json!({"page": 2, "brand": "apple", "model": null}))
        .await
        .unwrap();
    assert_eq!(page, json!({"list": []}));

    let requests = f.server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
    assert!(!requests[0].url.query().unwrap_or_default().contains("model"));
}

#[tokio::test]
async fn test_stored_headers_and_timeout_apply() {
    let f = fixture(Some("t")).await;
    f.client.set_headers(HashMap::from([(
        "X-Client".to_string(),
        "mini-program".to_string(),
    )]));
    f.client.set_timeout(Duration::from_millis(200));

    Mock::given(method("GET"))
        .and(path("/slow"))
        .and(header("X-Client", "mini-program"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "data": 1}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&f.server)
        .await;

    let err = f.client.get::<Value>("/slow").await.unwrap_err();

    assert!(matches!(err, ApiError::Network { timeout: true, .. }));
    assert_eq!(f.host.toasts(), vec!["Request timed out"]);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let f = fixture(None).await;
    let uri = f.server.uri();
    drop(f.server);
    f.client.set_base_url(uri);

    let err = f.client.common().get_brands().await.unwrap_err();

    assert_eq!(err.status(), Some(-1));
    assert_eq!(f.host.toasts(), vec!["Network connection failed"]);
    assert_eq!(f.host.events().last().map(String::as_str), Some("toast:Network connection failed"));
}

#[tokio::test]
async fn test_upload_sends_multipart_form() {
    let f = fixture(Some("t")).await;

    Mock::given(method("POST"))
        .and(path("/upload/image"))
        .and(header_exists("content-type"))
        .and(|request: &Request| {
            let body = String::from_utf8_lossy(&request.body);
            body.contains("name=\"image\"")
                && body.contains("filename=\"photo.jpg\"")
                && body.contains("fake-jpeg")
                && body.contains("name=\"album\"")
        })
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"url": "https://img.test/photo.jpg"})),
        )
        .expect(1)
        .mount(&f.server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("photo.jpg");
    std::fs::File::create(&file_path)
        .unwrap()
        .write_all(b"fake-jpeg")
        .unwrap();

    let response = f
        .client
        .upload(
            "/upload/image",
            &file_path,
            HashMap::from([("album".to_string(), "trade-in".to_string())]),
            UploadOptions {
                name: Some("image".to_string()),
                ..UploadOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({"url": "https://img.test/photo.jpg"}));

    let requests = f.server.received_requests().await.unwrap();
    let content_type = requests[0].headers["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn test_upload_rejects_non_json_body() {
    let f = fixture(None).await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&f.server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("a.txt");
    std::fs::write(&file_path, "hello").unwrap();

    let err = f
        .client
        .upload("/upload", &file_path, HashMap::new(), UploadOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Json(_)));
}

#[tokio::test]
async fn test_retry_recovers_from_transient_failure() {
    let f = fixture(None).await;

    Mock::given(method("GET"))
        .and(path("/home/brand"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&f.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/home/brand"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "Apple"}])))
        .with_priority(2)
        .mount(&f.server)
        .await;

    let policy = RetryPolicy::default().with_base_delay(Duration::from_millis(5));
    let api = f.client.common();
    let brands = request_with_retry(&policy, |_| api.get_brands())
        .await
        .unwrap();

    assert_eq!(brands[0].name, "Apple");
    assert_eq!(f.server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_cached_brands_hit_server_once() {
    let f = fixture(None).await;

    Mock::given(method("GET"))
        .and(path("/home/brand"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "Apple"}])))
        .expect(1)
        .mount(&f.server)
        .await;

    let cache = TtlCache::new(CacheConfig::default());
    let api = f.client.common();
    for _ in 0..3 {
        let brands = cache
            .get_with("brands", None, || api.get_brands())
            .await
            .unwrap();
        assert_eq!(brands.len(), 1);
    }
}
