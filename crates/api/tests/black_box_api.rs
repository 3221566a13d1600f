use reqwest::StatusCode;
use serde_json::{Value, json};

use coffees_api::app::{AppServices, build_app};
use coffees_infra::config::AppConfig;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(AppConfig::default()).await
    }

    async fn spawn_with(config: AppConfig) -> Self {
        // Same router as prod, in-memory stores, ephemeral port.
        let app = build_app(&config, AppServices::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_coffee(&self, body: Value) -> Value {
        let res = self
            .client
            .post(self.url("/coffees"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["data"].clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn flavor_names(coffee: &Value) -> Vec<String> {
    coffee["flavors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_is_wrapped_in_data() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["backend"], "in_memory");
}

#[tokio::test]
async fn create_returns_201_with_zero_recommendations() {
    let srv = TestServer::spawn().await;

    let coffee = srv
        .create_coffee(json!({
            "name": "Shipwreck Roast",
            "brand": "Buddy Brew",
            "flavors": ["item1", "item2", "item1"],
        }))
        .await;

    assert_eq!(coffee["name"], "Shipwreck Roast");
    assert_eq!(coffee["brand"], "Buddy Brew");
    assert_eq!(coffee["recommendations"], 0);
    assert_eq!(flavor_names(&coffee), vec!["item1", "item2"]);
    assert!(coffee["id"].as_str().is_some());
}

#[tokio::test]
async fn coffee_lifecycle_get_patch_list_delete() {
    let srv = TestServer::spawn().await;
    let created = srv
        .create_coffee(json!({ "name": "Latte", "brand": "X", "flavors": ["vanilla"] }))
        .await;
    let id = created["id"].as_str().unwrap();

    let res = srv
        .client
        .get(srv.url(&format!("/coffees/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"], created);

    let res = srv
        .client
        .patch(srv.url(&format!("/coffees/{id}")))
        .json(&json!({ "brand": "Nescafe", "flavors": ["caramel"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Latte");
    assert_eq!(body["data"]["brand"], "Nescafe");
    assert_eq!(flavor_names(&body["data"]), vec!["caramel"]);

    let res = srv
        .client
        .get(srv.url("/coffees?limit=5&offset=0"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let res = srv
        .client
        .delete(srv.url(&format!("/coffees/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .get(srv.url(&format!("/coffees/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn list_pages_in_creation_order() {
    let srv = TestServer::spawn().await;
    for i in 0..12 {
        srv.create_coffee(json!({ "name": format!("c{i}"), "brand": "b", "flavors": [] }))
            .await;
    }

    let body: Value = srv
        .client
        .get(srv.url("/coffees"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 10);

    let body: Value = srv
        .client
        .get(srv.url("/coffees?limit=3&offset=10"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["c10", "c11"]);
}

#[tokio::test]
async fn malformed_requests_are_400() {
    let srv = TestServer::spawn().await;

    // Missing brand.
    let res = srv
        .client
        .post(srv.url("/coffees"))
        .json(&json!({ "name": "Latte", "flavors": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unknown field.
    let res = srv
        .client
        .post(srv.url("/coffees"))
        .json(&json!({ "name": "Latte", "brand": "X", "flavors": [], "price": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");

    // Blank name passes JSON decoding but fails validation.
    let res = srv
        .client
        .post(srv.url("/coffees"))
        .json(&json!({ "name": "  ", "brand": "X", "flavors": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = srv
        .client
        .get(srv.url("/coffees/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn recommend_increments_and_records_event() {
    let srv = TestServer::spawn().await;
    let coffee = srv
        .create_coffee(json!({ "name": "Latte", "brand": "X", "flavors": ["vanilla"] }))
        .await;
    let id = coffee["id"].as_str().unwrap();

    let res = srv
        .client
        .post(srv.url(&format!("/coffees/{id}/recommend")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["coffee"]["recommendations"], 1);
    let event = &body["data"]["event"];
    assert_eq!(event["type"], "coffee");
    assert_eq!(event["name"], "recommend_coffee");
    assert_eq!(event["payload"], json!({ "coffeeId": id }));

    let res = srv
        .client
        .get(srv.url("/events?name=recommend_coffee&type=coffee"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let events = body["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(&events[0], event);

    let event_id = event["id"].as_str().unwrap();
    let res = srv
        .client
        .get(srv.url(&format!("/events/{event_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .get(srv.url(&format!("/coffees/{id}")))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["recommendations"], 1);
}

#[tokio::test]
async fn recommend_unknown_coffee_is_404_and_writes_nothing() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/coffees/0190b3a4-0000-7000-8000-000000000000/recommend"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = srv
        .client
        .get(srv.url("/events?name=recommend_coffee&type=coffee"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn events_lookup_requires_name_and_type() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .get(srv.url("/events?name=recommend_coffee"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn api_key_guards_everything_but_public_routes() {
    let srv = TestServer::spawn_with(AppConfig {
        api_key: Some("secret".to_string()),
        ..AppConfig::default()
    })
    .await;

    let res = srv.client.get(srv.url("/coffees")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = json!({ "name": "Latte", "brand": "X", "flavors": [] });
    let res = srv
        .client
        .post(srv.url("/coffees"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "unauthorized");

    let res = srv
        .client
        .post(srv.url("/coffees"))
        .header("Authorization", "wrong")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .post(srv.url("/coffees"))
        .header("Authorization", "secret")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["data"]["id"].as_str().unwrap();

    let res = srv
        .client
        .get(srv.url(&format!("/coffees/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
