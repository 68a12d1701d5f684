//! End-to-end tests for the prompt, saliency and synthesis bridges.
//!
//! wiremock stands in for the chat-completions and synthesis services.

mod common;

use common::TestServer;
use reqwest::StatusCode;
use scrapbook_server::routes::{ImageReply, PromptResponse};
use scrapbook_server::ServerConfig;
use serde_json::json;
use tiny_skia::{Color, Pixmap};
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut pixmap = Pixmap::new(width, height).expect("pixmap");
    pixmap.fill(Color::from_rgba8(200, 100, 50, 255));
    pixmap.encode_png().expect("png")
}

fn config(mock: &MockServer) -> ServerConfig {
    ServerConfig {
        openai_api_key: Some("sk-test".into()),
        prompt_url: format!("{}/v1/chat/completions", mock.uri()),
        synthesis_url: Some(format!("{}/synthesize", mock.uri())),
        ..ServerConfig::default()
    }
}

async fn add_captioned_layer(client: &reqwest::Client, server: &TestServer, caption: &str) {
    let response = client
        .post(server.url("/api/layers"))
        .body(png(40, 40))
        .send()
        .await
        .expect("upload");
    assert_eq!(response.status(), StatusCode::CREATED);
    client
        .put(server.url("/api/layers/1/caption"))
        .json(&json!({ "caption": caption }))
        .send()
        .await
        .expect("caption");
}

#[tokio::test]
async fn test_prompt_sends_description_and_returns_reply() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(bearer_token("sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "A red apple sits in the middle." } }]
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let server = TestServer::start(config(&mock)).await;
    let client = reqwest::Client::new();
    add_captioned_layer(&client, &server, "a big round apple").await;

    let reply: PromptResponse = client
        .post(server.url("/api/prompt"))
        .send()
        .await
        .expect("prompt")
        .json()
        .await
        .expect("json");
    assert_eq!(reply.prompt, "A red apple sits in the middle.");

    let requests = mock.received_requests().await.expect("requests");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json");
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(
        body["messages"][1]["content"],
        "Image Data:\nImage ID: 1, X: 300, Y: 200, Caption: \"a big round apple\", Z-Index: 0"
    );

    server.shutdown().await;
}

#[tokio::test]
async fn test_prompt_failure_yields_placeholder() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock)
        .await;

    let server = TestServer::start(config(&mock)).await;
    let client = reqwest::Client::new();
    add_captioned_layer(&client, &server, "cat").await;

    let reply: PromptResponse = client
        .post(server.url("/api/prompt"))
        .send()
        .await
        .expect("prompt")
        .json()
        .await
        .expect("json");
    assert_eq!(reply.prompt, "Error generating prompt");

    // The scene is untouched by the failure.
    let text = client
        .get(server.url("/api/description"))
        .send()
        .await
        .expect("description")
        .text()
        .await
        .expect("text");
    assert!(text.contains("Caption: \"cat\""));

    server.shutdown().await;
}

#[tokio::test]
async fn test_prompt_without_key_yields_placeholder() {
    let server = TestServer::start(ServerConfig::default()).await;
    let reply: PromptResponse = reqwest::Client::new()
        .post(server.url("/api/prompt"))
        .send()
        .await
        .expect("prompt")
        .json()
        .await
        .expect("json");
    assert_eq!(reply.prompt, "Error generating prompt");
    server.shutdown().await;
}

#[tokio::test]
async fn test_synthesis_round_trip() {
    let mock = MockServer::start().await;
    let produced = png(8, 8);
    let encoded = {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&produced)
    };
    Mock::given(method("POST"))
        .and(path("/synthesize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "image": encoded })))
        .expect(1)
        .mount(&mock)
        .await;

    let server = TestServer::start(config(&mock)).await;
    let client = reqwest::Client::new();
    add_captioned_layer(&client, &server, "cat").await;

    let response = client
        .post(server.url("/api/synthesize"))
        .json(&json!({ "prompt": "a cat on a sofa" }))
        .send()
        .await
        .expect("synthesize");
    assert_eq!(response.status(), StatusCode::OK);
    let reply: ImageReply = response.json().await.expect("json");
    assert_eq!(
        reply,
        ImageReply::Image {
            image: format!("data:image/png;base64,{encoded}")
        }
    );

    // The service received the prompt and an overlay-free 600x400 snapshot.
    let requests = mock.received_requests().await.expect("requests");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json");
    assert_eq!(body["prompt"], "a cat on a sofa");
    let snapshot = {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(body["image"].as_str().expect("image"))
            .expect("base64")
    };
    let decoded = scrapbook_renderer::load_raster(&snapshot).expect("decode");
    assert_eq!(decoded.natural_size().width(), 600);

    server.shutdown().await;
}

#[tokio::test]
async fn test_synthesis_unconfigured() {
    let server = TestServer::start(ServerConfig::default()).await;
    let response = reqwest::Client::new()
        .post(server.url("/api/synthesize"))
        .json(&json!({ "prompt": "anything" }))
        .send()
        .await
        .expect("synthesize");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let reply: ImageReply = response.json().await.expect("json");
    assert_eq!(
        reply,
        ImageReply::Error {
            error: "synthesis unavailable".into()
        }
    );
    server.shutdown().await;
}

#[tokio::test]
async fn test_saliency_is_greyscale() {
    let server = TestServer::start(ServerConfig::default()).await;
    let client = reqwest::Client::new();
    add_captioned_layer(&client, &server, "block").await;

    let reply: ImageReply = client
        .post(server.url("/api/saliency"))
        .send()
        .await
        .expect("saliency")
        .json()
        .await
        .expect("json");
    let ImageReply::Image { image } = reply else {
        panic!("saliency failed");
    };
    let map = scrapbook_renderer::load_raster_from_data_uri(&image).expect("decode");
    let p = map.pixmap().pixel(300, 200).expect("pixel");
    assert_eq!(p.red(), p.green());
    assert_eq!(p.green(), p.blue());

    server.shutdown().await;
}
