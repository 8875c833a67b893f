use std::time::Duration;

use dolarhoy_page::{Document, Error, HttpRenderer, RenderOptions, Renderer};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUOTES_PAGE: &str = r#"<!DOCTYPE html>
<html lang="es">
<head><title>DolarHoy</title><script>var x = "Compra 9.999";</script></head>
<body>
  <div class="tile">
    <span class="title">Dólar blue</span>
    <div class="compra">Compra <b>$1.420,00</b></div>
    <div class="venta">Venta <b>$1.460,00</b></div>
  </div>
  <div style="display: none">oculto</div>
</body>
</html>"#;

fn renderer(timeout: Duration) -> HttpRenderer {
    HttpRenderer::new(RenderOptions {
        navigation_timeout: timeout,
        ..RenderOptions::default()
    })
}

#[tokio::test]
async fn renders_server_side_quotes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("accept-language", "es-AR,es;q=0.9,en;q=0.8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTES_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let root = renderer(Duration::from_secs(5))
        .render(&format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    let doc = Document::new(&root);
    let text = doc.body().text_content();
    assert!(text.contains("Dólar blue"));
    assert!(!text.contains("9.999"));

    let hidden = doc
        .elements()
        .find(|el| el.text_content() == "oculto")
        .unwrap();
    assert!(!hidden.is_visible());
}

#[tokio::test]
async fn server_error_is_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let err = renderer(Duration::from_secs(5))
        .render(&mock_server.uri())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503 }));
}

#[tokio::test]
async fn page_without_quotes_fails_condition() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>Cargando...</p></body></html>"),
        )
        .mount(&mock_server)
        .await;

    let err = renderer(Duration::from_secs(5))
        .render(&mock_server.uri())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConditionNotMet));
}

#[tokio::test]
async fn slow_site_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(QUOTES_PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let err = renderer(Duration::from_millis(200))
        .render(&mock_server.uri())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { stage: "navigation", .. }));
}

#[tokio::test]
async fn invalid_url_is_config_error() {
    let err = renderer(Duration::from_secs(1))
        .render("not a url")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn configured_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "dolarhoy-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTES_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let renderer = HttpRenderer::new(RenderOptions {
        user_agent: Some("dolarhoy-test/1.0".into()),
        ..RenderOptions::default()
    });
    renderer.render(&mock_server.uri()).await.unwrap();
}

#[tokio::test]
async fn unset_user_agent_rotates_through_pool() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTES_PAGE))
        .mount(&mock_server)
        .await;

    let renderer = renderer(Duration::from_secs(5));
    for _ in 0..3 {
        renderer.render(&mock_server.uri()).await.unwrap();
    }

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    for request in requests {
        let agent = request.headers.get("user-agent").unwrap().to_str().unwrap();
        assert!(agent.starts_with("Mozilla/5.0"));
        assert!(agent.contains("Chrome/120"));
    }
}
