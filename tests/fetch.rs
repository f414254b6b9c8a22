//! Fetch-path tests against a local mock server: keyed collection
//! construction and the response-failure classification.

use std::net::SocketAddr;

use anyhow::Result;
use url::Url;
use warp::Filter;

use freeagent_rs::{Client, Credentials, DataFormat, Endpoint, Error};

const PROJECTS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<projects type="array">
  <project>
    <id type="integer">25922</id>
    <name>Wordpress Migration</name>
    <currency>USD</currency>
    <status>Active</status>
  </project>
  <project>
    <id type="integer">25923</id>
    <name>Retainer</name>
    <status>Inactive</status>
  </project>
</projects>"#;

const PROJECTS_JSON: &str = r#"{
  "projects": [
    {"id": 25922, "name": "Wordpress Migration", "status": "Active"},
    {"id": 25923, "name": "Retainer", "status": "Inactive"}
  ]
}"#;

const PDF_BODY: &str = "%PDF-1.4 not really a document";

fn serve<F>(filter: F) -> SocketAddr
where
    F: Filter<Error = warp::Rejection> + Clone + Send + Sync + 'static,
    F::Extract: warp::Reply,
{
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let (addr, server) = warp::serve(filter).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn test_client(addr: SocketAddr) -> Client {
    let base = Url::parse(&format!("http://{addr}/")).unwrap();
    Client::with_base_url(base, Credentials::basic("user@example.com", "secret"))
}

fn xml_reply(body: &'static str) -> impl warp::Reply {
    warp::reply::with_header(body, "content-type", "application/xml; charset=utf-8")
}

#[tokio::test]
async fn keyed_fetch_builds_an_id_map() -> Result<()> {
    let filter = warp::path("projects")
        .and(warp::get())
        .map(|| xml_reply(PROJECTS_XML));
    let client = test_client(serve(filter));

    let projects = client.get_keyed(Endpoint::Projects, "project").await?;
    assert_eq!(projects.len(), 2);
    assert_eq!(
        projects.get("25922").unwrap().get("name"),
        Some("Wordpress Migration")
    );
    assert_eq!(projects.get("25923").unwrap().get("name"), Some("Retainer"));

    let typed = client.projects().list().await?;
    assert_eq!(typed["25923"].status.as_deref(), Some("Inactive"));
    Ok(())
}

#[tokio::test]
async fn unauthorized_is_an_authentication_error() {
    let filter = warp::path("projects").map(|| {
        warp::reply::with_status("Access denied", warp::http::StatusCode::UNAUTHORIZED)
    });
    let client = test_client(serve(filter));

    match client.projects().list().await {
        Err(Error::Authentication { status, .. }) => assert_eq!(status.as_u16(), 401),
        other => panic!("expected an authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn forbidden_is_an_authentication_error() {
    let filter = warp::path("projects")
        .map(|| warp::reply::with_status("Forbidden", warp::http::StatusCode::FORBIDDEN));
    let client = test_client(serve(filter));

    match client.projects().list().await {
        Err(Error::Authentication { status, .. }) => assert_eq!(status.as_u16(), 403),
        other => panic!("expected an authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn html_content_type_is_a_response_format_error() {
    let filter = warp::path("projects").map(|| {
        warp::reply::with_header(
            "<html><body>marketing site</body></html>",
            "content-type",
            "text/html; charset=utf-8",
        )
    });
    let client = test_client(serve(filter));

    match client.projects().list().await {
        Err(Error::ResponseFormat {
            expected,
            content_type,
            ..
        }) => {
            assert_eq!(expected, "application/xml");
            assert!(content_type.starts_with("text/html"));
        }
        other => panic!("expected a response format error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_generic_response_errors() {
    let filter = warp::path("projects").map(|| {
        warp::reply::with_status(
            "It's not you, it's us",
            warp::http::StatusCode::INTERNAL_SERVER_ERROR,
        )
    });
    let client = test_client(serve(filter));

    match client.projects().list().await {
        Err(Error::Response { status, body, .. }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body.as_deref(), Some("It's not you, it's us"));
        }
        other => panic!("expected a generic response error, got {other:?}"),
    }
}

#[tokio::test]
async fn invoice_pdf_bytes_pass_through_unmodified() -> Result<()> {
    let filter = warp::path("invoices")
        .and(warp::path("1924153.pdf"))
        .map(|| warp::reply::with_header(PDF_BODY, "content-type", "application/pdf"));
    let client = test_client(serve(filter));

    let bytes = client.invoices().pdf(1_924_153).await?;
    assert_eq!(bytes, PDF_BODY.as_bytes());
    Ok(())
}

#[tokio::test]
async fn json_mode_parses_collections_too() -> Result<()> {
    let filter = warp::path("projects")
        .map(|| warp::reply::with_header(PROJECTS_JSON, "content-type", "application/json"));
    let client = test_client(serve(filter)).data_format(DataFormat::Json);

    let projects = client.projects().list().await?;
    assert_eq!(projects.len(), 2);
    assert_eq!(projects["25922"].name, "Wordpress Migration");
    Ok(())
}
