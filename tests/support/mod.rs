//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a `GET` route answering with `status` and `body`.
pub async fn mount_bytes(server: &MockServer, route: &str, status: u16, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Mounts an HTML page linking to each of `links`.
pub async fn mount_page(server: &MockServer, route: &str, links: &[String]) {
    let anchors: String = links
        .iter()
        .map(|link| format!("<li><a href=\"{link}\">{link}</a></li>\n"))
        .collect();
    let html = format!("<html><body><ul>\n{anchors}</ul></body></html>");
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string(html),
        )
        .mount(server)
        .await;
}
