//! Mock listing, album page and image fixtures

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Publish timestamp used by every fixture album
pub const FIXTURE_DATETIME: &str = "2018-06-24 10:31:02";

/// Date directory matching [`FIXTURE_DATETIME`]
pub const FIXTURE_DATE_DIR: &str = "2018-06-24";

/// A listing entry pointing at album `id` on the mock server
pub fn album_entry(server: &MockServer, id: u64, title: &str) -> serde_json::Value {
    json!({
        "article_url": format!("{}/group/{}/", server.uri(), id),
        "title": title,
        "datetime": FIXTURE_DATETIME,
        "media_name": "Photo Desk",
        "abstract": "",
        "comment_count": 0,
    })
}

/// Album page embedding a gallery the way real pages do
pub fn album_page(image_urls: &[String]) -> String {
    let sub_images: Vec<_> = image_urls
        .iter()
        .map(|url| json!({ "url": url, "width": 640, "height": 960 }))
        .collect();
    let gallery = json!({ "count": image_urls.len(), "sub_images": sub_images }).to_string();
    let literal = serde_json::to_string(&gallery).unwrap();
    format!(
        r#"<!DOCTYPE html><html><head><script>
var BASE_DATA = {{
    galleryInfo: {{
        title: 'album',
        gallery: JSON.parse({}),
        siblingList: []
    }}
}};
</script></head><body></body></html>"#,
        literal
    )
}

/// Serve `entries` as the listing page at `offset`
pub async fn mount_listing(server: &MockServer, offset: u32, entries: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/search_content/"))
        .and(query_param("offset", offset.to_string()))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": entries.len(),
            "has_more": 1,
            "data": entries,
        })))
        .mount(server)
        .await;
}

/// Serve album `id` listing the given image paths (relative to the server)
pub async fn mount_album_page(server: &MockServer, id: u64, image_paths: &[String]) {
    let urls: Vec<String> = image_paths
        .iter()
        .map(|p| format!("{}{}", server.uri(), p))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/group/{}/", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(album_page(&urls)))
        .mount(server)
        .await;
}

/// Serve album `id` as a plain article with no gallery
pub async fn mount_plain_page(server: &MockServer, id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/group/{}/", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>text only</p></body></html>"),
        )
        .mount(server)
        .await;
}

/// Serve `bytes` at `image_path`, expecting exactly `expected_fetches` requests
pub async fn mount_image(server: &MockServer, image_path: &str, bytes: &[u8], expected_fetches: u64) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(bytes.to_vec()),
        )
        .expect(expected_fetches)
        .mount(server)
        .await;
}
