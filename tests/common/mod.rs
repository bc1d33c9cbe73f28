#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use flickr_viewer::config::Config;
use image::{DynamicImage, ImageFormat, RgbImage};
use parking_lot::Mutex;
use tokio::net::TcpListener;

pub struct StubResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl StubResponse {
    pub fn xml(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/xml; charset=utf-8",
            body: body.as_bytes().to_vec(),
            delay: Duration::from_millis(0),
        }
    }
    pub fn bytes(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "image/jpeg",
            body,
            delay: Duration::from_millis(0),
        }
    }
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: b"nope".to_vec(),
            delay: Duration::from_millis(0),
        }
    }
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Local server answering every request through `handler`
pub struct StubServer {
    pub addr: SocketAddr,
    /// request targets, path plus query, in arrival order
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn config(&self) -> Config {
        let endpoint = self.url("/services/rest/");
        let template = self.url("/{server}/{id}_{secret}.jpg");
        Config::from_lookup(|name| match name {
            "FLICKR_API_KEY" => Some("test-key".to_owned()),
            "FLICKR_ENDPOINT" => Some(endpoint.clone()),
            "FLICKR_IMAGE_TEMPLATE" => Some(template.clone()),
            _ => None,
        })
        .unwrap()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

type Handler = Arc<dyn Fn(&str) -> StubResponse + Send + Sync>;

#[derive(Clone)]
struct StubState {
    handler: Handler,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn respond(State(state): State<StubState>, uri: Uri) -> impl IntoResponse {
    let target = uri
        .path_and_query()
        .map(|target| target.as_str().to_owned())
        .unwrap_or_else(|| uri.path().to_owned());
    state.requests.lock().push(target.clone());

    let response = (state.handler)(&target);
    tokio::time::sleep(response.delay).await;
    let status = StatusCode::from_u16(response.status).unwrap();
    (status, [(CONTENT_TYPE, response.content_type)], response.body)
}

pub async fn serve<F>(handler: F) -> StubServer
where
    F: Fn(&str) -> StubResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(respond).with_state(StubState {
        handler: Arc::new(handler),
        requests: Arc::clone(&requests),
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubServer { addr, requests }
}

pub fn photo_xml(id: &str, title: &str) -> String {
    format!(
        r#"<photo id="{}" owner="12345@N00" secret="s{}" server="7" farm="8" title="{}" ispublic="1" isfriend="0" isfamily="0" />"#,
        id, id, title
    )
}

pub fn search_response(photos: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<rsp stat="ok">
<photos page="1" pages="1" perpage="500" total="{}">
{}
</photos>
</rsp>"#,
        photos.len(),
        photos.join("\n")
    )
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200])));
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}
