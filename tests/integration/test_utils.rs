//! Test utilities for integration tests.
//!
//! This module provides helpers for writing synthetic z-stacks to disk and
//! inspecting the files an export produces. [`MockHttpServer`] stands in for
//! a remote catalog API.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{GrayImage, Luma, Rgb, RgbImage};

use subject_stacker::stack::{Frame, ImageStack};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;

// =============================================================================
// Synthetic Stacks
// =============================================================================

/// Pixel value used for slice `z` in the synthetic gray stacks.
pub fn slice_value(z: usize) -> u8 {
    (10 + z * 20).min(255) as u8
}

/// Build an in-memory gray stack where every pixel of slice `z` is
/// [`slice_value`]`(z)`.
pub fn gray_stack(len: usize, width: u32, height: u32) -> ImageStack {
    let frames = (0..len)
        .map(|z| Frame::Gray(GrayImage::from_pixel(width, height, Luma([slice_value(z)]))))
        .collect();
    ImageStack::new(frames).unwrap()
}

/// Write a gray PNG stack into `dir` as `{prefix}_{z:04}.png`.
pub fn write_gray_stack(dir: &Path, prefix: &str, len: usize, width: u32, height: u32) {
    std::fs::create_dir_all(dir).unwrap();
    for z in 0..len {
        let img = GrayImage::from_pixel(width, height, Luma([slice_value(z)]));
        img.save(dir.join(format!("{}_{:04}.png", prefix, z))).unwrap();
    }
}

/// Write an RGB PNG stack into `dir` with a gradient pattern.
pub fn write_rgb_stack(dir: &Path, prefix: &str, len: usize, width: u32, height: u32) {
    std::fs::create_dir_all(dir).unwrap();
    for z in 0..len {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, slice_value(z)])
        });
        img.save(dir.join(format!("{}_{:04}.png", prefix, z))).unwrap();
    }
}

// =============================================================================
// Output Inspection
// =============================================================================

/// All files under `root`, as sorted paths relative to `root`.
pub fn relative_files(root: &Path) -> Vec<PathBuf> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                out.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }

    let mut files = Vec::new();
    walk(root, root, &mut files);
    files.sort();
    files
}

/// Immediate sub-directory names of `root`, sorted.
pub fn dir_names(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Check if data is a valid JPEG.
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }

    // Check SOI marker
    if data[0] != 0xFF || data[1] != 0xD8 {
        return false;
    }

    // Check EOI marker at end
    if data[data.len() - 2] != 0xFF || data[data.len() - 1] != 0xD9 {
        return false;
    }

    image::load_from_memory_with_format(data, image::ImageFormat::Jpeg).is_ok()
}

/// Mean luma of a JPEG file, for checking slice identity through lossy encoding.
pub fn mean_luma(path: &Path) -> f64 {
    let img = image::open(path).unwrap().to_luma8();
    let sum: u64 = img.pixels().map(|p| p.0[0] as u64).sum();
    sum as f64 / (img.width() as u64 * img.height() as u64) as f64
}

// =============================================================================
// Mock HTTP Server
// =============================================================================

/// A request captured by [`MockHttpServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,

    /// Header names are lower-cased
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Minimal HTTP/1.1 server answering one canned response per connection.
pub struct MockHttpServer {
    listener: tokio::net::TcpListener,
}

impl MockHttpServer {
    pub async fn bind() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self { listener }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.listener.local_addr().unwrap())
    }

    /// Answer the next `responses.len()` requests in order, recording each.
    pub fn serve(self, responses: Vec<(u16, String)>) -> Arc<Mutex<Vec<RecordedRequest>>> {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut stream, _) = self.listener.accept().await.unwrap();
                let request = read_request(&mut stream).await;
                recorded.lock().await.push(request);

                let response = format!(
                    "HTTP/1.1 {} Mock\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
        });

        requests
    }
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> RecordedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before request headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap().split_whitespace();
    let method = request_line.next().unwrap().to_string();
    let path = request_line.next().unwrap().to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let content_length: usize = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .map(|(_, v)| v.parse().unwrap())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before request body");
        buf.extend_from_slice(&chunk[..n]);
    }

    RecordedRequest {
        method,
        path,
        headers,
        body: buf[header_end..header_end + content_length].to_vec(),
    }
}
