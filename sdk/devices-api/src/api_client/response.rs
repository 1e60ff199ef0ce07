use common::HttpStatusCode;

use reqwest::header::HeaderMap;

/// Undecoded response, as read off the wire.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: HttpStatusCode,
    pub reason: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(Self {
            status: HttpStatusCode(status.as_u16()),
            reason: status.canonical_reason().map(str::to_string),
            headers,
            body,
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Decoded result together with the status and headers it arrived with.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: HttpStatusCode,
    pub headers: HeaderMap,
    pub data: T,
}
