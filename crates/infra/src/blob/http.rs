use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;

use crate::blob::BlobStore;
use crate::error::BlobError;

/// Object storage reached over plain HTTP.
///
/// Objects are written with `PUT <endpoint>/<bucket>/<key>` and removed with
/// `DELETE` on the same path. Public URLs are `<public_url>/<bucket>/<key>`,
/// where `public_url` defaults to the endpoint.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
    public_url: String,
}

impl HttpBlobStore {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            public_url: endpoint.clone(),
            endpoint,
            bucket: bucket.into().trim_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base of the URLs handed back to callers (e.g. a CDN in front of the bucket).
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = public_url.into().trim_end_matches('/').to_string();
        self
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key.trim_start_matches('/'))
    }

    fn public_prefix(&self) -> String {
        format!("{}/{}/", self.public_url, self.bucket)
    }

    /// Key of a public URL produced by this store.
    fn key_of<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.public_prefix()).filter(|k| !k.is_empty())
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        let url = self.object_url(key);
        let response = self
            .request(reqwest::Method::PUT, &url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BlobError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        tracing::debug!(%url, "uploaded blob");
        Ok(format!("{}{}", self.public_prefix(), key.trim_start_matches('/')))
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        let key = self
            .key_of(url)
            .ok_or_else(|| BlobError::ForeignUrl(url.to_string()))?;
        let target = self.object_url(key);
        let response = self.request(reqwest::Method::DELETE, &target).send().await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            tracing::debug!(url = %target, "deleted blob");
            Ok(())
        } else {
            Err(BlobError::Status {
                status: status.as_u16(),
                url: target,
            })
        }
    }

    fn owns(&self, url: &str) -> bool {
        self.key_of(url).is_some()
    }
}
