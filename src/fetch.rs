use std::sync::Arc;

use thiserror::Error;

use crate::resource::BlobReader;

/// Credential policy for cross-origin requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossOrigin {
    /// No cookies or credentials are sent; safe for any CDN.
    #[default]
    Anonymous,
    UseCredentials,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0} is not a live temporary handle")]
    RevokedHandle(String),
    #[error("request for {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[cfg(not(target_arch = "wasm32"))]
    #[error("cannot read {path}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported source {0}")]
    Unsupported(String),
}

/// Resolves a source reference to its raw bytes.
#[derive(Clone)]
pub struct Fetcher {
    blobs: BlobReader,
    client: reqwest::Client,
    cross_origin: CrossOrigin,
}

impl Fetcher {
    pub fn new(blobs: BlobReader) -> Self {
        Self {
            blobs,
            client: reqwest::Client::new(),
            cross_origin: CrossOrigin::Anonymous,
        }
    }

    pub fn with_cross_origin(mut self, cross_origin: CrossOrigin) -> Self {
        self.cross_origin = cross_origin;
        self
    }

    pub fn cross_origin(&self) -> CrossOrigin {
        self.cross_origin
    }

    pub async fn fetch(&self, url: &str) -> Result<Arc<[u8]>, FetchError> {
        if url.starts_with("blob:") {
            return self
                .blobs
                .read(url)
                .ok_or_else(|| FetchError::RevokedHandle(url.to_string()));
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return self.fetch_http(url).await;
        }
        self.fetch_file(url).await
    }

    async fn fetch_http(&self, url: &str) -> Result<Arc<[u8]>, FetchError> {
        let http_err = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };
        let request = self.client.get(url);
        #[cfg(target_arch = "wasm32")]
        let request = match self.cross_origin {
            CrossOrigin::Anonymous => request.fetch_credentials_omit(),
            CrossOrigin::UseCredentials => request.fetch_credentials_include(),
        };
        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?;
        let bytes = response.bytes().await.map_err(http_err)?;
        log::debug!("fetched {} bytes from {url}", bytes.len());
        Ok(Arc::from(bytes.as_ref()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn fetch_file(&self, url: &str) -> Result<Arc<[u8]>, FetchError> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        let path = path.split('#').next().unwrap_or(path);
        tokio::fs::read(path)
            .await
            .map(Arc::from)
            .map_err(|source| FetchError::File {
                path: path.to_string(),
                source,
            })
    }

    #[cfg(target_arch = "wasm32")]
    async fn fetch_file(&self, url: &str) -> Result<Arc<[u8]>, FetchError> {
        Err(FetchError::Unsupported(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{LocalFile, ResourceStore};

    #[tokio::test]
    async fn blob_is_read_from_store() {
        let store = ResourceStore::new();
        let handle = store
            .create_handle(&LocalFile::in_memory("a.hdr", vec![9, 8]))
            .unwrap();
        let fetcher = Fetcher::new(store.reader());
        assert_eq!(&*fetcher.fetch(handle.as_str()).await.unwrap(), &[9, 8]);

        store.release_handle(&handle);
        assert!(matches!(
            fetcher.fetch(handle.as_str()).await,
            Err(FetchError::RevokedHandle(_))
        ));
    }

    #[tokio::test]
    async fn local_path_and_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sky.hdr");
        std::fs::write(&path, b"abc").unwrap();
        let fetcher = Fetcher::new(ResourceStore::new().reader());

        let plain = path.to_str().unwrap().to_string();
        assert_eq!(&*fetcher.fetch(&plain).await.unwrap(), b"abc");
        let url = format!("file://{plain}");
        assert_eq!(&*fetcher.fetch(&url).await.unwrap(), b"abc");

        let missing = dir.path().join("nope.exr");
        assert!(matches!(
            fetcher.fetch(missing.to_str().unwrap()).await,
            Err(FetchError::File { .. })
        ));
    }

    #[test]
    fn anonymous_by_default() {
        let fetcher = Fetcher::new(BlobReader::default());
        assert_eq!(fetcher.cross_origin(), CrossOrigin::Anonymous);
    }
}
