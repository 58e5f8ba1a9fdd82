//! [`ContentSource`] implementation for the REST management API client.

use async_trait::async_trait;
use std::path::Path;

use cms_client::error::ClientError;
use cms_client::types::{ContentType, Entry};
use cms_client::CmsClient;

use crate::error::{SourceError, SourceResult};
use crate::traits::ContentSource;

fn source_error(error: ClientError) -> SourceError {
    match error {
        ClientError::Io(io) => SourceError::Io(io),
        other => SourceError::Http(Box::new(other)),
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn content_types(&self) -> SourceResult<Vec<ContentType>> {
        CmsClient::content_types(self).await.map_err(source_error)
    }

    async fn components(&self) -> SourceResult<Vec<ContentType>> {
        CmsClient::components(self).await.map_err(source_error)
    }

    async fn collection_entries(&self, endpoint: &str, page_size: usize) -> SourceResult<Vec<Entry>> {
        self.entries(endpoint, page_size).await.map_err(source_error)
    }

    async fn singleton_entry(&self, endpoint: &str) -> SourceResult<Entry> {
        self.singleton(endpoint).await.map_err(source_error)
    }

    async fn download_asset(&self, url: &str, dest: &Path) -> SourceResult<()> {
        self.download(url, dest).await.map_err(source_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_failures_keep_their_kind_through_the_source_seam() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(
            source_error(ClientError::Io(io)),
            SourceError::Io(_)
        ));

        let api = ClientError::Api {
            status: 403,
            message: "Forbidden".to_string(),
        };
        assert!(matches!(source_error(api), SourceError::Http(_)));
    }
}
