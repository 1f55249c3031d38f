use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{DownloadError, FilesystemError, ItemError};
use crate::feed::FeedItem;
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};

use super::filename::destination_path;
use super::tag::write_tags;

/// Download an item's audio and write its tags, returning the saved path
///
/// A file whose download or tagging fails part way is left in place.
pub async fn download_and_tag<C: HttpClient>(
    client: &C,
    item: &FeedItem,
    destination_dir: &Path,
    reporter: &SharedProgressReporter,
) -> Result<PathBuf, ItemError> {
    let path = destination_path(item, destination_dir);

    download_audio(client, item, &path, reporter).await?;
    write_tags(client, item, &path).await?;

    reporter.report(ProgressEvent::TagsWritten {
        track_num: item.track_num(),
        path: path.clone(),
    });

    Ok(path)
}

/// Stream an item's audio to the specified output path
///
/// The file is only created once the server has answered with a success
/// status. Returns the number of bytes written.
pub async fn download_audio<C: HttpClient>(
    client: &C,
    item: &FeedItem,
    output_path: &Path,
    reporter: &SharedProgressReporter,
) -> Result<u64, ItemError> {
    let url = item.audio_url().as_str();

    info!("Downloading {url} to {}", output_path.display());

    let response = client
        .get_stream(url)
        .await
        .map_err(|e| DownloadError::HttpFailed {
            url: url.to_string(),
            source: e,
        })?;

    // Treat anything other than 2xx as failure
    if !(200..300).contains(&response.status) {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        }
        .into());
    }

    reporter.report(ProgressEvent::DownloadStarting {
        track_num: item.track_num(),
        total_tracks: item.total_tracks(),
        url: url.to_string(),
        destination: output_path.to_path_buf(),
        content_length: response.content_length,
    });

    let mut file =
        File::create(output_path)
            .await
            .map_err(|e| FilesystemError::FileCreateFailed {
                path: output_path.to_path_buf(),
                source: e,
            })?;

    let mut bytes_downloaded: u64 = 0;
    let mut stream = response.body;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::StreamFailed {
            url: url.to_string(),
            source: e,
        })?;

        file.write_all(&chunk)
            .await
            .map_err(|e| FilesystemError::FileWriteFailed {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        bytes_downloaded += chunk.len() as u64;

        reporter.report(ProgressEvent::DownloadProgress {
            track_num: item.track_num(),
            bytes_downloaded,
            total_bytes: response.content_length,
        });
    }

    // Ensure all data is flushed to disk before lofty reopens the file
    file.flush()
        .await
        .map_err(|e| FilesystemError::FileWriteFailed {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    reporter.report(ProgressEvent::DownloadCompleted {
        track_num: item.track_num(),
        bytes_downloaded,
    });

    Ok(bytes_downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{ByteStream, BytesResponse, HttpResponse};
    use crate::progress::NoopReporter;
    use async_trait::async_trait;
    use bytes::Bytes;
    use tempfile::tempdir;
    use url::Url;

    struct MockHttpClient {
        chunks: Vec<&'static [u8]>,
        status: u16,
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get_bytes(&self, _url: &str) -> Result<BytesResponse, reqwest::Error> {
            Ok(BytesResponse {
                status: self.status,
                body: Bytes::from(self.chunks.concat()),
            })
        }

        async fn get_stream(&self, _url: &str) -> Result<HttpResponse, reqwest::Error> {
            let chunks: Vec<Result<Bytes, reqwest::Error>> = self
                .chunks
                .iter()
                .copied()
                .map(|chunk| Ok(Bytes::from_static(chunk)))
                .collect();
            let len: u64 = chunks.iter().flatten().map(|c| c.len() as u64).sum();

            let stream: ByteStream = Box::pin(futures::stream::iter(chunks));

            Ok(HttpResponse {
                status: self.status,
                content_length: Some(len),
                body: stream,
            })
        }
    }

    fn make_item() -> FeedItem {
        FeedItem::new(
            "PR.03.04.23",
            Url::parse("https://example.com/episode.mp3").unwrap(),
            None,
            "X",
            "Show",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn download_writes_all_chunks() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("episode.mp3");

        let client = MockHttpClient {
            chunks: vec![
                b"test ".as_slice(),
                b"audio ".as_slice(),
                b"content".as_slice(),
            ],
            status: 200,
        };
        let reporter = NoopReporter::shared();

        let bytes = download_audio(&client, &make_item(), &output_path, &reporter)
            .await
            .unwrap();

        assert_eq!(bytes, 18);
        let content = std::fs::read(&output_path).unwrap();
        assert_eq!(content, b"test audio content");
    }

    #[tokio::test]
    async fn download_fails_on_http_error_without_creating_file() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("episode.mp3");

        let client = MockHttpClient {
            chunks: vec![b"Not Found".as_slice()],
            status: 404,
        };
        let reporter = NoopReporter::shared();

        let result = download_audio(&client, &make_item(), &output_path, &reporter).await;

        match result {
            Err(ItemError::Download(DownloadError::HttpStatus { status, url })) => {
                assert_eq!(status, 404);
                assert_eq!(url, "https://example.com/episode.mp3");
            }
            other => panic!("Expected HttpStatus error, got {other:?}"),
        }
        assert!(!output_path.exists());
    }

    #[tokio::test]
    async fn download_reports_missing_directory() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("missing").join("episode.mp3");

        let client = MockHttpClient {
            chunks: vec![b"audio".as_slice()],
            status: 200,
        };
        let reporter = NoopReporter::shared();

        let result = download_audio(&client, &make_item(), &output_path, &reporter).await;

        assert!(matches!(
            result,
            Err(ItemError::Filesystem(FilesystemError::FileCreateFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn tagging_failure_leaves_downloaded_file() {
        let dir = tempdir().unwrap();

        let client = MockHttpClient {
            chunks: vec![b"this is not an mp3 stream".as_slice()],
            status: 200,
        };
        let reporter = NoopReporter::shared();
        let item = make_item();

        let result = download_and_tag(&client, &item, dir.path(), &reporter).await;

        assert!(matches!(result, Err(ItemError::Tag(_))));
        assert!(destination_path(&item, dir.path()).exists());
    }
}
