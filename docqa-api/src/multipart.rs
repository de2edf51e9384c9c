//! Multipart body construction with streaming progress accounting

use crate::error::{ApiError, ApiResult};
use crate::progress::ProgressTracker;
use bytes::Bytes;
use futures::stream::{self, Stream};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Form field every file is attached under
pub const FILES_FIELD: &str = "files";

/// Buffer size for streaming reads (64KB)
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Body stream of one file part
pub type PartStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync>>;

/// Where the bytes of an upload file come from
pub enum UploadData {
    /// A file on disk, streamed at send time
    Path(PathBuf),
    /// Bytes already in memory
    Bytes(Bytes),
    /// An arbitrary stream; `len` is `None` when the size is not known up front
    Stream {
        stream: PartStream,
        len: Option<u64>,
    },
}

impl std::fmt::Debug for UploadData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadData::Path(path) => f.debug_tuple("Path").field(path).finish(),
            UploadData::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            UploadData::Stream { len, .. } => f.debug_struct("Stream").field("len", len).finish(),
        }
    }
}

/// One file of an upload batch
#[derive(Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub data: UploadData,
}

impl UploadFile {
    /// Upload a file from disk; the form file name is the path's last component
    pub fn from_path(path: impl Into<PathBuf>, content_type: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            file_name,
            content_type: content_type.into(),
            data: UploadData::Path(path),
        }
    }

    /// Upload in-memory bytes
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: UploadData::Bytes(bytes.into()),
        }
    }

    /// Upload from a stream of unknown or known length
    pub fn from_stream(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        stream: PartStream,
        len: Option<u64>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: UploadData::Stream { stream, len },
        }
    }
}

/// A part body opened and sized, ready to be wrapped for progress
struct OpenedPart {
    file_name: String,
    content_type: String,
    len: Option<u64>,
    stream: PartStream,
}

async fn open_part(file: UploadFile) -> ApiResult<OpenedPart> {
    let UploadFile {
        file_name,
        content_type,
        data,
    } = file;

    let (len, stream) = match data {
        UploadData::Path(path) => {
            let (len, stream) = open_path(&path).await.map_err(|source| ApiError::FileRead {
                path: path.clone(),
                source,
            })?;
            (Some(len), stream)
        }
        UploadData::Bytes(bytes) => {
            let len = bytes.len() as u64;
            (Some(len), bytes_stream(bytes))
        }
        UploadData::Stream { stream, len } => (len, stream),
    };

    Ok(OpenedPart {
        file_name,
        content_type,
        len,
        stream,
    })
}

async fn open_path(path: &Path) -> io::Result<(u64, PartStream)> {
    let file = File::open(path).await?;
    let len = file.metadata().await?.len();
    let stream = Box::pin(ReaderStream::with_capacity(file, STREAM_BUFFER_SIZE));
    Ok((len, stream))
}

fn bytes_stream(bytes: Bytes) -> PartStream {
    let chunks: Vec<io::Result<Bytes>> = (0..bytes.len())
        .step_by(STREAM_BUFFER_SIZE)
        .map(|start| {
            let end = (start + STREAM_BUFFER_SIZE).min(bytes.len());
            Ok(bytes.slice(start..end))
        })
        .collect();
    Box::pin(stream::iter(chunks))
}

/// Stream adapter that reports every yielded chunk to the shared tracker
struct CountingStream {
    inner: PartStream,
    tracker: Arc<ProgressTracker>,
}

impl Stream for CountingStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = Pin::new(&mut self.inner).poll_next(cx);
        if let Poll::Ready(Some(Ok(chunk))) = &polled {
            self.tracker.advance(chunk.len());
        }
        polled
    }
}

/// Build the multipart form for a batch.
///
/// Every file goes under the `files` field. Progress is reported through
/// `make_tracker`, which receives the batch total (or `None` when any file
/// size is unknown).
pub(crate) async fn build_form<F>(files: Vec<UploadFile>, make_tracker: F) -> ApiResult<Form>
where
    F: FnOnce(Option<u64>) -> Arc<ProgressTracker>,
{
    let mut opened = Vec::with_capacity(files.len());
    for file in files {
        opened.push(open_part(file).await?);
    }

    let total = opened
        .iter()
        .try_fold(0u64, |acc, part| part.len.map(|len| acc + len));
    let tracker = make_tracker(total);

    let mut form = Form::new();
    for part in opened {
        let counting = CountingStream {
            inner: part.stream,
            tracker: tracker.clone(),
        };
        let body = Body::wrap_stream(counting);
        let multipart = match part.len {
            Some(len) => Part::stream_with_length(body, len),
            None => Part::stream(body),
        };
        let multipart = multipart
            .file_name(part.file_name)
            .mime_str(&part.content_type)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        form = form.part(FILES_FIELD, multipart);
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn bytes_stream_splits_into_buffer_sized_chunks() {
        let data = Bytes::from(vec![7u8; STREAM_BUFFER_SIZE * 2 + 10]);
        let chunks: Vec<Bytes> = bytes_stream(data)
            .map(|c| c.unwrap())
            .collect()
            .await;
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 10);
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = UploadFile::from_path(dir.path().join("absent.pdf"), "application/pdf");
        match open_part(file).await {
            Err(ApiError::FileRead { path, .. }) => assert!(path.ends_with("absent.pdf")),
            other => panic!("expected FileRead, got {:?}", other.map(|p| p.file_name)),
        }
    }

    #[test]
    fn from_path_uses_last_component_as_name() {
        let file = UploadFile::from_path("/tmp/docs/report.pdf", "application/pdf");
        assert_eq!(file.file_name, "report.pdf");
    }
}
