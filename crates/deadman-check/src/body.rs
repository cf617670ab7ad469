//! Response body handling shared by the probe and the pinger.

use reqwest::Response;
use thiserror::Error;

use crate::deadline::Deadline;

/// Stand-in for a body that could not be read.
pub(crate) const READ_ERROR: &str = "<read-error>";

#[derive(Debug, Error)]
pub(crate) enum BodyError {
    #[error("timed out reading response body")]
    Timeout,

    #[error(transparent)]
    Read(#[from] reqwest::Error),
}

/// Read the whole body as text, lossily decoding invalid UTF-8.
pub(crate) async fn read_text(deadline: Deadline, response: Response) -> Result<String, BodyError> {
    Ok(deadline
        .run(response.text())
        .await
        .map_err(|_| BodyError::Timeout)??)
}

pub(crate) async fn read_bytes(
    deadline: Deadline,
    response: Response,
) -> Result<bytes::Bytes, BodyError> {
    Ok(deadline
        .run(response.bytes())
        .await
        .map_err(|_| BodyError::Timeout)??)
}

/// Read the body to EOF and throw it away so the connection can go back
/// to the pool. Returns the number of bytes discarded.
pub(crate) async fn drain(deadline: Deadline, mut response: Response) -> Result<u64, BodyError> {
    deadline
        .run(async move {
            let mut discarded = 0u64;
            while let Some(chunk) = response.chunk().await? {
                discarded += chunk.len() as u64;
            }
            Ok::<_, BodyError>(discarded)
        })
        .await
        .map_err(|_| BodyError::Timeout)?
}
