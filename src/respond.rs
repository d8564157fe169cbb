//! Delivery pipeline: reply text → segments → temp files → send → cleanup.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::artifact::{ArtifactError, ResponseScratch};
use crate::segment;

/// Caller-supplied delivery surface, abstracting over the slash-command and
/// prefix-message reply paths.
pub trait Responder {
    async fn send(&self, text: &str, files: &[PathBuf]) -> Result<(), String>;
}

#[derive(Debug)]
pub enum RespondError {
    Artifact(ArtifactError),
    Send(String),
    /// The reply contained neither prose nor code; there is nothing to send.
    EmptyReply,
}

impl fmt::Display for RespondError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artifact(e) => write!(f, "artifact error: {e}"),
            Self::Send(e) => write!(f, "send error: {e}"),
            Self::EmptyReply => write!(f, "empty reply: nothing to send"),
        }
    }
}

impl std::error::Error for RespondError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Artifact(e) => Some(e),
            Self::Send(_) | Self::EmptyReply => None,
        }
    }
}

/// Format an AI reply and deliver it.
///
/// Code segments become temp files under a response-private directory inside
/// `scratch_root`; the composed message references them in document order.
/// The temp files are deleted on every exit path, including a failed send and
/// a failure partway through writing them. A reply with nothing to send is an
/// error, so the entry point still surfaces something to the user.
pub async fn deliver<R: Responder>(
    reply: &str,
    scratch_root: &Path,
    responder: &R,
) -> Result<(), RespondError> {
    let scratch = ResponseScratch::create(scratch_root)
        .await
        .map_err(RespondError::Artifact)?;
    debug!("Response scratch at '{}'", scratch.dir().display());
    deliver_into(reply, scratch, responder).await
}

async fn deliver_into<R: Responder>(
    reply: &str,
    mut scratch: ResponseScratch,
    responder: &R,
) -> Result<(), RespondError> {
    let segments = segment::extract(reply);

    let outcome = match scratch.materialize(&segments).await {
        Ok(message) => {
            let message = message.trim_end();
            if message.is_empty() && scratch.files().is_empty() {
                Err(RespondError::EmptyReply)
            } else {
                responder
                    .send(message, scratch.files())
                    .await
                    .map_err(RespondError::Send)
            }
        }
        Err(e) => Err(RespondError::Artifact(e)),
    };

    scratch.remove().await;
    outcome
}
