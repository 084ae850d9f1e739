//! Request loop: read lines, run each call on its own task, write replies

use std::sync::Arc;

use credbridge_client::RequestContext;
use credbridge_credential::traits::Database;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::protocol::{CallError, Request, Response, dispatch};

/// Serve requests from `reader` until EOF, `shutdown` fires or `writer`
/// fails.
///
/// In-flight calls are then cancelled and the function returns once every
/// task has finished. A writer failure is returned as the error.
pub async fn serve<R, W>(
    db: Arc<dyn Database>,
    reader: R,
    mut writer: W,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();

    let write_loop = tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            let mut line = serde_json::to_vec(&response)?;
            line.push(b'\n');
            writer.write_all(&line).await?;
            writer.flush().await?;
        }
        Ok::<_, anyhow::Error>(())
    });

    let mut calls = JoinSet::new();
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            () = shutdown.cancelled() => {
                info!("Shutdown requested");
                break;
            }
            () = tx.closed() => {
                warn!("Reply stream closed; no longer accepting requests");
                break;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            info!("Host closed the request stream");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Malformed request line");
                let reply = Response::from_outcome(
                    Value::Null,
                    Err(CallError::protocol(format!("malformed request: {e}"))),
                );
                if tx.send(reply).is_err() {
                    warn!("Reply stream closed; no longer accepting requests");
                    break;
                }
                continue;
            }
        };

        debug!(id = %request.id, method = %request.method, "Request received");

        let db = Arc::clone(&db);
        let tx = tx.clone();
        let stop = shutdown.clone();
        let ctx = RequestContext::with_cancellation(shutdown.child_token());
        calls.spawn(async move {
            let outcome = dispatch(db.as_ref(), &ctx, &request.method, request.params).await;
            if tx.send(Response::from_outcome(request.id, outcome)).is_err() {
                warn!("Reply dropped, reply stream closed");
                stop.cancel();
            }
        });
    }

    shutdown.cancel();
    while let Some(joined) = calls.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "Request task failed");
        }
    }

    drop(tx);
    write_loop.await??;
    Ok(())
}
