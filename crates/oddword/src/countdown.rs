//! Discussion countdown: opens voting when discussion time runs out.

use std::sync::Arc;

use oddword_protocol::Codec;
use tokio::task::JoinHandle;

use crate::CountdownRequest;
use crate::server::ServerState;

/// Spawns a timer that asks the gateway to open voting after the
/// configured discussion time. The gateway drops the request if the
/// room has moved on by then, so timers are never cancelled.
pub(crate) fn arm<C: Codec>(
    state: Arc<ServerState<C>>,
    request: CountdownRequest,
) -> JoinHandle<()> {
    let duration = state.config.discussion;
    tracing::debug!(
        code = %request.code,
        round = request.round,
        secs = duration.as_secs(),
        "discussion countdown armed"
    );
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        state
            .apply(|gateway| gateway.countdown_expired(&request))
            .await;
    })
}
