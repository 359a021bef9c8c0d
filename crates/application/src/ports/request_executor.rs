//! Request executor port

use async_trait::async_trait;

use courier_domain::{request::RequestSpec, response::ExecutionOutcome};

use super::CancellationReceiver;

/// Port for sending a fully resolved request over the wire.
///
/// There is no error channel: transport failures come back as
/// `ExecutionOutcome::Failed`.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Executes an HTTP request.
    async fn execute(
        &self,
        request: &RequestSpec,
        cancel: &CancellationReceiver,
    ) -> ExecutionOutcome;
}
