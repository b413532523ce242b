//! Request dispatch onto the commit log.

use std::sync::Arc;

use tracing::debug;

use strand_log::{CommitLog, LogError};
use strand_types::Record;
use strand_wire::{
    ConsumeResponse, ErrorCode, ProduceResponse, Request, RequestId, RequestPayload, Response,
    ResponsePayload,
};

/// Translates wire requests into log operations.
///
/// The handler only sees the [`CommitLog`] interface, so tests can inject
/// an alternative implementation.
pub struct RequestHandler {
    log: Arc<dyn CommitLog>,
}

impl RequestHandler {
    /// Creates a handler over the given log.
    pub fn new(log: Arc<dyn CommitLog>) -> Self {
        Self { log }
    }

    /// Dispatches a request and produces its response.
    pub fn dispatch(&self, request: Request) -> Response {
        let id = request.id;

        match request.payload {
            RequestPayload::Produce(produce) => {
                match self.log.append(Record::new(produce.value)) {
                    Ok(offset) => {
                        debug!(request = id.0, offset, "produced record");
                        Response::new(id, ResponsePayload::Produce(ProduceResponse { offset }))
                    }
                    Err(e) => Self::error_response(id, &e),
                }
            }
            RequestPayload::Consume(consume) => match self.log.read(consume.offset) {
                Ok(record) => {
                    debug!(request = id.0, offset = record.offset, "consumed record");
                    Response::new(
                        id,
                        ResponsePayload::Consume(ConsumeResponse {
                            offset: record.offset,
                            value: record.value.to_vec(),
                        }),
                    )
                }
                Err(e) => Self::error_response(id, &e),
            },
        }
    }

    fn error_response(id: RequestId, err: &LogError) -> Response {
        let code = match err {
            LogError::OffsetOutOfRange { .. } => ErrorCode::OffsetOutOfRange,
            _ => ErrorCode::Storage,
        };
        Response::error(id, code, err.to_string())
    }
}

impl std::fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler").finish_non_exhaustive()
    }
}
