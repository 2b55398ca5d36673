//! Snapshot assembly error taxonomy.

use crate::transport::TransportError;

/// Errors from assembling a snapshot.
///
/// Any of these aborts the in-flight assembly run; partial results are
/// never exposed. Each variant carries enough context to reproduce the
/// upstream data issue. The type is `Clone` because task results travel
/// through shared futures during assembly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// The transport failed; surfaced to the caller unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A record could not be split into its expected positional fields, or
    /// a field failed to convert to its target type.
    #[error("{endpoint}: malformed record {record:?}: {reason}")]
    MalformedRecord {
        endpoint: &'static str,
        record: String,
        reason: String,
    },

    /// A record references a foreign id absent from the already-built map.
    #[error("{endpoint}: record references unknown {entity} id {id}")]
    DanglingReference {
        endpoint: &'static str,
        entity: &'static str,
        id: u32,
    },
}
