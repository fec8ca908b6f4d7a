//! gRPC-JSON transcoder filter configuration.

use serde::Serialize;

/// Transcoder config: the proto descriptor set and the services it covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrpcJsonTranscoder {
    /// Base64-encoded `FileDescriptorSet`, carried verbatim from the
    /// service configuration's source files.
    pub proto_descriptor_bin: String,
    /// Fully qualified service names to transcode.
    pub services: Vec<String>,
}
