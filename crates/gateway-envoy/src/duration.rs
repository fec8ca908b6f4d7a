//! Proto-JSON rendering for durations.
//!
//! Proto JSON renders a `google.protobuf.Duration` as a decimal-seconds
//! string with an `s` suffix (`"20s"`, `"0.5s"`). Use with
//! `#[serde(with = "gateway_envoy::duration")]`.

use std::time::Duration;

use serde::Serializer;

/// Serialize a [`Duration`] as a proto-JSON seconds string.
pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_proto_string(duration))
}

/// Render a duration as proto JSON, e.g. `"5s"` or `"1.5s"`.
#[must_use]
pub fn to_proto_string(duration: &Duration) -> String {
    let nanos = duration.subsec_nanos();
    if nanos == 0 {
        format!("{}s", duration.as_secs())
    } else {
        // Trim trailing zeros the way proto JSON does.
        let fractional = format!("{:09}", nanos);
        let fractional = fractional.trim_end_matches('0');
        format!("{}.{}s", duration.as_secs(), fractional)
    }
}
