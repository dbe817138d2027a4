use super::{format_timestamp, Timestamp};
use serde::Serializer;

pub fn serialize_timestamp_as_local_time<S>(
    timestamp: &Timestamp,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(*timestamp))
}
