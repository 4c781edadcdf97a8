//! Lenient field decoders for API payloads.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use dkn_rbac::UserId;

#[derive(Deserialize)]
#[serde(untagged)]
enum UserRef {
    Id(UserId),
    Object { id: UserId },
    Other(IgnoredAny),
}

/// Decode a user reference sent as an id, as `{"id": ..}`, or as anything
/// else (a username, `null`), which reads as unknown.
pub(crate) fn optional_user_id<'de, D>(deserializer: D) -> Result<Option<UserId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<UserRef>::deserialize(deserializer)? {
        Some(UserRef::Id(id)) | Some(UserRef::Object { id }) => Some(id),
        Some(UserRef::Other(_)) | None => None,
    })
}
