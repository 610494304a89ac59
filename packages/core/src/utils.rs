// ABOUTME: Shared utility functions for Testdesk
// ABOUTME: Identity generation and well-formedness checks

use chrono::Utc;
use rand::Rng;

const NANOID_LEN: usize = 21;
const SUFFIX_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a prefixed storage identity, e.g. `req-V1StGXR8_Z5jdHi6B-myT`
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, nanoid::nanoid!())
}

/// Whether `id` looks like an identity produced by [`generate_id`] with `prefix`.
///
/// Anything else (client-side temporary ids, ids of another document type,
/// empty strings) is treated by callers as "no identity".
pub fn is_well_formed_id(prefix: &str, id: &str) -> bool {
    let Some(body) = id
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };

    body.len() == NANOID_LEN
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Generate an externally addressable tab key (`tab_<unix-millis>_<suffix>`).
///
/// Keys sort by creation time; the random suffix separates tabs created in
/// the same millisecond.
pub fn generate_tab_key() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| {
            let idx = rng.gen_range(0..SUFFIX_CHARSET.len());
            SUFFIX_CHARSET[idx] as char
        })
        .collect();
    format!("tab_{}_{}", Utc::now().timestamp_millis(), suffix)
}
