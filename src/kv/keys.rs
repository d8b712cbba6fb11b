//! Key naming scheme and the reverse-chronological sort key.
//!
//! Namespaces must be reproduced bit-for-bit for interop with existing
//! stored data:
//!
//! | namespace | key shape | value |
//! |---|---|---|
//! | thread index | `thread:<sort>\|<id>` | thread-root post id |
//! | per-thread post index | `thread/post:<threadId>:<sort>\|<id>` | post id |
//! | post record | `post:<id>` | JSON post |
//! | user record | `user:<id>` | JSON user |
//! | animation JSON | `animation/json:<id>` | raw JSON text |
//! | animation video | `animation/video:<id>` | raw MP4 bytes |
//! | animation thumbnail | `animation/thumbnail:<id>` | raw PNG bytes |

/// Width of the zero-padded sort prefix.
///
/// One more digit than the largest representable inverted timestamp
/// (`2^53 - 1` has 16 decimal digits), so every prefix is exactly this wide
/// and lexical order equals numeric order for any millisecond timestamp the
/// scheme can encode.
pub const SORT_KEY_WIDTH: usize = 16;

/// Largest integer exactly representable by the clients consuming these keys.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Build the fixed-width inverted-timestamp sort prefix for `now_ms`.
///
/// Ascending lexical iteration over keys carrying this prefix yields
/// newest-first ordering. Two keys minted in the same millisecond share a
/// prefix and order by the id after the `|` separator, id-lexical rather
/// than temporal. Callers must not rely on sub-millisecond ordering.
#[must_use]
pub fn sort_key_new_to_old(now_ms: u64) -> String {
    format!(
        "{:0width$}",
        MAX_SAFE_INTEGER.saturating_sub(now_ms),
        width = SORT_KEY_WIDTH
    )
}

pub const THREAD_INDEX_PREFIX: &str = "thread:";

#[must_use]
pub fn thread_index(sort_key: &str, id: &str) -> String {
    format!("thread:{sort_key}|{id}")
}

#[must_use]
pub fn thread_post_prefix(thread_id: &str) -> String {
    format!("thread/post:{thread_id}:")
}

#[must_use]
pub fn thread_post_index(thread_id: &str, sort_key: &str, id: &str) -> String {
    format!("thread/post:{thread_id}:{sort_key}|{id}")
}

#[must_use]
pub fn post(id: &str) -> String {
    format!("post:{id}")
}

#[must_use]
pub fn user(id: &str) -> String {
    format!("user:{id}")
}

#[must_use]
pub fn animation_json(id: &str) -> String {
    format!("animation/json:{id}")
}

#[must_use]
pub fn animation_video(id: &str) -> String {
    format!("animation/video:{id}")
}

#[must_use]
pub fn animation_thumbnail(id: &str) -> String {
    format!("animation/thumbnail:{id}")
}

/// Extract the post id from an index key (`...<sort>|<id>`).
#[must_use]
pub fn id_from_index_key(key: &str) -> Option<&str> {
    key.split('|').nth(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_is_fixed_width() {
        assert_eq!(sort_key_new_to_old(0).len(), SORT_KEY_WIDTH);
        assert_eq!(sort_key_new_to_old(1_600_000_000_000).len(), SORT_KEY_WIDTH);
        assert_eq!(sort_key_new_to_old(MAX_SAFE_INTEGER).len(), SORT_KEY_WIDTH);
    }

    #[test]
    fn later_timestamps_sort_lexically_earlier() {
        let earlier = sort_key_new_to_old(1_600_000_000_000);
        let later = sort_key_new_to_old(1_600_000_000_001);
        assert!(later < earlier);
    }

    #[test]
    fn adjacent_milliseconds_never_misorder() {
        // A sweep across digit-count boundaries where unpadded encodings
        // would misorder.
        for ms in [9u64, 99, 999, 9_999_999, 1_599_999_999_999] {
            let earlier = sort_key_new_to_old(ms);
            let later = sort_key_new_to_old(ms + 1);
            assert!(later < earlier, "misordered at {ms}");
        }
    }

    #[test]
    fn same_millisecond_collides_and_falls_back_to_id_order() {
        let sort = sort_key_new_to_old(1_600_000_000_000);
        let key_a = thread_index(&sort, "0a0e8400-e29b-41d4-a716-446655440000");
        let key_b = thread_index(&sort, "ff0e8400-e29b-41d4-a716-446655440000");
        // Same prefix, so ordering between them is id-lexical.
        assert_eq!(key_a.split('|').next(), key_b.split('|').next());
        assert!(key_a < key_b);
    }

    #[test]
    fn index_key_round_trips_id() {
        let sort = sort_key_new_to_old(1_600_000_000_000);
        let id = "550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(id_from_index_key(&thread_index(&sort, id)), Some(id));
        assert_eq!(
            id_from_index_key(&thread_post_index("t", &sort, id)),
            Some(id)
        );
        assert_eq!(id_from_index_key("thread:mangled"), None);
    }

    #[test]
    fn namespaces_match_stored_data_layout() {
        assert_eq!(post("x"), "post:x");
        assert_eq!(user("x"), "user:x");
        assert_eq!(animation_json("x"), "animation/json:x");
        assert_eq!(animation_video("x"), "animation/video:x");
        assert_eq!(animation_thumbnail("x"), "animation/thumbnail:x");
        assert_eq!(thread_post_prefix("t"), "thread/post:t:");
    }
}
