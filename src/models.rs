//! Domain records as they are stored and returned.
//!
//! Field names are camelCase on the wire and in the store for bit-for-bit
//! interop with existing data; absent `title`/`replyId` serialize as `null`.

use serde::{Deserialize, Serialize};

/// A verified identity. Overwritten on every successful verification so the
/// display name tracks the identity provider (last write wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub username: String,
}

/// Per-post payload descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PostData {
    Comment,
    Animation { width: u32, height: u32 },
}

/// A post record. `id`, `threadId`, `replyId`, and `userId` are immutable
/// once written. A thread root has `id == threadId` and no `replyId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPost {
    pub id: String,
    pub thread_id: String,
    pub title: Option<String>,
    pub message: String,
    pub userdata: PostData,
    pub user_id: String,
    pub reply_id: Option<String>,
}

/// A post as returned by list routes: the stored record plus the author's
/// current display name (denormalized store-side join).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedPost {
    #[serde(flatten)]
    pub post: StoredPost,
    pub username: String,
}

/// Creation result: the new post's id and the thread it landed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRef {
    pub id: String,
    pub thread_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_post_uses_camel_case_and_explicit_nulls() {
        let post = StoredPost {
            id: "p1".into(),
            thread_id: "t1".into(),
            title: None,
            message: "hello".into(),
            userdata: PostData::Comment,
            user_id: "u1".into(),
            reply_id: None,
        };
        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            json!({
                "id": "p1",
                "threadId": "t1",
                "title": null,
                "message": "hello",
                "userdata": {"type": "comment"},
                "userId": "u1",
                "replyId": null,
            })
        );
    }

    #[test]
    fn animation_userdata_is_externally_tagged() {
        let data = PostData::Animation {
            width: 1280,
            height: 720,
        };
        assert_eq!(
            serde_json::to_value(data).unwrap(),
            json!({"type": "animation", "width": 1280, "height": 720})
        );
    }

    #[test]
    fn stored_post_round_trips_from_existing_data() {
        let raw = r#"{
            "id": "p1",
            "threadId": "t1",
            "title": "a title",
            "message": "m",
            "userdata": {"type": "animation", "width": 640, "height": 480},
            "userId": "u1",
            "replyId": "p0"
        }"#;
        let post: StoredPost = serde_json::from_str(raw).unwrap();
        assert_eq!(post.title.as_deref(), Some("a title"));
        assert_eq!(
            post.userdata,
            PostData::Animation {
                width: 640,
                height: 480
            }
        );
        assert_eq!(post.reply_id.as_deref(), Some("p0"));
    }

    #[test]
    fn returned_post_flattens_record_fields() {
        let returned = ReturnedPost {
            post: StoredPost {
                id: "p1".into(),
                thread_id: "t1".into(),
                title: None,
                message: "m".into(),
                userdata: PostData::Comment,
                user_id: "u1".into(),
                reply_id: None,
            },
            username: "ada".into(),
        };
        let value = serde_json::to_value(&returned).unwrap();
        assert_eq!(value["id"], "p1");
        assert_eq!(value["username"], "ada");
    }
}
