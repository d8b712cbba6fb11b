//! Post repository: threads, replies, and animation assets over flat keys.
//!
//! Owns the key-naming scheme end to end. Thread and per-thread indexes are
//! written under inverted-timestamp sort keys so prefix listing yields
//! newest-first ordering; reply-to-thread linkage is resolved by reading the
//! referenced post back and inheriting its `threadId`.

use anyhow::anyhow;
use futures_util::future::try_join_all;
use tracing::info;
use uuid::Uuid;

use crate::constants::{MAX_MESSAGE_LENGTH, MAX_TITLE_LENGTH};
use crate::error::{ApiError, ApiResult};
use crate::kv::{keys, Store};
use crate::models::{PostData, PostRef, ReturnedPost, StoredPost, StoredUser};
use crate::params::{expect_string, expect_uuid};

#[derive(Clone)]
pub struct PostRepository {
    store: Store,
}

impl PostRepository {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a thread root or a reply.
    ///
    /// All input validation happens before the first write. With
    /// `new_thread` and no `reply_id`, the fresh id becomes the thread id
    /// and a thread-index entry is written; otherwise `reply_id` must name
    /// an existing post whose `threadId` is inherited. The post record and
    /// the per-thread index entry are then written concurrently, with no
    /// rollback if one of them fails (accepted inconsistency window).
    ///
    /// # Errors
    ///
    /// `Validation` for a missing/oversized `message` or `title` or a
    /// malformed `reply_id`; `NotFound` when `reply_id` names no post.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_post(
        &self,
        author: &StoredUser,
        new_thread: bool,
        has_title: bool,
        userdata: PostData,
        title: Option<&str>,
        message: Option<&str>,
        reply_id: Option<&str>,
    ) -> ApiResult<PostRef> {
        let title = if has_title {
            Some(expect_string("title", title, MAX_TITLE_LENGTH)?)
        } else {
            None
        };
        let message = expect_string("message", message, MAX_MESSAGE_LENGTH)?;
        let reply_id = match reply_id {
            Some(id) => Some(expect_uuid("replyId", Some(id))?),
            None => None,
        };

        let id = Uuid::new_v4().to_string();
        let sort_key = keys::sort_key_new_to_old(now_millis());

        let thread_id = if new_thread && reply_id.is_none() {
            self.store
                .put_text(&keys::thread_index(&sort_key, &id), &id)
                .await?;
            id.clone()
        } else {
            let reply_id = expect_uuid("replyId", reply_id.as_deref())?;
            let reply_post: StoredPost = self
                .store
                .get_json(&keys::post(&reply_id))
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("post {reply_id}")))?;
            reply_post.thread_id
        };

        let post = StoredPost {
            id: id.clone(),
            thread_id: thread_id.clone(),
            title,
            message,
            userdata,
            user_id: author.id.clone(),
            reply_id,
        };

        let post_key = keys::post(&id);
        let thread_post_index_key = keys::thread_post_index(&thread_id, &sort_key, &id);
        tokio::try_join!(
            self.store.put_json(&post_key, &post),
            self.store.put_text(&thread_post_index_key, &id),
        )?;

        info!(post_id = %id, thread_id = %thread_id, user_id = %author.id, "Created post");
        Ok(PostRef { id, thread_id })
    }

    /// All thread roots, newest first, with author display names attached.
    ///
    /// # Errors
    ///
    /// A dangling index entry (missing post or user record) is a hard
    /// `NotFound`, not silently skipped.
    pub async fn list_threads(&self) -> ApiResult<Vec<ReturnedPost>> {
        let index_keys = self.store.list(keys::THREAD_INDEX_PREFIX).await?;
        self.posts_from_index_keys(&index_keys).await
    }

    /// All posts in one thread, newest first, with author display names.
    pub async fn list_posts(&self, thread_id: &str) -> ApiResult<Vec<ReturnedPost>> {
        let thread_id = expect_uuid("threadId", Some(thread_id))?;
        let index_keys = self
            .store
            .list(&keys::thread_post_prefix(&thread_id))
            .await?;
        self.posts_from_index_keys(&index_keys).await
    }

    async fn posts_from_index_keys(&self, index_keys: &[String]) -> ApiResult<Vec<ReturnedPost>> {
        let ids = index_keys
            .iter()
            .map(|key| {
                keys::id_from_index_key(key)
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::Store(anyhow!("malformed index key {key}")))
            })
            .collect::<ApiResult<Vec<String>>>()?;

        // One point read per post plus one per author: the denormalized
        // username join costs a lookup server-side to save the client N+1
        // round trips.
        try_join_all(ids.iter().map(|id| self.fetch_returned_post(id))).await
    }

    async fn fetch_returned_post(&self, id: &str) -> ApiResult<ReturnedPost> {
        let post: StoredPost = self
            .store
            .get_json(&keys::post(id))
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("post {id}")))?;
        let user: StoredUser = self
            .store
            .get_json(&keys::user(&post.user_id))
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("user {}", post.user_id)))?;
        Ok(ReturnedPost {
            post,
            username: user.username,
        })
    }

    /// Store the three asset slots of an animation post concurrently.
    pub async fn put_animation(
        &self,
        id: &str,
        scene_json: &str,
        video: &[u8],
        thumbnail: &[u8],
    ) -> ApiResult<()> {
        let json_key = keys::animation_json(id);
        let video_key = keys::animation_video(id);
        let thumbnail_key = keys::animation_thumbnail(id);
        tokio::try_join!(
            self.store.put_text(&json_key, scene_json),
            self.store.put_bytes(&video_key, video.to_vec()),
            self.store.put_bytes(&thumbnail_key, thumbnail.to_vec()),
        )?;
        Ok(())
    }

    pub async fn animation_json(&self, id: &str) -> ApiResult<String> {
        self.store
            .get_text(&keys::animation_json(id))
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("animation json {id}")))
    }

    pub async fn animation_video(&self, id: &str) -> ApiResult<Vec<u8>> {
        self.store
            .get_bytes(&keys::animation_video(id))
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("animation video {id}")))
    }

    pub async fn animation_thumbnail(&self, id: &str) -> ApiResult<Vec<u8>> {
        self.store
            .get_bytes(&keys::animation_thumbnail(id))
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("animation thumbnail {id}")))
    }
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
