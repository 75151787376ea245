//! In-memory stores used by tests and by local runs without PostgreSQL.
use super::{
    ConnectionStore, LinkedInConnection, NewPost, PostStore, StoreError, StoredSentiment,
};
use async_trait::async_trait;
use engagement_metrics::Post;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Entry {
    external_id: String,
    post: Post,
    sentiment_degraded: bool,
}

#[derive(Default)]
pub struct InMemoryPostStore {
    entries: RwLock<HashMap<Uuid, Vec<Entry>>>,
    unavailable: AtomicBool,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with posts; each post's id doubles as its external id.
    pub fn with_posts(posts: Vec<Post>) -> Self {
        let mut entries: HashMap<Uuid, Vec<Entry>> = HashMap::new();
        for post in posts {
            entries.entry(post.user_id).or_default().push(Entry {
                external_id: post.id.to_string(),
                post,
                sentiment_degraded: false,
            });
        }

        Self {
            entries: RwLock::new(entries),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("in-memory store marked unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn fetch_posts_for_user(&self, user_id: Uuid) -> Result<Vec<Post>, StoreError> {
        self.check()?;
        let entries = self.entries.read().await;
        Ok(entries
            .get(&user_id)
            .map(|list| list.iter().map(|e| e.post.clone()).collect())
            .unwrap_or_default())
    }

    async fn list_posts_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, StoreError> {
        let mut posts = self.fetch_posts_for_user(user_id).await?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn stored_sentiments(
        &self,
        user_id: Uuid,
    ) -> Result<HashMap<String, StoredSentiment>, StoreError> {
        self.check()?;
        let entries = self.entries.read().await;
        Ok(entries
            .get(&user_id)
            .map(|list| {
                list.iter()
                    .filter(|e| !e.sentiment_degraded)
                    .map(|e| {
                        (
                            e.external_id.clone(),
                            StoredSentiment {
                                content: e.post.content.clone(),
                                sentiment: e.post.sentiment,
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert_posts(&self, user_id: Uuid, posts: &[NewPost]) -> Result<u64, StoreError> {
        self.check()?;
        let mut entries = self.entries.write().await;
        let list = entries.entry(user_id).or_default();

        for new in posts {
            let existing = list.iter_mut().find(|e| e.external_id == new.external_id);
            match existing {
                Some(entry) => {
                    entry.post.content = new.content.clone();
                    entry.post.likes = new.likes;
                    entry.post.comments = new.comments;
                    entry.post.shares = new.shares;
                    entry.post.sentiment = new.sentiment;
                    entry.sentiment_degraded = new.sentiment_degraded;
                }
                None => list.push(Entry {
                    external_id: new.external_id.clone(),
                    post: Post {
                        id: Uuid::new_v4(),
                        user_id,
                        content: new.content.clone(),
                        created_at: new.created_at,
                        likes: new.likes,
                        comments: new.comments,
                        shares: new.shares,
                        sentiment: new.sentiment,
                    },
                    sentiment_degraded: new.sentiment_degraded,
                }),
            }
        }

        Ok(posts.len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryConnectionStore {
    connections: RwLock<HashMap<Uuid, LinkedInConnection>>,
}

impl InMemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionStore for InMemoryConnectionStore {
    async fn find_connection(
        &self,
        user_id: Uuid,
    ) -> Result<Option<LinkedInConnection>, StoreError> {
        Ok(self.connections.read().await.get(&user_id).cloned())
    }

    async fn save_connection(&self, connection: &LinkedInConnection) -> Result<(), StoreError> {
        self.connections
            .write()
            .await
            .insert(connection.user_id, connection.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use engagement_metrics::Sentiment;

    fn new_post(external_id: &str, likes: u64) -> NewPost {
        NewPost {
            external_id: external_id.to_string(),
            content: format!("post {external_id}"),
            created_at: Utc::now(),
            likes,
            comments: 0,
            shares: 0,
            impressions: 10,
            sentiment: Sentiment::neutral(),
            sentiment_degraded: false,
        }
    }

    #[tokio::test]
    async fn upsert_refreshes_existing_posts() {
        let store = InMemoryPostStore::new();
        let user = Uuid::new_v4();

        store
            .upsert_posts(user, &[new_post("urn:li:share:1", 1), new_post("urn:li:share:2", 2)])
            .await
            .unwrap();
        store
            .upsert_posts(user, &[new_post("urn:li:share:1", 9)])
            .await
            .unwrap();

        let posts = store.fetch_posts_for_user(user).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts.iter().map(|p| p.likes).sum::<u64>(), 11);
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let store = InMemoryPostStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store
            .upsert_posts(alice, &[new_post("urn:li:share:1", 1)])
            .await
            .unwrap();

        assert!(store.fetch_posts_for_user(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_paged() {
        let user = Uuid::new_v4();
        let base = Utc::now();
        let posts: Vec<Post> = (0..5)
            .map(|i| Post {
                id: Uuid::new_v4(),
                user_id: user,
                content: format!("post {i}"),
                created_at: base - Duration::days(i),
                likes: i as u64,
                comments: 0,
                shares: 0,
                sentiment: Sentiment::neutral(),
            })
            .collect();
        let store = InMemoryPostStore::with_posts(posts);

        let page = store.list_posts_for_user(user, 2, 1).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].content, "post 1");
        assert_eq!(page[1].content, "post 2");
    }

    #[tokio::test]
    async fn degraded_sentiment_is_not_offered_for_reuse() {
        let store = InMemoryPostStore::new();
        let user = Uuid::new_v4();
        let mut fallback = new_post("urn:li:share:2", 1);
        fallback.sentiment_degraded = true;

        store
            .upsert_posts(user, &[new_post("urn:li:share:1", 1), fallback.clone()])
            .await
            .unwrap();
        let stored = store.stored_sentiments(user).await.unwrap();
        assert!(stored.contains_key("urn:li:share:1"));
        assert!(!stored.contains_key("urn:li:share:2"));

        fallback.sentiment_degraded = false;
        store.upsert_posts(user, &[fallback]).await.unwrap();
        assert!(store
            .stored_sentiments(user)
            .await
            .unwrap()
            .contains_key("urn:li:share:2"));
    }

    #[tokio::test]
    async fn unavailable_store_fails() {
        let store = InMemoryPostStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.fetch_posts_for_user(Uuid::new_v4()).await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
