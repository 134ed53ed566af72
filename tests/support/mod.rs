//! In-memory repository fakes and request helpers shared by the
//! integration tests. The fakes honor the same ordering and uniqueness
//! rules as the Postgres adapters, so the router is exercised end to end
//! without a live database.

// Each test binary compiles this module and uses a different subset.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use http_body_util::BodyExt;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use piazza::application::identity::{Identity, IdentityError, IdentityProvider};
use piazza::application::pagination::Pager;
use piazza::application::repos::{
    CommentsRepo, CreateCommentParams, CreatePostParams, FollowsRepo, GroupsRepo, HealthRepo,
    PageWindow, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams, UsersRepo,
};
use piazza::application::{feed::FeedService, follows::FollowService, posts::PostService};
use piazza::cache::{CacheConfig, CacheState, ResponseCache};
use piazza::domain::entities::{CommentRecord, FollowRecord, GroupRecord, PostRecord, UserRecord};
use piazza::infra::http::{RouterState, build_router};

pub const LOGIN_URL: &str = "/auth/login/";
pub const PAGE_SIZE: u32 = 10;

#[derive(Default)]
struct MemoryState {
    users: Vec<UserRecord>,
    groups: Vec<GroupRecord>,
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
    follows: Vec<FollowRecord>,
}

/// Everything lives in append order; listings reverse it, matching the
/// newest-first contract of the real store.
#[derive(Default)]
pub struct MemoryRepositories {
    state: Mutex<MemoryState>,
    clock: AtomicI64,
}

impl MemoryRepositories {
    fn next_timestamp(&self) -> OffsetDateTime {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        OffsetDateTime::from_unix_timestamp(1_700_000_000 + tick)
            .expect("timestamp in range")
    }

    pub fn add_user(&self, username: &str) -> UserRecord {
        let user = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            display_name: None,
            created_at: self.next_timestamp(),
        };
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_group(&self, slug: &str, title: &str) -> GroupRecord {
        let group = GroupRecord {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: title.to_string(),
            description: format!("about {title}"),
            created_at: self.next_timestamp(),
        };
        self.state.lock().unwrap().groups.push(group.clone());
        group
    }

    pub fn add_post(&self, author: &UserRecord, text: &str, group: Option<&GroupRecord>) -> PostRecord {
        let post = PostRecord {
            id: Uuid::new_v4(),
            text: text.to_string(),
            author_id: author.id,
            author_username: author.username.clone(),
            group_id: group.map(|g| g.id),
            group_slug: group.map(|g| g.slug.clone()),
            image_upload_id: None,
            created_at: self.next_timestamp(),
        };
        self.state.lock().unwrap().posts.push(post.clone());
        post
    }

    pub fn add_follow(&self, follower: &UserRecord, followed: &UserRecord) {
        self.state.lock().unwrap().follows.push(FollowRecord {
            follower_id: follower.id,
            followed_id: followed.id,
        });
    }

    pub fn post_count(&self) -> usize {
        self.state.lock().unwrap().posts.len()
    }

    pub fn posts(&self) -> Vec<PostRecord> {
        self.state.lock().unwrap().posts.clone()
    }

    pub fn comments(&self) -> Vec<CommentRecord> {
        self.state.lock().unwrap().comments.clone()
    }

    pub fn follows(&self) -> Vec<FollowRecord> {
        self.state.lock().unwrap().follows.clone()
    }

    pub fn remove_post(&self, id: Uuid) {
        let mut state = self.state.lock().unwrap();
        state.posts.retain(|post| post.id != id);
        state.comments.retain(|comment| comment.post_id != id);
    }

    fn window<T: Clone>(items: Vec<T>, window: PageWindow) -> Vec<T> {
        items
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect()
    }
}

#[async_trait]
impl UsersRepo for MemoryRepositories {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }
}

#[async_trait]
impl GroupsRepo for MemoryRepositories {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .groups
            .iter()
            .find(|group| group.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl PostsRepo for MemoryRepositories {
    async fn list_all(&self, window: PageWindow) -> Result<Vec<PostRecord>, RepoError> {
        let newest_first: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .posts
            .iter()
            .rev()
            .cloned()
            .collect();
        Ok(Self::window(newest_first, window))
    }

    async fn count_all(&self) -> Result<u64, RepoError> {
        Ok(self.state.lock().unwrap().posts.len() as u64)
    }

    async fn list_by_group(
        &self,
        group_id: Uuid,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let newest_first: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .posts
            .iter()
            .rev()
            .filter(|post| post.group_id == Some(group_id))
            .cloned()
            .collect();
        Ok(Self::window(newest_first, window))
    }

    async fn count_by_group(&self, group_id: Uuid) -> Result<u64, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|post| post.group_id == Some(group_id))
            .count() as u64)
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let newest_first: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .posts
            .iter()
            .rev()
            .filter(|post| post.author_id == author_id)
            .cloned()
            .collect();
        Ok(Self::window(newest_first, window))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|post| post.author_id == author_id)
            .count() as u64)
    }

    async fn list_by_authors(
        &self,
        author_ids: &[Uuid],
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let newest_first: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .posts
            .iter()
            .rev()
            .filter(|post| author_ids.contains(&post.author_id))
            .cloned()
            .collect();
        Ok(Self::window(newest_first, window))
    }

    async fn count_by_authors(&self, author_ids: &[Uuid]) -> Result<u64, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|post| author_ids.contains(&post.author_id))
            .count() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .posts
            .iter()
            .find(|post| post.id == id)
            .cloned())
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let created_at = self.next_timestamp();
        let mut state = self.state.lock().unwrap();

        let author = state
            .users
            .iter()
            .find(|user| user.id == params.author_id)
            .ok_or_else(|| RepoError::InvalidInput {
                message: "unknown author".to_string(),
            })?;
        let author_username = author.username.clone();

        let group_slug = match params.group_id {
            None => None,
            Some(group_id) => Some(
                state
                    .groups
                    .iter()
                    .find(|group| group.id == group_id)
                    .map(|group| group.slug.clone())
                    .ok_or_else(|| RepoError::InvalidInput {
                        message: "unknown group".to_string(),
                    })?,
            ),
        };

        let post = PostRecord {
            id: Uuid::new_v4(),
            text: params.text,
            author_id: params.author_id,
            author_username,
            group_id: params.group_id,
            group_slug,
            image_upload_id: params.image_upload_id,
            created_at,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut state = self.state.lock().unwrap();

        let group_slug = match params.group_id {
            None => None,
            Some(group_id) => Some(
                state
                    .groups
                    .iter()
                    .find(|group| group.id == group_id)
                    .map(|group| group.slug.clone())
                    .ok_or_else(|| RepoError::InvalidInput {
                        message: "unknown group".to_string(),
                    })?,
            ),
        };

        let post = state
            .posts
            .iter_mut()
            .find(|post| post.id == params.id)
            .ok_or(RepoError::NotFound)?;
        post.text = params.text;
        post.group_id = params.group_id;
        post.group_slug = group_slug;
        post.image_upload_id = params.image_upload_id;
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.lock().unwrap();
        let before = state.posts.len();
        state.posts.retain(|post| post.id != id);
        if state.posts.len() == before {
            return Err(RepoError::NotFound);
        }
        state.comments.retain(|comment| comment.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentsRepo for MemoryRepositories {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let created_at = self.next_timestamp();
        let mut state = self.state.lock().unwrap();

        let author_username = state
            .users
            .iter()
            .find(|user| user.id == params.author_id)
            .map(|user| user.username.clone())
            .ok_or_else(|| RepoError::InvalidInput {
                message: "unknown author".to_string(),
            })?;

        let comment = CommentRecord {
            id: Uuid::new_v4(),
            post_id: params.post_id,
            author_id: params.author_id,
            author_username,
            text: params.text,
            created_at,
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl FollowsRepo for MemoryRepositories {
    async fn list_followed_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .follows
            .iter()
            .filter(|edge| edge.follower_id == follower_id)
            .map(|edge| edge.followed_id)
            .collect())
    }

    async fn exists(&self, edge: FollowRecord) -> Result<bool, RepoError> {
        Ok(self.state.lock().unwrap().follows.contains(&edge))
    }

    async fn create(&self, edge: FollowRecord) -> Result<bool, RepoError> {
        if edge.follower_id == edge.followed_id {
            return Err(RepoError::Integrity {
                message: "self-follow violates check constraint".to_string(),
            });
        }
        let mut state = self.state.lock().unwrap();
        if state.follows.contains(&edge) {
            return Ok(false);
        }
        state.follows.push(edge);
        Ok(true)
    }

    async fn delete(&self, edge: FollowRecord) -> Result<bool, RepoError> {
        let mut state = self.state.lock().unwrap();
        let before = state.follows.len();
        state.follows.retain(|existing| *existing != edge);
        Ok(state.follows.len() != before)
    }
}

#[async_trait]
impl HealthRepo for MemoryRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

/// Token-to-identity map standing in for the external session provider.
#[derive(Default)]
pub struct StaticIdentityProvider {
    sessions: Mutex<HashMap<String, Identity>>,
}

impl StaticIdentityProvider {
    pub fn register(&self, token: &str, user: &UserRecord) {
        self.sessions.lock().unwrap().insert(
            token.to_string(),
            Identity {
                user_id: user.id,
                username: user.username.clone(),
            },
        );
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, IdentityError> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }
}

pub struct TestApp {
    pub router: Router,
    pub repos: Arc<MemoryRepositories>,
    pub identity: Arc<StaticIdentityProvider>,
    pub cache: Arc<ResponseCache>,
}

pub fn build_app() -> TestApp {
    build_app_with_cache(CacheConfig {
        enabled: false,
        ..CacheConfig::default()
    })
}

pub fn build_app_with_cache(config: CacheConfig) -> TestApp {
    let repos = Arc::new(MemoryRepositories::default());
    let identity = Arc::new(StaticIdentityProvider::default());
    let cache = Arc::new(ResponseCache::new(&config));

    let pager = Pager::new(PAGE_SIZE);
    let feed = Arc::new(FeedService::new(
        repos.clone(),
        repos.clone(),
        repos.clone(),
        repos.clone(),
        pager,
    ));
    let posts = Arc::new(PostService::new(
        repos.clone(),
        repos.clone(),
        repos.clone(),
        repos.clone(),
    ));
    let follows = Arc::new(FollowService::new(repos.clone(), repos.clone()));

    let state = RouterState {
        feed,
        posts,
        follows,
        identity: identity.clone(),
        health: repos.clone(),
        login_url: LOGIN_URL.to_string(),
    };
    let cache_state = CacheState {
        cache: cache.clone(),
        enabled: config.enabled,
    };

    TestApp {
        router: build_router(state, cache_state),
        repos,
        identity,
        cache,
    }
}

pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    router.clone().oneshot(request).await.expect("response")
}

pub async fn get_auth(router: &Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    router.clone().oneshot(request).await.expect("response")
}

pub async fn post_form(
    router: &Router,
    uri: &str,
    token: Option<&str>,
    body: &str,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(body.to_string()))
        .expect("request");
    router.clone().oneshot(request).await.expect("response")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
}
