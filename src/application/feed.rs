//! Read-side feed assembly: the public listings and the follow feed.

use std::sync::Arc;

use thiserror::Error;

use crate::application::identity::Identity;
use crate::application::pagination::{Page, Pager, requested_page};
use crate::application::repos::{FollowsRepo, GroupsRepo, PostsRepo, RepoError, UsersRepo};
use crate::domain::entities::{FollowRecord, GroupRecord, PostRecord, UserRecord};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("unknown group")]
    UnknownGroup,
    #[error("unknown user")]
    UnknownUser,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// An author's profile listing plus whether the viewer follows them.
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: UserRecord,
    pub following: bool,
    pub posts: Page<PostRecord>,
}

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    users: Arc<dyn UsersRepo>,
    groups: Arc<dyn GroupsRepo>,
    follows: Arc<dyn FollowsRepo>,
    pager: Pager,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        users: Arc<dyn UsersRepo>,
        groups: Arc<dyn GroupsRepo>,
        follows: Arc<dyn FollowsRepo>,
        pager: Pager,
    ) -> Self {
        Self {
            posts,
            users,
            groups,
            follows,
            pager,
        }
    }

    /// Every post, newest first.
    pub async fn all_posts(&self, page: Option<&str>) -> Result<Page<PostRecord>, FeedError> {
        let total = self.posts.count_all().await?;
        let number = self.pager.clamp(requested_page(page), total);
        let items = self.posts.list_all(self.pager.window(number)).await?;
        Ok(Page::assemble(items, number, self.pager.page_size(), total))
    }

    /// A group's posts, newest first. Fails when the slug is unknown.
    pub async fn group_posts(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<(GroupRecord, Page<PostRecord>), FeedError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or(FeedError::UnknownGroup)?;

        let total = self.posts.count_by_group(group.id).await?;
        let number = self.pager.clamp(requested_page(page), total);
        let items = self
            .posts
            .list_by_group(group.id, self.pager.window(number))
            .await?;
        let posts = Page::assemble(items, number, self.pager.page_size(), total);
        Ok((group, posts))
    }

    /// An author's posts, newest first, plus the viewer's follow state.
    /// Anonymous viewers are never "following".
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<&Identity>,
        page: Option<&str>,
    ) -> Result<ProfileFeed, FeedError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(FeedError::UnknownUser)?;

        let following = match viewer {
            Some(viewer) if viewer.user_id != author.id => {
                self.follows
                    .exists(FollowRecord {
                        follower_id: viewer.user_id,
                        followed_id: author.id,
                    })
                    .await?
            }
            _ => false,
        };

        let total = self.posts.count_by_author(author.id).await?;
        let number = self.pager.clamp(requested_page(page), total);
        let items = self
            .posts
            .list_by_author(author.id, self.pager.window(number))
            .await?;
        let posts = Page::assemble(items, number, self.pager.page_size(), total);

        Ok(ProfileFeed {
            author,
            following,
            posts,
        })
    }

    /// Posts by every author the viewer follows, newest first.
    pub async fn follow_feed(
        &self,
        viewer: &Identity,
        page: Option<&str>,
    ) -> Result<Page<PostRecord>, FeedError> {
        let followed = self.follows.list_followed_ids(viewer.user_id).await?;
        if followed.is_empty() {
            return Ok(Page::assemble(Vec::new(), 1, self.pager.page_size(), 0));
        }

        let total = self.posts.count_by_authors(&followed).await?;
        let number = self.pager.clamp(requested_page(page), total);
        let items = self
            .posts
            .list_by_authors(&followed, self.pager.window(number))
            .await?;
        Ok(Page::assemble(items, number, self.pager.page_size(), total))
    }
}
