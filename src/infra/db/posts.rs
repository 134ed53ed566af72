use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreatePostParams, PageWindow, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;

use super::{PostgresRepositories, map_sqlx_error};

/// Shared projection: posts joined to their author and optional group.
const POST_SELECT: &str = "SELECT p.id, p.text, p.author_id, u.username AS author_username, \
     p.group_id, g.slug AS group_slug, p.image_upload_id, p.created_at \
     FROM posts p \
     INNER JOIN users u ON u.id = p.author_id \
     LEFT JOIN groups g ON g.id = p.group_id";

/// Newest first, id tie-break so equal timestamps page stably.
const POST_ORDER: &str = " ORDER BY p.created_at DESC, p.id DESC";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    text: String,
    author_id: Uuid,
    author_username: String,
    group_id: Option<Uuid>,
    group_slug: Option<String>,
    image_upload_id: Option<Uuid>,
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            author_id: row.author_id,
            author_username: row.author_username,
            group_id: row.group_id,
            group_slug: row.group_slug,
            image_upload_id: row.image_upload_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_all(&self, window: PageWindow) -> Result<Vec<PostRecord>, RepoError> {
        let rows =
            sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT}{POST_ORDER} LIMIT $1 OFFSET $2"))
                .bind(i64::from(window.limit))
                .bind(window.offset as i64)
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_all(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn list_by_group(
        &self,
        group_id: Uuid,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} WHERE p.group_id = $1{POST_ORDER} LIMIT $2 OFFSET $3"
        ))
        .bind(group_id)
        .bind(i64::from(window.limit))
        .bind(window.offset as i64)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_by_group(&self, group_id: Uuid) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} WHERE p.author_id = $1{POST_ORDER} LIMIT $2 OFFSET $3"
        ))
        .bind(author_id)
        .bind(i64::from(window.limit))
        .bind(window.offset as i64)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn list_by_authors(
        &self,
        author_ids: &[Uuid],
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} WHERE p.author_id = ANY($1){POST_ORDER} LIMIT $2 OFFSET $3"
        ))
        .bind(author_ids)
        .bind(i64::from(window.limit))
        .bind(window.offset as i64)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_by_authors(&self, author_ids: &[Uuid]) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = ANY($1)")
            .bind(author_ids)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(PostRecord::from))
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        sqlx::query(
            "INSERT INTO posts (id, author_id, group_id, image_upload_id, text, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(params.author_id)
        .bind(params.group_id)
        .bind(params.image_upload_id)
        .bind(&params.text)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::from_persistence("inserted post not readable"))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let result = sqlx::query(
            "UPDATE posts SET text = $2, group_id = $3, image_upload_id = $4 WHERE id = $1",
        )
        .bind(params.id)
        .bind(&params.text)
        .bind(params.group_id)
        .bind(params.image_upload_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        self.find_by_id(params.id)
            .await?
            .ok_or_else(|| RepoError::from_persistence("updated post not readable"))
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
