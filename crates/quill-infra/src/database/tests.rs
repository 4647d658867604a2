use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use quill_core::domain::Post;
use quill_core::error::RepoError;
use quill_core::pagination::PageRequest;
use quill_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

use crate::database::entity::{comment, post, user};
use crate::database::postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
};

fn post_model(user_id: Uuid, slug: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id: Uuid::new_v4(),
        user_id,
        title: format!("Title of {slug}"),
        content: "<p>Content</p>".to_owned(),
        image_url: None,
        slug: slug.to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let model = post_model(Uuid::new_v4(), "first-post");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model.clone()]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let found: Option<Post> = repo.find_by_id(model.id).await.unwrap();

    let found = found.unwrap();
    assert_eq!(found.id, model.id);
    assert_eq!(found.slug, "first-post");
}

#[tokio::test]
async fn test_list_by_user_reports_total() {
    let author = Uuid::new_v4();
    let rows = vec![post_model(author, "b"), post_model(author, "a")];
    let count = BTreeMap::from([("num_items", Value::BigInt(Some(7)))]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count]])
        .append_query_results([rows])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let page = repo
        .list_by_user(author, PageRequest::new(2, 5).unwrap())
        .await
        .unwrap();

    assert_eq!(page.total_count, 7);
    assert_eq!(page.page, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages(), 2);
}

#[tokio::test]
async fn test_delete_without_rows_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_user_by_username() {
    let now = Utc::now();
    let model = user::Model {
        id: Uuid::new_v4(),
        email: "lee@example.com".to_owned(),
        username: "lee".to_owned(),
        password_hash: "$argon2id$stub".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model.clone()]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let user = repo.find_by_username("lee").await.unwrap().unwrap();
    assert_eq!(user.id, model.id);
    assert_eq!(user.email, "lee@example.com");
}

#[tokio::test]
async fn test_comment_cascade_counts_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 3,
        }])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let removed = CommentRepository::delete_by_post(&repo, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(removed, 3);
}

#[tokio::test]
async fn test_comments_map_optional_fields() {
    let post_id = Uuid::new_v4();
    let model = comment::Model {
        id: Uuid::new_v4(),
        post_id,
        user_id: None,
        author_name: "Guest".to_owned(),
        author_email: Some("guest@example.com".to_owned()),
        content: "Lovely".to_owned(),
        image_url: None,
        created_at: Utc::now().into(),
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let thread = CommentRepository::list_by_post(&repo, post_id).await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].author_email.as_deref(), Some("guest@example.com"));
    assert!(thread[0].user_id.is_none());
}
