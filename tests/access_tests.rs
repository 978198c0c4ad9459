//! Read filtering against a real SQLite schema.

mod common;

use common::*;
use record_meta::behavior::{CallerContext, Criteria};
use record_meta::models::{attachment::Attachment, metadata::MetadataRecord, page::Page};

/// Three pages: public, editor-only and admin-only.
async fn seeded() -> record_meta::services::repository::Repository {
    let repo = test_repo().await;
    let author = user(1, &["Author"]);
    create_page(&repo, &author, "Public").await;
    let editors = create_page(&repo, &author, "Editors").await;
    let admins = create_page(&repo, &author, "Admins").await;
    edit_metadata(&repo, editors.id.unwrap(), |m| {
        m.check_access_read = Some("Editor".into())
    })
    .await;
    edit_metadata(&repo, admins.id.unwrap(), |m| {
        m.check_access_read = Some("Admin".into())
    })
    .await;
    repo
}

#[tokio::test]
async fn test_guest_sees_unrestricted_rows_only() {
    let repo = seeded().await;
    assert_eq!(page_titles(&repo, &CallerContext::Guest).await, vec!["Public"]);
}

#[tokio::test]
async fn test_guest_role_rows_visible_to_guest() {
    let repo = seeded().await;
    let extra = create_page(&repo, &user(1, &[]), "Guest corner").await;
    edit_metadata(&repo, extra.id.unwrap(), |m| {
        m.check_access_read = Some("Guest".into())
    })
    .await;
    assert_eq!(
        page_titles(&repo, &CallerContext::Guest).await,
        vec!["Public", "Guest corner"]
    );
    // Authenticated callers are not implicitly guests.
    assert_eq!(
        page_titles(&repo, &user(2, &["Author"])).await,
        vec!["Public"]
    );
}

#[tokio::test]
async fn test_user_sees_rows_for_any_held_role() {
    let repo = seeded().await;
    assert_eq!(
        page_titles(&repo, &user(2, &["Editor"])).await,
        vec!["Public", "Editors"]
    );
    assert_eq!(
        page_titles(&repo, &user(3, &["Editor", "Admin"])).await,
        vec!["Public", "Editors", "Admins"]
    );
}

#[tokio::test]
async fn test_superuser_and_batch_are_unfiltered() {
    let repo = seeded().await;
    let all = vec!["Public", "Editors", "Admins"];
    assert_eq!(page_titles(&repo, &superuser()).await, all);
    assert_eq!(page_titles(&repo, &CallerContext::Batch).await, all);
}

#[tokio::test]
async fn test_rows_without_metadata_are_readable() {
    let repo = seeded().await;
    sqlx::query("INSERT INTO pages (title, body) VALUES ('Bare', '')")
        .execute(&*repo.store().db)
        .await
        .unwrap();
    assert_eq!(
        page_titles(&repo, &CallerContext::Guest).await,
        vec!["Public", "Bare"]
    );
}

#[tokio::test]
async fn test_find_by_id_respects_filter() {
    let repo = seeded().await;
    let hidden = repo
        .find_by_id::<Page>(&user(2, &["Author"]), 2)
        .await
        .unwrap();
    assert!(hidden.is_none());
    let visible = repo
        .find_by_id::<Page>(&user(2, &["Editor"]), 2)
        .await
        .unwrap();
    assert_eq!(visible.unwrap().title, "Editors");
}

#[tokio::test]
async fn test_role_values_are_bound_not_interpolated() {
    let repo = seeded().await;
    let sneaky = user(4, &["x' OR '1'='1"]);
    assert_eq!(page_titles(&repo, &sneaky).await, vec!["Public"]);
}

#[tokio::test]
async fn test_extra_criteria_combine_with_filter() {
    let repo = seeded().await;
    let criteria = Criteria::new().where_eq("t.id", 3);
    let rows = repo
        .find_all::<Page>(&user(2, &["Editor"]), criteria)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_metadata_rows_filter_on_themselves() {
    let repo = seeded().await;
    let visible: Vec<i64> = repo
        .find_all::<MetadataRecord>(&user(2, &["Editor"]), Criteria::new().order_by("t.id ASC"))
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(visible, vec![1, 2]);
}

#[tokio::test]
async fn test_attachments_follow_page_visibility() {
    let repo = seeded().await;
    for page_id in [1, 2] {
        let mut attachment = Attachment {
            id: None,
            page_id,
            name: format!("file-{}", page_id),
            url: format!("https://files.example/{}", page_id),
        };
        repo.save(&CallerContext::Batch, &mut attachment)
            .await
            .unwrap();
    }

    let names = |rows: Vec<Attachment>| rows.into_iter().map(|a| a.name).collect::<Vec<_>>();
    let guest_rows = repo
        .find_all::<Attachment>(&CallerContext::Guest, Criteria::new().order_by("t.id ASC"))
        .await
        .unwrap();
    assert_eq!(names(guest_rows), vec!["file-1"]);

    let editor_rows = repo
        .find_all::<Attachment>(&user(5, &["Editor"]), Criteria::new().order_by("t.id ASC"))
        .await
        .unwrap();
    assert_eq!(names(editor_rows), vec!["file-1", "file-2"]);
}
