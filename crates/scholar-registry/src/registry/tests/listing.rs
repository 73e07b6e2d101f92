use super::common::*;

use crate::registry::domain::RegistrationForm;
use crate::registry::repository::ListQuery;

async fn seed_three(service: &crate::registry::service::StudentService<MemoryRepository>) {
    for form in [
        sample_form(),
        second_form(),
        RegistrationForm {
            name: "Hamza Tariq".to_string(),
            father: "Tariq Mehmood".to_string(),
            grade: "6".to_string(),
            contact: "0321-000-7788".to_string(),
            school: "Allied Public School".to_string(),
            photo_url: None,
            center: "Center A".to_string(),
        },
    ] {
        service.register(form).await.expect("seed registration succeeds");
    }
}

#[tokio::test]
async fn listing_without_search_returns_all_newest_first() {
    let (service, _) = build_service();
    seed_three(&service).await;

    let page = service.list(&ListQuery::default()).await.expect("listing succeeds");

    assert!(page.pagination.is_none());
    let names: Vec<&str> = page.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Hamza Tariq", "Sara Ahmed", "Ali Khan"]);
}

#[tokio::test]
async fn search_matches_name_admit_id_and_school_case_insensitively() {
    let (service, _) = build_service();
    seed_three(&service).await;

    let by_name = service
        .list(&ListQuery {
            search: Some("ali".to_string()),
            ..Default::default()
        })
        .await
        .expect("listing succeeds");
    // "ali" hits both Ali Khan's name and Allied Public School.
    assert_eq!(by_name.records.len(), 2);

    let by_school = service
        .list(&ListQuery {
            search: Some("GRAMMAR".to_string()),
            ..Default::default()
        })
        .await
        .expect("listing succeeds");
    assert_eq!(by_school.records.len(), 1);
    assert_eq!(by_school.records[0].name, "Sara Ahmed");

    let by_admit_id = service
        .list(&ListQuery {
            search: Some("azm-".to_string()),
            ..Default::default()
        })
        .await
        .expect("listing succeeds");
    assert_eq!(by_admit_id.records.len(), 3, "every admit id carries the tag");

    let no_hits = service
        .list(&ListQuery {
            search: Some("nonexistent".to_string()),
            ..Default::default()
        })
        .await
        .expect("listing succeeds");
    assert!(no_hits.records.is_empty());
}

#[tokio::test]
async fn pagination_reports_metadata_and_slices_pages() {
    let (service, _) = build_service();
    seed_three(&service).await;

    let first = service
        .list(&ListQuery {
            page: Some(1),
            limit: Some(2),
            search: None,
        })
        .await
        .expect("listing succeeds");

    let info = first.pagination.expect("pagination metadata present");
    assert_eq!(info.current_page, 1);
    assert_eq!(info.total_pages, 2);
    assert_eq!(info.total_students, 3);
    assert_eq!(first.records.len(), 2);
    assert_eq!(first.records[0].name, "Hamza Tariq");

    let second = service
        .list(&ListQuery {
            page: Some(2),
            limit: Some(2),
            search: None,
        })
        .await
        .expect("listing succeeds");
    assert_eq!(second.records.len(), 1);
    assert_eq!(second.records[0].name, "Ali Khan");

    let past_end = service
        .list(&ListQuery {
            page: Some(5),
            limit: Some(2),
            search: None,
        })
        .await
        .expect("listing succeeds");
    assert!(past_end.records.is_empty());
    assert_eq!(past_end.pagination.expect("metadata present").total_students, 3);
}

#[tokio::test]
async fn limit_alone_enables_pagination_with_default_page() {
    let (service, _) = build_service();
    seed_three(&service).await;

    let page = service
        .list(&ListQuery {
            page: None,
            limit: Some(2),
            search: None,
        })
        .await
        .expect("listing succeeds");

    assert_eq!(page.records.len(), 2);
    let info = page.pagination.expect("metadata present");
    assert_eq!(info.current_page, 1);
}

#[tokio::test]
async fn search_composes_with_pagination() {
    let (service, _) = build_service();
    seed_three(&service).await;

    let page = service
        .list(&ListQuery {
            page: Some(1),
            limit: Some(1),
            search: Some("center".to_string()),
        })
        .await
        .expect("listing succeeds");

    // "center" matches no name, admit id, or school; the term does not
    // search the test-center field.
    assert!(page.records.is_empty());
    assert_eq!(page.pagination.expect("metadata present").total_students, 0);
}
