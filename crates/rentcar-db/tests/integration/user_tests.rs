use rentcar_core::AppError;
use rentcar_core::models::ProfileUpdate;
use rentcar_core::traits::{RoleStore, UserStore};

use crate::integration::common::{new_user, setup_test_db};

#[tokio::test]
async fn create_and_find_user() {
    let (db, _container) = setup_test_db().await;
    let repo = db.user_repo();

    let user = repo.create(new_user("budi@example.com")).await.unwrap();

    assert_eq!(user.email, "budi@example.com");
    assert_eq!(user.role_id, 2);

    let by_id = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(by_id, user);

    let by_email = repo.find_by_email("budi@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);

    assert!(repo.find_by_id(user.id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn long_registration_fields_are_stored_whole() {
    let (db, _container) = setup_test_db().await;
    let repo = db.user_repo();

    let mut input = new_user("panjang@example.com");
    input.name = "N".repeat(300);
    input.phone_number = "0".repeat(40);
    input.address = "Jl. ".repeat(200);
    let user = repo.create(input.clone()).await.unwrap();

    assert_eq!(user.name, input.name);
    assert_eq!(user.phone_number, input.phone_number);
    assert_eq!(user.address, input.address);
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let (db, _container) = setup_test_db().await;
    let repo = db.user_repo();

    repo.create(new_user("dup@example.com")).await.unwrap();
    let err = repo.create(new_user("dup@example.com")).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn email_taken_ignores_the_owner() {
    let (db, _container) = setup_test_db().await;
    let repo = db.user_repo();

    let user = repo.create(new_user("owner@example.com")).await.unwrap();

    assert!(repo.email_taken("owner@example.com", None).await.unwrap());
    assert!(
        !repo
            .email_taken("owner@example.com", Some(user.id))
            .await
            .unwrap()
    );
    assert!(!repo.email_taken("free@example.com", None).await.unwrap());
}

#[tokio::test]
async fn update_profile_changes_only_supplied_fields() {
    let (db, _container) = setup_test_db().await;
    let repo = db.user_repo();

    let user = repo.create(new_user("profile@example.com")).await.unwrap();
    let update = ProfileUpdate {
        address: Some("Jl. Braga 10".to_string()),
        ..Default::default()
    };

    let updated = repo.update_profile(user.id, update).await.unwrap().unwrap();

    assert_eq!(updated.address, "Jl. Braga 10");
    assert_eq!(updated.name, user.name);
    assert_eq!(updated.email, user.email);
    assert!(updated.updated_at >= user.updated_at);

    let missing = repo
        .update_profile(user.id + 100, ProfileUpdate::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn seeded_roles_and_catalog() {
    let (db, _container) = setup_test_db().await;
    let roles = db.role_repo();

    let admin = roles.find_by_name("admin").await.unwrap().unwrap();
    assert_eq!(admin.id, 1);
    let user = RoleStore::find_by_id(&roles, 2).await.unwrap().unwrap();
    assert_eq!(user.role_name, "user");
    assert!(roles.find_by_name("Admin").await.unwrap().is_none());

    assert_eq!(roles.list_car_types().await.unwrap().len(), 3);
    assert_eq!(roles.list_car_statuses().await.unwrap().len(), 3);
}
