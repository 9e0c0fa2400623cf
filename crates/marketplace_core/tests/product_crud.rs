use marketplace_core::{
    ConnectionManager, FieldValue, NewProduct, NewUser, ProductPatch, ProductRepository, RepoError,
    SqliteProductRepository, SqliteUserRepository, User, UserRepository, ValidationError,
};
use uuid::Uuid;

fn seed_user(manager: &ConnectionManager, email: &str) -> User {
    SqliteUserRepository::new(manager)
        .create_user(NewUser::new("John", "Doe", email, "S3cure!ab", "NYC"))
        .unwrap()
}

#[test]
fn create_product_and_fetch_by_owner() {
    let manager = ConnectionManager::open_in_memory().unwrap();
    let owner = seed_user(&manager, "john@x.com");
    let repo = SqliteProductRepository::new(&manager);

    let scissors = repo
        .create_product(NewProduct::new(owner.id, "Scissors", 10, 100))
        .unwrap();
    assert_eq!(scissors.user_id, owner.id);
    assert_eq!(scissors.product_rank, 0.0);
    assert_eq!(scissors.description, "");

    let owned = repo.list_products_by_user(owner.id).unwrap();
    assert_eq!(owned, vec![scissors.clone()]);
    assert_eq!(repo.get_product(scissors.id).unwrap().unwrap(), scissors);
    assert_eq!(manager.open_sessions(), 0);
}

#[test]
fn optional_fields_roundtrip() {
    let manager = ConnectionManager::open_in_memory().unwrap();
    let owner = seed_user(&manager, "john@x.com");
    let repo = SqliteProductRepository::new(&manager);

    let fields = NewProduct {
        description: "Steel blades".to_string(),
        photo: "photos/scissors.png".to_string(),
        location: "NYC".to_string(),
        category: "tools".to_string(),
        product_rank: 4.2,
        ..NewProduct::new(owner.id, "Scissors", 10, 100)
    };
    let created = repo.create_product(fields).unwrap();

    let loaded = repo.get_product(created.id).unwrap().unwrap();
    assert_eq!(loaded.description, "Steel blades");
    assert_eq!(loaded.photo, "photos/scissors.png");
    assert_eq!(loaded.location, "NYC");
    assert_eq!(loaded.category, "tools");
    assert_eq!(loaded.product_rank, 4.2);
}

#[test]
fn products_are_scoped_to_their_owner() {
    let manager = ConnectionManager::open_in_memory().unwrap();
    let john = seed_user(&manager, "john@x.com");
    let jane = seed_user(&manager, "jane@x.com");
    let repo = SqliteProductRepository::new(&manager);

    let first = repo
        .create_product(NewProduct::new(john.id, "Scissors", 10, 100))
        .unwrap();
    let second = repo
        .create_product(NewProduct::new(john.id, "Glue", 3, 40))
        .unwrap();
    repo.create_product(NewProduct::new(jane.id, "Tape", 2, 10))
        .unwrap();

    let mut owned: Vec<_> = repo
        .list_products_by_user(john.id)
        .unwrap()
        .into_iter()
        .map(|product| product.id)
        .collect();
    owned.sort();
    let mut expected = vec![first.id, second.id];
    expected.sort();
    assert_eq!(owned, expected);

    assert!(repo.list_products_by_user(Uuid::new_v4()).unwrap().is_empty());
}

#[test]
fn unknown_owner_is_rejected_by_foreign_key() {
    let manager = ConnectionManager::open_in_memory().unwrap();
    let repo = SqliteProductRepository::new(&manager);
    let ghost = Uuid::new_v4();

    let err = repo
        .create_product(NewProduct::new(ghost, "Scissors", 10, 100))
        .unwrap_err();

    assert!(matches!(err, RepoError::Storage(ref db_err) if db_err.is_constraint_violation()));
    assert!(repo.list_products_by_user(ghost).unwrap().is_empty());
    assert_eq!(manager.open_sessions(), 0);
}

#[test]
fn invalid_product_fields_are_rejected_without_writing() {
    let manager = ConnectionManager::open_in_memory().unwrap();
    let owner = seed_user(&manager, "john@x.com");
    let repo = SqliteProductRepository::new(&manager);

    let err = repo
        .create_product(NewProduct::new(owner.id, " ", 10, 100))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyText {
            field: "product_name"
        })
    ));

    let err = repo
        .create_product(NewProduct::new(Uuid::nil(), "Scissors", 10, 100))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NilId { field: "user_id" })
    ));

    assert!(repo.list_products_by_user(owner.id).unwrap().is_empty());
}

#[test]
fn patch_merges_valid_fields_only() {
    let manager = ConnectionManager::open_in_memory().unwrap();
    let owner = seed_user(&manager, "john@x.com");
    let repo = SqliteProductRepository::new(&manager);
    let created = repo
        .create_product(NewProduct::new(owner.id, "Scissors", 10, 100))
        .unwrap();

    let patch = ProductPatch {
        product_name: Some(String::new()),
        price: Some(12),
        category: Some("tools".to_string()),
        product_rank: Some(f64::INFINITY),
        ..ProductPatch::default()
    };
    let updated = repo.update_product(created.id, &patch).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.user_id, owner.id);
    assert_eq!(updated.product_name, "Scissors");
    assert_eq!(updated.price, 12);
    assert_eq!(updated.quantity, 100);
    assert_eq!(updated.category, "tools");
    assert_eq!(updated.product_rank, 0.0);
    assert_eq!(repo.get_product(created.id).unwrap().unwrap(), updated);
}

#[test]
fn untyped_patch_cannot_move_product_to_another_owner() {
    let manager = ConnectionManager::open_in_memory().unwrap();
    let owner = seed_user(&manager, "john@x.com");
    let other = seed_user(&manager, "jane@x.com");
    let repo = SqliteProductRepository::new(&manager);
    let created = repo
        .create_product(NewProduct::new(owner.id, "Scissors", 10, 100))
        .unwrap();

    let patch = ProductPatch::from_fields([
        ("user_id", FieldValue::from(other.id.to_string())),
        ("quantity", FieldValue::from("lots")),
        ("price", FieldValue::Integer(8)),
    ]);
    let updated = repo.update_product(created.id, &patch).unwrap();

    assert_eq!(updated.user_id, owner.id);
    assert_eq!(updated.quantity, 100);
    assert_eq!(updated.price, 8);
    assert!(repo.list_products_by_user(other.id).unwrap().is_empty());
}

#[test]
fn update_missing_product_returns_not_found() {
    let manager = ConnectionManager::open_in_memory().unwrap();
    let repo = SqliteProductRepository::new(&manager);

    let err = repo
        .update_product(Uuid::new_v4(), &ProductPatch::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
    assert_eq!(manager.open_sessions(), 0);
}
