use marketplace_core::{
    NewProduct, NewUser, Product, ProductPatch, User, UserPatch, ValidationError,
    DEFAULT_USER_RANKING,
};
use uuid::Uuid;

fn john() -> NewUser {
    NewUser::new("John", "Doe", "john@x.com", "S3cure!ab", "NYC")
}

#[test]
fn user_create_assigns_fresh_ids_and_default_ranking() {
    let first = User::create(john()).unwrap();
    let second = User::create(john()).unwrap();

    assert!(!first.id.is_nil());
    assert_ne!(first.id, second.id);
    assert_eq!(first.ranking, DEFAULT_USER_RANKING);
}

#[test]
fn user_construction_fails_fast_on_first_invalid_field() {
    let mut fields = john();
    fields.email = "john".to_string();
    fields.password = "weak".to_string();

    let err = User::create(fields).unwrap_err();
    assert_eq!(err, ValidationError::InvalidEmail { field: "email" });
    assert_eq!(err.field(), "email");
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = User::with_id(Uuid::nil(), john()).unwrap_err();
    assert_eq!(err, ValidationError::NilId { field: "id" });

    let err = Product::with_id(Uuid::nil(), NewProduct::new(Uuid::new_v4(), "Scissors", 10, 100))
        .unwrap_err();
    assert_eq!(err, ValidationError::NilId { field: "id" });
}

#[test]
fn user_patch_reports_applied_and_skipped_fields() {
    let mut user = User::create(john()).unwrap();
    let id = user.id;

    let outcome = user.apply_patch(&UserPatch {
        email: Some("john.doe@example.com".to_string()),
        password: Some("weak".to_string()),
        ..UserPatch::default()
    });

    assert_eq!(outcome.applied, vec!["email"]);
    assert_eq!(outcome.skipped, vec!["password"]);
    assert_eq!(user.id, id);
    assert_eq!(user.email, "john.doe@example.com");
    assert_eq!(user.password, "S3cure!ab");
}

#[test]
fn empty_patch_is_a_noop() {
    let mut product =
        Product::create(NewProduct::new(Uuid::new_v4(), "Scissors", 10, 100)).unwrap();
    let before = product.clone();

    let outcome = product.apply_patch(&ProductPatch::default());
    assert!(outcome.is_noop());
    assert!(ProductPatch::default().is_empty());
    assert_eq!(product, before);
}

#[test]
fn product_ranks_and_integers_are_unbounded() {
    let mut product =
        Product::create(NewProduct::new(Uuid::new_v4(), "Scissors", 10, 100)).unwrap();

    product.apply_patch(&ProductPatch {
        price: Some(-5),
        quantity: Some(0),
        product_rank: Some(42.5),
        ..ProductPatch::default()
    });

    assert_eq!(product.price, -5);
    assert_eq!(product.quantity, 0);
    assert_eq!(product.product_rank, 42.5);
}

#[test]
fn new_user_deserializes_with_default_ranking() {
    let value = serde_json::json!({
        "name": "John",
        "surname": "Doe",
        "email": "john@x.com",
        "password": "S3cure!ab",
        "location": "NYC"
    });

    let fields: NewUser = serde_json::from_value(value).unwrap();
    assert_eq!(fields, john());
}

#[test]
fn patches_deserialize_from_partial_json() {
    let patch: UserPatch = serde_json::from_value(serde_json::json!({ "password": "weak" })).unwrap();
    assert_eq!(
        patch,
        UserPatch {
            password: Some("weak".to_string()),
            ..UserPatch::default()
        }
    );

    let patch: ProductPatch =
        serde_json::from_value(serde_json::json!({ "price": 12, "category": "tools" })).unwrap();
    assert_eq!(patch.price, Some(12));
    assert_eq!(patch.category.as_deref(), Some("tools"));
    assert_eq!(patch.product_name, None);
}

#[test]
fn user_serialization_omits_password() {
    let user = User::create(john()).unwrap();

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["id"], user.id.to_string());
    assert_eq!(json["email"], "john@x.com");
    assert_eq!(json["ranking"], 4.8);
    assert!(json.get("password").is_none());
}

#[test]
fn product_deserializes_with_optional_defaults() {
    let owner = Uuid::new_v4();
    let value = serde_json::json!({
        "user_id": owner.to_string(),
        "product_name": "Scissors",
        "price": 10,
        "quantity": 100
    });

    let fields: NewProduct = serde_json::from_value(value).unwrap();
    assert_eq!(fields, NewProduct::new(owner, "Scissors", 10, 100));
}
