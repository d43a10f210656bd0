use std::sync::Arc;

use serde_json::json;

use serializable::{
    DeserializeOptions, Document, Entity, EntityDescriptor, FieldType, Serializable,
    SerializableError, SerializeOptions, TypeRegistry, Value,
};

struct Fixture {
    user: Arc<EntityDescriptor>,
    team: Arc<EntityDescriptor>,
    registry: TypeRegistry,
}

fn fixture() -> Fixture {
    let user = EntityDescriptor::builder("pkg.User")
        .attribute("name")
        .typed("age", FieldType::Int)
        .build()
        .unwrap();
    let team = EntityDescriptor::builder("pkg.Team")
        .nested("lead", &user)
        .build()
        .unwrap();
    let mut registry = TypeRegistry::new();
    registry.register(&team);
    Fixture { user, team, registry }
}

fn ann(f: &Fixture) -> Entity {
    Entity::with_fields(Arc::clone(&f.user), [("name", Value::from("Ann")), ("age", Value::Int(30))])
        .unwrap()
}

#[test]
fn malformed_documents_are_rejected_before_state_changes() {
    let f = fixture();
    let cases = [
        json!({"data": {"name": "X"}}),
        json!({"object_type": "pkg.User"}),
        json!({"object_type": "pkg.User", "data": {"name": "X"}, "version": 1}),
        json!({"object_type": ["pkg.User"], "data": {}}),
        json!({"object_type": "pkg.User", "data": "name=X"}),
        json!(null),
    ];

    for case in cases {
        let mut user = ann(&f);
        let err = user.deserialize_value(&case, &f.registry).unwrap_err();
        assert!(
            matches!(err, SerializableError::InvalidDocumentShape { .. }),
            "case {case} gave {err:?}"
        );
        assert_eq!(user, ann(&f));
    }
}

#[test]
fn team_rejects_user_document() {
    let f = fixture();
    let mut team = Entity::new(Arc::clone(&f.team)).unwrap();
    let before = team.clone();

    let err = team
        .deserialize_value(
            &json!({"object_type": "pkg.User", "data": {"name": "Bo", "age": 22}}),
            &f.registry,
        )
        .unwrap_err();
    match err {
        SerializableError::ObjectTypeMismatch { expected, actual } => {
            assert_eq!(expected, "pkg.Team");
            assert_eq!(actual, "pkg.User");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(team, before);
}

#[test]
fn type_guard_applies_in_eager_mode_too() {
    let f = fixture();
    let mut team = Entity::new(Arc::clone(&f.team)).unwrap();
    let before = team.clone();
    let doc = ann(&f).serialize(&SerializeOptions::default()).unwrap();

    let err = team
        .deserialize_with(&doc, &f.registry, &DeserializeOptions::eager())
        .unwrap_err();
    assert!(matches!(err, SerializableError::ObjectTypeMismatch { .. }));
    assert_eq!(team, before);
}

#[test]
fn nested_document_of_wrong_type_fails_schema_check() {
    let f = fixture();
    let mut team = Entity::new(Arc::clone(&f.team)).unwrap();
    let doc = Document::from_value(json!({
        "object_type": "pkg.Team",
        "data": {"lead": {"object_type": "pkg.Team", "data": {}}}
    }))
    .unwrap();

    let err = team.deserialize(&doc, &f.registry).unwrap_err();
    assert!(matches!(err, SerializableError::SchemaTypeMismatch { .. }));
}

#[test]
fn nested_document_with_bad_fields_fails_construction() {
    let f = fixture();
    let mut team = Entity::new(Arc::clone(&f.team)).unwrap();
    let doc = Document::from_value(json!({
        "object_type": "pkg.Team",
        "data": {"lead": {"object_type": "pkg.User", "data": {"age": "old"}}}
    }))
    .unwrap();

    let err = team.deserialize(&doc, &f.registry).unwrap_err();
    assert!(matches!(err, SerializableError::SchemaTypeMismatch { .. }));
}

#[test]
fn nested_type_must_be_registered() {
    let f = fixture();
    let empty = TypeRegistry::new();
    let mut team = Entity::new(Arc::clone(&f.team)).unwrap();
    let lead = ann(&f);
    let original = Entity::with_fields(Arc::clone(&f.team), [("lead", lead)]).unwrap();
    let doc = original.serialize(&SerializeOptions::default()).unwrap();

    let err = team.deserialize(&doc, &empty).unwrap_err();
    assert!(matches!(err, SerializableError::UnresolvableType { .. }));

    team.deserialize(&doc, &f.registry).unwrap();
    assert_eq!(team, original);
}

#[test]
fn partial_document_updates_only_named_fields() {
    let f = fixture();
    let mut user = ann(&f);
    user.deserialize_value(
        &json!({"object_type": "pkg.User", "data": {"age": 31}}),
        &f.registry,
    )
    .unwrap();
    assert_eq!(user.get("name").unwrap(), &Value::from("Ann"));
    assert_eq!(user.get("age").unwrap(), &Value::Int(31));
}

#[test]
fn errors_classify_for_batch_callers() {
    let f = fixture();
    let inputs = [
        json!({"object_type": "pkg.User", "data": {"name": "Cy", "age": 40}}),
        json!({"object_type": "pkg.Team", "data": {}}),
        json!({"object_type": "pkg.User", "data": {"age": "x"}}),
        json!({"data": {}}),
    ];

    let mut accepted = Vec::new();
    let mut document_errors = 0;
    let mut schema_errors = 0;
    for input in &inputs {
        let mut user = Entity::new(Arc::clone(&f.user)).unwrap();
        match user.deserialize_value(input, &f.registry) {
            Ok(()) => accepted.push(user),
            Err(e) if e.is_document_error() => document_errors += 1,
            Err(e) if e.is_schema_error() => schema_errors += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(accepted.len(), 1);
    assert_eq!(document_errors, 2);
    assert_eq!(schema_errors, 1);
}
