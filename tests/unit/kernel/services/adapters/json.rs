use super::*;
use compact_str::CompactString;
use crate::kernel::services::ports::{
    DocumentMutator, DocumentRef, LabelProvider, ModelService, ModelUpdateError, MutationError,
    NodeFactory, PersistenceCommitter, SaveError,
};
use crate::models::{DataRef, NodeId, NodeInfo};
use serde_json::{json, Value};
use tempfile::TempDir;

fn sample() -> Value {
    json!({
        "name": "catalog",
        "type": "catalog",
        "children": [
            { "name": "books", "type": "shelf", "children": [
                { "name": "dune", "type": "book", "pages": 412 }
            ]},
            "a note, not a node",
            { "name": "films", "type": "shelf" },
            { "name": "games" }
        ]
    })
}

fn settings() -> Arc<JsonTreeSettings> {
    Arc::new(JsonTreeSettings::default())
}

fn info(document: &JsonDocument, data_ref: DataRef) -> NodeInfo {
    let type_tag: CompactString = document
        .get(data_ref)
        .and_then(|v| v.get("type").and_then(Value::as_str).map(Into::into))
        .unwrap_or_else(|| "object".into());
    NodeInfo {
        id: NodeId::default(),
        parent: None,
        editor_id: JSON_EDITOR_ID.into(),
        type_tag,
        data_ref,
    }
}

fn pointer(document: &JsonDocument, p: &str) -> DataRef {
    document.ref_for_pointer(p).unwrap()
}

#[test]
fn test_pointer_resolution_is_stable() {
    let document = JsonDocument::new(sample());

    let root = document.root_ref();
    assert_eq!(pointer(&document, ""), root);
    let films = pointer(&document, "/children/2");
    assert_eq!(pointer(&document, "/children/2"), films);
    assert_eq!(document.get(films).unwrap()["name"], "films");
    assert!(document.ref_for_pointer("/children/9").is_none());
    assert!(document.ref_for_pointer("children").is_none());
}

#[test]
fn test_pointer_unescapes_tokens() {
    let document = JsonDocument::new(json!({ "a/b": { "c~d": { "name": "deep" } } }));
    let data_ref = pointer(&document, "/a~1b/c~0d");
    assert_eq!(document.get(data_ref).unwrap()["name"], "deep");
}

#[test]
fn test_children_skip_non_objects() {
    let document = JsonDocument::new(sample());
    let factory = JsonNodeFactory::new(document.clone(), settings());
    let root = info(&document, document.root_ref());

    let children = factory.create_children(&root).unwrap();
    let tags: Vec<&str> = children.iter().map(|d| d.type_tag.as_str()).collect();
    assert_eq!(tags, vec!["shelf", "shelf", "object"]);
    assert!(children[0].has_children);
    assert!(!children[1].has_children);
    assert_eq!(children[1].data_ref, pointer(&document, "/children/2"));
}

#[test]
fn test_factory_rejects_non_objects() {
    let document = JsonDocument::new(sample());
    let factory = JsonNodeFactory::new(document.clone(), settings());

    let err = factory
        .create_node(&json!([1, 2]), DataRef::new(99), None)
        .unwrap_err();
    assert!(err.reason.contains("array"));
}

#[test]
fn test_add_commands_follow_configured_schemas() {
    let document = JsonDocument::new(sample());
    let root = info(&document, document.root_ref());

    let factory = JsonNodeFactory::new(document.clone(), settings());
    let commands = factory.add_commands(&root);
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].type_tag, "object");
    assert_eq!(commands[0].template, json!({ "type": "object" }));

    let mut configured = JsonTreeSettings::default();
    configured
        .schemas
        .insert("shelf".into(), json!({ "type": "object" }));
    configured
        .schemas
        .insert("book".into(), json!({ "type": "object" }));
    let factory = JsonNodeFactory::new(document.clone(), Arc::new(configured));
    let tags: Vec<String> = factory
        .add_commands(&root)
        .into_iter()
        .map(|c| c.type_tag.to_string())
        .collect();
    assert_eq!(tags, vec!["book", "shelf"]);
}

#[test]
fn test_form_data_excludes_containers() {
    let document = JsonDocument::new(sample());
    let model = JsonModelService::new(document.clone(), settings());
    let books = info(&document, pointer(&document, "/children/0"));

    assert_eq!(
        model.data(&books).unwrap(),
        json!({ "name": "books", "type": "shelf" })
    );
}

#[test]
fn test_update_then_read_returns_written_data() {
    let document = JsonDocument::new(sample());
    let model = JsonModelService::new(document.clone(), settings());
    let books = info(&document, pointer(&document, "/children/0"));

    let data = json!({ "name": "novels", "type": "shelf", "floor": 2 });
    model.update_data(&books, data.clone()).unwrap();

    assert_eq!(model.data(&books).unwrap(), data);
    // Children survive a form write.
    let raw = document.get(books.data_ref).unwrap();
    assert_eq!(raw["children"][0]["name"], "dune");
    assert!(document.generation() > 0);
}

#[test]
fn test_update_drops_removed_properties() {
    let document = JsonDocument::new(sample());
    let model = JsonModelService::new(document.clone(), settings());
    let dune = info(&document, pointer(&document, "/children/0/children/0"));

    model
        .update_data(&dune, json!({ "name": "dune", "type": "book" }))
        .unwrap();
    assert!(document.get(dune.data_ref).unwrap().get("pages").is_none());
}

#[test]
fn test_update_rejects_non_object_data() {
    let document = JsonDocument::new(sample());
    let model = JsonModelService::new(document.clone(), settings());
    let root = info(&document, document.root_ref());

    assert!(matches!(
        model.update_data(&root, json!("flat")),
        Err(ModelUpdateError::Rejected(_))
    ));
}

#[test]
fn test_update_rejects_container_keys() {
    let document = JsonDocument::new(sample());
    let model = JsonModelService::new(document.clone(), settings());
    let root = info(&document, document.root_ref());
    let before = document.snapshot();
    let generation = document.generation();

    let result = model.update_data(
        &root,
        json!({ "name": "r2", "children": [{ "name": "typed-in-form" }] }),
    );
    assert!(matches!(result, Err(ModelUpdateError::Rejected(_))));
    assert_eq!(document.snapshot(), before);
    assert_eq!(document.generation(), generation);
    assert_eq!(model.data(&root).unwrap()["name"], "catalog");
}

#[test]
fn test_schema_inferred_or_configured() {
    let document = JsonDocument::new(sample());
    let dune = info(&document, pointer(&document, "/children/0/children/0"));

    let model = JsonModelService::new(document.clone(), settings());
    let schema = model.data_schema(&dune).unwrap();
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["pages"]["type"], "integer");
    assert_eq!(schema["properties"]["name"]["type"], "string");
    assert!(model.ui_schema(&dune).unwrap().is_none());

    let mut configured = JsonTreeSettings::default();
    let book_schema = json!({ "type": "object", "required": ["name"] });
    let layout = json!({ "type": "VerticalLayout" });
    configured.schemas.insert("book".into(), book_schema.clone());
    configured.ui_schemas.insert("book".into(), layout.clone());
    let model = JsonModelService::new(document.clone(), Arc::new(configured));
    let triple = model.detail(&dune).unwrap();
    assert_eq!(triple.schema, book_schema);
    assert_eq!(triple.ui_schema, Some(layout));
}

#[test]
fn test_infer_schema_shapes() {
    assert_eq!(infer_schema(&json!(1.5)), json!({ "type": "number" }));
    assert_eq!(infer_schema(&json!([])), json!({ "type": "array" }));
    assert_eq!(
        infer_schema(&json!([true])),
        json!({ "type": "array", "items": { "type": "boolean" } })
    );
}

#[test]
fn test_add_appends_to_only_container() {
    let document = JsonDocument::new(sample());
    let mutator = JsonDocumentMutator::new(document.clone(), settings());
    let root = info(&document, document.root_ref());

    let added = mutator
        .add_node(&root, json!({ "name": "music" }))
        .unwrap();
    // Four array slots, but the string is not a child node.
    assert_eq!(added.index, 3);
    assert_eq!(document.path_of(added.data_ref).unwrap().len(), 2);
    assert_eq!(document.get(added.data_ref).unwrap()["name"], "music");
}

#[test]
fn test_add_goes_last_across_containers() {
    let document = JsonDocument::new(json!({
        "name": "board",
        "items": [{ "name": "i0" }, { "name": "i1" }],
        "groups": [{ "name": "g0" }]
    }));
    let settings = Arc::new(JsonTreeSettings {
        container_keys: vec!["items".into(), "groups".into()],
        ..JsonTreeSettings::default()
    });
    let mutator = JsonDocumentMutator::new(document.clone(), Arc::clone(&settings));
    let factory = JsonNodeFactory::new(document.clone(), Arc::clone(&settings));
    let root = info(&document, document.root_ref());

    let added = mutator.add_node(&root, json!({ "name": "g1" })).unwrap();
    assert_eq!(added.index, 3);
    let children = factory.create_children(&root).unwrap();
    assert_eq!(children.len(), 4);
    assert_eq!(children[added.index].data_ref, added.data_ref);
    assert_eq!(document.get(added.data_ref).unwrap()["name"], "g1");
}

#[test]
fn test_append_into_earlier_container_counts_only_preceding_children() {
    let document = JsonDocument::new(json!({
        "items": [{ "name": "i0" }],
        "groups": [{ "name": "g0" }, { "name": "g1" }]
    }));
    let keys: Vec<CompactString> = vec!["items".into(), "groups".into()];

    let (data_ref, index) = document
        .append_child(document.root_ref(), &keys[0], json!({ "name": "i1" }), &keys)
        .unwrap();
    assert_eq!(index, 1);
    assert_eq!(document.get(data_ref).unwrap()["name"], "i1");
}

#[test]
fn test_append_rejects_unconfigured_container_untouched() {
    let document = JsonDocument::new(sample());
    let keys: Vec<CompactString> = vec!["children".into()];
    let before = document.snapshot();

    assert_eq!(
        document.append_child(document.root_ref(), &"extras".into(), json!({}), &keys),
        Err(DocumentError::UnknownContainer("extras".into()))
    );
    assert_eq!(
        document.append_child(document.root_ref(), &keys[0], json!("text"), &keys),
        Err(DocumentError::ChildNotAnObject)
    );
    assert_eq!(document.snapshot(), before);
}

#[test]
fn test_add_creates_missing_container() {
    let document = JsonDocument::new(sample());
    let mutator = JsonDocumentMutator::new(document.clone(), settings());
    let films = info(&document, pointer(&document, "/children/2"));

    let added = mutator.add_node(&films, json!({ "name": "alien" })).unwrap();
    assert_eq!(added.index, 0);
    assert_eq!(
        document.get(films.data_ref).unwrap()["children"],
        json!([{ "name": "alien" }])
    );
}

#[test]
fn test_add_rejects_scalar_fragment() {
    let document = JsonDocument::new(sample());
    let mutator = JsonDocumentMutator::new(document.clone(), settings());
    let root = info(&document, document.root_ref());

    assert!(matches!(
        mutator.add_node(&root, json!(42)),
        Err(MutationError::InvalidFragment(_))
    ));
}

#[test]
fn test_remove_keeps_later_siblings_addressable() {
    let document = JsonDocument::new(sample());
    let mutator = JsonDocumentMutator::new(document.clone(), settings());
    let books = pointer(&document, "/children/0");
    let dune = pointer(&document, "/children/0/children/0");
    let films = pointer(&document, "/children/2");
    let games = pointer(&document, "/children/3");

    mutator.delete_node(&info(&document, books)).unwrap();

    assert!(document.get(books).is_none());
    assert!(document.get(dune).is_none());
    assert_eq!(document.get(films).unwrap()["name"], "films");
    assert_eq!(document.get(games).unwrap()["name"], "games");
    assert_eq!(pointer(&document, "/children/1"), films);
}

#[test]
fn test_root_cannot_be_removed() {
    let document = JsonDocument::new(sample());
    assert_eq!(
        document.remove(document.root_ref()),
        Err(DocumentError::RootRemoval)
    );
}

#[test]
fn test_reload_makes_old_refs_stale() {
    let document = JsonDocument::new(sample());
    let model = JsonModelService::new(document.clone(), settings());
    let old_root = document.root_ref();
    let books = info(&document, pointer(&document, "/children/0"));

    let new_root = document.reload(json!({ "name": "fresh" }));
    assert_ne!(old_root, new_root);
    assert_eq!(document.root_ref(), new_root);

    assert!(matches!(
        model.update_data(&books, json!({ "name": "late" })),
        Err(ModelUpdateError::Stale(_))
    ));
    assert_eq!(document.snapshot(), json!({ "name": "fresh" }));
}

#[test]
fn test_commit_writes_pretty_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, sample().to_string()).unwrap();

    let document = JsonDocument::load(&path).unwrap();
    let collaborators = json_collaborators(&document, settings(), path.clone());
    let books = info(&document, pointer(&document, "/children/0"));
    collaborators
        .model
        .update_data(&books, json!({ "name": "novels" }))
        .unwrap();

    collaborators
        .committer
        .commit(&document_ref_for(&path))
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains('\n'));
    let value: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["children"][0]["name"], "novels");
    assert_eq!(value["children"][0]["children"][0]["name"], "dune");
}

#[test]
fn test_commit_rejects_foreign_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.json");
    let document = JsonDocument::new(sample());
    let committer = JsonFileCommitter::new(document, path.clone());

    assert!(matches!(
        committer.commit(&DocumentRef::new("file:///elsewhere.json")),
        Err(SaveError::Rejected(_))
    ));
    assert!(!path.exists());
}

#[test]
fn test_commit_reports_io_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("doc.json");
    let committer = JsonFileCommitter::new(JsonDocument::new(sample()), path.clone());

    assert!(matches!(
        committer.commit(&committer.document_ref()),
        Err(SaveError::Io(_))
    ));
}

#[test]
fn test_labels_and_icons() {
    let document = JsonDocument::new(sample());
    let labels = JsonLabelProvider::new(document.clone(), settings());

    let root = info(&document, document.root_ref());
    assert_eq!(labels.label(&root), "catalog");
    assert_eq!(labels.icon(&root), Some("◆"));

    let mut games = info(&document, pointer(&document, "/children/3"));
    games.parent = Some(NodeId::default());
    assert_eq!(labels.label(&games), "games");
    assert_eq!(labels.icon(&games), Some("•"));

    let mut unnamed = info(&document, pointer(&document, "/children/3"));
    let model = JsonModelService::new(document.clone(), settings());
    model.update_data(&unnamed, json!({})).unwrap();
    unnamed.type_tag = "object".into();
    assert_eq!(labels.label(&unnamed), "object");
}
