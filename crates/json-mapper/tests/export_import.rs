use json_mapper::{ImportError, MappingSession, MetadataUpdate, NodeId, Side};
use serde_json::{json, Value};

fn id_at(session: &MappingSession, side: Side, path: &str) -> NodeId {
    session.model(side).find_by_path(path).unwrap().id.clone()
}

fn linked_paths(session: &MappingSession) -> Vec<(String, String)> {
    session
        .resolved_links()
        .iter()
        .map(|l| (l.source.path.clone(), l.target.path.clone()))
        .collect()
}

#[test]
fn test_export_then_import_restores_links_by_path() {
    let mut session = MappingSession::default();
    session.load(
        Side::Source,
        &json!({"order": {"id": 7, "lines": [{"sku": "A"}]}, "a.b": true}),
    );
    session.load(Side::Target, &json!({"orderId": 0, "items": [{"code": ""}], "flag": false}));
    let pairs = [
        ("root.order.id", "root.orderId"),
        ("root.order.lines[0].sku", "root.items[0].code"),
        (r#"root["a.b"]"#, "root.flag"),
    ];
    for (s, t) in pairs {
        let s = id_at(&session, Side::Source, s);
        let t = id_at(&session, Side::Target, t);
        session.link(&s, &t).unwrap();
    }
    session.set_metadata(
        Side::Target,
        "root.orderId",
        MetadataUpdate::Description("Order number".into()),
    );

    let text = serde_json::to_string_pretty(&session.export()).unwrap();

    let mut restored = MappingSession::default();
    let report = restored.import_str(&text).unwrap();
    assert_eq!(report.resolved, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(linked_paths(&restored), linked_paths(&session));
    assert_eq!(
        restored.current_json(Side::Source),
        session.current_json(Side::Source)
    );
    assert_eq!(
        restored
            .metadata(Side::Target)
            .get("root.orderId")
            .unwrap()
            .description,
        "Order number"
    );
}

#[test]
fn test_unresolved_mappings_are_skipped() {
    let mut session = MappingSession::default();
    let report = session
        .import(&json!({
            "mappings": [
                {"source": "root.a", "target": "b"},
                {"source": "missing", "target": "b"},
                {"source": "a", "target": "root.missing"}
            ],
            "source_data_preview": {"a": 1},
            "target_data_preview": {"b": 1},
            "source_field_metadata": {},
            "target_field_metadata": {}
        }))
        .unwrap();
    assert_eq!(report.resolved, 1);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].source, "missing");
    assert_eq!(session.links().len(), 1);
}

#[test]
fn test_import_rejects_missing_metadata() {
    let mut session = MappingSession::default();
    let doc: Value = json!({
        "mappings": [],
        "source_data_preview": {},
        "target_data_preview": {},
        "source_field_metadata": {}
    });
    assert!(matches!(
        session.import(&doc),
        Err(ImportError::MissingField("target_field_metadata"))
    ));
}

#[test]
fn test_import_rejects_wrongly_typed_mappings() {
    let mut session = MappingSession::default();
    let doc = json!({
        "mappings": "nope",
        "source_data_preview": {},
        "target_data_preview": {},
        "source_field_metadata": {},
        "target_field_metadata": {}
    });
    assert!(matches!(session.import(&doc), Err(ImportError::Json(_))));
}

#[test]
fn test_import_replaces_previous_links() {
    let mut session = MappingSession::default();
    session.load(Side::Source, &json!({"old": 1}));
    session.load(Side::Target, &json!({"old": 1}));
    let s = id_at(&session, Side::Source, "root.old");
    let t = id_at(&session, Side::Target, "root.old");
    session.link(&s, &t).unwrap();

    session
        .import(&json!({
            "mappings": [],
            "source_data_preview": {"new": 1},
            "target_data_preview": {"new": 1},
            "source_field_metadata": {},
            "target_field_metadata": {}
        }))
        .unwrap();

    assert!(session.links().is_empty());
    assert!(!session.model(Side::Source).contains(&s));
}
