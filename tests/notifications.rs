mod common;

use common::*;
use pretty_assertions::assert_eq;
use prop_changed::sim::{Instance, Notification, Value};
use serde_json::json;

fn single_property(ty: &str) -> prop_changed::ir::Program {
    program(vec![notifying_class("TestClass", &["string"], vec![auto("Property", ty)])])
}

#[test]
fn change_guard_does_not_refire() {
    let (rewritten, diagnostics) = rewrite(&single_property("int"));
    assert!(diagnostics.is_empty());
    let mut instance = Instance::new(find(&rewritten, "TestClass"), "OnPropertyChanged");

    instance.set("Property", Value::Int(1)).unwrap();
    assert_eq!(instance.count("Property"), 1);
    instance.set("Property", Value::Int(1)).unwrap();
    instance.set("Property", Value::Int(1)).unwrap();
    assert_eq!(instance.count("Property"), 1);
    assert_eq!(instance.get("Property"), Ok(Value::Int(1)));
}

#[test]
fn change_guard_does_detect_change() {
    let (rewritten, _) = rewrite(&single_property("int"));
    let mut instance = Instance::new(find(&rewritten, "TestClass"), "OnPropertyChanged");

    for v in [1, 2, 1] {
        instance.set("Property", Value::Int(v)).unwrap();
    }
    assert_eq!(instance.count("Property"), 3);
}

#[test]
fn setting_the_default_value_is_silent() {
    let (rewritten, _) = rewrite(&single_property("bool"));
    let mut instance = Instance::new(find(&rewritten, "TestClass"), "OnPropertyChanged");
    instance.set("Property", Value::Bool(false)).unwrap();
    assert!(instance.notifications().is_empty());
}

#[test]
fn every_value_kind_oscillates() {
    let cases = [
        ("int", Value::Int(1), Value::Int(2)),
        ("long", Value::Int(1), Value::Int(2)),
        ("double", Value::float(1.0), Value::float(1.5)),
        ("char", Value::Char('a'), Value::Char('b')),
        ("decimal", Value::float(1.0), Value::float(1.1)),
        ("string", Value::str("a"), Value::str("b")),
        ("int?", Value::Int(1), Value::Null),
        ("CustomClass", Value::Object { class: "CustomClass".into(), key: 1 }, Value::Object { class: "CustomClass".into(), key: 2 }),
        ("CustomStruct", Value::Object { class: "CustomStruct".into(), key: 1 }, Value::Object { class: "CustomStruct".into(), key: 2 }),
    ];
    for (ty, a, b) in cases {
        let (rewritten, _) = rewrite(&single_property(ty));
        let mut instance = Instance::new(find(&rewritten, "TestClass"), "OnPropertyChanged");
        for v in [a.clone(), a.clone(), b.clone(), b, a] {
            instance.set("Property", v).unwrap();
        }
        assert_eq!(instance.count("Property"), 3, "{ty}");
    }
}

#[test]
fn computed_property_fires_for_each_source() {
    let p = program(vec![notifying_class(
        "TestClass",
        &["string"],
        vec![auto("GivenNames", "string"), auto("FamilyName", "string"), full_name()],
    )]);
    let (rewritten, _) = rewrite(&p);
    let mut instance = Instance::new(find(&rewritten, "TestClass"), "OnPropertyChanged");

    instance.set("GivenNames", Value::str("Cameron")).unwrap();
    instance.set("FamilyName", Value::str("MacFarland")).unwrap();

    let order: Vec<&str> = instance.notifications().iter().map(|n| n.property.as_str()).collect();
    assert_eq!(order, vec!["GivenNames", "FullName", "FamilyName", "FullName"]);
    assert_eq!(instance.get("FullName"), Ok(Value::str("Cameron MacFarland")));
}

#[test]
fn getter_shapes_all_register_dependencies() {
    let interpolation = json!({ "expr": "interpolated", "parts": [ident("GivenNames"), text(" "), ident("FamilyName")] });
    let shapes = [
        json!({ "shape": "accessors", "getter": { "body": { "block": [{ "stmt": "return", "value": interpolation }] } } }),
        json!({ "shape": "accessors", "getter": { "body": { "expr": interpolation } } }),
        json!({ "shape": "expression", "expr": interpolation }),
    ];
    for shape in shapes {
        let full = json!({ "member": "property", "name": "FullName", "ty": "string", "body": shape });
        let p = program(vec![notifying_class(
            "TestClass",
            &["string"],
            vec![auto("GivenNames", "string"), auto("FamilyName", "string"), full],
        )]);
        let (rewritten, _) = rewrite(&p);
        let mut instance = Instance::new(find(&rewritten, "TestClass"), "OnPropertyChanged");
        instance.set("GivenNames", Value::str("Cameron")).unwrap();
        instance.set("FamilyName", Value::str("MacFarland")).unwrap();
        assert_eq!(instance.count("FullName"), 2);
    }
}

#[test]
fn unchanged_source_does_not_notify_dependents() {
    let p = program(vec![notifying_class(
        "TestClass",
        &["string"],
        vec![auto("GivenNames", "string"), auto("FamilyName", "string"), full_name()],
    )]);
    let (rewritten, _) = rewrite(&p);
    let mut instance = Instance::new(find(&rewritten, "TestClass"), "OnPropertyChanged");
    instance.set("GivenNames", Value::str("Ada")).unwrap();
    instance.clear();
    instance.set("GivenNames", Value::str("Ada")).unwrap();
    assert!(instance.notifications().is_empty());
}

#[test]
fn three_arg_helper_receives_before_and_after() {
    let p = program(vec![notifying_class(
        "ExampleBeforeAfterClass",
        &["string", "object", "object"],
        vec![auto("GivenNames", "string"), auto("FamilyName", "string"), full_name(), auto("Number", "int")],
    )]);
    let (rewritten, diagnostics) = rewrite(&p);
    assert!(diagnostics.is_empty());
    let mut instance = Instance::new(find(&rewritten, "ExampleBeforeAfterClass"), "OnPropertyChanged");

    instance.set("Number", Value::Int(4)).unwrap();
    instance.set("GivenNames", Value::str("Ada")).unwrap();
    assert_eq!(
        instance.notifications(),
        &[
            Notification { property: "Number".into(), before: Some(Value::Int(0)), after: Some(Value::Int(4)) },
            Notification { property: "GivenNames".into(), before: Some(Value::Null), after: Some(Value::str("Ada")) },
            Notification { property: "FullName".into(), before: Some(Value::Null), after: Some(Value::str("Ada")) },
        ]
    );
}

#[test]
fn transitive_dependents_follow_direct_ones() {
    let shout = computed(
        "Shout",
        json!({ "expr": "interpolated", "parts": [ident("FullName"), text("!")] }),
    );
    let p = program(vec![notifying_class(
        "TestClass",
        &["string"],
        vec![auto("GivenNames", "string"), auto("FamilyName", "string"), full_name(), shout],
    )]);
    let (rewritten, _) = rewrite(&p);
    let mut instance = Instance::new(find(&rewritten, "TestClass"), "OnPropertyChanged");
    instance.set("FamilyName", Value::str("Lovelace")).unwrap();
    let order: Vec<&str> = instance.notifications().iter().map(|n| n.property.as_str()).collect();
    assert_eq!(order, vec!["FamilyName", "FullName", "Shout"]);
}

#[test]
fn hand_written_property_is_not_converted() {
    let p = program(vec![notifying_class(
        "TestClass",
        &["string"],
        vec![
            json!({ "member": "field", "name": "_property", "ty": "int", "modifiers": ["private"] }),
            json!({ "member": "property", "name": "Property", "ty": "int", "modifiers": ["public"],
                    "body": { "shape": "accessors",
                      "getter": { "body": { "expr": ident("_property") } },
                      "setter": { "body": { "expr": { "expr": "assign", "target": ident("_property"), "value": ident("value") } } } } }),
        ],
    )]);
    let (rewritten, diagnostics) = rewrite(&p);
    assert!(diagnostics.is_empty());
    assert_eq!(rewritten, p);

    let mut instance = Instance::new(find(&rewritten, "TestClass"), "OnPropertyChanged");
    instance.set("Property", Value::Int(1)).unwrap();
    assert!(instance.notifications().is_empty());
}

#[test]
fn helper_inherited_from_a_referenced_base() {
    let p: prop_changed::ir::Program = serde_json::from_value(json!({
        "units": [{ "path": "ExampleClass.cs", "namespace": "TestProject", "types": [
            { "name": "ExampleClass", "base": "Lib.PropertyChangedBase",
              "members": [auto("Number", "int"), auto("Flag", "bool")] }
        ]}],
        "references": [
            { "name": "Lib.PropertyChangedBase", "interfaces": [INPC],
              "members": [event(), helper(&["string"])] }
        ]
    }))
    .unwrap();
    let (rewritten, diagnostics) = rewrite(&p);
    assert!(diagnostics.is_empty());
    assert_eq!(rewritten.references, p.references);

    let mut instance = Instance::new(find(&rewritten, "ExampleClass"), "OnPropertyChanged");
    instance.set("Flag", Value::Bool(true)).unwrap();
    instance.set("Number", Value::Int(7)).unwrap();
    assert_eq!(instance.notifications().len(), 2);
}

#[test]
fn properties_read_from_a_base_are_not_sources() {
    let p = program(vec![
        notifying_class("Base", &["string"], vec![auto("Given", "string")]),
        json!({ "name": "Derived", "base": "Base", "members": [
            auto("Family", "string"),
            computed("Full", json!({ "expr": "interpolated", "parts": [ident("Given"), text(" "), ident("Family")] })),
        ]}),
    ]);
    let (rewritten, diagnostics) = rewrite(&p);
    assert!(diagnostics.is_empty());

    let mut base = Instance::new(find(&rewritten, "Base"), "OnPropertyChanged");
    base.set("Given", Value::str("Ada")).unwrap();
    assert_eq!(base.notifications().iter().map(|n| n.property.as_str()).collect::<Vec<_>>(), vec!["Given"]);

    let mut derived = Instance::new(find(&rewritten, "Derived"), "OnPropertyChanged");
    derived.set("Family", Value::str("Lovelace")).unwrap();
    assert_eq!(
        derived.notifications().iter().map(|n| n.property.as_str()).collect::<Vec<_>>(),
        vec!["Family", "Full"]
    );
}
