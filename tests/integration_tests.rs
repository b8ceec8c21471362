//! End-to-end flows: serialize a composite structure, parse it back, dump
//! it, materialize it, and pick the pieces apart.

use serde::Serialize;
use serpentine::{
    from_slice, node, parse, to_bytes, to_bytes_pretty, to_value, DebugVisitor, Node,
    ObjectifyVisitor, PublicFields, Value,
};
use std::collections::{BTreeMap, HashSet};

struct SampleClass {
    name: String,
    age: u32,
}

impl PublicFields for SampleClass {
    fn type_name(&self) -> &str {
        "SampleClass"
    }
    fn public_fields(&self) -> Vec<(String, Node)> {
        vec![
            ("name".to_string(), Node::from(self.name.clone())),
            ("age".to_string(), Node::from(self.age)),
        ]
    }
}

#[test]
fn test_example_flow() {
    let mut data: Vec<(Node, Node)> = Vec::new();
    data.push((Node::from("tuple"), Node::from((1, 2, 3))));
    data.push((
        Node::from("date"),
        Node::from(
            chrono::NaiveDate::from_ymd_opt(2013, 1, 20)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        ),
    ));
    let set: HashSet<&str> = ["a", "b", "c"].into_iter().collect();
    data.push((Node::from("set"), Node::from(set)));
    data.push((
        Node::from("class"),
        Node::from_fields(&SampleClass {
            name: "Sally".to_string(),
            age: 26,
        }),
    ));

    // Serialize with indentation, as a producer would before shipping the
    // bytes over a file or socket.
    let ser = to_bytes_pretty(Node::Dict(data)).unwrap();

    // Parse the serialized bytes back into a tree.
    let ast = parse(&ser).unwrap();

    // Debug dump of the tree shape.
    let mut dv = DebugVisitor::new();
    ast.accept(&mut dv);
    let dump = dv.into_string();
    assert!(dump.starts_with("dict (4 entries)"));

    // Materialize through the supplied visitor.
    let mut ov = ObjectifyVisitor::new();
    ast.accept(&mut ov);
    let dict = ov.into_value();
    let dict = dict.as_dict().unwrap();

    let tuple = dict.get(&Value::from("tuple")).unwrap();
    assert_eq!(
        tuple,
        &Value::Tuple(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );

    let date = dict.get(&Value::from("date")).unwrap();
    assert_eq!(date.as_str(), Some("2013-01-20T12:00:00"));

    let set = dict.get(&Value::from("set")).unwrap().as_set().unwrap();
    assert_eq!(set.len(), 3);
    assert!(set.contains(&Value::from("b")));

    // Custom classes travel as dicts.
    let class = dict.get(&Value::from("class")).unwrap().as_dict().unwrap();
    assert_eq!(
        class.get(&Value::from("__class__")),
        Some(&Value::from("SampleClass"))
    );
    assert_eq!(class.get(&Value::from("name")), Some(&Value::from("Sally")));
    assert_eq!(class.get(&Value::from("age")), Some(&Value::Int(26)));
}

#[test]
fn test_roundtrip_is_stable_after_one_pass() {
    let original = node!({
        "xs": [1, 2.5, "three"],
        "pair": (True, None),
        "bytes": {"nested": {1, 2}}
    });
    let first = to_bytes(original).unwrap();
    let second = to_bytes(parse(&first).unwrap().into_root()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_serde_types_flow_through() {
    #[derive(Serialize)]
    struct Order {
        id: u64,
        items: Vec<String>,
        totals: BTreeMap<String, f64>,
    }

    let order = Order {
        id: 981,
        items: vec!["widget".to_string(), "gadget".to_string()],
        totals: BTreeMap::from([("net".to_string(), 19.5), ("tax".to_string(), 1.95)]),
    };

    let node = to_value(&order).unwrap();
    let bytes = to_bytes(node).unwrap();
    let value = from_slice(&bytes).unwrap();
    let dict = value.as_dict().unwrap();

    assert_eq!(dict.get(&Value::from("id")), Some(&Value::Int(981)));
    let items = dict.get(&Value::from("items")).unwrap();
    assert_eq!(
        items,
        &Value::List(vec![Value::from("widget"), Value::from("gadget")])
    );
    let totals = dict.get(&Value::from("totals")).unwrap().as_dict().unwrap();
    assert_eq!(totals.get(&Value::from("net")), Some(&Value::Float(19.5)));
}

#[test]
fn test_cross_producer_payload() {
    // A payload as another implementation would write it: header, hash
    // order rather than sorted order, hand-formatted whitespace.
    let payload = b"# serpent utf-8 python3.2\n{'status': True, 'id': 42, 'tags': ('a',), 'blob': {'encoding': 'base64', 'data': 'AAEC'}}";
    let value = from_slice(payload).unwrap();
    let dict = value.as_dict().unwrap();
    assert_eq!(dict.get(&Value::from("status")), Some(&Value::Bool(true)));
    assert_eq!(dict.get(&Value::from("id")), Some(&Value::Int(42)));
    assert_eq!(
        dict.get(&Value::from("tags")),
        Some(&Value::Tuple(vec![Value::from("a")]))
    );
    assert_eq!(
        dict.get(&Value::from("blob")),
        Some(&Value::Bytes(vec![0, 1, 2]))
    );
}

#[test]
fn test_node_travels_through_other_serde_formats() {
    let node = node!({"xs": [1, 2], "ok": True});
    let json = serde_json::to_string(&node).unwrap();
    assert_eq!(json, r#"{"xs":[1,2],"ok":true}"#);

    let back: Node = serde_json::from_str(&json).unwrap();
    assert_eq!(back, node);
}

#[test]
fn test_reserialized_payload_is_canonical() {
    let payload = b"{'b': 1, 'a': 2}";
    let canonical = to_bytes(parse(payload).unwrap().into_root()).unwrap();
    let body = serpentine::strip_header(&canonical);
    assert_eq!(body, b"{'a':2,'b':1}");
}
