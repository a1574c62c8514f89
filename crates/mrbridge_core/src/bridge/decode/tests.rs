use crate::bridge::{BridgeError, DecodeOptions, Heap, Mapping, Runtime, Value, decode, decode_with};

#[test]
fn scalars_map_one_to_one() {
	let mut heap = Heap::new();
	let nil = heap.nil_value();
	let yes = heap.bool_value(true);
	let no = heap.bool_value(false);
	let int = heap.integer(-42);
	let float = heap.float(2.5);
	let text = heap.string("héllo");

	assert_eq!(decode(&heap, &nil).expect("nil decodes"), Value::Null);
	assert_eq!(decode(&heap, &yes).expect("true decodes"), Value::Bool(true));
	assert_eq!(decode(&heap, &no).expect("false decodes"), Value::Bool(false));
	assert_eq!(decode(&heap, &int).expect("int decodes"), Value::Int(-42));
	assert_eq!(decode(&heap, &float).expect("float decodes"), Value::Float(2.5));
	assert_eq!(decode(&heap, &text).expect("string decodes"), Value::String("héllo".to_owned()));
}

#[test]
fn arrays_keep_order_and_nest() {
	let mut heap = Heap::new();
	let one = heap.integer(1);
	let two = heap.string("two");
	let inner = heap.array(vec![one]);
	let outer = heap.array(vec![one, two, inner]);

	let value = decode(&heap, &outer).expect("array decodes");
	assert_eq!(
		value,
		Value::Sequence(vec![Value::Int(1), Value::String("two".to_owned()), Value::Sequence(vec![Value::Int(1)])])
	);
}

#[test]
fn hashes_become_mappings_in_enumeration_order() {
	let mut heap = Heap::new();
	let k_name = heap.string("name");
	let v_name = heap.string("Earth");
	let k_id = heap.string("id");
	let v_id = heap.integer(3);
	let empty = heap.hash(Vec::new());
	let k_empty = heap.string("empty");
	let hash = heap.hash(vec![(k_name, v_name), (k_id, v_id), (k_empty, empty)]);

	let Value::Mapping(map) = decode(&heap, &hash).expect("hash decodes") else {
		panic!("expected mapping");
	};
	let keys: Vec<&str> = map.keys().map(String::as_str).collect();
	assert_eq!(keys, ["name", "id", "empty"]);
	assert_eq!(map.get("id"), Some(&Value::Int(3)));
	assert_eq!(map.get("empty"), Some(&Value::Mapping(Mapping::new())));
}

#[test]
fn non_string_key_is_rejected() {
	let mut heap = Heap::new();
	let key = heap.integer(1);
	let value = heap.string("one");
	let hash = heap.hash(vec![(key, value)]);

	let err = decode(&heap, &hash).expect_err("integer key must fail");
	assert!(matches!(&err, BridgeError::InvalidKeyType { kind } if kind == "Integer"), "got {err:?}");
}

#[test]
fn symbol_key_is_rejected() {
	let mut heap = Heap::new();
	let key = heap.symbol("name");
	let value = heap.string("Earth");
	let hash = heap.hash(vec![(key, value)]);

	let err = decode(&heap, &hash).expect_err("symbol key must fail");
	assert!(matches!(&err, BridgeError::InvalidKeyType { kind } if kind == "Symbol"), "got {err:?}");
}

#[test]
fn unsupported_values_report_class_name() {
	let mut heap = Heap::new();
	let symbol = heap.symbol("sym");
	let err = decode(&heap, &symbol).expect_err("symbol must fail");
	assert!(matches!(&err, BridgeError::UnsupportedType { kind } if kind == "Symbol"), "got {err:?}");

	heap.define_class("Planet", &["id"]);
	let planet = heap.instantiate("Planet").expect("class exists");
	let err = decode(&heap, &planet).expect_err("instance must fail");
	assert!(matches!(&err, BridgeError::UnsupportedType { kind } if kind == "Planet"), "got {err:?}");
}

#[test]
fn nested_failure_carries_path() {
	let mut heap = Heap::new();
	let bad = heap.symbol("oops");
	let key = heap.string("x");
	let inner = heap.hash(vec![(key, bad)]);
	let first = heap.integer(0);
	let outer = heap.array(vec![first, inner]);

	let err = decode(&heap, &outer).expect_err("nested symbol must fail");
	let path = err.path().expect("nested error has a path");
	assert_eq!(path.to_string(), "$[1][\"x\"]");
	assert!(matches!(err.root_cause(), BridgeError::UnsupportedType { kind } if kind == "Symbol"));
	assert_eq!(err.to_string(), "at $[1][\"x\"]: unsupported type: Symbol");
}

#[test]
fn self_referential_array_hits_depth_limit() {
	let mut heap = Heap::new();
	let array = heap.array(Vec::new());
	heap.array_push(&array, array).expect("push succeeds");

	let opt = DecodeOptions { max_depth: 4 };
	let err = decode_with(&heap, &array, &opt).expect_err("cycle must hit depth limit");
	assert!(matches!(err.root_cause(), BridgeError::DepthExceeded { max_depth: 4 }), "got {err:?}");
	assert_eq!(err.path().map(|path| path.steps.len()), Some(4));
}

#[test]
fn depth_limit_counts_containers_only() {
	let mut heap = Heap::new();
	let leaf = heap.integer(7);
	let inner = heap.array(vec![leaf]);
	let outer = heap.array(vec![inner]);

	let opt = DecodeOptions { max_depth: 2 };
	assert_eq!(
		decode_with(&heap, &outer, &opt).expect("two levels fit"),
		Value::Sequence(vec![Value::Sequence(vec![Value::Int(7)])])
	);

	let opt = DecodeOptions { max_depth: 1 };
	let err = decode_with(&heap, &outer, &opt).expect_err("two levels exceed one");
	assert!(matches!(err.root_cause(), BridgeError::DepthExceeded { max_depth: 1 }));
}
