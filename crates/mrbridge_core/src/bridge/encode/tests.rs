use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::Serialize;

use crate::bridge::{BridgeError, Discriminant, EncodeOptions, Heap, Number, Runtime, Value, decode, encode, encode_number, encode_with};

#[test]
fn scalars_encode_to_matching_kinds() {
	let mut heap = Heap::new();

	let nil = encode(&mut heap, &()).expect("unit encodes");
	assert_eq!(heap.type_of(&nil), Discriminant::Nil);

	let none = encode(&mut heap, &Option::<i32>::None).expect("none encodes");
	assert_eq!(heap.type_of(&none), Discriminant::Nil);

	let yes = encode(&mut heap, &true).expect("bool encodes");
	assert_eq!(heap.type_of(&yes), Discriminant::True);

	let int = encode(&mut heap, &42_u8).expect("u8 encodes");
	assert_eq!(heap.type_of(&int), Discriminant::Integer);
	assert_eq!(heap.to_i(&int), 42);

	let negative = encode(&mut heap, &-7_i16).expect("i16 encodes");
	assert_eq!(heap.to_i(&negative), -7);

	let float = encode(&mut heap, &2.5_f32).expect("f32 encodes");
	assert_eq!(heap.type_of(&float), Discriminant::Float);
	assert_eq!(heap.to_f(&float), 2.5);

	let text = encode(&mut heap, "héllo").expect("str encodes");
	assert_eq!(heap.type_of(&text), Discriminant::String);
	assert_eq!(heap.to_s(&text), "héllo");

	let ch = encode(&mut heap, &'ß').expect("char encodes");
	assert_eq!(heap.to_s(&ch), "ß");
}

#[test]
fn option_and_box_are_unwrapped() {
	let mut heap = Heap::new();
	let some = encode(&mut heap, &Some(Box::new(5_i64))).expect("some encodes");
	assert_eq!(heap.type_of(&some), Discriminant::Integer);
	assert_eq!(heap.to_i(&some), 5);
}

#[test]
fn floats_keep_six_fractional_digits() {
	let mut heap = Heap::new();
	let pi = encode(&mut heap, &3.14159265_f64).expect("float encodes");
	assert_eq!(heap.to_f(&pi), 3.141593);

	let tiny = encode(&mut heap, &0.0000001_f64).expect("tiny float encodes");
	assert_eq!(heap.to_f(&tiny), 0.0);

	let whole = encode(&mut heap, &2.0_f64).expect("whole float encodes");
	assert_eq!(heap.type_of(&whole), Discriminant::Float);
}

#[test]
fn integer_extremes_survive() {
	let mut heap = Heap::new();
	let min = encode(&mut heap, &i64::MIN).expect("i64::MIN encodes");
	assert_eq!(heap.to_i(&min), i64::MIN);
	let max = encode(&mut heap, &i64::MAX).expect("i64::MAX encodes");
	assert_eq!(heap.to_i(&max), i64::MAX);

	let big = encode(&mut heap, &u64::MAX).expect("u64::MAX encodes");
	assert_eq!(heap.type_of(&big), Discriminant::Float);
}

#[test]
fn encode_number_goes_through_literal_loading() {
	let mut heap = Heap::new();
	let value = encode_number(&mut heap, Number::Int(12)).expect("int literal loads");
	assert_eq!(heap.inspect(value), "12");

	let value = encode_number(&mut heap, Number::Float(1.5)).expect("float literal loads");
	assert_eq!(heap.inspect(value), "1.5");

	let err = encode_number(&mut heap, Number::Float(f64::NAN)).expect_err("NaN has no literal form");
	assert!(matches!(&err, BridgeError::Runtime(exc) if exc.class == "SyntaxError"), "got {err:?}");
}

#[test]
fn sequences_become_arrays_in_order() {
	let mut heap = Heap::new();
	let array = encode(&mut heap, &vec![3_i32, 1, 2]).expect("vec encodes");
	assert_eq!(heap.inspect(array), "[3, 1, 2]");

	let tuple = encode(&mut heap, &(1_i32, "a", false)).expect("tuple encodes");
	assert_eq!(heap.inspect(tuple), "[1, \"a\", false]");

	let empty = encode(&mut heap, &Vec::<String>::new()).expect("empty vec encodes");
	assert_eq!(heap.type_of(&empty), Discriminant::Array);
	assert_eq!(heap.inspect(empty), "[]");
}

#[test]
fn string_keyed_maps_become_hashes() {
	let mut heap = Heap::new();
	let mut map = IndexMap::new();
	map.insert("b", vec![1_i64]);
	map.insert("a", vec![]);
	let hash = encode(&mut heap, &map).expect("map encodes");
	assert_eq!(heap.inspect(hash), "{\"b\" => [1], \"a\" => []}");

	let mut sorted = BTreeMap::new();
	sorted.insert("z".to_owned(), 1_i32);
	sorted.insert("y".to_owned(), 2_i32);
	let hash = encode(&mut heap, &sorted).expect("btree map encodes");
	assert_eq!(heap.inspect(hash), "{\"y\" => 2, \"z\" => 1}");
}

#[test]
fn non_string_map_keys_are_rejected() {
	let mut heap = Heap::new();
	let mut map = HashMap::new();
	map.insert(1_i32, "one");

	let err = encode(&mut heap, &map).expect_err("integer keys must fail");
	assert!(matches!(&err, BridgeError::UnsupportedKeyType { kind } if kind == "i32"), "got {err:?}");
}

#[test]
fn nested_key_failure_carries_path() {
	let mut heap = Heap::new();
	let mut inner = HashMap::new();
	inner.insert(true, 1_i32);
	let outer = vec![HashMap::new(), inner];

	let err = encode(&mut heap, &outer).expect_err("bool keys must fail");
	assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("$[1]"));
	assert!(matches!(err.root_cause(), BridgeError::UnsupportedKeyType { kind } if kind == "bool"));
}

#[derive(Serialize)]
struct Planet {
	id: i64,
}

#[derive(Serialize)]
enum Shape {
	Circle(f64),
}

#[test]
fn structs_enums_and_bytes_are_unsupported() {
	let mut heap = Heap::new();

	let err = encode(&mut heap, &Planet { id: 3 }).expect_err("struct must fail");
	assert!(matches!(&err, BridgeError::UnsupportedType { kind } if kind == "struct Planet"), "got {err:?}");

	let err = encode(&mut heap, &vec![Shape::Circle(1.0)]).expect_err("enum must fail");
	assert!(matches!(err.root_cause(), BridgeError::UnsupportedType { kind } if kind == "enum variant Shape::Circle"));
	assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("$[0]"));

	let err = encode(&mut heap, &serde_bytes_like()).expect_err("bytes must fail");
	assert!(matches!(&err, BridgeError::UnsupportedType { kind } if kind == "bytes"), "got {err:?}");

	let err = encode(&mut heap, &1_i128).expect_err("i128 must fail");
	assert!(matches!(&err, BridgeError::UnsupportedType { kind } if kind == "i128"), "got {err:?}");
}

struct Bytes<'a>(&'a [u8]);

impl Serialize for Bytes<'_> {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_bytes(self.0)
	}
}

fn serde_bytes_like() -> Bytes<'static> {
	Bytes(b"raw")
}

#[test]
fn depth_limit_stops_deep_nesting() {
	let mut heap = Heap::new();
	let nested = vec![vec![vec![1_i32]]];

	let opt = EncodeOptions { max_depth: 3 };
	encode_with(&mut heap, &nested, &opt).expect("three levels fit");

	let opt = EncodeOptions { max_depth: 2 };
	let err = encode_with(&mut heap, &nested, &opt).expect_err("three levels exceed two");
	assert!(matches!(err.root_cause(), BridgeError::DepthExceeded { max_depth: 2 }));
}

#[test]
fn siblings_share_the_depth_budget_fairly() {
	let mut heap = Heap::new();
	let wide = vec![vec![1_i32], vec![2], vec![3], vec![4]];

	let opt = EncodeOptions { max_depth: 2 };
	let array = encode_with(&mut heap, &wide, &opt).expect("each sibling fits");
	assert_eq!(heap.inspect(array), "[[1], [2], [3], [4]]");
}

#[test]
fn value_tree_round_trips_through_heap() {
	let mut heap = Heap::new();
	let json = r#"{"name":"Earth","moons":[{"name":"Moon","radius":1737.4}],"habitable":true,"rings":null,"id":3}"#;
	let value: Value = serde_json::from_str(json).expect("json parses");

	let encoded = encode(&mut heap, &value).expect("value encodes");
	let decoded = decode(&heap, &encoded).expect("value decodes");
	assert!(decoded.approx_eq(&value, 1e-6), "decoded {decoded:?}");
}
