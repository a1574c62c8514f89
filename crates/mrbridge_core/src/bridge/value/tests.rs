use crate::bridge::{Mapping, Value};

#[test]
fn mapping_equality_ignores_order() {
	let mut a = Mapping::new();
	a.insert("Earth".to_owned(), Value::Int(6371));
	a.insert("Moon".to_owned(), Value::Int(1737));

	let mut b = Mapping::new();
	b.insert("Moon".to_owned(), Value::Int(1737));
	b.insert("Earth".to_owned(), Value::Int(6371));

	assert_eq!(Value::Mapping(a.clone()), Value::Mapping(b));
	assert_eq!(a.keys().next().map(String::as_str), Some("Earth"), "insertion order kept");
}

#[test]
fn json_document_deserializes_into_tree() {
	let value: Value = serde_json::from_str(r#"{"Earth":{"Radius":6371,"Moon":[{"Radius":1737.4}],"HasRings":false},"Pluto":null}"#)
		.expect("json parses into value");

	let earth = value.get("Earth").expect("Earth entry");
	assert_eq!(earth.get("Radius"), Some(&Value::Int(6371)));
	assert_eq!(earth.get("Radius").and_then(Value::as_i64), Some(6371));
	assert_eq!(earth.get("HasRings").and_then(Value::as_i64), None);
	assert_eq!(earth.get("HasRings").and_then(Value::as_bool), Some(false));
	let moons = earth.get("Moon").and_then(Value::as_sequence).expect("moon list");
	assert_eq!(moons[0].get("Radius").and_then(Value::as_f64), Some(1737.4));
	assert!(value.get("Pluto").is_some_and(Value::is_null));
}

#[test]
fn large_unsigned_integers_become_floats() {
	let value: Value = serde_json::from_str("18446744073709551615").expect("u64 max parses");
	assert_eq!(value.kind_name(), "float");
}

#[test]
fn serializes_back_to_equivalent_json() {
	let source = r#"[{"Name":"地球","Radius":6371},{"Name":"火星","Radius":3389.5},true,null]"#;
	let value: Value = serde_json::from_str(source).expect("json parses");
	let rendered = serde_json::to_string(&value).expect("value serializes");
	let again: Value = serde_json::from_str(&rendered).expect("rendered json parses");
	assert_eq!(value, again);
}

#[test]
fn approx_eq_tolerates_float_rendering() {
	let exact = Value::Sequence(vec![Value::Float(3.14159265), Value::from("pi")]);
	let rounded = Value::Sequence(vec![Value::Float(3.141593), Value::from("pi")]);
	assert!(exact.approx_eq(&rounded, 1e-6));
	assert!(!exact.approx_eq(&Value::Sequence(vec![Value::Float(3.2), Value::from("pi")]), 1e-6));
	assert_ne!(exact, rounded);
}
