//! Container JSON reader/writer tests

use chrono::{NaiveDate, TimeZone, Utc};
use property_container::codec::{FailurePolicy, NamingPolicy, SchemaError, SchemaRepository};
use property_container::json::{
    ContainerJsonOptions, ContainerJsonReader, ContainerJsonWriter, ContainerShape, CustomShape,
    DecodedContainer, JsonError,
};
use property_container::models::{
    ContainerView, Decimal, ImmutableContainer, Property, PropertyContainer, PropertyValue, Schema,
    SearchMode, Value,
};
use property_container::types::{TypeRegistry, TypeTag};
use serde_json::json;
use uuid::Uuid;

fn writer(options: ContainerJsonOptions) -> ContainerJsonWriter {
    ContainerJsonWriter::new(TypeRegistry::shared(), options).unwrap()
}

fn reader(options: ContainerJsonOptions) -> ContainerJsonReader {
    ContainerJsonReader::new(TypeRegistry::shared(), options).unwrap()
}

fn person() -> PropertyContainer {
    let mut c = PropertyContainer::new();
    c.set(Property::new("Name", TypeTag::String), "Ada".into())
        .unwrap();
    c.set(Property::new("Age", TypeTag::Int), Value::Int(36))
        .unwrap();
    c.set(
        Property::new("Tags", TypeTag::array_of(TypeTag::String)),
        Value::Array(vec!["math".into(), "engines".into()]),
    )
    .unwrap();
    c
}

mod write_tests {
    use super::*;

    #[test]
    fn test_schema_precedes_values() {
        let json = ContainerJsonWriter::with_defaults()
            .to_string(&person())
            .unwrap();
        assert_eq!(
            json,
            r#"{"$metadata.schema.compact":["Name@type=string","Age@type=int","Tags@type=string[]"],"Name":"Ada","Age":36,"Tags":["math","engines"]}"#
        );
    }

    #[test]
    fn test_compact_arrays() {
        let json = writer(ContainerJsonOptions::new().pretty(true).compact_arrays(true))
            .to_string(&person())
            .unwrap();
        let expected = r#"{
  "$metadata.schema.compact": ["Name@type=string", "Age@type=int", "Tags@type=string[]"],
  "Name": "Ada",
  "Age": 36,
  "Tags": ["math", "engines"]
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_pretty_without_compact_arrays() {
        let json = writer(ContainerJsonOptions::new().pretty(true))
            .to_string(&person())
            .unwrap();
        assert!(json.contains("\"Tags\": [\n"));
    }

    #[test]
    fn test_naming_policy_applies_to_keys_and_schema() {
        let mut c = PropertyContainer::new();
        c.set_value("FirstName", "Ada".into()).unwrap();

        let value = writer(ContainerJsonOptions::new().naming(NamingPolicy::SnakeCase))
            .to_value(&c)
            .unwrap();
        assert_eq!(
            value,
            json!({"$metadata.schema.compact": ["first_name@type=string"], "first_name": "Ada"})
        );
    }

    #[test]
    fn test_write_to_io() {
        let mut out = Vec::new();
        ContainerJsonWriter::with_defaults()
            .write(&person().freeze(), &mut out)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["Age"], json!(36));
    }
}

mod read_tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_order_and_values() {
        let mut c = PropertyContainer::new();
        c.set_value("Zeta", Value::Long(9_000_000_000)).unwrap();
        c.set_value("Alpha", Value::Double(2.0)).unwrap();
        c.set_value("Mid", Value::Decimal("12.5".parse::<Decimal>().unwrap()))
            .unwrap();
        c.set_value(
            "When",
            Value::DateTime(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
        )
        .unwrap();
        c.set_value(
            "Day",
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().into(),
        )
        .unwrap();
        c.set_value(
            "Stamp",
            NaiveDate::from_ymd_opt(2024, 2, 29)
                .unwrap()
                .and_hms_milli_opt(13, 45, 1, 250)
                .unwrap()
                .into(),
        )
        .unwrap();
        c.set_value(
            "At",
            chrono::NaiveTime::from_hms_opt(8, 30, 0).unwrap().into(),
        )
        .unwrap();
        c.set_value("Id", Value::Guid(Uuid::new_v4())).unwrap();
        c.set_value("Raw", Value::Bytes(vec![0, 255, 7])).unwrap();
        c.set(Property::new("Note", TypeTag::String), Value::Null)
            .unwrap();
        c.set_value("Flag", Value::Bool(false)).unwrap();

        let json = ContainerJsonWriter::with_defaults().to_string(&c).unwrap();
        let back = ContainerJsonReader::with_defaults().read_str(&json).unwrap();

        let names: Vec<&str> = back.iter().map(|pv| pv.name()).collect();
        assert_eq!(
            names,
            vec!["Zeta", "Alpha", "Mid", "When", "Day", "Stamp", "At", "Id", "Raw", "Note", "Flag"]
        );
        assert_eq!(back, c);
    }

    #[test]
    fn test_decimal_text_survives_round_trip() {
        let mut c = PropertyContainer::new();
        for (name, text) in [("Net", "12.50"), ("Scaled", "1e2"), ("Exact", "0.1")] {
            c.set(
                Property::new(name, TypeTag::Decimal),
                Value::Decimal(text.parse::<Decimal>().unwrap()),
            )
            .unwrap();
        }

        let json = ContainerJsonWriter::with_defaults().to_string(&c).unwrap();
        assert!(json.contains(r#""Net":"12.50""#));
        assert!(json.contains(r#""Exact":0.1"#));

        let back = ContainerJsonReader::with_defaults().read_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_long_out_of_range_float() {
        let json = r#"{"$metadata.schema.compact":["N@type=long"],"N":9223372036854775808.0}"#;

        let strict = reader(ContainerJsonOptions::new().strict()).read_str(json);
        assert!(matches!(strict, Err(JsonError::InvalidValue { property, .. }) if property == "N"));

        let lenient = ContainerJsonReader::with_defaults().read_str(json).unwrap();
        assert!(!lenient.contains("N"));

        let edge = r#"{"$metadata.schema.compact":["N@type=long"],"N":-9223372036854775808.0}"#;
        let c = ContainerJsonReader::with_defaults().read_str(edge).unwrap();
        assert_eq!(c.get("N"), Some(&Value::Long(i64::MIN)));
    }

    #[test]
    fn test_nested_containers_round_trip() {
        let mut address = PropertyContainer::new();
        address.set_value("City", "Oslo".into()).unwrap();
        let mut c = PropertyContainer::new();
        c.set_value("Home", Value::Container(address.clone()))
            .unwrap();
        c.set_value(
            "History",
            Value::Array(vec![Value::Container(address.clone()), Value::Container(address)]),
        )
        .unwrap();

        let json = ContainerJsonWriter::with_defaults().to_string(&c).unwrap();
        assert!(json.contains("History@type=container[]"));
        let back = ContainerJsonReader::with_defaults().read_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_lossy_inference() {
        let c = ContainerJsonReader::with_defaults()
            .read_str(r#"{"A": 42, "B": 42.0}"#)
            .unwrap();
        assert_eq!(c.get("A"), Some(&Value::Int(42)));
        assert_eq!(c.get("B"), Some(&Value::Double(42.0)));
    }

    #[test]
    fn test_known_schema_wins_over_inline() {
        let json = r#"{"$metadata.schema.compact":["Count@type=int","Extra@type=string"],"Count":5,"Extra":"x"}"#;
        let known = Schema::new().with(Property::new("Count", TypeTag::Long));

        let c = ContainerJsonReader::with_defaults()
            .read_str_with_schema(json, &known)
            .unwrap();
        assert_eq!(c.get("Count"), Some(&Value::Long(5)));
        assert_eq!(c.get("Extra"), Some(&Value::from("x")));
    }

    #[test]
    fn test_positional_types() {
        let json = r#"{"@metadata.types":["long","Guid","string"],"A":1,"B":"67e55044-10b1-426f-9247-bb680e5fe0c8","C":"7"}"#;
        let c = ContainerJsonReader::with_defaults().read_str(json).unwrap();

        assert_eq!(c.get("A"), Some(&Value::Long(1)));
        assert!(matches!(c.get("B"), Some(Value::Guid(_))));
        assert_eq!(c.get("C"), Some(&Value::from("7")));
    }

    #[test]
    fn test_positional_list_shorter_than_values() {
        let json = r#"{"@metadata.types":["long"],"A":1,"B":2}"#;
        let c = ContainerJsonReader::with_defaults().read_str(json).unwrap();
        assert_eq!(c.get("A"), Some(&Value::Long(1)));
        assert_eq!(c.get("B"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_alternate_separator_in_document() {
        let json = r#"{"$metadata.schema.compact":["Born:type=LocalDate"],"Born":"1815-12-10"}"#;
        let c = ContainerJsonReader::with_defaults().read_str(json).unwrap();
        assert_eq!(
            c.get("Born"),
            Some(&Value::LocalDate(NaiveDate::from_ymd_opt(1815, 12, 10).unwrap()))
        );
    }

    #[test]
    fn test_unknown_alias_strict_vs_lenient() {
        let json = r#"{"$metadata.schema.compact":["Price@type=Money"],"Price":3}"#;

        let lenient = ContainerJsonReader::with_defaults().read_str(json).unwrap();
        assert_eq!(lenient.get("Price"), Some(&Value::Int(3)));

        let strict = reader(ContainerJsonOptions::new().failure_policy(FailurePolicy::Strict))
            .read_str(json);
        assert!(matches!(
            strict,
            Err(JsonError::Schema(SchemaError::UnknownTypeAlias(alias))) if alias == "Money"
        ));
    }

    #[test]
    fn test_non_nullable_null_is_rejected_in_strict_mode() {
        let known = Schema::new().with(Property::new("Id", TypeTag::Guid).with_nullable(false));
        let json = r#"{"Id": null}"#;

        let strict =
            reader(ContainerJsonOptions::new().strict()).read_str_with_schema(json, &known);
        assert!(matches!(strict, Err(JsonError::Container(_))));

        let lenient = ContainerJsonReader::with_defaults()
            .read_str_with_schema(json, &known)
            .unwrap();
        assert!(lenient.is_empty());
    }

    #[test]
    fn test_nested_schema_ref_uses_known_schema() {
        let mut known = SchemaRepository::new();
        known.insert(Schema::named("Address").with(Property::new("Since", TypeTag::LocalDate)));
        let person = Schema::named("Person")
            .with(Property::new("Home", TypeTag::Container).with_schema_ref("Address"));

        let json = r#"{"Home": {"Since": "2020-01-01"}, "Away": {"Since": "2020-01-01"}}"#;
        let c = ContainerJsonReader::with_defaults()
            .with_known_schemas(known)
            .read_str_with_schema(json, &person)
            .unwrap();

        let since = |name: &str| match c.get(name) {
            Some(Value::Container(inner)) => inner.get("Since").cloned(),
            _ => None,
        };
        assert_eq!(
            since("Home"),
            Some(Value::LocalDate(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()))
        );
        assert_eq!(since("Away"), Some(Value::from("2020-01-01")));
    }

    #[test]
    fn test_naming_policy_round_trip_with_known_schema() {
        let options = ContainerJsonOptions::new().naming(NamingPolicy::CamelCase);
        let json = writer(options.clone()).to_string(&person()).unwrap();
        assert!(json.contains("\"tags\""));

        let known = person().schema();
        let back = reader(options).read_str_with_schema(&json, &known).unwrap();
        assert_eq!(back, person());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ContainerJsonReader::with_defaults().read_str("{not json"),
            Err(JsonError::Serialization(_))
        ));
    }
}

mod shape_tests {
    use super::*;

    #[derive(Debug)]
    struct AuditRecord {
        values: Vec<PropertyValue>,
    }

    impl ContainerView for AuditRecord {
        fn properties(&self) -> &[PropertyValue] {
            &self.values
        }

        fn parent(&self) -> Option<&ImmutableContainer> {
            None
        }

        fn search_mode(&self) -> SearchMode {
            SearchMode::ExistingOnly
        }
    }

    #[test]
    fn test_immutable_shape() {
        let json = ContainerJsonWriter::with_defaults()
            .to_string(&person())
            .unwrap();
        let decoded = ContainerJsonReader::with_defaults()
            .read_as(&json, &ContainerShape::Immutable)
            .unwrap();

        match decoded {
            DecodedContainer::Immutable(c) => assert_eq!(c, person().freeze()),
            other => panic!("expected immutable container, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_shape_factory_and_known_schema() {
        let shape = CustomShape::new("AuditRecord", |parts| {
            Box::new(AuditRecord {
                values: parts.values,
            })
        })
        .with_known_schema(Schema::named("Audit").with(Property::new("Seq", TypeTag::Long)));

        let decoded = ContainerJsonReader::with_defaults()
            .read_as(r#"{"Seq": 1, "By": "ops"}"#, &ContainerShape::custom(shape))
            .unwrap();

        assert!(matches!(decoded, DecodedContainer::Custom(_)));
        let view = decoded.as_view();
        assert_eq!(view.get("Seq"), Some(&Value::Long(1)));
        assert_eq!(view.get("By"), Some(&Value::from("ops")));
        assert_eq!(view.search_mode(), SearchMode::ExistingOnly);

        let copy = decoded.into_mutable();
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn test_custom_view_writes_like_any_container() {
        let record = AuditRecord {
            values: person().iter().cloned().collect(),
        };
        let from_custom = ContainerJsonWriter::with_defaults()
            .to_string(&record)
            .unwrap();
        let from_mutable = ContainerJsonWriter::with_defaults()
            .to_string(&person())
            .unwrap();
        assert_eq!(from_custom, from_mutable);
    }
}
