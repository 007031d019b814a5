use std::collections::HashSet;

use crate::dom::{Container, DomError, Document, Element, Input, InputType, Node};
use crate::form::constraints::{self, ViolationKind};
use crate::form::{
    add_record_inputs, resolve_count, CountError, CountPolicy, FormError, FormGenerator,
    CONTAINER_ID, COUNT_FIELD_ID,
};
use crate::runner::{Options, Runner, RunnerError, ValuesSource};

fn generate(count: &str) -> Document {
    let mut doc = Document::records_form();
    doc.set_value(COUNT_FIELD_ID, count).unwrap();
    add_record_inputs(&mut doc).unwrap();
    doc
}

fn records(doc: &Document) -> &Container {
    doc.container(CONTAINER_ID).unwrap()
}

fn input_ids(doc: &Document) -> Vec<String> {
    records(doc).inputs().map(|i| i.id.clone()).collect()
}

#[test]
fn zero_count_leaves_container_empty() {
    let doc = generate("0");
    assert!(records(&doc).is_empty());
    assert_eq!(doc.inner_html(CONTAINER_ID).unwrap(), "");
}

#[test]
fn two_records_produce_headings_and_ids_in_order() {
    let doc = generate("2");
    assert_eq!(records(&doc).headings(), vec!["Record 1", "Record 2"]);
    assert_eq!(
        input_ids(&doc),
        vec![
            "sn_0",
            "description_0",
            "rate_0",
            "quantity_0",
            "sn_1",
            "description_1",
            "rate_1",
            "quantity_1",
        ]
    );
}

#[test]
fn n_records_produce_four_n_unique_inputs() {
    let doc = generate("7");
    let ids = input_ids(&doc);
    assert_eq!(records(&doc).headings().len(), 7);
    assert_eq!(ids.len(), 28);
    let all: Vec<&str> = doc.ids();
    let unique: HashSet<&str> = all.iter().copied().collect();
    assert_eq!(unique.len(), all.len());
}

#[test]
fn every_input_is_required_and_numeric_ones_step_by_cents() {
    let doc = generate("3");
    for input in records(&doc).inputs() {
        assert!(input.required, "{} is not required", input.id);
        let numeric = input.id.starts_with("rate_") || input.id.starts_with("quantity_");
        if numeric {
            assert_eq!(input.input_type, InputType::Number);
            assert_eq!(input.step.as_deref(), Some("0.01"));
        } else {
            assert_eq!(input.input_type, InputType::Text);
            assert_eq!(input.step, None);
        }
    }
}

#[test]
fn each_input_is_preceded_by_its_label() {
    let doc = generate("1");
    let children = records(&doc).children();
    for (i, node) in children.iter().enumerate() {
        if let Node::Input(input) = node {
            match &children[i - 1] {
                Node::Label { for_id, .. } => assert_eq!(for_id, &input.id),
                other => panic!("expected label before {}, got {other:?}", input.id),
            }
        }
    }
}

#[test]
fn single_record_markup_matches_template() {
    let doc = generate("1");
    let expected = concat!(
        "<h3>Record 1</h3>",
        r#"<label for="sn_0">S.no:</label>"#,
        r#"<input type="text" id="sn_0" name="sn_0" required><br><br>"#,
        r#"<label for="description_0">Description:</label>"#,
        r#"<input type="text" id="description_0" name="description_0" required><br><br>"#,
        r#"<label for="rate_0">Rate:</label>"#,
        r#"<input type="number" id="rate_0" name="rate_0" required step="0.01"><br><br>"#,
        r#"<label for="quantity_0">Quantity:</label>"#,
        r#"<input type="number" id="quantity_0" name="quantity_0" required step="0.01"><br><br>"#,
    );
    assert_eq!(doc.inner_html(CONTAINER_ID).unwrap(), expected);
}

#[test]
fn regenerating_with_smaller_count_replaces_everything() {
    let mut doc = generate("5");
    doc.set_value("sn_4", "stale").unwrap();
    doc.set_value(COUNT_FIELD_ID, "2").unwrap();
    add_record_inputs(&mut doc).unwrap();
    assert_eq!(input_ids(&doc).len(), 8);
    assert!(matches!(
        doc.input("sn_4"),
        Err(DomError::MissingElement { .. })
    ));
    assert_eq!(records(&doc).headings(), vec!["Record 1", "Record 2"]);
}

#[test]
fn regenerating_with_same_count_is_idempotent() {
    let mut doc = generate("3");
    let first = doc.inner_html(CONTAINER_ID).unwrap();
    add_record_inputs(&mut doc).unwrap();
    assert_eq!(doc.inner_html(CONTAINER_ID).unwrap(), first);
}

#[test]
fn regenerating_clears_filled_values() {
    let mut doc = generate("1");
    doc.set_value("description_0", "Flange").unwrap();
    add_record_inputs(&mut doc).unwrap();
    assert_eq!(doc.value("description_0").unwrap(), "");
}

#[test]
fn lenient_policy_treats_junk_as_zero() {
    for raw in ["", "abc", "-3", "0", "  ", "NaN"] {
        assert_eq!(
            resolve_count(raw, CountPolicy::Lenient, 500),
            Ok(0),
            "raw {raw:?}"
        );
    }
}

#[test]
fn lenient_policy_follows_loop_bound_for_fractions() {
    assert_eq!(resolve_count("2.5", CountPolicy::Lenient, 500), Ok(3));
    assert_eq!(resolve_count("0.1", CountPolicy::Lenient, 500), Ok(1));
    assert_eq!(resolve_count("3.0", CountPolicy::Lenient, 500), Ok(3));
    assert_eq!(resolve_count(" 4 ", CountPolicy::Lenient, 500), Ok(4));
}

#[test]
fn strict_policy_rejects_non_integers() {
    for raw in ["", "abc", "-3", "2.5", "1e2"] {
        assert_eq!(
            resolve_count(raw, CountPolicy::Strict, 500),
            Err(CountError::Invalid {
                raw: raw.to_string()
            }),
            "raw {raw:?}"
        );
    }
    assert_eq!(resolve_count(" 4 ", CountPolicy::Strict, 500), Ok(4));
    assert_eq!(resolve_count("0", CountPolicy::Strict, 500), Ok(0));
}

#[test]
fn both_policies_enforce_the_maximum() {
    assert_eq!(
        resolve_count("11", CountPolicy::Strict, 10),
        Err(CountError::TooLarge {
            raw: "11".to_string(),
            max: 10
        })
    );
    assert_eq!(
        resolve_count(" 10.5 ", CountPolicy::Lenient, 10),
        Err(CountError::TooLarge {
            raw: "10.5".to_string(),
            max: 10
        })
    );
    assert!(matches!(
        resolve_count("99999999999999999999999", CountPolicy::Strict, 10),
        Err(CountError::TooLarge { .. })
    ));
}

#[test]
fn lenient_counts_beyond_float_range_are_too_large() {
    for raw in ["1e308", "1e309", "9e99999"] {
        assert_eq!(
            resolve_count(raw, CountPolicy::Lenient, 500),
            Err(CountError::TooLarge {
                raw: raw.to_string(),
                max: 500
            }),
            "raw {raw:?}"
        );
    }
    assert_eq!(resolve_count("-1e309", CountPolicy::Lenient, 500), Ok(0));
}

#[test]
fn overflowing_strict_count_reports_the_typed_text() {
    let raw = "99999999999999999999999";
    let err = resolve_count(raw, CountPolicy::Strict, 500).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("record count '{raw}' exceeds the maximum of 500")
    );
    assert!(!err.to_string().contains(&usize::MAX.to_string()));
}

#[test]
fn rejected_count_leaves_container_untouched() {
    let mut doc = generate("2");
    let before = doc.inner_html(CONTAINER_ID).unwrap();
    doc.set_value(COUNT_FIELD_ID, "two").unwrap();
    let generator = FormGenerator::new(CountPolicy::Strict, 500);
    let err = generator.add_record_inputs(&mut doc).unwrap_err();
    assert!(matches!(err, FormError::Count(CountError::Invalid { .. })));
    assert_eq!(doc.inner_html(CONTAINER_ID).unwrap(), before);
}

#[test]
fn missing_elements_are_reported() {
    let mut doc = Document::new();
    assert_eq!(
        add_record_inputs(&mut doc),
        Err(FormError::Dom(DomError::MissingElement {
            id: COUNT_FIELD_ID.to_string()
        }))
    );

    doc.insert(Element::Input(
        Input::new(COUNT_FIELD_ID, InputType::Number).with_value("1"),
    ))
    .unwrap();
    assert_eq!(
        add_record_inputs(&mut doc),
        Err(FormError::Dom(DomError::MissingElement {
            id: CONTAINER_ID.to_string()
        }))
    );
}

#[test]
fn duplicate_ids_are_rejected_on_insert() {
    let mut doc = Document::records_form();
    let err = doc
        .insert(Element::Container(Container::new(CONTAINER_ID)))
        .unwrap_err();
    assert_eq!(
        err,
        DomError::DuplicateId {
            id: CONTAINER_ID.to_string()
        }
    );
}

#[test]
fn insert_rejects_container_holding_a_taken_input_id() {
    let mut doc = generate("1");
    let mut extra = Container::new("extra");
    extra.push(Node::Input(Input::new("sn_0", InputType::Text)));
    assert_eq!(
        doc.insert(Element::Container(extra)),
        Err(DomError::DuplicateId {
            id: "sn_0".to_string()
        })
    );
    assert!(doc.container("extra").is_err());
}

#[test]
fn insert_rejects_container_repeating_an_id_inside_itself() {
    let mut doc = Document::records_form();
    let mut extra = Container::new("extra");
    extra.push(Node::Input(Input::new("note", InputType::Text)));
    extra.push(Node::Input(Input::new("note", InputType::Text)));
    assert_eq!(
        doc.insert(Element::Container(extra)),
        Err(DomError::DuplicateId {
            id: "note".to_string()
        })
    );
}

#[test]
fn generator_refuses_ids_taken_outside_the_container() {
    let mut doc = Document::records_form();
    doc.insert(Element::Input(Input::new("sn_0", InputType::Text)))
        .unwrap();
    doc.set_value(COUNT_FIELD_ID, "1").unwrap();
    assert_eq!(
        add_record_inputs(&mut doc),
        Err(FormError::Dom(DomError::DuplicateId {
            id: "sn_0".to_string()
        }))
    );
    assert!(records(&doc).is_empty());

    // ids only collide with the indices actually generated
    doc.set_value(COUNT_FIELD_ID, "0").unwrap();
    assert_eq!(add_record_inputs(&mut doc), Ok(0));
}

#[test]
fn regenerating_reuses_the_containers_own_ids() {
    let mut doc = generate("2");
    doc.set_value(COUNT_FIELD_ID, "3").unwrap();
    assert_eq!(add_record_inputs(&mut doc), Ok(3));
    let ids = doc.ids();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
}

#[test]
fn container_is_not_an_input() {
    let doc = Document::records_form();
    assert!(matches!(
        doc.input(CONTAINER_ID),
        Err(DomError::NotAnInput { .. })
    ));
    assert!(matches!(
        doc.container(COUNT_FIELD_ID),
        Err(DomError::NotAContainer { .. })
    ));
}

#[test]
fn form_data_lists_count_then_record_fields() {
    let mut doc = generate("1");
    doc.set_value("rate_0", "9.99").unwrap();
    let data = doc.form_data();
    assert_eq!(data[0], ("records_count".to_string(), "1".to_string()));
    assert_eq!(data.len(), 5);
    assert!(data.contains(&("rate_0".to_string(), "9.99".to_string())));
    assert!(data.contains(&("sn_0".to_string(), String::new())));
}

#[test]
fn filled_values_are_escaped_in_markup() {
    let mut doc = generate("1");
    doc.set_value("description_0", r#"5" pipe & <cap>"#).unwrap();
    let html = doc.inner_html(CONTAINER_ID).unwrap();
    assert!(html.contains(r#"value="5&quot; pipe &amp; &lt;cap&gt;""#));
}

#[test]
fn empty_generated_form_violates_required() {
    let doc = generate("1");
    let violations = constraints::validate(&doc, CONTAINER_ID).unwrap();
    assert_eq!(violations.len(), 4);
    assert!(violations
        .iter()
        .all(|v| v.kind == ViolationKind::ValueMissing));
}

#[test]
fn bad_numbers_are_reported_per_input() {
    let mut doc = generate("1");
    doc.set_value("sn_0", "1").unwrap();
    doc.set_value("description_0", "Bolt").unwrap();
    doc.set_value("rate_0", "ten").unwrap();
    doc.set_value("quantity_0", "1.234").unwrap();
    let violations = constraints::validate(&doc, CONTAINER_ID).unwrap();
    let kinds: Vec<_> = violations.iter().map(|v| (v.id.as_str(), v.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            ("rate_0", ViolationKind::BadInput),
            ("quantity_0", ViolationKind::StepMismatch),
        ]
    );
}

fn inline(items: &[(&str, &str)]) -> Option<ValuesSource> {
    Some(ValuesSource::Inline(
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    ))
}

#[tokio::test]
async fn runner_without_values_only_generates() {
    let runner = Runner::new(Options {
        count: "3".to_string(),
        ..Options::default()
    })
    .unwrap();
    let result = runner.run().await.unwrap();
    assert_eq!(result.count, 3);
    assert!(result.records.is_none());
    assert!(result.violations.is_empty());
    assert_eq!(
        result
            .document
            .container(CONTAINER_ID)
            .unwrap()
            .inputs()
            .count(),
        12
    );
}

#[tokio::test]
async fn runner_collects_records_and_offer_details() {
    let runner = Runner::new(Options {
        count: "2".to_string(),
        values: inline(&[
            ("offer_name", "Spares"),
            ("sn_0", "1"),
            ("description_0", "Valve"),
            ("rate_0", "12.50"),
            ("quantity_0", "4"),
            ("sn_1", "2"),
            ("description_1", "Seal"),
            ("rate_1", "0.75"),
            ("quantity_1", "10"),
            ("colour_0", "red"),
        ]),
        ..Options::default()
    })
    .unwrap();
    let result = runner.run().await.unwrap();
    let records = result.records.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].amount(), 50.0);
    assert_eq!(records[1].amount(), 7.5);
    assert_eq!(result.offer.offer_name.as_deref(), Some("Spares"));
    assert_eq!(result.unknown_fields, vec!["colour_0".to_string()]);
}

#[tokio::test]
async fn runner_reports_violations_instead_of_records() {
    let runner = Runner::new(Options {
        count: "1".to_string(),
        values: inline(&[("sn_0", "1"), ("rate_0", "3")]),
        ..Options::default()
    })
    .unwrap();
    let result = runner.run().await.unwrap();
    assert!(result.records.is_none());
    let ids: Vec<_> = result.violations.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["description_0", "quantity_0"]);
}

#[tokio::test]
async fn runner_ignores_count_field_in_values() {
    let runner = Runner::new(Options {
        count: "0".to_string(),
        values: inline(&[("records_count", "5")]),
        ..Options::default()
    })
    .unwrap();
    let result = runner.run().await.unwrap();
    assert_eq!(result.count, 0);
    assert_eq!(result.records, Some(Vec::new()));
    assert_eq!(result.unknown_fields, vec!["records_count".to_string()]);
}

#[tokio::test]
async fn runner_strict_policy_surfaces_count_error() {
    let runner = Runner::new(Options {
        count: "-1".to_string(),
        policy: CountPolicy::Strict,
        ..Options::default()
    })
    .unwrap();
    let err = runner.run().await.unwrap_err();
    assert!(matches!(
        err,
        RunnerError::Form(FormError::Count(CountError::Invalid { .. }))
    ));
}

#[tokio::test]
async fn runner_reads_values_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("values.yml");
    std::fs::write(
        &path,
        "sn_0: A-1\ndescription_0: Gasket\nrate_0: 2.25\nquantity_0: 8\ncompany_name: Acme\n",
    )
    .unwrap();

    let runner = Runner::new(Options {
        count: "1".to_string(),
        values: Some(ValuesSource::FilePath(path.to_string_lossy().to_string())),
        ..Options::default()
    })
    .unwrap();
    let result = runner.run().await.unwrap();
    let records = result.records.unwrap();
    assert_eq!(records[0].sn, "A-1");
    assert_eq!(records[0].amount(), 18.0);
    assert_eq!(result.offer.company_name.as_deref(), Some("Acme"));
}

#[tokio::test]
async fn runner_missing_values_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yml");
    let runner = Runner::new(Options {
        count: "1".to_string(),
        values: Some(ValuesSource::FilePath(path.to_string_lossy().to_string())),
        ..Options::default()
    })
    .unwrap();
    assert!(matches!(
        runner.run().await,
        Err(RunnerError::ValuesRead { .. })
    ));
}

#[test]
fn records_text_output_aligns_columns() {
    let records = vec![crate::records::Record {
        sn: "1".to_string(),
        description: "Valve".to_string(),
        rate: 12.5,
        quantity: 4.0,
    }];
    let offer = crate::records::OfferDetails::default();
    let text = String::from_utf8(crate::output::render_records_text(&records, &offer)).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "S.no  Description  Rate   Quantity  Amount");
    assert_eq!(lines[2], "1     Valve        12.50  4.00      50.00");
}

#[test]
fn records_html_output_shades_header_and_rows() {
    let records = vec![
        crate::records::Record {
            sn: "1".to_string(),
            description: "A".to_string(),
            rate: 1.0,
            quantity: 1.0,
        };
        2
    ];
    let html = String::from_utf8(crate::output::render_records_html(&records)).unwrap();
    assert!(html.contains("background-color:#808080"));
    let white = html.find("background-color:#FFFFFF").unwrap();
    let grey = html.find("background-color:#D3D3D3").unwrap();
    assert!(white < grey);
}

#[test]
fn fragment_json_describes_fields() {
    let doc = generate("1");
    let json = crate::output::render_fragment(crate::output::OutputFormat::Json, records(&doc));
    let parsed: serde_json::Value = serde_json::from_slice(&json).unwrap();
    let fields = parsed.as_array().unwrap();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[2]["id"], "rate_0");
    assert_eq!(fields[2]["label"], "Rate");
    assert_eq!(fields[2]["input_type"], "number");
    assert_eq!(fields[2]["step"], "0.01");
    assert_eq!(fields[2]["record"], 1);
}

#[test]
fn records_json_omits_empty_offer() {
    let offer = crate::records::OfferDetails::default();
    let json = crate::output::render_records(crate::output::OutputFormat::Json, &[], &offer);
    let parsed: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert!(parsed.get("offer").is_none());
    assert_eq!(parsed["records"].as_array().unwrap().len(), 0);
}
