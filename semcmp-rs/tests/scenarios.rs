//! End-to-end comparisons through the document pipeline.
//!
//! Each test parses two inputs, resolves options and checks the verdict and
//! the classified differences.

use semcmp::{
    compare_documents, register_profile, resolve_options, Classification, ConfigError, Dimension,
    DiffKind, Error, Format, GlobalConfig, Overrides, ResolveArgs,
};

fn with_overrides(overrides: Overrides) -> ResolveArgs {
    ResolveArgs::new().overrides(overrides)
}

#[test]
fn test_self_closing_and_empty_elements_are_equivalent() {
    let result = compare_documents(
        "<a><b/></a>",
        "<a><b></b></a>",
        Format::Xml,
        &ResolveArgs::new().profile("strict"),
    )
    .unwrap();
    assert!(result.equivalent());
    assert!(result.normative_differences().is_empty());
}

#[test]
fn test_normalized_text_is_formatting_only() {
    let result = compare_documents(
        "<a> text </a>",
        "<a>text</a>",
        Format::Xml,
        &with_overrides(Overrides::new().set("text_content", "normalize")),
    )
    .unwrap();
    assert!(result.equivalent());
    assert_eq!(result.differences().len(), 1);
    let diff = &result.differences()[0];
    assert_eq!(diff.dimension(), Dimension::TextContent);
    assert_eq!(diff.classification(), Some(Classification::Formatting));

    // The same documents differ under strict text comparison.
    let result =
        compare_documents("<a> text </a>", "<a>text</a>", Format::Xml, &ResolveArgs::new())
            .unwrap();
    assert!(!result.equivalent());
}

#[test]
fn test_reordered_identified_siblings() {
    let left = r#"<list><x id="1"/><y id="2"/></list>"#;
    let right = r#"<list><y id="2"/><x id="1"/></list>"#;

    let ignore = Overrides::new()
        .identity_attributes(["id"])
        .set("element_position", "ignore");
    let result = compare_documents(left, right, Format::Xml, &with_overrides(ignore)).unwrap();
    assert!(result.equivalent());
    assert!(result.normative_differences().is_empty());

    let strict = Overrides::new()
        .identity_attributes(["id"])
        .set("element_position", "strict");
    let result = compare_documents(left, right, Format::Xml, &with_overrides(strict)).unwrap();
    assert!(!result.equivalent());
    let normative = result.normative_differences();
    assert_eq!(normative.len(), 2);
    assert!(normative
        .iter()
        .all(|d| d.dimension() == Dimension::ElementPosition && d.kind() == DiffKind::ElementMoved));
}

#[test]
fn test_attribute_order_dimension() {
    let left = r#"<a x="1" y="2"/>"#;
    let right = r#"<a y="2" x="1"/>"#;

    let strict = with_overrides(Overrides::new().set("attribute_order", "strict"));
    let result = compare_documents(left, right, Format::Xml, &strict).unwrap();
    assert!(!result.equivalent());
    assert_eq!(
        result.normative_differences()[0].dimension(),
        Dimension::AttributeOrder
    );

    let ignore = with_overrides(Overrides::new().set("attribute_order", "ignore"));
    let result = compare_documents(left, right, Format::Xml, &ignore).unwrap();
    assert!(result.equivalent());
}

#[test]
fn test_json_key_order_dimension() {
    let left = r#"{"a":1,"b":2}"#;
    let right = r#"{"b":2,"a":1}"#;

    let ignore = with_overrides(Overrides::new().set("key_order", "ignore"));
    let result = compare_documents(left, right, Format::Json, &ignore).unwrap();
    assert!(result.equivalent());

    let strict = with_overrides(Overrides::new().set("key_order", "strict"));
    let result = compare_documents(left, right, Format::Json, &strict).unwrap();
    assert!(!result.equivalent());
    assert!(result
        .normative_differences()
        .iter()
        .all(|d| d.dimension() == Dimension::KeyOrder));
}

#[test]
fn test_unknown_profile_is_a_configuration_error() {
    let err = resolve_options(Format::Xml, &ResolveArgs::new().profile("nonexistent")).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownProfile(ref name) if name == "nonexistent"));

    let err = compare_documents(
        "<a/>",
        "<a/>",
        Format::Xml,
        &ResolveArgs::new().profile("nonexistent"),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::UnknownProfile(_))));
}

#[test]
fn test_json_arrays_are_positional() {
    let result = compare_documents("[1, 2]", "[2, 1]", Format::Json, &ResolveArgs::new()).unwrap();
    assert!(!result.equivalent());
    assert!(result
        .normative_differences()
        .iter()
        .all(|d| d.dimension() == Dimension::TextContent));
}

#[test]
fn test_json_and_yaml_nested_values() {
    let result = compare_documents(
        r#"{"user": {"name": "ada", "tags": ["x"]}}"#,
        r#"{"user": {"tags": ["x"], "name": "ada"}}"#,
        Format::Json,
        &ResolveArgs::new(),
    )
    .unwrap();
    assert!(result.equivalent());
    assert!(result.informative_differences().is_empty());

    let result = compare_documents(
        "user:\n  name: ada\n  age: 36\n",
        "user:\n  name: ada\n  age: 37\n",
        Format::Yaml,
        &ResolveArgs::new(),
    )
    .unwrap();
    assert!(!result.equivalent());
    let diff = result.normative_differences()[0];
    assert_eq!(diff.left_value(), Some("36"));
    assert_eq!(diff.right_value(), Some("37"));
}

#[test]
fn test_missing_json_key_is_structural() {
    let result =
        compare_documents(r#"{"a": 1}"#, r#"{"a": 1, "b": null}"#, Format::Json, &ResolveArgs::new())
            .unwrap();
    assert!(!result.equivalent());
    let diff = result.normative_differences()[0];
    assert_eq!(diff.kind(), DiffKind::MissingNode);
    assert_eq!(diff.dimension(), Dimension::ElementStructure);
}

#[test]
fn test_html_rendering_ignores_layout_but_not_pre() {
    let result = compare_documents(
        "<div>\n  <p>Hello\n     world</p>\n  <!-- draft -->\n</div>",
        "<div><p>Hello world</p></div>",
        Format::Html,
        &ResolveArgs::new(),
    )
    .unwrap();
    assert!(result.equivalent());

    let result = compare_documents(
        "<div><pre>a  b</pre></div>",
        "<div><pre>a b</pre></div>",
        Format::Html,
        &ResolveArgs::new(),
    )
    .unwrap();
    assert!(!result.equivalent());
    assert_eq!(
        result.normative_differences()[0].dimension(),
        Dimension::TextContent
    );
}

#[test]
fn test_xml_space_preserve_forces_strict_text() {
    let args = with_overrides(Overrides::new().set("text_content", "normalize"));
    let result = compare_documents(
        r#"<r xml:space="preserve"><t> x </t></r>"#,
        r#"<r xml:space="preserve"><t>x</t></r>"#,
        Format::Xml,
        &args,
    )
    .unwrap();
    assert!(!result.equivalent());

    let args = with_overrides(
        Overrides::new()
            .set("text_content", "normalize")
            .respect_xml_space(false),
    );
    let result = compare_documents(
        r#"<r xml:space="preserve"><t> x </t></r>"#,
        r#"<r xml:space="preserve"><t>x</t></r>"#,
        Format::Xml,
        &args,
    )
    .unwrap();
    assert!(result.equivalent());
}

#[test]
fn test_spec_friendly_profile_tolerates_reformatting() {
    let left = "<doc>\n  <!-- generated -->\n  <title>Intro</title>\n  <p>Some   text</p>\n</doc>";
    let right = "<doc><p>Some text</p><title>Intro</title></doc>";
    let result = compare_documents(
        left,
        right,
        Format::Xml,
        &ResolveArgs::new().profile("spec_friendly"),
    )
    .unwrap();
    assert!(result.equivalent());

    let result = compare_documents(left, right, Format::Xml, &ResolveArgs::new()).unwrap();
    assert!(!result.equivalent());
}

#[test]
fn test_ignored_attributes_drop_out() {
    let left = r#"<a id="gen-1" data-build="7" class="x"/>"#;
    let right = r#"<a id="gen-2" class="x"/>"#;
    let args = with_overrides(
        Overrides::new()
            .ignore_attributes(["^data-"])
            .ignore_attribute_values(["^gen-"]),
    );
    let result = compare_documents(left, right, Format::Xml, &args).unwrap();
    assert!(result.equivalent());
    assert!(result.differences().is_empty());
}

#[test]
fn test_element_name_and_namespace_are_always_normative() {
    let args = ResolveArgs::new().profile("content_only");
    let result = compare_documents("<r><a/></r>", "<r><b/></r>", Format::Xml, &args).unwrap();
    assert!(!result.equivalent());

    let result = compare_documents(
        r#"<r xmlns="urn:one"/>"#,
        r#"<r xmlns="urn:two"/>"#,
        Format::Xml,
        &with_overrides(
            Overrides::new()
                .set("attribute_presence", "ignore")
                .semantic_diff(false),
        ),
    )
    .unwrap();
    assert!(!result.equivalent());
    assert!(result
        .normative_differences()
        .iter()
        .any(|d| d.dimension() == Dimension::NamespaceUri));
}

#[test]
fn test_comment_differences_follow_comments_dimension() {
    let left = "<a><!--one--><b/></a>";
    let right = "<a><!--two--><b/></a>";

    let result = compare_documents(left, right, Format::Xml, &ResolveArgs::new()).unwrap();
    assert!(!result.equivalent());
    assert_eq!(
        result.normative_differences()[0].dimension(),
        Dimension::Comments
    );

    let args = with_overrides(Overrides::new().set("comments", "ignore"));
    let result = compare_documents(left, right, Format::Xml, &args).unwrap();
    assert!(result.equivalent());
    assert!(result.differences().is_empty());
}

#[test]
fn test_custom_profile_round_trip() {
    register_profile(
        "scenario_lenient_text",
        &[("text_content", "normalize"), ("comments", "ignore")],
    )
    .unwrap();

    let result = compare_documents(
        "<a><!--c-->x  y</a>",
        "<a>x y</a>",
        Format::Xml,
        &ResolveArgs::new().profile("scenario_lenient_text"),
    )
    .unwrap();
    assert!(result.equivalent());

    let err = register_profile("scenario_lenient_text", &[]).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateProfile(_)));
    let err = register_profile("strict", &[]).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateProfile(_)));
}

#[test]
fn test_global_config_sits_below_call_arguments() {
    let config = GlobalConfig::from_toml_str(
        r#"
        [xml]
        profile = "spec_friendly"

        [xml.overrides]
        comments = "strict"
        "#,
    )
    .unwrap();

    let left = "<a><!--one-->x</a>";
    let right = "<a><!--two-->x</a>";

    let args = ResolveArgs::new().global(config.for_format(Format::Xml));
    let result = compare_documents(left, right, Format::Xml, &args).unwrap();
    assert!(!result.equivalent());

    let args = ResolveArgs::new()
        .global(config.for_format(Format::Xml))
        .overrides(Overrides::new().set("comments", "ignore"));
    let result = compare_documents(left, right, Format::Xml, &args).unwrap();
    assert!(result.equivalent());
}

#[test]
fn test_summary_counts_every_difference() {
    let result = compare_documents(
        r#"<a x="1"> t <b/></a>"#,
        r#"<a x="2">t<b/></a>"#,
        Format::Xml,
        &with_overrides(Overrides::new().set("text_content", "normalize")),
    )
    .unwrap();
    let summary = result.summary();
    assert_eq!(summary.normative, 1);
    assert_eq!(summary.formatting, 1);
    assert_eq!(
        summary.normative + summary.informative + summary.formatting,
        result.differences().len()
    );
}

#[test]
fn test_blank_json_strings_are_values() {
    for (left, right) in [
        (r#"{"a": " "}"#, r#"{"a": ""}"#),
        (r#"{"a": " "}"#, r#"{"a": "\n\n"}"#),
    ] {
        let result = compare_documents(left, right, Format::Json, &ResolveArgs::new()).unwrap();
        assert!(!result.equivalent(), "{} vs {}", left, right);
        assert!(result
            .normative_differences()
            .iter()
            .all(|d| d.dimension() == Dimension::TextContent));
    }

    let result =
        compare_documents("a: \" \"\n", "a: \"\"\n", Format::Yaml, &ResolveArgs::new()).unwrap();
    assert!(!result.equivalent());
}

#[test]
fn test_whitespace_around_document_element_is_not_content() {
    let result = compare_documents("<a/>\n", "<a/>", Format::Xml, &ResolveArgs::new()).unwrap();
    assert!(result.equivalent());
    assert!(result.differences().is_empty());

    let result = compare_documents(
        "<?xml version=\"1.0\"?>\n<a><b/></a>\n",
        "<a><b></b></a>",
        Format::Xml,
        &ResolveArgs::new().profile("strict"),
    )
    .unwrap();
    assert!(result.equivalent());
    assert!(result.differences().is_empty());
}

#[test]
fn test_insertion_before_identified_siblings_moves_them() {
    let left = r#"<r><x id="1"/><y id="2"/></r>"#;
    let right = r#"<r><n/><x id="1"/><y id="2"/></r>"#;
    let strict = Overrides::new()
        .identity_attributes(["id"])
        .set("element_position", "strict");
    let result = compare_documents(left, right, Format::Xml, &with_overrides(strict)).unwrap();
    assert!(!result.equivalent());

    let moves: Vec<_> = result
        .differences()
        .iter()
        .filter(|d| d.kind() == DiffKind::ElementMoved)
        .collect();
    assert_eq!(moves.len(), 2);
    assert!(moves
        .iter()
        .all(|d| d.dimension() == Dimension::ElementPosition && d.is_normative()));
    assert_eq!(moves[1].left_value(), Some("1"));
    assert_eq!(moves[1].right_value(), Some("2"));
    assert!(result
        .normative_differences()
        .iter()
        .any(|d| d.kind() == DiffKind::MissingNode && d.dimension() == Dimension::ElementStructure));

    let ignore = Overrides::new()
        .identity_attributes(["id"])
        .set("element_position", "ignore");
    let result = compare_documents(left, right, Format::Xml, &with_overrides(ignore)).unwrap();
    assert_eq!(result.normative_differences().len(), 1);
}
