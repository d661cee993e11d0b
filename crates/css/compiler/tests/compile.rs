//! End-to-end compilation tests over the serialized rule-set document.
#![cfg(test)]
#![allow(clippy::unwrap_used, clippy::panic, reason = "Tests fail loudly on malformed fixtures")]

use css_compiler::{CompileOptions, compile};
use serde_json::{Value, json};
use style_ir::{
    ComparisonOp, ContainerQuery, MediaCondition, PropertyPath, RuleSetDocument, Specificity, StyleDeclaration,
    StyleDescriptor, StyleRule,
};

fn init() {
    env_logger::builder().is_test(true).try_init().unwrap_or_default();
}

fn document(css: &str) -> RuleSetDocument {
    init();
    compile(css, &CompileOptions::default()).unwrap().into_parts().0
}

fn rules<'doc>(document: &'doc RuleSetDocument, class_name: &str) -> &'doc [StyleRule] {
    document
        .rules_for(class_name)
        .unwrap_or_else(|| panic!("no rules for .{class_name}"))
}

fn static_value<'doc>(rule: &'doc StyleRule, property: &str) -> Option<&'doc StyleDescriptor> {
    rule.declarations.iter().find_map(|declaration| match declaration {
        StyleDeclaration::Static(object) => object.get(property),
        StyleDeclaration::Dynamic(_) => None,
    })
}

#[test]
fn later_variable_declaration_wins_the_cascade() {
    let document = document(
        ".test{color:red;border-color:blue;background-color:red;--test:1;border-color:var(--test)}",
    );
    let [rule] = rules(&document, "test") else {
        panic!("expected a single rule");
    };
    assert_eq!(rule.variables, vec![("test".to_owned(), StyleDescriptor::Number(1.0))]);
    assert_eq!(static_value(rule, "color"), Some(&StyleDescriptor::string("#ff0000")));
    assert_eq!(static_value(rule, "borderColor"), None);
    assert!(rule.dynamic_variables);
    assert!(rule.declarations.contains(&StyleDeclaration::dynamic(
        StyleDescriptor::function("var", vec!["test".into()]),
        PropertyPath::Name("borderColor".into()),
        false,
    )));
}

#[test]
fn inlining_matches_hand_substitution() {
    let chained = document(":root{--a:10px;--b:var(--a);--c:var(--b)} .x{width:var(--c);height:4px}");
    let manual = document(".x{width:10px;height:4px}");
    assert_eq!(
        rules(&chained, "x")[0].declarations,
        rules(&manual, "x")[0].declarations
    );
    assert!(chained.root_variables.is_empty());
}

#[test]
fn disabled_inlining_keeps_variables() {
    init();
    let options = CompileOptions {
        inline_variables: false,
        ..CompileOptions::default()
    };
    let document = compile(":root{--gap:4px;--unused:1} .x{gap:var(--gap)}", &options)
        .unwrap()
        .into_parts()
        .0;
    let names: Vec<&str> = document.root_variables.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["gap", "unused"]);
}

#[test]
fn unused_variables_are_dropped_when_inlining() {
    let document = document(":root{--used:red;--unused:blue} .a{color:var(--used)} .b{color:var(--used)}");
    let names: Vec<&str> = document.root_variables.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["used"]);
}

#[test]
fn light_dark_produces_a_dark_rule() {
    let document = document(".card{color:light-dark(white, black);padding:4px}");
    let [light, dark] = rules(&document, "card") else {
        panic!("expected two rules");
    };
    assert!(light.media.is_empty());
    assert_eq!(static_value(light, "color"), Some(&StyleDescriptor::string("#ffffff")));
    assert_eq!(static_value(light, "padding"), Some(&StyleDescriptor::Number(4.0)));
    assert_eq!(
        dark.media,
        vec![MediaCondition::equals("prefers-color-scheme", "dark")]
    );
    assert_eq!(static_value(dark, "color"), Some(&StyleDescriptor::string("#000000")));
    assert_eq!(static_value(dark, "padding"), None);
    assert_eq!(light.specificity, dark.specificity);
}

#[test]
fn ancestor_classes_become_containers() {
    let document = document(".parent .child{color:red}");
    let json: Value = serde_json::from_str(&document.to_json().unwrap()).unwrap();
    let classes: Vec<&str> = json["s"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry[0].as_str().unwrap())
        .collect();
    assert_eq!(classes, ["parent", "child"]);
    assert_eq!(json["s"][0][1][0]["c"], json!(["parent"]));
    assert_eq!(json["s"][1][1][0]["cq"], json!([{ "n": "parent" }]));

    let [marker] = rules(&document, "parent") else {
        panic!("expected one marker rule");
    };
    assert_eq!(marker.specificity, Specificity::ZERO);
    assert_eq!(rules(&document, "child")[0].container_queries, vec![ContainerQuery::named("parent")]);
}

#[test]
fn container_type_registers_own_class() {
    let document = document(
        ".sidebar{container-type:inline-size} @container (min-width: 300px){.item{flex-direction:row}}",
    );
    assert_eq!(rules(&document, "sidebar")[0].containers, vec!["sidebar".to_owned()]);
    let item = &rules(&document, "item")[0];
    assert_eq!(item.container_queries.len(), 1);
    assert_eq!(item.container_queries[0].name, None);
}

#[test]
fn equivalent_colors_share_one_canonical_form() {
    let document = document(
        ".a{color:rgb(255 0 0)} .b{color:hsl(0 100% 50%)} .c{color:oklch(0.62796 0.25768 29.2339)} .d{color:#ff0000}",
    );
    for class_name in ["a", "b", "c", "d"] {
        assert_eq!(
            static_value(&rules(&document, class_name)[0], "color"),
            Some(&StyleDescriptor::string("#ff0000")),
            ".{class_name}"
        );
    }
}

#[test]
fn rules_are_sorted_by_specificity() {
    for css in [".a.b{color:blue} .a{color:red}", ".a{color:red} .a.b{color:blue}"] {
        let document = document(css);
        let [first, second] = rules(&document, "a") else {
            panic!("expected two rules");
        };
        assert_eq!(first.specificity.class_name, 1);
        assert_eq!(second.specificity.class_name, 2);
        assert_eq!(static_value(second, "color"), Some(&StyleDescriptor::string("#0000ff")));
    }
}

#[test]
fn important_declarations_form_their_own_rule() {
    let document = document(".a{color:red !important;opacity:0.5}");
    let [normal, important] = rules(&document, "a") else {
        panic!("expected two rules");
    };
    assert_eq!(normal.specificity.important, 0);
    assert_eq!(static_value(normal, "opacity"), Some(&StyleDescriptor::Number(0.5)));
    assert_eq!(important.specificity.important, 1);
    assert_eq!(static_value(important, "color"), Some(&StyleDescriptor::string("#ff0000")));
}

#[test]
fn warnings_are_grouped_and_can_be_ignored() {
    init();
    let css = ".a{float:left;display:grid;width:attr(x);color:red}";
    let output = compile(css, &CompileOptions::default()).unwrap();
    let warnings = output.warnings();
    assert_eq!(warnings.properties, vec!["float".to_owned()]);
    assert_eq!(warnings.values["display"], vec!["grid".to_owned()]);
    assert_eq!(warnings.functions, vec!["attr".to_owned()]);
    assert_eq!(
        static_value(&output.stylesheet().rules_for("a").unwrap()[0], "color"),
        Some(&StyleDescriptor::string("#ff0000"))
    );

    let quiet = CompileOptions {
        ignored_warnings: vec!["float".into(), "d*".into()],
        ..CompileOptions::default()
    };
    let quiet_output = compile(css, &quiet).unwrap();
    assert!(quiet_output.warnings().properties.is_empty());
    assert!(quiet_output.warnings().values.is_empty());
}

#[test]
fn media_blocks_condition_rules() {
    let document = document(
        "@media (min-width: 640px) { .a{color:red} } @media print { .b{color:red} } @media ios { .c{color:red} }",
    );
    assert_eq!(
        rules(&document, "a")[0].media,
        vec![MediaCondition::Compare {
            op: ComparisonOp::GreaterEqual,
            feature: "width".into(),
            value: 640.0.into(),
        }]
    );
    assert!(document.rules_for("b").is_none());
    assert_eq!(
        rules(&document, "c")[0].media,
        vec![MediaCondition::equals("platform", "ios")]
    );
}

#[test]
fn nested_rules_and_media() {
    let document = document(".btn{color:red; &:hover{color:blue} @media (prefers-color-scheme: dark){color:white}}");
    let rules = rules(&document, "btn");
    assert_eq!(rules.len(), 3);
    assert!(rules.iter().any(StyleRule::has_pseudo_classes));
    assert!(rules.iter().any(|rule| !rule.media.is_empty()));
}

#[test]
fn keyframes_and_animation_flags() {
    let document = document(
        "@keyframes fade { from {opacity:0} 50% {opacity:0.2;animation-timing-function:ease-in} to {opacity:1} } .a{animation:fade 1s}",
    );
    let (name, frames) = &document.keyframes[0];
    assert_eq!(name, "fade");
    let progress: Vec<f64> = frames.frames.iter().map(|frame| frame.0).collect();
    assert_eq!(progress, [0.0, 0.5, 1.0]);
    assert_eq!(frames.easing, vec![(0.5, StyleDescriptor::string("ease-in"))]);
    assert!(rules(&document, "a")[0].animated);
}

#[test]
fn dark_root_variables_come_first() {
    let document = document(":root{--bg:white} .dark:root{--bg:black} .a{background-color:var(--bg)}");
    let (name, alternatives) = &document.root_variables[0];
    assert_eq!(name, "bg");
    assert_eq!(alternatives.len(), 2);
    assert_eq!(alternatives[0].value, StyleDescriptor::string("black"));
    assert_eq!(
        alternatives[0].media,
        Some(MediaCondition::equals("prefers-color-scheme", "dark"))
    );
    assert_eq!(alternatives[1].media, None);
}

#[test]
fn prop_mappings_redirect_declarations() {
    let document = document(".input{color:red; @prop color: placeholderTextColor;}");
    assert_eq!(
        rules(&document, "input")[0].declarations,
        vec![StyleDeclaration::dynamic(
            StyleDescriptor::string("#ff0000"),
            PropertyPath::anchored(&["placeholderTextColor"]),
            false,
        )]
    );
}

#[test]
fn selector_prefix_is_stripped() {
    init();
    let options = CompileOptions {
        selector_prefix: Some("#app".into()),
        ..CompileOptions::default()
    };
    let output = compile("#app .title{font-weight:bold}", &options).unwrap();
    assert!(output.stylesheet().rules_for("title").is_some());
}

#[test]
fn deep_nesting_is_a_compile_error() {
    init();
    let css = format!("{}{}", ".a{".repeat(80), "}".repeat(80));
    let error = compile(&css, &CompileOptions::default()).unwrap_err();
    assert!(error.line >= 1);
}

#[test]
fn document_round_trips_through_json() {
    let document = document(
        ":root{--x:2px} .a{margin:var(--x);transform:rotate(45deg)} .b:hover{opacity:0.5} @keyframes spin{to{transform:rotate(1turn)}}",
    );
    let parsed = RuleSetDocument::from_json(&document.to_json().unwrap()).unwrap();
    assert_eq!(parsed, document);
}
