//! Compiled stylesheets resolved through components.
#![cfg(test)]
#![allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]

use core::cell::Cell;
use css_compiler::{CompileOptions, compile};
use std::rc::Rc;
use style_engine::{
    ColorScheme, ComponentInstance, EnvironmentOptions, InheritedContext, Props, RenderOutput, StyleConfig,
    StyleError, StyleStore,
};
use style_ir::{PropertyPath, RuleSetDocument, Specificity, StyleDeclaration, StyleDescriptor, StyleObject, StyleRule};

fn init() {
    env_logger::builder().is_test(true).try_init().unwrap_or_default();
}

fn document_with(css: &str, options: &CompileOptions) -> RuleSetDocument {
    init();
    compile(css, options).unwrap().into_parts().0
}

fn store(css: &str) -> Rc<StyleStore> {
    let store = StyleStore::new(EnvironmentOptions::default());
    store.inject(&document_with(css, &CompileOptions::default()));
    store
}

/// A component whose change notifications are counted.
fn component(store: &Rc<StyleStore>) -> (ComponentInstance, Rc<Cell<u32>>) {
    let changes = Rc::new(Cell::new(0));
    let counter = Rc::clone(&changes);
    let component = ComponentInstance::new(Rc::clone(store), vec![StyleConfig::default()], move || {
        counter.set(counter.get() + 1);
    });
    (component, changes)
}

fn classes(names: &str) -> Props {
    Props::new().with("className", names)
}

fn render(component: &ComponentInstance, props: &Props) -> Rc<RenderOutput> {
    component.render(props, &InheritedContext::new()).unwrap()
}

#[test]
fn important_beats_inline_style() {
    let store = store(".a{color:red !important; width:10px}");
    let (component, _) = component(&store);
    let mut inline = StyleObject::new();
    inline.insert("color".into(), "green".into());
    inline.insert("width".into(), 20.0.into());
    let props = classes("a").with("style", StyleDescriptor::Object(inline));
    let output = render(&component, &props);
    assert_eq!(output.style_value("color"), Some(&"#ff0000".into()));
    assert_eq!(output.style_value("width"), Some(&20.0.into()));
}

#[test]
fn specificity_beats_source_order() {
    for css in [".a.b{color:blue} .b{color:red}", ".b{color:red} .a.b{color:blue}"] {
        let store = store(css);
        let (component, _) = component(&store);
        let output = render(&component, &classes("a b"));
        assert_eq!(output.style_value("color"), Some(&"#0000ff".into()), "{css}");
    }
}

#[test]
fn unchanged_inputs_skip_recomputation() {
    let store = store(".a{color:red} @media (min-width: 640px){.a{color:blue}}");
    let (component, changes) = component(&store);
    let props = classes("a");
    let first = render(&component, &props);
    let tests = component.stats().rule_tests;
    let second = render(&component, &props);
    assert!(Rc::ptr_eq(&first, &second));
    let stats = component.stats();
    assert_eq!((stats.renders, stats.recomputes, stats.skipped), (2, 1, 1));
    assert_eq!(stats.rule_tests, tests);
    assert_eq!(changes.get(), 0);

    render(&component, &classes("a other"));
    assert_eq!(component.stats().recomputes, 2);
}

#[test]
fn one_injection_notifies_each_component_once() {
    let options = CompileOptions {
        inline_variables: false,
        ..CompileOptions::default()
    };
    let css = |base: u32| {
        let variables: Vec<String> = (0..5).map(|index| format!("--v{index}:{}px", base + index)).collect();
        format!(
            ":root{{{}}} .c{{margin-top:var(--v0);margin-right:var(--v1);margin-bottom:var(--v2);margin-left:var(--v3);width:var(--v4)}}",
            variables.join(";")
        )
    };
    let store = StyleStore::new(EnvironmentOptions::default());
    store.inject(&document_with(&css(1), &options));
    let components: Vec<_> = (0..5).map(|_| component(&store)).collect();
    for (component, _) in &components {
        assert_eq!(render(component, &classes("c")).style_value("width"), Some(&5.0.into()));
    }

    store.inject(&document_with(&css(10), &options));
    for (component, changes) in &components {
        assert_eq!(changes.get(), 1);
        assert_eq!(render(component, &classes("c")).style_value("width"), Some(&14.0.into()));
    }
}

#[test]
fn container_queries_follow_the_ancestor() {
    let store = store(".parent .child{color:red}");
    let (parent, _) = component(&store);
    let (child, _) = component(&store);
    let parent_output = render(&parent, &classes("parent"));
    assert!(parent_output.capabilities.containers);

    let inside = child.render(&classes("child"), &parent_output.child_context()).unwrap();
    assert_eq!(inside.style_value("color"), Some(&"#ff0000".into()));
    let detached = child.render(&classes("child"), &InheritedContext::new()).unwrap();
    assert_eq!(detached.style_value("color"), None);
}

#[test]
fn container_attributes_follow_cached_ancestor_renders() {
    let store = store(".parent[data-open] .child{color:red}");
    let (parent, _) = component(&store);
    let (child, changes) = component(&store);
    let open = classes("parent").with("dataSet", StyleDescriptor::Object([("open".to_owned(), "yes".into())].into()));
    let context = render(&parent, &open).child_context();
    let color = |instance: &ComponentInstance| instance.render(&classes("child"), &context).unwrap().style_value("color").cloned();
    assert_eq!(color(&child), Some("#ff0000".into()));

    render(&parent, &classes("parent"));
    assert_eq!(parent.stats().recomputes, 1);
    assert_eq!(changes.get(), 1);
    assert_eq!(color(&child), None);

    render(&parent, &classes("parent"));
    assert_eq!(changes.get(), 1);
}

#[test]
fn container_size_conditions_react_to_layout() {
    let store = store(".card{container-type:inline-size} @container (min-width: 300px){.item{flex-direction:row}}");
    let (card, _) = component(&store);
    let (item, changes) = component(&store);
    let context = render(&card, &classes("card")).child_context();
    assert_eq!(item.render(&classes("item"), &context).unwrap().style_value("flexDirection"), None);
    card.set_layout(320.0, 100.0);
    assert_eq!(changes.get(), 1);
    assert_eq!(
        item.render(&classes("item"), &context).unwrap().style_value("flexDirection"),
        Some(&"row".into())
    );
}

#[test]
fn media_queries_follow_the_window() {
    let store = store("@media (min-width: 640px){.a{color:red}}");
    let (component, changes) = component(&store);
    assert_eq!(render(&component, &classes("a")).style_value("color"), None);
    store.environment().set_window_size(800.0, 600.0);
    assert_eq!(changes.get(), 1);
    assert_eq!(render(&component, &classes("a")).style_value("color"), Some(&"#ff0000".into()));
}

#[test]
fn hover_state_matches_pseudo_class_rules() {
    let store = store(".btn{color:red} .btn:hover{color:blue}");
    let (component, changes) = component(&store);
    let output = render(&component, &classes("btn"));
    assert!(output.capabilities.pressable);
    assert_eq!(output.style_value("color"), Some(&"#ff0000".into()));
    component.set_hover(true);
    assert_eq!(changes.get(), 1);
    assert_eq!(render(&component, &classes("btn")).style_value("color"), Some(&"#0000ff".into()));
}

#[test]
fn hover_ranks_with_classes() {
    let store = store(".btn.primary{color:red} .btn:hover{color:blue}");
    let (component, _) = component(&store);
    assert_eq!(render(&component, &classes("btn primary")).style_value("color"), Some(&"#ff0000".into()));
    component.set_hover(true);
    assert_eq!(render(&component, &classes("btn primary")).style_value("color"), Some(&"#0000ff".into()));
}

#[test]
fn circular_variables_are_undefined() {
    let options = CompileOptions {
        inline_variables: false,
        ..CompileOptions::default()
    };
    let store = StyleStore::new(EnvironmentOptions::default());
    store.inject(&document_with(
        ".a{--x:var(--y);--y:var(--x);width:var(--x);height:var(--missing, 4px);color:red}",
        &options,
    ));
    let (component, _) = component(&store);
    let output = render(&component, &classes("a"));
    assert_eq!(output.style_value("width"), None);
    assert_eq!(output.style_value("height"), Some(&4.0.into()));
    assert_eq!(output.style_value("color"), Some(&"#ff0000".into()));
}

#[test]
fn unknown_functions_are_errors() {
    init();
    let document = RuleSetDocument {
        rules: vec![(
            "a".to_owned(),
            vec![StyleRule {
                specificity: Specificity {
                    order: 1,
                    class_name: 1,
                    ..Specificity::ZERO
                },
                declarations: vec![StyleDeclaration::dynamic(
                    StyleDescriptor::function("wobble", Vec::new()),
                    PropertyPath::from_dotted("width"),
                    false,
                )],
                ..StyleRule::default()
            }],
        )],
        ..RuleSetDocument::default()
    };
    let store = StyleStore::new(EnvironmentOptions::default());
    store.inject(&document);
    let (component, _) = component(&store);
    assert_eq!(
        component.render(&classes("a"), &InheritedContext::new()).unwrap_err(),
        StyleError::UnknownFunction("wobble".to_owned())
    );
}

#[test]
fn light_dark_follows_the_color_scheme() {
    let store = store(".a{color:light-dark(white, black)}");
    let (component, changes) = component(&store);
    assert_eq!(render(&component, &classes("a")).style_value("color"), Some(&"#ffffff".into()));
    store.environment().set_color_scheme(ColorScheme::Dark);
    assert_eq!(changes.get(), 1);
    assert_eq!(render(&component, &classes("a")).style_value("color"), Some(&"#000000".into()));
}

#[test]
fn animations_expand_keyframes() {
    let store = store("@keyframes fade { from {opacity:0} to {opacity:1} } .a{animation:fade 1s ease-in infinite}");
    let (component, _) = component(&store);
    let output = render(&component, &classes("a"));
    assert!(output.capabilities.animated);

    let mut from = StyleObject::new();
    from.insert("opacity".into(), 0.0.into());
    let mut to = StyleObject::new();
    to.insert("opacity".into(), 1.0.into());
    let mut frames = StyleObject::new();
    frames.insert("0%".into(), StyleDescriptor::Object(from));
    frames.insert("100%".into(), StyleDescriptor::Object(to));
    assert_eq!(
        output.style_value("animationName"),
        Some(&StyleDescriptor::Array(vec![StyleDescriptor::Object(frames)]))
    );
    assert_eq!(
        output.style_value("animationDuration"),
        Some(&StyleDescriptor::Array(vec![1000.0.into()]))
    );
    assert_eq!(
        output.style_value("animationIterationCount"),
        Some(&StyleDescriptor::Array(vec!["infinite".into()]))
    );
    assert_eq!(output.style_value("animation"), None);
}

#[test]
fn em_uses_the_elements_own_font_size() {
    let store = store(".a{font-size:20px;width:2em} .b{height:1.5em}");
    let (parent, _) = component(&store);
    let output = render(&parent, &classes("a"));
    assert_eq!(output.style_value("width"), Some(&40.0.into()));

    let (child, _) = component(&store);
    let nested = child.render(&classes("b"), &output.child_context()).unwrap();
    assert_eq!(nested.style_value("height"), Some(&30.0.into()));
}

#[test]
fn rem_reads_the_root_font_size() {
    let options = CompileOptions {
        inline_rem: None,
        ..CompileOptions::default()
    };
    let store = StyleStore::new(EnvironmentOptions::default());
    store.inject(&document_with(".a{width:2rem}", &options));
    let (component, changes) = component(&store);
    assert_eq!(render(&component, &classes("a")).style_value("width"), Some(&28.0.into()));

    store.inject(&document_with(":root{font-size:20px} .a{width:2rem}", &options));
    assert_eq!(changes.get(), 1);
    assert_eq!(render(&component, &classes("a")).style_value("width"), Some(&40.0.into()));
}

#[test]
fn prop_mappings_write_outside_the_style() {
    let store = store(".input{color:red; @prop color: placeholderTextColor;}");
    let (component, _) = component(&store);
    let output = render(&component, &classes("input"));
    assert_eq!(output.props.get("placeholderTextColor"), Some(&"#ff0000".into()));
    assert_eq!(output.style_value("color"), None);
}

#[test]
fn unmounted_components_stop_listening() {
    let store = store("@media (min-width: 640px){.a{color:red}}");
    let (component, changes) = component(&store);
    render(&component, &classes("a"));
    component.unmount();
    store.environment().set_window_size(800.0, 600.0);
    assert_eq!(changes.get(), 0);
}
