mod common;

use common::{default_limits, Harness, Tree};
use framekit_bindings::{BindingError, BindingValue, EmbedderObject, RenderContext, WebFrame};
use framekit_common::{BindingConfig, FrameKitConfig};
use std::rc::Rc;

fn lenient() -> BindingConfig {
    BindingConfig {
        fatal_invariants: false,
    }
}

#[test]
fn test_child_window_resolves() {
    let tree = Tree::build();
    let h = Harness::connect(tree.registry.clone(), default_limits(), BindingConfig::default());
    let main = h.frame(&tree.main);

    let window = EmbedderObject::in_context(&tree.a1);
    assert_eq!(main.web_frame_id(&window).unwrap(), Some(tree.a1.routing_id()));
    assert_eq!(tree.a1.observer_count(), 0);
}

#[test]
fn test_getter_runs_after_resolution() {
    let tree = Tree::build();
    let h = Harness::connect(tree.registry.clone(), default_limits(), BindingConfig::default());
    let main = h.frame(&tree.main);

    // The getter renames the frame; resolution already happened, so the id
    // still comes from the original context.
    let target = tree.b.clone();
    let window = EmbedderObject::in_context(&tree.b).with_getter(move || target.set_name("touched"));
    assert_eq!(main.web_frame_id(&window).unwrap(), Some(tree.b.routing_id()));
    assert_eq!(tree.b.name(), "touched");
}

#[test]
fn test_frame_destroyed_by_getter_yields_sentinel() {
    let tree = Tree::build();
    let h = Harness::connect(tree.registry.clone(), default_limits(), BindingConfig::default());
    let main = h.frame(&tree.main);

    let registry = tree.registry.clone();
    let victim = tree.a.clone();
    let window = Rc::new(
        EmbedderObject::in_context(&tree.a1).with_getter(move || registry.remove_frame(&victim)),
    );

    assert_eq!(
        main.call("getWebFrameId", &[BindingValue::Object(window)]).unwrap(),
        BindingValue::Number(-1.0)
    );
    assert!(tree.a1.is_destroyed());
}

#[test]
fn test_window_without_context_yields_sentinel() {
    let tree = Tree::build();
    let h = Harness::connect(tree.registry.clone(), default_limits(), BindingConfig::default());
    let main = h.frame(&tree.main);

    assert_eq!(main.web_frame_id(&EmbedderObject::new()).unwrap(), None);

    let window = EmbedderObject::in_context(&tree.b);
    tree.registry.remove_frame(&tree.b);
    assert_eq!(main.web_frame_id(&window).unwrap(), None);
}

#[test]
#[should_panic(expected = "frame tree invariant violated")]
fn test_parent_detached_by_getter_is_fatal() {
    let tree = Tree::build();
    let h = Harness::connect(tree.registry.clone(), default_limits(), BindingConfig::default());
    let main = h.frame(&tree.main);

    let registry = tree.registry.clone();
    let frame = tree.a1.clone();
    let window = EmbedderObject::in_context(&tree.a1).with_getter(move || {
        registry.detach_from_parent(&frame);
    });

    let _ = main.web_frame_id(&window);
}

#[test]
fn test_parent_detached_by_getter_is_error_when_lenient() {
    let tree = Tree::build();
    let h = Harness::connect(tree.registry.clone(), default_limits(), lenient());
    let main = h.frame(&tree.main);

    let registry = tree.registry.clone();
    let frame = tree.a1.clone();
    let window = EmbedderObject::in_context(&tree.a1).with_getter(move || {
        registry.detach_from_parent(&frame);
    });

    let err = main.web_frame_id(&window).unwrap_err();
    assert!(matches!(err, BindingError::InvariantViolation(_)));

    // The frame itself survived; the guard did not mistake detachment for
    // destruction.
    assert!(!tree.a1.is_destroyed());
    assert_eq!(tree.a1.observer_count(), 0);
}

#[test]
fn test_main_frame_window_is_invariant_violation() {
    let tree = Tree::build();
    let h = Harness::connect(tree.registry.clone(), default_limits(), lenient());
    let main = h.frame(&tree.main);

    let window = Rc::new(EmbedderObject::in_context(&tree.main));
    assert!(matches!(
        main.call("getWebFrameId", &[BindingValue::Object(window)]),
        Err(BindingError::InvariantViolation(_))
    ));
}

#[test]
fn test_dispatch_requires_object() {
    let tree = Tree::build();
    let h = Harness::connect(tree.registry.clone(), default_limits(), BindingConfig::default());
    let main = h.frame(&tree.main);

    assert!(matches!(
        main.call("getWebFrameId", &[BindingValue::Null]),
        Err(BindingError::TypeError { .. })
    ));
}

#[test]
fn test_configured_renderer_reports_violation() {
    let tree = Tree::build();
    let config = FrameKitConfig::from_json_str(r#"{ "bindings": { "fatal_invariants": false } }"#)
        .unwrap();
    let scripts = Rc::new(common::RecordingHost::default());
    let (context, authority) = RenderContext::connect(tree.registry.clone(), scripts, &config).unwrap();
    let main = WebFrame::new(&context, &tree.main).unwrap();

    let window = EmbedderObject::in_context(&tree.main);
    assert!(matches!(
        main.web_frame_id(&window),
        Err(BindingError::InvariantViolation(_))
    ));

    // The authority is returned once the renderer lets go of its channel.
    assert_eq!(main.set_zoom_level(1.0), 1.0);
    drop(main);
    drop(context);
    let authority = authority.join().unwrap();
    assert_eq!(authority.zoom_level(tree.main.view().id()), 1.0);
}
