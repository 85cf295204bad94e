//! End-to-end flows against an in-memory host: instantiate, scan, render,
//! mount, refresh in place, destroy.

use std::rc::Rc;

use serde_json::json;

use vireo::reactive::{self, OutputComponentConfig};
use vireo::{
    registry, Anchor, DataMap, HookResult, HostEnvironment, MemoryHost, ScanDescriptor,
    ScriptResource,
    ViewDefinition, ViewInstance, WrapperConfig,
};

struct TodoCard;

impl ViewDefinition for TodoCard {
    fn path(&self) -> &str {
        "pages.todo"
    }

    fn wrapper(&self) -> WrapperConfig {
        WrapperConfig {
            enable: true,
            tag: Some("article".to_string()),
            attributes: Default::default(),
        }
    }

    fn scripts(&self) -> Vec<ScriptResource> {
        vec![ScriptResource {
            id: "todo-card-js".to_string(),
            source: "initTodoCard()".to_string(),
        }]
    }

    fn render(&self, view: &mut ViewInstance) -> HookResult<Option<String>> {
        let title = reactive::state::get("todo.title").unwrap_or(json!("untitled"));
        let highlight = view
            .data()
            .get("highlight")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Ok(Some(format!(
            "<h2 class=\"{}\">{}</h2>",
            if highlight { "hot" } else { "plain" },
            title.as_str().unwrap_or("")
        )))
    }
}

#[test]
fn test_full_mount_refresh_destroy_flow() {
    let host = Rc::new(MemoryHost::new());
    vireo::host::install(host.clone());
    host.insert_style("todo-card-css", "pages.todo");
    reactive::state::set("todo.title", json!("Groceries"));

    let (id, result) = registry::instantiate(Rc::new(TodoCard), None);
    result.unwrap();

    // Scan a descriptor, then render: the first render wraps and annotates.
    let output = registry::with_view(&id, |view| {
        view.scan(ScanDescriptor {
            view_id: id.clone(),
            output_components: vec![OutputComponentConfig {
                id: "title-fragment".to_string(),
                keys: vec!["todo.title".to_string()],
                view_id: String::new(),
            }],
            ..Default::default()
        });
        view.render().unwrap().unwrap()
    })
    .unwrap();
    assert!(output.starts_with("<article "));
    assert!(output.contains("Groceries"));

    host.insert_fragment(&output);

    registry::with_view(&id, |view| {
        view.mounted().unwrap();
        assert!(view.is_mounted());
        assert!(view.is_reactive());
        assert!(matches!(view.anchor(), Anchor::Root { .. }));
        assert_eq!(view.render_dependencies(), ["todo.title"]);
    });
    assert_eq!(host.script_count(), 1);
    assert_eq!(reactive::output::mounted_component_count(&id), 1);
    assert_eq!(
        reactive::output::watched_keys(&id),
        ["todo.title".to_string()]
    );

    // Refresh in place with fresh variable data.
    reactive::state::set("todo.title", json!("Chores"));
    registry::with_view(&id, |view| {
        view.refresh(Some(DataMap::from([(
            "highlight".to_string(),
            json!(true),
        )])))
        .unwrap();
        assert!(view.is_mounted());

        let out = view.output().unwrap();
        assert!(out.contains("Chores"));
        assert!(out.contains("class=\"hot\""));
        // The wrapper was injected once; refresh output is unwrapped.
        assert!(!out.contains("<article"));
    });

    // The wrapper element survived and carries the new content.
    let wrapper = host
        .query_wrapper_element("article", "pages.todo", &id)
        .unwrap();
    let children = host.child_elements(wrapper);
    assert_eq!(children.len(), 1);
    assert_eq!(host.tag_of(children[0]).unwrap(), "h2");
    assert_eq!(host.script_count(), 1);

    // Destroy releases everything the instance owned.
    registry::destroy_view(&id);
    assert_eq!(registry::view_count(), 0);
    assert_eq!(host.script_count(), 0);
    assert_eq!(host.style_count(), 0);
    assert_eq!(reactive::output::mounted_component_count(&id), 0);
    assert!(host
        .query_wrapper_element("article", "pages.todo", &id)
        .is_none());
}

struct ListShell;

impl ViewDefinition for ListShell {
    fn path(&self) -> &str {
        "pages.list"
    }

    fn render(&self, _view: &mut ViewInstance) -> HookResult<Option<String>> {
        Ok(Some("<ul><li>one</li></ul>".to_string()))
    }
}

struct ListItem;

impl ViewDefinition for ListItem {
    fn path(&self) -> &str {
        "pages.list.item"
    }
}

#[test]
fn test_mount_and_unmount_propagate_through_children() {
    let host = Rc::new(MemoryHost::new());
    vireo::host::install(host);

    let (child_id, _) = registry::instantiate(Rc::new(ListItem), None);
    let (parent_id, _) = registry::instantiate(Rc::new(ListShell), None);

    registry::with_view(&parent_id, |parent| {
        parent.scan(ScanDescriptor {
            view_id: parent_id.clone(),
            children: vec![vireo::ChildRef {
                view_id: child_id.clone(),
                name: Some("item".to_string()),
            }],
            ..Default::default()
        });
        parent.mounted().unwrap();
    });
    registry::with_view(&child_id, |child| assert!(child.is_mounted()));

    registry::with_view(&parent_id, |parent| parent.unmounted().unwrap());
    registry::with_view(&child_id, |child| {
        assert!(!child.is_mounted());
        assert!(!child.is_reactive());
    });

    // Destroying the parent takes the registered child with it.
    registry::destroy_view(&parent_id);
    assert!(registry::get(&child_id).is_none());
    assert_eq!(registry::view_count(), 0);
}

struct Banner;

impl ViewDefinition for Banner {
    fn path(&self) -> &str {
        "pages.banner"
    }

    fn wrapper(&self) -> WrapperConfig {
        WrapperConfig {
            enable: true,
            tag: None,
            attributes: Default::default(),
        }
    }

    fn render(&self, _view: &mut ViewInstance) -> HookResult<Option<String>> {
        let text = reactive::state::get("banner.text").unwrap_or(json!(""));
        Ok(Some(format!(
            "<p>{}</p><small>promo</small>",
            text.as_str().unwrap_or("")
        )))
    }
}

#[test]
fn test_tagless_wrapper_anchors_to_a_node_range() {
    let host = Rc::new(MemoryHost::new());
    vireo::host::install(host.clone());
    reactive::state::set("banner.text", json!("sale"));

    let (id, _) = registry::instantiate(Rc::new(Banner), None);

    let output = registry::with_view(&id, |view| view.render().unwrap().unwrap()).unwrap();
    assert!(output.starts_with("<!--vireo:pages.banner:"));

    // The host recognizes boundary comments and records node ownership.
    host.insert_fragment(&output);
    let before = host.markup_boundary("pages.banner", &id);
    assert_eq!(before.len(), 2);

    registry::with_view(&id, |view| {
        view.mounted().unwrap();
        match view.anchor() {
            Anchor::Range { nodes, refs } => {
                assert_eq!(nodes.len(), 2);
                assert_eq!(refs.len(), 2);
            }
            other => panic!("expected range anchor, got {other:?}"),
        }
    });

    // An in-place refresh swaps the owned range.
    reactive::state::set("banner.text", json!("clearance"));
    registry::with_view(&id, |view| view.refresh(None).unwrap());

    let after = host.markup_boundary("pages.banner", &id);
    assert_eq!(after.len(), 2);
    assert_ne!(before, after);
    assert!(!host.contains_node(before[0]));
    registry::with_view(&id, |view| {
        assert!(view.is_mounted());
        assert!(view.output().unwrap().contains("clearance"));
    });
}
