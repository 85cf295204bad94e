//! Configuration binder - prop installation and data commits.
//!
//! `bind` runs once in the constructor: declared props partition into bound
//! methods (callables) and plain data properties. The data-commit operations
//! are the only way instance data reaches the definition's callbacks.

use serde_json::Value;

use crate::reactive;
use crate::types::{DataMap, ViewFlags};

use super::definition::PropValue;
use super::instance::ViewInstance;

impl ViewInstance {
    /// Partition the definition's declared props into methods and data
    /// properties and install both on the instance.
    pub(crate) fn bind(&mut self) {
        for (name, value) in self.def.clone().props() {
            match value {
                PropValue::Method(method) => {
                    self.methods.insert(name, method);
                }
                PropValue::Data(data) => {
                    self.data.insert(name, data);
                }
            }
        }
    }

    /// Invoke a bound method by name. Returns `None` when no such method
    /// was declared.
    pub fn call_method(&mut self, name: &str, args: &[Value]) -> Option<Value> {
        let method = self.methods.get(name).cloned()?;
        Some(method(self, args))
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// One-time constructor-data commit, called at the start of every
    /// render/prerender variant.
    ///
    /// Guarded part: with non-empty instance data, merge ambient application
    /// data under it and fire `update_variable_data` exactly once per
    /// instance lifetime. Unguarded part: the definition's
    /// `commit_constructor_data` callback fires on every call.
    pub fn commit_constructor_data(&mut self) {
        if !self.flags.contains(ViewFlags::COMMITTED_CONSTRUCTOR_DATA) && !self.data.is_empty() {
            // Untracked snapshot: the commit must not pollute the pass's
            // dependency capture.
            let mut merged = reactive::state::ambient_snapshot();
            merged.extend(self.data.clone());
            self.def.clone().update_variable_data(self, &merged);
            self.flags.insert(ViewFlags::COMMITTED_CONSTRUCTOR_DATA);
        }
        self.def.clone().commit_constructor_data(self);
    }

    /// Merge a patch into instance-local data only; no callback fires.
    pub fn update_data(&mut self, patch: DataMap) -> &mut Self {
        self.data.extend(patch);
        self
    }

    /// Fire the definition's variable-data callback. Marks constructor data
    /// as committed as a side effect.
    pub fn update_variable_data(&mut self, data: &DataMap) -> &mut Self {
        self.def.clone().update_variable_data(self, data);
        self.flags.insert(ViewFlags::COMMITTED_CONSTRUCTOR_DATA);
        self
    }

    /// Single-key variant through the definition's narrower callback.
    pub fn update_variable_item(&mut self, key: &str, value: &Value) -> &mut Self {
        self.def.clone().update_variable_item(self, key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use serde_json::json;

    use crate::reactive;
    use crate::view::definition::{PropValue, ViewDefinition};

    use super::*;

    struct PropsDef {
        commits: Rc<Cell<usize>>,
    }

    impl ViewDefinition for PropsDef {
        fn path(&self) -> &str {
            "pages.props"
        }

        fn props(&self) -> Vec<(String, PropValue)> {
            vec![
                ("title".to_string(), PropValue::Data(json!("Hi"))),
                (
                    "onClick".to_string(),
                    PropValue::Method(Rc::new(|view, _args| {
                        json!(format!("clicked:{}", view.view_id()))
                    })),
                ),
            ]
        }

        fn update_variable_data(&self, _view: &mut ViewInstance, _data: &DataMap) {
            self.commits.set(self.commits.get() + 1);
        }
    }

    fn props_view(commits: &Rc<Cell<usize>>) -> ViewInstance {
        ViewInstance::new(
            Rc::new(PropsDef {
                commits: commits.clone(),
            }),
            "v1",
        )
    }

    #[test]
    fn test_bind_partitions_props() {
        reactive::reset_reactive();
        let commits = Rc::new(Cell::new(0));
        let mut view = props_view(&commits);

        // Data prop installed, writable
        assert_eq!(view.data()["title"], json!("Hi"));
        view.update_data(DataMap::from([("title".to_string(), json!("Bye"))]));
        assert_eq!(view.data()["title"], json!("Bye"));

        // Method installed and bound to the instance
        assert!(view.has_method("onClick"));
        assert!(!view.has_method("title"));
        assert_eq!(
            view.call_method("onClick", &[]),
            Some(json!("clicked:v1"))
        );
        assert_eq!(view.call_method("missing", &[]), None);
    }

    #[test]
    fn test_commit_constructor_data_fires_once() {
        reactive::reset_reactive();
        let commits = Rc::new(Cell::new(0));
        let mut view = props_view(&commits);

        view.commit_constructor_data();
        view.commit_constructor_data();
        assert_eq!(commits.get(), 1);
    }

    #[test]
    fn test_commit_merges_ambient_under_instance_data() {
        reactive::reset_reactive();
        reactive::state::set("title", json!("ambient"));
        reactive::state::set("locale", json!("en"));

        struct CaptureDef {
            seen: Rc<std::cell::RefCell<DataMap>>,
        }
        impl ViewDefinition for CaptureDef {
            fn path(&self) -> &str {
                "pages.capture"
            }
            fn props(&self) -> Vec<(String, PropValue)> {
                vec![("title".to_string(), PropValue::Data(json!("local")))]
            }
            fn update_variable_data(&self, _view: &mut ViewInstance, data: &DataMap) {
                *self.seen.borrow_mut() = data.clone();
            }
        }

        let seen = Rc::new(std::cell::RefCell::new(DataMap::new()));
        let mut view = ViewInstance::new(Rc::new(CaptureDef { seen: seen.clone() }), "v1");
        view.commit_constructor_data();

        let merged = seen.borrow();
        assert_eq!(merged["title"], json!("local"));
        assert_eq!(merged["locale"], json!("en"));
    }

    #[test]
    fn test_empty_data_leaves_guard_unconsumed() {
        reactive::reset_reactive();

        struct EmptyDef {
            commits: Rc<Cell<usize>>,
        }
        impl ViewDefinition for EmptyDef {
            fn path(&self) -> &str {
                "pages.empty"
            }
            fn update_variable_data(&self, _view: &mut ViewInstance, _data: &DataMap) {
                self.commits.set(self.commits.get() + 1);
            }
        }

        let commits = Rc::new(Cell::new(0));
        let mut view = ViewInstance::new(
            Rc::new(EmptyDef {
                commits: commits.clone(),
            }),
            "v1",
        );

        view.commit_constructor_data();
        assert_eq!(commits.get(), 0);

        // Data arrives later; the guarded merge still has its one shot.
        view.update_data(DataMap::from([("k".to_string(), json!(1))]));
        view.commit_constructor_data();
        assert_eq!(commits.get(), 1);
    }

    #[test]
    fn test_update_variable_item_fires_narrow_callback() {
        reactive::reset_reactive();

        struct ItemDef {
            seen: Rc<std::cell::RefCell<Vec<(String, Value)>>>,
        }
        impl ViewDefinition for ItemDef {
            fn path(&self) -> &str {
                "pages.item"
            }
            fn update_variable_item(&self, _view: &mut ViewInstance, key: &str, value: &Value) {
                self.seen.borrow_mut().push((key.to_string(), value.clone()));
            }
        }

        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut view = ViewInstance::new(Rc::new(ItemDef { seen: seen.clone() }), "v1");

        // Returns the instance, so item updates chain with data merges.
        view.update_variable_item("count", &json!(2))
            .update_data(DataMap::from([("label".to_string(), json!("x"))]));

        assert_eq!(*seen.borrow(), [("count".to_string(), json!(2))]);
        assert_eq!(view.data()["label"], json!("x"));
    }

    #[test]
    fn test_update_variable_data_marks_committed() {
        reactive::reset_reactive();
        let commits = Rc::new(Cell::new(0));
        let mut view = props_view(&commits);

        view.update_variable_data(&DataMap::new());
        assert_eq!(commits.get(), 1);
        assert!(view.flags().contains(ViewFlags::COMMITTED_CONSTRUCTOR_DATA));

        // The guarded merge is now spent.
        view.commit_constructor_data();
        assert_eq!(commits.get(), 1);
    }
}
