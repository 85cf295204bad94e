//! Scan - descriptor ingestion and mount-time DOM resolution.
//!
//! `scan` ingests the declarative scan descriptor produced upstream (output
//! components, attribute bindings, child references, instance data).
//! `scan_dom_elements` resolves the anchor an instance owns, once per mount
//! cycle, branching on wrapper mode.

use serde::Deserialize;

use crate::binding::{self, AttributeBinding};
use crate::reactive::{self, OutputComponentConfig};
use crate::registry;
use crate::types::{Anchor, DataMap, ViewFlags, ViewId};
use crate::host;

use super::instance::ViewInstance;

/// A child-view reference recorded during scanning.
#[derive(Debug, Clone, Deserialize)]
pub struct ChildRef {
    pub view_id: ViewId,
    #[serde(default)]
    pub name: Option<String>,
}

/// The declarative descriptor `scan` ingests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanDescriptor {
    #[serde(default)]
    pub view_id: String,
    #[serde(default)]
    pub output_components: Vec<OutputComponentConfig>,
    #[serde(default)]
    pub attribute_bindings: Vec<AttributeBinding>,
    #[serde(default)]
    pub children: Vec<ChildRef>,
    #[serde(default)]
    pub data: Option<DataMap>,
}

impl ViewInstance {
    /// Ingest a scan descriptor. Consumed exactly once per instance
    /// lifetime; a blank `view_id` aborts with no mutation at all, leaving
    /// the guard unconsumed.
    pub fn scan(&mut self, descriptor: ScanDescriptor) {
        if self.flags.contains(ViewFlags::SCANNED) {
            tracing::debug!(view = %self.view_id, "scan skipped: already scanned");
            return;
        }
        if descriptor.view_id.trim().is_empty() {
            tracing::error!(
                path = %self.path,
                "scan aborted: descriptor has no viewId"
            );
            return;
        }
        self.flags.insert(ViewFlags::SCANNING);

        for mut config in descriptor.output_components {
            config.view_id = descriptor.view_id.clone();
            reactive::queue_output_component(config);
        }
        for mut config in descriptor.attribute_bindings {
            config.view_id = descriptor.view_id.clone();
            binding::queue_attribute_binding(config);
        }
        for child in descriptor.children {
            registry::record_child(self, child.view_id);
        }
        if let Some(data) = descriptor.data {
            self.update_variable_data(&data);
        }

        self.flags.insert(ViewFlags::SCANNED);
        self.flags.remove(ViewFlags::SCANNING);
    }

    /// Resolve the anchor this instance owns. Once per mount cycle; an
    /// instance wrapped by a super-view has no anchor of its own and
    /// delegates upward.
    pub fn scan_dom_elements(&mut self) {
        if self.flags.contains(ViewFlags::MARKUP_SCANNED) {
            return;
        }
        self.flags.insert(ViewFlags::MARKUP_SCANNED);
        if self.super_view.is_some() {
            return;
        }

        let resolved = host::with(|host| {
            if self.wrapper.enable {
                if let Some(tag) = &self.wrapper.tag {
                    host.query_wrapper_element(tag, &self.path, &self.view_id)
                        .map(|element| Anchor::Root {
                            refs: host.child_elements(element),
                            element,
                        })
                } else {
                    let nodes = host.markup_boundary(&self.path, &self.view_id);
                    if nodes.is_empty() {
                        None
                    } else {
                        let refs = nodes
                            .iter()
                            .copied()
                            .filter(|n| host.is_element(*n))
                            .collect();
                        Some(Anchor::Range { nodes, refs })
                    }
                }
            } else {
                host.query_view_root(&self.view_id).map(|element| Anchor::Root {
                    refs: host.child_elements(element),
                    element,
                })
            }
        })
        .flatten();

        match resolved {
            Some(anchor) => self.anchor = anchor,
            // Non-fatal: the instance may render into a region the host has
            // not produced yet.
            None => tracing::debug!(
                view = %self.view_id,
                path = %self.path,
                "scan_dom_elements resolved no anchor"
            ),
        }
    }
}
