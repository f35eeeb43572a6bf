//! Capability profile: which optional host primitives exist and behave.
//!
//! Every feature is probed at most once per engine instance, on first use,
//! against a hidden scratch subtree that is always detached afterwards. A
//! probe that errors marks the feature unsupported.

use crate::adapter::{NodeKind, TreeAdapter};
use crate::config::FinderOptions;
use anyhow::Result;
use core::cell::Cell;
use log::{debug, warn};

/// Optional host behaviours the engine can take advantage of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    /// `element_by_id` returns exactly the element carrying the id, not one
    /// merely named like it.
    ElementById,
    /// `elements_by_class_name` handles multiple and renamed classes.
    ElementsByClassName,
    /// `elements_by_tag_name` returns elements only.
    ElementsByTagName,
    /// `query_selector_all` exists and is case-sensitive for classes.
    QuerySelector,
    /// `query_selector_all("*")` returns no non-element ghosts.
    StarQuerySelector,
    /// `matches_selector` exists and rejects invalid selectors.
    MatchesSelector,
    /// The generic attribute getter is not shadowed by form controls.
    FormAttributeGetter,
}

impl Feature {
    pub const ALL: [Self; 7] = [
        Self::ElementById,
        Self::ElementsByClassName,
        Self::ElementsByTagName,
        Self::QuerySelector,
        Self::StarQuerySelector,
        Self::MatchesSelector,
        Self::FormAttributeGetter,
    ];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// Memoized probe outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Support {
    #[default]
    Untested,
    Supported,
    Unsupported,
}

/// Per-tree cache of probed features.
#[derive(Debug, Default)]
pub struct CapabilityProfile {
    support: [Cell<Support>; 7],
    options: FinderOptions,
}

impl CapabilityProfile {
    #[must_use]
    pub fn new(options: FinderOptions) -> Self {
        Self {
            support: Default::default(),
            options,
        }
    }

    /// Recorded state of a feature without probing.
    pub fn status(&self, feature: Feature) -> Support {
        self.support
            .get(feature.index())
            .map_or(Support::Unsupported, Cell::get)
    }

    /// Whether `feature` works on `tree`, probing on first request.
    /// `probe_id` supplies a fresh unique id for probes that need one.
    pub fn supports<T: TreeAdapter>(
        &self,
        tree: &T,
        feature: Feature,
        probe_id: impl FnOnce() -> String,
    ) -> bool {
        let Some(slot) = self.support.get(feature.index()) else {
            return false;
        };
        match slot.get() {
            Support::Supported => return true,
            Support::Unsupported => return false,
            Support::Untested => {}
        }
        let supported = self.enabled(feature) && run_probe(tree, feature, probe_id);
        debug!(target: "finder::capability", "{feature:?} supported: {supported}");
        slot.set(if supported {
            Support::Supported
        } else {
            Support::Unsupported
        });
        supported
    }

    const fn enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::ElementById | Feature::ElementsByClassName | Feature::ElementsByTagName => {
                self.options.bulk_lookups
            }
            Feature::QuerySelector | Feature::StarQuerySelector | Feature::MatchesSelector => {
                self.options.native_queries
            }
            Feature::FormAttributeGetter => true,
        }
    }
}

fn run_probe<T: TreeAdapter>(tree: &T, feature: Feature, probe_id: impl FnOnce() -> String) -> bool {
    let outcome = with_scratch(tree, |scratch| match feature {
        Feature::ElementById => probe_element_by_id(tree, scratch, &probe_id()),
        Feature::ElementsByClassName => probe_class_name(tree, scratch),
        Feature::ElementsByTagName => probe_tag_name(tree, scratch),
        Feature::QuerySelector => probe_query_selector(tree, scratch),
        Feature::StarQuerySelector => probe_star_query(tree, scratch),
        Feature::MatchesSelector => probe_matches(tree, scratch),
        Feature::FormAttributeGetter => probe_form_getter(tree, scratch),
    });
    outcome.unwrap_or_else(|err| {
        debug!(target: "finder::capability", "{feature:?} probe failed: {err}");
        false
    })
}

/// Run `probe` with a hidden `div` attached under the document element.
fn with_scratch<T, F>(tree: &T, probe: F) -> Result<bool>
where
    T: TreeAdapter,
    F: FnOnce(T::Node) -> Result<bool>,
{
    let host = tree.document_element().unwrap_or_else(|| tree.root());
    let scratch = tree.create_element("div")?;
    tree.set_attribute(scratch, "hidden", "")?;
    tree.append_child(host, scratch)?;
    let outcome = probe(scratch);
    if let Err(err) = tree.detach(scratch) {
        warn!(target: "finder::capability", "failed to detach probe scratch: {err}");
    }
    outcome
}

fn child_element<T: TreeAdapter>(tree: &T, parent: T::Node, tag: &str, class: Option<&str>) -> Result<T::Node> {
    let element = tree.create_element(tag)?;
    if let Some(class) = class {
        tree.set_attribute(element, "class", class)?;
    }
    tree.append_child(parent, element)?;
    Ok(element)
}

fn probe_element_by_id<T: TreeAdapter>(tree: &T, scratch: T::Node, id: &str) -> Result<bool> {
    let named = child_element(tree, scratch, "a", None)?;
    tree.set_attribute(named, "name", id)?;
    let target = child_element(tree, scratch, "b", None)?;
    tree.set_attribute(target, "id", id)?;
    Ok(tree.element_by_id(tree.root(), id)? == Some(target))
}

fn probe_class_name<T: TreeAdapter>(tree: &T, scratch: T::Node) -> Result<bool> {
    let first = child_element(tree, scratch, "a", Some("f"))?;
    let second = child_element(tree, scratch, "a", Some("b"))?;
    let by_class = |class: &str| tree.elements_by_class_name(scratch, &[class.to_owned()]);
    if by_class("b")?.len() != 1 {
        return Ok(false);
    }
    tree.set_attribute(first, "class", "b")?;
    if by_class("b")?.len() != 2 {
        return Ok(false);
    }
    tree.set_attribute(first, "class", "a")?;
    tree.set_attribute(second, "class", "f b a")?;
    Ok(by_class("a")?.len() == 2)
}

fn probe_tag_name<T: TreeAdapter>(tree: &T, scratch: T::Node) -> Result<bool> {
    let text = tree.create_text("probe")?;
    tree.append_child(scratch, text)?;
    child_element(tree, scratch, "a", None)?;
    child_element(tree, scratch, "span", None)?;
    let all = tree.elements_by_tag_name(scratch, "*")?;
    if all.len() != 2 || !all.iter().all(|&node| tree.node_kind(node) == NodeKind::Element) {
        return Ok(false);
    }
    Ok(tree.elements_by_tag_name(scratch, "a")?.len() == 1)
}

fn probe_query_selector<T: TreeAdapter>(tree: &T, scratch: T::Node) -> Result<bool> {
    child_element(tree, scratch, "a", Some("MiX"))?;
    Ok(tree.query_selector_all(scratch, ".MiX")?.len() == 1
        && tree.query_selector_all(scratch, ".mix")?.is_empty())
}

fn probe_star_query<T: TreeAdapter>(tree: &T, scratch: T::Node) -> Result<bool> {
    let text = tree.create_text("probe")?;
    tree.append_child(scratch, text)?;
    Ok(tree.query_selector_all(scratch, "*")?.is_empty())
}

fn probe_matches<T: TreeAdapter>(tree: &T, scratch: T::Node) -> Result<bool> {
    let anchor = child_element(tree, scratch, "a", Some("MiX"))?;
    if tree.matches_selector(anchor, ":finder-probe").is_ok() {
        return Ok(false);
    }
    tree.matches_selector(anchor, ".MiX")
}

fn probe_form_getter<T: TreeAdapter>(tree: &T, scratch: T::Node) -> Result<bool> {
    let form = child_element(tree, scratch, "form", None)?;
    tree.set_attribute(form, "action", "s")?;
    let input = child_element(tree, form, "input", None)?;
    tree.set_attribute(input, "id", "action")?;
    Ok(tree.get_attribute(form, "action").as_deref() == Some("s"))
}
