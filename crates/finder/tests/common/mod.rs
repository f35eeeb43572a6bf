#![allow(
    dead_code,
    reason = "Each test crate uses a different subset of the fixture"
)]

use core::error::Error;
use dom::{Document, HostProfile, NodeId};
use finder::TreeAdapter;
use std::collections::HashMap;

/// A small page built node by node, with every element carrying an `id`
/// reachable by name.
///
/// ```text
/// <html id=html>
///   <body id=body>
///     <ul id=menu class="menu main">
///       <li id=one class="item first" lang=en>One</li>
///       "\n"
///       <li id=two class=item lang=en-US><a id=link href=/x>Two</a></li>
///       <!-- gap -->
///       <li id=three class="item last" data-kind=special></li>
///     </ul>
///     <div id=outer class=box>
///       <p id=p1 class="foo bar-baz">Hello world</p>
///       <span id=s1></span>
///       <p id=p2><em id=em1>x</em></p>
///       <form id=f action=/go>
///         <input id=i1 type=checkbox checked>
///         <input id=i2 type=text disabled>
///         <select id=sel><option id=o1 selected>o</option></select>
///       </form>
///     </div>
///   </body>
/// </html>
/// ```
pub struct Page {
    pub doc: Document,
    nodes: HashMap<String, NodeId>,
}

pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

pub fn init_logging() {
    let _init = env_logger::builder().is_test(true).try_init();
}

impl Page {
    pub fn new() -> TestResult<Self> {
        Self::with_profile(HostProfile::default())
    }

    pub fn with_profile(profile: HostProfile) -> TestResult<Self> {
        init_logging();
        let mut page = Self {
            doc: Document::with_profile(profile),
            nodes: HashMap::new(),
        };
        let root = page.doc.root_id();
        let html = page.add(root, "html", &[("id", "html")])?;
        let body = page.add(html, "body", &[("id", "body")])?;

        let menu = page.add(body, "ul", &[("id", "menu"), ("class", "menu main")])?;
        let one = page.add(menu, "li", &[("id", "one"), ("class", "item first"), ("lang", "en")])?;
        page.doc.text_node(one, "One")?;
        page.doc.text_node(menu, "\n")?;
        let two = page.add(menu, "li", &[("id", "two"), ("class", "item"), ("lang", "en-US")])?;
        let link = page.add(two, "a", &[("id", "link"), ("href", "/x")])?;
        page.doc.text_node(link, "Two")?;
        page.doc.comment_node(menu, "gap")?;
        page.add(
            menu,
            "li",
            &[("id", "three"), ("class", "item last"), ("data-kind", "special")],
        )?;

        let outer = page.add(body, "div", &[("id", "outer"), ("class", "box")])?;
        let first_para = page.add(outer, "p", &[("id", "p1"), ("class", "foo bar-baz")])?;
        page.doc.text_node(first_para, "Hello world")?;
        page.add(outer, "span", &[("id", "s1")])?;
        let second_para = page.add(outer, "p", &[("id", "p2")])?;
        let emphasis = page.add(second_para, "em", &[("id", "em1")])?;
        page.doc.text_node(emphasis, "x")?;
        let form = page.add(outer, "form", &[("id", "f"), ("action", "/go")])?;
        page.add(form, "input", &[("id", "i1"), ("type", "checkbox"), ("checked", "")])?;
        page.add(form, "input", &[("id", "i2"), ("type", "text"), ("disabled", "")])?;
        let select = page.add(form, "select", &[("id", "sel")])?;
        let option = page.add(select, "option", &[("id", "o1"), ("selected", "")])?;
        page.doc.text_node(option, "o")?;
        Ok(page)
    }

    /// Append an element and remember it under its `id`.
    pub fn add(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> TestResult<NodeId> {
        let node = self.doc.element_with(parent, tag, attrs)?;
        if let Some(&(_, id)) = attrs.iter().find(|(name, _)| *name == "id") {
            self.nodes.insert(id.to_owned(), node);
        }
        Ok(node)
    }

    pub fn node(&self, id: &str) -> TestResult<NodeId> {
        self.nodes
            .get(id)
            .copied()
            .ok_or_else(|| format!("no element with id `{id}`").into())
    }

    /// The `id` of every node, `?` for nodes without one.
    pub fn ids(&self, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|&node| {
                self.doc
                    .attribute_node_value(node, "id")
                    .unwrap_or_else(|| "?".to_owned())
            })
            .collect()
    }
}
