//! Arena-backed HTML fragment tree.
//!
//! Fragments are tokenized with html5ever into an [`indextree::Arena`], so nodes are
//! addressed by stable [`NodeId`]s and can be moved, cloned and detached without
//! reference counting. This is the minimum surface the spoiler merge needs: class
//! queries, sibling traversal, a handful of mutations and serialization back to
//! HTML.

mod serialize;
mod sink;

use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use indextree::{Arena, NodeId};

pub(crate) const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Elements that never have content and serialize as `<tag/>`.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(StrTendril),
    Comment(StrTendril),
}

#[derive(Debug, Clone)]
pub struct ElementData {
    pub name: QualName,
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            name: html_name(tag),
            attrs: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.name.local
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| &*attr.value)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|attr| &*attr.name.local == name) {
            Some(attr) => attr.value = StrTendril::from_slice(value),
            None => self.attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: StrTendril::from_slice(value),
            }),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|attr| &*attr.name.local != name);
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Drop one class; the `class` attribute goes away when nothing is left.
    pub fn remove_class(&mut self, class: &str) {
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        if remaining.is_empty() {
            self.remove_attr("class");
        } else {
            let joined = remaining.join(" ");
            self.set_attr("class", &joined);
        }
    }
}

fn html_name(tag: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag))
}

/// A parsed HTML fragment. `root` is a document node whose children are the
/// fragment's top-level nodes.
#[derive(Debug, Clone)]
pub struct Fragment {
    arena: Arena<NodeData>,
    root: NodeId,
}

impl Fragment {
    pub fn parse(html: &str) -> Self {
        sink::parse(html)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &NodeData {
        self.arena[id].get()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.get(id) {
            NodeData::Element(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.arena[id].get_mut() {
            NodeData::Element(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::tag)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|elem| elem.has_class(class))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    /// All child nodes, including text and comments.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].next_sibling()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].previous_sibling()
    }

    /// Elements below the root carrying `class`, in document order.
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.root
            .descendants(&self.arena)
            .skip(1)
            .filter(|&id| self.has_class(id, class))
            .collect()
    }

    /// Concatenated text of `id` and everything below it.
    pub fn text_content(&self, id: NodeId) -> String {
        id.descendants(&self.arena)
            .filter_map(|node| match self.get(node) {
                NodeData::Text(text) => Some(&**text),
                _ => None,
            })
            .collect()
    }

    pub fn create_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut elem = ElementData::new(tag);
        for (name, value) in attrs {
            elem.set_attr(name, value);
        }
        self.arena.new_node(NodeData::Element(elem))
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        child.detach(&mut self.arena);
        parent.append(child, &mut self.arena);
    }

    /// Move `node` to sit directly before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        node.detach(&mut self.arena);
        reference.insert_before(node, &mut self.arena);
    }

    pub fn detach(&mut self, id: NodeId) {
        id.detach(&mut self.arena);
    }

    /// Copy `id` and its whole subtree. The copy starts detached.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let data = self.arena[id].get().clone();
        let copy = self.arena.new_node(data);
        let children: Vec<NodeId> = id.children(&self.arena).collect();
        for child in children {
            let child_copy = self.deep_clone(child);
            copy.append(child_copy, &mut self.arena);
        }
        copy
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(elem) = self.element_mut(id) {
            elem.remove_class(class);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_and_serialize() {
        let fragment = Fragment::parse("<p>Hello <strong>world</strong></p><p><br></p>");
        assert_eq!(
            fragment.to_html(),
            "<p>Hello <strong>world</strong></p><p><br/></p>"
        );
    }

    #[test]
    fn test_empty_fragment() {
        let fragment = Fragment::parse("");
        assert_eq!(fragment.children(fragment.root()).count(), 0);
        assert_eq!(fragment.to_html(), "");
    }

    #[test]
    fn test_class_queries() {
        let fragment =
            Fragment::parse("<p><span class=\"a b\">1</span><em class=\"b\">2</em>3</p>");
        let found = fragment.elements_with_class("b");
        assert_eq!(found.len(), 2);
        assert_eq!(fragment.tag_name(found[0]), Some("span"));
        assert_eq!(fragment.tag_name(found[1]), Some("em"));
        assert!(fragment.has_class(found[0], "a"));
        assert!(!fragment.has_class(found[1], "a"));

        assert_eq!(fragment.next_sibling(found[0]), Some(found[1]));
        assert_eq!(fragment.previous_sibling(found[1]), Some(found[0]));
        assert_eq!(fragment.previous_sibling(found[0]), None);
        let tail = fragment.next_sibling(found[1]).unwrap();
        assert!(!fragment.is_element(tail));
        assert_eq!(fragment.text_content(fragment.root()), "123");
    }

    #[test]
    fn test_mutations() {
        let mut fragment = Fragment::parse("<p><em class=\"x y\">a</em><b>b</b></p>");
        let p = fragment.children(fragment.root()).next().unwrap();
        let em = fragment.elements_with_class("x")[0];
        let b = fragment.next_sibling(em).unwrap();

        let copy = fragment.deep_clone(em);
        fragment.remove_class(copy, "x");
        let wrapper = fragment.create_element("span", &[("class", "w")]);
        fragment.append(wrapper, copy);
        fragment.insert_before(em, wrapper);
        fragment.detach(em);
        let text = fragment.children(b).next().unwrap();
        fragment.append(p, text);

        assert_eq!(
            fragment.to_html(),
            "<p><span class=\"w\"><em class=\"y\">a</em></span><b></b>b</p>"
        );
    }

    #[test]
    fn test_remove_last_class_drops_attribute() {
        let mut elem = ElementData::new("em");
        elem.set_attr("class", "only");
        elem.set_attr("title", "t");
        elem.remove_class("only");
        assert_eq!(elem.attr("class"), None);
        assert_eq!(elem.attr("title"), Some("t"));
    }
}
