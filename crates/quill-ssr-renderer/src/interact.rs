//! Hand-off point for client-side behavior on rendered HTML.
//!
//! Rendering is static; revealing spoilers needs a live document. Hosts that
//! have one implement [`InteractionRoot`] for it and supply the behaviors, and
//! [`attach_event_listeners`] wires them to the right nodes.

use indextree::NodeId;

use crate::dom::Fragment;

pub const INLINE_SPOILER_SELECTOR: &str = ".inline-spoilers";
pub const IMAGE_SPOILER_SELECTOR: &str = ".ql-block-image.spoilers";

/// A document (or subtree) that can be queried by selector.
pub trait InteractionRoot {
    type Node;

    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpoilerableOptions {
    pub spoilers: bool,
}

/// Behaviors attached to rendered spoiler nodes.
pub trait SpoilerBehaviors<N> {
    fn add_inline_spoiler_listeners(&self, node: &N);

    fn make_spoilerable(&self, node: &N, options: SpoilerableOptions);
}

/// Attach spoiler behaviors under `root`. Does nothing without a root.
pub fn attach_event_listeners<R, B>(root: Option<&R>, behaviors: &B)
where
    R: InteractionRoot,
    B: SpoilerBehaviors<R::Node> + ?Sized,
{
    let Some(root) = root else {
        return;
    };
    for node in root.query_selector_all(INLINE_SPOILER_SELECTOR) {
        behaviors.add_inline_spoiler_listeners(&node);
    }
    for node in root.query_selector_all(IMAGE_SPOILER_SELECTOR) {
        behaviors.make_spoilerable(&node, SpoilerableOptions { spoilers: true });
    }
}

/// Compound class selectors only (`.a`, `.a.b`); anything else matches nothing.
impl InteractionRoot for Fragment {
    type Node = NodeId;

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(classes) = selector.strip_prefix('.') else {
            return Vec::new();
        };
        let classes: Vec<&str> = classes.split('.').collect();
        if classes.iter().any(|class| class.is_empty()) {
            return Vec::new();
        }
        self.elements_with_class(classes[0])
            .into_iter()
            .filter(|&id| classes[1..].iter().all(|class| self.has_class(id, class)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl SpoilerBehaviors<NodeId> for (&Fragment, Recorder) {
        fn add_inline_spoiler_listeners(&self, node: &NodeId) {
            let text = self.0.text_content(*node);
            self.1.calls.borrow_mut().push(format!("inline:{text}"));
        }

        fn make_spoilerable(&self, node: &NodeId, options: SpoilerableOptions) {
            let tag = self.0.tag_name(*node).unwrap_or("?").to_owned();
            self.1
                .calls
                .borrow_mut()
                .push(format!("spoilerable:{tag}:{}", options.spoilers));
        }
    }

    #[test]
    fn test_wires_both_behaviors() {
        let fragment = Fragment::parse(
            "<p><span class=\"inline-spoilers\">secret</span></p>\
             <div class=\"ql-block-image ql-embed spoilers\"><img src=\"a.png\"/></div>\
             <div class=\"ql-block-image ql-embed\"><img src=\"b.png\"/></div>",
        );
        let behaviors = (&fragment, Recorder::default());
        attach_event_listeners(Some(&fragment), &behaviors);
        assert_eq!(
            *behaviors.1.calls.borrow(),
            ["inline:secret", "spoilerable:div:true"]
        );
    }

    #[test]
    fn test_missing_root_is_a_no_op() {
        let fragment = Fragment::parse("<span class=\"inline-spoilers\">x</span>");
        let behaviors = (&fragment, Recorder::default());
        attach_event_listeners::<Fragment, _>(None, &behaviors);
        assert!(behaviors.1.calls.borrow().is_empty());
    }

    #[test]
    fn test_selector_support() {
        let fragment = Fragment::parse("<b class=\"a b\">1</b><b class=\"a\">2</b>");
        assert_eq!(fragment.query_selector_all(".a").len(), 2);
        assert_eq!(fragment.query_selector_all(".a.b").len(), 1);
        assert!(fragment.query_selector_all("b").is_empty());
        assert!(fragment.query_selector_all(".a..b").is_empty());
    }
}
