//! Coalescing of adjacent inline spoilers.
//!
//! The delta converter emits one element per formatted text run, so a spoiler
//! spanning bold and plain text comes out as several sibling elements that each
//! carry the `inline-spoilers` class. Readers should reveal the whole spoiler at
//! once, so every run of two or more adjacent marked siblings is replaced by a
//! single `<span class="inline-spoilers">` holding the run's content in order.

use indextree::NodeId;

use crate::dom::{Fragment, NodeData};

/// Class carried by inline spoiler elements.
pub const SPOILER_CLASS: &str = "inline-spoilers";

const WRAPPER_TAG: &str = "span";

/// Adjacent marked siblings, plus the ignorable nodes between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoilerRun {
    nodes: Vec<NodeId>,
    members: Vec<NodeId>,
}

impl SpoilerRun {
    /// The marked elements, in document order.
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    fn first(&self) -> NodeId {
        self.members[0]
    }
}

/// Merge every spoiler run in `html` and serialize the result.
pub fn compact_spoilers(html: &str) -> String {
    let mut fragment = Fragment::parse(html);
    let merged = merge_spoiler_runs(&mut fragment);
    tracing::debug!(merged, "compacted inline spoiler runs");
    fragment.to_html()
}

/// Merge all runs in place and return how many were merged.
pub fn merge_spoiler_runs(fragment: &mut Fragment) -> usize {
    let runs = find_spoiler_runs(fragment);
    // Inner runs first, so an enclosing run copies already-merged content.
    for run in runs.iter().rev() {
        merge_run(fragment, run);
    }
    runs.len()
}

/// Runs of at least two marked siblings, in document order of their first member.
pub fn find_spoiler_runs(fragment: &Fragment) -> Vec<SpoilerRun> {
    fragment
        .elements_with_class(SPOILER_CLASS)
        .into_iter()
        .filter(|&id| {
            previous_significant_sibling(fragment, id)
                .is_none_or(|prev| !fragment.has_class(prev, SPOILER_CLASS))
        })
        .filter_map(|first| collect_run(fragment, first))
        .collect()
}

/// Comments and whitespace-only text do not separate run members.
fn is_ignorable(fragment: &Fragment, id: NodeId) -> bool {
    match fragment.get(id) {
        NodeData::Comment(_) => true,
        NodeData::Text(text) => text.trim().is_empty(),
        NodeData::Element(_) | NodeData::Document => false,
    }
}

fn previous_significant_sibling(fragment: &Fragment, id: NodeId) -> Option<NodeId> {
    let mut current = fragment.previous_sibling(id)?;
    while is_ignorable(fragment, current) {
        current = fragment.previous_sibling(current)?;
    }
    Some(current)
}

fn collect_run(fragment: &Fragment, first: NodeId) -> Option<SpoilerRun> {
    let mut nodes = vec![first];
    let mut members = vec![first];
    let mut pending = Vec::new();
    let mut current = first;
    while let Some(next) = fragment.next_sibling(current) {
        if is_ignorable(fragment, next) {
            pending.push(next);
        } else if fragment.has_class(next, SPOILER_CLASS) {
            nodes.append(&mut pending);
            nodes.push(next);
            members.push(next);
        } else {
            break;
        }
        current = next;
    }
    (members.len() > 1).then_some(SpoilerRun { nodes, members })
}

fn merge_run(fragment: &mut Fragment, run: &SpoilerRun) {
    let wrapper = fragment.create_element(WRAPPER_TAG, &[("class", SPOILER_CLASS)]);
    for &node in &run.nodes {
        if !fragment.is_element(node) {
            fragment.append(wrapper, node);
        } else if fragment.tag_name(node) == Some(WRAPPER_TAG) {
            let children: Vec<NodeId> = fragment.children(node).collect();
            for child in children {
                fragment.append(wrapper, child);
            }
        } else {
            let copy = fragment.deep_clone(node);
            fragment.remove_class(copy, SPOILER_CLASS);
            fragment.append(wrapper, copy);
        }
    }
    fragment.insert_before(run.first(), wrapper);
    for &member in run.members() {
        fragment.detach(member);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn count_marked(html: &str) -> usize {
        Fragment::parse(html).elements_with_class(SPOILER_CLASS).len()
    }

    #[test]
    fn test_adjacent_spans_merge() {
        let html = compact_spoilers(
            "<p><span class=\"inline-spoilers\">A</span><span class=\"inline-spoilers\">B</span></p>",
        );
        assert_eq!(html, "<p><span class=\"inline-spoilers\">AB</span></p>");
    }

    #[test]
    fn test_run_text_is_concatenated_in_order() {
        let html = compact_spoilers(
            "<p>x <span class=\"inline-spoilers\">one </span>\
             <span class=\"inline-spoilers\">two </span>\
             <span class=\"inline-spoilers\">three</span> y</p>",
        );
        let fragment = Fragment::parse(&html);
        let marked = fragment.elements_with_class(SPOILER_CLASS);
        assert_eq!(marked.len(), 1);
        assert_eq!(fragment.text_content(marked[0]), "one two three");
        assert_eq!(fragment.text_content(fragment.root()), "x one two three y");
    }

    #[test]
    fn test_singleton_is_untouched() {
        let input = "<p>a <span class=\"inline-spoilers\">b</span> c</p>";
        assert_eq!(compact_spoilers(input), input);
    }

    #[test]
    fn test_separated_spoilers_stay_apart() {
        let input = "<p><span class=\"inline-spoilers\">a</span>\
                     <em>b</em>\
                     <span class=\"inline-spoilers\">c</span></p>";
        assert_eq!(compact_spoilers(input), input);
        assert_eq!(count_marked(input), 2);
    }

    #[test]
    fn test_text_breaks_runs() {
        let input = "<p><span class=\"inline-spoilers\">a</span>, \
                     <span class=\"inline-spoilers\">b</span></p>";
        assert_eq!(compact_spoilers(input), input);
    }

    #[test]
    fn test_run_start_skips_leading_comments() {
        let html = compact_spoilers(
            "<p><em>x</em><!--a--> <span class=\"inline-spoilers\">1</span><span class=\"inline-spoilers\">2</span></p>",
        );
        assert_eq!(
            html,
            "<p><em>x</em><!--a--> <span class=\"inline-spoilers\">12</span></p>"
        );
    }

    #[test]
    fn test_block_content_outside_the_run_is_untouched() {
        let html = compact_spoilers(
            "<p><span class=\"inline-spoilers\">a</span><span class=\"inline-spoilers\">b</span><div></div></p>",
        );
        assert_eq!(
            html,
            "<p><span class=\"inline-spoilers\">ab</span><div></div></p>"
        );
    }

    #[test]
    fn test_whitespace_and_comments_join_the_wrapper() {
        let html = compact_spoilers(
            "<p><span class=\"inline-spoilers\">a</span> <!--x--><span class=\"inline-spoilers\">b</span></p>",
        );
        assert_eq!(
            html,
            "<p><span class=\"inline-spoilers\">a <!--x-->b</span></p>"
        );
    }

    #[test]
    fn test_non_span_members_are_nested_without_marker() {
        let html = compact_spoilers(
            "<p><span class=\"inline-spoilers\">a</span>\
             <strong class=\"inline-spoilers\">b</strong>\
             <em class=\"inline-spoilers other\">c</em></p>",
        );
        assert_eq!(
            html,
            "<p><span class=\"inline-spoilers\">a<strong>b</strong><em class=\"other\">c</em></span></p>"
        );
    }

    #[test]
    fn test_nested_runs_merge_inside_out() {
        let html = compact_spoilers(
            "<p><strong class=\"inline-spoilers\">\
             <span class=\"inline-spoilers\">a</span><span class=\"inline-spoilers\">b</span>\
             </strong><span class=\"inline-spoilers\">c</span></p>",
        );
        assert_eq!(
            html,
            "<p><span class=\"inline-spoilers\"><strong><span class=\"inline-spoilers\">ab</span></strong>c</span></p>"
        );
    }

    #[test]
    fn test_run_as_only_child() {
        let html = compact_spoilers(
            "<span class=\"inline-spoilers\">1</span><span class=\"inline-spoilers\">2</span>",
        );
        assert_eq!(html, "<span class=\"inline-spoilers\">12</span>");
    }

    #[test]
    fn test_several_runs_in_one_fragment() {
        let mut fragment = Fragment::parse(
            "<p><span class=\"inline-spoilers\">a</span><span class=\"inline-spoilers\">b</span></p>\
             <p><span class=\"inline-spoilers\">c</span><span class=\"inline-spoilers\">d</span></p>",
        );
        assert_eq!(find_spoiler_runs(&fragment).len(), 2);
        assert_eq!(merge_spoiler_runs(&mut fragment), 2);
        assert_eq!(fragment.elements_with_class(SPOILER_CLASS).len(), 2);
    }

    #[test]
    fn test_empty_and_unmarked_input() {
        assert_eq!(compact_spoilers(""), "");
        assert_eq!(compact_spoilers("<p>plain</p>"), "<p>plain</p>");
    }

    #[test]
    fn test_output_is_deterministic() {
        let input = "<p><span class=\"inline-spoilers\">a</span><b class=\"inline-spoilers\">b</b></p>";
        assert_eq!(compact_spoilers(input), compact_spoilers(input));
    }
}
