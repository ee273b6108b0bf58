//! Splits operations into lines and groups them for rendering.

use std::sync::LazyLock;

use serde_json::Value;

use super::ConverterOptions;
use super::op_html::is_custom_embed;
use crate::delta::{Operation, RENDER_AS_BLOCK};

static NEWLINE: LazyLock<Operation> = LazyLock::new(|| Operation::text("\n"));

/// Newline attributes that turn the preceding line into a block.
const BLOCK_ATTRIBUTES: [&str; 7] = [
    "blockquote",
    "code-block",
    "list",
    "header",
    "align",
    "direction",
    "indent",
];

const LAYOUT_ATTRIBUTES: [&str; 3] = ["align", "direction", "indent"];

#[derive(Debug)]
pub(super) enum Group<'a> {
    Inline(Vec<&'a Operation>),
    Block(BlockGroup<'a>),
    List(ListGroup<'a>),
    Video(&'a Operation),
    Blot(&'a Operation),
}

/// A block-closing newline and the operations of the line(s) it closes.
#[derive(Debug)]
pub(super) struct BlockGroup<'a> {
    pub op: &'a Operation,
    pub ops: Vec<&'a Operation>,
}

#[derive(Debug)]
pub(super) struct ListGroup<'a> {
    pub items: Vec<BlockGroup<'a>>,
}

impl ListGroup<'_> {
    pub fn is_ordered(&self) -> bool {
        self.items
            .first()
            .and_then(|item| item.op.attr("list"))
            .and_then(Value::as_str)
            == Some("ordered")
    }

    fn kind(&self) -> Option<&str> {
        self.items.first().and_then(|item| list_kind(item.op))
    }
}

/// Split text inserts so each line break is an operation of its own.
pub(super) fn denormalize(ops: &[Operation]) -> Vec<Operation> {
    let mut out = Vec::with_capacity(ops.len());
    for op in ops {
        let text = match op.as_text() {
            Some(text) if text != "\n" && text.contains('\n') => text,
            _ => {
                out.push(op.clone());
                continue;
            }
        };
        for piece in text.split_inclusive('\n') {
            let (line, newline) = match piece.strip_suffix('\n') {
                Some(line) => (line, true),
                None => (piece, false),
            };
            if !line.is_empty() {
                out.push(Operation::text(line).with_attributes(op.attributes.clone()));
            }
            if newline {
                out.push(Operation::text("\n").with_attributes(op.attributes.clone()));
            }
        }
    }
    out
}

pub(super) fn is_container_block(op: &Operation) -> bool {
    op.is_newline() && BLOCK_ATTRIBUTES.iter().any(|attr| op.has_attr(attr))
}

fn is_video(op: &Operation) -> bool {
    op.as_embed().is_some_and(|embed| embed.kind == "video")
}

fn is_blot_block(op: &Operation) -> bool {
    is_custom_embed(op) && op.has_attr(RENDER_AS_BLOCK)
}

pub(super) fn group<'a>(ops: &'a [Operation], options: &ConverterOptions) -> Vec<Group<'a>> {
    let mut groups = Vec::new();
    let mut inline: Vec<&'a Operation> = Vec::new();
    let mut line: Vec<&'a Operation> = Vec::new();

    for op in ops {
        if is_video(op) || is_blot_block(op) {
            inline.append(&mut line);
            flush_inline(&mut groups, &mut inline);
            groups.push(if is_video(op) {
                Group::Video(op)
            } else {
                Group::Blot(op)
            });
        } else if is_container_block(op) {
            flush_inline(&mut groups, &mut inline);
            groups.push(Group::Block(BlockGroup {
                op,
                ops: std::mem::take(&mut line),
            }));
        } else if op.is_newline() {
            inline.append(&mut line);
            inline.push(op);
        } else {
            line.push(op);
        }
    }
    inline.append(&mut line);
    flush_inline(&mut groups, &mut inline);

    gather_lists(merge_blocks(groups, options))
}

fn flush_inline<'a>(groups: &mut Vec<Group<'a>>, inline: &mut Vec<&'a Operation>) {
    if !inline.is_empty() {
        groups.push(Group::Inline(std::mem::take(inline)));
    }
}

fn merge_blocks<'a>(groups: Vec<Group<'a>>, options: &ConverterOptions) -> Vec<Group<'a>> {
    let mut out = Vec::with_capacity(groups.len());
    let mut run: Vec<BlockGroup<'a>> = Vec::new();
    for group in groups {
        match group {
            Group::Block(block) => {
                if let Some(last) = run.last() {
                    if !mergeable(last, &block, options) {
                        out.push(Group::Block(join_blocks(std::mem::take(&mut run))));
                    }
                }
                run.push(block);
            }
            other => {
                if !run.is_empty() {
                    out.push(Group::Block(join_blocks(std::mem::take(&mut run))));
                }
                out.push(other);
            }
        }
    }
    if !run.is_empty() {
        out.push(Group::Block(join_blocks(run)));
    }
    out
}

fn mergeable(prev: &BlockGroup<'_>, next: &BlockGroup<'_>, options: &ConverterOptions) -> bool {
    let (a, b) = (prev.op, next.op);
    if a.has_attr("list") || b.has_attr("list") {
        return false;
    }
    if a.has_attr("blockquote") && b.has_attr("blockquote") {
        return options.multi_line_blockquote && same_layout(a, b);
    }
    if a.has_attr("code-block") && b.has_attr("code-block") {
        return options.multi_line_codeblock && a.attr("code-block") == b.attr("code-block");
    }
    if a.has_attr("header") && b.has_attr("header") {
        return options.multi_line_header
            && a.attr("header") == b.attr("header")
            && same_layout(a, b);
    }
    false
}

fn same_layout(a: &Operation, b: &Operation) -> bool {
    LAYOUT_ATTRIBUTES.iter().all(|attr| a.attr(attr) == b.attr(attr))
}

/// Fold merged blocks into the first one. Lines are joined by newlines and an
/// empty line contributes a single newline.
fn join_blocks(run: Vec<BlockGroup<'_>>) -> BlockGroup<'_> {
    let last = run.len().saturating_sub(1);
    let op = run[0].op;
    let mut ops = Vec::new();
    for (i, block) in run.into_iter().enumerate() {
        if block.ops.is_empty() {
            ops.push(&*NEWLINE);
            continue;
        }
        ops.extend(block.ops);
        if i < last {
            ops.push(&*NEWLINE);
        }
    }
    BlockGroup { op, ops }
}

/// Check lists of either state count as one kind.
fn list_kind(op: &Operation) -> Option<&str> {
    match op.attr("list")?.as_str()? {
        "checked" | "unchecked" => Some("check"),
        other => Some(other),
    }
}

fn gather_lists(groups: Vec<Group<'_>>) -> Vec<Group<'_>> {
    let mut out: Vec<Group<'_>> = Vec::with_capacity(groups.len());
    for group in groups {
        let block = match group {
            Group::Block(block) if list_kind(block.op).is_some() => block,
            other => {
                out.push(other);
                continue;
            }
        };
        if let Some(Group::List(list)) = out.last_mut() {
            if list.kind() == list_kind(block.op) {
                list.items.push(block);
                continue;
            }
        }
        out.push(Group::List(ListGroup { items: vec![block] }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(ops: &[Operation]) -> Vec<&str> {
        ops.iter().map(|op| op.as_text().unwrap_or("<embed>")).collect()
    }

    #[test]
    fn test_denormalize_splits_lines() {
        let ops = vec![Operation::text("a\n\nb"), Operation::text("\n")];
        assert_eq!(texts(&denormalize(&ops)), ["a", "\n", "\n", "b", "\n"]);
    }

    #[test]
    fn test_denormalize_keeps_attributes() {
        let bold = serde_json::json!({"bold": true});
        let op = Operation::text("x\ny").with_attributes(bold.as_object().cloned().unwrap());
        let ops = denormalize(std::slice::from_ref(&op));
        assert_eq!(ops.len(), 3);
        assert!(ops.iter().all(|op| op.has_attr("bold")));
    }

    #[test]
    fn test_group_shapes() {
        let ops: Vec<Operation> = serde_json::from_value(serde_json::json!([
            {"insert": "intro"},
            {"insert": "\n"},
            {"insert": "Title"},
            {"insert": "\n", "attributes": {"header": 1}},
            {"insert": {"video": "https://v"}},
            {"insert": "one"},
            {"insert": "\n", "attributes": {"list": "bullet"}},
            {"insert": "two"},
            {"insert": "\n", "attributes": {"list": "bullet"}},
            {"insert": {"tweet": {}}, "attributes": {"renderAsBlock": true}},
        ]))
        .unwrap();
        let groups = group(&ops, &ConverterOptions::default());
        let shapes: Vec<&str> = groups
            .iter()
            .map(|group| match group {
                Group::Inline(_) => "inline",
                Group::Block(_) => "block",
                Group::List(_) => "list",
                Group::Video(_) => "video",
                Group::Blot(_) => "blot",
            })
            .collect();
        assert_eq!(shapes, ["inline", "block", "video", "list", "blot"]);
        let Group::List(list) = &groups[3] else {
            panic!("expected a list");
        };
        assert_eq!(list.items.len(), 2);
    }

    #[test]
    fn test_merged_code_blocks_keep_empty_lines() {
        let ops: Vec<Operation> = serde_json::from_value(serde_json::json!([
            {"insert": "a"},
            {"insert": "\n", "attributes": {"code-block": true}},
            {"insert": "\n", "attributes": {"code-block": true}},
            {"insert": "b"},
            {"insert": "\n", "attributes": {"code-block": true}},
        ]))
        .unwrap();
        let groups = group(&ops, &ConverterOptions::default());
        assert_eq!(groups.len(), 1);
        let Group::Block(block) = &groups[0] else {
            panic!("expected a block");
        };
        let lines: Vec<&str> = block.ops.iter().filter_map(|op| op.as_text()).collect();
        assert_eq!(lines, ["a", "\n", "\n", "b"]);
    }
}
