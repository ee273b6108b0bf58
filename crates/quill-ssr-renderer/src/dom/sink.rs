//! html5ever token sink building a [`Fragment`] arena.
//!
//! Only the tokenizer is used. Elements nest exactly as the markup says, with
//! none of the tree builder's insertion-mode rules, so a `<div>` inside a `<p>`
//! stays inside it and nothing is reparented or implied.

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use html5ever::{LocalName, Namespace, QualName, local_name};
use indextree::{Arena, NodeId};

use super::{ElementData, Fragment, HTML_NAMESPACE, NodeData, VOID_ELEMENTS};

/// Parse `html` into a fragment whose root is a document node.
pub(super) fn parse(html: &str) -> Fragment {
    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));
    let tokenizer = Tokenizer::new(ArenaSink::new(), TokenizerOpts::default());
    let _ = tokenizer.feed(&input);
    tokenizer.end();
    tokenizer.sink.finish()
}

struct ArenaSink {
    arena: RefCell<Arena<NodeData>>,
    open: RefCell<Vec<NodeId>>,
    document: NodeId,
}

impl ArenaSink {
    fn new() -> Self {
        let mut arena = Arena::new();
        let document = arena.new_node(NodeData::Document);
        Self {
            arena: RefCell::new(arena),
            open: RefCell::new(vec![document]),
            document,
        }
    }

    fn finish(self) -> Fragment {
        Fragment {
            arena: self.arena.into_inner(),
            root: self.document,
        }
    }

    fn current(&self) -> NodeId {
        self.open.borrow().last().copied().unwrap_or(self.document)
    }

    fn append_node(&self, data: NodeData) -> NodeId {
        let parent = self.current();
        let mut arena = self.arena.borrow_mut();
        let node = arena.new_node(data);
        parent.append(node, &mut *arena);
        node
    }

    fn append_text(&self, text: StrTendril) {
        let parent = self.current();
        let mut arena = self.arena.borrow_mut();
        if let Some(last) = arena[parent].last_child() {
            if let NodeData::Text(existing) = arena[last].get_mut() {
                existing.push_tendril(&text);
                return;
            }
        }
        let node = arena.new_node(NodeData::Text(text));
        parent.append(node, &mut *arena);
    }

    fn start_tag(&self, tag: Tag) -> TokenSinkResult<NodeId> {
        let void = VOID_ELEMENTS.contains(&&*tag.name);
        let mode = content_mode(&tag.name);
        let node = self.append_node(NodeData::Element(ElementData {
            name: QualName::new(None, Namespace::from(HTML_NAMESPACE), tag.name),
            attrs: tag.attrs,
        }));
        if void || tag.self_closing {
            return TokenSinkResult::Continue;
        }
        self.open.borrow_mut().push(node);
        mode
    }

    /// Close the innermost open element with this name. Stray end tags are dropped.
    fn end_tag(&self, tag: &Tag) {
        let arena = self.arena.borrow();
        let mut open = self.open.borrow_mut();
        let position = open.iter().rposition(|&id| match arena[id].get() {
            NodeData::Element(elem) => elem.name.local == tag.name,
            _ => false,
        });
        match position {
            Some(index) => open.truncate(index),
            None => tracing::trace!(tag = %tag.name, "unmatched end tag"),
        }
    }
}

/// Tokenizer state for an element's content.
fn content_mode(name: &LocalName) -> TokenSinkResult<NodeId> {
    match *name {
        local_name!("script") => TokenSinkResult::RawData(RawKind::ScriptData),
        local_name!("style")
        | local_name!("xmp")
        | local_name!("iframe")
        | local_name!("noembed")
        | local_name!("noframes")
        | local_name!("noscript") => TokenSinkResult::RawData(RawKind::Rawtext),
        local_name!("title") | local_name!("textarea") => {
            TokenSinkResult::RawData(RawKind::Rcdata)
        }
        local_name!("plaintext") => TokenSinkResult::Plaintext,
        _ => TokenSinkResult::Continue,
    }
}

impl TokenSink for ArenaSink {
    type Handle = NodeId;

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<NodeId> {
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return self.start_tag(tag),
                TagKind::EndTag => self.end_tag(&tag),
            },
            Token::CharacterTokens(text) => self.append_text(text),
            Token::CommentToken(text) => {
                self.append_node(NodeData::Comment(text));
            }
            Token::ParseError(msg) => log_parse_error(msg),
            Token::DoctypeToken(_) | Token::NullCharacterToken | Token::EOFToken => {}
        }
        TokenSinkResult::Continue
    }
}

fn log_parse_error(msg: Cow<'static, str>) {
    tracing::trace!(%msg, "html parse error");
}
