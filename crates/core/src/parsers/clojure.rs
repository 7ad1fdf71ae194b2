//! Coarse reader for Clojure-family source.
//!
//! Produces a tree of delimited forms, strings, comments and discard forms
//! for callers that have no host syntax tree of their own. It knows nothing
//! about special forms and never fails: unterminated collections and strings
//! run to end of text, stray closing delimiters become one-byte atoms.
//! Openers nested deeper than [`MAX_DEPTH`] are read as atoms, which keeps
//! the tree shallow on pathological input.

use super::SyntaxNode;
use crate::models::TextRange;

/// Deepest collection or discard nesting kept as tree structure
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Top-level container for the whole text
    Document,
    /// `( ... )`
    List,
    /// `[ ... ]`
    Vector,
    /// `{ ... }`
    Map,
    /// `#{ ... }`
    Set,
    /// `#( ... )`
    AnonFn,
    /// `"..."`
    Str,
    /// `#"..."`
    Regex,
    /// `; ...` up to (not including) the line break
    Comment,
    /// `#_` followed by the form it discards
    Discard,
    /// Symbols, keywords, numbers, character literals, reader prefixes
    Atom,
}

/// A node of the coarse syntax tree, borrowing the text it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNode<'a> {
    pub kind: NodeKind,
    pub text: &'a str,
    /// Absolute byte range
    pub range: TextRange,
    pub children: Vec<SourceNode<'a>>,
}

impl SyntaxNode for SourceNode<'_> {
    fn text(&self) -> &str {
        self.text
    }

    fn text_range(&self) -> TextRange {
        self.range
    }

    fn children(&self) -> Vec<&dyn SyntaxNode> {
        self.children
            .iter()
            .map(|child| child as &dyn SyntaxNode)
            .collect()
    }

    fn is_line_comment(&self) -> bool {
        self.kind == NodeKind::Comment
    }

    fn is_discard_form(&self) -> bool {
        self.kind == NodeKind::Discard
    }
}

pub struct ClojureReader;

impl ClojureReader {
    /// Read `text` as a document starting at offset 0
    pub fn read(text: &str) -> SourceNode<'_> {
        Self::read_at(text, 0)
    }

    /// Read `text` as a region that starts at `base_offset` in the host document
    pub fn read_at(text: &str, base_offset: usize) -> SourceNode<'_> {
        let mut cursor = Cursor {
            src: text,
            bytes: text.as_bytes(),
            pos: 0,
            base: base_offset,
            depth: 0,
        };
        let children = cursor.read_seq(None);
        cursor.node(NodeKind::Document, 0, children)
    }
}

struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    base: usize,
    depth: usize,
}

fn is_closer(b: u8) -> bool {
    matches!(b, b')' | b']' | b'}')
}

fn ends_atom(b: u8) -> bool {
    b.is_ascii_whitespace()
        || matches!(b, b',' | b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'"' | b';')
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn node(&self, kind: NodeKind, start: usize, children: Vec<SourceNode<'a>>) -> SourceNode<'a> {
        SourceNode {
            kind,
            text: &self.src[start..self.pos],
            range: TextRange::new(start, self.pos).shifted(self.base),
            children,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Step over one whole character, keeping `pos` on a char boundary
    fn bump_char(&mut self) {
        if let Some(c) = self.src[self.pos..].chars().next() {
            self.pos += c.len_utf8();
        }
    }

    /// Read forms until `close` (consumed) or end of text
    fn read_seq(&mut self, close: Option<u8>) -> Vec<SourceNode<'a>> {
        let mut forms = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(b) if Some(b) == close => {
                    self.pos += 1;
                    break;
                }
                Some(_) => forms.push(self.read_form()),
            }
        }
        forms
    }

    fn read_form(&mut self) -> SourceNode<'a> {
        let start = self.pos;
        if self.depth >= MAX_DEPTH {
            if let Some(len) = self.opener_len() {
                self.pos += len;
                return self.node(NodeKind::Atom, start, Vec::new());
            }
        }
        match (self.peek(), self.peek_at(1)) {
            (Some(b';'), _) => {
                while let Some(b) = self.peek() {
                    if b == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
                self.node(NodeKind::Comment, start, Vec::new())
            }
            (Some(b'('), _) => self.collection(NodeKind::List, 1, b')'),
            (Some(b'['), _) => self.collection(NodeKind::Vector, 1, b']'),
            (Some(b'{'), _) => self.collection(NodeKind::Map, 1, b'}'),
            (Some(b'#'), Some(b'(')) => self.collection(NodeKind::AnonFn, 2, b')'),
            (Some(b'#'), Some(b'{')) => self.collection(NodeKind::Set, 2, b'}'),
            (Some(b'"'), _) => {
                self.pos += 1;
                self.skip_string();
                self.node(NodeKind::Str, start, Vec::new())
            }
            (Some(b'#'), Some(b'"')) => {
                self.pos += 2;
                self.skip_string();
                self.node(NodeKind::Regex, start, Vec::new())
            }
            (Some(b'#'), Some(b'_')) => {
                self.pos += 2;
                self.skip_whitespace();
                let target = match self.peek() {
                    Some(b) if !is_closer(b) => {
                        self.depth += 1;
                        let form = self.read_form();
                        self.depth -= 1;
                        vec![form]
                    }
                    _ => Vec::new(),
                };
                self.node(NodeKind::Discard, start, target)
            }
            (Some(b'\\'), _) => {
                // Character literal: `\(` must not open a collection
                self.pos += 1;
                self.bump_char();
                self.skip_atom();
                self.node(NodeKind::Atom, start, Vec::new())
            }
            (Some(b), _) if is_closer(b) => {
                self.pos += 1;
                self.node(NodeKind::Atom, start, Vec::new())
            }
            _ => {
                self.bump_char();
                self.skip_atom();
                self.node(NodeKind::Atom, start, Vec::new())
            }
        }
    }

    fn collection(&mut self, kind: NodeKind, open_len: usize, close: u8) -> SourceNode<'a> {
        let start = self.pos;
        self.pos += open_len;
        self.depth += 1;
        let children = self.read_seq(Some(close));
        self.depth -= 1;
        self.node(kind, start, children)
    }

    /// Length of the opening delimiter at the cursor, if any
    fn opener_len(&self) -> Option<usize> {
        match (self.peek(), self.peek_at(1)) {
            (Some(b'(' | b'[' | b'{'), _) => Some(1),
            (Some(b'#'), Some(b'(' | b'{' | b'_')) => Some(2),
            _ => None,
        }
    }

    /// Consume a string body after its opening quote, honouring escapes
    fn skip_string(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    self.pos += 1;
                    self.bump_char();
                }
                b'"' => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn skip_atom(&mut self) {
        while let Some(b) = self.peek() {
            if ends_atom(b) {
                break;
            }
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(node: &SourceNode<'_>) -> Vec<NodeKind> {
        node.children.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn test_read_defn() {
        let doc = ClojureReader::read("(defn f [x] x)");
        assert_eq!(doc.kind, NodeKind::Document);
        assert_eq!(kinds(&doc), vec![NodeKind::List]);

        let list = &doc.children[0];
        assert_eq!(list.range, TextRange::new(0, 14));
        assert_eq!(
            kinds(list),
            vec![NodeKind::Atom, NodeKind::Atom, NodeKind::Vector, NodeKind::Atom]
        );
        assert_eq!(list.children[0].text, "defn");
        assert_eq!(list.children[2].text, "[x]");
    }

    #[test]
    fn test_comment_stops_before_newline() {
        let doc = ClojureReader::read(";; hi\n(and a b)");
        assert_eq!(kinds(&doc), vec![NodeKind::Comment, NodeKind::List]);
        assert_eq!(doc.children[0].text, ";; hi");
        assert_eq!(doc.children[0].range, TextRange::new(0, 5));
        assert!(doc.children[0].is_line_comment());
    }

    #[test]
    fn test_document_is_never_a_comment() {
        let doc = ClojureReader::read("; header\n(or a b)");
        assert!(!doc.is_line_comment());
    }

    #[test]
    fn test_discard_wraps_next_form() {
        let doc = ClojureReader::read("#_(and a b) c");
        assert_eq!(kinds(&doc), vec![NodeKind::Discard, NodeKind::Atom]);

        let discard = &doc.children[0];
        assert_eq!(discard.text, "#_(and a b)");
        assert!(discard.is_discard_form());
        assert_eq!(kinds(discard), vec![NodeKind::List]);
    }

    #[test]
    fn test_discard_before_closer_is_empty() {
        let doc = ClojureReader::read("(a #_)");
        let list = &doc.children[0];
        assert_eq!(list.text, "(a #_)");
        assert_eq!(kinds(list), vec![NodeKind::Atom, NodeKind::Discard]);
        assert!(list.children[1].children.is_empty());
    }

    #[test]
    fn test_string_with_escaped_quote() {
        let doc = ClojureReader::read(r#""a \" b" c"#);
        assert_eq!(kinds(&doc), vec![NodeKind::Str, NodeKind::Atom]);
        assert_eq!(doc.children[0].text, r#""a \" b""#);
    }

    #[test]
    fn test_character_literal_does_not_open_list() {
        let doc = ClojureReader::read(r"(\( x)");
        let list = &doc.children[0];
        assert_eq!(list.range, TextRange::new(0, 6));
        assert_eq!(list.children[0].text, r"\(");
        assert_eq!(list.children[1].text, "x");
    }

    #[test]
    fn test_reader_dispatch_kinds() {
        let doc = ClojureReader::read(r##"#{1 2} #(inc %) #"a+" {:k v}"##);
        assert_eq!(
            kinds(&doc),
            vec![NodeKind::Set, NodeKind::AnonFn, NodeKind::Regex, NodeKind::Map]
        );
    }

    #[test]
    fn test_unterminated_and_stray_delimiters() {
        let doc = ClojureReader::read("(a (b");
        assert_eq!(doc.children[0].range, TextRange::new(0, 5));

        let doc = ClojureReader::read(")a");
        assert_eq!(kinds(&doc), vec![NodeKind::Atom, NodeKind::Atom]);
        assert_eq!(doc.children[0].text, ")");
    }

    #[test]
    fn test_multibyte_text_keeps_char_boundaries() {
        let doc = ClojureReader::read("(str \"λ→\" \\λ ∧)");
        let list = &doc.children[0];
        assert_eq!(list.children[1].text, "\"λ→\"");
        assert_eq!(list.children[2].text, "\\λ");
        assert_eq!(list.children[3].text, "∧");
    }

    #[test]
    fn test_read_at_shifts_ranges() {
        let doc = ClojureReader::read_at("(or a b)", 100);
        assert_eq!(doc.range, TextRange::new(100, 108));
        assert_eq!(doc.children[0].children[0].range, TextRange::new(101, 103));
    }

    fn depth(node: &SourceNode<'_>) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(node, 0)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children.iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    #[test]
    fn test_deep_nesting_is_flattened() {
        let text = "(".repeat(100_000);
        let doc = ClojureReader::read(&text);
        assert_eq!(doc.range, TextRange::new(0, 100_000));
        assert_eq!(depth(&doc), MAX_DEPTH + 1);
    }

    #[test]
    fn test_deep_discard_chain_is_flattened() {
        let text = "#_".repeat(50_000) + "x";
        let doc = ClojureReader::read(&text);
        assert!(depth(&doc) <= MAX_DEPTH + 1);
    }

    #[test]
    fn test_forms_past_depth_limit_still_read() {
        let text = format!("{}(and a b)", "[".repeat(MAX_DEPTH));
        let doc = ClojureReader::read(&text);
        assert_eq!(doc.range.end, text.len());
        assert!(doc.children[0].text.ends_with("(and a b)"));
    }
}
