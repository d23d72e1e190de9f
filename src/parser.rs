//! Parser for the DON notation
//!
//! DON is a compact hierarchical text notation. A document is a list of
//! named nodes separated by `,` or newlines; each name may be followed by a
//! `(...)` property block and a `{...}` child block, and child blocks nest.
//!
//! Syntax:
//!
//!     Sequence      := (Node (Separator Node)*)?
//!     Separator     := ',' | newline
//!     Node          := Name PropertyBlock? ChildBlock?
//!     PropertyBlock := '(' PropertyList ')'
//!     Property      := Key ('=' Value)?
//!     ChildBlock    := '{' Sequence '}'
//!
//! Examples:
//!
//! - `Apples,Bananas,Cherries`: three nodes under the root
//! - `Apple(small,red,ounces=5.2)`: one node with two flags and one value
//! - `Menu(id=file){popup{menuitem(onclick=||doThing()||)}}`: nesting plus
//!   an escape block
//!
//! Two context rules give the grammar its character. Inside a property
//! block, the separator is `,` until a raw newline is seen; from then to the
//! end of that block the list is one-property-per-line and `,` is ordinary
//! text. And a span that begins with a doubled `|` is an escape block:
//! everything up to the next `||` is captured verbatim, delimiters included.
//! Escape blocks work as node names, property keys, and property values.
//!
//! Scanning trims leading whitespace and keeps everything after the first
//! non-whitespace character, so names and values may contain spaces.
//! Parsing is tolerant of malformed nesting with two exceptions: a repeated
//! property key and a `}` with no open child block are reported as
//! [`ParseError`]s.

use crate::error::ParseError;
use crate::node::Node;

const LIST_SEPARATOR: char = ',';
const PROPERTY_SEPARATOR: char = ',';
const PROPERTY_OPEN: char = '(';
const PROPERTY_CLOSE: char = ')';
const PROPERTY_ASSIGN: char = '=';
const CHILD_OPEN: char = '{';
const CHILD_CLOSE: char = '}';
const ESCAPE: char = '|';

/// Name of the synthetic node that owns the top-level sequence
const ROOT_NAME: &str = "Root";

/// Parse a complete DON document into its tree
///
/// The returned node is a synthetic root named `Root` whose children are the
/// document's top-level nodes. Errors are limited to a duplicate key inside
/// one property block and a `}` that closes nothing; all other malformed
/// input degrades (empty names are skipped, an unclosed `{` is closed by the
/// end of input).
pub fn parse(input: &str) -> Result<Node, ParseError> {
    let mut scanner = Scanner::new(input);
    let mut root = Node::new(ROOT_NAME);
    let mut stack: Vec<OpenBlock> = Vec::new();
    let mut current: Option<Node> = None;
    let mut state = State::Names;
    let mut newline_mode = false;

    const NAME_STOPS: &[Stop] = &[
        Stop::ListSeparator,
        Stop::ChildOpen,
        Stop::ChildClose,
        Stop::PropertyOpen,
    ];
    const KEY_STOPS: &[Stop] = &[
        Stop::PropertySeparator,
        Stop::Newline,
        Stop::PropertyClose,
        Stop::Assign,
    ];
    const KEY_STOPS_PER_LINE: &[Stop] = &[Stop::Newline, Stop::PropertyClose, Stop::Assign];
    const VALUE_STOPS: &[Stop] = &[Stop::PropertySeparator, Stop::Newline, Stop::PropertyClose];
    const VALUE_STOPS_PER_LINE: &[Stop] = &[Stop::Newline, Stop::PropertyClose];

    while !scanner.at_end() {
        match state {
            State::Names => {
                let scan = scanner.scan_until(NAME_STOPS);
                if !scan.text.is_empty() {
                    if let Some(node) = current.take() {
                        attach(&mut root, &mut stack, node);
                    }
                    current = Some(Node::new(scan.text));
                }
                match scan.stop {
                    Some(Stop::PropertyOpen) => {
                        newline_mode = false;
                        state = State::Properties;
                    }
                    Some(Stop::ChildOpen) => match current.take() {
                        Some(node) => stack.push(OpenBlock::Node(node)),
                        None => stack.push(OpenBlock::Reopen),
                    },
                    Some(Stop::ChildClose) => {
                        if let Some(node) = current.take() {
                            attach(&mut root, &mut stack, node);
                        }
                        match stack.pop() {
                            Some(OpenBlock::Node(node)) => attach(&mut root, &mut stack, node),
                            Some(OpenBlock::Reopen) => {}
                            None => {
                                return Err(ParseError::UnmatchedClose {
                                    position: scan.position,
                                })
                            }
                        }
                    }
                    _ => {}
                }
            }
            State::Properties => {
                let key_stops = if newline_mode {
                    KEY_STOPS_PER_LINE
                } else {
                    KEY_STOPS
                };
                let scan = scanner.scan_until(key_stops);
                let mut stop = scan.stop;
                let mut value = None;
                if stop == Some(Stop::Assign) {
                    let value_stops = if newline_mode {
                        VALUE_STOPS_PER_LINE
                    } else {
                        VALUE_STOPS
                    };
                    let value_scan = scanner.scan_until(value_stops);
                    value = Some(value_scan.text);
                    stop = value_scan.stop;
                }
                match stop {
                    Some(Stop::Newline) => newline_mode = true,
                    Some(Stop::PropertyClose) => state = State::Names,
                    _ => {}
                }
                if !scan.text.is_empty() {
                    let key = scan.text;
                    let target = property_target(&mut root, &mut stack, &mut current);
                    if target.properties.insert(key.clone(), value).is_some() {
                        return Err(ParseError::DuplicateKey {
                            node: target.name.clone(),
                            key,
                        });
                    }
                }
            }
        }
    }

    if let Some(node) = current.take() {
        attach(&mut root, &mut stack, node);
    }
    while let Some(block) = stack.pop() {
        if let OpenBlock::Node(node) = block {
            attach(&mut root, &mut stack, node);
        }
    }
    Ok(root)
}

/// An entry on the open child-block stack
enum OpenBlock {
    /// A node whose `{...}` block is being filled
    Node(Node),
    /// A `{` with no pending node: the block reopens the enclosing container
    Reopen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    /// Scanning node names in a sequence
    Names,
    /// Scanning keys and values inside a property block
    Properties,
}

/// Append a finished node to the innermost open block, or to the root
fn attach(root: &mut Node, stack: &mut [OpenBlock], node: Node) {
    for block in stack.iter_mut().rev() {
        if let OpenBlock::Node(open) = block {
            open.push(node);
            return;
        }
    }
    root.push(node);
}

/// The node that receives properties: the pending node if there is one,
/// otherwise the innermost open block, otherwise the root
fn property_target<'t>(
    root: &'t mut Node,
    stack: &'t mut Vec<OpenBlock>,
    current: &'t mut Option<Node>,
) -> &'t mut Node {
    if let Some(node) = current.as_mut() {
        return node;
    }
    for block in stack.iter_mut().rev() {
        if let OpenBlock::Node(open) = block {
            return open;
        }
    }
    root
}

/// Terminator classes a scan can stop on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// `,` or a newline between nodes
    ListSeparator,
    /// `,` between properties (comma mode only)
    PropertySeparator,
    /// A raw newline inside a property block
    Newline,
    PropertyOpen,
    PropertyClose,
    ChildOpen,
    ChildClose,
    Assign,
}

impl Stop {
    fn matches(self, c: char) -> bool {
        match self {
            Stop::ListSeparator => c == LIST_SEPARATOR || c == '\n' || c == '\r',
            Stop::PropertySeparator => c == PROPERTY_SEPARATOR,
            Stop::Newline => c == '\n' || c == '\r',
            Stop::PropertyOpen => c == PROPERTY_OPEN,
            Stop::PropertyClose => c == PROPERTY_CLOSE,
            Stop::ChildOpen => c == CHILD_OPEN,
            Stop::ChildClose => c == CHILD_CLOSE,
            Stop::Assign => c == PROPERTY_ASSIGN,
        }
    }
}

/// Result of one scan: the accumulated text, the terminator that ended it
/// (`None` at end of input or after a completed escape block), and the byte
/// offset of that terminator
struct Scan {
    text: String,
    stop: Option<Stop>,
    position: usize,
}

/// Character cursor over the source text with one-character lookahead
struct Scanner<'a> {
    chars: std::str::CharIndices<'a>,
    len: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices(),
            len: input.len(),
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn at_end(&self) -> bool {
        self.chars.clone().next().is_none()
    }

    /// Accumulate text until the first matching terminator
    ///
    /// Terminators are tested in order against each character; the first
    /// match ends the scan and consumes the character. Leading whitespace is
    /// dropped while the buffer is empty and kept afterwards. If the first
    /// two buffered characters would be `||`, the scan switches to verbatim
    /// capture instead and the eventual result carries no terminator.
    fn scan_until(&mut self, stops: &[Stop]) -> Scan {
        let mut text = String::new();
        while let Some((at, c)) = self.bump() {
            if let Some(stop) = stops.iter().copied().find(|stop| stop.matches(c)) {
                return Scan {
                    text,
                    stop: Some(stop),
                    position: at,
                };
            }
            if text.is_empty() && c == ESCAPE && self.peek() == Some(ESCAPE) {
                self.bump();
                return Scan {
                    text: self.verbatim(),
                    stop: None,
                    position: at,
                };
            }
            if !c.is_whitespace() || !text.is_empty() {
                text.push(c);
            }
        }
        Scan {
            text,
            stop: None,
            position: self.len,
        }
    }

    /// Capture everything up to the next `||`, delimiters and newlines
    /// included; the closing marker is consumed, not captured. A lone `|`
    /// stays literal, and an unterminated block runs to the end of input.
    fn verbatim(&mut self) -> String {
        let mut text = String::new();
        while let Some((_, c)) = self.bump() {
            if c == ESCAPE && self.peek() == Some(ESCAPE) {
                self.bump();
                break;
            }
            text.push(c);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_names(node: &Node) -> Vec<&str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_scan_trims_leading_whitespace_only() {
        let mut scanner = Scanner::new("  spaced out ,");
        let scan = scanner.scan_until(&[Stop::ListSeparator]);
        assert_eq!(scan.text, "spaced out ");
        assert_eq!(scan.stop, Some(Stop::ListSeparator));
    }

    #[test]
    fn test_scan_reports_terminator_position() {
        let mut scanner = Scanner::new("ab}");
        let scan = scanner.scan_until(&[Stop::ChildClose]);
        assert_eq!(scan.position, 2);
    }

    #[test]
    fn test_scan_without_terminator_runs_to_end() {
        let mut scanner = Scanner::new("plain text");
        let scan = scanner.scan_until(&[Stop::ChildClose]);
        assert_eq!(scan.text, "plain text");
        assert_eq!(scan.stop, None);
    }

    #[test]
    fn test_escape_block_captures_delimiters() {
        let mut scanner = Scanner::new("||a,b{c}=d||rest");
        let scan = scanner.scan_until(&[Stop::ListSeparator]);
        assert_eq!(scan.text, "a,b{c}=d");
        assert_eq!(scan.stop, None);
        assert_eq!(scanner.peek(), Some('r'));
    }

    #[test]
    fn test_escape_block_only_at_start_of_span() {
        let mut scanner = Scanner::new("a||b,");
        let scan = scanner.scan_until(&[Stop::ListSeparator]);
        assert_eq!(scan.text, "a||b");
    }

    #[test]
    fn test_single_pipe_is_literal() {
        let mut scanner = Scanner::new("a|b,");
        let scan = scanner.scan_until(&[Stop::ListSeparator]);
        assert_eq!(scan.text, "a|b");
    }

    #[test]
    fn test_unterminated_escape_runs_to_end() {
        let mut scanner = Scanner::new("||never closed");
        let scan = scanner.scan_until(&[Stop::ListSeparator]);
        assert_eq!(scan.text, "never closed");
    }

    #[test]
    fn test_parse_empty_input() {
        let root = parse("").unwrap();
        assert_eq!(root.name, "Root");
        assert!(root.children.is_empty());
        assert!(root.properties.is_empty());
    }

    #[test]
    fn test_parse_whitespace_only() {
        let root = parse("  \n\t ").unwrap();
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_separator_after_name_keeps_block_target() {
        // A `{` with only separators since the last name still nests under
        // that name.
        let root = parse("Apple,{One,Two}").unwrap();
        assert_eq!(child_names(&root), vec!["Apple"]);
        assert_eq!(child_names(&root.children[0]), vec!["One", "Two"]);

        let root = parse("Apple\n{One,Two}").unwrap();
        assert_eq!(child_names(&root.children[0]), vec!["One", "Two"]);
    }

    #[test]
    fn test_bare_child_block_reopens_container() {
        let root = parse("{Apples,Bananas}").unwrap();
        assert_eq!(child_names(&root), vec!["Apples", "Bananas"]);

        let root = parse("{One},{Two}").unwrap();
        assert_eq!(child_names(&root), vec!["One", "Two"]);
    }

    #[test]
    fn test_unclosed_child_block_is_tolerated() {
        let root = parse("Apple{One,Two").unwrap();
        assert_eq!(child_names(&root), vec!["Apple"]);
        assert_eq!(child_names(&root.children[0]), vec!["One", "Two"]);
    }

    #[test]
    fn test_deeply_unclosed_blocks_attach_in_order() {
        let root = parse("A{B{C").unwrap();
        assert_eq!(child_names(&root), vec!["A"]);
        assert_eq!(child_names(&root.children[0]), vec!["B"]);
        assert_eq!(child_names(&root.children[0].children[0]), vec!["C"]);
    }

    #[test]
    fn test_unmatched_close_is_an_error() {
        assert_eq!(parse("}"), Err(ParseError::UnmatchedClose { position: 0 }));
        assert_eq!(
            parse("Apple}}"),
            Err(ParseError::UnmatchedClose { position: 5 })
        );
        assert!(parse("Apple{One}}").is_err());
    }

    #[test]
    fn test_matched_close_after_reopen_is_fine() {
        assert!(parse("{A},{B}").is_ok());
        assert!(parse("X{{A}}").is_ok());
    }

    #[test]
    fn test_duplicate_key_is_an_error() {
        assert_eq!(
            parse("Apple(red,red)"),
            Err(ParseError::DuplicateKey {
                node: "Apple".to_string(),
                key: "red".to_string(),
            })
        );
    }

    #[test]
    fn test_duplicate_key_detection_is_case_sensitive() {
        // Keys are stored as written; only identical spellings collide.
        let root = parse("Apple(red,Red)").unwrap();
        assert_eq!(root.children[0].properties.len(), 2);
    }

    #[test]
    fn test_empty_value_differs_from_flag() {
        let root = parse("Apple(flag,empty=)").unwrap();
        let props = &root.children[0].properties;
        assert_eq!(props.get("flag"), Some(None));
        assert_eq!(props.get("empty"), Some(Some("")));
    }

    #[test]
    fn test_value_keeps_inner_assign() {
        let root = parse("Item(formula=a=b)").unwrap();
        assert_eq!(
            root.children[0].properties.get("formula"),
            Some(Some("a=b"))
        );
    }

    #[test]
    fn test_braces_are_plain_text_inside_property_block() {
        let root = parse("Item(shape={x})").unwrap();
        assert_eq!(root.children[0].properties.get("shape"), Some(Some("{x}")));
    }

    #[test]
    fn test_property_block_without_name_targets_root() {
        let root = parse("(apple=one, banana=2)").unwrap();
        assert!(root.children.is_empty());
        assert_eq!(root.properties.get("apple"), Some(Some("one")));
        assert_eq!(root.properties.get("banana"), Some(Some("2")));
    }

    #[test]
    fn test_property_block_inside_child_block_targets_open_node() {
        let root = parse("Apple{(seeded)}").unwrap();
        let apple = &root.children[0];
        assert_eq!(apple.properties.get("seeded"), Some(None));
    }

    #[test]
    fn test_properties_after_closed_block_attach_to_container() {
        // Ungrammatical input: the property block trails a closed child
        // block, so it lands on the enclosing container.
        let root = parse("X{Y}(a=1)").unwrap();
        assert_eq!(root.properties.get("a"), Some(Some("1")));
        assert!(root.children[0].properties.is_empty());
        assert!(root.children[0].children[0].properties.is_empty());
    }

    #[test]
    fn test_newline_mode_is_scoped_to_one_block() {
        let root = parse("A(x=1\ny=2),B(p,q)").unwrap();
        let a = &root.children[0];
        assert_eq!(a.properties.get("x"), Some(Some("1")));
        assert_eq!(a.properties.get("y"), Some(Some("2")));
        let b = &root.children[1];
        assert_eq!(b.properties.len(), 2);
        assert!(b.has_property("p"));
        assert!(b.has_property("q"));
    }

    #[test]
    fn test_newline_mode_keeps_commas_in_values() {
        let root = parse("A(\nx=one, two\ny=three\n)").unwrap();
        let a = &root.children[0];
        assert_eq!(a.properties.get("x"), Some(Some("one, two")));
        assert_eq!(a.properties.get("y"), Some(Some("three")));
    }

    #[test]
    fn test_crlf_separators() {
        let root = parse("Apples\r\nBananas\r\nCherries").unwrap();
        assert_eq!(child_names(&root), vec!["Apples", "Bananas", "Cherries"]);
    }

    #[test]
    fn test_value_at_end_of_input() {
        let root = parse("Apple(ounces=5.2").unwrap();
        assert_eq!(root.children[0].properties.get("ounces"), Some(Some("5.2")));
    }

    #[test]
    fn test_escaped_key_becomes_flag() {
        let root = parse("Item(||a,b||,plain)").unwrap();
        let props = &root.children[0].properties;
        assert_eq!(props.get("a,b"), Some(None));
        assert_eq!(props.get("plain"), Some(None));
    }

    #[test]
    fn test_escaped_name_keeps_newlines() {
        let root = parse("Apple{||line one\nline two||}").unwrap();
        assert_eq!(
            child_names(&root.children[0]),
            vec!["line one\nline two"]
        );
    }
}
