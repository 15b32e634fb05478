//! Swift source tokenizer.
//!
//! Raw lexing is done by a `logos` automaton; a second pass assigns operator
//! fixity from the surrounding spacing and a third pass turns generic angle
//! brackets into scopes. Concatenating the text of the produced tokens always
//! reproduces the input exactly, and no input is rejected: characters the
//! automaton does not recognise become single-character operators.

use crate::scope::{match_scope, next_non_trivia};
use crate::token::{OperatorFixity, Token};
use logos::Logos;

const KEYWORDS: &[&str] = &[
    "actor", "any", "as", "associatedtype", "async", "await", "break", "case", "catch", "class",
    "continue", "default", "defer", "deinit", "do", "else", "enum", "extension", "fallthrough",
    "false", "fileprivate", "for", "func", "guard", "if", "import", "in", "init", "inout",
    "internal", "is", "let", "nil", "open", "operator", "private", "protocol", "public",
    "repeat", "rethrows", "return", "self", "some", "static", "struct", "subscript", "super",
    "switch", "throw", "throws", "true", "try", "typealias", "var", "where", "while",
];

/// Effect keywords that may sit between a parameter clause and its `->`.
const EFFECTS: &[&str] = &["async", "throws", "rethrows"];

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Raw {
    #[regex(r"[ \t]+")]
    Space,

    #[regex(r"\r\n|\n|\r")]
    Linebreak,

    #[regex(r"//[^\r\n]*", priority = 10)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    #[regex(r"`[^`\r\n]+`")]
    EscapedWord,

    #[regex(r"@[A-Za-z_][A-Za-z0-9_]*")]
    Attribute,

    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"0x[0-9A-Fa-f_]+")]
    Number,

    #[regex(r#""([^"\\\r\n]|\\.)*""#)]
    StringLiteral,

    #[regex(r"[(\[{]")]
    Open,

    #[regex(r"[)\]}]")]
    Close,

    #[regex(r"[,:;]")]
    Delimiter,

    // `/` never joins a run, so a run cannot swallow `//` or `/*`
    #[regex(r"[=\-+!*%<>&|^~?.]+")]
    #[token("/")]
    #[token("/=")]
    Operator,
}

/// Consume the rest of a block comment after its `/*`.
///
/// Swift block comments nest. An unterminated comment runs to the end of
/// the input.
fn block_comment(lex: &mut logos::Lexer<'_, Raw>) -> bool {
    let rest = lex.remainder();
    let bytes = rest.as_bytes();
    let mut depth = 1usize;
    let mut index = 0;
    while index + 1 < bytes.len() {
        match (bytes[index], bytes[index + 1]) {
            (b'/', b'*') => {
                depth += 1;
                index += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                index += 2;
                if depth == 0 {
                    lex.bump(index);
                    return true;
                }
            }
            _ => index += 1,
        }
    }
    lex.bump(rest.len());
    true
}

/// A raw lexeme before fixity and generic resolution.
#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
    raw: Raw,
    text: &'a str,
}

impl Piece<'_> {
    /// Tokens after which an operator counts as whitespace-separated.
    fn frees_left(&self) -> bool {
        matches!(
            self.raw,
            Raw::Space
                | Raw::Linebreak
                | Raw::LineComment
                | Raw::BlockComment
                | Raw::Open
                | Raw::Delimiter
        )
    }

    /// Tokens before which an operator counts as whitespace-separated.
    fn frees_right(&self) -> bool {
        matches!(
            self.raw,
            Raw::Space
                | Raw::Linebreak
                | Raw::LineComment
                | Raw::BlockComment
                | Raw::Close
                | Raw::Delimiter
        )
    }
}

/// Tokenize Swift source text.
pub fn tokenize(source: &str) -> Vec<Token> {
    let pieces = raw_pieces(source);
    let mut tokens = Vec::with_capacity(pieces.len());
    for (index, piece) in pieces.iter().enumerate() {
        let text = piece.text.to_string();
        let token = match piece.raw {
            Raw::Space => Token::Space(text),
            Raw::Linebreak => Token::Linebreak(text),
            Raw::LineComment | Raw::BlockComment => Token::Comment(text),
            Raw::Word if KEYWORDS.contains(&piece.text) => Token::Keyword(text),
            Raw::Attribute => Token::Keyword(text),
            Raw::Word | Raw::EscapedWord | Raw::Number | Raw::StringLiteral => Token::Identifier(text),
            Raw::Open => Token::StartOfScope(text),
            Raw::Close => Token::EndOfScope(text),
            Raw::Delimiter => Token::Delimiter(text),
            Raw::Operator => {
                let previous = index.checked_sub(1).and_then(|i| pieces.get(i));
                let fixity = fixity(piece.text, previous, pieces.get(index + 1));
                Token::Operator(text, fixity)
            }
        };
        tokens.push(token);
    }
    resolve_generics(&mut tokens);
    tokens
}

fn raw_pieces(source: &str) -> Vec<Piece<'_>> {
    let mut pieces: Vec<Piece<'_>> = Vec::new();
    let mut lexer = Raw::lexer(source);
    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        match result {
            Ok(Raw::Operator) => split_operator_run(text, &mut pieces),
            Ok(raw) => pieces.push(Piece { raw, text }),
            Err(()) => pieces.push(Piece {
                raw: Raw::Operator,
                text,
            }),
        }
    }
    pieces
}

/// Peel leading `?`/`!` off an operator run glued to its left operand.
///
/// `Int?>` or `a!.b` lex as one run; Swift treats the leading characters as
/// separate postfix operators.
fn split_operator_run<'a>(run: &'a str, pieces: &mut Vec<Piece<'a>>) {
    let mut rest = run;
    while rest.len() > 1
        && (rest.starts_with('?') || rest.starts_with('!'))
        && !matches!(rest, "!=" | "!==")
        && pieces.last().is_some_and(|p| !p.frees_left())
    {
        let (head, tail) = rest.split_at(1);
        pieces.push(Piece {
            raw: Raw::Operator,
            text: head,
        });
        rest = tail;
    }
    pieces.push(Piece {
        raw: Raw::Operator,
        text: rest,
    });
}

fn fixity(text: &str, previous: Option<&Piece<'_>>, next: Option<&Piece<'_>>) -> OperatorFixity {
    if text == "->" {
        return OperatorFixity::Infix;
    }
    let bound_left = previous.is_some_and(|p| !p.frees_left());
    let bound_right = next.is_some_and(|p| !p.frees_right());
    match (bound_left, bound_right) {
        (true, false) => OperatorFixity::Postfix,
        (false, true) => OperatorFixity::Prefix,
        // `Int?` directly followed by another operator, e.g. `Int?>`
        (true, true) if text == "?" || text == "!" => {
            if next.is_some_and(|p| p.raw == Raw::Operator) {
                OperatorFixity::Postfix
            } else {
                OperatorFixity::Infix
            }
        }
        _ => OperatorFixity::Infix,
    }
}

/// Turn `<`…`>` pairs that enclose only type syntax into scopes.
fn resolve_generics(tokens: &mut Vec<Token>) {
    let mut index = 1;
    while index < tokens.len() {
        let glued_to_name = tokens[index].is_operator("<")
            && tokens[index - 1]
                .as_identifier()
                .is_some_and(|name| name.starts_with(|c: char| c.is_alphabetic() || c == '_'));
        if glued_to_name {
            if let Some((close, depth)) = scan_generic(tokens, index) {
                let closing_at = split_closing_run(tokens, close) + depth;
                tokens[index] = Token::open("<");
                tokens[closing_at] = Token::close(">");
            }
        }
        index += 1;
    }
}

/// Find the operator run holding the `>` that closes the `<` at `open`.
///
/// Returns the run position and how many of its leading `>` characters
/// belong to nested, still unresolved generic lists.
fn scan_generic(tokens: &[Token], open: usize) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut index = open + 1;
    while index < tokens.len() {
        match &tokens[index] {
            Token::Identifier(_) | Token::Space(_) => {}
            Token::Keyword(word)
                if word.starts_with('@')
                    || matches!(word.as_str(), "some" | "any" | "inout")
                    || EFFECTS.contains(&word.as_str()) => {}
            Token::Delimiter(text) if text == "," || text == ":" => {}
            Token::StartOfScope(text) if matches!(text.as_str(), "(" | "[" | "<") => {
                index = match_scope(tokens, index)?;
            }
            Token::Operator(op, _) => {
                let closers = op.chars().take_while(|c| *c == '>').count();
                if op == "<" {
                    depth += 1;
                } else if closers > 0 {
                    if closers > depth {
                        return Some((index, depth));
                    }
                    depth -= closers;
                } else if !is_type_operator(op) {
                    return None;
                }
            }
            _ => return None,
        }
        index += 1;
    }
    None
}

/// Operators that may appear inside a generic argument list.
fn is_type_operator(op: &str) -> bool {
    matches!(op, "->" | "." | "&") || op.chars().all(|c| c == '?' || c == '!')
}

/// Split `>>` or `>=` style runs so each leading `>` is its own token.
///
/// Returns the position of the first `>`.
fn split_closing_run(tokens: &mut Vec<Token>, at: usize) -> usize {
    let text = tokens[at].text().to_string();
    if text == ">" {
        return at;
    }
    let closers = text.chars().take_while(|c| *c == '>').count();
    let mut replacement: Vec<Token> = (0..closers)
        .map(|_| Token::Operator(">".to_string(), OperatorFixity::Infix))
        .collect();
    let remainder = &text[closers..];
    if !remainder.is_empty() {
        replacement.push(Token::Operator(
            remainder.to_string(),
            OperatorFixity::Infix,
        ));
    }
    tokens.splice(at..=at, replacement);
    at
}

/// Whether `tokens[index]` begins a closure type such as `(Int) -> Void`.
///
/// Leading attributes (`@escaping`, `@Sendable`) are skipped; effect
/// keywords between the parameter clause and the arrow are allowed.
pub fn is_start_of_closure_type(tokens: &[Token], index: usize) -> bool {
    let mut index = index;
    while tokens
        .get(index)
        .and_then(Token::as_keyword)
        .is_some_and(|word| word.starts_with('@'))
    {
        match next_non_trivia(tokens, index) {
            Some(next) => index = next,
            None => return false,
        }
    }
    let Some(token) = tokens.get(index) else {
        return false;
    };
    if !token.is_start_of_scope("(") {
        return false;
    }
    let Some(close) = match_scope(tokens, index) else {
        return false;
    };
    let mut next = next_non_trivia(tokens, close);
    while let Some(position) = next {
        match tokens[position].as_keyword() {
            Some(word) if EFFECTS.contains(&word) => next = next_non_trivia(tokens, position),
            _ => break,
        }
    }
    next.is_some_and(|position| tokens[position].is_operator("->"))
}
