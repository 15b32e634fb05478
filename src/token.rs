//! Token model shared by the lexer, the stream and every rule.
//!
//! A [`Token`] is a tagged union: the variant is the kind and the payload is
//! the literal source text. Tokens are never mutated in place; edits replace
//! them wholesale through [`crate::stream::TokenStream`].

use std::fmt;

/// Position of an operator relative to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorFixity {
    Prefix,
    Infix,
    Postfix,
}

/// Payload-free discriminant of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Operator,
    StartOfScope,
    EndOfScope,
    Delimiter,
    Space,
    Linebreak,
    Comment,
}

/// One lexical unit of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Names, plus number and string literals (opaque to the type layer).
    Identifier(String),
    /// Reserved words and `@attributes`.
    Keyword(String),
    Operator(String, OperatorFixity),
    StartOfScope(String),
    EndOfScope(String),
    /// `,`, `:` and `;`.
    Delimiter(String),
    Space(String),
    Linebreak(String),
    Comment(String),
}

impl Token {
    /// The literal source text of this token.
    pub fn text(&self) -> &str {
        match self {
            Token::Identifier(text)
            | Token::Keyword(text)
            | Token::Operator(text, _)
            | Token::StartOfScope(text)
            | Token::EndOfScope(text)
            | Token::Delimiter(text)
            | Token::Space(text)
            | Token::Linebreak(text)
            | Token::Comment(text) => text,
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Identifier(_) => TokenKind::Identifier,
            Token::Keyword(_) => TokenKind::Keyword,
            Token::Operator(..) => TokenKind::Operator,
            Token::StartOfScope(_) => TokenKind::StartOfScope,
            Token::EndOfScope(_) => TokenKind::EndOfScope,
            Token::Delimiter(_) => TokenKind::Delimiter,
            Token::Space(_) => TokenKind::Space,
            Token::Linebreak(_) => TokenKind::Linebreak,
            Token::Comment(_) => TokenKind::Comment,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Token::Identifier(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Token::Keyword(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_operator(&self) -> Option<(&str, OperatorFixity)> {
        match self {
            Token::Operator(text, fixity) => Some((text, *fixity)),
            _ => None,
        }
    }

    pub fn as_start_of_scope(&self) -> Option<&str> {
        match self {
            Token::StartOfScope(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_end_of_scope(&self) -> Option<&str> {
        match self {
            Token::EndOfScope(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_delimiter(&self) -> Option<&str> {
        match self {
            Token::Delimiter(text) => Some(text),
            _ => None,
        }
    }

    /// Whitespace, linebreaks and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Space(_) | Token::Linebreak(_) | Token::Comment(_)
        )
    }

    pub fn is_space_or_linebreak(&self) -> bool {
        matches!(self, Token::Space(_) | Token::Linebreak(_))
    }

    pub fn is_linebreak(&self) -> bool {
        matches!(self, Token::Linebreak(_))
    }

    pub fn is_start_of_scope(&self, text: &str) -> bool {
        self.as_start_of_scope() == Some(text)
    }

    pub fn is_end_of_scope(&self, text: &str) -> bool {
        self.as_end_of_scope() == Some(text)
    }

    pub fn is_delimiter(&self, text: &str) -> bool {
        self.as_delimiter() == Some(text)
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.as_keyword() == Some(text)
    }

    pub fn is_identifier(&self, text: &str) -> bool {
        self.as_identifier() == Some(text)
    }

    /// Operator with the given text, any fixity.
    pub fn is_operator(&self, text: &str) -> bool {
        self.as_operator().is_some_and(|(op, _)| op == text)
    }

    /// Postfix operator with the given text.
    pub fn is_postfix(&self, text: &str) -> bool {
        self.as_operator() == Some((text, OperatorFixity::Postfix))
    }

    /// The closing text that ends a scope opened by this token, if any.
    pub fn closing_scope(&self) -> Option<&'static str> {
        closing_for(self.as_start_of_scope()?)
    }

    /// Convenience constructors used by rules when building replacements.
    pub fn space() -> Self {
        Token::Space(" ".to_string())
    }

    pub fn open(text: &str) -> Self {
        Token::StartOfScope(text.to_string())
    }

    pub fn close(text: &str) -> Self {
        Token::EndOfScope(text.to_string())
    }

    pub fn delimiter(text: &str) -> Self {
        Token::Delimiter(text.to_string())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Closing counterpart of an opening scope text.
pub fn closing_for(open: &str) -> Option<&'static str> {
    match open {
        "(" => Some(")"),
        "[" => Some("]"),
        "{" => Some("}"),
        "<" => Some(">"),
        _ => None,
    }
}

/// Concatenate the source text of a token run.
pub fn join_text<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    tokens.into_iter().map(Token::text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_kind() {
        let token = Token::Operator("->".to_string(), OperatorFixity::Infix);
        assert_eq!(token.text(), "->");
        assert_eq!(token.kind(), TokenKind::Operator);
        assert_eq!(token.as_operator(), Some(("->", OperatorFixity::Infix)));
        assert_eq!(token.as_start_of_scope(), None);
    }

    #[test]
    fn test_trivia() {
        assert!(Token::space().is_trivia());
        assert!(Token::Linebreak("\n".to_string()).is_trivia());
        assert!(Token::Comment("// hi".to_string()).is_trivia());
        assert!(!Token::Identifier("Int".to_string()).is_trivia());
    }

    #[test]
    fn test_closing_scope() {
        assert_eq!(Token::open("(").closing_scope(), Some(")"));
        assert_eq!(Token::open("<").closing_scope(), Some(">"));
        assert_eq!(Token::close(")").closing_scope(), None);
    }

    #[test]
    fn test_postfix() {
        let token = Token::Operator("?".to_string(), OperatorFixity::Postfix);
        assert!(token.is_postfix("?"));
        assert!(token.is_operator("?"));
        assert!(!Token::Operator("?".to_string(), OperatorFixity::Infix).is_postfix("?"));
    }

    #[test]
    fn test_join_text() {
        let tokens = [
            Token::open("["),
            Token::Identifier("Int".to_string()),
            Token::close("]"),
        ];
        assert_eq!(join_text(&tokens), "[Int]");
    }
}
