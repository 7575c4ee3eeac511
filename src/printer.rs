//! Token emitter
//!
//! Remembers the category of the last token written and inserts a single space only
//! where two adjacent tokens would otherwise lex as one.

/// Category of an emitted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    SoftKeyword,
    Number,
    /// String, bytes and interpolated string literals.
    Literal,
    Delimiter,
    Operator,
    Newline,
    EndStatement,
}

impl TokenKind {
    fn is_word(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier | TokenKind::Keyword | TokenKind::SoftKeyword | TokenKind::Number
        )
    }
}

fn starts_word(text: &str) -> bool {
    text.chars()
        .next()
        .map(|c| c.is_alphanumeric() || c == '_')
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct Printer {
    out: String,
    last: TokenKind,
    /// The last token was an integer spelled in plain decimal digits.
    last_plain_int: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Printer::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Printer {
            out: String::new(),
            last: TokenKind::Newline,
            last_plain_int: false,
        }
    }

    fn emit(&mut self, kind: TokenKind, text: &str) {
        if self.last.is_word() && starts_word(text) {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.last = kind;
        self.last_plain_int = false;
    }

    pub fn identifier(&mut self, name: &str) {
        self.emit(TokenKind::Identifier, name);
    }

    pub fn keyword(&mut self, keyword: &str) {
        self.emit(TokenKind::Keyword, keyword);
    }

    pub fn soft_keyword(&mut self, keyword: &str) {
        self.emit(TokenKind::SoftKeyword, keyword);
    }

    pub fn number(&mut self, text: &str) {
        self.emit(TokenKind::Number, text);
        self.last_plain_int = crate::literal::is_plain_decimal(text);
    }

    pub fn literal(&mut self, text: &str) {
        self.emit(TokenKind::Literal, text);
    }

    pub fn delimiter(&mut self, text: &str) {
        // `1.real` would lex as a float
        if self.last_plain_int && text.starts_with('.') {
            self.out.push(' ');
        }
        self.emit(TokenKind::Delimiter, text);
    }

    pub fn operator(&mut self, text: &str) {
        self.emit(TokenKind::Operator, text);
    }

    pub fn newline(&mut self) {
        self.out.push('\n');
        self.last = TokenKind::Newline;
        self.last_plain_int = false;
    }

    pub fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push(' ');
        }
    }

    pub fn end_statement(&mut self) {
        self.out.push(';');
        self.last = TokenKind::EndStatement;
        self.last_plain_int = false;
    }

    pub fn finish(self) -> String {
        let mut out = self.out;
        while out.ends_with('\n') {
            out.pop();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_only_between_words() {
        let mut printer = Printer::new();
        printer.keyword("return");
        printer.identifier("x");
        printer.operator("+");
        printer.number("1");
        printer.keyword("if");
        printer.literal("'a'");
        printer.keyword("else");
        printer.identifier("y");
        assert_eq!(printer.finish(), "return x+1 if'a'else y");
    }

    #[test]
    fn test_plain_int_before_attribute() {
        let mut printer = Printer::new();
        printer.number("1");
        printer.delimiter(".");
        printer.identifier("real");
        printer.end_statement();
        printer.number("1.5");
        printer.delimiter(".");
        printer.identifier("real");
        assert_eq!(printer.finish(), "1 .real;1.5.real");
    }
}
