use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum TokenKind {
    #[regex(r"[ \t\r\n]+", logos::skip)]
    _WS,
    #[regex(r"--[^\n]*", logos::skip)]
    _COMMENT,
    #[regex(r"[A-Za-z][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),
    #[token("package", ignore(ascii_case))]
    KwPackage,
    #[token("procedure", ignore(ascii_case))]
    KwProcedure,
    #[token("function", ignore(ascii_case))]
    KwFunction,
    #[token("is", ignore(ascii_case))]
    KwIs,
    #[token("begin", ignore(ascii_case))]
    KwBegin,
    #[token("end", ignore(ascii_case))]
    KwEnd,
    #[token("loop", ignore(ascii_case))]
    KwLoop,
    #[token("declare", ignore(ascii_case))]
    KwDeclare,
    #[token("type", ignore(ascii_case))]
    KwType,
    #[token("subtype", ignore(ascii_case))]
    KwSubtype,
    #[token("constant", ignore(ascii_case))]
    KwConstant,
    #[token("in", ignore(ascii_case))]
    KwIn,
    #[token("out", ignore(ascii_case))]
    KwOut,
    #[token("return", ignore(ascii_case))]
    KwReturn,
    #[token("array", ignore(ascii_case))]
    KwArray,
    #[token("of", ignore(ascii_case))]
    KwOf,
    #[token("for", ignore(ascii_case))]
    KwFor,
    #[token("while", ignore(ascii_case))]
    KwWhile,
    #[token("range", ignore(ascii_case))]
    KwRange,
    #[token("with", ignore(ascii_case))]
    KwWith,
    #[token("use", ignore(ascii_case))]
    KwUse,
    #[token("null", ignore(ascii_case))]
    KwNull,
    #[token("when", ignore(ascii_case))]
    KwWhen,
    #[token("others", ignore(ascii_case))]
    KwOthers,
    #[token("then", ignore(ascii_case))]
    KwThen,
    #[token("if", ignore(ascii_case))]
    KwIf,
    #[token("else", ignore(ascii_case))]
    KwElse,
    #[token("elsif", ignore(ascii_case))]
    KwElsif,
    #[token("exit", ignore(ascii_case))]
    KwExit,
    #[token(":=")]
    Assign,
    #[token("=>")]
    Arrow,
    #[token("..")]
    DotDot,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(".")]
    Dot,
    #[token("'")]
    Tick,
    #[token("**")]
    Pow,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("&")]
    Amp,
    #[token("|")]
    Bar,
    #[token("=")]
    Eq,
    #[token("/=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<>")]
    Box,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: std::ops::Range<usize>,
}

// No string-literal token: a `--` inside a string still starts a comment,
// the documented limitation of the comment stripping rule.
pub fn lex(input: &str) -> Vec<Token> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();
    while let Some(res) = lexer.next() {
        match res {
            Ok(kind) => {
                if matches!(kind, TokenKind::_WS | TokenKind::_COMMENT) {
                    continue;
                }
                let span = lexer.span();
                tokens.push(Token { kind, span });
            }
            Err(_) => {
                let span = lexer.span();
                let text = input.get(span.clone()).unwrap_or("").to_string();
                tokens.push(Token {
                    kind: TokenKind::Error(text),
                    span,
                });
            }
        }
    }
    tokens
}

/// True for any token whose text is an identifier-shaped word, keywords
/// included. Keyword tokens count as identifiers in capture positions.
pub fn is_word_kind(kind: &TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Ident(_)
            | KwPackage
            | KwProcedure
            | KwFunction
            | KwIs
            | KwBegin
            | KwEnd
            | KwLoop
            | KwDeclare
            | KwType
            | KwSubtype
            | KwConstant
            | KwIn
            | KwOut
            | KwReturn
            | KwArray
            | KwOf
            | KwFor
            | KwWhile
            | KwRange
            | KwWith
            | KwUse
            | KwNull
            | KwWhen
            | KwOthers
            | KwThen
            | KwIf
            | KwElse
            | KwElsif
            | KwExit
    )
}

/// Source text of a word token, `None` for punctuation, numbers and errors.
pub fn word_text<'s>(src: &'s str, tok: &Token) -> Option<&'s str> {
    if is_word_kind(&tok.kind) {
        Some(&src[tok.span.clone()])
    } else {
        None
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Maximal `[A-Za-z0-9_]+` runs of `text`, with their byte ranges.
/// A run is never a substring of a larger run, so replacing a run cannot
/// alter a containing identifier.
pub fn word_runs(text: &str) -> impl Iterator<Item = (std::ops::Range<usize>, &str)> + '_ {
    let bytes = text.as_bytes();
    let mut pos = 0usize;
    std::iter::from_fn(move || {
        while pos < bytes.len() && !is_word_byte(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            return None;
        }
        let start = pos;
        while pos < bytes.len() && is_word_byte(bytes[pos]) {
            pos += 1;
        }
        Some((start..pos, &text[start..pos]))
    })
}

/// Byte offset of the first whole-word, case-insensitive occurrence of
/// `word` in `text` at or after `start`. Scans raw text, comments included.
pub fn find_word_after(text: &str, start: usize, word: &str) -> Option<usize> {
    word_runs(&text[start..])
        .find(|(_, run)| run.eq_ignore_ascii_case(word))
        .map(|(range, _)| start + range.start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_declaration_line() {
        let toks = lex("X : Integer := 0; -- counter");
        let kinds: Vec<_> = toks.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident("X".into()),
                TokenKind::Colon,
                TokenKind::Ident("Integer".into()),
                TokenKind::Assign,
                TokenKind::Number("0".into()),
                TokenKind::Semi,
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let toks = lex("PACKAGE Procedure fUnCtIoN");
        assert_eq!(toks[0].kind, TokenKind::KwPackage);
        assert_eq!(toks[1].kind, TokenKind::KwProcedure);
        assert_eq!(toks[2].kind, TokenKind::KwFunction);
    }

    #[test]
    fn keyword_prefix_lexes_as_ident() {
        let toks = lex("useful package_name");
        assert_eq!(toks[0].kind, TokenKind::Ident("useful".into()));
        assert_eq!(toks[1].kind, TokenKind::Ident("package_name".into()));
    }

    #[test]
    fn range_dots_do_not_eat_number() {
        let toks = lex("1 .. 10");
        assert_eq!(toks[0].kind, TokenKind::Number("1".into()));
        assert_eq!(toks[1].kind, TokenKind::DotDot);
        assert_eq!(toks[2].kind, TokenKind::Number("10".into()));
    }

    #[test]
    fn word_runs_are_maximal() {
        let runs: Vec<_> = word_runs("cnt recount cnt_2 (cnt)")
            .map(|(_, w)| w)
            .collect();
        assert_eq!(runs, vec!["cnt", "recount", "cnt_2", "cnt"]);
    }

    #[test]
    fn find_word_matches_whole_words_only() {
        let text = "procedure This_Is_It is -- is it?\nbegin";
        let proc = find_word_after(text, 0, "procedure").unwrap();
        assert_eq!(proc, 0);
        // skips This_Is_It, lands on the standalone "is"
        assert_eq!(find_word_after(text, proc + 1, "is"), Some(21));
        assert_eq!(find_word_after(text, 21, "begin"), Some(34));
    }

    #[test]
    fn find_word_sees_comment_text() {
        let text = "procedure P -- is\nbegin";
        assert_eq!(find_word_after(text, 0, "is"), Some(15));
    }
}
