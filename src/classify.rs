use crate::lexer::{self, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Package,
    Subprogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePolicy {
    Upper,
    Lower,
}

impl CasePolicy {
    pub fn apply(self, name: &str) -> String {
        match self {
            CasePolicy::Upper => name.to_ascii_uppercase(),
            CasePolicy::Lower => name.to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubprogramKind {
    Procedure,
    Function,
}

#[derive(Debug, Clone)]
pub struct SubprogramStart {
    pub kind: SubprogramKind,
    pub offset: usize,
}

/// Group a token stream by source line. Tokens never span lines, so each
/// token belongs to exactly one slice; blank and comment-only lines come
/// out empty.
pub fn token_lines<'t>(src: &str, tokens: &'t [Token]) -> Vec<&'t [Token]> {
    let mut out = Vec::new();
    let mut idx = 0;
    let mut lo = 0;
    for line in src.split_inclusive('\n') {
        let hi = lo + line.len();
        let begin = idx;
        while idx < tokens.len() && tokens[idx].span.start < hi {
            idx += 1;
        }
        out.push(&tokens[begin..idx]);
        lo = hi;
    }
    out
}

/// Decide whether a file is a package unit or a subprogram unit from its
/// leading significant lines. `with`/`use` context clauses and lines that
/// open with neither keyword are skipped; exhausting the file defaults to
/// the subprogram path (which itself falls back to package-style scanning
/// when no subprogram keyword exists at all).
pub fn unit_kind(src: &str, tokens: &[Token]) -> UnitKind {
    for line in token_lines(src, tokens) {
        let Some(first) = line.first() else { continue };
        match first.kind {
            TokenKind::KwWith | TokenKind::KwUse => continue,
            TokenKind::KwPackage => {
                log::debug!("classified as package unit");
                return UnitKind::Package;
            }
            TokenKind::KwProcedure | TokenKind::KwFunction => {
                log::debug!("classified as subprogram unit");
                return UnitKind::Subprogram;
            }
            _ => continue,
        }
    }
    UnitKind::Subprogram
}

/// First `procedure`/`function` token in the stream, with its byte offset
/// in the original text.
pub fn find_first_subprogram(tokens: &[Token]) -> Option<SubprogramStart> {
    tokens.iter().find_map(|t| {
        let kind = match t.kind {
            TokenKind::KwProcedure => SubprogramKind::Procedure,
            TokenKind::KwFunction => SubprogramKind::Function,
            _ => return None,
        };
        Some(SubprogramStart {
            kind,
            offset: t.span.start,
        })
    })
}

// Declared-type position after a colon: optional `constant`, optional
// parameter mode, then a word. Alternatives are tried in the original
// heuristic's order, so when no word follows a consumed keyword the
// keyword itself is captured (`X : constant := 5` yields `constant`).
fn type_after_colon(src: &str, rest: &[Token]) -> Option<String> {
    let kind_is = |i: usize, k: &TokenKind| rest.get(i).map(|t| &t.kind) == Some(k);
    for with_constant in [true, false] {
        let base = if with_constant {
            if !kind_is(0, &TokenKind::KwConstant) {
                continue;
            }
            1
        } else {
            0
        };
        let modes: [&[TokenKind]; 4] = [
            &[TokenKind::KwIn, TokenKind::KwOut],
            &[TokenKind::KwIn],
            &[TokenKind::KwOut],
            &[],
        ];
        for mode in modes {
            if !mode.iter().enumerate().all(|(i, k)| kind_is(base + i, k)) {
                continue;
            }
            if let Some(word) = rest
                .get(base + mode.len())
                .and_then(|t| lexer::word_text(src, t))
            {
                return Some(word.to_string());
            }
        }
    }
    None
}

// First `kind` token followed directly by a word, scanning the whole line.
fn word_following(src: &str, line: &[Token], kind: &TokenKind) -> Option<String> {
    line.windows(2).find_map(|w| {
        if &w[0].kind == kind {
            lexer::word_text(src, &w[1]).map(str::to_string)
        } else {
            None
        }
    })
}

/// Type references on one line, each mapped to its uppercase spelling:
/// the declared type of an object or parameter (after a colon), an array
/// element type (after `of`, when the line mentions `array`), and a
/// function return type (after `return`). A line may contribute all three.
pub fn collect_type_names(src: &str, line: &[Token]) -> Vec<(String, String)> {
    let mut found = Vec::new();
    let mut push = |name: String| {
        found.push((name.to_ascii_lowercase(), name.to_ascii_uppercase()));
    };

    if let Some(name) = line
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind == TokenKind::Colon)
        .find_map(|(i, _)| type_after_colon(src, &line[i + 1..]))
    {
        push(name);
    }
    if line.iter().any(|t| t.kind == TokenKind::KwArray) {
        if let Some(name) = word_following(src, line, &TokenKind::KwOf) {
            push(name);
        }
    }
    if let Some(name) = word_following(src, line, &TokenKind::KwReturn) {
        push(name);
    }
    found
}

fn is_plain_number(src: &str, tok: &Token) -> bool {
    matches!(tok.kind, TokenKind::Number(_)) && !src[tok.span.clone()].contains('.')
}

// Comma-separated identifier list: the run before the colon may hold only
// words, integers and commas; each comma segment counts only when it is a
// single bare word. Returns None when the run is empty or malformed.
fn ident_segments(src: &str, prefix: &[Token]) -> Option<Vec<String>> {
    if prefix.is_empty() {
        return None;
    }
    let allowed = |t: &Token| {
        lexer::is_word_kind(&t.kind) || t.kind == TokenKind::Comma || is_plain_number(src, t)
    };
    if !prefix.iter().all(allowed) {
        return None;
    }
    let mut names = Vec::new();
    for segment in prefix.split(|t| t.kind == TokenKind::Comma) {
        if let [single] = segment {
            if let Some(word) = lexer::word_text(src, single) {
                names.push(word.to_string());
            }
        }
    }
    Some(names)
}

#[derive(Debug, Default)]
pub struct Declarations {
    /// canonical name -> assigned spelling, in line order
    pub idents: Vec<(String, String)>,
    /// canonical type name -> uppercase spelling, in line order
    pub types: Vec<(String, String)>,
}

/// Scan a text slice for type/subtype and object declarations. Declared
/// type names and constants are always uppercase; other objects follow
/// `policy`. Lines matching no pattern contribute nothing.
///
/// The object pattern terminates the identifier list at the first `:` or
/// `:=`, so an assignment statement in the scanned range declares its
/// target under `policy` — a quirk of the original heuristic the package
/// path relies on.
pub fn scan_declarations(src: &str, policy: CasePolicy) -> Declarations {
    let tokens = lexer::lex(src);
    let mut decls = Declarations::default();
    for line in token_lines(src, &tokens) {
        if line.is_empty() {
            continue;
        }
        if matches!(line[0].kind, TokenKind::KwType | TokenKind::KwSubtype) {
            if let Some(name) = line.get(1).and_then(|t| lexer::word_text(src, t)) {
                decls
                    .idents
                    .push((name.to_ascii_lowercase(), name.to_ascii_uppercase()));
                decls.types.extend(collect_type_names(src, line));
                continue;
            }
        }
        let Some(sep) = line
            .iter()
            .position(|t| matches!(t.kind, TokenKind::Colon | TokenKind::Assign))
        else {
            continue;
        };
        let Some(names) = ident_segments(src, &line[..sep]) else {
            continue;
        };
        let is_const = line[sep + 1..]
            .iter()
            .any(|t| t.kind == TokenKind::KwConstant);
        for name in names {
            let spelling = if is_const {
                name.to_ascii_uppercase()
            } else {
                policy.apply(&name)
            };
            decls.idents.push((name.to_ascii_lowercase(), spelling));
        }
        decls.types.extend(collect_type_names(src, line));
    }
    decls
}

#[derive(Debug, Default)]
pub struct ParamGroup {
    /// parameter names in source spelling
    pub names: Vec<String>,
    /// canonical type name -> uppercase spelling
    pub types: Vec<(String, String)>,
}

/// Parameter groups of a subprogram header: the slice between the first
/// `(` and the last `)`, split at `;`. Group order is preserved because a
/// later group's parameter may collide with an earlier group's type name.
pub fn scan_parameters(header: &str) -> Vec<ParamGroup> {
    let tokens = lexer::lex(header);
    let Some(open) = tokens.iter().position(|t| t.kind == TokenKind::LParen) else {
        return Vec::new();
    };
    let Some(close) = tokens.iter().rposition(|t| t.kind == TokenKind::RParen) else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }
    let mut groups = Vec::new();
    for group in tokens[open + 1..close].split(|t| t.kind == TokenKind::Semi) {
        let mut out = ParamGroup::default();
        if let Some(sep) = group
            .iter()
            .position(|t| matches!(t.kind, TokenKind::Colon | TokenKind::Assign))
        {
            if let Some(names) = ident_segments(header, &group[..sep]) {
                out.names = names;
            }
        }
        out.types = collect_type_names(header, group);
        groups.push(out);
    }
    groups
}

/// Return type reference in a subprogram header: the word directly
/// following `return`.
pub fn return_type(header: &str) -> Option<String> {
    let tokens = lexer::lex(header);
    word_following(header, &tokens, &TokenKind::KwReturn)
}

/// Every `for <name> in` occurrence in the token stream.
pub fn loop_variables(src: &str, tokens: &[Token]) -> Vec<String> {
    tokens
        .windows(3)
        .filter_map(|w| {
            if w[0].kind == TokenKind::KwFor && w[2].kind == TokenKind::KwIn {
                lexer::word_text(src, &w[1]).map(str::to_string)
            } else {
                None
            }
        })
        .collect()
}

/// Targets of `<name> := ...` lines: the lines whose first two tokens are
/// a word and `:=`.
pub fn assignment_targets(src: &str, tokens: &[Token]) -> Vec<String> {
    token_lines(src, tokens)
        .into_iter()
        .filter_map(|line| match line {
            [first, second, ..] if second.kind == TokenKind::Assign => {
                lexer::word_text(src, first).map(str::to_string)
            }
            _ => None,
        })
        .collect()
}
