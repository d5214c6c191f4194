use std::collections::HashMap;

use crate::classify::{self, CasePolicy, UnitKind};
use crate::lexer;

/// Origin stage of a mapping record. Precedence is the order the builder
/// records stages in, not a property of the map itself; the stage only
/// carries the override rule applied at collision time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Global,
    GlobalType,
    Parameter,
    ParameterType,
    ReturnType,
    Local,
    LocalType,
    LoopVar,
    ExternalGlobal,
}

/// Identifier mapping for one file: canonical (case-folded) name to the
/// spelling every occurrence is rewritten to. Built once per file,
/// applied once, discarded.
#[derive(Debug, Default)]
pub struct CaseMap {
    entries: HashMap<String, String>,
}

fn is_all_upper(spelling: &str) -> bool {
    spelling.chars().any(|c| c.is_ascii_alphabetic())
        && !spelling.chars().any(|c| c.is_ascii_lowercase())
}

impl CaseMap {
    /// Record one (stage, canonical key, spelling) binding. A later record
    /// overrides an earlier one at the same key, except:
    /// - `LoopVar` only lands on absent keys or keys currently spelled
    ///   fully uppercase (demoting a global/constant/type to a loop
    ///   variable, never touching an established lowercase local);
    /// - `ExternalGlobal` only lands on absent keys.
    pub fn record(&mut self, stage: Stage, canon: String, spelling: String) {
        match stage {
            Stage::LoopVar => match self.entries.get(&canon) {
                Some(current) if !is_all_upper(current) => {}
                _ => {
                    self.entries.insert(canon, spelling);
                }
            },
            Stage::ExternalGlobal => {
                self.entries.entry(canon).or_insert(spelling);
            }
            _ => {
                self.entries.insert(canon, spelling);
            }
        }
    }

    pub fn get(&self, canon: &str) -> Option<&str> {
        self.entries.get(canon).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by canonical name, for stable dumps.
    pub fn iter_sorted(&self) -> Vec<(&str, &str)> {
        let mut items: Vec<_> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        items.sort();
        items
    }

    /// Rewrite every whole-word, case-insensitive occurrence of a mapped
    /// name in `text` — comments included — leaving all other bytes
    /// unchanged. A replacement occupies exactly the original word's span,
    /// so no pass can create or destroy matches.
    pub fn apply(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (range, word) in lexer::word_runs(text) {
            if let Some(spelling) = self.entries.get(&word.to_ascii_lowercase()) {
                out.push_str(&text[last..range.start]);
                out.push_str(spelling);
                last = range.end;
            }
        }
        out.push_str(&text[last..]);
        out
    }
}

fn record_declarations(
    map: &mut CaseMap,
    slice: &str,
    policy: CasePolicy,
    ident_stage: Stage,
    type_stage: Stage,
) {
    let decls = classify::scan_declarations(slice, policy);
    for (canon, spelling) in decls.idents {
        map.record(ident_stage, canon, spelling);
    }
    for (canon, spelling) in decls.types {
        map.record(type_stage, canon, spelling);
    }
}

/// Package unit: every declaration in the file is global, uppercase.
fn package_mapping(src: &str) -> CaseMap {
    let mut map = CaseMap::default();
    record_declarations(
        &mut map,
        src,
        CasePolicy::Upper,
        Stage::Global,
        Stage::GlobalType,
    );
    map
}

/// Subprogram unit: globals before the subprogram, then parameters,
/// return type, locals, loop variables and inferred external globals, in
/// that precedence order.
fn subprogram_mapping(src: &str, tokens: &[lexer::Token]) -> CaseMap {
    let Some(start) = classify::find_first_subprogram(tokens) else {
        // no subprogram keyword anywhere: the whole file is declarations
        return package_mapping(src);
    };
    log::debug!("subprogram {:?} at byte {}", start.kind, start.offset);

    let mut map = CaseMap::default();
    record_declarations(
        &mut map,
        &src[..start.offset],
        CasePolicy::Upper,
        Stage::Global,
        Stage::GlobalType,
    );

    let is_pos = lexer::find_word_after(src, start.offset, "is");
    let begin_pos = is_pos.and_then(|p| lexer::find_word_after(src, p, "begin"));
    let (Some(is_pos), Some(begin_pos)) = (is_pos, begin_pos) else {
        // no declarative part to delimit; keep the global scan only
        return map;
    };

    let header = &src[start.offset..is_pos];
    for group in classify::scan_parameters(header) {
        for name in group.names {
            let canon = name.to_ascii_lowercase();
            map.record(Stage::Parameter, canon.clone(), canon);
        }
        for (canon, spelling) in group.types {
            map.record(Stage::ParameterType, canon, spelling);
        }
    }
    if let Some(name) = classify::return_type(header) {
        map.record(
            Stage::ReturnType,
            name.to_ascii_lowercase(),
            name.to_ascii_uppercase(),
        );
    }

    record_declarations(
        &mut map,
        &src[is_pos..begin_pos],
        CasePolicy::Lower,
        Stage::Local,
        Stage::LocalType,
    );

    for name in classify::loop_variables(src, tokens) {
        let canon = name.to_ascii_lowercase();
        map.record(Stage::LoopVar, canon.clone(), canon);
    }
    for name in classify::assignment_targets(src, tokens) {
        map.record(
            Stage::ExternalGlobal,
            name.to_ascii_lowercase(),
            name.to_ascii_uppercase(),
        );
    }
    map
}

/// Build the casing mapping for one file's text.
pub fn build_mapping(src: &str) -> CaseMap {
    let tokens = lexer::lex(src);
    match classify::unit_kind(src, &tokens) {
        UnitKind::Package => package_mapping(src),
        UnitKind::Subprogram => subprogram_mapping(src, &tokens),
    }
}

/// Full pipeline for one file: classify, build the mapping, rewrite.
pub fn normalize(src: &str) -> String {
    let map = build_mapping(src);
    log::debug!("applying {} mapping entries", map.len());
    map.apply(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE_SRC: &str = "package Pkg is\n   X : Integer := 0;\nend Pkg;\n";

    const PROC_SRC: &str = "procedure Proc (N : Integer) is\n   \
                            Total : Integer := 0;\nbegin\n   \
                            for I in 1 .. N loop\n      \
                            Total := Total + I;\n   end loop;\n   \
                            Count := Count + 1;\nend Proc;\n";

    #[test]
    fn package_unit_mapping() {
        let map = build_mapping(PACKAGE_SRC);
        assert_eq!(map.get("x"), Some("X"));
        assert_eq!(map.get("integer"), Some("INTEGER"));
        assert_eq!(map.get("pkg"), None);
        let out = normalize(PACKAGE_SRC);
        assert_eq!(out, "package Pkg is\n   X : INTEGER := 0;\nend Pkg;\n");
    }

    #[test]
    fn subprogram_unit_mapping() {
        let map = build_mapping(PROC_SRC);
        assert_eq!(map.get("n"), Some("n"));
        assert_eq!(map.get("integer"), Some("INTEGER"));
        assert_eq!(map.get("total"), Some("total"));
        assert_eq!(map.get("i"), Some("i"));
        assert_eq!(map.get("count"), Some("COUNT"));
        assert_eq!(map.get("proc"), None);
    }

    #[test]
    fn subprogram_unit_rewrite() {
        let out = normalize(PROC_SRC);
        assert_eq!(
            out,
            "procedure Proc (n : INTEGER) is\n   \
             total : INTEGER := 0;\nbegin\n   \
             for i in 1 .. n loop\n      \
             total := total + i;\n   end loop;\n   \
             COUNT := COUNT + 1;\nend Proc;\n"
        );
    }

    #[test]
    fn constants_uppercase_regardless_of_policy() {
        let src = "package P is\n   A, B : constant Float := 1.0;\nend P;\n";
        let map = build_mapping(src);
        assert_eq!(map.get("a"), Some("A"));
        assert_eq!(map.get("b"), Some("B"));
        assert_eq!(map.get("float"), Some("FLOAT"));
    }

    #[test]
    fn local_declaration_overrides_global() {
        let src = "Shared : Integer := 0;\n\
                   procedure P is\n   Shared : Integer := 0;\nbegin\n   null;\nend P;\n";
        let map = build_mapping(src);
        assert_eq!(map.get("shared"), Some("shared"));
    }

    #[test]
    fn loop_variable_demotes_uppercase_classification() {
        let src = "procedure P is\n   type Index is range 1 .. 10;\nbegin\n   \
                   for Index in 1 .. 10 loop\n      null;\n   end loop;\nend P;\n";
        let map = build_mapping(src);
        assert_eq!(map.get("index"), Some("index"));
    }

    #[test]
    fn loop_variable_leaves_lowercase_entries_alone() {
        let src = "procedure P (N : Integer) is\nbegin\n   \
                   for N in 1 .. 3 loop\n      null;\n   end loop;\nend P;\n";
        let map = build_mapping(src);
        assert_eq!(map.get("n"), Some("n"));
    }

    #[test]
    fn undeclared_assignment_target_becomes_external_global() {
        let map = build_mapping(PROC_SRC);
        assert_eq!(map.get("count"), Some("COUNT"));
        // declared targets are not re-inferred
        assert_eq!(map.get("total"), Some("total"));
    }

    #[test]
    fn no_unit_keyword_falls_back_to_package_scan() {
        let src = "X : Integer := 0;\nY : constant Integer := 1;\n";
        let map = build_mapping(src);
        assert_eq!(map.get("x"), Some("X"));
        assert_eq!(map.get("y"), Some("Y"));
        assert_eq!(map.get("integer"), Some("INTEGER"));
    }

    #[test]
    fn missing_begin_keeps_globals_only() {
        let src = "G : Integer := 0;\nprocedure P (N : Integer) is\n   L : Integer;\n";
        let map = build_mapping(src);
        assert_eq!(map.get("g"), Some("G"));
        assert_eq!(map.get("integer"), Some("INTEGER"));
        assert_eq!(map.get("n"), None);
        assert_eq!(map.get("l"), None);
    }

    #[test]
    fn replacement_is_whole_word_only() {
        let mut map = CaseMap::default();
        map.record(Stage::Local, "cnt".into(), "cnt".into());
        assert_eq!(map.apply("Cnt := recount (Cnt_2, CNT);"), "cnt := recount (Cnt_2, cnt);");
    }

    #[test]
    fn rewrite_reaches_comment_text() {
        let src = "package P is\n   X : Integer := 0; -- x marks the spot\nend P;\n";
        assert_eq!(
            normalize(src),
            "package P is\n   X : INTEGER := 0; -- X marks the spot\nend P;\n"
        );
    }

    #[test]
    fn normalize_is_a_fixed_point() {
        for src in [PACKAGE_SRC, PROC_SRC] {
            let once = normalize(src);
            assert_eq!(normalize(&once), once);
        }
    }
}
