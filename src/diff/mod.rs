//! Signature-level diffing of two public API tables.
//!
//! Symbol rules: a symbol only in `old` is a major removal, a symbol only in
//! `new` is a minor addition, and a symbol in both is compared parameter by
//! parameter. All functions here are pure.

use crate::core::{Impact, Severity};
use crate::signature::{Parameter, PublicApi, Signature};
use serde::{Deserialize, Serialize};

/// Configurable severities for annotation changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRules {
    pub return_type_change: Severity,
    pub param_annotation_change: Severity,
}

impl Default for DiffRules {
    fn default() -> Self {
        Self {
            return_type_change: Severity::Minor,
            param_annotation_change: Severity::Minor,
        }
    }
}

/// Compute impacts between two public API tables.
///
/// Output order is removed symbols, then surviving symbols, then added
/// symbols, each in sorted symbol order.
pub fn diff_public_api(old: &PublicApi, new: &PublicApi, rules: &DiffRules) -> Vec<Impact> {
    let removed = old
        .keys()
        .filter(|k| !new.contains_key(*k))
        .map(|k| Impact::major(k.as_str(), "Removed public symbol"));

    let changed = old.iter().flat_map(|(k, old_sig)| {
        new.get(k)
            .map(|new_sig| compare_signatures(old_sig, new_sig, rules))
            .unwrap_or_default()
    });

    let added = new
        .keys()
        .filter(|k| !old.contains_key(*k))
        .map(|k| Impact::minor(k.as_str(), "Added public symbol"));

    removed.chain(changed).chain(added).collect()
}

/// Compare two signatures of the same symbol.
///
/// Removed and added parameters are checked independently of kind changes;
/// a kind change is only evaluated for names present on both sides, so the
/// two never fire for the same parameter.
pub fn compare_signatures(old: &Signature, new: &Signature, rules: &DiffRules) -> Vec<Impact> {
    let symbol = old.qualified_name.as_str();
    let mut impacts = Vec::new();

    for param in &old.parameters {
        if new.parameter(&param.name).is_none() {
            impacts.push(removed_param(symbol, param));
        }
    }

    for param in &new.parameters {
        match old.parameter(&param.name) {
            Some(previous) => impacts.extend(changed_param(symbol, previous, param, rules)),
            None => impacts.push(added_param(symbol, param)),
        }
    }

    if old.returns != new.returns {
        impacts.push(Impact::new(
            rules.return_type_change,
            symbol,
            "Return annotation changed",
        ));
    }

    impacts
}

fn removed_param(symbol: &str, param: &Parameter) -> Impact {
    if param.is_required() {
        Impact::major(symbol, format!("Removed required param '{}'", param.name))
    } else {
        Impact::minor(symbol, format!("Removed optional param '{}'", param.name))
    }
}

fn added_param(symbol: &str, param: &Parameter) -> Impact {
    if param.is_required() {
        Impact::major(symbol, format!("Added required param '{}'", param.name))
    } else {
        Impact::minor(symbol, format!("Added optional param '{}'", param.name))
    }
}

fn changed_param(symbol: &str, old: &Parameter, new: &Parameter, rules: &DiffRules) -> Vec<Impact> {
    let mut impacts = Vec::new();

    // Only transitions touching a positional kind count.
    if old.kind != new.kind && (old.kind.is_positional() || new.kind.is_positional()) {
        impacts.push(Impact::major(
            symbol,
            format!("Param '{}' kind changed {}→{}", new.name, old.kind, new.kind),
        ));
    }

    if old.annotation != new.annotation {
        impacts.push(Impact::new(
            rules.param_annotation_change,
            symbol,
            format!("Param '{}' annotation changed", new.name),
        ));
    }

    if let (Some(before), Some(after)) = (&old.default, &new.default) {
        if before != after {
            impacts.push(Impact::warn(
                symbol,
                format!("Param '{}' default changed", new.name),
            ));
        }
    }

    impacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::ParamKind;
    use pretty_assertions::assert_eq;

    fn pos(name: &str) -> Parameter {
        Parameter::new(name, ParamKind::PositionalOrKeyword)
    }

    fn sig(params: Vec<Parameter>) -> Signature {
        Signature::new("m:foo").with_params(params).with_returns("int")
    }

    fn api(sigs: Vec<Signature>) -> PublicApi {
        sigs.into_iter()
            .map(|s| (s.qualified_name.clone(), s))
            .collect()
    }

    #[test]
    fn test_added_required_param_is_major() {
        let impacts = compare_signatures(
            &sig(vec![pos("x")]),
            &sig(vec![pos("x"), pos("y")]),
            &DiffRules::default(),
        );
        assert_eq!(impacts, vec![Impact::major("m:foo", "Added required param 'y'")]);
    }

    #[test]
    fn test_added_optional_param_is_minor() {
        let impacts = compare_signatures(
            &sig(vec![pos("x")]),
            &sig(vec![pos("x"), pos("timeout").with_default("None")]),
            &DiffRules::default(),
        );
        assert_eq!(
            impacts,
            vec![Impact::minor("m:foo", "Added optional param 'timeout'")]
        );
    }

    #[test]
    fn test_removed_params() {
        let old = sig(vec![
            pos("a"),
            pos("b").with_default("1"),
            Parameter::new("rest", ParamKind::VarPositional),
        ]);
        let impacts = compare_signatures(&old, &sig(vec![]), &DiffRules::default());
        assert_eq!(
            impacts,
            vec![
                Impact::major("m:foo", "Removed required param 'a'"),
                Impact::minor("m:foo", "Removed optional param 'b'"),
                Impact::minor("m:foo", "Removed optional param 'rest'"),
            ]
        );
    }

    #[test]
    fn test_kind_change_involving_positional_is_major() {
        let old = sig(vec![pos("a")]);
        let new = sig(vec![Parameter::new("a", ParamKind::KeywordOnly)]);
        let impacts = compare_signatures(&old, &new, &DiffRules::default());
        assert_eq!(
            impacts,
            vec![Impact::major("m:foo", "Param 'a' kind changed pos→kwonly")]
        );
    }

    #[test]
    fn test_keyword_only_to_positional_is_major() {
        let old = sig(vec![
            pos("x"),
            Parameter::new("timeout", ParamKind::KeywordOnly).with_default("None"),
        ]);
        let new = sig(vec![pos("x"), pos("timeout").with_default("None")]);
        let impacts = compare_signatures(&old, &new, &DiffRules::default());
        assert_eq!(
            impacts,
            vec![Impact::major("m:foo", "Param 'timeout' kind changed kwonly→pos")]
        );
    }

    #[test]
    fn test_added_variadics_are_optional() {
        let impacts = compare_signatures(
            &sig(vec![pos("x")]),
            &sig(vec![
                pos("x"),
                Parameter::new("args", ParamKind::VarPositional),
                Parameter::new("kw", ParamKind::VarKeyword),
            ]),
            &DiffRules::default(),
        );
        assert_eq!(
            impacts,
            vec![
                Impact::minor("m:foo", "Added optional param 'args'"),
                Impact::minor("m:foo", "Added optional param 'kw'"),
            ]
        );
    }

    #[test]
    fn test_keyword_only_to_varkw_is_not_flagged_as_kind_change() {
        let old = sig(vec![Parameter::new("opts", ParamKind::KeywordOnly).with_default("None")]);
        let new = sig(vec![Parameter::new("opts", ParamKind::VarKeyword)]);
        let impacts = compare_signatures(&old, &new, &DiffRules::default());
        assert!(impacts.iter().all(|i| !i.reason.contains("kind changed")));
    }

    #[test]
    fn test_return_annotation_severity_is_configurable() {
        let old = sig(vec![]);
        let new = Signature::new("m:foo").with_returns("str");
        let rules = DiffRules {
            return_type_change: Severity::Major,
            ..DiffRules::default()
        };
        assert_eq!(
            compare_signatures(&old, &new, &rules),
            vec![Impact::major("m:foo", "Return annotation changed")]
        );
        assert_eq!(
            compare_signatures(&old, &new, &DiffRules::default()),
            vec![Impact::minor("m:foo", "Return annotation changed")]
        );
    }

    #[test]
    fn test_param_annotation_and_default_changes() {
        let old = sig(vec![pos("a").with_annotation("int").with_default("1")]);
        let new = sig(vec![pos("a").with_annotation("str").with_default("2")]);
        let impacts = compare_signatures(&old, &new, &DiffRules::default());
        assert_eq!(
            impacts,
            vec![
                Impact::minor("m:foo", "Param 'a' annotation changed"),
                Impact::warn("m:foo", "Param 'a' default changed"),
            ]
        );
    }

    #[test]
    fn test_symbol_level_rules() {
        let old = api(vec![Signature::new("m:f"), Signature::new("m:keep")]);
        let new = api(vec![Signature::new("m:keep"), Signature::new("m:g")]);
        let impacts = diff_public_api(&old, &new, &DiffRules::default());
        assert_eq!(
            impacts,
            vec![
                Impact::major("m:f", "Removed public symbol"),
                Impact::minor("m:g", "Added public symbol"),
            ]
        );
    }

    #[test]
    fn test_self_diff_is_empty() {
        let table = api(vec![sig(vec![pos("x"), pos("y").with_default("3")])]);
        assert!(diff_public_api(&table, &table, &DiffRules::default()).is_empty());
    }

    #[test]
    fn test_removed_and_kind_change_fire_for_different_params() {
        let old = sig(vec![pos("a"), pos("b")]);
        let new = sig(vec![Parameter::new("a", ParamKind::PositionalOnly)]);
        let impacts = compare_signatures(&old, &new, &DiffRules::default());
        assert_eq!(
            impacts,
            vec![
                Impact::major("m:foo", "Removed required param 'b'"),
                Impact::major("m:foo", "Param 'a' kind changed pos→posonly"),
            ]
        );
    }
}
