use tree_sitter::Node;

use crate::model::ParameterDescriptor;
use crate::placeholder::{PlaceholderTable, TypeTag};
use crate::util::txt;

use super::types;

/// Convert the parameter list of a function-like node.
///
/// Accepts function declarations, function expressions and arrow functions,
/// including the unparenthesized `x => ...` form.
pub(super) fn function_params(
    func: Node,
    src: &[u8],
    table: &mut PlaceholderTable,
) -> Vec<ParameterDescriptor> {
    if let Some(single) = func.child_by_field_name("parameter") {
        return vec![ParameterDescriptor {
            name: txt(single, src).to_string(),
            tag: TypeTag::Unknown,
            optional: false,
            default: None,
        }];
    }

    let Some(list) = func.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut params = Vec::new();
    let mut cursor = list.walk();
    for param in list.named_children(&mut cursor) {
        if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
            continue;
        }
        if let Some(desc) = convert(param, src, table) {
            params.push(desc);
        }
    }
    params
}

/// `None` for a TypeScript `this` parameter, which is not a real argument.
fn convert(param: Node, src: &[u8], table: &mut PlaceholderTable) -> Option<ParameterDescriptor> {
    let pattern = param.child_by_field_name("pattern");
    if pattern.is_some_and(|p| p.kind() == "this") {
        return None;
    }

    let name = pattern
        .and_then(|p| bound_name(p, src))
        .unwrap_or_else(|| param.start_byte().to_string());

    let tag = param
        .child_by_field_name("type")
        .map_or(TypeTag::Unknown, |ann| types::annotated(ann, src, table));

    let default = param
        .child_by_field_name("value")
        .filter(|v| is_literal(v.kind()))
        .map(|v| txt(v, src).to_string());

    Some(ParameterDescriptor {
        name,
        tag,
        optional: param.kind() == "optional_parameter",
        default,
    })
}

/// Identifier bound by a parameter pattern; destructuring patterns have none.
fn bound_name(pattern: Node, src: &[u8]) -> Option<String> {
    match pattern.kind() {
        "identifier" => Some(txt(pattern, src).to_string()),
        "rest_pattern" => pattern
            .named_child(0)
            .filter(|inner| inner.kind() == "identifier")
            .map(|inner| txt(inner, src).to_string()),
        _ => None,
    }
}

fn is_literal(kind: &str) -> bool {
    matches!(
        kind,
        "number" | "string" | "true" | "false" | "null" | "undefined"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse_ts(src: &[u8]) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .unwrap();
        parser.parse(src, None).unwrap()
    }

    fn params_of(src: &str) -> (Vec<ParameterDescriptor>, PlaceholderTable) {
        let mut table = PlaceholderTable::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        let tree = parse_ts(src.as_bytes());
        let func = tree.root_node().named_child(0).unwrap();
        let params = function_params(func, src.as_bytes(), &mut table);
        (params, table)
    }

    #[test]
    fn typed_parameters_keep_names_and_tags() {
        let (params, _) = params_of("function f(a: number, b: string, c: boolean) {}");
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(params[0].tag, TypeTag::Number);
        assert_eq!(params[1].tag, TypeTag::String);
        assert_eq!(params[2].tag, TypeTag::Boolean);
        assert!(params.iter().all(|p| !p.optional));
    }

    #[test]
    fn optional_marker_is_recorded() {
        let (params, _) = params_of("function f(a: number, b?: string) {}");
        assert!(!params[0].optional);
        assert!(params[1].optional);
        assert_eq!(params[1].tag, TypeTag::String);
    }

    #[test]
    fn default_value_keeps_literal_and_annotation() {
        let (params, _) = params_of("function f(limit: number = 10, label = 'x', now = Date.now()) {}");
        assert_eq!(params[0].tag, TypeTag::Number);
        assert_eq!(params[0].default.as_deref(), Some("10"));
        assert_eq!(params[1].tag, TypeTag::Unknown);
        assert_eq!(params[1].default.as_deref(), Some("'x'"));
        assert_eq!(params[2].default, None, "non-literal defaults are not kept");
    }

    #[test]
    fn destructured_parameter_falls_back_to_offset() {
        let src = "function f({ a, b }: { a: number; b: number }) {}";
        let (params, table) = params_of(src);
        let offset = src.find('{').unwrap();
        assert_eq!(params[0].name, offset.to_string());
        assert_eq!(table.placeholder_for(&params[0].tag), "{ a: 1, b: 1 }");
    }

    #[test]
    fn rest_parameter_uses_inner_name() {
        let (params, _) = params_of("function f(...items: number[]) {}");
        assert_eq!(params[0].name, "items");
    }

    #[test]
    fn this_parameter_is_skipped() {
        let (params, _) = params_of("function f(this: Window, n: number) {}");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "n");
    }

    #[test]
    fn arrow_single_parameter_without_parens() {
        let src = "const f = x => x;";
        let mut table = PlaceholderTable::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        let tree = parse_ts(src.as_bytes());
        let arrow = tree
            .root_node()
            .named_child(0)
            .and_then(|d| d.named_child(0))
            .and_then(|d| d.child_by_field_name("value"))
            .unwrap();
        let params = function_params(arrow, src.as_bytes(), &mut table);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "x");
        assert_eq!(params[0].tag, TypeTag::Unknown);
    }
}
