use tree_sitter::Node;

use crate::placeholder::{CompositeKind, Placeholder, PlaceholderTable, Site, TypeTag};
use crate::util::txt;

/// Reduce a type node to a [`TypeTag`], registering composite placeholders.
///
/// `node` is the type itself, not its `type_annotation` wrapper. Shapes that
/// are not recognized become [`TypeTag::Unknown`] so extraction never fails
/// on exotic type syntax.
pub(super) fn synthesize(node: Node, src: &[u8], table: &mut PlaceholderTable) -> TypeTag {
    match node.kind() {
        "predefined_type" => match txt(node, src) {
            "number" => TypeTag::Number,
            "boolean" => TypeTag::Boolean,
            "string" => TypeTag::String,
            _ => TypeTag::Unknown,
        },
        "type_identifier" | "nested_type_identifier" => TypeTag::Named(txt(node, src).to_string()),
        "generic_type" => synthesize_generic(node, src, table),
        "literal_type" => synthesize_literal(node, src),
        "parenthesized_type" | "readonly_type" => match node.named_child(0) {
            Some(inner) => synthesize(inner, src, table),
            None => TypeTag::Unknown,
        },
        "array_type" => match node.named_child(0) {
            Some(element) => register_array(node, element, src, table),
            None => TypeTag::Unknown,
        },
        "union_type" => synthesize_union(node, src, table),
        "object_type" => synthesize_object(node, src, table),
        other => {
            tracing::debug!(kind = other, text = txt(node, src), "unrecognized type shape");
            TypeTag::Unknown
        }
    }
}

/// Tag of the type inside a `type_annotation` (`: T`) node.
pub(super) fn annotated(annotation: Node, src: &[u8], table: &mut PlaceholderTable) -> TypeTag {
    match annotation.named_child(0) {
        Some(ty) => synthesize(ty, src, table),
        None => TypeTag::Unknown,
    }
}

/// `Array<T>` / `ReadonlyArray<T>` are arrays; other generics are named by
/// their base type.
fn synthesize_generic(node: Node, src: &[u8], table: &mut PlaceholderTable) -> TypeTag {
    let name = node
        .child_by_field_name("name")
        .map(|n| txt(n, src))
        .unwrap_or_default();

    if matches!(name, "Array" | "ReadonlyArray") {
        let element = node
            .child_by_field_name("type_arguments")
            .and_then(|args| args.named_child(0));
        if let Some(element) = element {
            return register_array(node, element, src, table);
        }
    }

    if name.is_empty() {
        TypeTag::Unknown
    } else {
        TypeTag::Named(name.to_string())
    }
}

fn synthesize_literal(node: Node, src: &[u8]) -> TypeTag {
    let text = txt(node, src).trim();
    if text.is_empty() || text == "undefined" {
        TypeTag::Unknown
    } else {
        TypeTag::Literal(text.to_string())
    }
}

fn register_array(node: Node, element: Node, src: &[u8], table: &mut PlaceholderTable) -> TypeTag {
    let element = synthesize(element, src, table);
    let site = site_of(node, CompositeKind::Array);
    table.register(
        site,
        Placeholder::Value(format!("[{}]", table.placeholder_for(&element))),
    );
    TypeTag::Array {
        site,
        element: Box::new(element),
    }
}

/// tree-sitter nests `A | B | C` as `((A | B) | C)`; arms are flattened into
/// one list in source order.
fn synthesize_union(node: Node, src: &[u8], table: &mut PlaceholderTable) -> TypeTag {
    let mut members = Vec::new();
    collect_union_members(node, &mut members);

    let arms: Vec<TypeTag> = members
        .into_iter()
        .map(|member| synthesize(member, src, table))
        .collect();
    let site = site_of(node, CompositeKind::Union);
    let literals = arms.iter().map(|arm| table.placeholder_for(arm)).collect();
    table.register(site, Placeholder::Arms(literals));

    TypeTag::Union { site, arms }
}

fn collect_union_members<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "union_type" {
            collect_union_members(child, out);
        } else {
            out.push(child);
        }
    }
}

fn synthesize_object(node: Node, src: &[u8], table: &mut PlaceholderTable) -> TypeTag {
    let mut fields = Vec::new();
    let mut cursor = node.walk();
    for member in node.named_children(&mut cursor) {
        if member.kind() != "property_signature" {
            continue;
        }
        let Some(name) = member.child_by_field_name("name") else {
            continue;
        };
        let tag = member
            .child_by_field_name("type")
            .map_or(TypeTag::Unknown, |ann| annotated(ann, src, table));
        fields.push((txt(name, src).to_string(), tag));
    }

    let site = site_of(node, CompositeKind::Object);
    let literal = if fields.is_empty() {
        "{}".to_string()
    } else {
        let body: Vec<String> = fields
            .iter()
            .map(|(name, tag)| format!("{name}: {}", table.placeholder_for(tag)))
            .collect();
        format!("{{ {} }}", body.join(", "))
    };
    table.register(site, Placeholder::Value(literal));

    TypeTag::Object { site, fields }
}

fn site_of(node: Node, kind: CompositeKind) -> Site {
    Site {
        kind,
        start: node.start_byte(),
        end: node.end_byte(),
    }
}
