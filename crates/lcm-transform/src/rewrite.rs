//! Span-based legacy-to-modern rewrite over the tree-sitter Python grammar
//!
//! The grammar retains the Python 2 constructs we migrate away from (print
//! statements, the `<>` operator, comma-form except clauses), so a single
//! parse gives us exact byte spans for every edit. Rewrites run in two
//! passes: token-level fixes first, then print statements on the re-parsed
//! intermediate text, so edits never overlap.

use crate::error::TransformError;
use tree_sitter::{Node, Parser, Tree};

/// Builtin renames applied to bare identifiers
const RENAMED_BUILTINS: &[(&str, &str)] = &[
    ("xrange", "range"),
    ("raw_input", "input"),
    ("unicode", "str"),
    ("basestring", "str"),
];

/// A single replacement over a byte range of the source
#[derive(Debug, Clone)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

impl Edit {
    fn for_node(node: Node<'_>, replacement: impl Into<String>) -> Self {
        Self {
            start: node.start_byte(),
            end: node.end_byte(),
            replacement: replacement.into(),
        }
    }
}

/// Rewrite legacy source into modern syntax
///
/// Fails closed: any parse error in the input, and any parse error in the
/// rewritten output, aborts with no partial result.
pub(crate) fn rewrite_source(source: &str) -> Result<String, TransformError> {
    let tree = parse(source)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(TransformError::Parse(describe_first_error(root)));
    }

    // Pass 1: token-level fixes (<>, except-comma, builtin renames)
    let mut edits = Vec::new();
    collect_token_edits(root, source, &mut edits);
    let renamed = apply_edits(source, edits);

    // Pass 2: print statements, against the re-parsed intermediate text
    let tree = parse(&renamed)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(TransformError::Rewrite(describe_first_error(root)));
    }
    let mut edits = Vec::new();
    collect_print_edits(root, &renamed, &mut edits);
    let modern = apply_edits(&renamed, edits);

    // The output must parse under the modern grammar
    let check = parse(&modern)?;
    if check.root_node().has_error() {
        return Err(TransformError::Rewrite(describe_first_error(
            check.root_node(),
        )));
    }

    Ok(modern)
}

fn parse(source: &str) -> Result<Tree, TransformError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| TransformError::Grammar(e.to_string()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| TransformError::Grammar("parser produced no tree".to_string()))
}

fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Locate the first ERROR or missing node and report its position
fn describe_first_error(node: Node<'_>) -> String {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        return format!("unparsable at line {}, column {}", pos.row + 1, pos.column + 1);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            return describe_first_error(child);
        }
    }
    let pos = node.start_position();
    format!("unparsable at line {}, column {}", pos.row + 1, pos.column + 1)
}

fn collect_token_edits(node: Node<'_>, source: &str, edits: &mut Vec<Edit>) {
    match node.kind() {
        "<>" => edits.push(Edit::for_node(node, "!=")),
        "," => {
            // `except E, e:` binds the target with a comma in the legacy grammar
            if node.parent().is_some_and(|p| p.kind() == "except_clause") {
                edits.push(Edit::for_node(node, " as"));
            }
        }
        "identifier" => {
            let text = node_text(node, source);
            if let Some((_, new)) = RENAMED_BUILTINS.iter().find(|(old, _)| *old == text) {
                if rename_applies(node) {
                    edits.push(Edit::for_node(node, *new));
                }
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_token_edits(child, source, edits);
    }
}

/// A builtin rename must not touch attribute names, keyword-argument names,
/// definition names, or parameters - only free uses of the identifier.
fn rename_applies(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return true;
    };
    match parent.kind() {
        "attribute" => parent
            .child_by_field_name("attribute")
            .map_or(true, |attr| attr.id() != node.id()),
        "keyword_argument" => parent
            .child_by_field_name("name")
            .map_or(true, |name| name.id() != node.id()),
        "function_definition" | "class_definition" => parent
            .child_by_field_name("name")
            .map_or(true, |name| name.id() != node.id()),
        "parameters" | "default_parameter" | "typed_parameter" | "typed_default_parameter" => {
            false
        }
        _ => true,
    }
}

fn collect_print_edits(node: Node<'_>, source: &str, edits: &mut Vec<Edit>) {
    if node.kind() == "print_statement" {
        edits.push(Edit::for_node(node, rewrite_print(node, source)));
        return; // print statements do not nest
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_print_edits(child, source, edits);
    }
}

/// Build the call form of a print statement
///
/// `print >>stream, a, b` becomes `print(a, b, file=stream)`; a trailing
/// comma becomes `end=" "` to preserve the suppressed newline.
fn rewrite_print(node: Node<'_>, source: &str) -> String {
    let mut args = Vec::new();
    let mut file_arg = None;

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "chevron" {
            if let Some(stream) = child.named_child(0) {
                file_arg = Some(node_text(stream, source).to_string());
            }
        } else {
            args.push(node_text(child, source).to_string());
        }
    }

    if let Some(stream) = file_arg {
        args.push(format!("file={stream}"));
    }
    if node_text(node, source).trim_end().ends_with(',') {
        args.push("end=\" \"".to_string());
    }

    format!("print({})", args.join(", "))
}

/// Apply edits back-to-front so earlier spans stay valid
fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.start.cmp(&a.start));
    let mut out = source.to_string();
    for edit in edits {
        out.replace_range(edit.start..edit.end, &edit.replacement);
    }
    out
}
