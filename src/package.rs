// src/package.rs

//! Package-name lookup for source files whose language declares one.

use tree_sitter::{Node, Parser};

/// Whether files with this name can carry a package declaration.
pub fn declares_package(file_name: &str) -> bool {
    file_name.ends_with(".java")
}

/// Returns the dotted package name declared in `source`. Sources that do not
/// parse cleanly have no package.
pub fn package_name(source: &str) -> Option<String> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_java::LANGUAGE.into()).ok()?;
    let tree = parser.parse(source, None)?;

    let root = tree.root_node();
    if root.has_error() {
        return None;
    }

    let mut cursor = root.walk();
    let declaration = root
        .children(&mut cursor)
        .find(|child| child.kind() == "package_declaration")?;
    let name = declared_name(&declaration)?;
    let text = name.utf8_text(source.as_bytes()).ok()?;
    Some(text.chars().filter(|c| !c.is_whitespace()).collect())
}

fn declared_name<'t>(declaration: &Node<'t>) -> Option<Node<'t>> {
    if let Some(name) = declaration.child_by_field_name("name") {
        return Some(name);
    }
    let mut cursor = declaration.walk();
    let found = declaration
        .named_children(&mut cursor)
        .find(|child| matches!(child.kind(), "scoped_identifier" | "identifier"));
    found
}
