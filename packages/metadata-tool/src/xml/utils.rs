//! XML utility functions for navigating ISO 19139 DOM trees.
//!
//! All lookups compare local names only, so `gmd:title` and `title` are the
//! same element. Catalogues are inconsistent about prefixes; namespaces are
//! not needed to tell ISO elements apart.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use metadata_tool::xml::get_tag_name;
///
/// let xml = r#"<gmd:MD_Metadata xmlns:gmd="http://www.isotc211.org/2005/gmd"/>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "MD_Metadata");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use metadata_tool::xml::find_child;
///
/// let xml = r#"<root><child1/><child2/></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert!(find_child(root, "child1").is_some());
/// assert!(find_child(root, "missing").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find all child elements with the given tag name.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find all descendant elements (including `node` itself) with the given tag name.
pub fn find_descendants<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants()
        .filter(move |n| n.is_element() && get_tag_name(*n) == tag)
}

/// Find a descendant element matching a path of tag names.
///
/// A `*` segment matches any element child, which is how the
/// identification section is reached regardless of whether it is a
/// `MD_DataIdentification` or a `SV_ServiceIdentification`.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use metadata_tool::xml::find_by_path;
///
/// let xml = r#"<a><b><c>1</c></b></a>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let c = find_by_path(doc.root_element(), "b/c");
/// assert_eq!(c.and_then(|n| n.text()), Some("1"));
///
/// let any = find_by_path(doc.root_element(), "*/c");
/// assert!(any.is_some());
/// ```
pub fn find_by_path<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    let mut current = node;

    for part in path.split('/') {
        current = if part == "*" {
            element_children(current).next()?
        } else {
            find_child(current, part)?
        };
    }

    Some(current)
}

/// Get the text content of a node, trimmed.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Get an attribute by local name, ignoring its namespace.
///
/// `xlink:href`, `rdf:about` and friends are found by `"href"` and `"about"`.
pub fn get_attribute<'a>(node: Node<'a, '_>, local_name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attr| attr.name() == local_name)
        .map(|attr| attr.value())
}

/// Check if a node has a specific tag name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Get all element children of a node.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Text of a free-text property: the `gco:CharacterString` or `gmx:Anchor` child.
///
/// Returns `None` for absent or blank values.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use metadata_tool::xml::character_string;
///
/// let xml = r#"<title><Anchor href="http://x">Wegen</Anchor></title>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(character_string(doc.root_element()), Some("Wegen".to_string()));
/// ```
pub fn character_string(node: Node<'_, '_>) -> Option<String> {
    element_children(node)
        .find(|child| has_tag(*child, "CharacterString") || has_tag(*child, "Anchor"))
        .map(get_text)
        .filter(|text| !text.is_empty())
}

/// The `xlink:href` of a property's `gmx:Anchor` child, if any.
pub fn anchor_href<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    find_child(node, "Anchor").and_then(|anchor| get_attribute(anchor, "href"))
}

/// Free text at `path` below `node`.
pub fn text_at(node: Node<'_, '_>, path: &str) -> Option<String> {
    find_by_path(node, path).and_then(character_string)
}
