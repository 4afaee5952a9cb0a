//! Element-level helpers over `markup5ever_rcdom` handles.
//!
//! These mirror the handful of DOM methods the editor needs: attribute
//! get/set/remove, `textContent` assignment, element creation, append,
//! detach and `outerHTML`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize as serialize_tree};
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};

use crate::error::{EditorError, EditorResult};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Serialize `node` with the given traversal scope.
pub fn serialize(node: &Handle, scope: TraversalScope) -> EditorResult<String> {
    let mut buf = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: scope,
        ..Default::default()
    };
    serialize_tree(&mut buf, &SerializableHandle::from(node.clone()), opts)
        .map_err(EditorError::Serialize)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// The element's own tag plus its descendants.
pub fn outer_html(node: &Handle) -> EditorResult<String> {
    serialize(node, TraversalScope::IncludeNode)
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

pub fn is_document(node: &Handle) -> bool {
    matches!(node.data, NodeData::Document)
}

/// Local tag name of an element, `None` for other node kinds.
pub fn local_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(Weak::upgrade);
    node.parent.set(weak);
    parent
}

pub fn parent_element(node: &Handle) -> Option<Handle> {
    parent(node).filter(is_element)
}

/// Element children of `node`, in order.
pub fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| is_element(child))
        .cloned()
        .collect()
}

/// Element siblings of `node` (itself included) and its index among them.
pub fn element_siblings(node: &Handle) -> (Vec<Handle>, usize) {
    let Some(parent) = parent(node) else {
        return (vec![node.clone()], 0);
    };
    let siblings = element_children(&parent);
    let index = siblings
        .iter()
        .position(|sibling| Rc::ptr_eq(sibling, node))
        .unwrap_or(0);
    (siblings, index)
}

/// Preceding element siblings, nearest first.
pub fn previous_element_siblings(node: &Handle) -> Vec<Handle> {
    let (mut siblings, index) = element_siblings(node);
    siblings.truncate(index);
    siblings.reverse();
    siblings
}

pub fn attribute(node: &Handle, name: &str) -> Option<String> {
    let NodeData::Element { attrs, .. } = &node.data else {
        return None;
    };
    attrs
        .borrow()
        .iter()
        .find(|attr| (*attr.name.local).eq_ignore_ascii_case(name))
        .map(|attr| attr.value.to_string())
}

pub fn has_attribute(node: &Handle, name: &str) -> bool {
    attribute(node, name).is_some()
}

/// Set or overwrite an attribute. Names are lower-cased like an HTML DOM
/// `setAttribute`; an existing attribute keeps its position.
pub fn set_attribute(node: &Handle, name: &str, value: &str) {
    let NodeData::Element { attrs, .. } = &node.data else {
        return;
    };
    let name = name.to_ascii_lowercase();
    let mut attrs = attrs.borrow_mut();
    if let Some(existing) = attrs.iter_mut().find(|attr| *attr.name.local == *name) {
        existing.value = StrTendril::from_slice(value);
        return;
    }
    attrs.push(Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
        value: StrTendril::from_slice(value),
    });
}

/// Remove an attribute; absent attributes are ignored.
pub fn remove_attribute(node: &Handle, name: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        attrs
            .borrow_mut()
            .retain(|attr| !(*attr.name.local).eq_ignore_ascii_case(name));
    }
}

/// Concatenated text of all descendant text nodes.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// Replace all children with a single text node, or with nothing when
/// `text` is empty.
pub fn set_text_content(node: &Handle, text: &str) {
    let old = std::mem::take(&mut *node.children.borrow_mut());
    for child in &old {
        child.parent.set(None);
    }
    if !text.is_empty() {
        append_child(node, &create_text(text));
    }
}

/// New detached element in the HTML namespace.
pub fn create_element(tag: &str) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(
            None,
            Namespace::from(HTML_NAMESPACE),
            LocalName::from(tag.to_ascii_lowercase()),
        ),
        attrs: RefCell::new(Vec::new()),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn create_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// Append `child` as the last child of `parent`, moving it if attached.
pub fn append_child(parent: &Handle, child: &Handle) {
    detach(child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

/// Remove `node` from its parent. Returns false if it had none.
pub fn detach(node: &Handle) -> bool {
    let Some(parent) = parent(node) else {
        return false;
    };
    parent
        .children
        .borrow_mut()
        .retain(|child| !Rc::ptr_eq(child, node));
    node.parent.set(None);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::Document;

    fn body(doc: &Document) -> Handle {
        doc.require("body").expect("body")
    }

    #[test]
    fn test_set_attribute_overwrites_in_place() {
        let doc = Document::parse("<body><a href=\"x\" id=\"l\">t</a></body>");
        let link = doc.require("#l").expect("link");
        set_attribute(&link, "HREF", "y");
        assert_eq!(outer_html(&link).expect("html"), "<a href=\"y\" id=\"l\">t</a>");
    }

    #[test]
    fn test_attribute_lookup_ignores_ascii_case() {
        let doc = Document::parse("<body><p id=\"p\" data-role=\"x\">t</p></body>");
        let p = doc.require("#p").expect("p");
        assert_eq!(attribute(&p, "DATA-Role").as_deref(), Some("x"));
        assert!(has_attribute(&p, "ID"));
        remove_attribute(&p, "Data-ROLE");
        assert_eq!(attribute(&p, "data-role"), None);
    }

    #[test]
    fn test_remove_missing_attribute_is_noop() {
        let doc = Document::parse("<body><p id=\"p\">t</p></body>");
        let p = doc.require("#p").expect("p");
        remove_attribute(&p, "class");
        assert_eq!(outer_html(&p).expect("html"), "<p id=\"p\">t</p>");
    }

    #[test]
    fn test_set_text_content_escapes_markup() {
        let doc = Document::parse("<body><p id=\"p\"><b>old</b></p></body>");
        let p = doc.require("#p").expect("p");
        set_text_content(&p, "<i>new</i>");
        assert_eq!(text_content(&p), "<i>new</i>");
        assert_eq!(outer_html(&p).expect("html"), "<p id=\"p\">&lt;i&gt;new&lt;/i&gt;</p>");
    }

    #[test]
    fn test_set_empty_text_content_clears_children() {
        let doc = Document::parse("<body><p id=\"p\">text<span>x</span></p></body>");
        let p = doc.require("#p").expect("p");
        set_text_content(&p, "");
        assert!(p.children.borrow().is_empty());
    }

    #[test]
    fn test_append_and_detach() {
        let doc = Document::parse("<body><p>first</p></body>");
        let body = body(&doc);
        let button = create_element("BUTTON");
        set_text_content(&button, "Go");
        append_child(&body, &button);
        assert_eq!(element_children(&body).len(), 2);
        assert!(parent(&button).is_some_and(|p| Rc::ptr_eq(&p, &body)));
        assert_eq!(outer_html(&button).expect("html"), "<button>Go</button>");

        assert!(detach(&button));
        assert_eq!(element_children(&body).len(), 1);
        assert!(!detach(&button));
    }

    #[test]
    fn test_element_siblings_index() {
        let doc = Document::parse("<ul><li>a</li> <li id=\"b\">b</li><li>c</li></ul>");
        let b = doc.require("#b").expect("li");
        let (siblings, index) = element_siblings(&b);
        assert_eq!(siblings.len(), 3);
        assert_eq!(index, 1);
        assert_eq!(previous_element_siblings(&b).len(), 1);
    }
}
