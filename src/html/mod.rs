//! Parsed HTML documents.
//!
//! Parsing and serialization are html5ever's; the tree is the reference
//! counted `markup5ever_rcdom` DOM, mutated in place through [`node`]
//! helpers. Elements are addressed by CSS selector via [`selector`].

pub mod node;
pub mod selector;
pub mod template;

use html5ever::parse_document;
use html5ever::serialize::TraversalScope;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, RcDom};
use tracing::debug;

use crate::error::{EditorError, EditorResult};
use selector::SelectorList;

/// One parsed HTML file.
pub struct Document {
    dom: RcDom,
}

impl Document {
    /// Parse HTML source. Malformed markup is normalized by the parser,
    /// never rejected.
    pub fn parse(source: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(source);
        debug!(bytes = source.len(), "parsed HTML document");
        Self { dom }
    }

    /// The document node (parent of the doctype and `<html>`).
    pub fn root(&self) -> &Handle {
        &self.dom.document
    }

    /// First element in document order matching `selector`.
    pub fn query_selector(&self, selector: &str) -> EditorResult<Option<Handle>> {
        let selectors =
            SelectorList::parse(selector).map_err(|e| EditorError::InvalidSelector {
                selector: selector.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(selectors.query_first(self.root()))
    }

    /// Like [`Document::query_selector`], but a miss is `TargetNotFound`.
    pub fn require(&self, selector: &str) -> EditorResult<Handle> {
        self.query_selector(selector)?
            .ok_or_else(|| EditorError::TargetNotFound {
                selector: selector.to_owned(),
            })
    }

    /// Serialize the whole document, doctype included.
    pub fn to_html(&self) -> EditorResult<String> {
        node::serialize(self.root(), TraversalScope::ChildrenOnly(None))
    }
}
