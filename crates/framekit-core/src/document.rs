//! The slice of a frame's document the bindings need: frame owner elements
//! for selector lookup, and inserted style sheets.

use crate::frame::NativeFrame;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// An element in a frame's document.
#[derive(Debug)]
pub struct Element {
    tag_name: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    /// Frame hosted by this element (iframe/frame owners only).
    content_frame: RefCell<Option<Weak<NativeFrame>>>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attributes: HashMap::new(),
            content_frame: RefCell::new(None),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// The live frame owned by this element.
    pub fn content_frame(&self) -> Option<Rc<NativeFrame>> {
        self.content_frame
            .borrow()
            .as_ref()
            .and_then(|w| w.upgrade())
            .filter(|frame| !frame.is_destroyed())
    }

    pub(crate) fn set_content_frame(&self, frame: &Rc<NativeFrame>) {
        *self.content_frame.borrow_mut() = Some(Rc::downgrade(frame));
    }
}

/// A frame's document.
#[derive(Debug, Default)]
pub struct Document {
    elements: RefCell<Vec<Rc<Element>>>,
    style_sheets: RefCell<Vec<String>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_element(&self, element: Element) -> Rc<Element> {
        let element = Rc::new(element);
        self.elements.borrow_mut().push(element.clone());
        element
    }

    pub fn elements(&self) -> Vec<Rc<Element>> {
        self.elements.borrow().clone()
    }

    /// First element matching `selector`, in document order.
    pub fn query_selector(&self, selector: &str) -> Option<Rc<Element>> {
        QuerySelector::parse(selector).and_then(|query| {
            self.elements
                .borrow()
                .iter()
                .find(|element| query.matches(element))
                .cloned()
        })
    }

    pub fn insert_style_sheet(&self, css: &str) {
        self.style_sheets.borrow_mut().push(css.to_string());
    }

    pub fn style_sheets(&self) -> Vec<String> {
        self.style_sheets.borrow().clone()
    }

    pub(crate) fn remove_frame_owner(&self, frame: &NativeFrame) {
        self.elements.borrow_mut().retain(|element| {
            element
                .content_frame
                .borrow()
                .as_ref()
                .map_or(true, |owned| !std::ptr::eq(owned.as_ptr(), frame))
        });
    }
}

/// Compound selector support (basic).
/// Supports: tag, #id, .class and combinations such as `iframe#main.ad`.
#[derive(Debug, Default, PartialEq)]
pub struct QuerySelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl QuerySelector {
    /// Parse a selector; returns None for empty or unsupported syntax.
    pub fn parse(selector: &str) -> Option<Self> {
        let selector = selector.trim();
        let unsupported = |c: char| c.is_whitespace() || "[]>+~:,*".contains(c);
        if selector.is_empty() || selector.contains(unsupported) {
            return None;
        }

        let mut query = QuerySelector::default();
        let mut rest = selector;
        let tag_end = rest.find(&['#', '.'][..]).unwrap_or(rest.len());
        if tag_end > 0 {
            query.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(&['#', '.'][..]).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }
            match marker {
                '#' => query.id = Some(name.to_string()),
                _ => query.classes.push(name.to_string()),
            }
            rest = &body[end..];
        }

        Some(query)
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.tag.as_deref().map_or(true, |tag| element.tag_name() == tag)
            && self.id.as_deref().map_or(true, |id| element.id() == Some(id))
            && self.classes.iter().all(|class| element.has_class(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let doc = Document::new();
        doc.append_element(Element::new("div").with_id("header").with_class("bar"));
        doc.append_element(Element::new("IFRAME").with_id("main").with_class("content"));
        doc.append_element(Element::new("iframe").with_class("ad").with_class("content"));
        doc
    }

    #[test]
    fn test_query_selector() {
        let doc = sample();

        let by_id = doc.query_selector("#main").unwrap();
        assert_eq!(by_id.tag_name(), "iframe");

        let by_class = doc.query_selector(".content").unwrap();
        assert_eq!(by_class.id(), Some("main"));

        let by_tag = doc.query_selector("div").unwrap();
        assert_eq!(by_tag.id(), Some("header"));

        let compound = doc.query_selector("iframe.ad.content").unwrap();
        assert!(compound.has_class("ad"));

        assert!(doc.query_selector("span").is_none());
        assert!(doc.query_selector("iframe#header").is_none());
    }

    #[test]
    fn test_unsupported_selectors() {
        assert!(QuerySelector::parse("").is_none());
        assert!(QuerySelector::parse("div > iframe").is_none());
        assert!(QuerySelector::parse("iframe[name=x]").is_none());
        assert!(QuerySelector::parse("#").is_none());
        assert!(sample().query_selector("div iframe").is_none());
    }

    #[test]
    fn test_style_sheets() {
        let doc = Document::new();
        doc.insert_style_sheet("body { color: red }");
        assert_eq!(doc.style_sheets(), vec!["body { color: red }".to_string()]);
    }
}
