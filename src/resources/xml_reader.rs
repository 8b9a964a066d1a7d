//! A minimal element tree on top of `quick_xml`, enough for the resource schemas.

use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ResourceError;

/// One XML element with its attributes and child elements. Text content is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

pub fn parse_document(resource: &str, text: &str) -> Result<Element, ResourceError> {
    let xml_error = |source| ResourceError::Xml {
        resource: resource.to_string(),
        source,
    };

    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    // The bottom of the stack collects the document element.
    let mut stack = vec![Element::default()];
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(ref e) => stack.push(start_element(e).map_err(xml_error)?),
            Event::Empty(ref e) => {
                let element = start_element(e).map_err(xml_error)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(element) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(element);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(ResourceError::MissingElement {
            resource: resource.to_string(),
            element: format!("/{}", stack.last().map(|e| e.name.as_str()).unwrap_or("")),
        });
    }
    stack
        .pop()
        .and_then(|document| document.children.into_iter().next())
        .ok_or_else(|| ResourceError::MissingElement {
            resource: resource.to_string(),
            element: "document element".to_string(),
        })
}

fn start_element(start: &BytesStart) -> Result<Element, quick_xml::Error> {
    let mut element = Element {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ..Default::default()
    };
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn required_attr(&self, resource: &str, name: &str) -> Result<&str, ResourceError> {
        self.attr(name).ok_or_else(|| ResourceError::MissingAttribute {
            resource: resource.to_string(),
            element: self.name.clone(),
            attribute: name.to_string(),
        })
    }

    /// Parses an optional attribute, failing only if it is present but malformed.
    pub fn parse_attr<T: FromStr>(
        &self,
        resource: &str,
        name: &str,
    ) -> Result<Option<T>, ResourceError> {
        match self.attr(name) {
            None => Ok(None),
            Some(value) => value.trim().parse().map(Some).map_err(|_| {
                ResourceError::InvalidNumber {
                    resource: resource.to_string(),
                    attribute: name.to_string(),
                    value: value.to_string(),
                }
            }),
        }
    }

    pub fn parse_required_attr<T: FromStr>(
        &self,
        resource: &str,
        name: &str,
    ) -> Result<T, ResourceError> {
        self.required_attr(resource, name)?;
        self.parse_attr(resource, name)?
            .ok_or_else(|| ResourceError::MissingAttribute {
                resource: resource.to_string(),
                element: self.name.clone(),
                attribute: name.to_string(),
            })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn required_child(&self, resource: &str, name: &str) -> Result<&Element, ResourceError> {
        self.child(name).ok_or_else(|| ResourceError::MissingElement {
            resource: resource.to_string(),
            element: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_elements() {
        let doc = parse_document(
            "test.xml",
            r#"<?xml version="1.0"?>
            <!-- comment -->
            <Root a="1">
              <Child name="x &amp; y"/>
              <Child name="z"><Leaf/></Child>
              text is ignored
            </Root>"#,
        )
        .unwrap();
        assert_eq!(doc.name, "Root");
        assert_eq!(doc.attr("a"), Some("1"));
        let children: Vec<_> = doc.children_named("Child").collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].attr("name"), Some("x & y"));
        assert_eq!(children[1].children[0].name, "Leaf");
    }

    #[test]
    fn attribute_errors_name_the_attribute() {
        let doc = parse_document("t.xml", r#"<A width="wide"/>"#).unwrap();
        match doc.parse_attr::<f32>("t.xml", "width") {
            Err(ResourceError::InvalidNumber { attribute, .. }) => assert_eq!(attribute, "width"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(doc.parse_attr::<f32>("t.xml", "height").unwrap().is_none());
        assert!(doc.required_attr("t.xml", "height").is_err());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(parse_document("t.xml", "<A><B></A>").is_err());
        assert!(parse_document("t.xml", "").is_err());
    }
}
