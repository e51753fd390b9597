// XML converter: a `<root>`-wrapped element tree on output, xml2js-style mapping on input.
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use super::Converter;
use crate::error::{ConvertError, Result};
use crate::format::Format;
use crate::options::ConversionOptions;
use crate::tree::{prepare, scalar_text, ConfigTree};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";
const ROOT_NAME: &str = "root";
const ITEM_NAME: &str = "item";
/// Key holding an element's text when it also has attributes or children.
const TEXT_KEY: &str = "_";

/// XML through `quick-xml`.
///
/// Parsing drops the document element, merges attributes into the element's
/// mapping and groups repeated tags into sequences. All leaf values come back
/// as strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlConverter;

impl Converter for XmlConverter {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn extensions(&self) -> &[&str] {
        &[".xml"]
    }

    fn parse(&self, input: &str) -> Result<ConfigTree> {
        let root = read_document(input).map_err(|err| ConvertError::parse(Format::Xml, err))?;
        Ok(element_to_value(&root))
    }

    fn stringify(&self, tree: &ConfigTree, options: &ConversionOptions) -> Result<String> {
        let tree = prepare(tree, options);
        let indent = options
            .pretty_or(true)
            .then(|| " ".repeat(options.indent_or(2)));
        let mut writer = XmlWriter {
            out: String::new(),
            indent,
        };
        writer.out.push_str(DECLARATION);
        writer.newline();
        let written = match &*tree {
            Value::Array(items) => {
                let wrapped: Map<String, Value> =
                    [(ITEM_NAME.to_string(), Value::Array(items.clone()))].into_iter().collect();
                writer.element(ROOT_NAME, &Value::Object(wrapped), 0)
            }
            other => writer.element(ROOT_NAME, other, 0),
        };
        written.map_err(|err| ConvertError::serialize(Format::Xml, err))?;
        Ok(writer.out)
    }
}

struct XmlWriter {
    out: String,
    indent: Option<String>,
}

impl XmlWriter {
    fn newline(&mut self) {
        if self.indent.is_some() {
            self.out.push('\n');
        }
    }

    fn pad(&mut self, depth: usize) {
        if let Some(unit) = &self.indent {
            self.out.push_str(&unit.repeat(depth));
        }
    }

    fn element(&mut self, name: &str, value: &Value, depth: usize) -> std::result::Result<(), String> {
        match value {
            Value::Object(map) => {
                check_name(name)?;
                self.pad(depth);
                if map.is_empty() {
                    self.out.push_str(&format!("<{name}/>"));
                    self.newline();
                    return Ok(());
                }
                self.out.push_str(&format!("<{name}>"));
                self.newline();
                if let Some(text) = map.get(TEXT_KEY).filter(|v| !v.is_object() && !v.is_array()) {
                    self.pad(depth + 1);
                    self.out.push_str(&xml_escape(&scalar_text(text)));
                    self.newline();
                }
                for (key, child) in map {
                    if key == TEXT_KEY && !child.is_object() && !child.is_array() {
                        continue;
                    }
                    self.element(key, child, depth + 1)?;
                }
                self.pad(depth);
                self.out.push_str(&format!("</{name}>"));
                self.newline();
            }
            Value::Array(items) => {
                for item in items {
                    self.element(name, item, depth)?;
                }
            }
            scalar => {
                check_name(name)?;
                self.pad(depth);
                self.out.push_str(&format!(
                    "<{name}>{}</{name}>",
                    xml_escape(&scalar_text(scalar))
                ));
                self.newline();
            }
        }
        Ok(())
    }
}

fn check_name(name: &str) -> std::result::Result<(), String> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|ch| ch.is_alphabetic() || ch == '_');
    if valid_start && chars.all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.')) {
        Ok(())
    } else {
        Err(format!("invalid element name {name:?}"))
    }
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Debug, Clone)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    value: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(tag: &BytesStart<'_>) -> std::result::Result<Self, String> {
        let name = String::from_utf8_lossy(tag.name().as_ref()).trim().to_string();
        let mut attributes = Vec::new();
        for attr in tag.attributes() {
            let attr = attr.map_err(|err| err.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            attributes.push((key, value.into_owned()));
        }
        Ok(Self {
            name,
            attributes,
            value: String::new(),
            children: Vec::new(),
        })
    }
}

fn read_document(input: &str) -> std::result::Result<XmlElement, String> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(tag)) => stack.push(XmlElement::from_start(&tag)?),
            Ok(Event::Empty(tag)) => {
                let node = XmlElement::from_start(&tag)?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node)?;
                }
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|err| err.to_string())?;
                match stack.last_mut() {
                    Some(current) => current.value.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err("text outside of the document element".into()),
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .value
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.to_string()),
            _ => {}
        }
        buf.clear();
    }
    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    root.ok_or_else(|| "no document element".to_string())
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    node: XmlElement,
) -> std::result::Result<(), String> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        Ok(())
    } else if root.is_some() {
        Err(format!("multiple document elements, found <{}>", node.name))
    } else {
        *root = Some(node);
        Ok(())
    }
}

fn element_to_value(el: &XmlElement) -> Value {
    let text = el.value.trim();
    if el.children.is_empty() && el.attributes.is_empty() {
        return Value::String(text.to_string());
    }
    let mut obj = Map::new();
    for (key, value) in &el.attributes {
        obj.insert(key.clone(), Value::String(value.clone()));
    }
    if !text.is_empty() {
        obj.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
    }
    for child in &el.children {
        let value = element_to_value(child);
        match obj.get_mut(&child.name) {
            None => {
                obj.insert(child.name.clone(), value);
            }
            Some(Value::Array(arr)) => arr.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    Value::Object(obj)
}
