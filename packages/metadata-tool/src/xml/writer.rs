//! Indented XML writer used to serialize metadata documents.
//!
//! Thin layer over `quick_xml::Writer` with the ISO 19139 property idioms
//! (`gco:CharacterString`, `gmx:Anchor`, code list values) built in. Output is
//! UTF-8, indented with two spaces and ends with a newline; attribute order is
//! the order in which attributes are passed.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::iso_codelist;
use crate::error::{MetadataError, Result};

/// Indentation width in spaces.
const INDENT_SIZE: usize = 2;

/// Streaming XML writer.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Create a writer and emit the XML declaration.
    pub fn new() -> Result<Self> {
        let mut writer = Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE),
        };
        writer.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(writer)
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.inner
            .write_event(event)
            .map_err(|e| MetadataError::XmlWrite(e.to_string()))
    }

    fn start_tag<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        start
    }

    /// Open an element.
    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.emit(Event::Start(Self::start_tag(name, attrs)))
    }

    /// Close an element.
    pub fn end(&mut self, name: &str) -> Result<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    /// Write a self-closing element.
    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.emit(Event::Empty(Self::start_tag(name, attrs)))
    }

    /// Write `<name attrs>text</name>` on one line.
    pub fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attrs)?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// Write an element whose content is produced by `body`.
    pub fn element<F>(&mut self, name: &str, attrs: &[(&str, &str)], body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.start(name, attrs)?;
        body(self)?;
        self.end(name)
    }

    /// `<property><gco:CharacterString>text</gco:CharacterString></property>`
    pub fn character_string(&mut self, property: &str, text: &str) -> Result<()> {
        self.element(property, &[], |w| {
            w.text_element("gco:CharacterString", &[], text)
        })
    }

    /// `<property><gmx:Anchor xlink:href="href">text</gmx:Anchor></property>`
    pub fn anchor(&mut self, property: &str, href: &str, text: &str) -> Result<()> {
        self.element(property, &[], |w| {
            w.text_element("gmx:Anchor", &[("xlink:href", href)], text)
        })
    }

    /// Anchor when a reference is known, character string otherwise.
    pub fn free_text(&mut self, property: &str, text: &str, href: Option<&str>) -> Result<()> {
        match href {
            Some(href) => self.anchor(property, href, text),
            None => self.character_string(property, text),
        }
    }

    /// `<property><codeElement codeList=".." codeListValue="value">value</codeElement></property>`
    pub fn code_value(&mut self, property: &str, code_element: &str, value: &str) -> Result<()> {
        let code_list = iso_codelist(local_name(code_element));
        self.element(property, &[], |w| {
            w.text_element(
                code_element,
                &[("codeList", code_list.as_str()), ("codeListValue", value)],
                value,
            )
        })
    }

    /// `<property><gco:Date>date</gco:Date></property>`
    pub fn date(&mut self, property: &str, date: &str) -> Result<()> {
        self.element(property, &[], |w| w.text_element("gco:Date", &[], date))
    }

    /// `<property><gco:Decimal>value</gco:Decimal></property>`
    pub fn decimal(&mut self, property: &str, value: f64) -> Result<()> {
        self.element(property, &[], |w| {
            w.text_element("gco:Decimal", &[], &value.to_string())
        })
    }

    /// `<property><gco:Boolean>true|false</gco:Boolean></property>`
    pub fn boolean(&mut self, property: &str, value: bool) -> Result<()> {
        self.element(property, &[], |w| {
            w.text_element("gco:Boolean", &[], if value { "true" } else { "false" })
        })
    }

    /// Finish the document and return its bytes (with a trailing newline).
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        let mut bytes = self.inner.into_inner();
        bytes.push(b'\n');
        bytes
    }
}

/// Strip a namespace prefix from a qualified name.
fn local_name(qualified: &str) -> &str {
    qualified
        .split_once(':')
        .map(|(_, local)| local)
        .unwrap_or(qualified)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(body: F) -> String
    where
        F: FnOnce(&mut XmlWriter) -> Result<()>,
    {
        let mut writer = XmlWriter::new().unwrap();
        body(&mut writer).unwrap();
        String::from_utf8(writer.finish()).unwrap()
    }

    #[test]
    fn test_declaration_and_indentation() {
        let xml = render(|w| w.element("root", &[("a", "1")], |w| w.text_element("child", &[], "x")));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root a=\"1\">\n  <child>x</child>\n</root>\n"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = render(|w| w.text_element("t", &[], "a < b & c"));
        assert!(xml.contains("<t>a &lt; b &amp; c</t>"));
    }

    #[test]
    fn test_character_string_and_anchor() {
        let xml = render(|w| {
            w.element("root", &[], |w| {
                w.character_string("gmd:title", "Wegen")?;
                w.anchor("gmd:keyword", "http://x", "Vervoersnetwerken")
            })
        });
        assert!(xml.contains("<gmd:title>\n    <gco:CharacterString>Wegen</gco:CharacterString>\n  </gmd:title>"));
        assert!(xml.contains("<gmx:Anchor xlink:href=\"http://x\">Vervoersnetwerken</gmx:Anchor>"));
    }

    #[test]
    fn test_code_value() {
        let xml = render(|w| w.code_value("gmd:role", "gmd:CI_RoleCode", "pointOfContact"));
        assert!(xml.contains("codeList=\"https://standards.iso.org/iso/19139/resources/gmxCodelists.xml#CI_RoleCode\""));
        assert!(xml.contains("codeListValue=\"pointOfContact\">pointOfContact</gmd:CI_RoleCode>"));
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("gmd:CI_RoleCode"), "CI_RoleCode");
        assert_eq!(local_name("plain"), "plain");
    }
}
