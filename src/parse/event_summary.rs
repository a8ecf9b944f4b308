use quick_xml::events::Event;

use std::fmt;

/// A short, owned description of an xml event used in error messages
#[derive(Debug)]
pub struct EventSummary {
    name: Option<String>,
    kind: &'static str,
}

impl fmt::Display for EventSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} element `{name}`", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl EventSummary {
    pub(crate) fn new(event: &Event) -> Self {
        let name = match event {
            Event::Start(element) | Event::Empty(element) => Some(element.name()),
            Event::End(element) => Some(element.name()),
            _ => None,
        };

        Self {
            name: name.map(|name| String::from_utf8_lossy(name.as_ref()).into_owned()),
            kind: kind(event),
        }
    }

    pub(crate) fn eof() -> Self {
        Self {
            name: None,
            kind: "end of file",
        }
    }
}

fn kind(event: &Event) -> &'static str {
    match event {
        Event::Start(_) => "opening",
        Event::End(_) => "closing",
        Event::Empty(_) => "empty",
        Event::Text(_) => "text",
        Event::CData(_) => "cdata",
        Event::Comment(_) => "comment",
        Event::Decl(_) => "declaration",
        Event::PI(_) => "processing instruction",
        Event::DocType(_) => "doctype",
        Event::Eof => "end of file",
    }
}

#[test]
fn summaries_name_the_element() {
    let start = Event::Start(quick_xml::events::BytesStart::new("Piece"));
    assert_eq!(EventSummary::new(&start).to_string(), "opening element `Piece`");
    assert_eq!(EventSummary::eof().to_string(), "end of file");
}
