//! Catalog XML loader.
//!
//! ```xml
//! <catalog>
//!   <archive name="data.tar" id="1">
//!     <file name="a" id="2" locator="10" size="5" sha256="..."/>
//!     <container name="inner.tar" locator="512" size="1024">
//!       <file name="b" locator="2" size="3"/>
//!     </container>
//!     <directory name="docs"/>
//!   </archive>
//! </catalog>
//! ```

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::tree::{CatalogTree, EntrySpec, NodeId, NodeKind};
use crate::{Error, Result};

pub fn parse_catalog<R: BufRead>(reader: R) -> Result<CatalogTree> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut tree = CatalogTree::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Err(e) => {
                return Err(Error::Xml {
                    position: xml.buffer_position() as u64,
                    message: e.to_string(),
                });
            }
            Ok(Event::Start(ref e)) => {
                let node = open_element(&mut tree, &stack, &mut seen_root, e)?;
                stack.push(node);
            }
            Ok(Event::Empty(ref e)) => {
                open_element(&mut tree, &stack, &mut seen_root, e)?;
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(Error::MissingRoot);
    }
    Ok(tree)
}

fn open_element(
    tree: &mut CatalogTree,
    stack: &[NodeId],
    seen_root: &mut bool,
    e: &BytesStart<'_>,
) -> Result<NodeId> {
    let element = String::from_utf8_lossy(e.name().as_ref()).to_string();

    if element == "catalog" {
        if *seen_root || !stack.is_empty() {
            return Err(Error::Misplaced { element });
        }
        *seen_root = true;
        return Ok(tree.root());
    }

    let Some(&parent) = stack.last() else {
        return Err(Error::Misplaced { element });
    };

    let kind = match element.as_str() {
        "archive" => NodeKind::Container,
        "container" => NodeKind::Container,
        "file" => NodeKind::File,
        "directory" => NodeKind::Directory,
        "zombie" => NodeKind::Zombie,
        "fifo" => NodeKind::Fifo,
        "device" => NodeKind::Device,
        "symlink" => NodeKind::Symlink,
        _ => return Err(Error::UnknownElement(element)),
    };

    let at_root = parent == tree.root();
    if at_root != (element == "archive") {
        return Err(Error::Misplaced { element });
    }

    let mut attrs = parse_attrs(e)?;
    let name = attrs.remove("name").ok_or_else(|| Error::MissingAttribute {
        element: element.clone(),
        attribute: "name",
    })?;

    let mut spec = EntrySpec::new(kind, name);
    if let Some(id) = attrs.remove("id") {
        spec = spec.id(id);
    }
    match attrs.remove("locator") {
        Some(value) => spec = spec.locator(parse_u64("locator", value)?),
        None if element == "archive" => spec = spec.locator(0),
        None => {}
    }
    match attrs.remove("size") {
        Some(value) => spec = spec.size(parse_u64("size", value)?),
        // payload entries are read as exactly `size` bytes
        None if matches!(kind, NodeKind::File | NodeKind::Container) && element != "archive" => {
            return Err(Error::MissingAttribute {
                element,
                attribute: "size",
            });
        }
        None => {}
    }
    if let Some(digest) = attrs.remove("sha256") {
        spec = spec.sha256(digest);
    }
    if !attrs.is_empty() {
        tracing::trace!(element = %element, ignored = ?attrs.keys().collect::<Vec<_>>(), "ignoring catalog attributes");
    }

    tree.insert(parent, spec)
}

fn parse_attrs(e: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Xml {
            position: 0,
            message: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| Error::Xml {
                position: 0,
                message: err.to_string(),
            })?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn parse_u64(attribute: &str, value: String) -> Result<u64> {
    value.trim().parse().map_err(|_| Error::InvalidAttribute {
        attribute: attribute.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Lookup;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<catalog>
  <!-- produced by a cataloging pass -->
  <archive name="data.tar" id="1">
    <file name="a" id="2" locator="10" size="5" sha256="abc"/>
    <container name="dir" id="3" locator="5" size="12">
      <file name="b" id="4" locator="2" size="3"/>
    </container>
    <directory name="docs">
      <file name="read&amp;me" locator="40" size="1"/>
    </directory>
    <fifo name="pipe"/>
  </archive>
</catalog>"#;

    #[test]
    fn parses_sample() {
        let tree = parse_catalog(SAMPLE.as_bytes()).unwrap();
        let archive = tree.archive("data.tar").unwrap();

        let Lookup::Found(b) = tree.lookup(archive, "dir/b") else {
            panic!("dir/b missing");
        };
        assert_eq!(tree.node(b).locator, Some(2));
        assert_eq!(tree.node(b).size, Some(3));
        assert_eq!(tree.by_id("4"), Some(b));
        assert_eq!(tree.by_id("1"), Some(archive));
        assert!(matches!(tree.lookup(archive, "docs/read&me"), Lookup::Found(_)));

        let Lookup::Found(pipe) = tree.lookup(archive, "pipe") else {
            panic!("pipe missing");
        };
        assert_eq!(tree.node(pipe).kind, NodeKind::Fifo);
    }

    #[test]
    fn unknown_element_rejected() {
        let xml = r#"<catalog><archive name="x"><blob name="y"/></archive></catalog>"#;
        assert!(matches!(parse_catalog(xml.as_bytes()), Err(Error::UnknownElement(e)) if e == "blob"));
    }

    #[test]
    fn entries_must_live_in_an_archive() {
        let xml = r#"<catalog><file name="y" locator="1"/></catalog>"#;
        assert!(matches!(parse_catalog(xml.as_bytes()), Err(Error::Misplaced { .. })));

        let xml = r#"<catalog><archive name="x"><archive name="y"/></archive></catalog>"#;
        assert!(matches!(parse_catalog(xml.as_bytes()), Err(Error::Misplaced { .. })));
    }

    #[test]
    fn missing_name_rejected() {
        let xml = r#"<catalog><archive name="x"><file locator="1"/></archive></catalog>"#;
        assert!(matches!(
            parse_catalog(xml.as_bytes()),
            Err(Error::MissingAttribute { attribute: "name", .. })
        ));
    }

    #[test]
    fn payload_entries_need_a_size() {
        let xml = r#"<catalog><archive name="x"><file name="f" locator="5"/></archive></catalog>"#;
        assert!(matches!(
            parse_catalog(xml.as_bytes()),
            Err(Error::MissingAttribute { attribute: "size", ref element }) if element == "file"
        ));

        let xml = r#"<catalog><archive name="x"><container name="c" locator="5"/></archive></catalog>"#;
        assert!(matches!(
            parse_catalog(xml.as_bytes()),
            Err(Error::MissingAttribute { attribute: "size", .. })
        ));

        let xml = r#"<catalog><archive name="x"><directory name="d"/><fifo name="p"/></archive></catalog>"#;
        assert!(parse_catalog(xml.as_bytes()).is_ok());
    }

    #[test]
    fn bad_number_rejected() {
        let xml = r#"<catalog><archive name="x"><file name="f" locator="ten"/></archive></catalog>"#;
        assert!(matches!(parse_catalog(xml.as_bytes()), Err(Error::InvalidAttribute { .. })));
    }

    #[test]
    fn duplicate_id_rejected() {
        let xml = r#"<catalog><archive name="x" id="1"><file name="f" id="1" locator="0" size="0"/></archive></catalog>"#;
        assert!(matches!(parse_catalog(xml.as_bytes()), Err(Error::DuplicateId(_))));
    }

    #[test]
    fn mismatched_tags_rejected() {
        let xml = r#"<catalog><archive name="x"></catalog>"#;
        assert!(matches!(parse_catalog(xml.as_bytes()), Err(Error::Xml { .. })));
    }

    #[test]
    fn empty_document_has_no_root() {
        assert!(matches!(parse_catalog("".as_bytes()), Err(Error::MissingRoot)));
    }
}
