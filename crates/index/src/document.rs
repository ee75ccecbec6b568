//! CLIXML object graph walk

use std::collections::BTreeMap;

use filever_errors::IndexError;
use filever_types::{IndexValue, IndexedFileItem, RunInfo};
use roxmltree::{Document, Node};
use tracing::trace;

use crate::text::unescape;
use crate::value::{decode_element, to_bool, to_error, to_length, to_text};
use crate::Index;

const ROOT_TAG: &str = "Objs";
const ITEMS_MEMBER: &str = "items";

/// Parse decoded document text into an [`Index`].
pub(crate) fn parse_text(text: &str) -> Result<Index, IndexError> {
    let doc = Document::parse(text).map_err(|e| IndexError::MalformedDocument {
        message: e.to_string(),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != ROOT_TAG {
        return Err(IndexError::MalformedDocument {
            message: format!(
                "expected root element <{ROOT_TAG}>, found <{}>",
                root.tag_name().name()
            ),
        });
    }

    let root_obj = child_elements(root, "Obj")
        .next()
        .ok_or(IndexError::NoRootObject)?;

    // A root object without members is an index with nothing in it
    let Some(members) = child_elements(root_obj, "MS").next() else {
        return Ok(Index::default());
    };

    let meta = read_meta(members)?;
    let algorithm = meta
        .get("algorithm")
        .and_then(IndexValue::as_str)
        .unwrap_or_default()
        .to_string();

    let items = match items_list(members) {
        Some(list) => read_items(list)?,
        None => Vec::new(),
    };

    let total_bytes = items
        .iter()
        .filter(|item| !item.has_error())
        .try_fold(0u64, |sum, item| sum.checked_add(item.length))
        .ok_or_else(|| IndexError::EntryDecode {
            key: "length".to_string(),
            message: "sum of record lengths overflows 64 bits".to_string(),
        })?;

    Ok(Index {
        run: RunInfo {
            algorithm,
            meta,
            total_bytes,
        },
        items,
    })
}

fn child_elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

/// Every named scalar member; nested objects are not metadata.
fn read_meta(members: Node<'_, '_>) -> Result<BTreeMap<String, IndexValue>, IndexError> {
    let mut meta = BTreeMap::new();
    for member in members.children().filter(Node::is_element) {
        if member.tag_name().name() == "Obj" {
            continue;
        }
        let Some(name) = member.attribute("N") else {
            continue;
        };
        let value = decode_element(member, name)?;
        meta.insert(name.to_string(), value);
    }
    Ok(meta)
}

/// The `LST` element of the `items` member, when present.
fn items_list<'a, 'input>(members: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    let items = child_elements(members, "Obj").find(|o| o.attribute("N") == Some(ITEMS_MEMBER))?;
    child_elements(items, "LST").next()
}

fn read_items(list: Node<'_, '_>) -> Result<Vec<IndexedFileItem>, IndexError> {
    let mut items = Vec::new();
    for record in child_elements(list, "Obj") {
        let Some(dict) = child_elements(record, "DCT").next() else {
            trace!("skipping list entry without a dictionary");
            continue;
        };
        items.push(read_record(dict)?);
    }
    Ok(items)
}

fn read_record(dict: Node<'_, '_>) -> Result<IndexedFileItem, IndexError> {
    let mut item = IndexedFileItem::default();

    for entry in child_elements(dict, "En") {
        let Some((key, value)) = entry_key_value(entry)? else {
            continue;
        };
        match key.as_str() {
            "ok" => item.ok = to_bool(&key, &value)?,
            "path" => item.path = to_text(&key, &value)?,
            "length" => item.length = to_length(&key, &value)?,
            "hash" => item.hash = to_text(&key, &value)?,
            "error" => item.error = to_error(&key, &value)?,
            _ => {}
        }
    }

    Ok(item)
}

/// Split an `En` into its key and decoded value. Entries missing either half
/// are ignored.
fn entry_key_value(entry: Node<'_, '_>) -> Result<Option<(String, IndexValue)>, IndexError> {
    let mut key = None;
    let mut value = None;

    for field in entry.children().filter(Node::is_element) {
        match field.attribute("N") {
            Some("Key") => key = Some(unescape(field.text().unwrap_or(""))),
            Some("Value") => value = Some(field),
            _ => {}
        }
    }

    match (key, value) {
        (Some(key), Some(node)) => {
            let value = decode_element(node, &key)?;
            Ok(Some((key, value)))
        }
        _ => Ok(None),
    }
}
