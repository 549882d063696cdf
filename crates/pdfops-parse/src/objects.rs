//! Small helpers over lopdf objects shared by the resource loaders.

use lopdf::{Dictionary, Document, Object, Stream};

use crate::error::BackendError;

/// Resolve an indirect reference to the actual object.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Look up `key` in `dict` and resolve it.
pub(crate) fn get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().map(|o| resolve(doc, o))
}

pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

pub(crate) fn get_number(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<f64> {
    get(doc, dict, key).and_then(number)
}

pub(crate) fn get_integer(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<i64> {
    get(doc, dict, key).and_then(|o| o.as_i64().ok())
}

pub(crate) fn get_bool(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<bool> {
    get(doc, dict, key).and_then(|o| o.as_bool().ok())
}

pub(crate) fn name(obj: &Object) -> Option<String> {
    obj.as_name()
        .ok()
        .map(|n| String::from_utf8_lossy(n).into_owned())
}

pub(crate) fn get_name(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    get(doc, dict, key).and_then(name)
}

/// A string object's text, accepting names too.
pub(crate) fn text(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

pub(crate) fn get_dict<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    match get(doc, dict, key)? {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

pub(crate) fn get_array<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Vec<Object>> {
    get(doc, dict, key).and_then(|o| o.as_array().ok())
}

/// Names of the stream's `/Filter` entry, single or array.
pub(crate) fn filter_names(doc: &Document, dict: &Dictionary) -> Vec<String> {
    match get(doc, dict, b"Filter") {
        Some(Object::Array(items)) => items.iter().filter_map(|o| name(resolve(doc, o))).collect(),
        Some(obj) => name(obj).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Stream content, decompressed when a filter is present.
pub(crate) fn stream_bytes(stream: &Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn resolves_references() {
        let mut doc = Document::with_version("1.5");
        let id = doc.add_object(Object::Integer(42));
        let dict = dictionary! { "N" => id, "R" => Object::Real(0.5), "T" => "Type1" };
        assert_eq!(get_integer(&doc, &dict, b"N"), Some(42));
        assert_eq!(get_number(&doc, &dict, b"R"), Some(0.5));
        assert_eq!(get_name(&doc, &dict, b"T").as_deref(), Some("Type1"));
        assert!(get(&doc, &dict, b"Missing").is_none());
    }

    #[test]
    fn filter_names_single_and_array() {
        let doc = Document::with_version("1.5");
        let single = dictionary! { "Filter" => "FlateDecode" };
        assert_eq!(filter_names(&doc, &single), vec!["FlateDecode"]);
        let multi = dictionary! {
            "Filter" => vec![Object::Name(b"ASCII85Decode".to_vec()), Object::Name(b"DCTDecode".to_vec())],
        };
        assert_eq!(filter_names(&doc, &multi), vec!["ASCII85Decode", "DCTDecode"]);
    }

    #[test]
    fn unfiltered_stream_passes_through() {
        let stream = Stream::new(Dictionary::new(), b"0 0 m".to_vec());
        assert_eq!(stream_bytes(&stream).unwrap(), b"0 0 m");
    }
}
