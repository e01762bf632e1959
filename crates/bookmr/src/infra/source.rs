//! Loading bookmark trees from SourceTree exports.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;

use crate::domain::errors::ConvertError;
use crate::domain::model::BookmarkNode;

/// Supplies the bookmark tree to convert.
pub trait BookmarkSource {
    /// Return a synthetic folder whose children are the document's top-level entries.
    fn load(&self) -> Result<BookmarkNode, ConvertError>;
}

/// On-disk encodings of the bookmark tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// SourceTree's `Bookmarks.xml` (`ArrayOfTreeViewNode`).
    Xml,
    /// The same tree as JSON: `{"nodes": [BookmarkNode, ...]}`.
    Json,
}

impl SourceFormat {
    /// Choose a format from the file extension, defaulting to XML.
    pub fn detect(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => SourceFormat::Json,
            _ => SourceFormat::Xml,
        }
    }
}

/// Bookmark file on disk.
#[derive(Debug, Clone)]
pub struct BookmarksFile<'a> {
    path: &'a Path,
    format: SourceFormat,
}

impl<'a> BookmarksFile<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self {
            path,
            format: SourceFormat::detect(path),
        }
    }
}

impl BookmarkSource for BookmarksFile<'_> {
    fn load(&self) -> Result<BookmarkNode, ConvertError> {
        let read_error = |reason: String| ConvertError::SourceRead {
            path: self.path.to_path_buf(),
            reason,
        };

        let data = fs::read_to_string(self.path).map_err(|err| read_error(err.to_string()))?;
        let root = match self.format {
            SourceFormat::Xml => parse_xml(&data),
            SourceFormat::Json => parse_json(&data),
        }
        .map_err(read_error)?;

        tracing::debug!(
            path = %self.path.display(),
            top_level = root.children.len(),
            "loaded bookmarks"
        );
        Ok(root)
    }
}

const NODE_ELEMENT: &str = "TreeViewNode";

/// Parse a SourceTree XML document.
///
/// The document is read as an event stream and the tree is assembled on an explicit stack
/// of open nodes, so nesting depth is bounded by memory rather than the call stack.
pub fn parse_xml(data: &str) -> Result<BookmarkNode, String> {
    let mut reader = Reader::from_str(data);
    let mut roots = Vec::new();
    let mut nodes: Vec<BookmarkNode> = Vec::new();
    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event().map_err(|err| err.to_string())? {
            Event::Start(element) => {
                let name = element_name(element.local_name().as_ref());
                if name == NODE_ELEMENT {
                    nodes.push(BookmarkNode::default());
                }
                open.push(name);
            }
            Event::Empty(element) => {
                if element_name(element.local_name().as_ref()) == NODE_ELEMENT {
                    attach(BookmarkNode::default(), &mut nodes, &mut roots);
                }
            }
            Event::End(_) => {
                if open.pop().as_deref() == Some(NODE_ELEMENT)
                    && let Some(node) = nodes.pop()
                {
                    attach(node, &mut nodes, &mut roots);
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|err| err.to_string())?;
                apply_field(&open, &mut nodes, &text)?;
            }
            Event::CData(text) => {
                apply_field(&open, &mut nodes, &String::from_utf8_lossy(&text))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(format!("unexpected end of document inside <{unclosed}>"));
    }
    Ok(BookmarkNode::folder("", roots))
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn attach(node: BookmarkNode, nodes: &mut [BookmarkNode], roots: &mut Vec<BookmarkNode>) {
    match nodes.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Record text found directly inside a field element of the innermost open node.
fn apply_field(open: &[String], nodes: &mut [BookmarkNode], text: &str) -> Result<(), String> {
    let [.., parent, field] = open else {
        return Ok(());
    };
    if parent != NODE_ELEMENT {
        return Ok(());
    }
    let Some(node) = nodes.last_mut() else {
        return Ok(());
    };

    match field.as_str() {
        "IsLeaf" => node.is_leaf = parse_bool(text)?,
        "Name" => node.name.push_str(text),
        "RepoType" => node.repo_kind.push_str(text),
        "Path" => node.path.push_str(text),
        _ => {}
    }
    Ok(())
}

fn parse_bool(text: &str) -> Result<bool, String> {
    match text.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(format!("invalid IsLeaf value '{other}'")),
    }
}

/// Parse the JSON rendition of the tree.
///
/// serde_json's nesting limit is lifted and deserialization grows its stack on demand, so
/// deeply nested folders load like shallow ones.
pub fn parse_json(data: &str) -> Result<BookmarkNode, String> {
    let mut de = serde_json::Deserializer::from_str(data);
    de.disable_recursion_limit();
    let document = JsonDocument::deserialize(serde_stacker::Deserializer::new(&mut de))
        .map_err(|err| err.to_string())?;
    de.end().map_err(|err| err.to_string())?;
    Ok(BookmarkNode::folder("", document.nodes))
}

#[derive(Debug, Deserialize)]
struct JsonDocument {
    #[serde(default)]
    nodes: Vec<BookmarkNode>,
}
