use serde_json::Value;

const SEPARATOR: char = '.';

/// Walk `tree` along a dotted key path.
///
/// Returns `None` as soon as a segment is missing or the current node is not
/// an object. An empty path yields the tree itself.
pub fn get<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(tree);
    }
    path.split(SEPARATOR)
        .try_fold(tree, |node, key| node.as_object()?.get(key))
}

pub fn get_str<'a>(tree: &'a Value, path: &str) -> Option<&'a str> {
    get(tree, path)?.as_str()
}
