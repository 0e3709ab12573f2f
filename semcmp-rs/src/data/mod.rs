//! Data documents (JSON, YAML) as node trees.
//!
//! Values map onto elements so the structural comparator can treat data and
//! markup alike:
//!
//! - an object becomes `<object>` with one child element per key, named after
//!   the key and wrapping the value;
//! - an array becomes `<array>` with the items as children;
//! - scalars become `<string>`, `<number>`, `<boolean>` or `<null>` holding
//!   their text (empty strings and null have no text child).
//!
//! Key order is kept as written; serde_json is built with `preserve_order`.

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::constants::data::{ARRAY, BOOLEAN, NULL, NUMBER, OBJECT, STRING};
use crate::error::Result;
use crate::node::{new_node, new_root, Element, NodeContent, NodeInner, NodeRef, Text};
use crate::options::Preprocessing;

/// Parses JSON into a node tree.
pub fn parse_json(raw: &str, preprocessing: Preprocessing) -> Result<NodeRef> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(value_to_tree(&value, preprocessing))
}

/// Parses YAML into a node tree.
pub fn parse_yaml(raw: &str, preprocessing: Preprocessing) -> Result<NodeRef> {
    let value: serde_yaml::Value = serde_yaml::from_str(raw)?;
    Ok(value_to_tree(&yaml_to_json(&value), preprocessing))
}

/// Builds a tree from a JSON value. Canonicalization sorts object keys.
pub fn value_to_tree(value: &Value, preprocessing: Preprocessing) -> NodeRef {
    let sort_keys = preprocessing == Preprocessing::Canonicalize;
    let root = new_root();
    NodeInner::add_child_to_ref(&root, value_node(value, sort_keys));
    debug!(sort_keys, "built data tree");
    root
}

fn element(name: &str) -> NodeRef {
    new_node(NodeContent::Element(Element::new(name)))
}

fn scalar(name: &str, text: &str) -> NodeRef {
    let node = element(name);
    if !text.is_empty() {
        NodeInner::add_child_to_ref(&node, new_node(NodeContent::Text(Text::new(text))));
    }
    node
}

fn value_node(value: &Value, sort_keys: bool) -> NodeRef {
    match value {
        Value::Null => scalar(NULL, ""),
        Value::Bool(b) => scalar(BOOLEAN, &b.to_string()),
        Value::Number(n) => scalar(NUMBER, &n.to_string()),
        Value::String(s) => scalar(STRING, s),
        Value::Array(items) => {
            let node = element(ARRAY);
            for item in items {
                NodeInner::add_child_to_ref(&node, value_node(item, sort_keys));
            }
            node
        }
        Value::Object(map) => {
            let node = element(OBJECT);
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            if sort_keys {
                entries.sort_by(|a, b| a.0.cmp(b.0));
            }
            for (key, value) in entries {
                let entry = element(key);
                NodeInner::add_child_to_ref(&entry, value_node(value, sort_keys));
                NodeInner::add_child_to_ref(&node, entry);
            }
            node
        }
    }
}

/// Converts YAML into the JSON value model. Non-string keys are rendered as
/// text and tags are dropped.
fn yaml_to_json(value: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => yaml_number(n),
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(items.iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => {
            let mut map = Map::new();
            for (k, v) in mapping {
                map.insert(yaml_key(k), yaml_to_json(v));
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        // NaN and infinities have no JSON number; keep their YAML spelling.
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string()))
    }
}

fn yaml_key(key: &serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;
    match key {
        Yaml::String(s) => s.clone(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Rebuilds a JSON value from a data tree.
pub fn tree_to_value(node: &NodeRef) -> Value {
    let borrowed = node.borrow();
    let element = match borrowed.content() {
        NodeContent::Root => {
            return borrowed.child(0).map(tree_to_value).unwrap_or(Value::Null);
        }
        NodeContent::Element(e) => e,
        other => return Value::String(other.display_value()),
    };
    let text = || {
        borrowed
            .child(0)
            .map(|c| c.borrow().content().display_value())
            .unwrap_or_default()
    };
    match element.name() {
        OBJECT => {
            let mut map = Map::new();
            for entry in borrowed.children() {
                let entry = entry.borrow();
                let key = entry.as_element().map(|e| e.name().to_string()).unwrap_or_default();
                let value = entry.child(0).map(tree_to_value).unwrap_or(Value::Null);
                map.insert(key, value);
            }
            Value::Object(map)
        }
        ARRAY => Value::Array(borrowed.children().iter().map(tree_to_value).collect()),
        STRING => Value::String(text()),
        NUMBER => match serde_json::from_str::<Value>(&text()) {
            Ok(number @ Value::Number(_)) => number,
            _ => Value::String(text()),
        },
        BOOLEAN => Value::Bool(text() == "true"),
        NULL => Value::Null,
        other => Value::String(other.to_string()),
    }
}

/// Renders a data tree as pretty-printed JSON.
pub fn to_json_string(node: &NodeRef) -> Result<String> {
    Ok(serde_json::to_string_pretty(&tree_to_value(node))?)
}

/// Renders a data tree as YAML.
pub fn to_yaml_string(node: &NodeRef) -> Result<String> {
    Ok(serde_yaml::to_string(&tree_to_value(node))?)
}
