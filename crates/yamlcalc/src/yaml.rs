//! YAML front-end
//!
//! Converts between YAML text and the raw [`Node`] tree. Mapping keys keep
//! their source order; keys that are not strings are stringified.

use serde_yaml::Value as Yaml;
use yamlcalc_core::{Error, Node, NodeMap, Result};

/// Parse YAML text into a raw tree
pub fn parse_yaml(text: &str) -> Result<Node> {
    let value: Yaml = serde_yaml::from_str(text).map_err(|e| Error::Parse(e.to_string()))?;
    Ok(node_from_yaml(value))
}

/// Serialize a tree as YAML text
pub fn to_yaml_string(node: &Node) -> Result<String> {
    serde_yaml::to_string(node).map_err(|e| Error::other(format!("YAML output failed: {}", e)))
}

fn node_from_yaml(value: Yaml) -> Node {
    match value {
        Yaml::Null => Node::Null,
        Yaml::Bool(b) => Node::Bool(b),
        Yaml::Number(n) => match n.as_i64() {
            Some(i) => Node::Int(i),
            None => Node::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Yaml::String(s) => Node::String(s),
        Yaml::Sequence(items) => Node::Seq(items.into_iter().map(node_from_yaml).collect()),
        Yaml::Mapping(mapping) => {
            let mut map = NodeMap::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(key_text(key), node_from_yaml(value));
            }
            Node::Map(map)
        }
        Yaml::Tagged(tagged) => node_from_yaml(tagged.value),
    }
}

fn key_text(key: Yaml) -> String {
    match key {
        Yaml::String(s) => s,
        Yaml::Null => "null".to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        other => node_from_yaml(other).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_scalars_and_order() {
        let node = parse_yaml(
            "zeta: 1\nalpha: 2.5\nmid: true\nnothing:\ntext: '=a + 1'\nlist: [1, two]\n",
        )
        .unwrap();
        let map = node.as_map().unwrap();
        assert_eq!(
            map.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["zeta", "alpha", "mid", "nothing", "text", "list"]
        );
        assert_eq!(map["alpha"], Node::Float(2.5));
        assert_eq!(map["mid"], Node::Bool(true));
        assert_eq!(map["nothing"], Node::Null);
        assert_eq!(map["text"], Node::from("=a + 1"));
        assert_eq!(map["list"], Node::Seq(vec![Node::Int(1), Node::from("two")]));
    }

    #[test]
    fn test_non_string_keys() {
        let node = parse_yaml("1: one\ntrue: yes\n~: none\n").unwrap();
        let keys: Vec<_> = node.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["1", "true", "null"]);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_yaml("a: [1, 2"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_empty_text_is_null() {
        assert_eq!(parse_yaml("").unwrap(), Node::Null);
    }

    #[test]
    fn test_to_yaml_string() {
        let mut node = Node::map();
        node.insert("b", 1);
        node.insert("a", vec![1.5, 2.0]);
        node.insert("c", Node::Null);
        assert_eq!(to_yaml_string(&node).unwrap(), "b: 1\na:\n- 1.5\n- 2.0\nc: null\n");
    }
}
