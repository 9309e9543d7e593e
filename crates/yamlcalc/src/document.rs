//! Document binder
//!
//! Loading a document validates the root, runs the definitions preamble
//! once and binds everything into a [`Session`]. Reads through
//! [`Document::root`] then evaluate formulas on demand.

use std::fs;
use std::path::Path;

use tracing::{debug, info};
use yamlcalc_core::{Error, Node, Result, DEFS_FIELD};
use yamlcalc_formula::{
    Definitions, EvalOptions, ExpressionEngine, Interpreter, MapContainer, Session, Value,
};

use crate::yaml::parse_yaml;

/// Options for loading a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Top-level field holding the definitions preamble
    pub defs_field: String,
    /// Formula evaluation options
    pub eval: EvalOptions,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            defs_field: DEFS_FIELD.to_string(),
            eval: EvalOptions::default(),
        }
    }
}

/// A loaded live document
#[derive(Debug)]
pub struct Document {
    session: Session,
}

impl Document {
    /// Bind a parsed tree with the built-in interpreter
    pub fn load(root: Node, options: &DocumentOptions) -> Result<Self> {
        let engine = Interpreter::new(options.eval.max_depth);
        Self::with_engine(root, options, Box::new(engine))
    }

    /// Bind a parsed tree with a custom expression engine
    ///
    /// Fails with [`Error::Schema`] if the root is not a mapping and with
    /// [`Error::Definitions`] if the preamble is not text or does not run.
    /// No formula is evaluated before both checks pass.
    pub fn with_engine(
        root: Node,
        options: &DocumentOptions,
        engine: Box<dyn ExpressionEngine>,
    ) -> Result<Self> {
        let root = match root {
            Node::Map(map) => map,
            other => return Err(Error::Schema(other.type_name())),
        };

        let definitions_error = |message: String| Error::Definitions {
            field: options.defs_field.clone(),
            message,
        };
        let source = match root.get(&options.defs_field) {
            None | Some(Node::Null) => "",
            Some(Node::String(source)) => source.as_str(),
            Some(other) => {
                return Err(definitions_error(format!(
                    "expected text, found {}",
                    other.type_name()
                )))
            }
        };

        let definitions = engine
            .define(source)
            .map_err(|e| definitions_error(e.to_string()))?;
        debug!(names = ?definitions.names().collect::<Vec<_>>(), "bound definitions");
        info!(
            keys = root.len(),
            definitions = definitions.len(),
            "loaded document"
        );

        Ok(Self {
            session: Session::new(root, definitions, engine, options.eval.clone()),
        })
    }

    /// Parse and bind YAML text
    pub fn from_yaml_str(text: &str, options: &DocumentOptions) -> Result<Self> {
        Self::load(parse_yaml(text)?, options)
    }

    /// Read, parse and bind a YAML file
    pub fn open<P: AsRef<Path>>(path: P, options: &DocumentOptions) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text, options)
    }

    /// The root container
    pub fn root(&self) -> MapContainer<'_> {
        self.session.root()
    }

    /// Read a top-level element
    pub fn get(&self, key: &str) -> Result<Value<'_>> {
        self.root().get(key)
    }

    /// Top-level keys in document order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root().keys()
    }

    /// Definitions namespace
    pub fn definitions(&self) -> &Definitions {
        self.session.definitions()
    }

    /// Evaluation session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Evaluate the whole document into a plain tree
    pub fn resolve(&self) -> Result<Node> {
        self.root().resolve()
    }
}

/// Bind a parsed tree whose preamble lives under `defs_field`
pub fn load_document(root: Node, defs_field: &str) -> Result<Document> {
    Document::load(
        root,
        &DocumentOptions {
            defs_field: defs_field.to_string(),
            ..DocumentOptions::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_binds_definitions() {
        let doc = Document::from_yaml_str(
            "DEFS: |\n  RATE = 2\n  def twice(x): x * RATE\nvalue: '=twice(21)'\n",
            &DocumentOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.get("value").unwrap(), Value::Int(42));
        assert_eq!(
            doc.definitions().names().collect::<Vec<_>>(),
            vec!["RATE", "twice"]
        );
    }

    #[test]
    fn test_custom_defs_field() {
        let mut root = Node::map();
        root.insert("HELPERS", "K = 5");
        root.insert("DEFS", "not = valid = source");
        root.insert("k", "=K");

        let doc = load_document(root, "HELPERS").unwrap();
        assert_eq!(doc.get("k").unwrap(), Value::Int(5));
    }

    #[test]
    fn test_missing_or_null_defs_is_empty() {
        let doc = Document::from_yaml_str("a: 1\n", &DocumentOptions::default()).unwrap();
        assert!(doc.definitions().is_empty());

        let doc = Document::from_yaml_str("DEFS:\na: 1\n", &DocumentOptions::default()).unwrap();
        assert!(doc.definitions().is_empty());
    }

    #[test]
    fn test_schema_error() {
        let err = Document::from_yaml_str("- 1\n- 2\n", &DocumentOptions::default()).unwrap_err();
        assert_eq!(err, Error::Schema("sequence"));

        let err = Document::from_yaml_str("42", &DocumentOptions::default()).unwrap_err();
        assert_eq!(err, Error::Schema("integer"));
    }

    #[test]
    fn test_definitions_errors() {
        let err = Document::from_yaml_str("DEFS: [1, 2]\n", &DocumentOptions::default()).unwrap_err();
        assert_eq!(
            err,
            Error::Definitions {
                field: "DEFS".into(),
                message: "expected text, found sequence".into()
            }
        );

        let err = Document::from_yaml_str("DEFS: 'x = 1 / 0'\n", &DocumentOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Definitions { field, .. } if field == "DEFS"));
    }

    #[test]
    fn test_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.yml");
        fs::write(&path, "a: 1\nb: '=a + 1'\n").unwrap();

        let doc = Document::open(&path, &DocumentOptions::default()).unwrap();
        assert_eq!(doc.get("b").unwrap(), Value::Int(2));

        let err = Document::open(dir.path().join("missing.yml"), &DocumentOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_document_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Document>();
    }
}
