//! Prelude module - common imports for yamlcalc users
//!
//! ```rust
//! use yamlcalc::prelude::*;
//! ```

pub use crate::{
    // Loading
    load_document,
    CoreError,
    Document,
    DocumentOptions,
    EvalOptions,

    // Reading
    MapContainer,
    Node,
    SeqContainer,
    Value,
    FAILURE_SENTINEL,

    // Rendering
    render_to_dir,
    render_view,
    resolve_view,
    Error,
    RenderOptions,
    ViewKind,
    ViewPath,
};
