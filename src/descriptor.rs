//! Namespace-qualified definition descriptors.
//!
//! A [`Descriptor`] names exactly one compiled artifact: a namespace, a name
//! and the [`DefKind`] of definition. The canonical string form is
//! `namespace:name`; the qualified form adds the kind's prefix
//! (`markup://acme:Card`, `css://acme:Card`).
//!
//! # Example
//!
//! ```
//! use bundlec::descriptor::{DefKind, Descriptor};
//!
//! let style = Descriptor::parse("acme:Card", DefKind::Style).unwrap();
//! assert_eq!(style.namespace(), "acme");
//! assert_eq!(style.descriptor_name(), "acme:Card");
//! assert_eq!(style.qualified_name(), "css://acme:Card");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Separator between namespace and name in the canonical form.
pub const SEPARATOR: char = ':';

/// Separator between the kind prefix and the descriptor name in the qualified form.
const PREFIX_SEPARATOR: &str = "://";

/// Error constructing or deriving a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DescriptorError {
    /// The input does not have the `namespace:name` shape
    #[error("Invalid descriptor format '{input}': {reason}")]
    InvalidDescriptorFormat { input: String, reason: String },
    /// The namespace is empty and nothing can be derived from it
    #[error("Malformed namespace in descriptor '{descriptor}'")]
    MalformedNamespace { descriptor: String },
}

impl DescriptorError {
    fn format(input: &str, reason: impl Into<String>) -> Self {
        DescriptorError::InvalidDescriptorFormat { input: input.to_string(), reason: reason.into() }
    }
}

/// The kind of definition a descriptor points at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DefKind {
    /// Markup component (`.cmp`)
    Component,
    /// Top-level application (`.app`)
    Application,
    /// Event definition (`.evt`)
    Event,
    /// Interface definition (`.intf`)
    Interface,
    /// Stylesheet (`.css`)
    Style,
    /// Theme (`.theme`)
    Theme,
    /// Script library (`.lib`)
    Library,
    /// Script module (`.js`)
    Module,
    /// Documentation (`.auradoc`)
    Documentation,
}

impl DefKind {
    /// All kinds, in declaration order.
    pub const ALL: [DefKind; 9] = [
        DefKind::Component,
        DefKind::Application,
        DefKind::Event,
        DefKind::Interface,
        DefKind::Style,
        DefKind::Theme,
        DefKind::Library,
        DefKind::Module,
        DefKind::Documentation,
    ];

    /// Lowercase label used in serialized output.
    pub fn label(self) -> &'static str {
        match self {
            DefKind::Component => "component",
            DefKind::Application => "application",
            DefKind::Event => "event",
            DefKind::Interface => "interface",
            DefKind::Style => "style",
            DefKind::Theme => "theme",
            DefKind::Library => "library",
            DefKind::Module => "module",
            DefKind::Documentation => "documentation",
        }
    }

    /// Prefix used in the qualified name.
    pub fn prefix(self) -> &'static str {
        match self {
            DefKind::Style => "css",
            DefKind::Library | DefKind::Module => "js",
            _ => "markup",
        }
    }
}

impl fmt::Display for DefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable identity of one artifact.
///
/// Equality, hashing and ordering use `(namespace, name, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Descriptor {
    namespace: String,
    name: String,
    kind: DefKind,
}

impl Descriptor {
    /// Build a descriptor from its parts.
    ///
    /// Fails with [`DescriptorError::InvalidDescriptorFormat`] when either part
    /// is empty or contains the `:` separator.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        kind: DefKind,
    ) -> Result<Self, DescriptorError> {
        let namespace = namespace.into();
        let name = name.into();
        let input = format!("{}{}{}", namespace, SEPARATOR, name);

        validate_part(&input, "namespace", &namespace)?;
        validate_part(&input, "name", &name)?;

        Ok(Self { namespace, name, kind })
    }

    /// Parse `namespace:name` (or `prefix://namespace:name`) as a descriptor of `kind`.
    pub fn parse(input: &str, kind: DefKind) -> Result<Self, DescriptorError> {
        let unprefixed = match input.split_once(PREFIX_SEPARATOR) {
            Some((prefix, rest)) => {
                if prefix != kind.prefix() {
                    return Err(DescriptorError::format(
                        input,
                        format!("prefix '{}' does not match kind {}", prefix, kind),
                    ));
                }
                rest
            }
            None => input,
        };

        let (namespace, name) = unprefixed
            .split_once(SEPARATOR)
            .ok_or_else(|| DescriptorError::format(input, "missing ':' separator"))?;

        if name.contains(SEPARATOR) {
            return Err(DescriptorError::format(input, "more than one ':' separator"));
        }
        if namespace.is_empty() {
            return Err(DescriptorError::format(input, "empty namespace"));
        }
        if name.is_empty() {
            return Err(DescriptorError::format(input, "empty name"));
        }

        Ok(Self { namespace: namespace.to_string(), name: name.to_string(), kind })
    }

    /// The namespace part.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The name part.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The definition kind.
    pub fn kind(&self) -> DefKind {
        self.kind
    }

    /// Canonical `namespace:name` form.
    pub fn descriptor_name(&self) -> String {
        format!("{}{}{}", self.namespace, SEPARATOR, self.name)
    }

    /// Qualified `prefix://namespace:name` form.
    pub fn qualified_name(&self) -> String {
        format!("{}{}{}", self.kind.prefix(), PREFIX_SEPARATOR, self.descriptor_name())
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{} ({})", self.namespace, SEPARATOR, self.name, self.kind)
    }
}

fn validate_part(input: &str, part: &str, value: &str) -> Result<(), DescriptorError> {
    if value.is_empty() {
        return Err(DescriptorError::format(input, format!("empty {}", part)));
    }
    if value.contains(SEPARATOR) {
        return Err(DescriptorError::format(
            input,
            format!("{} '{}' contains reserved character '{}'", part, value, SEPARATOR),
        ));
    }
    Ok(())
}
