//! Utilities for deriving theme descriptors by naming convention.
//!
//! Both functions are purely syntactic: they never look anything up, so the
//! derived theme may or may not exist in a registry.

use crate::descriptor::{DefKind, Descriptor, DescriptorError};

/// Suffix appended to a namespace to name its default theme.
pub const DEFAULT_THEME_SUFFIX: &str = "Theme";

/// The theme sitting next to a style: same namespace, same name.
///
/// ```
/// use bundlec::descriptor::{DefKind, Descriptor};
/// use bundlec::themes::local_theme_of;
///
/// let style = Descriptor::parse("myns:Card", DefKind::Style).unwrap();
/// let theme = local_theme_of(&style).unwrap();
/// assert_eq!(theme.descriptor_name(), "myns:Card");
/// assert_eq!(theme.kind(), DefKind::Theme);
/// ```
pub fn local_theme_of(style: &Descriptor) -> Result<Descriptor, DescriptorError> {
    require_namespace(style)?;
    Descriptor::new(style.namespace(), style.name(), DefKind::Theme)
}

/// The fallback theme of a descriptor's namespace, named `<namespace>Theme`.
pub fn namespace_default_theme_of(descriptor: &Descriptor) -> Result<Descriptor, DescriptorError> {
    require_namespace(descriptor)?;
    let namespace = descriptor.namespace();
    Descriptor::new(namespace, format!("{}{}", namespace, DEFAULT_THEME_SUFFIX), DefKind::Theme)
}

fn require_namespace(descriptor: &Descriptor) -> Result<(), DescriptorError> {
    if descriptor.namespace().trim().is_empty() {
        return Err(DescriptorError::MalformedNamespace {
            descriptor: descriptor.descriptor_name(),
        });
    }
    Ok(())
}
