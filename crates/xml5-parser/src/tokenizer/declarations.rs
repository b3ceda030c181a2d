//! In-progress DOCTYPE declarations and the attribute-default table.

use super::token::Attribute;

/// Which table an `<!ENTITY>` declaration goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// `<!ENTITY name "value">`, referenced as `&name;` in content.
    General,
    /// `<!ENTITY % name "value">`, referenced as `%name;` in the internal subset.
    Parameter,
}

/// An `<!ENTITY>` declaration being read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDeclaration {
    /// General or parameter.
    pub kind: EntityKind,
    /// The declared name.
    pub name: String,
    /// The literal value with character references already resolved.
    pub value: String,
}

impl EntityDeclaration {
    /// Start a declaration whose name begins with `first`.
    #[must_use]
    pub fn new(kind: EntityKind, first: char) -> Self {
        Self {
            kind,
            name: String::from(first),
            value: String::new(),
        }
    }
}

/// One attribute definition inside an `<!ATTLIST>` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeDefinition {
    /// The attribute name.
    pub name: String,
    /// The declared type, e.g. `CDATA` or `ID`. Recorded, not enforced.
    pub kind: String,
    /// The default value; empty when none was given.
    pub default_value: String,
}

/// An `<!ATTLIST element ...>` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttlistDeclaration {
    /// The element the definitions apply to.
    pub element: String,
    /// Definitions in declaration order.
    pub attributes: Vec<AttributeDefinition>,
}

/// Every ATTLIST declaration seen so far, consulted when a tag is emitted.
#[derive(Debug, Clone, Default)]
pub struct AttributeDefaults {
    declarations: Vec<AttlistDeclaration>,
}

impl AttributeDefaults {
    /// Start a new declaration for the element whose name begins with `first`.
    pub fn start_declaration(&mut self, first: char) {
        self.declarations.push(AttlistDeclaration {
            element: String::from(first),
            attributes: Vec::new(),
        });
    }

    /// The declaration currently being read.
    pub fn current_mut(&mut self) -> Option<&mut AttlistDeclaration> {
        self.declarations.last_mut()
    }

    /// The definition currently being read.
    pub fn current_definition_mut(&mut self) -> Option<&mut AttributeDefinition> {
        self.current_mut()
            .and_then(|declaration| declaration.attributes.last_mut())
    }

    /// Start a new attribute definition whose name begins with `first`.
    pub fn start_definition(&mut self, first: char) {
        if let Some(declaration) = self.current_mut() {
            declaration.attributes.push(AttributeDefinition {
                name: String::from(first),
                ..AttributeDefinition::default()
            });
        }
    }

    /// All declarations, in the order they appeared.
    #[must_use]
    pub fn declarations(&self) -> &[AttlistDeclaration] {
        &self.declarations
    }

    /// Append the declared defaults for `element` that `attributes` lacks.
    ///
    /// Definitions with an empty default are skipped. An attribute that is
    /// already present, explicitly or from an earlier declaration, is kept.
    pub fn apply(&self, element: &str, attributes: &mut Vec<Attribute>) {
        for declaration in self.declarations.iter().filter(|d| d.element == element) {
            for definition in &declaration.attributes {
                if definition.default_value.is_empty()
                    || attributes.iter().any(|attr| attr.name == definition.name)
                {
                    continue;
                }
                attributes.push(Attribute::new(
                    definition.name.clone(),
                    definition.default_value.clone(),
                ));
            }
        }
    }
}
