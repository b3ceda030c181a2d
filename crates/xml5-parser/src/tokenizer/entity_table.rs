use std::collections::HashMap;

/// The predefined general entities.
///
/// `lt` and `amp` are stored as character references so that re-reading the
/// expansion yields the character itself rather than markup.
pub const BUILTIN_ENTITIES: [(&str, &str); 5] = [
    ("lt", "&#60;"),
    ("gt", ">"),
    ("amp", "&#38;"),
    ("apos", "'"),
    ("quot", "\""),
];

/// Most expansions allowed inside one expansion window.
pub const MAX_EXPANSIONS: usize = 16;

/// General and parameter entity definitions for one parse.
///
/// Seeded with [`BUILTIN_ENTITIES`] and extended by `<!ENTITY>` declarations
/// in the internal subset. The first declaration of a name wins.
#[derive(Debug, Clone)]
pub struct EntityTable {
    general: HashMap<String, String>,
    parameter: HashMap<String, String>,
}

impl Default for EntityTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityTable {
    /// A table holding only the predefined entities.
    #[must_use]
    pub fn new() -> Self {
        let general = BUILTIN_ENTITIES
            .iter()
            .map(|&(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self {
            general,
            parameter: HashMap::new(),
        }
    }

    /// Replacement text of a general entity.
    #[must_use]
    pub fn general(&self, name: &str) -> Option<&str> {
        self.general.get(name).map(String::as_str)
    }

    /// Replacement text of a parameter entity.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameter.get(name).map(String::as_str)
    }

    /// Names of all general entities, in no particular order.
    pub fn general_names(&self) -> impl Iterator<Item = &str> {
        self.general.keys().map(String::as_str)
    }

    /// Names of all parameter entities, in no particular order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameter.keys().map(String::as_str)
    }

    /// Declare a general entity. Returns `false` if the name was already
    /// declared, in which case the earlier value is kept.
    pub fn declare_general(&mut self, name: String, value: String) -> bool {
        declare(&mut self.general, name, value)
    }

    /// Declare a parameter entity. Returns `false` if the name was already
    /// declared, in which case the earlier value is kept.
    pub fn declare_parameter(&mut self, name: String, value: String) -> bool {
        declare(&mut self.parameter, name, value)
    }
}

fn declare(map: &mut HashMap<String, String>, name: String, value: String) -> bool {
    if map.contains_key(&name) {
        return false;
    }
    let _ = map.insert(name, value);
    true
}

/// Bounds how many entity expansions can pile up on top of each other.
///
/// A window opens with the first expansion and covers the expanded text. Every
/// expansion made while the window is open widens it by the new text's length.
/// Once the reader has moved past the end of the window, the count starts over.
/// This stops `<!ENTITY a "&a;&a;">` style blowups, but it is a counter, not a
/// true nesting-depth check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionGuard {
    count: usize,
    window_start: usize,
    window_len: usize,
    limit_reported: bool,
}

impl ExpansionGuard {
    /// Record an expansion of `len` characters made at reader `position`.
    ///
    /// Returns `false`, recording nothing, when the window is already full.
    pub const fn admit(&mut self, position: usize, len: usize) -> bool {
        if self.count > 0 && position > self.window_start + self.window_len {
            *self = Self {
                count: 0,
                window_start: 0,
                window_len: 0,
                limit_reported: false,
            };
        }
        if self.count >= MAX_EXPANSIONS {
            return false;
        }
        if self.count == 0 {
            self.window_start = position;
        }
        self.count += 1;
        self.window_len += len;
        true
    }

    /// Whether a refusal in the current window still has to be reported.
    /// Returns `true` once per window.
    pub const fn report_limit(&mut self) -> bool {
        let first = !self.limit_reported;
        self.limit_reported = true;
        first
    }

    /// Expansions counted in the current window.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}
