//! ArkTS naming conventions.

/// How declaration names are spelled on the ArkTS side.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Naming {
    /// `snake_case` functions become `lowerCamelCase`, types `UpperCamelCase`.
    #[default]
    Camel,
    /// Names are kept exactly as declared.
    Keep,
}

impl Naming {
    /// Spells a function name.
    pub fn as_func(self, name: &str) -> String {
        match self {
            Naming::Camel => camel(name, false),
            Naming::Keep => name.to_string(),
        }
    }

    /// Spells a type name.
    pub fn as_type(self, name: &str) -> String {
        match self {
            Naming::Camel => camel(name, true),
            Naming::Keep => name.to_string(),
        }
    }
}

fn camel(name: &str, upper_first: bool) -> String {
    // Leading underscores mark private names and are kept.
    let body = name.trim_start_matches('_');
    let mut out = String::from(&name[..name.len() - body.len()]);
    for (i, word) in body.split('_').filter(|w| !w.is_empty()).enumerate() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 && !upper_first {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}
