//! Symbol mangling for the C ABI.
//!
//! A mangled name is `_weave_`, then every segment prefixed with its byte
//! length, then a tag for the kind of declaration:
//! `geo.shapes.area` as a function is `_weave_3geo6shapes4area_f`.
//! Length prefixes make the encoding injective, so distinct declarations
//! never share a symbol.

/// What a mangled symbol names.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeclKind {
    /// A global function exported through the ABI.
    Func,
    /// A struct type.
    Type,
    /// A native function registered with the ArkTS runtime.
    AniFunc,
    /// A package, as the alias ArkTS modules import it under.
    Module,
}

impl DeclKind {
    fn tag(self) -> &'static str {
        match self {
            DeclKind::Func => "f",
            DeclKind::Type => "t",
            DeclKind::AniFunc => "ani",
            DeclKind::Module => "m",
        }
    }
}

/// Mangles a qualified name.
pub fn encode<S: AsRef<str>>(segments: &[S], kind: DeclKind) -> String {
    let mut out = String::from("_weave_");
    for segment in segments {
        let segment = segment.as_ref();
        out.push_str(&segment.len().to_string());
        out.push_str(segment);
    }
    out.push('_');
    out.push_str(kind.tag());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_symbol() {
        assert_eq!(encode(&["geo", "f"], DeclKind::Func), "_weave_3geo1f_f");
        assert_eq!(
            encode(&["geo", "shapes", "area"], DeclKind::Func),
            "_weave_3geo6shapes4area_f"
        );
    }

    #[test]
    fn kinds_do_not_collide() {
        let segs = ["geo", "Point"];
        assert_ne!(encode(&segs, DeclKind::Func), encode(&segs, DeclKind::Type));
        assert_ne!(encode(&segs, DeclKind::Func), encode(&segs, DeclKind::AniFunc));
    }

    #[test]
    fn segment_boundaries_matter() {
        assert_ne!(
            encode(&["ab", "c"], DeclKind::Func),
            encode(&["a", "bc"], DeclKind::Func)
        );
    }
}
