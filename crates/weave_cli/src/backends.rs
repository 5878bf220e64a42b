//! `weave backends`: lists the registry.

use std::error::Error;

use weave_codegen::{default_registry, describe};

use crate::GlobalArgs;

/// Runs the `weave backends` command.
pub fn run(_global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let registry = default_registry()?;
    for line in render(&describe(&registry)) {
        println!("{line}");
    }
    Ok(0)
}

/// One line per backend: name, summary and the backends it requires.
fn render(entries: &[(String, Vec<String>, String)]) -> Vec<String> {
    let width = entries.iter().map(|(name, _, _)| name.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|(name, deps, summary)| {
            let line = format!("{name:<width$}  {summary}");
            if deps.is_empty() {
                line
            } else {
                format!("{line} (requires {})", deps.join(", "))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_aligned() {
        let entries = vec![
            ("abi-header".to_string(), vec![], "C ABI headers".to_string()),
            (
                "cpp-user".to_string(),
                vec!["cpp-common".to_string()],
                "C++ wrappers".to_string(),
            ),
        ];
        assert_eq!(
            render(&entries),
            vec![
                "abi-header  C ABI headers",
                "cpp-user    C++ wrappers (requires cpp-common)",
            ]
        );
    }

    #[test]
    fn every_registered_backend_is_listed() {
        let registry = default_registry().unwrap();
        let lines = render(&describe(&registry));
        assert_eq!(lines.len(), registry.len());
        assert!(lines
            .iter()
            .any(|l| l.starts_with("ani-bridge") && l.ends_with("(requires cpp-user)")));
    }
}
