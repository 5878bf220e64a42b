//! Code generation backends for the Weave bindings compiler.
//!
//! Every backend emits one category of files for every package of the
//! declaration graph:
//!
//! | Backend        | Requires      | Output                                         |
//! |----------------|---------------|------------------------------------------------|
//! | `abi-header`   |               | `include/<pkg>.abi.h`, per-struct ABI headers  |
//! | `abi-source`   | `abi-header`  | `temp/<pkg>.abi.c` weak fallback definitions   |
//! | `c-impl`       | `abi-header`  | `include/<pkg>.impl.h`, `temp/<pkg>.impl.c`    |
//! | `cpp-common`   | `abi-header`  | `include/<pkg>.proj.hpp`, C++ type projections |
//! | `cpp-user`     | `cpp-common`  | `include/<pkg>.user.hpp` inline call wrappers  |
//! | `cpp-author`   | `cpp-common`  | `include/<pkg>.impl.hpp`, `temp/<pkg>.impl.cpp`|
//! | `ani-bridge`   | `cpp-user`    | ANI glue under `include/`, `temp/`, `ets/`     |
//! | `pretty-print` |               | `debug/<pkg>.weave.txt`                        |
//!
//! Names that several backends must agree on (mangled symbols, header paths,
//! type spellings) are computed by analyses and shared through the run's
//! [`AnalysisManager`](weave_analysis::AnalysisManager).

#![warn(missing_docs)]

pub mod abi;
pub mod ani;
pub mod c_impl;
pub mod cpp;
pub mod mangle;
pub mod naming;
pub mod pretty;

use weave_driver::{BackendRegistry, DriverError};

/// Builds a registry holding every backend of this crate.
pub fn default_registry() -> Result<BackendRegistry, DriverError> {
    let mut registry = BackendRegistry::new();
    for descriptor in [
        abi::AbiHeaderBackend::descriptor(),
        abi::AbiSourceBackend::descriptor(),
        c_impl::CImplBackend::descriptor(),
        cpp::CppCommonBackend::descriptor(),
        cpp::CppUserBackend::descriptor(),
        cpp::CppAuthorBackend::descriptor(),
        ani::AniBridgeBackend::descriptor(),
        pretty::PrettyPrintBackend::descriptor(),
    ] {
        registry.register(descriptor)?;
    }
    registry.validate()?;
    Ok(registry)
}

/// Registry entries with their dependencies, for `weave backends`.
pub fn describe(registry: &BackendRegistry) -> Vec<(String, Vec<String>, String)> {
    registry
        .descriptors()
        .map(|d| {
            (
                d.name().to_string(),
                d.dependencies().to_vec(),
                d.description().to_string(),
            )
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;

    use weave_decl::{EnumItemDecl, PackageGroup, ParamDecl, ScalarKind, StructFieldDecl, Type};
    use weave_driver::{BackendOptions, CompilerInstance, CompilerOptions};

    /// Package `geo`: struct `Point { x: f64, y: f64 }`, enum
    /// `Color { red = 0, green = 1 }` and three functions.
    pub fn sample() -> PackageGroup {
        let f64 = Type::Scalar(ScalarKind::F64);
        let mut pg = PackageGroup::new();
        let geo = pg.add_package("geo").unwrap();
        let point = pg
            .add_struct(
                geo,
                "Point",
                vec![
                    StructFieldDecl::new("x", f64.clone()),
                    StructFieldDecl::new("y", f64.clone()),
                ],
            )
            .unwrap();
        let color = pg
            .add_enum(
                geo,
                "Color",
                vec![
                    EnumItemDecl { name: "red".to_string(), value: 0 },
                    EnumItemDecl { name: "green".to_string(), value: 1 },
                ],
            )
            .unwrap();
        pg.add_function(geo, "area", vec![ParamDecl::new("p", Type::Struct(point))], Some(f64))
            .unwrap();
        pg.add_function(
            geo,
            "tint",
            vec![
                ParamDecl::new("c", Type::Enum(color)),
                ParamDecl::new("name", Type::String),
            ],
            Some(Type::Optional(Box::new(Type::String))),
        )
        .unwrap();
        pg.add_function(geo, "reset", vec![], None).unwrap();
        pg
    }

    /// Runs `backends` in memory and returns every file by path.
    pub fn run(backends: &[&str], pg: PackageGroup) -> BTreeMap<String, String> {
        run_with(backends, pg, Vec::new())
    }

    /// Like [`run`], with per-backend options.
    pub fn run_with(
        backends: &[&str],
        pg: PackageGroup,
        options: Vec<BackendOptions>,
    ) -> BTreeMap<String, String> {
        let registry = super::default_registry().unwrap();
        let options = CompilerOptions {
            backends: backends.iter().map(|b| b.to_string()).collect(),
            output_dir: None,
            backend_options: options
                .into_iter()
                .map(|o| (o.backend().to_string(), o))
                .collect(),
        };
        let mut instance = CompilerInstance::new(&registry, pg, options);
        instance.run().unwrap();
        let om = instance.outputs();
        om.paths()
            .into_iter()
            .map(|p| {
                let text = om.contents(&p).unwrap();
                (p, text)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_is_valid() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.len(), 8);
        let plan = registry
            .collect_required_backends(&["ani-bridge", "cpp-user"])
            .unwrap();
        let names: Vec<_> = plan.iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec!["abi-header", "cpp-common", "cpp-user", "ani-bridge"]
        );
    }

    #[test]
    fn describe_lists_dependencies() {
        let registry = default_registry().unwrap();
        let rows = describe(&registry);
        let author = rows.iter().find(|(n, _, _)| n == "cpp-author").unwrap();
        assert_eq!(author.1, vec!["cpp-common"]);
        assert!(!author.2.is_empty());
    }
}
