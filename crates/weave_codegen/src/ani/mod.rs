//! ArkTS bindings over the ANI native interface.
//!
//! Per package this emits the C++ side (`include/<pkg>.ani.hpp` and
//! `temp/<pkg>.ani.cpp` with native entry points and an `ANIRegister`
//! function) and the ArkTS side (`ets/<pkg>.ets`). A single
//! `temp/ani_constructor.cpp` registers every package when the runtime
//! loads the library.

mod analyses;
mod native;
mod sts;

use weave_decl::{EnumItemDecl, PackageGroup};
use weave_driver::{Backend, BackendDescriptor, CompileError, CompilerContext};

use crate::naming::Naming;

pub use analyses::{GlobFuncAniInfo, PackageAniInfo, StsScope, TypeAniInfo, TypeStsInfo};

/// The package the bridge injects for its runtime support types.
pub const RUNTIME_PACKAGE: &str = "weave.runtime";

/// The `ani-bridge` backend.
#[derive(Debug)]
pub struct AniBridgeBackend {
    naming: Naming,
}

impl AniBridgeBackend {
    /// Registry name.
    pub const NAME: &'static str = "ani-bridge";

    /// Creates the backend with the given ArkTS naming convention.
    pub fn new(naming: Naming) -> Self {
        Self { naming }
    }

    /// Registry entry. Accepts the `keep_name` option.
    pub fn descriptor() -> BackendDescriptor {
        BackendDescriptor::new(Self::NAME, |opts| {
            opts.expect_only(&["keep_name"])?;
            let naming = if opts.flag("keep_name")? {
                Naming::Keep
            } else {
                Naming::Camel
            };
            Ok(Box::new(AniBridgeBackend::new(naming)))
        })
        .requires(&["cpp-user"])
        .summary("ArkTS modules and ANI native glue")
    }
}

impl Backend for AniBridgeBackend {
    fn inject(&mut self, pg: &mut PackageGroup) -> Result<(), CompileError> {
        if pg.lookup_package(RUNTIME_PACKAGE).is_some() {
            tracing::debug!(package = RUNTIME_PACKAGE, "runtime package already present");
            return Ok(());
        }
        let runtime = pg.add_synthetic_package(RUNTIME_PACKAGE)?;
        pg.add_enum(
            runtime,
            "Status",
            vec![
                EnumItemDecl {
                    name: "ok".to_string(),
                    value: 0,
                },
                EnumItemDecl {
                    name: "failed".to_string(),
                    value: 1,
                },
            ],
        )?;
        Ok(())
    }

    fn generate(&mut self, ctx: &CompilerContext<'_>) -> Result<(), CompileError> {
        for (id, pkg) in ctx.package_group().packages() {
            native::gen_package(ctx, self.naming, id, pkg)?;
            sts::gen_module(ctx, self.naming, id, pkg)?;
        }
        native::gen_constructor(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_driver::{BackendOptions, OptionValue};

    use crate::testing::{run, run_with, sample};

    #[test]
    fn injects_runtime_package() {
        let out = run(&["ani-bridge"], sample());
        // Every backend of the plan sees the injected package.
        assert!(out.contains_key("include/weave.runtime.abi.h"));
        assert!(out.contains_key("include/weave.runtime.Status.proj.1.hpp"));
        assert!(out.contains_key("ets/weave.runtime.ets"));
    }

    #[test]
    fn does_not_inject_twice() {
        let mut pg = sample();
        pg.add_package(RUNTIME_PACKAGE).unwrap();
        let out = run(&["ani-bridge"], pg);
        assert!(!out.contains_key("include/weave.runtime.Status.proj.1.hpp"));
    }

    #[test]
    fn keep_name_option() {
        let mut opts = BackendOptions::new("ani-bridge");
        opts.set("keep_name", OptionValue::Bool(true));
        let mut pg = sample();
        let geo = pg.lookup_package("geo").unwrap();
        pg.add_function(geo, "clear_all", vec![], None).unwrap();

        let kept = run_with(&["ani-bridge"], pg.clone(), vec![opts]);
        assert!(kept["ets/geo.ets"].contains("export function clear_all(): void {"));

        let camel = run(&["ani-bridge"], pg);
        assert!(camel["ets/geo.ets"].contains("export function clearAll(): void {"));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut opts = BackendOptions::new("ani-bridge");
        opts.set("keep_names", OptionValue::Bool(true));
        let err = AniBridgeBackend::descriptor().construct(&opts).err().unwrap();
        assert!(err.to_string().contains("keep_names"));
    }

    #[test]
    fn keep_name_must_be_boolean() {
        let mut opts = BackendOptions::new("ani-bridge");
        opts.set("keep_name", OptionValue::Str("yes".to_string()));
        let err = AniBridgeBackend::descriptor().construct(&opts).err().unwrap();
        assert!(err.to_string().contains("expected a boolean"));
    }
}
