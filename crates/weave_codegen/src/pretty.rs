//! Human-readable dump of the declaration graph, for debugging loaders and
//! injecting backends.

use weave_decl::{PackageDecl, PackageGroup};
use weave_driver::{Backend, BackendDescriptor, CompileError, CompilerContext};
use weave_output::{OutputWriter, TextWriter};

/// The `pretty-print` backend: writes `debug/<pkg>.weave.txt`.
pub struct PrettyPrintBackend;

impl PrettyPrintBackend {
    /// Registry name.
    pub const NAME: &'static str = "pretty-print";

    /// Registry entry.
    pub fn descriptor() -> BackendDescriptor {
        BackendDescriptor::new(Self::NAME, |opts| {
            opts.expect_only(&[])?;
            Ok(Box::new(PrettyPrintBackend))
        })
        .summary("dump of every package's declarations")
    }
}

impl Backend for PrettyPrintBackend {
    fn generate(&mut self, ctx: &CompilerContext<'_>) -> Result<(), CompileError> {
        let pg = ctx.package_group();
        for (_, pkg) in pg.packages() {
            ctx.outputs()
                .write::<TextWriter, _, CompileError>(&format!("debug/{}.weave.txt", pkg.name), |w| {
                    print_package(w, pg, pkg);
                    Ok(())
                })?;
        }
        Ok(())
    }
}

fn print_package(w: &mut TextWriter, pg: &PackageGroup, pkg: &PackageDecl) {
    if pkg.synthetic {
        w.writeln(&format!("package {}  // synthetic", pkg.name));
    } else {
        w.writeln(&format!("package {}", pkg.name));
    }

    for &sid in &pkg.structs {
        let decl = pg.struct_decl(sid);
        w.newline();
        w.indented(&format!("struct {} {{", decl.name), "}", |w| {
            for field in &decl.fields {
                w.writeln(&format!("{}: {}", field.name, pg.type_spelling(&field.ty)));
            }
        });
    }

    for &eid in &pkg.enums {
        let decl = pg.enum_decl(eid);
        w.newline();
        w.indented(&format!("enum {} {{", decl.name), "}", |w| {
            for item in &decl.items {
                w.writeln(&format!("{} = {}", item.name, item.value));
            }
        });
    }

    if !pkg.functions.is_empty() {
        w.newline();
    }
    for &fid in &pkg.functions {
        let decl = pg.function(fid);
        let params = decl
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, pg.type_spelling(&p.ty)))
            .collect::<Vec<_>>()
            .join(", ");
        match &decl.return_ty {
            Some(ret) => w.writeln(&format!(
                "fn {}({params}) -> {}",
                decl.name,
                pg.type_spelling(ret)
            )),
            None => w.writeln(&format!("fn {}({params})", decl.name)),
        }
    }
}
