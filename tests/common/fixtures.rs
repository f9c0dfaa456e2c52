//! Source-model fixture generators for integration tests.
#![allow(dead_code)]

use coderank::domain::model::{
    MethodDecl, PackageDecl, PropertyDecl, SourceModel, TypeDecl, TypeDeclKind, TypeRef,
};

pub fn class(name: &str) -> TypeDecl {
    TypeDecl {
        name: name.into(),
        kind: TypeDeclKind::Class,
        is_abstract: false,
        extends: vec![],
        methods: vec![],
        properties: vec![],
    }
}

pub fn abstract_class(name: &str) -> TypeDecl {
    TypeDecl {
        is_abstract: true,
        ..class(name)
    }
}

pub fn interface(name: &str) -> TypeDecl {
    TypeDecl {
        kind: TypeDeclKind::Interface,
        is_abstract: true,
        ..class(name)
    }
}

pub fn extending(mut ty: TypeDecl, parent: TypeRef) -> TypeDecl {
    ty.extends.push(parent);
    ty
}

pub fn with_method_refs(mut ty: TypeDecl, name: &str, references: Vec<TypeRef>) -> TypeDecl {
    ty.methods.push(MethodDecl {
        name: name.into(),
        return_type: None,
        throws: vec![],
        references,
    });
    ty
}

pub fn with_property(mut ty: TypeDecl, name: &str, declared_type: TypeRef) -> TypeDecl {
    ty.properties.push(PropertyDecl {
        name: name.into(),
        declared_type: Some(declared_type),
    });
    ty
}

pub fn package(name: &str, types: Vec<TypeDecl>) -> PackageDecl {
    PackageDecl {
        name: name.into(),
        types,
        functions: vec![],
    }
}

/// One package, `Bar extends Foo`, nothing else.
pub fn bar_extends_foo() -> SourceModel {
    SourceModel {
        packages: vec![package(
            "app",
            vec![
                class("Foo"),
                extending(class("Bar"), TypeRef::new("app", "Foo")),
            ],
        )],
    }
}

/// Five types in one package forming an inheritance/usage chain:
/// `BList extends BCollection`, `AbstractList extends BList`,
/// `ArrayList extends AbstractList`, and `Order` uses `BList` from one
/// method.
pub fn collection_model() -> SourceModel {
    let pkg = "collections";
    SourceModel {
        packages: vec![package(
            pkg,
            vec![
                interface("BCollection"),
                extending(interface("BList"), TypeRef::new(pkg, "BCollection")),
                extending(abstract_class("AbstractList"), TypeRef::new(pkg, "BList")),
                extending(class("ArrayList"), TypeRef::new(pkg, "AbstractList")),
                with_method_refs(class("Order"), "store", vec![TypeRef::new(pkg, "BList")]),
            ],
        )],
    }
}

/// Mutual package dependency without a type-level cycle:
/// `p1::A -> p2::B` and `p2::C -> p1::D`.
pub fn package_cycle_model() -> SourceModel {
    SourceModel {
        packages: vec![
            package(
                "p1",
                vec![
                    with_method_refs(class("A"), "use_b", vec![TypeRef::new("p2", "B")]),
                    class("D"),
                ],
            ),
            package(
                "p2",
                vec![
                    class("B"),
                    with_method_refs(class("C"), "use_d", vec![TypeRef::new("p1", "D")]),
                ],
            ),
        ],
    }
}

/// `m::A` references `lib::B` once or twice plus `lib::C` once; the extra
/// occurrence changes rank denominators but never the coupling counts.
pub fn multiplicity_model(double_reference: bool) -> SourceModel {
    let mut references = vec![TypeRef::new("lib", "B")];
    if double_reference {
        references.push(TypeRef::new("lib", "B"));
    }
    references.push(TypeRef::new("lib", "C"));

    SourceModel {
        packages: vec![
            package("m", vec![with_method_refs(class("A"), "run", references)]),
            package("lib", vec![class("B"), class("C")]),
        ],
    }
}

/// `core` sits exactly on the main sequence: one abstract and one concrete
/// type (A = 0.5), one afferent and one efferent package (I = 0.5).
pub fn balanced_package_model() -> SourceModel {
    SourceModel {
        packages: vec![
            package(
                "client",
                vec![with_method_refs(
                    class("User"),
                    "call",
                    vec![TypeRef::new("core", "Service")],
                )],
            ),
            package(
                "core",
                vec![
                    interface("Service"),
                    with_method_refs(class("Impl"), "help", vec![TypeRef::new("ext", "Helper")]),
                ],
            ),
            package("ext", vec![class("Helper")]),
        ],
    }
}

/// A package that declares no types next to one that does.
pub fn empty_package_model() -> SourceModel {
    SourceModel {
        packages: vec![
            package("void", vec![]),
            package("full", vec![class("Thing")]),
        ],
    }
}
