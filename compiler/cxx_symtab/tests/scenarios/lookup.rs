//! Lookup scenarios: scopes, bases, directives and declarations.

use cxx_symtab::{
    Access, InvalidUse, ParentEdge, PtrOpKind, SymbolTable, SymbolTableError, TableOptions,
    TypeFlags, TypeKind,
};
use pretty_assertions::assert_eq;

use crate::common::{char_, class, function, int, named, namespace, unit, variable};

#[test]
fn declarations_are_found_from_their_scope() {
    let (mut table, root) = unit();
    let x = variable(&mut table, root, "x", int());

    assert_eq!(table.lookup(root, "x").unwrap(), Some(x));
    assert_eq!(table.symbol(x).name(), table.intern("x"));
    assert_eq!(table.symbol(x).container(), Some(root));
}

#[test]
fn nested_scopes_hide_outer_declarations() {
    // int a; namespace N { char a; void f() { a; } }
    let (mut table, root) = unit();
    variable(&mut table, root, "a", int());
    let n = namespace(&mut table, root, "N");
    let inner = variable(&mut table, n, "a", char_());
    let f = function(&mut table, n, "f", &[]);

    assert_eq!(table.lookup(f, "a").unwrap(), Some(inner));
}

#[test]
fn members_of_a_base_class() {
    // class A { int x; }; class B : public A { void f() { x; } };
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let x = variable(&mut table, a, "x", int());
    let b = class(&mut table, root, "B");
    table.add_parent(b, a).unwrap();
    let f = function(&mut table, b, "f", &[]);

    assert_eq!(table.lookup(f, "x").unwrap(), Some(x));
    assert_eq!(table.qualified_lookup(b, "x").unwrap(), Some(x));
}

#[test]
fn derived_declaration_hides_base_member() {
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    variable(&mut table, a, "x", int());
    let b = class(&mut table, root, "B");
    table.add_parent(b, a).unwrap();
    let own = variable(&mut table, b, "x", char_());

    assert_eq!(table.lookup(b, "x").unwrap(), Some(own));
}

#[test]
fn ambiguous_member_of_two_bases() {
    // class A { int x; }; class B { int x; }; class C : A, B {};
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    variable(&mut table, a, "x", int());
    let b = class(&mut table, root, "B");
    variable(&mut table, b, "x", int());
    let c = class(&mut table, root, "C");
    table.add_parent(c, a).unwrap();
    table.add_parent(c, b).unwrap();

    let err = table.lookup(c, "x").unwrap_err();
    assert!(err.is_ambiguous());
    assert_eq!(err.candidates().len(), 2);
}

#[test]
fn circular_inheritance_is_reported() {
    let options = TableOptions {
        eager_cycle_check: false,
        ..TableOptions::default()
    };
    let mut table = SymbolTable::with_options(options);
    let root = table.compilation_unit();
    let a = class(&mut table, root, "A");
    let b = class(&mut table, root, "B");
    let c = class(&mut table, root, "C");
    table.add_parent(a, b).unwrap();
    table.add_parent(b, c).unwrap();
    table.add_parent(c, a).unwrap();
    table.intern("x");

    let err = table.lookup(a, "x").unwrap_err();
    assert!(matches!(err, SymbolTableError::CircularInheritance { .. }));
}

#[test]
fn eager_check_rejects_the_closing_edge() {
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let b = class(&mut table, root, "B");
    let c = class(&mut table, root, "C");
    table.add_parent(a, b).unwrap();
    table.add_parent(b, c).unwrap();

    let err = table.add_parent(c, a).unwrap_err();
    assert_eq!(err, SymbolTableError::CircularInheritance { symbol: a });
}

#[test]
fn virtual_base_members_are_not_ambiguous() {
    // class L { int x; }; class A : virtual L {}; class B : virtual L {};
    // class C : A, B {}; class D : C, virtual L {};
    let (mut table, root) = unit();
    let l = class(&mut table, root, "L");
    let x = variable(&mut table, l, "x", int());
    let virtual_l = ParentEdge {
        base: l,
        is_virtual: true,
        access: Access::Public,
    };
    let a = class(&mut table, root, "A");
    table.add_parent_edge(a, virtual_l).unwrap();
    let b = class(&mut table, root, "B");
    table.add_parent_edge(b, virtual_l).unwrap();
    let c = class(&mut table, root, "C");
    table.add_parent(c, a).unwrap();
    table.add_parent(c, b).unwrap();
    let d = class(&mut table, root, "D");
    table.add_parent(d, c).unwrap();
    table.add_parent_edge(d, virtual_l).unwrap();

    assert_eq!(table.lookup(c, "x").unwrap(), Some(x));
    assert_eq!(table.lookup(d, "x").unwrap(), Some(x));
}

#[test]
fn stacked_virtual_diamonds_are_searched_once() {
    // class L0 { int m; };
    // class Ai : virtual L(i-1) {}; class Bi : virtual L(i-1) {}; class Li : Ai, Bi {};
    let (mut table, root) = unit();
    let mut below = class(&mut table, root, "L0");
    let m = variable(&mut table, below, "m", int());
    for level in 1..=48 {
        let virtual_below = ParentEdge {
            base: below,
            is_virtual: true,
            access: Access::Public,
        };
        let left = class(&mut table, root, &format!("A{level}"));
        table.add_parent_edge(left, virtual_below).unwrap();
        let right = class(&mut table, root, &format!("B{level}"));
        table.add_parent_edge(right, virtual_below).unwrap();
        let joined = class(&mut table, root, &format!("L{level}"));
        table.add_parent(joined, left).unwrap();
        table.add_parent(joined, right).unwrap();
        below = joined;
    }

    assert_eq!(table.lookup(below, "m").unwrap(), Some(m));
    assert_eq!(table.qualified_lookup(below, "m").unwrap(), Some(m));
}

#[test]
fn mixed_virtual_and_plain_base_is_ambiguous() {
    // class A : virtual L {}; class B : L {}; class C : A, B {};
    let (mut table, root) = unit();
    let l = class(&mut table, root, "L");
    variable(&mut table, l, "x", int());
    let a = class(&mut table, root, "A");
    table
        .add_parent_edge(
            a,
            ParentEdge {
                base: l,
                is_virtual: true,
                access: Access::Public,
            },
        )
        .unwrap();
    let b = class(&mut table, root, "B");
    table.add_parent(b, l).unwrap();
    let c = class(&mut table, root, "C");
    table.add_parent(c, a).unwrap();
    table.add_parent(c, b).unwrap();

    assert!(table.lookup(c, "x").unwrap_err().is_ambiguous());
}

#[test]
fn static_members_and_enumerators_through_repeated_bases() {
    // class L { static int x; enum { e }; typedef int T; int y; };
    // class A : L {}; class B : L {}; class C : A, B {};
    let (mut table, root) = unit();
    let l = class(&mut table, root, "L");
    let x = variable(&mut table, l, "x", int().with_flags(TypeFlags::STATIC));
    let anonymous = table.new_scope_symbol("", TypeKind::Enumeration);
    table.add_symbol(l, anonymous).unwrap();
    let e = table.new_symbol("e", TypeKind::Undef);
    table.add_symbol(anonymous, e).unwrap();
    let t = variable(&mut table, l, "T", int().with_flags(TypeFlags::TYPEDEF));
    variable(&mut table, l, "y", int());
    let a = class(&mut table, root, "A");
    table.add_parent(a, l).unwrap();
    let b = class(&mut table, root, "B");
    table.add_parent(b, l).unwrap();
    let c = class(&mut table, root, "C");
    table.add_parent(c, a).unwrap();
    table.add_parent(c, b).unwrap();

    assert_eq!(table.lookup(c, "x").unwrap(), Some(x));
    assert_eq!(table.lookup(c, "e").unwrap(), Some(e));
    assert_eq!(table.lookup(c, "T").unwrap(), Some(t));
    assert!(table.lookup(c, "y").unwrap_err().is_ambiguous());
}

#[test]
fn elaborated_lookup_finds_hidden_tags() {
    // struct stat {}; int stat(); enum E {}; void f() { int E; struct stat* p; enum E e; }
    let (mut table, root) = unit();
    let tag = table.new_inheritable_scope_symbol("stat", TypeKind::Struct);
    table.add_symbol(root, tag).unwrap();
    let function_stat = function(&mut table, root, "stat", &[]);
    let enumeration = table.new_scope_symbol("E", TypeKind::Enumeration);
    table.add_symbol(root, enumeration).unwrap();
    let f = function(&mut table, root, "f", &[]);
    let local = variable(&mut table, f, "E", int());

    assert_eq!(table.lookup(f, "stat").unwrap(), Some(function_stat));
    assert_eq!(
        table.elaborated_lookup(f, TypeKind::Struct, "stat").unwrap(),
        Some(tag)
    );
    assert_eq!(table.lookup(f, "E").unwrap(), Some(local));
    assert_eq!(
        table
            .elaborated_lookup(f, TypeKind::Enumeration, "E")
            .unwrap(),
        Some(enumeration)
    );
    assert_eq!(
        table.elaborated_lookup(f, TypeKind::Union, "stat").unwrap(),
        None
    );
}

#[test]
fn function_hides_class_in_nested_scope() {
    // class A {}; namespace N { void A(); void g() { A; } }
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let n = namespace(&mut table, root, "N");
    let function_a = function(&mut table, n, "A", &[]);
    let g = function(&mut table, n, "g", &[]);

    assert_eq!(table.lookup(g, "A").unwrap(), Some(function_a));
    assert_eq!(table.elaborated_lookup(g, TypeKind::Class, "A").unwrap(), Some(a));
    assert_eq!(table.lookup_nested_name_specifier(g, "A").unwrap(), Some(a));
}

#[test]
fn using_directive_makes_members_visible() {
    // namespace A { int x; } void f() { using namespace A; x; }
    let (mut table, root) = unit();
    let a = namespace(&mut table, root, "A");
    let x = variable(&mut table, a, "x", int());
    let f = function(&mut table, root, "f", &[]);

    assert_eq!(table.lookup(f, "x").unwrap(), None);
    table.add_using_directive(f, a).unwrap();
    assert_eq!(table.lookup(f, "x").unwrap(), Some(x));
}

#[test]
fn using_directives_are_transitive() {
    // namespace C { int x; } namespace B { using namespace C; }
    // namespace A { using namespace B; } using namespace A;
    let (mut table, root) = unit();
    let c = namespace(&mut table, root, "C");
    let x = variable(&mut table, c, "x", int());
    let b = namespace(&mut table, root, "B");
    table.add_using_directive(b, c).unwrap();
    let a = namespace(&mut table, root, "A");
    table.add_using_directive(a, b).unwrap();
    table.add_using_directive(root, a).unwrap();

    assert_eq!(table.lookup(root, "x").unwrap(), Some(x));
    assert_eq!(table.qualified_lookup(a, "x").unwrap(), Some(x));
}

#[test]
fn same_declaration_through_two_directives() {
    // namespace A { int x; } namespace B { using namespace A; }
    // namespace C { using namespace A; } using namespace B; using namespace C;
    let (mut table, root) = unit();
    let a = namespace(&mut table, root, "A");
    let x = variable(&mut table, a, "x", int());
    let b = namespace(&mut table, root, "B");
    table.add_using_directive(b, a).unwrap();
    let c = namespace(&mut table, root, "C");
    table.add_using_directive(c, a).unwrap();
    let d = namespace(&mut table, root, "D");
    table.add_using_directive(d, b).unwrap();
    table.add_using_directive(d, c).unwrap();

    assert_eq!(table.qualified_lookup(d, "x").unwrap(), Some(x));
    let f = function(&mut table, d, "f", &[]);
    assert_eq!(table.lookup(f, "x").unwrap(), Some(x));
}

#[test]
fn qualified_lookup_through_directives_stops_at_declaring_namespace() {
    // namespace A { int i; } namespace B { int i; using namespace A; }
    // namespace C { using namespace B; }   C::i is B::i
    let (mut table, root) = unit();
    let a = namespace(&mut table, root, "A");
    variable(&mut table, a, "i", int());
    let b = namespace(&mut table, root, "B");
    let b_i = variable(&mut table, b, "i", int());
    table.add_using_directive(b, a).unwrap();
    let c = namespace(&mut table, root, "C");
    table.add_using_directive(c, b).unwrap();

    assert_eq!(table.qualified_lookup(c, "i").unwrap(), Some(b_i));
}

#[test]
fn mutual_directives_terminate() {
    // namespace A { using namespace B; int a; } namespace B { using namespace A; int b; }
    let (mut table, root) = unit();
    let a = namespace(&mut table, root, "A");
    let b = namespace(&mut table, root, "B");
    table.add_using_directive(a, b).unwrap();
    table.add_using_directive(b, a).unwrap();
    let in_a = variable(&mut table, a, "a", int());
    let in_b = variable(&mut table, b, "b", int());
    table.intern("c");

    assert_eq!(table.qualified_lookup(a, "b").unwrap(), Some(in_b));
    assert_eq!(table.qualified_lookup(b, "a").unwrap(), Some(in_a));
    assert_eq!(table.qualified_lookup(a, "c").unwrap(), None);
    let f = function(&mut table, a, "f", &[]);
    assert_eq!(table.lookup(f, "b").unwrap(), Some(in_b));
    assert_eq!(table.lookup(f, "c").unwrap(), None);
}

#[test]
fn namespace_member_hides_nominated_overloads() {
    // namespace A { void f(int); } namespace B { void f(char); using namespace A; }
    // B::f(1) calls B::f(char)
    let (mut table, root) = unit();
    let a = namespace(&mut table, root, "A");
    function(&mut table, a, "f", &[int()]);
    let b = namespace(&mut table, root, "B");
    let b_f = function(&mut table, b, "f", &[char_()]);
    table.add_using_directive(b, a).unwrap();

    assert_eq!(table.qualified_lookup(b, "f").unwrap(), Some(b_f));
    assert_eq!(
        table.member_function_lookup(b, "f", Some(&[int()])).unwrap(),
        Some(b_f)
    );
}

#[test]
fn definition_lookup_ignores_outer_scopes_and_directives() {
    // namespace N { void f(); int x; } namespace M { int y; } N::f definition
    let (mut table, root) = unit();
    let n = namespace(&mut table, root, "N");
    let f = function(&mut table, n, "f", &[]);
    variable(&mut table, root, "g", int());
    let m = namespace(&mut table, root, "M");
    variable(&mut table, m, "y", int());
    table.add_using_directive(n, m).unwrap();

    assert_eq!(table.lookup_member_for_definition(n, "f").unwrap(), Some(f));
    assert_eq!(table.lookup_member_for_definition(n, "g").unwrap(), None);
    assert_eq!(table.lookup_member_for_definition(n, "y").unwrap(), None);
}

#[test]
fn nested_name_specifier_through_typedef() {
    // class A { int x; }; typedef A AT; AT::x
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let x = variable(&mut table, a, "x", int());
    let alias = variable(&mut table, root, "AT", named(a).with_flags(TypeFlags::TYPEDEF));

    let qualifier = table.lookup_nested_name_specifier(root, "AT").unwrap();
    assert_eq!(qualifier, Some(a));
    assert_eq!(table.qualified_lookup(a, "x").unwrap(), Some(x));
    assert_eq!(table.lookup(root, "AT").unwrap(), Some(alias));
}

#[test]
fn using_declaration_in_a_derived_class() {
    // class A { void f(int); void f(char); }; class B : A { using A::f; };
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let by_int = function(&mut table, a, "f", &[int()]);
    let by_char = function(&mut table, a, "f", &[char_()]);
    let b = class(&mut table, root, "B");
    table.add_parent(b, a).unwrap();

    let first = table.add_using_declaration(b, "f", a).unwrap();
    assert_eq!(table.resolve_alias(first), by_int);
    let aliases = table.contained_symbols(b).to_vec();
    assert_eq!(aliases.len(), 2);
    assert_eq!(table.resolve_alias(aliases[1]), by_char);

    let found = table.member_function_lookup(b, "f", Some(&[char_()])).unwrap();
    assert_eq!(found, Some(aliases[1]));
}

#[test]
fn using_declaration_must_name_a_base_member() {
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    variable(&mut table, a, "x", int());
    let b = class(&mut table, root, "B");

    let err = table.add_using_declaration(b, "x", a).unwrap_err();
    assert_eq!(
        err,
        InvalidUse::UsingDeclarationNotBaseMember {
            name: "x".to_owned()
        }
        .into()
    );
    assert!(table.contained_symbols(b).is_empty());
}

#[test]
fn using_declaration_clashing_with_a_local() {
    // namespace A { int x; } void f() { int x; using A::x; }
    let (mut table, root) = unit();
    let a = namespace(&mut table, root, "A");
    variable(&mut table, a, "x", int());
    let f = function(&mut table, root, "f", &[]);
    variable(&mut table, f, "x", char_());

    let err = table.add_using_declaration(f, "x", a).unwrap_err();
    assert!(matches!(
        err,
        SymbolTableError::InvalidUse(InvalidUse::Redeclaration { .. })
    ));
}

#[test]
fn this_pointer_of_member_functions() {
    // class A { void f() const; void g(); static void h(); };
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let f = table.new_callable_symbol("f", TypeKind::Function);
    table.set_flag(f, TypeFlags::CONST);
    table.add_symbol(a, f).unwrap();
    let g = function(&mut table, a, "g", &[]);
    let h = table.new_callable_symbol("h", TypeKind::Function);
    table.set_flag(h, TypeFlags::STATIC);
    table.add_symbol(a, h).unwrap();

    let this_f = table.lookup(f, "this").unwrap().unwrap();
    let ty = table.type_info(this_f);
    assert_eq!(ty.kind, TypeKind::Type);
    assert_eq!(ty.type_symbol, Some(a));
    assert_eq!(ty.ptr_ops[0].kind, PtrOpKind::Pointer);
    assert!(ty.ptr_ops[0].is_const);

    let this_g = table.lookup(g, "this").unwrap().unwrap();
    assert!(!table.type_info(this_g).ptr_ops[0].is_const);
    assert_eq!(table.lookup(h, "this").unwrap(), None);
}

#[test]
fn enumerators_are_visible_in_the_enclosing_scope() {
    // class A { enum Color { red, blue }; void f() { blue; } };
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let color = table.new_scope_symbol("Color", TypeKind::Enumeration);
    table.add_symbol(a, color).unwrap();
    let red = table.new_symbol("red", TypeKind::Undef);
    table.add_symbol(color, red).unwrap();
    let blue = table.new_symbol("blue", TypeKind::Undef);
    table.add_symbol(color, blue).unwrap();
    let f = function(&mut table, a, "f", &[]);

    assert_eq!(table.lookup(f, "blue").unwrap(), Some(blue));
    assert_eq!(table.qualified_lookup(a, "red").unwrap(), Some(red));
    assert_eq!(table.type_info(blue).type_symbol, Some(color));
    assert_eq!(table.enumerators(color), &[red, blue]);
    assert_eq!(table.lookup_nested_name_specifier(f, "Color").unwrap(), Some(color));

    let duplicate = table.new_symbol("red", TypeKind::Undef);
    assert!(table.add_symbol(color, duplicate).is_err());
}
