//! Function resolution scenarios.

use cxx_symtab::{PtrOp, TypeFlags, TypeInfo, TypeKind};
use pretty_assertions::assert_eq;

use crate::common::{char_, class, function, int, named, namespace, pointer_to, unit, variable};

#[test]
fn resolution_by_argument_types() {
    // void f(int); void f(char, char); void f(int*);
    let (mut table, root) = unit();
    let by_int = function(&mut table, root, "f", &[int()]);
    let by_chars = function(&mut table, root, "f", &[char_(), char_()]);
    let by_pointer = function(&mut table, root, "f", &[pointer_to(int())]);

    let resolve = |args: &[TypeInfo]| table.unqualified_function_lookup(root, "f", Some(args));
    assert_eq!(resolve(&[int()]).unwrap(), Some(by_int));
    assert_eq!(resolve(&[char_()]).unwrap(), Some(by_int));
    assert_eq!(resolve(&[char_(), int()]).unwrap(), Some(by_chars));
    assert_eq!(resolve(&[pointer_to(int())]).unwrap(), Some(by_pointer));
    assert_eq!(resolve(&[pointer_to(char_())]).unwrap(), None);
}

#[test]
fn resolution_with_default_parameters() {
    // void f(int, char = 'a'); void f(char*);
    let (mut table, root) = unit();
    let with_default = table.new_callable_symbol("f", TypeKind::Function);
    table.add_parameter(with_default, int(), false).unwrap();
    table.add_parameter(with_default, char_(), true).unwrap();
    table.add_symbol(root, with_default).unwrap();
    function(&mut table, root, "f", &[pointer_to(char_())]);

    let resolve = |args: &[TypeInfo]| table.unqualified_function_lookup(root, "f", Some(args));
    assert_eq!(resolve(&[int()]).unwrap(), Some(with_default));
    assert_eq!(resolve(&[int(), char_()]).unwrap(), Some(with_default));
    assert_eq!(resolve(&[]).unwrap(), None);
}

#[test]
fn resolution_with_pointers_to_classes() {
    // class A {}; class B : A {}; class C : B {};
    // void f(A*); void f(B*);  f(new C) picks f(B*)
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let b = class(&mut table, root, "B");
    table.add_parent(b, a).unwrap();
    let c = class(&mut table, root, "C");
    table.add_parent(c, b).unwrap();
    let by_a = function(&mut table, root, "f", &[pointer_to(named(a))]);
    let by_b = function(&mut table, root, "f", &[pointer_to(named(b))]);

    let resolve = |args: &[TypeInfo]| table.unqualified_function_lookup(root, "f", Some(args));
    assert_eq!(resolve(&[pointer_to(named(c))]).unwrap(), Some(by_b));
    assert_eq!(resolve(&[pointer_to(named(b))]).unwrap(), Some(by_b));
    assert_eq!(resolve(&[pointer_to(named(a))]).unwrap(), Some(by_a));
}

#[test]
fn resolution_through_typedefs_variables_and_arrays() {
    // typedef int* intPtr; class C {}; C* c; int arr[4];
    // void f(int*); void f(C*);
    let (mut table, root) = unit();
    let int_ptr = variable(
        &mut table,
        root,
        "intPtr",
        pointer_to(int()).with_flags(TypeFlags::TYPEDEF),
    );
    let c = class(&mut table, root, "C");
    let object = variable(&mut table, root, "c", pointer_to(named(c)));
    let array = variable(&mut table, root, "arr", int().with_ptr_op(PtrOp::array()));
    let by_int_ptr = function(&mut table, root, "f", &[pointer_to(int())]);
    let by_class_ptr = function(&mut table, root, "f", &[pointer_to(named(c))]);

    let resolve = |args: &[TypeInfo]| table.unqualified_function_lookup(root, "f", Some(args));
    assert_eq!(resolve(&[named(int_ptr)]).unwrap(), Some(by_int_ptr));
    assert_eq!(resolve(&[named(object)]).unwrap(), Some(by_class_ptr));
    assert_eq!(resolve(&[named(array)]).unwrap(), Some(by_int_ptr));
}

#[test]
fn typedef_parameters_do_not_overload() {
    // typedef int INT; void f(int); void f(INT);
    let (mut table, root) = unit();
    let alias = variable(&mut table, root, "INT", int().with_flags(TypeFlags::TYPEDEF));
    let by_int = function(&mut table, root, "f", &[int()]);
    let redeclared = table.new_callable_symbol("f", TypeKind::Function);
    table.add_parameter(redeclared, named(alias), false).unwrap();

    assert!(table.has_same_parameters(by_int, redeclared));
    assert!(table.add_symbol(root, redeclared).is_err());
}

#[test]
fn user_defined_conversions() {
    // class A {}; class B { B(A); }; class C { operator A(); };
    // void f(B); void g(A);
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let b = class(&mut table, root, "B");
    function(&mut table, b, "B", &[named(a)]);
    let c = class(&mut table, root, "C");
    function(&mut table, c, "operator A", &[]);
    let f = function(&mut table, root, "f", &[named(b)]);
    let g = function(&mut table, root, "g", &[named(a)]);

    let by_ctor = table
        .unqualified_function_lookup(root, "f", Some(&[named(a)]))
        .unwrap();
    assert_eq!(by_ctor, Some(f));
    let by_operator = table
        .unqualified_function_lookup(root, "g", Some(&[named(c)]))
        .unwrap();
    assert_eq!(by_operator, Some(g));
    let none = table
        .unqualified_function_lookup(root, "f", Some(&[named(c)]))
        .unwrap();
    assert_eq!(none, None);
}

#[test]
fn exact_match_beats_user_defined_conversion() {
    // class A {}; class B { B(A); }; void f(B); void f(A);
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let b = class(&mut table, root, "B");
    function(&mut table, b, "B", &[named(a)]);
    function(&mut table, root, "f", &[named(b)]);
    let by_a = function(&mut table, root, "f", &[named(a)]);

    let found = table
        .unqualified_function_lookup(root, "f", Some(&[named(a)]))
        .unwrap();
    assert_eq!(found, Some(by_a));
}

#[test]
fn ordinary_members_are_not_conversion_functions() {
    // class A { int get(); int size(); operator char(int); }; void f(int); f(a);
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let get = function(&mut table, a, "get", &[]);
    table.set_return_type(get, int()).unwrap();
    let f = function(&mut table, root, "f", &[int()]);

    let found = table
        .unqualified_function_lookup(root, "f", Some(&[named(a)]))
        .unwrap();
    assert_eq!(found, None);

    let size = function(&mut table, a, "size", &[]);
    table.set_return_type(size, int()).unwrap();
    let with_argument = function(&mut table, a, "operator char", &[int()]);
    table.set_return_type(with_argument, char_()).unwrap();
    let found = table
        .unqualified_function_lookup(root, "f", Some(&[named(a)]))
        .unwrap();
    assert_eq!(found, None);

    let to_int = function(&mut table, a, "operator int", &[]);
    table.set_return_type(to_int, int()).unwrap();
    let found = table
        .unqualified_function_lookup(root, "f", Some(&[named(a)]))
        .unwrap();
    assert_eq!(found, Some(f));
}

#[test]
fn two_conversion_routes_are_ambiguous() {
    // class B; class A { operator B(); }; class B { B(A); }; void f(B); f(a)
    let (mut table, root) = unit();
    let a = class(&mut table, root, "A");
    let b = class(&mut table, root, "B");
    function(&mut table, a, "operator B", &[]);
    function(&mut table, b, "B", &[named(a)]);
    function(&mut table, root, "f", &[named(b)]);

    let err = table
        .unqualified_function_lookup(root, "f", Some(&[named(a)]))
        .unwrap_err();
    assert!(err.is_ambiguous());
}

#[test]
fn const_pointer_ranking() {
    // void f(const int*, short); void f(int*, int);
    let (mut table, root) = unit();
    let short = int().with_flags(TypeFlags::SHORT);
    let long = int().with_flags(TypeFlags::LONG);
    let const_int_ptr = pointer_to(int().with_flags(TypeFlags::CONST));
    let f1 = function(&mut table, root, "f", &[const_int_ptr.clone(), short.clone()]);
    let f2 = function(&mut table, root, "f", &[pointer_to(int()), int()]);

    let resolve = |args: &[TypeInfo]| table.unqualified_function_lookup(root, "f", Some(args));
    assert!(resolve(&[pointer_to(int()), short]).unwrap_err().is_ambiguous());
    assert_eq!(resolve(&[pointer_to(int()), long.clone()]).unwrap(), Some(f2));
    assert_eq!(resolve(&[pointer_to(int()), char_()]).unwrap(), Some(f2));
    assert_eq!(resolve(&[const_int_ptr, long]).unwrap(), Some(f1));
}

#[test]
fn argument_dependent_lookup() {
    // namespace NS1 { class T {}; void f(T*); void g(T*, int); }
    // namespace NS2 { void g(NS1::T*, char); }
    // using namespace NS2; T* parm; f(parm); g(parm, 1);
    let (mut table, root) = unit();
    let ns1 = namespace(&mut table, root, "NS1");
    let t = class(&mut table, ns1, "T");
    let f = function(&mut table, ns1, "f", &[pointer_to(named(t))]);
    let g1 = function(&mut table, ns1, "g", &[pointer_to(named(t)), int()]);
    let ns2 = namespace(&mut table, root, "NS2");
    function(&mut table, ns2, "g", &[pointer_to(named(t)), char_()]);
    table.add_using_directive(root, ns2).unwrap();
    let caller = function(&mut table, root, "main", &[]);
    let parm = variable(&mut table, caller, "parm", pointer_to(named(t)));

    let found = table
        .unqualified_function_lookup(caller, "f", Some(&[named(parm)]))
        .unwrap();
    assert_eq!(found, Some(f));
    let found = table
        .unqualified_function_lookup(caller, "g", Some(&[named(parm), int()]))
        .unwrap();
    assert_eq!(found, Some(g1));
}

#[test]
fn argument_dependent_lookup_through_base_classes() {
    // namespace NS1 { class A {}; void f(A*); }
    // namespace NS2 { class B : NS1::A {}; void f(B*); void g(A*); }
    let (mut table, root) = unit();
    let ns1 = namespace(&mut table, root, "NS1");
    let a = class(&mut table, ns1, "A");
    let f_a = function(&mut table, ns1, "f", &[pointer_to(named(a))]);
    let ns2 = namespace(&mut table, root, "NS2");
    let b = class(&mut table, ns2, "B");
    table.add_parent(b, a).unwrap();
    let f_b = function(&mut table, ns2, "f", &[pointer_to(named(b))]);

    let b_ptr = [pointer_to(named(b))];
    assert_eq!(table.unqualified_function_lookup(root, "f", Some(&b_ptr)).unwrap(), Some(f_b));
    let a_ptr = [pointer_to(named(a))];
    assert_eq!(table.unqualified_function_lookup(root, "f", Some(&a_ptr)).unwrap(), Some(f_a));
}

#[test]
fn class_member_suppresses_argument_dependent_lookup() {
    // namespace NS { class A {}; void f(A*); }
    // class C { void f(NS::A*); void g() { f(a); } };
    let (mut table, root) = unit();
    let ns = namespace(&mut table, root, "NS");
    let a = class(&mut table, ns, "A");
    function(&mut table, ns, "f", &[pointer_to(named(a))]);
    let c = class(&mut table, root, "C");
    let member = function(&mut table, c, "f", &[pointer_to(named(a))]);
    let g = function(&mut table, c, "g", &[]);

    let found = table
        .unqualified_function_lookup(g, "f", Some(&[pointer_to(named(a))]))
        .unwrap();
    assert_eq!(found, Some(member));
}

#[test]
fn overloads_added_after_a_using_declaration_are_not_visible() {
    // namespace A { void f(int); } using A::f; namespace A { void f(char); }
    // void foo() { f('c'); }   calls A::f(int)
    // void bar() { using A::f; f('c'); }   calls A::f(char)
    let (mut table, root) = unit();
    let a = namespace(&mut table, root, "A");
    let by_int = function(&mut table, a, "f", &[int()]);
    let early = table.add_using_declaration(root, "f", a).unwrap();
    let by_char = function(&mut table, a, "f", &[char_()]);
    let foo = function(&mut table, root, "foo", &[]);
    let bar = function(&mut table, root, "bar", &[]);
    table.add_using_declaration(bar, "f", a).unwrap();

    let in_foo = table
        .unqualified_function_lookup(foo, "f", Some(&[char_()]))
        .unwrap()
        .unwrap();
    assert_eq!(in_foo, early);
    assert_eq!(table.resolve_alias(in_foo), by_int);

    let in_bar = table
        .unqualified_function_lookup(bar, "f", Some(&[char_()]))
        .unwrap()
        .unwrap();
    assert_eq!(table.resolve_alias(in_bar), by_char);
}

#[test]
fn taking_the_address_of_a_name() {
    // void f(int); void g(int); void g(char);  &f, &g
    let (mut table, root) = unit();
    let f = function(&mut table, root, "f", &[int()]);
    function(&mut table, root, "g", &[int()]);
    function(&mut table, root, "g", &[char_()]);

    assert_eq!(table.unqualified_function_lookup(root, "f", None).unwrap(), Some(f));
    assert_eq!(table.unqualified_function_lookup(root, "g", None).unwrap(), None);
}
