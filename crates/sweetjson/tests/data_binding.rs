//! Binding parsed trees onto records, arrays and generic containers.

use std::collections::HashMap;

use sweetjson::{
    BindContext, BindError, Bindable, Bound, Fields, Record, Registry, TypeDescriptor, TypeHandle, TypeRef, Value,
    ValueKind, downcast, parse,
};

fn list() -> TypeHandle {
    TypeHandle::opaque("List")
}

fn map() -> TypeHandle {
    TypeHandle::opaque("Map")
}

/// Builds a `Vec<Bound>` of the descriptor's first type argument.
fn list_binder(
    value: &Value,
    descriptor: &TypeDescriptor,
    registry: &Registry,
    context: &mut BindContext,
) -> Result<Bound, BindError> {
    let element = descriptor
        .type_argument(0)
        .cloned()
        .ok_or_else(|| BindError::custom("List needs an element type"))?;
    let element = TypeDescriptor::new(element);
    let items = value.as_array().ok_or_else(|| BindError::custom("List needs an array"))?;
    let list = items
        .iter()
        .map(|item| registry.bind(item, &element, context))
        .collect::<Result<Vec<Bound>, _>>()?;
    Ok(Box::new(list))
}

/// Builds string-keyed entries whose values have the second type argument.
fn map_binder(
    value: &Value,
    descriptor: &TypeDescriptor,
    registry: &Registry,
    context: &mut BindContext,
) -> Result<Bound, BindError> {
    let entry = descriptor
        .type_argument(1)
        .cloned()
        .ok_or_else(|| BindError::custom("Map needs a value type"))?;
    let entry = TypeDescriptor::new(entry);
    let object = value.as_object().ok_or_else(|| BindError::custom("Map needs an object"))?;
    let mut entries = Vec::new();
    for (key, item) in object {
        entries.push((key.clone(), registry.bind(item, &entry, context)?));
    }
    Ok(Box::new(entries))
}

fn registry() -> Registry {
    let registry = Registry::new();
    registry.register(TypeDescriptor::new(list()), list_binder);
    registry
}

macro_rules! bindable_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Bindable for $ty {
                fn type_handle() -> TypeHandle {
                    TypeHandle::record::<Self>()
                }
            }
        )*
    };
}

#[derive(Debug, Default)]
struct C1<T> {
    value: T,
    array: Box<[T]>,
    list: Vec<T>,
}

impl<T: Bindable + Default> Record for C1<T> {
    const NAME: &'static str = "C1";
    const TYPE_PARAMETERS: &'static [&'static str] = &["T"];

    fn fields(fields: &mut Fields<Self>) {
        fields
            .field("value", TypeRef::param("T"), |c: &mut Self, v: T| c.value = v)
            .field("array", TypeRef::param_array("T", 1), |c: &mut Self, v: Box<[T]>| c.array = v)
            .field(
                "list",
                TypeRef::generic(list(), [TypeRef::param("T")]),
                |c: &mut Self, v: Vec<T>| c.list = v,
            );
    }
}

impl<T: Bindable + Default> Bindable for C1<T> {
    fn type_handle() -> TypeHandle {
        TypeHandle::record::<Self>()
    }
}

#[test]
fn binds_generic_record() {
    let value = parse(r#"{"value": 24, "array": [1], "list": [1, 2]}"#).unwrap();
    let object: C1<i8> = value
        .bind_generic(&registry(), &[TypeHandle::of::<i8>()])
        .unwrap();
    assert_eq!(object.value, 24);
    assert_eq!(&*object.array, &[1]);
    assert_eq!(object.list, [1, 2]);
}

#[test]
fn generic_record_needs_type_arguments() {
    let value = parse(r#"{"value": 24}"#).unwrap();
    let err = value.bind::<C1<i8>>(&registry()).unwrap_err();
    assert_eq!(
        err,
        BindError::UnresolvedTypeParameter {
            owner: "C1".into(),
            parameter: "T".into()
        }
    );
}

#[derive(Debug, Default)]
struct C2<T> {
    values: Vec<Vec<T>>,
}

impl<T: Bindable + Default> Record for C2<T> {
    const NAME: &'static str = "C2";
    const TYPE_PARAMETERS: &'static [&'static str] = &["T"];

    fn fields(fields: &mut Fields<Self>) {
        fields.field(
            "values",
            TypeRef::generic(list(), [TypeRef::generic(list(), [TypeRef::param("T")])]),
            |c: &mut Self, v: Vec<Vec<T>>| c.values = v,
        );
    }
}

impl<T: Bindable + Default> Bindable for C2<T> {
    fn type_handle() -> TypeHandle {
        TypeHandle::record::<Self>()
    }
}

#[test]
fn nested_generic_arguments_fail() {
    let value = parse(r#"{"values": [[1], [2]]}"#).unwrap();
    let err = value
        .bind_generic::<C2<i8>>(&registry(), &[TypeHandle::of::<i8>()])
        .unwrap_err();
    assert_eq!(
        err,
        BindError::NestedGenericArgument {
            owner: "C2".into(),
            field: "values".into()
        }
    );
}

#[derive(Debug)]
struct C3 {
    object: Option<Box<C3>>,
    value: i32,
    integer: i32,
    string: String,
}

impl Default for C3 {
    fn default() -> Self {
        Self {
            object: None,
            value: 5,
            integer: 10,
            string: "string".into(),
        }
    }
}

impl Record for C3 {
    const NAME: &'static str = "C3";

    fn fields(fields: &mut Fields<Self>) {
        fields
            .field("object", TypeRef::of::<C3>(), |c: &mut Self, v: Box<C3>| c.object = Some(v))
            .field("value", TypeRef::of::<i32>(), |c: &mut Self, v: i32| c.value = v)
            .field("integer", TypeRef::of::<i32>(), |c: &mut Self, v: i32| c.integer = v)
            .field("string", TypeRef::of::<String>(), |c: &mut Self, v: String| c.string = v);
    }
}

impl Bindable for Box<C3> {
    fn type_handle() -> TypeHandle {
        C3::type_handle()
    }

    fn from_bound(bound: Bound) -> Result<Self, BindError> {
        downcast::<C3>(bound).map(Box::new)
    }
}

#[test]
fn null_keeps_field_default() {
    let registry = registry();

    let c3: C3 = parse(r#"{"value": null}"#).unwrap().bind(&registry).unwrap();
    assert_eq!(c3.value, 5);
    assert!(c3.object.is_none());

    let c3: C3 = parse(r#"{"object": {"integer": 1, "string": null}}"#)
        .unwrap()
        .bind(&registry)
        .unwrap();
    let inner = c3.object.unwrap();
    assert_eq!(inner.integer, 1);
    assert_eq!(inner.string, "string");
    assert_eq!(inner.value, 5);
    assert_eq!(c3.integer, 10);
}

#[test]
fn unknown_keys_are_ignored() {
    let c3: C3 = parse(r#"{"Value": 1, "extra": [1, {"x": null}], "integer": 2}"#)
        .unwrap()
        .bind(&registry())
        .unwrap();
    assert_eq!(c3.value, 5);
    assert_eq!(c3.integer, 2);
}

#[test]
fn null_elements_are_skipped_in_arrays() {
    let array: Box<[i32]> = parse("[1, 2, null, 4]").unwrap().bind(&registry()).unwrap();
    assert_eq!(array.len(), 3);
    assert_eq!(&*array, &[1, 2, 4]);

    let empty: Vec<String> = parse("[null, null]").unwrap().bind(&registry()).unwrap();
    assert!(empty.is_empty());
}

#[derive(Debug, Default)]
struct Ic4 {
    message: String,
}

#[derive(Debug, Default)]
struct C4 {
    object: Ic4,
}

impl Record for Ic4 {
    const NAME: &'static str = "IC4";

    fn fields(fields: &mut Fields<Self>) {
        fields.field("message", TypeRef::of::<String>(), |c: &mut Self, v: String| c.message = v);
    }
}

impl Record for C4 {
    const NAME: &'static str = "C4";

    fn fields(fields: &mut Fields<Self>) {
        fields.field("object", TypeRef::of::<Ic4>(), |c: &mut Self, v: Ic4| c.object = v);
    }
}

bindable_record!(C3, Ic4, C4);

#[test]
fn binds_nested_record() {
    let message = "Message from the inner class";
    let c4: C4 = parse(&format!(r#"{{"object": {{"message": "{message}"}}}}"#))
        .unwrap()
        .bind(&registry())
        .unwrap();
    assert_eq!(c4.object.message, message);
}

/// Entries produced by [`map_binder`].
#[derive(Debug, Default, PartialEq)]
struct StrMap<V>(HashMap<String, V>);

impl<V: Bindable> Bindable for StrMap<V> {
    fn type_handle() -> TypeHandle {
        map()
    }

    fn from_bound(bound: Bound) -> Result<Self, BindError> {
        downcast::<Vec<(String, Bound)>>(bound)?
            .into_iter()
            .map(|(key, bound)| Ok::<_, BindError>((key, V::from_bound(bound)?)))
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

#[derive(Debug, Default)]
struct C5<A, B> {
    b: B,
    a: A,
    map: StrMap<B>,
}

impl<A: Bindable + Default, B: Bindable + Default> Record for C5<A, B> {
    const NAME: &'static str = "C5";
    const TYPE_PARAMETERS: &'static [&'static str] = &["A", "B"];

    fn fields(fields: &mut Fields<Self>) {
        fields
            .field("b", TypeRef::param("B"), |c: &mut Self, v: B| c.b = v)
            .field("a", TypeRef::param("A"), |c: &mut Self, v: A| c.a = v)
            .field(
                "map",
                TypeRef::generic(map(), [TypeRef::param("A"), TypeRef::param("B")]),
                |c: &mut Self, v: StrMap<B>| c.map = v,
            );
    }
}

impl<A: Bindable + Default, B: Bindable + Default> Bindable for C5<A, B> {
    fn type_handle() -> TypeHandle {
        TypeHandle::record::<Self>()
    }
}

#[test]
fn binds_multiple_type_arguments() {
    let registry = registry();
    registry.register(TypeDescriptor::new(map()), map_binder);

    let value = parse(r#"{"a":"A", "b":2, "map": {"key1": 40, "key2": 50}}"#).unwrap();
    let object: C5<String, i32> = value
        .bind_generic(&registry, &[TypeHandle::of::<String>(), TypeHandle::of::<i32>()])
        .unwrap();
    assert_eq!(object.a, "A");
    assert_eq!(object.b, 2);
    assert_eq!(object.map.0.get("key1"), Some(&40));
    assert_eq!(object.map.0.get("key2"), Some(&50));
}

#[test]
fn wrong_type_argument_count_fails() {
    let value = parse(r#"{"a":"A"}"#).unwrap();
    let err = value
        .bind_generic::<C5<String, i32>>(&registry(), &[TypeHandle::of::<String>()])
        .unwrap_err();
    assert_eq!(
        err,
        BindError::TypeArgumentCount {
            ty: "C5".into(),
            expected: 2,
            supplied: 1
        }
    );
    assert_eq!(
        err.to_string(),
        "too few/many type arguments for `C5` (expected: 2, supplied: 1)"
    );
}

#[test]
fn opaque_type_without_binder_is_not_constructible() {
    let value = parse(r#"{"a":"A", "map": {"k": 1}}"#).unwrap();
    let err = value
        .bind_generic::<C5<String, i32>>(&registry(), &[TypeHandle::of::<String>(), TypeHandle::of::<i32>()])
        .unwrap_err();
    assert_eq!(err, BindError::NotConstructible { ty: "Map".into() });
}

#[test]
fn mixed_arrays_fail() {
    let err = parse(r#"[1, 2, "string"]"#)
        .unwrap()
        .bind::<Box<[i32]>>(&registry())
        .unwrap_err();
    assert_eq!(
        err,
        BindError::UnexpectedKind {
            ty: "i32".into(),
            expected: ValueKind::Number,
            found: ValueKind::String
        }
    );
}

#[test]
fn binds_multi_dimensional_array() {
    let array: Box<[Box<[i32]>]> = parse("[[1], [2]]").unwrap().bind(&registry()).unwrap();
    assert_eq!(array[0][0], 1);
    assert_eq!(array[1][0], 2);
}

#[derive(Debug, Default)]
struct C6<T> {
    array: Box<[Box<[T]>]>,
}

impl<T: Bindable + Default> Record for C6<T> {
    const NAME: &'static str = "C6";
    const TYPE_PARAMETERS: &'static [&'static str] = &["T"];

    fn fields(fields: &mut Fields<Self>) {
        fields.field(
            "array",
            TypeRef::param_array("T", 2),
            |c: &mut Self, v: Box<[Box<[T]>]>| c.array = v,
        );
    }
}

impl<T: Bindable + Default> Bindable for C6<T> {
    fn type_handle() -> TypeHandle {
        TypeHandle::record::<Self>()
    }
}

#[test]
fn binds_multi_dimensional_parameter_field() {
    let object: C6<i32> = parse(r#"{"array": [[1], [2]]}"#)
        .unwrap()
        .bind_generic(&registry(), &[TypeHandle::of::<i32>()])
        .unwrap();
    assert_eq!(object.array[0][0], 1);
    assert_eq!(object.array[1][0], 2);
}

#[derive(Debug, Default)]
struct Profile {
    nickname: Option<String>,
    initial: char,
    score: f32,
    visits: u64,
    tags: Vec<String>,
    secret: String,
}

impl Record for Profile {
    const NAME: &'static str = "Profile";

    fn fields(fields: &mut Fields<Self>) {
        fields
            .field("nickname", TypeRef::of::<String>(), |p: &mut Self, v: Option<String>| p.nickname = v)
            .field("initial", TypeRef::of::<char>(), |p: &mut Self, v: char| p.initial = v)
            .field("score", TypeRef::of::<f32>(), |p: &mut Self, v: f32| p.score = v)
            .field("visits", TypeRef::of::<u64>(), |p: &mut Self, v: u64| p.visits = v)
            .field("tags", TypeRef::of::<Vec<String>>(), |p: &mut Self, v: Vec<String>| p.tags = v);
    }
}

bindable_record!(Profile);

#[test]
fn binds_scalar_kinds() {
    let profile: Profile = parse(
        r#"{"nickname": "zed", "initial": 90, "score": 0.5, "visits": 12,
            "tags": ["x", null, "y"], "secret": "not a field"}"#,
    )
    .unwrap()
    .bind(&registry())
    .unwrap();
    assert_eq!(profile.nickname.as_deref(), Some("zed"));
    assert_eq!(profile.initial, 'Z');
    assert!((profile.score - 0.5).abs() < f32::EPSILON);
    assert_eq!(profile.visits, 12);
    assert_eq!(profile.tags, ["x", "y"]);
    assert!(profile.secret.is_empty());
}

#[test]
fn compound_value_for_scalar_field_fails() {
    let err = parse(r#"{"visits": {"n": 1}}"#)
        .unwrap()
        .bind::<Profile>(&registry())
        .unwrap_err();
    assert_eq!(
        err,
        BindError::CompoundToPrimitive {
            ty: "u64".into(),
            found: ValueKind::Object
        }
    );
}

#[test]
fn record_from_non_object_fails() {
    let err = parse("[1]").unwrap().bind::<Profile>(&registry()).unwrap_err();
    assert_eq!(
        err,
        BindError::UnexpectedKind {
            ty: "Profile".into(),
            expected: ValueKind::Object,
            found: ValueKind::Array
        }
    );
}

#[derive(Debug, Default, PartialEq)]
struct Scaled(f64);

impl Bindable for Scaled {
    fn type_handle() -> TypeHandle {
        TypeHandle::opaque("Scaled")
    }
}

#[derive(Debug, Default)]
struct Reading {
    scaled: Vec<Scaled>,
}

impl Record for Reading {
    const NAME: &'static str = "Reading";

    fn fields(fields: &mut Fields<Self>) {
        fields.field(
            "scaled",
            TypeRef::of::<Vec<Scaled>>(),
            |r: &mut Self, v: Vec<Scaled>| r.scaled = v,
        );
    }
}

bindable_record!(Reading);

#[test]
fn context_reaches_nested_custom_binders() {
    let registry = registry();
    registry.register(
        TypeDescriptor::of::<Scaled>(),
        |value: &Value, _: &TypeDescriptor, _: &Registry, context: &mut BindContext| -> Result<Bound, BindError> {
            let factor = context.peek::<f64>("Scale").copied().unwrap_or(1.0);
            let n = value.as_f64().ok_or_else(|| BindError::custom("expected a number"))?;
            let seen = context.peek::<usize>("seen").copied().unwrap_or(0);
            context.put("seen", seen + 1);
            Ok(Box::new(Scaled(n * factor)))
        },
    );

    let mut context = BindContext::new();
    context.put("SCALE", 10.0_f64);
    let reading: Reading = parse(r#"{"scaled": [1, 2.5]}"#)
        .unwrap()
        .bind_with(&registry, &mut context)
        .unwrap();
    assert_eq!(reading.scaled, [Scaled(10.0), Scaled(25.0)]);
    assert_eq!(context.peek::<usize>("SEEN"), Some(&2));
}

#[test]
fn registry_is_shared_across_threads() {
    let registry = registry();
    std::thread::scope(|s| {
        for n in 0..4_i32 {
            let registry = &registry;
            s.spawn(move || {
                let value = parse(&format!(r#"{{"value": {n}, "list": [{n}]}}"#)).unwrap();
                let object: C1<i32> = value
                    .bind_generic(registry, &[TypeHandle::of::<i32>()])
                    .unwrap();
                assert_eq!(object.value, n);
                assert_eq!(object.list, [n]);
            });
        }
    });
}
