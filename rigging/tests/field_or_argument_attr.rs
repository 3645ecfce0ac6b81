use std::{fmt::Display, sync::Arc};

use rigging::{
    factory_fn, ArgumentError, Arguments, Error, Factory, Injectable, Injector, ParamKind,
    Parameter,
};

#[Injectable]
struct Settings {
    #[di(default = Arc::new(8080))]
    port: Arc<u16>,
    #[di(default = 3)]
    retries: u8,
    #[di(default)]
    name: String,
}

#[test]
fn marked_field_is_resolved_before_its_default() {
    let injector = Injector::new();
    injector.bind::<u16>(|b| b.to_value(9000_u16)).unwrap();

    let settings = injector.get::<Settings>().unwrap();

    assert_eq!(*settings.port, 9000);
    assert_eq!(settings.retries, 3);
    assert_eq!(settings.name, "");
}

#[test]
fn unbound_primitive_is_injected_with_its_default_value() {
    let injector = Injector::new();

    let settings = injector.get::<Settings>().unwrap();

    assert_eq!(*settings.port, 0);
    assert!(injector.contains_binding::<u16>());
}

#[test]
fn default_applies_to_arguments_built_by_hand() {
    let settings = Settings::construct(Arguments::default()).unwrap();

    assert_eq!(*settings.port, 8080);
    assert_eq!(settings.retries, 3);
}

#[Injectable]
struct Needs {
    value: Arc<i32>,
}

#[test]
fn missing_argument_without_default() {
    let err = Needs::construct(Arguments::default()).err().unwrap();

    assert!(matches!(
        err,
        Error::Argument(ArgumentError::Missing { name: "value" })
    ));
}

#[Injectable]
struct Pair(Arc<i32>, #[di(default = 5)] i64, Arc<String>);

#[test]
fn tuple_fields_are_positional() {
    assert_eq!(
        Pair::parameters(),
        vec![
            Parameter::positional("0").marked::<i32>(),
            Parameter::positional("1").with_default(),
            Parameter::positional("2").marked::<String>(),
        ]
    );

    let injector = Injector::new();
    injector.bind::<i32>(|b| b.to_value(1)).unwrap();
    injector
        .bind::<String>(|b| b.to_value(String::from("two")))
        .unwrap();

    let pair = injector.get::<Pair>().unwrap();

    assert_eq!(*pair.0, 1);
    assert_eq!(pair.1, 5);
    assert_eq!(*pair.2, "two");
}

#[test]
fn named_fields_are_keywords() {
    let parameters = Settings::parameters();

    assert_eq!(parameters.len(), 3);
    assert!(parameters
        .iter()
        .all(|parameter| parameter.kind() == ParamKind::Keyword));
    assert_eq!(parameters[0].marker(), Some(&rigging::Key::of::<u16>()));
    assert!(parameters[0].has_default());
    assert_eq!(parameters[1].marker(), None);
}

#[Factory]
fn Endpoint(#[di(keyword)] host: Arc<String>, #[di(keyword)] port: Arc<u16>) -> Arc<str> {
    format!("{}:{}", host, port).into()
}

#[test]
fn keyword_function_arguments() {
    assert_eq!(
        Endpoint.parameters(),
        vec![
            Parameter::keyword("host").marked::<String>(),
            Parameter::keyword("port").marked::<u16>(),
        ]
    );

    let injector = Injector::new();
    injector
        .bind::<String>(|b| b.to_value(String::from("localhost")))
        .unwrap();
    injector.bind::<u16>(|b| b.to_value(8080_u16)).unwrap();
    injector.bind::<str>(|b| b.to_factory(Endpoint)).unwrap();

    assert_eq!(&*injector.get::<str>().unwrap(), "localhost:8080");
}

#[Factory]
fn Port(raw: Arc<String>) -> rigging::Result<u16> {
    raw.parse().map_err(Error::external)
}

#[test]
fn fallible_factory() {
    let injector = Injector::new();
    injector
        .bind::<String>(|b| b.to_value(String::from("8080")))
        .unwrap();
    injector.bind::<u16>(|b| b.to_factory(Port)).unwrap();

    assert_eq!(*injector.get::<u16>().unwrap(), 8080);

    injector
        .bind::<String>(|b| b.to_value(String::from("http")))
        .unwrap();

    let err = injector.get::<u16>().unwrap_err();
    assert!(matches!(err, Error::External(_)));
    assert_eq!(err.to_string(), "invalid digit found in string");
}

#[Factory]
fn Labelled<T: Display + Send + Sync + 'static>(value: Arc<T>) -> String {
    format!("<{}>", value)
}

#[test]
fn generic_factory() {
    let injector = Injector::new();
    injector.bind::<i32>(|b| b.to_value(3)).unwrap();
    injector
        .bind::<String>(|b| b.to_factory(Labelled::<i32>::default()))
        .unwrap();

    assert_eq!(*injector.get::<String>().unwrap(), "<3>");
}

struct Unbound;

#[test]
fn variadic_parameters_are_never_injected() {
    let injector = Injector::new();
    injector.bind::<i32>(|b| b.to_value(4)).unwrap();
    injector
        .bind::<i64>(|b| {
            b.to_factory(factory_fn(
                vec![
                    Parameter::positional("n").marked::<i32>(),
                    Parameter::var_positional("rest").marked::<Unbound>(),
                    Parameter::var_keyword("options").marked::<Unbound>(),
                ],
                |mut args| {
                    let n = args.positional::<i32>("n")?;
                    assert!(args.is_empty());
                    Ok(Arc::new(*n as i64 * 10))
                },
            ))
        })
        .unwrap();

    assert_eq!(*injector.get::<i64>().unwrap(), 40);
}

mod renamed {
    use rigging as di;

    use di::{Factory, Injectable, Injector};

    #[Injectable(rigging_path = di)]
    struct ViaAlias(#[di(default = 7)] i8);

    #[Factory(rigging_path = di)]
    fn Doubled(alias: std::sync::Arc<ViaAlias>) -> i16 {
        alias.0 as i16 * 2
    }

    #[test]
    fn custom_rigging_path() {
        let injector = Injector::new();
        injector.bind::<i16>(|b| b.to_factory(Doubled)).unwrap();

        assert_eq!(injector.get::<ViaAlias>().unwrap().0, 7);
        assert_eq!(*injector.get::<i16>().unwrap(), 14);
    }
}
