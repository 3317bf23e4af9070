//! Path resolution over nested JSON documents

use maybe_path::{Maybe, PathKey, RequestSources, resolve, resolve_key, resolve_path};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use serde_json::{Value as JsonValue, json};

#[fixture]
fn params() -> JsonValue {
    json!({
        "hello": ["hi"],
        "user": {
            "name": "bob",
            "age": 0,
            "admin": false,
            "nickname": null,
            "emails": []
        }
    })
}

#[rstest]
#[case::into_array(&["hello", "0"], Some(json!("hi")))]
#[case::whole_array(&["hello"], Some(json!(["hi"])))]
#[case::out_of_range(&["hello", "1"], None)]
#[case::missing_first(&["goodbye", "0"], None)]
#[case::nested(&["user", "name"], Some(json!("bob")))]
#[case::zero(&["user", "age"], Some(json!(0)))]
#[case::false_value(&["user", "admin"], Some(json!(false)))]
#[case::null(&["user", "nickname"], None)]
#[case::empty_array(&["user", "emails"], Some(json!([])))]
fn resolves_textual_paths(
    params: JsonValue,
    #[case] tokens: &[&str],
    #[case] expected: Option<JsonValue>,
) {
    let keys = PathKey::parse_all(tokens).unwrap();
    assert_eq!(resolve_path(Some(&params), &keys), Maybe::wrap(expected));
}

#[rstest]
fn variadic_macro_matches_key_slices(params: JsonValue) {
    assert_eq!(
        resolve!(Some(&params), "user", "name"),
        resolve_path(Some(&params), &[PathKey::name("user"), PathKey::name("name")])
    );
    assert_eq!(resolve!(Some(&params), "hello", 0).get(), Ok(json!("hi")));
    assert_eq!(resolve!(Some(&params)), Maybe::Present(params.clone()));
}

#[test]
fn unbound_root_is_absent() {
    let undeclared: Option<&JsonValue> = None;
    assert!(resolve!(undeclared, "hello", 2).is_empty());
    assert!(resolve_key(undeclared, "hello").is_empty());
}

#[rstest]
fn defaulting_a_missing_path(params: JsonValue) {
    let page = resolve!(Some(&params), "page", "size").get_or_else(json!(20));
    assert_eq!(page, json!(20));
}

#[rstest]
fn resolved_value_is_a_snapshot(params: JsonValue) {
    let mut params = params;
    let name = resolve!(Some(&params), "user", "name");
    params["user"]["name"] = json!("alice");

    assert_eq!(name.get(), Ok(json!("bob")));
    assert_eq!(resolve!(Some(&params), "user", "name").get(), Ok(json!("alice")));
}

#[test]
fn query_string_parameters_resolve_like_documents() {
    let sources = RequestSources::from_strings(
        "hello[]=hi&filter[status]=open&filter[tags][]=bug",
        "comment=thanks",
    )
    .unwrap();

    let status = [PathKey::name("filter"), PathKey::name("status")];
    let tag = [PathKey::name("filter"), PathKey::name("tags"), PathKey::index(0)];
    let comment = [PathKey::name("comment")];

    assert_eq!(sources.query(&status).get(), Ok(json!("open")));
    assert_eq!(sources.request(&tag).get(), Ok(json!("bug")));
    assert_eq!(sources.request(&comment).get(), Ok(json!("thanks")));
    assert!(sources.query(&comment).is_empty());
}
