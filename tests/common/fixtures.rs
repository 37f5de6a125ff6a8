use deepr::{Context, Node, Record, TargetError};
use serde_json::{Value, json};
use std::time::Duration;

pub const DELAY: Duration = Duration::from_millis(5);

pub const MOVIE_ID: &str = "cjrts72gy00ik01rv6eins4se";
pub const ACCESS_TOKEN: &str = "super-secret-token";

/// What the caller passes as context to every method call.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
}

pub fn session_context(token: &str) -> Context {
    Context::new(Session {
        access_token: token.to_string(),
    })
}

/// Resolves to `node` after a short delay.
pub async fn after_delay(node: Node) -> Result<Node, TargetError> {
    tokio::time::sleep(DELAY).await;
    Ok(node)
}

pub fn inception() -> Value {
    json!({ "title": "Inception", "year": 2010, "country": "USA" })
}

pub fn movie_data() -> Value {
    json!({ "movie": inception() })
}

/// A collection of two movies that also answers `count()`.
pub fn movies(deferred: bool) -> Record {
    let first = json!({ "title": "Inception", "year": 2010 });
    let second = json!({ "title": "The Matrix", "year": 1999 });
    if deferred {
        Record::new()
            .deferred_element(move || after_delay(Node::value(first.clone())))
            .deferred_element(move || after_delay(Node::value(second.clone())))
            .async_method("count", |_, _| after_delay(Node::value(2)))
    } else {
        Record::new()
            .element(first)
            .element(second)
            .method("count", |_, _| Ok(Node::value(2)))
    }
}

/// A root object with a `movies` collection, optionally slow to appear.
pub fn catalog(deferred: bool) -> Record {
    if deferred {
        Record::new().deferred_attr("movies", || after_delay(movies(true).into()))
    } else {
        Record::new().attr("movies", movies(false))
    }
}

/// Looks movies up by id or genre. `movie` insists on a valid session.
pub fn movie_service() -> Record {
    Record::new()
        .method("movie", |params, context| {
            let authorized = context
                .get::<Session>()
                .is_some_and(|session| session.access_token == ACCESS_TOKEN);
            if !authorized {
                return Err(TargetError::new("Access denied"));
            }
            match params.first().and_then(|p| p.get("id")).and_then(Value::as_str) {
                Some(MOVIE_ID) => Ok(Node::value(inception())),
                _ => Err(TargetError::new("Movie not found")),
            }
        })
        .method("movies", |params, _| {
            let genre = params
                .first()
                .and_then(|p| p.pointer("/filter/genre"))
                .and_then(Value::as_str);
            Ok(Node::value(match genre {
                Some("action") => json!([{ "title": "Inception" }, { "title": "The Matrix" }]),
                Some("drama") => json!([{ "title": "Forrest Gump" }]),
                _ => json!([]),
            }))
        })
        .method("sum", |params, _| {
            let total: i64 = params.iter().filter_map(Value::as_i64).sum();
            Ok(Node::value(total))
        })
}

pub fn user() -> Record {
    Record::new()
        .attr("_id", json!("abc123"))
        .attr("username", json!("steve"))
        .attr("password", json!("secret"))
        .method("_privateMethod", |_, _| Ok(Node::value("private information")))
}
