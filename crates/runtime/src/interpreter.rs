//! Walks a compiled expression tree against a live target.
use crate::error::EvaluationError;
use crate::options::{EvaluationOptions, Operation};
use deepr_expression::{Continuation, Expression};
use deepr_sequencer::{Eventual, map_seq, map_values};
use deepr_types::{Member, Method, Node, Resolution};
use log::{debug, trace};
use serde_json::{Map, Value as Json};
use std::sync::Arc;

/// Result of one branch. `None` means the branch resolved to nothing.
type Branch = Eventual<'static, Option<Json>, EvaluationError>;
type Step = Eventual<'static, Node, EvaluationError>;

/// The final result of an evaluation.
pub type Evaluation = Eventual<'static, Json, EvaluationError>;

/// Evaluates expressions depth-first, left to right, one step at a time.
///
/// The interpreter holds no per-invocation state besides its options and can
/// be cloned cheaply. Results stay immediate for as long as every attribute,
/// element, method and authorizer answers immediately.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    options: Arc<EvaluationOptions>,
}

impl Interpreter {
    pub fn new(options: EvaluationOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Evaluates `expression` against `target`. An absent result becomes `null`.
    pub fn evaluate(&self, target: impl Into<Node>, expression: &Arc<Expression>) -> Evaluation {
        self.guarded(target.into(), Arc::clone(expression))
            .map(|result| result.unwrap_or(Json::Null))
    }

    /// Evaluates a node and hands any failure to the error handler.
    fn guarded(&self, target: Node, expression: Arc<Expression>) -> Branch {
        let branch = self.evaluate_node(target, expression);
        self.recovering(branch)
    }

    fn recovering(&self, branch: Branch) -> Branch {
        let Some(handler) = self.options.error_handler.clone() else {
            return branch;
        };
        branch.recover(move |error| {
            debug!("Recovering from failed branch: {error}");
            Eventual::from(handler.handle(error).map(Some))
        })
    }

    fn evaluate_node(&self, target: Node, expression: Arc<Expression>) -> Branch {
        let resolved = if expression.source_key.is_empty() {
            Eventual::ready(target)
        } else {
            self.resolve_key(&target, &expression)
        };
        let this = self.clone();
        resolved.and_then(move |value| this.descend(value, expression))
    }

    fn resolve_key(&self, target: &Node, expression: &Expression) -> Step {
        let key = expression.source_key.as_str();
        trace!("Resolving '{key}' on {}", target.kind());

        match (target.member(key), &expression.params) {
            (None, _) if target.is_scalar() => {
                Eventual::failed(EvaluationError::mismatch(key, "object", target.kind()))
            }
            (Some(Member::Method(method)), params) => {
                self.invoke(key, method, params.clone().unwrap_or_default())
            }
            (Some(Member::Attribute(_)), Some(_)) => {
                Eventual::failed(EvaluationError::mismatch(key, "method", "attribute"))
            }
            (None, Some(_)) if expression.is_optional => Eventual::ready(Node::Absent),
            (None, Some(_)) => Eventual::failed(EvaluationError::missing(key)),
            (Some(Member::Attribute(value)), None) => self.read(key, value),
            (None, None) => self.read(key, Eventual::ready(Node::Absent)),
        }
    }

    fn read(&self, key: &str, value: Resolution) -> Step {
        let key = key.to_string();
        self.authorize(&key, Operation::Get, None)
            .and_then(move |allowed| {
                if !allowed {
                    debug!("Authorizer denied reading '{key}'");
                    return Eventual::failed(EvaluationError::denied(&key, Operation::Get));
                }
                value.map_err(EvaluationError::from)
            })
    }

    fn invoke(&self, key: &str, method: Method, params: Vec<Json>) -> Step {
        let key = key.to_string();
        let options = Arc::clone(&self.options);
        self.authorize(&key, Operation::Call, Some(params.as_slice()))
            .and_then(move |allowed| {
                if !allowed {
                    debug!("Authorizer denied calling '{key}'");
                    return Eventual::failed(EvaluationError::denied(&key, Operation::Call));
                }
                trace!("Calling '{key}' with {} params", params.len());
                method
                    .call(&params, &options.context)
                    .map_err(EvaluationError::from)
            })
    }

    fn authorize(
        &self,
        key: &str,
        operation: Operation,
        params: Option<&[Json]>,
    ) -> Eventual<'static, bool, EvaluationError> {
        match &self.options.authorizer {
            Some(authorizer) => authorizer
                .authorize(key, operation, params)
                .map_err(EvaluationError::from),
            None => Eventual::ready(true),
        }
    }

    fn descend(&self, value: Node, expression: Arc<Expression>) -> Branch {
        let value = match &expression.source_value {
            Some(literal) => Node::Value(literal.clone()),
            None => value,
        };

        if expression.is_leaf() {
            return render(value);
        }

        if value.is_void() {
            return void(&expression);
        }

        if !expression.use_collection_elements {
            return self.continue_with(value, &expression);
        }

        let Some(elements) = value.elements() else {
            return Eventual::failed(EvaluationError::mismatch(
                &expression.source_key,
                "collection",
                value.kind(),
            ));
        };
        trace!("Fanning out over {} elements", elements.len());

        let this = self.clone();
        map_seq(elements, move |element| {
            let step = this.clone();
            let expression = Arc::clone(&expression);
            let branch = element
                .map_err(EvaluationError::from)
                .and_then(move |node| {
                    if node.is_void() {
                        return void(&expression);
                    }
                    step.continue_with(node, &expression)
                });
            this.recovering(branch)
        })
        .map(|items| {
            Some(Json::Array(
                items
                    .into_iter()
                    .map(|item| item.unwrap_or(Json::Null))
                    .collect(),
            ))
        })
    }

    fn continue_with(&self, value: Node, expression: &Expression) -> Branch {
        match &expression.continuation {
            Continuation::Leaf => render(value),
            Continuation::Next(next) => self.evaluate_node(value, Arc::clone(next)),
            Continuation::Nested(fields) => {
                let this = self.clone();
                map_values(fields.clone(), move |field| this.guarded(value.clone(), field)).map(
                    |results| {
                        Some(Json::Object(
                            results
                                .into_iter()
                                .filter_map(|(name, result)| result.map(|value| (name, value)))
                                .collect::<Map<String, Json>>(),
                        ))
                    },
                )
            }
        }
    }
}

/// Evaluates `expression` against `target` with the given options.
pub fn evaluate(
    target: impl Into<Node>,
    expression: &Arc<Expression>,
    options: &EvaluationOptions,
) -> Evaluation {
    Interpreter::new(options.clone()).evaluate(target, expression)
}

fn render(node: Node) -> Branch {
    match node {
        Node::Absent => Eventual::ready(None),
        node => node.render().map_err(EvaluationError::from).map(Some),
    }
}

/// Continuing into nothing yields nothing when optional and fails otherwise.
fn void(expression: &Expression) -> Branch {
    if expression.is_optional {
        return Eventual::ready(None);
    }
    Eventual::failed(EvaluationError::undefined(&expression.source_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepr_types::{Context, Record, TargetError};
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn field(name: &str, expression: Expression) -> (String, Expression) {
        (name.to_string(), expression)
    }

    fn root(fields: Vec<(String, Expression)>) -> Arc<Expression> {
        Arc::new(Expression::new("").with_continuation(Continuation::nested(fields)))
    }

    fn leaf(key: &str) -> Expression {
        Expression::new(key)
    }

    fn object(key: &str, fields: Vec<(String, Expression)>) -> Expression {
        Expression::new(key).with_continuation(Continuation::nested(fields))
    }

    fn ready(evaluation: Evaluation) -> Result<Json, EvaluationError> {
        evaluation.into_ready().unwrap()
    }

    fn movie() -> Json {
        json!({ "movie": { "title": "Inception", "year": 2010, "country": "USA" } })
    }

    #[test]
    fn selects_only_the_requested_fields() {
        let expression = root(vec![field(
            "movie",
            object("movie", vec![field("title", leaf("title")), field("year", leaf("year"))]),
        )]);
        let result = ready(evaluate(movie(), &expression, &EvaluationOptions::new())).unwrap();
        assert_eq!(result, json!({ "movie": { "title": "Inception", "year": 2010 } }));
    }

    #[test]
    fn missing_attributes_are_omitted() {
        let expression = root(vec![field(
            "movie",
            object("movie", vec![field("director", leaf("director"))]),
        )]);
        let result = ready(evaluate(movie(), &expression, &EvaluationOptions::new())).unwrap();
        assert_eq!(result, json!({ "movie": {} }));
    }

    #[test]
    fn querying_into_an_absent_value_fails_unless_optional() {
        let nested = |optional| {
            root(vec![field(
                "director",
                object("director", vec![field("name", leaf("name"))]).optional(optional),
            )])
        };
        let error = ready(evaluate(movie(), &nested(false), &EvaluationOptions::new())).unwrap_err();
        assert!(matches!(error, EvaluationError::UndefinedContinuation { ref key } if key == "director"));

        let result = ready(evaluate(movie(), &nested(true), &EvaluationOptions::new())).unwrap();
        assert_eq!(result, json!({}));
    }

    #[test]
    fn querying_into_null_fails_unless_optional() {
        let target = json!({ "movie": { "director": null } });
        let nested = |optional| {
            root(vec![field(
                "movie",
                object(
                    "movie",
                    vec![field(
                        "director",
                        object("director", vec![field("fullName", leaf("fullName"))])
                            .optional(optional),
                    )],
                ),
            )])
        };
        let error = ready(evaluate(target.clone(), &nested(false), &EvaluationOptions::new()))
            .unwrap_err();
        assert!(matches!(error, EvaluationError::UndefinedContinuation { ref key } if key == "director"));

        let result = ready(evaluate(target.clone(), &nested(true), &EvaluationOptions::new())).unwrap();
        assert_eq!(result, json!({ "movie": {} }));

        let selected = root(vec![field("movie", object("movie", vec![field("director", leaf("director"))]))]);
        let result = ready(evaluate(target, &selected, &EvaluationOptions::new())).unwrap();
        assert_eq!(result, json!({ "movie": { "director": null } }));
    }

    #[test]
    fn null_elements_and_null_collections_fail_alike() {
        let over = |optional| {
            root(vec![field(
                "movies",
                object("movies", vec![field("title", leaf("title"))])
                    .over_elements()
                    .optional(optional),
            )])
        };
        let error = ready(evaluate(
            json!({ "movies": [{ "title": "A" }, null] }),
            &over(false),
            &EvaluationOptions::new(),
        ))
        .unwrap_err();
        assert!(matches!(error, EvaluationError::UndefinedContinuation { ref key } if key == "movies"));

        let error = ready(evaluate(json!({ "movies": null }), &over(false), &EvaluationOptions::new()))
            .unwrap_err();
        assert!(matches!(error, EvaluationError::UndefinedContinuation { ref key } if key == "movies"));

        let result = ready(evaluate(
            json!({ "movies": [{ "title": "A" }, null] }),
            &over(true),
            &EvaluationOptions::new(),
        ))
        .unwrap();
        assert_eq!(result, json!({ "movies": [{ "title": "A" }, null] }));
    }

    #[test]
    fn continuing_into_a_scalar_is_a_type_mismatch() {
        let expression = root(vec![field(
            "movie",
            object("movie", vec![field("title", object("title", vec![field("length", leaf("length"))]))]),
        )]);
        let error = ready(evaluate(movie(), &expression, &EvaluationOptions::new())).unwrap_err();
        assert!(matches!(
            error,
            EvaluationError::TypeMismatch { ref key, expected: "object", found: "string" } if key == "length"
        ));

        let built_in = root(vec![field(
            "year",
            Expression::new("year")
                .with_continuation(Continuation::next(leaf("toString").with_params(vec![]))),
        )]);
        let result = ready(evaluate(json!({ "year": 2010 }), &built_in, &EvaluationOptions::new())).unwrap();
        assert_eq!(result, json!({ "year": "2010" }));
    }

    #[test]
    fn fan_out_keeps_order_and_shape() {
        let target = json!({ "movies": [
            { "title": "Inception", "year": 2010 },
            { "title": "The Matrix", "year": 1999 }
        ]});
        let expression = root(vec![field(
            "movies",
            object("movies", vec![field("title", leaf("title"))]).over_elements(),
        )]);
        let result = ready(evaluate(target, &expression, &EvaluationOptions::new())).unwrap();
        assert_eq!(
            result,
            json!({ "movies": [{ "title": "Inception" }, { "title": "The Matrix" }] })
        );
    }

    #[test]
    fn fan_out_over_a_scalar_is_a_type_mismatch() {
        let expression = root(vec![field(
            "title",
            object("title", vec![field("x", leaf("x"))]).over_elements(),
        )]);
        let error = ready(evaluate(json!({ "title": "Inception" }), &expression, &EvaluationOptions::new()))
            .unwrap_err();
        assert!(matches!(
            error,
            EvaluationError::TypeMismatch { expected: "collection", found: "string", .. }
        ));
    }

    #[test]
    fn pass_through_collapses_into_the_parent_slot() {
        let expression = root(vec![field(
            "movie",
            Expression::new("movie").with_continuation(Continuation::next(leaf("title"))),
        )]);
        let result = ready(evaluate(movie(), &expression, &EvaluationOptions::new())).unwrap();
        assert_eq!(result, json!({ "movie": "Inception" }));
    }

    #[test]
    fn source_value_replaces_the_resolved_value() {
        let expression = root(vec![field(
            "greeting",
            object("", vec![field("text", leaf("text"))]).with_source_value(json!({ "text": "hi" })),
        )]);
        let result = ready(evaluate(json!({}), &expression, &EvaluationOptions::new())).unwrap();
        assert_eq!(result, json!({ "greeting": { "text": "hi" } }));
    }

    #[test]
    fn methods_receive_params_and_context() {
        let target = Record::new().method("greet", |params, context| {
            let name = params.first().and_then(Json::as_str).unwrap_or("nobody");
            let token = context.get::<String>().cloned().unwrap_or_default();
            Ok(Node::value(format!("hello {name} ({token})")))
        });
        let expression = root(vec![field(
            "greeting",
            leaf("greet").with_params(vec![json!("Ada")]),
        )]);
        let options = EvaluationOptions::new().context(Context::new("secret".to_string()));
        let result = ready(evaluate(target, &expression, &options)).unwrap();
        assert_eq!(result, json!({ "greeting": "hello Ada (secret)" }));
    }

    #[test]
    fn methods_are_invoked_without_params_too() {
        let target = Record::new().method("count", |params, _| Ok(Node::value(params.len())));
        let expression = root(vec![field("count", leaf("count"))]);
        let result = ready(evaluate(target, &expression, &EvaluationOptions::new())).unwrap();
        assert_eq!(result, json!({ "count": 0 }));
    }

    #[test]
    fn params_on_an_attribute_are_a_type_mismatch() {
        let expression = root(vec![field("title", leaf("title").with_params(vec![]))]);
        let error = ready(evaluate(json!({ "title": "x" }), &expression, &EvaluationOptions::new()))
            .unwrap_err();
        assert!(matches!(error, EvaluationError::TypeMismatch { expected: "method", .. }));
    }

    #[test]
    fn calling_a_missing_method() {
        let call = |optional| root(vec![field("find", leaf("find").with_params(vec![]).optional(optional))]);
        let error = ready(evaluate(json!({}), &call(false), &EvaluationOptions::new())).unwrap_err();
        assert!(matches!(error, EvaluationError::MissingMember { ref key } if key == "find"));
        let result = ready(evaluate(json!({}), &call(true), &EvaluationOptions::new())).unwrap();
        assert_eq!(result, json!({}));
    }

    #[test]
    fn authorizer_gates_reads_and_calls() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let options = EvaluationOptions::new().authorizer(
            move |key: &str, operation: Operation, params: Option<&[Json]>| {
                log.lock().unwrap().push(format!("{operation} {key} {}", params.is_some()));
                key != "password"
            },
        );
        let target = Record::new()
            .attr("username", json!("ada"))
            .attr("password", json!("hunter2"))
            .method("ping", |_, _| Ok(Node::value("pong")));

        let expression = root(vec![field("username", leaf("username")), field("ping", leaf("ping"))]);
        let result = ready(evaluate(target.clone(), &expression, &options)).unwrap();
        assert_eq!(result, json!({ "username": "ada", "ping": "pong" }));
        assert_eq!(*seen.lock().unwrap(), vec!["get username false", "call ping true"]);

        let expression = root(vec![field("password", leaf("password"))]);
        let error = ready(evaluate(target, &expression, &options)).unwrap_err();
        assert!(matches!(
            error,
            EvaluationError::Authorization { ref key, operation: Operation::Get } if key == "password"
        ));
    }

    #[test]
    fn target_errors_propagate_unchanged() {
        let target = Record::new().method("explode", |_, _| Err(TargetError::new("boom")));
        let expression = root(vec![field("explode", leaf("explode"))]);
        let error = ready(evaluate(target, &expression, &EvaluationOptions::new())).unwrap_err();
        assert!(matches!(error, EvaluationError::Target(ref e) if e.message() == "boom"));
    }

    #[test]
    fn error_handler_recovers_each_branch() {
        let target = Record::new()
            .attr("title", json!("Inception"))
            .method("explode", |_, _| Err(TargetError::new("boom")));
        let expression = root(vec![
            field("title", leaf("title")),
            field("explode", leaf("explode")),
        ]);
        let options = EvaluationOptions::new().error_handler(
            |error: EvaluationError| -> Result<Json, EvaluationError> {
                Ok(json!({ "error": error.to_string() }))
            },
        );
        let result = ready(evaluate(target, &expression, &options)).unwrap();
        assert_eq!(
            result,
            json!({ "title": "Inception", "explode": { "error": "boom" } })
        );
    }

    #[test]
    fn error_handler_recovers_fan_out_elements() {
        let movies = Node::List(vec![
            Record::new()
                .method("title", |_, _| Ok(Node::value("A")))
                .into(),
            Node::value(json!({ "title": "B" })),
        ]);
        let target = Record::new().attr("movies", movies);
        let expression = root(vec![field(
            "movies",
            Expression::new("movies")
                .over_elements()
                .with_continuation(Continuation::next(leaf("title").with_params(vec![]))),
        )]);
        let options = EvaluationOptions::new()
            .error_handler(|_: EvaluationError| -> Result<Json, EvaluationError> { Ok(json!("fallback")) });
        let result = ready(evaluate(target, &expression, &options)).unwrap();
        assert_eq!(result, json!({ "movies": ["A", "fallback"] }));
    }

    #[test]
    fn error_handler_may_rethrow() {
        let expression = root(vec![field("x", leaf("x").with_params(vec![]))]);
        let options = EvaluationOptions::new()
            .error_handler(|error: EvaluationError| -> Result<Json, EvaluationError> { Err(error) });
        let error = ready(evaluate(json!({}), &expression, &options)).unwrap_err();
        assert!(matches!(error, EvaluationError::MissingMember { .. }));
    }

    fn delayed_movie() -> Record {
        Record::new().deferred_attr("movie", || async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(Node::from(
                Record::new()
                    .attr("title", json!("Inception"))
                    .deferred_attr("year", || async { Ok(Node::value(2010)) }),
            ))
        })
    }

    #[tokio::test]
    async fn deferred_members_give_the_same_result() {
        let expression = root(vec![field(
            "movie",
            object("movie", vec![field("title", leaf("title")), field("year", leaf("year"))]),
        )]);
        let evaluation = evaluate(delayed_movie(), &expression, &EvaluationOptions::new());
        assert!(evaluation.is_deferred());
        assert_eq!(
            evaluation.await.unwrap(),
            json!({ "movie": { "title": "Inception", "year": 2010 } })
        );
    }

    #[tokio::test]
    async fn leaves_holding_targets_wait_for_deferred_members() {
        let expression = root(vec![field("movie", leaf("movie"))]);
        let evaluation = evaluate(delayed_movie(), &expression, &EvaluationOptions::new());
        assert_eq!(
            evaluation.await.unwrap(),
            json!({ "movie": { "title": "Inception", "year": 2010 } })
        );
    }

    #[tokio::test]
    async fn deferred_elements_and_methods() {
        let target = Record::new().async_method("movies", |_, _| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(Node::from(
                Record::new()
                    .element(json!({ "title": "A" }))
                    .deferred_element(|| async { Ok(Node::value(json!({ "title": "B" }))) }),
            ))
        });
        let expression = root(vec![field(
            "movies",
            object("movies", vec![field("title", leaf("title"))]).over_elements(),
        )]);
        let result = evaluate(target, &expression, &EvaluationOptions::new()).await;
        assert_eq!(result.unwrap(), json!({ "movies": [{ "title": "A" }, { "title": "B" }] }));
    }

    #[tokio::test]
    async fn deferred_failures_reach_the_error_handler() {
        let target = Record::new()
            .deferred_attr("broken", || async { Err(TargetError::new("later boom")) })
            .attr("ok", json!(true));
        let expression = root(vec![field("broken", leaf("broken")), field("ok", leaf("ok"))]);
        let options = EvaluationOptions::new()
            .error_handler(|error: EvaluationError| -> Result<Json, EvaluationError> {
                Ok(json!(error.to_string()))
            });
        let result = evaluate(target, &expression, &options).await.unwrap();
        assert_eq!(result, json!({ "broken": "later boom", "ok": true }));
    }

    #[test]
    fn evaluation_leaves_the_tree_untouched() {
        let expression = root(vec![field("movie", object("movie", vec![field("title", leaf("title"))]))]);
        let before = (*expression).clone();
        let interpreter = Interpreter::default();
        for _ in 0..2 {
            ready(interpreter.evaluate(movie(), &expression)).unwrap();
        }
        assert_eq!(*expression, before);
    }
}
