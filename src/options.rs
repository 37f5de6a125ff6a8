use crate::error::DeeprError;
use deepr_compiler::{CompileOptions, KeyPattern};
use deepr_runtime::{Authorizer, ErrorHandler, EvaluationOptions};
use deepr_types::Context;
use serde_json::Value as Json;

/// Options for a one-shot [`invoke`](crate::invoke): key filtering for the
/// compile step plus context and hooks for the evaluation step.
///
/// # Example
///
/// ```ignore
/// let options = InvokeOptions::new()
///     .context(Context::new(session))
///     .ignore_key("password")
///     .authorizer(|key: &str, _: Operation, _: Option<&[Json]>| key != "secret");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    compile: CompileOptions,
    evaluation: EvaluationOptions,
}

impl InvokeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the key filters from a configuration document such as
    /// `{"ignoreKeys": ["password", {"regex": "^_"}], "acceptKeys": "_id"}`.
    pub fn from_config(config: &Json) -> Result<Self, DeeprError> {
        let compile: CompileOptions = serde_json::from_value(config.clone())?;
        Ok(Self::new().compile_options(compile))
    }

    pub fn context(mut self, context: Context) -> Self {
        self.evaluation = self.evaluation.context(context);
        self
    }

    pub fn ignore_key(mut self, pattern: impl Into<KeyPattern>) -> Self {
        self.compile = self.compile.ignore_key(pattern);
        self
    }

    /// Ignores every key matching the regular expression `pattern`.
    pub fn ignore_key_regex(self, pattern: &str) -> Result<Self, DeeprError> {
        Ok(self.ignore_key(KeyPattern::regex(pattern)?))
    }

    pub fn accept_key(mut self, pattern: impl Into<KeyPattern>) -> Self {
        self.compile = self.compile.accept_key(pattern);
        self
    }

    pub fn ignore_built_in_keys(mut self, ignore: bool) -> Self {
        self.compile = self.compile.ignore_built_in_keys(ignore);
        self
    }

    pub fn authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.evaluation = self.evaluation.authorizer(authorizer);
        self
    }

    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.evaluation = self.evaluation.error_handler(handler);
        self
    }

    pub fn compile_options(mut self, compile: CompileOptions) -> Self {
        self.compile = compile;
        self
    }

    pub fn evaluation_options(mut self, evaluation: EvaluationOptions) -> Self {
        self.evaluation = evaluation;
        self
    }

    pub fn compile(&self) -> &CompileOptions {
        &self.compile
    }

    pub fn evaluation(&self) -> &EvaluationOptions {
        &self.evaluation
    }
}
