//! Skip classification for list and delete errors
//!
//! A sweep must tell "nothing to do here" apart from a real failure. A
//! resource that is already gone, or a service that is not offered in the
//! scope, is a skip condition: it is logged and treated as success. The same
//! classifier is applied on the discovery path and on the delete path.

use crate::error::ApiError;

/// Outcome of classifying an adapter error.
#[derive(Debug)]
pub enum Classified {
    /// Nothing to do; treated as an empty listing or a successful delete.
    Skip { reason: String },
    /// A real failure that must be recorded.
    Fatal(anyhow::Error),
}

impl Classified {
    pub fn is_skip(&self) -> bool {
        matches!(self, Classified::Skip { .. })
    }
}

/// Distinguishes skip conditions from fatal errors.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, error: anyhow::Error) -> Classified;
}

/// Classifier built from a closure returning `true` for skip conditions.
pub struct FnClassifier<F>(pub F);

impl<F> ErrorClassifier for FnClassifier<F>
where
    F: Fn(&anyhow::Error) -> bool + Send + Sync,
{
    fn classify(&self, error: anyhow::Error) -> Classified {
        if (self.0)(&error) {
            Classified::Skip {
                reason: format!("{error:#}"),
            }
        } else {
            Classified::Fatal(error)
        }
    }
}

/// Classifier that never skips. Useful when every error must surface.
pub struct NeverSkip;

impl ErrorClassifier for NeverSkip {
    fn classify(&self, error: anyhow::Error) -> Classified {
        Classified::Fatal(error)
    }
}

/// A single skip rule: an error code, optionally narrowed by a message fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipRule {
    pub code: String,
    pub message_contains: Option<String>,
}

impl SkipRule {
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message_contains: None,
        }
    }

    pub fn code_with_message(code: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message_contains: Some(fragment.into()),
        }
    }

    fn matches(&self, err: &ApiError) -> bool {
        if err.code.as_deref() != Some(self.code.as_str()) {
            return false;
        }
        match &self.message_contains {
            Some(fragment) => err.message.contains(fragment.as_str()),
            None => true,
        }
    }
}

/// Codes meaning the resource no longer exists
const NOT_FOUND_CODES: &[&str] = &["NotFoundException", "ResourceNotFoundException"];

/// Codes meaning the service or operation is unavailable in this scope
const UNAVAILABLE_CODES: &[&str] = &["UnsupportedOperation", "AccessDeniedException"];

/// Code and message pairs for unavailable services that share a code with real failures
const UNAVAILABLE_MESSAGES: &[(&str, &str)] = &[
    ("RequestError", "send request failed"),
    ("InvalidAction", "is not available"),
    ("InvalidAction", "Unavailable Operation"),
    ("BadRequestException", "not supported"),
    ("UnauthorizedException", "API is not available in"),
    ("InvalidParameterValue", "Access Denied to API Version"),
    ("InvalidParameterValue", "not permitted in this API version for your account"),
    (
        "UnrecognizedClientException",
        "The security token included in the request is invalid",
    ),
    (
        "ValidationException",
        "Account is not whitelisted to use this feature",
    ),
];

/// Rule-based classifier matching [`ApiError`]s anywhere in the error chain.
#[derive(Debug, Clone)]
pub struct SkipRules {
    rules: Vec<SkipRule>,
}

impl SkipRules {
    /// An empty rule set; every error is fatal.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: SkipRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[SkipRule] {
        &self.rules
    }

    fn matching_rule(&self, error: &anyhow::Error) -> Option<&SkipRule> {
        error
            .chain()
            .filter_map(|cause| cause.downcast_ref::<ApiError>())
            .find_map(|api| self.rules.iter().find(|rule| rule.matches(api)))
    }
}

impl Default for SkipRules {
    fn default() -> Self {
        let rules = NOT_FOUND_CODES
            .iter()
            .chain(UNAVAILABLE_CODES)
            .map(|code| SkipRule::code(*code))
            .chain(
                UNAVAILABLE_MESSAGES
                    .iter()
                    .map(|(code, fragment)| SkipRule::code_with_message(*code, *fragment)),
            )
            .collect();
        Self { rules }
    }
}

impl ErrorClassifier for SkipRules {
    fn classify(&self, error: anyhow::Error) -> Classified {
        match self.matching_rule(&error) {
            Some(rule) => Classified::Skip {
                reason: format!("{} ({error:#})", rule.code),
            },
            None => Classified::Fatal(error),
        }
    }
}
