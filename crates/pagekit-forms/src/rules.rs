#![forbid(unsafe_code)]

//! Model validation rules.
//!
//! A [`ModelValidator`] turns a model into a list of [`ValidationFailure`]s.
//! Closures work directly; [`Rules`] is a small builder for the common
//! field checks:
//!
//! ```
//! use pagekit_forms::rules::{ModelValidator, Rules};
//!
//! struct Signup {
//!     email: String,
//!     password: String,
//!     confirm: String,
//! }
//!
//! let rules = Rules::new()
//!     .required("Email", |m: &Signup| m.email.as_str())
//!     .min_len("Password", 8, |m: &Signup| m.password.as_str())
//!     .check("Passwords do not match.", |m: &Signup| m.password == m.confirm);
//!
//! let failures = rules.validate(&Signup {
//!     email: String::new(),
//!     password: "hunter2".into(),
//!     confirm: "hunter3".into(),
//! });
//! assert_eq!(failures.len(), 3);
//! assert!(failures[2].members.is_empty());
//! ```

use std::fmt;

use pagekit_i18n::interpolate;

/// One failed rule: the affected members and a message in source language.
/// No members means the failure concerns the whole object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub members: Vec<String>,
    pub message: String,
}

impl ValidationFailure {
    #[must_use]
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            members: vec![name.into()],
            message: message.into(),
        }
    }

    #[must_use]
    pub fn fields<I, S>(names: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: names.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn object(message: impl Into<String>) -> Self {
        Self {
            members: Vec::new(),
            message: message.into(),
        }
    }
}

/// Whole-object validation.
pub trait ModelValidator<M> {
    fn validate(&self, model: &M) -> Vec<ValidationFailure>;
}

impl<M, F> ModelValidator<M> for F
where
    F: Fn(&M) -> Vec<ValidationFailure>,
{
    fn validate(&self, model: &M) -> Vec<ValidationFailure> {
        self(model)
    }
}

type Rule<M> = Box<dyn Fn(&M) -> Option<ValidationFailure>>;

/// Builder of field and object rules, evaluated in insertion order.
pub struct Rules<M> {
    rules: Vec<Rule<M>>,
}

impl<M: 'static> Rules<M> {
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    fn rule(mut self, rule: impl Fn(&M) -> Option<ValidationFailure> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Fails when the value is empty or whitespace.
    #[must_use]
    pub fn required(self, field: &str, value: impl Fn(&M) -> &str + 'static) -> Self {
        let field = field.to_string();
        self.rule(move |m| {
            value(m).trim().is_empty().then(|| {
                ValidationFailure::field(
                    &field,
                    interpolate("The {field} field is required.", &[("field", field.as_str())]),
                )
            })
        })
    }

    /// Fails when a non-empty value is shorter than `min` characters. Empty
    /// values are left to [`required`](Self::required).
    #[must_use]
    pub fn min_len(self, field: &str, min: usize, value: impl Fn(&M) -> &str + 'static) -> Self {
        let field = field.to_string();
        self.rule(move |m| {
            let len = value(m).chars().count();
            (len > 0 && len < min).then(|| {
                ValidationFailure::field(
                    &field,
                    interpolate(
                        "The field {field} must have a minimum length of {min}.",
                        &[("field", field.as_str()), ("min", min.to_string().as_str())],
                    ),
                )
            })
        })
    }

    /// Fails when the value is longer than `max` characters.
    #[must_use]
    pub fn max_len(self, field: &str, max: usize, value: impl Fn(&M) -> &str + 'static) -> Self {
        let field = field.to_string();
        self.rule(move |m| {
            (value(m).chars().count() > max).then(|| {
                ValidationFailure::field(
                    &field,
                    interpolate(
                        "The field {field} must have a maximum length of {max}.",
                        &[("field", field.as_str()), ("max", max.to_string().as_str())],
                    ),
                )
            })
        })
    }

    /// Fails with `message` on `field` when `valid` returns false.
    #[must_use]
    pub fn custom(
        self,
        field: &str,
        message: &str,
        valid: impl Fn(&M) -> bool + 'static,
    ) -> Self {
        let failure = ValidationFailure::field(field, message);
        self.rule(move |m| (!valid(m)).then(|| failure.clone()))
    }

    /// Object-level rule: fails with `message` when `valid` returns false.
    #[must_use]
    pub fn check(self, message: &str, valid: impl Fn(&M) -> bool + 'static) -> Self {
        let failure = ValidationFailure::object(message);
        self.rule(move |m| (!valid(m)).then(|| failure.clone()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<M: 'static> Default for Rules<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ModelValidator<M> for Rules<M> {
    fn validate(&self, model: &M) -> Vec<ValidationFailure> {
        self.rules.iter().filter_map(|rule| rule(model)).collect()
    }
}

impl<M> fmt::Debug for Rules<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules")
            .field("rules", &self.rules.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Customer {
        name: String,
        code: String,
    }

    fn rules() -> Rules<Customer> {
        Rules::new()
            .required("Name", |c: &Customer| c.name.as_str())
            .min_len("Code", 3, |c: &Customer| c.code.as_str())
            .max_len("Code", 5, |c: &Customer| c.code.as_str())
    }

    #[test]
    fn required_rejects_whitespace() {
        let failures = rules().validate(&Customer {
            name: "   ".into(),
            code: "ABC".into(),
        });
        assert_eq!(
            failures,
            vec![ValidationFailure::field("Name", "The Name field is required.")]
        );
    }

    #[test]
    fn length_bounds_count_chars() {
        let short = rules().validate(&Customer {
            name: "Ada".into(),
            code: "ŁÓ".into(),
        });
        assert_eq!(
            short[0].message,
            "The field Code must have a minimum length of 3."
        );

        let ok = rules().validate(&Customer {
            name: "Ada".into(),
            code: "ŁÓDŹ".into(),
        });
        assert!(ok.is_empty());

        let long = rules().validate(&Customer {
            name: "Ada".into(),
            code: "ABCDEF".into(),
        });
        assert_eq!(long[0].members, ["Code"]);
        assert!(long[0].message.contains("maximum length of 5"));
    }

    #[test]
    fn empty_value_skips_min_len() {
        let failures = rules().validate(&Customer::default());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].members, ["Name"]);
    }

    #[test]
    fn closures_are_validators() {
        let validator = |c: &Customer| {
            if c.name == c.code {
                vec![ValidationFailure::fields(["Name", "Code"], "Must differ.")]
            } else {
                Vec::new()
            }
        };
        let failures = validator.validate(&Customer {
            name: "X".into(),
            code: "X".into(),
        });
        assert_eq!(failures[0].members, ["Name", "Code"]);
    }

    #[test]
    fn custom_and_check() {
        let rules = Rules::new()
            .custom("Code", "Code must be upper case.", |c: &Customer| {
                c.code.chars().all(|ch| !ch.is_lowercase())
            })
            .check("Customer is incomplete.", |c: &Customer| !c.name.is_empty());
        let failures = rules.validate(&Customer {
            name: String::new(),
            code: "abc".into(),
        });
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[1], ValidationFailure::object("Customer is incomplete."));
    }
}
