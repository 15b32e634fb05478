//! Livespan: a token-stream formatter core for Swift type syntax.
//!
//! Rules rewrite a file by editing a [`TokenStream`] in place. Analysis
//! results are held as [`LiveRange`]s, token intervals registered with the
//! stream that adjust themselves on every insertion and removal, so a rule
//! can classify a type, edit around it, and keep using the same range.
//!
//! # Architecture
//!
//! - [`lexer`] turns source text into [`Token`]s; concatenating token text
//!   always reproduces the input.
//! - [`stream`] owns the tokens and the table of live ranges, and notifies
//!   every range atomically with each edit.
//! - [`shape`] classifies a range as scalar, tuple, array, dictionary or
//!   closure and strips redundant parentheses.
//! - [`rules`] and [`engine`] run the built-in rules (after any custom
//!   textual rules) and collect [`Change`] records for the [`report`]ers.
//!
//! # Example
//!
//! ```
//! use livespan::{LiveRange, TokenStream, TypeShape};
//!
//! let stream = TokenStream::from_source("let x: ((Int, String)) -> Bool");
//! let ty = LiveRange::new(&stream, 5, stream.len() - 1).unwrap();
//! assert_eq!(ty.shape().unwrap(), TypeShape::Closure);
//!
//! // drop the outer parens of the parameter clause, closer first
//! stream.remove(12..=12).unwrap();
//! stream.remove(5..=5).unwrap();
//! assert_eq!(ty.text().unwrap(), "(Int, String) -> Bool");
//! assert_eq!(ty.shape().unwrap(), TypeShape::Closure);
//! ```

pub mod config;
pub mod custom;
pub mod engine;
pub mod lexer;
pub mod output;
pub mod range;
pub mod report;
pub mod rules;
pub mod scope;
pub mod shape;
pub mod stream;
pub mod token;
pub mod types;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, FormatConfig, FormatOptions};
pub use custom::{CustomRule, CustomRuleError};
pub use engine::{Change, FormatError, FormatOutput, Formatter};
pub use range::LiveRange;
pub use report::{ReportError, Reporter, ReporterKind};
pub use rules::{Rule, RuleContext, RuleRegistry};
pub use scope::{match_scope, Direction};
pub use shape::{Classifier, TypeShape};
pub use stream::{StreamError, TokenStream};
pub use token::{OperatorFixity, Token};
