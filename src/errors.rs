use std::{
    fmt::{Debug, Display},
    ops::Range,
    sync::Arc,
};

use crate::Sym;
use crate::edn::{Edn, input::Input};
use crate::logic::InvalidBinding;
use annotate_snippets::*;
use itertools::Itertools;
use thiserror::Error;

pub type SrcRange = Range<usize>;

/// A substring of an input, with metadata for displaying (filename, indices, ...)
#[derive(Clone)]
pub struct Span {
    input: Arc<Input>,
    span: SrcRange,
}

impl Span {
    pub fn new(input: Arc<Input>, first: usize, last: usize) -> Self {
        Span {
            input,
            span: first..(last + 1),
        }
    }

    pub fn str(&self) -> &str {
        &self.input.text.as_str()[self.span.clone()]
    }

    pub fn annotate(&self, lvl: Level<'static>, message: impl ToString) -> Annot {
        Annot {
            level: lvl,
            span: self.clone(),
            message: message.to_string(),
        }
    }

    pub fn error(&self, message: impl ToString) -> Annot {
        self.annotate(Level::ERROR, message)
    }

    pub fn info(&self, message: impl ToString) -> Annot {
        self.annotate(Level::INFO, message)
    }

    pub fn invalid(&self, msg: impl ToString) -> Message {
        let msg = msg.to_string();
        if self.span.len() < 40 {
            Message::error(format!("{msg}: {}", self.str())).snippet(self.clone().error(msg))
        } else {
            Message::error(&msg).snippet(self.clone().error(msg))
        }
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[span]")
    }
}

pub trait Spanned: Display {
    fn span(&self) -> Option<&Span>;

    fn span_or_default(&self) -> Span {
        self.span().cloned().unwrap_or_else(|| {
            let text = self.to_string();
            let span = 0..text.len();
            Span {
                input: Arc::new(Input::from_string(text)),
                span,
            }
        })
    }

    fn loc(&self) -> Span {
        self.span_or_default()
    }

    fn invalid(&self, msg: impl ToString) -> Message {
        let msg = msg.to_string();
        let span = self.span_or_default();
        if span.span.len() < 40 {
            // short enough to be written inline in the message
            Message::error(format!("{msg}: {}", span.str())).snippet(span.error(msg))
        } else {
            Message::error(&msg).snippet(span.error(msg))
        }
    }

    fn error(&self, message: impl ToString) -> Annot {
        self.annotate(Level::ERROR, message)
    }

    fn info(&self, message: impl ToString) -> Annot {
        self.annotate(Level::INFO, message)
    }

    fn annotate(&self, lvl: Level<'static>, message: impl ToString) -> Annot {
        Annot {
            level: lvl,
            span: self.span_or_default(),
            message: message.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Annot {
    level: Level<'static>,
    span: Span,
    message: String,
}

impl Annot {
    fn build(&self) -> Snippet<'_, Annotation<'_>> {
        let annotation_kind = match self.level {
            Level::ERROR => AnnotationKind::Primary,
            _ => AnnotationKind::Context,
        };
        let annotation = annotation_kind.span(self.span.span.clone()).label(&self.message);
        let snippet = Snippet::source(&self.span.input.text)
            .line_start(1)
            .fold(true)
            .annotation(annotation);
        if let Some(file) = self.span.input.source.as_ref() {
            snippet.path(file.as_str())
        } else {
            snippet
        }
    }
}

/// A located diagnostic, rendered with the offending part of the input underlined.
#[derive(Error, Clone)]
pub struct Message {
    level: Level<'static>,
    title: String,
    snippets: Vec<Annot>,
    info: Vec<String>,
}

impl Message {
    pub fn new(level: Level<'static>, title: impl ToString) -> Self {
        Self {
            level,
            title: title.to_string(),
            snippets: Vec::new(),
            info: Vec::new(),
        }
    }

    pub fn error(title: impl ToString) -> Self {
        Self::new(Level::ERROR, title)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn snippet(mut self, snippet: Annot) -> Self {
        self.snippets.push(snippet);
        self
    }

    pub fn info(self, s: impl Spanned, msg: &str) -> Message {
        let annot = s.annotate(Level::INFO, msg);
        self.snippet(annot)
    }

    pub fn ctx(mut self, s: impl ToString) -> Message {
        self.info.push(s.to_string());
        self
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let renderer = Renderer::styled();
        let disp = self
            .level
            .clone()
            .primary_title(&self.title)
            .elements(self.snippets.iter().map(|s| s.build()));
        let disp = renderer.render(&[disp]);
        f.write_str(&disp)?;
        for context in &self.info {
            write!(f, "\n  = note: {context}")?;
        }
        Ok(())
    }
}
impl Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

fn seq(items: &[Edn]) -> String {
    format!("[{}]", items.iter().format(" "))
}

fn record_name(name: &Option<String>) -> String {
    match name {
        Some(name) => format!(" ({name})"),
        None => String::new(),
    }
}

/// Reasons for which a problem description could not be loaded.
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error("could not read {path}: {cause}")]
    Io { path: String, cause: Arc<std::io::Error> },
    #[error("{0}")]
    Syntax(Message),
    #[error("could not read formulae: {}", seq(.tokens))]
    FormulaParse { tokens: Vec<Edn>, cause: Message },
    #[error("malformed problem record ({reason})")]
    MalformedRecord { record: Edn, reason: String },
    #[error("malformed action definition ({reason}): {spec}")]
    MalformedAction { spec: Edn, reason: String },
    #[error("parameter `{token}` of action `{action}` is not a variable")]
    VariableType { action: Sym, token: Edn },
    #[error("not a proper instantiation of `{action}`: expected {expected} argument(s) but got {actual}")]
    ArityMismatch { action: Sym, expected: usize, actual: usize },
    #[error("cannot instantiate `{action}`: {cause}")]
    Binding { action: Sym, cause: InvalidBinding },
    #[error("unknown action `{name}`")]
    UnknownAction { name: Sym },
    #[error("action `{name}` is defined more than once")]
    DuplicateActionName { name: Sym, previous: Sym },
    #[error("could not read actions: {} invalid definition(s)", .failures.len())]
    ActionSetParse { failures: Vec<(Edn, LoadError)> },
    #[error("malformed plan ({reason}): {spec}")]
    MalformedPlan { spec: Edn, reason: String },
    #[error("in record #{index}{}: {source}", record_name(.name))]
    InRecord {
        index: usize,
        name: Option<String>,
        source: Box<LoadError>,
    },
}

impl LoadError {
    /// Strips the record context, if any, to get to the error that caused the failure.
    pub fn root(&self) -> &LoadError {
        match self {
            LoadError::InRecord { source, .. } => source.root(),
            e => e,
        }
    }

    /// Builds a located diagnostic pointing at the offending part of the input.
    pub fn to_message(&self) -> Message {
        match self {
            LoadError::Io { .. } => Message::error(self.to_string()),
            LoadError::Syntax(msg) => msg.clone(),
            LoadError::FormulaParse { cause, .. } => cause.clone().ctx("could not read formulae"),
            LoadError::MalformedRecord { record, reason } => {
                Message::error(format!("Malformed problem record: {reason}")).snippet(record.error(reason))
            }
            LoadError::MalformedAction { spec, reason } => {
                Message::error(format!("Malformed action definition: {reason}")).snippet(spec.error(reason))
            }
            LoadError::VariableType { action, token } => token
                .invalid("expected a variable")
                .info(action, "in the parameters of this action"),
            LoadError::ArityMismatch {
                action,
                expected,
                actual,
            } => action.invalid(format!(
                "expected {expected} argument(s) but got {actual} for action"
            )),
            LoadError::Binding { action, cause } => action.invalid(cause),
            LoadError::UnknownAction { name } => name.invalid("unknown action"),
            LoadError::DuplicateActionName { name, previous } => name
                .invalid("duplicate action")
                .info(previous, "previously defined here"),
            LoadError::ActionSetParse { failures } => {
                let mut msg = Message::error(self.to_string());
                for (_, failure) in failures {
                    let failure = failure.to_message();
                    msg.snippets.extend(failure.snippets);
                    msg.info.push(failure.title);
                }
                msg
            }
            LoadError::MalformedPlan { spec, reason } => {
                Message::error(format!("Malformed plan: {reason}")).snippet(spec.error(reason))
            }
            LoadError::InRecord { index, name, source } => source
                .to_message()
                .ctx(format!("while loading record #{index}{}", record_name(name))),
        }
    }
}

impl From<Message> for LoadError {
    fn from(value: Message) -> Self {
        LoadError::Syntax(value)
    }
}
