//! Default first-order logic, written as s-expressions.
//!
//! ```text
//! (on ?x table)                      atomic formula
//! (not F) (and F ...) (or F ...)     connectives
//! (if F G) (implies F G) (iff F G)
//! (forall [?x ?y] F) (exists ?x F)   quantifiers
//! ```
//!
//! Variables are symbols starting with `?`. Any other symbol, as well as a string, is a constant
//! and `(f t ...)` in argument position is a compound term.

use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::Sym;
use crate::edn::Edn;
use crate::errors::{Message, Spanned};
use crate::logic::{Binding, Logic, Term};

/// A logic variable such as `?x`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Var(Sym);

impl Var {
    pub fn new(name: impl Into<Sym>) -> Self {
        Var(name.into())
    }

    pub fn name(&self) -> &Sym {
        &self.0
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum FolTerm {
    Var(Var),
    Const(Sym),
    /// A string literal, e.g., `"ball 1"`. Distinct from the constant of the same text.
    Str(Sym),
    /// Function application, e.g., `(top-of tower1)`
    App(Sym, Vec<FolTerm>),
}

impl FolTerm {
    pub fn constant(name: impl Into<Sym>) -> Self {
        FolTerm::Const(name.into())
    }

    pub fn is_ground(&self) -> bool {
        match self {
            FolTerm::Var(_) => false,
            FolTerm::Const(_) | FolTerm::Str(_) => true,
            FolTerm::App(_, args) => args.iter().all(FolTerm::is_ground),
        }
    }

    fn substitute(&self, binding: &Binding<Fol>, shadowed: &[Var]) -> FolTerm {
        match self {
            FolTerm::Var(v) if !shadowed.contains(v) => match binding.get(v) {
                Some(value) => value.clone(),
                None => self.clone(),
            },
            FolTerm::Var(_) | FolTerm::Const(_) | FolTerm::Str(_) => self.clone(),
            FolTerm::App(f, args) => FolTerm::App(
                f.clone(),
                args.iter().map(|a| a.substitute(binding, shadowed)).collect(),
            ),
        }
    }
}

impl Display for FolTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FolTerm::Var(v) => write!(f, "{v}"),
            FolTerm::Const(c) => write!(f, "{c}"),
            FolTerm::Str(s) => write!(f, "{:?}", s.as_str()),
            FolTerm::App(func, args) => write!(f, "({func} {})", args.iter().format(" ")),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Formula {
    /// Predicate applied to its arguments, e.g. `(on a table)`. A proposition has no arguments.
    Pred(Sym, Vec<FolTerm>),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Iff(Box<Formula>, Box<Formula>),
    Forall(Vec<Var>, Box<Formula>),
    Exists(Vec<Var>, Box<Formula>),
}

impl Formula {
    pub fn pred(name: impl Into<Sym>, args: impl IntoIterator<Item = FolTerm>) -> Self {
        Formula::Pred(name.into(), args.into_iter().collect())
    }

    fn substitute(&self, binding: &Binding<Fol>, shadowed: &mut Vec<Var>) -> Formula {
        let all = |fs: &[Formula], shadowed: &mut Vec<Var>| -> Vec<Formula> {
            fs.iter().map(|f| f.substitute(binding, shadowed)).collect()
        };
        match self {
            Formula::Pred(p, args) => Formula::Pred(
                p.clone(),
                args.iter().map(|a| a.substitute(binding, shadowed)).collect(),
            ),
            Formula::Not(f) => Formula::Not(Box::new(f.substitute(binding, shadowed))),
            Formula::And(fs) => Formula::And(all(fs, shadowed)),
            Formula::Or(fs) => Formula::Or(all(fs, shadowed)),
            Formula::Implies(a, b) => Formula::Implies(
                Box::new(a.substitute(binding, shadowed)),
                Box::new(b.substitute(binding, shadowed)),
            ),
            Formula::Iff(a, b) => Formula::Iff(
                Box::new(a.substitute(binding, shadowed)),
                Box::new(b.substitute(binding, shadowed)),
            ),
            Formula::Forall(vars, body) | Formula::Exists(vars, body) => {
                // quantified variables hide the binding in the body
                let depth = shadowed.len();
                shadowed.extend(vars.iter().cloned());
                let body = Box::new(body.substitute(binding, shadowed));
                shadowed.truncate(depth);
                match self {
                    Formula::Forall(..) => Formula::Forall(vars.clone(), body),
                    _ => Formula::Exists(vars.clone(), body),
                }
            }
        }
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Pred(p, args) if args.is_empty() => write!(f, "{p}"),
            Formula::Pred(p, args) => write!(f, "({p} {})", args.iter().format(" ")),
            Formula::Not(a) => write!(f, "(not {a})"),
            Formula::And(fs) if fs.is_empty() => write!(f, "(and)"),
            Formula::And(fs) => write!(f, "(and {})", fs.iter().format(" ")),
            Formula::Or(fs) if fs.is_empty() => write!(f, "(or)"),
            Formula::Or(fs) => write!(f, "(or {})", fs.iter().format(" ")),
            Formula::Implies(a, b) => write!(f, "(if {a} {b})"),
            Formula::Iff(a, b) => write!(f, "(iff {a} {b})"),
            Formula::Forall(vs, body) => write!(f, "(forall [{}] {body})", vs.iter().format(" ")),
            Formula::Exists(vs, body) => write!(f, "(exists [{}] {body})", vs.iter().format(" ")),
        }
    }
}

/// First-order logic over s-expressions.
#[derive(Copy, Clone, Debug, Default)]
pub struct Fol;

fn is_variable(sym: &Sym) -> bool {
    sym.as_str().starts_with('?') && sym.as_str().len() > 1
}

fn read_term(e: &Edn) -> Result<FolTerm, Message> {
    match e {
        Edn::Atom(a) if is_variable(a) => Ok(FolTerm::Var(Var(a.clone()))),
        Edn::Atom(a) => Ok(FolTerm::Const(a.clone())),
        Edn::Str(s) => Ok(FolTerm::Str(s.clone())),
        Edn::Seq(s) => {
            let (head, args) = s
                .items()
                .split_first()
                .ok_or_else(|| e.invalid("expected a term but got an empty list"))?;
            let func = head
                .as_atom()
                .filter(|a| !is_variable(a))
                .ok_or_else(|| head.invalid("expected a function symbol"))?;
            let args = args.iter().map(read_term).collect::<Result<Vec<_>, _>>()?;
            Ok(FolTerm::App(func.clone(), args))
        }
        _ => Err(e.invalid("expected a term")),
    }
}

/// Variables of a quantifier: `?x`, `[?x ?y]` or `(?x ?y)`
fn read_binder(e: &Edn) -> Result<Vec<Var>, Message> {
    let items = match e {
        Edn::Atom(_) => std::slice::from_ref(e),
        Edn::Seq(s) => s.items(),
        _ => return Err(e.invalid("expected quantified variables")),
    };
    items
        .iter()
        .map(|v| match v.as_atom() {
            Some(a) if is_variable(a) => Ok(Var(a.clone())),
            _ => Err(v.invalid("expected a variable")),
        })
        .collect()
}

fn read_formula(e: &Edn) -> Result<Formula, Message> {
    match e {
        Edn::Atom(a) if is_variable(a) => Err(e.invalid("expected a formula but got a variable")),
        Edn::Atom(a) => Ok(Formula::Pred(a.clone(), Vec::new())),
        Edn::Seq(s) => {
            let (head, args) = s
                .items()
                .split_first()
                .ok_or_else(|| e.invalid("expected a formula but got an empty list"))?;
            let head = head
                .as_atom()
                .ok_or_else(|| head.invalid("expected a predicate or a connective"))?;
            let all = |args: &[Edn]| args.iter().map(read_formula).collect::<Result<Vec<_>, _>>();
            match head.as_str() {
                "not" => match args {
                    [a] => Ok(Formula::Not(Box::new(read_formula(a)?))),
                    _ => Err(e.invalid("`not` expects exactly one argument")),
                },
                "and" => Ok(Formula::And(all(args)?)),
                "or" => Ok(Formula::Or(all(args)?)),
                "if" | "implies" => match args {
                    [a, b] => Ok(Formula::Implies(Box::new(read_formula(a)?), Box::new(read_formula(b)?))),
                    _ => Err(e.invalid("implication expects exactly two arguments")),
                },
                "iff" => match args {
                    [a, b] => Ok(Formula::Iff(Box::new(read_formula(a)?), Box::new(read_formula(b)?))),
                    _ => Err(e.invalid("`iff` expects exactly two arguments")),
                },
                "forall" | "exists" => match args {
                    [binder, body] => {
                        let vars = read_binder(binder)?;
                        let body = Box::new(read_formula(body)?);
                        if head.as_str() == "forall" {
                            Ok(Formula::Forall(vars, body))
                        } else {
                            Ok(Formula::Exists(vars, body))
                        }
                    }
                    _ => Err(e.invalid("quantifiers expect a list of variables and a body")),
                },
                _ if is_variable(head) => Err(head.invalid("expected a predicate but got a variable")),
                _ => {
                    let args = args.iter().map(read_term).collect::<Result<Vec<_>, _>>()?;
                    Ok(Formula::Pred(head.clone(), args))
                }
            }
        }
        _ => Err(e.invalid("expected a formula")),
    }
}

impl Logic for Fol {
    type Formula = Formula;
    type Value = FolTerm;
    type Variable = Var;

    fn read_formula(&self, expr: &Edn) -> Result<Formula, Message> {
        read_formula(expr)
    }

    fn read_term(&self, expr: &Edn) -> Result<Term<Self>, Message> {
        Ok(match read_term(expr)? {
            FolTerm::Var(v) => Term::Variable(v),
            value => Term::Value(value),
        })
    }

    fn is_ground(&self, value: &FolTerm) -> bool {
        value.is_ground()
    }

    fn substitute(&self, formula: &Formula, binding: &Binding<Self>) -> Formula {
        if binding.is_empty() {
            return formula.clone();
        }
        formula.substitute(binding, &mut Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edn::reader::read_one;

    fn formula(s: &str) -> Formula {
        Fol.read_formula(&read_one(s).unwrap()).unwrap()
    }

    fn value(s: &str) -> FolTerm {
        Fol.read_term(&read_one(s).unwrap()).unwrap().into_value().unwrap()
    }

    #[test]
    fn reads_formulas() {
        let f = formula("(on ?x table)");
        assert_eq!(
            f,
            Formula::pred("on", [FolTerm::Var(Var::new("?x")), FolTerm::constant("table")])
        );
        assert_eq!(formula("raining"), Formula::pred("raining", []));
        let f = formula("(forall [?x] (if (block ?x) (not (on ?x (top-of ?x)))))");
        assert_eq!(f.to_string(), "(forall [?x] (if (block ?x) (not (on ?x (top-of ?x)))))");
        assert_eq!(formula("(exists ?y (and (p ?y) q))").to_string(), "(exists [?y] (and (p ?y) q))");
    }

    #[test]
    fn rejects_malformed_formulas() {
        for bad in ["()", "?x", "(?p a)", "(not a b)", "(iff a)", "(forall a (p a))", "\"str\"", ":k", "{}", "(p ())"] {
            let e = read_one(bad).unwrap();
            assert!(Fol.read_formula(&e).is_err(), "{bad} should not be read as a formula");
        }
    }

    #[test]
    fn terms() {
        let t = Fol.read_term(&read_one("?x").unwrap()).unwrap();
        assert_eq!(t.into_variable(), Some(Var::new("?x")));
        assert!(value("a").is_ground());
        assert!(value("(f a (g b))").is_ground());
        assert!(!value("(f ?x)").is_ground());
        assert!(Fol.read_term(&read_one("()").unwrap()).is_err());
        assert!(Fol.read_term(&read_one("(?f a)").unwrap()).is_err());
    }

    #[test]
    fn strings_are_constants() {
        let s = value("\"ball 1\"");
        assert!(s.is_ground());
        assert_eq!(s, FolTerm::Str("ball 1".into()));
        assert_ne!(value("\"a\""), value("a"));
        assert_eq!(s.to_string(), "\"ball 1\"");
        let f = formula("(named x \"A\")");
        assert_eq!(f.to_string(), "(named x \"A\")");
        // a string is a value, not a formula
        assert!(Fol.read_formula(&read_one("\"A\"").unwrap()).is_err());
    }

    #[test]
    fn substitution_replaces_free_variables_only() {
        let binding: Binding<Fol> = Binding::new(&[Var::new("?x")], [FolTerm::constant("a")]).unwrap();
        let f = formula("(and (clear ?x) (forall [?x] (p ?x)) (q (f ?x ?y)))");
        assert_eq!(
            Fol.substitute(&f, &binding),
            formula("(and (clear a) (forall [?x] (p ?x)) (q (f a ?y)))")
        );
    }
}
