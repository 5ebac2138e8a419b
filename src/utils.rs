use std::fmt::{Display, Error, Formatter};

/// Turns a formatting closure into a `Display` value.
pub struct Fmt<F>(pub F)
where
    F: Fn(&mut std::fmt::Formatter) -> std::fmt::Result;

impl<F> std::fmt::Display for Fmt<F>
where
    F: Fn(&mut std::fmt::Formatter) -> std::fmt::Result,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        (self.0)(f)
    }
}

pub fn disp_iter<T: Display>(f: &mut Formatter<'_>, iterable: impl IntoIterator<Item = T>, sep: &str) -> Result<(), Error> {
    let mut i = iterable.into_iter();
    if let Some(first) = i.next() {
        write!(f, "{first}")?;
        for other in i {
            write!(f, "{sep}")?;
            write!(f, "{other}")?;
        }
    }
    Result::Ok(())
}

/// Displays the elements of an unordered collection in a canonical (sorted) order, so that
/// printing a set does not depend on the hasher.
pub fn disp_sorted<T: Display>(f: &mut Formatter<'_>, iterable: impl IntoIterator<Item = T>, sep: &str) -> Result<(), Error> {
    let mut elems: Vec<String> = iterable.into_iter().map(|e| e.to_string()).collect();
    elems.sort();
    disp_iter(f, elems, sep)
}
