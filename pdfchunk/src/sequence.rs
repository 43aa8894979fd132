//! Natural ordering of input files.
//!
//! Names are compared case-insensitively with embedded digit runs taken as
//! numbers, so `file2.pdf` sorts before `file10.pdf`. Ties are broken on the
//! raw name and then on the content origin, which makes the order total and
//! the planner's output reproducible for any enumeration order.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use crate::collect::FileDescriptor;

/// Compare two names in natural order.
///
/// # Examples
///
/// ```
/// use pdfchunk::sequence::natural_cmp;
/// use std::cmp::Ordering;
///
/// assert_eq!(natural_cmp("file2.pdf", "file10.pdf"), Ordering::Less);
/// assert_eq!(natural_cmp("File1.pdf", "file1.PDF"), Ordering::Equal);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let ord = cmp_digit_runs(&l_run, &r_run);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                left.next();
                right.next();
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}

/// Compare digit runs by value, without overflowing on long runs.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a_value = a.trim_start_matches('0');
    let b_value = b.trim_start_matches('0');

    a_value
        .len()
        .cmp(&b_value.len())
        .then_with(|| a_value.cmp(b_value))
        // "7" before "007"
        .then_with(|| a.len().cmp(&b.len()))
}

/// Total order over descriptors used by [`sequence`].
pub fn descriptor_cmp(a: &FileDescriptor, b: &FileDescriptor) -> Ordering {
    natural_cmp(a.name(), b.name())
        .then_with(|| a.name().cmp(b.name()))
        .then_with(|| a.source().origin().cmp(&b.source().origin()))
}

/// Restore a deterministic order over an unordered set of descriptors.
pub fn sequence(mut files: Vec<FileDescriptor>) -> Vec<FileDescriptor> {
    files.sort_by(descriptor_cmp);
    files
}
