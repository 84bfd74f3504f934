// Name normalization for process and job identifiers

/// Characters that collapse into a single `-` separator.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '*' | ',' | '.' | '-')
}

fn trim_slug(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '-')
}

/// Collapse every run of characters matching `pred` into one `-`.
fn collapse_runs(s: &str, pred: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;

    for c in s.chars() {
        if pred(c) {
            if !in_run {
                out.push('-');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }

    out
}

/// Normalize a raw process or job name into its canonical slug.
///
/// Trims, lower-cases, collapses runs of whitespace, `*`, `,`, `.` and `-`
/// into a single `-`, then strips leading and trailing separators.
/// Idempotent: `normalize_name(&normalize_name(s)) == normalize_name(s)`.
///
/// # Example
/// ```
/// use recall_core::domain::normalize_name;
///
/// assert_eq!(normalize_name("  Hello, World.  "), "hello-world");
/// assert_eq!(normalize_name("a--b***c"), "a-b-c");
/// ```
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let slug = collapse_runs(&lowered, is_separator);
    let slug = collapse_runs(trim_slug(&slug), |c| c == '-');
    trim_slug(&slug).to_string()
}
