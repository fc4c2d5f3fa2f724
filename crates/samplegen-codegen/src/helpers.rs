//! Text helpers available to sample templates.
//!
//! Each helper is a plain string function plus a thin Handlebars adapter:
//!
//! | helper | usage |
//! |---|---|
//! | `snake_case` | `{{snake_case rpc.name}}` |
//! | `sort_lines` | `{{sort_lines text dedupe=false}}` |
//! | `wrap` | `{{wrap text 72 offset=4 indent=4}}` |
//! | `rst` | `{{rst text width=72 indent=4 nl=true}}` |
//! | `coerce_response_name` | `{{coerce_response_name field}}` |

use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderErrorReason,
};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use textwrap::{Options as WrapOptions, WordSplitter};

/// Names of the helpers registered by [`register_text_helpers`].
pub const TEXT_HELPERS: [&str; 5] = ["snake_case", "sort_lines", "wrap", "rst", "coerce_response_name"];

static MARKDOWN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[|*`_\[\]#]").expect("valid markdown regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid inline code regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("valid link regex"));

/// Registers every text helper on a Handlebars registry.
pub fn register_text_helpers(handlebars: &mut Handlebars<'_>) {
    handlebars.register_helper("snake_case", Box::new(snake_case_helper));
    handlebars.register_helper("sort_lines", Box::new(sort_lines_helper));
    handlebars.register_helper("wrap", Box::new(wrap_helper));
    handlebars.register_helper("rst", Box::new(rst_helper));
    handlebars.register_helper("coerce_response_name", Box::new(coerce_response_name_helper));
}

/// Converts `CamelCase` or `camelCase` to `snake_case`.
///
/// A digit following a lowercase letter starts a new word when it begins an
/// acronym (`get2FA` becomes `get_2fa`).
///
/// # Examples
///
/// ```
/// use samplegen_codegen::helpers::to_snake_case;
///
/// assert_eq!(to_snake_case("ListShelves"), "list_shelves");
/// assert_eq!(to_snake_case("HTTPRequest"), "http_request");
/// assert_eq!(to_snake_case("enable2FA"), "enable_2fa");
/// ```
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    let lower_then_upper = split_before(s, |prev, c, _, _| {
        prev.is_ascii_lowercase() && c.is_ascii_uppercase()
    });
    let acronym_end = split_before(&lower_then_upper, |prev, c, next, _| {
        prev != '_' && c.is_ascii_uppercase() && next.is_some_and(|n| n.is_ascii_lowercase())
    });
    let digit_acronym = split_before(&acronym_end, |prev, c, next, rest| {
        prev.is_ascii_lowercase()
            && c.is_ascii_digit()
            && next.is_some_and(|n| n.is_ascii_uppercase())
            && (rest.len() == 1 || rest.get(1).is_some_and(char::is_ascii_uppercase))
    });

    digit_acronym.to_lowercase()
}

/// Inserts `_` before every character accepted by `boundary`.
///
/// `boundary` sees the previous char, the current char, the next char and
/// every char after the current one. The first char never splits.
fn split_before(s: &str, boundary: impl Fn(char, char, Option<char>, &[char]) -> bool) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && boundary(chars[i - 1], c, chars.get(i + 1).copied(), &chars[i + 1..]) {
            out.push('_');
        }
        out.push(c);
    }

    out
}

/// Sorts lines, dropping blank ones.
///
/// A single leading and trailing newline survive the sort.
///
/// # Examples
///
/// ```
/// use samplegen_codegen::helpers::sort_lines;
///
/// assert_eq!(sort_lines("b\na\n\nb\n", true), "a\nb\n");
/// assert_eq!(sort_lines("b\na\nb", false), "a\nb\nb");
/// ```
#[must_use]
pub fn sort_lines(text: &str, dedupe: bool) -> String {
    let leading = if text.starts_with('\n') { "\n" } else { "" };
    let trailing = if text.ends_with('\n') { "\n" } else { "" };

    let lines = text.trim().split('\n').filter(|line| !line.trim().is_empty());

    let sorted: Vec<&str> = if dedupe {
        lines.collect::<BTreeSet<_>>().into_iter().collect()
    } else {
        let mut lines: Vec<&str> = lines.collect();
        lines.sort_unstable();
        lines
    };

    format!("{leading}{}{trailing}", sorted.join("\n"))
}

/// Wraps `text` to `width` columns.
///
/// The first line is wrapped to `width - offset` (the caller has already
/// emitted `offset` columns before it); later lines are indented by
/// `indent`. Line breaks after short lines are kept. Words are never broken.
///
/// # Examples
///
/// ```
/// use samplegen_codegen::helpers::wrap;
///
/// let text = "The quick brown fox jumps over the lazy dog.";
/// assert_eq!(wrap(text, 20, None, 0), "The quick brown fox\njumps over the lazy\ndog.");
/// assert_eq!(wrap("short", 20, None, 4), "short");
/// ```
#[must_use]
pub fn wrap(text: &str, width: usize, offset: Option<usize>, indent: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let offset = offset.unwrap_or(indent);
    let text = text.replace("\n ", "\n");
    let first_line = text.split('\n').next().unwrap_or_default();
    let first_width = width.saturating_sub(offset);

    let (first, rest) = if first_line.chars().count() >= first_width {
        // The first line overflows: re-flow it together with the next one.
        let joined = text.replacen('\n', " ", 1);
        let joined = joined.trim_start();
        let wrapped = textwrap::wrap(first_line.trim_start(), wrap_options(first_width.max(1), ""));
        let head = wrapped.first().map_or("", |line| line.as_ref()).to_string();
        let rest = joined.strip_prefix(head.as_str()).map_or_else(
            || joined.chars().skip(head.chars().count()).collect(),
            str::to_string,
        );
        (head, rest)
    } else {
        let rest = text.get(first_line.len()..).unwrap_or_default().to_string();
        (first_line.to_string(), rest)
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return first.trim().to_string();
    }

    let threshold = width * 3 / 4;
    let mut tokens = Vec::new();
    let mut token = String::new();
    for line in rest.split('\n') {
        token.push_str(line);
        token.push('\n');
        if line.chars().count() < threshold {
            tokens.push(std::mem::take(&mut token));
        }
    }
    if !token.is_empty() {
        tokens.push(token);
    }

    let pad = " ".repeat(indent);
    let body = tokens
        .iter()
        .map(|token| {
            let flat = token.replace('\n', " ");
            textwrap::fill(flat.trim_end(), wrap_options(width.max(1), &pad))
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{first}\n{body}").trim_end_matches('\n').to_string()
}

fn wrap_options(width: usize, indent: &str) -> WrapOptions<'_> {
    WrapOptions::new(width)
        .break_words(false)
        .word_splitter(WordSplitter::NoHyphenation)
        .initial_indent(indent)
        .subsequent_indent(indent)
}

/// Formats documentation text as reStructuredText for a docstring.
///
/// Plain text is only wrapped. Text with markdown punctuation first has
/// inline code and links converted. A trailing newline plus `indent` spaces
/// is added when `nl` is true, or when `nl` is unset and the result spans
/// several lines. A trailing `"` gets a `.` appended so the output can be
/// followed by a closing triple quote.
///
/// # Examples
///
/// ```
/// use samplegen_codegen::helpers::rst;
///
/// assert_eq!(rst("Lists shelves", 72, 4, None), "Lists shelves");
/// assert_eq!(rst("Use `name` here", 72, 0, None), "Use ``name`` here");
/// assert_eq!(rst("Say \"hi\"", 72, 0, None), "Say \"hi\".");
/// ```
#[must_use]
pub fn rst(text: &str, width: usize, indent: usize, nl: Option<bool>) -> String {
    let is_markdown = MARKDOWN.is_match(text);
    let source = if is_markdown {
        markdown_to_rst(text)
    } else {
        text.to_string()
    };

    let mut answer = wrap(&source, width.saturating_sub(indent), Some(indent + 3), indent);

    if nl.unwrap_or_else(|| answer.contains('\n')) {
        answer.push('\n');
        answer.push_str(&" ".repeat(indent));
    }
    if answer.ends_with('"') {
        answer.push('.');
    }
    answer
}

fn markdown_to_rst(text: &str) -> String {
    let text = INLINE_CODE.replace_all(text, "``$1``");
    LINK.replace_all(&text, "`$1 <$2>`__").into_owned()
}

/// Replaces the `$resp` placeholder with `response`.
#[must_use]
pub fn coerce_response_name(s: &str) -> String {
    s.replace("$resp", "response")
}

fn str_param<'a>(h: &'a Helper<'_>, name: &'static str, idx: usize) -> Result<&'a str, RenderErrorReason> {
    let param = h
        .param(idx)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex(name, idx))?;
    param
        .value()
        .as_str()
        .ok_or_else(|| RenderErrorReason::InvalidParamType("string"))
}

fn usize_hash(h: &Helper<'_>, key: &str) -> Result<Option<usize>, RenderErrorReason> {
    match h.hash_get(key) {
        None => Ok(None),
        Some(v) => v
            .value()
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or(RenderErrorReason::InvalidParamType("unsigned integer")),
    }
}

fn bool_hash(h: &Helper<'_>, key: &str) -> Result<Option<bool>, RenderErrorReason> {
    match h.hash_get(key) {
        None => Ok(None),
        Some(v) => v
            .value()
            .as_bool()
            .map(Some)
            .ok_or(RenderErrorReason::InvalidParamType("boolean")),
    }
}

fn snake_case_helper(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let text = str_param(h, "snake_case", 0)?;
    out.write(&to_snake_case(text))?;
    Ok(())
}

fn sort_lines_helper(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let text = str_param(h, "sort_lines", 0)?;
    let dedupe = bool_hash(h, "dedupe")?.unwrap_or(true);
    out.write(&sort_lines(text, dedupe))?;
    Ok(())
}

fn wrap_helper(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let text = str_param(h, "wrap", 0)?;
    let width = h
        .param(1)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("wrap", 1))?
        .value()
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or(RenderErrorReason::InvalidParamType("unsigned integer"))?;
    let offset = usize_hash(h, "offset")?;
    let indent = usize_hash(h, "indent")?.unwrap_or(0);
    out.write(&wrap(text, width, offset, indent))?;
    Ok(())
}

fn rst_helper(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let text = str_param(h, "rst", 0)?;
    let width = usize_hash(h, "width")?.unwrap_or(72);
    let indent = usize_hash(h, "indent")?.unwrap_or(0);
    let nl = bool_hash(h, "nl")?;
    out.write(&rst(text, width, indent, nl))?;
    Ok(())
}

fn coerce_response_name_helper(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let text = str_param(h, "coerce_response_name", 0)?;
    out.write(&coerce_response_name(text))?;
    Ok(())
}
