use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Remove every `<...>` run from service text. An opening `<` with no closing
/// `>` after it is left alone, as is a stray `>`.
pub fn strip_tags(s: &str) -> String {
    RE_TAG.replace_all(s, "").into_owned()
}

pub fn strip_tags_all(lines: &[String]) -> Vec<String> {
    lines.iter().map(|l| strip_tags(l)).collect()
}
