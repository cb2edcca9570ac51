//! Pattern tables for the framework pseudo-languages

use once_cell::sync::Lazy;
use regex::Regex;

use crate::language::Language;

/// How a pattern is recognised
pub enum Matcher {
    Regex(Regex),
    Check(fn(&str) -> bool),
}

impl Matcher {
    pub fn matches(&self, code: &str) -> bool {
        match self {
            Matcher::Regex(regex) => regex.is_match(code),
            Matcher::Check(check) => check(code),
        }
    }
}

/// A labelled pattern; the label is what error messages and reports show
pub struct Pattern {
    pub label: &'static str,
    pub matcher: Matcher,
}

fn re(label: &'static str, pattern: &str) -> Pattern {
    Pattern {
        label,
        matcher: Matcher::Regex(Regex::new(pattern).expect("valid regex")),
    }
}

fn check(label: &'static str, check: fn(&str) -> bool) -> Pattern {
    Pattern {
        label,
        matcher: Matcher::Check(check),
    }
}

pub struct RuleSet {
    pub framework: &'static str,
    pub required: Vec<Pattern>,
    pub discouraged: Vec<Pattern>,
    pub idioms: Vec<Pattern>,
}

const DIRECT_DOM: &str =
    r"\bdocument\.(?:getElementById|getElementsBy\w+|querySelector(?:All)?)\s*\(|\.innerHTML\s*=";

fn react(typed: bool) -> RuleSet {
    let mut idioms = vec![
        re("useState hook", r"\buseState\s*[<(]"),
        re("useEffect hook", r"\buseEffect\s*\("),
        re("keyed list rendering", r"(?s)\.map\s*\(.*?\bkey\s*="),
        re(
            "props destructuring",
            r"function\s+[A-Z]\w*\s*\(\s*\{|\(\s*\{[^}]*\}\s*(?::[^)]*)?\)\s*=>",
        ),
    ];
    if typed {
        idioms.push(re(
            "typed props",
            r"\binterface\s+\w*Props\b|\btype\s+\w*Props\s*=|:\s*React\.FC\b",
        ));
    }
    RuleSet {
        framework: "React",
        required: vec![
            re("export statement", r"\bexport\s"),
            re("component returning JSX", r"(?:\breturn|=>)\s*\(?\s*<[A-Za-z>]"),
        ],
        discouraged: vec![
            re("direct DOM access", DIRECT_DOM),
            re("class= attribute (use className)", r"<[A-Za-z][^>]*\sclass\s*="),
        ],
        idioms,
    }
}

pub static JSX: Lazy<RuleSet> = Lazy::new(|| react(false));
pub static TSX: Lazy<RuleSet> = Lazy::new(|| react(true));

pub static VUE: Lazy<RuleSet> = Lazy::new(|| RuleSet {
    framework: "Vue",
    required: vec![
        re("<template> block", r"<template[\s>]"),
        re("<script> block", r"<script[\s>]"),
    ],
    discouraged: vec![re("v-html directive", r"\bv-html\s*=")],
    idioms: vec![
        re(
            "Composition API state",
            r"<script[^>]*\bsetup\b|\b(?:ref|reactive)\s*\(",
        ),
        re("Options API data", r"\bdata\s*\(\s*\)\s*\{"),
        re("scoped styles", r"<style[^>]*\bscoped\b"),
        re(
            "keyed v-for",
            r"<[^>]*\bv-for\s*=[^>]*:key\s*=|<[^>]*:key\s*=[^>]*\bv-for\s*=",
        ),
        re("event binding", r"(?:@|\bv-on:)[\w.-]+\s*="),
    ],
});

pub static ANGULAR: Lazy<RuleSet> = Lazy::new(|| RuleSet {
    framework: "Angular",
    required: vec![
        re("@Component decorator", r"@Component\s*\("),
        re("selector", r"\bselector\s*:"),
        re("template or templateUrl", r"\btemplate(?:Url)?\s*:"),
        re("exported class", r"\bexport\s+class\s+\w+"),
    ],
    discouraged: vec![re("direct DOM access", DIRECT_DOM)],
    idioms: vec![
        re("@Input binding", r"@Input\s*\("),
        re("@Output event", r"@Output\s*\("),
        re("ngOnInit lifecycle hook", r"\bngOnInit\s*\("),
        re(
            "constructor injection",
            r"\bconstructor\s*\(\s*(?:private|public|protected|readonly)\s",
        ),
        re("*ngFor loop", r"\*ngFor\s*="),
    ],
});

pub static SVELTE: Lazy<RuleSet> = Lazy::new(|| RuleSet {
    framework: "Svelte",
    required: vec![
        re("<script> block", r"<script[\s>]"),
        check("markup element", has_markup_outside_script),
    ],
    discouraged: vec![re("direct DOM access", DIRECT_DOM)],
    idioms: vec![
        re("reactive statement", r"(?m)^\s*\$:"),
        re("export let props", r"\bexport\s+let\s"),
        re("on: event directive", r"\bon:\w+\s*="),
        re("{#each} block", r"\{#each\s"),
        re("{#if} block", r"\{#if\s"),
    ],
});

pub static HTML: Lazy<RuleSet> = Lazy::new(|| RuleSet {
    framework: "HTML",
    required: vec![
        re("<!DOCTYPE html>", r"(?i)<!doctype\s+html\s*>"),
        re("<html> element", r"(?i)<html[\s>]"),
        re("<head> element", r"(?i)<head[\s>]"),
        re("<body> element", r"(?i)<body[\s>]"),
    ],
    discouraged: vec![
        re("<font> element", r"(?i)<font[\s>]"),
        re("<center> element", r"(?i)<center[\s>]"),
        re("inline event handler", r"(?i)<[a-z][^>]*\son[a-z]+\s*="),
    ],
    idioms: vec![
        re("charset declaration", r"(?i)<meta[^>]*\bcharset\s*="),
        re("document title", r"(?i)<title[\s>]"),
        re("viewport meta tag", r#"(?i)<meta[^>]*name\s*=\s*["']?viewport"#),
        re(
            "semantic landmarks",
            r"(?i)<(?:header|nav|main|footer|article|section|aside)[\s>]",
        ),
    ],
});

fn stylesheet(framework: &'static str, extra_idioms: Vec<Pattern>) -> RuleSet {
    let mut idioms = vec![
        re("flexbox layout", r"\bdisplay\s*:\s*(?:inline-)?flex\b"),
        re("grid layout", r"\bdisplay\s*:\s*(?:inline-)?grid\b"),
        re("media queries", r"@media\b"),
        re("custom properties", r"--[\w-]+\s*:|\bvar\(\s*--"),
        re(
            "transitions or animations",
            r"\b(?:transition|animation)\s*:|@keyframes\b",
        ),
    ];
    idioms.extend(extra_idioms);
    RuleSet {
        framework,
        required: vec![
            re("rule block", r"[^{}\s][^{}]*\{[^{}]*\}"),
            check("balanced braces", braces_balanced),
        ],
        discouraged: vec![re("!important", r"!\s*important\b")],
        idioms,
    }
}

pub static CSS: Lazy<RuleSet> = Lazy::new(|| stylesheet("CSS", Vec::new()));

pub static SCSS: Lazy<RuleSet> = Lazy::new(|| {
    stylesheet(
        "SCSS",
        vec![
            re("$variables", r"\$[\w-]+\s*:"),
            re("@mixin", r"@mixin\s"),
            re("@include", r"@include\s"),
            re("& nesting", r"&[\w:.\-\[]"),
        ],
    )
});

/// Rule table for a framework language, `None` for executable languages.
pub fn for_language(language: Language) -> Option<&'static RuleSet> {
    let rules: &'static Lazy<RuleSet> = match language {
        Language::Jsx => &JSX,
        Language::Tsx => &TSX,
        Language::Vue => &VUE,
        Language::Angular => &ANGULAR,
        Language::Svelte => &SVELTE,
        Language::Html => &HTML,
        Language::Css => &CSS,
        Language::Scss => &SCSS,
        _ => return None,
    };
    Some(Lazy::force(rules))
}

static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>").expect("valid regex")
});

static ELEMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[A-Za-z][\w-]*[\s/>]").expect("valid regex"));

fn has_markup_outside_script(code: &str) -> bool {
    ELEMENT.is_match(&SCRIPT_OR_STYLE.replace_all(code, ""))
}

/// Brace depth never goes negative and ends at zero. Comments and quoted
/// strings are skipped.
pub fn braces_balanced(code: &str) -> bool {
    let mut depth: i64 = 0;
    let mut chars = code.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '"' | '\'' => {
                let quote = c;
                let mut escaped = false;
                for c in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == quote || c == '\n' {
                        break;
                    }
                }
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
