//! Context rules that turn a raw candidate into an accept/reject decision.
//!
//! Each raw key has one [`SymbolRule`]. A rule may widen the key (`(def` to
//! `(defn`), extend the span, or relocate its start, and always returns a
//! fresh [`Resolution`] rather than mutating the candidate.

use super::matcher::Candidate;
use crate::config::{SymbolSettings, Toggle};

const STOP_CHARS: &[u8] = b"([ /";

/// How close-delimiter count must compare to open-delimiter count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `close >= open`
    AtLeast,
    /// `close > open`
    Exceeds,
}

/// Count delimiters from `from` through the next line break (or end of text)
/// and compare closes against opens.
pub fn delimiters_balanced(text: &[u8], from: usize, comparison: Comparison) -> bool {
    let mut opens = 0usize;
    let mut closes = 0usize;
    for &b in text.iter().skip(from) {
        match b {
            b'(' | b'{' | b'[' => opens += 1,
            b')' | b'}' | b']' => closes += 1,
            _ => {}
        }
        if b == b'\n' {
            break;
        }
    }
    match comparison {
        Comparison::AtLeast => closes >= opens,
        Comparison::Exceeds => closes > opens,
    }
}

/// Index of the nearest stop character strictly left of `from`
pub fn find_left_stop(text: &[u8], from: usize) -> Option<usize> {
    text[..from.min(text.len())]
        .iter()
        .rposition(|b| STOP_CHARS.contains(b))
}

/// Neighbourhood of a candidate, read once before any rule runs
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub text: &'a [u8],
    /// Usable start of the span
    pub start: usize,
    /// End of the raw match
    pub end: usize,
    /// Byte before `start`; `None` at start of text
    pub prev: Option<u8>,
    pub next: u8,
    pub next_two: [u8; 2],
}

impl<'a> MatchContext<'a> {
    /// Build the context, or `None` when fewer than two characters follow the match
    pub fn new(text: &'a str, candidate: &Candidate<'_>) -> Option<Self> {
        let bytes = text.as_bytes();
        if !candidate.has_lookahead(text) {
            return None;
        }
        let end = candidate.match_end;
        Some(Self {
            text: bytes,
            start: candidate.start,
            end,
            prev: candidate.start.checked_sub(1).map(|i| bytes[i]),
            next: bytes[end],
            next_two: [bytes[end], bytes[end + 1]],
        })
    }

    fn balanced(&self, comparison: Comparison) -> bool {
        delimiters_balanced(self.text, self.start, comparison)
    }

    fn keep(&self, key: &'static str, accepted: bool) -> Resolution {
        Resolution {
            key,
            start: self.start,
            end: self.end,
            accepted,
        }
    }

    fn widen(&self, key: &'static str, extra: usize, accepted: bool) -> Resolution {
        Resolution {
            key,
            start: self.start,
            end: self.end + extra,
            accepted,
        }
    }
}

/// Outcome of a rule: the final key and span, and whether to fold it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub key: &'static str,
    pub start: usize,
    pub end: usize,
    pub accepted: bool,
}

type Decide = fn(&MatchContext<'_>, &SymbolRule, &SymbolSettings) -> Resolution;

/// Per-key disambiguation rule
pub struct SymbolRule {
    pub key: &'static str,
    /// Toggle governing the unwidened key
    pub toggle: Toggle,
    decide: Decide,
}

impl SymbolRule {
    pub fn apply(&self, ctx: &MatchContext<'_>, settings: &SymbolSettings) -> Resolution {
        (self.decide)(ctx, self, settings)
    }
}

static RULES: &[SymbolRule] = &[
    SymbolRule {
        key: "(def",
        toggle: Toggle::Def,
        decide: def_form,
    },
    SymbolRule {
        key: "(fn",
        toggle: Toggle::Fn,
        decide: fn_form,
    },
    SymbolRule {
        key: "(->",
        toggle: Toggle::ThreadFirst,
        decide: thread_form,
    },
    SymbolRule {
        key: "(let",
        toggle: Toggle::Let,
        decide: let_form,
    },
    SymbolRule {
        key: "(doseq",
        toggle: Toggle::Doseq,
        decide: doseq_form,
    },
    SymbolRule {
        key: "partial",
        toggle: Toggle::Partial,
        decide: operator,
    },
    SymbolRule {
        key: "comp",
        toggle: Toggle::Comp,
        decide: operator,
    },
    SymbolRule {
        key: "not=",
        toggle: Toggle::NotEqual,
        decide: operator,
    },
    SymbolRule {
        key: ">=",
        toggle: Toggle::GreaterEqual,
        decide: operator,
    },
    SymbolRule {
        key: "<=",
        toggle: Toggle::LessEqual,
        decide: operator,
    },
    SymbolRule {
        key: "and",
        toggle: Toggle::And,
        decide: operator,
    },
    SymbolRule {
        key: "or",
        toggle: Toggle::Or,
        decide: operator,
    },
    SymbolRule {
        key: "not",
        toggle: Toggle::Not,
        decide: operator,
    },
    SymbolRule {
        key: "#(",
        toggle: Toggle::Lambda,
        decide: lambda,
    },
    SymbolRule {
        key: "#{",
        toggle: Toggle::Set,
        decide: set_literal,
    },
    SymbolRule {
        key: "union",
        toggle: Toggle::SetUnion,
        decide: set_operator,
    },
    SymbolRule {
        key: "difference",
        toggle: Toggle::SetDifference,
        decide: set_operator,
    },
    SymbolRule {
        key: "intersection",
        toggle: Toggle::SetIntersection,
        decide: set_operator,
    },
];

/// Look up the rule for a raw matched key
pub fn rule_for(key: &str) -> Option<&'static SymbolRule> {
    RULES.iter().find(|rule| rule.key == key)
}

/// Every rule, in pattern order
pub fn rules() -> &'static [SymbolRule] {
    RULES
}

fn def_form(ctx: &MatchContext<'_>, rule: &SymbolRule, s: &SymbolSettings) -> Resolution {
    match ctx.next {
        b' ' => ctx.keep(
            rule.key,
            s.is_enabled(rule.toggle) && ctx.balanced(Comparison::AtLeast),
        ),
        b'n' => ctx.widen("(defn", 1, s.is_enabled(Toggle::Defn)),
        _ => ctx.keep(rule.key, false),
    }
}

fn fn_form(ctx: &MatchContext<'_>, rule: &SymbolRule, s: &SymbolSettings) -> Resolution {
    ctx.keep(
        rule.key,
        s.is_enabled(rule.toggle) && ctx.balanced(Comparison::AtLeast),
    )
}

fn thread_form(ctx: &MatchContext<'_>, rule: &SymbolRule, s: &SymbolSettings) -> Resolution {
    match ctx.next {
        b'>' => ctx.widen(
            "(->>",
            1,
            s.is_enabled(Toggle::ThreadLast) && ctx.balanced(Comparison::Exceeds),
        ),
        b' ' => ctx.keep(
            rule.key,
            s.is_enabled(rule.toggle) && ctx.balanced(Comparison::Exceeds),
        ),
        _ => ctx.keep(rule.key, false),
    }
}

fn let_form(ctx: &MatchContext<'_>, rule: &SymbolRule, s: &SymbolSettings) -> Resolution {
    if &ctx.next_two == b"fn" {
        ctx.widen(
            "(letfn",
            2,
            s.is_enabled(Toggle::Letfn) && ctx.balanced(Comparison::AtLeast),
        )
    } else if ctx.next == b' ' {
        ctx.keep(
            rule.key,
            s.is_enabled(rule.toggle) && ctx.balanced(Comparison::AtLeast),
        )
    } else {
        ctx.keep(rule.key, false)
    }
}

fn doseq_form(ctx: &MatchContext<'_>, rule: &SymbolRule, s: &SymbolSettings) -> Resolution {
    ctx.keep(
        rule.key,
        &ctx.next_two == b" [" && s.is_enabled(rule.toggle) && ctx.balanced(Comparison::AtLeast),
    )
}

/// Symbols used as values or call heads, never as part of a longer identifier
fn operator(ctx: &MatchContext<'_>, rule: &SymbolRule, s: &SymbolSettings) -> Resolution {
    let standalone = match ctx.prev {
        Some(b'(') => ctx.balanced(Comparison::Exceeds),
        Some(b' ') => true,
        _ => false,
    };
    let terminated = matches!(ctx.next, b')' | b' ' | b'\n');
    ctx.keep(rule.key, s.is_enabled(rule.toggle) && standalone && terminated)
}

fn lambda(ctx: &MatchContext<'_>, rule: &SymbolRule, s: &SymbolSettings) -> Resolution {
    ctx.keep(rule.key, s.is_enabled(rule.toggle))
}

fn set_literal(ctx: &MatchContext<'_>, rule: &SymbolRule, s: &SymbolSettings) -> Resolution {
    if ctx.next == b'}' {
        ctx.widen("#{}", 1, s.is_enabled(Toggle::EmptySet))
    } else {
        ctx.keep(rule.key, s.is_enabled(rule.toggle))
    }
}

/// `union`, `difference` and `intersection`, possibly namespace-qualified
fn set_operator(ctx: &MatchContext<'_>, rule: &SymbolRule, s: &SymbolSettings) -> Resolution {
    let stop = find_left_stop(ctx.text, ctx.start);
    let after_stop = ctx.prev.map_or(false, |b| STOP_CHARS.contains(&b));

    match stop {
        Some(pos) if after_stop && ctx.balanced(Comparison::Exceeds) => Resolution {
            key: rule.key,
            start: pos + 1,
            end: ctx.end,
            accepted: matches!(ctx.next, b' ' | b']') && s.is_enabled(rule.toggle),
        },
        _ => ctx.keep(rule.key, false),
    }
}
