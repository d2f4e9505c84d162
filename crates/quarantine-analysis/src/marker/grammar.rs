//! Marker recognition and rendering.
//!
//! A marker is a call-form decorator
//! `@pytest.mark.xfail(reason=f"{QUARANTINED}: <reason>, <TICKET-1>", run=False)`.
//! Recognition requires the configured decorator path, the run keyword
//! bound to the literal `False`, and a statically evaluable reason string
//! containing `<sentinel>: `. In an f-string the sentinel may appear as a
//! replacement field naming the constant; in a plain string it appears
//! literally.

use quarantine_core::config::MarkerConfig;
use quarantine_core::errors::ConfigError;
use regex::Regex;

use super::literal;
use super::types::{Marker, ParsedReason};
use crate::parsers::DecoratorInfo;

#[derive(Debug, Clone)]
pub struct MarkerGrammar {
    decorator: String,
    sentinel: String,
    reason_keyword: String,
    run_keyword: String,
    marker_import: String,
    constant_module: String,
    ticket: Regex,
    ticket_exact: Regex,
}

impl Default for MarkerGrammar {
    fn default() -> Self {
        Self::from_config(&MarkerConfig::default()).expect("compiled-in marker defaults are valid")
    }
}

impl MarkerGrammar {
    pub fn from_config(config: &MarkerConfig) -> Result<Self, ConfigError> {
        let pattern = config.effective_ticket_pattern();
        let invalid = |e: regex::Error| ConfigError::ValidationFailed {
            field: "marker.ticket_pattern".to_string(),
            message: e.to_string(),
        };
        Ok(Self {
            decorator: config.effective_decorator().to_string(),
            sentinel: config.effective_sentinel().to_string(),
            reason_keyword: config.effective_reason_keyword().to_string(),
            run_keyword: config.effective_run_keyword().to_string(),
            marker_import: config.effective_marker_import().to_string(),
            constant_module: config.effective_constant_module().to_string(),
            ticket: Regex::new(pattern).map_err(invalid)?,
            ticket_exact: Regex::new(&format!("^(?:{pattern})$")).map_err(invalid)?,
        })
    }

    pub fn decorator(&self) -> &str {
        &self.decorator
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    pub fn marker_import(&self) -> &str {
        &self.marker_import
    }

    pub fn constant_module(&self) -> &str {
        &self.constant_module
    }

    pub fn ticket_pattern(&self) -> &str {
        self.ticket.as_str()
    }

    /// True when `ticket` as a whole matches the ticket pattern.
    pub fn is_valid_ticket(&self, ticket: &str) -> bool {
        self.ticket_exact.is_match(ticket)
    }

    /// Recognize a quarantine marker. Returns `None` for any other decorator.
    pub fn match_decorator(&self, decorator: &DecoratorInfo) -> Option<Marker> {
        if !decorator.is_call || decorator.name != self.decorator {
            return None;
        }
        let run = decorator.keyword(&self.run_keyword)?;
        if run.value.trim() != "False" {
            return None;
        }
        let reason = decorator.keyword(&self.reason_keyword)?;
        let value = literal::concatenated_value(&reason.string_parts, &self.sentinel)?;
        let remainder = self.strip_sentinel(&value)?;
        let parsed = self.parse_reason(remainder);
        Some(Marker {
            raw_reason: remainder.to_string(),
            ticket: parsed.ticket,
            reason: parsed.reason,
            span: decorator.span,
            line: decorator.range.start.line + 1,
        })
    }

    /// Text after the first `<sentinel>: ` in an evaluated reason string.
    pub fn strip_sentinel<'a>(&self, value: &'a str) -> Option<&'a str> {
        let prefix = format!("{}: ", self.sentinel);
        value.find(&prefix).map(|i| &value[i + prefix.len()..])
    }

    /// Split a reason remainder into human reason and ticket id. The
    /// rightmost ticket match wins since tickets are appended last.
    pub fn parse_reason(&self, remainder: &str) -> ParsedReason {
        match self.ticket.find_iter(remainder).last() {
            Some(m) => ParsedReason {
                reason: remainder[..m.start()]
                    .trim_start()
                    .trim_end_matches(is_separator)
                    .to_string(),
                ticket: Some(m.as_str().to_string()),
            },
            None => ParsedReason {
                reason: remainder.trim().to_string(),
                ticket: None,
            },
        }
    }

    /// `"<reason>, <ticket>"`, or just the ticket when the reason is blank.
    pub fn format_reason(&self, reason: &str, ticket: &str) -> String {
        let reason = reason.trim();
        if reason.is_empty() {
            ticket.to_string()
        } else {
            format!("{reason}, {ticket}")
        }
    }

    /// Render a complete marker decorator, one argument per line, ending
    /// with `newline`. Every line is prefixed with `indent`.
    pub fn render_decorator(&self, indent: &str, newline: &str, reason: &str, ticket: &str) -> String {
        let text = literal::escape_fstring_text(&self.format_reason(reason, ticket));
        let mut out = String::new();
        out.push_str(&format!("{indent}@{}({newline}", self.decorator));
        out.push_str(&format!(
            "{indent}    {}=f\"{{{}}}: {text}\",{newline}",
            self.reason_keyword, self.sentinel
        ));
        out.push_str(&format!("{indent}    {}=False,{newline}", self.run_keyword));
        out.push_str(&format!("{indent}){newline}"));
        out
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '|' | '(' | '[')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reason_takes_rightmost_ticket() {
        let g = MarkerGrammar::default();
        let parsed = g.parse_reason("ssh timeout, CNV-100");
        assert_eq!(parsed.reason, "ssh timeout");
        assert_eq!(parsed.ticket.as_deref(), Some("CNV-100"));

        let parsed = g.parse_reason("see CNV-1 then CNV-2");
        assert_eq!(parsed.ticket.as_deref(), Some("CNV-2"));
        assert_eq!(parsed.reason, "see CNV-1 then");
    }

    #[test]
    fn parse_reason_without_ticket() {
        let g = MarkerGrammar::default();
        let parsed = g.parse_reason("  flaky network ");
        assert_eq!(parsed.reason, "flaky network");
        assert_eq!(parsed.ticket, None);
    }

    #[test]
    fn ticket_match_is_case_sensitive() {
        let g = MarkerGrammar::default();
        assert_eq!(g.parse_reason("broken, cnv-100").ticket, None);
        assert!(g.is_valid_ticket("CNV-100"));
        assert!(g.is_valid_ticket("OCP_QE-7"));
        assert!(!g.is_valid_ticket("cnv-100"));
        assert!(!g.is_valid_ticket("CNV-100 extra"));
    }

    #[test]
    fn format_reason_with_and_without_reason() {
        let g = MarkerGrammar::default();
        assert_eq!(g.format_reason("slow", "CNV-1"), "slow, CNV-1");
        assert_eq!(g.format_reason("  ", "CNV-1"), "CNV-1");
    }

    #[test]
    fn render_matches_marker_contract() {
        let g = MarkerGrammar::default();
        let rendered = g.render_decorator("    ", "\n", "ssh timeout", "CNV-100");
        assert_eq!(
            rendered,
            "    @pytest.mark.xfail(\n        reason=f\"{QUARANTINED}: ssh timeout, CNV-100\",\n        run=False,\n    )\n"
        );
    }

    #[test]
    fn render_escapes_braces_and_quotes() {
        let g = MarkerGrammar::default();
        let rendered = g.render_decorator("", "\n", "dict {a} \"b\"", "CNV-2");
        assert!(rendered.contains(r#"reason=f"{QUARANTINED}: dict {{a}} \"b\", CNV-2","#));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let config = MarkerConfig {
            ticket_pattern: Some("[A-Z".to_string()),
            ..Default::default()
        };
        assert!(MarkerGrammar::from_config(&config).is_err());
    }
}
