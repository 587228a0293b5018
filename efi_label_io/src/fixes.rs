// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Hardware-specific protective-MBR overrides.
//!
//! Some firmware only boots when the protective record sits in a
//! particular MBR slot or carries the active flag. The overrides live
//! in a plain-text rules file keyed by system and baseboard
//! identification strings; the [`HwFixupSource`] capability supplies
//! both the rules text and the identification strings.
//!
//! A rule is one line of whitespace-separated `key=value` tokens,
//! processed left to right. Match keys (`sys.manufacturer`,
//! `sys.product`, `sys.version`, and the `mb.` baseboard equivalents)
//! compare case-insensitively against the identification strings; a
//! mismatch, a missing identification string, or an unparseable token
//! abandons the rest of the line. Action keys (`pmbr_slot`,
//! `pmbr_active`) apply whenever they are reached. Lines whose first
//! non-blank character is `#` are comments. Values may be double
//! quoted.

use log::debug;

/// Identification strings for a system or its baseboard. A missing
/// string never matches.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IdentStrings {
    /// Manufacturer name.
    pub manufacturer: Option<String>,

    /// Product name.
    pub product: Option<String>,

    /// Version string.
    pub version: Option<String>,
}

/// Capability supplying the fixup rules and the identity of the
/// running machine.
pub trait HwFixupSource {
    /// Contents of the rules file, or `None` if there is none.
    fn rules(&mut self) -> Option<String>;

    /// System identification strings.
    fn system(&mut self) -> IdentStrings;

    /// Baseboard identification strings.
    fn baseboard(&mut self) -> IdentStrings;
}

/// Protective-MBR placement resolved from the rules.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PmbrFixups {
    /// MBR slot (0..=3) carrying the protective record.
    pub slot: usize,

    /// Whether the record carries the active flag.
    pub active: bool,
}

impl Default for PmbrFixups {
    fn default() -> Self {
        Self {
            slot: 0,
            active: false,
        }
    }
}

pub(crate) fn resolve(source: &mut dyn HwFixupSource) -> PmbrFixups {
    let Some(rules) = source.rules() else {
        return PmbrFixups::default();
    };
    let sys = source.system();
    let baseboard = source.baseboard();
    parse_rules(&rules, &sys, &baseboard)
}

/// Evaluate rules text against the given identification strings.
///
/// Later lines override earlier ones; values out of range fall back to
/// the defaults (slot 0, inactive).
#[must_use]
pub fn parse_rules(
    rules: &str,
    sys: &IdentStrings,
    baseboard: &IdentStrings,
) -> PmbrFixups {
    let mut fixups = PmbrFixups::default();

    for line in rules.lines() {
        let mut rest = line.trim_start_matches([' ', '\t']);
        if rest.starts_with('#') {
            continue;
        }

        loop {
            rest = rest.trim_start_matches([' ', '\t']);
            if rest.is_empty() {
                break;
            }
            let Some((key, after)) = rest.split_once('=') else {
                break;
            };
            let (value, tail) = if let Some(quoted) = after.strip_prefix('"')
            {
                match quoted.split_once('"') {
                    Some((value, tail)) => (value, tail),
                    // Unterminated quote; give up on the line.
                    None => break,
                }
            } else {
                match after.find([' ', '\t']) {
                    Some(pos) => (&after[..pos], &after[pos + 1..]),
                    None => (after, ""),
                }
            };

            let matched = match key {
                "sys.manufacturer" => {
                    ident_matches(&sys.manufacturer, value)
                }
                "sys.product" => ident_matches(&sys.product, value),
                "sys.version" => ident_matches(&sys.version, value),
                "mb.manufacturer" => {
                    ident_matches(&baseboard.manufacturer, value)
                }
                "mb.product" => ident_matches(&baseboard.product, value),
                "mb.version" => ident_matches(&baseboard.version, value),
                "pmbr_slot" => {
                    let slot = atoi(value);
                    fixups.slot = if (0..=3).contains(&slot) {
                        usize::try_from(slot).unwrap()
                    } else {
                        0
                    };
                    debug!("using PMBR slot {}", fixups.slot);
                    true
                }
                "pmbr_active" => {
                    let active = atoi(value);
                    fixups.active = active == 1;
                    debug!("using PMBR active {}", u8::from(fixups.active));
                    true
                }
                _ => true,
            };
            if !matched {
                break;
            }
            rest = tail;
        }
    }

    fixups
}

fn ident_matches(ident: &Option<String>, value: &str) -> bool {
    ident
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case(value))
}

/// Leading-integer parse with C `atoi` semantics: skip leading
/// whitespace, take an optional sign and then digits, and yield 0 when
/// there are none.
fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let mut value: i64 = 0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(10) else {
            break;
        };
        value = value * 10 + i64::from(d);
        if value > i64::from(i32::MAX) {
            break;
        }
    }
    if negative {
        value = -value;
    }
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
