//! Persisted engine state
//!
//! Every field is quoted and followed by `[;;;]`, every section by `[###]`.
//! Quoting replaces the characters `| [ ] : , ; { }` with brace escapes, so a
//! quoted field can never contain either delimiter.

use unitconv_core::{Category, ConverterError, Unit, EMPTY_UNIT};

pub const FIELD_DELIMITER: &str = "[;;;]";
pub const SECTION_DELIMITER: &str = "[###]";

const CATEGORY_FIELDS: usize = 3;
const UNIT_FIELDS: usize = 6;
const STATE_FIELDS: usize = 6;
const STATE_SECTIONS: usize = 4;
const PREFERENCE_SECTIONS: usize = 3;

const ESCAPES: [(char, &str); 8] = [
    ('|', "{p}"),
    ('[', "{lc}"),
    (']', "{rc}"),
    (':', "{co}"),
    (',', "{cm}"),
    (';', "{sc}"),
    ('{', "{lb}"),
    ('}', "{rb}"),
];

pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match ESCAPES.iter().find(|(raw, _)| *raw == c) {
            Some((_, escaped)) => out.push_str(escaped),
            None => out.push(c),
        }
    }
    out
}

/// Reverse of [`quote`]. An escape missing its closing brace ends the string.
pub fn unquote(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('}') else {
            return out;
        };
        let escape = &rest[start..=start + len];
        match ESCAPES.iter().find(|(_, escaped)| *escaped == escape) {
            Some((raw, _)) => out.push(*raw),
            None => out.push_str(escape),
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

/// Tokens terminated by `delimiter`; text after the last delimiter is dropped.
fn split<'a>(s: &'a str, delimiter: &str) -> Vec<&'a str> {
    let mut tokens: Vec<&str> = s.split(delimiter).collect();
    tokens.pop();
    tokens
}

fn fields<'a>(s: &'a str, what: &'static str, expected: usize) -> Result<Vec<&'a str>, ConverterError> {
    let tokens = split(s, FIELD_DELIMITER);
    if tokens.len() != expected {
        return Err(ConverterError::FieldCount { what, expected, found: tokens.len() });
    }
    Ok(tokens)
}

fn sections<'a>(s: &'a str, what: &'static str, expected: usize) -> Result<Vec<&'a str>, ConverterError> {
    let tokens = split(s, SECTION_DELIMITER);
    if tokens.len() != expected {
        return Err(ConverterError::SectionCount { what, expected, found: tokens.len() });
    }
    Ok(tokens)
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

fn parse_flag(token: &str) -> Result<bool, ConverterError> {
    match token {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(ConverterError::InvalidFlag(other.to_string())),
    }
}

fn parse_id(token: &str) -> Result<i32, ConverterError> {
    let raw = unquote(token);
    raw.parse().map_err(|_| ConverterError::InvalidNumber(raw))
}

/// A display buffer must read back as a finite number
fn parse_display(token: &str) -> Result<String, ConverterError> {
    let raw = unquote(token);
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(raw),
        _ => Err(ConverterError::InvalidNumber(raw)),
    }
}

fn push_field(out: &mut String, value: &str) {
    out.push_str(value);
    out.push_str(FIELD_DELIMITER);
}

pub fn category_to_string(category: &Category) -> String {
    let mut out = String::new();
    push_field(&mut out, &quote(&category.id.to_string()));
    push_field(&mut out, flag(category.supports_negative));
    push_field(&mut out, &quote(&category.name));
    out
}

pub fn string_to_category(s: &str) -> Result<Category, ConverterError> {
    let tokens = fields(s, "category", CATEGORY_FIELDS)?;
    Ok(Category::new(parse_id(tokens[0])?, unquote(tokens[2]), parse_flag(tokens[1])?))
}

pub fn unit_to_string(unit: &Unit) -> String {
    let mut out = String::new();
    push_field(&mut out, &quote(&unit.id.to_string()));
    push_field(&mut out, &quote(&unit.name));
    push_field(&mut out, &quote(&unit.abbreviation));
    push_field(&mut out, flag(unit.is_conversion_source));
    push_field(&mut out, flag(unit.is_conversion_target));
    push_field(&mut out, flag(unit.is_whimsical));
    out
}

pub fn string_to_unit(s: &str) -> Result<Unit, ConverterError> {
    let tokens = fields(s, "unit", UNIT_FIELDS)?;
    let id = parse_id(tokens[0])?;
    if id == EMPTY_UNIT.id {
        return Ok(EMPTY_UNIT);
    }
    Ok(Unit::new(
        id,
        unquote(tokens[1]),
        unquote(tokens[2]),
        parse_flag(tokens[3])?,
        parse_flag(tokens[4])?,
        parse_flag(tokens[5])?,
    ))
}

/// Everything needed to restore an engine session
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    pub category: Category,
    pub from: Unit,
    pub to: Unit,
    pub current_has_decimal: bool,
    pub return_has_decimal: bool,
    pub switched_active: bool,
    pub current_display: String,
    pub return_display: String,
    /// Currency rates were loaded when the state was taken
    pub currency_fresh: bool,
}

impl EngineState {
    pub fn encode(&self) -> String {
        let mut state = String::new();
        push_field(&mut state, flag(self.current_has_decimal));
        push_field(&mut state, flag(self.return_has_decimal));
        push_field(&mut state, flag(self.switched_active));
        push_field(&mut state, &quote(&self.current_display));
        push_field(&mut state, &quote(&self.return_display));
        push_field(&mut state, flag(self.currency_fresh));

        [category_to_string(&self.category), unit_to_string(&self.from), unit_to_string(&self.to), state]
            .iter()
            .map(|section| format!("{section}{SECTION_DELIMITER}"))
            .collect()
    }

    pub fn decode(s: &str) -> Result<Self, ConverterError> {
        let outer = sections(s, "state", STATE_SECTIONS)?;
        let category = string_to_category(outer[0])?;
        let from = string_to_unit(outer[1])?;
        let to = string_to_unit(outer[2])?;

        let state = fields(outer[3], "entry state", STATE_FIELDS)?;
        Ok(Self {
            category,
            from,
            to,
            current_has_decimal: parse_flag(state[0])?,
            return_has_decimal: parse_flag(state[1])?,
            switched_active: parse_flag(state[2])?,
            current_display: parse_display(state[3])?,
            return_display: parse_display(state[4])?,
            currency_fresh: parse_flag(state[5])?,
        })
    }
}

/// Category and unit choice, kept across sessions
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub category: Category,
    pub from: Unit,
    pub to: Unit,
}

impl Preferences {
    pub fn encode(&self) -> String {
        [category_to_string(&self.category), unit_to_string(&self.from), unit_to_string(&self.to)]
            .iter()
            .map(|section| format!("{section}{SECTION_DELIMITER}"))
            .collect()
    }

    pub fn decode(s: &str) -> Result<Self, ConverterError> {
        let outer = sections(s, "preferences", PREFERENCE_SECTIONS)?;
        Ok(Self {
            category: string_to_category(outer[0])?,
            from: string_to_unit(outer[1])?,
            to: string_to_unit(outer[2])?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> EngineState {
        EngineState {
            category: Category::new(9, "Area", false),
            from: Unit::new(904, "Hectares", "ha", true, false, false),
            to: Unit::new(909, "Acres", "ac", false, true, false),
            current_has_decimal: true,
            return_has_decimal: true,
            switched_active: false,
            current_display: "10.5".to_string(),
            return_display: "25.94606".to_string(),
            currency_fresh: false,
        }
    }

    #[test]
    fn test_quote_unquote() {
        let raw = "a|b[c]d:e,f;g{h}i";
        let quoted = quote(raw);
        assert_eq!(quoted, "a{p}b{lc}c{rc}d{co}e{cm}f{sc}g{lb}h{rb}i");
        assert_eq!(unquote(&quoted), raw);
        assert_eq!(quote("Foot-pounds"), "Foot-pounds");
    }

    #[test]
    fn test_unquote_unterminated_escape() {
        assert_eq!(unquote("ab{lc"), "ab");
        assert_eq!(unquote("x{zz}y"), "x{zz}y");
    }

    #[test]
    fn test_split_drops_remainder() {
        assert_eq!(split("a[;;;]b[;;;]", FIELD_DELIMITER), vec!["a", "b"]);
        assert_eq!(split("a[;;;]tail", FIELD_DELIMITER), vec!["a"]);
        assert!(split("", FIELD_DELIMITER).is_empty());
    }

    #[test]
    fn test_unit_layout() {
        let unit = Unit::new(501, "Meters", "m", true, false, false);
        assert_eq!(unit_to_string(&unit), "501[;;;]Meters[;;;]m[;;;]1[;;;]0[;;;]0[;;;]");
    }

    #[test]
    fn test_state_round_trip() {
        let original = state();
        let decoded = EngineState::decode(&original.encode()).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.from.name, "Hectares");
        assert_eq!(decoded.to.abbreviation, "ac");
    }

    #[test]
    fn test_delimiter_characters_in_names() {
        let mut original = state();
        original.category.name = "Odd [###] name".to_string();
        original.from.name = "semi;colon[;;;]".to_string();
        let encoded = original.encode();
        assert_eq!(encoded.matches(SECTION_DELIMITER).count(), 4);
        assert_eq!(EngineState::decode(&encoded).unwrap(), original);
    }

    #[test]
    fn test_empty_units_round_trip() {
        let mut original = state();
        original.from = EMPTY_UNIT;
        original.to = EMPTY_UNIT;
        let decoded = EngineState::decode(&original.encode()).unwrap();
        assert!(decoded.from.is_empty());
        assert!(decoded.to.is_empty());
    }

    #[test]
    fn test_malformed_state() {
        assert!(matches!(
            EngineState::decode("garbage"),
            Err(ConverterError::SectionCount { expected: 4, found: 0, .. })
        ));

        let encoded = state().encode().replace("10.5", "ten");
        assert_eq!(EngineState::decode(&encoded), Err(ConverterError::InvalidNumber("ten".to_string())));

        let encoded = state().encode().replacen("[;;;]1[;;;]0[;;;]0[;;;]", "[;;;]yes[;;;]0[;;;]0[;;;]", 1);
        assert_eq!(EngineState::decode(&encoded), Err(ConverterError::InvalidFlag("yes".to_string())));

        let truncated = state().encode().replacen("[;;;]", "", 1);
        assert!(matches!(EngineState::decode(&truncated), Err(ConverterError::FieldCount { what: "category", .. })));
    }

    #[test]
    fn test_preferences_round_trip() {
        let prefs = Preferences {
            category: Category::new(7, "Temperature", true),
            from: Unit::new(701, "Celsius", "°C", true, false, false),
            to: Unit::new(702, "Fahrenheit", "°F", false, true, false),
        };
        let decoded = Preferences::decode(&prefs.encode()).unwrap();
        assert_eq!(decoded, prefs);
        assert!(decoded.category.supports_negative);
        assert!(Preferences::decode(&state().encode()).is_err());
    }
}
