//! Parser for generated `searchData` files
//!
//! Reads the JavaScript literal subset the generator emits
//! (`var searchData=[ ... ];`) into a small value tree, then checks that
//! every element has the `[key, [label, [url, flag, scope], ...]]` shape.

use super::store::SearchDataError;
use super::types::{LinkTarget, SearchCategory, SearchEntry, SearchLink};

/// Generated files nest four arrays deep (root, entry, items, link)
const MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq)]
enum JsValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Array(Vec<JsValue>),
}

impl JsValue {
    fn kind(&self) -> &'static str {
        match self {
            JsValue::Str(_) => "string",
            JsValue::Int(_) => "number",
            JsValue::Bool(_) => "boolean",
            JsValue::Array(_) => "array",
        }
    }
}

/// Parse the contents of one search data file
pub fn parse_search_data(
    text: &str,
    category: Option<&SearchCategory>,
) -> Result<Vec<SearchEntry>, SearchDataError> {
    let mut reader = Reader::new(text);
    reader.skip_preamble()?;
    let root = reader.parse_value()?;
    reader.skip_trailer()?;

    let elements = match root {
        JsValue::Array(elements) => elements,
        other => {
            return Err(SearchDataError::Shape {
                index: 0,
                message: format!("expected top-level array, found {}", other.kind()),
            })
        }
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            let entry = element_to_entry(index, element)?;
            Ok(match category {
                Some(category) => entry.with_category(category.clone()),
                None => entry,
            })
        })
        .collect()
}

fn shape_error(index: usize, message: impl Into<String>) -> SearchDataError {
    SearchDataError::Shape {
        index,
        message: message.into(),
    }
}

fn element_to_entry(index: usize, element: JsValue) -> Result<SearchEntry, SearchDataError> {
    let parts = match element {
        JsValue::Array(parts) => parts,
        other => {
            return Err(shape_error(
                index,
                format!("entry is a {}, expected array", other.kind()),
            ))
        }
    };
    let [key, items]: [JsValue; 2] = parts
        .try_into()
        .map_err(|parts: Vec<JsValue>| {
            shape_error(index, format!("entry has {} elements, expected 2", parts.len()))
        })?;

    let id = match key {
        JsValue::Str(id) => id,
        other => {
            return Err(shape_error(
                index,
                format!("key is a {}, expected string", other.kind()),
            ))
        }
    };
    if id.is_empty() {
        return Err(shape_error(index, "empty key"));
    }

    let JsValue::Array(items) = items else {
        return Err(shape_error(index, format!("items of '{}' are not an array", id)));
    };
    let mut items = items.into_iter();
    let label = match items.next() {
        Some(JsValue::Str(label)) => label,
        Some(other) => {
            return Err(shape_error(
                index,
                format!("label of '{}' is a {}, expected string", id, other.kind()),
            ))
        }
        None => return Err(shape_error(index, format!("'{}' has no items", id))),
    };

    let links = items
        .map(|item| item_to_link(index, &id, item))
        .collect::<Result<Vec<_>, _>>()?;
    if links.is_empty() {
        return Err(shape_error(index, format!("'{}' has no links", id)));
    }

    Ok(SearchEntry::new(&id, &label, links))
}

fn item_to_link(index: usize, id: &str, item: JsValue) -> Result<SearchLink, SearchDataError> {
    let fields = match item {
        JsValue::Array(fields) => fields,
        other => {
            return Err(shape_error(
                index,
                format!("link of '{}' is a {}, expected array", id, other.kind()),
            ))
        }
    };
    if fields.len() < 2 || fields.len() > 3 {
        return Err(shape_error(
            index,
            format!("link of '{}' has {} fields, expected 2 or 3", id, fields.len()),
        ));
    }
    let mut fields = fields.into_iter();

    let url = match fields.next() {
        Some(JsValue::Str(url)) => url,
        _ => return Err(shape_error(index, format!("link url of '{}' is not a string", id))),
    };
    let target = match fields.next() {
        Some(JsValue::Int(flag)) => LinkTarget::from_flag(flag),
        Some(JsValue::Bool(flag)) => LinkTarget::from_flag(flag as i64),
        _ => return Err(shape_error(index, format!("link flag of '{}' is not a number", id))),
    };
    let scope = match fields.next() {
        Some(JsValue::Str(scope)) => scope,
        None => String::new(),
        Some(other) => {
            return Err(shape_error(
                index,
                format!("link scope of '{}' is a {}, expected string", id, other.kind()),
            ))
        }
    };

    Ok(SearchLink { url, target, scope })
}

struct Reader<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    depth: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.strip_prefix('\u{feff}').unwrap_or(text).chars().peekable(),
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> SearchDataError {
        SearchDataError::Parse {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn expect(&mut self, wanted: char) -> Result<(), SearchDataError> {
        match self.peek() {
            Some(ch) if ch == wanted => {
                self.bump();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}', found '{}'", wanted, ch))),
            None => Err(self.error(format!("expected '{}', found end of input", wanted))),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), SearchDataError> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    self.bump();
                    match self.bump() {
                        Some('/') => {
                            while let Some(ch) = self.bump() {
                                if ch == '\n' {
                                    break;
                                }
                            }
                        }
                        Some('*') => {
                            let mut prev = '\0';
                            loop {
                                match self.bump() {
                                    Some('/') if prev == '*' => break,
                                    Some(ch) => prev = ch,
                                    None => return Err(self.error("unterminated comment")),
                                }
                            }
                        }
                        _ => return Err(self.error("unexpected '/'")),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
                word.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        word
    }

    /// Accepts `var searchData=`, `searchData =` or nothing before the array
    fn skip_preamble(&mut self) -> Result<(), SearchDataError> {
        self.skip_trivia()?;
        if !self.peek().is_some_and(|ch| ch.is_ascii_alphabetic()) {
            return Ok(());
        }

        let mut word = self.read_word();
        if matches!(word.as_str(), "var" | "let" | "const") {
            self.skip_trivia()?;
            word = self.read_word();
        }
        if word.is_empty() {
            return Err(self.error("expected variable name"));
        }
        self.skip_trivia()?;
        self.expect('=')?;
        self.skip_trivia()
    }

    fn skip_trailer(&mut self) -> Result<(), SearchDataError> {
        self.skip_trivia()?;
        if self.peek() == Some(';') {
            self.bump();
            self.skip_trivia()?;
        }
        match self.peek() {
            None => Ok(()),
            Some(ch) => Err(self.error(format!("unexpected '{}' after search data", ch))),
        }
    }

    fn parse_value(&mut self) -> Result<JsValue, SearchDataError> {
        self.skip_trivia()?;
        match self.peek() {
            Some('[') => self.parse_array(),
            Some(quote @ ('\'' | '"')) => {
                self.bump();
                self.parse_string(quote).map(JsValue::Str)
            }
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_int(),
            Some(ch) if ch.is_ascii_alphabetic() => {
                let (line, column) = (self.line, self.column);
                match self.read_word().as_str() {
                    "true" => Ok(JsValue::Bool(true)),
                    "false" => Ok(JsValue::Bool(false)),
                    other => Err(SearchDataError::Parse {
                        line,
                        column,
                        message: format!("unexpected identifier '{}'", other),
                    }),
                }
            }
            Some(ch) => Err(self.error(format!("unexpected '{}'", ch))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_array(&mut self) -> Result<JsValue, SearchDataError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let array = self.parse_array_items();
        self.depth -= 1;
        array
    }

    fn parse_array_items(&mut self) -> Result<JsValue, SearchDataError> {
        self.expect('[')?;
        let mut values = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.bump();
                return Ok(JsValue::Array(values));
            }
            values.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                Some(ch) => return Err(self.error(format!("expected ',' or ']', found '{}'", ch))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, SearchDataError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(ch) if ch == quote => return Ok(out),
                Some('\\') => out.push(self.parse_escape()?),
                Some('\n') | None => return Err(self.error("unterminated string")),
                Some(ch) => out.push(ch),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, SearchDataError> {
        match self.bump() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') => Ok('\0'),
            Some('u') => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self
                        .bump()
                        .and_then(|c| c.to_digit(16))
                        .ok_or_else(|| self.error("invalid \\u escape"))?;
                    code = code * 16 + digit;
                }
                char::from_u32(code).ok_or_else(|| self.error("invalid \\u escape"))
            }
            Some(ch) => Ok(ch),
            None => Err(self.error("unterminated string")),
        }
    }

    fn parse_int(&mut self) -> Result<JsValue, SearchDataError> {
        let mut digits = String::new();
        if self.peek() == Some('-') {
            digits.push('-');
            self.bump();
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        digits
            .parse::<i64>()
            .map(JsValue::Int)
            .map_err(|_| self.error(format!("invalid number '{}'", digits)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("testdata/all_16.js");

    #[test]
    fn test_parse_sample_file() {
        let entries = parse_search_data(SAMPLE, Some(&SearchCategory::All)).unwrap();
        assert_eq!(entries.len(), 12);

        let first = &entries[0];
        assert_eq!(first.id, "u16streampos_2196");
        assert_eq!(first.label, "u16streampos");
        assert_eq!(first.links.len(), 1);
        assert_eq!(first.links[0].url, "http://en.cppreference.com/w/cpp/io/fpos.html");
        assert_eq!(first.links[0].target, LinkTarget::External);
        assert_eq!(first.links[0].scope, "std");
        assert_eq!(first.category, Some(SearchCategory::All));

        let ctor = entries.iter().find(|e| e.id == "uint128_5ft_2201").unwrap();
        assert_eq!(ctor.links.len(), 3);
        assert_eq!(ctor.links[0].target, LinkTarget::Local);
        assert_eq!(
            ctor.links[0].scope,
            "uint128_t::uint128_t(uint128_t &amp;&amp;num) noexcept"
        );
    }

    #[test]
    fn test_parse_bare_array_and_comments() {
        let text = "// generated\n[ /* one */ ['a_1', ['a', ['../x.html', 1, '']],], ]";
        let entries = parse_search_data(text, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "a");
        assert_eq!(entries[0].category, None);
    }

    #[test]
    fn test_parse_escapes_and_flag_variants() {
        let text = r#"var searchData=[['op_27_3',["it's",['p.html#x',true,'AB\\']]]];"#;
        let entries = parse_search_data(text, None).unwrap();
        assert_eq!(entries[0].label, "it's");
        assert_eq!(entries[0].links[0].target, LinkTarget::Local);
        assert_eq!(entries[0].links[0].scope, "AB\\");
    }

    #[test]
    fn test_parse_link_without_scope() {
        let text = "var searchData=[['x_1',['x',['x.html',0]]]];";
        let entries = parse_search_data(text, None).unwrap();
        assert_eq!(entries[0].links[0].scope, "");
        assert!(entries[0].links[0].is_external());
    }

    #[test]
    fn test_parse_error_position() {
        let text = "var searchData=\n[\n  ['a_1',['a',['a.html',1,'']]]\n  ['b_2']\n];";
        match parse_search_data(text, None) {
            Err(SearchDataError::Parse { line, column, .. }) => {
                assert_eq!(line, 4);
                assert_eq!(column, 3);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unterminated_string() {
        let err = parse_search_data("[['a_1", None).unwrap_err();
        assert!(matches!(err, SearchDataError::Parse { .. }));
    }

    #[test]
    fn test_shape_errors() {
        let cases = [
            "[['a_1']]",
            "[['',['a',['a.html',1,'']]]]",
            "[['a_1',[]]]",
            "[['a_1',['a']]]",
            "[['a_1',['a',['a.html']]]]",
            "[['a_1',['a',['a.html','x','']]]]",
            "[5]",
            "'not an array'",
        ];
        for text in cases {
            let err = parse_search_data(text, None).unwrap_err();
            assert!(
                matches!(err, SearchDataError::Shape { .. }),
                "{} gave {:?}",
                text,
                err
            );
        }
    }

    #[test]
    fn test_shape_error_reports_index() {
        let text = "[['a_1',['a',['a.html',1,'']]], ['b_2',['b']]]";
        match parse_search_data(text, None) {
            Err(SearchDataError::Shape { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected shape error, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let err = parse_search_data("var searchData=[]; x", None).unwrap_err();
        assert!(matches!(err, SearchDataError::Parse { .. }));
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_search_data("var searchData=\n[\n];\n", None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let text = format!("var searchData={}", "[".repeat(100_000));
        match parse_search_data(&text, None) {
            Err(SearchDataError::Parse { line, column, message }) => {
                assert_eq!(line, 1);
                assert_eq!(column, 16 + MAX_DEPTH);
                assert_eq!(message, "nesting too deep");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_nesting_at_limit_is_a_shape_error() {
        let text = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        let err = parse_search_data(&text, None).unwrap_err();
        assert!(matches!(err, SearchDataError::Shape { .. }));
    }
}
