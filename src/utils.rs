/// Decode the HTML entities the generator writes into labels and scopes
/// (`&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;` and numeric `&#NN;` / `&#xNN;`).
/// Unknown entities are left as they are.
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };

        match decode_entity(&tail[1..semi]) {
            Some(ch) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Byte range of the first case-insensitive occurrence of `needle` in
/// `haystack`, in `haystack`'s own offsets.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return Some((0, 0));
    }
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();

    for (start, _) in haystack.char_indices() {
        let mut matched = 0;
        let mut end = start;
        for ch in haystack[start..].chars() {
            let lowered: Vec<char> = ch.to_lowercase().collect();
            if matched + lowered.len() > needle.len()
                || needle[matched..matched + lowered.len()] != lowered[..]
            {
                break;
            }
            matched += lowered.len();
            end += ch.len_utf8();
            if matched == needle.len() {
                return Some((start, end));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named_entities() {
        assert_eq!(
            decode_html_entities("uint128_t(uint128_t &amp;&amp;num) noexcept"),
            "uint128_t(uint128_t &&num) noexcept"
        );
        assert_eq!(decode_html_entities("std::vector&lt; T &gt;"), "std::vector< T >");
    }

    #[test]
    fn test_decode_numeric_and_unknown() {
        assert_eq!(decode_html_entities("a&#39;b&#x41;"), "a'bA");
        assert_eq!(decode_html_entities("x &bogus; y"), "x &bogus; y");
        assert_eq!(decode_html_entities("dangling &amp"), "dangling &amp");
    }

    #[test]
    fn test_find_ignore_case() {
        assert_eq!(find_ignore_case("Uint128_t", "INT"), Some((1, 4)));
        assert_eq!(find_ignore_case("upper_bound", "bound"), Some((6, 11)));
        assert_eq!(find_ignore_case("upper_bound", "lower"), None);
        assert_eq!(find_ignore_case("abc", ""), Some((0, 0)));
    }
}
