const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Human-readable byte count: `B` below 1 KiB, `KB` with one decimal below 1 MiB, `MB` with two.
pub fn format_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MIB as f64)
    }
}

/// Like [`format_size`], with `--` for unknown sizes.
pub fn format_optional_size(bytes: Option<u64>) -> String {
    bytes.map(format_size).unwrap_or_else(|| "--".to_string())
}

/// Escapes every character that could be read as markup or break out of an attribute.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '`' => out.push_str("&#96;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{escape_html, format_optional_size, format_size};

    #[test]
    fn sizes_switch_units_at_binary_thresholds() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(1024 * 1024 - 1), "1024.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn unknown_size_renders_dashes() {
        assert_eq!(format_optional_size(None), "--");
        assert_eq!(format_optional_size(Some(10)), "10 B");
    }

    #[test]
    fn script_tags_become_literal_text() {
        let escaped = escape_html("<script>alert('x')</script>");
        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('\''));
        assert_eq!(
            escaped,
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn all_markup_characters_are_escaped() {
        assert_eq!(escape_html(r#"&<>"'`"#), "&amp;&lt;&gt;&quot;&#39;&#96;");
        assert_eq!(escape_html("plain text"), "plain text");
    }
}
