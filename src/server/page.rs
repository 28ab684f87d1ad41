/// Upload page. `message` and `download_url` are escaped here.
pub fn render_index(message: Option<&str>, download_url: Option<&str>) -> String {
    let message_html = message
        .map(|m| format!(r#"<p class="message">{}</p>"#, escape_html(m)))
        .unwrap_or_default();
    let download_html = download_url
        .map(|url| {
            format!(
                r#"<p><a class="download" href="{}">Download processed report</a></p>"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Attendance Processing</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<main>
<h1>Attendance Processing</h1>
<form action="/upload" method="post" enctype="multipart/form-data">
<input type="file" name="file" accept=".csv" required>
<button type="submit">Process</button>
</form>
{message_html}
{download_html}
</main>
</body>
</html>
"#
    )
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_index_plain() {
        let html = render_index(None, None);
        assert!(html.contains(r#"name="file""#));
        assert!(!html.contains("class=\"message\""));
        assert!(!html.contains("class=\"download\""));
    }

    #[test]
    fn test_render_index_escapes() {
        let html = render_index(
            Some("Error: <script>"),
            Some("/download?path=a.xlsx&name=attendance_final.xlsx"),
        );
        assert!(html.contains("Error: &lt;script&gt;"));
        assert!(html.contains(r#"href="/download?path=a.xlsx&amp;name=attendance_final.xlsx""#));
    }
}
