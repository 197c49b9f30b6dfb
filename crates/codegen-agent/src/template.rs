//! Static fallback documents.
//!
//! Used whenever the provider is unconfigured, unreachable, or returns
//! something unusable. The pipeline never blocks on generation availability,
//! so these must always produce valid, non-empty documents.

use chrono::{Datelike, Utc};

/// Minimal but presentable single-page app around the brief.
pub fn index_html(brief: &str) -> String {
    let brief = html_escape(brief);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generated Application</title>
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css" rel="stylesheet">
    <style>
        body {{
            padding: 20px;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
        }}
        .container {{
            background: white;
            border-radius: 10px;
            padding: 30px;
            box-shadow: 0 10px 40px rgba(0,0,0,0.2);
            margin-top: 50px;
        }}
        .app-title {{
            color: #667eea;
            margin-bottom: 30px;
        }}
    </style>
</head>
<body>
    <div class="container">
        <h1 class="app-title">Generated Application</h1>
        <div class="alert alert-info">
            <h5>Brief:</h5>
            <p>{brief}</p>
        </div>
        <div id="app-content">
            <p class="text-muted">Application implementation goes here.</p>
        </div>
    </div>
    <script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/js/bootstrap.bundle.min.js"></script>
    <script>
        console.log('Application initialized');
    </script>
</body>
</html>"#
    )
}

/// README synthesized from the brief and checks when the provider does not
/// supply one.
pub fn readme(brief: &str, checks: &[String]) -> String {
    let checks_text = if checks.is_empty() {
        "No specific checks provided.".to_string()
    } else {
        checks
            .iter()
            .map(|c| format!("- {c}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "# Generated Application\n\n\
         ## Overview\n\
         This application was automatically generated based on the following brief:\n\n\
         {brief}\n\n\
         ## Requirements\n\
         {checks_text}\n\n\
         ## Usage\n\
         1. Open `index.html` in a web browser\n\
         2. The application will load and execute automatically\n\n\
         ## Technical Details\n\
         - Built with HTML5, CSS3, and JavaScript\n\
         - Uses Bootstrap 5 for styling\n\
         - Responsive design for all devices\n\n\
         ## License\n\
         MIT License\n"
    )
}

/// MIT license text with the current year.
pub fn mit_license() -> String {
    let year = Utc::now().year();
    format!(
        "MIT License\n\n\
         Copyright (c) {year}\n\n\
         Permission is hereby granted, free of charge, to any person obtaining a copy\n\
         of this software and associated documentation files (the \"Software\"), to deal\n\
         in the Software without restriction, including without limitation the rights\n\
         to use, copy, modify, merge, publish, distribute, sublicense, and/or sell\n\
         copies of the Software, and to permit persons to whom the Software is\n\
         furnished to do so, subject to the following conditions:\n\n\
         The above copyright notice and this permission notice shall be included in all\n\
         copies or substantial portions of the Software.\n\n\
         THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR\n\
         IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,\n\
         FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE\n\
         AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER\n\
         LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,\n\
         OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE\n\
         SOFTWARE.\n"
    )
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_page_is_valid_markup_containing_the_brief() {
        let page = index_html("Create a digital clock");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.ends_with("</html>"));
        assert!(page.contains("Create a digital clock"));
    }

    #[test]
    fn brief_markup_is_escaped() {
        let page = index_html("<script>alert('x')</script>");
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn readme_lists_checks() {
        let checks = vec!["Has a title".to_string(), "Updates live".to_string()];
        let text = readme("A clock", &checks);
        assert!(text.contains("- Has a title"));
        assert!(text.contains("- Updates live"));
    }

    #[test]
    fn readme_without_checks_says_so() {
        let text = readme("A clock", &[]);
        assert!(text.contains("No specific checks provided."));
    }

    #[test]
    fn license_carries_the_current_year() {
        let license = mit_license();
        assert!(license.starts_with("MIT License"));
        assert!(license.contains(&chrono::Utc::now().year().to_string()));
    }
}
